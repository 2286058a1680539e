//! State reconciliation: ledger truth merged with the device's self-report.

use tracing::debug;

use renta_ledger::Feature;
use renta_types::{BookingInterval, RentingState};

use crate::device::Device;
use crate::engine::RentingEngine;
use crate::error::EngineError;

impl RentingEngine<'_> {
    /// Fetch and reconcile the device's renting state.
    ///
    /// Ledger query, hub read and block time run concurrently.  The hub is
    /// consulted only when `include_off_chain` is set and a hub is wired;
    /// a failed hub read degrades to ledger-only truth and is not an error.
    /// The hub's device clock becomes the time oracle when it answered,
    /// ledger block time otherwise.
    ///
    /// The result is computed fresh on every call: both sources are mutated
    /// by other actors and a cached view would go stale immediately.
    pub async fn renting_state(
        &self,
        device: &Device,
        include_off_chain: bool,
    ) -> Result<RentingState, EngineError> {
        let off_chain_read = async {
            let hub = self.hub?;
            if !include_off_chain {
                return None;
            }
            match hub.read_state(&device.url).await {
                Ok(reply) => Some(reply),
                Err(err) => {
                    debug!(
                        target: "renta::engine",
                        url = %device.url,
                        %err,
                        "off-chain read failed; falling back to ledger-only state"
                    );
                    None
                }
            }
        };

        let (on_chain, off_chain, block_time) = tokio::join!(
            self.ledger
                .renting_state(device.contract, device.id, device.user),
            off_chain_read,
            self.ledger.block_time(),
        );
        let on_chain = on_chain?;
        let block_time = block_time?;

        let now = off_chain.as_ref().map_or(block_time, |o| o.timestamp);

        // The device's own list wins when it answered.  Without it, the
        // ledger's single booking is materialised as a one-element list:
        // always under `rentFor` (future bookings may exist even while the
        // current fields are zero), otherwise only when a booking is set.
        let states: Vec<BookingInterval> = match &off_chain {
            Some(reply) => reply.states.clone(),
            None => {
                let rent_for = self.feature(device.contract, Feature::RentFor).await?;
                if rent_for || on_chain.rented_until != 0 {
                    vec![BookingInterval::new(
                        on_chain.controller,
                        on_chain.rented_from,
                        on_chain.rented_until,
                    )]
                } else {
                    Vec::new()
                }
            }
        };

        // Project the list onto "who holds the device right now".  The raw
        // ledger fields are overwritten either way: an interval that already
        // ended leaves the device free even if the ledger still names a
        // controller.
        let active = states.iter().find(|s| s.is_active_at(now)).copied();
        let (controller, rented_from, rented_until) = match active {
            Some(interval) if !interval.controller.is_zero() => (
                Some(interval.controller),
                interval.rented_from,
                interval.rented_until,
            ),
            Some(interval) => (None, interval.rented_from, interval.rented_until),
            None => (None, 0, 0),
        };

        Ok(RentingState {
            rentable: on_chain.rentable,
            open: on_chain.open,
            free: rented_until == 0,
            controller,
            rented_until,
            rented_from,
            states,
            physical_state: off_chain.and_then(|o| o.physical_state),
            timestamp: now,
        })
    }
}
