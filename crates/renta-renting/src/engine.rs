//! The engine facade and the rent workflow.

use tracing::{debug, info};

use renta_hub::DeviceHub;
use renta_ledger::{Feature, FeatureCache, LedgerError, RentingLedger};
use renta_types::{Address, Bytes32, RentingState};

use crate::conflict::{find_conflict, ConflictReason};
use crate::device::Device;
use crate::error::EngineError;

/// Reconciliation engine over one ledger, an optional hub, and a shared
/// feature cache.
///
/// Holds borrowed collaborators so one ledger client and one cache serve any
/// number of engines; all state lives with the caller.
pub struct RentingEngine<'a> {
    pub(crate) ledger: &'a dyn RentingLedger,
    pub(crate) hub: Option<&'a dyn DeviceHub>,
    pub(crate) features: &'a FeatureCache,
}

/// Arguments for [`RentingEngine::rent`].
///
/// `start` and `payer` both route the rent through the `rentFor` path:
/// a future start time and paying for someone else are contract features.
#[derive(Debug, Clone, Copy, Default)]
pub struct RentArgs {
    pub seconds: u64,
    pub start: Option<u64>,
    pub payer: Option<Address>,
}

/// Why the engine refused to submit a rent transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RentRefusal {
    /// The contract does not implement the renting interface at all.
    RentingUnsupported,
    /// The device is currently not offered for rent.
    NotRentable,
    /// The requested interval collides with the booking list.
    Conflict(ConflictReason),
    /// A start time or payer was given but the contract lacks `rentFor`.
    RentForUnsupported,
    /// The ledger-side availability re-check rejected the interval.
    DeviceAlreadyBooked,
}

impl RentRefusal {
    pub fn key(&self) -> &'static str {
        match self {
            RentRefusal::RentingUnsupported => "renting_not_supported",
            RentRefusal::NotRentable => "not_rentable",
            RentRefusal::Conflict(reason) => reason.key(),
            RentRefusal::RentForUnsupported => "rentFor_not_supported",
            RentRefusal::DeviceAlreadyBooked => "device_already_booked",
        }
    }
}

/// Result of the rent workflow: a submitted transaction or a typed refusal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RentOutcome {
    Submitted { tx: Bytes32, paid: u128 },
    Refused(RentRefusal),
}

impl<'a> RentingEngine<'a> {
    pub fn new(
        ledger: &'a dyn RentingLedger,
        hub: Option<&'a dyn DeviceHub>,
        features: &'a FeatureCache,
    ) -> Self {
        Self {
            ledger,
            hub,
            features,
        }
    }

    pub(crate) async fn feature(
        &self,
        contract: Address,
        feature: Feature,
    ) -> Result<bool, EngineError> {
        Ok(self.features.has_feature(self.ledger, contract, feature).await?)
    }

    /// Rent the device for `args.seconds`, starting now or at `args.start`.
    ///
    /// Pre-flight: reconciled state, rentable guard, conflict check against
    /// the full booking list, price + deposit top-up.  ERC-20 rents approve
    /// the contract for the total before submitting; native rents attach it
    /// as value.  Refusals are values; `Err` means a collaborator failed.
    pub async fn rent(&self, device: &Device, args: RentArgs) -> Result<RentOutcome, EngineError> {
        let features = self.features.feature_set(self.ledger, device.contract).await?;
        if !features.renting {
            return Ok(RentOutcome::Refused(RentRefusal::RentingUnsupported));
        }

        let now = self.ledger.block_time().await?;
        let rent_from = args.start.unwrap_or(now);
        let rent_until = rent_from.saturating_add(args.seconds);

        let (state, price) = tokio::join!(
            self.renting_state(device, true),
            self.ledger.price(
                device.contract,
                device.id,
                device.user,
                args.seconds,
                device.token
            ),
        );
        let state = state?;
        let price = price?;

        let (deposit, stored) = if features.deposit {
            let (deposit, stored) = tokio::join!(
                self.ledger.deposit(
                    device.contract,
                    device.id,
                    device.user,
                    args.seconds,
                    device.token
                ),
                self.ledger.stored_deposit(device.contract, device.user, device.id),
            );
            (deposit?, stored?.amount)
        } else {
            (0, 0)
        };

        if !state.rentable {
            return Ok(RentOutcome::Refused(RentRefusal::NotRentable));
        }
        if let Some(conflict) = find_conflict(&state.states, device.user, rent_from, rent_until) {
            debug!(target: "renta::engine", url = %device.url, ?conflict, "rent refused");
            return Ok(RentOutcome::Refused(RentRefusal::Conflict(conflict)));
        }

        // All refusal paths come before the approve: a refused rent must not
        // leave a live allowance behind.
        let scheduled = args.start.is_some() || args.payer.is_some();
        if scheduled {
            if !features.rent_for {
                return Ok(RentOutcome::Refused(RentRefusal::RentForUnsupported));
            }
            // The booking list can be stale; the ledger re-checks atomically.
            if !self
                .ledger
                .can_be_rented(device.contract, device.id, device.user, rent_from, args.seconds)
                .await?
            {
                return Ok(RentOutcome::Refused(RentRefusal::DeviceAlreadyBooked));
            }
        }

        // An already stored deposit counts towards the required one.
        let to_pay = price + deposit.saturating_sub(stored);
        let payer = args.payer.unwrap_or(device.user);
        let native = device.token.is_zero();
        if !native {
            self.ledger
                .approve(device.token, payer, device.contract, to_pay)
                .await?;
        }
        let value = if native { to_pay } else { 0 };

        let tx = if scheduled {
            self.ledger
                .rent_for(
                    device.contract,
                    device.id,
                    args.seconds,
                    device.token,
                    device.user,
                    rent_from,
                    payer,
                    value,
                )
                .await?
        } else {
            self.ledger
                .rent(device.contract, device.id, args.seconds, device.token, device.user, value)
                .await?
        };

        info!(
            target: "renta::engine",
            url = %device.url,
            seconds = args.seconds,
            paid = to_pay,
            %tx,
            "rent submitted"
        );
        Ok(RentOutcome::Submitted { tx, paid: to_pay })
    }

    /// Whether `device.user` could rent right now: the device is rentable,
    /// is free or takes future bookings the user does not already hold, and
    /// the user is not its owner.
    pub async fn can_rent(
        &self,
        device: &Device,
        state: Option<&RentingState>,
    ) -> Result<bool, EngineError> {
        let fetched;
        let state = match state {
            Some(state) => state,
            None => {
                fetched = self.renting_state(device, true).await?;
                &fetched
            }
        };
        if !state.rentable {
            return Ok(false);
        }
        let holds_booking = state.states.iter().any(|s| s.controller == device.user);
        let bookable = state.free
            || (!holds_booking && self.feature(device.contract, Feature::RentFor).await?);
        if !bookable {
            return Ok(false);
        }
        let owner = self.ledger.device_owner(device.contract, device.id).await?;
        Ok(device.user != owner)
    }

    /// Whether `device.user` currently controls the active booking.
    pub async fn can_return(
        &self,
        device: &Device,
        state: Option<&RentingState>,
    ) -> Result<bool, EngineError> {
        let fetched;
        let state = match state {
            Some(state) => state,
            None => {
                fetched = self.renting_state(device, true).await?;
                &fetched
            }
        };
        Ok(state.controller == Some(device.user))
    }

    /// End the user's active booking.
    pub async fn return_object(&self, device: &Device) -> Result<(), EngineError> {
        self.ledger
            .return_object(device.contract, device.id, device.user)
            .await?;
        info!(target: "renta::engine", url = %device.url, "device returned");
        Ok(())
    }

    /// Remove the user's future booking starting at `start`.
    ///
    /// Returns `Ok(false)` without touching the ledger when the contract
    /// lacks the `rentFor` feature (there can be no future bookings).
    pub async fn remove_booking(&self, device: &Device, start: u64) -> Result<bool, EngineError> {
        if !self.feature(device.contract, Feature::RentFor).await? {
            return Ok(false);
        }
        self.ledger
            .remove_booking(device.contract, device.id, start, device.user)
            .await?;
        Ok(true)
    }

    /// Scan sibling units (same name digest, ascending counters starting at
    /// this device) for one that is rentable and free right now.
    ///
    /// Stops at the first counter the ledger does not know — device groups
    /// use contiguous counters — or after `max_steps` probes.
    pub async fn find_next_rentable(
        &self,
        device: &Device,
        max_steps: u64,
    ) -> Result<Option<Device>, EngineError> {
        let base = device.id.counter();
        for step in 0..max_steps {
            let sibling = device.sibling(base + step);
            match self.renting_state(&sibling, true).await {
                Ok(state) if state.rentable && state.free => return Ok(Some(sibling)),
                Ok(_) => continue,
                Err(EngineError::Ledger(LedgerError::Call { .. })) => break,
                Err(err) => return Err(err),
            }
        }
        Ok(None)
    }
}
