//! Renting-state snapshot model.
//!
//! [`RentingState`] is the reconciled view over the two external sources of
//! truth (ledger + off-chain hub).  It is fetched fresh per call and never
//! cached: both sources are continuously mutated by other actors, so stale
//! reads are expected and re-checked at commit time.

use serde::{Deserialize, Serialize};

use crate::ids::Address;

/// One booked interval, half-open `[rented_from, rented_until)`.
///
/// Invariants for committed intervals: `rented_from < rented_until` and
/// `controller` is non-zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingInterval {
    pub controller: Address,
    pub rented_from: u64,
    pub rented_until: u64,
}

impl BookingInterval {
    pub fn new(controller: Address, rented_from: u64, rented_until: u64) -> Self {
        Self {
            controller,
            rented_from,
            rented_until,
        }
    }

    /// Half-open overlap test: `[a0,a1)` overlaps `[b0,b1)` iff
    /// `a1 > b0 && a0 < b1`.  Touching intervals (`a1 == b0`) do NOT overlap.
    pub fn overlaps_range(&self, from: u64, until: u64) -> bool {
        until > self.rented_from && from < self.rented_until
    }

    pub fn overlaps(&self, other: &BookingInterval) -> bool {
        self.overlaps_range(other.rented_from, other.rented_until)
    }

    /// Whether `now` falls inside this interval.
    pub fn is_active_at(&self, now: u64) -> bool {
        self.rented_from <= now && now < self.rented_until
    }
}

/// Live physical device state as self-reported through the hub.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhysicalState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub internal_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<DeviceDomain>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<u64>,
}

/// Device type and service list, part of [`PhysicalState`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceDomain {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub services: Vec<String>,
}

/// The reconciled renting view for one device, as of `timestamp`.
///
/// `states` is the authoritative interval list for conflict checks; it
/// carries no ordering guarantee and must be scanned, not bisected.
/// After reconciliation `free == (rented_until == 0)` always holds —
/// `free` is derived, never fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RentingState {
    pub rentable: bool,
    pub open: bool,
    pub free: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub controller: Option<Address>,
    pub rented_until: u64,
    pub rented_from: u64,
    pub states: Vec<BookingInterval>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub physical_state: Option<PhysicalState>,
    /// The time oracle the projection was computed against (hub timestamp
    /// when the hub answered, ledger block time otherwise).
    pub timestamp: u64,
}
