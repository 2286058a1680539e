//! renta-types
//!
//! Shared plain types for the rental reconciliation engine: fixed-width
//! on-ledger identifiers and the renting-state snapshot model.
//!
//! Everything here is pure data — no IO, no async, no collaborator calls.

pub mod ids;
pub mod state;

pub use ids::{Address, Bytes32, DeviceId, HexParseError};
pub use state::{BookingInterval, DeviceDomain, PhysicalState, RentingState};
