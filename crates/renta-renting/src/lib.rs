//! renta-renting
//!
//! The reconciliation engine.  Merges the ledger's committed bookings with
//! the device hub's self-reported state into one [`renta_types::RentingState`],
//! checks booking requests against it, validates prices and deposits by
//! replaying the ledger's own rent rules off-chain, and drives the rent
//! workflow.
//!
//! Recoverable outcomes (conflicts, failed validations) are values, not
//! errors: `Result::Err` here always means a collaborator failed.

mod conflict;
mod device;
mod engine;
mod error;
mod quote;
mod state;

pub use conflict::{find_conflict, ConflictReason};
pub use device::Device;
pub use engine::{RentArgs, RentOutcome, RentRefusal, RentingEngine};
pub use error::EngineError;
pub use quote::{
    InvalidReason, PostState, PrevState, RentCheck, RentCheckArgs, RentQuote, SimReason,
};
