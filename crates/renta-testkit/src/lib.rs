//! renta-testkit
//!
//! Deterministic in-memory collaborator doubles for engine and resolver
//! tests: a [`FixtureLedger`] implementing the full ledger surface against
//! declarative per-device fixtures, and a [`FixtureHub`] answering read-state
//! requests with a canned reply or a canned failure.
//!
//! The fixture's rent-rule simulation mirrors the contract arithmetic the
//! price validator assumes, so a quote the validator accepts must simulate
//! to error code 0 against the same fixture.

mod fixture;
mod hub;
mod ledger;

pub use fixture::{FixtureBalance, FixtureDevice, LedgerFixture};
pub use hub::FixtureHub;
pub use ledger::{DeviceFixture, FixtureLedger, RentRecord};
