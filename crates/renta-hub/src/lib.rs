//! renta-hub
//!
//! Off-chain hub collaborator boundary: the message protocol spoken with a
//! device hub and the HTTP client that speaks it.
//!
//! The hub fronts the physical device and is the source of truth for live
//! state and pending/soft bookings.  It is an *optional* collaborator: the
//! reconciliation engine degrades to ledger-only truth when a read fails,
//! so the client here reports failures faithfully and leaves the swallowing
//! to the engine.

pub mod client;
pub mod error;
pub mod messages;

pub use client::{DeviceHub, HttpDeviceHub};
pub use error::HubError;
pub use messages::{ErrorResponse, HubMessage, ReadStateRequest, ReadStateResponse, Signature};
