//! Hub wire messages.
//!
//! JSON payloads tagged by `msgType`.  Timestamps are unix seconds.  Unknown
//! fields are ignored so hub-side protocol additions don't break decoding.

use serde::{Deserialize, Serialize};

use renta_types::{BookingInterval, PhysicalState};

/// Detached signature over a message, produced by the device or requester.
/// Carried opaquely; verification is the transport's concern, not ours.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Signature {
    pub message_hash: String,
    pub signature: String,
}

/// Request for the device's current state.
///
/// The signature is optional; a signed request from a user with access may
/// be answered with additional detail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadStateRequest {
    pub url: String,
    pub timestamp: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub msg_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<Signature>,
}

/// The device's self-reported state.
///
/// `states` is the device's full booking list including soft bookings not
/// (or never) committed to the ledger; `timestamp` is the device clock and
/// becomes the authoritative time oracle during reconciliation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadStateResponse {
    pub url: String,
    pub timestamp: u64,
    #[serde(default)]
    pub states: Vec<BookingInterval>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub physical_state: Option<PhysicalState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub msg_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<Signature>,
}

impl ReadStateResponse {
    /// Clock skew between the device and the caller, in seconds.
    ///
    /// Callers composing signed messages for this device should add the
    /// delta to their local clock so the device accepts the timestamp.
    pub fn time_delta(&self, local_now: u64) -> i64 {
        self.timestamp as i64 - local_now as i64
    }
}

/// Error reply from the hub or the device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub url: String,
    pub timestamp: u64,
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errkey: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub msg_id: Option<u64>,
}

/// Any message travelling between caller and hub, tagged by `msgType`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "msgType")]
pub enum HubMessage {
    #[serde(rename = "read")]
    Read(ReadStateRequest),
    #[serde(rename = "readResponse")]
    ReadResponse(ReadStateResponse),
    #[serde(rename = "error")]
    Error(ErrorResponse),
}
