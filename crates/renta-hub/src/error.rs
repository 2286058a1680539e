//! Hub boundary errors.
//!
//! Every error renders as `ERRKEY: <key> : <message>` so upstream layers can
//! branch on the key without matching prose.

use std::fmt;

/// Errors a [`crate::DeviceHub`] implementation may return.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HubError {
    /// No hub endpoint is configured for this process.
    NotConfigured,
    /// Network or transport failure reaching the hub.
    Transport(String),
    /// The hub answered with a non-success HTTP status.
    Status { code: u16, body: String },
    /// The hub delivered the message but the device (or hub) replied with an
    /// error message.  `errkey` is the device's own key when it sent one.
    Device {
        errkey: Option<String>,
        message: String,
    },
    /// The hub answered with an empty message list.
    EmptyResponse,
    /// A payload could not be decoded, or the message type was not the one
    /// the request calls for.
    Decode(String),
}

impl HubError {
    /// Stable machine key for branching.
    pub fn key(&self) -> &str {
        match self {
            HubError::NotConfigured => "config_no_hub",
            HubError::Device {
                errkey: Some(key), ..
            } => key,
            _ => "message_failed",
        }
    }
}

impl fmt::Display for HubError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let key = self.key();
        match self {
            HubError::NotConfigured => {
                write!(f, "ERRKEY: {key} : no hub endpoint in the configuration")
            }
            HubError::Transport(msg) => {
                write!(f, "ERRKEY: {key} : error sending the message to the device: {msg}")
            }
            HubError::Status { code, body } => {
                write!(f, "ERRKEY: {key} : could not deliver message, status {code}: {body}")
            }
            HubError::Device { message, .. } => write!(f, "ERRKEY: {key} : {message}"),
            HubError::EmptyResponse => {
                write!(f, "ERRKEY: {key} : no response from the device")
            }
            HubError::Decode(msg) => write!(f, "ERRKEY: {key} : bad hub payload: {msg}"),
        }
    }
}

impl std::error::Error for HubError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn device_errkey_wins_over_generic_key() {
        let err = HubError::Device {
            errkey: Some("device_offline".to_string()),
            message: "no contact for 3h".to_string(),
        };
        assert_eq!(err.key(), "device_offline");
        assert_eq!(err.to_string(), "ERRKEY: device_offline : no contact for 3h");
    }

    #[test]
    fn transport_maps_to_message_failed() {
        let err = HubError::Transport("connection refused".to_string());
        assert_eq!(err.key(), "message_failed");
    }
}
