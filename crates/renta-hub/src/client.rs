//! Hub client: trait + HTTP implementation.

use tracing::debug;

use crate::error::HubError;
use crate::messages::{HubMessage, ReadStateRequest, ReadStateResponse};

/// Off-chain message transport to a device hub.
///
/// Object-safe and `Send + Sync`: the engine holds a `&dyn DeviceHub`.
/// Implementations perform no retries and impose their own timeouts; the
/// engine treats a read-state failure as "no off-chain truth available".
#[async_trait::async_trait]
pub trait DeviceHub: Send + Sync {
    /// Ask the device behind `url` for its current state.
    async fn read_state(&self, url: &str) -> Result<ReadStateResponse, HubError>;
}

/// HTTP hub client: POSTs JSON messages to a single hub endpoint.
#[derive(Debug, Clone)]
pub struct HttpDeviceHub {
    endpoint: String,
    http: reqwest::Client,
}

impl HttpDeviceHub {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            http: reqwest::Client::new(),
        }
    }

    /// Build the client from an optional configured endpoint.
    pub fn from_config(endpoint: Option<&str>) -> Result<Self, HubError> {
        match endpoint {
            Some(e) if !e.trim().is_empty() => Ok(Self::new(e.trim())),
            _ => Err(HubError::NotConfigured),
        }
    }

    fn now_unix() -> u64 {
        chrono::Utc::now().timestamp().max(0) as u64
    }

    /// Unwrap the hub's reply into the one device message it carries.
    ///
    /// Hubs may answer with a single message or with a list (relay traces,
    /// error echoes).  In a list, the first non-error device message wins;
    /// otherwise the first error message is surfaced.
    fn select_message(body: serde_json::Value) -> Result<HubMessage, HubError> {
        let candidates: Vec<serde_json::Value> = match body {
            serde_json::Value::Array(items) => {
                if items.is_empty() {
                    return Err(HubError::EmptyResponse);
                }
                items
            }
            single => vec![single],
        };

        let mut first_error: Option<HubMessage> = None;
        for item in candidates {
            match serde_json::from_value::<HubMessage>(item) {
                Ok(HubMessage::Error(err)) => {
                    first_error.get_or_insert(HubMessage::Error(err));
                }
                Ok(msg) => return Ok(msg),
                // Skip relay noise that is not a protocol message.
                Err(_) => continue,
            }
        }
        first_error.ok_or_else(|| HubError::Decode("no protocol message in reply".to_string()))
    }
}

#[async_trait::async_trait]
impl DeviceHub for HttpDeviceHub {
    async fn read_state(&self, url: &str) -> Result<ReadStateResponse, HubError> {
        let request = HubMessage::Read(ReadStateRequest {
            url: url.to_string(),
            timestamp: Self::now_unix(),
            msg_id: None,
            signature: None,
        });
        debug!(target: "renta::hub", %url, endpoint = %self.endpoint, "read-state request");

        let response = self
            .http
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| HubError::Transport(e.to_string()))?;

        let status = response.status();
        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| HubError::Decode(e.to_string()))?;

        if !status.is_success() {
            return Err(HubError::Status {
                code: status.as_u16(),
                body: body.to_string(),
            });
        }

        match Self::select_message(body)? {
            HubMessage::ReadResponse(state) => {
                debug!(
                    target: "renta::hub",
                    %url,
                    timestamp = state.timestamp,
                    states = state.states.len(),
                    "read-state response"
                );
                Ok(state)
            }
            HubMessage::Error(err) => Err(HubError::Device {
                errkey: err.errkey,
                message: err.error,
            }),
            HubMessage::Read(_) => {
                Err(HubError::Decode("hub echoed the read request".to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn select_prefers_device_message_over_error() {
        let body = json!([
            {
                "msgType": "error",
                "url": "a@b",
                "timestamp": 1,
                "error": "relay hiccup"
            },
            {
                "msgType": "readResponse",
                "url": "a@b",
                "timestamp": 2,
                "states": []
            }
        ]);
        let msg = HttpDeviceHub::select_message(body).unwrap();
        assert!(matches!(msg, HubMessage::ReadResponse(_)));
    }

    #[test]
    fn select_surfaces_error_when_no_device_message() {
        let body = json!([
            {
                "msgType": "error",
                "url": "a@b",
                "timestamp": 1,
                "error": "device unreachable",
                "errkey": "device_offline"
            }
        ]);
        let msg = HttpDeviceHub::select_message(body).unwrap();
        let HubMessage::Error(err) = msg else {
            panic!("expected error message");
        };
        assert_eq!(err.errkey.as_deref(), Some("device_offline"));
    }

    #[test]
    fn select_rejects_empty_list() {
        assert_eq!(
            HttpDeviceHub::select_message(json!([])),
            Err(HubError::EmptyResponse)
        );
    }

    #[test]
    fn select_skips_non_protocol_noise() {
        let body = json!([
            { "relay": "trace-1" },
            { "msgType": "readResponse", "url": "a@b", "timestamp": 7 }
        ]);
        let msg = HttpDeviceHub::select_message(body).unwrap();
        assert!(matches!(msg, HubMessage::ReadResponse(_)));
    }

    #[test]
    fn from_config_requires_endpoint() {
        assert_eq!(
            HttpDeviceHub::from_config(None).unwrap_err(),
            HubError::NotConfigured
        );
        assert_eq!(
            HttpDeviceHub::from_config(Some("  ")).unwrap_err(),
            HubError::NotConfigured
        );
        assert!(HttpDeviceHub::from_config(Some("http://hub.local/msg")).is_ok());
    }
}
