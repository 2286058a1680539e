//! In-memory hub double.

use std::sync::Mutex;

use renta_hub::{DeviceHub, HubError, ReadStateResponse};
use renta_types::{BookingInterval, PhysicalState};

/// Canned [`DeviceHub`]: answers every read with the same state snapshot,
/// or fails every read with the same error.  Records the URLs it was asked
/// about.
#[derive(Debug)]
pub struct FixtureHub {
    reply: Result<ReadStateResponse, HubError>,
    reads: Mutex<Vec<String>>,
}

impl FixtureHub {
    /// Hub that reports `states` with the device clock at `timestamp`.
    pub fn answering(timestamp: u64, states: Vec<BookingInterval>) -> Self {
        Self {
            reply: Ok(ReadStateResponse {
                url: String::new(),
                timestamp,
                states,
                physical_state: None,
                msg_id: None,
                signature: None,
            }),
            reads: Mutex::new(Vec::new()),
        }
    }

    /// Hub that fails every read with `err`.
    pub fn failing(err: HubError) -> Self {
        Self {
            reply: Err(err),
            reads: Mutex::new(Vec::new()),
        }
    }

    pub fn with_physical_state(mut self, physical_state: PhysicalState) -> Self {
        if let Ok(reply) = &mut self.reply {
            reply.physical_state = Some(physical_state);
        }
        self
    }

    /// URLs read so far, in order.
    pub fn reads(&self) -> Vec<String> {
        self.reads.lock().expect("fixture hub poisoned").clone()
    }
}

#[async_trait::async_trait]
impl DeviceHub for FixtureHub {
    async fn read_state(&self, url: &str) -> Result<ReadStateResponse, HubError> {
        self.reads
            .lock()
            .expect("fixture hub poisoned")
            .push(url.to_string());
        match &self.reply {
            Ok(reply) => Ok(ReadStateResponse {
                url: url.to_string(),
                ..reply.clone()
            }),
            Err(err) => Err(err.clone()),
        }
    }
}
