//! Device handle: everything the engine needs to act on one device for one
//! user in one payment token.

use renta_registry::ResolvedUrl;
use renta_types::{Address, DeviceId};

/// A resolved device plus the caller context every engine call shares.
///
/// `token` is the payment token for this session; the zero address means the
/// native currency.  The handle is cheap to clone and carries no connection
/// state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Device {
    /// The renting contract that manages the device.
    pub contract: Address,
    pub id: DeviceId,
    /// Canonical rental URL, used verbatim for hub read-state requests.
    pub url: String,
    /// The acting user (renter).
    pub user: Address,
    /// Payment token; [`Address::ZERO`] for native currency.
    pub token: Address,
}

impl Device {
    pub fn new(
        contract: Address,
        id: DeviceId,
        url: impl Into<String>,
        user: Address,
        token: Address,
    ) -> Self {
        Self {
            contract,
            id,
            url: url.into(),
            user,
            token,
        }
    }

    /// Build the handle from a resolver result.
    pub fn from_resolved(resolved: &ResolvedUrl, user: Address, token: Address) -> Self {
        Self::new(
            resolved.contract,
            resolved.parsed.device_id,
            resolved.url.clone(),
            user,
            token,
        )
    }

    /// The sibling unit with the same name digest and a different counter.
    ///
    /// Rewrites the URL's counter part so hub reads address the sibling.  A
    /// URL in resolved hex form is rewritten to the sibling's hex id.
    pub fn sibling(&self, counter: u64) -> Device {
        let id = self.id.with_counter(counter);
        let url = match self.url.split_once('@') {
            Some((front, contract)) => {
                let name = front.split_once('#').map_or(front, |(name, _)| name);
                if name.starts_with("0x") || name.starts_with("0X") {
                    format!("{id}@{contract}")
                } else if counter == 0 {
                    format!("{name}@{contract}")
                } else {
                    format!("{name}#{counter}@{contract}")
                }
            }
            None => self.url.clone(),
        };
        Device {
            id,
            url,
            ..self.clone()
        }
    }
}
