//! On-ledger name resolution.

use renta_ledger::{LedgerError, RentingLedger};
use renta_types::{Address, Bytes32, DeviceId};

use crate::derive;
use crate::error::RegistryError;
use crate::url::{self, ParsedUrl};

/// A URL resolved to its on-ledger contract address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedUrl {
    pub parsed: ParsedUrl,
    /// The URL in canonical `device[#counter]@contract` form.
    pub url: String,
    /// The renting contract behind the name.
    pub contract: Address,
}

/// Resolve a rental URL to a contract address via the registry.
///
/// Unlike [`crate::parse_url`], malformed `0x` literals and oversized
/// counters surface as typed errors here so callers can report which part
/// of the URL is wrong.
pub async fn resolve_url(
    ledger: &dyn RentingLedger,
    root: Bytes32,
    url: &str,
) -> Result<ResolvedUrl, RegistryError> {
    let raw = url::split(url).ok_or_else(|| RegistryError::InvalidUrl(url.to_string()))?;

    let counter: u32 = match raw.counter {
        Some(digits) => digits.parse().map_err(|_| RegistryError::WrongCounter {
            url: url.to_string(),
        })?,
        None => 0,
    };

    let device_id = if url::is_hex_literal(raw.device) {
        DeviceId::from(Bytes32::from_hex_padded(raw.device).map_err(|_| {
            RegistryError::InvalidId {
                field: "deviceId",
                value: raw.device.to_string(),
            }
        })?)
    } else {
        derive::device_id(raw.device, counter)
    };

    let node_id = if url::is_hex_literal(raw.contract) {
        Bytes32::from_hex_padded(raw.contract).map_err(|_| RegistryError::InvalidId {
            field: "node",
            value: raw.contract.to_string(),
        })?
    } else {
        derive::node_id(raw.contract, root)
    };

    let contract = ledger.resolve_addr(node_id).await.map_err(|err| match err {
        LedgerError::Decode(msg) => RegistryError::InvalidAddress(msg),
        other => RegistryError::Ledger(other),
    })?;
    if contract.is_zero() {
        return Err(RegistryError::NameNotRegistered {
            name: raw.contract.to_string(),
        });
    }

    let canonical = match counter {
        0 => format!("{}@{}", raw.device, raw.contract),
        n => format!("{}#{}@{}", raw.device, n, raw.contract),
    };

    Ok(ResolvedUrl {
        parsed: ParsedUrl {
            device_name: raw.device.to_string(),
            contract_name: raw.contract.to_string(),
            counter,
            device_id,
            node_id,
        },
        url: canonical,
        contract,
    })
}
