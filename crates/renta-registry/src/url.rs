//! Rental URL grammar.
//!
//! `^([\w-]+)(#[0-9]+)?@([\w-.]+)$` — a device name (optionally with a unit
//! counter) and a contract name.  Either side may be a `0x` hex literal
//! carrying an already-derived identifier.

use renta_types::{Bytes32, DeviceId};

use crate::derive;
use crate::error::RegistryError;

/// A URL split into its raw textual parts, not yet interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RawUrl<'a> {
    pub device: &'a str,
    pub counter: Option<&'a str>,
    pub contract: &'a str,
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

fn is_contract_char(c: char) -> bool {
    is_name_char(c) || c == '.'
}

/// Split a URL into device / counter / contract, enforcing the grammar.
pub(crate) fn split(url: &str) -> Option<RawUrl<'_>> {
    let (front, contract) = url.split_once('@')?;
    if contract.is_empty() || contract.contains('@') || !contract.chars().all(is_contract_char) {
        return None;
    }
    let (device, counter) = match front.split_once('#') {
        Some((device, counter)) => (device, Some(counter)),
        None => (front, None),
    };
    if device.is_empty() || !device.chars().all(is_name_char) {
        return None;
    }
    if let Some(counter) = counter {
        if counter.is_empty() || !counter.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
    }
    Some(RawUrl {
        device,
        counter,
        contract,
    })
}

pub(crate) fn is_hex_literal(part: &str) -> bool {
    part.starts_with("0x") || part.starts_with("0X")
}

/// A parsed rental URL with the identifiers it derives to.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedUrl {
    pub device_name: String,
    pub contract_name: String,
    pub counter: u32,
    pub device_id: DeviceId,
    pub node_id: Bytes32,
}

/// Parse a rental URL against the zero root node.
///
/// Pure and total over strings: anything that does not match the grammar
/// (including a malformed `0x` literal or an oversized counter) is `None`.
pub fn parse_url(url: &str) -> Option<ParsedUrl> {
    parse_url_with_root(url, Bytes32::ZERO)
}

/// Parse a rental URL, hashing the contract name under `root`.
pub fn parse_url_with_root(url: &str, root: Bytes32) -> Option<ParsedUrl> {
    let raw = split(url)?;
    let counter: u32 = match raw.counter {
        Some(digits) => digits.parse().ok()?,
        None => 0,
    };
    let device_id = if is_hex_literal(raw.device) {
        DeviceId::from(Bytes32::from_hex_padded(raw.device).ok()?)
    } else {
        derive::device_id(raw.device, counter)
    };
    let node_id = if is_hex_literal(raw.contract) {
        Bytes32::from_hex_padded(raw.contract).ok()?
    } else {
        derive::node_id(raw.contract, root)
    };
    Some(ParsedUrl {
        device_name: raw.device.to_string(),
        contract_name: raw.contract.to_string(),
        counter,
        device_id,
        node_id,
    })
}

/// Canonicalise a name-form URL: `device[#counter]@contract`, the contract
/// truncated at its first dot.  A zero counter is dropped.
///
/// URLs that already carry hex identifiers cannot be normalised back to
/// names; those fail with `url_already_resolved`.
pub fn normalize_url(url: &str) -> Result<String, RegistryError> {
    let raw = split(url).ok_or_else(|| RegistryError::InvalidUrl(url.to_string()))?;
    if is_hex_literal(raw.device) {
        return Err(RegistryError::AlreadyResolved {
            side: "device",
            url: url.to_string(),
        });
    }
    if is_hex_literal(raw.contract) {
        return Err(RegistryError::AlreadyResolved {
            side: "contract",
            url: url.to_string(),
        });
    }
    let counter: u32 = match raw.counter {
        Some(digits) => digits.parse().map_err(|_| RegistryError::WrongCounter {
            url: url.to_string(),
        })?,
        None => 0,
    };
    let base = raw
        .contract
        .split_once('.')
        .map_or(raw.contract, |(base, _)| base);
    if counter > 0 {
        Ok(format!("{}#{}@{}", raw.device, counter, base))
    } else {
        Ok(format!("{}@{}", raw.device, base))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_device_counter_and_contract() {
        let parsed = parse_url("bike#3@myCompany.usn").unwrap();
        assert_eq!(parsed.device_name, "bike");
        assert_eq!(parsed.counter, 3);
        assert_eq!(parsed.contract_name, "myCompany.usn");
        assert_eq!(parsed.device_id, derive::device_id("bike", 3));
        assert_eq!(parsed.node_id, derive::node_id("myCompany.usn", Bytes32::ZERO));
    }

    #[test]
    fn counter_defaults_to_zero() {
        let parsed = parse_url("bike@myCompany").unwrap();
        assert_eq!(parsed.counter, 0);
        assert_eq!(parsed.device_id.counter(), 0);
    }

    #[test]
    fn parse_is_deterministic() {
        assert_eq!(parse_url("bike#3@myCompany.usn"), parse_url("bike#3@myCompany.usn"));
    }

    #[test]
    fn rejects_malformed_urls() {
        for url in [
            "",
            "bike",
            "@myCompany",
            "bike@",
            "bike@@myCompany",
            "bike#@myCompany",
            "bike#x@myCompany",
            "bi ke@myCompany",
            "bike@my/Company",
            "bike#3",
        ] {
            assert!(parse_url(url).is_none(), "should reject {url:?}");
        }
    }

    #[test]
    fn rejects_oversized_counter() {
        assert!(parse_url("bike#4294967295@c").is_some());
        assert!(parse_url("bike#4294967296@c").is_none());
    }

    #[test]
    fn hex_literals_pass_through() {
        let parsed = parse_url("0x01@0x02").unwrap();
        assert_eq!(parsed.device_id, DeviceId::from(Bytes32::from_hex_padded("0x01").unwrap()));
        assert_eq!(parsed.node_id, Bytes32::from_hex_padded("0x02").unwrap());
        assert!(parse_url("0xzz@myCompany").is_none());
    }

    #[test]
    fn normalize_truncates_contract_and_keeps_counter() {
        assert_eq!(normalize_url("bike#3@myCompany.usn").unwrap(), "bike#3@myCompany");
        assert_eq!(normalize_url("bike@myCompany.usn").unwrap(), "bike@myCompany");
        assert_eq!(normalize_url("bike#0@myCompany").unwrap(), "bike@myCompany");
    }

    #[test]
    fn normalize_refuses_resolved_urls() {
        let err = normalize_url("0x01@myCompany").unwrap_err();
        assert_eq!(err.key(), "url_already_resolved");
        let err = normalize_url("bike@0x02").unwrap_err();
        assert_eq!(err.key(), "url_already_resolved");
    }

    #[test]
    fn normalize_flags_bad_urls() {
        assert_eq!(normalize_url("nope").unwrap_err().key(), "invalid_url");
        assert_eq!(
            normalize_url("bike#99999999999@c").unwrap_err().key(),
            "wrong_counter"
        );
    }
}
