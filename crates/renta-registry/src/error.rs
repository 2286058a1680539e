//! Resolver errors.

use std::fmt;

use renta_ledger::LedgerError;

/// Errors raised while normalising or resolving a rental URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// The URL does not match `<device>[#<counter>]@<contract>`.
    InvalidUrl(String),
    /// The counter part is not a decimal number within `u32`.
    WrongCounter { url: String },
    /// A `0x` literal in the URL is not well-formed hex of the right width.
    InvalidId { field: &'static str, value: String },
    /// The registry answered with a malformed address.
    InvalidAddress(String),
    /// The registry holds no address for this name.
    NameNotRegistered { name: String },
    /// Normalisation was asked for, but the URL already carries resolved
    /// hex identifiers instead of names.
    AlreadyResolved { side: &'static str, url: String },
    /// The ledger lookup itself failed.
    Ledger(LedgerError),
}

impl RegistryError {
    /// Stable machine key for branching.
    pub fn key(&self) -> &'static str {
        match self {
            RegistryError::InvalidUrl(_) => "invalid_url",
            RegistryError::WrongCounter { .. } => "wrong_counter",
            RegistryError::InvalidId { .. } => "invalid_id",
            RegistryError::InvalidAddress(_) => "invalid_address",
            RegistryError::NameNotRegistered { .. } => "name_not_registered",
            RegistryError::AlreadyResolved { .. } => "url_already_resolved",
            RegistryError::Ledger(_) => "ledger_failed",
        }
    }
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let key = self.key();
        match self {
            RegistryError::InvalidUrl(url) => {
                write!(f, "ERRKEY: {key} : not a valid rental URL: {url}")
            }
            RegistryError::WrongCounter { url } => {
                write!(f, "ERRKEY: {key} : counter out of range in {url}")
            }
            RegistryError::InvalidId { field, value } => {
                write!(f, "ERRKEY: {key} : {field} is not a valid identifier: {value}")
            }
            RegistryError::InvalidAddress(msg) => {
                write!(f, "ERRKEY: {key} : registry returned a bad address: {msg}")
            }
            RegistryError::NameNotRegistered { name } => {
                write!(f, "ERRKEY: {key} : no address registered for {name}")
            }
            RegistryError::AlreadyResolved { side, url } => {
                write!(f, "ERRKEY: {key} : {side} is already an identifier in {url}")
            }
            RegistryError::Ledger(err) => write!(f, "ERRKEY: {key} : {err}"),
        }
    }
}

impl std::error::Error for RegistryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RegistryError::Ledger(err) => Some(err),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_leads_with_the_key() {
        let err = RegistryError::NameNotRegistered {
            name: "myCompany.usn".to_string(),
        };
        assert!(err.to_string().starts_with("ERRKEY: name_not_registered : "));
    }
}
