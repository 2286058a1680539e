//! Name resolver: rental URLs, identifier derivation, on-ledger lookup.
//!
//! A rental URL names a device inside a contract's namespace:
//! `<device>[#<counter>]@<contract>`, e.g. `bike#3@myCompany.usn`.  Either
//! side may instead be a `0x` hex literal, in which case it is taken as the
//! already-derived identifier.  Parsing and derivation are pure; only
//! [`resolve_url`] touches the ledger.

mod derive;
mod error;
mod resolve;
mod url;

pub use derive::{device_id, name_digest, node_id};
pub use error::RegistryError;
pub use resolve::{resolve_url, ResolvedUrl};
pub use url::{normalize_url, parse_url, parse_url_with_root, ParsedUrl};
