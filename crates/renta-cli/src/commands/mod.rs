//! Command handler modules for renta-cli.
//!
//! Shared parsing helpers live here; command logic lives in the submodules.

pub mod inspect;
pub mod resolver;

use anyhow::{Context, Result};

use renta_config::Config;
use renta_types::{Address, Bytes32};

/// Load and merge the `--config` layers; no layers means all defaults.
pub fn load_config(paths: &[String]) -> Result<Config> {
    if paths.is_empty() {
        return Ok(Config::default());
    }
    let path_refs: Vec<&str> = paths.iter().map(|s| s.as_str()).collect();
    let loaded = renta_config::load_layered_yaml(&path_refs)?;
    Config::from_loaded(&loaded)
}

/// Root node for derivation: the `--root` flag wins over the configuration.
pub fn effective_root(config: &Config, flag: Option<&str>) -> Result<Bytes32> {
    match flag {
        Some(hex) => Bytes32::from_hex_padded(hex).context("invalid --root value"),
        None => Ok(config.root_node()),
    }
}

/// Payment token: the `--token` flag wins over the configured default.
pub fn effective_token(config: &Config, flag: Option<&str>) -> Result<Address> {
    match flag {
        Some(hex) => hex.parse::<Address>().with_context(|| "invalid --token value"),
        None => Ok(config.default_token()),
    }
}

/// Parse an optional `--root` argument; absent means the zero node.
pub fn parse_root(root: Option<&str>) -> Result<Bytes32> {
    match root {
        Some(hex) => Bytes32::from_hex_padded(hex).context("invalid --root value"),
        None => Ok(Bytes32::ZERO),
    }
}

/// Parse an optional address argument; absent means the zero address.
pub fn parse_address(value: Option<&str>, flag: &str) -> Result<Address> {
    match value {
        Some(hex) => hex
            .parse::<Address>()
            .with_context(|| format!("invalid {flag} value")),
        None => Ok(Address::ZERO),
    }
}
