//! renta-config
//!
//! Layered YAML configuration.  Later documents override earlier ones key by
//! key; the merged result is hashed over its canonical JSON form so two
//! processes can cheaply agree they run the same effective configuration.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::fs;

use renta_types::{Address, Bytes32};

/// The merged configuration plus its identity hash.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config_hash: String,
    pub canonical_json: String,
    pub config_json: Value,
}

/// Read and merge YAML files in order; earlier paths are the base.
pub fn load_layered_yaml(paths: &[&str]) -> Result<LoadedConfig> {
    let mut docs: Vec<String> = Vec::new();
    for path in paths {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read yaml path: {path}"))?;
        docs.push(raw);
    }
    let doc_refs: Vec<&str> = docs.iter().map(|s| s.as_str()).collect();
    load_layered_yaml_from_strings(&doc_refs)
}

/// Merge YAML documents in order: earlier docs are base, later docs override.
pub fn load_layered_yaml_from_strings(yaml_docs: &[&str]) -> Result<LoadedConfig> {
    let mut merged = serde_json::json!({});
    for raw in yaml_docs {
        let v_yaml: serde_yaml::Value = serde_yaml::from_str(raw).context("invalid yaml")?;
        let v_json = serde_json::to_value(v_yaml).context("yaml->json conversion failed")?;
        merged = deep_merge(merged, v_json);
    }

    let canonical_json =
        serde_json::to_string(&merged).context("canonical json serialize failed")?;
    let config_hash = sha256_hex(canonical_json.as_bytes());
    Ok(LoadedConfig {
        config_hash,
        canonical_json,
        config_json: merged,
    })
}

fn deep_merge(a: Value, b: Value) -> Value {
    match (a, b) {
        (Value::Object(mut a_map), Value::Object(b_map)) => {
            for (k, b_val) in b_map {
                let a_val = a_map.remove(&k).unwrap_or(Value::Null);
                a_map.insert(k, deep_merge(a_val, b_val));
            }
            Value::Object(a_map)
        }
        (_, b_other) => b_other,
    }
}

fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

// ---------------------------------------------------------------------------
// Typed view
// ---------------------------------------------------------------------------

/// Name registry settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RegistryConfig {
    /// Root node all contract names hash under; zero when absent.
    pub root_node: Option<Bytes32>,
    /// Registry contract address, when a deployment pins one.
    pub resolver: Option<Address>,
}

/// External service endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServicesConfig {
    /// Message hub endpoint; no off-chain reads when absent.
    pub hub: Option<String>,
}

/// The typed configuration the CLI and engines consume.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub registry: RegistryConfig,
    pub services: ServicesConfig,
    /// Default payment token; zero / absent means native currency.
    pub default_token: Option<Address>,
}

impl Config {
    pub fn from_loaded(loaded: &LoadedConfig) -> Result<Config> {
        serde_json::from_value(loaded.config_json.clone()).context("invalid configuration shape")
    }

    pub fn root_node(&self) -> Bytes32 {
        self.registry.root_node.unwrap_or(Bytes32::ZERO)
    }

    pub fn default_token(&self) -> Address {
        self.default_token.unwrap_or(Address::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn later_documents_override_key_by_key() {
        let base = "registry:\n  rootNode: \"0x01\"\nservices:\n  hub: http://hub.local\n";
        let overlay = "services:\n  hub: http://other.local\n";
        let loaded = load_layered_yaml_from_strings(&[base, overlay]).unwrap();
        let config = Config::from_loaded(&loaded).unwrap();
        assert_eq!(config.services.hub.as_deref(), Some("http://other.local"));
        assert_eq!(config.root_node(), Bytes32::from_hex_padded("0x01").unwrap());
    }

    #[test]
    fn config_hash_is_stable_for_identical_layers() {
        let docs = ["defaultToken: \"0x0000000000000000000000000000000000000009\"\n"];
        let a = load_layered_yaml_from_strings(&docs).unwrap();
        let b = load_layered_yaml_from_strings(&docs).unwrap();
        assert_eq!(a.config_hash, b.config_hash);
        assert_eq!(a.config_hash.len(), 64);
    }

    #[test]
    fn overriding_a_value_changes_the_hash() {
        let base = "services:\n  hub: http://hub.local\n";
        let overlay = "services:\n  hub: http://other.local\n";
        let a = load_layered_yaml_from_strings(&[base]).unwrap();
        let b = load_layered_yaml_from_strings(&[base, overlay]).unwrap();
        assert_ne!(a.config_hash, b.config_hash);
    }

    #[test]
    fn defaults_apply_when_sections_are_missing() {
        let loaded = load_layered_yaml_from_strings(&["{}"]).unwrap();
        let config = Config::from_loaded(&loaded).unwrap();
        assert_eq!(config.root_node(), Bytes32::ZERO);
        assert_eq!(config.default_token(), Address::ZERO);
        assert_eq!(config.services.hub, None);
    }
}
