//! Offline resolver commands.

use anyhow::{bail, Result};

use renta_registry as registry;

use super::parse_root;

pub fn parse(url: &str, root: Option<&str>) -> Result<()> {
    let root = parse_root(root)?;
    match registry::parse_url_with_root(url, root) {
        Some(parsed) => {
            println!("{}", serde_json::to_string_pretty(&parsed)?);
            Ok(())
        }
        None => bail!("not a valid rental URL: {url}"),
    }
}

pub fn normalize(url: &str) -> Result<()> {
    println!("{}", registry::normalize_url(url)?);
    Ok(())
}

pub fn device_id(name: &str, counter: u32) -> Result<()> {
    println!("{}", registry::device_id(name, counter));
    Ok(())
}

pub fn node_id(name: &str, root: Option<&str>) -> Result<()> {
    let root = parse_root(root)?;
    println!("{}", registry::node_id(name, root));
    Ok(())
}

pub fn config_hash(paths: &[String]) -> Result<()> {
    let path_refs: Vec<&str> = paths.iter().map(|s| s.as_str()).collect();
    let loaded = renta_config::load_layered_yaml(&path_refs)?;
    println!("config_hash={}", loaded.config_hash);
    println!("{}", loaded.canonical_json);
    Ok(())
}
