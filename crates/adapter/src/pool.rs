//! Custom molecule pools loaded from JSON
//!
//! ```text
//! [{"name": "ethanol", "pattern": "CCO"}, {"name": "water", "pattern": "O"}]
//! ```

use std::env;
use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use log::info;
use serde::Deserialize;

use crate::core::{EngineConfig, PatternGraph};
use crate::types::Molecule;

#[derive(Debug, Deserialize)]
struct PoolEntry {
    name: String,
    pattern: String,
}

/// Parse a JSON pool; every pattern must contain at least one atom
pub fn parse_pool(json: &str) -> Result<Vec<Molecule>> {
    let entries: Vec<PoolEntry> = serde_json::from_str(json).context("invalid molecule pool")?;

    let mut pool = Vec::with_capacity(entries.len());
    for entry in entries {
        if PatternGraph::parse(&entry.pattern).is_empty() {
            bail!("molecule {:?} has no atoms in {:?}", entry.name, entry.pattern);
        }
        pool.push(Molecule::new(entry.name, entry.pattern));
    }
    Ok(pool)
}

pub fn load_pool_file(path: impl AsRef<Path>) -> Result<Vec<Molecule>> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read pool file {}", path.display()))?;
    let pool = parse_pool(&raw).with_context(|| format!("in {}", path.display()))?;
    info!("loaded {} molecules from {}", pool.len(), path.display());
    Ok(pool)
}

/// [`EngineConfig::from_env`] plus `MOLDROP_POOL`
pub fn config_from_env() -> Result<EngineConfig> {
    let mut config = EngineConfig::from_env();
    if let Ok(path) = env::var("MOLDROP_POOL") {
        if !path.trim().is_empty() {
            config = config.with_custom_pool(load_pool_file(path.trim())?);
        }
    }
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pool() {
        let pool = parse_pool(r#"[{"name":"ethanol","pattern":"CCO"},{"name":"water","pattern":"O"}]"#)
            .unwrap();
        assert_eq!(pool.len(), 2);
        assert_eq!(pool[0], Molecule::new("ethanol", "CCO"));
    }

    #[test]
    fn test_parse_pool_rejects_atomless_pattern() {
        let err = parse_pool(r#"[{"name":"nothing","pattern":"=()"}]"#).unwrap_err();
        assert!(err.to_string().contains("nothing"));
    }

    #[test]
    fn test_parse_pool_rejects_bad_json() {
        assert!(parse_pool("{\"name\":\"x\"}").is_err());
        assert!(parse_pool("[{\"name\":\"x\"}]").is_err());
    }

    #[test]
    fn test_empty_pool_is_accepted() {
        assert!(parse_pool("[]").unwrap().is_empty());
    }

    #[test]
    fn test_load_pool_file() {
        let path = env::temp_dir().join(format!("moldrop-pool-{}.json", std::process::id()));
        fs::write(&path, r#"[{"name":"acetone","pattern":"CC(=O)C"}]"#).unwrap();
        let pool = load_pool_file(&path).unwrap();
        fs::remove_file(&path).ok();
        assert_eq!(pool[0].name, "acetone");

        assert!(load_pool_file(env::temp_dir().join("moldrop-missing.json")).is_err());
    }
}
