//! Layered configuration: built-in defaults, an optional YAML file and
//! `DOCWATCH_*` environment variables, in that order.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use docwatch_core_types::FrameIndex;
use interaction_capture::DEFAULT_DYNAMIC_REGION;
use perceiver_mutation::RuleTable;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

pub const ENV_PREFIX: &str = "DOCWATCH";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WatchConfig {
    /// Frame index stamped on every event; unset when absent.
    pub frame_index: Option<u32>,
    /// Rule table replacing the built-in one (`.yaml`, `.yml` or `.json`).
    pub rules_path: Option<PathBuf>,
    /// Class token of the region whose listeners are rebound on focus moves.
    pub dynamic_region: String,
    pub bus_capacity: usize,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            frame_index: None,
            rules_path: None,
            dynamic_region: DEFAULT_DYNAMIC_REGION.to_string(),
            bus_capacity: 1024,
        }
    }
}

impl WatchConfig {
    pub fn frameindex(&self) -> FrameIndex {
        FrameIndex::from(self.frame_index)
    }

    /// Loads the configured rule table, or the built-in one.
    pub fn rule_table(&self) -> Result<RuleTable> {
        match &self.rules_path {
            Some(path) => load_rules(path),
            None => Ok(RuleTable::builtin()),
        }
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    let mut path = dirs::config_dir()?;
    path.push("docwatch");
    path.push("config.yaml");
    Some(path)
}

pub fn load_config(config_path: Option<&Path>) -> Result<WatchConfig> {
    let path = match config_path {
        Some(path) => Some(path.to_path_buf()),
        None => default_config_path(),
    };

    let mut builder = Config::builder();
    if let Some(path) = &path {
        debug!(target: "docwatch.config", path = %path.display(), "reading config file");
        // An explicit --config must exist; the default location is optional.
        builder = builder.add_source(File::from(path.as_path()).required(config_path.is_some()));
    }
    let config = builder
        .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
        .build()
        .context("Failed to load configuration")?
        .try_deserialize::<WatchConfig>()
        .context("Failed to parse configuration")?;

    info!(
        target: "docwatch.config",
        frameindex = %config.frameindex(),
        region = %config.dynamic_region,
        custom_rules = config.rules_path.is_some(),
        "configuration loaded"
    );
    Ok(config)
}

pub fn load_rules(path: &Path) -> Result<RuleTable> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read rule table {}", path.display()))?;
    let table = match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => RuleTable::from_json_str(&raw),
        _ => RuleTable::from_yaml_str(&raw),
    }
    .with_context(|| format!("Invalid rule table {}", path.display()))?;
    info!(target: "docwatch.config", path = %path.display(), rules = table.len(), "rule table loaded");
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn explicit_file_overrides_defaults() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(file, "frame_index: 3\ndynamic_region: custom-stream").unwrap();

        let config = load_config(Some(file.path())).unwrap();
        assert_eq!(config.frameindex(), FrameIndex::Index(3));
        assert_eq!(config.dynamic_region, "custom-stream");
        assert_eq!(config.bus_capacity, 1024);
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_config(Some(&dir.path().join("absent.yaml"))).is_err());
    }

    #[test]
    fn rule_tables_load_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rules.json");
        std::fs::write(
            &path,
            r#"{"insert":[{"source":"x-card","label":"card-opened"}]}"#,
        )
        .unwrap();
        let table = load_rules(&path).unwrap();
        assert_eq!(table.len(), 1);

        let bad = dir.path().join("rules.yaml");
        std::fs::write(&bad, "insert:\n  - source: ''\n    label: nothing\n").unwrap();
        assert!(load_rules(&bad).is_err());
    }
}
