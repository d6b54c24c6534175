//! Persisted CLI settings
//!
//! Stored as JSON in `<config dir>/dspbp/env.json`. Unset keys fall back to
//! their defaults; setting a key to the empty string clears it.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::blueprint::{DecodeOptions, TrailingPolicy};
use crate::error::{Error, Result};

/// `(key, description)` for every setting
pub const KEYS: &[(&str, &str)] = &[
    ("root", "Blueprint root directory searched when no input is given"),
    ("strict_trailing", "Reject payloads with bytes after the last building (true/false)"),
    ("hasher", "Program that prints the blueprint hash of the text on its stdin"),
];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root: Option<PathBuf>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub strict_trailing: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hasher: Option<PathBuf>,
}

impl Config {
    /// Location of the settings file
    pub fn path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("dspbp")
            .join("env.json")
    }

    /// Where the game keeps blueprints by default
    pub fn default_root() -> PathBuf {
        dirs::document_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."))
            .join("Dyson Sphere Program")
            .join("Blueprint")
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::path())
    }

    /// Missing file yields the defaults
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No settings at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)?;
        serde_json::from_str(&text).map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::path())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        debug!("Saved settings to {}", path.display());
        Ok(())
    }

    /// Set `key` from its text form; an empty value resets it
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let value = value.trim();
        match key {
            "root" => self.root = (!value.is_empty()).then(|| PathBuf::from(value)),
            "hasher" => self.hasher = (!value.is_empty()).then(|| PathBuf::from(value)),
            "strict_trailing" => {
                self.strict_trailing = match value {
                    "" | "false" | "0" => false,
                    "true" | "1" => true,
                    other => return Err(Error::Config(format!("strict_trailing: expected true or false, got {:?}", other))),
                }
            }
            other => return Err(Error::Config(format!("unknown setting {:?}", other))),
        }
        Ok(())
    }

    /// Parse and apply a `key:value` pair
    pub fn apply(&mut self, pair: &str) -> Result<()> {
        let (key, value) = pair
            .split_once(':')
            .ok_or_else(|| Error::Config(format!("expected key:value, got {:?}", pair)))?;
        self.set(key.trim(), value)
    }

    /// Current value of `key` as text, `None` when unset
    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "root" => self.root.as_ref().map(|p| p.display().to_string()),
            "hasher" => self.hasher.as_ref().map(|p| p.display().to_string()),
            "strict_trailing" => Some(self.strict_trailing.to_string()),
            _ => None,
        }
    }

    pub fn root_or_default(&self) -> PathBuf {
        self.root.clone().unwrap_or_else(Self::default_root)
    }

    pub fn decode_options(&self) -> DecodeOptions {
        DecodeOptions {
            trailing: if self.strict_trailing { TrailingPolicy::Strict } else { TrailingPolicy::Lenient },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("dspbp-config-{}-{}", std::process::id(), name))
            .join("env.json")
    }

    #[test]
    fn test_set_and_clear() {
        let mut config = Config::default();
        config.apply("root:/tmp/blueprints").unwrap();
        config.apply("strict_trailing:true").unwrap();
        assert_eq!(config.root, Some(PathBuf::from("/tmp/blueprints")));
        assert_eq!(config.decode_options(), DecodeOptions::strict());

        config.apply("root:").unwrap();
        config.set("strict_trailing", "").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.root_or_default(), Config::default_root());
    }

    #[test]
    fn test_rejects_bad_input() {
        let mut config = Config::default();
        assert!(matches!(config.apply("nocolon"), Err(Error::Config(_))));
        assert!(matches!(config.set("colour", "red"), Err(Error::Config(_))));
        assert!(matches!(config.set("strict_trailing", "maybe"), Err(Error::Config(_))));
    }

    #[test]
    fn test_windows_path_value() {
        let mut config = Config::default();
        config.apply(r"root:C:\Users\me\Blueprint").unwrap();
        assert_eq!(config.get("root").as_deref(), Some(r"C:\Users\me\Blueprint"));
    }

    #[test]
    fn test_save_and_load() {
        let path = scratch("roundtrip");
        let mut config = Config::default();
        config.set("hasher", "/usr/local/bin/bphash").unwrap();
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.get("strict_trailing").as_deref(), Some("false"));

        if let Some(dir) = path.parent() {
            let _ = std::fs::remove_dir_all(dir);
        }
    }

    #[test]
    fn test_missing_file_is_default() {
        let loaded = Config::load_from(&scratch("missing")).unwrap();
        assert_eq!(loaded, Config::default());
    }
}
