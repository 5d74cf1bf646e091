use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File name of the default config, looked up next to the executable.
pub const CONFIG_FILE_NAME: &str = "tzfix.json";

/// Run behavior for the timezone rewrite.
///
/// Every field has a default, so a config file only needs the keys it changes.
///
/// ```rust
/// use tzfix::config::{Config, GatePolicy};
///
/// let config: Config = serde_json::from_str(r#"{ "gate_policy": "own_value" }"#).unwrap();
/// assert_eq!(config.gate_policy, GatePolicy::OwnValue);
/// assert!(!config.dry_run);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Which tag value gates the write to `OffsetTime`.
    pub gate_policy: GatePolicy,
    /// Leave files with no applied tag untouched instead of rewriting them.
    pub skip_unchanged: bool,
    /// Copy each original to `<name>.<ext>.bak` before replacing it.
    pub backup_originals: bool,
    /// Follow symbolic links while scanning the photo directory.
    pub follow_links: bool,
    /// Reject offsets that are not in the `±HH:MM` form.
    pub require_canonical_offsets: bool,
    /// Verify and serialize, but never write to disk.
    pub dry_run: bool,
}

/// Which existing value must equal the expected offset before `OffsetTime` is written.
///
/// `OffsetTimeDigitized` and `OffsetTimeOriginal` are always gated on their own value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GatePolicy {
    /// `OffsetTime` is written when `OffsetTimeDigitized` matches.
    Digitized,
    /// `OffsetTime` is written when its own value matches.
    OwnValue,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            gate_policy: GatePolicy::Digitized,
            skip_unchanged: false,
            backup_originals: false,
            follow_links: true,
            require_canonical_offsets: false,
            dry_run: false,
        }
    }
}

impl Config {
    /// Resolve the config file path — same directory as the executable.
    pub fn config_path() -> Result<PathBuf> {
        let exe_path = std::env::current_exe().context("Failed to get executable path")?;
        let exe_dir = exe_path
            .parent()
            .context("Failed to get executable directory")?;
        Ok(exe_dir.join(CONFIG_FILE_NAME))
    }

    /// Load config from the given path, or from the default location.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::config_path()?,
        };

        if !config_path.exists() {
            // Only an explicitly requested file is worth a warning
            if path.is_some() {
                log::warn!(
                    "Config file not found at {}. Using defaults.",
                    config_path.display()
                );
            }
            return Ok(Self::default());
        }

        let contents =
            std::fs::read_to_string(&config_path).context("Failed to read config file")?;
        let config: Config =
            serde_json::from_str(&contents).context("Failed to parse config file")?;
        log::debug!("Loaded config from {}", config_path.display());
        Ok(config)
    }

    /// Save config to the given path, or to the default location.
    pub fn save(&self, path: Option<&Path>) -> Result<PathBuf> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::config_path()?,
        };

        let contents = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(&config_path, contents).context("Failed to write config file")?;
        log::info!("Config saved to {}", config_path.display());
        Ok(config_path)
    }
}
