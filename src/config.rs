//! Engine configuration
//!
//! TOML-backed settings for the CP engine's tunable knobs. Defaults match
//! the production values; the file is optional and everything works
//! without one.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Tunable settings for the omniPD engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Samples accepted per selection window. Production value is 1;
    /// kept configurable as an extension point.
    pub values_per_window: usize,

    /// Target duration of the forced sprint point, seconds
    pub sprint_target_secs: f64,

    /// Percentile the selection search starts from
    pub start_percentile: u8,

    /// Minimum points required before a fit is attempted
    pub min_points: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            values_per_window: 1,
            sprint_target_secs: 1.0,
            start_percentile: 100,
            min_points: 4,
        }
    }
}

impl EngineConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        let config: EngineConfig = toml::from_str(&content)
            .with_context(|| format!("parsing config file {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration as TOML, creating parent directories as needed.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating config directory {}", parent.display()))?;
        }
        let content = toml::to_string_pretty(self).context("serializing config")?;
        fs::write(path, content)
            .with_context(|| format!("writing config file {}", path.display()))?;
        Ok(())
    }

    /// Load from an explicit path, or from the default location if one
    /// exists there, or fall back to defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => match Self::default_path() {
                Some(p) if p.exists() => Self::load(&p),
                _ => Ok(Self::default()),
            },
        }
    }

    /// Platform config location: `<config_dir>/omnipd/config.toml`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("omnipd").join("config.toml"))
    }

    /// Check the invariants the engine relies on. Runs on every file
    /// load; callers constructing a config in code get the same check at
    /// the start of a computation.
    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            self.values_per_window >= 1,
            "values_per_window must be at least 1"
        );
        anyhow::ensure!(
            self.sprint_target_secs > 0.0,
            "sprint_target_secs must be positive"
        );
        anyhow::ensure!(
            self.start_percentile <= 100,
            "start_percentile must be at most 100"
        );
        anyhow::ensure!(self.min_points >= 2, "min_points must be at least 2");
        Ok(())
    }
}
