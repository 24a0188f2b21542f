//! TOML-based planner configuration.
//!
//! Sections:
//! - `[slots]` minimum free-slot length
//! - `[weights]` priority tier multipliers
//! - `[breaks]` focus-session and break lengths
//! - `[learning]` load multiplier band and smoothing
//!
//! Configuration is stored at `~/.config/tempoplan/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::data_dir;
use crate::breaks::BreakPolicy;
use crate::error::ConfigError;
use crate::learning::LearningConfig;
use crate::planner::PlannerConfig;
use crate::slots::DEFAULT_MIN_SLOT_MINUTES;
use crate::weighting::WeightConfig;

/// Free-slot settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotsConfig {
    /// Gaps shorter than this are not offered as slots
    #[serde(default = "default_min_slot")]
    pub min_slot_minutes: u32,
    /// Annotate plans with rest breaks
    #[serde(default = "default_true")]
    pub insert_breaks: bool,
}

fn default_min_slot() -> u32 {
    DEFAULT_MIN_SLOT_MINUTES
}
fn default_true() -> bool {
    true
}

impl Default for SlotsConfig {
    fn default() -> Self {
        Self {
            min_slot_minutes: default_min_slot(),
            insert_breaks: default_true(),
        }
    }
}

/// Planner configuration.
///
/// Serialized to/from TOML at `<data_dir>/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub slots: SlotsConfig,
    #[serde(default)]
    pub weights: WeightConfig,
    #[serde(default)]
    pub breaks: BreakPolicy,
    #[serde(default)]
    pub learning: LearningConfig,
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };
        if key.is_empty() {
            return Err(unknown());
        }

        let mut parts = key.split('.').peekable();
        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_some() {
                current = current.get_mut(part).ok_or_else(unknown)?;
                continue;
            }

            let obj = current.as_object_mut().ok_or_else(unknown)?;
            let existing = obj.get(part).ok_or_else(unknown)?;

            let new_value = match existing {
                serde_json::Value::Bool(_) => serde_json::Value::Bool(
                    value
                        .parse::<bool>()
                        .map_err(|e| invalid(format!("expected true or false: {e}")))?,
                ),
                // Optional numbers (`learning.sample_window`)
                serde_json::Value::Number(_) | serde_json::Value::Null => {
                    if value.eq_ignore_ascii_case("none") {
                        serde_json::Value::Null
                    } else if let Ok(n) = value.parse::<u64>() {
                        serde_json::Value::Number(n.into())
                    } else if let Ok(n) = value.parse::<f64>() {
                        serde_json::Number::from_f64(n)
                            .map(serde_json::Value::Number)
                            .ok_or_else(|| invalid(format!("cannot parse '{value}' as number")))?
                    } else {
                        return Err(invalid(format!("cannot parse '{value}' as number")));
                    }
                }
                serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                    serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                }
                serde_json::Value::String(_) => serde_json::Value::String(value.into()),
            };

            obj.insert(part.to_string(), new_value);
            return Ok(());
        }

        Err(unknown())
    }

    /// Location of the config file.
    pub fn path() -> Result<PathBuf, ConfigError> {
        let dir = data_dir().map_err(|e| ConfigError::LoadFailed {
            path: PathBuf::from("config.toml"),
            message: e.to_string(),
        })?;
        Ok(dir.join("config.toml"))
    }

    /// Load from disk, writing the default file if none exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed or is
    /// invalid, or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::path()?;
        if path.exists() {
            Self::load_from(&path)
        } else {
            let cfg = Self::default();
            cfg.save_to(&path)?;
            Ok(cfg)
        }
    }

    /// Load and validate the config file at `path`.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::LoadFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let cfg: Config =
            toml::from_str(&content).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Persist to the default location.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = self.to_toml()?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))
    }

    /// Render as pretty TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ParseFailed(e.to_string()))
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Null => Some("none".to_string()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by dot-separated key.
    ///
    /// The change is applied only if the resulting config is valid; the
    /// caller decides when to [`save`](Self::save).
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value cannot be parsed
    /// or fails validation.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json =
            serde_json::to_value(&*self).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// Check every section for out-of-range values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let from_validation = |e: crate::error::ValidationError| ConfigError::InvalidValue {
            key: match &e {
                crate::error::ValidationError::InvalidValue { field, .. } => field.clone(),
                _ => "config".to_string(),
            },
            message: e.to_string(),
        };
        if self.slots.min_slot_minutes == 0 {
            return Err(ConfigError::InvalidValue {
                key: "slots.min_slot_minutes".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        self.weights.validate().map_err(from_validation)?;
        self.breaks.validate().map_err(from_validation)?;
        self.learning.validate()
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        match Self::load() {
            Ok(cfg) => cfg,
            Err(e) => {
                tracing::warn!(error = %e, "falling back to default configuration");
                Self::default()
            }
        }
    }

    /// Planner settings derived from this config.
    pub fn planner_config(&self) -> PlannerConfig {
        PlannerConfig {
            min_slot_minutes: self.slots.min_slot_minutes,
            weights: self.weights,
            breaks: self.breaks,
            insert_breaks: self.slots.insert_breaks,
        }
    }
}
