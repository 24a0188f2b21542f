//! Capacity learning per mood.
//!
//! Each closed day contributes its completion ratio (completed / assigned
//! minutes) to a running average for the day's mood. The average, clamped to
//! a configurable band, becomes the multiplier applied to the next day's
//! scheduling budget for that mood.

mod store;

pub use store::{LearningStore, MemoryLearningStore, UnavailableStore};

use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, CoreError, Result, StorageError};
use crate::task::MoodType;

/// Persisted statistics for one mood.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearningRecord {
    pub mood: MoodType,
    /// Number of days observed
    pub sample_count: u64,
    /// Running mean of completed / assigned minutes
    pub average_completion_ratio: f64,
    /// When the record was last folded
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl LearningRecord {
    /// Record for a mood with no history.
    pub fn empty(mood: MoodType) -> Self {
        Self {
            mood,
            sample_count: 0,
            average_completion_ratio: 0.0,
            updated_at: None,
        }
    }

    /// Fold one day's ratio into the running mean.
    ///
    /// With a `sample_window`, the divisor stops growing at the window size,
    /// so old days fade out instead of freezing the average.
    pub fn folded(&self, ratio: f64, sample_window: Option<u64>, at: DateTime<Utc>) -> Self {
        let divisor = match sample_window {
            Some(window) if window > 0 => (self.sample_count + 1).min(window),
            _ => self.sample_count + 1,
        };
        let average =
            self.average_completion_ratio + (ratio - self.average_completion_ratio) / divisor as f64;
        Self {
            mood: self.mood,
            sample_count: self.sample_count + 1,
            average_completion_ratio: average,
            updated_at: Some(at),
        }
    }
}

/// Band and smoothing for the load multiplier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LearningConfig {
    #[serde(default = "default_min_multiplier")]
    pub min_multiplier: f64,
    #[serde(default = "default_max_multiplier")]
    pub max_multiplier: f64,
    /// Returned when a mood has no history or storage is unavailable
    #[serde(default = "default_neutral_multiplier")]
    pub neutral_multiplier: f64,
    /// Cap on the running-mean divisor; unbounded when absent
    #[serde(default)]
    pub sample_window: Option<u64>,
}

fn default_min_multiplier() -> f64 {
    0.5
}
fn default_max_multiplier() -> f64 {
    1.0
}
fn default_neutral_multiplier() -> f64 {
    1.0
}

impl Default for LearningConfig {
    fn default() -> Self {
        Self {
            min_multiplier: default_min_multiplier(),
            max_multiplier: default_max_multiplier(),
            neutral_multiplier: default_neutral_multiplier(),
            sample_window: None,
        }
    }
}

impl LearningConfig {
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        let invalid = |key: &str, message: String| ConfigError::InvalidValue {
            key: format!("learning.{key}"),
            message,
        };
        let values = [self.min_multiplier, self.max_multiplier, self.neutral_multiplier];
        if values.iter().any(|v| !v.is_finite()) {
            return Err(invalid("multiplier", "multipliers must be finite".to_string()));
        }
        if self.min_multiplier <= 0.0 {
            return Err(invalid(
                "min_multiplier",
                format!("must be positive (got {})", self.min_multiplier),
            ));
        }
        if self.min_multiplier > self.max_multiplier {
            return Err(invalid(
                "min_multiplier",
                format!(
                    "must not exceed max_multiplier ({} > {})",
                    self.min_multiplier, self.max_multiplier
                ),
            ));
        }
        if self.neutral_multiplier <= 0.0 {
            return Err(invalid(
                "neutral_multiplier",
                format!("must be positive (got {})", self.neutral_multiplier),
            ));
        }
        if self.sample_window == Some(0) {
            return Err(invalid("sample_window", "must be at least 1".to_string()));
        }
        Ok(())
    }

    fn clamp(&self, ratio: f64) -> f64 {
        ratio.max(self.min_multiplier).min(self.max_multiplier)
    }
}

/// Reads and updates learning records through a [`LearningStore`].
///
/// Reads go straight to the store. Writes are serialized by `write_lock`, so
/// two day-closes for the same mood never lose an update.
#[derive(Debug)]
pub struct LearningModel<S> {
    store: S,
    config: LearningConfig,
    write_lock: Mutex<()>,
}

impl<S: LearningStore> LearningModel<S> {
    /// Model with the default band and no sample window.
    pub fn new(store: S) -> Self {
        Self {
            store,
            config: LearningConfig::default(),
            write_lock: Mutex::new(()),
        }
    }

    /// # Errors
    /// Returns [`ConfigError::InvalidValue`] for an inconsistent band.
    pub fn with_config(store: S, config: LearningConfig) -> std::result::Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            store,
            config,
            write_lock: Mutex::new(()),
        })
    }

    pub fn config(&self) -> &LearningConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Multiplier for the scheduling budget on a day with `mood`.
    ///
    /// Never fails: storage problems fall back to the neutral multiplier.
    pub fn calculate_adjusted_load(&self, mood: MoodType) -> f64 {
        match self.store.get_or_default(mood) {
            Ok(record) if record.sample_count == 0 => self.config.neutral_multiplier,
            Ok(record) => self.config.clamp(record.average_completion_ratio),
            Err(err) => {
                tracing::warn!(%mood, error = %err, "learning store unavailable, using neutral load");
                self.config.neutral_multiplier
            }
        }
    }

    /// Fold a closed day into the record for `mood`.
    ///
    /// Returns `Ok(None)` without touching storage when nothing was assigned.
    ///
    /// # Errors
    /// Propagates storage failures; the day's sample is then lost.
    pub fn record_day_stats(
        &self,
        mood: MoodType,
        assigned_minutes: u32,
        completed_minutes: u32,
    ) -> Result<Option<LearningRecord>> {
        if assigned_minutes == 0 {
            tracing::debug!(%mood, completed_minutes, "nothing assigned, day not recorded");
            return Ok(None);
        }
        let ratio = f64::from(completed_minutes) / f64::from(assigned_minutes);

        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| StorageError::Unavailable("learning write lock poisoned".to_string()))?;

        let window = self.config.sample_window;
        let updated = self
            .store
            .update(mood, &|current: LearningRecord| current.folded(ratio, window, Utc::now()))?;

        tracing::info!(
            %mood,
            ratio,
            samples = updated.sample_count,
            average = updated.average_completion_ratio,
            "recorded day stats"
        );
        Ok(Some(updated))
    }

    /// Records for every mood, defaulted where missing.
    pub fn snapshot(&self) -> Result<Vec<LearningRecord>> {
        MoodType::ALL
            .iter()
            .map(|mood| self.store.get_or_default(*mood).map_err(CoreError::from))
            .collect()
    }

    /// Forget all history.
    pub fn reset(&self) -> Result<()> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| StorageError::Unavailable("learning write lock poisoned".to_string()))?;
        self.store.clear()?;
        Ok(())
    }
}
