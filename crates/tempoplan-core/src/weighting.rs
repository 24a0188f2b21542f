//! Task weight calculation.
//!
//! A weight is the priority tier multiplier plus a small urgency term that
//! favours shorter tasks inside the same tier:
//!
//! ```text
//! weight = tier_multiplier + mood_scale / (1 + estimated_minutes)
//! ```
//!
//! The urgency term is bounded by 0.5 (for positive durations and a scale of
//! at most 1), so it never lifts a task above the next tier. The mood scale is
//! applied uniformly to every task; it changes magnitudes but not ordering.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::task::{MoodType, Priority, Task};

/// Per-tier multipliers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightConfig {
    #[serde(default = "default_high")]
    pub high: f64,
    #[serde(default = "default_medium")]
    pub medium: f64,
    #[serde(default = "default_low")]
    pub low: f64,
}

fn default_high() -> f64 {
    3.0
}
fn default_medium() -> f64 {
    2.0
}
fn default_low() -> f64 {
    1.0
}

impl Default for WeightConfig {
    fn default() -> Self {
        Self {
            high: default_high(),
            medium: default_medium(),
            low: default_low(),
        }
    }
}

impl WeightConfig {
    pub fn multiplier(&self, priority: Priority) -> f64 {
        match priority {
            Priority::High => self.high,
            Priority::Medium => self.medium,
            Priority::Low => self.low,
        }
    }

    /// Tiers must be strictly ordered and at least one apart so that the
    /// urgency term cannot reorder them.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let finite = [self.high, self.medium, self.low].iter().all(|m| m.is_finite());
        if !finite || self.high - self.medium < 1.0 || self.medium - self.low < 1.0 || self.low <= 0.0 {
            return Err(ValidationError::InvalidValue {
                field: "weights".to_string(),
                message: format!(
                    "expected high > medium > low > 0 with gaps of at least 1 (got {}/{}/{})",
                    self.high, self.medium, self.low
                ),
            });
        }
        Ok(())
    }
}

/// Computes weights and the greedy placement order.
#[derive(Debug, Clone, Default)]
pub struct TaskWeigher {
    config: WeightConfig,
    mood_scales: HashMap<MoodType, f64>,
}

impl TaskWeigher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: WeightConfig) -> Self {
        Self {
            config,
            mood_scales: HashMap::new(),
        }
    }

    /// Scale the urgency term for `mood`; clamped to (0, 1].
    pub fn with_mood_scale(mut self, mood: MoodType, scale: f64) -> Self {
        let scale = if scale.is_finite() && scale > 0.0 {
            scale.min(1.0)
        } else {
            1.0
        };
        self.mood_scales.insert(mood, scale);
        self
    }

    pub fn config(&self) -> &WeightConfig {
        &self.config
    }

    pub fn compute_task_weight(&self, task: &Task, mood: Option<MoodType>) -> f64 {
        let scale = mood
            .and_then(|m| self.mood_scales.get(&m).copied())
            .unwrap_or(1.0);
        let urgency = scale / (1.0 + f64::from(task.estimated_minutes));
        self.config.multiplier(task.priority) + urgency
    }

    /// Stable sort, heaviest first. Equal weights keep their input order.
    pub fn sort_tasks_by_weight(&self, tasks: &[Task], mood: Option<MoodType>) -> Vec<Task> {
        let mut weighted: Vec<(f64, &Task)> = tasks
            .iter()
            .map(|t| (self.compute_task_weight(t, mood), t))
            .collect();
        weighted.sort_by(|a, b| b.0.total_cmp(&a.0));
        weighted.into_iter().map(|(_, t)| t.clone()).collect()
    }
}

/// Weight with the default tier multipliers.
pub fn compute_task_weight(task: &Task, mood: Option<MoodType>) -> f64 {
    TaskWeigher::new().compute_task_weight(task, mood)
}

/// Priority order with the default tier multipliers.
pub fn sort_tasks_by_weight(tasks: &[Task]) -> Vec<Task> {
    TaskWeigher::new().sort_tasks_by_weight(tasks, None)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(id: &str, priority: Priority, minutes: u32) -> Task {
        Task::new(id, id).with_priority(priority).with_minutes(minutes)
    }

    fn ids(tasks: &[Task]) -> Vec<&str> {
        tasks.iter().map(|t| t.id.as_str()).collect()
    }

    #[test]
    fn tier_dominates_duration() {
        let long_high = task("a", Priority::High, 480);
        let short_medium = task("b", Priority::Medium, 1);
        assert!(compute_task_weight(&long_high, None) > compute_task_weight(&short_medium, None));
    }

    #[test]
    fn shorter_first_within_tier() {
        let sorted = sort_tasks_by_weight(&[
            task("long", Priority::Medium, 90),
            task("short", Priority::Medium, 15),
            task("mid", Priority::Medium, 45),
        ]);
        assert_eq!(ids(&sorted), vec!["short", "mid", "long"]);
    }

    #[test]
    fn equal_weights_keep_input_order() {
        let sorted = sort_tasks_by_weight(&[
            task("first", Priority::Low, 30),
            task("second", Priority::Low, 30),
            task("top", Priority::High, 30),
            task("third", Priority::Low, 30),
        ]);
        assert_eq!(ids(&sorted), vec!["top", "first", "second", "third"]);
    }

    #[test]
    fn sorting_is_idempotent() {
        let tasks = vec![
            task("a", Priority::Low, 10),
            task("b", Priority::High, 60),
            task("c", Priority::Medium, 45),
            task("d", Priority::High, 60),
        ];
        let once = sort_tasks_by_weight(&tasks);
        let twice = sort_tasks_by_weight(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn mood_scale_keeps_ranking() {
        let tasks = vec![
            task("a", Priority::Low, 10),
            task("b", Priority::Medium, 120),
            task("c", Priority::Medium, 20),
        ];
        let weigher = TaskWeigher::new().with_mood_scale(MoodType::Tired, 0.5);
        let plain = weigher.sort_tasks_by_weight(&tasks, None);
        let tired = weigher.sort_tasks_by_weight(&tasks, Some(MoodType::Tired));
        assert_eq!(ids(&plain), ids(&tired));
        assert!(
            weigher.compute_task_weight(&tasks[2], Some(MoodType::Tired))
                < weigher.compute_task_weight(&tasks[2], None)
        );
    }

    #[test]
    fn weight_config_validation() {
        assert!(WeightConfig::default().validate().is_ok());
        let squashed = WeightConfig {
            high: 2.5,
            medium: 2.0,
            low: 1.0,
        };
        assert!(squashed.validate().is_err());
    }
}
