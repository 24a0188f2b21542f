//! Task and mood types consumed by the scheduler.
//!
//! Tasks are owned by an external task store; everything in this crate only
//! reads them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Declared priority level of a task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        };
        f.write_str(s)
    }
}

/// Day-condition category used by the learning store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoodType {
    Energetic,
    Neutral,
    Tired,
}

impl MoodType {
    /// Every mood, in display order.
    pub const ALL: [MoodType; 3] = [MoodType::Energetic, MoodType::Neutral, MoodType::Tired];

    /// Stable lowercase key, used for storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            MoodType::Energetic => "energetic",
            MoodType::Neutral => "neutral",
            MoodType::Tired => "tired",
        }
    }
}

impl fmt::Display for MoodType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MoodType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "energetic" => Ok(MoodType::Energetic),
            "neutral" => Ok(MoodType::Neutral),
            "tired" => Ok(MoodType::Tired),
            _ => Err(ValidationError::UnknownMood(s.to_string())),
        }
    }
}

/// A unit of work to schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub priority: Priority,
    /// Minutes.
    #[serde(alias = "estimatedMinutes")]
    pub estimated_minutes: u32,
    #[serde(default)]
    pub completed: bool,
}

impl Task {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            priority: Priority::default(),
            estimated_minutes: 30,
            completed: false,
        }
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_minutes(mut self, minutes: u32) -> Self {
        self.estimated_minutes = minutes;
        self
    }

    pub fn completed(mut self) -> Self {
        self.completed = true;
        self
    }

    /// Reject tasks that can never be placed.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.estimated_minutes == 0 {
            return Err(ValidationError::InvalidValue {
                field: format!("tasks[{}].estimated_minutes", self.id),
                message: "must be positive".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_deserializes_with_defaults() {
        let task: Task =
            serde_json::from_str(r#"{"id":"t1","title":"Write","estimatedMinutes":45}"#).unwrap();
        assert_eq!(task.priority, Priority::Medium);
        assert_eq!(task.estimated_minutes, 45);
        assert!(!task.completed);
    }

    #[test]
    fn default_priority_is_medium() {
        assert_eq!(Priority::default(), Priority::Medium);
        assert_eq!(Task::new("t1", "Write").priority, Priority::Medium);
    }

    #[test]
    fn priority_is_lowercase_on_the_wire() {
        let task = Task::new("t1", "Write").with_priority(Priority::High);
        let json = serde_json::to_value(&task).unwrap();
        assert_eq!(json["priority"], "high");
    }

    #[test]
    fn mood_parsing() {
        assert_eq!("Tired".parse::<MoodType>().unwrap(), MoodType::Tired);
        assert_eq!(" energetic ".parse::<MoodType>().unwrap(), MoodType::Energetic);
        assert_eq!(
            "sleepy".parse::<MoodType>(),
            Err(ValidationError::UnknownMood("sleepy".to_string()))
        );
    }

    #[test]
    fn zero_minute_task_is_invalid() {
        assert!(Task::new("t", "x").with_minutes(0).validate().is_err());
        assert!(Task::new("t", "x").with_minutes(1).validate().is_ok());
    }
}
