//! Rest-break annotation over a placed schedule.
//!
//! After a focus run reaches the configured session length, a break is
//! written into the gap that follows it. Work that is already placed is never
//! moved: if the next item starts too soon there is simply no break.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::scheduler::ScheduledTask;
use crate::time::MINUTES_PER_DAY;

/// Break cadence and length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakPolicy {
    /// Cumulative work (minutes) that triggers a break
    #[serde(default = "default_focus_session")]
    pub focus_session_minutes: u32,

    /// Break duration (minutes)
    #[serde(default = "default_break")]
    pub break_minutes: u32,

    /// Gaps longer than this are idle time already and get no break
    #[serde(default = "default_natural_rest")]
    pub natural_rest_minutes: u32,

    /// Last minute (exclusive) a break may occupy
    #[serde(default = "default_day_end")]
    pub day_end: u32,
}

fn default_focus_session() -> u32 {
    90
}
fn default_break() -> u32 {
    15
}
fn default_natural_rest() -> u32 {
    30
}
fn default_day_end() -> u32 {
    MINUTES_PER_DAY
}

impl Default for BreakPolicy {
    fn default() -> Self {
        Self {
            focus_session_minutes: default_focus_session(),
            break_minutes: default_break(),
            natural_rest_minutes: default_natural_rest(),
            day_end: default_day_end(),
        }
    }
}

impl BreakPolicy {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let invalid = |field: &str, message: &str| ValidationError::InvalidValue {
            field: format!("breaks.{field}"),
            message: message.to_string(),
        };
        if self.focus_session_minutes == 0 {
            return Err(invalid("focus_session_minutes", "must be positive"));
        }
        if self.break_minutes == 0 {
            return Err(invalid("break_minutes", "must be positive"));
        }
        if self.natural_rest_minutes < self.break_minutes {
            return Err(invalid(
                "natural_rest_minutes",
                "must be at least break_minutes",
            ));
        }
        if self.day_end > MINUTES_PER_DAY {
            return Err(invalid("day_end", "must not exceed 1440"));
        }
        Ok(())
    }
}

/// What happened at the end of a focus run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GapOutcome {
    /// Not enough room before the next item
    TooShort,
    /// Break written into the gap
    Inserted,
    /// Gap is long enough to be rest on its own
    Idle,
}

/// Inserts breaks after long focus runs.
#[derive(Debug, Clone, Default)]
pub struct BreakInserter {
    policy: BreakPolicy,
}

impl BreakInserter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: BreakPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &BreakPolicy {
        &self.policy
    }

    /// Return `scheduled` plus inserted breaks, ordered by start time.
    pub fn insert_breaks(&self, scheduled: &[ScheduledTask]) -> Vec<ScheduledTask> {
        let mut items = scheduled.to_vec();
        items.sort_by_key(|i| i.assigned_start);

        let work: Vec<&ScheduledTask> = items.iter().filter(|i| i.is_work()).collect();
        let mut breaks = Vec::new();
        let mut run = 0u32;

        for (index, item) in work.iter().enumerate() {
            if index > 0 {
                let previous_end = work[index - 1].assigned_end;
                if item.assigned_start.saturating_sub(previous_end) >= self.policy.break_minutes {
                    run = 0;
                }
            }
            run += item.duration_minutes();

            if run < self.policy.focus_session_minutes {
                continue;
            }

            let next_start = items
                .iter()
                .map(|i| i.assigned_start)
                .filter(|start| *start >= item.assigned_end)
                .min()
                .unwrap_or(self.policy.day_end);

            match self.classify_gap(item.assigned_end, next_start) {
                GapOutcome::TooShort => {
                    tracing::debug!(after = item.assigned_end, run, "no room for break");
                }
                GapOutcome::Inserted => {
                    breaks.push(ScheduledTask::rest(item.assigned_end, self.policy.break_minutes));
                    run = 0;
                }
                GapOutcome::Idle => run = 0,
            }
        }

        items.extend(breaks);
        items.sort_by_key(|i| i.assigned_start);
        items
    }

    fn classify_gap(&self, end: u32, next_start: u32) -> GapOutcome {
        let gap = next_start.saturating_sub(end);
        if gap < self.policy.break_minutes || end + self.policy.break_minutes > self.policy.day_end {
            GapOutcome::TooShort
        } else if gap <= self.policy.natural_rest_minutes {
            GapOutcome::Inserted
        } else {
            GapOutcome::Idle
        }
    }
}

/// Insert breaks with the default policy.
pub fn insert_breaks(scheduled: &[ScheduledTask]) -> Vec<ScheduledTask> {
    BreakInserter::new().insert_breaks(scheduled)
}
