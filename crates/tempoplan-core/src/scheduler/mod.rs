//! Greedy weighted-interval scheduler.
//!
//! Places pending tasks into free slots:
//! - Tasks are visited heaviest first (see [`crate::weighting`])
//! - Each task goes to the first slot, in time order, with enough remaining room
//! - A slot is a capacity pool: tasks are stacked one after another from its start
//! - Tasks are never split; anything that does not fit is reported as unscheduled
//!
//! This is a first-fit heuristic. It never backtracks to swap a placed task
//! for a better combination, which keeps a run at O(tasks x slots).

use serde::{Deserialize, Serialize};

use crate::error::{Result, TimeError};
use crate::slots::{self, TimeSlot};
use crate::task::{MoodType, Task};
use crate::time;
use crate::weighting::{TaskWeigher, WeightConfig};

/// Kind of a placed item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Work,
    Break,
}

/// A task (or break) placed on the day's timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledTask {
    /// Originating task id; `None` for breaks.
    pub task_id: Option<String>,
    pub title: String,
    pub assigned_start: u32,
    pub assigned_end: u32,
    pub kind: ItemKind,
}

impl ScheduledTask {
    /// Place `task` starting at `start`.
    pub fn work(task: &Task, start: u32) -> Self {
        Self {
            task_id: Some(task.id.clone()),
            title: task.title.clone(),
            assigned_start: start,
            assigned_end: start + task.estimated_minutes,
            kind: ItemKind::Work,
        }
    }

    /// A rest interval with no originating task.
    pub fn rest(start: u32, minutes: u32) -> Self {
        Self {
            task_id: None,
            title: "Break".to_string(),
            assigned_start: start,
            assigned_end: start + minutes,
            kind: ItemKind::Break,
        }
    }

    /// Get total duration in minutes
    pub fn duration_minutes(&self) -> u32 {
        time::interval_minutes(self.assigned_start, self.assigned_end)
    }

    pub fn is_work(&self) -> bool {
        self.kind == ItemKind::Work
    }
}

/// Output of one scheduling run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScheduleResult {
    /// Placed tasks ordered by start time
    pub scheduled: Vec<ScheduledTask>,
    /// Tasks that did not fit, in weight order
    pub unscheduled: Vec<Task>,
    /// Sum of work durations in `scheduled`
    pub total_assigned_minutes: u32,
}

impl ScheduleResult {
    pub fn to_schedule_items(&self) -> std::result::Result<Vec<ScheduleItem>, TimeError> {
        to_schedule_items(&self.scheduled)
    }
}

/// Presentation shape of one timeline entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,
    pub title: String,
    /// HH:MM
    pub start: String,
    /// HH:MM, or 24:00 at end of day
    pub end: String,
    pub duration_minutes: u32,
    pub kind: ItemKind,
}

/// Flatten placed entries into the presentation shape.
pub fn to_schedule_items(
    entries: &[ScheduledTask],
) -> std::result::Result<Vec<ScheduleItem>, TimeError> {
    entries
        .iter()
        .map(|entry| {
            Ok(ScheduleItem {
                task_id: entry.task_id.clone(),
                title: entry.title.clone(),
                start: time::minutes_to_time(entry.assigned_start)?,
                end: time::minutes_to_boundary(entry.assigned_end)?,
                duration_minutes: entry.duration_minutes(),
                kind: entry.kind,
            })
        })
        .collect()
}

/// Scheduler configuration
#[derive(Debug, Clone, Default)]
pub struct SchedulerConfig {
    /// Tier multipliers used for ordering
    pub weights: WeightConfig,
    /// Optional cap on total assigned minutes
    pub budget_minutes: Option<u32>,
}

/// Greedy first-fit scheduler
#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    config: SchedulerConfig,
    weigher: TaskWeigher,
}

impl Scheduler {
    /// Create a new scheduler with default config
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with custom config
    pub fn with_config(config: SchedulerConfig) -> Self {
        Self {
            weigher: TaskWeigher::with_config(config.weights),
            config,
        }
    }

    /// Replace the weigher (e.g. one carrying per-mood scales).
    pub fn with_weigher(mut self, weigher: TaskWeigher) -> Self {
        self.weigher = weigher;
        self
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Generate a schedule for one day
    ///
    /// # Arguments
    /// * `tasks` - Pending tasks; completed ones are skipped
    /// * `slots` - Free slots, in any order, not overlapping
    /// * `mood` - Optional mood context for weighting
    ///
    /// # Errors
    /// Fails on overlapping slots or tasks with a zero duration.
    pub fn generate_schedule(
        &self,
        tasks: &[Task],
        slots: &[TimeSlot],
        mood: Option<MoodType>,
    ) -> Result<ScheduleResult> {
        self.generate_with_budget(tasks, slots, mood, self.config.budget_minutes)
    }

    /// Same as [`generate_schedule`](Self::generate_schedule) with an explicit budget.
    ///
    /// A task whose placement would push the assigned total above `budget`
    /// is reported as unscheduled.
    pub fn generate_with_budget(
        &self,
        tasks: &[Task],
        slots: &[TimeSlot],
        mood: Option<MoodType>,
        budget: Option<u32>,
    ) -> Result<ScheduleResult> {
        // 1. Filter completed tasks
        let pending: Vec<Task> = tasks.iter().filter(|t| !t.completed).cloned().collect();
        for task in &pending {
            task.validate()?;
        }

        // 2. Weight order
        let ordered = self.weigher.sort_tasks_by_weight(&pending, mood);

        // 3. Slots in time order
        let mut slots = slots.to_vec();
        slots::sort_slots(&mut slots);
        slots::validate_disjoint(&slots)?;

        // Remaining-capacity cursors, local to this run
        let mut cursors: Vec<u32> = slots.iter().map(TimeSlot::start_minutes).collect();

        let mut result = ScheduleResult::default();

        // 4. First-fit placement
        for task in ordered {
            let minutes = task.estimated_minutes;

            if let Some(budget) = budget {
                if result.total_assigned_minutes.saturating_add(minutes) > budget {
                    tracing::debug!(task = %task.id, minutes, budget, "over budget, unscheduled");
                    result.unscheduled.push(task);
                    continue;
                }
            }

            let fit = slots
                .iter()
                .zip(cursors.iter())
                .position(|(slot, cursor)| slot.end_minutes() - cursor >= minutes);

            match fit {
                Some(index) => {
                    let start = cursors[index];
                    let placed = ScheduledTask::work(&task, start);
                    cursors[index] = placed.assigned_end;
                    result.total_assigned_minutes += minutes;
                    tracing::debug!(
                        task = %task.id,
                        start,
                        end = placed.assigned_end,
                        slot = index,
                        "placed task"
                    );
                    result.scheduled.push(placed);
                }
                None => {
                    // 5. Shortfall is data, not an error
                    tracing::debug!(task = %task.id, minutes, "no slot fits, unscheduled");
                    result.unscheduled.push(task);
                }
            }
        }

        result.scheduled.sort_by_key(|s| s.assigned_start);
        Ok(result)
    }
}

/// Schedule with default configuration.
pub fn generate_schedule(
    tasks: &[Task],
    slots: &[TimeSlot],
    mood: Option<MoodType>,
) -> Result<ScheduleResult> {
    Scheduler::new().generate_schedule(tasks, slots, mood)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{CoreError, ValidationError};
    use crate::task::Priority;

    fn make_task(id: &str, priority: Priority, minutes: u32) -> Task {
        Task::new(id, format!("Task {id}"))
            .with_priority(priority)
            .with_minutes(minutes)
    }

    fn slot(range: &str) -> TimeSlot {
        TimeSlot::parse(range).unwrap()
    }

    fn ids(entries: &[ScheduledTask]) -> Vec<&str> {
        entries.iter().filter_map(|e| e.task_id.as_deref()).collect()
    }

    #[test]
    fn low_priority_is_bumped_when_slot_is_full() {
        let tasks = vec![
            make_task("high", Priority::High, 60),
            make_task("low", Priority::Low, 30),
            make_task("medium", Priority::Medium, 45),
        ];

        let result = generate_schedule(&tasks, &[slot("09:00-11:00")], None).unwrap();

        assert_eq!(ids(&result.scheduled), vec!["high", "medium"]);
        assert_eq!(result.scheduled[0].assigned_start, 540);
        assert_eq!(result.scheduled[1].assigned_start, 600);
        assert_eq!(result.scheduled[1].assigned_end, 645);
        assert_eq!(result.total_assigned_minutes, 105);
        assert_eq!(result.unscheduled.len(), 1);
        assert_eq!(result.unscheduled[0].id, "low");
    }

    #[test]
    fn task_falls_through_to_later_slot() {
        let tasks = vec![
            make_task("big", Priority::High, 90),
            make_task("small", Priority::Low, 20),
        ];
        // Slots given out of order on purpose
        let slots = vec![slot("13:00-15:00"), slot("09:00-09:30")];

        let result = generate_schedule(&tasks, &slots, None).unwrap();

        assert_eq!(ids(&result.scheduled), vec!["small", "big"]);
        assert_eq!(result.scheduled[0].assigned_start, 540);
        assert_eq!(result.scheduled[1].assigned_start, 780);
        assert!(result.unscheduled.is_empty());
    }

    #[test]
    fn completed_tasks_are_ignored() {
        let tasks = vec![
            make_task("done", Priority::High, 30).completed(),
            make_task("todo", Priority::Low, 30),
        ];
        let result = generate_schedule(&tasks, &[slot("09:00-10:00")], None).unwrap();
        assert_eq!(ids(&result.scheduled), vec!["todo"]);
        assert!(result.unscheduled.is_empty());
    }

    #[test]
    fn tasks_are_never_split() {
        let tasks = vec![make_task("long", Priority::High, 90)];
        let slots = vec![slot("09:00-10:00"), slot("10:15-11:00")];
        let result = generate_schedule(&tasks, &slots, None).unwrap();
        assert!(result.scheduled.is_empty());
        assert_eq!(result.unscheduled[0].id, "long");
        assert_eq!(result.total_assigned_minutes, 0);
    }

    #[test]
    fn unscheduled_preserves_weight_order() {
        let tasks = vec![
            make_task("l", Priority::Low, 100),
            make_task("h", Priority::High, 100),
            make_task("m", Priority::Medium, 100),
        ];
        let result = generate_schedule(&tasks, &[slot("09:00-09:30")], None).unwrap();
        let unscheduled: Vec<&str> = result.unscheduled.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(unscheduled, vec!["h", "m", "l"]);
    }

    #[test]
    fn budget_trims_lowest_weight_work() {
        let tasks = vec![
            make_task("h", Priority::High, 60),
            make_task("m", Priority::Medium, 60),
            make_task("l", Priority::Low, 30),
        ];
        let scheduler = Scheduler::new();
        let result = scheduler
            .generate_with_budget(&tasks, &[slot("08:00-12:00")], None, Some(100))
            .unwrap();
        assert_eq!(ids(&result.scheduled), vec!["h", "l"]);
        assert_eq!(result.unscheduled[0].id, "m");
        assert!(result.total_assigned_minutes <= 100);
    }

    #[test]
    fn oversized_task_stays_unscheduled_under_budget() {
        let tasks = vec![
            make_task("h", Priority::High, 30),
            make_task("huge", Priority::Low, u32::MAX),
        ];
        let result = Scheduler::new()
            .generate_with_budget(&tasks, &[slot("09:00-10:00")], None, Some(60))
            .unwrap();
        assert_eq!(ids(&result.scheduled), vec!["h"]);
        assert_eq!(result.unscheduled.len(), 1);
        assert_eq!(result.unscheduled[0].id, "huge");
        assert_eq!(result.total_assigned_minutes, 30);
    }

    #[test]
    fn oversized_task_without_budget_does_not_fit() {
        let tasks = vec![make_task("huge", Priority::High, u32::MAX)];
        let result = generate_schedule(&tasks, &[slot("00:00-24:00")], None).unwrap();
        assert!(result.scheduled.is_empty());
        assert_eq!(result.unscheduled[0].id, "huge");
    }

    #[test]
    fn overlapping_slots_are_rejected() {
        let err = generate_schedule(
            &[make_task("a", Priority::High, 10)],
            &[slot("09:00-10:00"), slot("09:30-11:00")],
            None,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::OverlappingSlots { .. })
        ));
    }

    #[test]
    fn zero_minute_task_is_rejected() {
        let err = generate_schedule(
            &[make_task("a", Priority::High, 0)],
            &[slot("09:00-10:00")],
            None,
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::Validation(ValidationError::InvalidValue { .. })));
    }

    #[test]
    fn schedule_items_use_clock_strings() {
        let tasks = vec![make_task("late", Priority::High, 60)];
        let result = generate_schedule(&tasks, &[slot("23:00-24:00")], None).unwrap();
        let items = result.to_schedule_items().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].start, "23:00");
        assert_eq!(items[0].end, "24:00");
        assert_eq!(items[0].duration_minutes, 60);
        assert_eq!(items[0].kind, ItemKind::Work);
        assert_eq!(items[0].task_id.as_deref(), Some("late"));
    }

    #[test]
    fn repeated_runs_are_deterministic() {
        let tasks = vec![
            make_task("a", Priority::Medium, 30),
            make_task("b", Priority::Medium, 30),
            make_task("c", Priority::High, 45),
        ];
        let slots = vec![slot("09:00-10:00"), slot("11:00-12:00")];
        let first = generate_schedule(&tasks, &slots, None).unwrap();
        let second = generate_schedule(&tasks, &slots, None).unwrap();
        assert_eq!(first, second);
    }
}
