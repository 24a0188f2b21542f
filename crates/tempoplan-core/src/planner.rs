//! Day planning orchestration.
//!
//! A [`Planner`] runs one request through the whole pipeline:
//! free slots, learned budget, weighted first-fit placement, then breaks.
//! Closing a day feeds the completion ratio back into the learning model.
//!
//! Requests are numbered. When several are in flight, only the plan for the
//! newest request is current; older ones are dropped by [`Planner::accept`].

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::breaks::{BreakInserter, BreakPolicy};
use crate::error::Result;
use crate::learning::{LearningModel, LearningStore};
use crate::scheduler::{self, ScheduleItem, ScheduleResult, Scheduler, SchedulerConfig};
use crate::slots::{self, BusyInterval, FreeSlotCalculator, TimeSlot, DEFAULT_MIN_SLOT_MINUTES};
use crate::task::{MoodType, Task};
use crate::weighting::{TaskWeigher, WeightConfig};

/// Supplies the tasks to plan.
pub trait TaskSource {
    /// Tasks in caller order. Completed tasks may be included; they are skipped.
    fn pending_tasks(&self) -> Result<Vec<Task>>;
}

impl TaskSource for Vec<Task> {
    fn pending_tasks(&self) -> Result<Vec<Task>> {
        Ok(self.clone())
    }
}

impl<T: TaskSource + ?Sized> TaskSource for &T {
    fn pending_tasks(&self) -> Result<Vec<Task>> {
        (**self).pending_tasks()
    }
}

/// Where the day's free time comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FreeTimeInput {
    /// Pre-computed, non-overlapping slots
    Slots(Vec<TimeSlot>),
    /// A working window minus committed events
    Busy {
        window: TimeSlot,
        busy: Vec<BusyInterval>,
    },
}

/// One scheduling request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanRequest {
    pub free_time: FreeTimeInput,
    pub mood: Option<MoodType>,
}

impl PlanRequest {
    pub fn new(free_time: FreeTimeInput) -> Self {
        Self {
            free_time,
            mood: None,
        }
    }

    pub fn with_mood(mut self, mood: MoodType) -> Self {
        self.mood = Some(mood);
        self
    }
}

/// Pipeline settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlannerConfig {
    pub min_slot_minutes: u32,
    pub weights: WeightConfig,
    pub breaks: BreakPolicy,
    pub insert_breaks: bool,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            min_slot_minutes: DEFAULT_MIN_SLOT_MINUTES,
            weights: WeightConfig::default(),
            breaks: BreakPolicy::default(),
            insert_breaks: true,
        }
    }
}

/// A finished plan for one day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayPlan {
    pub id: Uuid,
    /// Request number this plan answers
    pub generation: u64,
    pub mood: Option<MoodType>,
    /// Learned multiplier applied to the free capacity
    pub load_multiplier: f64,
    pub free_minutes: u32,
    pub budget_minutes: u32,
    pub slots: Vec<TimeSlot>,
    pub result: ScheduleResult,
    /// Work and breaks in time order
    pub items: Vec<ScheduleItem>,
}

/// Runs plan requests against a task source and a learning model.
pub struct Planner<T, S> {
    source: T,
    learning: Arc<LearningModel<S>>,
    config: PlannerConfig,
    generation: AtomicU64,
}

impl<T, S> std::fmt::Debug for Planner<T, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Planner")
            .field("config", &self.config)
            .field("generation", &self.generation)
            .finish_non_exhaustive()
    }
}

impl<T: TaskSource, S: LearningStore> Planner<T, S> {
    pub fn new(source: T, learning: Arc<LearningModel<S>>) -> Self {
        Self::with_config(source, learning, PlannerConfig::default())
    }

    pub fn with_config(source: T, learning: Arc<LearningModel<S>>, config: PlannerConfig) -> Self {
        Self {
            source,
            learning,
            config,
            generation: AtomicU64::new(0),
        }
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    pub fn learning(&self) -> &Arc<LearningModel<S>> {
        &self.learning
    }

    /// Number of the newest request started so far.
    pub fn latest_generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Build a plan for `request`.
    ///
    /// # Errors
    /// Fails on task source errors, invalid tasks or overlapping slots.
    /// Running out of room is not an error; see [`ScheduleResult::unscheduled`].
    pub fn plan(&self, request: &PlanRequest) -> Result<DayPlan> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        let tasks = self.source.pending_tasks()?;
        let slots = self.free_slots(&request.free_time)?;

        let load_multiplier = request
            .mood
            .map(|mood| self.learning.calculate_adjusted_load(mood))
            .unwrap_or(1.0);
        let free_minutes: u32 = slots.iter().map(slots::slot_duration).sum();
        let budget_minutes = (f64::from(free_minutes) * load_multiplier).floor() as u32;

        let mut weigher = TaskWeigher::with_config(self.config.weights);
        if let Some(mood) = request.mood {
            weigher = weigher.with_mood_scale(mood, load_multiplier);
        }
        let engine = Scheduler::with_config(SchedulerConfig {
            weights: self.config.weights,
            budget_minutes: Some(budget_minutes),
        })
        .with_weigher(weigher);

        let result = engine.generate_schedule(&tasks, &slots, request.mood)?;

        let timeline = if self.config.insert_breaks {
            BreakInserter::with_policy(self.config.breaks).insert_breaks(&result.scheduled)
        } else {
            result.scheduled.clone()
        };
        let items = scheduler::to_schedule_items(&timeline)?;

        tracing::debug!(
            generation,
            mood = ?request.mood,
            load_multiplier,
            free_minutes,
            budget_minutes,
            scheduled = result.scheduled.len(),
            unscheduled = result.unscheduled.len(),
            "planned day"
        );

        Ok(DayPlan {
            id: Uuid::new_v4(),
            generation,
            mood: request.mood,
            load_multiplier,
            free_minutes,
            budget_minutes,
            slots,
            result,
            items,
        })
    }

    fn free_slots(&self, input: &FreeTimeInput) -> Result<Vec<TimeSlot>> {
        match input {
            FreeTimeInput::Slots(given) => {
                let mut sorted = given.clone();
                slots::sort_slots(&mut sorted);
                slots::validate_disjoint(&sorted)?;
                Ok(sorted)
            }
            FreeTimeInput::Busy { window, busy } => Ok(FreeSlotCalculator::new()
                .with_min_slot(self.config.min_slot_minutes)
                .find_free_slots(window, busy)),
        }
    }

    /// Whether `plan` answers the newest request.
    pub fn is_current(&self, plan: &DayPlan) -> bool {
        plan.generation == self.latest_generation()
    }

    /// Keep `plan` only if no newer request has started since it began.
    pub fn accept(&self, plan: DayPlan) -> Option<DayPlan> {
        if self.is_current(&plan) {
            Some(plan)
        } else {
            tracing::debug!(
                generation = plan.generation,
                latest = self.latest_generation(),
                "discarding stale plan"
            );
            None
        }
    }

    /// Record how the day went and return the refreshed multiplier for `mood`.
    ///
    /// # Errors
    /// Fails if the learning store cannot be written.
    pub fn close_day(&self, mood: MoodType, assigned_minutes: u32, completed_minutes: u32) -> Result<f64> {
        self.learning
            .record_day_stats(mood, assigned_minutes, completed_minutes)?;
        Ok(self.learning.calculate_adjusted_load(mood))
    }
}
