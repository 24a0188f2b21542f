//! # Tempoplan Core Library
//!
//! This library provides the planning logic for Tempoplan, an adaptive day
//! planner. It turns a list of tasks and a day's free time into a timed plan,
//! and learns from completed days how much of that time is realistically
//! usable in each mood.
//!
//! ## Architecture
//!
//! - **Time**: "HH:MM" parsing and formatting over minutes since midnight
//! - **Slots**: Free-time computation from a working window and busy events
//! - **Weighting / Scheduler**: Priority weights and greedy first-fit placement
//! - **Breaks**: Rest breaks inserted after long focus runs
//! - **Learning**: Per-mood completion history scaling the day's budget
//! - **Storage**: SQLite learning records and TOML configuration
//!
//! ## Key Components
//!
//! - [`Planner`]: End-to-end orchestration of one plan request
//! - [`Scheduler`]: Weighted first-fit engine
//! - [`LearningModel`]: Load multiplier per mood
//! - [`Database`]: Persistent learning store
//! - [`Config`]: Planner configuration management

pub mod breaks;
pub mod error;
pub mod learning;
pub mod planner;
pub mod scheduler;
pub mod slots;
pub mod storage;
pub mod task;
pub mod time;
pub mod weighting;

pub use breaks::{insert_breaks, BreakInserter, BreakPolicy};
pub use error::{ConfigError, CoreError, StorageError, TimeError, ValidationError};
pub use learning::{
    LearningConfig, LearningModel, LearningRecord, LearningStore, MemoryLearningStore,
    UnavailableStore,
};
pub use planner::{DayPlan, FreeTimeInput, PlanRequest, Planner, PlannerConfig, TaskSource};
pub use scheduler::{
    generate_schedule, to_schedule_items, ItemKind, ScheduleItem, ScheduleResult, ScheduledTask,
    Scheduler, SchedulerConfig,
};
pub use slots::{compute_free_slots, BusyInterval, FreeSlotCalculator, TimeSlot};
pub use storage::{Config, Database};
pub use task::{MoodType, Priority, Task};
pub use time::{minutes_to_time, time_to_minutes};
pub use weighting::{compute_task_weight, sort_tasks_by_weight, TaskWeigher, WeightConfig};
