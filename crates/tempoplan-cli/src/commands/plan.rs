use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use tempoplan_core::{
    Config, CoreError, Database, DayPlan, FreeTimeInput, ItemKind, LearningModel, LearningStore,
    MoodType, PlanRequest, Planner, Task, TaskSource, TimeSlot, UnavailableStore,
};

use super::{parse_busy, parse_slots};

#[derive(Args)]
pub struct PlanArgs {
    /// JSON file holding an array of tasks
    #[arg(long)]
    tasks: PathBuf,
    /// Working window (e.g. "09:00-17:00"); free slots are derived from it
    #[arg(long, conflicts_with = "slot")]
    window: Option<String>,
    /// Busy interval inside the window; repeatable
    #[arg(long, requires = "window")]
    busy: Vec<String>,
    /// Pre-computed free slot; repeatable
    #[arg(long)]
    slot: Vec<String>,
    /// Today's mood: energetic, neutral or tired
    #[arg(long)]
    mood: Option<MoodType>,
    /// Skip break insertion
    #[arg(long)]
    no_breaks: bool,
    /// Output as JSON
    #[arg(long)]
    json: bool,
}

/// Tasks read from a JSON file on every request.
struct TaskFile {
    path: PathBuf,
}

impl TaskSource for TaskFile {
    fn pending_tasks(&self) -> Result<Vec<Task>, CoreError> {
        let content = std::fs::read_to_string(&self.path).map_err(|e| {
            CoreError::TaskSource(format!("cannot read {}: {e}", self.path.display()))
        })?;
        serde_json::from_str(&content).map_err(|e| {
            CoreError::TaskSource(format!("invalid task file {}: {e}", self.path.display()))
        })
    }
}

fn free_time(args: &PlanArgs) -> Result<FreeTimeInput, Box<dyn std::error::Error>> {
    match &args.window {
        Some(window) => Ok(FreeTimeInput::Busy {
            window: TimeSlot::parse(window)?,
            busy: parse_busy(&args.busy)?,
        }),
        None if !args.slot.is_empty() => Ok(FreeTimeInput::Slots(parse_slots(&args.slot)?)),
        None => Err("either --window or --slot is required".into()),
    }
}

/// The on-disk store, or one that reports itself unavailable so planning
/// still runs at the neutral multiplier.
fn learning_store() -> Arc<dyn LearningStore> {
    match Database::open() {
        Ok(db) => Arc::new(db),
        Err(e) => {
            tracing::warn!(error = %e, "learning store unavailable, planning at neutral load");
            Arc::new(UnavailableStore::new(e.to_string()))
        }
    }
}

pub fn run(args: PlanArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let learning = Arc::new(LearningModel::with_config(learning_store(), config.learning)?);

    let mut planner_config = config.planner_config();
    if args.no_breaks {
        planner_config.insert_breaks = false;
    }

    let request = PlanRequest {
        free_time: free_time(&args)?,
        mood: args.mood,
    };
    tracing::debug!(tasks = %args.tasks.display(), mood = ?args.mood, "planning day");
    let source = TaskFile {
        path: args.tasks.clone(),
    };
    let planner = Planner::with_config(source, learning, planner_config);
    let plan = planner.plan(&request)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
    } else {
        print_plan(&plan);
    }
    Ok(())
}

fn print_plan(plan: &DayPlan) {
    let mood = plan
        .mood
        .map(|m| m.to_string())
        .unwrap_or_else(|| "none".to_string());
    println!(
        "Plan {} (mood: {mood}, load x{:.2}, budget {}/{} min)",
        plan.id, plan.load_multiplier, plan.budget_minutes, plan.free_minutes
    );

    if plan.items.is_empty() {
        println!("  nothing scheduled");
    }
    for item in &plan.items {
        let kind = match item.kind {
            ItemKind::Work => "work ",
            ItemKind::Break => "break",
        };
        match &item.task_id {
            Some(id) => println!("  {}-{}  {kind}  {} [{id}]", item.start, item.end, item.title),
            None => println!("  {}-{}  {kind}  {}", item.start, item.end, item.title),
        }
    }

    if !plan.result.unscheduled.is_empty() {
        println!("Unscheduled:");
        for task in &plan.result.unscheduled {
            println!(
                "  {}  {} ({} min, {})",
                task.id, task.title, task.estimated_minutes, task.priority
            );
        }
    }
}
