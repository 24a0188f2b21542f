//! Integration tests for the planning pipeline.

use std::sync::Arc;

use tempoplan_core::{
    compute_free_slots, generate_schedule, BusyInterval, FreeTimeInput, ItemKind, LearningModel,
    MemoryLearningStore, MoodType, PlanRequest, Planner, Priority, Task, TimeSlot,
};

fn slot(range: &str) -> TimeSlot {
    TimeSlot::parse(range).unwrap()
}

fn busy(range: &str) -> BusyInterval {
    BusyInterval::parse(range).unwrap()
}

#[test]
fn test_priority_order_and_capacity_shortfall() {
    let tasks = vec![
        Task::new("t-high", "Write proposal").with_priority(Priority::High).with_minutes(60),
        Task::new("t-low", "Tidy desk").with_priority(Priority::Low).with_minutes(30),
        Task::new("t-med", "Code review").with_priority(Priority::Medium).with_minutes(45),
    ];

    let result = generate_schedule(&tasks, &[slot("09:00-11:00")], None).unwrap();

    let placed: Vec<(&str, u32, u32)> = result
        .scheduled
        .iter()
        .map(|s| (s.task_id.as_deref().unwrap(), s.assigned_start, s.assigned_end))
        .collect();
    assert_eq!(placed, vec![("t-high", 540, 600), ("t-med", 600, 645)]);
    assert_eq!(result.total_assigned_minutes, 105);
    assert_eq!(result.unscheduled.len(), 1);
    assert_eq!(result.unscheduled[0].id, "t-low");

    let items = result.to_schedule_items().unwrap();
    assert_eq!(items[0].start, "09:00");
    assert_eq!(items[1].start, "10:00");
    assert_eq!(items[1].end, "10:45");
}

#[test]
fn test_overlapping_busy_intervals_are_merged() {
    let free = compute_free_slots(
        &slot("08:00-12:00"),
        &[busy("09:15-10:00"), busy("09:00-09:30")],
    );
    assert_eq!(free, vec![slot("08:00-09:00"), slot("10:00-12:00")]);
}

#[test]
fn test_completed_tasks_are_neither_scheduled_nor_reported() {
    let tasks = vec![
        Task::new("done", "Already done").with_minutes(30).completed(),
        Task::new("open", "Still open").with_minutes(30),
    ];
    let result = generate_schedule(&tasks, &[slot("09:00-10:00")], None).unwrap();
    assert_eq!(result.scheduled.len(), 1);
    assert_eq!(result.scheduled[0].task_id.as_deref(), Some("open"));
    assert!(result.unscheduled.is_empty());
}

#[test]
fn test_tasks_fill_later_slots_when_earlier_ones_are_full() {
    let tasks = vec![
        Task::new("a", "A").with_priority(Priority::High).with_minutes(50),
        Task::new("b", "B").with_priority(Priority::High).with_minutes(40),
        Task::new("c", "C").with_priority(Priority::Low).with_minutes(10),
    ];
    // Slots given out of order
    let slots = [slot("13:00-14:00"), slot("09:00-10:00")];
    let result = generate_schedule(&tasks, &slots, None).unwrap();

    // b is shorter, so it weighs more inside the high tier
    let by_id = |id: &str| {
        result
            .scheduled
            .iter()
            .find(|s| s.task_id.as_deref() == Some(id))
            .map(|s| s.assigned_start)
    };
    assert_eq!(by_id("b"), Some(540));
    assert_eq!(by_id("a"), Some(780));
    assert_eq!(by_id("c"), Some(580));
    assert!(result.unscheduled.is_empty());
}

#[test]
fn test_full_day_plan_with_breaks() {
    let tasks = vec![
        Task::new("focus", "Deep work").with_priority(Priority::High).with_minutes(60),
        Task::new("design", "Design doc").with_priority(Priority::High).with_minutes(45),
        Task::new("mail", "Email").with_priority(Priority::Low).with_minutes(30),
    ];
    let request = PlanRequest::new(FreeTimeInput::Busy {
        window: slot("09:00-12:00"),
        busy: vec![busy("10:45-11:30").with_label("lunch")],
    });

    let learning = Arc::new(LearningModel::new(MemoryLearningStore::new()));
    let planner = Planner::new(tasks, learning);
    let plan = planner.plan(&request).unwrap();

    assert_eq!(plan.slots, vec![slot("09:00-10:45"), slot("11:30-12:00")]);
    let timeline: Vec<(&str, &str, ItemKind)> = plan
        .items
        .iter()
        .map(|i| (i.start.as_str(), i.end.as_str(), i.kind))
        .collect();
    // The shorter high task goes first. The 45 minute gap after the
    // 105 minute run is rest already, so no break is added.
    assert_eq!(
        timeline,
        vec![
            ("09:00", "09:45", ItemKind::Work),
            ("09:45", "10:45", ItemKind::Work),
            ("11:30", "12:00", ItemKind::Work),
        ]
    );
    assert!(planner.is_current(&plan));
}

#[test]
fn test_break_lands_in_short_gap_between_slots() {
    let tasks = vec![
        Task::new("a", "Morning block").with_priority(Priority::High).with_minutes(95),
        Task::new("b", "Follow-up").with_priority(Priority::Medium).with_minutes(30),
    ];
    let request = PlanRequest::new(FreeTimeInput::Busy {
        window: slot("09:00-12:00"),
        busy: vec![busy("10:35-11:00")],
    });
    let planner = Planner::new(tasks, Arc::new(LearningModel::new(MemoryLearningStore::new())));
    let plan = planner.plan(&request).unwrap();

    let breaks: Vec<(&str, &str)> = plan
        .items
        .iter()
        .filter(|i| i.kind == ItemKind::Break)
        .map(|i| (i.start.as_str(), i.end.as_str()))
        .collect();
    assert_eq!(breaks, vec![("10:35", "10:50")]);
    assert!(plan.items.iter().filter(|i| i.kind == ItemKind::Break).all(|i| i.task_id.is_none()));
}

#[test]
fn test_learning_feedback_changes_next_plan() {
    let tasks = vec![
        Task::new("a", "A").with_priority(Priority::High).with_minutes(60),
        Task::new("b", "B").with_priority(Priority::Medium).with_minutes(60),
    ];
    let request = PlanRequest::new(FreeTimeInput::Slots(vec![slot("09:00-11:00")]))
        .with_mood(MoodType::Tired);
    let planner = Planner::new(tasks, Arc::new(LearningModel::new(MemoryLearningStore::new())));

    let cold = planner.plan(&request).unwrap();
    assert_eq!(cold.load_multiplier, 1.0);
    assert_eq!(cold.result.scheduled.len(), 2);

    let refreshed = planner.close_day(MoodType::Tired, 120, 60).unwrap();
    assert_eq!(refreshed, 0.5);

    let warm = planner.plan(&request).unwrap();
    assert_eq!(warm.budget_minutes, 60);
    assert_eq!(warm.result.scheduled.len(), 1);
    assert_eq!(warm.result.unscheduled[0].id, "b");
}

#[test]
fn test_day_plan_serializes_to_json() {
    let planner = Planner::new(
        vec![Task::new("a", "A").with_minutes(30)],
        Arc::new(LearningModel::new(MemoryLearningStore::new())),
    );
    let plan = planner
        .plan(&PlanRequest::new(FreeTimeInput::Slots(vec![slot("23:30-24:00")])))
        .unwrap();

    let json = serde_json::to_value(&plan).unwrap();
    assert_eq!(json["items"][0]["start"], "23:30");
    assert_eq!(json["items"][0]["end"], "24:00");
    assert_eq!(json["items"][0]["kind"], "work");
    assert_eq!(json["slots"][0]["end_minutes"], 1440);
}
