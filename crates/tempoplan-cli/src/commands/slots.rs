use clap::Args;
use tempoplan_core::{Config, FreeSlotCalculator, TimeSlot};

use super::parse_busy;

#[derive(Args)]
pub struct SlotsArgs {
    /// Working window (e.g. "09:00-17:00")
    #[arg(long)]
    window: String,
    /// Busy interval inside the window; repeatable
    #[arg(long)]
    busy: Vec<String>,
    /// Drop gaps shorter than this many minutes (default from config)
    #[arg(long)]
    min_slot: Option<u32>,
    /// Output as JSON
    #[arg(long)]
    json: bool,
}

pub fn run(args: SlotsArgs) -> Result<(), Box<dyn std::error::Error>> {
    let window = TimeSlot::parse(&args.window)?;
    let busy = parse_busy(&args.busy)?;
    let min_slot = match args.min_slot {
        Some(minutes) => minutes,
        None => Config::load()?.slots.min_slot_minutes,
    };

    let slots = FreeSlotCalculator::new()
        .with_min_slot(min_slot)
        .find_free_slots(&window, &busy);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&slots)?);
        return Ok(());
    }

    if slots.is_empty() {
        println!("No free slots in {window}");
    }
    for slot in &slots {
        println!("{slot}  ({} min)", slot.duration_minutes());
    }
    Ok(())
}
