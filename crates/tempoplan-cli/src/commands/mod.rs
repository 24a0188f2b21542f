pub mod config;
pub mod learn;
pub mod plan;
pub mod slots;

use tempoplan_core::{BusyInterval, TimeSlot};

/// Parse repeated `HH:MM-HH:MM` arguments as free slots.
pub fn parse_slots(ranges: &[String]) -> Result<Vec<TimeSlot>, tempoplan_core::CoreError> {
    ranges.iter().map(|r| TimeSlot::parse(r)).collect()
}

/// Parse repeated `HH:MM-HH:MM` arguments as busy intervals.
pub fn parse_busy(ranges: &[String]) -> Result<Vec<BusyInterval>, tempoplan_core::CoreError> {
    ranges.iter().map(|r| BusyInterval::parse(r)).collect()
}
