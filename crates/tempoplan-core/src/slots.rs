//! Free-slot calculation between busy intervals.
//!
//! Finds the free time inside a working window that is left over after
//! already-committed events. Busy input may overlap and arrive in any order.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::time::{self, MINUTES_PER_DAY};

/// Default minimum useful slot length (minutes).
pub const DEFAULT_MIN_SLOT_MINUTES: u32 = 15;

#[derive(Debug, Deserialize)]
struct RawInterval {
    start_minutes: u32,
    end_minutes: u32,
    #[serde(default)]
    label: Option<String>,
}

fn check_bounds(start: u32, end: u32) -> Result<(), ValidationError> {
    if start >= MINUTES_PER_DAY || end > MINUTES_PER_DAY || end <= start {
        return Err(ValidationError::MalformedSlot { start, end });
    }
    Ok(())
}

/// A contiguous free interval `[start, end)` in minutes since midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawInterval")]
pub struct TimeSlot {
    start_minutes: u32,
    end_minutes: u32,
}

impl TimeSlot {
    /// Create a slot; `end` may be 1440 (end of day).
    ///
    /// # Errors
    /// Returns [`ValidationError::MalformedSlot`] when `end <= start` or the
    /// interval leaves the day.
    pub fn new(start_minutes: u32, end_minutes: u32) -> Result<Self, ValidationError> {
        check_bounds(start_minutes, end_minutes)?;
        Ok(Self {
            start_minutes,
            end_minutes,
        })
    }

    /// Parse an `HH:MM-HH:MM` range into a slot.
    pub fn parse(range: &str) -> Result<Self, crate::error::CoreError> {
        let (start, end) = time::parse_range(range)?;
        Ok(Self::new(start, end)?)
    }

    pub fn start_minutes(&self) -> u32 {
        self.start_minutes
    }

    pub fn end_minutes(&self) -> u32 {
        self.end_minutes
    }

    /// Get duration in minutes
    pub fn duration_minutes(&self) -> u32 {
        self.end_minutes - self.start_minutes
    }

    /// Check if this slot can fit a task of given duration
    pub fn can_fit(&self, minutes: u32) -> bool {
        self.duration_minutes() >= minutes
    }

    /// Whether `[start, end)` lies completely inside this slot.
    pub fn contains(&self, start: u32, end: u32) -> bool {
        start >= self.start_minutes && end <= self.end_minutes
    }

    pub fn overlaps(&self, other: &TimeSlot) -> bool {
        self.start_minutes < other.end_minutes && other.start_minutes < self.end_minutes
    }
}

impl TryFrom<RawInterval> for TimeSlot {
    type Error = ValidationError;

    fn try_from(raw: RawInterval) -> Result<Self, Self::Error> {
        TimeSlot::new(raw.start_minutes, raw.end_minutes)
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}",
            time::minutes_to_boundary(self.start_minutes).map_err(|_| fmt::Error)?,
            time::minutes_to_boundary(self.end_minutes).map_err(|_| fmt::Error)?
        )
    }
}

/// An already-committed event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawInterval")]
pub struct BusyInterval {
    start_minutes: u32,
    end_minutes: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    label: Option<String>,
}

impl BusyInterval {
    pub fn new(start_minutes: u32, end_minutes: u32) -> Result<Self, ValidationError> {
        check_bounds(start_minutes, end_minutes)?;
        Ok(Self {
            start_minutes,
            end_minutes,
            label: None,
        })
    }

    /// Parse an `HH:MM-HH:MM` range into a busy interval.
    pub fn parse(range: &str) -> Result<Self, crate::error::CoreError> {
        let (start, end) = time::parse_range(range)?;
        Ok(Self::new(start, end)?)
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn start_minutes(&self) -> u32 {
        self.start_minutes
    }

    pub fn end_minutes(&self) -> u32 {
        self.end_minutes
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }
}

impl TryFrom<RawInterval> for BusyInterval {
    type Error = ValidationError;

    fn try_from(raw: RawInterval) -> Result<Self, Self::Error> {
        let mut busy = BusyInterval::new(raw.start_minutes, raw.end_minutes)?;
        busy.label = raw.label;
        Ok(busy)
    }
}

/// Duration of a slot in minutes.
pub fn slot_duration(slot: &TimeSlot) -> u32 {
    slot.duration_minutes()
}

/// Sort slots ascending by start time.
pub fn sort_slots(slots: &mut [TimeSlot]) {
    slots.sort_by_key(|s| (s.start_minutes, s.end_minutes));
}

/// Check that already sorted slots do not overlap.
pub fn validate_disjoint(sorted: &[TimeSlot]) -> Result<(), ValidationError> {
    for pair in sorted.windows(2) {
        if pair[1].start_minutes < pair[0].end_minutes {
            return Err(ValidationError::OverlappingSlots {
                first_start: pair[0].start_minutes,
                first_end: pair[0].end_minutes,
                second_start: pair[1].start_minutes,
                second_end: pair[1].end_minutes,
            });
        }
    }
    Ok(())
}

/// Calculator for free slots in a working window
#[derive(Debug, Clone)]
pub struct FreeSlotCalculator {
    /// Minimum slot duration to keep (in minutes)
    min_slot_minutes: u32,
}

impl FreeSlotCalculator {
    /// Create a new calculator with default settings (15 min minimum)
    pub fn new() -> Self {
        Self {
            min_slot_minutes: DEFAULT_MIN_SLOT_MINUTES,
        }
    }

    /// Set the minimum slot duration
    pub fn with_min_slot(mut self, minutes: u32) -> Self {
        self.min_slot_minutes = minutes;
        self
    }

    pub fn min_slot_minutes(&self) -> u32 {
        self.min_slot_minutes
    }

    /// Find free slots inside `window`
    ///
    /// # Arguments
    /// * `window` - The day's overall availability window
    /// * `busy` - Committed intervals, possibly overlapping and unsorted
    ///
    /// # Returns
    /// Disjoint free slots sorted by start time
    pub fn find_free_slots(&self, window: &TimeSlot, busy: &[BusyInterval]) -> Vec<TimeSlot> {
        let mut sorted: Vec<&BusyInterval> = busy.iter().collect();
        sorted.sort_by_key(|b| (b.start_minutes, b.end_minutes));

        let window_end = window.end_minutes;
        let mut covered_until = window.start_minutes;
        let mut slots = Vec::new();

        for interval in sorted {
            // Skip intervals that end before our current position
            if interval.end_minutes <= covered_until {
                continue;
            }

            if interval.start_minutes >= window_end {
                break;
            }

            if interval.start_minutes > covered_until {
                self.push_gap(&mut slots, covered_until, interval.start_minutes);
            }

            covered_until = interval.end_minutes.min(window_end);
        }

        if covered_until < window_end {
            self.push_gap(&mut slots, covered_until, window_end);
        }

        tracing::debug!(
            window = %window,
            busy = busy.len(),
            free = slots.len(),
            "computed free slots"
        );
        slots
    }

    fn push_gap(&self, slots: &mut Vec<TimeSlot>, start: u32, end: u32) {
        if end - start < self.min_slot_minutes.max(1) {
            return;
        }
        if let Ok(slot) = TimeSlot::new(start, end) {
            slots.push(slot);
        }
    }
}

impl Default for FreeSlotCalculator {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience function to find free slots with default settings
pub fn compute_free_slots(window: &TimeSlot, busy: &[BusyInterval]) -> Vec<TimeSlot> {
    FreeSlotCalculator::new().find_free_slots(window, busy)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot(range: &str) -> TimeSlot {
        TimeSlot::parse(range).unwrap()
    }

    fn busy(range: &str) -> BusyInterval {
        BusyInterval::parse(range).unwrap()
    }

    #[test]
    fn malformed_slots_are_rejected() {
        assert_eq!(
            TimeSlot::new(600, 600),
            Err(ValidationError::MalformedSlot { start: 600, end: 600 })
        );
        assert!(TimeSlot::new(700, 600).is_err());
        assert!(TimeSlot::new(0, 1441).is_err());
        assert!(TimeSlot::new(0, 1440).is_ok());
    }

    #[test]
    fn malformed_slot_rejected_on_deserialize() {
        let err = serde_json::from_str::<TimeSlot>(r#"{"start_minutes":600,"end_minutes":540}"#);
        assert!(err.is_err());
        let ok: TimeSlot =
            serde_json::from_str(r#"{"start_minutes":540,"end_minutes":600}"#).unwrap();
        assert_eq!(slot_duration(&ok), 60);
    }

    #[test]
    fn overlapping_busy_intervals_are_merged() {
        let slots = compute_free_slots(
            &slot("08:00-12:00"),
            &[busy("09:15-10:00"), busy("09:00-09:30")],
        );
        assert_eq!(slots, vec![slot("08:00-09:00"), slot("10:00-12:00")]);
    }

    #[test]
    fn nested_busy_interval_does_not_shrink_watermark() {
        let slots = compute_free_slots(
            &slot("08:00-12:00"),
            &[busy("09:00-11:00"), busy("09:30-10:00")],
        );
        assert_eq!(slots, vec![slot("08:00-09:00"), slot("11:00-12:00")]);
    }

    #[test]
    fn busy_outside_window_is_clamped() {
        let slots = compute_free_slots(
            &slot("08:00-12:00"),
            &[busy("07:00-08:30"), busy("11:30-13:00"), busy("14:00-15:00")],
        );
        assert_eq!(slots, vec![slot("08:30-11:30")]);
    }

    #[test]
    fn short_gaps_are_dropped() {
        let slots = compute_free_slots(
            &slot("08:00-10:00"),
            &[busy("08:10-09:00"), busy("09:05-09:40")],
        );
        assert_eq!(slots, vec![slot("09:40-10:00")]);

        let slots = FreeSlotCalculator::new()
            .with_min_slot(5)
            .find_free_slots(&slot("08:00-10:00"), &[busy("08:10-09:00"), busy("09:05-09:40")]);
        assert_eq!(
            slots,
            vec![slot("08:00-08:10"), slot("09:00-09:05"), slot("09:40-10:00")]
        );
    }

    #[test]
    fn no_busy_yields_whole_window() {
        assert_eq!(
            compute_free_slots(&slot("00:00-24:00"), &[]),
            vec![slot("00:00-24:00")]
        );
    }

    #[test]
    fn fully_busy_window_yields_nothing() {
        assert!(compute_free_slots(&slot("09:00-10:00"), &[busy("08:00-11:00")]).is_empty());
    }

    #[test]
    fn overlapping_precomputed_slots_detected() {
        let mut slots = vec![slot("10:00-11:00"), slot("09:00-10:30")];
        sort_slots(&mut slots);
        assert!(matches!(
            validate_disjoint(&slots),
            Err(ValidationError::OverlappingSlots { .. })
        ));

        let touching = vec![slot("09:00-10:00"), slot("10:00-11:00")];
        assert!(validate_disjoint(&touching).is_ok());
    }

    #[test]
    fn display_uses_clock_format() {
        assert_eq!(slot("22:00-24:00").to_string(), "22:00-24:00");
    }
}
