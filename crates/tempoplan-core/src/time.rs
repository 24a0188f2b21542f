//! Wall-clock arithmetic on minutes since midnight.
//!
//! Times are zero-padded `HH:MM` strings. Interval ends are exclusive, so the
//! end of the day is the boundary `24:00` (1440); only the `*_boundary`
//! helpers accept it.

use crate::error::TimeError;

/// Minutes in a day; also the exclusive end-of-day boundary.
pub const MINUTES_PER_DAY: u32 = 1440;

/// Parse a zero-padded `HH:MM` string into minutes since midnight.
///
/// # Errors
/// Returns [`TimeError::InvalidFormat`] for anything other than two digits,
/// a colon and two digits, or for hour >= 24 / minute >= 60.
pub fn time_to_minutes(hhmm: &str) -> Result<u32, TimeError> {
    let (hour, minute) = split_clock(hhmm)?;
    if hour >= 24 || minute >= 60 {
        return Err(invalid(hhmm));
    }
    Ok(hour * 60 + minute)
}

/// Format minutes since midnight as `HH:MM`.
///
/// Values outside one day are rejected rather than wrapped.
pub fn minutes_to_time(minutes: u32) -> Result<String, TimeError> {
    if minutes >= MINUTES_PER_DAY {
        return Err(TimeError::OutOfRange {
            minutes,
            limit: MINUTES_PER_DAY,
        });
    }
    Ok(format!("{:02}:{:02}", minutes / 60, minutes % 60))
}

/// Like [`time_to_minutes`] but also accepts `24:00` as the end of the day.
pub fn boundary_to_minutes(hhmm: &str) -> Result<u32, TimeError> {
    if hhmm == "24:00" {
        return Ok(MINUTES_PER_DAY);
    }
    time_to_minutes(hhmm)
}

/// Like [`minutes_to_time`] but renders 1440 as `24:00`.
pub fn minutes_to_boundary(minutes: u32) -> Result<String, TimeError> {
    if minutes == MINUTES_PER_DAY {
        return Ok("24:00".to_string());
    }
    minutes_to_time(minutes)
}

/// Parse an `HH:MM-HH:MM` range. The end may be `24:00`.
pub fn parse_range(range: &str) -> Result<(u32, u32), TimeError> {
    let (start, end) = range.split_once('-').ok_or_else(|| invalid(range))?;
    Ok((time_to_minutes(start.trim())?, boundary_to_minutes(end.trim())?))
}

/// Duration of `[start, end)` in minutes.
pub fn interval_minutes(start: u32, end: u32) -> u32 {
    debug_assert!(end >= start, "interval end {end} before start {start}");
    end - start
}

fn split_clock(hhmm: &str) -> Result<(u32, u32), TimeError> {
    let bytes = hhmm.as_bytes();
    if bytes.len() != 5 || bytes[2] != b':' {
        return Err(invalid(hhmm));
    }
    let digits = [bytes[0], bytes[1], bytes[3], bytes[4]];
    if !digits.iter().all(u8::is_ascii_digit) {
        return Err(invalid(hhmm));
    }
    let value = |hi: u8, lo: u8| u32::from(hi - b'0') * 10 + u32::from(lo - b'0');
    Ok((value(digits[0], digits[1]), value(digits[2], digits[3])))
}

fn invalid(input: &str) -> TimeError {
    TimeError::InvalidFormat {
        input: input.to_string(),
    }
}
