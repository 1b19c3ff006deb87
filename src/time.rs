use crate::data::Slot;
use crate::error::ScheduleError;

/// Parses a "HH:MM" clock time into minutes since midnight.
///
/// Exactly two colon-separated integer fields; hours must be in 0..=23 and
/// minutes in 0..=59.
pub fn parse_clock(text: &str) -> Result<u32, ScheduleError> {
    let trimmed = text.trim();
    let fields: Vec<&str> = trimmed.split(':').collect();
    if fields.len() != 2 {
        return Err(ScheduleError::format("clock time", trimmed));
    }
    let hours: u32 = fields[0]
        .trim()
        .parse()
        .map_err(|_| ScheduleError::format("clock time", trimmed))?;
    let minutes: u32 = fields[1]
        .trim()
        .parse()
        .map_err(|_| ScheduleError::format("clock time", trimmed))?;
    if hours > 23 || minutes > 59 {
        return Err(ScheduleError::format("clock time", trimmed));
    }
    Ok(60 * hours + minutes)
}

fn format_clock(minutes: u32) -> String {
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}

/// Renders a slot as "<day> HH:MM-HH:MM", zero-padded.
pub fn format_slot(slot: &Slot) -> String {
    format!(
        "{} {}-{}",
        slot.day,
        format_clock(slot.start),
        format_clock(slot.end)
    )
}

/// Exact inverse of [`format_slot`].
pub fn parse_slot(text: &str) -> Result<Slot, ScheduleError> {
    let (day, times) = text
        .split_once(' ')
        .ok_or_else(|| ScheduleError::format("slot label", text))?;
    let (start_text, end_text) = times
        .split_once('-')
        .ok_or_else(|| ScheduleError::format("slot label", text))?;
    Ok(Slot {
        day: day.to_string(),
        start: parse_clock(start_text)?,
        end: parse_clock(end_text)?,
    })
}
