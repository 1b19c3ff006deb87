use crate::data::{Participant, RosterEntry, Slot, SolverConfig};
use crate::error::ScheduleError;
use crate::input::Timetable;
use crate::time::parse_clock;
use log::debug;
use std::collections::BTreeMap;

/// Generates candidate slots of `slot_len` minutes inside
/// `[window_start, window_end]`, spaced `step` minutes apart.
///
/// The first start is floored at the day window's `earliest` bound, so the
/// sequence covers the whole gap up to `window_end` even when the window
/// opens well after `earliest`. Consecutive candidates overlap: they are
/// spaced by `step`, not by `slot_len`.
pub fn generate_slots(
    day: &str,
    window_start: u32,
    window_end: u32,
    slot_len: u32,
    step: u32,
    earliest: u32,
) -> Vec<Slot> {
    let mut slots = Vec::new();
    let mut t = window_start.max(earliest);
    while t + slot_len <= window_end {
        slots.push(Slot::new(day, t, t + slot_len));
        t += step;
    }
    slots
}

/// Resolves every roster entry against the timetable: records the fixed
/// commitment per day and derives the candidate slots that fit between the
/// day window and that commitment.
///
/// A day absent from the class timetable contributes no slots at all; the
/// person counts as unavailable that day, not free. A roster class with no
/// timetable row is a data-integrity fault.
pub fn build_participants(
    timetable: &Timetable,
    roster: &[RosterEntry],
    config: &SolverConfig,
) -> Result<Vec<Participant>, ScheduleError> {
    let earliest = parse_clock(&config.earliest)?;
    let latest = parse_clock(&config.latest)?;

    let mut participants = Vec::with_capacity(roster.len());
    for entry in roster {
        let class_days = timetable
            .get(&entry.class)
            .ok_or_else(|| ScheduleError::lookup("class", entry.class.as_str()))?;

        let mut commitments = BTreeMap::new();
        let mut candidate_slots = Vec::new();
        for (day, range) in class_days {
            let (start_text, end_text) = range
                .split_once('-')
                .ok_or_else(|| ScheduleError::format("commitment range", range.as_str()))?;
            let commitment_start = parse_clock(start_text)?;
            let commitment_end = parse_clock(end_text)?;
            commitments.insert(day.clone(), (commitment_start, commitment_end));

            if commitment_start > earliest {
                candidate_slots.extend(generate_slots(
                    day,
                    earliest,
                    commitment_start,
                    config.slot_len,
                    config.step,
                    earliest,
                ));
            }
            if commitment_end < latest {
                candidate_slots.extend(generate_slots(
                    day,
                    commitment_end,
                    latest,
                    config.slot_len,
                    config.step,
                    earliest,
                ));
            }
        }

        debug!(
            "{} {} ({}): {} candidate slots over {} days",
            entry.first_name,
            entry.last_name,
            entry.class,
            candidate_slots.len(),
            commitments.len()
        );
        participants.push(Participant {
            first_name: entry.first_name.clone(),
            last_name: entry.last_name.clone(),
            class: entry.class.clone(),
            candidate_slots,
            commitments,
        });
    }
    Ok(participants)
}
