use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A candidate meeting time: a day label and a half-open minute interval.
/// Generated once, never mutated; identity is value equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Slot {
    pub day: String,
    pub start: u32,
    pub end: u32,
}

impl Slot {
    pub fn new(day: impl Into<String>, start: u32, end: u32) -> Self {
        Slot {
            day: day.into(),
            start,
            end,
        }
    }
}

/// One roster record.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RosterEntry {
    pub first_name: String,
    pub last_name: String,
    pub class: String,
}

/// A person with their availability resolved: the candidate slots they could
/// attend and their fixed-commitment interval per day. Built once by the
/// availability builder, read-only afterwards.
#[derive(Debug, Clone)]
pub struct Participant {
    pub first_name: String,
    pub last_name: String,
    pub class: String,
    /// Candidate slots in generation order. May contain duplicates when the
    /// before- and after-commitment windows overlap; the pool join dedups.
    pub candidate_slots: Vec<Slot>,
    /// Day label -> (start, end) of the fixed commitment, in minutes.
    pub commitments: BTreeMap<String, (u32, u32)>,
}

impl Participant {
    /// The identifier string used in results: "<first> <last> <class>".
    pub fn id(&self) -> String {
        format!("{} {} {}", self.first_name, self.last_name, self.class)
    }
}

/// Core configuration for a grouping run.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SolverConfig {
    /// Earliest clock time a slot may start, "HH:MM".
    #[serde(default = "default_earliest")]
    pub earliest: String,
    /// Latest clock time a slot may end, "HH:MM".
    #[serde(default = "default_latest")]
    pub latest: String,
    /// Slot length in minutes.
    #[serde(default = "default_slot_len")]
    pub slot_len: u32,
    /// Spacing between consecutive candidate slot starts, in minutes.
    #[serde(default = "default_step")]
    pub step: u32,
    /// Minimum viable group size.
    #[serde(default = "default_min_size")]
    pub min_size: usize,
    /// Maximum group size.
    #[serde(default = "default_max_size")]
    pub max_size: usize,
}

fn default_earliest() -> String {
    "08:00".to_string()
}
fn default_latest() -> String {
    "18:00".to_string()
}
fn default_slot_len() -> u32 {
    60
}
fn default_step() -> u32 {
    15
}
fn default_min_size() -> usize {
    5
}
fn default_max_size() -> usize {
    12
}

impl Default for SolverConfig {
    fn default() -> Self {
        SolverConfig {
            earliest: default_earliest(),
            latest: default_latest(),
            slot_len: default_slot_len(),
            step: default_step(),
            min_size: default_min_size(),
            max_size: default_max_size(),
        }
    }
}

/// The complete input for a grouping run: configuration plus the raw CSV
/// contents of the three data sources.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupingRequest {
    #[serde(default)]
    pub config: SolverConfig,
    pub bells_csv: String,
    pub timetable_csv: String,
    pub roster_csv: String,
}

/// The final grouping: slot label -> member identifiers in roster order,
/// plus run diagnostics. An empty `groups` map is the "no solution" outcome,
/// not an error.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupingOutput {
    pub groups: BTreeMap<String, Vec<String>>,
    pub assigned_count: usize,
    pub total_wait_minutes: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults_apply_to_missing_fields() {
        let config: SolverConfig = serde_json::from_str(r#"{"slotLen": 45}"#).unwrap();
        assert_eq!(config.slot_len, 45);
        assert_eq!(config.earliest, "08:00");
        assert_eq!(config.latest, "18:00");
        assert_eq!(config.step, 15);
        assert_eq!(config.min_size, 5);
        assert_eq!(config.max_size, 12);
    }

    #[test]
    fn test_request_without_config_uses_defaults() {
        let request: GroupingRequest =
            serde_json::from_str(r#"{"bellsCsv": "", "timetableCsv": "", "rosterCsv": ""}"#)
                .unwrap();
        assert_eq!(request.config.min_size, 5);
        assert_eq!(request.config.max_size, 12);
    }

    #[test]
    fn test_participant_id_joins_name_and_class() {
        let participant = Participant {
            first_name: "Jan".to_string(),
            last_name: "Kowalski".to_string(),
            class: "3A".to_string(),
            candidate_slots: Vec::new(),
            commitments: BTreeMap::new(),
        };
        assert_eq!(participant.id(), "Jan Kowalski 3A");
    }
}
