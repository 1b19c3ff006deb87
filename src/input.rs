use crate::data::RosterEntry;
use crate::error::ScheduleError;
use csv::ReaderBuilder;
use log::debug;
use std::collections::BTreeMap;

/// Bell period index -> "HH:MM - HH:MM" time-range label.
pub type BellTable = BTreeMap<u32, String>;

/// Class label -> day label -> "HH:MM-HH:MM" commitment range.
/// Days with a blank timetable cell are absent from the inner map.
pub type Timetable = BTreeMap<String, BTreeMap<String, String>>;

/// Reads the bell table: headerless `index,label` records.
pub fn read_bells(text: &str) -> Result<BellTable, ScheduleError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut bells = BTreeMap::new();
    for result in reader.records() {
        let record = result?;
        if record.iter().all(|field| field.is_empty()) {
            continue;
        }
        let index_text = record.get(0).unwrap_or("");
        let index: u32 = index_text
            .parse()
            .map_err(|_| ScheduleError::format("bell period index", index_text))?;
        let label = record
            .get(1)
            .filter(|label| !label.is_empty())
            .ok_or_else(|| ScheduleError::format("bell record", index_text))?;
        bells.insert(index, label.to_string());
    }
    debug!("read {} bell periods", bells.len());
    Ok(bells)
}

/// Reads the class timetable and resolves every non-blank period-range cell
/// ("start-end" bell indices) into a "HH:MM-HH:MM" string via the bell table.
///
/// A blank cell means the class has no commitment that day and is skipped;
/// a bell index absent from the table is a data-integrity fault.
pub fn read_timetable(bells: &BellTable, text: &str) -> Result<Timetable, ScheduleError> {
    let mut reader = ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers = reader.headers()?.clone();
    let days: Vec<String> = headers.iter().skip(1).map(|day| day.to_string()).collect();

    let mut timetable = BTreeMap::new();
    for result in reader.records() {
        let record = result?;
        if record.iter().all(|field| field.is_empty()) {
            continue;
        }
        let class = record.get(0).unwrap_or("").to_string();
        if class.is_empty() {
            return Err(ScheduleError::format(
                "timetable row",
                record.iter().collect::<Vec<_>>().join(","),
            ));
        }
        let mut day_ranges = BTreeMap::new();
        for (column, day) in days.iter().enumerate() {
            let cell = record.get(column + 1).unwrap_or("");
            if cell.is_empty() {
                continue;
            }
            day_ranges.insert(day.clone(), resolve_period_range(bells, cell)?);
        }
        timetable.insert(class, day_ranges);
    }
    debug!("read timetable for {} classes", timetable.len());
    Ok(timetable)
}

/// Resolves a "startIndex-endIndex" cell to "HH:MM-HH:MM" by joining the
/// start of the first referenced bell period with the end of the last.
fn resolve_period_range(bells: &BellTable, cell: &str) -> Result<String, ScheduleError> {
    let (start_text, end_text) = cell
        .split_once('-')
        .ok_or_else(|| ScheduleError::format("period range", cell))?;
    let start_index: u32 = start_text
        .trim()
        .parse()
        .map_err(|_| ScheduleError::format("period range", cell))?;
    let end_index: u32 = end_text
        .trim()
        .parse()
        .map_err(|_| ScheduleError::format("period range", cell))?;

    let start_label = bells
        .get(&start_index)
        .ok_or_else(|| ScheduleError::lookup("bell period index", start_index.to_string()))?;
    let end_label = bells
        .get(&end_index)
        .ok_or_else(|| ScheduleError::lookup("bell period index", end_index.to_string()))?;

    let start_time = bell_bounds(start_label)?.0;
    let end_time = bell_bounds(end_label)?.1;
    Ok(format!("{}-{}", start_time.trim(), end_time.trim()))
}

fn bell_bounds(label: &str) -> Result<(&str, &str), ScheduleError> {
    label
        .split_once(" - ")
        .ok_or_else(|| ScheduleError::format("bell time range", label))
}

/// Reads the participant roster, preserving file order.
pub fn read_roster(text: &str) -> Result<Vec<RosterEntry>, ScheduleError> {
    let mut reader = ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let mut roster = Vec::new();
    for result in reader.deserialize() {
        let entry: RosterEntry = result?;
        roster.push(entry);
    }
    debug!("read {} roster entries", roster.len());
    Ok(roster)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BELLS: &str = "1,08:00 - 08:45\n2,08:55 - 09:40\n3,09:50 - 10:35\n";

    #[test]
    fn test_read_bells() {
        let bells = read_bells(BELLS).unwrap();
        assert_eq!(bells.len(), 3);
        assert_eq!(bells[&1], "08:00 - 08:45");
        assert_eq!(bells[&3], "09:50 - 10:35");
    }

    #[test]
    fn test_read_bells_rejects_bad_index() {
        assert!(read_bells("x,08:00 - 08:45\n").is_err());
    }

    #[test]
    fn test_read_bells_skips_blank_lines() {
        let bells = read_bells("1,08:00 - 08:45\n\n2,08:55 - 09:40\n").unwrap();
        assert_eq!(bells.len(), 2);
    }

    #[test]
    fn test_timetable_resolves_period_ranges() {
        let bells = read_bells(BELLS).unwrap();
        let timetable = read_timetable(&bells, "class,Mon,Tue\n3A,1-3,2-2\n").unwrap();
        assert_eq!(timetable["3A"]["Mon"], "08:00-10:35");
        assert_eq!(timetable["3A"]["Tue"], "08:55-09:40");
    }

    #[test]
    fn test_timetable_blank_cell_means_no_commitment() {
        let bells = read_bells(BELLS).unwrap();
        let timetable = read_timetable(&bells, "class,Mon,Tue\n3A,1-2,\n").unwrap();
        assert!(timetable["3A"].contains_key("Mon"));
        assert!(!timetable["3A"].contains_key("Tue"));
    }

    #[test]
    fn test_timetable_unknown_bell_index_is_lookup_error() {
        let bells = read_bells(BELLS).unwrap();
        let result = read_timetable(&bells, "class,Mon\n3A,1-9\n");
        assert!(matches!(result, Err(ScheduleError::Lookup { .. })));
    }

    #[test]
    fn test_timetable_malformed_range_is_format_error() {
        let bells = read_bells(BELLS).unwrap();
        let result = read_timetable(&bells, "class,Mon\n3A,x2\n");
        assert!(matches!(result, Err(ScheduleError::Format { .. })));
    }

    #[test]
    fn test_roster_preserves_order() {
        let roster = read_roster(
            "first_name,last_name,class\nJan,Kowalski,3A\nAnna,Nowak,2B\nPiotr,Wozniak,3A\n",
        )
        .unwrap();
        let names: Vec<&str> = roster.iter().map(|entry| entry.first_name.as_str()).collect();
        assert_eq!(names, ["Jan", "Anna", "Piotr"]);
        assert_eq!(roster[1].class, "2B");
    }
}
