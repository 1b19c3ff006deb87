use std::fmt;

/// The error type for a grouping run. Any of these aborts the whole
/// computation; there are no partial results. "No solution" is not an error
/// and is represented by an empty, successfully returned output.
#[derive(Debug)]
pub enum ScheduleError {
    /// A field failed to parse (clock time, slot label, period range, ...).
    Format { what: &'static str, value: String },
    /// A referenced key is absent from its source table.
    Lookup { what: &'static str, key: String },
    /// A CSV stream could not be read.
    Csv(csv::Error),
    /// The optimization backend rejected a well-formed model.
    Solver(String),
}

impl ScheduleError {
    pub fn format(what: &'static str, value: impl Into<String>) -> Self {
        ScheduleError::Format {
            what,
            value: value.into(),
        }
    }

    pub fn lookup(what: &'static str, key: impl Into<String>) -> Self {
        ScheduleError::Lookup {
            what,
            key: key.into(),
        }
    }
}

impl fmt::Display for ScheduleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScheduleError::Format { what, value } => {
                write!(f, "malformed {}: {:?}", what, value)
            }
            ScheduleError::Lookup { what, key } => {
                write!(f, "unknown {}: {:?}", what, key)
            }
            ScheduleError::Csv(e) => write!(f, "csv error: {}", e),
            ScheduleError::Solver(msg) => write!(f, "solver error: {}", msg),
        }
    }
}

impl std::error::Error for ScheduleError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ScheduleError::Csv(e) => Some(e),
            _ => None,
        }
    }
}

impl From<csv::Error> for ScheduleError {
    fn from(e: csv::Error) -> Self {
        ScheduleError::Csv(e)
    }
}
