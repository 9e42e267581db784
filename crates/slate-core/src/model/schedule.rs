use super::id::EntityId;
use super::task::{AiAnnotation, ParseEnumError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Whether a schedule's time range has already passed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Past,
    Future,
}

impl Phase {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Past => "past",
            Self::Future => "future",
        }
    }
}

/// Half-open time range for a schedule entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// A calendar entry as held by the query cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    pub id: EntityId,
    pub title: String,
    pub time: TimeRange,
    #[serde(default)]
    pub attendees: Vec<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub ai: Option<AiAnnotation>,
}

impl Schedule {
    /// Classify against `now`: past once the range has fully ended.
    #[must_use]
    pub fn phase(&self, now: DateTime<Utc>) -> Phase {
        if self.time.end < now {
            Phase::Past
        } else {
            Phase::Future
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Phase {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "past" => Ok(Self::Past),
            "future" => Ok(Self::Future),
            _ => Err(ParseEnumError {
                expected: "phase",
                got: s.to_string(),
            }),
        }
    }
}
