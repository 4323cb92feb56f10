//! Selectable time range for the mood slice

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{Error, Result};

/// Window of days the mood series covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum TimeRange {
    #[default]
    Week,
    TwoWeeks,
    Month,
}

impl TimeRange {
    pub const ALL: [TimeRange; 3] = [TimeRange::Week, TimeRange::TwoWeeks, TimeRange::Month];

    /// Number of days, as sent in `?days=`
    pub fn days(&self) -> u32 {
        match self {
            TimeRange::Week => 7,
            TimeRange::TwoWeeks => 14,
            TimeRange::Month => 30,
        }
    }

    pub fn from_days(days: u32) -> Result<Self> {
        match days {
            7 => Ok(TimeRange::Week),
            14 => Ok(TimeRange::TwoWeeks),
            30 => Ok(TimeRange::Month),
            other => Err(Error::InvalidInput(format!(
                "Unsupported time range: {} days (expected 7, 14 or 30)",
                other
            ))),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TimeRange::Week => "Last 7 days",
            TimeRange::TwoWeeks => "Last 14 days",
            TimeRange::Month => "Last 30 days",
        }
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}d", self.days())
    }
}

impl FromStr for TimeRange {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let digits = trimmed.strip_suffix('d').unwrap_or(trimmed);
        let days = digits
            .parse::<u32>()
            .map_err(|_| Error::InvalidInput(format!("Invalid time range: {}", s)))?;
        Self::from_days(days)
    }
}

impl TryFrom<u32> for TimeRange {
    type Error = Error;

    fn try_from(days: u32) -> Result<Self> {
        Self::from_days(days)
    }
}

impl From<TimeRange> for u32 {
    fn from(range: TimeRange) -> u32 {
        range.days()
    }
}
