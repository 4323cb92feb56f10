//! ISO-8601 calendar dates as opaque tokens
//!
//! Dates coming from the backend are sorted and displayed, never used in
//! arithmetic. The string form is kept as received (after validation) so that
//! ordering is plain lexical ordering of `YYYY-MM-DD`.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{Error, Result};

const ISO_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct IsoDate(String);

impl IsoDate {
    /// Parse a `YYYY-MM-DD` token. A full timestamp is accepted and cut down
    /// to its date part.
    pub fn parse(value: &str) -> Result<Self> {
        let trimmed = value.trim();
        let date_part = trimmed.split('T').next().unwrap_or(trimmed);
        NaiveDate::parse_from_str(date_part, ISO_FORMAT)
            .map_err(|e| Error::Parse(format!("Invalid ISO date '{}': {}", value, e)))?;
        Ok(Self(date_part.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Short display form, e.g. `Jan 5`
    pub fn short_label(&self) -> String {
        match NaiveDate::parse_from_str(&self.0, ISO_FORMAT) {
            Ok(date) => date.format("%b %-d").to_string(),
            Err(_) => self.0.clone(),
        }
    }
}

impl fmt::Display for IsoDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for IsoDate {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl<'de> Deserialize<'de> for IsoDate {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        IsoDate::parse(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_date() {
        let date = IsoDate::parse("2024-01-07").unwrap();
        assert_eq!(date.as_str(), "2024-01-07");
    }

    #[test]
    fn test_parse_timestamp_keeps_date_part() {
        let date = IsoDate::parse("2024-01-07T10:15:00").unwrap();
        assert_eq!(date.as_str(), "2024-01-07");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(IsoDate::parse("07/01/2024").is_err());
        assert!(IsoDate::parse("2024-13-01").is_err());
        assert!(IsoDate::parse("").is_err());
    }

    #[test]
    fn test_lexical_ordering_matches_calendar() {
        let mut dates = vec![
            IsoDate::parse("2024-02-01").unwrap(),
            IsoDate::parse("2023-12-31").unwrap(),
            IsoDate::parse("2024-01-15").unwrap(),
        ];
        dates.sort();
        let ordered: Vec<&str> = dates.iter().map(|d| d.as_str()).collect();
        assert_eq!(ordered, vec!["2023-12-31", "2024-01-15", "2024-02-01"]);
    }

    #[test]
    fn test_short_label() {
        assert_eq!(IsoDate::parse("2024-01-05").unwrap().short_label(), "Jan 5");
    }

    #[test]
    fn test_deserialize_validates() {
        let ok: IsoDate = serde_json::from_str("\"2024-03-10\"").unwrap();
        assert_eq!(ok.to_string(), "2024-03-10");
        assert!(serde_json::from_str::<IsoDate>("\"tomorrow\"").is_err());
    }
}
