//! In-memory temperature store, one reading per calendar day.

use chrono::{Local, NaiveDate};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;

use crate::types::DateError;

/// Calendar date used as the cache key. Renders as `YYYY-MM-DD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DateKey(NaiveDate);

impl DateKey {
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    /// Today on the host's local clock.
    pub fn today() -> Self {
        Self(Local::now().date_naive())
    }

    /// Build a key from string components as they arrive over HTTP.
    ///
    /// Zero padding is optional, so `("2024", "3", "7")` and
    /// `("2024", "03", "07")` produce the same key.
    pub fn from_parts(year: &str, month: &str, day: &str) -> Result<Self, DateError> {
        let year: i32 = parse_part("year", year)?;
        let month: u32 = parse_part("month", month)?;
        let day: u32 = parse_part("day", day)?;

        NaiveDate::from_ymd_opt(year, month, day)
            .map(Self)
            .ok_or(DateError::OutOfRange { year, month, day })
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }
}

fn parse_part<T: std::str::FromStr>(field: &'static str, value: &str) -> Result<T, DateError> {
    value.trim().parse().map_err(|_| DateError::NotANumber {
        field,
        value: value.to_string(),
    })
}

impl fmt::Display for DateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

/// Date-keyed temperature readings.
///
/// Written by the refresh task, read by request handlers. Writes replace
/// the whole value for a key under the write lock, so readers see either the
/// old or the new reading.
#[derive(Debug, Default)]
pub struct TemperatureCache {
    readings: RwLock<HashMap<DateKey, f64>>,
}

impl TemperatureCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `value` under today's local date, replacing any earlier reading.
    pub fn record_today(&self, value: f64) -> DateKey {
        let key = DateKey::today();
        self.record(key, value);
        key
    }

    /// Store `value` under `key`. Returns the reading it replaced, if any.
    pub fn record(&self, key: DateKey, value: f64) -> Option<f64> {
        let previous = self.readings.write().insert(key, value);
        tracing::debug!(date = %key, temp = value, replaced = previous.is_some(), "Recorded temperature");
        previous
    }

    pub fn get(&self, key: DateKey) -> Option<f64> {
        self.readings.read().get(&key).copied()
    }

    /// Look up the reading for a date given as year/month/day strings.
    ///
    /// A date with no reading is `Ok(None)`; only malformed dates are errors.
    pub fn lookup(&self, year: &str, month: &str, day: &str) -> Result<Option<f64>, DateError> {
        let key = DateKey::from_parts(year, month, day)?;
        Ok(self.get(key))
    }

    /// Number of days with a reading.
    pub fn len(&self) -> usize {
        self.readings.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.read().is_empty()
    }
}
