//! Inclusive calendar date ranges.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crewplan_core::{DomainError, DomainResult, ValueObject};

/// Inclusive `[start, end]` range of calendar days.
///
/// Serialized as `startDate`/`endDate` so records can flatten it into their
/// own fields.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "DateRangeFields")]
pub struct DateRange {
    #[serde(rename = "startDate")]
    start: NaiveDate,
    #[serde(rename = "endDate")]
    end: NaiveDate,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DateRangeFields {
    start_date: NaiveDate,
    end_date: NaiveDate,
}

impl TryFrom<DateRangeFields> for DateRange {
    type Error = DomainError;

    fn try_from(fields: DateRangeFields) -> Result<Self, Self::Error> {
        Self::new(fields.start_date, fields.end_date)
    }
}

impl ValueObject for DateRange {}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> DomainResult<Self> {
        if start > end {
            return Err(DomainError::validation(format!(
                "start date {start} is after end date {end}"
            )));
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Whole days between start and end (0 for a single-day range).
    pub fn duration_days(&self) -> i64 {
        (self.end - self.start).num_days()
    }

    pub fn overlaps(&self, other: &DateRange) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    pub fn contains(&self, other: &DateRange) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Split into consecutive buckets of `step_days`, the last one clipped at `end`.
    pub fn buckets(&self, step_days: u32) -> Vec<DateRange> {
        let step = i64::from(step_days.max(1));
        let mut out = Vec::new();
        let mut cursor = self.start;
        while cursor <= self.end {
            let bucket_end = cursor
                .checked_add_signed(Duration::days(step - 1))
                .map_or(self.end, |d| d.min(self.end));
            out.push(DateRange {
                start: cursor,
                end: bucket_end,
            });
            match cursor.checked_add_signed(Duration::days(step)) {
                Some(next) => cursor = next,
                None => break,
            }
        }
        out
    }
}
