//! ELD duty log types

use chrono::{NaiveDate, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

const CLOCK_FORMAT: &str = "%H:%M";

pub fn start_of_day() -> NaiveTime {
    NaiveTime::MIN
}

/// Last minute of the log day. An interval ending here runs to midnight.
pub fn end_of_day() -> NaiveTime {
    NaiveTime::MIN + chrono::Duration::minutes(24 * 60 - 1)
}

fn minute_of_day(t: NaiveTime) -> u32 {
    t.num_seconds_from_midnight() / 60
}

/// A `[start, end]` wall-clock range inside one log day, minute precision.
///
/// Serialized as `["HH:MM", "HH:MM"]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "[String; 2]", try_from = "[String; 2]")]
pub struct DutyInterval {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl DutyInterval {
    pub fn new(start: NaiveTime, end: NaiveTime) -> Self {
        Self {
            start: truncate_to_minute(start),
            end: truncate_to_minute(end),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    pub fn start_minute(&self) -> u32 {
        minute_of_day(self.start)
    }

    /// End minute, with the end-of-day sentinel counted as 1440.
    pub fn end_minute(&self) -> u32 {
        if self.end == end_of_day() {
            24 * 60
        } else {
            minute_of_day(self.end)
        }
    }

    pub fn minutes(&self) -> u32 {
        self.end_minute().saturating_sub(self.start_minute())
    }
}

fn truncate_to_minute(t: NaiveTime) -> NaiveTime {
    NaiveTime::from_hms_opt(t.hour(), t.minute(), 0).unwrap_or(t)
}

impl From<DutyInterval> for [String; 2] {
    fn from(interval: DutyInterval) -> Self {
        [
            interval.start.format(CLOCK_FORMAT).to_string(),
            interval.end.format(CLOCK_FORMAT).to_string(),
        ]
    }
}

impl TryFrom<[String; 2]> for DutyInterval {
    type Error = ValidationError;

    fn try_from([start, end]: [String; 2]) -> Result<Self, Self::Error> {
        let parse = |s: &str| {
            NaiveTime::parse_from_str(s, CLOCK_FORMAT)
                .map_err(|_| ValidationError::InvalidClockTime(s.to_string()))
        };
        Ok(DutyInterval::new(parse(&start)?, parse(&end)?))
    }
}

/// One calendar day of a driver's duty record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DutyDayLog {
    pub log_date: NaiveDate,
    pub starting_location: String,
    pub ending_location: String,
    pub off_duty: Vec<DutyInterval>,
    /// Sleeper berth is not modeled; always empty.
    pub sleeper_berth: Vec<DutyInterval>,
    pub driving: Vec<DutyInterval>,
    pub on_duty: Vec<DutyInterval>,
}

/// Minutes spent in each duty status over one log day
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DutyTotals {
    pub off_duty_minutes: u32,
    pub sleeper_berth_minutes: u32,
    pub driving_minutes: u32,
    pub on_duty_minutes: u32,
}

impl DutyTotals {
    pub fn total_minutes(&self) -> u32 {
        self.off_duty_minutes + self.sleeper_berth_minutes + self.driving_minutes + self.on_duty_minutes
    }
}

impl DutyDayLog {
    pub fn totals(&self) -> DutyTotals {
        let sum = |intervals: &[DutyInterval]| -> u32 { intervals.iter().map(DutyInterval::minutes).sum() };
        DutyTotals {
            off_duty_minutes: sum(&self.off_duty),
            sleeper_berth_minutes: sum(&self.sleeper_berth),
            driving_minutes: sum(&self.driving),
            on_duty_minutes: sum(&self.on_duty),
        }
    }

    /// All intervals of the day, ordered by start.
    pub fn all_intervals(&self) -> Vec<DutyInterval> {
        let mut all: Vec<DutyInterval> = self
            .off_duty
            .iter()
            .chain(&self.sleeper_berth)
            .chain(&self.driving)
            .chain(&self.on_duty)
            .copied()
            .collect();
        all.sort_by_key(|i| (i.start_minute(), i.end_minute()));
        all
    }

    /// True when the intervals cover the whole day with no gap and no overlap.
    pub fn tiles_day(&self) -> bool {
        let mut cursor = 0;
        for interval in self.all_intervals() {
            if interval.start_minute() != cursor || interval.is_empty() {
                return false;
            }
            cursor = interval.end_minute();
        }
        cursor == 24 * 60
    }
}
