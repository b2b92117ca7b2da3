//! Splits a planned route into per-day ELD duty logs.
//!
//! The route events are first turned into one continuous activity timeline
//! (driving between points, on duty or off duty while stopped). Each calendar
//! day touched by an event then gets that timeline clipped to its own
//! `[00:00, 24:00)` window, so an activity running past midnight is recorded
//! as two truncated intervals, one per day. Whatever the timeline leaves
//! uncovered at either end of a day is filled with off-duty time.

use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, Offset, TimeZone, Utc};
use tracing::debug;

use crate::types::{end_of_day, start_of_day, DutyDayLog, DutyInterval, DutyStatus, RouteEvent};

/// A stretch of the trip spent in one duty status
#[derive(Debug, Clone, Copy, PartialEq)]
struct Segment {
    status: DutyStatus,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

fn activity_timeline(events: &[&RouteEvent]) -> Vec<Segment> {
    let mut segments = Vec::with_capacity(events.len() * 2);

    for (i, event) in events.iter().enumerate() {
        if i > 0 {
            let previous_departure = events[i - 1].departure_time();
            if previous_departure < event.arrival_time() {
                segments.push(Segment {
                    status: DutyStatus::Driving,
                    start: previous_departure,
                    end: event.arrival_time(),
                });
            }
        }

        if let Some(status) = event.point_type().duty_status() {
            segments.push(Segment {
                status,
                start: event.arrival_time(),
                end: event.departure_time(),
            });
        }
    }

    segments
}

/// Builds [`DutyDayLog`]s in a fixed timezone
#[derive(Debug, Clone, Copy)]
pub struct DutyLogPartitioner {
    offset: FixedOffset,
}

impl Default for DutyLogPartitioner {
    fn default() -> Self {
        Self::utc()
    }
}

impl DutyLogPartitioner {
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    pub fn utc() -> Self {
        Self::new(Utc.fix())
    }

    fn local_date(&self, at: DateTime<Utc>) -> NaiveDate {
        at.with_timezone(&self.offset).date_naive()
    }

    fn local_clock(&self, at: DateTime<Utc>) -> NaiveTime {
        at.with_timezone(&self.offset).time()
    }

    /// Local midnight of `date`, as a UTC instant
    fn day_start(&self, date: NaiveDate) -> DateTime<Utc> {
        let local_midnight = date.and_time(start_of_day());
        let utc_midnight = local_midnight - chrono::Duration::seconds(self.offset.local_minus_utc() as i64);
        Utc.from_utc_datetime(&utc_midnight)
    }

    /// One log per calendar day spanned by the events, oldest first.
    ///
    /// Events are sorted by arrival time before use, so callers may pass
    /// them in any order.
    pub fn partition(&self, events: &[RouteEvent]) -> Vec<DutyDayLog> {
        if events.is_empty() {
            return Vec::new();
        }

        let mut ordered: Vec<&RouteEvent> = events.iter().collect();
        ordered.sort_by_key(|e| e.arrival_time());

        let timeline = activity_timeline(&ordered);

        let mut days: BTreeMap<NaiveDate, Vec<&RouteEvent>> = BTreeMap::new();
        for event in ordered.iter().copied() {
            let arrival_day = self.local_date(event.arrival_time());
            days.entry(arrival_day).or_default().push(event);

            let departure_day = self.local_date(event.departure_time());
            if departure_day != arrival_day {
                days.entry(departure_day).or_default().push(event);
            }
        }

        let logs: Vec<DutyDayLog> = days
            .into_iter()
            .map(|(date, group)| self.build_day(date, &group, &timeline))
            .collect();

        debug!("Partitioned {} events into {} daily logs", events.len(), logs.len());
        logs
    }

    fn build_day(&self, date: NaiveDate, group: &[&RouteEvent], timeline: &[Segment]) -> DutyDayLog {
        let location = |event: Option<&&RouteEvent>| event.map(|e| e.location().to_string()).unwrap_or_default();

        let mut log = DutyDayLog {
            log_date: date,
            starting_location: location(group.first()),
            ending_location: location(group.last()),
            off_duty: Vec::new(),
            sleeper_berth: Vec::new(),
            driving: Vec::new(),
            on_duty: Vec::new(),
        };

        let window_start = self.day_start(date);
        let window_end = window_start + chrono::Duration::days(1);

        for segment in timeline {
            let start = segment.start.max(window_start);
            let end = segment.end.min(window_end);
            if start >= end {
                continue;
            }

            let end_clock = if end == window_end {
                end_of_day()
            } else {
                self.local_clock(end)
            };
            let interval = DutyInterval::new(self.local_clock(start), end_clock);
            if interval.is_empty() {
                continue;
            }

            match segment.status {
                DutyStatus::OffDuty => log.off_duty.push(interval),
                DutyStatus::SleeperBerth => log.sleeper_berth.push(interval),
                DutyStatus::Driving => log.driving.push(interval),
                DutyStatus::OnDuty => log.on_duty.push(interval),
            }
        }

        fill_day_boundaries(&mut log);
        log
    }
}

/// Off duty from midnight to the first activity and from the last activity
/// to the end of the day.
fn fill_day_boundaries(log: &mut DutyDayLog) {
    let recorded = log.all_intervals();

    let (Some(first), Some(last)) = (
        recorded.iter().min_by_key(|i| i.start_minute()),
        recorded.iter().max_by_key(|i| i.end_minute()),
    ) else {
        log.off_duty.push(DutyInterval::new(start_of_day(), end_of_day()));
        return;
    };

    if first.start != start_of_day() {
        log.off_duty.insert(0, DutyInterval::new(start_of_day(), first.start));
    }

    if last.end != end_of_day() {
        log.off_duty.push(DutyInterval::new(last.end, end_of_day()));
    }
}
