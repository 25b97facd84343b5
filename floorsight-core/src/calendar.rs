//! Calendar Flooring for Multi-Resolution Rollups
//!
//! ## Overview
//!
//! Aggregation groups samples by the start of the calendar period they fall
//! in. Periods are calendar periods, not fixed-width windows: a month is 28 to
//! 31 days and a local day is 23 to 25 hours across DST changes, so the floor
//! is computed on the wall clock of a [`CalendarZone`] and converted back to
//! epoch milliseconds.
//!
//! | Granularity | Floor                                          |
//! |-------------|------------------------------------------------|
//! | `raw`       | the timestamp itself                           |
//! | `hourly`    | start of the calendar hour                     |
//! | `daily`     | local midnight                                 |
//! | `weekly`    | local midnight of the most recent **Sunday**   |
//! | `monthly`   | local midnight of the 1st of the month         |
//!
//! Weeks start on Sunday, not on the ISO Monday.
//!
//! ## DST Handling
//!
//! Hourly floors are taken on the instant itself (minutes, seconds and
//! milliseconds are subtracted), so a repeated wall-clock hour after clocks
//! fall back gets two distinct buckets.
//!
//! A local midnight can be ambiguous (clocks fall back) or missing (clocks
//! spring forward at 00:00 in some zones). Ambiguous floors resolve to the
//! earlier of the two instants; missing floors resolve to the first valid
//! instant one hour later.

use core::fmt;
use core::str::FromStr;

use chrono::{
    DateTime, Datelike, Days, Duration, FixedOffset, Local, LocalResult, NaiveDateTime, TimeZone,
    Timelike, Utc,
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::constants::{MS_PER_MINUTE, MS_PER_SECOND};
use crate::errors::StoreError;
use crate::time::Timestamp;

/// Aggregation resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Granularity {
    /// No bucketing
    Raw,
    /// Calendar hour
    Hourly,
    /// Calendar day
    Daily,
    /// Sunday-start week
    Weekly,
    /// Calendar month
    Monthly,
}

impl Granularity {
    /// Every granularity, finest first
    pub const ALL: [Granularity; 5] = [
        Granularity::Raw,
        Granularity::Hourly,
        Granularity::Daily,
        Granularity::Weekly,
        Granularity::Monthly,
    ];

    /// Wire name (`raw`, `hourly`, ...)
    pub const fn name(&self) -> &'static str {
        match self {
            Granularity::Raw => "raw",
            Granularity::Hourly => "hourly",
            Granularity::Daily => "daily",
            Granularity::Weekly => "weekly",
            Granularity::Monthly => "monthly",
        }
    }

    /// Start of the period containing `timestamp`, in `zone`'s calendar
    pub fn floor(self, timestamp: Timestamp, zone: CalendarZone) -> Timestamp {
        if self == Granularity::Raw {
            return timestamp;
        }

        match zone {
            CalendarZone::Local => floor_in(self, timestamp, &Local),
            CalendarZone::Utc => floor_in(self, timestamp, &Utc),
            CalendarZone::FixedOffsetSeconds(secs) => match FixedOffset::east_opt(secs) {
                Some(offset) => floor_in(self, timestamp, &offset),
                None => floor_in(self, timestamp, &Utc),
            },
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Granularity {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Granularity::ALL
            .iter()
            .copied()
            .find(|g| g.name() == s)
            .ok_or(StoreError::validation("granularity", "unknown granularity"))
    }
}

/// Time zone whose wall clock defines bucket boundaries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum CalendarZone {
    /// Process local time (the dashboard host's zone)
    #[default]
    Local,
    /// UTC
    Utc,
    /// Fixed offset east of UTC, in seconds
    FixedOffsetSeconds(i32),
}

impl CalendarZone {
    /// False for offsets chrono cannot represent (|offset| >= 24h)
    pub fn is_valid(&self) -> bool {
        match self {
            CalendarZone::FixedOffsetSeconds(secs) => FixedOffset::east_opt(*secs).is_some(),
            _ => true,
        }
    }
}

fn floor_in<Tz: TimeZone>(granularity: Granularity, timestamp: Timestamp, tz: &Tz) -> Timestamp {
    let Some(utc) = i64::try_from(timestamp)
        .ok()
        .and_then(DateTime::<Utc>::from_timestamp_millis)
    else {
        return timestamp;
    };

    let local = utc.with_timezone(tz);
    let date = local.date_naive();

    let start = match granularity {
        Granularity::Raw => return timestamp,
        Granularity::Hourly => {
            let into_hour = u64::from(local.minute()) * MS_PER_MINUTE
                + u64::from(local.second()) * MS_PER_SECOND
                + u64::from(local.timestamp_subsec_millis());
            return timestamp.saturating_sub(into_hour);
        }
        Granularity::Daily => date.and_hms_opt(0, 0, 0),
        Granularity::Weekly => {
            let back = u64::from(local.weekday().num_days_from_sunday());
            date.checked_sub_days(Days::new(back))
                .and_then(|sunday| sunday.and_hms_opt(0, 0, 0))
        }
        Granularity::Monthly => date.with_day(1).and_then(|first| first.and_hms_opt(0, 0, 0)),
    };

    start
        .and_then(|naive| resolve_local(tz, naive))
        .map(|floored| floored.timestamp_millis().max(0) as Timestamp)
        .unwrap_or(timestamp)
}

fn resolve_local<Tz: TimeZone>(tz: &Tz, naive: NaiveDateTime) -> Option<DateTime<Tz>> {
    match earliest_instant(tz.from_local_datetime(&naive)) {
        Some(instant) => Some(instant),
        None => {
            let shifted = naive.checked_add_signed(Duration::hours(1))?;
            earliest_instant(tz.from_local_datetime(&shifted))
        }
    }
}

/// Earlier of the candidates for a wall-clock time
///
/// Zone providers do not agree on the order of the two `Ambiguous`
/// candidates (the Unix `Local` lists the later one first).
fn earliest_instant<Tz: TimeZone>(result: LocalResult<DateTime<Tz>>) -> Option<DateTime<Tz>> {
    match result {
        LocalResult::Single(instant) => Some(instant),
        LocalResult::Ambiguous(a, b) => {
            if a.timestamp_millis() <= b.timestamp_millis() {
                Some(a)
            } else {
                Some(b)
            }
        }
        LocalResult::None => None,
    }
}
