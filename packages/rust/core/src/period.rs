//! Period resolution for weekly and monthly rollups.
//!
//! Every resolver has a `*_at` form taking `today` explicitly; the plain form
//! reads the local clock.

use chrono::{Datelike, Days, Local, Months, NaiveDate, NaiveDateTime, NaiveTime};

use worklog_shared::{Result, WorklogError};

/// Inclusive calendar-date interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Period {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Period {
    fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        let period = Self { start, end };
        if period.start_instant() > period.end_instant() {
            return Err(WorklogError::invalid_period(format!(
                "start date {start} is after end date {end}"
            )));
        }
        Ok(period)
    }

    /// Start of the first day.
    pub fn start_instant(&self) -> NaiveDateTime {
        self.start.and_time(NaiveTime::MIN)
    }

    /// Start of the last day. Comparisons against it are inclusive.
    pub fn end_instant(&self) -> NaiveDateTime {
        self.end.and_time(NaiveTime::MIN)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        let at = date.and_time(NaiveTime::MIN);
        self.start_instant() <= at && at <= self.end_instant()
    }

    /// Number of days in the interval, both ends counted.
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

impl std::fmt::Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ~ {}", self.start, self.end)
    }
}

/// A monthly period plus the year/month its label is derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthlyPeriod {
    pub period: Period,
    pub year: i32,
    pub month: u32,
}

impl MonthlyPeriod {
    /// First day of the labelled month.
    pub fn year_month(&self) -> NaiveDate {
        // year/month always come from a valid date or a checked constructor
        first_of_month(self.year, self.month).unwrap_or(self.period.start)
    }
}

// ---------------------------------------------------------------------------
// Weekly
// ---------------------------------------------------------------------------

/// Resolve a weekly period against the local date.
pub fn resolve_weekly(start: Option<&str>, end: Option<&str>) -> Result<Period> {
    resolve_weekly_at(start, end, Local::now().date_naive())
}

/// Missing end → `today`; missing start → six days before end.
pub fn resolve_weekly_at(start: Option<&str>, end: Option<&str>, today: NaiveDate) -> Result<Period> {
    let end = match given(end) {
        Some(s) => parse_date(s)?,
        None => today,
    };
    let start = match given(start) {
        Some(s) => parse_date(s)?,
        None => end
            .checked_sub_days(Days::new(6))
            .ok_or_else(|| WorklogError::invalid_period(format!("no week ends on {end}")))?,
    };
    Period::new(start, end)
}

// ---------------------------------------------------------------------------
// Monthly
// ---------------------------------------------------------------------------

/// Resolve a monthly period against the local date.
pub fn resolve_monthly(
    start: Option<&str>,
    end: Option<&str>,
    year: Option<i32>,
    month: Option<u32>,
) -> Result<MonthlyPeriod> {
    resolve_monthly_at(start, end, year, month, Local::now().date_naive())
}

/// Explicit bounds win over calendar anchors and must come as a pair; the
/// start date's month becomes the label. Otherwise the whole calendar month
/// of `year`/`month` (each defaulting to today's) is used.
pub fn resolve_monthly_at(
    start: Option<&str>,
    end: Option<&str>,
    year: Option<i32>,
    month: Option<u32>,
    today: NaiveDate,
) -> Result<MonthlyPeriod> {
    match (given(start), given(end)) {
        (Some(s), Some(e)) => {
            let period = Period::new(parse_date(s)?, parse_date(e)?)?;
            Ok(MonthlyPeriod {
                year: period.start.year(),
                month: period.start.month(),
                period,
            })
        }
        (None, None) => {
            let year = year.unwrap_or_else(|| today.year());
            let month = month.unwrap_or_else(|| today.month());
            let first = first_of_month(year, month)?;
            let last = last_of_month(first)?;
            Ok(MonthlyPeriod {
                period: Period::new(first, last)?,
                year,
                month,
            })
        }
        _ => Err(WorklogError::invalid_period(
            "start date and end date must be given together",
        )),
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn given(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Parse a `YYYY-MM-DD` date.
pub fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|e| {
        WorklogError::invalid_period(format!("invalid date '{value}' (expected YYYY-MM-DD): {e}"))
    })
}

fn first_of_month(year: i32, month: u32) -> Result<NaiveDate> {
    if !(1..=12).contains(&month) {
        return Err(WorklogError::invalid_period(format!(
            "month must be between 1 and 12, got {month}"
        )));
    }
    NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| WorklogError::invalid_period(format!("year {year} is out of range")))
}

fn last_of_month(first: NaiveDate) -> Result<NaiveDate> {
    first
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .ok_or_else(|| WorklogError::invalid_period(format!("no month end after {first}")))
}
