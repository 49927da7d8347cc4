//! Calendar boundary arithmetic.
//!
//! Instants are carried in UTC. Every boundary is computed on the local wall
//! clock of the requested basis and converted back to UTC, so a "day" or a
//! "month" always starts at local midnight regardless of the offset in effect.
//!
//! Date steps are checked: a boundary past the last representable date is an
//! [`AnalyticsError::InvalidWindow`].

use chrono::{DateTime, Datelike, Days, Months, NaiveDate, NaiveTime, TimeDelta, TimeZone, Utc};
use chrono_tz::Tz;

use crate::error::{AnalyticsError, Result};

/// Local calendar date of `instant` in `basis`.
pub fn local_date(instant: DateTime<Utc>, basis: Tz) -> NaiveDate {
    instant.with_timezone(&basis).date_naive()
}

/// UTC instant at which the local calendar day `date` begins in `basis`.
///
/// A few zones move their clocks forward at midnight; on those days the
/// first existing local time (usually 01:00) is the start of the day.
pub fn local_midnight(date: NaiveDate, basis: Tz) -> DateTime<Utc> {
    let midnight = date.and_time(NaiveTime::MIN);
    (0..=2)
        .filter_map(|hours| midnight.checked_add_signed(TimeDelta::hours(hours)))
        .find_map(|local| basis.from_local_datetime(&local).earliest())
        .map_or_else(
            || Utc.from_utc_datetime(&midnight),
            |local| local.with_timezone(&Utc),
        )
}

fn out_of_range(date: NaiveDate, step: &str) -> AnalyticsError {
    AnalyticsError::InvalidWindow {
        reason: format!("{step} from {date} leaves the supported calendar range"),
    }
}

pub fn add_days(date: NaiveDate, days: u64) -> Result<NaiveDate> {
    date.checked_add_days(Days::new(days))
        .ok_or_else(|| out_of_range(date, &format!("adding {days} days")))
}

pub fn sub_days(date: NaiveDate, days: u64) -> Result<NaiveDate> {
    date.checked_sub_days(Days::new(days))
        .ok_or_else(|| out_of_range(date, &format!("subtracting {days} days")))
}

pub fn add_months(date: NaiveDate, months: u32) -> Result<NaiveDate> {
    date.checked_add_months(Months::new(months))
        .ok_or_else(|| out_of_range(date, &format!("adding {months} months")))
}

pub fn sub_months(date: NaiveDate, months: u32) -> Result<NaiveDate> {
    date.checked_sub_months(Months::new(months))
        .ok_or_else(|| out_of_range(date, &format!("subtracting {months} months")))
}

fn last_millisecond_before(boundary: DateTime<Utc>) -> DateTime<Utc> {
    boundary - TimeDelta::milliseconds(1)
}

// ---------------------------------------------------------------------------
// Date-level helpers
// ---------------------------------------------------------------------------

/// Monday of the ISO week containing `date`.
pub fn iso_week_monday(date: NaiveDate) -> Result<NaiveDate> {
    // Sunday is the seventh day of the ISO week, not the first.
    sub_days(date, u64::from(date.weekday().num_days_from_monday()))
}

pub fn first_day_of_month(date: NaiveDate) -> NaiveDate {
    // The first of the month always exists.
    date.with_day(1).unwrap_or(date)
}

/// Last day of the month containing `date` ("day 0" of the next month).
pub fn last_day_of_month(date: NaiveDate) -> Result<NaiveDate> {
    sub_days(add_months(first_day_of_month(date), 1)?, 1)
}

// ---------------------------------------------------------------------------
// Instant-level boundaries
// ---------------------------------------------------------------------------

pub fn start_of_day(instant: DateTime<Utc>, basis: Tz) -> DateTime<Utc> {
    local_midnight(local_date(instant, basis), basis)
}

/// 23:59:59.999 local time of the day containing `instant`.
pub fn end_of_day(instant: DateTime<Utc>, basis: Tz) -> Result<DateTime<Utc>> {
    let next = add_days(local_date(instant, basis), 1)?;
    Ok(last_millisecond_before(local_midnight(next, basis)))
}

pub fn start_of_iso_week(instant: DateTime<Utc>, basis: Tz) -> Result<DateTime<Utc>> {
    Ok(local_midnight(iso_week_monday(local_date(instant, basis))?, basis))
}

/// Sunday 23:59:59.999 local time closing the ISO week of `instant`.
pub fn end_of_iso_week(instant: DateTime<Utc>, basis: Tz) -> Result<DateTime<Utc>> {
    let next_monday = add_days(iso_week_monday(local_date(instant, basis))?, 7)?;
    Ok(last_millisecond_before(local_midnight(next_monday, basis)))
}

pub fn start_of_month(instant: DateTime<Utc>, basis: Tz) -> DateTime<Utc> {
    local_midnight(first_day_of_month(local_date(instant, basis)), basis)
}

pub fn end_of_month(instant: DateTime<Utc>, basis: Tz) -> Result<DateTime<Utc>> {
    let last = last_day_of_month(local_date(instant, basis))?;
    Ok(last_millisecond_before(local_midnight(add_days(last, 1)?, basis)))
}
