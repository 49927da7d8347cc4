use std::str::FromStr;

use chrono::{DateTime, NaiveDate, TimeDelta, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use super::calendar::{
    add_days, add_months, first_day_of_month, iso_week_monday, local_date, local_midnight, sub_days,
    sub_months,
};
use crate::error::{AnalyticsError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodKind {
    Day,
    Week,
    Month,
    Custom,
}

impl FromStr for PeriodKind {
    type Err = AnalyticsError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "day" => Ok(Self::Day),
            "week" => Ok(Self::Week),
            "month" => Ok(Self::Month),
            "custom" => Ok(Self::Custom),
            _ => Err(AnalyticsError::InvalidPeriodKind {
                kind: s.to_string(),
                reason: "expected day, week, month or custom".into(),
            }),
        }
    }
}

impl std::fmt::Display for PeriodKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Day => write!(f, "day"),
            Self::Week => write!(f, "week"),
            Self::Month => write!(f, "month"),
            Self::Custom => write!(f, "custom"),
        }
    }
}

/// Half-open window `[start, end)` aligned to the calendar of `basis`.
///
/// For day, week and month periods `end` is the local midnight that opens the
/// next unit, so consecutive periods share a boundary and never overlap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub kind: PeriodKind,
    pub basis: Tz,
}

impl Period {
    pub fn day(date: NaiveDate, basis: Tz) -> Result<Self> {
        Ok(Self {
            start: local_midnight(date, basis),
            end: local_midnight(add_days(date, 1)?, basis),
            kind: PeriodKind::Day,
            basis,
        })
    }

    /// ISO week (Monday through Sunday) containing `date`.
    pub fn iso_week(date: NaiveDate, basis: Tz) -> Result<Self> {
        let monday = iso_week_monday(date)?;
        Ok(Self {
            start: local_midnight(monday, basis),
            end: local_midnight(add_days(monday, 7)?, basis),
            kind: PeriodKind::Week,
            basis,
        })
    }

    /// Calendar month containing `date`.
    pub fn month(date: NaiveDate, basis: Tz) -> Result<Self> {
        let first = first_day_of_month(date);
        Ok(Self {
            start: local_midnight(first, basis),
            end: local_midnight(add_months(first, 1)?, basis),
            kind: PeriodKind::Month,
            basis,
        })
    }

    pub fn custom(start: DateTime<Utc>, end: DateTime<Utc>, basis: Tz) -> Result<Self> {
        if end <= start {
            return Err(AnalyticsError::InvalidWindow {
                reason: format!("end {end} must be after start {start}"),
            });
        }
        Ok(Self {
            start,
            end,
            kind: PeriodKind::Custom,
            basis,
        })
    }

    /// Calendar period of `kind` containing `instant`.
    pub fn containing(kind: PeriodKind, instant: DateTime<Utc>, basis: Tz) -> Result<Self> {
        let date = local_date(instant, basis);
        match kind {
            PeriodKind::Day => Self::day(date, basis),
            PeriodKind::Week => Self::iso_week(date, basis),
            PeriodKind::Month => Self::month(date, basis),
            PeriodKind::Custom => Err(AnalyticsError::InvalidPeriodKind {
                kind: kind.to_string(),
                reason: "custom windows need explicit bounds".into(),
            }),
        }
    }

    /// The comparable period immediately preceding this one.
    ///
    /// Calendar kinds step back one whole unit, so the previous month keeps
    /// its own day count. Custom windows step back by their exact duration.
    pub fn shift_back(&self) -> Result<Self> {
        let first = self.first_date();
        match self.kind {
            PeriodKind::Day => Self::day(sub_days(first, 1)?, self.basis),
            PeriodKind::Week => Self::iso_week(sub_days(first, 7)?, self.basis),
            PeriodKind::Month => Self::month(sub_months(first, 1)?, self.basis),
            PeriodKind::Custom => {
                let start = self.start.checked_sub_signed(self.duration()).ok_or_else(|| {
                    AnalyticsError::InvalidWindow {
                        reason: format!("no window of equal length before {self}"),
                    }
                })?;
                Ok(Self {
                    start,
                    end: self.start,
                    kind: PeriodKind::Custom,
                    basis: self.basis,
                })
            }
        }
    }

    pub fn duration(&self) -> TimeDelta {
        self.end - self.start
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant < self.end
    }

    /// Whether `[start, end)` shares at least one instant with this period.
    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        start < self.end && end > self.start
    }

    /// Local date of the first instant of the period.
    pub fn first_date(&self) -> NaiveDate {
        local_date(self.start, self.basis)
    }

    /// Local date of the last instant of the period.
    pub fn last_date(&self) -> NaiveDate {
        local_date(self.end - TimeDelta::milliseconds(1), self.basis)
    }

    /// Number of days in the window, rounded up, never below one.
    ///
    /// Measured on the local wall clock so 23- and 25-hour DST days still
    /// count as a single day.
    pub fn total_days(&self) -> u32 {
        let span = self.end.with_timezone(&self.basis).naive_local()
            - self.start.with_timezone(&self.basis).naive_local();
        let whole = span.num_days();
        let partial = span - TimeDelta::days(whole) > TimeDelta::zero();
        u32::try_from(whole + i64::from(partial))
            .unwrap_or(0)
            .max(1)
    }

    /// Every local date touched by the period, in order.
    pub fn local_dates(&self) -> Vec<NaiveDate> {
        let last = self.last_date();
        let mut dates = Vec::new();
        let mut current = self.first_date();
        while current <= last {
            dates.push(current);
            match current.succ_opt() {
                Some(next) => current = next,
                None => break,
            }
        }
        dates
    }
}

impl std::fmt::Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} to {} ({})",
            self.kind,
            self.first_date(),
            self.last_date(),
            self.basis
        )
    }
}

// ---------------------------------------------------------------------------
// Resolver
// ---------------------------------------------------------------------------

/// A period together with its comparable predecessor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodPair {
    pub current: Period,
    pub prior: Period,
}

impl PeriodPair {
    /// Pairs an explicit window with the window of equal length before it.
    pub fn for_period(current: Period) -> Result<Self> {
        Ok(Self {
            prior: current.shift_back()?,
            current,
        })
    }
}

/// Inputs of [`resolve`], as read from configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolverConfig {
    pub period_kind: PeriodKind,
    #[serde(default)]
    pub reference_instant: Option<DateTime<Utc>>,
    pub timezone_basis: Tz,
}

impl ResolverConfig {
    pub fn resolve(&self) -> Result<PeriodPair> {
        resolve(self.period_kind, self.reference_instant, self.timezone_basis)
    }
}

pub fn parse_timezone(name: &str) -> Result<Tz> {
    name.trim()
        .parse::<Tz>()
        .map_err(|_| AnalyticsError::UnknownTimezone {
            name: name.to_string(),
        })
}

/// Current calendar period of `kind` containing `reference` (now when
/// absent) and the period immediately before it.
pub fn resolve(kind: PeriodKind, reference: Option<DateTime<Utc>>, basis: Tz) -> Result<PeriodPair> {
    let reference = reference.unwrap_or_else(Utc::now);
    let current = Period::containing(kind, reference, basis)?;
    let pair = PeriodPair::for_period(current)?;
    tracing::debug!(
        kind = %kind,
        current = %pair.current,
        prior = %pair.prior,
        "resolved comparison periods"
    );
    Ok(pair)
}
