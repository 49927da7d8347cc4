use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::calendar::local_date;
use super::period::Period;
use super::reservation::{ReservationInterval, ReservationStatus};

/// Raw occupied-day counts for one window.
///
/// The ratio `occupied / total_days` is left to the caller and is not capped:
/// a dimension spanning several rooms can legitimately exceed one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OccupancyCount {
    pub occupied: u32,
    pub total_days: u32,
    /// Reservations ignored because they end at or before they start.
    pub skipped_malformed: u32,
    /// Overlapping reservations ignored because they are not finalized.
    pub excluded_by_status: u32,
}

/// Distinct local dates of `window` covered by at least one finalized stay.
///
/// A stay covers the nights `[date(start), date(end))`, clipped to the window.
pub fn occupied_dates<'a>(
    intervals: impl IntoIterator<Item = &'a ReservationInterval>,
    window: &Period,
) -> (BTreeSet<NaiveDate>, OccupancyCount) {
    let mut dates = BTreeSet::new();
    let mut count = OccupancyCount {
        total_days: window.total_days(),
        ..OccupancyCount::default()
    };

    for interval in intervals {
        if interval.is_malformed() {
            count.skipped_malformed += 1;
            continue;
        }
        if !interval.overlaps(window) {
            continue;
        }
        if !interval.is_finalized() {
            count.excluded_by_status += 1;
            continue;
        }

        let until = local_date(interval.end_date.min(window.end), window.basis);
        let mut day = local_date(interval.start_date.max(window.start), window.basis);
        while day < until {
            dates.insert(day);
            match day.succ_opt() {
                Some(next) => day = next,
                None => break,
            }
        }
    }

    if count.skipped_malformed > 0 {
        tracing::warn!(
            skipped = count.skipped_malformed,
            window = %window,
            "skipped malformed reservations"
        );
    }

    count.occupied = u32::try_from(dates.len()).unwrap_or(u32::MAX);
    (dates, count)
}

pub fn occupied_days<'a>(
    intervals: impl IntoIterator<Item = &'a ReservationInterval>,
    window: &Period,
) -> OccupancyCount {
    occupied_dates(intervals, window).1
}

/// Well-formed reservations overlapping `window`, counted per status.
pub fn status_breakdown<'a>(
    intervals: impl IntoIterator<Item = &'a ReservationInterval>,
    window: &Period,
) -> BTreeMap<ReservationStatus, u32> {
    let mut counts = BTreeMap::new();
    for interval in intervals {
        if interval.is_malformed() || !interval.overlaps(window) {
            continue;
        }
        *counts.entry(interval.status).or_insert(0) += 1;
    }
    counts
}
