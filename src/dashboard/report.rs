#![allow(clippy::cast_precision_loss)] // Day counts are small enough for f64

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::comparison::{ComparativeResult, compare, compare_counts, compare_money};
use crate::domain::demographics::{NationalityBucket, nationality_breakdown};
use crate::domain::invoice::InvoiceRecord;
use crate::domain::occupancy::{OccupancyCount, occupied_days, status_breakdown};
use crate::domain::period::{Period, PeriodPair};
use crate::domain::reservation::{ReservationInterval, ReservationStatus};
use crate::domain::revenue::{AggregateResult, aggregate, daily_series, guest_totals};
use crate::ports::record_source::Scope;

/// Records fetched for one window.
#[derive(Debug, Clone, Default)]
pub struct WindowRecords {
    pub reservations: Vec<ReservationInterval>,
    pub invoices: Vec<InvoiceRecord>,
}

/// Occupied room-days of a window, summed room by room.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RoomOccupancy {
    pub rooms: u32,
    pub counts: OccupancyCount,
    /// `occupied / (rooms * total_days) * 100`, not capped.
    pub rate_percent: f64,
}

impl RoomOccupancy {
    /// Each room's days are deduplicated on their own so two rooms sold on
    /// the same night count twice, once per room.
    pub fn measure(reservations: &[ReservationInterval], window: &Period, rooms: u32) -> Self {
        let mut by_room: BTreeMap<&str, Vec<&ReservationInterval>> = BTreeMap::new();
        for reservation in reservations {
            by_room
                .entry(reservation.room_id.as_str())
                .or_default()
                .push(reservation);
        }

        let mut counts = OccupancyCount {
            total_days: window.total_days(),
            ..OccupancyCount::default()
        };
        for stays in by_room.values() {
            let room = occupied_days(stays.iter().copied(), window);
            counts.occupied += room.occupied;
            counts.skipped_malformed += room.skipped_malformed;
            counts.excluded_by_status += room.excluded_by_status;
        }

        let capacity = f64::from(rooms.max(1)) * f64::from(counts.total_days);
        Self {
            rooms: rooms.max(1),
            counts,
            rate_percent: f64::from(counts.occupied) / capacity * 100.0,
        }
    }
}

/// Period-over-period KPIs for one scope.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KpiReport {
    pub scope: Scope,
    pub periods: PeriodPair,
    pub occupancy: ComparativeResult,
    pub revenue: ComparativeResult,
    pub average_ticket: ComparativeResult,
    pub reservations: ComparativeResult,
    pub guests: ComparativeResult,
    pub current_occupancy: RoomOccupancy,
    pub prior_occupancy: RoomOccupancy,
    pub current_revenue: AggregateResult,
    pub prior_revenue: AggregateResult,
    pub status_breakdown: BTreeMap<ReservationStatus, u32>,
    pub daily_revenue: BTreeMap<NaiveDate, AggregateResult>,
    pub top_nationalities: Vec<NationalityBucket>,
}

impl KpiReport {
    pub fn build(
        scope: Scope,
        periods: PeriodPair,
        rooms: u32,
        top_nationalities: usize,
        current: &WindowRecords,
        prior: &WindowRecords,
    ) -> Self {
        let current_occupancy = RoomOccupancy::measure(&current.reservations, &periods.current, rooms);
        let prior_occupancy = RoomOccupancy::measure(&prior.reservations, &periods.prior, rooms);

        let current_revenue = aggregate(&current.invoices, &periods.current);
        let prior_revenue = aggregate(&prior.invoices, &periods.prior);

        let current_stays = aggregate(&current.reservations, &periods.current);
        let prior_stays = aggregate(&prior.reservations, &periods.prior);

        Self {
            occupancy: compare(current_occupancy.rate_percent, prior_occupancy.rate_percent),
            revenue: compare_money(current_revenue.sum, prior_revenue.sum),
            average_ticket: compare_money(current_revenue.average, prior_revenue.average),
            reservations: compare_counts(current_stays.count, prior_stays.count),
            guests: compare_counts(
                guest_totals(&current.reservations, &periods.current),
                guest_totals(&prior.reservations, &periods.prior),
            ),
            status_breakdown: status_breakdown(&current.reservations, &periods.current),
            daily_revenue: daily_series(&current.invoices, &periods.current),
            top_nationalities: nationality_breakdown(
                &current.invoices,
                &periods.current,
                Some(top_nationalities),
            ),
            current_occupancy,
            prior_occupancy,
            current_revenue,
            prior_revenue,
            scope,
            periods,
        }
    }

    /// Malformed reservations seen in either window.
    pub fn skipped_malformed(&self) -> u32 {
        self.current_occupancy.counts.skipped_malformed + self.prior_occupancy.counts.skipped_malformed
    }
}

/// Rooms to divide occupancy by: the configured count, else the rooms seen.
pub fn room_capacity(scope: &Scope, configured: Option<u32>, seen: &[&WindowRecords]) -> u32 {
    let rooms = match scope {
        Scope::Room(_) => 1,
        Scope::Hotel => configured.unwrap_or_else(|| {
            let seen_rooms: BTreeSet<&str> = seen
                .iter()
                .flat_map(|w| w.reservations.iter().map(|r| r.room_id.as_str()))
                .collect();
            u32::try_from(seen_rooms.len()).unwrap_or(u32::MAX)
        }),
    };
    rooms.max(1)
}

impl std::fmt::Display for KpiReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "# KPIs: {}", self.scope)?;
        writeln!(f, "Current: {}", self.periods.current)?;
        writeln!(f, "Prior:   {}", self.periods.prior)?;
        writeln!(
            f,
            "Occupancy: {:.1}% ({} of {} room-days, {} rooms) vs {:.1}% ({:+.1}%, {})",
            self.occupancy.current,
            self.current_occupancy.counts.occupied,
            u64::from(self.current_occupancy.rooms) * u64::from(self.current_occupancy.counts.total_days),
            self.current_occupancy.rooms,
            self.occupancy.prior,
            self.occupancy.delta_percent,
            self.occupancy.direction
        )?;
        writeln!(f, "Revenue: {}", self.revenue)?;
        writeln!(f, "Average ticket: {}", self.average_ticket)?;
        writeln!(f, "Finalized stays: {}", self.reservations)?;
        writeln!(f, "Guests: {}", self.guests)?;
        if !self.status_breakdown.is_empty() {
            let parts: Vec<String> = self
                .status_breakdown
                .iter()
                .map(|(status, n)| format!("{status} {n}"))
                .collect();
            writeln!(f, "Reservations by status: {}", parts.join(", "))?;
        }
        let skipped = self.skipped_malformed();
        if skipped > 0 {
            writeln!(f, "Warning: {skipped} malformed reservations skipped")?;
        }
        if !self.top_nationalities.is_empty() {
            writeln!(f, "\nTop nationalities:")?;
            for bucket in &self.top_nationalities {
                writeln!(f, "  {bucket}")?;
            }
        }
        if !self.daily_revenue.is_empty() {
            writeln!(f, "\nDaily revenue:")?;
            writeln!(f, "{:<12} {:>6} {:>12}", "Date", "Count", "Total")?;
            for (day, totals) in &self.daily_revenue {
                writeln!(
                    f,
                    "{:<12} {:>6} {:>12}",
                    day.to_string(),
                    totals.count,
                    totals.sum.round_dp(2).to_string()
                )?;
            }
        }
        Ok(())
    }
}
