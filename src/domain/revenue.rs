use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Money;
use super::calendar::local_date;
use super::invoice::InvoiceRecord;
use super::period::Period;
use super::reservation::ReservationInterval;

/// A record carrying an amount of income recognized at one instant.
pub trait RevenueRecord {
    fn recognized_at(&self) -> DateTime<Utc>;
    fn amount(&self) -> Money;

    /// Whether the record contributes to income at all.
    fn counts_as_revenue(&self) -> bool {
        true
    }
}

impl RevenueRecord for InvoiceRecord {
    fn recognized_at(&self) -> DateTime<Utc> {
        self.issued_at
    }

    fn amount(&self) -> Money {
        self.total
    }
}

/// Reservations are income at check-in, and only once the stay is finalized.
impl RevenueRecord for ReservationInterval {
    fn recognized_at(&self) -> DateTime<Utc> {
        self.start_date
    }

    fn amount(&self) -> Money {
        self.amount
    }

    fn counts_as_revenue(&self) -> bool {
        self.is_finalized() && !self.is_malformed()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AggregateResult {
    pub count: u64,
    pub sum: Money,
    /// `sum / count`, zero when there are no records.
    pub average: Money,
}

impl AggregateResult {
    pub fn from_totals(count: u64, sum: Money) -> Self {
        let average = if count > 0 {
            sum / Decimal::from(count)
        } else {
            Decimal::ZERO
        };
        Self {
            count,
            sum,
            average,
        }
    }

    pub fn summarize(amounts: impl IntoIterator<Item = Money>) -> Self {
        let (count, sum) = amounts
            .into_iter()
            .fold((0_u64, Decimal::ZERO), |(count, sum), amount| {
                (count + 1, add_money(sum, amount))
            });
        Self::from_totals(count, sum)
    }
}

/// Adds `amount` to a running total, saturating at the representable range.
fn add_money(sum: Money, amount: Money) -> Money {
    sum.checked_add(amount).unwrap_or_else(|| {
        tracing::warn!(%sum, %amount, "revenue total overflowed, saturating");
        if amount.is_sign_negative() {
            Decimal::MIN
        } else {
            Decimal::MAX
        }
    })
}

impl std::fmt::Display for AggregateResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} records, total {}, average {}",
            self.count,
            self.sum.round_dp(2),
            self.average.round_dp(2)
        )
    }
}

/// Records whose income is recognized inside `[window.start, window.end)`.
pub fn in_window<'a, R: RevenueRecord>(
    records: &'a [R],
    window: &'a Period,
) -> impl Iterator<Item = &'a R> + 'a {
    records
        .iter()
        .filter(|r| r.counts_as_revenue() && window.contains(r.recognized_at()))
}

pub fn aggregate<R: RevenueRecord>(records: &[R], window: &Period) -> AggregateResult {
    AggregateResult::summarize(in_window(records, window).map(RevenueRecord::amount))
}

/// Groups `(key, amount)` pairs, one aggregate per key, keys ascending.
pub fn group_totals<K: Ord>(
    items: impl IntoIterator<Item = (K, Money)>,
) -> BTreeMap<K, AggregateResult> {
    let mut totals: BTreeMap<K, (u64, Money)> = BTreeMap::new();
    for (key, amount) in items {
        let entry = totals.entry(key).or_insert((0, Decimal::ZERO));
        entry.0 += 1;
        entry.1 = add_money(entry.1, amount);
    }
    totals
        .into_iter()
        .map(|(key, (count, sum))| (key, AggregateResult::from_totals(count, sum)))
        .collect()
}

pub fn aggregate_by<R, K, F>(records: &[R], window: &Period, key_fn: F) -> BTreeMap<K, AggregateResult>
where
    R: RevenueRecord,
    K: Ord,
    F: Fn(&R) -> K,
{
    group_totals(in_window(records, window).map(|r| (key_fn(r), r.amount())))
}

// ---------------------------------------------------------------------------
// Key extractors
// ---------------------------------------------------------------------------

/// Local calendar date on which the record's income is recognized.
pub fn by_local_day<R: RevenueRecord>(basis: Tz) -> impl Fn(&R) -> NaiveDate {
    move |r| local_date(r.recognized_at(), basis)
}

pub fn by_guest(invoice: &InvoiceRecord) -> String {
    invoice.guest_id.clone()
}

pub fn by_nationality(invoice: &InvoiceRecord) -> String {
    invoice.nationality_key().to_string()
}

/// Per-day revenue for every local date of `window`, zero-filled.
pub fn daily_series<R: RevenueRecord>(
    records: &[R],
    window: &Period,
) -> BTreeMap<NaiveDate, AggregateResult> {
    let mut series = aggregate_by(records, window, by_local_day::<R>(window.basis));
    for day in window.local_dates() {
        series.entry(day).or_default();
    }
    series
}

/// Guests of finalized stays checking in inside `window`.
pub fn guest_totals(intervals: &[ReservationInterval], window: &Period) -> u64 {
    in_window(intervals, window)
        .map(|r| u64::from(r.guest_count.unwrap_or(0)))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::reservation::ReservationStatus;
    use crate::test_helpers::{date, make_invoice, make_reservation, utc, utc_hms};
    use chrono_tz::{America, UTC};
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn march() -> Period {
        Period::month(date(2024, 3, 1), UTC).unwrap()
    }

    #[test]
    fn aggregate_empty_is_zero() {
        let none: Vec<InvoiceRecord> = Vec::new();
        let result = aggregate(&none, &march());
        assert_eq!(result, AggregateResult::default());
        assert_eq!(result.average, Decimal::ZERO);
    }

    #[test]
    fn aggregate_single_invoice() {
        let invoices = vec![make_invoice("1", (2024, 3, 4), dec!(300), "g1", Some("Peru"))];
        let result = aggregate(&invoices, &march());
        assert_eq!(
            result,
            AggregateResult {
                count: 1,
                sum: dec!(300),
                average: dec!(300),
            }
        );
    }

    #[test]
    fn aggregate_uses_exact_decimal_sums() {
        let invoices: Vec<InvoiceRecord> = (0..10)
            .map(|i| make_invoice(&i.to_string(), (2024, 3, 5), dec!(0.1), "g", None))
            .collect();
        let result = aggregate(&invoices, &march());
        assert_eq!(result.sum, dec!(1.0));
        assert_eq!(result.average, dec!(0.1));
    }

    #[test]
    fn aggregate_window_is_half_open() {
        let mut at_start = make_invoice("1", (2024, 3, 1), dec!(10), "g", None);
        at_start.issued_at = utc(2024, 3, 1);
        let mut at_end = make_invoice("2", (2024, 4, 1), dec!(20), "g", None);
        at_end.issued_at = utc(2024, 4, 1);
        let before = make_invoice("3", (2024, 2, 29), dec!(40), "g", None);
        let result = aggregate(&[at_start, at_end, before], &march());
        assert_eq!(result.count, 1);
        assert_eq!(result.sum, dec!(10));
    }

    #[test]
    fn aggregate_average_of_uneven_totals() {
        let invoices = vec![
            make_invoice("1", (2024, 3, 2), dec!(100), "g1", None),
            make_invoice("2", (2024, 3, 3), dec!(250), "g2", None),
        ];
        let result = aggregate(&invoices, &march());
        assert_eq!(result.count, 2);
        assert_eq!(result.sum, dec!(350));
        assert_eq!(result.average, dec!(175));
    }

    #[test]
    fn aggregate_by_guest() {
        let invoices = vec![
            make_invoice("1", (2024, 3, 2), dec!(100), "g1", None),
            make_invoice("2", (2024, 3, 3), dec!(50), "g2", None),
            make_invoice("3", (2024, 3, 9), dec!(300), "g1", None),
        ];
        let groups = aggregate_by(&invoices, &march(), by_guest);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups["g1"], AggregateResult::from_totals(2, dec!(400)));
        assert_eq!(groups["g1"].average, dec!(200));
        assert_eq!(groups["g2"].count, 1);
    }

    #[test]
    fn aggregate_by_nationality_keeps_blank_bucket() {
        let invoices = vec![
            make_invoice("1", (2024, 3, 2), dec!(100), "g1", Some("Chile")),
            make_invoice("2", (2024, 3, 3), dec!(50), "g2", None),
            make_invoice("3", (2024, 3, 4), dec!(70), "g3", Some(" ")),
        ];
        let groups = aggregate_by(&invoices, &march(), by_nationality);
        assert_eq!(groups[""].count, 2);
        assert_eq!(groups[""].sum, dec!(120));
        assert_eq!(groups["Chile"].count, 1);
    }

    #[test]
    fn per_day_series_uses_local_dates() {
        let window = Period::month(date(2024, 3, 1), America::Bogota).unwrap();
        let mut late = make_invoice("1", (2024, 3, 2), dec!(80), "g1", None);
        // 02:00 UTC on March 3 is 21:00 on March 2 in Bogota.
        late.issued_at = utc_hms(2024, 3, 3, 2, 0, 0);
        let groups = aggregate_by(&[late], &window, by_local_day::<InvoiceRecord>(window.basis));
        assert_eq!(groups.keys().copied().collect::<Vec<_>>(), vec![date(2024, 3, 2)]);
    }

    #[test]
    fn daily_series_is_zero_filled() {
        let invoices = vec![make_invoice("1", (2024, 3, 4), dec!(300), "g1", None)];
        let series = daily_series(&invoices, &march());
        assert_eq!(series.len(), 31);
        assert_eq!(series[&date(2024, 3, 4)].sum, dec!(300));
        assert_eq!(series[&date(2024, 3, 5)], AggregateResult::default());
    }

    #[test]
    fn only_finalized_reservations_count_as_revenue() {
        let mut finalized =
            make_reservation("1", "101", (2024, 3, 1), (2024, 3, 4), ReservationStatus::Finalized);
        finalized.amount = dec!(300);
        let pending =
            make_reservation("2", "101", (2024, 3, 5), (2024, 3, 6), ReservationStatus::Pending);
        let cancelled =
            make_reservation("3", "102", (2024, 3, 5), (2024, 3, 6), ReservationStatus::Cancelled);
        let result = aggregate(&[finalized, pending, cancelled], &march());
        assert_eq!(result, AggregateResult::from_totals(1, dec!(300)));
    }

    #[test]
    fn guest_totals_sum_finalized_check_ins() {
        let mut a = make_reservation("1", "101", (2024, 3, 1), (2024, 3, 4), ReservationStatus::Finalized);
        a.guest_count = Some(3);
        let b = make_reservation("2", "102", (2024, 3, 2), (2024, 3, 4), ReservationStatus::Finalized);
        let mut c = make_reservation("3", "103", (2024, 3, 2), (2024, 3, 4), ReservationStatus::Finalized);
        c.guest_count = None;
        let d = make_reservation("4", "104", (2024, 3, 2), (2024, 3, 4), ReservationStatus::Pending);
        assert_eq!(guest_totals(&[a, b, c, d], &march()), 5);
    }

    #[test]
    fn group_totals_orders_keys() {
        let groups = group_totals(vec![("b", dec!(1)), ("a", dec!(2)), ("b", dec!(3))]);
        assert_eq!(groups.keys().copied().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(groups["b"], AggregateResult::from_totals(2, dec!(4)));
    }

    #[test]
    fn aggregate_display_rounds() {
        let result = AggregateResult::from_totals(3, dec!(100));
        assert_eq!(result.to_string(), "3 records, total 100, average 33.33");
    }

    #[test]
    fn aggregate_saturates_instead_of_overflowing() {
        let invoices = vec![
            make_invoice("1", (2024, 3, 4), Decimal::MAX, "g1", None),
            make_invoice("2", (2024, 3, 5), Decimal::MAX, "g2", None),
        ];
        let result = aggregate(&invoices, &march());
        assert_eq!(result.count, 2);
        assert_eq!(result.sum, Decimal::MAX);
        assert_eq!(result.average, Decimal::MAX / Decimal::from(2));
    }

    #[test]
    fn grouped_totals_saturate_in_both_directions() {
        let groups = group_totals(vec![
            ("credit", Decimal::MAX),
            ("credit", Decimal::MAX),
            ("refund", Decimal::MIN),
            ("refund", Decimal::MIN),
        ]);
        assert_eq!(groups["credit"].sum, Decimal::MAX);
        assert_eq!(groups["refund"].sum, Decimal::MIN);
    }
}
