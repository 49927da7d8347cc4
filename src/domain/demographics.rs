#![allow(clippy::cast_precision_loss)] // Counts are small enough for f64

use serde::{Deserialize, Serialize};

use super::Money;
use super::invoice::InvoiceRecord;
use super::period::Period;
use super::revenue::{group_totals, in_window};

/// One guest's contribution, tagged with nationality.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuestRevenue {
    pub nationality: String,
    pub total: Money,
}

impl From<&InvoiceRecord> for GuestRevenue {
    fn from(invoice: &InvoiceRecord) -> Self {
        Self {
            nationality: invoice.nationality_key().to_string(),
            total: invoice.total,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NationalityBucket {
    /// Empty for guests with no recorded nationality.
    pub nationality: String,
    pub count: u64,
    pub percent_of_total: f64,
    pub revenue: Money,
    pub average_per_guest: Money,
}

impl std::fmt::Display for NationalityBucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = if self.nationality.is_empty() {
            "Unknown"
        } else {
            self.nationality.as_str()
        };
        write!(
            f,
            "{name}: {} guests ({:.1}%), revenue {}, avg {}",
            self.count,
            self.percent_of_total,
            self.revenue.round_dp(2),
            self.average_per_guest.round_dp(2)
        )
    }
}

/// Buckets records by nationality, largest first.
///
/// Ties are ordered by nationality. With `top_n` only the first buckets are
/// returned, but percentages are always shares of the whole population.
pub fn by_nationality(records: &[GuestRevenue], top_n: Option<usize>) -> Vec<NationalityBucket> {
    let groups = group_totals(
        records
            .iter()
            .map(|r| (r.nationality.trim().to_string(), r.total)),
    );
    let population = records.len() as f64;

    let mut buckets: Vec<NationalityBucket> = groups
        .into_iter()
        .map(|(nationality, totals)| NationalityBucket {
            nationality,
            count: totals.count,
            percent_of_total: if population > 0.0 {
                totals.count as f64 / population * 100.0
            } else {
                0.0
            },
            revenue: totals.sum,
            average_per_guest: totals.average,
        })
        .collect();
    buckets.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| a.nationality.cmp(&b.nationality))
    });

    if let Some(n) = top_n {
        buckets.truncate(n);
    }
    buckets
}

/// Nationality buckets of the invoices issued inside `window`.
pub fn nationality_breakdown(
    invoices: &[InvoiceRecord],
    window: &Period,
    top_n: Option<usize>,
) -> Vec<NationalityBucket> {
    let records: Vec<GuestRevenue> = in_window(invoices, window).map(GuestRevenue::from).collect();
    by_nationality(&records, top_n)
}
