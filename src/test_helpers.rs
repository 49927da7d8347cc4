use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::domain::invoice::InvoiceRecord;
use crate::domain::period::Period;
use crate::domain::reservation::{ReservationInterval, ReservationStatus};
use crate::error::{AnalyticsError, Result};
use crate::ports::record_source::{RecordSource, Scope};

type ReservationsFn = Box<dyn Fn(&Scope, &Period) -> Result<Vec<ReservationInterval>> + Send + Sync>;
type InvoicesFn = Box<dyn Fn(&Scope, &Period) -> Result<Vec<InvoiceRecord>> + Send + Sync>;

pub struct MockRecordSource {
    reservations_fn: Mutex<ReservationsFn>,
    invoices_fn: Mutex<InvoicesFn>,
}

impl Default for MockRecordSource {
    fn default() -> Self {
        Self::new()
    }
}

impl MockRecordSource {
    pub fn new() -> Self {
        Self {
            reservations_fn: Mutex::new(Box::new(|_, _| Ok(vec![]))),
            invoices_fn: Mutex::new(Box::new(|_, _| Ok(vec![]))),
        }
    }

    /// Serves `records` filtered by scope and window overlap.
    #[must_use]
    pub fn with_reservations(self, records: Vec<ReservationInterval>) -> Self {
        *self.reservations_fn.lock().unwrap() = Box::new(move |scope, window| {
            Ok(records
                .iter()
                .filter(|r| scope.includes_room(&r.room_id))
                .filter(|r| window.overlaps(r.start_date, r.end_date))
                .cloned()
                .collect())
        });
        self
    }

    /// Serves `records` issued inside the window.
    #[must_use]
    pub fn with_invoices(self, records: Vec<InvoiceRecord>) -> Self {
        *self.invoices_fn.lock().unwrap() = Box::new(move |scope, window| {
            Ok(records
                .iter()
                .filter(|i| scope.includes_invoice_room(i.room_id.as_deref()))
                .filter(|i| window.contains(i.issued_at))
                .cloned()
                .collect())
        });
        self
    }

    #[must_use]
    pub fn with_failure(self, reason: &str) -> Self {
        let reason = reason.to_string();
        let again = reason.clone();
        *self.reservations_fn.lock().unwrap() = Box::new(move |_, _| {
            Err(AnalyticsError::Source {
                reason: reason.clone(),
            })
        });
        *self.invoices_fn.lock().unwrap() = Box::new(move |_, _| {
            Err(AnalyticsError::Source {
                reason: again.clone(),
            })
        });
        self
    }
}

#[async_trait]
impl RecordSource for MockRecordSource {
    async fn reservations(&self, scope: &Scope, window: &Period) -> Result<Vec<ReservationInterval>> {
        (self.reservations_fn.lock().unwrap())(scope, window)
    }

    async fn invoices(&self, scope: &Scope, window: &Period) -> Result<Vec<InvoiceRecord>> {
        (self.invoices_fn.lock().unwrap())(scope, window)
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn utc(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    utc_hms(y, m, d, 0, 0, 0)
}

pub fn utc_hms(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, min, s).unwrap()
}

/// Reservation from midnight UTC of `start` to midnight UTC of `end`, worth 100.
pub fn make_reservation(
    id: &str,
    room_id: &str,
    start: (i32, u32, u32),
    end: (i32, u32, u32),
    status: ReservationStatus,
) -> ReservationInterval {
    ReservationInterval {
        id: id.to_string(),
        room_id: room_id.to_string(),
        start_date: utc(start.0, start.1, start.2),
        end_date: utc(end.0, end.1, end.2),
        status,
        amount: dec!(100),
        guest_count: Some(2),
    }
}

pub fn make_invoice(
    id: &str,
    issued: (i32, u32, u32),
    total: Decimal,
    guest_id: &str,
    nationality: Option<&str>,
) -> InvoiceRecord {
    InvoiceRecord {
        id: id.to_string(),
        issued_at: utc_hms(issued.0, issued.1, issued.2, 12, 0, 0),
        total,
        guest_id: guest_id.to_string(),
        guest_nationality: nationality.map(ToString::to_string),
        room_id: None,
    }
}
