use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::invoice::InvoiceRecord;
use crate::domain::period::Period;
use crate::domain::reservation::ReservationInterval;
use crate::error::{AnalyticsError, Result};
use crate::ports::record_source::{RecordSource, Scope};

/// Serialized export of a hotel's records.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecordDump {
    #[serde(default)]
    pub reservations: Vec<ReservationInterval>,
    #[serde(default)]
    pub invoices: Vec<InvoiceRecord>,
}

/// Record source answering from collections held in memory.
pub struct InMemoryRecordSource {
    dump: RecordDump,
}

impl InMemoryRecordSource {
    pub fn new(reservations: Vec<ReservationInterval>, invoices: Vec<InvoiceRecord>) -> Self {
        Self {
            dump: RecordDump {
                reservations,
                invoices,
            },
        }
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| AnalyticsError::Source {
            reason: format!("failed to read records file {}: {e}", path.display()),
        })?;
        let dump: RecordDump = serde_json::from_str(&content)?;
        tracing::info!(
            reservations = dump.reservations.len(),
            invoices = dump.invoices.len(),
            path = %path.display(),
            "loaded record dump"
        );
        Ok(Self { dump })
    }

    /// Distinct room ids present in the reservations.
    pub fn room_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .dump
            .reservations
            .iter()
            .map(|r| r.room_id.clone())
            .collect();
        ids.sort();
        ids.dedup();
        ids
    }
}

/// Malformed stays are still handed out when either endpoint falls in the
/// window so callers can report them.
fn touches_window(reservation: &ReservationInterval, window: &Period) -> bool {
    reservation.overlaps(window)
        || (reservation.is_malformed()
            && (window.contains(reservation.start_date) || window.contains(reservation.end_date)))
}

#[async_trait]
impl RecordSource for InMemoryRecordSource {
    async fn reservations(&self, scope: &Scope, window: &Period) -> Result<Vec<ReservationInterval>> {
        let found: Vec<ReservationInterval> = self
            .dump
            .reservations
            .iter()
            .filter(|r| scope.includes_room(&r.room_id) && touches_window(r, window))
            .cloned()
            .collect();
        tracing::debug!(scope = %scope, window = %window, count = found.len(), "fetched reservations");
        Ok(found)
    }

    async fn invoices(&self, scope: &Scope, window: &Period) -> Result<Vec<InvoiceRecord>> {
        let found: Vec<InvoiceRecord> = self
            .dump
            .invoices
            .iter()
            .filter(|inv| scope.includes_invoice_room(inv.room_id.as_deref()))
            .filter(|inv| window.contains(inv.issued_at))
            .cloned()
            .collect();
        tracing::debug!(scope = %scope, window = %window, count = found.len(), "fetched invoices");
        Ok(found)
    }
}
