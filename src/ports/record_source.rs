use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::invoice::InvoiceRecord;
use crate::domain::period::Period;
use crate::domain::reservation::ReservationInterval;
use crate::error::Result;

/// Which records a fetch is restricted to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    Hotel,
    Room(String),
}

impl Scope {
    pub fn includes_room(&self, room_id: &str) -> bool {
        match self {
            Self::Hotel => true,
            Self::Room(id) => id == room_id,
        }
    }

    /// Invoices without a room belong to the hotel scope only.
    pub fn includes_invoice_room(&self, room_id: Option<&str>) -> bool {
        match self {
            Self::Hotel => true,
            Self::Room(id) => room_id == Some(id.as_str()),
        }
    }
}

impl std::fmt::Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Hotel => write!(f, "hotel"),
            Self::Room(id) => write!(f, "room {id}"),
        }
    }
}

/// Supplies already-materialized records for one window.
///
/// Implementations return complete collections for the window, with every
/// timestamp in UTC.
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Reservations of `scope` overlapping `window`.
    async fn reservations(&self, scope: &Scope, window: &Period) -> Result<Vec<ReservationInterval>>;

    /// Invoices of `scope` issued inside `window`.
    async fn invoices(&self, scope: &Scope, window: &Period) -> Result<Vec<InvoiceRecord>>;
}
