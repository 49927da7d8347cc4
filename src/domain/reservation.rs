use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Money;
use super::period::Period;

/// Lifecycle status of a reservation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReservationStatus {
    /// Booked, stay not started.
    Reserved,
    /// Awaiting payment or confirmation.
    Pending,
    /// Confirmed future stay.
    Confirmed,
    /// Stay completed; the only status that counts as occupancy and income.
    Finalized,
    Cancelled,
}

impl std::fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Reserved => write!(f, "Reserved"),
            Self::Pending => write!(f, "Pending"),
            Self::Confirmed => write!(f, "Confirmed"),
            Self::Finalized => write!(f, "Finalized"),
            Self::Cancelled => write!(f, "Cancelled"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservationInterval {
    pub id: String,
    pub room_id: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub status: ReservationStatus,
    pub amount: Money,
    #[serde(default)]
    pub guest_count: Option<u32>,
}

impl ReservationInterval {
    /// A stay that ends at or before it starts.
    pub fn is_malformed(&self) -> bool {
        self.end_date <= self.start_date
    }

    pub fn is_finalized(&self) -> bool {
        self.status == ReservationStatus::Finalized
    }

    pub fn overlaps(&self, window: &Period) -> bool {
        window.overlaps(self.start_date, self.end_date)
    }
}
