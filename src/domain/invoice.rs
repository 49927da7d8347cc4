use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Money;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceRecord {
    pub id: String,
    pub issued_at: DateTime<Utc>,
    pub total: Money,
    pub guest_id: String,
    #[serde(default)]
    pub guest_nationality: Option<String>,
    #[serde(default)]
    pub room_id: Option<String>,
}

impl InvoiceRecord {
    /// Grouping key for the guest's nationality; blank and missing values
    /// share the empty key.
    pub fn nationality_key(&self) -> &str {
        self.guest_nationality.as_deref().map_or("", str::trim)
    }
}
