use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::period::{PeriodKind, ResolverConfig, parse_timezone};
use crate::error::Result;

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    #[serde(default)]
    pub analytics: AnalyticsConfig,
    #[serde(default)]
    pub source: SourceConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AnalyticsConfig {
    #[serde(default = "default_period_kind")]
    pub period_kind: PeriodKind,
    /// Fixed reference instant; the current time when absent.
    #[serde(default)]
    pub reference_instant: Option<DateTime<Utc>>,
    /// IANA zone whose calendar defines days, weeks and months.
    #[serde(default = "default_timezone")]
    pub timezone: String,
    #[serde(default = "default_top_nationalities")]
    pub top_nationalities: usize,
    /// Rooms available for sale; inferred from the reservations when absent.
    #[serde(default)]
    pub room_count: Option<u32>,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            period_kind: default_period_kind(),
            reference_instant: None,
            timezone: default_timezone(),
            top_nationalities: default_top_nationalities(),
            room_count: None,
        }
    }
}

impl AnalyticsConfig {
    pub fn resolver_config(&self) -> Result<ResolverConfig> {
        Ok(ResolverConfig {
            period_kind: self.period_kind,
            reference_instant: self.reference_instant,
            timezone_basis: parse_timezone(&self.timezone)?,
        })
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SourceConfig {
    #[serde(default = "default_records_path")]
    pub records_path: PathBuf,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            records_path: default_records_path(),
        }
    }
}

fn default_period_kind() -> PeriodKind {
    PeriodKind::Month
}

fn default_timezone() -> String {
    "UTC".into()
}

fn default_top_nationalities() -> usize {
    5
}

fn default_records_path() -> PathBuf {
    PathBuf::from("records.json")
}
