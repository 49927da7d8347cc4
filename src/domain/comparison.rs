#![allow(clippy::cast_precision_loss)] // Counts are small enough for f64

use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use super::Money;

/// Deltas smaller than this, in percentage points, are reported as flat.
pub const FLAT_THRESHOLD_PERCENT: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Growth,
    Decline,
    Flat,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Growth => write!(f, "up"),
            Self::Decline => write!(f, "down"),
            Self::Flat => write!(f, "flat"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComparativeResult {
    pub current: f64,
    pub prior: f64,
    pub delta_percent: f64,
    pub direction: Direction,
}

/// Signed percentage change from `prior` to `current`.
///
/// A zero prior yields +100% for any positive current, 0% when both are
/// zero, and -100% for a negative current.
pub fn compare(current: f64, prior: f64) -> ComparativeResult {
    let delta_percent = if prior == 0.0 {
        if current > 0.0 {
            100.0
        } else if current < 0.0 {
            -100.0
        } else {
            0.0
        }
    } else {
        (current - prior) / prior * 100.0
    };

    let direction = if delta_percent.abs() < FLAT_THRESHOLD_PERCENT {
        Direction::Flat
    } else if delta_percent > 0.0 {
        Direction::Growth
    } else {
        Direction::Decline
    };

    ComparativeResult {
        current,
        prior,
        delta_percent,
        direction,
    }
}

pub fn compare_money(current: Money, prior: Money) -> ComparativeResult {
    compare(
        current.to_f64().unwrap_or_default(),
        prior.to_f64().unwrap_or_default(),
    )
}

pub fn compare_counts(current: u64, prior: u64) -> ComparativeResult {
    compare(current as f64, prior as f64)
}

impl std::fmt::Display for ComparativeResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:.2} vs {:.2} ({:+.1}%, {})",
            self.current, self.prior, self.delta_percent, self.direction
        )
    }
}
