pub mod calendar;
pub mod comparison;
pub mod demographics;
pub mod invoice;
pub mod occupancy;
pub mod period;
pub mod reservation;
pub mod revenue;

/// Monetary amounts, summed with exact decimal arithmetic.
pub type Money = rust_decimal::Decimal;
