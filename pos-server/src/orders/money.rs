//! Money calculation utilities using rust_decimal for precision
//!
//! Totals are computed in `Decimal`, then converted to `f64` (2 dp) for
//! storage and serialization.

use rust_decimal::prelude::*;

/// Rounding: 2 decimal places, half away from zero
const DECIMAL_PLACES: u32 = 2;

/// Tolerance for monetary comparisons (0.01)
pub const MONEY_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Maximum allowed unit price
pub const MAX_PRICE: f64 = 1_000_000.0;
/// Maximum allowed quantity per line
pub const MAX_QUANTITY: i64 = 9999;

/// Convert f64 to Decimal (non-finite → zero, logged)
#[inline]
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_else(|| {
        tracing::error!(value = ?value, "Non-finite f64 in monetary calculation, defaulting to zero");
        Decimal::ZERO
    })
}

/// Convert Decimal back to f64 for storage, rounded to 2 decimal places
#[inline]
pub fn to_f64(value: Decimal) -> f64 {
    value
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .unwrap_or_default()
}

/// `price × quantity`
pub fn line_total(price: f64, quantity: i64) -> Decimal {
    to_decimal(price) * Decimal::from(quantity)
}

/// Σ price × quantity over `(price, quantity)` lines, rounded to 2 dp
pub fn order_total<I>(lines: I) -> f64
where
    I: IntoIterator<Item = (f64, i64)>,
{
    to_f64(lines.into_iter().map(|(p, q)| line_total(p, q)).sum())
}

/// Whether two amounts agree within [`MONEY_TOLERANCE`]
pub fn amounts_match(a: f64, b: f64) -> bool {
    (to_decimal(a) - to_decimal(b)).abs() <= MONEY_TOLERANCE
}
