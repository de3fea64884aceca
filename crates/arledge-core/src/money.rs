//! # Money Module
//!
//! The single quantization policy for monetary values.
//!
//! ## Where Rounding Happens
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  in memory        2.5 × 19.99 = 49.975       (rust_decimal, exact)      │
//! │  derived field    net = 49.98                (half-up, once)            │
//! │  storage          unit price 1000.00 → 100000 minor units (i64)         │
//! │  presentation     1.5 → "1.50", -2.345 → "-2.35"                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Values keep full precision in memory. They are quantized to two
//! fractional digits, round-half-up, exactly once per derived field and at
//! storage / presentation boundaries.
//!
//! ## Usage
//! ```rust
//! use arledge_core::money::{quantize_currency, to_minor_units, from_minor_units};
//! use rust_decimal::Decimal;
//! use std::str::FromStr;
//!
//! let price = Decimal::from_str("-2.345").unwrap();
//! assert_eq!(quantize_currency(price).to_string(), "-2.35");
//!
//! let cents = to_minor_units(Decimal::from_str("1000.00").unwrap()).unwrap();
//! assert_eq!(cents, 100000);
//! assert_eq!(from_minor_units(cents).to_string(), "1000.00");
//! ```

use rust_decimal::{Decimal, RoundingStrategy};

use crate::error::{CoreError, CoreResult};

/// Fractional digits of every currency value at a boundary.
pub const CURRENCY_SCALE: u32 = 2;

/// Rounds to `dp` fractional digits; exact halves move away from zero.
///
/// Values that already have `dp` or fewer digits are returned unchanged
/// (their scale is not padded).
#[inline]
pub fn round_half_up(value: Decimal, dp: u32) -> Decimal {
    value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}

/// Quantizes to exactly two fractional digits using round-half-up.
///
/// The result has scale 2 (`1.5` becomes `1.50`) unless the value has more
/// than 26 integer digits, where the 96-bit mantissa has no room for the
/// padding; text output goes through `format_currency`, which pads. Zero
/// never carries a negative sign.
///
/// ## Example
/// ```rust
/// use arledge_core::money::quantize_currency;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let q = quantize_currency(Decimal::from_str("1.5").unwrap());
/// assert_eq!(q.to_string(), "1.50");
/// ```
pub fn quantize_currency(value: Decimal) -> Decimal {
    let mut quantized = round_half_up(value, CURRENCY_SCALE);
    quantized.rescale(CURRENCY_SCALE);
    if quantized.is_zero() {
        quantized.set_sign_positive(true);
    }
    quantized
}

/// Converts an amount to integer minor units (cents).
///
/// Equivalent to `round(value * 100)` half-up: after quantizing to scale 2
/// the mantissa *is* the cent count, so no multiplication is needed.
///
/// ## Errors
/// `CoreError::Overflow` if the cent count does not fit in an `i64`.
pub fn to_minor_units(value: Decimal) -> CoreResult<i64> {
    let quantized = quantize_currency(value);
    i64::try_from(quantized.mantissa()).map_err(|_| CoreError::Overflow {
        operation: "minor unit conversion",
    })
}

/// Recovers an amount from integer minor units, already at scale 2.
#[inline]
pub fn from_minor_units(minor: i64) -> Decimal {
    Decimal::new(minor, CURRENCY_SCALE)
}
