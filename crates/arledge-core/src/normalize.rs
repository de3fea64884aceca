//! # Value Normalizer
//!
//! Conversions between in-memory decimals / timestamps and their canonical,
//! culture-invariant text forms.
//!
//! ## Two Decimal Policies
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  INVARIANT  (quantities, VAT rates)                                     │
//! │    2.5      → "2.5"        keeps every digit the value carries          │
//! │    25       → "25"                                                      │
//! │                                                                         │
//! │  CURRENCY   (unit prices, net, vat, totals)                             │
//! │    1.5      → "1.50"       always exactly two digits                    │
//! │    -2.345   → "-2.35"      round-half-up, away from zero                │
//! │                                                                         │
//! │  Both: '.' separator, no grouping, no exponent, any host locale.        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Timestamps
//! Always UTC, ISO-8601, literal `Z`. Zone-less input is taken as already
//! being UTC and is never shifted by a local offset.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat, TimeZone, Utc};
use rust_decimal::Decimal;

use crate::error::ParseError;
use crate::money::quantize_currency;

// =============================================================================
// Decimals
// =============================================================================

/// Renders a decimal in invariant fixed-point form.
#[inline]
pub fn format_invariant(value: Decimal) -> String {
    value.to_string()
}

/// Renders a decimal quantized to two digits (round-half-up).
///
/// Output always matches `^-?\d+\.\d{2}$`, including near
/// `Decimal::MAX` where the value itself cannot carry two fractional digits.
pub fn format_currency(value: Decimal) -> String {
    let quantized = quantize_currency(value);
    let text = quantized.to_string();
    match quantized.scale() {
        0 => format!("{text}.00"),
        1 => format!("{text}0"),
        _ => text,
    }
}

/// Absent-safe form of [`format_invariant`].
pub fn decimal_to_invariant_string(value: Option<Decimal>) -> Option<String> {
    value.map(format_invariant)
}

/// Absent-safe form of [`format_currency`].
pub fn decimal_to_currency_string(value: Option<Decimal>) -> Option<String> {
    value.map(format_currency)
}

/// Parses an invariant fixed-point numeral.
///
/// Accepts an optional sign, digits and at most one `.`; surrounding
/// whitespace is ignored. Grouping separators, `,` decimals, exponents,
/// `NaN` and `Infinity` are rejected.
///
/// ## Example
/// ```rust
/// use arledge_core::normalize::invariant_string_to_decimal;
///
/// assert_eq!(invariant_string_to_decimal("2.50").unwrap().to_string(), "2.50");
/// assert!(invariant_string_to_decimal("1,5").is_err());
/// assert!(invariant_string_to_decimal("1e3").is_err());
/// ```
pub fn invariant_string_to_decimal(text: &str) -> Result<Decimal, ParseError> {
    let canonical = canonical_numeral(text)?;
    Decimal::from_str_exact(&canonical).map_err(|e| ParseError::decimal(text, e.to_string()))
}

/// Parses a currency string and re-quantizes it to two digits.
///
/// The input may carry more precision than the format implies
/// (`"1.235"` → `1.24`).
pub fn currency_string_to_decimal(text: &str) -> Result<Decimal, ParseError> {
    let canonical = canonical_numeral(text)?;
    // Trailing zeros are dropped first: a padded 29-digit amount still parses.
    let trimmed = if canonical.contains('.') {
        canonical.trim_end_matches('0').trim_end_matches('.')
    } else {
        canonical.as_str()
    };
    Decimal::from_str_exact(trimmed)
        .map(quantize_currency)
        .map_err(|e| ParseError::decimal(text, e.to_string()))
}

/// Checks the fixed-point grammar and rebuilds the numeral as
/// `[-]digits[.digits]` so the decimal parser only ever sees one shape.
fn canonical_numeral(text: &str) -> Result<String, ParseError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ParseError::decimal(text, "empty input"));
    }

    let (negative, body) = match trimmed.as_bytes()[0] {
        b'-' => (true, &trimmed[1..]),
        b'+' => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let (int_part, frac_part) = match body.split_once('.') {
        Some((int_part, frac_part)) => (int_part, frac_part),
        None => (body, ""),
    };

    if let Some(bad) = int_part
        .chars()
        .chain(frac_part.chars())
        .find(|c| !c.is_ascii_digit())
    {
        return Err(ParseError::decimal(
            text,
            format!("unexpected character '{bad}'"),
        ));
    }

    if int_part.is_empty() && frac_part.is_empty() {
        return Err(ParseError::decimal(text, "no digits"));
    }

    let mut canonical = String::with_capacity(body.len() + 2);
    if negative {
        canonical.push('-');
    }
    canonical.push_str(if int_part.is_empty() { "0" } else { int_part });
    if !frac_part.is_empty() {
        canonical.push('.');
        canonical.push_str(frac_part);
    }
    Ok(canonical)
}

// =============================================================================
// Timestamps
// =============================================================================

/// Renders any zoned timestamp in UTC with a literal `Z`.
///
/// Sub-second digits are printed only when present (3, 6 or 9 of them).
pub fn format_utc<Tz: TimeZone>(value: &DateTime<Tz>) -> String {
    value
        .with_timezone(&Utc)
        .to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// Absent-safe form of [`format_utc`].
pub fn timestamp_to_utc_string<Tz: TimeZone>(value: Option<&DateTime<Tz>>) -> Option<String> {
    value.map(format_utc)
}

/// Interprets a zone-less timestamp as UTC (no local-time conversion).
#[inline]
pub fn naive_as_utc(value: NaiveDateTime) -> DateTime<Utc> {
    value.and_utc()
}

/// Renders a zone-less timestamp, treating it as already UTC.
///
/// ## Example
/// ```rust
/// use arledge_core::normalize::naive_timestamp_to_utc_string;
/// use chrono::NaiveDate;
///
/// let naive = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
/// assert_eq!(
///     naive_timestamp_to_utc_string(Some(&naive)).as_deref(),
///     Some("2020-01-01T00:00:00Z")
/// );
/// ```
pub fn naive_timestamp_to_utc_string(value: Option<&NaiveDateTime>) -> Option<String> {
    value.map(|naive| format_utc(&naive_as_utc(*naive)))
}

const OFFSET_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f%:z", "%Y-%m-%d %H:%M:%S%.f%:z"];

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parses an ISO-8601 timestamp and anchors it in UTC.
///
/// Accepted shapes:
/// - `Z` or `±HH:MM` offset, `T` or space separator
/// - zone-less date-time (taken as UTC)
/// - date only (midnight UTC)
pub fn utc_string_to_timestamp(text: &str) -> Result<DateTime<Utc>, ParseError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ParseError::timestamp(text, "empty input"));
    }

    let with_offset = match trimmed.strip_suffix(['Z', 'z']) {
        Some(rest) => format!("{rest}+00:00"),
        None => trimmed.to_string(),
    };

    if let Ok(parsed) = DateTime::parse_from_rfc3339(&with_offset) {
        return Ok(parsed.with_timezone(&Utc));
    }

    for format in OFFSET_FORMATS {
        if let Ok(parsed) = DateTime::parse_from_str(&with_offset, format) {
            return Ok(parsed.with_timezone(&Utc));
        }
    }

    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(naive_as_utc(naive));
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(naive_as_utc(date.and_time(NaiveTime::MIN)));
    }

    Err(ParseError::timestamp(text, "expected ISO-8601 date-time"))
}
