//! # Invoice Totals Calculator
//!
//! Derives per-line and per-invoice amounts with exact decimal arithmetic.
//!
//! ## Two-Stage Rounding
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  LINE                                                                   │
//! │    net        = round(quantity × unit_price, 2)                         │
//! │    vat        = round(net × vat_rate / 100, 2)                          │
//! │    line_total = net + vat                                               │
//! │                                                                         │
//! │  INVOICE  (sums over the already-rounded line values)                   │
//! │    subtotal   = round(Σ net, 2)                                         │
//! │    total_vat  = round(Σ vat, 2)                                         │
//! │    total      = round(subtotal + total_vat, 2)                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Invoice VAT is the sum of per-line VAT, not VAT on the subtotal. Stored
//! invoices depend on this, so it must not be "fixed".
//!
//! Signs are not checked: a negative quantity or price is a credit line.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::money::quantize_currency;

const PERCENT: Decimal = Decimal::ONE_HUNDRED;

// =============================================================================
// Line Amounts
// =============================================================================

/// Derived amounts of a single invoice line, each at two fractional digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineAmounts {
    pub net: Decimal,
    pub vat: Decimal,
    pub line_total: Decimal,
}

/// Computes net, VAT and line total for one line.
///
/// ## Example
/// ```rust
/// use arledge_core::totals::compute_line;
/// use rust_decimal::Decimal;
///
/// let amounts = compute_line(Decimal::from(2), Decimal::new(1000, 2), Decimal::from(25)).unwrap();
/// assert_eq!(amounts.net.to_string(), "20.00");
/// assert_eq!(amounts.vat.to_string(), "5.00");
/// assert_eq!(amounts.line_total.to_string(), "25.00");
/// ```
///
/// ## Errors
/// `CoreError::Overflow` when an intermediate product leaves the decimal
/// range. Nothing is partially returned.
pub fn compute_line(
    quantity: Decimal,
    unit_price: Decimal,
    vat_rate: Decimal,
) -> CoreResult<LineAmounts> {
    let gross = quantity
        .checked_mul(unit_price)
        .ok_or(CoreError::Overflow {
            operation: "line net",
        })?;
    let net = quantize_currency(gross);

    let vat = net
        .checked_mul(vat_rate)
        .and_then(|v| v.checked_div(PERCENT))
        .map(quantize_currency)
        .ok_or(CoreError::Overflow {
            operation: "line vat",
        })?;

    let line_total = net.checked_add(vat).ok_or(CoreError::Overflow {
        operation: "line total",
    })?;

    Ok(LineAmounts {
        net,
        vat,
        line_total,
    })
}

// =============================================================================
// Invoice Totals
// =============================================================================

/// Aggregates of an invoice, each at two fractional digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceTotals {
    pub subtotal: Decimal,
    pub total_vat: Decimal,
    pub total: Decimal,
}

impl InvoiceTotals {
    /// Totals of an invoice without lines.
    pub fn zero() -> Self {
        let zero = quantize_currency(Decimal::ZERO);
        InvoiceTotals {
            subtotal: zero,
            total_vat: zero,
            total: zero,
        }
    }
}

impl Default for InvoiceTotals {
    fn default() -> Self {
        InvoiceTotals::zero()
    }
}

/// Sums already-computed line amounts into invoice totals.
///
/// An empty iterator yields `0.00 / 0.00 / 0.00`.
pub fn compute_invoice_totals<'a, I>(lines: I) -> CoreResult<InvoiceTotals>
where
    I: IntoIterator<Item = &'a LineAmounts>,
{
    let overflow = |operation| CoreError::Overflow { operation };

    let mut net_sum = Decimal::ZERO;
    let mut vat_sum = Decimal::ZERO;
    for line in lines {
        net_sum = net_sum
            .checked_add(line.net)
            .ok_or_else(|| overflow("invoice subtotal"))?;
        vat_sum = vat_sum
            .checked_add(line.vat)
            .ok_or_else(|| overflow("invoice vat"))?;
    }

    let subtotal = quantize_currency(net_sum);
    let total_vat = quantize_currency(vat_sum);
    let total = subtotal
        .checked_add(total_vat)
        .map(quantize_currency)
        .ok_or_else(|| overflow("invoice total"))?;

    Ok(InvoiceTotals {
        subtotal,
        total_vat,
        total,
    })
}
