//! Quotation total aggregation.
//!
//! A quotation's monetary fields are derived from its line items and
//! nothing else; this module is the single place that derivation lives.

use serde::{Deserialize, Serialize};

use super::models::QuotationLineItem;

/// Fixed tax rate applied to every quotation subtotal.
pub const TAX_RATE: f64 = 0.10;

/// The three derived monetary fields of a quotation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuotationTotals {
    pub subtotal: f64,
    pub tax: f64,
    pub total: f64,
}

/// Compute subtotal, tax and total for a set of line items.
///
/// Pure function of its input: subtotal is the sum of price x quantity
/// (0 for an empty set), tax is subtotal x [`TAX_RATE`], total is their
/// sum. The three outputs are always internally consistent.
pub fn quotation_totals(items: &[QuotationLineItem]) -> QuotationTotals {
    let subtotal: f64 = items.iter().map(|item| item.price * item.quantity).sum();
    let tax = subtotal * TAX_RATE;
    let total = subtotal + tax;

    QuotationTotals { subtotal, tax, total }
}
