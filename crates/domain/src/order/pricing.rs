//! Per-line charges and order totals.

use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::money::Money;
use crate::tax::TaxRate;

/// Charges for one order line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineCharge {
    /// `unit_price × quantity`
    pub amount: Money,
    pub tax: Money,
    pub shipping: Money,
    /// `amount + tax + shipping`
    pub total: Money,
}

impl LineCharge {
    /// Prices a line. Tax is rounded per line, so order totals never drift
    /// from the sum of their lines.
    pub fn compute(
        unit_price: Money,
        quantity: u32,
        rate: TaxRate,
        shipping: Money,
    ) -> Result<Self, DomainError> {
        let amount = unit_price
            .checked_multiply(quantity)
            .ok_or(DomainError::AmountOverflow { what: "line amount" })?;
        let tax = rate
            .tax_on(amount)
            .ok_or(DomainError::AmountOverflow { what: "line tax" })?;
        let total = amount
            .checked_add(tax)
            .and_then(|sum| sum.checked_add(shipping))
            .ok_or(DomainError::AmountOverflow { what: "line total" })?;
        Ok(Self {
            amount,
            tax,
            shipping,
            total,
        })
    }
}

/// Aggregated order totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderTotals {
    pub sub_total: Money,
    pub tax: Money,
    pub shipping_charge: Money,
    pub total: Money,
}

impl OrderTotals {
    /// Sums line charges into order totals.
    pub fn from_lines<'a>(
        lines: impl IntoIterator<Item = &'a LineCharge>,
    ) -> Result<Self, DomainError> {
        let mut totals = OrderTotals::default();
        for line in lines {
            totals.add(line)?;
        }
        Ok(totals)
    }

    pub fn add(&mut self, line: &LineCharge) -> Result<(), DomainError> {
        let sum = |a: Money, b: Money, what| {
            a.checked_add(b).ok_or(DomainError::AmountOverflow { what })
        };
        *self = OrderTotals {
            sub_total: sum(self.sub_total, line.amount, "order sub total")?,
            tax: sum(self.tax, line.tax, "order tax")?,
            shipping_charge: sum(self.shipping_charge, line.shipping, "order shipping")?,
            total: sum(self.total, line.total, "order total")?,
        };
        Ok(())
    }
}
