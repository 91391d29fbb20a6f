//! Orders produced by checkout.

mod pricing;
mod state;

pub use pricing::{LineCharge, OrderTotals};
pub use state::OrderStatus;

use chrono::{DateTime, Utc};
use common::{CustomerId, OrderId, OrderItemId, ReservationId, SellerId};
use serde::{Deserialize, Serialize};

use crate::catalog::VariantKey;
use crate::error::DomainError;
use crate::money::Money;

/// How the customer intends to pay for an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PaymentMethod {
    #[default]
    Online,
    CashOnDelivery,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Online => "Online",
            PaymentMethod::CashOnDelivery => "CashOnDelivery",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Online" => Some(PaymentMethod::Online),
            "CashOnDelivery" => Some(PaymentMethod::CashOnDelivery),
            _ => None,
        }
    }
}

/// A line of a placed order.
///
/// Product name, SKU and seller are copied from the catalog so the order keeps
/// its history even if the product changes later.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub id: OrderItemId,
    pub order_id: OrderId,
    pub variant: VariantKey,
    pub seller_id: SellerId,
    pub quantity: u32,
    pub unit_price: Money,
    /// `unit_price × quantity`, before tax and shipping.
    pub total_price: Money,
    pub tax: Money,
    pub product_name: String,
    #[serde(rename = "productSKU")]
    pub product_sku: String,
    /// The reservation this line consumed.
    pub reserved_stock_id: ReservationId,
}

/// An order created by a successful checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub customer_id: CustomerId,
    pub sub_total: Money,
    pub shipping_charge: Money,
    pub tax: Money,
    pub total: Money,
    pub order_status: OrderStatus,
    pub is_paid: bool,
    pub payment_method: PaymentMethod,
    pub created_at: DateTime<Utc>,
    pub items: Vec<OrderItem>,
}

impl Order {
    /// Creates a pending, unpaid order with no items.
    pub fn pending(
        customer_id: CustomerId,
        payment_method: PaymentMethod,
        totals: OrderTotals,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: OrderId::new(),
            customer_id,
            sub_total: totals.sub_total,
            shipping_charge: totals.shipping_charge,
            tax: totals.tax,
            total: totals.total,
            order_status: OrderStatus::Pending,
            is_paid: false,
            payment_method,
            created_at,
            items: Vec::new(),
        }
    }

    /// Records a successful payment.
    pub fn mark_paid(&mut self, method: Option<PaymentMethod>) -> Result<(), DomainError> {
        self.ensure_payment_pending("mark paid")?;
        self.order_status = OrderStatus::Confirmed;
        self.is_paid = true;
        if let Some(method) = method {
            self.payment_method = method;
        }
        Ok(())
    }

    /// Records a failed payment.
    pub fn mark_payment_failed(&mut self) -> Result<(), DomainError> {
        self.ensure_payment_pending("mark payment failed")?;
        self.order_status = OrderStatus::PaymentFailed;
        Ok(())
    }

    /// Reservations consumed by this order's lines.
    pub fn reservation_ids(&self) -> impl Iterator<Item = ReservationId> + '_ {
        self.items.iter().map(|item| item.reserved_stock_id)
    }

    fn ensure_payment_pending(&self, action: &'static str) -> Result<(), DomainError> {
        if self.order_status.can_record_payment() {
            Ok(())
        } else {
            Err(DomainError::InvalidOrderTransition {
                current: self.order_status,
                action,
            })
        }
    }
}
