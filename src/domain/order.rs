use crate::domain::account::Amount;
use crate::domain::identity::AccountId;
use crate::domain::product::ProductId;
use crate::domain::transaction::TransactionId;
use crate::error::{OrderError, Result};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Coupon name the storefront sends when no coupon is applied.
pub const NO_COUPON: &str = "nil";

/// Payment-method label stamped on wallet-funded orders.
pub const WALLET_PAYMENT_METHOD: &str = "wallet";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(pub u64);

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Free-form order status. Admins may set any value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderStatus(pub String);

impl OrderStatus {
    pub fn placed() -> Self {
        Self("Order Placed...".to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<S: Into<String>> From<S> for OrderStatus {
    fn from(value: S) -> Self {
        Self(value.into())
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A line in the shopping cart as sent by the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    pub product: ProductId,
    pub quantity: u32,
    /// Price the client displayed. Kept for the order record; never used to charge.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Decimal>,
}

impl CartItem {
    pub fn new(product: impl Into<ProductId>, quantity: u32) -> Self {
        Self {
            product: product.into(),
            quantity,
            price: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coupon {
    pub name: String,
    /// Percentage taken off the subtotal, between 0 and 100.
    pub discount: Decimal,
}

impl Coupon {
    pub fn new(name: impl Into<String>, discount: Decimal) -> Result<Self> {
        let coupon = Self {
            name: name.into(),
            discount,
        };
        coupon.validate()?;
        Ok(coupon)
    }

    /// The `"nil"` sentinel carries no discount.
    pub fn applies(&self) -> bool {
        self.name != NO_COUPON
    }

    pub fn validate(&self) -> Result<()> {
        if self.discount < Decimal::ZERO || self.discount > dec!(100) {
            return Err(OrderError::ValidationError(format!(
                "Coupon {} has discount {} outside 0..=100",
                self.name, self.discount
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingAddress {
    pub name: String,
    pub line1: String,
    #[serde(default)]
    pub line2: Option<String>,
    pub city: String,
    pub postal_code: String,
    pub country: String,
    #[serde(default)]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub owner: AccountId,
    pub created_at: DateTime<Utc>,
    /// Trusted amount computed at checkout. Never changes afterwards.
    pub amount: Amount,
    pub status: OrderStatus,
    pub cart_items: Vec<CartItem>,
    pub shipping_address: ShippingAddress,
    pub payment_method: String,
    #[serde(default)]
    pub coupon: Option<Coupon>,
    /// Wallet transaction that paid for this order, if any.
    #[serde(default)]
    pub transaction: Option<TransactionId>,
    /// Processor reference of the card payment behind this order, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_reference: Option<String>,
}

/// Error for a draft whose card payment already has an order.
pub fn already_confirmed(reference: &str, existing: OrderId) -> OrderError {
    OrderError::ValidationError(format!(
        "Payment {reference} already confirmed as order {existing}"
    ))
}

/// Sorts by creation time, newest first. Ids break ties so the order is total.
pub fn sort_newest_first(orders: &mut [Order]) {
    orders.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
}

/// An order as submitted for storage, before it has an id.
///
/// Required fields are optional here so missing data can be reported as a
/// validation error rather than a deserialization failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewOrder {
    pub owner: AccountId,
    pub amount: Amount,
    #[serde(default)]
    pub status: Option<OrderStatus>,
    #[serde(default)]
    pub cart_items: Vec<CartItem>,
    #[serde(default)]
    pub shipping_address: Option<ShippingAddress>,
    #[serde(default)]
    pub payment_method: Option<String>,
    #[serde(default)]
    pub coupon: Option<Coupon>,
    #[serde(default)]
    pub transaction: Option<TransactionId>,
    #[serde(default)]
    pub payment_reference: Option<String>,
}

impl NewOrder {
    /// Names of required fields that are absent or blank.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.cart_items.is_empty() {
            missing.push("cart items");
        }
        if self.status.as_ref().is_none_or(|s| s.as_str().trim().is_empty()) {
            missing.push("order status");
        }
        if self.shipping_address.is_none() {
            missing.push("shipping address");
        }
        if self.payment_method.as_ref().is_none_or(|m| m.trim().is_empty()) {
            missing.push("payment method");
        }
        missing
    }

    pub fn validate(&self) -> Result<()> {
        let missing = self.missing_fields();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(OrderError::ValidationError(format!(
                "Order data missing: {}",
                missing.join(", ")
            )))
        }
    }

    /// Checks required fields and turns the draft into a stored order.
    pub fn into_order(self, id: OrderId, created_at: DateTime<Utc>) -> Result<Order> {
        self.validate()?;
        match (self.status, self.shipping_address, self.payment_method) {
            (Some(status), Some(shipping_address), Some(payment_method)) => Ok(Order {
                id,
                owner: self.owner,
                created_at,
                amount: self.amount,
                status,
                cart_items: self.cart_items,
                shipping_address,
                payment_method,
                coupon: self.coupon,
                transaction: self.transaction,
                payment_reference: self.payment_reference,
            }),
            _ => Err(OrderError::ValidationError("Order data missing".to_string())),
        }
    }
}
