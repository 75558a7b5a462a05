use crate::domain::account::Balance;
use crate::domain::order::{CartItem, Coupon, Order, OrderStatus, ShippingAddress};
use crate::domain::transaction::Transaction;
use serde::{Deserialize, Serialize};

/// Card checkout: everything needed to prepare a processor charge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalCheckout {
    pub items: Vec<CartItem>,
    pub shipping: ShippingAddress,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub coupon: Option<Coupon>,
}

/// Order submission after the card processor reported the payment as succeeded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfirmedCheckout {
    /// The client secret (or intent id) the processor issued for this payment.
    #[serde(default)]
    pub payment_reference: Option<String>,
    #[serde(default)]
    pub cart_items: Vec<CartItem>,
    #[serde(default)]
    pub shipping_address: Option<ShippingAddress>,
    #[serde(default)]
    pub payment_method: Option<String>,
    /// Defaults to "Order Placed..." when absent.
    #[serde(default)]
    pub status: Option<OrderStatus>,
    #[serde(default)]
    pub coupon: Option<Coupon>,
}

/// Wallet checkout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalletCheckout {
    #[serde(default)]
    pub cart_items: Vec<CartItem>,
    #[serde(default)]
    pub shipping_address: Option<ShippingAddress>,
    #[serde(default)]
    pub coupon: Option<Coupon>,
}

/// Everything a successful wallet checkout produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WalletReceipt {
    pub order: Order,
    pub transaction: Transaction,
    /// Wallet balance right after the debit.
    pub balance: Balance,
}
