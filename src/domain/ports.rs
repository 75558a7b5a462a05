use super::account::{Amount, Balance, WalletAccount};
use super::identity::AccountId;
use super::order::{CartItem, NewOrder, Order, OrderId, OrderStatus, ShippingAddress};
use super::product::{Product, ProductId};
use super::transaction::{NewTransaction, Transaction, TransactionId};
use crate::error::Result;
use async_trait::async_trait;

/// Wallet ledger storage.
///
/// `debit` and `credit` must be single conditional updates inside the store: no caller
/// ever reads a balance and writes it back.
#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn get(&self, owner: &AccountId) -> Result<Option<WalletAccount>>;
    async fn get_all(&self) -> Result<Vec<WalletAccount>>;
    /// Subtracts `amount` only if the balance covers it. Returns the new balance.
    async fn debit(&self, owner: &AccountId, amount: Amount) -> Result<Balance>;
    /// Adds `amount`, opening the wallet on first credit. Returns the new balance.
    async fn credit(&self, owner: &AccountId, amount: Amount) -> Result<Balance>;
}

/// Append-only transaction log.
#[async_trait]
pub trait TransactionStore: Send + Sync {
    async fn record(&self, tx: NewTransaction) -> Result<Transaction>;
    async fn get(&self, id: TransactionId) -> Result<Option<Transaction>>;
    async fn get_all(&self) -> Result<Vec<Transaction>>;
}

#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Validates the draft, assigns an id and creation time, and persists it.
    ///
    /// A draft whose `payment_reference` already belongs to a stored order is rejected
    /// with `ValidationError`, so one card payment yields at most one order.
    async fn create(&self, order: NewOrder) -> Result<Order>;
    async fn get(&self, id: OrderId) -> Result<Option<Order>>;
    /// Every order, newest first.
    async fn get_all(&self) -> Result<Vec<Order>>;
    /// Orders owned by `owner`, newest first.
    async fn get_for_owner(&self, owner: &AccountId) -> Result<Vec<Order>>;
    /// Replaces the status and nothing else. `NotFound` if the order does not exist.
    async fn update_status(&self, id: OrderId, status: OrderStatus) -> Result<Order>;
}

/// Catalog and inventory ledger.
#[async_trait]
pub trait ProductStore: Send + Sync {
    async fn list_products(&self) -> Result<Vec<Product>>;
    async fn get(&self, id: &ProductId) -> Result<Option<Product>>;
    /// Inserts or replaces a catalog entry.
    async fn store(&self, product: Product) -> Result<()>;
    /// Decrements stock for every line of a confirmed order.
    ///
    /// All lines are checked before any counter moves; an unknown product or a line that
    /// would take stock below zero fails the whole call without side effects.
    async fn consume(&self, items: &[CartItem]) -> Result<()>;
}

/// What the external processor needs to prepare a card charge.
#[derive(Debug, Clone, PartialEq)]
pub struct ChargeRequest {
    /// Integer amount in minor currency units.
    pub amount: i64,
    pub currency: String,
    pub description: String,
    pub shipping: ShippingAddress,
}

/// External card processor.
#[async_trait]
pub trait PaymentProcessor: Send + Sync {
    /// Prepares a charge and returns the client-facing secret used to complete it.
    async fn create_charge(&self, request: ChargeRequest) -> Result<String>;
}

pub type AccountStoreBox = Box<dyn AccountStore>;
pub type TransactionStoreBox = Box<dyn TransactionStore>;
pub type OrderStoreBox = Box<dyn OrderStore>;
pub type ProductStoreBox = Box<dyn ProductStore>;
pub type PaymentProcessorBox = Box<dyn PaymentProcessor>;

/// The full set of storage backends the engine runs on.
pub struct Stores {
    pub accounts: AccountStoreBox,
    pub transactions: TransactionStoreBox,
    pub orders: OrderStoreBox,
    pub products: ProductStoreBox,
}
