use crate::domain::account::{Amount, Balance, WalletAccount};
use crate::domain::identity::AccountId;
use crate::domain::order::{
    CartItem, NewOrder, Order, OrderId, OrderStatus, already_confirmed, sort_newest_first,
};
use crate::domain::ports::{AccountStore, OrderStore, ProductStore, Stores, TransactionStore};
use crate::domain::product::{Product, ProductId, plan_consumption};
use crate::domain::transaction::{NewTransaction, Transaction, TransactionId};
use crate::error::{OrderError, Result};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;

/// A thread-safe in-memory wallet ledger.
///
/// Every balance change happens under the write lock, so a debit's balance check and
/// its subtraction cannot interleave with another debit on the same wallet.
#[derive(Default, Clone)]
pub struct InMemoryAccountStore {
    accounts: Arc<RwLock<HashMap<AccountId, WalletAccount>>>,
}

impl InMemoryAccountStore {
    /// Creates a new, empty in-memory account store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccountStore for InMemoryAccountStore {
    async fn get(&self, owner: &AccountId) -> Result<Option<WalletAccount>> {
        let accounts = self.accounts.read().await;
        Ok(accounts.get(owner).cloned())
    }

    async fn get_all(&self) -> Result<Vec<WalletAccount>> {
        let accounts = self.accounts.read().await;
        let mut all: Vec<WalletAccount> = accounts.values().cloned().collect();
        all.sort_by(|a, b| a.owner.cmp(&b.owner));
        Ok(all)
    }

    async fn debit(&self, owner: &AccountId, amount: Amount) -> Result<Balance> {
        let mut accounts = self.accounts.write().await;
        let account = accounts
            .get_mut(owner)
            .ok_or_else(|| OrderError::NotFound(format!("wallet account {owner}")))?;
        account.debit(amount)
    }

    async fn credit(&self, owner: &AccountId, amount: Amount) -> Result<Balance> {
        let mut accounts = self.accounts.write().await;
        let account = accounts
            .entry(owner.clone())
            .or_insert_with(|| WalletAccount::new(owner.clone()));
        account.credit(amount)
    }
}

/// A thread-safe in-memory transaction log. Ids are assigned sequentially from 1.
#[derive(Default, Clone)]
pub struct InMemoryTransactionStore {
    transactions: Arc<RwLock<Vec<Transaction>>>,
}

impl InMemoryTransactionStore {
    /// Creates a new, empty in-memory transaction store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TransactionStore for InMemoryTransactionStore {
    async fn record(&self, tx: NewTransaction) -> Result<Transaction> {
        let mut transactions = self.transactions.write().await;
        let id = TransactionId(transactions.len() as u64 + 1);
        let tx = tx.into_transaction(id, Utc::now());
        transactions.push(tx.clone());
        Ok(tx)
    }

    async fn get(&self, id: TransactionId) -> Result<Option<Transaction>> {
        let transactions = self.transactions.read().await;
        Ok(transactions.iter().find(|tx| tx.id == id).cloned())
    }

    async fn get_all(&self) -> Result<Vec<Transaction>> {
        Ok(self.transactions.read().await.clone())
    }
}

#[derive(Default)]
struct OrderTable {
    last_id: u64,
    orders: BTreeMap<OrderId, Order>,
    by_payment: HashMap<String, OrderId>,
}

/// A thread-safe in-memory order store.
#[derive(Default, Clone)]
pub struct InMemoryOrderStore {
    table: Arc<RwLock<OrderTable>>,
}

impl InMemoryOrderStore {
    /// Creates a new, empty in-memory order store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn create(&self, order: NewOrder) -> Result<Order> {
        let mut table = self.table.write().await;
        let duplicate = order
            .payment_reference
            .as_ref()
            .and_then(|reference| table.by_payment.get(reference).map(|id| (reference, *id)));
        if let Some((reference, existing)) = duplicate {
            return Err(already_confirmed(reference, existing));
        }

        let order = order.into_order(OrderId(table.last_id + 1), Utc::now())?;
        table.last_id = order.id.0;
        if let Some(reference) = &order.payment_reference {
            table.by_payment.insert(reference.clone(), order.id);
        }
        table.orders.insert(order.id, order.clone());
        Ok(order)
    }

    async fn get(&self, id: OrderId) -> Result<Option<Order>> {
        let table = self.table.read().await;
        Ok(table.orders.get(&id).cloned())
    }

    async fn get_all(&self) -> Result<Vec<Order>> {
        let table = self.table.read().await;
        let mut orders: Vec<Order> = table.orders.values().cloned().collect();
        sort_newest_first(&mut orders);
        Ok(orders)
    }

    async fn get_for_owner(&self, owner: &AccountId) -> Result<Vec<Order>> {
        let table = self.table.read().await;
        let mut orders: Vec<Order> = table
            .orders
            .values()
            .filter(|o| &o.owner == owner)
            .cloned()
            .collect();
        sort_newest_first(&mut orders);
        Ok(orders)
    }

    async fn update_status(&self, id: OrderId, status: OrderStatus) -> Result<Order> {
        let mut table = self.table.write().await;
        let order = table
            .orders
            .get_mut(&id)
            .ok_or_else(|| OrderError::NotFound(format!("order {id}")))?;
        order.status = status;
        Ok(order.clone())
    }
}

/// A thread-safe in-memory catalog and inventory ledger.
#[derive(Default, Clone)]
pub struct InMemoryProductStore {
    products: Arc<RwLock<HashMap<ProductId, Product>>>,
}

impl InMemoryProductStore {
    /// Creates a new, empty in-memory product store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProductStore for InMemoryProductStore {
    async fn list_products(&self) -> Result<Vec<Product>> {
        let products = self.products.read().await;
        Ok(products.values().cloned().collect())
    }

    async fn get(&self, id: &ProductId) -> Result<Option<Product>> {
        let products = self.products.read().await;
        Ok(products.get(id).cloned())
    }

    async fn store(&self, product: Product) -> Result<()> {
        let mut products = self.products.write().await;
        products.insert(product.id.clone(), product);
        Ok(())
    }

    async fn consume(&self, items: &[CartItem]) -> Result<()> {
        let mut products = self.products.write().await;
        let updated = plan_consumption(items, |id| Ok(products.get(id).cloned()))?;
        for product in updated {
            products.insert(product.id.clone(), product);
        }
        Ok(())
    }
}

/// Builds a complete set of empty in-memory stores.
pub fn in_memory_stores() -> Stores {
    Stores {
        accounts: Box::new(InMemoryAccountStore::new()),
        transactions: Box::new(InMemoryTransactionStore::new()),
        orders: Box::new(InMemoryOrderStore::new()),
        products: Box::new(InMemoryProductStore::new()),
    }
}
