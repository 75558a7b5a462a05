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
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, DB, IteratorMode, Options, WriteBatch};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Column Family for wallet accounts, keyed by owner.
pub const CF_ACCOUNTS: &str = "accounts";
/// Column Family for the transaction log, keyed by big-endian id.
pub const CF_TRANSACTIONS: &str = "transactions";
/// Column Family for orders, keyed by big-endian id.
pub const CF_ORDERS: &str = "orders";
/// Column Family for catalog entries, keyed by product id.
pub const CF_PRODUCTS: &str = "products";
/// Column Family for id sequences and the payment-reference index.
pub const CF_META: &str = "meta";

const ORDER_SEQ: &[u8] = b"order_seq";
const TRANSACTION_SEQ: &[u8] = b"transaction_seq";
const PAYMENT_PREFIX: &str = "payment/";

fn internal(msg: String) -> OrderError {
    OrderError::InternalError(Box::new(std::io::Error::other(msg)))
}

/// A persistent store implementation using RocksDB.
///
/// Holds every entity in its own Column Family. Writes that depend on current state
/// (debits, inventory decrements, id allocation) take `write_lock`, read what they
/// need and commit through a single `WriteBatch`, so each is one atomic
/// compare-and-update from the caller's point of view.
///
/// `Clone` shares the underlying `Arc<DB>` and the lock.
#[derive(Clone)]
pub struct RocksDBStore {
    db: Arc<DB>,
    write_lock: Arc<Mutex<()>>,
}

impl RocksDBStore {
    /// Opens or creates a RocksDB instance at the specified path, creating any missing
    /// column families.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let descriptors = [CF_ACCOUNTS, CF_TRANSACTIONS, CF_ORDERS, CF_PRODUCTS, CF_META]
            .into_iter()
            .map(|name| ColumnFamilyDescriptor::new(name, Options::default()));

        let db = DB::open_cf_descriptors(&opts, path, descriptors)?;

        Ok(Self {
            db: Arc::new(db),
            write_lock: Arc::new(Mutex::new(())),
        })
    }

    /// Boxes clones of this store for every port.
    pub fn stores(&self) -> Stores {
        Stores {
            accounts: Box::new(self.clone()),
            transactions: Box::new(self.clone()),
            orders: Box::new(self.clone()),
            products: Box::new(self.clone()),
        }
    }

    fn cf(&self, name: &str) -> Result<&ColumnFamily> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| internal(format!("{name} column family not found")))
    }

    fn get_json<T: DeserializeOwned>(&self, cf: &str, key: &[u8]) -> Result<Option<T>> {
        match self.db.get_cf(self.cf(cf)?, key)? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    fn put_json<T: Serialize>(
        &self,
        batch: &mut WriteBatch,
        cf: &str,
        key: &[u8],
        value: &T,
    ) -> Result<()> {
        batch.put_cf(self.cf(cf)?, key, serde_json::to_vec(value)?);
        Ok(())
    }

    fn all_json<T: DeserializeOwned>(&self, cf: &str) -> Result<Vec<T>> {
        self.db
            .iterator_cf(self.cf(cf)?, IteratorMode::Start)
            .map(|item| -> Result<T> {
                let (_key, value) =
                    item.map_err(|e| internal(format!("RocksDB iteration error: {e}")))?;
                Ok(serde_json::from_slice(&value)?)
            })
            .collect()
    }

    /// Reserves the next id of a sequence, adding the bump to `batch`.
    fn next_id(&self, batch: &mut WriteBatch, seq: &[u8]) -> Result<u64> {
        let meta = self.cf(CF_META)?;
        let current = match self.db.get_cf(meta, seq)? {
            Some(bytes) => {
                let raw: [u8; 8] = bytes
                    .as_slice()
                    .try_into()
                    .map_err(|_| internal("Corrupt id sequence".to_string()))?;
                u64::from_be_bytes(raw)
            }
            None => 0,
        };
        let next = current + 1;
        batch.put_cf(meta, seq, next.to_be_bytes());
        Ok(next)
    }
}

#[async_trait]
impl AccountStore for RocksDBStore {
    async fn get(&self, owner: &AccountId) -> Result<Option<WalletAccount>> {
        self.get_json(CF_ACCOUNTS, owner.as_str().as_bytes())
    }

    async fn get_all(&self) -> Result<Vec<WalletAccount>> {
        self.all_json(CF_ACCOUNTS)
    }

    async fn debit(&self, owner: &AccountId, amount: Amount) -> Result<Balance> {
        let _guard = self.write_lock.lock().await;
        let key = owner.as_str().as_bytes();
        let mut account: WalletAccount = self
            .get_json(CF_ACCOUNTS, key)?
            .ok_or_else(|| OrderError::NotFound(format!("wallet account {owner}")))?;
        let balance = account.debit(amount)?;

        let mut batch = WriteBatch::default();
        self.put_json(&mut batch, CF_ACCOUNTS, key, &account)?;
        self.db.write(batch)?;
        Ok(balance)
    }

    async fn credit(&self, owner: &AccountId, amount: Amount) -> Result<Balance> {
        let _guard = self.write_lock.lock().await;
        let key = owner.as_str().as_bytes();
        let mut account = self
            .get_json(CF_ACCOUNTS, key)?
            .unwrap_or_else(|| WalletAccount::new(owner.clone()));
        let balance = account.credit(amount)?;

        let mut batch = WriteBatch::default();
        self.put_json(&mut batch, CF_ACCOUNTS, key, &account)?;
        self.db.write(batch)?;
        Ok(balance)
    }
}

#[async_trait]
impl TransactionStore for RocksDBStore {
    async fn record(&self, tx: NewTransaction) -> Result<Transaction> {
        let _guard = self.write_lock.lock().await;
        let mut batch = WriteBatch::default();
        let id = TransactionId(self.next_id(&mut batch, TRANSACTION_SEQ)?);
        let tx = tx.into_transaction(id, Utc::now());
        self.put_json(&mut batch, CF_TRANSACTIONS, &id.0.to_be_bytes(), &tx)?;
        self.db.write(batch)?;
        Ok(tx)
    }

    async fn get(&self, id: TransactionId) -> Result<Option<Transaction>> {
        self.get_json(CF_TRANSACTIONS, &id.0.to_be_bytes())
    }

    async fn get_all(&self) -> Result<Vec<Transaction>> {
        self.all_json(CF_TRANSACTIONS)
    }
}

#[async_trait]
impl OrderStore for RocksDBStore {
    async fn create(&self, order: NewOrder) -> Result<Order> {
        let _guard = self.write_lock.lock().await;
        let payment_key = order
            .payment_reference
            .as_ref()
            .map(|reference| (reference.clone(), format!("{PAYMENT_PREFIX}{reference}")));
        if let Some((reference, key)) = &payment_key {
            if let Some(existing) = self.get_json::<OrderId>(CF_META, key.as_bytes())? {
                return Err(already_confirmed(reference, existing));
            }
        }

        let mut batch = WriteBatch::default();
        let id = OrderId(self.next_id(&mut batch, ORDER_SEQ)?);
        let order = order.into_order(id, Utc::now())?;
        self.put_json(&mut batch, CF_ORDERS, &id.0.to_be_bytes(), &order)?;
        if let Some((_, key)) = &payment_key {
            self.put_json(&mut batch, CF_META, key.as_bytes(), &id)?;
        }
        self.db.write(batch)?;
        Ok(order)
    }

    async fn get(&self, id: OrderId) -> Result<Option<Order>> {
        self.get_json(CF_ORDERS, &id.0.to_be_bytes())
    }

    async fn get_all(&self) -> Result<Vec<Order>> {
        let mut orders: Vec<Order> = self.all_json(CF_ORDERS)?;
        sort_newest_first(&mut orders);
        Ok(orders)
    }

    async fn get_for_owner(&self, owner: &AccountId) -> Result<Vec<Order>> {
        let mut orders: Vec<Order> = self
            .all_json::<Order>(CF_ORDERS)?
            .into_iter()
            .filter(|o| &o.owner == owner)
            .collect();
        sort_newest_first(&mut orders);
        Ok(orders)
    }

    async fn update_status(&self, id: OrderId, status: OrderStatus) -> Result<Order> {
        let _guard = self.write_lock.lock().await;
        let key = id.0.to_be_bytes();
        let mut order: Order = self
            .get_json(CF_ORDERS, &key)?
            .ok_or_else(|| OrderError::NotFound(format!("order {id}")))?;
        order.status = status;

        let mut batch = WriteBatch::default();
        self.put_json(&mut batch, CF_ORDERS, &key, &order)?;
        self.db.write(batch)?;
        Ok(order)
    }
}

#[async_trait]
impl ProductStore for RocksDBStore {
    async fn list_products(&self) -> Result<Vec<Product>> {
        self.all_json(CF_PRODUCTS)
    }

    async fn get(&self, id: &ProductId) -> Result<Option<Product>> {
        self.get_json(CF_PRODUCTS, id.0.as_bytes())
    }

    async fn store(&self, product: Product) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut batch = WriteBatch::default();
        self.put_json(&mut batch, CF_PRODUCTS, product.id.0.as_bytes(), &product)?;
        self.db.write(batch)?;
        Ok(())
    }

    async fn consume(&self, items: &[CartItem]) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let updated = plan_consumption(items, |id| self.get_json(CF_PRODUCTS, id.0.as_bytes()))?;

        let mut batch = WriteBatch::default();
        for product in &updated {
            self.put_json(&mut batch, CF_PRODUCTS, product.id.0.as_bytes(), product)?;
        }
        self.db.write(batch)?;
        Ok(())
    }
}
