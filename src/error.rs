use crate::domain::account::{Amount, Balance};
use crate::domain::identity::AccountId;
use crate::domain::product::ProductId;
use crate::domain::transaction::TransactionId;
use std::fmt;
use thiserror::Error;

/// The write that failed after a wallet debit (or processor capture) committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutStep {
    RecordTransaction,
    CreateOrder,
    ConsumeInventory,
}

impl fmt::Display for CheckoutStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckoutStep::RecordTransaction => write!(f, "recording the transaction"),
            CheckoutStep::CreateOrder => write!(f, "creating the order"),
            CheckoutStep::ConsumeInventory => write!(f, "updating inventory"),
        }
    }
}

#[derive(Error, Debug)]
pub enum OrderError {
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("Unknown product in cart: {0}")]
    InvalidReference(ProductId),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error("Insufficient balance for {owner}: balance {balance}, required {required}")]
    InsufficientFunds {
        owner: AccountId,
        balance: Balance,
        required: Amount,
    },
    #[error("Insufficient stock for {product}: available {available}, requested {requested}")]
    InsufficientStock {
        product: ProductId,
        available: u32,
        requested: u32,
    },
    /// Funds have already moved when this is returned. The debit is not reversed.
    #[error(
        "Payment of {amount} was taken but {step} failed; contact an administrator for manual reconciliation: {source}"
    )]
    PartialFailure {
        step: CheckoutStep,
        amount: Amount,
        transaction: Option<TransactionId>,
        #[source]
        source: Box<OrderError>,
    },
    #[error("Payment processor error: {0}")]
    UpstreamError(String),
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Internal error: {0}")]
    InternalError(Box<dyn std::error::Error + Send + Sync>),
}

#[cfg(feature = "storage-rocksdb")]
impl From<rocksdb::Error> for OrderError {
    fn from(e: rocksdb::Error) -> Self {
        OrderError::InternalError(Box::new(e))
    }
}

pub type Result<T> = std::result::Result<T, OrderError>;
