use crate::domain::account::Amount;
use crate::domain::identity::AccountId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(pub u64);

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tx-{}", self.0)
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Success,
    Failed,
}

/// A wallet movement waiting to be appended to the log.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub amount: Amount,
    pub sender: AccountId,
    pub receiver: AccountId,
    pub description: String,
    pub status: TransactionStatus,
}

/// An entry of the append-only transaction log.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Transaction {
    pub id: TransactionId,
    pub amount: Amount,
    pub sender: AccountId,
    pub receiver: AccountId,
    pub description: String,
    pub status: TransactionStatus,
    pub created_at: DateTime<Utc>,
}

impl NewTransaction {
    pub fn into_transaction(self, id: TransactionId, created_at: DateTime<Utc>) -> Transaction {
        Transaction {
            id,
            amount: self.amount,
            sender: self.sender,
            receiver: self.receiver,
            description: self.description,
            status: self.status,
            created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_serialization() {
        assert_eq!(
            serde_json::to_string(&TransactionStatus::Success).unwrap(),
            "\"success\""
        );
        assert_eq!(
            serde_json::from_str::<TransactionStatus>("\"failed\"").unwrap(),
            TransactionStatus::Failed
        );
    }
}
