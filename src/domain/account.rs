use crate::domain::identity::AccountId;
use crate::error::{OrderError, Result};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A wallet balance.
///
/// Wraps `rust_decimal::Decimal`. The ledger never lets a balance drop below zero,
/// but the type itself carries no sign restriction so arithmetic stays total.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
pub struct Balance(pub Decimal);

/// A non-negative monetary amount: catalog prices, order totals, debits.
///
/// Only constructible through [`Amount::new`], so a negative price or charge cannot
/// enter the system.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Amount(Decimal);

impl Amount {
    pub const ZERO: Self = Self(Decimal::ZERO);

    pub fn new(value: Decimal) -> Result<Self> {
        if value >= Decimal::ZERO {
            Ok(Self(value))
        } else {
            Err(OrderError::ValidationError(
                "Amount must not be negative".to_string(),
            ))
        }
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    /// Converts to whole minor currency units, rounding half away from zero.
    pub fn to_minor_units(&self) -> Result<i64> {
        self.0
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .to_i64()
            .ok_or_else(|| {
                OrderError::ValidationError(format!("Amount {} is too large to charge", self.0))
            })
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = OrderError;

    fn try_from(value: Decimal) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

impl From<Amount> for Balance {
    fn from(amount: Amount) -> Self {
        Self(amount.0)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.normalize())
    }
}

impl Balance {
    pub const ZERO: Self = Self(Decimal::ZERO);

    pub fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    pub fn covers(&self, amount: Amount) -> bool {
        *self >= Balance::from(amount)
    }

    /// Adds `amount`, failing instead of overflowing.
    pub fn checked_add(self, amount: Amount) -> Result<Self> {
        self.0
            .checked_add(amount.0)
            .map(Self)
            .ok_or_else(|| OrderError::ValidationError(format!("Balance overflow adding {amount}")))
    }

    /// Subtracts `amount`, failing instead of overflowing.
    pub fn checked_sub(self, amount: Amount) -> Result<Self> {
        self.0.checked_sub(amount.0).map(Self).ok_or_else(|| {
            OrderError::ValidationError(format!("Balance overflow subtracting {amount}"))
        })
    }
}

impl fmt::Display for Balance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.normalize())
    }
}

/// A customer's stored-balance wallet.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct WalletAccount {
    /// The identity that owns the wallet.
    pub owner: AccountId,
    /// Funds available for wallet checkout. Never negative.
    pub balance: Balance,
}

impl WalletAccount {
    pub fn new(owner: AccountId) -> Self {
        Self {
            owner,
            balance: Balance::ZERO,
        }
    }

    /// Adds funds to the wallet. The balance is unchanged if the sum would overflow.
    pub fn credit(&mut self, amount: Amount) -> Result<Balance> {
        self.balance = self.balance.checked_add(amount)?;
        Ok(self.balance)
    }

    /// Removes funds only if the balance covers the amount; otherwise leaves the wallet untouched.
    pub fn debit(&mut self, amount: Amount) -> Result<Balance> {
        if self.balance.covers(amount) {
            self.balance = self.balance.checked_sub(amount)?;
            Ok(self.balance)
        } else {
            Err(OrderError::InsufficientFunds {
                owner: self.owner.clone(),
                balance: self.balance,
                required: amount,
            })
        }
    }
}
