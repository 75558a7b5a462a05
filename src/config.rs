use crate::domain::identity::AccountId;
use std::time::Duration;

/// Settings the engine needs at runtime. Built by `main` from the command line.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Account that receives every wallet payment.
    pub store_account: AccountId,
    /// ISO currency code sent to the card processor.
    pub currency: String,
    /// Upper bound on a single card-processor call.
    pub processor_timeout: Duration,
    /// Description written to the transaction log and sent with card charges.
    pub payment_description: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            store_account: AccountId::from("store"),
            currency: "usd".to_string(),
            processor_timeout: Duration::from_secs(10),
            payment_description: "Payment for products.".to_string(),
        }
    }
}
