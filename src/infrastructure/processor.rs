use crate::domain::ports::{ChargeRequest, PaymentProcessor};
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Mutex;

/// An offline stand-in for the card processor.
///
/// Accepts every charge and hands back a deterministic client secret. Keeps the requests
/// it received so callers can inspect what would have been sent upstream.
#[derive(Default, Clone)]
pub struct SimulatedProcessor {
    next: Arc<AtomicU64>,
    charges: Arc<Mutex<Vec<ChargeRequest>>>,
}

impl SimulatedProcessor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every charge request received so far, oldest first.
    pub async fn charges(&self) -> Vec<ChargeRequest> {
        self.charges.lock().await.clone()
    }
}

#[async_trait]
impl PaymentProcessor for SimulatedProcessor {
    async fn create_charge(&self, request: ChargeRequest) -> Result<String> {
        let n = self.next.fetch_add(1, Ordering::Relaxed) + 1;
        let secret = format!("pi_sim_{n:06}_secret_{}{}", request.amount, request.currency);
        self.charges.lock().await.push(request);
        Ok(secret)
    }
}
