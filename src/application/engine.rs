use crate::application::requests::{
    ConfirmedCheckout, ExternalCheckout, WalletCheckout, WalletReceipt,
};
use crate::config::EngineConfig;
use crate::domain::account::Amount;
use crate::domain::identity::Requester;
use crate::domain::order::{NewOrder, Order, OrderId, OrderStatus, WALLET_PAYMENT_METHOD};
use crate::domain::ports::{ChargeRequest, PaymentProcessorBox, Stores};
use crate::domain::pricing::compute_amount;
use crate::domain::product::Catalog;
use crate::domain::transaction::{NewTransaction, Transaction, TransactionId, TransactionStatus};
use crate::error::{CheckoutStep, OrderError, Result};
use std::collections::HashSet;
use tracing::{debug, error, info, instrument, warn};

/// The order and payment orchestrator.
///
/// `OrderEngine` prices carts from the catalog, settles them through the wallet ledger
/// or the external card processor, and owns order visibility rules. Every operation
/// takes the caller's identity explicitly.
///
/// The wallet path is a sequence of independently durable writes (debit, transaction,
/// order, inventory) with no enclosing transaction. Once the debit commits, any later
/// failure is reported as [`OrderError::PartialFailure`] and the debit stands;
/// [`OrderEngine::unreconciled_payments`] lists payments left without an order.
pub struct OrderEngine {
    stores: Stores,
    processor: PaymentProcessorBox,
    config: EngineConfig,
}

impl OrderEngine {
    /// Creates a new `OrderEngine`.
    ///
    /// # Arguments
    ///
    /// * `stores` - Wallet, transaction, order and product storage.
    /// * `processor` - The external card processor.
    /// * `config` - Store account, currency and processor timeout.
    pub fn new(stores: Stores, processor: PaymentProcessorBox, config: EngineConfig) -> Self {
        Self {
            stores,
            processor,
            config,
        }
    }

    pub fn stores(&self) -> &Stores {
        &self.stores
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    async fn catalog(&self) -> Result<Catalog> {
        Ok(self.stores.products.list_products().await?.into_iter().collect())
    }

    /// Prices a card checkout and asks the processor for a client secret.
    ///
    /// Creates no order and leaves inventory alone; that happens in
    /// [`OrderEngine::confirm_external_payment`] once the processor reports success.
    #[instrument(skip_all, fields(requester = %requester.account))]
    pub async fn initiate_external_payment(
        &self,
        requester: &Requester,
        checkout: ExternalCheckout,
    ) -> Result<String> {
        let catalog = self.catalog().await?;
        let amount = compute_amount(&catalog, &checkout.items, checkout.coupon.as_ref())?;
        let request = ChargeRequest {
            amount: amount.to_minor_units()?,
            currency: self.config.currency.clone(),
            description: checkout
                .description
                .unwrap_or_else(|| self.config.payment_description.clone()),
            shipping: checkout.shipping,
        };
        debug!(amount = request.amount, currency = %request.currency, "requesting card charge");

        let timeout = self.config.processor_timeout;
        match tokio::time::timeout(timeout, self.processor.create_charge(request)).await {
            Ok(Ok(secret)) => {
                info!(%amount, "card charge prepared");
                Ok(secret)
            }
            Ok(Err(e)) => {
                warn!(error = %e, "payment processor rejected the charge");
                Err(match e {
                    OrderError::UpstreamError(_) => e,
                    other => OrderError::UpstreamError(other.to_string()),
                })
            }
            Err(_) => {
                warn!(?timeout, "payment processor timed out");
                Err(OrderError::UpstreamError(format!(
                    "payment processor did not answer within {timeout:?}"
                )))
            }
        }
    }

    /// Records the order for a card payment the processor has confirmed.
    ///
    /// The amount is recomputed from the catalog; nothing the client sends about price is
    /// trusted. Each payment reference confirms at most one order; a repeated confirmation
    /// fails with `ValidationError` before inventory is touched. If inventory cannot be
    /// updated after the order is written the call fails with `PartialFailure`.
    #[instrument(skip_all, fields(requester = %requester.account))]
    pub async fn confirm_external_payment(
        &self,
        requester: &Requester,
        checkout: ConfirmedCheckout,
    ) -> Result<Order> {
        let reference = checkout
            .payment_reference
            .filter(|r| !r.trim().is_empty())
            .ok_or_else(|| {
                OrderError::ValidationError("Order data missing: payment reference".to_string())
            })?;

        let catalog = self.catalog().await?;
        let amount = compute_amount(&catalog, &checkout.cart_items, checkout.coupon.as_ref())?;
        let draft = NewOrder {
            owner: requester.account.clone(),
            amount,
            status: Some(checkout.status.unwrap_or_else(OrderStatus::placed)),
            cart_items: checkout.cart_items,
            shipping_address: checkout.shipping_address,
            payment_method: checkout.payment_method,
            coupon: checkout.coupon,
            transaction: None,
            payment_reference: Some(reference),
        };

        let order = self.stores.orders.create(draft).await?;
        info!(order = %order.id, %amount, "order created for card payment");

        self.stores
            .products
            .consume(&order.cart_items)
            .await
            .map_err(|e| partial_failure(CheckoutStep::ConsumeInventory, amount, None, e))?;
        Ok(order)
    }

    /// Pays for a cart from the requester's wallet and places the order.
    ///
    /// Steps run in order: price, debit, log the transaction, create the order, consume
    /// inventory. Validation, pricing and an uncovered balance all fail before the
    /// debit, leaving nothing behind.
    #[instrument(skip_all, fields(requester = %requester.account))]
    pub async fn pay_with_wallet(
        &self,
        requester: &Requester,
        checkout: WalletCheckout,
    ) -> Result<WalletReceipt> {
        let owner = &requester.account;
        if self.stores.accounts.get(owner).await?.is_none() {
            return Err(OrderError::NotFound(format!("wallet account {owner}")));
        }

        let catalog = self.catalog().await?;
        let amount = compute_amount(&catalog, &checkout.cart_items, checkout.coupon.as_ref())?;
        let mut draft = NewOrder {
            owner: owner.clone(),
            amount,
            status: Some(OrderStatus::placed()),
            cart_items: checkout.cart_items,
            shipping_address: checkout.shipping_address,
            payment_method: Some(WALLET_PAYMENT_METHOD.to_string()),
            coupon: checkout.coupon,
            transaction: None,
            payment_reference: None,
        };
        draft.validate()?;

        let balance = self.stores.accounts.debit(owner, amount).await?;
        info!(%amount, %balance, "wallet debited");

        let transaction = self
            .stores
            .transactions
            .record(NewTransaction {
                amount,
                sender: owner.clone(),
                receiver: self.config.store_account.clone(),
                description: self.config.payment_description.clone(),
                status: TransactionStatus::Success,
            })
            .await
            .map_err(|e| partial_failure(CheckoutStep::RecordTransaction, amount, None, e))?;
        debug!(transaction = %transaction.id, "transaction recorded");

        draft.transaction = Some(transaction.id);
        let order = self.stores.orders.create(draft).await.map_err(|e| {
            partial_failure(CheckoutStep::CreateOrder, amount, Some(transaction.id), e)
        })?;
        debug!(order = %order.id, "order created");

        self.stores
            .products
            .consume(&order.cart_items)
            .await
            .map_err(|e| {
                partial_failure(
                    CheckoutStep::ConsumeInventory,
                    amount,
                    Some(transaction.id),
                    e,
                )
            })?;

        info!(order = %order.id, transaction = %transaction.id, "wallet payment complete");
        Ok(WalletReceipt {
            order,
            transaction,
            balance,
        })
    }

    /// Orders visible to the requester, newest first.
    pub async fn list_orders(&self, requester: &Requester) -> Result<Vec<Order>> {
        if requester.role.can_view_all_orders() {
            self.stores.orders.get_all().await
        } else {
            self.stores.orders.get_for_owner(&requester.account).await
        }
    }

    pub async fn get_order(&self, requester: &Requester, id: OrderId) -> Result<Order> {
        let order = self
            .stores
            .orders
            .get(id)
            .await?
            .ok_or_else(|| OrderError::NotFound(format!("order {id}")))?;

        if !requester.can_view(&order.owner) {
            warn!(requester = %requester.account, order = %id, "cross-account order read refused");
            return Err(OrderError::Unauthorized(format!(
                "{} may not read order {id}",
                requester.account
            )));
        }
        Ok(order)
    }

    /// Replaces an order's status. Amount, items and inventory are not touched.
    #[instrument(skip_all, fields(requester = %requester.account, order = %id))]
    pub async fn update_order_status(
        &self,
        requester: &Requester,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<Order> {
        if !requester.role.can_manage_orders() {
            return Err(OrderError::Unauthorized(format!(
                "{} may not change order status",
                requester.account
            )));
        }
        let order = self.stores.orders.update_status(id, status).await?;
        info!(status = %order.status, "order status updated");
        Ok(order)
    }

    /// Successful wallet payments to the store that no order refers to.
    ///
    /// Read-only, so it can be run any number of times while an administrator works
    /// through `PartialFailure` reports.
    pub async fn unreconciled_payments(&self, requester: &Requester) -> Result<Vec<Transaction>> {
        if !requester.role.can_manage_orders() {
            return Err(OrderError::Unauthorized(format!(
                "{} may not inspect payments",
                requester.account
            )));
        }

        let settled: HashSet<TransactionId> = self
            .stores
            .orders
            .get_all()
            .await?
            .into_iter()
            .filter_map(|o| o.transaction)
            .collect();

        Ok(self
            .stores
            .transactions
            .get_all()
            .await?
            .into_iter()
            .filter(|tx| {
                tx.status == TransactionStatus::Success
                    && tx.receiver == self.config.store_account
                    && !settled.contains(&tx.id)
            })
            .collect())
    }
}

fn partial_failure(
    step: CheckoutStep,
    amount: Amount,
    transaction: Option<TransactionId>,
    source: OrderError,
) -> OrderError {
    error!(%step, %amount, ?transaction, error = %source, "checkout failed after payment was taken");
    OrderError::PartialFailure {
        step,
        amount,
        transaction,
        source: Box::new(source),
    }
}
