use crate::application::engine::OrderEngine;
use crate::application::requests::{
    ConfirmedCheckout, ExternalCheckout, WalletCheckout, WalletReceipt,
};
use crate::domain::identity::Requester;
use crate::domain::order::{Order, OrderId, OrderStatus};
use crate::domain::transaction::Transaction;
use crate::error::{OrderError, Result};
use serde::{Deserialize, Serialize};
use std::io::BufRead;

/// One line of the request file. Every request names its caller.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Request {
    PayWithWallet {
        requester: Requester,
        checkout: WalletCheckout,
    },
    InitiateExternalPayment {
        requester: Requester,
        checkout: ExternalCheckout,
    },
    ConfirmExternalPayment {
        requester: Requester,
        checkout: ConfirmedCheckout,
    },
    ListOrders {
        requester: Requester,
    },
    GetOrder {
        requester: Requester,
        order: OrderId,
    },
    UpdateOrderStatus {
        requester: Requester,
        order: OrderId,
        status: OrderStatus,
    },
    UnreconciledPayments {
        requester: Requester,
    },
}

impl Request {
    pub fn requester(&self) -> &Requester {
        match self {
            Request::PayWithWallet { requester, .. }
            | Request::InitiateExternalPayment { requester, .. }
            | Request::ConfirmExternalPayment { requester, .. }
            | Request::ListOrders { requester }
            | Request::GetOrder { requester, .. }
            | Request::UpdateOrderStatus { requester, .. }
            | Request::UnreconciledPayments { requester } => requester,
        }
    }

    /// Runs the request against the engine.
    pub async fn execute(self, engine: &OrderEngine) -> Result<Response> {
        Ok(match self {
            Request::PayWithWallet {
                requester,
                checkout,
            } => Response::Receipt(engine.pay_with_wallet(&requester, checkout).await?),
            Request::InitiateExternalPayment {
                requester,
                checkout,
            } => Response::ClientSecret(
                engine
                    .initiate_external_payment(&requester, checkout)
                    .await?,
            ),
            Request::ConfirmExternalPayment {
                requester,
                checkout,
            } => Response::Order(engine.confirm_external_payment(&requester, checkout).await?),
            Request::ListOrders { requester } => {
                Response::Orders(engine.list_orders(&requester).await?)
            }
            Request::GetOrder { requester, order } => {
                Response::Order(engine.get_order(&requester, order).await?)
            }
            Request::UpdateOrderStatus {
                requester,
                order,
                status,
            } => Response::Order(engine.update_order_status(&requester, order, status).await?),
            Request::UnreconciledPayments { requester } => {
                Response::Transactions(engine.unreconciled_payments(&requester).await?)
            }
        })
    }
}

/// What a successful request produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Response {
    Receipt(WalletReceipt),
    ClientSecret(String),
    Order(Order),
    Orders(Vec<Order>),
    Transactions(Vec<Transaction>),
}

/// Reads requests from a JSON-lines source. Blank lines are skipped.
pub struct RequestReader<R: BufRead> {
    source: R,
}

impl<R: BufRead> RequestReader<R> {
    pub fn new(source: R) -> Self {
        Self { source }
    }

    /// Yields `(line number, request)` pairs; a malformed line yields an error for that
    /// line only.
    pub fn requests(self) -> impl Iterator<Item = (usize, Result<Request>)> {
        self.source
            .lines()
            .enumerate()
            .map(|(i, line)| (i + 1, line))
            .filter(|(_, line)| line.as_ref().map_or(true, |l| !l.trim().is_empty()))
            .map(|(n, line)| {
                let parsed = line
                    .map_err(OrderError::from)
                    .and_then(|l| serde_json::from_str(&l).map_err(OrderError::from));
                (n, parsed)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::identity::Role;

    #[test]
    fn test_reader_parses_each_op() {
        let data = r#"
{"op": "list_orders", "requester": {"account": "root", "role": "admin"}}
{"op": "get_order", "requester": {"account": "alice", "role": "customer"}, "order": 3}

{"op": "update_order_status", "requester": {"account": "root", "role": "admin"}, "order": 3, "status": "Shipped"}
{"op": "pay_with_wallet", "requester": {"account": "alice", "role": "customer"}, "checkout": {"cart_items": [{"product": "p1", "quantity": 2}], "coupon": {"name": "nil", "discount": 0}}}
"#;
        let requests: Vec<(usize, Result<Request>)> =
            RequestReader::new(data.as_bytes()).requests().collect();

        assert_eq!(requests.len(), 4);
        assert_eq!(requests[1].0, 3);
        assert_eq!(requests[2].0, 5);
        match requests[1].1.as_ref().unwrap() {
            Request::GetOrder { requester, order } => {
                assert_eq!(requester.role, Role::Customer);
                assert_eq!(*order, OrderId(3));
            }
            other => panic!("unexpected request: {other:?}"),
        }
        match requests[3].1.as_ref().unwrap() {
            Request::PayWithWallet { checkout, .. } => {
                assert_eq!(checkout.cart_items.len(), 1);
                assert!(checkout.shipping_address.is_none());
            }
            other => panic!("unexpected request: {other:?}"),
        }
    }

    #[test]
    fn test_reader_keeps_going_after_bad_lines() {
        let data = "not json\n{\"op\": \"refund\", \"requester\": {\"account\": \"a\", \"role\": \"admin\"}}\n{\"op\": \"list_orders\", \"requester\": {\"account\": \"a\", \"role\": \"superuser\"}}\n{\"op\": \"list_orders\", \"requester\": {\"account\": \"a\", \"role\": \"admin\"}}\n";
        let results: Vec<(usize, Result<Request>)> =
            RequestReader::new(data.as_bytes()).requests().collect();

        assert_eq!(results.len(), 4);
        assert!(matches!(results[0].1, Err(OrderError::JsonError(_))));
        assert!(results[1].1.is_err());
        assert!(results[2].1.is_err());
        assert_eq!(
            results[3].1.as_ref().unwrap().requester(),
            &Requester::admin("a")
        );
    }
}
