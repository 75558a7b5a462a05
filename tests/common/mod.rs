#![allow(dead_code)]

use std::fs;
use std::io::Error;
use std::path::PathBuf;
use tempfile::TempDir;

pub const ALICE: &str = r#"{"account": "alice", "role": "customer"}"#;
pub const BOB: &str = r#"{"account": "bob", "role": "customer"}"#;
pub const ADMIN: &str = r#"{"account": "root", "role": "admin"}"#;

pub const SHIPPING: &str = r#"{"name": "Ada Lovelace", "line1": "12 Analytical Row", "city": "London", "postal_code": "N1 9GU", "country": "GB"}"#;

/// Input files for one CLI run, kept alive for as long as the fixture is.
pub struct Fixture {
    pub dir: TempDir,
    pub catalog: PathBuf,
    pub wallets: PathBuf,
    pub requests: PathBuf,
}

impl Fixture {
    pub fn new(catalog: &[&str], wallets: &[&str], requests: &[String]) -> Result<Self, Error> {
        let dir = tempfile::tempdir()?;
        let catalog_path = dir.path().join("catalog.csv");
        let wallets_path = dir.path().join("wallets.csv");
        let requests_path = dir.path().join("requests.jsonl");

        let mut catalog_rows = vec!["id,name,price,quantity"];
        catalog_rows.extend_from_slice(catalog);
        fs::write(&catalog_path, catalog_rows.join("\n"))?;

        let mut wallet_rows = vec!["owner,balance"];
        wallet_rows.extend_from_slice(wallets);
        fs::write(&wallets_path, wallet_rows.join("\n"))?;

        fs::write(&requests_path, requests.join("\n"))?;

        Ok(Self {
            dir,
            catalog: catalog_path,
            wallets: wallets_path,
            requests: requests_path,
        })
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }
}

/// A wallet checkout request line for `quantity` units of `product`.
pub fn pay_with_wallet(requester: &str, product: &str, quantity: u32) -> String {
    format!(
        r#"{{"op": "pay_with_wallet", "requester": {requester}, "checkout": {{"cart_items": [{{"product": "{product}", "quantity": {quantity}}}], "shipping_address": {SHIPPING}}}}}"#
    )
}

pub fn list_orders(requester: &str) -> String {
    format!(r#"{{"op": "list_orders", "requester": {requester}}}"#)
}
