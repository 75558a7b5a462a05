#![cfg(feature = "storage-rocksdb")]

mod common;

use assert_cmd::cargo_bin;
use common::{ADMIN, ALICE, Fixture, list_orders, pay_with_wallet};
use std::process::Command;

#[test]
fn test_rocksdb_persistence_recovery() {
    // 1. First run: seed the catalog and wallet, buy two units
    let first = Fixture::new(
        &["p1,Teapot,1000,5"],
        &["alice,5000"],
        &[pay_with_wallet(ALICE, "p1", 2)],
    )
    .unwrap();
    let db_path = first.path("test_db");

    let mut cmd1 = Command::new(cargo_bin!("orderpay"));
    cmd1.arg(&first.requests)
        .arg("--catalog")
        .arg(&first.catalog)
        .arg("--wallets")
        .arg(&first.wallets)
        .arg("--db-path")
        .arg(&db_path);

    let output1 = cmd1.output().expect("Failed to execute command");
    assert!(output1.status.success());
    let stdout1 = String::from_utf8_lossy(&output1.stdout);
    assert!(stdout1.contains("alice,3000"));

    // 2. Second run: no seed files, the same DB path
    let second = Fixture::new(&[], &[], &[pay_with_wallet(ALICE, "p1", 3), list_orders(ADMIN)]).unwrap();
    let orders_out = second.path("orders.jsonl");

    let mut cmd2 = Command::new(cargo_bin!("orderpay"));
    cmd2.arg(&second.requests)
        .arg("--db-path")
        .arg(&db_path)
        .arg("--orders-out")
        .arg(&orders_out);

    let output2 = cmd2.output().expect("Failed to execute command");
    assert!(output2.status.success());
    let stdout2 = String::from_utf8_lossy(&output2.stdout);

    // Balance and stock survived the restart: 3000 - 3 * 1000
    assert!(stdout2.contains("alice,0"));

    // Order ids keep counting from the previous run, newest first
    let orders = std::fs::read_to_string(&orders_out).unwrap();
    let ids: Vec<u64> = orders
        .lines()
        .map(|line| serde_json::from_str::<serde_json::Value>(line).unwrap()["id"].as_u64().unwrap())
        .collect();
    assert_eq!(ids, vec![2, 1]);
}
