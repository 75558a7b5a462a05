mod common;

use assert_cmd::cargo_bin;
use assert_cmd::prelude::*;
use common::{ALICE, Fixture, pay_with_wallet};
use predicates::prelude::*;
use std::process::Command;

#[cfg(not(feature = "storage-rocksdb"))]
#[test]
fn test_rocksdb_fallback_warning() {
    let fixture = Fixture::new(
        &["p1,Teapot,1000,5"],
        &["alice,100"],
        &[pay_with_wallet(ALICE, "p1", 1)],
    )
    .unwrap();

    let mut cmd = Command::new(cargo_bin!("orderpay"));
    cmd.env("RUST_LOG", "warn")
        .arg(&fixture.requests)
        .arg("--wallets")
        .arg(&fixture.wallets)
        .arg("--db-path")
        .arg(fixture.path("some_db"));

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("WARN"))
        .stderr(predicate::str::contains("Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to In-Memory storage."))
        .stdout(predicate::str::contains("alice,100"));
}

#[cfg(feature = "storage-rocksdb")]
#[test]
fn test_rocksdb_no_fallback_warning() {
    let fixture = Fixture::new(
        &["p1,Teapot,1000,5"],
        &["alice,100"],
        &[pay_with_wallet(ALICE, "p1", 1)],
    )
    .unwrap();

    let mut cmd = Command::new(cargo_bin!("orderpay"));
    cmd.arg(&fixture.requests)
        .arg("--wallets")
        .arg(&fixture.wallets)
        .arg("--db-path")
        .arg(fixture.path("test_db"));

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("Falling back to In-Memory storage").not());
}
