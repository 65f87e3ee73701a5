//! Reopen and crash-recovery behaviour of the file-backed store.

use std::fs;
use std::path::Path;

use tempfile::TempDir;
use vendor_kernel::persist::{CATALOG_RECORD, LEDGER_RECORD};
use vendor_kernel::{Currency, Money, NeverFail, Product, ProductId, VendorStore};

fn bread() -> Product {
    Product::new("Bread", Money::parse("JPY 1.0").unwrap())
}

fn open(dir: &Path) -> VendorStore<NeverFail> {
    VendorStore::open_dir(dir, NeverFail, Currency::jpy())
}

#[test]
fn fresh_directory_opens_empty() {
    let dir = TempDir::new().unwrap();
    let store = open(dir.path());

    assert!(store.products().is_empty());
    assert!(store.accounting().is_empty());
    store.close();
}

#[test]
fn committed_state_survives_reopen() {
    let dir = TempDir::new().unwrap();

    let mut store = open(dir.path());
    let id = store.product_create(bread()).unwrap();
    store.product_add_stock(id, 10).unwrap();
    store.product_purchase("alice", id).unwrap();
    // No close: every operation already committed.
    drop(store);

    let store = open(dir.path());
    let status = store.products().get(id).unwrap();
    assert_eq!(status.product, bread());
    assert_eq!((status.stock, status.purchases), (9, 1));
    assert_eq!(
        store.accounting().spent("alice"),
        Some(&Money::parse("JPY 1.0").unwrap())
    );
}

#[test]
fn interrupted_write_leaves_previous_table() {
    let dir = TempDir::new().unwrap();

    let mut store = open(dir.path());
    store.product_create(bread()).unwrap();
    store.close();
    let committed = fs::read(dir.path().join(CATALOG_RECORD)).unwrap();

    // A crash between writing the temporary file and renaming it leaves a
    // half-written sibling behind and the target untouched.
    let stale = dir.path().join(format!("{CATALOG_RECORD}.tmp.deadbeef"));
    fs::write(&stale, b"[{\"id\":0,\"product\":{\"na").unwrap();

    assert_eq!(fs::read(dir.path().join(CATALOG_RECORD)).unwrap(), committed);

    let mut store = open(dir.path());
    assert_eq!(store.products().len(), 1);
    assert!(store.products().contains(ProductId(0)));
    assert!(!stale.exists());

    // The next commit still replaces the target cleanly.
    assert_eq!(store.product_create(bread()).unwrap(), ProductId(1));
    store.close();

    let store = open(dir.path());
    assert_eq!(store.products().len(), 2);
}

#[test]
fn corrupt_record_degrades_to_empty_table() {
    let dir = TempDir::new().unwrap();

    let mut store = open(dir.path());
    let id = store.product_create(bread()).unwrap();
    store.product_add_stock(id, 1).unwrap();
    store.product_purchase("alice", id).unwrap();
    store.close();

    fs::write(dir.path().join(CATALOG_RECORD), b"\0\0garbage").unwrap();

    let store = open(dir.path());
    assert!(store.products().is_empty());
    // The ledger is an independent record and loads normally.
    assert!(store.accounting().spent("alice").is_some());
}

#[test]
fn missing_ledger_record_starts_empty() {
    let dir = TempDir::new().unwrap();

    let mut store = open(dir.path());
    store.product_create(bread()).unwrap();
    store.close();

    fs::remove_file(dir.path().join(LEDGER_RECORD)).unwrap();

    let store = open(dir.path());
    assert_eq!(store.products().len(), 1);
    assert!(store.accounting().is_empty());
}

#[test]
fn duplicate_catalog_rows_load_as_empty_table() {
    let dir = TempDir::new().unwrap();

    let mut store = open(dir.path());
    store.product_create(bread()).unwrap();
    store.close();

    let path = dir.path().join(CATALOG_RECORD);
    let mut rows: Vec<serde_json::Value> =
        serde_json::from_slice(&fs::read(&path).unwrap()).unwrap();
    rows.push(rows[0].clone());
    fs::write(&path, serde_json::to_vec(&rows).unwrap()).unwrap();

    let mut store = open(dir.path());
    assert!(store.products().is_empty());
    assert_eq!(store.product_create(bread()).unwrap(), ProductId(0));
}
