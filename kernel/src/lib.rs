// Vendor Kernel
//
// Record store for a vending machine: product catalog, stock and purchase
// counters, and a per-buyer spending ledger, committed to disk after every
// change.

pub mod catalog;
pub mod config;
pub mod failure;
pub mod ledger;
pub mod money;
pub mod persist;
pub mod service;
pub mod store;

pub use catalog::{Catalog, DuplicateProductId, Product, ProductId, ProductStatus};
pub use config::{ConfigError, StoreConfig};
pub use failure::{AlwaysFail, FailureSource, NeverFail, RandomFailure, ScriptedFailure};
pub use ledger::Ledger;
pub use money::{Currency, Money, MoneyError};
pub use persist::{FileTableStore, MemoryTableStore, PersistError, TableStore};
pub use service::{ServiceError, VendorService};
pub use store::{StoreError, VendorStore};
