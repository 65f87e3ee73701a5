// Vendor Record Store
//
// Owns the catalog and ledger tables, applies each operation to
// completion, and commits both tables after every mutation.
//
// The store is single-writer: callers serialize access (the `&mut self`
// receivers make this explicit). There is no internal locking.

use std::fs;
use std::path::Path;

use tracing::{debug, error, info, warn};

use crate::catalog::{Catalog, Product, ProductId, ProductStatus};
use crate::config::StoreConfig;
use crate::failure::FailureSource;
use crate::ledger::Ledger;
use crate::money::{Currency, MoneyError};
use crate::persist::{
    load_table, save_table, FileTableStore, PersistError, TableStore, CATALOG_RECORD,
    LEDGER_RECORD,
};

/// Expected business failures of store operations.
///
/// Persistence failures are not part of this enum: they are logged and the
/// operation still reports its in-memory outcome.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("No such product: {0}")]
    NotFound(ProductId),

    #[error("The product is out of stock.")]
    OutOfStock,

    /// The buyer was charged but nothing came out.
    #[error("The machine makes a grinding noise.")]
    DispenseFailure,

    #[error("The product is priced in {product}, but this machine accounts in {ledger}.")]
    CurrencyMismatch { product: Currency, ledger: Currency },

    #[error("No product identifiers left.")]
    IdSpaceExhausted,

    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// The vending machine record store.
#[derive(Debug)]
pub struct VendorStore<F, S = FileTableStore> {
    catalog: Catalog,
    ledger: Ledger,
    currency: Currency,
    failure: F,
    backend: S,
}

impl<F: FailureSource> VendorStore<F, FileTableStore> {
    /// Open a store backed by files in `dir`, creating the directory if needed.
    ///
    /// Temp files left by an interrupted write are removed first.
    pub fn open_dir(dir: impl AsRef<Path>, failure: F, currency: Currency) -> Self {
        let dir = dir.as_ref();
        if let Err(err) = fs::create_dir_all(dir) {
            // Loads degrade to empty tables and commits will log their own errors.
            error!(dir = %dir.display(), error = %err, "could not create storage directory");
        }
        let backend = FileTableStore::new(dir);
        for record in [CATALOG_RECORD, LEDGER_RECORD] {
            match backend.sweep_temps(record) {
                Ok(0) => {}
                Ok(removed) => {
                    warn!(record, removed, "removed temp files from an interrupted write")
                }
                Err(err) => error!(record, error = %err, "could not remove stale temp files"),
            }
        }
        Self::open(backend, failure, currency)
    }

    pub fn from_config(config: &StoreConfig, failure: F) -> Self {
        Self::open_dir(&config.data_dir, failure, config.currency.clone())
    }
}

impl<F: FailureSource, S: TableStore> VendorStore<F, S> {
    /// Load both tables from `backend`. Missing or unreadable records start empty.
    pub fn open(backend: S, failure: F, currency: Currency) -> Self {
        let catalog: Catalog = load_table(&backend, CATALOG_RECORD);
        let ledger: Ledger = load_table(&backend, LEDGER_RECORD);

        info!(
            products = catalog.len(),
            buyers = ledger.len(),
            currency = %currency,
            "vendor store opened"
        );

        Self {
            catalog,
            ledger,
            currency,
            failure,
            backend,
        }
    }

    /// Final commit, then release the store.
    pub fn close(mut self) {
        self.checkpoint();
        info!("vendor store closed");
    }

    /// Ordered view of the catalog.
    pub fn products(&self) -> &Catalog {
        &self.catalog
    }

    /// Ordered view of the ledger.
    pub fn accounting(&self) -> &Ledger {
        &self.ledger
    }

    pub fn currency(&self) -> &Currency {
        &self.currency
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    pub fn product_create(&mut self, product: Product) -> Result<ProductId, StoreError> {
        debug!(?product, "product create");

        let id = self.catalog.fresh_id().ok_or(StoreError::IdSpaceExhausted)?;
        self.catalog.insert(id, ProductStatus::new(product));
        self.checkpoint();
        Ok(id)
    }

    pub fn product_delete(&mut self, id: ProductId) -> Result<(), StoreError> {
        debug!(%id, "product delete");

        if self.catalog.remove(id).is_none() {
            return Err(StoreError::NotFound(id));
        }
        self.checkpoint();
        Ok(())
    }

    /// Set (not add to) the stock of `id`. Negative counts become zero.
    pub fn product_add_stock(&mut self, id: ProductId, count: i64) -> Result<u64, StoreError> {
        debug!(%id, count, "product add stock");

        let status = self.catalog.get(id).ok_or(StoreError::NotFound(id))?;
        let updated = status.with_stock(count);
        let stock = updated.stock;

        self.catalog.insert(id, updated);
        self.checkpoint();
        Ok(stock)
    }

    /// Buy one unit of `id` on behalf of `buyer`.
    ///
    /// Once the product is known to be in stock the buyer is charged,
    /// whether or not the dispense then succeeds. A jammed dispense still
    /// counts as a purchase but leaves the stock untouched.
    pub fn product_purchase(&mut self, buyer: &str, id: ProductId) -> Result<String, StoreError> {
        debug!(buyer, %id, "product purchase");

        let status = self
            .catalog
            .get(id)
            .cloned()
            .ok_or(StoreError::NotFound(id))?;

        if !status.is_in_stock() {
            return Err(StoreError::OutOfStock);
        }

        let price = &status.product.price;
        if price.currency != self.currency {
            return Err(StoreError::CurrencyMismatch {
                product: price.currency.clone(),
                ledger: self.currency.clone(),
            });
        }

        // Charge first; the outcome below does not refund.
        let total = self
            .ledger
            .charge(buyer, price, &self.currency)
            .map_err(|err| match err {
                // The buyer's existing entry is in another currency.
                MoneyError::CurrencyMismatch { left, right } => StoreError::CurrencyMismatch {
                    product: right,
                    ledger: left,
                },
                other => StoreError::Money(other),
            })?;
        debug!(buyer, total = %total, "buyer charged");

        let purchases = status.purchases.saturating_add(1);

        if !self.failure.decide_failure() {
            let dispensed = ProductStatus {
                stock: status.stock - 1,
                ..status.with_purchases(purchases)
            };
            self.catalog.insert(id, dispensed);
            self.checkpoint();
            return Ok(format!("The machine dispenses {}", status.product.name));
        }

        self.catalog.insert(id, status.with_purchases(purchases));
        self.checkpoint();
        Err(StoreError::DispenseFailure)
    }

    /// Write both tables to the backend.
    ///
    /// Both records are attempted even if the first fails; the first error
    /// is returned. The tables are independent records, so a crash between
    /// the two writes can leave them out of step.
    pub fn commit(&mut self) -> Result<(), PersistError> {
        let catalog = save_table(&mut self.backend, CATALOG_RECORD, &self.catalog);
        let ledger = save_table(&mut self.backend, LEDGER_RECORD, &self.ledger);
        catalog.and(ledger)
    }

    /// Commit and log any failure. The in-memory state stays as it is.
    fn checkpoint(&mut self) {
        if let Err(err) = self.commit() {
            error!(error = %err, "commit failed, in-memory state kept");
        }
    }
}
