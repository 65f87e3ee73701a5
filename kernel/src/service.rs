// Vendor Service
//
// Availability wrapper around a bound store. Callers hold a service that
// may or may not currently have a store; every operation on an unbound
// service reports the database as offline instead of panicking.

use crate::catalog::{Catalog, Product, ProductId};
use crate::failure::FailureSource;
use crate::ledger::Ledger;
use crate::persist::{FileTableStore, TableStore};
use crate::store::{StoreError, VendorStore};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ServiceError {
    #[error("Vendor database is offline.")]
    Offline,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Holds at most one live store.
#[derive(Debug)]
pub struct VendorService<F, S = FileTableStore> {
    store: Option<VendorStore<F, S>>,
}

impl<F, S> Default for VendorService<F, S> {
    fn default() -> Self {
        Self { store: None }
    }
}

impl<F: FailureSource, S: TableStore> VendorService<F, S> {
    /// A service with no store bound.
    pub fn offline() -> Self {
        Self::default()
    }

    pub fn with_store(store: VendorStore<F, S>) -> Self {
        Self { store: Some(store) }
    }

    /// Bind a store, closing any store that was bound before.
    pub fn activate(&mut self, store: VendorStore<F, S>) {
        if let Some(previous) = self.store.replace(store) {
            previous.close();
        }
    }

    /// Close and unbind the current store, if any.
    pub fn deactivate(&mut self) {
        if let Some(store) = self.store.take() {
            store.close();
        }
    }

    pub fn is_available(&self) -> bool {
        self.store.is_some()
    }

    fn store(&self) -> Result<&VendorStore<F, S>, ServiceError> {
        self.store.as_ref().ok_or(ServiceError::Offline)
    }

    fn store_mut(&mut self) -> Result<&mut VendorStore<F, S>, ServiceError> {
        self.store.as_mut().ok_or(ServiceError::Offline)
    }

    pub fn products(&self) -> Result<&Catalog, ServiceError> {
        Ok(self.store()?.products())
    }

    pub fn accounting(&self) -> Result<&Ledger, ServiceError> {
        Ok(self.store()?.accounting())
    }

    pub fn product_create(&mut self, product: Product) -> Result<ProductId, ServiceError> {
        Ok(self.store_mut()?.product_create(product)?)
    }

    pub fn product_delete(&mut self, id: ProductId) -> Result<(), ServiceError> {
        Ok(self.store_mut()?.product_delete(id)?)
    }

    pub fn product_add_stock(&mut self, id: ProductId, count: i64) -> Result<u64, ServiceError> {
        Ok(self.store_mut()?.product_add_stock(id, count)?)
    }

    pub fn product_purchase(&mut self, buyer: &str, id: ProductId) -> Result<String, ServiceError> {
        Ok(self.store_mut()?.product_purchase(buyer, id)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::failure::NeverFail;
    use crate::money::{Currency, Money};
    use crate::persist::MemoryTableStore;

    fn bread() -> Product {
        Product::new("Bread", Money::parse("JPY 1.0").unwrap())
    }

    #[test]
    fn offline_service_rejects_everything() {
        let mut service: VendorService<NeverFail, MemoryTableStore> = VendorService::offline();

        assert!(!service.is_available());
        assert_eq!(service.products().unwrap_err(), ServiceError::Offline);
        assert_eq!(service.accounting().unwrap_err(), ServiceError::Offline);
        assert_eq!(
            service.product_create(bread()).unwrap_err(),
            ServiceError::Offline
        );
        assert_eq!(
            service.product_purchase("alice", ProductId(0)).unwrap_err(),
            ServiceError::Offline
        );
        assert_eq!(
            ServiceError::Offline.to_string(),
            "Vendor database is offline."
        );
    }

    #[test]
    fn activate_and_deactivate_round_trip() {
        let backend = MemoryTableStore::new();
        let mut service = VendorService::offline();

        service.activate(VendorStore::open(backend.clone(), NeverFail, Currency::jpy()));
        assert!(service.is_available());

        let id = service.product_create(bread()).unwrap();
        assert_eq!(service.product_add_stock(id, 2).unwrap(), 2);
        service.product_purchase("alice", id).unwrap();

        service.deactivate();
        assert!(!service.is_available());
        assert_eq!(
            service.product_delete(id).unwrap_err(),
            ServiceError::Offline
        );

        service.activate(VendorStore::open(backend, NeverFail, Currency::jpy()));
        let status = service.products().unwrap().get(id).unwrap();
        assert_eq!(status.stock, 1);
        assert_eq!(status.purchases, 1);
    }

    #[test]
    fn store_errors_pass_through() {
        let store = VendorStore::open(MemoryTableStore::new(), NeverFail, Currency::jpy());
        let mut service = VendorService::with_store(store);

        let err = service.product_delete(ProductId(3)).unwrap_err();
        assert_eq!(err, ServiceError::Store(StoreError::NotFound(ProductId(3))));
        assert_eq!(err.to_string(), "No such product: 3");
    }
}
