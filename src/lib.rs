pub mod cli;
pub mod config;
pub mod crypto;
pub mod db;
pub mod error;
pub mod repository;
pub mod validation;

pub use config::{Config, IntegrityRules};
pub use db::{DbPool, Store};
pub use error::{ErrorCode, InventoryError, Result};

use repository::{
    AssetModelRepository, AssetRepository, AssignmentRepository, CredentialStore,
    ManufacturerRepository, SearchService, SupplierRepository, UserRepository,
};

/// Every repository wired to one store.
///
/// Build it once after opening the store and hand out clones; all of them
/// share the same connection pool.
#[derive(Clone)]
pub struct Inventory {
    pub store: Store,
    pub rules: IntegrityRules,
    pub credentials: CredentialStore,
    pub manufacturers: ManufacturerRepository,
    pub suppliers: SupplierRepository,
    pub models: AssetModelRepository,
    pub assets: AssetRepository,
    pub users: UserRepository,
    pub assignments: AssignmentRepository,
    pub search: SearchService,
}

impl Inventory {
    pub fn new(store: Store, rules: IntegrityRules) -> Self {
        let assets = AssetRepository::new(store.clone(), rules);
        let users = UserRepository::new(store.clone());
        Self {
            credentials: CredentialStore::new(store.clone(), rules),
            manufacturers: ManufacturerRepository::new(store.clone()),
            suppliers: SupplierRepository::new(store.clone()),
            models: AssetModelRepository::new(store.clone()),
            assignments: AssignmentRepository::new(store.clone(), rules),
            search: SearchService::new(store.clone(), assets.clone(), users.clone()),
            assets,
            users,
            store,
            rules,
        }
    }

    /// Ensure every table, returning the names of those that failed
    pub async fn ensure_schema(&self) -> Vec<&'static str> {
        db::ensure_all(&self.store).await
    }
}
