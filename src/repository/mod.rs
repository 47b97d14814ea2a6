//! Repositories over the inventory tables.
//!
//! Each repository holds a clone of the [`Store`](crate::db::Store), ensures
//! the tables it touches on first use, and validates input before any
//! statement runs.

mod assets;
mod assignments;
mod credentials;
mod manufacturers;
mod models;
pub mod references;
mod search;
mod suppliers;
mod users;

pub use assets::AssetRepository;
pub use assignments::AssignmentRepository;
pub use credentials::CredentialStore;
pub use manufacturers::ManufacturerRepository;
pub use models::AssetModelRepository;
pub use search::SearchService;
pub use suppliers::SupplierRepository;
pub use users::UserRepository;
