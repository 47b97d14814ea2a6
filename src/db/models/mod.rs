//! Database models, one module per table.

pub mod asset;
pub mod asset_model;
pub mod assignment;
pub mod common;
pub mod login;
pub mod manufacturer;
pub mod supplier;
pub mod user;

pub use asset::*;
pub use asset_model::*;
pub use assignment::*;
pub use common::*;
pub use login::*;
pub use manufacturer::*;
pub use supplier::*;
pub use user::*;
