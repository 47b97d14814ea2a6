//! Asset model catalog (`ModeloAtivo`).

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::AssetKind;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct AssetModel {
    pub id: i64,
    pub name: String,
    pub asset_type: String,
}

impl AssetModel {
    pub fn kind(&self) -> Option<AssetKind> {
        self.asset_type.parse().ok()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssetModelInput {
    pub name: String,
    pub asset_type: String,
}
