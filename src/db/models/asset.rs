//! Assets (`Ativos`).

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::AssetKind;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Asset {
    pub serial: String,
    pub asset_type: String,
    /// Manufacturer name (soft reference to `Fabricantes.nome_fabricante`)
    pub manufacturer: String,
    /// Model name (soft reference to `ModeloAtivo.nome_modelo`)
    pub model: String,
    pub property_number: Option<String>,
    pub imei: Option<String>,
}

impl Asset {
    pub fn kind(&self) -> Option<AssetKind> {
        self.asset_type.parse().ok()
    }
}

/// Registration form, also used for in-place edits
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AssetInput {
    pub serial: String,
    pub asset_type: String,
    pub manufacturer: String,
    pub model: String,
    #[serde(default)]
    pub property_number: Option<String>,
    /// Only kept for smartphones
    #[serde(default)]
    pub imei: Option<String>,
}
