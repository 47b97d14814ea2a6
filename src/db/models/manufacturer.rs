//! Manufacturer catalog (`Fabricantes`).

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::validation::format_tax_id;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Manufacturer {
    pub id: i64,
    pub name: String,
    /// 14 bare digits
    pub tax_id: String,
}

impl Manufacturer {
    /// Tax ID with the `NN.NNN.NNN/NNNN-NN` display mask
    pub fn formatted_tax_id(&self) -> String {
        format_tax_id(&self.tax_id)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ManufacturerInput {
    pub name: String,
    /// Accepts punctuated or bare digits
    pub tax_id: String,
}
