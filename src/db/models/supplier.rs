//! Supplier catalog (`Fornecedor`).

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::ContractStatus;
use crate::validation::format_tax_id;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Supplier {
    pub id: i64,
    pub name: String,
    pub tax_id: String,
    /// Stored as 'Sim' or 'Não'
    pub active_contract: String,
}

impl Supplier {
    pub fn contract(&self) -> Option<ContractStatus> {
        self.active_contract.parse().ok()
    }

    pub fn has_active_contract(&self) -> bool {
        self.contract() == Some(ContractStatus::Yes)
    }

    pub fn formatted_tax_id(&self) -> String {
        format_tax_id(&self.tax_id)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SupplierInput {
    pub name: String,
    pub tax_id: String,
    /// yes/no (also accepts Sim/Não)
    pub active_contract: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contract_accessors() {
        let supplier = Supplier {
            id: 1,
            name: "Acme".to_string(),
            tax_id: "12345678901234".to_string(),
            active_contract: "Não".to_string(),
        };
        assert_eq!(supplier.contract(), Some(ContractStatus::No));
        assert!(!supplier.has_active_contract());
        assert_eq!(supplier.formatted_tax_id(), "12.345.678/9012-34");
    }
}
