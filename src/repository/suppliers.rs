use tracing::info;

use crate::db::{schema, ContractStatus, Store, Supplier, SupplierInput};
use crate::error::{InventoryError, Result, ValidationErrorBuilder};
use crate::validation::{normalize_tax_id, validate_required};

const SUPPLIER_SELECT: &str = r#"
    SELECT id, nome_fornecedora AS name, cnpj AS tax_id, contrato_ativo AS active_contract
    FROM Fornecedor
"#;

struct ValidSupplier {
    name: String,
    tax_id: String,
    contract: ContractStatus,
}

#[derive(Clone)]
pub struct SupplierRepository {
    store: Store,
}

impl SupplierRepository {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    async fn ensure(&self) -> Result<()> {
        self.store.ensure(&schema::FORNECEDOR).await?;
        Ok(())
    }

    fn validate(input: &SupplierInput) -> Result<ValidSupplier> {
        let mut v = ValidationErrorBuilder::new();
        let name = v.check("name", validate_required(&input.name, "Supplier name"));
        let tax_id = v.check("tax_id", normalize_tax_id(&input.tax_id));
        let contract = v.check(
            "active_contract",
            validate_required(&input.active_contract, "Contract status")
                .and_then(|c| c.parse::<ContractStatus>()),
        );
        v.finish()?;

        match (name, tax_id, contract) {
            (Some(name), Some(tax_id), Some(contract)) => Ok(ValidSupplier {
                name,
                tax_id,
                contract,
            }),
            _ => Err(InventoryError::validation_field("name", "Invalid supplier")),
        }
    }

    pub async fn list(&self) -> Result<Vec<Supplier>> {
        self.ensure().await?;

        let sql = format!("{} ORDER BY id", SUPPLIER_SELECT);
        let suppliers = sqlx::query_as::<_, Supplier>(&sql)
            .fetch_all(self.store.pool())
            .await?;
        Ok(suppliers)
    }

    pub async fn find(&self, id: i64) -> Result<Option<Supplier>> {
        self.ensure().await?;

        let sql = format!("{} WHERE id = ?", SUPPLIER_SELECT);
        let supplier = sqlx::query_as::<_, Supplier>(&sql)
            .bind(id)
            .fetch_optional(self.store.pool())
            .await?;
        Ok(supplier)
    }

    pub async fn insert(&self, input: &SupplierInput) -> Result<Supplier> {
        let valid = Self::validate(input)?;
        self.ensure().await?;

        let result = sqlx::query(
            "INSERT INTO Fornecedor (nome_fornecedora, cnpj, contrato_ativo) VALUES (?, ?, ?)",
        )
        .bind(&valid.name)
        .bind(&valid.tax_id)
        .bind(valid.contract.as_str())
        .execute(self.store.pool())
        .await?;

        info!(name = %valid.name, contract = %valid.contract, "Supplier registered");

        Ok(Supplier {
            id: result.last_insert_rowid(),
            name: valid.name,
            tax_id: valid.tax_id,
            active_contract: valid.contract.as_str().to_string(),
        })
    }

    pub async fn update(&self, id: i64, input: &SupplierInput) -> Result<Supplier> {
        let valid = Self::validate(input)?;
        self.ensure().await?;

        let result = sqlx::query(
            "UPDATE Fornecedor SET nome_fornecedora = ?, cnpj = ?, contrato_ativo = ? WHERE id = ?",
        )
        .bind(&valid.name)
        .bind(&valid.tax_id)
        .bind(valid.contract.as_str())
        .bind(id)
        .execute(self.store.pool())
        .await?;

        if result.rows_affected() == 0 {
            return Err(InventoryError::not_found("supplier", id));
        }

        info!(id, name = %valid.name, "Supplier updated");

        Ok(Supplier {
            id,
            name: valid.name,
            tax_id: valid.tax_id,
            active_contract: valid.contract.as_str().to_string(),
        })
    }
}
