use tracing::info;

use crate::db::{schema, Manufacturer, ManufacturerInput, Store};
use crate::error::{InventoryError, Result, ValidationErrorBuilder};
use crate::validation::{normalize_tax_id, validate_required};

#[derive(Clone)]
pub struct ManufacturerRepository {
    store: Store,
}

impl ManufacturerRepository {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    async fn ensure(&self) -> Result<()> {
        self.store.ensure(&schema::FABRICANTES).await?;
        Ok(())
    }

    fn validate(input: &ManufacturerInput) -> Result<(String, String)> {
        let mut v = ValidationErrorBuilder::new();
        let name = v.check("name", validate_required(&input.name, "Manufacturer name"));
        let tax_id = v.check("tax_id", normalize_tax_id(&input.tax_id));
        v.finish()?;
        Ok((name.unwrap_or_default(), tax_id.unwrap_or_default()))
    }

    pub async fn list(&self) -> Result<Vec<Manufacturer>> {
        self.ensure().await?;

        let manufacturers = sqlx::query_as::<_, Manufacturer>(
            "SELECT id, nome_fabricante AS name, cnpj AS tax_id FROM Fabricantes ORDER BY id",
        )
        .fetch_all(self.store.pool())
        .await?;
        Ok(manufacturers)
    }

    /// Manufacturer names, for populating pickers
    pub async fn names(&self) -> Result<Vec<String>> {
        self.ensure().await?;

        let rows: Vec<(String,)> =
            sqlx::query_as("SELECT nome_fabricante FROM Fabricantes ORDER BY id")
                .fetch_all(self.store.pool())
                .await?;
        Ok(rows.into_iter().map(|(name,)| name).collect())
    }

    pub async fn find(&self, id: i64) -> Result<Option<Manufacturer>> {
        self.ensure().await?;

        let manufacturer = sqlx::query_as::<_, Manufacturer>(
            "SELECT id, nome_fabricante AS name, cnpj AS tax_id FROM Fabricantes WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(self.store.pool())
        .await?;
        Ok(manufacturer)
    }

    /// Insert a manufacturer. The tax ID is stored as bare digits.
    pub async fn insert(&self, input: &ManufacturerInput) -> Result<Manufacturer> {
        let (name, tax_id) = Self::validate(input)?;
        self.ensure().await?;

        let result = sqlx::query("INSERT INTO Fabricantes (nome_fabricante, cnpj) VALUES (?, ?)")
            .bind(&name)
            .bind(&tax_id)
            .execute(self.store.pool())
            .await?;

        info!(name = %name, "Manufacturer registered");

        Ok(Manufacturer {
            id: result.last_insert_rowid(),
            name,
            tax_id,
        })
    }

    pub async fn update(&self, id: i64, input: &ManufacturerInput) -> Result<Manufacturer> {
        let (name, tax_id) = Self::validate(input)?;
        self.ensure().await?;

        let result =
            sqlx::query("UPDATE Fabricantes SET nome_fabricante = ?, cnpj = ? WHERE id = ?")
                .bind(&name)
                .bind(&tax_id)
                .bind(id)
                .execute(self.store.pool())
                .await?;

        if result.rows_affected() == 0 {
            return Err(InventoryError::not_found("manufacturer", id));
        }

        info!(id, name = %name, "Manufacturer updated");
        Ok(Manufacturer { id, name, tax_id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    async fn repo() -> ManufacturerRepository {
        ManufacturerRepository::new(Store::in_memory().await.unwrap())
    }

    fn input(name: &str, tax_id: &str) -> ManufacturerInput {
        ManufacturerInput {
            name: name.to_string(),
            tax_id: tax_id.to_string(),
        }
    }

    #[tokio::test]
    async fn test_insert_stores_bare_digits() {
        let repo = repo().await;
        let created = repo
            .insert(&input("Dell", "12.345.678/9012-34"))
            .await
            .unwrap();
        assert_eq!(created.tax_id, "12345678901234");

        let listed = repo.list().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].name, "Dell");
        assert_eq!(listed[0].tax_id, "12345678901234");
        assert_eq!(listed[0].formatted_tax_id(), "12.345.678/9012-34");
    }

    #[tokio::test]
    async fn test_insert_rejects_short_tax_id() {
        let repo = repo().await;
        let err = repo.insert(&input("Dell", "123")).await.unwrap_err();
        match err {
            InventoryError::Validation(errors) => assert!(errors.has_field("tax_id")),
            other => panic!("Expected validation error, got {:?}", other),
        }
        assert!(repo.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_insert_rejects_blank_name() {
        let repo = repo().await;
        let err = repo.insert(&input("  ", "12345678901234")).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::ValidationError);
    }

    #[tokio::test]
    async fn test_update_and_names() {
        let repo = repo().await;
        let dell = repo.insert(&input("Dell", "12345678901234")).await.unwrap();
        repo.insert(&input("Apple", "98765432109876")).await.unwrap();

        let updated = repo
            .update(dell.id, &input("Dell Inc", "11.111.111/1111-11"))
            .await
            .unwrap();
        assert_eq!(updated.tax_id, "11111111111111");

        let found = repo.find(dell.id).await.unwrap().unwrap();
        assert_eq!(found.name, "Dell Inc");
        assert_eq!(repo.names().await.unwrap(), vec!["Dell Inc", "Apple"]);
    }

    #[tokio::test]
    async fn test_update_missing_row() {
        let repo = repo().await;
        let err = repo
            .update(99, &input("Dell", "12345678901234"))
            .await
            .unwrap_err();
        assert!(err.is_not_found("manufacturer"));
    }
}
