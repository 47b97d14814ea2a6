//! Asset model catalog (`ModeloAtivo`).

use tracing::info;

use crate::db::{schema, AssetKind, AssetModel, AssetModelInput, Store};
use crate::error::{InventoryError, Result, ValidationErrorBuilder};
use crate::validation::validate_required;

#[derive(Clone)]
pub struct AssetModelRepository {
    store: Store,
}

impl AssetModelRepository {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    async fn ensure(&self) -> Result<()> {
        self.store.ensure(&schema::MODELO_ATIVO).await?;
        Ok(())
    }

    fn validate(input: &AssetModelInput) -> Result<(String, AssetKind)> {
        let mut v = ValidationErrorBuilder::new();
        let name = v.check("name", validate_required(&input.name, "Model name"));
        let kind = v.check(
            "asset_type",
            validate_required(&input.asset_type, "Asset type").and_then(|t| t.parse::<AssetKind>()),
        );
        v.finish()?;

        match (name, kind) {
            (Some(name), Some(kind)) => Ok((name, kind)),
            _ => Err(InventoryError::validation_field("name", "Invalid asset model")),
        }
    }

    pub async fn list(&self) -> Result<Vec<AssetModel>> {
        self.ensure().await?;

        let models = sqlx::query_as::<_, AssetModel>(
            "SELECT id, nome_modelo AS name, Tipo AS asset_type FROM ModeloAtivo ORDER BY id",
        )
        .fetch_all(self.store.pool())
        .await?;
        Ok(models)
    }

    pub async fn names(&self) -> Result<Vec<String>> {
        self.ensure().await?;

        let rows: Vec<(String,)> = sqlx::query_as("SELECT nome_modelo FROM ModeloAtivo ORDER BY id")
            .fetch_all(self.store.pool())
            .await?;
        Ok(rows.into_iter().map(|(name,)| name).collect())
    }

    pub async fn find(&self, id: i64) -> Result<Option<AssetModel>> {
        self.ensure().await?;

        let model = sqlx::query_as::<_, AssetModel>(
            "SELECT id, nome_modelo AS name, Tipo AS asset_type FROM ModeloAtivo WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(self.store.pool())
        .await?;
        Ok(model)
    }

    pub async fn insert(&self, input: &AssetModelInput) -> Result<AssetModel> {
        let (name, kind) = Self::validate(input)?;
        self.ensure().await?;

        let result = sqlx::query("INSERT INTO ModeloAtivo (nome_modelo, Tipo) VALUES (?, ?)")
            .bind(&name)
            .bind(kind.as_str())
            .execute(self.store.pool())
            .await?;

        info!(name = %name, kind = %kind, "Asset model registered");

        Ok(AssetModel {
            id: result.last_insert_rowid(),
            name,
            asset_type: kind.as_str().to_string(),
        })
    }

    pub async fn update(&self, id: i64, input: &AssetModelInput) -> Result<AssetModel> {
        let (name, kind) = Self::validate(input)?;
        self.ensure().await?;

        let result = sqlx::query("UPDATE ModeloAtivo SET nome_modelo = ?, Tipo = ? WHERE id = ?")
            .bind(&name)
            .bind(kind.as_str())
            .bind(id)
            .execute(self.store.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(InventoryError::not_found("asset model", id));
        }

        info!(id, name = %name, "Asset model updated");

        Ok(AssetModel {
            id,
            name,
            asset_type: kind.as_str().to_string(),
        })
    }
}
