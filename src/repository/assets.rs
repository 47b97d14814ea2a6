//! Asset registry (`Ativos`).
//!
//! The table has no surrogate key; rows are addressed by serial and listed in
//! insertion order. Serial uniqueness and catalog membership of the
//! manufacturer and model names are optional rules, off by default.

use tracing::{debug, info};

use crate::config::IntegrityRules;
use crate::db::{schema, Asset, AssetInput, AssetKind, Store};
use crate::error::{InventoryError, Result, ValidationErrorBuilder};
use crate::validation::{optional_text, validate_required};

use super::references;

const ASSET_SELECT: &str = r#"
    SELECT serial, tipoAtivo AS asset_type, fabricante AS manufacturer, modelo AS model,
           numPatrimonio AS property_number, imei
    FROM Ativos
"#;

#[derive(Clone)]
pub struct AssetRepository {
    store: Store,
    rules: IntegrityRules,
}

impl AssetRepository {
    pub fn new(store: Store, rules: IntegrityRules) -> Self {
        Self { store, rules }
    }

    async fn ensure(&self) -> Result<()> {
        self.store.ensure(&schema::ATIVOS).await?;
        Ok(())
    }

    /// Validate and normalize an asset. The IMEI is kept only for smartphones.
    fn validate(input: &AssetInput) -> Result<Asset> {
        let mut v = ValidationErrorBuilder::new();
        let serial = v.check("serial", validate_required(&input.serial, "Serial"));
        let kind = v.check(
            "asset_type",
            validate_required(&input.asset_type, "Asset type").and_then(|t| t.parse::<AssetKind>()),
        );
        let manufacturer = v.check(
            "manufacturer",
            validate_required(&input.manufacturer, "Manufacturer"),
        );
        let model = v.check("model", validate_required(&input.model, "Model"));

        let imei = match kind {
            Some(kind) if kind.requires_imei() => v.check(
                "imei",
                validate_required(input.imei.as_deref().unwrap_or_default(), "IMEI"),
            ),
            _ => None,
        };
        v.finish()?;

        match (serial, kind, manufacturer, model) {
            (Some(serial), Some(kind), Some(manufacturer), Some(model)) => Ok(Asset {
                serial,
                asset_type: kind.as_str().to_string(),
                manufacturer,
                model,
                property_number: optional_text(input.property_number.as_deref()),
                imei,
            }),
            _ => Err(InventoryError::validation_field("serial", "Invalid asset")),
        }
    }

    async fn check_catalog(&self, asset: &Asset) -> Result<()> {
        if !self.rules.require_catalog_references {
            return Ok(());
        }
        if !references::manufacturer_exists(&self.store, &asset.manufacturer).await? {
            return Err(InventoryError::not_found("manufacturer", &asset.manufacturer));
        }
        if !references::model_exists(&self.store, &asset.model).await? {
            return Err(InventoryError::not_found("asset model", &asset.model));
        }
        Ok(())
    }

    async fn check_serial_free(&self, serial: &str) -> Result<()> {
        if self.rules.unique_asset_serial && references::asset_exists(&self.store, serial).await? {
            return Err(InventoryError::validation_field(
                "serial",
                format!("Serial {} is already registered", serial),
            ));
        }
        Ok(())
    }

    pub async fn insert(&self, input: &AssetInput) -> Result<Asset> {
        let asset = Self::validate(input)?;
        self.ensure().await?;
        self.check_catalog(&asset).await?;
        self.check_serial_free(&asset.serial).await?;

        sqlx::query(
            r#"
            INSERT INTO Ativos (serial, tipoAtivo, fabricante, modelo, numPatrimonio, imei)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&asset.serial)
        .bind(&asset.asset_type)
        .bind(&asset.manufacturer)
        .bind(&asset.model)
        .bind(&asset.property_number)
        .bind(&asset.imei)
        .execute(self.store.pool())
        .await?;

        info!(serial = %asset.serial, kind = %asset.asset_type, "Asset registered");
        Ok(asset)
    }

    /// Rewrite every row registered under `serial`.
    pub async fn update(&self, serial: &str, input: &AssetInput) -> Result<Asset> {
        let asset = Self::validate(input)?;
        let serial = serial.trim();
        self.ensure().await?;
        self.check_catalog(&asset).await?;
        if asset.serial != serial {
            self.check_serial_free(&asset.serial).await?;
        }

        let result = sqlx::query(
            r#"
            UPDATE Ativos
            SET serial = ?, tipoAtivo = ?, fabricante = ?, modelo = ?, numPatrimonio = ?, imei = ?
            WHERE serial = ?
            "#,
        )
        .bind(&asset.serial)
        .bind(&asset.asset_type)
        .bind(&asset.manufacturer)
        .bind(&asset.model)
        .bind(&asset.property_number)
        .bind(&asset.imei)
        .bind(serial)
        .execute(self.store.pool())
        .await?;

        if result.rows_affected() == 0 {
            return Err(InventoryError::not_found("asset", serial));
        }

        info!(
            serial = %serial,
            rows = result.rows_affected(),
            "Asset updated"
        );
        Ok(asset)
    }

    pub async fn list(&self) -> Result<Vec<Asset>> {
        self.ensure().await?;

        let sql = format!("{} ORDER BY rowid", ASSET_SELECT);
        let assets = sqlx::query_as::<_, Asset>(&sql)
            .fetch_all(self.store.pool())
            .await?;
        Ok(assets)
    }

    /// First asset registered under `serial`
    pub async fn find_by_serial(&self, serial: &str) -> Result<Option<Asset>> {
        self.ensure().await?;

        let sql = format!("{} WHERE serial = ? ORDER BY rowid LIMIT 1", ASSET_SELECT);
        let asset = sqlx::query_as::<_, Asset>(&sql)
            .bind(serial.trim())
            .fetch_optional(self.store.pool())
            .await?;
        Ok(asset)
    }

    /// Every asset whose serial equals `serial` exactly. Blank input matches nothing.
    pub async fn search_by_serial(&self, serial: &str) -> Result<Vec<Asset>> {
        let serial = serial.trim();
        if serial.is_empty() {
            return Ok(Vec::new());
        }
        self.ensure().await?;

        let sql = format!("{} WHERE serial = ? ORDER BY rowid", ASSET_SELECT);
        let assets = sqlx::query_as::<_, Asset>(&sql)
            .bind(serial)
            .fetch_all(self.store.pool())
            .await?;

        debug!(serial = %serial, count = assets.len(), "Asset search");
        Ok(assets)
    }
}
