//! Asset-to-user assignments (`Associacao`).
//!
//! `userID` holds the user's registration or IMO number rather than the row
//! id. Assignments are append-only; there is no unassign operation.

use tracing::info;

use crate::config::IntegrityRules;
use crate::db::{schema, Assignment, NewAssignment, Store};
use crate::error::{InventoryError, Result, ValidationErrorBuilder};
use crate::validation::{optional_text, parse_identifier, validate_received_date, validate_required};

use super::references;

const ASSIGNMENT_SELECT: &str = r#"
    SELECT id, serial, userID AS user_identifier, data_recebimento AS received_date,
           documento AS document_reference
    FROM Associacao
"#;

#[derive(Clone)]
pub struct AssignmentRepository {
    store: Store,
    rules: IntegrityRules,
}

impl AssignmentRepository {
    pub fn new(store: Store, rules: IntegrityRules) -> Self {
        Self { store, rules }
    }

    async fn ensure(&self) -> Result<()> {
        self.store.ensure(&schema::ASSOCIACAO).await?;
        Ok(())
    }

    /// Record that the asset `serial` was handed to the user identified by
    /// registration or IMO number.
    ///
    /// Fails with a validation error on malformed input and with `NotFound`
    /// when no user carries the identifier. The serial is only checked when
    /// `require_existing_asset` is on.
    pub async fn create(&self, request: &NewAssignment) -> Result<Assignment> {
        let received_date = request.received_date.trim();

        let mut v = ValidationErrorBuilder::new();
        v.check("received_date", validate_received_date(received_date));
        let serial = v.check("serial", validate_required(&request.serial, "Serial"));
        let raw_identifier = v.check(
            "identifier",
            validate_required(&request.identifier, "Registration or IMO number"),
        );
        v.finish()?;
        let serial = serial.unwrap_or_default();
        let raw_identifier = raw_identifier.unwrap_or_default();

        // A non-numeric identifier cannot belong to any user
        let identifier = match parse_identifier(&raw_identifier) {
            Ok(Some(identifier)) => identifier,
            _ => return Err(InventoryError::not_found("user", raw_identifier)),
        };

        let user = references::resolve_user(&self.store, identifier)
            .await?
            .ok_or_else(|| InventoryError::not_found("user", identifier))?;

        if self.rules.require_existing_asset
            && !references::asset_exists(&self.store, &serial).await?
        {
            return Err(InventoryError::not_found("asset", serial));
        }

        self.ensure().await?;

        let user_identifier = user.identifier().unwrap_or(identifier);
        let document_reference = optional_text(request.document_reference.as_deref());

        let result = sqlx::query(
            r#"
            INSERT INTO Associacao (serial, userID, data_recebimento, documento)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(&serial)
        .bind(user_identifier)
        .bind(received_date)
        .bind(&document_reference)
        .execute(self.store.pool())
        .await?;

        info!(
            serial = %serial,
            user_id = user.id,
            user_identifier,
            "Asset assigned"
        );

        Ok(Assignment {
            id: result.last_insert_rowid(),
            serial,
            user_identifier,
            received_date: received_date.to_string(),
            document_reference,
        })
    }

    pub async fn find(&self, id: i64) -> Result<Option<Assignment>> {
        self.ensure().await?;

        let sql = format!("{} WHERE id = ?", ASSIGNMENT_SELECT);
        let assignment = sqlx::query_as::<_, Assignment>(&sql)
            .bind(id)
            .fetch_optional(self.store.pool())
            .await?;
        Ok(assignment)
    }

    /// Assignment history of one serial, oldest first
    pub async fn list_by_serial(&self, serial: &str) -> Result<Vec<Assignment>> {
        self.ensure().await?;

        let sql = format!("{} WHERE serial = ? ORDER BY id", ASSIGNMENT_SELECT);
        let assignments = sqlx::query_as::<_, Assignment>(&sql)
            .bind(serial.trim())
            .fetch_all(self.store.pool())
            .await?;
        Ok(assignments)
    }
}
