//! Organizational users (`Usuarios`).
//!
//! Employees are identified by registration number and vessels by IMO number.
//! Users are never deleted, only deactivated.

use tracing::{debug, info};

use crate::db::{schema, Store, User, UserInput, UserKind, UserStatus};
use crate::error::{InventoryError, Result, ValidationErrorBuilder};
use crate::validation::{parse_identifier, validate_required};

use super::references::{like_pattern, USER_SELECT};

struct ValidUser {
    kind: UserKind,
    full_name: String,
    cost_center: String,
    registration_number: Option<i64>,
    imo_number: Option<i64>,
}

#[derive(Clone)]
pub struct UserRepository {
    store: Store,
}

impl UserRepository {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    async fn ensure(&self) -> Result<()> {
        self.store.ensure(&schema::USUARIOS).await?;
        Ok(())
    }

    fn validate(input: &UserInput) -> Result<ValidUser> {
        let kind = UserKind::from_vessel_flag(input.is_vessel);

        let mut v = ValidationErrorBuilder::new();
        let full_name = v.check("full_name", validate_required(&input.full_name, "Name"));
        let cost_center = v.check(
            "cost_center",
            validate_required(&input.cost_center, "Cost center"),
        );
        let identifier = v.check("identifier", parse_identifier(&input.identifier)).flatten();
        if kind == UserKind::Vessel && input.identifier.trim().is_empty() {
            v.add("identifier", "IMO number is required for vessels");
        }
        v.finish()?;

        let (registration_number, imo_number) = match kind {
            UserKind::Employee => (identifier, None),
            UserKind::Vessel => (None, identifier),
        };

        Ok(ValidUser {
            kind,
            full_name: full_name.unwrap_or_default(),
            cost_center: cost_center.unwrap_or_default(),
            registration_number,
            imo_number,
        })
    }

    /// Register an active user
    pub async fn insert(&self, input: &UserInput) -> Result<User> {
        let user = Self::validate(input)?;
        self.ensure().await?;

        let status = UserStatus::Active;
        let result = sqlx::query(
            r#"
            INSERT INTO Usuarios (userTipo, userNome, userCC, userMatricula, userIMO, userStatus)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(user.kind.as_str())
        .bind(&user.full_name)
        .bind(&user.cost_center)
        .bind(user.registration_number)
        .bind(user.imo_number)
        .bind(status.as_str())
        .execute(self.store.pool())
        .await?;

        let id = result.last_insert_rowid();
        info!(id, kind = %user.kind, name = %user.full_name, "User registered");

        Ok(User {
            id,
            user_type: user.kind.as_str().to_string(),
            full_name: user.full_name,
            cost_center: user.cost_center,
            registration_number: user.registration_number,
            imo_number: user.imo_number,
            status: status.as_str().to_string(),
        })
    }

    /// Replace a user's details. The status is left untouched.
    pub async fn update(&self, id: i64, input: &UserInput) -> Result<User> {
        let user = Self::validate(input)?;
        self.ensure().await?;

        let result = sqlx::query(
            r#"
            UPDATE Usuarios
            SET userTipo = ?, userNome = ?, userCC = ?, userMatricula = ?, userIMO = ?
            WHERE id = ?
            "#,
        )
        .bind(user.kind.as_str())
        .bind(&user.full_name)
        .bind(&user.cost_center)
        .bind(user.registration_number)
        .bind(user.imo_number)
        .bind(id)
        .execute(self.store.pool())
        .await?;

        if result.rows_affected() == 0 {
            return Err(InventoryError::not_found("user", id));
        }

        info!(id, "User updated");

        self.find(id)
            .await?
            .ok_or_else(|| InventoryError::not_found("user", id))
    }

    pub async fn find(&self, id: i64) -> Result<Option<User>> {
        self.ensure().await?;

        let sql = format!("{} WHERE id = ?", USER_SELECT);
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(self.store.pool())
            .await?;
        Ok(user)
    }

    pub async fn list(&self) -> Result<Vec<User>> {
        self.ensure().await?;

        let sql = format!("{} ORDER BY id", USER_SELECT);
        let users = sqlx::query_as::<_, User>(&sql)
            .fetch_all(self.store.pool())
            .await?;
        Ok(users)
    }

    /// Users whose name or registration number contains `term`.
    ///
    /// Case-insensitive; a blank term matches nothing.
    pub async fn search(&self, term: &str) -> Result<Vec<User>> {
        let term = term.trim();
        if term.is_empty() {
            return Ok(Vec::new());
        }
        self.ensure().await?;

        let pattern = like_pattern(term);
        let sql = format!(
            "{} WHERE userNome LIKE ? OR userMatricula LIKE ? ORDER BY id",
            USER_SELECT
        );
        let candidates = sqlx::query_as::<_, User>(&sql)
            .bind(&pattern)
            .bind(&pattern)
            .fetch_all(self.store.pool())
            .await?;

        // LIKE treats % and _ as wildcards and folds ASCII only; confirm each hit
        let needle = term.to_lowercase();
        let users: Vec<User> = candidates
            .into_iter()
            .filter(|u| {
                u.full_name.to_lowercase().contains(&needle)
                    || u.registration_number
                        .map_or(false, |n| n.to_string().contains(&needle))
            })
            .collect();

        debug!(term = %term, count = users.len(), "User search");
        Ok(users)
    }

    /// Mark a user as deactivated. The row is kept.
    pub async fn deactivate(&self, id: i64) -> Result<()> {
        self.ensure().await?;

        let result = sqlx::query("UPDATE Usuarios SET userStatus = ? WHERE id = ?")
            .bind(UserStatus::Inactive.as_str())
            .bind(id)
            .execute(self.store.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(InventoryError::not_found("user", id));
        }

        info!(id, "User deactivated");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_err, assert_ok};

    async fn repo() -> UserRepository {
        UserRepository::new(Store::in_memory().await.unwrap())
    }

    fn employee(name: &str, registration: &str) -> UserInput {
        UserInput {
            is_vessel: false,
            full_name: name.to_string(),
            cost_center: "CC1".to_string(),
            identifier: registration.to_string(),
        }
    }

    fn vessel(name: &str, imo: &str) -> UserInput {
        UserInput {
            is_vessel: true,
            full_name: name.to_string(),
            cost_center: "CC2".to_string(),
            identifier: imo.to_string(),
        }
    }

    #[tokio::test]
    async fn test_insert_vessel() {
        let repo = repo().await;
        let user = assert_ok!(repo.insert(&vessel("Ship A", "12345")).await);
        assert_eq!(user.user_type, "embarcacao");
        assert_eq!(user.imo_number, Some(12345));
        assert_eq!(user.registration_number, None);
        assert_eq!(user.status, "ativo");

        let found = repo.find(user.id).await.unwrap().unwrap();
        assert_eq!(found, user);
        assert_eq!(found.identifier(), Some(12345));
    }

    #[tokio::test]
    async fn test_insert_employee() {
        let repo = repo().await;
        let user = repo.insert(&employee("Ana Souza", " 42 ")).await.unwrap();
        assert_eq!(user.user_type, "funcionario");
        assert_eq!(user.registration_number, Some(42));
        assert_eq!(user.imo_number, None);
        assert!(user.is_active());
    }

    #[tokio::test]
    async fn test_employee_without_registration() {
        let repo = repo().await;
        let user = repo.insert(&employee("Ana", "")).await.unwrap();
        assert_eq!(user.registration_number, None);
        assert_eq!(user.identifier(), None);
    }

    #[tokio::test]
    async fn test_vessel_requires_imo() {
        let repo = repo().await;
        match assert_err!(repo.insert(&vessel("Ship A", " ")).await) {
            InventoryError::Validation(errors) => assert!(errors.has_field("identifier")),
            other => panic!("Expected validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_identifier_must_be_numeric() {
        let repo = repo().await;
        match assert_err!(repo.insert(&employee("Ana", "12a")).await) {
            InventoryError::Validation(errors) => assert!(errors.has_field("identifier")),
            other => panic!("Expected validation error, got {:?}", other),
        }
        assert!(repo.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_keeps_status() {
        let repo = repo().await;
        let user = repo.insert(&employee("Ana", "42")).await.unwrap();
        repo.deactivate(user.id).await.unwrap();

        let updated = repo
            .update(user.id, &employee("Ana Souza", "43"))
            .await
            .unwrap();
        assert_eq!(updated.full_name, "Ana Souza");
        assert_eq!(updated.registration_number, Some(43));
        assert_eq!(updated.status, "desativado");
    }

    #[tokio::test]
    async fn test_update_missing_user() {
        let repo = repo().await;
        let err = assert_err!(repo.update(9, &employee("Ana", "42")).await);
        assert!(err.is_not_found("user"));
    }

    #[tokio::test]
    async fn test_deactivate() {
        let repo = repo().await;
        let user = repo.insert(&employee("Ana", "42")).await.unwrap();

        repo.deactivate(user.id).await.unwrap();
        let found = repo.find(user.id).await.unwrap().unwrap();
        assert_eq!(found.status, "desativado");
        assert!(!found.is_active());

        // Deactivating twice is harmless
        assert_ok!(repo.deactivate(user.id).await);
        assert!(assert_err!(repo.deactivate(999).await).is_not_found("user"));
    }

    #[tokio::test]
    async fn test_search_by_name_or_registration() {
        let repo = repo().await;
        repo.insert(&employee("Ana Souza", "4201")).await.unwrap();
        repo.insert(&employee("Bruno Lima", "5300")).await.unwrap();
        repo.insert(&vessel("Ship A", "12345")).await.unwrap();

        let by_name = repo.search("souza").await.unwrap();
        assert_eq!(by_name.len(), 1);
        assert_eq!(by_name[0].full_name, "Ana Souza");

        let by_number = repo.search("530").await.unwrap();
        assert_eq!(by_number.len(), 1);
        assert_eq!(by_number[0].full_name, "Bruno Lima");

        // IMO numbers are not searched
        assert!(repo.search("12345").await.unwrap().is_empty());
        assert!(repo.search("").await.unwrap().is_empty());
        assert!(repo.search("%").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_search_folds_accented_letters() {
        let repo = repo().await;
        repo.insert(&employee("JOÃO Silva", "4201")).await.unwrap();
        repo.insert(&employee("Joana Lima", "5300")).await.unwrap();

        let found = repo.search("joão").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].full_name, "JOÃO Silva");

        assert_eq!(repo.search("SILVA").await.unwrap().len(), 1);
        assert!(repo.search("joãa").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_vessel_fits_users_table_from_lookup_screen() {
        let store = Store::in_memory().await.unwrap();
        sqlx::query(
            "CREATE TABLE Usuarios (id INTEGER PRIMARY KEY AUTOINCREMENT, userNome TEXT NOT NULL, userMatricula TEXT NOT NULL, userStatus TEXT DEFAULT 'ativo')",
        )
        .execute(store.pool())
        .await
        .unwrap();
        sqlx::query("INSERT INTO Usuarios (userNome, userMatricula) VALUES ('Ana Souza', '4201')")
            .execute(store.pool())
            .await
            .unwrap();

        let repo = UserRepository::new(store);
        let ship = assert_ok!(repo.insert(&vessel("Ship A", "12345")).await);
        assert_eq!(ship.imo_number, Some(12345));
        assert_eq!(ship.registration_number, None);

        let found = repo.search("Ship").await.unwrap();
        assert_eq!(found, vec![ship]);

        let kept = repo.search("4201").await.unwrap();
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].full_name, "Ana Souza");
        assert_eq!(kept[0].registration_number, Some(4201));
        assert_eq!(kept[0].user_type, "funcionario");
    }
}
