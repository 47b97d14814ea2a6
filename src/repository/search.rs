//! Read-only lookups across assets, users and assignments.

use tracing::debug;

use crate::db::{schema, Asset, AssignmentRecord, Store, User};
use crate::error::{InventoryError, Result};

use super::references::like_pattern;
use super::{AssetRepository, UserRepository};

#[derive(Clone)]
pub struct SearchService {
    store: Store,
    assets: AssetRepository,
    users: UserRepository,
}

impl SearchService {
    pub fn new(store: Store, assets: AssetRepository, users: UserRepository) -> Self {
        Self {
            store,
            assets,
            users,
        }
    }

    /// Assignments whose user's registration number, user's IMO number or
    /// serial contains `term`, joined with the user, in assignment order.
    ///
    /// A blank term is rejected.
    pub async fn search_assignments(&self, term: &str) -> Result<Vec<AssignmentRecord>> {
        let term = term.trim();
        if term.is_empty() {
            return Err(InventoryError::validation_field(
                "term",
                "Search term is required",
            ));
        }

        self.store
            .ensure_many(&[&schema::USUARIOS, &schema::ASSOCIACAO])
            .await?;

        let pattern = like_pattern(term);
        let candidates = sqlx::query_as::<_, AssignmentRecord>(
            r#"
            SELECT a.id, a.serial, a.userID AS user_identifier,
                   a.data_recebimento AS received_date, a.documento AS document_reference,
                   u.id AS user_id, u.userNome AS user_name,
                   u.userMatricula AS registration_number, u.userIMO AS imo_number
            FROM Associacao a
            JOIN Usuarios u ON (u.userMatricula = a.userID OR u.userIMO = a.userID)
            WHERE u.userMatricula LIKE ? OR u.userIMO LIKE ? OR a.serial LIKE ?
            ORDER BY a.id, u.id
            "#,
        )
        .bind(&pattern)
        .bind(&pattern)
        .bind(&pattern)
        .fetch_all(self.store.pool())
        .await?;

        let records: Vec<AssignmentRecord> =
            candidates.into_iter().filter(|r| r.matches(term)).collect();

        debug!(term = %term, count = records.len(), "Assignment search");
        Ok(records)
    }

    /// Assets whose serial equals `serial` exactly
    pub async fn search_assets(&self, serial: &str) -> Result<Vec<Asset>> {
        self.assets.search_by_serial(serial).await
    }

    /// Users whose name or registration number contains `term`
    pub async fn search_users(&self, term: &str) -> Result<Vec<User>> {
        self.users.search(term).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::IntegrityRules;
    use crate::db::{AssetInput, NewAssignment, UserInput};
    use crate::repository::AssignmentRepository;

    struct Fixture {
        search: SearchService,
        users: UserRepository,
        assets: AssetRepository,
        assignments: AssignmentRepository,
    }

    async fn fixture() -> Fixture {
        let store = Store::in_memory().await.unwrap();
        let rules = IntegrityRules::default();
        let assets = AssetRepository::new(store.clone(), rules);
        let users = UserRepository::new(store.clone());
        Fixture {
            search: SearchService::new(store.clone(), assets.clone(), users.clone()),
            assignments: AssignmentRepository::new(store, rules),
            users,
            assets,
        }
    }

    async fn add_user(f: &Fixture, is_vessel: bool, name: &str, identifier: &str) {
        f.users
            .insert(&UserInput {
                is_vessel,
                full_name: name.to_string(),
                cost_center: "CC1".to_string(),
                identifier: identifier.to_string(),
            })
            .await
            .unwrap();
    }

    async fn assign(f: &Fixture, serial: &str, identifier: &str) {
        f.assignments
            .create(&NewAssignment {
                serial: serial.to_string(),
                identifier: identifier.to_string(),
                received_date: "01-01-2024".to_string(),
                document_reference: None,
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_search_assignments_by_imo() {
        let f = fixture().await;
        add_user(&f, true, "Ship A", "12345").await;
        assign(&f, "SN1", "12345").await;

        let records = f.search.search_assignments("12345").await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].serial, "SN1");
        assert_eq!(records[0].user_name, "Ship A");
        assert_eq!(records[0].imo_number, Some(12345));
    }

    #[tokio::test]
    async fn test_search_assignments_by_partial_serial_and_registration() {
        let f = fixture().await;
        add_user(&f, false, "Ana", "4201").await;
        add_user(&f, true, "Ship A", "12345").await;
        assign(&f, "NB-777", "4201").await;
        assign(&f, "PH-100", "12345").await;
        assign(&f, "NB-778", "12345").await;

        let by_serial = f.search.search_assignments("nb-77").await.unwrap();
        let serials: Vec<&str> = by_serial.iter().map(|r| r.serial.as_str()).collect();
        assert_eq!(serials, vec!["NB-777", "NB-778"]);

        let by_registration = f.search.search_assignments("420").await.unwrap();
        assert_eq!(by_registration.len(), 1);
        assert_eq!(by_registration[0].user_name, "Ana");
    }

    #[tokio::test]
    async fn test_search_assignments_rejects_blank_term() {
        let f = fixture().await;
        let err = f.search.search_assignments("  ").await.unwrap_err();
        match err {
            InventoryError::Validation(errors) => assert!(errors.has_field("term")),
            other => panic!("Expected validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_search_assignments_wildcards_are_literal() {
        let f = fixture().await;
        add_user(&f, true, "Ship A", "12345").await;
        assign(&f, "SN1", "12345").await;

        assert!(f.search.search_assignments("%").await.unwrap().is_empty());
        assert!(f.search.search_assignments("_").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_search_assignments_on_empty_store() {
        let f = fixture().await;
        assert!(f.search.search_assignments("1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_search_assets_and_users() {
        let f = fixture().await;
        f.assets
            .insert(&AssetInput {
                serial: "SN1".to_string(),
                asset_type: "Monitor".to_string(),
                manufacturer: "Dell".to_string(),
                model: "P2422H".to_string(),
                ..AssetInput::default()
            })
            .await
            .unwrap();
        add_user(&f, false, "Ana Souza", "4201").await;

        assert_eq!(f.search.search_assets("SN1").await.unwrap().len(), 1);
        assert!(f.search.search_assets("").await.unwrap().is_empty());
        assert_eq!(f.search.search_users("ana").await.unwrap().len(), 1);
        assert!(f.search.search_users("").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_search_assignments_folds_accented_serials() {
        let f = fixture().await;
        add_user(&f, false, "Ana", "4201").await;
        assign(&f, "AÇO-01", "4201").await;
        assign(&f, "SN1", "4201").await;

        let records = f.search.search_assignments("aço").await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].serial, "AÇO-01");
    }
}
