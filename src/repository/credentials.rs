//! Credential store backing the login gate.

use tracing::{debug, info};

use crate::config::IntegrityRules;
use crate::crypto::{digest_password, verify_digest};
use crate::db::{schema, EnrollRequest, Login, LoginSummary, ResetPasswordRequest, Store, Verification};
use crate::error::{InventoryError, Result, ValidationErrorBuilder};
use crate::validation::{validate_password, validate_password_confirmation, validate_required};

use super::references;

#[derive(Clone)]
pub struct CredentialStore {
    store: Store,
    rules: IntegrityRules,
}

impl CredentialStore {
    pub fn new(store: Store, rules: IntegrityRules) -> Self {
        Self { store, rules }
    }

    async fn ensure(&self) -> Result<()> {
        self.store.ensure(&schema::LOGINS).await?;
        Ok(())
    }

    /// Register a new login. Only the password digest is persisted.
    pub async fn enroll(&self, request: &EnrollRequest) -> Result<LoginSummary> {
        let mut v = ValidationErrorBuilder::new();
        let name = v.check("name", validate_required(&request.name, "Name"));
        let email = v.check("email", validate_required(&request.email, "Email"));
        v.check("password", validate_password(&request.password));
        v.check(
            "confirm_password",
            validate_password_confirmation(&request.password, request.confirm_password.as_deref()),
        );
        v.finish()?;
        let (name, email) = (name.unwrap_or_default(), email.unwrap_or_default());

        self.ensure().await?;

        if self.rules.unique_login_email && references::login_exists(&self.store, &email).await? {
            return Err(InventoryError::validation_field(
                "email",
                "Email is already registered",
            ));
        }

        let result = sqlx::query("INSERT INTO Logins (nome, email, password_hash) VALUES (?, ?, ?)")
            .bind(&name)
            .bind(&email)
            .bind(digest_password(&request.password))
            .execute(self.store.pool())
            .await?;

        info!(email = %email, "Login enrolled");

        Ok(LoginSummary {
            id: result.last_insert_rowid(),
            name,
            email,
        })
    }

    /// Oldest login row for `email`
    pub async fn find_by_email(&self, email: &str) -> Result<Option<Login>> {
        self.ensure().await?;

        let login = sqlx::query_as::<_, Login>(
            r#"
            SELECT id, nome AS name, email, password_hash
            FROM Logins
            WHERE email = ?
            ORDER BY id
            LIMIT 1
            "#,
        )
        .bind(email.trim())
        .fetch_optional(self.store.pool())
        .await?;
        Ok(login)
    }

    /// Check a password against the stored digest.
    ///
    /// Attempts are not rate limited.
    pub async fn verify(&self, email: &str, password: &str) -> Result<Verification> {
        let mut v = ValidationErrorBuilder::new();
        v.check("email", validate_required(email, "Email"));
        if password.is_empty() {
            v.add("password", "Password is required");
        }
        v.finish()?;

        let login = match self.find_by_email(email).await? {
            Some(login) => login,
            None => {
                debug!(email = %email.trim(), "Login not found");
                return Ok(Verification::NotFound);
            }
        };

        if verify_digest(password, &login.password_hash) {
            debug!(email = %login.email, "Login matched");
            Ok(Verification::Matched(login.into()))
        } else {
            debug!(email = %login.email, "Password mismatch");
            Ok(Verification::Mismatch)
        }
    }

    /// Replace the digest of every login row sharing the email
    pub async fn reset_password(&self, request: &ResetPasswordRequest) -> Result<()> {
        let mut v = ValidationErrorBuilder::new();
        let email = v.check("email", validate_required(&request.email, "Email"));
        v.check("new_password", validate_password(&request.new_password));
        v.check(
            "confirm_password",
            validate_password_confirmation(
                &request.new_password,
                request.confirm_password.as_deref(),
            ),
        );
        v.finish()?;
        let email = email.unwrap_or_default();

        self.ensure().await?;

        let result = sqlx::query("UPDATE Logins SET password_hash = ? WHERE email = ?")
            .bind(digest_password(&request.new_password))
            .bind(&email)
            .execute(self.store.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(InventoryError::not_found("login", email));
        }

        info!(email = %email, "Password reset");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::DIGEST_LENGTH;
    use crate::error::ErrorCode;

    async fn credentials(rules: IntegrityRules) -> CredentialStore {
        CredentialStore::new(Store::in_memory().await.unwrap(), rules)
    }

    fn enroll_request(email: &str, password: &str) -> EnrollRequest {
        EnrollRequest {
            name: "Ana".to_string(),
            email: email.to_string(),
            password: password.to_string(),
            confirm_password: None,
        }
    }

    #[tokio::test]
    async fn test_enroll_then_verify() {
        let creds = credentials(IntegrityRules::default()).await;
        creds
            .enroll(&enroll_request("a@b.com", "Abcdef1!"))
            .await
            .unwrap();

        match creds.verify("a@b.com", "Abcdef1!").await.unwrap() {
            Verification::Matched(summary) => {
                assert_eq!(summary.email, "a@b.com");
                assert_eq!(summary.name, "Ana");
            }
            other => panic!("Expected match, got {:?}", other),
        }

        assert_eq!(
            creds.verify("a@b.com", "wrong").await.unwrap(),
            Verification::Mismatch
        );
    }

    #[tokio::test]
    async fn test_verify_unknown_email() {
        let creds = credentials(IntegrityRules::default()).await;
        assert_eq!(
            creds.verify("nobody@b.com", "Abcdef1!").await.unwrap(),
            Verification::NotFound
        );
    }

    #[tokio::test]
    async fn test_verify_rejects_blank_input() {
        let creds = credentials(IntegrityRules::default()).await;
        let err = creds.verify("", "").await.unwrap_err();
        match err {
            InventoryError::Validation(errors) => {
                assert!(errors.has_field("email"));
                assert!(errors.has_field("password"));
            }
            other => panic!("Expected validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_only_digest_is_stored() {
        let creds = credentials(IntegrityRules::default()).await;
        creds
            .enroll(&enroll_request("a@b.com", "Abcdef1!"))
            .await
            .unwrap();

        let login = creds.find_by_email("a@b.com").await.unwrap().unwrap();
        assert_ne!(login.password_hash, "Abcdef1!");
        assert_eq!(login.password_hash.len(), DIGEST_LENGTH);
        assert_eq!(login.password_hash, digest_password("Abcdef1!"));
    }

    #[tokio::test]
    async fn test_enroll_validation() {
        let creds = credentials(IntegrityRules::default()).await;

        let weak = creds.enroll(&enroll_request("a@b.com", "abc")).await;
        assert_eq!(weak.unwrap_err().code(), ErrorCode::ValidationError);

        let missing_email = creds.enroll(&enroll_request("  ", "Abcdef1!")).await;
        assert_eq!(missing_email.unwrap_err().code(), ErrorCode::ValidationError);

        let mut mismatched = enroll_request("a@b.com", "Abcdef1!");
        mismatched.confirm_password = Some("Abcdef1@".to_string());
        match creds.enroll(&mismatched).await.unwrap_err() {
            InventoryError::Validation(errors) => assert!(errors.has_field("confirm_password")),
            other => panic!("Expected validation error, got {:?}", other),
        }

        // Nothing reached storage
        assert!(creds.find_by_email("a@b.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_email_allowed_by_default() {
        let creds = credentials(IntegrityRules::default()).await;
        let first = creds
            .enroll(&enroll_request("a@b.com", "Abcdef1!"))
            .await
            .unwrap();
        creds
            .enroll(&enroll_request("a@b.com", "Zyxwvu9#"))
            .await
            .unwrap();

        // The oldest row is authoritative
        let login = creds.find_by_email("a@b.com").await.unwrap().unwrap();
        assert_eq!(login.id, first.id);
        assert!(creds.verify("a@b.com", "Abcdef1!").await.unwrap().is_matched());
        assert_eq!(
            creds.verify("a@b.com", "Zyxwvu9#").await.unwrap(),
            Verification::Mismatch
        );
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected_when_unique() {
        let rules = IntegrityRules {
            unique_login_email: true,
            ..IntegrityRules::default()
        };
        let creds = credentials(rules).await;
        creds
            .enroll(&enroll_request("a@b.com", "Abcdef1!"))
            .await
            .unwrap();

        let err = creds
            .enroll(&enroll_request("a@b.com", "Abcdef1!"))
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::ValidationError);
    }

    #[tokio::test]
    async fn test_reset_password() {
        let creds = credentials(IntegrityRules::default()).await;
        creds
            .enroll(&enroll_request("a@b.com", "Abcdef1!"))
            .await
            .unwrap();

        creds
            .reset_password(&ResetPasswordRequest {
                email: "a@b.com".to_string(),
                new_password: "Newpass2@".to_string(),
                confirm_password: Some("Newpass2@".to_string()),
            })
            .await
            .unwrap();

        assert_eq!(
            creds.verify("a@b.com", "Abcdef1!").await.unwrap(),
            Verification::Mismatch
        );
        assert!(creds.verify("a@b.com", "Newpass2@").await.unwrap().is_matched());
    }

    #[tokio::test]
    async fn test_reset_password_unknown_email() {
        let creds = credentials(IntegrityRules::default()).await;
        let err = creds
            .reset_password(&ResetPasswordRequest {
                email: "nobody@b.com".to_string(),
                new_password: "Newpass2@".to_string(),
                confirm_password: None,
            })
            .await
            .unwrap_err();
        assert!(err.is_not_found("login"));
    }

    #[tokio::test]
    async fn test_reset_password_rejects_weak_password() {
        let creds = credentials(IntegrityRules::default()).await;
        creds
            .enroll(&enroll_request("a@b.com", "Abcdef1!"))
            .await
            .unwrap();

        let err = creds
            .reset_password(&ResetPasswordRequest {
                email: "a@b.com".to_string(),
                new_password: "weak".to_string(),
                confirm_password: None,
            })
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::ValidationError);
        assert!(creds.verify("a@b.com", "Abcdef1!").await.unwrap().is_matched());
    }
}
