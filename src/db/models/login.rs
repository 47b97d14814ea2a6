//! Login credentials and verification outcomes.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Login {
    pub id: i64,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginSummary {
    pub id: i64,
    pub name: String,
    pub email: String,
}

impl From<Login> for LoginSummary {
    fn from(login: Login) -> Self {
        Self {
            id: login.id,
            name: login.name,
            email: login.email,
        }
    }
}

/// Sign-up form
#[derive(Debug, Clone, Deserialize)]
pub struct EnrollRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    /// Checked against `password` when present
    #[serde(default)]
    pub confirm_password: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResetPasswordRequest {
    pub email: String,
    pub new_password: String,
    #[serde(default)]
    pub confirm_password: Option<String>,
}

/// Outcome of checking a password against the stored digest
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum Verification {
    Matched(LoginSummary),
    Mismatch,
    NotFound,
}

impl Verification {
    pub fn is_matched(&self) -> bool {
        matches!(self, Verification::Matched(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_drops_hash() {
        let login = Login {
            id: 3,
            name: "Ana".to_string(),
            email: "a@b.com".to_string(),
            password_hash: "digest".to_string(),
        };
        let summary = LoginSummary::from(login.clone());
        assert_eq!(summary.email, "a@b.com");

        let json = serde_json::to_string(&login).unwrap();
        assert!(!json.contains("digest"));
    }

    #[test]
    fn test_verification_serialization() {
        let json = serde_json::to_value(Verification::Mismatch).unwrap();
        assert_eq!(json["result"], "mismatch");
        assert!(!Verification::NotFound.is_matched());
    }
}
