//! Organizational users (`Usuarios`): employees and vessels.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::{UserKind, UserStatus};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub user_type: String,
    pub full_name: String,
    pub cost_center: String,
    pub registration_number: Option<i64>,
    pub imo_number: Option<i64>,
    pub status: String,
}

impl User {
    pub fn kind(&self) -> Option<UserKind> {
        self.user_type.parse().ok()
    }

    pub fn is_active(&self) -> bool {
        self.status.parse::<UserStatus>().ok() != Some(UserStatus::Inactive)
    }

    /// The number assignments link to: IMO for vessels, registration otherwise
    pub fn identifier(&self) -> Option<i64> {
        match self.kind() {
            Some(UserKind::Vessel) => self.imo_number.or(self.registration_number),
            _ => self.registration_number.or(self.imo_number),
        }
    }
}

/// Registration form, also used for in-place edits
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserInput {
    #[serde(default)]
    pub is_vessel: bool,
    pub full_name: String,
    pub cost_center: String,
    /// Registration number for employees, IMO number for vessels
    #[serde(default)]
    pub identifier: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(kind: UserKind, registration: Option<i64>, imo: Option<i64>) -> User {
        User {
            id: 1,
            user_type: kind.as_str().to_string(),
            full_name: "Ship A".to_string(),
            cost_center: "CC1".to_string(),
            registration_number: registration,
            imo_number: imo,
            status: UserStatus::Active.as_str().to_string(),
        }
    }

    #[test]
    fn test_identifier_follows_kind() {
        assert_eq!(user(UserKind::Vessel, None, Some(12345)).identifier(), Some(12345));
        assert_eq!(user(UserKind::Employee, Some(42), None).identifier(), Some(42));
        assert_eq!(user(UserKind::Employee, None, None).identifier(), None);
    }

    #[test]
    fn test_is_active() {
        let mut u = user(UserKind::Employee, Some(1), None);
        assert!(u.is_active());
        u.status = "desativado".to_string();
        assert!(!u.is_active());
    }
}
