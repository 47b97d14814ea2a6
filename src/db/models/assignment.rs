//! Asset-to-user assignments (`Associacao`).

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Assignment {
    pub id: i64,
    pub serial: String,
    /// Registration or IMO number of the assigned user
    pub user_identifier: i64,
    /// DD-MM-YYYY
    pub received_date: String,
    pub document_reference: Option<String>,
}

/// An assignment joined with the user it resolves to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct AssignmentRecord {
    pub id: i64,
    pub serial: String,
    pub user_identifier: i64,
    pub received_date: String,
    pub document_reference: Option<String>,
    pub user_id: i64,
    pub user_name: String,
    pub registration_number: Option<i64>,
    pub imo_number: Option<i64>,
}

impl AssignmentRecord {
    /// Case-insensitive substring match on registration, IMO or serial
    pub fn matches(&self, term: &str) -> bool {
        let needle = term.to_lowercase();
        let number_matches =
            |n: Option<i64>| n.map_or(false, |n| n.to_string().contains(&needle));

        number_matches(self.registration_number)
            || number_matches(self.imo_number)
            || self.serial.to_lowercase().contains(&needle)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewAssignment {
    pub serial: String,
    /// Registration or IMO number typed by the operator
    pub identifier: String,
    pub received_date: String,
    #[serde(default)]
    pub document_reference: Option<String>,
}
