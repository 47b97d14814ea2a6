//! Vocabularies shared across models.
//!
//! Values are persisted as the literal strings already present in existing
//! databases and parsed back case-insensitively.

use serde::{Deserialize, Serialize};

/// Kind of asset, shared by `ModeloAtivo.Tipo` and `Ativos.tipoAtivo`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssetKind {
    Smartphone,
    Notebook,
    Monitor,
}

impl AssetKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetKind::Smartphone => "Smartphone",
            AssetKind::Notebook => "Notebook",
            AssetKind::Monitor => "Monitor",
        }
    }

    /// Phones are the only kind tracked by IMEI
    pub fn requires_imei(&self) -> bool {
        matches!(self, AssetKind::Smartphone)
    }
}

impl std::fmt::Display for AssetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for AssetKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "smartphone" | "phone" => Ok(AssetKind::Smartphone),
            "notebook" | "laptop" => Ok(AssetKind::Notebook),
            "monitor" => Ok(AssetKind::Monitor),
            _ => Err(format!(
                "Unknown asset type: {} (expected Smartphone, Notebook or Monitor)",
                s
            )),
        }
    }
}

/// Whether a supplier currently holds an active contract
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContractStatus {
    Yes,
    No,
}

impl ContractStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContractStatus::Yes => "Sim",
            ContractStatus::No => "Não",
        }
    }
}

impl std::fmt::Display for ContractStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ContractStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sim" | "yes" | "true" => Ok(ContractStatus::Yes),
            "não" | "nao" | "no" | "false" => Ok(ContractStatus::No),
            _ => Err(format!("Unknown contract status: {} (expected yes or no)", s)),
        }
    }
}

/// Organizational user type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserKind {
    /// Identified by registration number (`userMatricula`)
    Employee,
    /// Identified by IMO number (`userIMO`)
    Vessel,
}

impl UserKind {
    pub fn from_vessel_flag(is_vessel: bool) -> Self {
        if is_vessel {
            UserKind::Vessel
        } else {
            UserKind::Employee
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UserKind::Employee => "funcionario",
            UserKind::Vessel => "embarcacao",
        }
    }
}

impl std::fmt::Display for UserKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for UserKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "funcionario" | "employee" => Ok(UserKind::Employee),
            "embarcacao" | "vessel" => Ok(UserKind::Vessel),
            _ => Err(format!("Unknown user type: {}", s)),
        }
    }
}

/// Lifecycle status of an organizational user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    Active,
    Inactive,
}

impl UserStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserStatus::Active => "ativo",
            UserStatus::Inactive => "desativado",
        }
    }
}

impl std::fmt::Display for UserStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for UserStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ativo" | "active" => Ok(UserStatus::Active),
            "desativado" | "inactive" => Ok(UserStatus::Inactive),
            _ => Err(format!("Unknown user status: {}", s)),
        }
    }
}
