//! Existence checks for the soft references between tables.
//!
//! Assets name their manufacturer and model, and assignments carry a user's
//! registration or IMO number; none of these links is enforced by the engine.
//! Every writer that needs one of these checks goes through this module.

use crate::db::{schema, Store, User};
use crate::error::Result;

pub(crate) const USER_SELECT: &str = r#"
    SELECT id, userTipo AS user_type, userNome AS full_name, userCC AS cost_center,
           userMatricula AS registration_number, userIMO AS imo_number, userStatus AS status
    FROM Usuarios
"#;

/// `LIKE` pattern used to narrow a substring search before the exact check.
///
/// SQLite folds case for ASCII letters only, so a term with any other
/// character matches every row and the caller's comparison decides.
pub(crate) fn like_pattern(term: &str) -> String {
    if term.is_ascii() {
        format!("%{}%", term)
    } else {
        "%".to_string()
    }
}

/// Find the user whose registration number or IMO number equals `identifier`.
///
/// When several users share the number, the oldest row wins.
pub async fn resolve_user(store: &Store, identifier: i64) -> Result<Option<User>> {
    store.ensure(&schema::USUARIOS).await?;

    let sql = format!(
        "{} WHERE userMatricula = ? OR userIMO = ? ORDER BY id LIMIT 1",
        USER_SELECT
    );
    let user = sqlx::query_as::<_, User>(&sql)
        .bind(identifier)
        .bind(identifier)
        .fetch_optional(store.pool())
        .await?;
    Ok(user)
}

pub async fn asset_exists(store: &Store, serial: &str) -> Result<bool> {
    store.ensure(&schema::ATIVOS).await?;

    let found: Option<(String,)> = sqlx::query_as("SELECT serial FROM Ativos WHERE serial = ? LIMIT 1")
        .bind(serial)
        .fetch_optional(store.pool())
        .await?;
    Ok(found.is_some())
}

pub async fn manufacturer_exists(store: &Store, name: &str) -> Result<bool> {
    store.ensure(&schema::FABRICANTES).await?;

    let found: Option<(i64,)> =
        sqlx::query_as("SELECT id FROM Fabricantes WHERE nome_fabricante = ? LIMIT 1")
            .bind(name)
            .fetch_optional(store.pool())
            .await?;
    Ok(found.is_some())
}

pub async fn model_exists(store: &Store, name: &str) -> Result<bool> {
    store.ensure(&schema::MODELO_ATIVO).await?;

    let found: Option<(i64,)> =
        sqlx::query_as("SELECT id FROM ModeloAtivo WHERE nome_modelo = ? LIMIT 1")
            .bind(name)
            .fetch_optional(store.pool())
            .await?;
    Ok(found.is_some())
}

pub async fn login_exists(store: &Store, email: &str) -> Result<bool> {
    store.ensure(&schema::LOGINS).await?;

    let found: Option<(i64,)> = sqlx::query_as("SELECT id FROM Logins WHERE email = ? LIMIT 1")
        .bind(email)
        .fetch_optional(store.pool())
        .await?;
    Ok(found.is_some())
}
