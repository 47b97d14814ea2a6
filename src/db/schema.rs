//! Table definitions and the idempotent "create if absent" routine.
//!
//! Each table is created from its DDL file under `migrations/`. After creation
//! the column patches are applied for any column missing from an older table,
//! so databases written by earlier releases keep their rows.

use sqlx::SqlitePool;
use tracing::{debug, info, warn};

use super::Store;

/// A statement that brings an older table up to the canonical schema
#[derive(Debug)]
pub struct ColumnPatch {
    /// Column whose absence triggers the patch
    pub column: &'static str,
    pub statement: &'static str,
}

/// Copy an older table into the canonical layout when a column's
/// declaration cannot be fixed with `ALTER TABLE`
#[derive(Debug)]
pub struct TableRebuild {
    pub column: &'static str,
    /// Declared type the column must have
    pub column_type: &'static str,
    /// Target column list of the copy
    pub columns: &'static str,
    /// Expressions read from the renamed old table, in `columns` order
    pub select: &'static str,
}

/// One table of the canonical schema
#[derive(Debug)]
pub struct TableSpec {
    pub name: &'static str,
    pub ddl: &'static str,
    pub patches: &'static [ColumnPatch],
    pub rebuild: Option<&'static TableRebuild>,
}

pub static LOGINS: TableSpec = TableSpec {
    name: "Logins",
    ddl: include_str!("../../migrations/001_logins.sql"),
    patches: &[ColumnPatch {
        column: "nome",
        statement: "ALTER TABLE Logins ADD COLUMN nome TEXT NOT NULL DEFAULT ''",
    }],
    rebuild: None,
};

pub static FABRICANTES: TableSpec = TableSpec {
    name: "Fabricantes",
    ddl: include_str!("../../migrations/002_fabricantes.sql"),
    patches: &[],
    rebuild: None,
};

pub static FORNECEDOR: TableSpec = TableSpec {
    name: "Fornecedor",
    ddl: include_str!("../../migrations/003_fornecedor.sql"),
    patches: &[],
    rebuild: None,
};

pub static MODELO_ATIVO: TableSpec = TableSpec {
    name: "ModeloAtivo",
    ddl: include_str!("../../migrations/004_modelo_ativo.sql"),
    patches: &[],
    rebuild: None,
};

pub static ATIVOS: TableSpec = TableSpec {
    name: "Ativos",
    ddl: include_str!("../../migrations/005_ativos.sql"),
    patches: &[],
    rebuild: None,
};

// The registration screen of earlier releases keyed this table on `userID`,
// and the lookup screen created it without type, cost center or IMO columns
// and with `userMatricula TEXT NOT NULL`, which rejects every vessel.
pub static USUARIOS: TableSpec = TableSpec {
    name: "Usuarios",
    ddl: include_str!("../../migrations/006_usuarios.sql"),
    patches: &[
        ColumnPatch {
            column: "id",
            statement: "ALTER TABLE Usuarios RENAME COLUMN userID TO id",
        },
        ColumnPatch {
            column: "userTipo",
            statement: "ALTER TABLE Usuarios ADD COLUMN userTipo TEXT NOT NULL DEFAULT 'funcionario'",
        },
        ColumnPatch {
            column: "userCC",
            statement: "ALTER TABLE Usuarios ADD COLUMN userCC TEXT NOT NULL DEFAULT ''",
        },
        ColumnPatch {
            column: "userIMO",
            statement: "ALTER TABLE Usuarios ADD COLUMN userIMO INTEGER",
        },
        ColumnPatch {
            column: "userStatus",
            statement: "ALTER TABLE Usuarios ADD COLUMN userStatus TEXT NOT NULL DEFAULT 'ativo'",
        },
    ],
    rebuild: Some(&TableRebuild {
        column: "userMatricula",
        column_type: "INTEGER",
        columns: "id, userTipo, userNome, userCC, userMatricula, userIMO, userStatus",
        select: r#"
            id,
            COALESCE(userTipo, 'funcionario'),
            COALESCE(userNome, ''),
            COALESCE(userCC, ''),
            CASE
                WHEN TRIM(userMatricula) <> '' AND TRIM(userMatricula) NOT GLOB '*[^0-9]*'
                THEN CAST(TRIM(userMatricula) AS INTEGER)
            END,
            CASE
                WHEN TRIM(userIMO) <> '' AND TRIM(userIMO) NOT GLOB '*[^0-9]*'
                THEN CAST(TRIM(userIMO) AS INTEGER)
            END,
            COALESCE(userStatus, 'ativo')
        "#,
    }),
};

pub static ASSOCIACAO: TableSpec = TableSpec {
    name: "Associacao",
    ddl: include_str!("../../migrations/007_associacao.sql"),
    patches: &[],
    rebuild: None,
};

/// Every table, leaf-first
pub static ALL_TABLES: [&TableSpec; 7] = [
    &LOGINS,
    &FABRICANTES,
    &FORNECEDOR,
    &MODELO_ATIVO,
    &ATIVOS,
    &USUARIOS,
    &ASSOCIACAO,
];

/// Split a SQL file into statements, dropping comment lines
fn statements(sql: &str) -> Vec<String> {
    sql.split(';')
        .map(|statement| {
            statement
                .lines()
                .filter(|line| !line.trim().starts_with("--"))
                .collect::<Vec<_>>()
                .join("\n")
                .trim()
                .to_string()
        })
        .filter(|statement| !statement.is_empty())
        .collect()
}

/// Execute a SQL file, properly handling comments
async fn execute_sql(pool: &SqlitePool, sql: &str) -> Result<(), sqlx::Error> {
    for statement in statements(sql) {
        sqlx::query(&statement).execute(pool).await?;
    }
    Ok(())
}

pub async fn table_exists(pool: &SqlitePool, name: &str) -> Result<bool, sqlx::Error> {
    let found: Option<(String,)> =
        sqlx::query_as("SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?")
            .bind(name)
            .fetch_optional(pool)
            .await?;
    Ok(found.is_some())
}

pub async fn column_exists(
    pool: &SqlitePool,
    table: &str,
    column: &str,
) -> Result<bool, sqlx::Error> {
    let found: Option<(String,)> =
        sqlx::query_as("SELECT name FROM pragma_table_info(?) WHERE name = ?")
            .bind(table)
            .bind(column)
            .fetch_optional(pool)
            .await?;
    Ok(found.is_some())
}

/// Whether `column` exists but is not a nullable `column_type` column
async fn column_needs_rebuild(
    pool: &SqlitePool,
    table: &str,
    column: &str,
    column_type: &str,
) -> Result<bool, sqlx::Error> {
    let found: Option<(String, i64)> =
        sqlx::query_as("SELECT type, \"notnull\" FROM pragma_table_info(?) WHERE name = ?")
            .bind(table)
            .bind(column)
            .fetch_optional(pool)
            .await?;
    Ok(matches!(
        found,
        Some((declared, notnull)) if notnull != 0 || !declared.eq_ignore_ascii_case(column_type)
    ))
}

/// Move every row of `table` into a freshly created canonical table.
///
/// Runs in one transaction: the old table is renamed aside, the DDL creates
/// the canonical one, rows are copied with `rebuild.select` and the old
/// table is dropped.
async fn rebuild_table(
    pool: &SqlitePool,
    table: &TableSpec,
    rebuild: &TableRebuild,
) -> Result<(), sqlx::Error> {
    let legacy = format!("{}_legacy", table.name);
    let mut tx = pool.begin().await?;

    sqlx::query(&format!("ALTER TABLE {} RENAME TO {}", table.name, legacy))
        .execute(&mut *tx)
        .await?;
    for statement in statements(table.ddl) {
        sqlx::query(&statement).execute(&mut *tx).await?;
    }
    let copied = sqlx::query(&format!(
        "INSERT INTO {} ({}) SELECT {} FROM {}",
        table.name, rebuild.columns, rebuild.select, legacy
    ))
    .execute(&mut *tx)
    .await?;
    sqlx::query(&format!("DROP TABLE {}", legacy))
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    info!(
        table = table.name,
        rows = copied.rows_affected(),
        "Rebuilt legacy table"
    );
    Ok(())
}

/// Create `table` if absent and bring an older one up to the canonical
/// schema. Rows are kept; a rebuild copies them into the new layout.
pub async fn ensure_table(pool: &SqlitePool, table: &TableSpec) -> Result<(), sqlx::Error> {
    debug!(table = table.name, "Ensuring table");

    execute_sql(pool, table.ddl).await?;

    for patch in table.patches {
        if !column_exists(pool, table.name, patch.column).await? {
            info!(
                table = table.name,
                column = patch.column,
                "Upgrading legacy table"
            );
            sqlx::query(patch.statement).execute(pool).await?;
        }
    }

    if let Some(rebuild) = table.rebuild {
        if column_needs_rebuild(pool, table.name, rebuild.column, rebuild.column_type).await? {
            rebuild_table(pool, table, rebuild).await?;
        }
    }

    Ok(())
}

/// Ensure every table, continuing past failures.
///
/// Returns the names of the tables that could not be ensured; the features
/// depending on them stay unavailable until a later call succeeds.
pub async fn ensure_all(store: &Store) -> Vec<&'static str> {
    info!("Ensuring database schema...");

    let mut failed = Vec::new();
    for table in ALL_TABLES.iter() {
        if let Err(e) = store.ensure(*table).await {
            warn!(table = table.name, error = %e, "Failed to ensure table");
            failed.push(table.name);
        }
    }

    if failed.is_empty() {
        info!("Schema ready");
    }
    failed
}
