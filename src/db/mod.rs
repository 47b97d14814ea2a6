mod models;
pub mod schema;

pub use models::*;
pub use schema::{ensure_all, ensure_table, table_exists, ColumnPatch, TableSpec};

use parking_lot::Mutex;
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous,
};
use sqlx::SqlitePool;
use std::collections::HashSet;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

pub type DbPool = SqlitePool;

/// Handle to the embedded store.
///
/// Opened once at application start and cloned into every repository. Clones
/// share the pool and the record of tables already ensured in this process.
#[derive(Clone)]
pub struct Store {
    pool: DbPool,
    ensured: Arc<Mutex<HashSet<&'static str>>>,
}

impl Store {
    /// Open (creating if missing) the database file at `path`
    pub async fn open(path: &Path, max_connections: u32) -> Result<Self, sqlx::Error> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        info!("Opening database at {}", path.display());

        // Foreign keys declared in the schema are advisory only
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .foreign_keys(false)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal);

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections.max(1))
            .connect_with(options)
            .await?;

        Ok(Self::from_pool(pool))
    }

    /// Open a private in-memory database.
    ///
    /// The pool holds exactly one connection that never expires, since the
    /// database disappears with its last connection.
    pub async fn in_memory() -> Result<Self, sqlx::Error> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(false);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None::<Duration>)
            .max_lifetime(None::<Duration>)
            .connect_with(options)
            .await?;

        Ok(Self::from_pool(pool))
    }

    pub fn from_pool(pool: DbPool) -> Self {
        Self {
            pool,
            ensured: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    /// Ensure `table` exists, at most once per process.
    ///
    /// A failed attempt is not remembered, so the next call retries it.
    pub async fn ensure(&self, table: &'static TableSpec) -> Result<(), sqlx::Error> {
        if self.ensured.lock().contains(table.name) {
            return Ok(());
        }

        schema::ensure_table(&self.pool, table).await?;
        self.ensured.lock().insert(table.name);
        debug!(table = table.name, "Table ready");
        Ok(())
    }

    /// Ensure several tables in order
    pub async fn ensure_many(&self, tables: &[&'static TableSpec]) -> Result<(), sqlx::Error> {
        for table in tables {
            self.ensure(*table).await?;
        }
        Ok(())
    }

    pub async fn close(&self) {
        info!("Closing database");
        self.pool.close().await;
    }
}
