//! SQLite persistence for prices, analytics and risk rows.
//!
//! One `Store` owns one connection for its whole lifetime. Dropping the store
//! releases the connection, so a store held in a local binding is released on
//! every exit path, including `?` propagation. `close()` does the same thing
//! explicitly and reports errors from the close itself.
//!
//! Writes are bulk upserts keyed by each table's natural key. Each call runs in
//! a single transaction: a failure part-way through rolls the whole batch back.

mod analytics;
mod prices;
mod risk;
pub mod schema;

pub use prices::PriceRange;
pub use schema::Table;

use std::path::{Path, PathBuf};

use rusqlite::Connection;
use thiserror::Error;

/// Errors from the storage layer.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("no database at {path}")]
    NotFound { path: PathBuf },

    #[error("failed to prepare store directory {path}: {source}")]
    Directory {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// SQLite-backed store for the three row kinds.
pub struct Store {
    conn: Connection,
    location: String,
}

impl Store {
    /// Open (creating if needed) the database file at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| StoreError::Directory {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
        tracing::debug!(path = %path.display(), "opened store");

        Ok(Self {
            conn,
            location: path.display().to_string(),
        })
    }

    /// Open a database file that must already exist. Nothing is created.
    pub fn open_existing(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(StoreError::NotFound {
                path: path.to_path_buf(),
            });
        }
        Self::open(path)
    }

    /// Open a private in-memory database.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        Ok(Self {
            conn,
            location: ":memory:".to_string(),
        })
    }

    /// Where this store lives: a file path or `:memory:`.
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Create any missing tables.
    pub fn init_schema(&self) -> Result<(), StoreError> {
        for table in Table::ALL {
            self.conn.execute_batch(table.ddl())?;
        }
        Ok(())
    }

    /// Number of rows currently in `table`.
    pub fn count(&self, table: Table) -> Result<usize, StoreError> {
        let sql = format!("SELECT COUNT(*) FROM {}", table.name());
        let n: i64 = self.conn.query_row(&sql, [], |row| row.get(0))?;
        Ok(usize::try_from(n).unwrap_or(0))
    }

    /// Release the connection, surfacing any error from closing it.
    pub fn close(self) -> Result<(), StoreError> {
        let location = self.location;
        self.conn.close().map_err(|(_, e)| StoreError::from(e))?;
        tracing::debug!(%location, "closed store");
        Ok(())
    }
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("location", &self.location)
            .finish()
    }
}
