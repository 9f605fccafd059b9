//! Storage layer for simak.
//!
//! This module provides the persistent store adapter: a `SQLite`-backed,
//! string-keyed, string-valued store with a long-lived scope and a session
//! scope. Components above it never touch the database directly.

pub mod codec;
pub mod migrations;
pub mod schema;

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Duration, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info};

use crate::error::{Error, Result};

/// Key holding the record list.
pub const RECORDS_KEY: &str = "records";
/// Key holding the unit list.
pub const UNITS_KEY: &str = "units";
/// Key holding the dashboard heading title.
pub const HERO_TITLE_KEY: &str = "hero_title";
/// Key holding the dashboard heading description.
pub const HERO_DESC_KEY: &str = "hero_desc";
/// Key holding the selected theme name.
pub const THEME_KEY: &str = "app_theme";
/// Session key holding the active role.
pub const ROLE_KEY: &str = "user_role";

/// Storage area a key lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    /// Long-lived values: records, units, preferences.
    Local,
    /// Values that expire with the session.
    Session,
}

impl Scope {
    fn table(self) -> &'static str {
        match self {
            Self::Local => "local_store",
            Self::Session => "session_store",
        }
    }

    fn stamp_column(self) -> &'static str {
        match self {
            Self::Local => "updated_at",
            Self::Session => "touched_at",
        }
    }
}

impl std::fmt::Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Local => write!(f, "local"),
            Self::Session => write!(f, "session"),
        }
    }
}

/// Persistent key/value store.
///
/// Cloning the handle shares the underlying connection; the register has a
/// single writer, the lock only serialises access between components.
#[derive(Debug, Clone)]
pub struct Storage {
    /// Path to the database file.
    path: PathBuf,
    /// Database connection.
    conn: Arc<Mutex<Connection>>,
}

impl Storage {
    /// Open or create a storage database at the given path.
    ///
    /// Creates the parent directories and database file if they don't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or schema initialization fails.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!("Opening database at {}", path.display());
        let conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;

        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;
        migrations::initialize_schema(&conn)?;

        info!("Database opened successfully at {}", path.display());
        Ok(Self {
            path,
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Create an in-memory storage instance for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: PathBuf::from(":memory:"),
            source,
        })?;

        migrations::initialize_schema(&conn)?;

        Ok(Self {
            path: PathBuf::from(":memory:"),
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| Error::internal("storage connection lock poisoned"))
    }

    /// Read a plain string value.
    ///
    /// Reading a session value refreshes its idle timer.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn get_text(&self, scope: Scope, key: &str) -> Result<Option<String>> {
        let conn = self.conn()?;
        let value: Option<String> = conn
            .query_row(
                &format!("SELECT value FROM {} WHERE key = ?1", scope.table()),
                [key],
                |row| row.get(0),
            )
            .optional()?;

        if value.is_some() && scope == Scope::Session {
            conn.execute(
                "UPDATE session_store SET touched_at = ?2 WHERE key = ?1",
                params![key, Utc::now().to_rfc3339()],
            )?;
        }
        Ok(value)
    }

    /// Write a plain string value.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn set_text(&self, scope: Scope, key: &str, value: &str) -> Result<()> {
        let conn = self.conn()?;
        Self::write(&conn, scope, key, value)?;
        debug!("Wrote {} key '{}'", scope, key);
        Ok(())
    }

    /// Remove a value.
    ///
    /// Returns `true` if a value was removed, `false` if the key was absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn remove(&self, scope: Scope, key: &str) -> Result<bool> {
        let affected = self.conn()?.execute(
            &format!("DELETE FROM {} WHERE key = ?1", scope.table()),
            [key],
        )?;
        Ok(affected > 0)
    }

    /// Load a stored sequence.
    ///
    /// Returns `None` when the key is absent; callers fall back to their seed
    /// value.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails or the payload is
    /// corrupt.
    pub fn load<T: DeserializeOwned>(&self, scope: Scope, key: &str) -> Result<Option<Vec<T>>> {
        self.get_text(scope, key)?
            .map(|raw| codec::decode(key, &raw))
            .transpose()
    }

    /// Store a sequence in the current payload envelope.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the database operation fails.
    pub fn save<T: Serialize>(&self, scope: Scope, key: &str, items: &[T]) -> Result<()> {
        let raw = codec::encode(items)?;
        self.set_text(scope, key, &raw)
    }

    /// Write several pre-encoded values in one transaction.
    ///
    /// Either every value is written or none is.
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction fails.
    pub fn save_batch(&self, scope: Scope, entries: &[(&str, String)]) -> Result<()> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        for (key, value) in entries {
            Self::write(&tx, scope, key, value)?;
        }
        tx.commit()?;
        debug!("Wrote {} {} keys in one transaction", entries.len(), scope);
        Ok(())
    }

    fn write(conn: &Connection, scope: Scope, key: &str, value: &str) -> Result<()> {
        conn.execute(
            &format!(
                "INSERT OR REPLACE INTO {} (key, value, {}) VALUES (?1, ?2, ?3)",
                scope.table(),
                scope.stamp_column()
            ),
            params![key, value, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    /// Discard session values idle for longer than `idle`.
    ///
    /// Returns the number of values discarded.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn expire_session(&self, idle: Duration) -> Result<usize> {
        let cutoff = Utc::now() - idle;
        let affected = self.conn()?.execute(
            "DELETE FROM session_store WHERE touched_at < ?1",
            [cutoff.to_rfc3339()],
        )?;

        if affected > 0 {
            info!("Expired {} idle session values", affected);
        }
        Ok(affected)
    }

    /// Get database statistics.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn stats(&self) -> Result<StorageStats> {
        let conn = self.conn()?;
        let count = |table: &str| -> Result<i64> {
            Ok(conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| {
                row.get(0)
            })?)
        };
        let local_keys = count(Scope::Local.table())?;
        let session_keys = count(Scope::Session.table())?;

        let last: Option<String> = conn
            .query_row(
                "SELECT updated_at FROM local_store ORDER BY updated_at DESC LIMIT 1",
                [],
                |row| row.get(0),
            )
            .optional()?;
        let last_write = last
            .and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
            .map(|dt| dt.with_timezone(&Utc));

        let db_size_bytes = if self.path.to_string_lossy() == ":memory:" {
            0
        } else {
            std::fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0)
        };

        Ok(StorageStats {
            local_keys,
            session_keys,
            last_write,
            db_size_bytes,
        })
    }
}

/// Statistics about the storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StorageStats {
    /// Number of long-lived keys.
    pub local_keys: i64,
    /// Number of live session keys.
    pub session_keys: i64,
    /// Time of the most recent long-lived write.
    pub last_write: Option<DateTime<Utc>>,
    /// Size of the database file in bytes.
    pub db_size_bytes: u64,
}
