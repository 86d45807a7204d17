use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use crate::session::{StoreError, TokenStore};

/// Settings key holding the bearer token.
pub const TOKEN_KEY: &str = "token";

/// Key/value settings persisted in SQLite. Holds the session token and
/// the optional API base URL override.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    pub fn new(data_dir: &Path) -> SqliteResult<Self> {
        std::fs::create_dir_all(data_dir).ok();
        let db_path = data_dir.join("sweetshop.db");
        log::debug!("Database: {}", db_path.display());

        Self::from_connection(Connection::open(&db_path)?)
    }

    pub fn in_memory() -> SqliteResult<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> SqliteResult<Self> {
        let db = Self {
            conn: Mutex::new(conn),
        };
        db.run_migrations()?;
        Ok(db)
    }

    fn lock(&self) -> MutexGuard<'_, Connection> {
        // A panic mid-statement leaves nothing half-written worth refusing.
        self.conn.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn run_migrations(&self) -> SqliteResult<()> {
        let conn = self.lock();

        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS app_config (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );
            ",
        )?;

        log::debug!("Database migrations complete");
        Ok(())
    }

    pub fn get_setting(&self, key: &str) -> SqliteResult<Option<String>> {
        let conn = self.lock();
        conn.query_row(
            "SELECT value FROM app_config WHERE key = ?1",
            params![key],
            |row| row.get(0),
        )
        .optional()
    }

    pub fn set_setting(&self, key: &str, value: &str) -> SqliteResult<()> {
        let conn = self.lock();
        conn.execute(
            "INSERT INTO app_config (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        Ok(())
    }

    /// Returns true if a row was removed.
    pub fn delete_setting(&self, key: &str) -> SqliteResult<bool> {
        let conn = self.lock();
        let rows = conn.execute("DELETE FROM app_config WHERE key = ?1", params![key])?;
        Ok(rows > 0)
    }
}

impl TokenStore for Database {
    fn load(&self) -> Result<Option<String>, StoreError> {
        Ok(self.get_setting(TOKEN_KEY)?)
    }

    fn save(&self, token: &str) -> Result<(), StoreError> {
        Ok(self.set_setting(TOKEN_KEY, token)?)
    }

    fn remove(&self) -> Result<(), StoreError> {
        self.delete_setting(TOKEN_KEY)?;
        Ok(())
    }
}
