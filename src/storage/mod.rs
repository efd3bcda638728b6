//! Storage layer for hubdeck data.
//!
//! All controller state lives in a single SQLite key/value table
//! (`items`) inside the data directory:
//!
//! - `github-token` - bearer token, kept until an explicit disconnect
//! - `browser-session` - selected repository, path and branch (JSON)
//! - `tasks` - the full task list as one JSON array
//! - `last-sync` - RFC 3339 timestamp of the last task sync
//! - `theme` - `light` or `dark`
//!
//! The response cache keeps its own database next to it (see
//! [`crate::cache::SqliteCacheStorage`]).

pub mod backend;

pub use backend::{ItemStore, MemoryStore};

use crate::{Error, Result};
use rusqlite::{Connection, OptionalExtension, params};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "HD_DATA_DIR";

pub const TOKEN_KEY: &str = "github-token";
pub const SESSION_KEY: &str = "browser-session";
pub const TASKS_KEY: &str = "tasks";
pub const LAST_SYNC_KEY: &str = "last-sync";
pub const THEME_KEY: &str = "theme";

const DB_FILE: &str = "hubdeck.db";

/// SQLite-backed item store.
pub struct Storage {
    /// Root directory for hubdeck data
    pub root: PathBuf,
    conn: Connection,
}

impl Storage {
    /// Open (creating if needed) storage in the default data directory.
    pub fn open() -> Result<Self> {
        let root = get_storage_dir()?;
        Self::open_with_data_dir(&root)
    }

    /// Open (creating if needed) storage in an explicit directory.
    pub fn open_with_data_dir(root: &Path) -> Result<Self> {
        fs::create_dir_all(root)?;
        let conn = Connection::open(root.join(DB_FILE))?;
        Self::init_schema(&conn)?;
        tracing::debug!(path = %root.display(), "opened item storage");
        Ok(Self {
            root: root.to_path_buf(),
            conn,
        })
    }

    fn init_schema(conn: &Connection) -> Result<()> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS items (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            "#,
        )?;
        Ok(())
    }

    /// List all stored keys.
    pub fn keys(&self) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare("SELECT key FROM items ORDER BY key")?;
        let keys = stmt
            .query_map([], |row| row.get(0))?
            .collect::<std::result::Result<Vec<String>, _>>()?;
        Ok(keys)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ItemStore for Storage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row("SELECT value FROM items WHERE key = ?1", [key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO items (key, value, updated_at) VALUES (?1, ?2, ?3)",
            params![key, value, chrono::Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> Result<()> {
        self.conn
            .execute("DELETE FROM items WHERE key = ?1", [key])?;
        Ok(())
    }

    fn location(&self) -> String {
        self.root.join(DB_FILE).display().to_string()
    }
}

/// Resolve the data directory: `HD_DATA_DIR` if set, otherwise
/// `<platform data dir>/hubdeck`.
pub fn get_storage_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
        if !dir.is_empty() {
            return Ok(PathBuf::from(dir));
        }
    }
    let data_dir = dirs::data_dir()
        .ok_or_else(|| Error::Other("Could not determine data directory".to_string()))?;
    Ok(data_dir.join("hubdeck"))
}

/// Generate a time-derived identifier.
///
/// Format: `<unix millis>-<4 hex chars>`. The hash suffix covers the seed and
/// the nanosecond clock so ids created in the same millisecond differ.
pub fn generate_id(seed: &str) -> String {
    let now = chrono::Utc::now();
    let mut hasher = Sha256::new();
    hasher.update(seed.as_bytes());
    hasher.update(now.timestamp_nanos_opt().unwrap_or(0).to_le_bytes());
    let hash = hasher.finalize();
    let hash_hex = format!("{:x}", hash);
    format!("{}-{}", now.timestamp_millis(), &hash_hex[..4])
}
