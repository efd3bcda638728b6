//! Cache generation storage.
//!
//! A generation is a named set of URL-keyed responses. Generations are
//! listed in creation order, which is also the order lookups across all
//! generations search them.

use super::Response;
use crate::Result;
use rusqlite::{Connection, OptionalExtension, params};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Trait for response cache backends.
pub trait CacheStorage {
    /// Create the generation if it does not exist yet.
    fn open(&mut self, name: &str) -> Result<()>;

    /// Store `response` under `url` in generation `name`, replacing any previous entry.
    fn put(&mut self, name: &str, url: &str, response: &Response) -> Result<()>;

    /// Look up `url` in one generation.
    fn match_in(&self, name: &str, url: &str) -> Result<Option<Response>>;

    /// Look up `url` in every generation, oldest first.
    fn match_any(&self, url: &str) -> Result<Option<Response>> {
        for name in self.keys()? {
            if let Some(response) = self.match_in(&name, url)? {
                return Ok(Some(response));
            }
        }
        Ok(None)
    }

    /// Generation names in creation order.
    fn keys(&self) -> Result<Vec<String>>;

    /// Delete a generation and all of its entries. Returns whether it existed.
    fn delete(&mut self, name: &str) -> Result<bool>;

    /// URLs stored in a generation.
    fn urls(&self, name: &str) -> Result<Vec<String>>;
}

/// Process-local cache storage.
#[derive(Debug, Default)]
pub struct MemoryCacheStorage {
    generations: Vec<(String, BTreeMap<String, Response>)>,
}

impl MemoryCacheStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn generation(&self, name: &str) -> Option<&BTreeMap<String, Response>> {
        self.generations
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, entries)| entries)
    }
}

impl CacheStorage for MemoryCacheStorage {
    fn open(&mut self, name: &str) -> Result<()> {
        if self.generation(name).is_none() {
            self.generations.push((name.to_string(), BTreeMap::new()));
        }
        Ok(())
    }

    fn put(&mut self, name: &str, url: &str, response: &Response) -> Result<()> {
        self.open(name)?;
        if let Some((_, entries)) = self.generations.iter_mut().find(|(n, _)| n == name) {
            entries.insert(url.to_string(), response.clone());
        }
        Ok(())
    }

    fn match_in(&self, name: &str, url: &str) -> Result<Option<Response>> {
        Ok(self.generation(name).and_then(|g| g.get(url).cloned()))
    }

    fn keys(&self) -> Result<Vec<String>> {
        Ok(self.generations.iter().map(|(n, _)| n.clone()).collect())
    }

    fn delete(&mut self, name: &str) -> Result<bool> {
        let before = self.generations.len();
        self.generations.retain(|(n, _)| n != name);
        Ok(self.generations.len() != before)
    }

    fn urls(&self, name: &str) -> Result<Vec<String>> {
        Ok(self
            .generation(name)
            .map(|g| g.keys().cloned().collect())
            .unwrap_or_default())
    }
}

const CACHE_DB_FILE: &str = "cache.db";

/// SQLite-backed cache storage.
pub struct SqliteCacheStorage {
    conn: Connection,
}

impl SqliteCacheStorage {
    /// Open (creating if needed) `cache.db` inside `root`.
    pub fn open_in(root: &Path) -> Result<Self> {
        fs::create_dir_all(root)?;
        let conn = Connection::open(root.join(CACHE_DB_FILE))?;
        Self::init_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (tests).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init_schema(&conn)?;
        Ok(Self { conn })
    }

    fn init_schema(conn: &Connection) -> Result<()> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS generations (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL UNIQUE,
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS entries (
                generation TEXT NOT NULL,
                url TEXT NOT NULL,
                status INTEGER NOT NULL,
                headers TEXT NOT NULL,
                body BLOB NOT NULL,
                stored_at TEXT NOT NULL,
                PRIMARY KEY (generation, url)
            );
            "#,
        )?;
        Ok(())
    }
}

impl CacheStorage for SqliteCacheStorage {
    fn open(&mut self, name: &str) -> Result<()> {
        self.conn.execute(
            "INSERT OR IGNORE INTO generations (name, created_at) VALUES (?1, ?2)",
            params![name, chrono::Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    fn put(&mut self, name: &str, url: &str, response: &Response) -> Result<()> {
        self.open(name)?;
        let headers = serde_json::to_string(&response.headers)?;
        self.conn.execute(
            "INSERT OR REPLACE INTO entries (generation, url, status, headers, body, stored_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                name,
                url,
                response.status,
                headers,
                response.body,
                chrono::Utc::now().to_rfc3339()
            ],
        )?;
        Ok(())
    }

    fn match_in(&self, name: &str, url: &str) -> Result<Option<Response>> {
        let row = self
            .conn
            .query_row(
                "SELECT status, headers, body FROM entries WHERE generation = ?1 AND url = ?2",
                params![name, url],
                |row| {
                    Ok((
                        row.get::<_, u16>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, Vec<u8>>(2)?,
                    ))
                },
            )
            .optional()?;

        match row {
            Some((status, headers, body)) => Ok(Some(Response {
                status,
                headers: serde_json::from_str(&headers)?,
                body,
            })),
            None => Ok(None),
        }
    }

    fn keys(&self) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT name FROM generations ORDER BY seq")?;
        let names = stmt
            .query_map([], |row| row.get(0))?
            .collect::<std::result::Result<Vec<String>, _>>()?;
        Ok(names)
    }

    fn delete(&mut self, name: &str) -> Result<bool> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM entries WHERE generation = ?1", [name])?;
        let removed = tx.execute("DELETE FROM generations WHERE name = ?1", [name])?;
        tx.commit()?;
        Ok(removed > 0)
    }

    fn urls(&self, name: &str) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT url FROM entries WHERE generation = ?1 ORDER BY url")?;
        let urls = stmt
            .query_map([name], |row| row.get(0))?
            .collect::<std::result::Result<Vec<String>, _>>()?;
        Ok(urls)
    }
}
