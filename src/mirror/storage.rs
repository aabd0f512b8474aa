//! Mirror storage trait and SQLite implementation.

use chrono::{DateTime, Utc};
use color_eyre::{eyre::eyre, Result};
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// A value read back from storage.
#[derive(Debug, Clone)]
pub struct StoredValue {
  pub value: Value,
  /// When the value was last saved
  pub saved_at: DateTime<Utc>,
}

/// Listing entry for operator commands.
#[derive(Debug, Clone)]
pub struct StoredEntry {
  pub key: String,
  pub saved_at: DateTime<Utc>,
  /// Size of the serialized value in bytes
  pub size: usize,
}

/// Trait for mirror storage backends.
///
/// Keys are already normalized; backends do no interpretation of them.
pub trait MirrorStorage: Send + Sync {
  /// Get the value stored under a key.
  fn load(&self, key: &str) -> Result<Option<StoredValue>>;

  /// Overwrite the value stored under a key.
  fn store(&self, key: &str, value: &Value) -> Result<()>;

  /// List stored keys, ordered by key.
  fn entries(&self) -> Result<Vec<StoredEntry>>;

  /// Remove every stored value. Returns the number of removed keys.
  fn clear(&self) -> Result<usize>;
}

/// SQLite-based mirror storage.
pub struct SqliteStorage {
  conn: Mutex<Connection>,
}

impl SqliteStorage {
  /// Open the mirror database at the given path, or at the default location.
  pub fn open(path: Option<&Path>) -> Result<Self> {
    let path = match path {
      Some(p) => p.to_path_buf(),
      None => Self::default_path()?,
    };

    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent)
        .map_err(|e| eyre!("Failed to create mirror directory: {}", e))?;
    }

    let conn = Connection::open(&path)
      .map_err(|e| eyre!("Failed to open mirror database at {}: {}", path.display(), e))?;

    Self::with_connection(conn)
  }

  /// Open a private in-memory database.
  pub fn open_in_memory() -> Result<Self> {
    let conn = Connection::open_in_memory()
      .map_err(|e| eyre!("Failed to open in-memory mirror database: {}", e))?;
    Self::with_connection(conn)
  }

  fn with_connection(conn: Connection) -> Result<Self> {
    let storage = Self {
      conn: Mutex::new(conn),
    };
    storage.run_migrations()?;
    Ok(storage)
  }

  /// Get the default database path.
  pub fn default_path() -> Result<PathBuf> {
    let data_dir = dirs::data_dir()
      .or_else(|| dirs::home_dir().map(|p| p.join(".local/share")))
      .ok_or_else(|| eyre!("Could not determine data directory"))?;

    Ok(data_dir.join("kpb").join("mirror.db"))
  }

  fn run_migrations(&self) -> Result<()> {
    let conn = self
      .conn
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    conn
      .execute_batch(MIRROR_SCHEMA)
      .map_err(|e| eyre!("Failed to run mirror migrations: {}", e))?;

    Ok(())
  }
}

/// Schema for the mirror table.
const MIRROR_SCHEMA: &str = r#"
-- One serialized JSON document per endpoint key
CREATE TABLE IF NOT EXISTS mirror (
    mirror_key TEXT PRIMARY KEY,
    data BLOB NOT NULL,
    saved_at TEXT NOT NULL DEFAULT (datetime('now'))
);
"#;

impl MirrorStorage for SqliteStorage {
  fn load(&self, key: &str) -> Result<Option<StoredValue>> {
    let conn = self
      .conn
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    let row: Option<(Vec<u8>, String)> = conn
      .query_row(
        "SELECT data, saved_at FROM mirror WHERE mirror_key = ?",
        params![key],
        |row| Ok((row.get(0)?, row.get(1)?)),
      )
      .optional()
      .map_err(|e| eyre!("Failed to read mirror key {}: {}", key, e))?;

    match row {
      Some((data, saved_at_str)) => {
        let value: Value = serde_json::from_slice(&data)
          .map_err(|e| eyre!("Failed to deserialize mirror key {}: {}", key, e))?;
        let saved_at = parse_datetime(&saved_at_str)?;
        Ok(Some(StoredValue { value, saved_at }))
      }
      None => Ok(None),
    }
  }

  fn store(&self, key: &str, value: &Value) -> Result<()> {
    let conn = self
      .conn
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;
    let data = serde_json::to_vec(value).map_err(|e| eyre!("Failed to serialize value: {}", e))?;

    conn
      .execute(
        "INSERT OR REPLACE INTO mirror (mirror_key, data, saved_at)
         VALUES (?, ?, datetime('now'))",
        params![key, data],
      )
      .map_err(|e| eyre!("Failed to store mirror key {}: {}", key, e))?;

    Ok(())
  }

  fn entries(&self) -> Result<Vec<StoredEntry>> {
    let conn = self
      .conn
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    let mut stmt = conn
      .prepare("SELECT mirror_key, saved_at, length(data) FROM mirror ORDER BY mirror_key")
      .map_err(|e| eyre!("Failed to prepare query: {}", e))?;

    let rows = stmt
      .query_map([], |row| {
        Ok((
          row.get::<_, String>(0)?,
          row.get::<_, String>(1)?,
          row.get::<_, i64>(2)?,
        ))
      })
      .map_err(|e| eyre!("Failed to list mirror entries: {}", e))?
      .collect::<rusqlite::Result<Vec<_>>>()
      .map_err(|e| eyre!("Failed to read mirror entry: {}", e))?;

    rows
      .into_iter()
      .map(|(key, saved_at, size)| {
        Ok(StoredEntry {
          key,
          saved_at: parse_datetime(&saved_at)?,
          size: usize::try_from(size).unwrap_or_default(),
        })
      })
      .collect()
  }

  fn clear(&self) -> Result<usize> {
    let conn = self
      .conn
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    conn
      .execute("DELETE FROM mirror", [])
      .map_err(|e| eyre!("Failed to clear mirror: {}", e))
  }
}

/// Parse a datetime string from SQLite format.
fn parse_datetime(s: &str) -> Result<DateTime<Utc>> {
  // SQLite stores as "YYYY-MM-DD HH:MM:SS"
  chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
    .map(|dt| dt.and_utc())
    .map_err(|e| eyre!("Failed to parse datetime '{}': {}", s, e))
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn test_missing_key_loads_none() {
    let storage = SqliteStorage::open_in_memory().unwrap();
    assert!(storage.load("kpb_local_plans").unwrap().is_none());
  }

  #[test]
  fn test_store_overwrites_previous_value() {
    let storage = SqliteStorage::open_in_memory().unwrap();
    storage.store("kpb_local_offers", &json!([{"id": 1}])).unwrap();
    storage.store("kpb_local_offers", &json!([])).unwrap();

    let stored = storage.load("kpb_local_offers").unwrap().unwrap();
    assert_eq!(stored.value, json!([]));
    assert_eq!(storage.entries().unwrap().len(), 1);
  }

  #[test]
  fn test_entries_and_clear() {
    let storage = SqliteStorage::open_in_memory().unwrap();
    storage.store("kpb_local_settings", &json!({"siteTitle": "x"})).unwrap();
    storage.store("kpb_local_bookings", &json!([])).unwrap();

    let keys: Vec<String> = storage.entries().unwrap().into_iter().map(|e| e.key).collect();
    assert_eq!(keys, vec!["kpb_local_bookings", "kpb_local_settings"]);

    assert_eq!(storage.clear().unwrap(), 2);
    assert!(storage.entries().unwrap().is_empty());
  }

  #[test]
  fn test_entries_report_bad_rows() {
    let storage = SqliteStorage::open_in_memory().unwrap();
    storage.store("kpb_local_plans", &json!([])).unwrap();
    // A BLOB key cannot be read back as text
    storage
      .conn
      .lock()
      .unwrap()
      .execute(
        "INSERT INTO mirror (mirror_key, data, saved_at) VALUES (?, ?, ?)",
        params![b"raw-key".to_vec(), b"[]".to_vec(), "2024-01-01 00:00:00"],
      )
      .unwrap();

    assert!(storage.entries().is_err());
  }

  #[test]
  fn test_open_creates_file_and_parent_dir() {
    let dir = std::env::temp_dir().join(format!("kpb-storage-{}", std::process::id()));
    let path = dir.join("nested").join("mirror.db");

    {
      let storage = SqliteStorage::open(Some(&path)).unwrap();
      storage.store("kpb_local_messages", &json!([{"id": 5}])).unwrap();
    }
    let reopened = SqliteStorage::open(Some(&path)).unwrap();
    let stored = reopened.load("kpb_local_messages").unwrap().unwrap();
    assert_eq!(stored.value, json!([{"id": 5}]));

    let _ = std::fs::remove_dir_all(&dir);
  }
}
