//! Path-keyed mirror over a storage backend.

use color_eyre::{eyre::eyre, Result};
use serde_json::Value;
use std::sync::{Arc, Mutex};
use tracing::error;

use super::seed::seed_for;
use super::storage::{MirrorStorage, StoredEntry};
use super::traits::Resolved;

/// Key prefix used when none is configured.
pub const DEFAULT_KEY_PREFIX: &str = "kpb_local_";

/// Local mirror of the remote API, keyed by endpoint path.
///
/// Reads fall back to the built-in seed dataset for known paths. Writes are
/// unconditional overwrites; the last writer wins.
pub struct LocalMirror<S: MirrorStorage> {
  storage: Arc<S>,
  prefix: String,
  /// Serializes read-modify-write cycles within this process
  write_guard: Arc<Mutex<()>>,
}

impl<S: MirrorStorage> LocalMirror<S> {
  /// Create a mirror over the given storage backend.
  pub fn new(storage: S) -> Self {
    Self {
      storage: Arc::new(storage),
      prefix: DEFAULT_KEY_PREFIX.to_string(),
      write_guard: Arc::new(Mutex::new(())),
    }
  }

  /// Set the key namespace prefix.
  pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
    self.prefix = prefix.into();
    self
  }

  /// Storage key for an endpoint path: `/bookings/12` -> `<prefix>bookings_12`.
  pub fn key_for(&self, path: &str) -> String {
    let flat = path.strip_prefix('/').unwrap_or(path).replace('/', "_");
    format!("{}{}", self.prefix, flat)
  }

  /// Get the mirrored value for a path, else its seed dataset.
  ///
  /// Storage failures are logged and treated as a miss.
  pub fn get(&self, path: &str) -> Option<Resolved<Value>> {
    if let Some(stored) = self.load(path) {
      return Some(stored);
    }
    seed_for(path).map(Resolved::seed)
  }

  /// Get only what has actually been saved for a path. A saved `null`
  /// counts as nothing saved.
  pub fn load(&self, path: &str) -> Option<Resolved<Value>> {
    let key = self.key_for(path);
    match self.storage.load(&key) {
      Ok(Some(stored)) if !stored.value.is_null() => {
        Some(Resolved::mirror(stored.value, Some(stored.saved_at)))
      }
      Ok(_) => None,
      Err(e) => {
        error!(%path, error = %e, "Failed to read local mirror");
        None
      }
    }
  }

  /// Overwrite the mirrored value for a path.
  pub fn save(&self, path: &str, value: &Value) -> Result<()> {
    let _guard = self
      .write_guard
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;
    self.storage.store(&self.key_for(path), value)
  }

  /// Read-modify-write the value for a path.
  ///
  /// `f` receives the current value (mirrored, else seed) and returns the
  /// value to persist plus a result, or `None` to leave storage untouched.
  pub fn modify<F, R>(&self, path: &str, f: F) -> Result<Option<R>>
  where
    F: FnOnce(Option<Value>) -> Option<(Value, R)>,
  {
    let _guard = self
      .write_guard
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    let current = self.get(path).map(|r| r.data);
    match f(current) {
      Some((next, result)) => {
        self.storage.store(&self.key_for(path), &next)?;
        Ok(Some(result))
      }
      None => Ok(None),
    }
  }

  /// List everything saved in the mirror.
  pub fn entries(&self) -> Result<Vec<StoredEntry>> {
    self.storage.entries()
  }

  /// Drop every saved value; seed datasets become visible again.
  pub fn clear(&self) -> Result<usize> {
    let _guard = self
      .write_guard
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;
    self.storage.clear()
  }
}

impl<S: MirrorStorage> Clone for LocalMirror<S> {
  fn clone(&self) -> Self {
    Self {
      storage: Arc::clone(&self.storage),
      prefix: self.prefix.clone(),
      write_guard: Arc::clone(&self.write_guard),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::mirror::{Origin, SqliteStorage};
  use serde_json::json;

  fn mirror() -> LocalMirror<SqliteStorage> {
    LocalMirror::new(SqliteStorage::open_in_memory().unwrap())
  }

  #[test]
  fn test_key_normalization() {
    let m = mirror();
    assert_eq!(m.key_for("/plans"), "kpb_local_plans");
    assert_eq!(m.key_for("/bookings/12"), "kpb_local_bookings_12");
    assert_eq!(m.key_for("settings"), "kpb_local_settings");

    let custom = mirror().with_prefix("test_");
    assert_eq!(custom.key_for("/offers"), "test_offers");
  }

  #[test]
  fn test_get_prefers_saved_over_seed() {
    let m = mirror();
    let seeded = m.get("/offers").unwrap();
    assert_eq!(seeded.origin, Origin::Seed);

    m.save("/offers", &json!([{"id": 7, "isActive": true}])).unwrap();
    let saved = m.get("/offers").unwrap();
    assert_eq!(saved.origin, Origin::Mirror);
    assert_eq!(saved.data, json!([{"id": 7, "isActive": true}]));
    assert!(saved.saved_at.is_some());
  }

  #[test]
  fn test_unknown_path_is_none() {
    assert!(mirror().get("/unknown").is_none());
  }

  #[test]
  fn test_seed_is_a_fresh_copy() {
    let m = mirror();
    let mut first = m.get("/plans").unwrap().data;
    first.as_array_mut().unwrap().clear();
    let second = m.get("/plans").unwrap().data;
    assert_eq!(second.as_array().unwrap().len(), 3);
  }

  #[test]
  fn test_modify_persists_only_when_asked() {
    let m = mirror();

    let untouched = m.modify("/unknown", |current| {
      assert!(current.is_none());
      None::<(Value, ())>
    });
    assert!(untouched.unwrap().is_none());
    assert!(m.load("/unknown").is_none());

    let len = m
      .modify("/messages", |current| {
        let mut list = current.unwrap();
        list.as_array_mut().unwrap().push(json!({"id": 1}));
        let len = list.as_array().unwrap().len();
        Some((list, len))
      })
      .unwrap();
    assert_eq!(len, Some(1));
    assert_eq!(m.load("/messages").unwrap().data, json!([{"id": 1}]));
  }

  #[test]
  fn test_saved_null_falls_back_to_seed() {
    let m = mirror();
    m.save("/messages", &Value::Null).unwrap();
    assert!(m.load("/messages").is_none());

    let read = m.get("/messages").unwrap();
    assert_eq!(read.origin, Origin::Seed);
    assert_eq!(read.data, json!([]));

    m.save("/unknown", &Value::Null).unwrap();
    assert!(m.get("/unknown").is_none());
  }

  #[test]
  fn test_clear_restores_seed() {
    let m = mirror();
    m.save("/bookings", &json!([{"id": 1}])).unwrap();
    assert_eq!(m.clear().unwrap(), 1);
    let after = m.get("/bookings").unwrap();
    assert_eq!(after.origin, Origin::Seed);
    assert_eq!(after.data, json!([]));
  }
}
