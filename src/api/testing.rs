//! Stub remotes for unit tests.

use async_trait::async_trait;
use color_eyre::{eyre::eyre, Result};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use super::client::RemoteSource;

/// Every request fails as if the server were down.
#[derive(Clone, Default)]
pub struct Unreachable;

#[async_trait]
impl RemoteSource for Unreachable {
  async fn get(&self, path: &str) -> Result<Value> {
    Err(eyre!("connection refused: GET {}", path))
  }

  async fn post(&self, path: &str, _body: &Value) -> Result<Value> {
    Err(eyre!("connection refused: POST {}", path))
  }

  async fn put(&self, path: &str, _body: &Value) -> Result<Value> {
    Err(eyre!("connection refused: PUT {}", path))
  }

  async fn delete(&self, path: &str) -> Result<Value> {
    Err(eyre!("connection refused: DELETE {}", path))
  }

  async fn check_health(&self) -> bool {
    false
  }
}

/// Answers GETs from a fixed table and records every write.
#[derive(Clone, Default)]
pub struct Recording {
  pub reads: Arc<HashMap<String, Value>>,
  pub writes: Arc<Mutex<Vec<(String, String, Value)>>>,
}

impl Recording {
  pub fn with_reads(reads: impl IntoIterator<Item = (&'static str, Value)>) -> Self {
    Self {
      reads: Arc::new(reads.into_iter().map(|(k, v)| (k.to_string(), v)).collect()),
      writes: Arc::default(),
    }
  }

  pub fn writes(&self) -> Vec<(String, String, Value)> {
    self.writes.lock().unwrap().clone()
  }

  fn record(&self, method: &str, path: &str, body: Value) {
    self
      .writes
      .lock()
      .unwrap()
      .push((method.to_string(), path.to_string(), body));
  }
}

#[async_trait]
impl RemoteSource for Recording {
  async fn get(&self, path: &str) -> Result<Value> {
    self
      .reads
      .get(path)
      .cloned()
      .ok_or_else(|| eyre!("404 Not Found: {}", path))
  }

  async fn post(&self, path: &str, body: &Value) -> Result<Value> {
    self.record("POST", path, body.clone());
    Ok(json!({ "message": "created", "id": 42 }))
  }

  async fn put(&self, path: &str, body: &Value) -> Result<Value> {
    self.record("PUT", path, body.clone());
    Ok(json!({ "message": "updated" }))
  }

  async fn delete(&self, path: &str) -> Result<Value> {
    self.record("DELETE", path, Value::Null);
    Ok(json!({ "message": "deleted" }))
  }

  async fn check_health(&self) -> bool {
    true
  }
}
