//! Remote-first accessor that falls back to the local mirror.

use serde_json::{json, Map, Value};
use std::sync::Arc;
use tracing::{debug, error, warn};

use crate::mirror::{LocalMirror, MirrorStorage, Resolved};

use super::client::RemoteSource;
use super::ids::{timestamp_now, IdGenerator};
use super::path::Endpoint;

/// Remote-first accessor.
///
/// Every operation is attempted once against the remote. On any failure it
/// is served from, or applied to, the local mirror instead, so the caller
/// never sees an error. The [`Origin`](crate::mirror::Origin) on each result
/// tells live data apart from local data.
pub struct Accessor<R: RemoteSource, S: MirrorStorage> {
  remote: R,
  mirror: LocalMirror<S>,
  ids: Arc<IdGenerator>,
}

impl<R: RemoteSource, S: MirrorStorage> Accessor<R, S> {
  pub fn new(remote: R, mirror: LocalMirror<S>) -> Self {
    Self {
      remote,
      mirror,
      ids: Arc::new(IdGenerator::new()),
    }
  }

  pub fn remote(&self) -> &R {
    &self.remote
  }

  pub fn mirror(&self) -> &LocalMirror<S> {
    &self.mirror
  }

  /// Read a collection or singleton.
  ///
  /// Precedence: remote, mirrored value, seed dataset, `fallback`.
  /// Successful remote reads are written through to the mirror.
  pub async fn get(&self, path: &str, fallback: Option<Value>) -> Resolved<Option<Value>> {
    match self.remote.get(path).await {
      Ok(data) => {
        if let Err(e) = self.mirror.save(path, &data) {
          error!(%path, error = %e, "Failed to mirror remote data");
        }
        Resolved::remote(Some(data))
      }
      Err(e) => {
        warn!(%path, error = %e, "Fetch failed, serving local data");
        match self.mirror.get(path) {
          Some(local) => local.map(Some),
          None => Resolved::fallback(fallback),
        }
      }
    }
  }

  /// Create a record.
  ///
  /// Offline, the record gets a generated id and `created_at` and is
  /// prepended to the mirrored collection (newest first).
  pub async fn create(&self, path: &str, payload: Value) -> Resolved<Value> {
    let err = match self.remote.post(path, &payload).await {
      Ok(data) => return Resolved::remote(data),
      Err(e) => e,
    };
    warn!(%path, error = %err, "Create failed, saving to local mirror");

    let fields = match payload {
      Value::Object(fields) => fields,
      other => {
        warn!(%path, "Payload is not an object, nothing mirrored");
        return Resolved::local(other);
      }
    };
    let record = stamp_new_record(fields.clone(), self.ids.next_id(), timestamp_now());

    let outcome = self.mirror.modify(path, |current| {
      let mut list = current.unwrap_or_else(|| json!([]));
      list.as_array_mut()?.insert(0, record.clone());
      Some((list, ()))
    });

    match outcome {
      Ok(Some(())) => Resolved::local(record),
      Ok(None) => {
        warn!(%path, "Mirrored value is not a collection, record not stored");
        Resolved::local(Value::Object(fields))
      }
      Err(e) => {
        error!(%path, error = %e, "Failed to write local mirror");
        Resolved::local(record)
      }
    }
  }

  /// Update a record (`/<collection>/<id>`) or replace the settings singleton.
  ///
  /// Offline, collection records are shallow-merged with `patch`; the
  /// singleton is replaced wholesale.
  pub async fn update(&self, path: &str, patch: Value) -> Resolved<Value> {
    let err = match self.remote.put(path, &patch).await {
      Ok(data) => return Resolved::remote(data),
      Err(e) => e,
    };
    warn!(%path, error = %err, "Update failed, applying to local mirror");

    let endpoint = Endpoint::parse(path);
    let result = match &endpoint {
      Endpoint::Singleton { .. } => self
        .mirror
        .save(&endpoint.base_path(), &patch)
        .map(|_| "Settings saved locally"),
      Endpoint::Record { id, .. } => self
        .mirror
        .modify(&endpoint.base_path(), |current| {
          let mut list = current?;
          let mut matched = 0;
          for item in list.as_array_mut()?.iter_mut() {
            if id_matches(item, id) {
              shallow_merge(item, &patch);
              matched += 1;
            }
          }
          Some((list, matched))
        })
        .map(|matched| {
          if matched.unwrap_or_default() == 0 {
            debug!(%path, "No mirrored record matched");
          }
          "Updated locally"
        }),
      Endpoint::Collection { .. } => {
        warn!(%path, "Update without a record id, nothing changed");
        Ok("Updated locally")
      }
    };

    Resolved::local(ack(path, result))
  }

  /// Delete a record (`/<collection>/<id>`).
  pub async fn delete(&self, path: &str) -> Resolved<Value> {
    let err = match self.remote.delete(path).await {
      Ok(data) => return Resolved::remote(data),
      Err(e) => e,
    };
    warn!(%path, error = %err, "Delete failed, removing from local mirror");

    let endpoint = Endpoint::parse(path);
    let result = match &endpoint {
      Endpoint::Record { id, .. } => self
        .mirror
        .modify(&endpoint.base_path(), |current| {
          let mut list = current?;
          list.as_array_mut()?.retain(|item| !id_matches(item, id));
          Some((list, ()))
        })
        .map(|_| "Deleted locally"),
      _ => {
        warn!(%path, "Delete without a record id, nothing changed");
        Ok("Deleted locally")
      }
    };

    Resolved::local(ack(path, result))
  }
}

impl<R: RemoteSource + Clone, S: MirrorStorage> Clone for Accessor<R, S> {
  fn clone(&self) -> Self {
    Self {
      remote: self.remote.clone(),
      mirror: self.mirror.clone(),
      ids: Arc::clone(&self.ids),
    }
  }
}

/// `{ id, ...payload, created_at }` with the generated id taking precedence.
fn stamp_new_record(mut fields: Map<String, Value>, id: i64, created_at: String) -> Value {
  fields.insert("id".to_string(), Value::from(id));
  fields.insert("created_at".to_string(), Value::String(created_at));
  Value::Object(fields)
}

/// Compare a record's id with a path segment as strings.
pub(crate) fn id_matches(item: &Value, id: &str) -> bool {
  match item.get("id") {
    Some(Value::String(s)) => s == id,
    Some(Value::Number(n)) => n.to_string() == id,
    _ => false,
  }
}

/// `{ ...item, ...patch }`
fn shallow_merge(item: &mut Value, patch: &Value) {
  if let (Value::Object(target), Value::Object(fields)) = (item, patch) {
    for (key, value) in fields {
      target.insert(key.clone(), value.clone());
    }
  }
}

fn ack(path: &str, result: color_eyre::Result<&'static str>) -> Value {
  match result {
    Ok(message) => json!({ "message": message }),
    Err(e) => {
      error!(%path, error = %e, "Failed to write local mirror");
      json!({ "message": "Local mirror unavailable" })
    }
  }
}
