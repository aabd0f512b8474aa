use chrono::{SecondsFormat, Utc};
use std::sync::atomic::{AtomicI64, Ordering};

/// Generates record ids for writes that only reach the local mirror.
///
/// Ids are Unix milliseconds, bumped past the previous id when two records
/// are created within the same millisecond.
#[derive(Debug, Default)]
pub struct IdGenerator {
  last: AtomicI64,
}

impl IdGenerator {
  pub fn new() -> Self {
    Self::default()
  }

  /// Next id, strictly greater than any id this generator returned before.
  pub fn next_id(&self) -> i64 {
    let now = Utc::now().timestamp_millis();
    let prev = self
      .last
      .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
        Some(now.max(last + 1))
      })
      .unwrap_or_else(|last| last);
    now.max(prev + 1)
  }
}

/// Creation timestamp in the same shape the server writes (`2024-05-01T10:00:00.000Z`).
pub fn timestamp_now() -> String {
  Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
