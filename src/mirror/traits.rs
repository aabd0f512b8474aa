//! Core types shared by the mirror and the remote-first accessor.

use chrono::{DateTime, Utc};

/// A value together with where it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolved<T> {
  /// The actual data
  pub data: T,
  /// Which tier answered
  pub origin: Origin,
  /// When the mirrored value was last saved (mirror reads only)
  pub saved_at: Option<DateTime<Utc>>,
}

impl<T> Resolved<T> {
  /// Data returned by the remote API.
  pub fn remote(data: T) -> Self {
    Self {
      data,
      origin: Origin::Remote,
      saved_at: None,
    }
  }

  /// Data read back from the mirror.
  pub fn mirror(data: T, saved_at: Option<DateTime<Utc>>) -> Self {
    Self {
      data,
      origin: Origin::Mirror,
      saved_at,
    }
  }

  /// Built-in seed dataset for a known path.
  pub fn seed(data: T) -> Self {
    Self {
      data,
      origin: Origin::Seed,
      saved_at: None,
    }
  }

  /// The caller-supplied fallback value.
  pub fn fallback(data: T) -> Self {
    Self {
      data,
      origin: Origin::Fallback,
      saved_at: None,
    }
  }

  /// A write that was applied to the mirror only.
  pub fn local(data: T) -> Self {
    Self {
      data,
      origin: Origin::Local,
      saved_at: None,
    }
  }

  /// True when the remote API produced this value.
  pub fn is_live(&self) -> bool {
    self.origin == Origin::Remote
  }

  /// Transform the data, keeping origin metadata.
  pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Resolved<U> {
    Resolved {
      data: f(self.data),
      origin: self.origin,
      saved_at: self.saved_at,
    }
  }
}

/// Indicates which tier produced a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
  /// Live response from the remote API
  Remote,
  /// Last value persisted in the local mirror
  Mirror,
  /// Built-in default dataset, nothing mirrored yet
  Seed,
  /// Caller fallback, no other tier had a value
  Fallback,
  /// Write applied to the local mirror because the remote was unreachable
  Local,
}

impl std::fmt::Display for Origin {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    let label = match self {
      Origin::Remote => "remote",
      Origin::Mirror => "local mirror",
      Origin::Seed => "built-in defaults",
      Origin::Fallback => "caller fallback",
      Origin::Local => "local mirror (offline write)",
    };
    f.write_str(label)
  }
}
