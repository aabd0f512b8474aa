//! Local mirror of the booking site's API data.
//!
//! This module provides the offline half of the client:
//! - Stores one JSON document per endpoint path under a flat, prefixed key
//! - Serves built-in seed datasets for known paths before anything is saved
//! - Tags every value with the tier it came from (see [`Origin`])

mod layer;
mod seed;
mod storage;
mod traits;

pub use layer::{LocalMirror, DEFAULT_KEY_PREFIX};
pub use seed::{seed_for, SEEDED_PATHS};
pub use storage::{MirrorStorage, SqliteStorage, StoredEntry, StoredValue};
pub use traits::{Origin, Resolved};
