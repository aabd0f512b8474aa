/// Resources addressed without a record id.
pub const SINGLETON_RESOURCES: &[&str] = &["settings"];

/// An endpoint path split into the parts the fallback logic cares about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint<'a> {
  /// `/settings`
  Singleton { name: &'a str },
  /// `/plans`
  Collection { name: &'a str },
  /// `/plans/42`
  Record { collection: &'a str, id: &'a str },
}

impl<'a> Endpoint<'a> {
  /// Parse a path like `/bookings/17`.
  ///
  /// The first segment names the collection, the last one the record.
  pub fn parse(path: &'a str) -> Self {
    let mut segments = path.split('/').filter(|s| !s.is_empty());
    let first = segments.next().unwrap_or_default();

    match segments.last() {
      Some(id) => Endpoint::Record {
        collection: first,
        id,
      },
      None if SINGLETON_RESOURCES.contains(&first) => Endpoint::Singleton { name: first },
      None => Endpoint::Collection { name: first },
    }
  }

  /// Path of the mirrored document this endpoint lives in.
  pub fn base_path(&self) -> String {
    match self {
      Endpoint::Singleton { name } | Endpoint::Collection { name } => format!("/{}", name),
      Endpoint::Record { collection, .. } => format!("/{}", collection),
    }
  }
}

/// Path of one record in a collection.
pub fn record_path(collection: &str, id: impl std::fmt::Display) -> String {
  format!("{}/{}", collection, id)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_parse_variants() {
    assert_eq!(
      Endpoint::parse("/settings"),
      Endpoint::Singleton { name: "settings" }
    );
    assert_eq!(
      Endpoint::parse("/offers"),
      Endpoint::Collection { name: "offers" }
    );
    assert_eq!(
      Endpoint::parse("/offers/7"),
      Endpoint::Record {
        collection: "offers",
        id: "7"
      }
    );
  }

  #[test]
  fn test_trailing_slash_is_ignored() {
    assert_eq!(
      Endpoint::parse("/bookings/"),
      Endpoint::Collection { name: "bookings" }
    );
  }

  #[test]
  fn test_base_path() {
    assert_eq!(Endpoint::parse("/bookings/1700000000000").base_path(), "/bookings");
    assert_eq!(Endpoint::parse("/settings").base_path(), "/settings");
  }
}
