//! Typed views of the records the booking site API exchanges.
//!
//! Records travel as camelCase JSON. The spreadsheet-backed server hands
//! some fields back as strings (`"true"`, encoded lists), so a few fields
//! deserialize leniently.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Record identifier: numeric for server- or mirror-generated records,
/// textual for the built-in plans (`"basic"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
  Number(i64),
  Text(String),
}

impl RecordId {
  /// Ids compare as strings: `7` matches `"7"`.
  pub fn matches(&self, other: &RecordId) -> bool {
    self.to_string() == other.to_string()
  }
}

impl fmt::Display for RecordId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      RecordId::Number(n) => write!(f, "{}", n),
      RecordId::Text(s) => f.write_str(s),
    }
  }
}

impl FromStr for RecordId {
  type Err = std::convert::Infallible;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Ok(match s.parse::<i64>() {
      Ok(n) => RecordId::Number(n),
      Err(_) => RecordId::Text(s.to_string()),
    })
  }
}

// ============================================================================
// Plans
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
  pub id: RecordId,
  #[serde(default)]
  pub name: String,
  /// Display string, e.g. "₹2,999"
  #[serde(default)]
  pub price: String,
  /// Display string, e.g. "2 Hours"
  #[serde(default)]
  pub duration: String,
  #[serde(default, deserialize_with = "lenient::string_list")]
  pub features: Vec<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
  #[serde(default, deserialize_with = "lenient::boolean")]
  pub is_popular: bool,
}

/// Plan fields as sent on create and update.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanDraft {
  pub name: String,
  pub price: String,
  pub duration: String,
  pub features: Vec<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
  pub is_popular: bool,
}

// ============================================================================
// Bookings
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BookingStatus {
  #[default]
  Pending,
  Approved,
  Rejected,
}

impl fmt::Display for BookingStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let s = match self {
      BookingStatus::Pending => "Pending",
      BookingStatus::Approved => "Approved",
      BookingStatus::Rejected => "Rejected",
    };
    f.write_str(s)
  }
}

/// Admin decision on a pending booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewDecision {
  Approve,
  Reject,
}

impl ReviewDecision {
  pub fn status(self) -> BookingStatus {
    match self {
      ReviewDecision::Approve => BookingStatus::Approved,
      ReviewDecision::Reject => BookingStatus::Rejected,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
  pub id: RecordId,
  #[serde(default)]
  pub customer_name: String,
  #[serde(default, deserialize_with = "lenient::string")]
  pub phone: String,
  #[serde(default)]
  pub email: String,
  #[serde(default)]
  pub dob: String,
  #[serde(default, deserialize_with = "lenient::number")]
  pub age: u32,
  #[serde(default)]
  pub state: String,
  #[serde(default)]
  pub city: String,
  #[serde(default)]
  pub address: String,
  #[serde(default)]
  pub time: String,
  /// Plan name at the time of booking, not a reference
  #[serde(default)]
  pub plan: String,
  #[serde(default)]
  pub special_requirements: String,
  #[serde(default)]
  pub status: BookingStatus,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub date: Option<String>,
  #[serde(rename = "created_at", default, skip_serializing_if = "Option::is_none")]
  pub created_at: Option<String>,
}

// ============================================================================
// Messages
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
  pub id: RecordId,
  #[serde(default)]
  pub name: String,
  #[serde(default)]
  pub email: String,
  #[serde(default)]
  pub message: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub created_at: Option<String>,
}

/// Contact form submission.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MessageDraft {
  pub name: String,
  pub email: String,
  pub message: String,
}

// ============================================================================
// Offers
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Offer {
  pub id: RecordId,
  #[serde(default)]
  pub title: String,
  #[serde(default)]
  pub description: String,
  #[serde(default, deserialize_with = "lenient::boolean")]
  pub is_active: bool,
  #[serde(rename = "created_at", default, skip_serializing_if = "Option::is_none")]
  pub created_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OfferDraft {
  pub title: String,
  pub description: String,
  pub is_active: bool,
}

// ============================================================================
// Site settings (singleton)
// ============================================================================

/// Pages the disclaimer banner can be enabled on.
pub const DISCLAIMER_PAGE_CHOICES: &[&str] = &[
  "/", "/plans", "/booking", "/about", "/contact", "/terms", "/privacy",
];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SiteSettings {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub id: Option<RecordId>,
  pub site_title: String,
  pub terms_content: String,
  pub privacy_policy_content: String,
  /// Scrolling banner text
  pub disclaimer_text: String,
  #[serde(deserialize_with = "lenient::string_list")]
  pub disclaimer_pages: Vec<String>,
  #[serde(deserialize_with = "lenient::boolean")]
  pub age_gate_enabled: bool,
  pub age_gate_title: String,
  pub age_gate_content: String,
}

impl SiteSettings {
  /// Whether the disclaimer banner shows on a page.
  ///
  /// An empty page list means every page.
  pub fn shows_disclaimer_on(&self, page: &str) -> bool {
    !self.disclaimer_text.is_empty()
      && (self.disclaimer_pages.is_empty() || self.disclaimer_pages.iter().any(|p| p == page))
  }

  /// Add the page to the disclaimer list, or remove it if present.
  /// Returns whether the page is now listed.
  pub fn toggle_disclaimer_page(&mut self, page: &str) -> bool {
    if let Some(pos) = self.disclaimer_pages.iter().position(|p| p == page) {
      self.disclaimer_pages.remove(pos);
      false
    } else {
      self.disclaimer_pages.push(page.to_string());
      true
    }
  }
}

/// Deserializers for values the spreadsheet backend stringifies.
mod lenient {
  use serde::{Deserialize, Deserializer};
  use serde_json::Value;

  /// `true`, `"true"`, `1`; anything else is false.
  pub fn boolean<'de, D>(deserializer: D) -> Result<bool, D::Error>
  where
    D: Deserializer<'de>,
  {
    Ok(match Value::deserialize(deserializer)? {
      Value::Bool(b) => b,
      Value::String(s) => s.trim().eq_ignore_ascii_case("true"),
      Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
      _ => false,
    })
  }

  /// A list, or a JSON-encoded list in a string.
  pub fn string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
  where
    D: Deserializer<'de>,
  {
    let value = match Value::deserialize(deserializer)? {
      Value::String(s) if s.trim().is_empty() => return Ok(Vec::new()),
      Value::String(s) => serde_json::from_str(&s).map_err(serde::de::Error::custom)?,
      other => other,
    };

    match value {
      Value::Null => Ok(Vec::new()),
      Value::Array(items) => Ok(
        items
          .into_iter()
          .filter_map(|item| match item {
            Value::String(s) => Some(s),
            Value::Null => None,
            other => Some(other.to_string()),
          })
          .collect(),
      ),
      other => Err(serde::de::Error::custom(format!(
        "expected a list, got {}",
        other
      ))),
    }
  }

  /// A string, or a scalar rendered as one.
  pub fn string<'de, D>(deserializer: D) -> Result<String, D::Error>
  where
    D: Deserializer<'de>,
  {
    Ok(match Value::deserialize(deserializer)? {
      Value::String(s) => s,
      Value::Null => String::new(),
      other => other.to_string(),
    })
  }

  /// A non-negative integer, numeric string, or blank.
  pub fn number<'de, D>(deserializer: D) -> Result<u32, D::Error>
  where
    D: Deserializer<'de>,
  {
    Ok(match Value::deserialize(deserializer)? {
      Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()).unwrap_or_default(),
      Value::String(s) => s.trim().parse().unwrap_or_default(),
      _ => 0,
    })
  }
}
