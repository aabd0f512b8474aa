//! Typed client for the booking site that wraps the remote-first accessor.

use color_eyre::{eyre::eyre, Result};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{json, Value};
use tracing::warn;

use crate::admin::AdminStats;
use crate::booking::BookingPayload;
use crate::config::Config;
use crate::mirror::{LocalMirror, MirrorStorage, Origin, Resolved, SqliteStorage};
use crate::models::{
  Booking, Message, MessageDraft, Offer, OfferDraft, Plan, PlanDraft, RecordId, ReviewDecision,
  SiteSettings,
};

use super::accessor::Accessor;
use super::client::{ApiClient, RemoteSource};
use super::path::record_path;

const PLANS: &str = "/plans";
const BOOKINGS: &str = "/bookings";
const MESSAGES: &str = "/messages";
const OFFERS: &str = "/offers";
const SETTINGS: &str = "/settings";

/// Booking site client with per-entity operations.
///
/// Reads and writes go through [`Accessor`], so they keep working offline
/// against the local mirror. Results carry the origin of the data.
pub struct SiteClient<R: RemoteSource, S: MirrorStorage> {
  accessor: Accessor<R, S>,
}

/// Client talking HTTP with a SQLite mirror.
pub type LiveSiteClient = SiteClient<ApiClient, SqliteStorage>;

impl LiveSiteClient {
  /// Create a client from configuration, opening the mirror database.
  pub fn connect(config: &Config) -> Result<Self> {
    let remote = ApiClient::new(&config.api)?;
    let storage = SqliteStorage::open(config.mirror.path.as_deref())?;
    let mirror = LocalMirror::new(storage).with_prefix(config.mirror.key_prefix.clone());

    Ok(Self::new(Accessor::new(remote, mirror)))
  }
}

impl<R: RemoteSource, S: MirrorStorage> SiteClient<R, S> {
  pub fn new(accessor: Accessor<R, S>) -> Self {
    Self { accessor }
  }

  pub fn mirror(&self) -> &LocalMirror<S> {
    self.accessor.mirror()
  }

  /// Whether the API server is reachable right now.
  pub async fn check_health(&self) -> bool {
    self.accessor.remote().check_health().await
  }

  async fn list<T: DeserializeOwned>(&self, path: &str) -> Resolved<Vec<T>> {
    self
      .accessor
      .get(path, Some(json!([])))
      .await
      .map(|data| decode_list(path, data))
  }

  async fn create<T: Serialize>(&self, path: &str, draft: &T) -> Result<Resolved<Option<RecordId>>> {
    let payload = to_payload(draft)?;
    Ok(self.accessor.create(path, payload).await.map(|data| {
      data
        .get("id")
        .and_then(|id| serde_json::from_value(id.clone()).ok())
    }))
  }

  // Plans

  pub async fn plans(&self) -> Resolved<Vec<Plan>> {
    self.list(PLANS).await
  }

  pub async fn create_plan(&self, draft: &PlanDraft) -> Result<Resolved<Option<RecordId>>> {
    self.create(PLANS, draft).await
  }

  /// Replace a plan's fields.
  pub async fn update_plan(&self, id: &RecordId, draft: &PlanDraft) -> Result<Resolved<Value>> {
    let payload = to_payload(draft)?;
    Ok(self.accessor.update(&record_path(PLANS, id), payload).await)
  }

  pub async fn delete_plan(&self, id: &RecordId) -> Resolved<Value> {
    self.accessor.delete(&record_path(PLANS, id)).await
  }

  // Bookings

  /// Bookings, newest first.
  pub async fn bookings(&self) -> Resolved<Vec<Booking>> {
    self.list(BOOKINGS).await
  }

  pub async fn submit_booking(
    &self,
    payload: &BookingPayload,
  ) -> Result<Resolved<Option<RecordId>>> {
    self.create(BOOKINGS, payload).await
  }

  /// Approve or reject a booking. Only the status is sent.
  pub async fn review_booking(&self, id: &RecordId, decision: ReviewDecision) -> Resolved<Value> {
    let patch = json!({ "status": decision.status() });
    self.accessor.update(&record_path(BOOKINGS, id), patch).await
  }

  pub async fn delete_booking(&self, id: &RecordId) -> Resolved<Value> {
    self.accessor.delete(&record_path(BOOKINGS, id)).await
  }

  // Messages

  /// Contact messages, newest first.
  pub async fn messages(&self) -> Resolved<Vec<Message>> {
    self.list(MESSAGES).await
  }

  pub async fn send_message(&self, draft: &MessageDraft) -> Result<Resolved<Option<RecordId>>> {
    self.create(MESSAGES, draft).await
  }

  pub async fn delete_message(&self, id: &RecordId) -> Resolved<Value> {
    self.accessor.delete(&record_path(MESSAGES, id)).await
  }

  // Offers

  pub async fn offers(&self) -> Resolved<Vec<Offer>> {
    self.list(OFFERS).await
  }

  pub async fn create_offer(&self, draft: &OfferDraft) -> Result<Resolved<Option<RecordId>>> {
    self.create(OFFERS, draft).await
  }

  /// Set an offer's active flag. Only the flag is sent.
  pub async fn set_offer_active(&self, id: &RecordId, active: bool) -> Resolved<Value> {
    let patch = json!({ "isActive": active });
    self.accessor.update(&record_path(OFFERS, id), patch).await
  }

  /// Flip an offer's active flag. Returns the new state.
  pub async fn toggle_offer(&self, id: &RecordId) -> Result<Resolved<bool>> {
    let offers = self.offers().await;
    let offer = offers
      .data
      .iter()
      .find(|o| o.id.matches(id))
      .ok_or_else(|| eyre!("Offer {} not found", id))?;

    let active = !offer.is_active;
    Ok(self.set_offer_active(id, active).await.map(|_| active))
  }

  pub async fn delete_offer(&self, id: &RecordId) -> Resolved<Value> {
    self.accessor.delete(&record_path(OFFERS, id)).await
  }

  // Settings

  /// Site settings, if any source has a usable record.
  pub async fn settings(&self) -> Resolved<Option<SiteSettings>> {
    self
      .accessor
      .get(SETTINGS, None)
      .await
      .map(|data| data.and_then(decode_settings))
  }

  /// Replace the settings record.
  pub async fn save_settings(&self, settings: &SiteSettings) -> Result<Resolved<Value>> {
    let payload = to_payload(settings)?;
    Ok(self.accessor.update(SETTINGS, payload).await)
  }

  /// Dashboard counters. Live only when every read was.
  pub async fn stats(&self) -> Resolved<AdminStats> {
    let bookings = self.bookings().await;
    let plans = self.plans().await;
    let messages = self.messages().await;

    let origin = [bookings.origin, plans.origin, messages.origin]
      .into_iter()
      .find(|o| *o != Origin::Remote)
      .unwrap_or(Origin::Remote);
    let stats = AdminStats::from_records(&bookings.data, &plans.data, &messages.data);

    Resolved {
      data: stats,
      origin,
      saved_at: None,
    }
  }
}

fn to_payload<T: Serialize>(draft: &T) -> Result<Value> {
  serde_json::to_value(draft).map_err(|e| eyre!("Failed to encode request body: {}", e))
}

/// Decode a collection element by element, skipping malformed records.
fn decode_list<T: DeserializeOwned>(path: &str, data: Option<Value>) -> Vec<T> {
  match data {
    Some(Value::Array(items)) => items
      .into_iter()
      .filter_map(|item| match serde_json::from_value(item) {
        Ok(record) => Some(record),
        Err(e) => {
          warn!(%path, error = %e, "Skipping malformed record");
          None
        }
      })
      .collect(),
    Some(other) => {
      warn!(%path, kind = value_kind(&other), "Expected a list");
      Vec::new()
    }
    None => Vec::new(),
  }
}

/// Settings count only when they carry a site title; the server answers `{}`
/// before anything was saved.
fn decode_settings(data: Value) -> Option<SiteSettings> {
  let has_title = data
    .get("siteTitle")
    .and_then(Value::as_str)
    .is_some_and(|t| !t.is_empty());
  if !has_title {
    return None;
  }

  serde_json::from_value(data)
    .map_err(|e| warn!(error = %e, "Malformed settings record"))
    .ok()
}

fn value_kind(value: &Value) -> &'static str {
  match value {
    Value::Null => "null",
    Value::Bool(_) => "bool",
    Value::Number(_) => "number",
    Value::String(_) => "string",
    Value::Array(_) => "array",
    Value::Object(_) => "object",
  }
}
