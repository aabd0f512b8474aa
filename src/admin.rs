//! Back-office helpers.

use serde::Serialize;

use crate::models::{Booking, BookingStatus, Message, Plan};

/// Dashboard counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminStats {
  pub total_bookings: usize,
  /// Bookings still awaiting review
  pub new_bookings: usize,
  pub active_plans: usize,
  pub messages: usize,
}

impl AdminStats {
  pub fn from_records(bookings: &[Booking], plans: &[Plan], messages: &[Message]) -> Self {
    Self {
      total_bookings: bookings.len(),
      new_bookings: bookings
        .iter()
        .filter(|b| b.status == BookingStatus::Pending)
        .count(),
      active_plans: plans.len(),
      messages: messages.len(),
    }
  }
}

/// Split comma-separated plan features, dropping blanks.
pub fn parse_features(input: &str) -> Vec<String> {
  input
    .split(',')
    .map(str::trim)
    .filter(|s| !s.is_empty())
    .map(String::from)
    .collect()
}
