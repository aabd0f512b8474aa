//! Booking form rules: age check, location lookup, payload assembly.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use thiserror::Error;

use crate::models::{BookingStatus, Plan, RecordId};

/// Minimum customer age.
pub const MIN_AGE: u32 = 18;

/// Plan name recorded when the selected plan no longer exists.
pub const CUSTOM_PLAN_NAME: &str = "Custom";

/// Serviceable states and their cities.
pub const STATE_CITIES: &[(&str, &[&str])] = &[
  ("Maharashtra", &["Mumbai", "Pune", "Nagpur", "Nashik"]),
  ("Delhi", &["New Delhi", "North Delhi", "South Delhi"]),
  ("Karnataka", &["Bangalore", "Mysore", "Hubli"]),
  ("Telangana", &["Hyderabad", "Warangal"]),
  ("Tamil Nadu", &["Chennai", "Coimbatore", "Madurai"]),
  ("West Bengal", &["Kolkata", "Howrah"]),
  ("Gujarat", &["Ahmedabad", "Surat", "Vadodara"]),
  ("Rajasthan", &["Jaipur", "Udaipur", "Jodhpur"]),
  ("Goa", &["Panaji", "Margao", "Calangute"]),
];

/// Cities served in a state.
pub fn cities_for(state: &str) -> Option<&'static [&'static str]> {
  STATE_CITIES
    .iter()
    .find(|(name, _)| *name == state)
    .map(|(_, cities)| *cities)
}

/// Full years between `dob` and `today`; negative for future dates.
pub fn age_on(dob: NaiveDate, today: NaiveDate) -> i32 {
  let mut age = today.year() - dob.year();
  if (today.month(), today.day()) < (dob.month(), dob.day()) {
    age -= 1;
  }
  age
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BookingFormError {
  #[error("{0} is required")]
  MissingField(&'static str),

  #[error("invalid date of birth '{0}', expected YYYY-MM-DD")]
  InvalidDob(String),

  #[error("customers must be at least 18 years old (got {0})")]
  Underage(i32),

  #[error("we do not serve {0} yet")]
  UnknownState(String),

  #[error("{city} is not a served city in {state}")]
  UnknownCity { state: String, city: String },

  #[error("the legal compliance statement must be accepted")]
  LegalNotAccepted,
}

/// Booking form as filled in by a customer.
#[derive(Debug, Clone, Default)]
pub struct BookingForm {
  pub full_name: String,
  pub phone: String,
  pub email: String,
  /// YYYY-MM-DD
  pub dob: String,
  pub state: String,
  pub city: String,
  pub address: String,
  pub time: String,
  pub plan_id: String,
  pub special_requirements: String,
  pub agreed_to_legal: bool,
}

impl BookingForm {
  /// Customer's age on `today`.
  pub fn age(&self, today: NaiveDate) -> Result<i32, BookingFormError> {
    let dob = NaiveDate::parse_from_str(self.dob.trim(), "%Y-%m-%d")
      .map_err(|_| BookingFormError::InvalidDob(self.dob.clone()))?;
    Ok(age_on(dob, today))
  }

  /// Step 1: contact details and age.
  pub fn check_personal(&self, today: NaiveDate) -> Result<u32, BookingFormError> {
    require("full name", &self.full_name)?;
    require("phone", &self.phone)?;
    require("email", &self.email)?;
    require("date of birth", &self.dob)?;

    let age = self.age(today)?;
    match u32::try_from(age) {
      Ok(age) if age >= MIN_AGE => Ok(age),
      _ => Err(BookingFormError::Underage(age)),
    }
  }

  /// Step 2: location and plan selection.
  pub fn check_location(&self) -> Result<(), BookingFormError> {
    require("state", &self.state)?;
    require("city", &self.city)?;
    require("address", &self.address)?;
    require("plan", &self.plan_id)?;

    let cities =
      cities_for(&self.state).ok_or_else(|| BookingFormError::UnknownState(self.state.clone()))?;
    if !cities.contains(&self.city.as_str()) {
      return Err(BookingFormError::UnknownCity {
        state: self.state.clone(),
        city: self.city.clone(),
      });
    }
    Ok(())
  }

  /// Validate every step and build the payload sent to `/bookings`.
  ///
  /// The plan is recorded by name; an id that matches no plan is booked as
  /// [`CUSTOM_PLAN_NAME`].
  pub fn into_payload(
    self,
    plans: &[Plan],
    today: NaiveDate,
  ) -> Result<BookingPayload, BookingFormError> {
    let age = self.check_personal(today)?;
    self.check_location()?;
    if !self.agreed_to_legal {
      return Err(BookingFormError::LegalNotAccepted);
    }

    let selected: RecordId = self.plan_id.parse().unwrap_or_else(|e| match e {});
    let plan = plans
      .iter()
      .find(|p| p.id.matches(&selected))
      .map(|p| p.name.clone())
      .unwrap_or_else(|| CUSTOM_PLAN_NAME.to_string());

    Ok(BookingPayload {
      customer_name: self.full_name,
      phone: self.phone,
      email: self.email,
      dob: self.dob,
      age,
      state: self.state,
      city: self.city,
      address: self.address,
      time: self.time,
      plan,
      special_requirements: self.special_requirements,
      agreed_to_legal: true,
      status: BookingStatus::Pending,
      date: today.format("%Y-%m-%d").to_string(),
    })
  }
}

fn require(field: &'static str, value: &str) -> Result<(), BookingFormError> {
  if value.trim().is_empty() {
    Err(BookingFormError::MissingField(field))
  } else {
    Ok(())
  }
}

/// Validated booking as posted to the API.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingPayload {
  pub customer_name: String,
  pub phone: String,
  pub email: String,
  pub dob: String,
  pub age: u32,
  pub state: String,
  pub city: String,
  pub address: String,
  pub time: String,
  pub plan: String,
  pub special_requirements: String,
  pub agreed_to_legal: bool,
  pub status: BookingStatus,
  pub date: String,
}

#[cfg(test)]
mod tests {
  use super::*;

  fn day(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
  }

  fn filled_form() -> BookingForm {
    BookingForm {
      full_name: "Riya Sharma".into(),
      phone: "9876543210".into(),
      email: "riya@example.com".into(),
      dob: "1995-08-20".into(),
      state: "Maharashtra".into(),
      city: "Pune".into(),
      address: "Hotel Lotus, FC Road".into(),
      time: "19:30".into(),
      plan_id: "premium".into(),
      special_requirements: String::new(),
      agreed_to_legal: true,
    }
  }

  fn plans() -> Vec<Plan> {
    serde_json::from_value(crate::mirror::seed_for("/plans").unwrap()).unwrap()
  }

  #[test]
  fn test_age_counts_birthday_not_yet_reached() {
    assert_eq!(age_on(day("2000-06-15"), day("2018-06-14")), 17);
    assert_eq!(age_on(day("2000-06-15"), day("2018-06-15")), 18);
    assert_eq!(age_on(day("2000-06-15"), day("2018-07-01")), 18);
  }

  #[test]
  fn test_underage_rejected() {
    let form = BookingForm {
      dob: "2010-01-01".into(),
      ..filled_form()
    };
    assert_eq!(
      form.check_personal(day("2026-01-01")),
      Err(BookingFormError::Underage(16))
    );
  }

  #[test]
  fn test_missing_field_reported_in_order() {
    let form = BookingForm {
      phone: "  ".into(),
      email: String::new(),
      ..filled_form()
    };
    assert_eq!(
      form.check_personal(day("2026-01-01")),
      Err(BookingFormError::MissingField("phone"))
    );
  }

  #[test]
  fn test_bad_dob() {
    let form = BookingForm {
      dob: "20/08/1995".into(),
      ..filled_form()
    };
    assert!(matches!(
      form.check_personal(day("2026-01-01")),
      Err(BookingFormError::InvalidDob(_))
    ));
  }

  #[test]
  fn test_city_must_belong_to_state() {
    let form = BookingForm {
      city: "Chennai".into(),
      ..filled_form()
    };
    assert!(matches!(
      form.check_location(),
      Err(BookingFormError::UnknownCity { .. })
    ));

    let form = BookingForm {
      state: "Atlantis".into(),
      ..filled_form()
    };
    assert_eq!(
      form.check_location(),
      Err(BookingFormError::UnknownState("Atlantis".into()))
    );
  }

  #[test]
  fn test_legal_agreement_required() {
    let form = BookingForm {
      agreed_to_legal: false,
      ..filled_form()
    };
    assert_eq!(
      form.into_payload(&plans(), day("2026-10-16")),
      Err(BookingFormError::LegalNotAccepted)
    );
  }

  #[test]
  fn test_payload_records_plan_name() {
    let payload = filled_form()
      .into_payload(&plans(), day("2026-10-16"))
      .unwrap();

    assert_eq!(payload.plan, "Moonlight Social");
    assert_eq!(payload.age, 31);
    assert_eq!(payload.status, BookingStatus::Pending);
    assert_eq!(payload.date, "2026-10-16");

    let json = serde_json::to_value(&payload).unwrap();
    assert_eq!(json["customerName"], "Riya Sharma");
    assert_eq!(json["agreedToLegal"], true);
    assert_eq!(json["status"], "Pending");
  }

  #[test]
  fn test_unknown_plan_booked_as_custom() {
    let form = BookingForm {
      plan_id: "1700000000000".into(),
      ..filled_form()
    };
    let payload = form.into_payload(&plans(), day("2026-10-16")).unwrap();
    assert_eq!(payload.plan, CUSTOM_PLAN_NAME);
  }

  #[test]
  fn test_cities_lookup() {
    assert_eq!(cities_for("Goa").unwrap().len(), 3);
    assert!(cities_for("goa").is_none());
  }
}
