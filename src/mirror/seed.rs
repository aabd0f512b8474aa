//! Built-in datasets served for known paths before anything has been mirrored.

use chrono::Local;
use serde_json::{json, Value};

const TERMS_TEMPLATE: &str = r#"**TERMS OF SERVICE & USER AGREEMENT**
*Last Updated: {date}*

**1. NATURE OF SERVICE (STRICTLY PLATONIC)**
The King Play Elite ("The Service") operates strictly as a premium social concierge and event companionship agency.
WARNING: This Service strictly adheres to the **Immoral Traffic (Prevention) Act, 1956**.
- We DO NOT offer, facilitate, or tolerate prostitution, escort services of a sexual nature, or any form of human trafficking.
- Any client found soliciting sexual favors, engaging in inappropriate touching, or making lewd remarks will be immediately blacklisted, and their information may be reported to Cyber Crime authorities under Section 67 of the IT Act, 2000.

**2. AGE RESTRICTION**
You must be at least 18 years of age (Majority Act, 1875) to access this website or book a companion. We reserve the right to demand government-issued photo ID (Aadhar/Passport) for age verification (KYC).

**3. BOOKING & CANCELLATION**
- All bookings are for "Time and Companionship" only.
- Payment is for the companion's time, social etiquette, and conversation.
- We reserve the right to cancel any booking without refund if the client appears intoxicated, aggressive, or suspicious.

**4. SAFETY & CONDUCT**
- Meetings must take place in public or semi-public venues (Restaurants, Events, Hotels with security).
- Closed-door private residence meetings are subject to strict vetting.
- Our companions have the right to leave immediately if they feel unsafe.

**5. LIMITATION OF LIABILITY**
The Service acts as an aggregator/agency. While we vet our companions, we are not liable for personal disputes arising during the meeting.

**6. JURISDICTION**
These terms are governed by the laws of India. Any disputes are subject to the exclusive jurisdiction of the courts in Mumbai, India.
"#;

const PRIVACY_TEMPLATE: &str = r#"**PRIVACY POLICY**
*Effective Date: {date}*

**1. COMPLIANCE WITH DPDP ACT, 2023**
The King Play Elite is committed to protecting your privacy in accordance with India's Digital Personal Data Protection Act, 2023.

**2. DATA WE COLLECT**
- Name, Phone Number, and Email for booking coordination.
- Government ID (KYC) for safety verification (stored offline and encrypted).
- We do NOT store credit card details; all payments are processed via third-party secure gateways.

**3. HOW WE USE YOUR DATA**
- To facilitate the reservation.
- To ensure the safety of our social companions.
- To comply with legal requests from Indian Law Enforcement Agencies if a crime is reported.

**4. DATA SECURITY (OFFLINE STORAGE)**
- Unlike other platforms, your detailed booking data is primarily stored in offline Excel databases to prevent cloud leaks.
- We use 256-bit SSL encryption for data transmission.

**5. DELETION REQUESTS**
You have the "Right to be Forgotten." You may request the deletion of your personal data after your booking is complete by contacting our Concierge.

**6. THIRD-PARTY DISCLOSURE**
We do not sell, trade, or transfer your PII (Personally Identifiable Information) to outside parties unless required by a court order.
"#;

/// Paths that have a built-in dataset.
pub const SEEDED_PATHS: &[&str] = &["/plans", "/offers", "/settings", "/bookings", "/messages"];

/// Get a fresh copy of the built-in dataset for a path.
pub fn seed_for(path: &str) -> Option<Value> {
  let value = match path {
    "/plans" => plans(),
    "/offers" => json!([
      {
        "id": 1,
        "title": "Welcome Offer",
        "description": "Receive 10% off your first booking.",
        "isActive": true
      }
    ]),
    "/settings" => settings(),
    "/bookings" | "/messages" => json!([]),
    _ => return None,
  };
  Some(value)
}

fn plans() -> Value {
  json!([
    {
      "id": "basic",
      "name": "The Twilight Spark",
      "price": "₹2,999",
      "duration": "2 Hours",
      "features": [
        "Stimulating Conversation",
        "Coffee or Cocktail Date",
        "Safe & Secure Company",
        "Social Etiquette Expert"
      ],
      "isPopular": false,
      "description": "A perfect choice for social gatherings or a relaxed evening of conversation."
    },
    {
      "id": "premium",
      "name": "Moonlight Social",
      "price": "₹5,999",
      "duration": "5 Hours",
      "features": [
        "Dinner Companion",
        "Event Partner",
        "Chauffeur Driven Entry",
        "Formal Attire",
        "Undivided Attention"
      ],
      "isPopular": true,
      "description": "Ideal for weddings, parties, or formal dinners where you need a charming plus-one."
    },
    {
      "id": "vip",
      "name": "The Royal Affair",
      "price": "₹14,999",
      "duration": "Full Day",
      "features": [
        "City Tour Guide",
        "VIP Event Companion",
        "5-Star Hospitality",
        "Corporate Social Partner",
        "Dedicated Concierge Manager"
      ],
      "isPopular": false,
      "description": "The ultimate platonic companionship experience for full-day events or city exploration."
    }
  ])
}

fn settings() -> Value {
  let today = Local::now().format("%d/%m/%Y").to_string();

  json!({
    "siteTitle": "The King Play Elite",
    "termsContent": TERMS_TEMPLATE.replace("{date}", &today),
    "privacyPolicyContent": PRIVACY_TEMPLATE.replace("{date}", &today),
    "disclaimerText": "Strictly 18+ Adults Only. 100% Platonic Social Companionship Service.",
    "disclaimerPages": ["/", "/booking", "/plans"],
    "ageGateEnabled": true,
    "ageGateTitle": "Legal Compliance Check",
    "ageGateContent": "This website offers Platonic Social Companionship services. By entering, you confirm you are 18+ and NOT seeking illegal services prohibited under the Immoral Traffic (Prevention) Act."
  })
}
