// bookpay/src/catalog.rs

//! Wire types for the public book listing and small display helpers.
//!
//! `GET /books/public` is unauthenticated; chapters are intentionally absent
//! from the payload, and every listed book is purchase-gated.

use serde::Deserialize;

/// Access class of a listed book. The public listing only carries paid
/// titles today; the enum leaves room for the backend to widen it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccessType {
  PaidOnly,
}

/// One purchasable book as returned by the public catalog endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicBook {
  pub book_id: String,
  pub title: String,
  #[serde(default)]
  pub description: Option<String>,
  /// Display ordering within the catalog.
  pub order: i64,
  pub access_type: AccessType,
  /// Price in minor currency units (paise).
  pub price: u64,
  pub currency: String,
  #[serde(default)]
  pub eligible_courses: Vec<String>,
  /// Needed to build a `PurchaseIntent`; absent for books not currently
  /// attached to a course.
  #[serde(default)]
  pub course_id: Option<String>,
}

/// Container object under the envelope's `data` field.
#[derive(Debug, Clone, Deserialize)]
pub struct PublicBookList {
  #[serde(default)]
  pub books: Vec<PublicBook>,
}

/// Turns a course tag like `2025_UPSC_PRELIMS` into a display name
/// (`UPSC Prelims`). The internal `PAID_USER` marker tag yields `None`;
/// tags without a year prefix pass through unchanged.
pub fn parse_course_tag(tag: &str) -> Option<String> {
  if tag == "PAID_USER" {
    return None;
  }

  let parts: Vec<&str> = tag.split('_').collect();
  if parts.len() < 2 {
    return Some(tag.to_string());
  }

  let display = parts[1..]
    .iter()
    .map(|word| {
      let mut chars = word.chars();
      match chars.next() {
        Some(first) => format!("{}{}", first, chars.as_str().to_lowercase()),
        None => String::new(),
      }
    })
    .collect::<Vec<_>>()
    .join(" ");
  Some(display)
}
