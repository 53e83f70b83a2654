// bookpay/src/validate.rs

//! Pure field validators for the guest purchase form.
//!
//! Every function here is side-effect free and returns either `Ok(())` or a
//! human-readable message suitable for inline display next to the field.
//! Aggregation into a submit-ready `GuestIdentity` happens through
//! `GuestForm::validate`.

use once_cell::sync::Lazy;
use regex::Regex;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

static E164_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\+[1-9]\d{1,14}$").expect("valid E.164 regex"));

/// A national-number rule for one dialing code.
struct PhoneRule {
  country_code: &'static str,
  pattern: Lazy<Regex>,
  message: &'static str,
}

macro_rules! phone_rule {
  ($code:literal, $re:literal, $msg:literal) => {
    PhoneRule {
      country_code: $code,
      pattern: Lazy::new(|| Regex::new($re).expect("valid phone regex")),
      message: $msg,
    }
  };
}

/// Per-country national-number patterns keyed by dialing code. Codes without
/// an entry fall back to `DEFAULT_PHONE_RULE`.
static PHONE_RULES: [PhoneRule; 6] = [
  phone_rule!("+91", r"^[6-9]\d{9}$", "Enter a valid 10-digit Indian mobile number"),
  phone_rule!("+1", r"^[2-9]\d{9}$", "Enter a valid 10-digit US/Canada number"),
  phone_rule!("+44", r"^7\d{9}$", "Enter a valid UK mobile number"),
  phone_rule!("+61", r"^4\d{8}$", "Enter a valid Australian mobile number"),
  phone_rule!("+971", r"^5\d{8}$", "Enter a valid UAE mobile number"),
  phone_rule!("+65", r"^[89]\d{7}$", "Enter a valid Singapore mobile number"),
];

static DEFAULT_PHONE_RULE: PhoneRule = phone_rule!("", r"^\d{4,14}$", "Enter a valid mobile number");

/// Name must be at least 2 characters once trimmed.
pub fn validate_name(raw: &str) -> Result<(), String> {
  if raw.trim().chars().count() < 2 {
    return Err("Name must be at least 2 characters".to_string());
  }
  Ok(())
}

/// Simple `local@domain.tld` shape; the backend performs the authoritative
/// check and can still reject with `InvalidEmail`.
pub fn validate_email(raw: &str) -> Result<(), String> {
  if raw.is_empty() || !EMAIL_RE.is_match(raw) {
    return Err("Invalid email format".to_string());
  }
  Ok(())
}

/// Mobile is optional: an empty national number is valid. A non-empty one is
/// checked against the rule for the selected dialing code, falling back to a
/// generic digit-length rule for codes without a dedicated entry.
pub fn validate_mobile(national: &str, country_code: &str) -> Result<(), String> {
  let national = national.trim();
  if national.is_empty() {
    return Ok(());
  }

  let rule = PHONE_RULES
    .iter()
    .find(|r| r.country_code == country_code)
    .unwrap_or(&DEFAULT_PHONE_RULE);

  if !rule.pattern.is_match(national) {
    return Err(rule.message.to_string());
  }
  Ok(())
}

/// Concatenates dialing code and national number into the E.164 candidate
/// submitted to the backend. No validation happens here; see `validate_e164`.
pub fn compose_e164(country_code: &str, national: &str) -> String {
  format!("{}{}", country_code, national.trim())
}

/// Full E.164 shape check: `+[1-9]` followed by 1 to 14 digits.
pub fn validate_e164(full: &str) -> Result<(), String> {
  if !E164_RE.is_match(full) {
    return Err("Mobile must be in E.164 format (e.g., +919876543210)".to_string());
  }
  Ok(())
}

/// Raw guest form fields as typed into the dialog.
#[derive(Debug, Clone, Default)]
pub struct GuestForm {
  pub name: String,
  pub email: String,
  /// Dialing code selected in the country picker, e.g. `+91`.
  pub country_code: String,
  /// National number without the dialing code.
  pub mobile: String,
}

/// Per-field error messages for inline display. `None` means the field
/// passed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
  pub name: Option<String>,
  pub email: Option<String>,
  pub mobile: Option<String>,
}

impl FieldErrors {
  pub fn is_empty(&self) -> bool {
    self.name.is_none() && self.email.is_none() && self.mobile.is_none()
  }
}

/// Validated buyer identity, ready for submission. Name is trimmed, email is
/// trimmed and lowercased, and the mobile (when present) is a checked E.164
/// string. Never persisted beyond the dialog's lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuestIdentity {
  pub name: String,
  pub email: String,
  pub mobile_e164: Option<String>,
}

impl GuestForm {
  /// Validates every field (the dialog shows all failures at once, not just
  /// the first) and produces the normalized identity on success.
  pub fn validate(&self) -> Result<GuestIdentity, FieldErrors> {
    let mut errors = FieldErrors::default();

    if let Err(msg) = validate_name(&self.name) {
      errors.name = Some(msg);
    }
    if let Err(msg) = validate_email(&self.email) {
      errors.email = Some(msg);
    }
    if let Err(msg) = validate_mobile(&self.mobile, &self.country_code) {
      errors.mobile = Some(msg);
    }

    // The composed number must independently satisfy E.164 even when the
    // per-country rule passed (e.g. an over-long dialing code).
    let mut mobile_e164 = None;
    if errors.mobile.is_none() && !self.mobile.trim().is_empty() {
      let full = compose_e164(&self.country_code, &self.mobile);
      match validate_e164(&full) {
        Ok(()) => mobile_e164 = Some(full),
        Err(msg) => errors.mobile = Some(msg),
      }
    }

    if !errors.is_empty() {
      return Err(errors);
    }

    Ok(GuestIdentity {
      name: self.name.trim().to_string(),
      email: self.email.trim().to_lowercase(),
      mobile_e164,
    })
  }
}
