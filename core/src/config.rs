// bookpay/src/config.rs

use crate::error::{FlowError, FlowResult};
use dotenvy::dotenv;
use std::env;

/// Default merchant display name shown in the payment widget header.
const DEFAULT_MERCHANT_NAME: &str = "Arjunas Arrow";
/// Default widget accent color.
const DEFAULT_THEME_COLOR: &str = "#667eea";

/// Client-side configuration consumed by the purchase flows.
///
/// Both the API base URL and the public widget key are hard requirements:
/// without either, no purchase attempt can proceed and loading fails with a
/// local `FlowError::Configuration`.
#[derive(Debug, Clone)]
pub struct ClientConfig {
  /// Versioned API base, normalized so it always ends with `/v1`.
  pub api_base_url: String,
  /// Public (non-secret) key identifying the merchant to the payment widget.
  pub razorpay_key_id: String,
  pub merchant_name: String,
  pub theme_color: String,
}

impl ClientConfig {
  pub fn from_env() -> FlowResult<Self> {
    dotenv().ok(); // Load .env file if present

    let get_env = |var_name: &str| {
      env::var(var_name)
        .map_err(|e| FlowError::Configuration(format!("Missing environment variable '{}': {}", var_name, e)))
    };

    let api_base_url = normalize_base_url(&get_env("BOOKPAY_API_BASE_URL")?);
    let razorpay_key_id = get_env("BOOKPAY_RAZORPAY_KEY_ID")?;
    if razorpay_key_id.trim().is_empty() {
      return Err(FlowError::Configuration(
        "BOOKPAY_RAZORPAY_KEY_ID is set but empty".to_string(),
      ));
    }
    let merchant_name = get_env("BOOKPAY_MERCHANT_NAME").unwrap_or_else(|_| DEFAULT_MERCHANT_NAME.to_string());
    let theme_color = get_env("BOOKPAY_THEME_COLOR").unwrap_or_else(|_| DEFAULT_THEME_COLOR.to_string());

    tracing::info!(api_base_url = %api_base_url, "Client configuration loaded.");

    Ok(Self {
      api_base_url,
      razorpay_key_id,
      merchant_name,
      theme_color,
    })
  }

  /// Builds a config directly; the base URL goes through the same `/v1`
  /// normalization as `from_env`.
  pub fn new(api_base_url: &str, razorpay_key_id: &str) -> Self {
    Self {
      api_base_url: normalize_base_url(api_base_url),
      razorpay_key_id: razorpay_key_id.to_string(),
      merchant_name: DEFAULT_MERCHANT_NAME.to_string(),
      theme_color: DEFAULT_THEME_COLOR.to_string(),
    }
  }

  /// Joins a path like `/purchase/initiate` onto the normalized base.
  pub fn endpoint(&self, path: &str) -> String {
    let path = path.trim_start_matches('/');
    format!("{}/{}", self.api_base_url, path)
  }
}

/// The deployed base URL is configured with or without the `/v1` version
/// suffix; endpoints must always hit `/v1/...` either way.
fn normalize_base_url(raw: &str) -> String {
  let trimmed = raw.trim_end_matches('/');
  if trimmed.ends_with("/v1") {
    trimmed.to_string()
  } else {
    format!("{}/v1", trimmed)
  }
}
