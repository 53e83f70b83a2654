// bookpay/src/error.rs

use thiserror::Error;

/// Semantic classification of a business rejection reported by the backend.
///
/// The backend is expected to send a structured `error.code`; when it only
/// sends free text (the legacy wording), `api::classify_backend_error` falls
/// back to substring matching on the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendErrorKind {
  /// An account already exists for the submitted guest email.
  AccountExists,
  /// The buyer already owns this book.
  AlreadyOwned,
  /// The backend rejected the email shape.
  InvalidEmail,
  /// The backend rejected the mobile number (E.164 expected).
  InvalidPhoneFormat,
  /// Unknown or unavailable book.
  BookNotFound,
  /// Anything the client cannot classify.
  Other,
}

/// Which form field a validation error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
  Name,
  Email,
  Mobile,
}

#[derive(Debug, Error)]
pub enum FlowError {
  /// Local, field-level, recoverable by user edit.
  #[error("Validation failed for {field:?}: {message}")]
  Validation { field: Field, message: String },

  /// Missing environment/widget prerequisites. Fatal to the current attempt,
  /// never retried automatically and never forwarded to the backend.
  #[error("Configuration error: {0}")]
  Configuration(String),

  /// Network or HTTP-level failure. Retryable via a fresh user submit.
  #[error("Transport error: {0}")]
  Transport(String),

  /// Structured business rejection from the order service.
  #[error("Backend rejected the request: {message}")]
  Backend { kind: BackendErrorKind, message: String },

  /// Widget-reported payment failure. The flow returns to a retryable state.
  #[error("Payment failed: {message}")]
  Payment { code: Option<String>, message: String },

  /// Error raised inside an injected adapter (widget implementation or a
  /// custom `PurchaseApi`).
  #[error("Adapter error: {source}")]
  Adapter {
    #[source]
    source: anyhow::Error,
  },
}

impl From<reqwest::Error> for FlowError {
  fn from(err: reqwest::Error) -> Self {
    // Status-carrying errors still count as transport here; business
    // rejections are decoded from the envelope before this conversion runs.
    FlowError::Transport(err.to_string())
  }
}

impl From<anyhow::Error> for FlowError {
  fn from(err: anyhow::Error) -> Self {
    FlowError::Adapter { source: err }
  }
}

pub type FlowResult<T, E = FlowError> = std::result::Result<T, E>;
