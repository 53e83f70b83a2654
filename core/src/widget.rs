// bookpay/src/widget.rs

//! Adapter seam for the external hosted payment widget.
//!
//! The real widget is a browser global constructed with an options object
//! and resolved through callbacks. Here it is an injected trait: `open`
//! suspends until the widget reports success, failure, or dismissal, and is
//! the single suspension/resume point of the whole purchase flow. No timeout
//! is imposed; the widget manages its own lifecycle.

use crate::error::FlowResult;
use serde::Serialize;

/// Buyer details pre-filled into the widget form.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Prefill {
  pub name: String,
  pub email: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub contact: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Theme {
  pub color: String,
}

/// Configuration handed to the widget on launch. Field names follow the
/// widget's own contract so an adapter can serialize this object verbatim.
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutOptions {
  /// Public merchant key, from configuration.
  pub key: String,
  /// Minor currency units, as reported by order initiation.
  pub amount: u64,
  pub currency: String,
  /// Merchant display name.
  pub name: String,
  pub description: String,
  /// Opaque order token minted by the backend; consumed exactly once.
  pub order_id: String,
  pub prefill: Prefill,
  pub theme: Theme,
}

/// Terminal report from the widget. Produces exactly one downstream
/// transition in the embedding flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentOutcome {
  Success {
    payment_id: String,
    order_id: String,
    signature: String,
  },
  Failure {
    code: Option<String>,
    description: Option<String>,
  },
  /// The buyer closed the widget without paying. Not an error; the dialog
  /// returns to an idle, retryable state.
  Dismissed,
}

/// The injected payment widget.
///
/// `ready` reports whether the widget runtime is actually available (the
/// hosted script may not have loaded); flows check it before launching and
/// surface a local configuration error when it is false.
#[async_trait::async_trait]
pub trait PaymentWidget: Send + Sync {
  fn ready(&self) -> bool {
    true
  }

  /// Launches the widget and suspends until it reports an outcome. An `Err`
  /// means the widget could not be launched at all (distinct from a launched
  /// widget reporting `PaymentOutcome::Failure`).
  async fn open(&self, options: CheckoutOptions) -> FlowResult<PaymentOutcome>;
}
