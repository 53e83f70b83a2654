// bookpay/src/flow/auth.rs

//! Authenticated purchase flow: same protocol as the guest flow minus
//! identity collection. Submit is login-gated; the gate is defensive, since
//! the purchase entry point is normally only rendered for signed-in users.

use crate::api::{AuthSession, PurchaseApi};
use crate::config::ClientConfig;
use crate::error::{BackendErrorKind, FlowError};
use crate::flow::{PurchaseIntent, PurchasePhase};
use crate::state::StateCell;
use crate::widget::{CheckoutOptions, PaymentOutcome, PaymentWidget, Prefill, Theme};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Identity/session seam (Cognito-style provider). `None` means no signed-in
/// user.
pub trait SessionProvider: Send + Sync {
  fn current_session(&self) -> Option<AuthSession>;
}

/// State behind the authenticated purchase button.
#[derive(Debug, Clone, Default)]
pub struct AuthDialogState {
  pub phase: PurchasePhase,
  /// Informational banner (auth-required, payment cancelled). Not an error.
  pub notice: Option<String>,
  pub api_error: Option<String>,
}

/// Controller for one authenticated purchase attempt.
pub struct AuthPurchaseFlow {
  intent: PurchaseIntent,
  config: Arc<ClientConfig>,
  api: Arc<dyn PurchaseApi>,
  widget: Arc<dyn PaymentWidget>,
  sessions: Arc<dyn SessionProvider>,
  state: StateCell<AuthDialogState>,
}

impl AuthPurchaseFlow {
  pub fn new(
    intent: PurchaseIntent,
    config: Arc<ClientConfig>,
    api: Arc<dyn PurchaseApi>,
    widget: Arc<dyn PaymentWidget>,
    sessions: Arc<dyn SessionProvider>,
  ) -> Self {
    Self {
      intent,
      config,
      api,
      widget,
      sessions,
      state: StateCell::default(),
    }
  }

  pub fn state(&self) -> StateCell<AuthDialogState> {
    self.state.clone()
  }

  /// One full purchase attempt. Refused without a session; otherwise the
  /// guest protocol applies, with prefill drawn from the session.
  #[instrument(skip(self), fields(book_id = %self.intent.book_id))]
  pub async fn submit(&self) -> PurchasePhase {
    let session = match self.sessions.current_session() {
      Some(session) => session,
      None => {
        warn!("submit refused: no signed-in session");
        let mut guard = self.state.write();
        guard.notice = Some("Please login to purchase".to_string());
        return guard.phase.clone();
      }
    };

    {
      let mut guard = self.state.write();
      if !guard.phase.accepts_submit() {
        warn!(phase = ?guard.phase, "submit refused: attempt already in flight");
        return guard.phase.clone();
      }
      guard.notice = None;
      guard.api_error = None;
      guard.phase = PurchasePhase::Submitting;
    }

    match self.api.initiate(&self.intent, &session).await {
      Ok(credentials) => {
        self
          .launch_widget(&session, credentials.external_order_id, credentials.amount_minor)
          .await
      }
      Err(err) => self.fail_submit(err),
    }

    self.state.read().phase.clone()
  }

  /// Close/reset. Refused while an attempt is in flight.
  pub fn close(&self) -> bool {
    {
      let guard = self.state.read();
      if guard.phase.blocks_close() {
        warn!(phase = ?guard.phase, "close ignored while attempt in flight");
        return false;
      }
    }
    *self.state.write() = AuthDialogState::default();
    true
  }

  fn fail_submit(&self, err: FlowError) {
    let message = match &err {
      FlowError::Backend {
        kind: BackendErrorKind::AlreadyOwned,
        ..
      } => "You already own this book".to_string(),
      FlowError::Backend {
        kind: BackendErrorKind::BookNotFound,
        ..
      } => "Book not found or unavailable".to_string(),
      FlowError::Backend { message, .. } if !message.is_empty() => message.clone(),
      _ => "Failed to initiate purchase. Please try again.".to_string(),
    };
    warn!(error = %err, "order initiation failed");
    let mut guard = self.state.write();
    guard.api_error = Some(message.clone());
    guard.phase = PurchasePhase::Failed { message };
  }

  async fn launch_widget(&self, session: &AuthSession, external_order_id: String, amount_minor: u64) {
    if !self.widget.ready() {
      self.fail_payment("Payment system not loaded. Please refresh the page.");
      return;
    }
    if self.config.razorpay_key_id.trim().is_empty() {
      self.fail_payment("Payment configuration error. Please contact support.");
      return;
    }

    let options = CheckoutOptions {
      key: self.config.razorpay_key_id.clone(),
      amount: amount_minor,
      currency: "INR".to_string(),
      name: self.config.merchant_name.clone(),
      description: format!("Purchase: {}", self.intent.book_title),
      order_id: external_order_id,
      prefill: Prefill {
        // The session username doubles as the email address.
        name: session.email.clone(),
        email: session.email.clone(),
        contact: None,
      },
      theme: Theme {
        color: self.config.theme_color.clone(),
      },
    };

    self.state.write().phase = PurchasePhase::AwaitingPayment;
    info!(order_id = %options.order_id, "handing off to payment widget");

    match self.widget.open(options).await {
      Ok(PaymentOutcome::Success { payment_id, .. }) => {
        info!(%payment_id, "payment succeeded");
        self.state.write().phase = PurchasePhase::Succeeded;
      }
      Ok(PaymentOutcome::Failure { description, .. }) => {
        let message = description.unwrap_or_else(|| "Payment failed. Please try again.".to_string());
        warn!(%message, "payment failed");
        self.fail_payment(&message);
      }
      Ok(PaymentOutcome::Dismissed) => {
        info!("payment widget dismissed");
        let mut guard = self.state.write();
        guard.phase = PurchasePhase::Idle;
        guard.notice = Some("Payment cancelled".to_string());
      }
      Err(FlowError::Configuration(message)) => {
        warn!(%message, "widget launch failed");
        self.fail_payment(&message);
      }
      Err(err) => {
        warn!(error = %err, "widget launch failed");
        self.fail_payment("Failed to open payment modal. Please try again.");
      }
    }
  }

  fn fail_payment(&self, message: &str) {
    let mut guard = self.state.write();
    guard.api_error = Some(message.to_string());
    guard.phase = PurchasePhase::Failed {
      message: message.to_string(),
    };
  }
}
