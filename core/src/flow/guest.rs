// bookpay/src/flow/guest.rs

//! Guest purchase flow: collect buyer identity, validate, initiate an order,
//! hand off to the payment widget, and map every failure to UI-visible state.
//!
//! State machine (see `PurchasePhase`):
//! Idle --submit(valid)--> Submitting --order ok--> AwaitingPayment
//! --widget success--> Succeeded; widget failure --> Failed (retryable);
//! widget dismissed --> Idle. Order failures land in Failed, except
//! backend-side field rejections which return to Idle with an inline field
//! error, and AccountExists/AlreadyOwned which also schedule a delayed login
//! redirect.

use crate::api::PurchaseApi;
use crate::config::ClientConfig;
use crate::error::{BackendErrorKind, FlowError};
use crate::flow::{AbortOnDrop, Navigator, PurchaseIntent, PurchasePhase, RedirectTarget, LOGIN_REDIRECT_DELAY};
use crate::state::StateCell;
use crate::validate::{FieldErrors, GuestForm, GuestIdentity};
use crate::widget::{CheckoutOptions, PaymentOutcome, PaymentWidget, Prefill, Theme};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Dialing code preselected in the country picker.
pub const DEFAULT_COUNTRY_CODE: &str = "+91";

/// Everything the guest dialog renders. One instance per open dialog,
/// observed through a `StateCell` handle; reset to defaults on close.
#[derive(Debug, Clone)]
pub struct GuestDialogState {
  pub phase: PurchasePhase,
  pub form: GuestForm,
  pub field_errors: FieldErrors,
  /// Non-field error banner (order initiation or payment failures).
  pub api_error: Option<String>,
  /// Set when a delayed redirect has been scheduled, so the dialog can
  /// explain the upcoming navigation.
  pub pending_redirect: Option<RedirectTarget>,
}

impl Default for GuestDialogState {
  fn default() -> Self {
    Self {
      phase: PurchasePhase::Idle,
      form: GuestForm {
        country_code: DEFAULT_COUNTRY_CODE.to_string(),
        ..GuestForm::default()
      },
      field_errors: FieldErrors::default(),
      api_error: None,
      pending_redirect: None,
    }
  }
}

/// Controller for one guest purchase dialog.
pub struct GuestPurchaseFlow {
  intent: PurchaseIntent,
  config: Arc<ClientConfig>,
  api: Arc<dyn PurchaseApi>,
  widget: Arc<dyn PaymentWidget>,
  navigator: Arc<dyn Navigator>,
  state: StateCell<GuestDialogState>,
  /// Pending login redirect, aborted on close/drop.
  redirect_task: Mutex<Option<AbortOnDrop>>,
}

impl GuestPurchaseFlow {
  pub fn new(
    intent: PurchaseIntent,
    config: Arc<ClientConfig>,
    api: Arc<dyn PurchaseApi>,
    widget: Arc<dyn PaymentWidget>,
    navigator: Arc<dyn Navigator>,
  ) -> Self {
    Self {
      intent,
      config,
      api,
      widget,
      navigator,
      state: StateCell::default(),
      redirect_task: Mutex::new(None),
    }
  }

  /// Shared handle to the dialog state for rendering.
  pub fn state(&self) -> StateCell<GuestDialogState> {
    self.state.clone()
  }

  pub fn set_name(&self, value: &str) {
    let mut guard = self.state.write();
    guard.form.name = value.to_string();
    guard.field_errors.name = None;
  }

  pub fn set_email(&self, value: &str) {
    let mut guard = self.state.write();
    guard.form.email = value.to_string();
    guard.field_errors.email = None;
  }

  pub fn set_country_code(&self, value: &str) {
    let mut guard = self.state.write();
    guard.form.country_code = value.to_string();
    guard.field_errors.mobile = None;
  }

  /// Only digits reach the form state; everything else is stripped, matching
  /// the dialog's input filter.
  pub fn set_mobile(&self, value: &str) {
    let digits: String = value.chars().filter(|c| c.is_ascii_digit()).collect();
    let mut guard = self.state.write();
    guard.form.mobile = digits;
    guard.field_errors.mobile = None;
  }

  /// Drives one full purchase attempt: validation, order initiation, widget
  /// handoff, outcome mapping. Errors never escape; they are folded into the
  /// dialog state, and the phase after the attempt is returned.
  #[instrument(skip(self), fields(book_id = %self.intent.book_id))]
  pub async fn submit(&self) -> PurchasePhase {
    // Gate + validate under one write lock so two submits cannot both pass
    // (at most one outstanding order per intent).
    let identity = {
      let mut guard = self.state.write();
      if !guard.phase.accepts_submit() {
        warn!(phase = ?guard.phase, "submit refused: attempt already in flight");
        return guard.phase.clone();
      }

      guard.api_error = None;
      match guard.form.validate() {
        Ok(identity) => {
          guard.field_errors = FieldErrors::default();
          guard.pending_redirect = None;
          guard.phase = PurchasePhase::Submitting;
          identity
        }
        Err(errors) => {
          info!(?errors, "guest form failed validation");
          guard.field_errors = errors;
          guard.phase = PurchasePhase::Idle;
          return guard.phase.clone();
        }
      }
    };
    self.cancel_redirect();

    match self.api.initiate_guest(&self.intent, &identity).await {
      Ok(credentials) => self.launch_widget(&identity, credentials.external_order_id, credentials.amount_minor).await,
      Err(err) => self.fail_submit(err),
    }

    self.state.read().phase.clone()
  }

  /// Close request from the user. Refused while an attempt is in flight;
  /// otherwise the dialog resets completely so reopening starts from Idle.
  pub fn close(&self) -> bool {
    {
      let guard = self.state.read();
      if guard.phase.blocks_close() {
        warn!(phase = ?guard.phase, "close ignored while attempt in flight");
        return false;
      }
    }
    self.cancel_redirect();
    *self.state.write() = GuestDialogState::default();
    true
  }

  /// Maps an order initiation failure onto dialog state. Field-level backend
  /// rejections return to Idle with an inline error; account conflicts
  /// schedule the login redirect.
  fn fail_submit(&self, err: FlowError) {
    let mut guard = self.state.write();
    match err {
      FlowError::Backend {
        kind: BackendErrorKind::AccountExists,
        ..
      } => {
        guard.phase = PurchasePhase::Failed {
          message: "An account with this email already exists. Please login instead.".to_string(),
        };
        guard.api_error = Some("An account with this email already exists. Please login instead.".to_string());
        guard.pending_redirect = Some(RedirectTarget::Login);
        drop(guard);
        self.schedule_login_redirect();
      }
      FlowError::Backend {
        kind: BackendErrorKind::AlreadyOwned,
        ..
      } => {
        guard.phase = PurchasePhase::Failed {
          message: "You already own this book. Please login to access it.".to_string(),
        };
        guard.api_error = Some("You already own this book. Please login to access it.".to_string());
        guard.pending_redirect = Some(RedirectTarget::Login);
        drop(guard);
        self.schedule_login_redirect();
      }
      FlowError::Backend {
        kind: BackendErrorKind::InvalidEmail,
        ..
      } => {
        guard.field_errors.email = Some("Invalid email format".to_string());
        guard.phase = PurchasePhase::Idle;
      }
      FlowError::Backend {
        kind: BackendErrorKind::InvalidPhoneFormat,
        ..
      } => {
        guard.field_errors.mobile = Some("Mobile number must be in E.164 format".to_string());
        guard.phase = PurchasePhase::Idle;
      }
      FlowError::Backend {
        kind: BackendErrorKind::BookNotFound,
        ..
      } => {
        let message = "Book not found or unavailable".to_string();
        guard.api_error = Some(message.clone());
        guard.phase = PurchasePhase::Failed { message };
      }
      FlowError::Backend { message, .. } if !message.is_empty() => {
        guard.api_error = Some(message.clone());
        guard.phase = PurchasePhase::Failed { message };
      }
      other => {
        warn!(error = %other, "order initiation failed");
        let message = "Failed to initiate purchase. Please try again.".to_string();
        guard.api_error = Some(message.clone());
        guard.phase = PurchasePhase::Failed { message };
      }
    }
  }

  /// Launches the widget with the freshly minted order credentials and folds
  /// the outcome back into dialog state. Precondition failures are local
  /// configuration errors; the already-created pending order is left to the
  /// backend's expiry policy.
  async fn launch_widget(&self, identity: &GuestIdentity, external_order_id: String, amount_minor: u64) {
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
        name: identity.name.clone(),
        email: identity.email.clone(),
        contact: identity.mobile_e164.clone(),
      },
      theme: Theme {
        color: self.config.theme_color.clone(),
      },
    };

    self.state.write().phase = PurchasePhase::AwaitingPayment;
    info!(order_id = %options.order_id, "handing off to payment widget");

    match self.widget.open(options).await {
      Ok(PaymentOutcome::Success { payment_id, .. }) => {
        info!(%payment_id, "guest payment succeeded");
        self.state.write().phase = PurchasePhase::Succeeded;
      }
      Ok(PaymentOutcome::Failure { description, .. }) => {
        let message = description.unwrap_or_else(|| "Payment failed. Please try again.".to_string());
        warn!(%message, "guest payment failed");
        self.fail_payment(&message);
      }
      Ok(PaymentOutcome::Dismissed) => {
        // Not an error; the buyer may retry from a clean slate.
        info!("payment widget dismissed");
        let mut guard = self.state.write();
        guard.phase = PurchasePhase::Idle;
        guard.api_error = None;
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

  /// Spawns the delayed login navigation for account-conflict rejections.
  /// Owned by the flow; `close()`/drop aborts it before it can fire.
  fn schedule_login_redirect(&self) {
    let navigator = Arc::clone(&self.navigator);
    let handle = tokio::spawn(async move {
      tokio::time::sleep(LOGIN_REDIRECT_DELAY).await;
      info!("redirecting guest to login");
      navigator.go(RedirectTarget::Login);
    });
    *self.redirect_task.lock() = Some(AbortOnDrop(handle));
  }

  fn cancel_redirect(&self) {
    // Dropping the guard aborts the task.
    self.redirect_task.lock().take();
  }
}
