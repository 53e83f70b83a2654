// bookpay/src/flow/mod.rs

//! The purchase flow state machines and the types they share.
//!
//! A flow mediates between a buyer (guest or authenticated), the backend
//! order-initiation API, and the external payment widget. One flow instance
//! backs one open dialog; its state is observable through a `StateCell`
//! handle and is destroyed with the dialog.

pub mod auth;
pub mod guest;

use std::time::Duration;

/// How long a backend `AccountExists`/`AlreadyOwned` rejection waits before
/// redirecting the guest to the login page.
pub(crate) const LOGIN_REDIRECT_DELAY: Duration = Duration::from_secs(3);

/// Who is buying. Fixed at flow construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuyerKind {
  Guest,
  Authenticated,
}

/// What the user asked to buy. Immutable once submitted to the order
/// initiation client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurchaseIntent {
  pub book_id: String,
  pub course_id: String,
  /// Shown in the widget description line.
  pub book_title: String,
  pub buyer_kind: BuyerKind,
  /// Minor currency units (paise). Display only; the widget is launched with
  /// the backend-reported amount, not this one.
  pub amount_minor: u64,
  pub currency: String,
}

/// UI-visible phase of a purchase dialog. Owned by the flow controller; one
/// instance per open dialog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PurchasePhase {
  #[default]
  Idle,
  /// Order initiation in flight. The dialog refuses to close in this phase;
  /// the request itself is fire-and-forget (no cancellation is sent).
  Submitting,
  /// Control handed to the payment widget. May last indefinitely; the widget
  /// manages its own lifecycle.
  AwaitingPayment,
  Succeeded,
  Failed { message: String },
}

impl PurchasePhase {
  /// A fresh submit is only accepted from a settled phase.
  pub(crate) fn accepts_submit(&self) -> bool {
    matches!(self, PurchasePhase::Idle | PurchasePhase::Failed { .. })
  }

  /// Close requests are ignored while a request or the widget is in flight.
  pub(crate) fn blocks_close(&self) -> bool {
    matches!(self, PurchasePhase::Submitting | PurchasePhase::AwaitingPayment)
  }
}

/// Where a post-purchase or error-path navigation lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectTarget {
  Login,
  Dashboard,
}

impl RedirectTarget {
  pub fn path(&self) -> &'static str {
    match self {
      RedirectTarget::Login => "/login",
      RedirectTarget::Dashboard => "/dashboard",
    }
  }
}

/// Routing seam. Injected so flows and the notifier never touch a global
/// router and tests can record navigations.
pub trait Navigator: Send + Sync {
  fn go(&self, target: RedirectTarget);
}

/// Aborts the wrapped task when dropped. Every timer the crate spawns
/// (delayed redirects, notifier countdown/progress) is owned through one of
/// these so a torn-down dialog cannot receive stray ticks.
#[derive(Debug)]
pub(crate) struct AbortOnDrop(pub(crate) tokio::task::JoinHandle<()>);

impl Drop for AbortOnDrop {
  fn drop(&mut self) {
    self.0.abort();
  }
}
