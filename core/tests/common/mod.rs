// tests/common/mod.rs
#![allow(dead_code)] // Allow unused code in this common test module

use bookpay::{
  AuthSession, CheckoutOptions, ClientConfig, FlowError, FlowResult, GuestIdentity, Navigator, OrderCredentials,
  PaymentOutcome, PaymentWidget, PurchaseApi, PurchaseIntent, RedirectTarget, SessionProvider,
};
use bookpay::flow::BuyerKind;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::Level;

// --- Tracing Setup (call once per test run if needed) ---
use once_cell::sync::Lazy;
static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer() // Important for tests to capture output
    .try_init()
    .ok(); // Allow multiple initializations in tests (ok if fails)
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}

// --- Fixtures ---

pub fn test_intent(buyer_kind: BuyerKind) -> PurchaseIntent {
  PurchaseIntent {
    book_id: "book-101".to_string(),
    course_id: "course-upsc".to_string(),
    book_title: "Polity Notes Vol. 1".to_string(),
    buyer_kind,
    amount_minor: 99900,
    currency: "INR".to_string(),
  }
}

pub fn test_config() -> Arc<ClientConfig> {
  Arc::new(ClientConfig::new("https://api.test.invalid", "rzp_test_key"))
}

pub fn test_config_without_key() -> Arc<ClientConfig> {
  Arc::new(ClientConfig::new("https://api.test.invalid", ""))
}

pub fn test_credentials() -> OrderCredentials {
  OrderCredentials {
    order_id: "ord_123".to_string(),
    external_order_id: "rzp_order_123".to_string(),
    amount_minor: 99900,
  }
}

pub fn test_session() -> AuthSession {
  AuthSession {
    bearer_token: "token-123".to_string(),
    email: "buyer@example.com".to_string(),
  }
}

// --- Mock Navigator ---

#[derive(Default)]
pub struct RecordingNavigator {
  calls: Mutex<Vec<RedirectTarget>>,
}

impl RecordingNavigator {
  pub fn targets(&self) -> Vec<RedirectTarget> {
    self.calls.lock().clone()
  }
}

impl Navigator for RecordingNavigator {
  fn go(&self, target: RedirectTarget) {
    self.calls.lock().push(target);
  }
}

// --- Mock PurchaseApi ---

/// Pops one scripted response per initiation call and records what the flow
/// submitted. An exhausted script yields a transport error.
#[derive(Default)]
pub struct ScriptedApi {
  responses: Mutex<VecDeque<FlowResult<OrderCredentials>>>,
  pub guest_calls: Mutex<Vec<GuestIdentity>>,
  pub auth_calls: Mutex<Vec<AuthSession>>,
}

impl ScriptedApi {
  pub fn with_responses(responses: Vec<FlowResult<OrderCredentials>>) -> Arc<Self> {
    Arc::new(Self {
      responses: Mutex::new(responses.into()),
      ..Self::default()
    })
  }

  fn next_response(&self) -> FlowResult<OrderCredentials> {
    self
      .responses
      .lock()
      .pop_front()
      .unwrap_or_else(|| Err(FlowError::Transport("no scripted response left".to_string())))
  }

  pub fn call_count(&self) -> usize {
    self.guest_calls.lock().len() + self.auth_calls.lock().len()
  }
}

#[async_trait::async_trait]
impl PurchaseApi for ScriptedApi {
  async fn initiate(&self, _intent: &PurchaseIntent, session: &AuthSession) -> FlowResult<OrderCredentials> {
    self.auth_calls.lock().push(session.clone());
    self.next_response()
  }

  async fn initiate_guest(&self, _intent: &PurchaseIntent, identity: &GuestIdentity) -> FlowResult<OrderCredentials> {
    self.guest_calls.lock().push(identity.clone());
    self.next_response()
  }
}

/// An initiation call that never completes, for probing the Submitting
/// phase from outside.
#[derive(Default)]
pub struct HangingApi {
  pub calls: Mutex<usize>,
}

#[async_trait::async_trait]
impl PurchaseApi for HangingApi {
  async fn initiate(&self, _intent: &PurchaseIntent, _session: &AuthSession) -> FlowResult<OrderCredentials> {
    *self.calls.lock() += 1;
    std::future::pending().await
  }

  async fn initiate_guest(&self, _intent: &PurchaseIntent, _identity: &GuestIdentity) -> FlowResult<OrderCredentials> {
    *self.calls.lock() += 1;
    std::future::pending().await
  }
}

// --- Mock PaymentWidget ---

/// Pops one scripted outcome per launch and records the options each launch
/// received.
pub struct ScriptedWidget {
  ready: AtomicBool,
  outcomes: Mutex<VecDeque<FlowResult<PaymentOutcome>>>,
  pub launches: Mutex<Vec<CheckoutOptions>>,
}

impl ScriptedWidget {
  pub fn with_outcomes(outcomes: Vec<FlowResult<PaymentOutcome>>) -> Arc<Self> {
    Arc::new(Self {
      ready: AtomicBool::new(true),
      outcomes: Mutex::new(outcomes.into()),
      launches: Mutex::new(Vec::new()),
    })
  }

  pub fn not_loaded() -> Arc<Self> {
    let widget = Self::with_outcomes(vec![]);
    widget.ready.store(false, Ordering::SeqCst);
    widget
  }

  pub fn launch_count(&self) -> usize {
    self.launches.lock().len()
  }
}

#[async_trait::async_trait]
impl PaymentWidget for ScriptedWidget {
  fn ready(&self) -> bool {
    self.ready.load(Ordering::SeqCst)
  }

  async fn open(&self, options: CheckoutOptions) -> FlowResult<PaymentOutcome> {
    self.launches.lock().push(options);
    self
      .outcomes
      .lock()
      .pop_front()
      .unwrap_or_else(|| Err(FlowError::Configuration("no scripted outcome left".to_string())))
  }
}

// --- Mock SessionProvider ---

pub struct StaticSessions(pub Option<AuthSession>);

impl SessionProvider for StaticSessions {
  fn current_session(&self) -> Option<AuthSession> {
    self.0.clone()
  }
}

/// Lets spawned timers and flow tasks run under a paused clock.
pub async fn settle() {
  for _ in 0..20 {
    tokio::task::yield_now().await;
  }
}
