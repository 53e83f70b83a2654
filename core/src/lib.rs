// src/lib.rs

//! Bookpay: a client-side purchase flow controller.
//!
//! Bookpay mediates between a buyer (guest or authenticated), a backend
//! order-initiation API, and an external hosted payment widget:
//!  - Pure field validators (name, email, locale-aware phone, E.164).
//!  - An order initiation client over the `{success, data, error}` envelope,
//!    with semantic classification of backend rejections.
//!  - A payment-widget adapter trait: the single suspension point of a flow.
//!  - Guest and authenticated purchase state machines
//!    (Idle / Submitting / AwaitingPayment / Succeeded / Failed).
//!  - A post-purchase countdown notifier with scoped, jointly-cancelled
//!    timers.
//!
//! All errors are folded into UI-visible dialog state at the flow boundary;
//! nothing retries automatically — every retry is a fresh user submit.

pub mod api;
pub mod catalog;
pub mod config;
pub mod error;
pub mod flow;
pub mod money;
pub mod notifier;
pub mod state;
pub mod validate;
pub mod widget;

// --- Re-exports for the Public API ---

pub use crate::error::{BackendErrorKind, Field, FlowError, FlowResult};

pub use crate::config::ClientConfig;
pub use crate::state::StateCell;

pub use crate::api::{AuthSession, HttpPurchaseApi, OrderCredentials, PurchaseApi};
pub use crate::catalog::{parse_course_tag, AccessType, PublicBook};
pub use crate::money::format_price;
pub use crate::validate::{
  compose_e164, validate_e164, validate_email, validate_mobile, validate_name, FieldErrors, GuestForm, GuestIdentity,
};

pub use crate::widget::{CheckoutOptions, PaymentOutcome, PaymentWidget, Prefill, Theme};

pub use crate::flow::auth::{AuthDialogState, AuthPurchaseFlow, SessionProvider};
pub use crate::flow::guest::{GuestDialogState, GuestPurchaseFlow, DEFAULT_COUNTRY_CODE};
pub use crate::flow::{BuyerKind, Navigator, PurchaseIntent, PurchasePhase, RedirectTarget};

pub use crate::notifier::{NotifierState, PostPurchaseNotifier};
