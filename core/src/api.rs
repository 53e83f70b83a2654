// bookpay/src/api.rs

//! Order initiation client and the backend wire contract.
//!
//! Every response rides the `{success, data, error}` envelope. Business
//! rejections carry a structured `error.code` where the backend supports it;
//! `classify_backend_error` falls back to matching the legacy free-text
//! wording so older deployments keep classifying correctly.

use crate::catalog::{PublicBook, PublicBookList};
use crate::config::ClientConfig;
use crate::error::{BackendErrorKind, FlowError, FlowResult};
use crate::flow::PurchaseIntent;
use crate::validate::GuestIdentity;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Bearer credentials for the authenticated initiation call. The backend
/// derives the buyer identity from the session; the email is only used for
/// widget prefill.
#[derive(Debug, Clone)]
pub struct AuthSession {
  pub bearer_token: String,
  pub email: String,
}

/// Widget-ready order credentials minted by the backend. Write-once;
/// consumed exactly once by the payment widget adapter.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OrderCredentials {
  #[serde(rename = "orderId")]
  pub order_id: String,
  /// Opaque token the payment widget is launched with.
  #[serde(rename = "razorpayOrderId")]
  pub external_order_id: String,
  /// Minor currency units, authoritative over the listed price.
  #[serde(rename = "amount")]
  pub amount_minor: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiErrorBody {
  #[serde(default)]
  pub code: Option<String>,
  #[serde(default)]
  pub message: Option<String>,
}

/// The `{success, data, error}` envelope every backend response rides.
#[derive(Debug, Clone, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct ApiEnvelope<T> {
  pub success: bool,
  #[serde(default)]
  pub data: Option<T>,
  #[serde(default)]
  pub error: Option<ApiErrorBody>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InitiateBody<'a> {
  book_id: &'a str,
  course_id: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InitiateGuestBody<'a> {
  book_id: &'a str,
  course_id: &'a str,
  guest_name: &'a str,
  guest_email: &'a str,
  #[serde(skip_serializing_if = "Option::is_none")]
  guest_mobile: Option<&'a str>,
}

/// Maps a backend rejection to a semantic kind. Structured codes win;
/// substring matching on the message is the fallback for the legacy wording.
pub fn classify_backend_error(code: Option<&str>, message: &str) -> BackendErrorKind {
  if let Some(code) = code {
    return match code {
      "ACCOUNT_EXISTS" => BackendErrorKind::AccountExists,
      "ALREADY_OWNED" => BackendErrorKind::AlreadyOwned,
      "INVALID_EMAIL" => BackendErrorKind::InvalidEmail,
      "INVALID_PHONE_FORMAT" => BackendErrorKind::InvalidPhoneFormat,
      "BOOK_NOT_FOUND" => BackendErrorKind::BookNotFound,
      other => {
        warn!(code = other, "unrecognized backend error code");
        BackendErrorKind::Other
      }
    };
  }

  if message.contains("Account exists") {
    BackendErrorKind::AccountExists
  } else if message.contains("already own") {
    BackendErrorKind::AlreadyOwned
  } else if message.contains("Invalid email") {
    BackendErrorKind::InvalidEmail
  } else if message.contains("E.164 format") {
    BackendErrorKind::InvalidPhoneFormat
  } else if message.contains("Invalid book") {
    BackendErrorKind::BookNotFound
  } else {
    BackendErrorKind::Other
  }
}

/// The order initiation contract the flows depend on. Object-safe so tests
/// and alternative transports can stand in for the HTTP client.
#[async_trait::async_trait]
pub trait PurchaseApi: Send + Sync {
  /// `POST /purchase/initiate`, bearer-authenticated. The backend derives
  /// the buyer from the session.
  async fn initiate(&self, intent: &PurchaseIntent, session: &AuthSession) -> FlowResult<OrderCredentials>;

  /// `POST /purchase/initiate-guest`, unauthenticated. Creates a pending
  /// order and (backend-side) a provisional account for the guest email.
  async fn initiate_guest(&self, intent: &PurchaseIntent, identity: &GuestIdentity) -> FlowResult<OrderCredentials>;
}

/// reqwest-backed implementation of `PurchaseApi` plus the public catalog
/// listing.
#[derive(Debug, Clone)]
pub struct HttpPurchaseApi {
  http: reqwest::Client,
  config: Arc<ClientConfig>,
}

impl HttpPurchaseApi {
  pub fn new(config: Arc<ClientConfig>) -> Self {
    Self {
      http: reqwest::Client::new(),
      config,
    }
  }

  /// `GET /books/public`: the unauthenticated catalog of purchasable books.
  #[instrument(skip(self))]
  pub async fn public_books(&self) -> FlowResult<Vec<PublicBook>> {
    let url = self.config.endpoint("/books/public");
    let response = self.http.get(&url).send().await?;

    let status = response.status();
    if !status.is_success() {
      return Err(FlowError::Transport(format!("Failed to fetch books: {}", status)));
    }

    let envelope: ApiEnvelope<PublicBookList> = response
      .json()
      .await
      .map_err(|e| FlowError::Transport(format!("Malformed catalog response: {}", e)))?;

    match (envelope.success, envelope.data) {
      (true, Some(list)) => {
        info!(count = list.books.len(), "public catalog fetched");
        Ok(list.books)
      }
      _ => {
        let message = envelope
          .error
          .and_then(|e| e.message)
          .unwrap_or_else(|| "Failed to fetch books".to_string());
        Err(FlowError::Backend {
          kind: BackendErrorKind::Other,
          message,
        })
      }
    }
  }

  /// Shared POST/decode path for both initiation variants.
  async fn post_initiate<B: Serialize + Sync>(
    &self,
    url: &str,
    bearer_token: Option<&str>,
    body: &B,
  ) -> FlowResult<OrderCredentials> {
    let mut request = self.http.post(url).json(body);
    if let Some(token) = bearer_token {
      request = request.bearer_auth(token);
    }

    let response = request.send().await?;
    let status = response.status();

    if !status.is_success() {
      // Non-2xx with a decodable envelope is a business rejection; anything
      // else is transport.
      let envelope = response.json::<ApiEnvelope<OrderCredentials>>().await.ok();
      let error = envelope.and_then(|e| e.error);
      return match error {
        Some(body) => {
          let message = body.message.clone().unwrap_or_else(|| format!("Request failed: {}", status));
          let kind = classify_backend_error(body.code.as_deref(), &message);
          warn!(%status, ?kind, "order initiation rejected");
          Err(FlowError::Backend { kind, message })
        }
        None => Err(FlowError::Transport(format!("Request failed: {}", status))),
      };
    }

    let envelope: ApiEnvelope<OrderCredentials> = response
      .json()
      .await
      .map_err(|e| FlowError::Transport(format!("Malformed initiation response: {}", e)))?;

    match (envelope.success, envelope.data) {
      (true, Some(credentials)) => {
        info!(order_id = %credentials.order_id, "order initiated");
        Ok(credentials)
      }
      _ => {
        let body = envelope.error.unwrap_or_default();
        let message = body
          .message
          .clone()
          .unwrap_or_else(|| "Failed to initiate purchase".to_string());
        let kind = classify_backend_error(body.code.as_deref(), &message);
        Err(FlowError::Backend { kind, message })
      }
    }
  }
}

#[async_trait::async_trait]
impl PurchaseApi for HttpPurchaseApi {
  #[instrument(skip(self, session), fields(book_id = %intent.book_id, course_id = %intent.course_id))]
  async fn initiate(&self, intent: &PurchaseIntent, session: &AuthSession) -> FlowResult<OrderCredentials> {
    let url = self.config.endpoint("/purchase/initiate");
    let body = InitiateBody {
      book_id: &intent.book_id,
      course_id: &intent.course_id,
    };
    self.post_initiate(&url, Some(&session.bearer_token), &body).await
  }

  #[instrument(skip(self, identity), fields(book_id = %intent.book_id, course_id = %intent.course_id))]
  async fn initiate_guest(&self, intent: &PurchaseIntent, identity: &GuestIdentity) -> FlowResult<OrderCredentials> {
    let url = self.config.endpoint("/purchase/initiate-guest");
    let body = InitiateGuestBody {
      book_id: &intent.book_id,
      course_id: &intent.course_id,
      guest_name: &identity.name,
      guest_email: &identity.email,
      guest_mobile: identity.mobile_e164.as_deref(),
    };
    self.post_initiate(&url, None, &body).await
  }
}
