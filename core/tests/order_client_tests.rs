// tests/order_client_tests.rs
mod common;

use bookpay::api::classify_backend_error;
use bookpay::flow::BuyerKind;
use bookpay::{AccessType, BackendErrorKind, ClientConfig, FlowError, HttpPurchaseApi, PurchaseApi};
use common::*;
use serde_json::json;
use serial_test::serial;
use std::sync::Arc;
use wiremock::matchers::{bearer_token, body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn api_for(server: &MockServer) -> HttpPurchaseApi {
  HttpPurchaseApi::new(Arc::new(ClientConfig::new(&server.uri(), "rzp_test_key")))
}

#[tokio::test]
async fn guest_initiation_posts_camel_case_body_and_decodes_credentials() {
  setup_tracing();
  let server = MockServer::start().await;

  Mock::given(method("POST"))
    .and(path("/v1/purchase/initiate-guest"))
    .and(header("content-type", "application/json"))
    .and(body_json(json!({
      "bookId": "book-101",
      "courseId": "course-upsc",
      "guestName": "Asha Rao",
      "guestEmail": "asha@example.com",
      "guestMobile": "+919876543210",
    })))
    .respond_with(ResponseTemplate::new(200).set_body_json(json!({
      "success": true,
      "data": {
        "orderId": "ord_123",
        "razorpayOrderId": "rzp_order_123",
        "amount": 99900,
      },
    })))
    .expect(1)
    .mount(&server)
    .await;

  let api = api_for(&server);
  let identity = bookpay::GuestIdentity {
    name: "Asha Rao".to_string(),
    email: "asha@example.com".to_string(),
    mobile_e164: Some("+919876543210".to_string()),
  };
  let credentials = api
    .initiate_guest(&test_intent(BuyerKind::Guest), &identity)
    .await
    .unwrap();

  assert_eq!(credentials, test_credentials());
}

#[tokio::test]
async fn guest_mobile_is_omitted_from_the_body_when_absent() {
  setup_tracing();
  let server = MockServer::start().await;

  // The matcher is exact: a `guestMobile` key would fail it.
  Mock::given(method("POST"))
    .and(path("/v1/purchase/initiate-guest"))
    .and(body_json(json!({
      "bookId": "book-101",
      "courseId": "course-upsc",
      "guestName": "Asha Rao",
      "guestEmail": "asha@example.com",
    })))
    .respond_with(ResponseTemplate::new(200).set_body_json(json!({
      "success": true,
      "data": { "orderId": "ord_1", "razorpayOrderId": "rzp_1", "amount": 100 },
    })))
    .expect(1)
    .mount(&server)
    .await;

  let api = api_for(&server);
  let identity = bookpay::GuestIdentity {
    name: "Asha Rao".to_string(),
    email: "asha@example.com".to_string(),
    mobile_e164: None,
  };
  api
    .initiate_guest(&test_intent(BuyerKind::Guest), &identity)
    .await
    .unwrap();
}

#[tokio::test]
async fn authenticated_initiation_sends_the_bearer_token() {
  setup_tracing();
  let server = MockServer::start().await;

  Mock::given(method("POST"))
    .and(path("/v1/purchase/initiate"))
    .and(bearer_token("token-123"))
    .and(body_json(json!({
      "bookId": "book-101",
      "courseId": "course-upsc",
    })))
    .respond_with(ResponseTemplate::new(200).set_body_json(json!({
      "success": true,
      "data": { "orderId": "ord_9", "razorpayOrderId": "rzp_9", "amount": 99900 },
    })))
    .expect(1)
    .mount(&server)
    .await;

  let api = api_for(&server);
  let credentials = api
    .initiate(&test_intent(BuyerKind::Authenticated), &test_session())
    .await
    .unwrap();
  assert_eq!(credentials.order_id, "ord_9");
}

#[tokio::test]
async fn structured_code_wins_over_the_message_text() {
  setup_tracing();
  let server = MockServer::start().await;

  // Message says "already own"; code says BOOK_NOT_FOUND. Code wins.
  Mock::given(method("POST"))
    .and(path("/v1/purchase/initiate-guest"))
    .respond_with(ResponseTemplate::new(404).set_body_json(json!({
      "success": false,
      "error": { "code": "BOOK_NOT_FOUND", "message": "You already own this book" },
    })))
    .mount(&server)
    .await;

  let api = api_for(&server);
  let identity = bookpay::GuestIdentity {
    name: "Asha Rao".to_string(),
    email: "asha@example.com".to_string(),
    mobile_e164: None,
  };
  let err = api
    .initiate_guest(&test_intent(BuyerKind::Guest), &identity)
    .await
    .unwrap_err();

  match err {
    FlowError::Backend { kind, .. } => assert_eq!(kind, BackendErrorKind::BookNotFound),
    other => panic!("expected a backend rejection, got {other:?}"),
  }
}

#[tokio::test]
async fn legacy_wording_classifies_without_a_code() {
  setup_tracing();
  let server = MockServer::start().await;

  Mock::given(method("POST"))
    .and(path("/v1/purchase/initiate-guest"))
    .respond_with(ResponseTemplate::new(409).set_body_json(json!({
      "success": false,
      "error": { "message": "You already own this book. Please login to access it." },
    })))
    .mount(&server)
    .await;

  let api = api_for(&server);
  let identity = bookpay::GuestIdentity {
    name: "Asha Rao".to_string(),
    email: "asha@example.com".to_string(),
    mobile_e164: None,
  };
  let err = api
    .initiate_guest(&test_intent(BuyerKind::Guest), &identity)
    .await
    .unwrap_err();

  match err {
    FlowError::Backend { kind, message } => {
      assert_eq!(kind, BackendErrorKind::AlreadyOwned);
      assert!(message.contains("already own"));
    }
    other => panic!("expected a backend rejection, got {other:?}"),
  }
}

#[tokio::test]
async fn non_envelope_failure_is_a_transport_error() {
  setup_tracing();
  let server = MockServer::start().await;

  Mock::given(method("POST"))
    .and(path("/v1/purchase/initiate-guest"))
    .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
    .mount(&server)
    .await;

  let api = api_for(&server);
  let identity = bookpay::GuestIdentity {
    name: "Asha Rao".to_string(),
    email: "asha@example.com".to_string(),
    mobile_e164: None,
  };
  let err = api
    .initiate_guest(&test_intent(BuyerKind::Guest), &identity)
    .await
    .unwrap_err();

  match err {
    FlowError::Transport(message) => assert!(message.contains("500")),
    other => panic!("expected a transport error, got {other:?}"),
  }
}

#[tokio::test]
async fn ok_status_with_success_false_is_a_backend_rejection() {
  setup_tracing();
  let server = MockServer::start().await;

  Mock::given(method("POST"))
    .and(path("/v1/purchase/initiate"))
    .respond_with(ResponseTemplate::new(200).set_body_json(json!({
      "success": false,
      "error": { "message": "Account exists. Please login to continue." },
    })))
    .mount(&server)
    .await;

  let api = api_for(&server);
  let err = api
    .initiate(&test_intent(BuyerKind::Authenticated), &test_session())
    .await
    .unwrap_err();

  match err {
    FlowError::Backend { kind, .. } => assert_eq!(kind, BackendErrorKind::AccountExists),
    other => panic!("expected a backend rejection, got {other:?}"),
  }
}

#[tokio::test]
async fn connection_failure_is_a_transport_error() {
  setup_tracing();
  // Nothing is listening on the mock server once it is dropped.
  let uri = {
    let server = MockServer::start().await;
    server.uri()
  };

  let api = HttpPurchaseApi::new(Arc::new(ClientConfig::new(&uri, "rzp_test_key")));
  let err = api
    .initiate(&test_intent(BuyerKind::Authenticated), &test_session())
    .await
    .unwrap_err();
  assert!(matches!(err, FlowError::Transport(_)));
}

#[tokio::test]
async fn public_books_decodes_the_catalog() {
  setup_tracing();
  let server = MockServer::start().await;

  Mock::given(method("GET"))
    .and(path("/v1/books/public"))
    .respond_with(ResponseTemplate::new(200).set_body_json(json!({
      "success": true,
      "data": {
        "books": [{
          "bookId": "book-101",
          "title": "Polity Notes Vol. 1",
          "description": "Concise notes",
          "order": 1,
          "accessType": "PAID_ONLY",
          "price": 99900,
          "currency": "INR",
          "eligibleCourses": ["2025_UPSC_PRELIMS"],
          "courseId": "course-upsc",
        }],
      },
    })))
    .mount(&server)
    .await;

  let api = api_for(&server);
  let books = api.public_books().await.unwrap();

  assert_eq!(books.len(), 1);
  assert_eq!(books[0].book_id, "book-101");
  assert_eq!(books[0].access_type, AccessType::PaidOnly);
  assert_eq!(books[0].price, 99900);
  assert_eq!(books[0].eligible_courses, vec!["2025_UPSC_PRELIMS".to_string()]);
}

#[tokio::test]
async fn public_books_failure_envelope_surfaces_the_message() {
  setup_tracing();
  let server = MockServer::start().await;

  Mock::given(method("GET"))
    .and(path("/v1/books/public"))
    .respond_with(ResponseTemplate::new(200).set_body_json(json!({
      "success": false,
      "error": { "message": "Catalog unavailable" },
    })))
    .mount(&server)
    .await;

  let api = api_for(&server);
  let err = api.public_books().await.unwrap_err();
  match err {
    FlowError::Backend { message, .. } => assert_eq!(message, "Catalog unavailable"),
    other => panic!("expected a backend error, got {other:?}"),
  }
}

#[test]
fn classification_table() {
  assert_eq!(
    classify_backend_error(Some("ACCOUNT_EXISTS"), "whatever"),
    BackendErrorKind::AccountExists
  );
  assert_eq!(
    classify_backend_error(Some("INVALID_PHONE_FORMAT"), ""),
    BackendErrorKind::InvalidPhoneFormat
  );
  assert_eq!(classify_backend_error(Some("SOMETHING_NEW"), ""), BackendErrorKind::Other);

  assert_eq!(
    classify_backend_error(None, "Account exists. Please login to continue."),
    BackendErrorKind::AccountExists
  );
  assert_eq!(
    classify_backend_error(None, "Invalid email address"),
    BackendErrorKind::InvalidEmail
  );
  assert_eq!(
    classify_backend_error(None, "Mobile must be in E.164 format"),
    BackendErrorKind::InvalidPhoneFormat
  );
  assert_eq!(
    classify_backend_error(None, "Invalid book or it is not purchasable"),
    BackendErrorKind::BookNotFound
  );
  assert_eq!(classify_backend_error(None, "Totally novel failure"), BackendErrorKind::Other);
}

#[test]
fn error_display_strings() {
  let validation = FlowError::Validation {
    field: bookpay::Field::Email,
    message: "Invalid email format".to_string(),
  };
  assert_eq!(validation.to_string(), "Validation failed for Email: Invalid email format");

  let payment = FlowError::Payment {
    code: Some("BAD_CARD".to_string()),
    message: "Card declined".to_string(),
  };
  assert_eq!(payment.to_string(), "Payment failed: Card declined");

  let adapter: FlowError = anyhow::anyhow!("widget runtime crashed").into();
  assert_eq!(adapter.to_string(), "Adapter error: widget runtime crashed");
}

#[test]
fn base_url_normalization() {
  let bare = ClientConfig::new("https://api.example.com", "key");
  assert_eq!(bare.api_base_url, "https://api.example.com/v1");

  let versioned = ClientConfig::new("https://api.example.com/v1", "key");
  assert_eq!(versioned.api_base_url, "https://api.example.com/v1");

  let trailing = ClientConfig::new("https://api.example.com/v1/", "key");
  assert_eq!(trailing.api_base_url, "https://api.example.com/v1");

  assert_eq!(bare.endpoint("/purchase/initiate"), "https://api.example.com/v1/purchase/initiate");
  assert_eq!(bare.endpoint("books/public"), "https://api.example.com/v1/books/public");
}

#[test]
#[serial]
fn config_from_env_reads_and_defaults() {
  setup_tracing();
  std::env::set_var("BOOKPAY_API_BASE_URL", "https://api.example.com");
  std::env::set_var("BOOKPAY_RAZORPAY_KEY_ID", "rzp_live_abc");
  std::env::remove_var("BOOKPAY_MERCHANT_NAME");
  std::env::remove_var("BOOKPAY_THEME_COLOR");

  let config = ClientConfig::from_env().unwrap();
  assert_eq!(config.api_base_url, "https://api.example.com/v1");
  assert_eq!(config.razorpay_key_id, "rzp_live_abc");
  assert_eq!(config.merchant_name, "Arjunas Arrow");
  assert_eq!(config.theme_color, "#667eea");

  std::env::remove_var("BOOKPAY_API_BASE_URL");
  std::env::remove_var("BOOKPAY_RAZORPAY_KEY_ID");
}

#[test]
#[serial]
fn config_from_env_rejects_missing_or_empty_key() {
  std::env::set_var("BOOKPAY_API_BASE_URL", "https://api.example.com");
  std::env::set_var("BOOKPAY_RAZORPAY_KEY_ID", "  ");
  assert!(matches!(ClientConfig::from_env(), Err(FlowError::Configuration(_))));

  std::env::remove_var("BOOKPAY_RAZORPAY_KEY_ID");
  assert!(matches!(ClientConfig::from_env(), Err(FlowError::Configuration(_))));

  std::env::remove_var("BOOKPAY_API_BASE_URL");
}
