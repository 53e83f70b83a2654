// bookpay/examples/guest_checkout.rs

use bookpay::{
  AuthSession, CheckoutOptions, ClientConfig, FlowResult, GuestIdentity, GuestPurchaseFlow, Navigator,
  OrderCredentials, PaymentOutcome, PaymentWidget, PurchaseApi, PurchaseIntent, RedirectTarget,
};
use bookpay::flow::BuyerKind;
use std::sync::Arc;
use tracing::info;

// 1. Stand-in backend: mints order credentials without a network.
//    In real applications you would use `HttpPurchaseApi` against a live API.
struct DemoApi;

#[async_trait::async_trait]
impl PurchaseApi for DemoApi {
  async fn initiate(&self, _intent: &PurchaseIntent, _session: &AuthSession) -> FlowResult<OrderCredentials> {
    unimplemented!("this demo only exercises the guest path")
  }

  async fn initiate_guest(&self, intent: &PurchaseIntent, identity: &GuestIdentity) -> FlowResult<OrderCredentials> {
    info!(book_id = %intent.book_id, email = %identity.email, "demo backend minting an order");
    Ok(OrderCredentials {
      order_id: "ord_demo_1".to_string(),
      external_order_id: "rzp_demo_1".to_string(),
      amount_minor: intent.amount_minor,
    })
  }
}

// 2. Stand-in payment widget: approves every checkout.
struct DemoWidget;

#[async_trait::async_trait]
impl PaymentWidget for DemoWidget {
  async fn open(&self, options: CheckoutOptions) -> FlowResult<PaymentOutcome> {
    info!(order_id = %options.order_id, amount = options.amount, "demo widget approving payment");
    Ok(PaymentOutcome::Success {
      payment_id: "pay_demo_1".to_string(),
      order_id: options.order_id,
      signature: "sig_demo_1".to_string(),
    })
  }
}

// 3. Stand-in router.
struct DemoNavigator;

impl Navigator for DemoNavigator {
  fn go(&self, target: RedirectTarget) {
    info!(path = target.path(), "demo navigation");
  }
}

#[tokio::main]
async fn main() {
  tracing_subscriber::fmt().with_max_level(tracing::Level::INFO).init();

  info!("--- Guest Checkout Example ---");

  // 4. Describe what is being bought.
  let intent = PurchaseIntent {
    book_id: "book-demo".to_string(),
    course_id: "course-demo".to_string(),
    book_title: "Polity Notes Vol. 1".to_string(),
    buyer_kind: BuyerKind::Guest,
    amount_minor: 99900,
    currency: "INR".to_string(),
  };
  let config = Arc::new(ClientConfig::new("https://api.example.com", "rzp_demo_key"));

  // 5. Wire the flow with the demo collaborators.
  let flow = GuestPurchaseFlow::new(intent, config, Arc::new(DemoApi), Arc::new(DemoWidget), Arc::new(DemoNavigator));

  // 6. An invalid submit surfaces field errors and stays Idle.
  flow.set_name("A");
  let phase = flow.submit().await;
  info!(?phase, errors = ?flow.state().read().field_errors, "first submit rejected by validation");

  // 7. Fix the form and go through the whole attempt.
  flow.set_name("Asha Rao");
  flow.set_email("asha@example.com");
  flow.set_mobile("9876543210");

  let phase = flow.submit().await;
  info!(?phase, "second submit completed");
}
