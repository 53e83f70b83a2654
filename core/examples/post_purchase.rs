// bookpay/examples/post_purchase.rs

use bookpay::{Navigator, PostPurchaseNotifier, RedirectTarget};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

struct DemoNavigator;

impl Navigator for DemoNavigator {
  fn go(&self, target: RedirectTarget) {
    info!(path = target.path(), "navigating");
  }
}

#[tokio::main]
async fn main() {
  tracing_subscriber::fmt().with_max_level(tracing::Level::DEBUG).init();

  info!("--- Post-Purchase Notifier Example ---");

  // Guest purchases redirect to login, where the emailed credentials work.
  let notifier = PostPurchaseNotifier::new(Arc::new(DemoNavigator), RedirectTarget::Login);
  notifier.open();

  // Watch the five-second countdown run out in real time.
  for _ in 0..6 {
    tokio::time::sleep(Duration::from_secs(1)).await;
    let state = notifier.state();
    let snapshot = state.read().clone();
    info!(
      countdown = snapshot.countdown,
      progress = snapshot.progress,
      navigated = snapshot.navigated,
      "notifier state"
    );
    if snapshot.navigated {
      break;
    }
  }
}
