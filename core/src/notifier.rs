// bookpay/src/notifier.rs

//! Post-purchase success notifier: a five-second countdown with a progress
//! indicator, ending in an automatic navigation (login for guest purchases,
//! dashboard otherwise).
//!
//! The countdown and the progress animation are two separate interval tasks
//! running on the same navigator/state; they are owned as one scoped pair so
//! closing the notifier (or dropping it) cancels both together and no stray
//! tick can mutate a torn-down view.

use crate::flow::{AbortOnDrop, Navigator, RedirectTarget};
use crate::state::StateCell;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Seconds counted down before the automatic navigation.
const COUNTDOWN_TICKS: u8 = 5;
/// Progress advances 2% every 100 ms, reaching 100% as the countdown ends.
const PROGRESS_STEP: u8 = 2;
const PROGRESS_TICK: Duration = Duration::from_millis(100);

/// What the notifier dialog renders.
#[derive(Debug, Clone)]
pub struct NotifierState {
  pub open: bool,
  /// Remaining whole seconds, `COUNTDOWN_TICKS` down to 0.
  pub countdown: u8,
  /// 0 to 100, in lockstep with the countdown.
  pub progress: u8,
  /// Set exactly once, when the countdown completed and navigation fired.
  pub navigated: bool,
}

impl Default for NotifierState {
  fn default() -> Self {
    Self {
      open: false,
      countdown: COUNTDOWN_TICKS,
      progress: 0,
      navigated: false,
    }
  }
}

struct TimerPair {
  _countdown: AbortOnDrop,
  _progress: AbortOnDrop,
}

/// Success notifier shown after a completed payment.
pub struct PostPurchaseNotifier {
  navigator: Arc<dyn Navigator>,
  target: RedirectTarget,
  state: StateCell<NotifierState>,
  timers: Arc<Mutex<Option<TimerPair>>>,
}

impl PostPurchaseNotifier {
  /// `target` is `Login` for guest purchasers (their credentials arrive by
  /// email) and `Dashboard` for signed-in buyers.
  pub fn new(navigator: Arc<dyn Navigator>, target: RedirectTarget) -> Self {
    Self {
      navigator,
      target,
      state: StateCell::default(),
      timers: Arc::new(Mutex::new(None)),
    }
  }

  pub fn state(&self) -> StateCell<NotifierState> {
    self.state.clone()
  }

  /// Opens the notifier and starts both timers. Reopening resets the
  /// countdown and replaces any previous timer pair.
  pub fn open(&self) {
    {
      let mut guard = self.state.write();
      *guard = NotifierState {
        open: true,
        ..NotifierState::default()
      };
    }

    let countdown = self.spawn_countdown();
    let progress = self.spawn_progress();
    *self.timers.lock() = Some(TimerPair {
      _countdown: countdown,
      _progress: progress,
    });
    info!(target_path = self.target.path(), "post-purchase notifier opened");
  }

  /// Manual close: cancels both timers and closes without navigating.
  pub fn close(&self) {
    self.timers.lock().take();
    let mut guard = self.state.write();
    guard.open = false;
    info!("post-purchase notifier closed manually");
  }

  /// Immediate navigation, as from the "Go to login now" button. Cancels the
  /// timers; fires at most once even if the countdown races it.
  pub fn navigate_now(&self) {
    Self::finish(&self.state, &self.navigator, self.target, &self.timers);
  }

  fn spawn_countdown(&self) -> AbortOnDrop {
    let state = self.state.clone();
    let navigator = Arc::clone(&self.navigator);
    let target = self.target;
    let timers = Arc::clone(&self.timers);

    AbortOnDrop(tokio::spawn(async move {
      let mut tick = tokio::time::interval(Duration::from_secs(1));
      tick.tick().await; // first tick resolves immediately
      loop {
        tick.tick().await;
        let finished = {
          let mut guard = state.write();
          if !guard.open {
            return;
          }
          guard.countdown = guard.countdown.saturating_sub(1);
          debug!(countdown = guard.countdown, "notifier tick");
          guard.countdown == 0
        };
        if finished {
          Self::finish(&state, &navigator, target, &timers);
          return;
        }
      }
    }))
  }

  fn spawn_progress(&self) -> AbortOnDrop {
    let state = self.state.clone();

    AbortOnDrop(tokio::spawn(async move {
      let mut tick = tokio::time::interval(PROGRESS_TICK);
      tick.tick().await;
      loop {
        tick.tick().await;
        let mut guard = state.write();
        if !guard.open {
          return;
        }
        guard.progress = (guard.progress + PROGRESS_STEP).min(100);
        if guard.progress >= 100 {
          return;
        }
      }
    }))
  }

  /// Single exit point for navigation: marks the state, fires the navigator
  /// exactly once, then drops the timer pair (which aborts whichever timer
  /// tasks are still alive).
  fn finish(
    state: &StateCell<NotifierState>,
    navigator: &Arc<dyn Navigator>,
    target: RedirectTarget,
    timers: &Arc<Mutex<Option<TimerPair>>>,
  ) {
    let should_navigate = {
      let mut guard = state.write();
      if guard.navigated {
        false
      } else {
        guard.navigated = true;
        guard.open = false;
        // The bar lands on 100% together with the final tick.
        guard.progress = 100;
        guard.countdown = 0;
        true
      }
    };
    if should_navigate {
      info!(path = target.path(), "post-purchase redirect");
      navigator.go(target);
      timers.lock().take();
    }
  }
}

impl Drop for PostPurchaseNotifier {
  fn drop(&mut self) {
    // Joint cancellation on teardown, same as manual close.
    self.timers.lock().take();
  }
}
