//! A framework for debounced async event handlers.
//!
//! An [`AsyncHook`] runs as a background tokio task fed through a channel.
//! Each incoming event may be consumed immediately or extend a debounce
//! deadline; when the deadline passes with no newer event, the hook's
//! [`finish_debounce`](AsyncHook::finish_debounce) fires. This is how the
//! engine turns a stream of keystrokes into a trickle of provider queries.

use std::time::Duration;

use futures_executor::block_on;
use tokio::{
  sync::mpsc::{
    self,
    Sender,
    error::TrySendError,
  },
  time::Instant,
};

/// Upper bound on blocking when the hook channel is saturated. Dropping an
/// event is preferable to stalling the caller's UI thread.
const SATURATED_SEND_TIMEOUT: Duration = Duration::from_millis(2);

/// Capacity sized for keystroke bursts; the hook drains events immediately,
/// so the channel only fills if the runtime is starved.
const EVENT_CHANNEL_CAPACITY: usize = 128;

pub trait AsyncHook: Sync + Send + 'static + Sized {
  type Event: Sync + Send + 'static;

  /// Called for every received event. Returns the debounce deadline to wait
  /// for, `None` to wait for the next event with no deadline. The previous
  /// deadline, if any, is passed in so a hook can choose to keep it.
  fn handle_event(&mut self, event: Self::Event, timeout: Option<Instant>) -> Option<Instant>;

  /// Called when the debounce deadline elapses with no newer event.
  fn finish_debounce(&mut self);

  fn spawn(self) -> mpsc::Sender<Self::Event> {
    let (tx, rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
    // Outside a runtime (plain unit tests) the hook is not spawned; events
    // sent to the returned channel are dropped.
    if tokio::runtime::Handle::try_current().is_ok() {
      tokio::spawn(run(self, rx));
    }
    tx
  }
}

async fn run<Hook: AsyncHook>(mut hook: Hook, mut rx: mpsc::Receiver<Hook::Event>) {
  let mut deadline = None;
  loop {
    let event = match deadline {
      Some(at) => {
        match tokio::time::timeout_at(at, rx.recv()).await {
          Ok(event) => event,
          Err(_) => {
            deadline = None;
            hook.finish_debounce();
            continue;
          },
        }
      },
      None => rx.recv().await,
    };
    let Some(event) = event else {
      break;
    };
    deadline = hook.handle_event(event, deadline);
  }
}

/// Sends an event to a hook from synchronous code. Tries a non-blocking
/// send first; if the channel is saturated, blocks briefly and then drops
/// the event rather than freeze the caller.
pub fn send_blocking<T>(tx: &Sender<T>, event: T) {
  match tx.try_send(event) {
    Ok(()) => {},
    Err(TrySendError::Full(event)) => {
      let _ = block_on(tx.send_timeout(event, SATURATED_SEND_TIMEOUT));
    },
    Err(TrySendError::Closed(_)) => {
      log::warn!("event dropped: hook channel is closed");
    },
  }
}

#[cfg(test)]
mod test;
