//! Cooperative cancellation for in-flight lookup tasks.
//!
//! A [`TaskController`] hands out generation-stamped [`TaskHandle`]s.
//! Restarting or cancelling the controller bumps the generation, which
//! every outstanding handle observes; [`cancelable_future`] races a future
//! against its handle so a superseded task is dropped instead of finishing.

use std::{
  future::Future,
  sync::{
    Arc,
    Weak,
  },
};

use tokio::sync::watch;

#[derive(Debug)]
pub struct TaskController {
  generation: watch::Sender<u64>,
  current:    u64,
  live:       Weak<()>,
}

impl TaskController {
  pub fn new() -> Self {
    let (generation, _) = watch::channel(0);
    Self {
      generation,
      current: 0,
      live: Weak::new(),
    }
  }

  /// Cancels any outstanding handle and returns a fresh one for the task
  /// about to start.
  pub fn restart(&mut self) -> TaskHandle {
    self.current += 1;
    // send_replace: the value must be stored even while no handle exists.
    self.generation.send_replace(self.current);
    let live = Arc::new(());
    self.live = Arc::downgrade(&live);
    TaskHandle {
      generation: self.generation.subscribe(),
      expected:   self.current,
      _live:      live,
    }
  }

  /// Cancels any outstanding handle without starting a new task.
  pub fn cancel(&mut self) {
    self.current += 1;
    self.generation.send_replace(self.current);
  }

  /// Whether a task started by [`restart`](Self::restart) is still holding
  /// its handle.
  pub fn is_running(&self) -> bool {
    self.live.strong_count() > 0
  }
}

impl Default for TaskController {
  fn default() -> Self {
    Self::new()
  }
}

#[derive(Debug)]
pub struct TaskHandle {
  generation: watch::Receiver<u64>,
  expected:   u64,
  _live:      Arc<()>,
}

impl TaskHandle {
  pub fn is_canceled(&self) -> bool {
    *self.generation.borrow() != self.expected
  }

  /// Resolves once the controller moves past this handle's generation.
  /// A dropped controller counts as cancellation.
  pub async fn canceled(&mut self) {
    loop {
      if *self.generation.borrow_and_update() != self.expected {
        return;
      }
      if self.generation.changed().await.is_err() {
        return;
      }
    }
  }
}

/// Runs `future` to completion unless `handle` is cancelled first, in
/// which case the future is dropped and `None` returned.
pub async fn cancelable_future<T>(future: impl Future<Output = T>, mut handle: TaskHandle) -> Option<T> {
  tokio::select! {
    biased;
    _ = handle.canceled() => None,
    result = future => Some(result),
  }
}

#[cfg(test)]
mod test;
