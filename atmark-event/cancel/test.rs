use std::sync::{
  Arc,
  atomic::{
    AtomicUsize,
    Ordering,
  },
};

use tokio::sync::oneshot;

use crate::{
  TaskController,
  cancelable_future,
};

#[tokio::test]
async fn a_completed_future_returns_its_value() {
  let mut controller = TaskController::new();
  let handle = controller.restart();
  assert_eq!(cancelable_future(async { 7 }, handle).await, Some(7));
}

#[tokio::test]
async fn cancel_drops_the_future() {
  let completions = Arc::new(AtomicUsize::new(0));
  let mut controller = TaskController::new();
  let handle = controller.restart();

  let (gate_tx, gate_rx) = oneshot::channel::<()>();
  let counted = Arc::clone(&completions);
  let task = tokio::spawn(cancelable_future(
    async move {
      let _ = gate_rx.await;
      counted.fetch_add(1, Ordering::SeqCst);
    },
    handle,
  ));

  controller.cancel();
  assert_eq!(task.await.unwrap(), None);
  let _ = gate_tx.send(());
  assert_eq!(completions.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn restart_cancels_the_previous_handle() {
  let mut controller = TaskController::new();
  let first = controller.restart();
  let second = controller.restart();
  assert!(first.is_canceled());
  assert!(!second.is_canceled());
}

#[tokio::test]
async fn is_running_tracks_handle_lifetime() {
  let mut controller = TaskController::new();
  assert!(!controller.is_running());
  let handle = controller.restart();
  assert!(controller.is_running());
  drop(handle);
  assert!(!controller.is_running());
}
