use std::{
  sync::{
    Arc,
    atomic::{
      AtomicUsize,
      Ordering,
    },
  },
  time::Duration,
};

use tokio::time::Instant;

use crate::{
  AsyncHook,
  send_blocking,
};

struct CountingHook {
  events:   Arc<AtomicUsize>,
  finishes: Arc<AtomicUsize>,
  debounce: Duration,
}

impl AsyncHook for CountingHook {
  type Event = ();

  fn handle_event(&mut self, _event: (), _timeout: Option<Instant>) -> Option<Instant> {
    self.events.fetch_add(1, Ordering::SeqCst);
    Some(Instant::now() + self.debounce)
  }

  fn finish_debounce(&mut self) {
    self.finishes.fetch_add(1, Ordering::SeqCst);
  }
}

#[tokio::test]
async fn a_burst_of_events_finishes_one_debounce() {
  let events = Arc::new(AtomicUsize::new(0));
  let finishes = Arc::new(AtomicUsize::new(0));
  let tx = CountingHook {
    events:   Arc::clone(&events),
    finishes: Arc::clone(&finishes),
    debounce: Duration::from_millis(10),
  }
  .spawn();

  for _ in 0..3 {
    send_blocking(&tx, ());
  }
  tokio::time::sleep(Duration::from_millis(200)).await;

  assert_eq!(events.load(Ordering::SeqCst), 3);
  assert_eq!(finishes.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn quiet_hooks_never_finish() {
  let events = Arc::new(AtomicUsize::new(0));
  let finishes = Arc::new(AtomicUsize::new(0));
  let _tx = CountingHook {
    events:   Arc::clone(&events),
    finishes: Arc::clone(&finishes),
    debounce: Duration::from_millis(10),
  }
  .spawn();

  tokio::time::sleep(Duration::from_millis(50)).await;
  assert_eq!(finishes.load(Ordering::SeqCst), 0);
}
