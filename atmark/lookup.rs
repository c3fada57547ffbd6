//! The throttled, cached gateway in front of the lookup provider.
//!
//! Implemented as an [`AsyncHook`]: the engine feeds it
//! [`LookupEvent`]s, the debounce deadline collapses keystroke bursts into
//! a single provider call, and outcomes flow back to the engine through an
//! unbounded channel. At most one provider call is in flight; a newer
//! request cancels it rather than racing it, so a result for a stale term
//! can never reach the candidate list.

use std::{
  sync::Arc,
  time::Duration,
};

use atmark_core::EntityRef;
use atmark_event::{
  AsyncHook,
  TaskController,
  cancelable_future,
};
use lru::LruCache;
use parking_lot::Mutex;
use tokio::{
  sync::mpsc,
  time::Instant,
};

use crate::{
  config::EngineConfig,
  provider::{
    EntityLookup,
    LookupError,
  },
};

/// Monotonically increasing per-engine request identifier. Outcomes carry
/// the id of the request that produced them so the engine can discard
/// anything superseded.
pub type RequestId = u64;

#[derive(Debug)]
pub(crate) enum LookupEvent {
  Request { id: RequestId, term: String },
  Cancel,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LookupOutcome {
  Results {
    id:         RequestId,
    term:       String,
    candidates: Vec<EntityRef>,
    from_cache: bool,
  },
  Failed {
    id:    RequestId,
    term:  String,
    error: LookupError,
  },
}

impl LookupOutcome {
  pub fn request_id(&self) -> RequestId {
    match self {
      LookupOutcome::Results { id, .. } | LookupOutcome::Failed { id, .. } => *id,
    }
  }
}

/// Case-folded, trimmed cache key. "Al" and "al " answer from one entry.
pub(crate) fn normalize_term(term: &str) -> String {
  term.trim().to_lowercase()
}

struct CacheEntry {
  candidates:  Vec<EntityRef>,
  inserted_at: std::time::Instant,
}

#[derive(Debug, Clone)]
struct PendingQuery {
  id:   RequestId,
  term: String,
  key:  String,
}

pub(crate) struct LookupHook {
  provider:   Arc<dyn EntityLookup>,
  cache:      Arc<Mutex<LruCache<String, CacheEntry>>>,
  debounce:   Duration,
  cache_ttl:  Duration,
  pending:    Option<PendingQuery>,
  controller: TaskController,
  outcome_tx: mpsc::UnboundedSender<LookupOutcome>,
}

impl LookupHook {
  pub(crate) fn new(
    provider: Arc<dyn EntityLookup>,
    config: &EngineConfig,
    outcome_tx: mpsc::UnboundedSender<LookupOutcome>,
  ) -> Self {
    Self {
      provider,
      cache: Arc::new(Mutex::new(LruCache::new(config.cache_capacity))),
      debounce: config.debounce,
      cache_ttl: config.cache_ttl,
      pending: None,
      controller: TaskController::new(),
      outcome_tx,
    }
  }

  /// A fresh cached result for `key`, refreshing its recency. Entries past
  /// the TTL are dropped on sight.
  fn cached(&self, key: &str) -> Option<Vec<EntityRef>> {
    let mut cache = self.cache.lock();
    match cache.get(key) {
      None => return None,
      Some(entry) if entry.inserted_at.elapsed() < self.cache_ttl => {
        return Some(entry.candidates.clone());
      },
      // Expired: fall through and drop the entry.
      Some(_) => {},
    }
    cache.pop(key);
    None
  }
}

impl AsyncHook for LookupHook {
  type Event = LookupEvent;

  fn handle_event(&mut self, event: Self::Event, _timeout: Option<Instant>) -> Option<Instant> {
    match event {
      LookupEvent::Request { id, term } => {
        let key = normalize_term(&term);
        if let Some(candidates) = self.cached(&key) {
          // Answered from cache: no debounce, no provider round trip, and
          // anything still in flight is for an older term.
          self.pending = None;
          self.controller.cancel();
          let _ = self.outcome_tx.send(LookupOutcome::Results {
            id,
            term,
            candidates,
            from_cache: true,
          });
          return None;
        }
        // A newer request supersedes anything already in flight; stale
        // results must never surface, so cancel rather than ignore.
        self.controller.cancel();
        self.pending = Some(PendingQuery { id, term, key });
        Some(Instant::now() + self.debounce)
      },
      LookupEvent::Cancel => {
        self.pending = None;
        self.controller.cancel();
        None
      },
    }
  }

  fn finish_debounce(&mut self) {
    let Some(query) = self.pending.take() else {
      return;
    };
    let handle = self.controller.restart();
    let provider = Arc::clone(&self.provider);
    let cache = Arc::clone(&self.cache);
    let outcome_tx = self.outcome_tx.clone();
    tokio::spawn(async move {
      let Some(result) = cancelable_future(provider.query(&query.term), handle).await else {
        log::debug!("lookup for {:?} superseded before completion", query.term);
        return;
      };
      let outcome = match result {
        Ok(candidates) => {
          cache.lock().put(query.key, CacheEntry {
            candidates: candidates.clone(),
            inserted_at: std::time::Instant::now(),
          });
          LookupOutcome::Results {
            id: query.id,
            term: query.term,
            candidates,
            from_cache: false,
          }
        },
        Err(error) => {
          log::warn!("lookup for {:?} failed: {error}", query.term);
          LookupOutcome::Failed {
            id: query.id,
            term: query.term,
            error,
          }
        },
      };
      let _ = outcome_tx.send(outcome);
    });
  }
}
