//! The engine facade tying the tracker, the span set and the lookup
//! gateway together behind the host-facing notification surface.

use std::sync::Arc;

use atmark_core::{
  CharRange,
  CommitError,
  Committed,
  EntityRef,
  SearchState,
  Span,
  SpanSet,
  commit,
  position::{
    self,
    PositionError,
  },
  tracker::{
    MentionTracker,
    TrackerEvent,
  },
  wire,
};
use atmark_event::{
  AsyncHook,
  send_blocking,
};
use ropey::Rope;
use tokio::sync::mpsc;

use crate::{
  config::EngineConfig,
  lookup::{
    LookupEvent,
    LookupHook,
    LookupOutcome,
    RequestId,
  },
  provider::{
    EntityLookup,
    LookupError,
  },
};

/// One of possibly many listeners on the engine. Every method has a no-op
/// default so a host implements only what it renders: the buffer host
/// cares about `apply_replacement`, the list host about the search and
/// result callbacks. Registration-based on purpose: the engine is never
/// the exclusive delegate of anything.
pub trait MentionObserver {
  /// A mention search began; the list host should prepare its UI.
  fn search_started(&mut self) {}
  /// Fresh candidates for the current term.
  fn results_available(&mut self, _term: &str, _candidates: &[EntityRef]) {}
  /// The provider failed for the given term. Render an empty-with-error
  /// state; the engine will re-query when the term changes.
  fn lookup_failed(&mut self, _term: &str, _error: &LookupError) {}
  /// The search ended, by commit or abandonment.
  fn search_ended(&mut self) {}
  /// The engine asks the buffer host to replace a range (char indices;
  /// [`MentionEngine::to_native_offset`] converts) with new text, styling
  /// it per the span when present.
  fn apply_replacement(&mut self, _range: CharRange, _text: &str, _span: Option<&Span>) {}
}

pub struct MentionEngine {
  config:         EngineConfig,
  tracker:        MentionTracker,
  spans:          SpanSet,
  snapshot:       Rope,
  observers:      Vec<Box<dyn MentionObserver>>,
  lookup_tx:      mpsc::Sender<LookupEvent>,
  outcome_rx:     mpsc::UnboundedReceiver<LookupOutcome>,
  next_request:   RequestId,
  active_request: Option<RequestId>,
}

impl MentionEngine {
  /// Builds an engine around the integrator's lookup provider. Must be
  /// called within a tokio runtime; the lookup gateway runs as a
  /// background task.
  pub fn new(config: EngineConfig, provider: Arc<dyn EntityLookup>) -> Self {
    let (outcome_tx, outcome_rx) = mpsc::unbounded_channel();
    let hook = LookupHook::new(provider, &config, outcome_tx);
    let lookup_tx = hook.spawn();
    Self {
      tracker: MentionTracker::new(config.policy.clone()),
      config,
      spans: SpanSet::new(),
      snapshot: Rope::new(),
      observers: Vec::new(),
      lookup_tx,
      outcome_rx,
      next_request: 0,
      active_request: None,
    }
  }

  pub fn add_observer(&mut self, observer: Box<dyn MentionObserver>) {
    self.observers.push(observer);
  }

  /// The engine's snapshot of the buffer, as of the last notification.
  pub fn text(&self) -> &Rope {
    &self.snapshot
  }

  pub fn spans(&self) -> &SpanSet {
    &self.spans
  }

  pub fn search_state(&self) -> &SearchState {
    self.tracker.state()
  }

  /// The range a commit would replace (delimiter plus term), while a
  /// search is active.
  pub fn pending_range(&self) -> Option<CharRange> {
    self.tracker.pending_range()
  }

  /// Converts a char index in the engine's snapshot back to the host's
  /// native unit.
  pub fn to_native_offset(&self, char_idx: usize) -> Result<usize, PositionError> {
    position::from_char_idx(self.snapshot.slice(..), char_idx, self.config.encoding)
  }

  /// Buffer-change notification: the new text and the cursor position in
  /// the host's native unit. Drives the search state machine and the
  /// lookup gateway. A cursor that fails conversion leaves the engine
  /// unchanged; transient bad cursor reports must not corrupt state.
  pub fn notify_text_changed(&mut self, text: &Rope, cursor_native: usize) {
    self.snapshot = text.clone();
    let cursor = match position::to_char_idx(text.slice(..), cursor_native, self.config.encoding) {
      Ok(cursor) => cursor,
      Err(err) => {
        log::debug!("ignoring buffer change with unconvertible cursor: {err}");
        return;
      },
    };
    match self.tracker.update(text.slice(..), cursor) {
      Some(TrackerEvent::Entered { term }) => {
        self.emit(|observer| observer.search_started());
        self.request_lookup(term);
      },
      Some(TrackerEvent::TermChanged { term }) => {
        self.request_lookup(term);
      },
      Some(TrackerEvent::Exited) => {
        self.cancel_lookup();
        self.emit(|observer| observer.search_ended());
      },
      None => {},
    }
  }

  /// Pre-edit notification: the host is about to replace `start..end`
  /// (native units) with `replacement`. Returns the spans the edit
  /// retracts so the host can drop their styling; spans past the edit are
  /// shifted to their post-edit positions.
  pub fn notify_will_apply_edit(
    &mut self,
    start_native: usize,
    end_native: usize,
    replacement: &str,
  ) -> Result<Vec<Span>, PositionError> {
    let edit = position::to_char_range(
      self.snapshot.slice(..),
      start_native,
      end_native,
      self.config.encoding,
    )?;
    let retracted = self.spans.apply_edit(edit, replacement.chars().count());
    if !retracted.is_empty() {
      log::debug!("edit {edit:?} retracted {} mention span(s)", retracted.len());
    }
    Ok(retracted)
  }

  /// Whose mention, if any, sits under `position_native`.
  pub fn notify_tap(&self, position_native: usize) -> Result<Option<EntityRef>, PositionError> {
    let char_idx =
      position::to_char_idx(self.snapshot.slice(..), position_native, self.config.encoding)?;
    Ok(self.spans.span_at(char_idx).map(|span| span.entity.clone()))
  }

  /// The list host accepted a candidate. `pending` is the range it
  /// captured when the selection was made; if the buffer moved on since,
  /// the commit fails with [`CommitError::StaleRange`] and the host may
  /// simply drop the selection.
  pub fn candidate_selected(
    &mut self,
    pending: CharRange,
    entity: EntityRef,
  ) -> Result<Committed, CommitError> {
    let current = self.tracker.pending_range();
    let committed = commit::commit(&self.snapshot, &mut self.spans, pending, current, entity)?;
    self.snapshot = committed.text.clone();
    self.tracker.reset();
    self.cancel_lookup();
    self.emit(|observer| observer.search_ended());
    let span = committed.span.clone();
    self.emit(|observer| {
      observer.apply_replacement(pending, &span.entity.display_name, Some(&span))
    });
    Ok(committed)
  }

  /// Drains every ready lookup outcome, forwarding fresh ones to the
  /// observers. Returns how many outcomes were applied (stale ones are
  /// discarded and not counted). Hosts with an event loop call this when
  /// idle; async hosts can use [`drive`](Self::drive) instead.
  pub fn poll(&mut self) -> usize {
    let mut applied = 0;
    while let Ok(outcome) = self.outcome_rx.try_recv() {
      if self.apply_outcome(outcome) {
        applied += 1;
      }
    }
    applied
  }

  /// Awaits the next lookup outcome and applies it. Returns `false` once
  /// the gateway is gone (engine shutdown).
  pub async fn drive(&mut self) -> bool {
    match self.outcome_rx.recv().await {
      Some(outcome) => {
        self.apply_outcome(outcome);
        true
      },
      None => false,
    }
  }

  /// Serializes the engine's snapshot and spans to wire text.
  pub fn encode_message(&self) -> String {
    wire::encode(&self.snapshot, &self.spans)
  }

  /// Replaces the engine's snapshot and spans with the parse of `wire_text`
  /// (a received or persisted message). Any active search is abandoned.
  pub fn load_message(&mut self, wire_text: &str) {
    if self.tracker.reset().is_some() {
      self.cancel_lookup();
      self.emit(|observer| observer.search_ended());
    }
    let decoded = wire::decode(wire_text);
    self.snapshot = decoded.text;
    self.spans = decoded.spans;
  }

  fn request_lookup(&mut self, term: String) {
    let id = self.next_request;
    self.next_request += 1;
    self.active_request = Some(id);
    send_blocking(&self.lookup_tx, LookupEvent::Request { id, term });
  }

  fn cancel_lookup(&mut self) {
    self.active_request = None;
    send_blocking(&self.lookup_tx, LookupEvent::Cancel);
  }

  /// Applies one outcome if it is still fresh: the engine only ever
  /// surfaces results for the most recent request.
  fn apply_outcome(&mut self, outcome: LookupOutcome) -> bool {
    if self.active_request != Some(outcome.request_id()) {
      log::debug!("discarding lookup outcome for superseded request");
      return false;
    }
    match outcome {
      LookupOutcome::Results {
        term, candidates, ..
      } => {
        self.emit(|observer| observer.results_available(&term, &candidates));
      },
      LookupOutcome::Failed { term, error, .. } => {
        self.emit(|observer| observer.lookup_failed(&term, &error));
      },
    }
    true
  }

  fn emit<F: FnMut(&mut dyn MentionObserver)>(&mut self, mut f: F) {
    for observer in &mut self.observers {
      f(observer.as_mut());
    }
  }
}
