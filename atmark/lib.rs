//! atmark — an embeddable @mention lifecycle engine.
//!
//! The engine watches an editable text buffer for a trigger character,
//! extracts the partially typed name behind it, funnels it through a
//! debounced and cached asynchronous lookup, and commits the accepted
//! candidate as a range-bound span that serializes to
//! `[@displayName](user:id)` wire text and back.
//!
//! The host owns the buffer and the candidate list UI; the engine owns the
//! mention lifecycle. Integration is three calls and a trait:
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use atmark::{
//!   EngineConfig,
//!   EntityLookup,
//!   EntityRef,
//!   LookupError,
//!   MentionEngine,
//! };
//! use ropey::Rope;
//!
//! struct Directory;
//!
//! #[async_trait::async_trait]
//! impl EntityLookup for Directory {
//!   async fn query(&self, _term: &str) -> Result<Vec<EntityRef>, LookupError> {
//!     Ok(vec![EntityRef::new("7", "Alice Ng")])
//!   }
//! }
//!
//! # async fn demo() {
//! let mut engine = MentionEngine::new(EngineConfig::default(), Arc::new(Directory));
//! let text = Rope::from_str("Hey @al");
//! engine.notify_text_changed(&text, 7);
//! # }
//! ```

mod config;
mod engine;
mod lookup;
mod provider;

pub use atmark_core::{
  CharRange,
  CommitError,
  Committed,
  EntityId,
  EntityRef,
  MentionPolicy,
  OffsetEncoding,
  PositionError,
  SearchState,
  Span,
  SpanSet,
};
pub use config::EngineConfig;
pub use engine::{
  MentionEngine,
  MentionObserver,
};
pub use lookup::{
  LookupOutcome,
  RequestId,
};
pub use provider::{
  EntityLookup,
  LookupError,
};
