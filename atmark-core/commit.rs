//! Turning an accepted candidate into a committed span.

use ropey::Rope;
use thiserror::Error;

use crate::{
  position::CharRange,
  span::{
    EntityRef,
    Span,
    SpanSet,
  },
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommitError {
  /// The buffer changed between candidate selection and commit. Recoverable:
  /// re-derive the search state and retry, or drop the commit.
  #[error("pending range {pending:?} no longer matches the active search range {current:?}")]
  StaleRange {
    pending: CharRange,
    current: Option<CharRange>,
  },
}

/// A successful commit: the buffer with the pending text replaced, the span
/// that now covers the display name, and any spans the replacement
/// displaced (normally none).
#[derive(Debug, Clone, PartialEq)]
pub struct Committed {
  pub text:      Rope,
  pub span:      Span,
  pub retracted: Vec<Span>,
}

/// Replaces `pending` (the delimiter plus the typed term) with the
/// entity's display name and registers a span over the inserted text.
///
/// `current` is the search range the state machine holds right now;
/// `pending` is the range the list host captured at selection time. They
/// must still agree, otherwise the commit would splice stale coordinates
/// into a buffer that has moved on.
pub fn commit(
  text: &Rope,
  spans: &mut SpanSet,
  pending: CharRange,
  current: Option<CharRange>,
  entity: EntityRef,
) -> Result<Committed, CommitError> {
  if current != Some(pending) {
    return Err(CommitError::StaleRange { pending, current });
  }
  let display_len = entity.display_name.chars().count();
  let retracted = spans.apply_edit(pending, display_len);

  let mut out = text.clone();
  out.remove(pending.start..pending.end);
  out.insert(pending.start, &entity.display_name);

  let span = Span {
    range: CharRange::new(pending.start, pending.start + display_len),
    entity,
  };
  spans.insert(span.clone());
  Ok(Committed {
    text: out,
    span,
    retracted,
  })
}
