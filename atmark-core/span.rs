//! Committed mention spans and the entity references behind them.

use serde::{
  Deserialize,
  Serialize,
};

use crate::position::CharRange;

/// Opaque identifier of a mentionable entity. The engine never inspects it;
/// it only carries it between the lookup provider, the buffer and the wire.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl From<String> for EntityId {
  fn from(id: String) -> Self {
    Self(id)
  }
}

impl From<&str> for EntityId {
  fn from(id: &str) -> Self {
    Self(id.to_string())
  }
}

impl std::fmt::Display for EntityId {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(&self.0)
  }
}

/// What a committed mention points at, independent of its display text.
/// Immutable once committed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRef {
  pub id:           EntityId,
  pub display_name: String,
}

impl EntityRef {
  pub fn new(id: impl Into<EntityId>, display_name: impl Into<String>) -> Self {
    Self {
      id:           id.into(),
      display_name: display_name.into(),
    }
  }
}

/// A range of buffer text marked as representing an entity.
///
/// Invariant: the buffer substring at `range` equals the rendered mention
/// text. Any edit that disturbs the interior of `range` retracts the span.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
  pub range:  CharRange,
  pub entity: EntityRef,
}

/// The non-overlapping spans of one buffer, kept sorted by start index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpanSet {
  spans: Vec<Span>,
}

impl SpanSet {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn len(&self) -> usize {
    self.spans.len()
  }

  pub fn is_empty(&self) -> bool {
    self.spans.is_empty()
  }

  pub fn iter(&self) -> impl Iterator<Item = &Span> {
    self.spans.iter()
  }

  pub fn clear(&mut self) {
    self.spans.clear();
  }

  /// The span containing `char_idx`, if any. Half-open: a tap exactly at a
  /// span's end index misses it.
  pub fn span_at(&self, char_idx: usize) -> Option<&Span> {
    self
      .spans
      .iter()
      .find(|span| span.range.contains(char_idx))
  }

  /// Inserts a span. Caller must have cleared any overlap first (commit
  /// retracts overlapping spans before inserting).
  pub fn insert(&mut self, span: Span) {
    debug_assert!(
      !self.spans.iter().any(|s| span.range.breaks(s.range)),
      "span sets never hold overlapping spans"
    );
    let at = self
      .spans
      .partition_point(|s| s.range.start < span.range.start);
    self.spans.insert(at, span);
  }

  /// Applies an edit replacing `edit` with `replacement_len` chars of new
  /// text: retracts every span whose interior the edit disturbs and shifts
  /// spans past the edit by the length delta. Returns the retracted spans.
  pub fn apply_edit(&mut self, edit: CharRange, replacement_len: usize) -> Vec<Span> {
    let mut retracted = Vec::new();
    self.spans.retain(|span| {
      if edit.breaks(span.range) {
        retracted.push(span.clone());
        false
      } else {
        true
      }
    });
    for span in &mut self.spans {
      if span.range.start >= edit.end {
        let shifted = span.range.start - edit.len() + replacement_len;
        span.range = CharRange::new(shifted, shifted + span.range.len());
      }
    }
    retracted
  }
}

impl FromIterator<Span> for SpanSet {
  fn from_iter<I: IntoIterator<Item = Span>>(iter: I) -> Self {
    let mut set = SpanSet::new();
    for span in iter {
      set.insert(span);
    }
    set
  }
}
