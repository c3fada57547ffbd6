//! The mention search state machine.
//!
//! One tracker per buffer. Every buffer-change event re-derives whether the
//! cursor sits inside an active mention search, because a name may contain
//! a single interior space and free text contains many spaces: there is no
//! terminating character to wait for. The tracker instead bounds the search
//! window heuristically and re-validates it on every keystroke.

use ropey::RopeSlice;

use crate::{
  chars::{
    char_is_line_ending,
    char_is_punctuation,
    char_is_whitespace,
  },
  position::CharRange,
};

/// Tunable disqualifier heuristics. A single interior space is always
/// tolerated (two-word real names); runaway whitespace, a line break or an
/// over-long run signals the user moved past mention intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MentionPolicy {
  /// The trigger character.
  pub delimiter: char,
  /// Maximum term length in chars before the search is abandoned.
  pub max_term_len: usize,
  /// Abandon the search when the term contains punctuation.
  pub abort_on_punctuation: bool,
}

impl Default for MentionPolicy {
  fn default() -> Self {
    Self {
      delimiter: '@',
      max_term_len: 32,
      abort_on_punctuation: false,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SearchState {
  #[default]
  Inactive,
  Searching {
    /// Char index of the delimiter.
    delimiter_idx: usize,
    /// Text between the delimiter and the cursor.
    term: String,
  },
}

/// What a single buffer-change event produced. At most one per event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackerEvent {
  /// A search began. Carries the initial term, which is non-empty when the
  /// cursor lands inside pre-existing delimiter text.
  Entered { term: String },
  /// The search term changed since the last emission.
  TermChanged { term: String },
  /// The search ended without a commit.
  Exited,
}

#[derive(Debug)]
pub struct MentionTracker {
  policy: MentionPolicy,
  state:  SearchState,
}

impl MentionTracker {
  pub fn new(policy: MentionPolicy) -> Self {
    Self {
      policy,
      state: SearchState::Inactive,
    }
  }

  pub fn state(&self) -> &SearchState {
    &self.state
  }

  pub fn is_searching(&self) -> bool {
    matches!(self.state, SearchState::Searching { .. })
  }

  /// The range a commit would replace: the delimiter plus the term.
  pub fn pending_range(&self) -> Option<CharRange> {
    match &self.state {
      SearchState::Inactive => None,
      SearchState::Searching {
        delimiter_idx,
        term,
      } => {
        Some(CharRange::new(
          *delimiter_idx,
          delimiter_idx + 1 + term.chars().count(),
        ))
      },
    }
  }

  /// Forces the tracker back to `Inactive` (commit, or a wholesale buffer
  /// replacement). Emits `Exited` if a search was active.
  pub fn reset(&mut self) -> Option<TrackerEvent> {
    match std::mem::take(&mut self.state) {
      SearchState::Inactive => None,
      SearchState::Searching { .. } => Some(TrackerEvent::Exited),
    }
  }

  /// Feeds one buffer-change event `(new_text, cursor)` through the state
  /// machine. The cursor is a char index; the caller converts host-native
  /// offsets first and treats conversion failures as a no-op.
  pub fn update(&mut self, text: RopeSlice, cursor: usize) -> Option<TrackerEvent> {
    debug_assert!(cursor <= text.len_chars());
    match &self.state {
      SearchState::Inactive => {
        let (delimiter_idx, term) = self.find_trigger(text, cursor)?;
        log::debug!("mention search entered at {delimiter_idx} with term {term:?}");
        self.state = SearchState::Searching {
          delimiter_idx,
          term: term.clone(),
        };
        Some(TrackerEvent::Entered { term })
      },
      SearchState::Searching {
        delimiter_idx,
        term: previous,
      } => {
        let delimiter_idx = *delimiter_idx;
        if !self.still_triggered(text, cursor, delimiter_idx) {
          log::debug!("mention search exited");
          self.state = SearchState::Inactive;
          return Some(TrackerEvent::Exited);
        }
        let term: String = text.slice(delimiter_idx + 1..cursor).to_string();
        if self.disqualified(&term) {
          log::debug!("mention search abandoned on term {term:?}");
          self.state = SearchState::Inactive;
          return Some(TrackerEvent::Exited);
        }
        if term == *previous {
          return None;
        }
        self.state = SearchState::Searching {
          delimiter_idx,
          term: term.clone(),
        };
        Some(TrackerEvent::TermChanged { term })
      },
    }
  }

  /// Backward scan for a trigger: the nearest delimiter before the cursor,
  /// preceded by whitespace or buffer start, with a valid term between it
  /// and the cursor. The scan is bounded by the policy's maximum term
  /// length; nothing further back could validate anyway.
  fn find_trigger(&self, text: RopeSlice, cursor: usize) -> Option<(usize, String)> {
    let mut ws_run = 0usize;
    let mut idx = cursor;
    let mut chars = text.chars_at(cursor).reversed();
    for _ in 0..=self.policy.max_term_len {
      let ch = chars.next()?;
      idx -= 1;
      if ch == self.policy.delimiter {
        if idx > 0 && !char_is_whitespace(text.char(idx - 1)) {
          // An email-style `@` glued to preceding text never triggers.
          return None;
        }
        let term: String = text.slice(idx + 1..cursor).to_string();
        if self.disqualified(&term) {
          return None;
        }
        return Some((idx, term));
      }
      if char_is_line_ending(ch) {
        return None;
      }
      if char_is_whitespace(ch) {
        ws_run += 1;
        if ws_run > 1 {
          return None;
        }
      } else {
        ws_run = 0;
      }
    }
    None
  }

  /// Re-validates a stored trigger position against the current buffer:
  /// the cursor must still be past the delimiter, the delimiter character
  /// must still be there, and it must still start a word.
  fn still_triggered(&self, text: RopeSlice, cursor: usize, delimiter_idx: usize) -> bool {
    cursor > delimiter_idx
      && delimiter_idx < text.len_chars()
      && text.char(delimiter_idx) == self.policy.delimiter
      && (delimiter_idx == 0 || char_is_whitespace(text.char(delimiter_idx - 1)))
  }

  fn disqualified(&self, term: &str) -> bool {
    let mut len = 0usize;
    let mut ws_run = 0usize;
    for ch in term.chars() {
      len += 1;
      if len > self.policy.max_term_len {
        return true;
      }
      if char_is_line_ending(ch) {
        return true;
      }
      if char_is_whitespace(ch) {
        ws_run += 1;
        if ws_run > 1 {
          return true;
        }
      } else {
        ws_run = 0;
      }
      if self.policy.abort_on_punctuation && char_is_punctuation(ch) {
        return true;
      }
    }
    false
  }
}

#[cfg(test)]
mod test;
