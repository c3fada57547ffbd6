//! Conversion between host-native text offsets and char-index space.
//!
//! Host toolkits report cursor and selection positions in whatever unit
//! their string type uses: UTF-16 code units on most UI frameworks, bytes
//! for Rust-native hosts. Everything else in this workspace manipulates
//! Unicode-scalar (char) indices exclusively, so a native offset is
//! converted here exactly once, at the boundary. Conversions that do not
//! land on a scalar boundary or point past the end of the buffer are
//! errors, never clamped: a silently clamped offset can make the engine
//! edit text it was never asked about.

use ropey::RopeSlice;
use serde::{
  Deserialize,
  Serialize,
};
use thiserror::Error;

/// The index unit the buffer host reports positions in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OffsetEncoding {
  /// Byte offsets.
  Utf8,
  /// UTF-16 code unit offsets, the default for UI toolkits.
  #[default]
  Utf16,
  /// Char offsets. The identity encoding.
  Utf32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PositionError {
  #[error("offset {offset} is past the end of the buffer (length {len})")]
  OutOfRange { offset: usize, len: usize },
  #[error("offset {0} does not land on a character boundary")]
  NotCharBoundary(usize),
  #[error("range {start}..{end} is not ascending or exceeds the buffer")]
  InvalidRange { start: usize, end: usize },
}

/// A half-open `[start, end)` range in char-index space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CharRange {
  pub start: usize,
  pub end:   usize,
}

impl CharRange {
  pub fn new(start: usize, end: usize) -> Self {
    debug_assert!(start <= end);
    Self { start, end }
  }

  pub fn len(&self) -> usize {
    self.end - self.start
  }

  pub fn is_empty(&self) -> bool {
    self.start == self.end
  }

  /// Whether `idx` falls inside the range. Half-open: the end index is not
  /// contained.
  pub fn contains(&self, idx: usize) -> bool {
    self.start <= idx && idx < self.end
  }

  /// Whether an edit covering `self` disturbs the interior of `other`.
  ///
  /// Insertions exactly at a boundary (`self` empty at `other.start` or
  /// `other.end`) do not: they leave the spanned text byte-for-byte intact.
  pub fn breaks(&self, other: CharRange) -> bool {
    self.start < other.end && self.end > other.start
  }
}

/// Converts a host-native offset to a char index.
pub fn to_char_idx(
  text: RopeSlice,
  offset: usize,
  encoding: OffsetEncoding,
) -> Result<usize, PositionError> {
  match encoding {
    OffsetEncoding::Utf8 => {
      let len = text.len_bytes();
      if offset > len {
        return Err(PositionError::OutOfRange { offset, len });
      }
      let char_idx = text.byte_to_char(offset);
      if text.char_to_byte(char_idx) != offset {
        return Err(PositionError::NotCharBoundary(offset));
      }
      Ok(char_idx)
    },
    OffsetEncoding::Utf16 => {
      let len = text.len_utf16_cu();
      if offset > len {
        return Err(PositionError::OutOfRange { offset, len });
      }
      let char_idx = text.utf16_cu_to_char(offset);
      if text.char_to_utf16_cu(char_idx) != offset {
        // The offset points into the middle of a surrogate pair.
        return Err(PositionError::NotCharBoundary(offset));
      }
      Ok(char_idx)
    },
    OffsetEncoding::Utf32 => {
      let len = text.len_chars();
      if offset > len {
        return Err(PositionError::OutOfRange { offset, len });
      }
      Ok(offset)
    },
  }
}

/// Converts a char index back to a host-native offset.
pub fn from_char_idx(
  text: RopeSlice,
  char_idx: usize,
  encoding: OffsetEncoding,
) -> Result<usize, PositionError> {
  let len = text.len_chars();
  if char_idx > len {
    return Err(PositionError::OutOfRange {
      offset: char_idx,
      len,
    });
  }
  Ok(match encoding {
    OffsetEncoding::Utf8 => text.char_to_byte(char_idx),
    OffsetEncoding::Utf16 => text.char_to_utf16_cu(char_idx),
    OffsetEncoding::Utf32 => char_idx,
  })
}

/// Converts a pair of host-native offsets to a [`CharRange`].
pub fn to_char_range(
  text: RopeSlice,
  start: usize,
  end: usize,
  encoding: OffsetEncoding,
) -> Result<CharRange, PositionError> {
  let start = to_char_idx(text, start, encoding)?;
  let end = to_char_idx(text, end, encoding)?;
  if start > end {
    return Err(PositionError::InvalidRange { start, end });
  }
  Ok(CharRange::new(start, end))
}

/// Extracts the text covered by `range`.
pub fn substring(text: RopeSlice, range: CharRange) -> Result<String, PositionError> {
  if range.start > range.end || range.end > text.len_chars() {
    return Err(PositionError::InvalidRange {
      start: range.start,
      end:   range.end,
    });
  }
  Ok(text.slice(range.start..range.end).to_string())
}
