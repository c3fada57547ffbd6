//! The textual wire form of committed mentions.
//!
//! A span serializes to `[@displayName](user:id)`. Both fields
//! backslash-escape `\`, `[`, `]`, `(` and `)` so any display name or id
//! round-trips exactly. Decoding is lenient: anything that does not parse
//! as a complete token stays in the message as literal text, so a mangled
//! mention never makes the surrounding message unreadable.

use ropey::Rope;

use crate::{
  chars::char_is_line_ending,
  position::CharRange,
  span::{
    EntityId,
    EntityRef,
    Span,
    SpanSet,
  },
};

const ESCAPED: [char; 5] = ['\\', '[', ']', '(', ')'];

/// Result of parsing wire text: the plain display text plus the spans
/// recomputed against it.
#[derive(Debug, Clone, PartialEq)]
pub struct Decoded {
  pub text:  Rope,
  pub spans: SpanSet,
}

fn escape_field(field: &str, out: &mut String) {
  for ch in field.chars() {
    if ESCAPED.contains(&ch) {
      out.push('\\');
    }
    out.push(ch);
  }
}

fn token_text(entity: &EntityRef) -> String {
  let mut out = String::with_capacity(entity.display_name.len() + 16);
  out.push_str("[@");
  escape_field(&entity.display_name, &mut out);
  out.push_str("](user:");
  escape_field(entity.id.as_str(), &mut out);
  out.push(')');
  out
}

/// Serializes a buffer and its spans to wire text by replacing each span's
/// range, in descending order, with its token.
pub fn encode(text: &Rope, spans: &SpanSet) -> String {
  let mut out = text.clone();
  let ordered: Vec<&Span> = spans.iter().collect();
  for span in ordered.iter().rev() {
    out.remove(span.range.start..span.range.end);
    out.insert(span.range.start, &token_text(&span.entity));
  }
  out.to_string()
}

/// Parses wire text back into plain text and spans. Infallible: malformed
/// tokens are kept as literal text.
pub fn decode(wire: &str) -> Decoded {
  let chars: Vec<char> = wire.chars().collect();
  let mut plain = String::with_capacity(wire.len());
  let mut plain_len = 0usize;
  let mut spans = SpanSet::new();
  let mut i = 0;
  while i < chars.len() {
    if chars[i] == '[' {
      if let Some((entity, consumed)) = parse_token_at(&chars, i) {
        let display_len = entity.display_name.chars().count();
        spans.insert(Span {
          range: CharRange::new(plain_len, plain_len + display_len),
          entity: entity.clone(),
        });
        plain.push_str(&entity.display_name);
        plain_len += display_len;
        i += consumed;
        continue;
      }
    }
    plain.push(chars[i]);
    plain_len += 1;
    i += 1;
  }
  Decoded {
    text: Rope::from(plain.as_str()),
    spans,
  }
}

/// Tries to parse a complete token starting at `start` (which points at a
/// `[`). Returns the entity and the number of chars consumed.
fn parse_token_at(chars: &[char], start: usize) -> Option<(EntityRef, usize)> {
  let mut i = start + 1;
  if chars.get(i) != Some(&'@') {
    return None;
  }
  i += 1;
  let display_name = read_field(chars, &mut i, ']')?;
  for expected in "(user:".chars() {
    if chars.get(i) != Some(&expected) {
      return None;
    }
    i += 1;
  }
  let id = read_field(chars, &mut i, ')')?;
  if display_name.is_empty() || id.is_empty() {
    return None;
  }
  let entity = EntityRef {
    id: EntityId::from(id),
    display_name,
  };
  Some((entity, i - start))
}

/// Reads an escaped field up to (and past) the unescaped terminator.
/// Fails on end of input or a line ending; tokens never span lines.
fn read_field(chars: &[char], i: &mut usize, terminator: char) -> Option<String> {
  let mut out = String::new();
  while let Some(&ch) = chars.get(*i) {
    if ch == '\\' {
      if let Some(&escaped) = chars.get(*i + 1) {
        out.push(escaped);
        *i += 2;
        continue;
      }
      return None;
    }
    if ch == terminator {
      *i += 1;
      return Some(out);
    }
    if ch == '[' {
      // An unescaped `[` starts a new token, never continues a field.
      return None;
    }
    if char_is_line_ending(ch) {
      return None;
    }
    out.push(ch);
    *i += 1;
  }
  None
}
