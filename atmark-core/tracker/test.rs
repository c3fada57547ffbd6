use ropey::Rope;

use crate::tracker::{
  MentionPolicy,
  MentionTracker,
  SearchState,
  TrackerEvent,
};

fn tracker() -> MentionTracker {
  MentionTracker::new(MentionPolicy::default())
}

fn entered(term: &str) -> Option<TrackerEvent> {
  Some(TrackerEvent::Entered {
    term: term.to_string(),
  })
}

fn term_changed(term: &str) -> Option<TrackerEvent> {
  Some(TrackerEvent::TermChanged {
    term: term.to_string(),
  })
}

#[test]
fn typing_a_delimiter_after_whitespace_enters_search() {
  let mut t = tracker();
  let text = Rope::from_str("Hey @");
  assert_eq!(t.update(text.slice(..), 5), entered(""));
  assert!(t.is_searching());
}

#[test]
fn delimiter_at_buffer_start_enters_search() {
  let mut t = tracker();
  let text = Rope::from_str("@al");
  assert_eq!(t.update(text.slice(..), 3), entered("al"));
}

#[test]
fn email_at_sign_does_not_trigger() {
  let mut t = tracker();
  let text = Rope::from_str("mail me at alice@ng");
  assert_eq!(t.update(text.slice(..), text.len_chars()), None);
  assert_eq!(*t.state(), SearchState::Inactive);
}

#[test]
fn term_tracks_keystrokes_and_emits_once_per_change() {
  let mut t = tracker();
  let text = Rope::from_str("Hey @a");
  assert_eq!(t.update(text.slice(..), 6), entered("a"));
  let text = Rope::from_str("Hey @al");
  assert_eq!(t.update(text.slice(..), 7), term_changed("al"));
  // Cursor nudged without a text change: no re-emission.
  assert_eq!(t.update(text.slice(..), 7), None);
}

#[test]
fn single_interior_space_is_tolerated() {
  let mut t = tracker();
  let text = Rope::from_str("Hey @alice n");
  assert_eq!(t.update(text.slice(..), 12), entered("alice n"));
}

#[test]
fn double_space_abandons_the_search() {
  let mut t = tracker();
  let text = Rope::from_str("Hey @alice");
  assert_eq!(t.update(text.slice(..), 10), entered("alice"));
  let text = Rope::from_str("Hey @alice  ");
  assert_eq!(t.update(text.slice(..), 12), Some(TrackerEvent::Exited));
  assert_eq!(*t.state(), SearchState::Inactive);
}

#[test]
fn newline_abandons_the_search() {
  let mut t = tracker();
  let text = Rope::from_str("Hey @al");
  assert_eq!(t.update(text.slice(..), 7), entered("al"));
  let text = Rope::from_str("Hey @al\n");
  assert_eq!(t.update(text.slice(..), 8), Some(TrackerEvent::Exited));
}

#[test]
fn over_length_term_abandons_the_search() {
  let mut t = MentionTracker::new(MentionPolicy {
    max_term_len: 4,
    ..Default::default()
  });
  let text = Rope::from_str("@abcd");
  assert_eq!(t.update(text.slice(..), 5), entered("abcd"));
  let text = Rope::from_str("@abcde");
  assert_eq!(t.update(text.slice(..), 6), Some(TrackerEvent::Exited));
}

#[test]
fn deleting_the_delimiter_exits() {
  let mut t = tracker();
  let text = Rope::from_str("Hey @al");
  assert_eq!(t.update(text.slice(..), 7), entered("al"));
  let text = Rope::from_str("Hey al");
  assert_eq!(t.update(text.slice(..), 6), Some(TrackerEvent::Exited));
}

#[test]
fn cursor_moved_before_the_delimiter_exits() {
  let mut t = tracker();
  let text = Rope::from_str("Hey @al");
  assert_eq!(t.update(text.slice(..), 7), entered("al"));
  assert_eq!(t.update(text.slice(..), 2), Some(TrackerEvent::Exited));
}

#[test]
fn text_glued_before_the_delimiter_exits() {
  let mut t = tracker();
  let text = Rope::from_str("Hey @al");
  assert_eq!(t.update(text.slice(..), 7), entered("al"));
  // The space before the delimiter was deleted.
  let text = Rope::from_str("Hey@al");
  assert_eq!(t.update(text.slice(..), 6), Some(TrackerEvent::Exited));
}

#[test]
fn cursor_landing_inside_existing_mention_text_enters_with_term() {
  let mut t = tracker();
  let text = Rope::from_str("Hey @alice bye");
  assert_eq!(t.update(text.slice(..), 10), entered("alice"));
}

#[test]
fn punctuation_policy_is_tunable() {
  let mut strict = MentionTracker::new(MentionPolicy {
    abort_on_punctuation: true,
    ..Default::default()
  });
  let text = Rope::from_str("@a.b");
  assert_eq!(strict.update(text.slice(..), 4), None);

  let mut lenient = tracker();
  assert_eq!(lenient.update(text.slice(..), 4), entered("a.b"));
}

#[test]
fn custom_delimiter() {
  let mut t = MentionTracker::new(MentionPolicy {
    delimiter: '#',
    ..Default::default()
  });
  let text = Rope::from_str("see #iss");
  assert_eq!(t.update(text.slice(..), 8), entered("iss"));
}

#[test]
fn pending_range_covers_delimiter_and_term() {
  let mut t = tracker();
  let text = Rope::from_str("Hey @al");
  t.update(text.slice(..), 7);
  assert_eq!(t.pending_range().map(|r| (r.start, r.end)), Some((4, 7)));
}

#[test]
fn pending_range_counts_chars_not_bytes() {
  let mut t = tracker();
  let text = Rope::from_str("🎉 @né");
  let cursor = text.len_chars();
  assert_eq!(t.update(text.slice(..), cursor), entered("né"));
  assert_eq!(t.pending_range().map(|r| (r.start, r.end)), Some((2, 5)));
}

#[test]
fn reset_emits_exited_only_when_searching() {
  let mut t = tracker();
  assert_eq!(t.reset(), None);
  let text = Rope::from_str("@a");
  t.update(text.slice(..), 2);
  assert_eq!(t.reset(), Some(TrackerEvent::Exited));
  assert_eq!(t.reset(), None);
}
