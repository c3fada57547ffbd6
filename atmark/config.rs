use std::{
  num::NonZeroUsize,
  time::Duration,
};

use atmark_core::{
  MentionPolicy,
  OffsetEncoding,
};

/// Engine-wide configuration. The defaults suit an interactive chat input:
/// a quarter second of idle typing before a provider round trip, and a
/// small per-engine result cache.
#[derive(Debug, Clone)]
pub struct EngineConfig {
  /// Trigger and disqualifier heuristics.
  pub policy: MentionPolicy,
  /// The index unit the buffer host reports positions in.
  pub encoding: OffsetEncoding,
  /// Idle-typing delay before the lookup provider is invoked.
  pub debounce: Duration,
  /// Bound on cached lookup results, evicted least-recently-used.
  pub cache_capacity: NonZeroUsize,
  /// Age past which a cached result is treated as absent.
  pub cache_ttl: Duration,
}

impl Default for EngineConfig {
  fn default() -> Self {
    Self {
      policy: MentionPolicy::default(),
      encoding: OffsetEncoding::default(),
      debounce: Duration::from_millis(250),
      cache_capacity: const { NonZeroUsize::new(64).unwrap() },
      cache_ttl: Duration::from_secs(60),
    }
  }
}
