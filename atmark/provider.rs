use async_trait::async_trait;
use atmark_core::EntityRef;
use thiserror::Error;

/// Why a lookup failed. Opaque to the engine: it is surfaced to the list
/// host verbatim, never cached and never retried automatically.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("lookup failed: {message}")]
pub struct LookupError {
  pub message: String,
}

impl LookupError {
  pub fn new(message: impl Into<String>) -> Self {
    Self {
      message: message.into(),
    }
  }
}

/// The capability the integrator supplies: given a partially typed name,
/// produce candidate entities. May be a local filter over a member list or
/// a remote directory API; the engine only sees `{id, display_name}` pairs
/// and leaves ranking to the provider.
#[async_trait]
pub trait EntityLookup: Send + Sync {
  async fn query(&self, term: &str) -> Result<Vec<EntityRef>, LookupError>;
}
