use thiserror::Error;

/// Domain failures surfaced to the learner as short inline notices.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    #[error("{0}")]
    Validation(&'static str),
    #[error("{0}")]
    Parse(&'static str),
    #[error("{0}")]
    NotFound(&'static str),
    #[error("storage error: {0}")]
    Storage(&'static str),
}

/// Failures reported by a [`crate::KeyValueStore`] backend.
///
/// These never cross the [`crate::Storage`] adapter: reads fall back to
/// defaults and writes report `false`.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store unavailable")]
    Unavailable,
    #[error("quota exceeded: {needed} bytes needed, {limit} allowed")]
    QuotaExceeded { needed: usize, limit: usize },
    #[error("io: {0}")]
    Io(String),
}
