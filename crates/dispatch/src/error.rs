use courier_core::error::CoreError;

/// Engine-level error type.
///
/// Wraps [`CoreError`] for domain errors and `sqlx::Error` for storage
/// failures. Channel-internal delivery failures never appear here: the
/// [`ChannelHandler`](crate::ChannelHandler) contract reduces them to a
/// boolean outcome that is recorded, not raised.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// A domain-level error from `courier-core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Convenience alias for engine operation results.
pub type EngineResult<T> = Result<T, EngineError>;
