//! Error types for encoding, verification, and reconstruction

use thiserror::Error;

/// Errors that can occur during Reed-Solomon operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// More than 256 total shards requested at construction
    #[error("too many shards: {data} data + {parity} parity exceeds the 256 shard limit")]
    TooManyShards { data: usize, parity: usize },

    /// Shard array or matrix dimensions are inconsistent
    #[error("shape mismatch: {0}")]
    ShapeMismatch(String),

    /// Byte range does not fit inside the shard or temp buffers
    #[error("range error: {0}")]
    RangeError(String),

    /// Too few surviving shards to reconstruct the data
    #[error("not enough shards: {present} present, {needed} needed")]
    NotEnoughShards { present: usize, needed: usize },

    /// Gauss-Jordan elimination could not find a pivot
    #[error("matrix is singular")]
    Singular,
}

/// Type alias for Result with CodecError
pub type Result<T> = std::result::Result<T, CodecError>;
