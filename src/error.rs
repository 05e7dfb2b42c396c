//! Engine error taxonomy.
//!
//! Image decoding is the only fallible external collaborator; the remaining
//! variants are caller contract violations surfaced explicitly instead of
//! silently ignored.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    /// The image could not be read or decoded. Fatal to the owning load
    /// set; never retried.
    #[error("Failed to load image asset: {path}: {source}")]
    ImageLoad {
        path: String,
        source: anyhow::Error,
    },

    /// A mode name arrived at the string boundary that the engine does not
    /// know.
    #[error("unknown transition mode: {0:?}")]
    UnknownMode(String),

    /// Tweens require a strictly positive duration.
    #[error("tween duration must be positive, got {0}ms")]
    InvalidDuration(f64),

    /// A plane handle outlived its stage node.
    #[error("plane handle {0} is stale (node was destroyed)")]
    StalePlane(usize),
}
