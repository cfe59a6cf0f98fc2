//! Error kinds shared across the engine core. Operations return a
//! [`Result`] rather than throwing across subsystem boundaries; loader and
//! driver failures raised off the main thread are captured and re-surfaced
//! when the completion task that carries them runs on the main thread.

use thiserror::Error;

/// Alias used throughout the engine core for fallible operations.
pub type EngineResult<T> = Result<T, EngineError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// A handle was dereferenced after its entity was destroyed, or never
    /// pointed at anything.
    #[error("no such entity")]
    NotFound,

    /// An octree operation was given an AABB the tree cannot contain
    /// without growth the caller forbade.
    #[error("object is outside the bounds of the spatial index")]
    OutsideBounds,

    /// An entity failed an insertion invariant, e.g. reparenting into one
    /// of its own descendants.
    #[error("invalid insertion: {0}")]
    InvalidInsertion(String),

    /// No registered loader matched the requested path or hint.
    #[error("no loader available for this asset")]
    LoaderUnavailable,

    /// A loader ran but could not populate the asset.
    #[error("failed to load asset: {0}")]
    AssetLoadFailure(String),

    /// A vertex/index/hardware buffer upload exceeded its capacity.
    #[error("buffer overflow")]
    BufferOverflow,

    /// A hardware buffer or asset was used after release.
    #[error("use of a released resource")]
    DeadResource,
}
