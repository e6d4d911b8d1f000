//! Error taxonomy for the batching core.
//!
//! Configuration errors are fatal at initialization. Malformed input is a
//! producer bug: debug builds assert, release builds drop or clamp and count
//! (see [`crate::batch::BatchStats`]). Backend failures abort the current
//! frame and propagate; the builder's buffers stay valid for a re-flush.

use thiserror::Error;

/// Rejected batcher configuration, reported by
/// [`crate::BatchGroupBuilder::new`].
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum BatchConfigError {
    #[error("growth factor must be finite and greater than 1.0, got {0}")]
    InvalidGrowthFactor(f32),
    #[error("initial vertex capacity must be nonzero")]
    ZeroInitialCapacity,
}

/// Failure reported by a [`crate::DrawBackend`] implementation.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The GPU context was lost mid-frame. The caller must recover the
    /// context and re-flush on the next frame.
    #[error("GPU context lost")]
    ContextLost,
    /// Any other backend-specific failure.
    #[error("backend error: {0}")]
    Backend(String),
}

/// Frame-level failure from [`crate::DrawCallExecutor::execute`].
#[derive(Debug, Error)]
pub enum RenderError {
    #[error(transparent)]
    Backend(#[from] BackendError),
    /// A command stream was replayed against a different element slice than
    /// the one it was built from.
    #[error("draw command references element {element} outside the submitted stream")]
    StaleCommand { element: usize },
}
