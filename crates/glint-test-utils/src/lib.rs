//! Test utilities for glint crates.
//!
//! Provides a recording [`glint_render::DrawBackend`] that captures the
//! backend call stream for verification, a failing backend for
//! error-propagation tests, and element fixtures shared across test modules.

mod backend;
mod fixtures;

pub use backend::{BackendCall, FailingBackend, RecordingBackend};
pub use fixtures::{quad_element, tex};
