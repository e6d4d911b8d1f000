//! Glint Core
//!
//! Shared utilities for the glint rendering engine: logging bootstrap and
//! scope profiling.

pub mod logging;
pub mod profiling;
