//! Batching core for the glint 2D rendering engine.
//!
//! Consumes an ordered stream of [`RenderElement`]s (texture, geometry, tint,
//! blend mode) and coalesces them into the minimum number of GPU draw calls
//! that preserves draw order:
//!
//! - [`BatchGroupBuilder`] packs vertices into an [`AttributeBuffer`] and
//!   rebased triangle indices into an [`IndexBuffer`], emitting one
//!   [`BatchGroup`] per required draw call.
//! - [`DrawCallExecutor`] replays the emitted commands against any
//!   [`DrawBackend`].
//! - [`wgpu_backend`] provides the concrete wgpu execution layer.
//!
//! A group boundary is forced by a blend-mode change, by exhausting the
//! texture-unit budget, or by an element that cannot be batched at all
//! (custom shader, mask boundary). Elements are never reordered.

pub mod attribute_buffer;
pub mod batch;
pub mod blend;
pub mod color;
pub mod element;
pub mod error;
pub mod executor;
pub mod index_buffer;
pub mod texture;
pub mod texture_units;
pub mod wgpu_backend;

pub use wgpu;

pub use attribute_buffer::{AttributeBuffer, BatchVertex};
pub use batch::{
    BatchConfig, BatchGroup, BatchGroupBuilder, BatchPass, BatchStats, DrawCommand, TextureBinding,
};
pub use blend::BlendMode;
pub use color::Color;
pub use element::{ElementFlags, GeometryError, RenderElement};
pub use error::{BackendError, BatchConfigError, RenderError};
pub use executor::{DrawBackend, DrawCallExecutor};
pub use index_buffer::IndexBuffer;
pub use texture::TextureHandle;
pub use texture_units::TextureUnitAllocator;
