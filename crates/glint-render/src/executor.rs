//! Draw-call execution against an abstract backend.
//!
//! The executor is the thin adapter between the batcher's command stream and
//! the GPU abstraction. Collaborators are injected through the
//! [`DrawBackend`] trait; there is no global renderer registry.

use crate::batch::{BatchPass, DrawCommand};
use crate::blend::BlendMode;
use crate::element::RenderElement;
use crate::error::{BackendError, RenderError};
use crate::texture::TextureHandle;

/// The GPU abstraction the executor drives.
///
/// Implementations translate these calls into their API's texture binding,
/// pipeline state and indexed-draw submission. All failures (context loss,
/// device errors) surface as [`BackendError`]; the executor never retries
/// mid-frame.
pub trait DrawBackend {
    /// Device capability: simultaneously bindable texture units.
    fn max_texture_units(&self) -> u32;

    /// Bind `texture` to sampler slot `slot` for subsequent draws.
    fn bind_texture(&mut self, slot: u32, texture: TextureHandle) -> Result<(), BackendError>;

    /// Set the blend state for subsequent draws.
    fn set_blend_mode(&mut self, mode: BlendMode) -> Result<(), BackendError>;

    /// Draw `index_count` indices starting at `first_index` from the
    /// uploaded index buffer.
    fn draw_indexed(&mut self, first_index: u32, index_count: u32) -> Result<(), BackendError>;

    /// Draw an element the batcher passed through (custom shader, mask
    /// boundary) with whatever pipeline it requires.
    fn draw_unbatched(&mut self, element: &RenderElement) -> Result<(), BackendError>;
}

/// Replays a [`BatchPass`] command stream against a [`DrawBackend`].
pub struct DrawCallExecutor<B: DrawBackend> {
    backend: B,
}

impl<B: DrawBackend> DrawCallExecutor<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn into_inner(self) -> B {
        self.backend
    }

    /// Execute the pass in command order.
    ///
    /// `elements` must be the same slice the pass was built from; unbatched
    /// commands index into it. A backend error aborts the frame immediately
    /// and propagates; the builder's buffers remain valid, so the caller can
    /// rebuild and re-flush after context recovery.
    pub fn execute(
        &mut self,
        pass: &BatchPass<'_>,
        elements: &[RenderElement],
    ) -> Result<(), RenderError> {
        // Blend state is tracked within one execute call only; GPU state at
        // frame start is unknown, so the first group always sets it.
        let mut current_blend: Option<BlendMode> = None;

        for command in pass.commands {
            match command {
                DrawCommand::Batch(group) => {
                    for binding in &group.bindings {
                        self.backend.bind_texture(binding.slot, binding.texture)?;
                    }
                    if current_blend != Some(group.blend_mode) {
                        self.backend.set_blend_mode(group.blend_mode)?;
                        current_blend = Some(group.blend_mode);
                    }
                    self.backend.draw_indexed(group.start_index, group.index_count)?;
                }
                DrawCommand::Unbatched { element } => {
                    let Some(unbatched) = elements.get(*element) else {
                        return Err(RenderError::StaleCommand { element: *element });
                    };
                    self.backend.draw_unbatched(unbatched)?;
                    // The pass-through draw may have touched pipeline state.
                    current_blend = None;
                }
            }
        }
        Ok(())
    }
}
