//! Mock draw backends that record operations without touching a GPU.

use glint_render::{BackendError, BlendMode, DrawBackend, RenderElement, TextureHandle};

/// Records one backend operation for verification in tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendCall {
    BindTexture { slot: u32, texture: u64 },
    SetBlendMode(BlendMode),
    DrawIndexed { first_index: u32, index_count: u32 },
    DrawUnbatched { element_texture: u64 },
}

/// A [`DrawBackend`] that records every call and always succeeds.
#[derive(Debug)]
pub struct RecordingBackend {
    max_units: u32,
    calls: Vec<BackendCall>,
}

impl RecordingBackend {
    pub fn new(max_units: u32) -> Self {
        Self {
            max_units,
            calls: Vec::new(),
        }
    }

    /// All recorded calls, in issue order.
    pub fn calls(&self) -> &[BackendCall] {
        &self.calls
    }

    /// Count recorded indexed draws.
    pub fn count_draws(&self) -> usize {
        self.calls
            .iter()
            .filter(|call| matches!(call, BackendCall::DrawIndexed { .. }))
            .count()
    }

    /// Count recorded texture binds.
    pub fn count_binds(&self) -> usize {
        self.calls
            .iter()
            .filter(|call| matches!(call, BackendCall::BindTexture { .. }))
            .count()
    }

    /// Clear recorded calls (useful between test steps).
    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }
}

impl DrawBackend for RecordingBackend {
    fn max_texture_units(&self) -> u32 {
        self.max_units
    }

    fn bind_texture(&mut self, slot: u32, texture: TextureHandle) -> Result<(), BackendError> {
        self.calls.push(BackendCall::BindTexture {
            slot,
            texture: texture.id(),
        });
        Ok(())
    }

    fn set_blend_mode(&mut self, mode: BlendMode) -> Result<(), BackendError> {
        self.calls.push(BackendCall::SetBlendMode(mode));
        Ok(())
    }

    fn draw_indexed(&mut self, first_index: u32, index_count: u32) -> Result<(), BackendError> {
        self.calls.push(BackendCall::DrawIndexed {
            first_index,
            index_count,
        });
        Ok(())
    }

    fn draw_unbatched(&mut self, element: &RenderElement) -> Result<(), BackendError> {
        self.calls.push(BackendCall::DrawUnbatched {
            element_texture: element.texture.id(),
        });
        Ok(())
    }
}

/// A [`DrawBackend`] that reports a lost context after a fixed number of
/// successful calls.
#[derive(Debug)]
pub struct FailingBackend {
    budget: usize,
    issued: usize,
}

impl FailingBackend {
    /// Succeed for the first `budget` calls, fail on every call after.
    pub fn fail_after(budget: usize) -> Self {
        Self { budget, issued: 0 }
    }

    /// Calls that succeeded before the failure.
    pub fn issued(&self) -> usize {
        self.issued
    }

    fn issue(&mut self) -> Result<(), BackendError> {
        if self.issued >= self.budget {
            return Err(BackendError::ContextLost);
        }
        self.issued += 1;
        Ok(())
    }
}

impl DrawBackend for FailingBackend {
    fn max_texture_units(&self) -> u32 {
        8
    }

    fn bind_texture(&mut self, _slot: u32, _texture: TextureHandle) -> Result<(), BackendError> {
        self.issue()
    }

    fn set_blend_mode(&mut self, _mode: BlendMode) -> Result<(), BackendError> {
        self.issue()
    }

    fn draw_indexed(&mut self, _first_index: u32, _index_count: u32) -> Result<(), BackendError> {
        self.issue()
    }

    fn draw_unbatched(&mut self, _element: &RenderElement) -> Result<(), BackendError> {
        self.issue()
    }
}
