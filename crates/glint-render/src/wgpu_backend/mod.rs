//! wgpu execution layer for the batching core.
//!
//! Two-phase lifecycle: [`WgpuBatchRenderer::prepare`] uploads the packed
//! buffers and builds per-group texture bind groups, then
//! [`WgpuBatchRenderer::render`] records draw commands into an open render
//! pass. The multi-texture shader is generated for the device's unit budget
//! at construction time.

mod pipeline;
mod renderer;
mod textures;

pub use renderer::{WgpuBatchRenderer, WgpuFrameStats};
pub use textures::{GroupBindings, TextureRegistry};

/// Query the device's texture-unit budget for batching.
///
/// Capped at 16: beyond that the per-draw bind group gets large while extra
/// units stop paying for themselves in saved draw calls.
pub fn detect_max_texture_units(device: &wgpu::Device) -> u32 {
    device
        .limits()
        .max_sampled_textures_per_shader_stage
        .clamp(1, 16)
}
