//! Shared element fixtures for batcher and executor tests.

use glam::Vec2;
use glint_render::{BlendMode, Color, RenderElement, TextureHandle};

/// A loaded 64x64 texture handle with the given id.
pub fn tex(id: u64) -> TextureHandle {
    TextureHandle::new(id, 64, 64)
}

/// A 16x16 white quad at the origin: 4 vertices, 6 indices.
pub fn quad_element(texture: TextureHandle, blend_mode: BlendMode) -> RenderElement {
    RenderElement::sprite(
        texture,
        Vec2::ZERO,
        Vec2::splat(16.0),
        Vec2::ZERO,
        Vec2::ONE,
        Color::WHITE,
        1.0,
        blend_mode,
    )
}
