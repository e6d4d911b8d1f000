//! Render element input records.
//!
//! The scene graph delivers one [`RenderElement`] per drawable, in draw
//! order, with world transforms already applied to the vertex positions.
//! Sprites, meshes and particles are normalized into this one fixed struct
//! before they reach the batcher; there is no per-kind dispatch inside the
//! hot loop.

use glam::Vec2;
use thiserror::Error;

use crate::blend::BlendMode;
use crate::color::Color;
use crate::texture::TextureHandle;

bitflags::bitflags! {
    /// Rendering requirements that take an element off the batched path.
    ///
    /// Any flagged element forces a batch boundary and is emitted as an
    /// unbatched pass-through draw.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ElementFlags: u32 {
        /// Element is drawn with its own shader/pipeline.
        const CUSTOM_SHADER = 1 << 0;
        /// Element starts or ends a masked region.
        const MASK_BOUNDARY = 1 << 1;
    }
}

/// Malformed element geometry, detected by [`RenderElement::geometry_error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GeometryError {
    #[error("uv count {uvs} does not match vertex count {vertices}")]
    UvCountMismatch { vertices: usize, uvs: usize },
    #[error("index {index} out of range for {vertices} vertices")]
    IndexOutOfRange { index: u16, vertices: usize },
}

/// One drawable in the ordered frame stream.
///
/// Invariants expected from the producer: `uvs.len() == vertices.len()` and
/// every index `< vertices.len()`. Violations are producer bugs; see
/// [`crate::error`] for how the batcher reacts per build profile.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderElement {
    pub texture: TextureHandle,
    /// Positions in the final composition space.
    pub vertices: Vec<[f32; 2]>,
    /// One texture coordinate per vertex.
    pub uvs: Vec<[f32; 2]>,
    /// Triangle list, local to this element's vertices.
    pub indices: Vec<u16>,
    pub tint: Color,
    pub alpha: f32,
    pub blend_mode: BlendMode,
    pub flags: ElementFlags,
}

/// Quad triangle list for corner order TL, TR, BL, BR.
const QUAD_INDICES: [u16; 6] = [0, 1, 2, 2, 1, 3];

impl RenderElement {
    /// Normalize an axis-aligned sprite into an element: four corners, two
    /// triangles, UVs taken from the atlas frame `[uv_min, uv_max]`.
    pub fn sprite(
        texture: TextureHandle,
        position: Vec2,
        size: Vec2,
        uv_min: Vec2,
        uv_max: Vec2,
        tint: Color,
        alpha: f32,
        blend_mode: BlendMode,
    ) -> Self {
        let max = position + size;
        Self {
            texture,
            vertices: vec![
                [position.x, position.y],
                [max.x, position.y],
                [position.x, max.y],
                [max.x, max.y],
            ],
            uvs: vec![
                [uv_min.x, uv_min.y],
                [uv_max.x, uv_min.y],
                [uv_min.x, uv_max.y],
                [uv_max.x, uv_max.y],
            ],
            indices: QUAD_INDICES.to_vec(),
            tint,
            alpha,
            blend_mode,
            flags: ElementFlags::empty(),
        }
    }

    /// Normalize an arbitrary triangle mesh into an element.
    pub fn mesh(
        texture: TextureHandle,
        vertices: Vec<[f32; 2]>,
        uvs: Vec<[f32; 2]>,
        indices: Vec<u16>,
        tint: Color,
        alpha: f32,
        blend_mode: BlendMode,
    ) -> Self {
        Self {
            texture,
            vertices,
            uvs,
            indices,
            tint,
            alpha,
            blend_mode,
            flags: ElementFlags::empty(),
        }
    }

    /// Mark this element as requiring its own draw (custom shader, mask).
    pub fn with_flags(mut self, flags: ElementFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Whether the element can share a draw call with its neighbors.
    pub fn is_batchable(&self) -> bool {
        !self
            .flags
            .intersects(ElementFlags::CUSTOM_SHADER | ElementFlags::MASK_BOUNDARY)
    }

    /// Validate the producer invariants, returning the first violation.
    pub fn geometry_error(&self) -> Option<GeometryError> {
        if self.uvs.len() != self.vertices.len() {
            return Some(GeometryError::UvCountMismatch {
                vertices: self.vertices.len(),
                uvs: self.uvs.len(),
            });
        }
        for &index in &self.indices {
            if index as usize >= self.vertices.len() {
                return Some(GeometryError::IndexOutOfRange {
                    index,
                    vertices: self.vertices.len(),
                });
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tex() -> TextureHandle {
        TextureHandle::new(1, 64, 64)
    }

    #[test]
    fn test_sprite_emits_one_quad() {
        let sprite = RenderElement::sprite(
            tex(),
            Vec2::new(10.0, 20.0),
            Vec2::new(32.0, 16.0),
            Vec2::ZERO,
            Vec2::ONE,
            Color::WHITE,
            1.0,
            BlendMode::Normal,
        );
        assert_eq!(sprite.vertices.len(), 4);
        assert_eq!(sprite.uvs.len(), 4);
        assert_eq!(sprite.indices, QUAD_INDICES);
        assert_eq!(sprite.vertices[3], [42.0, 36.0]);
        assert!(sprite.geometry_error().is_none());
        assert!(sprite.is_batchable());
    }

    #[test]
    fn test_flagged_elements_are_unbatchable() {
        let masked = RenderElement::sprite(
            tex(),
            Vec2::ZERO,
            Vec2::ONE,
            Vec2::ZERO,
            Vec2::ONE,
            Color::WHITE,
            1.0,
            BlendMode::Normal,
        )
        .with_flags(ElementFlags::MASK_BOUNDARY);
        assert!(!masked.is_batchable());
    }

    #[test]
    fn test_uv_mismatch_is_detected() {
        let mut element = RenderElement::mesh(
            tex(),
            vec![[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]],
            vec![[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]],
            vec![0, 1, 2],
            Color::WHITE,
            1.0,
            BlendMode::Normal,
        );
        element.uvs.pop();
        assert_eq!(
            element.geometry_error(),
            Some(GeometryError::UvCountMismatch {
                vertices: 3,
                uvs: 2
            })
        );
    }

    #[test]
    fn test_out_of_range_index_is_detected() {
        let element = RenderElement::mesh(
            tex(),
            vec![[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]],
            vec![[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]],
            vec![0, 1, 3],
            Color::WHITE,
            1.0,
            BlendMode::Normal,
        );
        assert_eq!(
            element.geometry_error(),
            Some(GeometryError::IndexOutOfRange {
                index: 3,
                vertices: 3
            })
        );
    }
}
