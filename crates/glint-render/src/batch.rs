//! The batch group builder.
//!
//! One `build()` call is one flush: a single-threaded, non-reentrant pass
//! over the frame's element stream that packs geometry into the two CPU
//! buffers and emits an ordered draw-command list. Elements are never
//! reordered; later elements composite over earlier ones, so order is the
//! correctness contract, not an optimization target.

use glint_core::profiling::profile_function;

use crate::attribute_buffer::{AttributeBuffer, BatchVertex};
use crate::blend::BlendMode;
use crate::element::{GeometryError, RenderElement};
use crate::error::BatchConfigError;
use crate::executor::DrawBackend;
use crate::index_buffer::IndexBuffer;
use crate::texture::TextureHandle;
use crate::texture_units::TextureUnitAllocator;

/// Tunables for a [`BatchGroupBuilder`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BatchConfig {
    /// Vertices the attribute buffer is pre-sized for. Index capacity is
    /// derived from it (6 indices per 4 vertices, the quad ratio).
    pub initial_vertex_capacity: usize,
    /// Geometric growth factor for both buffers. Must be finite and > 1.0.
    pub growth_factor: f32,
    /// Device texture-unit budget per draw call. 0 is clamped to 1.
    pub max_texture_units: u32,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            initial_vertex_capacity: 4096,
            growth_factor: 2.0,
            max_texture_units: 8,
        }
    }
}

impl BatchConfig {
    /// Default config with the texture-unit budget queried from the backend
    /// that will execute the pass.
    pub fn for_backend(backend: &impl DrawBackend) -> Self {
        Self {
            max_texture_units: backend.max_texture_units(),
            ..Default::default()
        }
    }
}

/// One texture bound to one sampler slot within a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureBinding {
    pub texture: TextureHandle,
    pub slot: u32,
}

/// Descriptor for a single GPU draw call.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchGroup {
    /// First index in the packed index buffer.
    pub start_index: u32,
    /// Number of indices to draw.
    pub index_count: u32,
    /// Blend state for the whole group.
    pub blend_mode: BlendMode,
    /// Slot assignments, in slot order. At most `max_texture_units` entries.
    pub bindings: Vec<TextureBinding>,
}

/// One entry of the ordered output command stream.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// Draw a packed index range.
    Batch(BatchGroup),
    /// Pass-through draw of a single unbatchable element, identified by its
    /// position in the input stream.
    Unbatched { element: usize },
}

/// Counters from the last flush.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchStats {
    /// Elements submitted.
    pub elements: u32,
    /// Elements skipped: empty geometry or invalid texture.
    pub skipped: u32,
    /// Malformed elements dropped (uv/vertex count mismatch).
    pub dropped_malformed: u32,
    /// Elements whose out-of-range indices were clamped.
    pub clamped: u32,
    /// Elements emitted as unbatched pass-through draws.
    pub unbatched: u32,
    /// Output vertices written.
    pub vertices: u32,
    /// Output indices written.
    pub indices: u32,
    /// Draw commands emitted (batched + unbatched).
    pub draw_calls: u32,
    /// Texture-slot bindings summed over all groups.
    pub texture_bindings: u32,
}

/// Read-only view of one flush's output, borrowed from the builder.
#[derive(Debug)]
pub struct BatchPass<'a> {
    pub vertices: &'a [BatchVertex],
    pub indices: &'a [u32],
    pub commands: &'a [DrawCommand],
    pub stats: BatchStats,
}

/// Packs an ordered element stream into buffers and draw-call descriptors.
///
/// Owns the attribute and index buffers exclusively; `build` takes `&mut
/// self`, so overlapping or reentrant flushes are rejected at compile time.
/// Buffers are reset, not reallocated, between flushes.
pub struct BatchGroupBuilder {
    vertices: AttributeBuffer,
    indices: IndexBuffer,
    units: TextureUnitAllocator,
    commands: Vec<DrawCommand>,
    stats: BatchStats,
    /// Cumulative across flushes, for long-running diagnostics.
    dropped_malformed_total: u64,
}

impl BatchGroupBuilder {
    /// Validate `config` and build. Fails for a non-finite or <= 1.0 growth
    /// factor, or a zero initial capacity.
    pub fn new(config: BatchConfig) -> Result<Self, BatchConfigError> {
        if !config.growth_factor.is_finite() || config.growth_factor <= 1.0 {
            return Err(BatchConfigError::InvalidGrowthFactor(config.growth_factor));
        }
        if config.initial_vertex_capacity == 0 {
            return Err(BatchConfigError::ZeroInitialCapacity);
        }
        let index_capacity = config.initial_vertex_capacity / 4 * 6;
        Ok(Self {
            vertices: AttributeBuffer::with_capacity(
                config.initial_vertex_capacity,
                config.growth_factor,
            ),
            indices: IndexBuffer::with_capacity(index_capacity.max(6), config.growth_factor),
            units: TextureUnitAllocator::new(config.max_texture_units),
            commands: Vec::new(),
            stats: BatchStats::default(),
            dropped_malformed_total: 0,
        })
    }

    /// The effective texture-unit budget (after clamping).
    pub fn max_texture_units(&self) -> u32 {
        self.units.max_units()
    }

    /// Counters from the last flush.
    pub fn stats(&self) -> BatchStats {
        self.stats
    }

    /// Malformed elements dropped since construction.
    pub fn dropped_malformed_total(&self) -> u64 {
        self.dropped_malformed_total
    }

    /// Rewind the buffers and command list without deallocating.
    pub fn reset(&mut self) {
        self.vertices.reset();
        self.indices.reset();
        self.commands.clear();
        self.units.begin_group();
    }

    /// Flush: pack `elements` in order and emit the draw-command stream.
    ///
    /// Runs to completion on the calling thread; no suspension points. The
    /// returned pass borrows the builder's buffers and stays valid until the
    /// next `build` or `reset`.
    pub fn build(&mut self, elements: &[RenderElement]) -> BatchPass<'_> {
        profile_function!();
        self.reset();

        let mut stats = BatchStats {
            elements: elements.len() as u32,
            ..Default::default()
        };

        // Open-group state. A group is "open" once a batchable element has
        // claimed it; its blend mode is fixed by that first element.
        let mut open = false;
        let mut group_start: u32 = 0;
        let mut group_blend = BlendMode::Normal;
        let mut group_bindings: Vec<TextureBinding> = Vec::new();

        for (position, element) in elements.iter().enumerate() {
            // Nothing to draw, or texture not yet loaded: no geometry, no
            // group side effects.
            if element.vertices.is_empty() || !element.texture.is_valid() {
                stats.skipped += 1;
                continue;
            }

            if let Some(error @ GeometryError::UvCountMismatch { .. }) = element.geometry_error() {
                debug_assert!(false, "malformed render element {position}: {error}");
                self.dropped_malformed_total += 1;
                stats.dropped_malformed += 1;
                tracing::warn!(element = position, %error, "dropping malformed render element");
                continue;
            }

            if !element.is_batchable() {
                if open {
                    close_group(
                        &mut self.commands,
                        &mut group_bindings,
                        group_start,
                        self.indices.len() as u32,
                        group_blend,
                    );
                    open = false;
                }
                self.commands.push(DrawCommand::Unbatched { element: position });
                stats.unbatched += 1;
                self.units.begin_group();
                group_start = self.indices.len() as u32;
                continue;
            }

            let blend = element.blend_mode;
            let mut slot = self.units.try_assign(element.texture.id());
            if slot.is_none() || (open && blend != group_blend) {
                if open {
                    close_group(
                        &mut self.commands,
                        &mut group_bindings,
                        group_start,
                        self.indices.len() as u32,
                        group_blend,
                    );
                    open = false;
                }
                self.units.begin_group();
                group_start = self.indices.len() as u32;
                slot = self.units.try_assign(element.texture.id());
            }
            // A fresh table with max_units >= 1 always has a free slot.
            let slot = slot.expect("fresh texture-unit table must have a free slot");

            if slot as usize == group_bindings.len() {
                group_bindings.push(TextureBinding {
                    texture: element.texture,
                    slot,
                });
            }
            if !open {
                group_blend = blend;
                open = true;
            }

            // Pack geometry: color once per element, indices rebased onto
            // this element's slice of the attribute buffer.
            let base_vertex = self.vertices.len() as u32;
            let packed = element.tint.pack_premultiplied(element.alpha);
            let vertex_count = element.vertices.len();

            self.vertices.reserve(vertex_count);
            for (vertex, uv) in element.vertices.iter().zip(&element.uvs) {
                self.vertices.push(BatchVertex {
                    position: *vertex,
                    uv: *uv,
                    color: packed,
                    texture_unit: slot,
                });
            }

            self.indices.reserve(element.indices.len());
            // u16 indices cannot address past 65535 anyway, so the clamp
            // ceiling saturates there for oversized elements.
            let last_local = (vertex_count - 1).min(u16::MAX as usize) as u16;
            let mut clamped = false;
            for &index in &element.indices {
                debug_assert!(
                    (index as usize) < vertex_count,
                    "index {index} out of range in render element {position}"
                );
                let index = if index > last_local {
                    clamped = true;
                    last_local
                } else {
                    index
                };
                self.indices.push(base_vertex + index as u32);
            }
            if clamped {
                stats.clamped += 1;
                tracing::warn!(element = position, "clamped out-of-range indices");
            }

            stats.vertices += vertex_count as u32;
            stats.indices += element.indices.len() as u32;
        }

        if open {
            close_group(
                &mut self.commands,
                &mut group_bindings,
                group_start,
                self.indices.len() as u32,
                group_blend,
            );
        }

        stats.draw_calls = self.commands.len() as u32;
        stats.texture_bindings = self
            .commands
            .iter()
            .map(|command| match command {
                DrawCommand::Batch(group) => group.bindings.len() as u32,
                DrawCommand::Unbatched { .. } => 0,
            })
            .sum();
        self.stats = stats;

        BatchPass {
            vertices: self.vertices.as_slice(),
            indices: self.indices.as_slice(),
            commands: &self.commands,
            stats,
        }
    }
}

/// Seal the open group into a draw command. Zero-index groups (elements that
/// contributed vertices but no triangles) emit no draw call.
fn close_group(
    commands: &mut Vec<DrawCommand>,
    bindings: &mut Vec<TextureBinding>,
    start_index: u32,
    end_index: u32,
    blend_mode: BlendMode,
) {
    if end_index == start_index {
        bindings.clear();
        return;
    }
    commands.push(DrawCommand::Batch(BatchGroup {
        start_index,
        index_count: end_index - start_index,
        blend_mode,
        bindings: std::mem::take(bindings),
    }));
}
