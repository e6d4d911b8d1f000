//! CPU-side interleaved vertex store.
//!
//! The builder appends one [`BatchVertex`] per output vertex and uploads the
//! written prefix with a single `write_buffer` at prepare time. The backing
//! storage grows geometrically and is reused across frames (`reset()` only
//! rewinds the cursor), so a steady-state frame allocates nothing.

use bytemuck::{Pod, Zeroable};

/// Largest number of vertices added by a single reallocation step. Bounds the
/// memory spike one oversized batch can cause while keeping growth amortized
/// O(1).
pub const MAX_GROWTH_STEP: usize = 65_536;

/// One packed output vertex.
///
/// 24 bytes, no padding. `color` is premultiplied RGBA packed with
/// [`crate::Color::pack_premultiplied`]; `texture_unit` selects the sampler
/// slot assigned to the owning element's texture within its batch group.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct BatchVertex {
    pub position: [f32; 2],
    pub uv: [f32; 2],
    pub color: u32,
    pub texture_unit: u32,
}

static_assertions::const_assert_eq!(std::mem::size_of::<BatchVertex>(), 24);

impl BatchVertex {
    /// Vertex buffer layout for the batched pipeline.
    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        const ATTRS: &[wgpu::VertexAttribute] = &wgpu::vertex_attr_array![
            0 => Float32x2, // position
            1 => Float32x2, // uv
            2 => Uint32,    // packed color
            3 => Uint32,    // texture unit
        ];
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<BatchVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: ATTRS,
        }
    }
}

/// Growable store of [`BatchVertex`] records with an explicit write cursor.
#[derive(Debug)]
pub struct AttributeBuffer {
    data: Vec<BatchVertex>,
    cursor: usize,
    growth_factor: f32,
}

impl AttributeBuffer {
    /// Create a buffer pre-sized for `initial_capacity` vertices.
    ///
    /// `growth_factor` must be finite and > 1.0; the caller
    /// ([`crate::BatchGroupBuilder::new`]) validates it.
    pub fn with_capacity(initial_capacity: usize, growth_factor: f32) -> Self {
        Self {
            data: vec![BatchVertex::zeroed(); initial_capacity.max(1)],
            cursor: 0,
            growth_factor,
        }
    }

    /// Ensure capacity for `additional` more vertices, reallocating and
    /// copying if needed. Growth is geometric with each step capped at
    /// [`MAX_GROWTH_STEP`] records.
    pub fn reserve(&mut self, additional: usize) {
        let required = self.cursor + additional;
        if required <= self.data.len() {
            return;
        }
        let mut capacity = self.data.len();
        while capacity < required {
            let step = ((capacity as f64 * (self.growth_factor as f64 - 1.0)).ceil() as usize)
                .clamp(1, MAX_GROWTH_STEP);
            capacity += step;
        }
        self.data.resize(capacity, BatchVertex::zeroed());
    }

    /// Write one vertex at the cursor and advance it, growing if the buffer
    /// is full.
    #[inline]
    pub fn push(&mut self, vertex: BatchVertex) {
        if self.cursor == self.data.len() {
            self.reserve(1);
        }
        self.data[self.cursor] = vertex;
        self.cursor += 1;
    }

    /// Rewind the cursor without deallocating.
    pub fn reset(&mut self) {
        self.cursor = 0;
    }

    /// Vertices written so far.
    pub fn len(&self) -> usize {
        self.cursor
    }

    pub fn is_empty(&self) -> bool {
        self.cursor == 0
    }

    /// Current capacity in vertices.
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// The written prefix.
    pub fn as_slice(&self) -> &[BatchVertex] {
        &self.data[..self.cursor]
    }

    /// The written prefix as bytes, for GPU upload.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(self.as_slice())
    }
}
