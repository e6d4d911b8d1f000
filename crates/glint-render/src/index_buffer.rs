//! CPU-side packed index store.
//!
//! Indices are `u32` so a single flush can address more than 65k output
//! vertices; each element's local `u16` indices are rebased by its base
//! vertex as they are appended. Same growth and reuse policy as
//! [`crate::AttributeBuffer`].

use crate::attribute_buffer::MAX_GROWTH_STEP;

/// Growable store of rebased vertex indices with an explicit write cursor.
#[derive(Debug)]
pub struct IndexBuffer {
    data: Vec<u32>,
    cursor: usize,
    growth_factor: f32,
}

impl IndexBuffer {
    /// Create a buffer pre-sized for `initial_capacity` indices.
    pub fn with_capacity(initial_capacity: usize, growth_factor: f32) -> Self {
        Self {
            data: vec![0; initial_capacity.max(1)],
            cursor: 0,
            growth_factor,
        }
    }

    /// Ensure capacity for `additional` more indices.
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
        self.data.resize(capacity, 0);
    }

    /// Write one index at the cursor and advance it.
    #[inline]
    pub fn push(&mut self, index: u32) {
        if self.cursor == self.data.len() {
            self.reserve(1);
        }
        self.data[self.cursor] = index;
        self.cursor += 1;
    }

    /// Rewind the cursor without deallocating.
    pub fn reset(&mut self) {
        self.cursor = 0;
    }

    pub fn len(&self) -> usize {
        self.cursor
    }

    pub fn is_empty(&self) -> bool {
        self.cursor == 0
    }

    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    pub fn as_slice(&self) -> &[u32] {
        &self.data[..self.cursor]
    }

    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(self.as_slice())
    }
}
