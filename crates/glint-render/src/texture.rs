//! Opaque texture handles.
//!
//! The batching core never touches texel data; it only needs a stable
//! identity for slot assignment and the source extent for callers building
//! UV rectangles. The actual GPU resources live behind the backend (see
//! [`crate::wgpu_backend::TextureRegistry`]).

/// A lightweight, copyable reference to a texture owned by the host's
/// texture cache.
///
/// Id `0` is reserved for "no texture". A handle with a zero id or a zero
/// extent is considered not yet loaded and elements referencing it are
/// skipped by the batcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle {
    id: u64,
    width: u32,
    height: u32,
}

impl TextureHandle {
    /// The invalid ("not loaded") handle.
    pub const INVALID: TextureHandle = TextureHandle {
        id: 0,
        width: 0,
        height: 0,
    };

    pub const fn new(id: u64, width: u32, height: u32) -> Self {
        Self { id, width, height }
    }

    /// Stable identity used for dedup and slot assignment.
    pub const fn id(&self) -> u64 {
        self.id
    }

    /// Source dimensions in texels.
    pub const fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Whether the handle refers to a loaded texture.
    pub const fn is_valid(&self) -> bool {
        self.id != 0 && self.width > 0 && self.height > 0
    }
}

impl Default for TextureHandle {
    fn default() -> Self {
        Self::INVALID
    }
}
