/// An RGBA color with `f32` components in the `0.0..=1.0` range.
///
/// The struct is `#[repr(C)]` and implements `bytemuck::Pod`, so it can be
/// used directly in GPU uniform/vertex buffers. For per-vertex storage the
/// batcher packs colors into a single `u32` via [`Color::pack_premultiplied`].
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);
    pub const RED: Color = Color::rgb(1.0, 0.0, 0.0);
    pub const GREEN: Color = Color::rgb(0.0, 1.0, 0.0);
    pub const BLUE: Color = Color::rgb(0.0, 0.0, 1.0);
    pub const TRANSPARENT: Color = Color::rgba(0.0, 0.0, 0.0, 0.0);

    /// Create a color from RGB components with full opacity (alpha = 1.0).
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Create a color from RGBA components.
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Create a color from 8-bit RGB values with full opacity.
    pub fn from_rgb_u8(r: u8, g: u8, b: u8) -> Self {
        Self {
            r: r as f32 / 255.0,
            g: g as f32 / 255.0,
            b: b as f32 / 255.0,
            a: 1.0,
        }
    }

    /// Create a color from a 24-bit RGB hex value (e.g. `0xFF8800`).
    pub fn from_hex(hex: u32) -> Self {
        let r = ((hex >> 16) & 0xFF) as u8;
        let g = ((hex >> 8) & 0xFF) as u8;
        let b = (hex & 0xFF) as u8;
        Self::from_rgb_u8(r, g, b)
    }

    /// Convert to an `[r, g, b, a]` array.
    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Premultiply this color (used as a tint) by `alpha` and pack the result
    /// into a `u32` with RGBA byte order.
    ///
    /// Byte 0 is red, byte 3 is alpha, matching WGSL's `unpack4x8unorm`.
    /// Components are clamped to `0.0..=1.0` before quantization.
    pub fn pack_premultiplied(self, alpha: f32) -> u32 {
        let a = alpha.clamp(0.0, 1.0);
        let quantize = |c: f32| (c.clamp(0.0, 1.0) * a * 255.0).round() as u32;
        quantize(self.r)
            | quantize(self.g) << 8
            | quantize(self.b) << 16
            | ((a * 255.0).round() as u32) << 24
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

/// Unpack a `u32` produced by [`Color::pack_premultiplied`] back into
/// normalized RGBA components.
pub fn unpack_rgba(packed: u32) -> [f32; 4] {
    [
        (packed & 0xFF) as f32 / 255.0,
        (packed >> 8 & 0xFF) as f32 / 255.0,
        (packed >> 16 & 0xFF) as f32 / 255.0,
        (packed >> 24 & 0xFF) as f32 / 255.0,
    ]
}
