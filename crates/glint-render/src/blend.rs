//! Blend mode presets for batched 2D rendering.
//!
//! Blend state is a global pipeline setting applied per draw call, so a
//! change of mode always forces a batch boundary. All formulas below assume
//! premultiplied-alpha sources, which is how the batcher packs per-vertex
//! colors.

/// The closed set of blend modes the batcher understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BlendMode {
    /// Standard compositing for premultiplied sources.
    ///
    /// Formula: `src.rgb + dst.rgb * (1 - src.a)`
    #[default]
    Normal,

    /// Additive blending.
    ///
    /// Formula: `src.rgb + dst.rgb`
    ///
    /// Use for: glow effects, particles, light sources.
    Add,

    /// Multiplicative blending.
    ///
    /// Formula: `src.rgb * dst.rgb + dst.rgb * (1 - src.a)`
    ///
    /// Use for: shadows, color tinting.
    Multiply,

    /// Screen blending.
    ///
    /// Formula: `src.rgb + dst.rgb * (1 - src.rgb)`
    ///
    /// Use for: highlights, lightening overlays.
    Screen,

    /// No blending, source replaces destination.
    None,
}

impl BlendMode {
    /// Every mode, in pipeline-creation order.
    pub const ALL: [BlendMode; 5] = [
        BlendMode::Normal,
        BlendMode::Add,
        BlendMode::Multiply,
        BlendMode::Screen,
        BlendMode::None,
    ];

    /// Convert to a wgpu blend state. `BlendMode::None` yields `Option::None`
    /// (blending disabled on the color target).
    pub fn to_blend_state(self) -> Option<wgpu::BlendState> {
        let over_alpha = wgpu::BlendComponent {
            src_factor: wgpu::BlendFactor::One,
            dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
            operation: wgpu::BlendOperation::Add,
        };

        match self {
            BlendMode::Normal => Some(wgpu::BlendState::PREMULTIPLIED_ALPHA_BLENDING),
            BlendMode::Add => Some(wgpu::BlendState {
                color: wgpu::BlendComponent {
                    src_factor: wgpu::BlendFactor::One,
                    dst_factor: wgpu::BlendFactor::One,
                    operation: wgpu::BlendOperation::Add,
                },
                alpha: wgpu::BlendComponent {
                    src_factor: wgpu::BlendFactor::One,
                    dst_factor: wgpu::BlendFactor::One,
                    operation: wgpu::BlendOperation::Add,
                },
            }),
            BlendMode::Multiply => Some(wgpu::BlendState {
                color: wgpu::BlendComponent {
                    src_factor: wgpu::BlendFactor::Dst,
                    dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
                    operation: wgpu::BlendOperation::Add,
                },
                alpha: over_alpha,
            }),
            BlendMode::Screen => Some(wgpu::BlendState {
                color: wgpu::BlendComponent {
                    src_factor: wgpu::BlendFactor::One,
                    dst_factor: wgpu::BlendFactor::OneMinusSrc,
                    operation: wgpu::BlendOperation::Add,
                },
                alpha: over_alpha,
            }),
            BlendMode::None => None,
        }
    }

    /// Create a color target state for this blend mode.
    pub fn to_color_target_state(self, format: wgpu::TextureFormat) -> wgpu::ColorTargetState {
        wgpu::ColorTargetState {
            format,
            blend: self.to_blend_state(),
            write_mask: wgpu::ColorWrites::ALL,
        }
    }
}
