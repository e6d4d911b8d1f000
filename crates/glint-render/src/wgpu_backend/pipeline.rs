//! Shader generation and pipeline/buffer creation helpers.

use std::fmt::Write as _;

use crate::attribute_buffer::BatchVertex;
use crate::blend::BlendMode;

/// Generate the batched shader for `max_units` texture slots.
///
/// The template carries the vertex stage and the fragment entry point; this
/// expands one `texture_2d` binding per unit plus a shared sampler, and a
/// flat-interpolated switch that selects the unit per fragment.
/// `textureSampleLevel` is used inside the switch because implicit-LOD
/// sampling is not allowed in non-uniform control flow.
pub fn shader_source(max_units: u32) -> String {
    let template = include_str!("../shaders/batch.wgsl");

    let mut bindings = String::new();
    for unit in 0..max_units {
        writeln!(
            bindings,
            "@group(0) @binding({unit}) var t{unit}: texture_2d<f32>;"
        )
        .expect("writing to a String cannot fail");
    }
    write!(
        bindings,
        "@group(0) @binding({max_units}) var unit_sampler: sampler;"
    )
    .expect("writing to a String cannot fail");

    let mut sample_fn = String::new();
    sample_fn.push_str("fn sample_unit(unit: u32, uv: vec2<f32>) -> vec4<f32> {\n");
    sample_fn.push_str("    var color = vec4<f32>(1.0, 1.0, 1.0, 1.0);\n");
    sample_fn.push_str("    switch unit {\n");
    for unit in 0..max_units {
        writeln!(
            sample_fn,
            "        case {unit}u: {{ color = textureSampleLevel(t{unit}, unit_sampler, uv, 0.0); }}"
        )
        .expect("writing to a String cannot fail");
    }
    sample_fn.push_str("        default: { }\n    }\n    return color;\n}");

    template
        .replace("//{{TEXTURE_BINDINGS}}", &bindings)
        .replace("//{{SAMPLE_FN}}", &sample_fn)
}

/// Create the batched shader module for the given unit budget.
pub fn create_shader(device: &wgpu::Device, max_units: u32) -> wgpu::ShaderModule {
    device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("glint_batch_shader"),
        source: wgpu::ShaderSource::Wgsl(shader_source(max_units).into()),
    })
}

/// Create the per-group texture bind group layout: `max_units` texture
/// entries plus one shared filtering sampler.
pub fn create_texture_bind_group_layout(
    device: &wgpu::Device,
    max_units: u32,
) -> wgpu::BindGroupLayout {
    let mut entries = Vec::with_capacity(max_units as usize + 1);
    for unit in 0..max_units {
        entries.push(wgpu::BindGroupLayoutEntry {
            binding: unit,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Texture {
                sample_type: wgpu::TextureSampleType::Float { filterable: true },
                view_dimension: wgpu::TextureViewDimension::D2,
                multisampled: false,
            },
            count: None,
        });
    }
    entries.push(wgpu::BindGroupLayoutEntry {
        binding: max_units,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
        count: None,
    });

    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("glint_batch_texture_layout"),
        entries: &entries,
    })
}

/// Create the projection uniform buffer.
pub fn create_projection_buffer(device: &wgpu::Device) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("glint_batch_projection"),
        size: 64, // mat4x4<f32>
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

/// Create the projection bind group layout (group 1).
pub fn create_projection_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("glint_batch_projection_layout"),
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
    })
}

/// Create the projection bind group.
pub fn create_projection_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    buffer: &wgpu::Buffer,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("glint_batch_projection_bg"),
        layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: buffer.as_entire_binding(),
        }],
    })
}

/// Create the render pipeline for one blend mode.
pub fn create_batch_pipeline(
    device: &wgpu::Device,
    shader: &wgpu::ShaderModule,
    pipeline_layout: &wgpu::PipelineLayout,
    surface_format: wgpu::TextureFormat,
    blend_mode: BlendMode,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("glint_batch_pipeline"),
        layout: Some(pipeline_layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            buffers: &[BatchVertex::layout()],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some("fs_main"),
            targets: &[Some(blend_mode.to_color_target_state(surface_format))],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None, // 2D quads/meshes, no culling
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}

/// Create the GPU vertex buffer for `capacity` vertices.
pub fn create_vertex_buffer(device: &wgpu::Device, capacity: usize) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("glint_batch_vertex_buffer"),
        size: (capacity * std::mem::size_of::<BatchVertex>()) as u64,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

/// Create the GPU index buffer for `capacity` u32 indices.
pub fn create_index_buffer(device: &wgpu::Device, capacity: usize) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("glint_batch_index_buffer"),
        size: (capacity * std::mem::size_of::<u32>()) as u64,
        usage: wgpu::BufferUsages::INDEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

/// A 1x1 white fallback texture for slots with no registered texture.
pub fn create_fallback_texture(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
) -> (wgpu::Texture, wgpu::TextureView, wgpu::Sampler) {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("glint_batch_fallback_texture"),
        size: wgpu::Extent3d {
            width: 1,
            height: 1,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8UnormSrgb,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });
    queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture: &texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        &[255, 255, 255, 255],
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(4),
            rows_per_image: Some(1),
        },
        wgpu::Extent3d {
            width: 1,
            height: 1,
            depth_or_array_layers: 1,
        },
    );
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some("glint_batch_sampler"),
        mag_filter: wgpu::FilterMode::Linear,
        min_filter: wgpu::FilterMode::Linear,
        ..Default::default()
    });
    (texture, view, sampler)
}
