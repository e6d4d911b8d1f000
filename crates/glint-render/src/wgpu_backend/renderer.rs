//! The wgpu batch renderer.

use ahash::HashMap;

use glint_core::profiling::profile_function;

use crate::batch::{BatchPass, DrawCommand};
use crate::blend::BlendMode;

use super::pipeline;
use super::textures::{GroupBindings, TextureRegistry};

const INITIAL_VERTEX_CAPACITY: usize = 4096;
const INITIAL_INDEX_CAPACITY: usize = 6144;

/// Counters from the last recorded frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WgpuFrameStats {
    pub draw_calls: u32,
    pub pipeline_switches: u32,
    pub bind_group_switches: u32,
    pub unbatched: u32,
}

/// Uploads batch output and records it into a render pass.
///
/// `prepare` runs outside any render pass and does all resource work: buffer
/// uploads, bind-group creation, buffer growth. `render` creates no
/// resources; it records commands into an already-open pass and updates the
/// frame counters.
pub struct WgpuBatchRenderer {
    device: wgpu::Device,
    queue: wgpu::Queue,
    pipelines: HashMap<BlendMode, wgpu::RenderPipeline>,
    projection_buffer: wgpu::Buffer,
    projection_bind_group: wgpu::BindGroup,
    registry: TextureRegistry,
    group_bindings: GroupBindings,
    vertex_buffer: wgpu::Buffer,
    vertex_capacity: usize,
    index_buffer: wgpu::Buffer,
    index_capacity: usize,
    /// Commands from the last `prepare`, with the bind-group cache key for
    /// each batch command at the same position.
    commands: Vec<DrawCommand>,
    group_keys: Vec<Vec<u64>>,
    stats: WgpuFrameStats,
    max_units: u32,
}

impl WgpuBatchRenderer {
    /// Build the renderer: generates the shader for `max_texture_units`,
    /// creates one pipeline per blend mode and allocates the initial buffers.
    pub fn new(
        device: wgpu::Device,
        queue: wgpu::Queue,
        surface_format: wgpu::TextureFormat,
        max_texture_units: u32,
    ) -> Self {
        let max_units = max_texture_units.max(1);
        let shader = pipeline::create_shader(&device, max_units);
        let group_bindings = GroupBindings::new(&device, &queue, max_units);
        let projection_layout = pipeline::create_projection_bind_group_layout(&device);
        let projection_buffer = pipeline::create_projection_buffer(&device);
        let projection_bind_group =
            pipeline::create_projection_bind_group(&device, &projection_layout, &projection_buffer);

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("glint_batch_pipeline_layout"),
            bind_group_layouts: &[group_bindings.layout(), &projection_layout],
            push_constant_ranges: &[],
        });
        let mut pipelines = HashMap::default();
        for mode in BlendMode::ALL {
            pipelines.insert(
                mode,
                pipeline::create_batch_pipeline(
                    &device,
                    &shader,
                    &pipeline_layout,
                    surface_format,
                    mode,
                ),
            );
        }
        tracing::debug!(max_units, ?surface_format, "created batch pipelines");

        let vertex_buffer = pipeline::create_vertex_buffer(&device, INITIAL_VERTEX_CAPACITY);
        let index_buffer = pipeline::create_index_buffer(&device, INITIAL_INDEX_CAPACITY);

        Self {
            device,
            queue,
            pipelines,
            projection_buffer,
            projection_bind_group,
            registry: TextureRegistry::new(),
            group_bindings,
            vertex_buffer,
            vertex_capacity: INITIAL_VERTEX_CAPACITY,
            index_buffer,
            index_capacity: INITIAL_INDEX_CAPACITY,
            commands: Vec::new(),
            group_keys: Vec::new(),
            stats: WgpuFrameStats::default(),
            max_units,
        }
    }

    pub fn max_texture_units(&self) -> u32 {
        self.max_units
    }

    pub fn registry(&self) -> &TextureRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut TextureRegistry {
        &mut self.registry
    }

    /// Counters from the last `render` call.
    pub fn stats(&self) -> WgpuFrameStats {
        self.stats
    }

    /// Drop cached bind groups, e.g. after texture eviction from the
    /// registry.
    pub fn invalidate_bind_groups(&mut self) {
        self.group_bindings.clear();
    }

    fn ensure_vertex_capacity(&mut self, vertices: usize) {
        if vertices <= self.vertex_capacity {
            return;
        }
        let capacity = vertices.next_power_of_two();
        tracing::debug!(
            from = self.vertex_capacity,
            to = capacity,
            "growing GPU vertex buffer"
        );
        self.vertex_buffer = pipeline::create_vertex_buffer(&self.device, capacity);
        self.vertex_capacity = capacity;
    }

    fn ensure_index_capacity(&mut self, indices: usize) {
        if indices <= self.index_capacity {
            return;
        }
        let capacity = indices.next_power_of_two();
        tracing::debug!(
            from = self.index_capacity,
            to = capacity,
            "growing GPU index buffer"
        );
        self.index_buffer = pipeline::create_index_buffer(&self.device, capacity);
        self.index_capacity = capacity;
    }

    /// Upload a pass and stage its commands for `render`.
    ///
    /// Must run before the render pass opens; buffer and bind-group creation
    /// are not legal while a pass is recording.
    pub fn prepare(&mut self, pass: &BatchPass<'_>, projection: [[f32; 4]; 4]) {
        profile_function!();

        self.queue.write_buffer(
            &self.projection_buffer,
            0,
            bytemuck::cast_slice(&projection),
        );

        self.ensure_vertex_capacity(pass.vertices.len());
        self.ensure_index_capacity(pass.indices.len());
        if !pass.vertices.is_empty() {
            self.queue
                .write_buffer(&self.vertex_buffer, 0, bytemuck::cast_slice(pass.vertices));
        }
        if !pass.indices.is_empty() {
            self.queue
                .write_buffer(&self.index_buffer, 0, bytemuck::cast_slice(pass.indices));
        }

        self.commands.clear();
        self.commands.extend_from_slice(pass.commands);
        self.group_keys.clear();
        for command in pass.commands {
            let key = match command {
                DrawCommand::Batch(group) => {
                    self.group_bindings
                        .ensure(&self.device, &self.registry, &group.bindings)
                }
                DrawCommand::Unbatched { .. } => Vec::new(),
            };
            self.group_keys.push(key);
        }
    }

    /// Record the prepared commands, logging unbatched elements instead of
    /// drawing them. Hosts with custom-shader or mask elements should use
    /// [`render_with`](Self::render_with).
    pub fn render(&mut self, rpass: &mut wgpu::RenderPass<'_>) {
        self.render_with(rpass, |_, element| {
            tracing::debug!(element, "no unbatched-draw hook, skipping element");
        });
    }

    /// Record the prepared commands into `rpass`, dispatching unbatched
    /// elements to `on_unbatched`.
    ///
    /// The hook may bind its own pipeline; shared state is re-applied after
    /// each call. Commands are recorded in `prepare` order.
    pub fn render_with(
        &mut self,
        rpass: &mut wgpu::RenderPass<'_>,
        mut on_unbatched: impl FnMut(&mut wgpu::RenderPass<'_>, usize),
    ) {
        profile_function!();
        let mut stats = WgpuFrameStats::default();

        let bind_frame = |rpass: &mut wgpu::RenderPass<'_>| {
            rpass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
            rpass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            rpass.set_bind_group(1, &self.projection_bind_group, &[]);
        };
        bind_frame(rpass);

        let mut current_blend: Option<BlendMode> = None;
        let mut current_key: Option<&[u64]> = None;

        for (command, key) in self.commands.iter().zip(&self.group_keys) {
            match command {
                DrawCommand::Batch(group) => {
                    if current_blend != Some(group.blend_mode) {
                        // One pipeline per blend mode, created in `new`.
                        let pipeline = &self.pipelines[&group.blend_mode];
                        rpass.set_pipeline(pipeline);
                        current_blend = Some(group.blend_mode);
                        stats.pipeline_switches += 1;
                    }
                    if current_key != Some(key.as_slice()) {
                        let Some(bind_group) = self.group_bindings.get(key) else {
                            tracing::warn!("missing texture bind group, skipping draw");
                            continue;
                        };
                        rpass.set_bind_group(0, bind_group, &[]);
                        current_key = Some(key);
                        stats.bind_group_switches += 1;
                    }
                    let start = group.start_index;
                    rpass.draw_indexed(start..start + group.index_count, 0, 0..1);
                    stats.draw_calls += 1;
                }
                DrawCommand::Unbatched { element } => {
                    on_unbatched(rpass, *element);
                    stats.unbatched += 1;
                    // The hook may have rebound anything.
                    bind_frame(rpass);
                    current_blend = None;
                    current_key = None;
                }
            }
        }

        self.stats = stats;
    }
}
