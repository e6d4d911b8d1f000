//! Texture registration and per-group bind groups.

use std::sync::Arc;

use ahash::HashMap;

use crate::batch::TextureBinding;
use crate::texture::TextureHandle;

use super::pipeline;

/// Maps texture handle ids to the GPU views the host has uploaded.
///
/// The registry holds shared references only; texel data and lifetime are
/// owned by the host's texture cache.
#[derive(Default)]
pub struct TextureRegistry {
    views: HashMap<u64, Arc<wgpu::TextureView>>,
}

impl TextureRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the view for a handle.
    pub fn register(&mut self, handle: TextureHandle, view: Arc<wgpu::TextureView>) {
        self.views.insert(handle.id(), view);
    }

    /// Drop the view for a handle id, e.g. when the host evicts the texture.
    pub fn unregister(&mut self, id: u64) {
        self.views.remove(&id);
    }

    pub fn get(&self, id: u64) -> Option<&Arc<wgpu::TextureView>> {
        self.views.get(&id)
    }

    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }
}

/// Builds and caches one bind group per distinct slot assignment.
///
/// Groups repeat their texture sets frame after frame, so bind groups are
/// cached keyed by the ordered slot-id list. Slots beyond a group's bindings
/// are padded with a 1x1 white fallback to satisfy the fixed layout.
pub struct GroupBindings {
    layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    fallback_view: wgpu::TextureView,
    _fallback_texture: wgpu::Texture,
    max_units: u32,
    cache: HashMap<Vec<u64>, wgpu::BindGroup>,
}

impl GroupBindings {
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue, max_units: u32) -> Self {
        let layout = pipeline::create_texture_bind_group_layout(device, max_units);
        let (fallback_texture, fallback_view, sampler) =
            pipeline::create_fallback_texture(device, queue);
        Self {
            layout,
            sampler,
            fallback_view,
            _fallback_texture: fallback_texture,
            max_units,
            cache: HashMap::default(),
        }
    }

    pub fn layout(&self) -> &wgpu::BindGroupLayout {
        &self.layout
    }

    /// Cache key for a group's slot assignment.
    pub fn key_for(bindings: &[TextureBinding]) -> Vec<u64> {
        bindings.iter().map(|binding| binding.texture.id()).collect()
    }

    /// Ensure a bind group exists for the given slot assignment and return
    /// its cache key. Unregistered textures bind the fallback view.
    pub fn ensure(
        &mut self,
        device: &wgpu::Device,
        registry: &TextureRegistry,
        bindings: &[TextureBinding],
    ) -> Vec<u64> {
        let key = Self::key_for(bindings);
        if self.cache.contains_key(&key) {
            return key;
        }

        let mut views: Vec<&wgpu::TextureView> = Vec::with_capacity(self.max_units as usize);
        for binding in bindings {
            match registry.get(binding.texture.id()) {
                Some(view) => views.push(view),
                None => {
                    tracing::warn!(
                        texture = binding.texture.id(),
                        "texture not registered, binding fallback"
                    );
                    views.push(&self.fallback_view);
                }
            }
        }
        while views.len() < self.max_units as usize {
            views.push(&self.fallback_view);
        }

        let mut entries: Vec<wgpu::BindGroupEntry> =
            Vec::with_capacity(self.max_units as usize + 1);
        for (slot, view) in views.iter().enumerate() {
            entries.push(wgpu::BindGroupEntry {
                binding: slot as u32,
                resource: wgpu::BindingResource::TextureView(view),
            });
        }
        entries.push(wgpu::BindGroupEntry {
            binding: self.max_units,
            resource: wgpu::BindingResource::Sampler(&self.sampler),
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("glint_batch_texture_bg"),
            layout: &self.layout,
            entries: &entries,
        });
        self.cache.insert(key.clone(), bind_group);
        key
    }

    /// Look up a cached bind group by key.
    pub fn get(&self, key: &[u64]) -> Option<&wgpu::BindGroup> {
        self.cache.get(key)
    }

    /// Drop all cached bind groups, e.g. after texture eviction.
    pub fn clear(&mut self) {
        self.cache.clear();
    }
}
