//! Batching tests exercising the public API with the recording backend.

use glint_render::batch::{BatchConfig, BatchGroup, BatchGroupBuilder, BatchPass, DrawCommand};
use glint_render::blend::BlendMode;
use glint_render::color::Color;
use glint_render::element::{ElementFlags, RenderElement};
use glint_render::error::BatchConfigError;
use glint_render::texture::TextureHandle;
use glint_test_utils::{RecordingBackend, quad_element, tex};

fn builder(max_units: u32) -> BatchGroupBuilder {
    BatchGroupBuilder::new(BatchConfig {
        max_texture_units: max_units,
        ..Default::default()
    })
    .unwrap()
}

fn groups(pass: &BatchPass<'_>) -> Vec<BatchGroup> {
    pass.commands
        .iter()
        .filter_map(|command| match command {
            DrawCommand::Batch(group) => Some(group.clone()),
            DrawCommand::Unbatched { .. } => None,
        })
        .collect()
}

#[test]
fn test_rejects_bad_config() {
    let config = BatchConfig {
        growth_factor: 1.0,
        ..Default::default()
    };
    assert!(matches!(
        BatchGroupBuilder::new(config),
        Err(BatchConfigError::InvalidGrowthFactor(_))
    ));

    let config = BatchConfig {
        initial_vertex_capacity: 0,
        ..Default::default()
    };
    assert!(matches!(
        BatchGroupBuilder::new(config),
        Err(BatchConfigError::ZeroInitialCapacity)
    ));
}

#[test]
fn test_config_adopts_backend_budget() {
    let backend = RecordingBackend::new(3);
    let config = BatchConfig::for_backend(&backend);
    assert_eq!(config.max_texture_units, 3);

    let builder = BatchGroupBuilder::new(config).unwrap();
    assert_eq!(builder.max_texture_units(), 3);
}

#[test]
fn test_shared_texture_and_blend_is_one_group() {
    let mut builder = builder(8);
    let elements: Vec<_> = (0..50)
        .map(|_| quad_element(tex(1), BlendMode::Normal))
        .collect();
    let pass = builder.build(&elements);

    let groups = groups(&pass);
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].start_index, 0);
    assert_eq!(groups[0].index_count, 50 * 6);
    assert_eq!(groups[0].bindings.len(), 1);
    assert_eq!(pass.vertices.len(), 50 * 4);
}

#[test]
fn test_two_textures_within_budget_share_a_group() {
    // 3 elements, 2 distinct textures, budget 2: one draw call.
    let mut builder = builder(2);
    let elements = vec![
        quad_element(tex(1), BlendMode::Normal),
        quad_element(tex(2), BlendMode::Normal),
        quad_element(tex(1), BlendMode::Normal),
    ];
    let pass = builder.build(&elements);

    let groups = groups(&pass);
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].bindings.len(), 2);
    assert_eq!(groups[0].index_count, 3 * 6);
    // First and third elements share slot 0.
    assert_eq!(pass.vertices[0].texture_unit, 0);
    assert_eq!(pass.vertices[4].texture_unit, 1);
    assert_eq!(pass.vertices[8].texture_unit, 0);
}

#[test]
fn test_blend_change_forces_boundary() {
    let mut builder = builder(8);
    let elements = vec![
        quad_element(tex(1), BlendMode::Normal),
        quad_element(tex(1), BlendMode::Add),
    ];
    let pass = builder.build(&elements);

    let groups = groups(&pass);
    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].blend_mode, BlendMode::Normal);
    assert_eq!(groups[1].blend_mode, BlendMode::Add);
    assert_eq!(groups[0].start_index, 0);
    assert_eq!(groups[1].start_index, 6);
}

#[test]
fn test_texture_budget_forces_boundary() {
    let mut builder = builder(1);
    let elements = vec![
        quad_element(tex(1), BlendMode::Normal),
        quad_element(tex(2), BlendMode::Normal),
    ];
    let pass = builder.build(&elements);

    let groups = groups(&pass);
    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].bindings[0].texture.id(), 1);
    assert_eq!(groups[1].bindings[0].texture.id(), 2);
}

#[test]
fn test_budget_invariant_holds_for_many_textures() {
    let mut builder = builder(4);
    let elements: Vec<_> = (0..40u64)
        .map(|i| quad_element(tex(i % 10 + 1), BlendMode::Normal))
        .collect();
    let pass = builder.build(&elements);

    for group in groups(&pass) {
        assert!(group.bindings.len() <= 4);
        // Distinct textures within the group.
        let mut ids: Vec<_> = group.bindings.iter().map(|b| b.texture.id()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), group.bindings.len());
    }
}

#[test]
fn test_order_is_preserved() {
    // Tag each element through its packed color and check the index
    // stream visits elements in submission order.
    let mut builder = builder(2);
    let elements: Vec<_> = (0..20u64)
        .map(|i| {
            let mut element = quad_element(tex(i % 5 + 1), BlendMode::Normal);
            // Blue channel tags the element; alpha stays 1.0 so packing
            // leaves it untouched.
            element.tint = Color::from_hex(i as u32);
            element
        })
        .collect();
    let pass = builder.build(&elements);

    let mut seen_order = Vec::new();
    for &index in pass.indices {
        let tag = pass.vertices[index as usize].color >> 16 & 0xFF;
        if seen_order.last() != Some(&tag) {
            seen_order.push(tag);
        }
    }
    let expected: Vec<u32> = (0..20).collect();
    assert_eq!(seen_order, expected);
}

#[test]
fn test_skips_empty_and_unloaded_elements() {
    let mut builder = builder(8);
    let mut empty = quad_element(tex(1), BlendMode::Normal);
    empty.vertices.clear();
    empty.uvs.clear();
    empty.indices.clear();
    let unloaded = quad_element(TextureHandle::INVALID, BlendMode::Normal);

    let elements = vec![
        empty,
        quad_element(tex(1), BlendMode::Normal),
        unloaded,
        quad_element(tex(1), BlendMode::Normal),
    ];
    let pass = builder.build(&elements);

    assert_eq!(pass.stats.skipped, 2);
    let groups = groups(&pass);
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].index_count, 12);
}

#[test]
fn test_unbatchable_element_splits_the_stream() {
    let mut builder = builder(8);
    let masked =
        quad_element(tex(1), BlendMode::Normal).with_flags(ElementFlags::MASK_BOUNDARY);
    let elements = vec![
        quad_element(tex(1), BlendMode::Normal),
        masked,
        quad_element(tex(1), BlendMode::Normal),
    ];
    let pass = builder.build(&elements);

    assert_eq!(pass.commands.len(), 3);
    assert!(matches!(pass.commands[0], DrawCommand::Batch(_)));
    assert!(matches!(pass.commands[1], DrawCommand::Unbatched { element: 1 }));
    assert!(matches!(pass.commands[2], DrawCommand::Batch(_)));
    assert_eq!(pass.stats.unbatched, 1);
}

#[test]
fn test_rebuild_is_byte_identical() {
    let mut builder = builder(3);
    let elements: Vec<_> = (0..30u64)
        .map(|i| {
            quad_element(
                tex(i % 7 + 1),
                if i % 3 == 0 {
                    BlendMode::Add
                } else {
                    BlendMode::Normal
                },
            )
        })
        .collect();

    let (first_vertices, first_indices, first_commands) = {
        let pass = builder.build(&elements);
        (
            pass.vertices.to_vec(),
            pass.indices.to_vec(),
            pass.commands.to_vec(),
        )
    };

    builder.reset();
    let pass = builder.build(&elements);
    assert_eq!(pass.vertices, first_vertices.as_slice());
    assert_eq!(pass.indices, first_indices.as_slice());
    assert_eq!(pass.commands, first_commands.as_slice());
}

#[test]
fn test_oversized_element_keeps_valid_indices() {
    // More vertices than u16 can address: in-range indices must pass
    // through untouched, not get clamped against a wrapped ceiling.
    let mut builder = builder(8);
    let count = u16::MAX as usize + 3;
    let element = RenderElement::mesh(
        tex(1),
        vec![[0.0, 0.0]; count],
        vec![[0.0, 0.0]; count],
        vec![0, 1, 3],
        Color::WHITE,
        1.0,
        BlendMode::Normal,
    );
    let pass = builder.build(&[element]);

    assert_eq!(pass.indices, &[0, 1, 3]);
    assert_eq!(pass.stats.clamped, 0);
}

#[test]
fn test_zero_unit_budget_still_batches() {
    let mut builder = builder(0);
    assert_eq!(builder.max_texture_units(), 1);
    let elements = vec![quad_element(tex(1), BlendMode::Normal)];
    let pass = builder.build(&elements);
    assert_eq!(groups(&pass).len(), 1);
}

#[test]
fn test_stats_account_for_every_element() {
    let mut builder = builder(2);
    let elements = vec![
        quad_element(tex(1), BlendMode::Normal),
        quad_element(TextureHandle::INVALID, BlendMode::Normal),
        quad_element(tex(2), BlendMode::Add),
    ];
    let pass = builder.build(&elements);

    assert_eq!(pass.stats.elements, 3);
    assert_eq!(pass.stats.skipped, 1);
    assert_eq!(pass.stats.vertices, 8);
    assert_eq!(pass.stats.indices, 12);
    assert_eq!(pass.stats.draw_calls, 2);
    assert_eq!(pass.stats.texture_bindings, 2);
}
