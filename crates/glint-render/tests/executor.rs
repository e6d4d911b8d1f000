//! Executor tests exercising the public API with mock backends.

use glint_render::batch::{BatchConfig, BatchGroupBuilder};
use glint_render::blend::BlendMode;
use glint_render::element::ElementFlags;
use glint_render::error::{BackendError, RenderError};
use glint_render::executor::DrawCallExecutor;
use glint_test_utils::{BackendCall, FailingBackend, RecordingBackend, quad_element, tex};

fn builder(max_units: u32) -> BatchGroupBuilder {
    BatchGroupBuilder::new(BatchConfig {
        max_texture_units: max_units,
        ..Default::default()
    })
    .unwrap()
}

#[test]
fn test_single_group_call_sequence() {
    let mut builder = builder(2);
    let elements = vec![
        quad_element(tex(1), BlendMode::Normal),
        quad_element(tex(2), BlendMode::Normal),
        quad_element(tex(1), BlendMode::Normal),
    ];
    let pass = builder.build(&elements);

    let mut executor = DrawCallExecutor::new(RecordingBackend::new(2));
    executor.execute(&pass, &elements).unwrap();

    assert_eq!(
        executor.backend().calls(),
        &[
            BackendCall::BindTexture { slot: 0, texture: 1 },
            BackendCall::BindTexture { slot: 1, texture: 2 },
            BackendCall::SetBlendMode(BlendMode::Normal),
            BackendCall::DrawIndexed {
                first_index: 0,
                index_count: 18
            },
        ]
    );
}

#[test]
fn test_blend_change_emits_two_draws_in_order() {
    let mut builder = builder(8);
    let elements = vec![
        quad_element(tex(1), BlendMode::Normal),
        quad_element(tex(1), BlendMode::Add),
    ];
    let pass = builder.build(&elements);

    let mut executor = DrawCallExecutor::new(RecordingBackend::new(8));
    executor.execute(&pass, &elements).unwrap();

    assert_eq!(
        executor.backend().calls(),
        &[
            BackendCall::BindTexture { slot: 0, texture: 1 },
            BackendCall::SetBlendMode(BlendMode::Normal),
            BackendCall::DrawIndexed {
                first_index: 0,
                index_count: 6
            },
            BackendCall::BindTexture { slot: 0, texture: 1 },
            BackendCall::SetBlendMode(BlendMode::Add),
            BackendCall::DrawIndexed {
                first_index: 6,
                index_count: 6
            },
        ]
    );
}

#[test]
fn test_unbatched_elements_dispatch_in_stream_order() {
    let mut builder = builder(8);
    let masked =
        quad_element(tex(2), BlendMode::Normal).with_flags(ElementFlags::CUSTOM_SHADER);
    let elements = vec![
        quad_element(tex(1), BlendMode::Normal),
        masked,
        quad_element(tex(1), BlendMode::Normal),
    ];
    let pass = builder.build(&elements);

    let mut executor = DrawCallExecutor::new(RecordingBackend::new(8));
    executor.execute(&pass, &elements).unwrap();

    let calls = executor.backend().calls();
    assert_eq!(calls[2], BackendCall::DrawIndexed {
        first_index: 0,
        index_count: 6
    });
    assert_eq!(calls[3], BackendCall::DrawUnbatched { element_texture: 2 });
    // State is re-applied after the pass-through draw.
    assert_eq!(calls[5], BackendCall::SetBlendMode(BlendMode::Normal));
    assert_eq!(calls[6], BackendCall::DrawIndexed {
        first_index: 6,
        index_count: 6
    });
}

#[test]
fn test_backend_failure_aborts_the_frame() {
    let mut builder = builder(8);
    let elements = vec![
        quad_element(tex(1), BlendMode::Normal),
        quad_element(tex(1), BlendMode::Add),
    ];
    let pass = builder.build(&elements);

    // First group takes three calls, the second group's bind is the
    // fourth; its blend change fails and nothing runs after it.
    let mut executor = DrawCallExecutor::new(FailingBackend::fail_after(4));
    let result = executor.execute(&pass, &elements);
    assert!(matches!(
        result,
        Err(RenderError::Backend(BackendError::ContextLost))
    ));
    assert_eq!(executor.backend().issued(), 4);
}

#[test]
fn test_stale_command_is_rejected() {
    let mut builder = builder(8);
    let masked =
        quad_element(tex(1), BlendMode::Normal).with_flags(ElementFlags::CUSTOM_SHADER);
    let elements = vec![masked];
    let pass = builder.build(&elements);

    let mut executor = DrawCallExecutor::new(RecordingBackend::new(8));
    let result = executor.execute(&pass, &[]);
    assert!(matches!(
        result,
        Err(RenderError::StaleCommand { element: 0 })
    ));
}
