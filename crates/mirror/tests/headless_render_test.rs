//! Headless wgpu integration tests.
//!
//! These need a GPU adapter (real or software fallback). Without one the
//! backend cannot be created and the test returns early.

use std::cell::Cell;
use std::rc::Rc;

use mirror::*;

/// Records the in-flight flag each time it is asked to draw.
struct FlagDrawer {
    seen: Rc<Cell<Option<bool>>>,
}

impl SceneDrawer for FlagDrawer {
    fn draw(&mut self, frame: &DrawFrame<'_>, _pass: &mut wgpu::RenderPass<'_>) {
        self.seen.set(Some(frame.ctx.is_rendering_reflection()));
    }
}

/// Opens a headless backend, or `None` when no adapter is available.
fn backend() -> Option<WgpuBackend> {
    init_logging();
    match headless_backend(Box::new(ClearOnlyDrawer)) {
        Ok(backend) => Some(backend),
        Err(e) => {
            eprintln!("Skipping headless tests: no GPU adapter available ({e})");
            None
        }
    }
}

#[test]
fn headless_reflection_tests() {
    let Some(mut backend) = backend() else {
        return;
    };
    let ctx = ReflectionContext::new();

    let mut floor = MirrorSurface::new(
        "floor",
        Pose::default(),
        MirrorConfig {
            texture_size: 64,
            ..Default::default()
        },
    )
    .unwrap()
    .with_renderer(SurfaceRenderer::new(vec![Material::mirror("floor")]));

    let mut camera = Camera::default().looking_at(Vec3::new(0.0, 2.0, 4.0), Vec3::ZERO, Vec3::Y);
    camera.clear_flags = ClearFlags::SolidColor;
    camera.background_color = Vec4::new(1.0, 0.0, 0.0, 1.0);
    let viewer = ViewerCamera::new(ViewerId(1), camera);

    // --- Test 1: the reflection clears to the viewer's background ---
    {
        let outcome = floor
            .render_reflection(&ctx, &mut backend, Some(&viewer))
            .unwrap();
        let target = outcome.target().expect("reflection should render");

        let pixels = backend.read_target(target).unwrap();
        assert_eq!(pixels.len(), 64 * 64 * 4);
        assert!(pixels.chunks(4).all(|px| px == [255, 0, 0, 255]));

        let material = &floor.renderer().unwrap().materials[0];
        assert_eq!(material.texture(REFLECTION_TEXTURE_PROPERTY), Some(target));
        assert_eq!(backend.pixel_light_count(), 4);
        assert!(!backend.invert_culling());
    }

    // --- Test 2: resizing swaps the texture ---
    {
        floor.set_texture_size(128).unwrap();
        let target = floor
            .render_reflection(&ctx, &mut backend, Some(&viewer))
            .unwrap()
            .target()
            .unwrap();
        assert_eq!(backend.texture(target).map(|t| t.size), Some(128));
        assert_eq!(backend.target_count(), 1);
    }

    // --- Test 3: an oversized target fails and leaves the surface usable ---
    {
        let too_big = backend.device().limits().max_texture_dimension_2d + 1;
        floor.set_texture_size(too_big).unwrap();
        assert!(matches!(
            floor.render_reflection(&ctx, &mut backend, Some(&viewer)),
            Err(RenderError::TextureCreationFailed(_))
        ));
        assert!(!ctx.is_rendering_reflection());

        floor.set_texture_size(64).unwrap();
        assert!(floor
            .render_reflection(&ctx, &mut backend, Some(&viewer))
            .unwrap()
            .is_rendered());
    }

    // --- Test 4: the drawer runs with the reflection in flight ---
    {
        let seen = Rc::new(Cell::new(None));
        backend.set_drawer(Box::new(FlagDrawer { seen: seen.clone() }));
        assert!(floor
            .render_reflection(&ctx, &mut backend, Some(&viewer))
            .unwrap()
            .is_rendered());
        assert_eq!(seen.get(), Some(true));
        assert!(!ctx.is_rendering_reflection());
        backend.set_drawer(Box::new(ClearOnlyDrawer));
    }

    // --- Test 5: disabling releases everything ---
    {
        floor.disable(&mut backend);
        assert_eq!(backend.target_count(), 0);
        assert_eq!(backend.camera_count(), 0);
    }
}
