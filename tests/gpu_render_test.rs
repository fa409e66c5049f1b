#[cfg(feature = "integration-tests")]
mod gpu {
    use instant::Duration;
    use spin_ngin::{
        data_structures::{
            material::{Colour, Material},
            texture::Environment,
        },
        Program, RenderLoop, RotationStep, SceneConfig, Viewport, bootstrap, context::Context,
        lifecycle::ResizeResponder, render::Renderer,
    };

    const SIZE: Viewport = Viewport::new(64, 64);

    fn is_black(pixel: &image::Rgba<u8>) -> bool {
        pixel[0] < 3 && pixel[1] < 3 && pixel[2] < 3
    }

    #[tokio::test]
    async fn should_render_the_icosahedron_over_the_clear_colour() {
        let mut gpu = Context::headless(SIZE, &SceneConfig::default()).await.unwrap();
        let mut ctx = bootstrap(Program::GettingStarted, SIZE).unwrap();
        let mut render_loop = RenderLoop::new(RotationStep::default());

        render_loop
            .tick(&mut ctx, &mut gpu, Duration::from_millis(16))
            .unwrap();
        let img = gpu.read_pixels().await.unwrap();

        assert_eq!(img.dimensions(), (64, 64));
        assert!(is_black(img.get_pixel(0, 0)));
        assert!(!is_black(img.get_pixel(32, 32)));
        // faces lit by the cyan hemisphere, away from the white wireframe
        let cyan = img
            .pixels()
            .filter(|p| {
                let [r, g, b, _] = p.0.map(u16::from);
                g > 20 && r + 10 < g && r + 10 < b
            })
            .count();
        assert!(cyan > 100, "only {} cyan pixels", cyan);
    }

    #[tokio::test]
    async fn should_render_the_glass_cube_without_an_environment() {
        let config = SceneConfig::default().with_clear_colour(wgpu::Color::WHITE);
        let mut gpu = Context::headless(SIZE, &config).await.unwrap();
        let mut ctx = bootstrap(Program::GlassCube, SIZE).unwrap();
        assert!(ctx.scene.environment().is_none());

        RenderLoop::new(RotationStep::default())
            .tick(&mut ctx, &mut gpu, Duration::from_millis(16))
            .unwrap();
        let img = gpu.read_pixels().await.unwrap();

        assert_eq!(*img.get_pixel(0, 0), image::Rgba([255, 255, 255, 255]));
        assert_ne!(*img.get_pixel(32, 32), image::Rgba([255, 255, 255, 255]));
    }

    #[tokio::test]
    async fn should_resize_the_render_target() {
        let mut gpu = Context::headless(SIZE, &SceneConfig::default()).await.unwrap();
        let mut ctx = bootstrap(Program::GlassCube, SIZE).unwrap();

        ResizeResponder::apply(&mut ctx, &mut gpu, Viewport::new(96, 48));
        gpu.draw(&ctx.scene, &ctx.camera).unwrap();
        let img = gpu.read_pixels().await.unwrap();

        assert_eq!(gpu.size(), Viewport::new(96, 48));
        assert_eq!(img.dimensions(), (96, 48));
    }

    fn solid_environment(rgba: [u8; 4]) -> Environment {
        Environment::new(image::RgbaImage::from_pixel(8, 4, image::Rgba(rgba)))
    }

    #[tokio::test]
    async fn should_upload_a_replaced_environment() {
        let mut gpu = Context::headless(SIZE, &SceneConfig::default()).await.unwrap();
        let mut ctx = bootstrap(Program::GlassCube, SIZE).unwrap();
        let mut render_loop = RenderLoop::new(RotationStep::default());
        let frame = Duration::from_millis(16);

        ctx.scene.set_environment(Some(solid_environment([255, 0, 0, 255])));
        render_loop.tick(&mut ctx, &mut gpu, frame).unwrap();
        let red = *gpu.read_pixels().await.unwrap().get_pixel(0, 0);

        ctx.scene.set_environment(Some(solid_environment([0, 0, 255, 255])));
        render_loop.tick(&mut ctx, &mut gpu, frame).unwrap();
        let blue = *gpu.read_pixels().await.unwrap().get_pixel(0, 0);

        assert!(red[0] > 200 && red[2] < 30, "background was {:?}", red);
        assert!(blue[2] > 200 && blue[0] < 30, "background was {:?}", blue);
    }

    #[tokio::test]
    async fn should_pick_up_material_changes_between_frames() {
        let mut gpu = Context::headless(SIZE, &SceneConfig::default()).await.unwrap();
        let mut ctx = bootstrap(Program::GettingStarted, SIZE).unwrap();
        let mut render_loop = RenderLoop::new(RotationStep::default());
        let frame = Duration::from_millis(16);
        render_loop.tick(&mut ctx, &mut gpu, frame).unwrap();

        let mesh = ctx.scene.find_mut(ctx.animated).unwrap();
        mesh.mesh_mut().unwrap().material = Material::basic(Colour::rgb(1.0, 0.0, 0.0));
        render_loop.tick(&mut ctx, &mut gpu, frame).unwrap();
        let img = gpu.read_pixels().await.unwrap();

        let red = img
            .pixels()
            .filter(|p| p[0] > 200 && p[1] < 30 && p[2] < 30)
            .count();
        assert!(red > 100, "only {} red pixels", red);
    }
}
