//! The surface lifecycle: created, resized, draw frame.

use crate::assets::AssetSource;
use crate::core::{FrameError, GraphicsDevice};
use crate::scene::{Scene, SelectionHandle};
use crate::shader::ShaderRegistry;

/// Binds a device and a scene to the three surface lifecycle hooks.
///
/// All hooks run on the render thread. The selection is the only state
/// shared with other threads, through [`SelectionHandle`].
pub struct SurfaceRenderer<D: GraphicsDevice, S: Scene> {
    device: D,
    scene: S,
    assets: Box<dyn AssetSource>,
    shaders: Option<ShaderRegistry>,
    selection: SelectionHandle,
    size: (u32, u32),
    lost_frames: u64,
}

impl<D: GraphicsDevice, S: Scene> SurfaceRenderer<D, S> {
    /// Create an adapter. Nothing is built until [`Self::on_surface_created`].
    pub fn new(device: D, scene: S, assets: Box<dyn AssetSource>) -> Self {
        Self {
            device,
            scene,
            assets,
            shaders: None,
            selection: SelectionHandle::new(-1),
            size: (0, 0),
            lost_frames: 0,
        }
    }

    /// The surface (and possibly a new context) exists. Releases anything
    /// built before, then creates the scene with a fresh shader registry.
    pub fn on_surface_created(&mut self) {
        if let Some(mut shaders) = self.shaders.take() {
            log::info!("Surface recreated, rebuilding scene");
            self.scene.release(&mut self.device);
            shaders.release(&mut self.device);
        }

        let mut shaders = ShaderRegistry::new();
        self.scene.create(&mut self.device, &mut shaders, self.assets.as_ref());
        self.shaders = Some(shaders);

        if self.size != (0, 0) {
            self.scene.resize(self.size.0, self.size.1);
        }
    }

    /// The surface changed size.
    pub fn on_surface_resized(&mut self, width: u32, height: u32) {
        log::debug!("Surface resized to {width}x{height}");
        self.size = (width, height);
        self.device.set_viewport(width, height);
        self.scene.resize(width, height);
    }

    /// Draw one frame. Does nothing before the surface is created. Frame
    /// errors are logged, never returned.
    pub fn on_draw_frame(&mut self) {
        let Some(shaders) = self.shaders.as_mut() else {
            return;
        };

        self.device.begin_frame(self.scene.clear_color());
        self.scene.draw(&mut self.device, shaders, self.selection.get());
        match self.device.end_frame() {
            Ok(()) => {}
            Err(FrameError::ContextLost) => {
                self.lost_frames += 1;
                log::warn!("Context lost, waiting for the surface to be recreated");
            }
            Err(err) => log::error!("Frame failed: {err}"),
        }
    }

    /// Select body `index`. Out-of-range values select nothing.
    pub fn set_selected_index(&self, index: i32) {
        self.selection.set(index);
    }

    /// Currently selected index.
    #[inline]
    pub fn selected_index(&self) -> i32 {
        self.selection.get()
    }

    /// A handle other threads can use to change the selection.
    pub fn selection_handle(&self) -> SelectionHandle {
        self.selection.clone()
    }

    /// Whether `on_surface_created` has run.
    #[inline]
    pub fn is_created(&self) -> bool {
        self.shaders.is_some()
    }

    /// Frames that ended with a lost context.
    #[inline]
    pub fn lost_frames(&self) -> u64 {
        self.lost_frames
    }

    /// The device.
    #[inline]
    pub fn device(&self) -> &D {
        &self.device
    }

    /// The device, mutably.
    #[inline]
    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }

    /// The scene.
    #[inline]
    pub fn scene(&self) -> &S {
        &self.scene
    }

    /// The scene, mutably.
    #[inline]
    pub fn scene_mut(&mut self) -> &mut S {
        &mut self.scene
    }

    /// Replace the scene. The old one is released and the new one created
    /// if the surface exists.
    ///
    /// The returned scene holds no device handles but keeps its own state,
    /// so it can be swapped back in later.
    pub fn replace_scene(&mut self, scene: S) -> S {
        self.scene.release(&mut self.device);
        let old = std::mem::replace(&mut self.scene, scene);
        if let Some(shaders) = self.shaders.as_mut() {
            self.scene.create(&mut self.device, shaders, self.assets.as_ref());
            if self.size != (0, 0) {
                self.scene.resize(self.size.0, self.size.1);
            }
        }
        old
    }

    /// Free every handle held by the scene and the shader registry.
    pub fn release(&mut self) {
        self.scene.release(&mut self.device);
        if let Some(mut shaders) = self.shaders.take() {
            shaders.release(&mut self.device);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::NoAssets;
    use crate::core::{HeadlessDevice, InjectedFailure, RenderState};
    use crate::scene::{DetailScene, GalaxyScene, SceneConfig};
    use crate::shader::ShaderVariant;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn renderer() -> SurfaceRenderer<HeadlessDevice, GalaxyScene> {
        let scene = GalaxyScene::with_rng(SceneConfig::default(), StdRng::seed_from_u64(1));
        SurfaceRenderer::new(HeadlessDevice::new(), scene, Box::new(NoAssets))
    }

    #[test]
    fn test_draw_before_create_is_noop() {
        let mut renderer = renderer();
        renderer.on_draw_frame();
        assert_eq!(renderer.device().frame_count(), 0);
        assert!(!renderer.is_created());
    }

    #[test]
    fn test_lifecycle_draws_frames() {
        let mut renderer = renderer();
        renderer.on_surface_created();
        renderer.on_surface_resized(1280, 720);
        renderer.on_draw_frame();

        assert_eq!(renderer.device().viewport(), (1280, 720));
        assert_eq!(renderer.device().last_frame().len(), 12);
        assert_eq!(renderer.device().clear_color(), [0.0, 0.0, 0.0, 1.0]);
        assert!((renderer.scene().aspect() - 1280.0 / 720.0).abs() < 1e-6);
    }

    #[test]
    fn test_selection_from_another_thread() {
        let mut renderer = renderer();
        renderer.on_surface_created();

        let handle = renderer.selection_handle();
        std::thread::spawn(move || handle.set(4)).join().unwrap();
        assert_eq!(renderer.selected_index(), 4);

        renderer.on_draw_frame();
        let last = *renderer.device().last_frame().last().unwrap();
        assert_eq!(last.state, RenderState::TRANSLUCENT);

        renderer.set_selected_index(99);
        renderer.on_draw_frame();
        assert_eq!(renderer.device().last_frame().len(), 12);
    }

    #[test]
    fn test_created_twice_does_not_leak() {
        let mut renderer = renderer();
        renderer.on_surface_created();
        let buffers = renderer.device().live_buffers();
        let programs = renderer.device().live_programs();

        renderer.on_surface_created();
        assert_eq!(renderer.device().live_buffers(), buffers);
        assert_eq!(renderer.device().live_programs(), programs);
        assert!(renderer.scene().is_ready(renderer.device()));

        renderer.on_draw_frame();
        assert_eq!(renderer.device().last_frame().len(), 12);
    }

    #[test]
    fn test_context_loss_recovers_after_recreate() {
        let mut renderer = renderer();
        renderer.on_surface_created();
        renderer.on_draw_frame();

        renderer.device_mut().lose_context();
        assert!(!renderer.scene().is_ready(renderer.device()));
        renderer.on_draw_frame();
        assert_eq!(renderer.lost_frames(), 1);

        // Dead meshes skip their draws until the surface is recreated.
        renderer.on_draw_frame();
        assert!(renderer.device().last_frame().is_empty());
        assert_eq!(renderer.device().live_programs(), 0);

        renderer.on_surface_created();
        renderer.on_draw_frame();
        assert_eq!(renderer.device().last_frame().len(), 12);
        assert!(renderer.scene().is_ready(renderer.device()));
    }

    #[test]
    fn test_shader_failure_is_retried_each_frame() {
        let mut renderer = renderer();
        renderer
            .device_mut()
            .fail_program(ShaderVariant::Flat, Some(InjectedFailure::Compile));
        renderer.on_surface_created();
        let attempts = renderer.device().compile_attempts();

        renderer.on_draw_frame();
        assert!(renderer.device().last_frame().len() < 12);
        assert!(renderer.device().compile_attempts() > attempts);

        renderer.device_mut().fail_program(ShaderVariant::Flat, None);
        renderer.on_draw_frame();
        assert_eq!(renderer.device().last_frame().len(), 12);
    }

    #[test]
    fn test_replaced_galaxy_keeps_its_animation() {
        let mut renderer = renderer();
        renderer.on_surface_created();
        renderer.on_surface_resized(100, 100);
        for _ in 0..5 {
            renderer.on_draw_frame();
        }
        let angle = renderer.scene().orrery().angle(crate::scene::BodyId::Planet(4));

        let fresh = GalaxyScene::with_rng(SceneConfig::default(), StdRng::seed_from_u64(2));
        let parked = renderer.replace_scene(fresh);
        assert_eq!(parked.orrery().frames(), 5);
        assert!(!parked.is_ready(renderer.device()));
        renderer.on_draw_frame();

        let fresh = renderer.replace_scene(parked);
        assert_eq!(fresh.orrery().frames(), 1);
        assert!(renderer.scene().is_ready(renderer.device()));
        assert_eq!(renderer.scene().orrery().angle(crate::scene::BodyId::Planet(4)), angle);

        renderer.on_draw_frame();
        assert_eq!(renderer.scene().orrery().frames(), 6);
        assert_eq!(renderer.device().last_frame().len(), 12);
    }

    #[test]
    fn test_switch_to_detail_scene() {
        let config = SceneConfig::default();
        let galaxy: Box<dyn Scene> = Box::new(GalaxyScene::with_rng(config.clone(), StdRng::seed_from_u64(3)));
        let mut renderer = SurfaceRenderer::new(HeadlessDevice::new(), galaxy, Box::new(NoAssets));
        renderer.on_surface_created();
        renderer.on_surface_resized(100, 100);
        let galaxy_buffers = renderer.device().live_buffers();

        renderer.replace_scene(Box::new(DetailScene::new(config, 3)));
        assert!(renderer.device().live_buffers() < galaxy_buffers);
        renderer.on_draw_frame();
        assert_eq!(renderer.device().last_frame().len(), 1);

        renderer.release();
        assert_eq!(renderer.device().live_buffers(), 0);
        assert_eq!(renderer.device().live_programs(), 0);
    }
}
