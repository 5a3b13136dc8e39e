//! Desktop host: drives the surface lifecycle from a window.
//!
//! ```text
//! orrery [assets-dir] [config.json]
//! ```
//!
//! Left/Right step the selection, `I` logs the selected body, `D` toggles
//! the detail view of the selected body, Esc quits. The galaxy keeps its
//! orbit angles across detail toggles.

use orrery::assets::DirectoryAssets;
use orrery::core::{Context, RenderConfig, WgpuDevice};
use orrery::scene::{body_info, next_selection, previous_selection, DetailScene, GalaxyScene, Scene, SceneConfig};
use orrery::surface::SurfaceRenderer;
use std::path::PathBuf;
use std::sync::Arc;
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{ElementState, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

type Renderer = SurfaceRenderer<WgpuDevice, Box<dyn Scene>>;

struct App {
    assets_dir: PathBuf,
    config: SceneConfig,
    window: Option<Arc<Window>>,
    renderer: Option<Renderer>,
    detail: bool,
    /// The released galaxy while the detail view is up.
    parked: Option<Box<dyn Scene>>,
}

impl App {
    fn new(assets_dir: PathBuf, config: SceneConfig) -> Self {
        Self {
            assets_dir,
            config,
            window: None,
            renderer: None,
            detail: false,
            parked: None,
        }
    }

    fn scene(&self, selection: i32) -> Box<dyn Scene> {
        if self.detail {
            Box::new(DetailScene::new(self.config.clone(), selection))
        } else {
            Box::new(GalaxyScene::new(self.config.clone()))
        }
    }

    fn create_renderer(&self, window: Arc<Window>, selection: i32) -> Result<Renderer, orrery::core::ContextError> {
        let size = window.inner_size();
        let context = pollster::block_on(Context::new(
            window,
            size.width.max(1),
            size.height.max(1),
            &RenderConfig::default(),
        ))?;
        let assets = Box::new(DirectoryAssets::new(&self.assets_dir));
        let mut renderer = SurfaceRenderer::new(WgpuDevice::new(context), self.scene(selection), assets);
        renderer.set_selected_index(selection);
        renderer.on_surface_created();
        renderer.on_surface_resized(size.width, size.height);
        Ok(renderer)
    }

    fn rebuild(&mut self, event_loop: &ActiveEventLoop) {
        let Some(window) = self.window.clone() else {
            return;
        };
        let selection = self.renderer.as_ref().map_or(0, |r| r.selected_index());
        self.renderer = None;
        match self.create_renderer(window, selection) {
            Ok(renderer) => self.renderer = Some(renderer),
            Err(err) => {
                log::error!("Failed to create renderer: {err}");
                event_loop.exit();
            }
        }
    }

    fn body_count(&self) -> i32 {
        i32::try_from(self.config.body_count()).unwrap_or(i32::MAX)
    }

    fn handle_key(&mut self, event_loop: &ActiveEventLoop, key: KeyCode) {
        let count = self.body_count();
        let Some(renderer) = self.renderer.as_mut() else {
            return;
        };
        let selection = renderer.selected_index();

        match key {
            KeyCode::Escape => event_loop.exit(),
            KeyCode::ArrowRight => renderer.set_selected_index(next_selection(selection, count)),
            KeyCode::ArrowLeft => renderer.set_selected_index(previous_selection(selection, count)),
            KeyCode::KeyI => match body_info(selection) {
                Some(info) => log::info!("{}: {}", info.name, info.description),
                None => log::info!("Nothing selected"),
            },
            KeyCode::KeyD => {
                self.detail = !self.detail;
                if self.detail {
                    let detail = Box::new(DetailScene::new(self.config.clone(), selection));
                    self.parked = Some(renderer.replace_scene(detail));
                } else {
                    let galaxy = self
                        .parked
                        .take()
                        .unwrap_or_else(|| Box::new(GalaxyScene::new(self.config.clone())) as Box<dyn Scene>);
                    renderer.replace_scene(galaxy);
                }
                log::info!("Detail view {}", if self.detail { "on" } else { "off" });
            }
            _ => {}
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            if let Some(renderer) = self.renderer.as_mut() {
                renderer.on_surface_created();
            }
            return;
        }

        let attributes = Window::default_attributes()
            .with_title("Orrery")
            .with_inner_size(PhysicalSize::new(1280, 720));
        match event_loop.create_window(attributes) {
            Ok(window) => {
                self.window = Some(Arc::new(window));
                self.rebuild(event_loop);
            }
            Err(err) => {
                log::error!("Failed to create window: {err}");
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => event_loop.exit(),

            WindowEvent::Resized(size) => {
                if let Some(renderer) = self.renderer.as_mut() {
                    renderer.on_surface_resized(size.width, size.height);
                }
            }

            WindowEvent::KeyboardInput { event, .. } => {
                if let (PhysicalKey::Code(key), ElementState::Pressed) = (event.physical_key, event.state) {
                    if !event.repeat {
                        self.handle_key(event_loop, key);
                    }
                }
            }

            WindowEvent::RedrawRequested => {
                if self.renderer.as_ref().is_some_and(|r| r.device().is_lost()) {
                    log::warn!("GPU device lost, recreating the renderer");
                    self.rebuild(event_loop);
                }
                if let Some(renderer) = self.renderer.as_mut() {
                    renderer.on_draw_frame();
                }
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }

            _ => {}
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let assets_dir = args.next().map_or_else(|| PathBuf::from("assets"), PathBuf::from);
    let config = match args.next() {
        Some(path) => SceneConfig::from_path(&path)?,
        None => SceneConfig::default(),
    };
    log::info!("{} {} reading assets from {}", orrery::NAME, orrery::VERSION, assets_dir.display());

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);
    let mut app = App::new(assets_dir, config);
    event_loop.run_app(&mut app)?;
    Ok(())
}
