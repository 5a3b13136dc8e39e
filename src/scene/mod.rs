//! # Scene Module
//!
//! Scene composition: animation state, configuration, selection and the two
//! scenes that turn them into draw calls.

mod body;
mod catalog;
mod config;
mod detail;
mod galaxy;
mod orrery;
mod selection;
mod sprite;

pub use body::BodyId;
pub use catalog::{body_info, next_index, previous_index, BodyInfo, CATALOG};
pub use config::{
    CameraConfig, ConfigError, DetailConfig, HighlightConfig, LightingConfig, MoonConfig, PlanetConfig,
    SceneConfig, SpriteConfig, SunConfig, PLANET_DISTANCES, PLANET_RADII,
};
pub use detail::{detail_texture, DetailScene};
pub use galaxy::GalaxyScene;
pub use orrery::{orbit_chain, Orrery};
pub use selection::{next_selection, previous_selection, SelectionHandle};
pub use sprite::DriftingSprite;

use crate::assets::AssetSource;
use crate::core::GraphicsDevice;
use crate::shader::ShaderRegistry;

/// Something the surface lifecycle can create, resize and draw.
pub trait Scene {
    /// Build every primitive. Anything created by an earlier call is
    /// released first.
    fn create(&mut self, device: &mut dyn GraphicsDevice, shaders: &mut ShaderRegistry, assets: &dyn AssetSource);

    /// Update projections for a `width` x `height` surface.
    fn resize(&mut self, width: u32, height: u32);

    /// Advance one frame and issue its draws. Does nothing before `create`.
    fn draw(&mut self, device: &mut dyn GraphicsDevice, shaders: &mut ShaderRegistry, selection: i32);

    /// Free every handle the scene owns.
    fn release(&mut self, device: &mut dyn GraphicsDevice);

    /// Whether every owned handle is still live.
    fn is_ready(&self, device: &dyn GraphicsDevice) -> bool;

    /// Color the frame is cleared to.
    fn clear_color(&self) -> [f32; 4] {
        [0.0, 0.0, 0.0, 1.0]
    }
}

impl<S: Scene + ?Sized> Scene for Box<S> {
    fn create(&mut self, device: &mut dyn GraphicsDevice, shaders: &mut ShaderRegistry, assets: &dyn AssetSource) {
        (**self).create(device, shaders, assets);
    }

    fn resize(&mut self, width: u32, height: u32) {
        (**self).resize(width, height);
    }

    fn draw(&mut self, device: &mut dyn GraphicsDevice, shaders: &mut ShaderRegistry, selection: i32) {
        (**self).draw(device, shaders, selection);
    }

    fn release(&mut self, device: &mut dyn GraphicsDevice) {
        (**self).release(device);
    }

    fn is_ready(&self, device: &dyn GraphicsDevice) -> bool {
        (**self).is_ready(device)
    }

    fn clear_color(&self) -> [f32; 4] {
        (**self).clear_color()
    }
}
