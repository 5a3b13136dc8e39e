//! # Orrery - a small wgpu solar system renderer
//!
//! Draws a textured backdrop, a drifting black hole sprite, a sun, eight
//! planets on an inclined orbital plane, a moon and a translucent highlight
//! around the selected body. A second scene shows one rotating body up close.
//!
//! ## Features
//!
//! - **Math**: column-major matrices and vectors with GL-style transform chains
//! - **Geometry**: procedural spheres, unit quad and cube
//! - **Core**: the `GraphicsDevice` seam with wgpu and headless implementations
//! - **Shader**: flat and Phong programs, rebuilt when the context drops them
//! - **Scene**: orbit animation, galaxy and detail scenes
//! - **Surface**: the created / resized / draw-frame lifecycle
//! - **Feed**: a rotating news feed with persisted likes
//!
//! ## Example
//!
//! ```ignore
//! use orrery::prelude::*;
//!
//! let scene = GalaxyScene::new(SceneConfig::default());
//! let mut renderer = SurfaceRenderer::new(HeadlessDevice::new(), scene, Box::new(NoAssets));
//!
//! renderer.on_surface_created();
//! renderer.on_surface_resized(1280, 720);
//! renderer.set_selected_index(3);
//! renderer.on_draw_frame();
//! ```

#![warn(missing_docs)]

pub mod assets;
pub mod core;
pub mod feed;
pub mod geometry;
pub mod math;
pub mod objects;
pub mod scene;
pub mod shader;
pub mod store;
pub mod surface;
pub mod texture;

// Re-export commonly used types
pub mod prelude {
    //! Convenient re-exports of commonly used types.

    pub use crate::assets::*;
    pub use crate::core::*;
    pub use crate::feed::*;
    pub use crate::geometry::*;
    pub use crate::math::*;
    pub use crate::objects::*;
    pub use crate::scene::*;
    pub use crate::shader::*;
    pub use crate::store::*;
    pub use crate::surface::*;
    pub use crate::texture::*;
}

/// Crate version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name.
pub const NAME: &str = "Orrery";
