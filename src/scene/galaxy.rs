//! The solar system scene.

use super::config::SceneConfig;
use super::orrery::Orrery;
use super::sprite::DriftingSprite;
use super::{BodyId, Scene};
use crate::assets::{AssetSource, TextureAsset};
use crate::core::{GraphicsDevice, TextureHandle};
use crate::math::{deg_to_rad, Matrix4};
use crate::objects::{HighlightCube, Lighting, Quad, QuadMode, SphereBody};
use crate::shader::{ShaderRegistry, ShaderVariant};
use crate::texture::load_texture;
use rand::rngs::StdRng;
use rand::SeedableRng;

#[derive(Debug)]
struct Primitives {
    backdrop: Quad,
    sprite: Quad,
    sun: SphereBody,
    planets: Vec<SphereBody>,
    moon: SphereBody,
    highlight: HighlightCube,
}

impl Primitives {
    fn body(&mut self, body: BodyId) -> Option<&mut SphereBody> {
        match body {
            BodyId::Sun => Some(&mut self.sun),
            BodyId::Planet(i) => self.planets.get_mut(i),
            BodyId::Moon => Some(&mut self.moon),
        }
    }

    fn is_ready(&self, device: &dyn GraphicsDevice) -> bool {
        self.backdrop.is_ready(device)
            && self.sprite.is_ready(device)
            && self.sun.is_ready(device)
            && self.planets.iter().all(|p| p.is_ready(device))
            && self.moon.is_ready(device)
            && self.highlight.is_ready(device)
    }

    fn release(&mut self, device: &mut dyn GraphicsDevice) {
        self.backdrop.release(device);
        self.sprite.release(device);
        self.sun.release(device);
        for planet in &mut self.planets {
            planet.release(device);
        }
        self.moon.release(device);
        self.highlight.release(device);
    }
}

/// Backdrop, drifting sprite, sun, planets, moon and the selection highlight.
///
/// Each frame draws in a fixed order: backdrop, sprite, sun, planets, moon,
/// then at most one highlight cube around the selected body.
#[derive(Debug)]
pub struct GalaxyScene {
    config: SceneConfig,
    orrery: Orrery,
    sprite: DriftingSprite,
    rng: StdRng,
    primitives: Option<Primitives>,
    aspect: f32,
    projection: Matrix4,
    ortho: Matrix4,
    view_projection: Matrix4,
}

impl GalaxyScene {
    /// Create the scene. Nothing touches the device until [`Scene::create`].
    pub fn new(config: SceneConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::with_rng(config, rng)
    }

    /// Create the scene with an explicit random source for the sprite.
    pub fn with_rng(config: SceneConfig, rng: StdRng) -> Self {
        let mut scene = Self {
            orrery: Orrery::new(&config),
            sprite: DriftingSprite::new(&config.sprite),
            config,
            rng,
            primitives: None,
            aspect: 1.0,
            projection: Matrix4::IDENTITY,
            ortho: Matrix4::IDENTITY,
            view_projection: Matrix4::IDENTITY,
        };
        scene.update_projections(1.0);
        scene
    }

    /// Configuration in use.
    #[inline]
    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    /// Animation state.
    #[inline]
    pub fn orrery(&self) -> &Orrery {
        &self.orrery
    }

    /// The drifting sprite.
    #[inline]
    pub fn sprite(&self) -> &DriftingSprite {
        &self.sprite
    }

    /// Width over height of the surface.
    #[inline]
    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    /// Perspective projection.
    #[inline]
    pub fn projection(&self) -> &Matrix4 {
        &self.projection
    }

    /// Orthographic projection used for the backdrop.
    #[inline]
    pub fn ortho(&self) -> &Matrix4 {
        &self.ortho
    }

    /// Projection times view, as computed for the last frame.
    #[inline]
    pub fn view_projection(&self) -> &Matrix4 {
        &self.view_projection
    }

    /// Radius of `body`, 0 if unknown.
    pub fn body_radius(&self, body: BodyId) -> f32 {
        match body {
            BodyId::Sun => self.config.sun.radius,
            BodyId::Planet(i) => self.config.planets.get(i).map_or(0.0, |p| p.radius),
            BodyId::Moon => self.config.moon.radius,
        }
    }

    /// Model matrix and tint of the highlight cube around `body`, `None` for
    /// an unknown planet.
    pub fn highlight_for(&self, body: BodyId) -> Option<(Matrix4, [f32; 4])> {
        let highlight = &self.config.highlight;
        let model = self
            .orrery
            .body_transform(body)?
            .scale_uniform(self.body_radius(body) * highlight.scale_factor);
        let color = match body {
            BodyId::Sun => highlight.sun_color,
            _ => highlight.body_color,
        };
        Some((model, color))
    }

    fn update_projections(&mut self, aspect: f32) {
        let camera = &self.config.camera;
        self.aspect = aspect;
        self.projection = Matrix4::perspective(deg_to_rad(camera.fov_y_degrees), aspect, camera.near, camera.far);
        self.ortho = Matrix4::orthographic(-aspect, aspect, -1.0, 1.0, -1.0, 1.0);
    }

    fn lighting(&self) -> Lighting {
        Lighting {
            light_position: self.config.lighting.position,
            eye_position: self.config.camera.eye,
            fallback_light: self.config.lighting.fallback,
        }
    }

    fn body_variant(&self, body: BodyId) -> ShaderVariant {
        match body {
            BodyId::Sun => ShaderVariant::Flat,
            _ if self.config.lit_bodies => ShaderVariant::Phong,
            _ => ShaderVariant::Flat,
        }
    }

    fn create_body(
        &self,
        device: &mut dyn GraphicsDevice,
        assets: &dyn AssetSource,
        body: BodyId,
        asset: Option<TextureAsset>,
    ) -> SphereBody {
        let texture = match asset {
            Some(asset) => load_texture(device, assets, asset),
            None => TextureHandle::NONE,
        };
        SphereBody::new(
            device,
            texture,
            self.body_radius(body),
            self.body_variant(body),
            self.config.sphere_stacks,
            self.config.sphere_slices,
        )
    }
}

impl Scene for GalaxyScene {
    fn create(&mut self, device: &mut dyn GraphicsDevice, shaders: &mut ShaderRegistry, assets: &dyn AssetSource) {
        if let Some(mut old) = self.primitives.take() {
            old.release(device);
        }

        let galaxy = load_texture(device, assets, TextureAsset::Galaxy);
        let black_hole = load_texture(device, assets, TextureAsset::BlackHole);
        log::debug!("Galaxy texture {galaxy}, black hole texture {black_hole}");

        let planets = (0..self.config.planets.len())
            .map(|i| self.create_body(device, assets, BodyId::Planet(i), TextureAsset::planet(i)))
            .collect();

        let primitives = Primitives {
            backdrop: Quad::new(device, galaxy, QuadMode::Backdrop),
            sprite: Quad::new(device, black_hole, QuadMode::Sprite),
            sun: self.create_body(device, assets, BodyId::Sun, Some(TextureAsset::Sun)),
            planets,
            moon: self.create_body(device, assets, BodyId::Moon, Some(TextureAsset::Moon)),
            highlight: HighlightCube::new(device),
        };

        // Compile up front so the first frame does not stall.
        shaders.program(device, ShaderVariant::Flat);
        if self.config.lit_bodies {
            shaders.program(device, ShaderVariant::Phong);
        }

        log::info!("Galaxy scene created with {} planets", self.config.planets.len());
        self.primitives = Some(primitives);
    }

    fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.update_projections(width as f32 / height as f32);
    }

    fn draw(&mut self, device: &mut dyn GraphicsDevice, shaders: &mut ShaderRegistry, selection: i32) {
        let Some(mut primitives) = self.primitives.take() else {
            return;
        };

        primitives.backdrop.model = Matrix4::IDENTITY.scale(self.aspect, 1.0, 1.0);
        primitives.backdrop.draw(device, shaders, &self.ortho);

        let camera = &self.config.camera;
        let view = Matrix4::look_at(&camera.eye, &camera.target, &camera.up);
        self.view_projection = self.projection * view;

        self.sprite.update(&mut self.rng);
        primitives.sprite.model = self.sprite.model(self.orrery.sun_angle());
        primitives.sprite.draw(device, shaders, &self.view_projection);

        self.orrery.advance();

        let lighting = self.lighting();
        for body in self.orrery.bodies() {
            if let (Some(sphere), Some(model)) = (primitives.body(body), self.orrery.body_transform(body)) {
                sphere.model = model;
                sphere.draw(device, shaders, &self.view_projection, &lighting);
            }
        }

        let highlight = BodyId::from_selection(selection, self.orrery.planet_count()).and_then(|body| self.highlight_for(body));
        if let Some((model, color)) = highlight {
            primitives
                .highlight
                .draw(device, shaders, &self.view_projection, &model, color);
        }

        self.primitives = Some(primitives);
    }

    fn release(&mut self, device: &mut dyn GraphicsDevice) {
        if let Some(mut primitives) = self.primitives.take() {
            primitives.release(device);
        }
    }

    fn is_ready(&self, device: &dyn GraphicsDevice) -> bool {
        self.primitives.as_ref().is_some_and(|p| p.is_ready(device))
    }

    fn clear_color(&self) -> [f32; 4] {
        self.config.clear_color
    }
}
