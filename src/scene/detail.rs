//! The single-body detail view.

use super::config::SceneConfig;
use super::{BodyId, Scene};
use crate::assets::{AssetSource, TextureAsset};
use crate::core::{GraphicsDevice, TextureHandle};
use crate::math::{deg_to_rad, wrap_degrees, Matrix4, Vector3};
use crate::objects::{Lighting, SphereBody};
use crate::shader::{ShaderRegistry, ShaderVariant};
use crate::texture::load_texture;

/// Texture shown in the detail view of selection `index`.
///
/// The outermost planet is shown with the ocean texture. Indices that name no
/// body have no texture.
pub fn detail_texture(index: i32, planet_count: usize) -> Option<TextureAsset> {
    match BodyId::from_selection(index, planet_count)? {
        BodyId::Sun => Some(TextureAsset::Sun),
        BodyId::Moon => Some(TextureAsset::Moon),
        BodyId::Planet(7) => Some(TextureAsset::Water),
        BodyId::Planet(i) => TextureAsset::planet(i),
    }
}

/// One rotating sphere seen from the front.
#[derive(Debug)]
pub struct DetailScene {
    config: SceneConfig,
    index: i32,
    body: Option<SphereBody>,
    angle: f32,
    projection: Matrix4,
    view: Matrix4,
}

impl DetailScene {
    /// Detail view of the body at selection `index`.
    pub fn new(config: SceneConfig, index: i32) -> Self {
        let view = Matrix4::look_at(&config.detail.eye, &Vector3::ZERO, &Vector3::UP);
        let mut scene = Self {
            config,
            index,
            body: None,
            angle: 0.0,
            projection: Matrix4::IDENTITY,
            view,
        };
        scene.update_projection(1.0);
        scene
    }

    /// Selection index being shown.
    #[inline]
    pub fn index(&self) -> i32 {
        self.index
    }

    /// Current self-rotation, degrees in `[0, 360)`.
    #[inline]
    pub fn angle(&self) -> f32 {
        self.angle
    }

    /// Shading used for the body.
    pub fn variant(&self) -> ShaderVariant {
        let body = BodyId::from_selection(self.index, self.config.planets.len());
        match body {
            Some(BodyId::Sun) | None => ShaderVariant::Flat,
            Some(_) if self.config.lit_bodies => ShaderVariant::Phong,
            Some(_) => ShaderVariant::Flat,
        }
    }

    fn update_projection(&mut self, aspect: f32) {
        let camera = &self.config.camera;
        self.projection = Matrix4::perspective(deg_to_rad(camera.fov_y_degrees), aspect, camera.near, camera.far);
    }
}

impl Scene for DetailScene {
    fn create(&mut self, device: &mut dyn GraphicsDevice, shaders: &mut ShaderRegistry, assets: &dyn AssetSource) {
        self.release(device);

        let texture = match detail_texture(self.index, self.config.planets.len()) {
            Some(asset) => load_texture(device, assets, asset),
            None => TextureHandle::NONE,
        };
        let variant = self.variant();
        self.body = Some(SphereBody::new(
            device,
            texture,
            self.config.detail.radius,
            variant,
            self.config.sphere_stacks,
            self.config.sphere_slices,
        ));
        shaders.program(device, variant);
        log::info!("Detail scene created for body {} ({variant})", self.index);
    }

    fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.update_projection(width as f32 / height as f32);
    }

    fn draw(&mut self, device: &mut dyn GraphicsDevice, shaders: &mut ShaderRegistry, _selection: i32) {
        let Some(body) = self.body.as_mut() else {
            return;
        };
        self.angle = wrap_degrees(self.angle + self.config.detail.spin_increment);
        body.model = Matrix4::IDENTITY.rotate(self.angle, Vector3::UNIT_Y);

        let lighting = Lighting {
            light_position: self.config.lighting.position,
            eye_position: self.config.detail.eye,
            fallback_light: self.config.lighting.fallback,
        };
        body.draw(device, shaders, &(self.projection * self.view), &lighting);
    }

    fn release(&mut self, device: &mut dyn GraphicsDevice) {
        if let Some(mut body) = self.body.take() {
            body.release(device);
        }
    }

    fn is_ready(&self, device: &dyn GraphicsDevice) -> bool {
        self.body.as_ref().is_some_and(|b| b.is_ready(device))
    }

    fn clear_color(&self) -> [f32; 4] {
        self.config.clear_color
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::NoAssets;
    use crate::core::HeadlessDevice;

    fn frame(scene: &mut DetailScene, device: &mut HeadlessDevice, shaders: &mut ShaderRegistry) {
        device.begin_frame(scene.clear_color());
        scene.draw(device, shaders, -1);
        device.end_frame().unwrap();
    }

    #[test]
    fn test_texture_mapping() {
        assert_eq!(detail_texture(0, 8), Some(TextureAsset::Sun));
        assert_eq!(detail_texture(3, 8), Some(TextureAsset::Earth));
        assert_eq!(detail_texture(8, 8), Some(TextureAsset::Water));
        assert_eq!(detail_texture(9, 8), Some(TextureAsset::Moon));
        assert_eq!(detail_texture(10, 8), None);
        assert_eq!(detail_texture(-1, 8), None);
    }

    #[test]
    fn test_variant_policy() {
        let config = SceneConfig::default();
        assert_eq!(DetailScene::new(config.clone(), 0).variant(), ShaderVariant::Flat);
        assert_eq!(DetailScene::new(config.clone(), 3).variant(), ShaderVariant::Phong);
        assert_eq!(DetailScene::new(config.clone(), 42).variant(), ShaderVariant::Flat);

        let flat = SceneConfig {
            lit_bodies: false,
            ..config
        };
        assert_eq!(DetailScene::new(flat, 9).variant(), ShaderVariant::Flat);
    }

    #[test]
    fn test_draws_one_spinning_sphere() {
        let mut device = HeadlessDevice::new();
        let mut shaders = ShaderRegistry::new();
        let mut scene = DetailScene::new(SceneConfig::default(), 5);
        scene.create(&mut device, &mut shaders, &NoAssets);
        scene.resize(640, 480);

        frame(&mut scene, &mut device, &mut shaders);
        assert_eq!(device.last_frame().len(), 1);
        assert_eq!(device.last_frame()[0].variant, ShaderVariant::Phong);

        for _ in 0..3 {
            frame(&mut scene, &mut device, &mut shaders);
        }
        assert!((scene.angle() - 2.0).abs() < 1e-5);
        let expected = Matrix4::IDENTITY.rotate(2.0, Vector3::UNIT_Y);
        assert!(device.last_frame()[0].uniforms.model.approx_eq(&expected, 1e-6));
    }

    #[test]
    fn test_draw_before_create_is_noop() {
        let mut device = HeadlessDevice::new();
        let mut shaders = ShaderRegistry::new();
        let mut scene = DetailScene::new(SceneConfig::default(), 0);
        frame(&mut scene, &mut device, &mut shaders);
        assert!(device.last_frame().is_empty());
        assert_eq!(scene.angle(), 0.0);
    }

    #[test]
    fn test_recreate_does_not_leak() {
        let mut device = HeadlessDevice::new();
        let mut shaders = ShaderRegistry::new();
        let mut scene = DetailScene::new(SceneConfig::default(), 2);
        scene.create(&mut device, &mut shaders, &NoAssets);
        let buffers = device.live_buffers();
        scene.create(&mut device, &mut shaders, &NoAssets);
        assert_eq!(device.live_buffers(), buffers);
        assert!(scene.is_ready(&device));

        scene.release(&mut device);
        assert_eq!(device.live_buffers(), 0);
        assert!(!scene.is_ready(&device));
    }
}
