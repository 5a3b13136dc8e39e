//! The drifting black hole sprite.

use super::config::SpriteConfig;
use crate::math::{Matrix4, Vector3};
use rand::Rng;

/// A bounded random walk in the XY plane at a fixed depth.
#[derive(Debug, Clone, PartialEq)]
pub struct DriftingSprite {
    /// Current position.
    pub position: Vector3,
    /// Current velocity in X and Y per frame.
    pub velocity: [f32; 2],
    config: SpriteConfig,
}

impl DriftingSprite {
    /// Start at the configured position and velocity.
    pub fn new(config: &SpriteConfig) -> Self {
        Self {
            position: config.position,
            velocity: config.velocity,
            config: *config,
        }
    }

    /// Advance one frame.
    ///
    /// Moves by the velocity, reverses a velocity component once its
    /// coordinate is past the bound, then with the configured probability
    /// nudges both components by a uniform value in `[-m, m)`.
    pub fn update<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.position.x += self.velocity[0];
        self.position.y += self.velocity[1];

        if self.position.x.abs() > self.config.bounds[0] {
            self.velocity[0] = -self.velocity[0];
        }
        if self.position.y.abs() > self.config.bounds[1] {
            self.velocity[1] = -self.velocity[1];
        }

        if rng.gen::<f32>() < self.config.perturb_probability {
            let m = self.config.perturb_magnitude;
            self.velocity[0] += rng.gen::<f32>() * 2.0 * m - m;
            self.velocity[1] += rng.gen::<f32>() * 2.0 * m - m;
        }
    }

    /// `translate(position) · rotate(tilt, X) · rotate(spin_angle · ratio, Z) · scale(size)`.
    pub fn model(&self, spin_angle: f32) -> Matrix4 {
        Matrix4::IDENTITY
            .translate(self.position.x, self.position.y, self.position.z)
            .rotate(self.config.tilt_degrees, Vector3::UNIT_X)
            .rotate(spin_angle * self.config.spin_ratio, Vector3::UNIT_Z)
            .scale_uniform(self.config.size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn calm() -> SpriteConfig {
        SpriteConfig {
            perturb_probability: 0.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_moves_by_velocity() {
        let mut sprite = DriftingSprite::new(&calm());
        let mut rng = StdRng::seed_from_u64(1);
        sprite.update(&mut rng);
        assert!((sprite.position.x - 0.015).abs() < 1e-7);
        assert!((sprite.position.y - 0.01).abs() < 1e-7);
        assert_eq!(sprite.position.z, -5.0);
    }

    #[test]
    fn test_bounces_off_x_bound() {
        let mut sprite = DriftingSprite::new(&calm());
        sprite.position.x = 8.5;
        let mut rng = StdRng::seed_from_u64(2);
        sprite.update(&mut rng);
        assert_eq!(sprite.velocity, [-0.015, 0.01]);
    }

    #[test]
    fn test_bounces_off_negative_y_bound() {
        let mut sprite = DriftingSprite::new(&calm());
        sprite.position.y = -5.2;
        sprite.velocity = [0.0, -0.01];
        let mut rng = StdRng::seed_from_u64(3);
        sprite.update(&mut rng);
        assert_eq!(sprite.velocity, [0.0, 0.01]);
    }

    #[test]
    fn test_perturbation_is_bounded() {
        let config = SpriteConfig {
            perturb_probability: 1.0,
            ..Default::default()
        };
        let mut sprite = DriftingSprite::new(&config);
        let mut rng = StdRng::seed_from_u64(4);
        sprite.update(&mut rng);
        assert!((sprite.velocity[0] - 0.015).abs() <= 0.005);
        assert!((sprite.velocity[1] - 0.01).abs() <= 0.005);
    }

    #[test]
    fn test_stays_near_bounds_over_time() {
        let mut sprite = DriftingSprite::new(&SpriteConfig::default());
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..20_000 {
            sprite.update(&mut rng);
        }
        // One step past the bound at most, plus accumulated nudges.
        assert!(sprite.position.x.abs() < 9.0);
        assert!(sprite.position.y.abs() < 6.0);
    }

    #[test]
    fn test_model_places_sprite() {
        let sprite = DriftingSprite::new(&calm());
        let model = sprite.model(90.0);
        assert!(model.get_position().approx_eq(&Vector3::new(0.0, 0.0, -5.0), 1e-6));
    }
}
