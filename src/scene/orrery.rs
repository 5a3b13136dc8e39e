//! Orbit kinematics.
//!
//! [`Orrery`] holds nothing but angle accumulators. Transforms are rebuilt
//! from scratch on every query, so no rounding accumulates in matrices.

use super::{BodyId, SceneConfig};
use crate::math::{wrap_degrees, Matrix4, Vector3};

#[derive(Debug, Clone, Copy, PartialEq)]
struct Orbit {
    distance: f32,
    increment: f32,
    angle: f32,
}

impl Orbit {
    fn new(distance: f32, increment: f32) -> Self {
        Self {
            distance,
            increment,
            angle: 0.0,
        }
    }

    fn advance(&mut self) {
        self.angle = wrap_degrees(self.angle + self.increment);
    }
}

/// `rotate(tilt, X) · rotate(angle, Y) · translate(distance, 0, 0)`.
pub fn orbit_chain(tilt_degrees: f32, angle_degrees: f32, distance: f32) -> Matrix4 {
    Matrix4::IDENTITY
        .rotate(tilt_degrees, Vector3::UNIT_X)
        .rotate(angle_degrees, Vector3::UNIT_Y)
        .translate(distance, 0.0, 0.0)
}

/// Animation state of the sun, planets and moon.
#[derive(Debug, Clone, PartialEq)]
pub struct Orrery {
    tilt: f32,
    sun_angle: f32,
    sun_increment: f32,
    planets: Vec<Orbit>,
    moon: Orbit,
    moon_parent: usize,
    frames: u64,
}

impl Orrery {
    /// Start every angle at zero.
    pub fn new(config: &SceneConfig) -> Self {
        Self {
            tilt: config.orbit_tilt_degrees,
            sun_angle: 0.0,
            sun_increment: config.sun.spin_increment,
            planets: config
                .planets
                .iter()
                .map(|p| Orbit::new(p.distance, p.increment))
                .collect(),
            moon: Orbit::new(config.moon.distance, config.moon.increment),
            moon_parent: config.moon.parent,
            frames: 0,
        }
    }

    /// Advance every body by one frame.
    pub fn advance(&mut self) {
        self.sun_angle = wrap_degrees(self.sun_angle + self.sun_increment);
        for planet in &mut self.planets {
            planet.advance();
        }
        self.moon.advance();
        self.frames += 1;
    }

    /// Frames advanced so far.
    #[inline]
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Number of planets.
    #[inline]
    pub fn planet_count(&self) -> usize {
        self.planets.len()
    }

    /// The sun's self-rotation, degrees in `[0, 360)`.
    #[inline]
    pub fn sun_angle(&self) -> f32 {
        self.sun_angle
    }

    /// Current angle of `body`, degrees in `[0, 360)`. Unknown planets read 0.
    pub fn angle(&self, body: BodyId) -> f32 {
        match body {
            BodyId::Sun => self.sun_angle,
            BodyId::Planet(i) => self.planets.get(i).map_or(0.0, |p| p.angle),
            BodyId::Moon => self.moon.angle,
        }
    }

    /// Unscaled model matrix of `body`, `None` for a planet index out of range.
    ///
    /// The moon's chain is its parent's orbit chain followed by
    /// `rotate(moon_angle, Y) · translate(moon_distance, 0, 0)`. Without a
    /// valid parent it orbits the tilted origin.
    pub fn body_transform(&self, body: BodyId) -> Option<Matrix4> {
        match body {
            BodyId::Sun => Some(Matrix4::IDENTITY.rotate(self.sun_angle, Vector3::UNIT_Y)),
            BodyId::Planet(i) => self
                .planets
                .get(i)
                .map(|p| orbit_chain(self.tilt, p.angle, p.distance)),
            BodyId::Moon => {
                let parent = self.planets.get(self.moon_parent).map_or_else(
                    || Matrix4::IDENTITY.rotate(self.tilt, Vector3::UNIT_X),
                    |p| orbit_chain(self.tilt, p.angle, p.distance),
                );
                Some(
                    parent
                        .rotate(self.moon.angle, Vector3::UNIT_Y)
                        .translate(self.moon.distance, 0.0, 0.0),
                )
            }
        }
    }

    /// Every body in draw order: sun, planets, moon.
    pub fn bodies(&self) -> impl Iterator<Item = BodyId> {
        std::iter::once(BodyId::Sun)
            .chain((0..self.planets.len()).map(BodyId::Planet))
            .chain(std::iter::once(BodyId::Moon))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::config::PlanetConfig;

    fn angle_diff(a: f32, b: f32) -> f32 {
        let d = (a - b).rem_euclid(360.0);
        d.min(360.0 - d)
    }

    #[test]
    fn test_angles_after_many_frames() {
        let config = SceneConfig {
            planets: (0..8)
                .map(|i| PlanetConfig {
                    radius: 0.1,
                    distance: 1.0 + i as f32,
                    increment: 0.7 * (i + 1) as f32,
                })
                .collect(),
            ..Default::default()
        };
        let mut orrery = Orrery::new(&config);
        for _ in 0..100 {
            orrery.advance();
        }

        assert_eq!(orrery.frames(), 100);
        for i in 0..8 {
            let expected = wrap_degrees(100.0 * config.planets[i].increment);
            let actual = orrery.angle(BodyId::Planet(i));
            assert!((0.0..360.0).contains(&actual));
            assert!(angle_diff(actual, expected) < 1e-2, "planet {i}: {actual} vs {expected}");
        }
        assert!(angle_diff(orrery.sun_angle(), 20.0) < 1e-3);
        assert!(angle_diff(orrery.angle(BodyId::Moon), 100.0) < 1e-3);
    }

    #[test]
    fn test_planet_position_on_tilted_plane() {
        let config = SceneConfig::default();
        let orrery = Orrery::new(&config);
        // At angle 0 the planet sits on +X; tilting about X leaves it there.
        let p = orrery.body_transform(BodyId::Planet(2)).unwrap().get_position();
        assert!(p.approx_eq(&Vector3::new(2.0, 0.0, 0.0), 1e-5));
    }

    #[test]
    fn test_orbit_radius_is_preserved() {
        let mut orrery = Orrery::new(&SceneConfig::default());
        for _ in 0..37 {
            orrery.advance();
        }
        for (i, distance) in crate::scene::config::PLANET_DISTANCES.iter().enumerate() {
            let p = orrery.body_transform(BodyId::Planet(i)).unwrap().get_position();
            assert!((p.length() - distance).abs() < 1e-4);
        }
    }

    #[test]
    fn test_moon_follows_parent() {
        let mut orrery = Orrery::new(&SceneConfig::default());
        for _ in 0..55 {
            orrery.advance();
        }
        let earth = orrery.body_transform(BodyId::Planet(2)).unwrap().get_position();
        let moon = orrery.body_transform(BodyId::Moon).unwrap().get_position();
        assert!((earth.distance_to(&moon) - 0.7).abs() < 1e-4);
    }

    #[test]
    fn test_distinct_increments_never_share_an_angle() {
        let config = SceneConfig::default();
        let mut orrery = Orrery::new(&config);
        let bodies: Vec<_> = orrery.bodies().collect();
        // Every increment differs, and no pair realigns within 100 frames.
        for frame in 1..=100 {
            orrery.advance();
            for (n, a) in bodies.iter().enumerate() {
                for b in &bodies[n + 1..] {
                    let diff = angle_diff(orrery.angle(*a), orrery.angle(*b));
                    assert!(diff > 0.05, "frame {frame}: {a:?} and {b:?} share angle {}", orrery.angle(*a));
                }
            }
        }
    }

    #[test]
    fn test_moon_offset_in_parent_frame() {
        let config = SceneConfig {
            moon: crate::scene::config::MoonConfig {
                increment: 90.0,
                ..Default::default()
            },
            ..Default::default()
        };
        let mut orrery = Orrery::new(&config);
        orrery.advance();
        assert_eq!(orrery.angle(BodyId::Moon), 90.0);

        // rotate(90, Y) carries (0.7, 0, 0) to (0, 0, -0.7) before the parent chain applies.
        let parent_angle = orrery.angle(BodyId::Planet(2));
        let expected = orbit_chain(config.orbit_tilt_degrees, parent_angle, 2.0).transform_point(&Vector3::new(0.0, 0.0, -0.7));
        let moon = orrery.body_transform(BodyId::Moon).unwrap().get_position();
        assert!(moon.approx_eq(&expected, 1e-5), "{moon:?} vs {expected:?}");
    }

    #[test]
    fn test_unknown_planet_has_no_transform() {
        let orrery = Orrery::new(&SceneConfig::default());
        assert!(orrery.body_transform(BodyId::Planet(8)).is_none());
        assert!(orrery.body_transform(BodyId::Planet(99)).is_none());
        assert!(orrery.body_transform(BodyId::Moon).is_some());
    }

    #[test]
    fn test_sun_only_spins() {
        let mut orrery = Orrery::new(&SceneConfig::default());
        orrery.advance();
        let sun = orrery.body_transform(BodyId::Sun).unwrap();
        assert!(sun.get_position().approx_eq(&Vector3::ZERO, 1e-6));
        assert!((orrery.sun_angle() - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_bodies_in_draw_order() {
        let orrery = Orrery::new(&SceneConfig::default());
        let bodies: Vec<_> = orrery.bodies().collect();
        assert_eq!(bodies.len(), 10);
        assert_eq!(bodies[0], BodyId::Sun);
        assert_eq!(bodies[1], BodyId::Planet(0));
        assert_eq!(bodies[9], BodyId::Moon);
    }
}
