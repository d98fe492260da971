//! Per-body mutable state.

use rand::Rng;
use std::f32::consts::TAU;

use crate::bodies::{BodyDescriptor, BodyId, Registry};

/// Where a body currently is and how fast it is moving.
///
/// Angles are in radians and are never wrapped; they grow for the lifetime
/// of the simulation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyState {
    /// Angular position around the star.
    pub orbit_angle: f32,
    /// Self-rotation angle.
    pub spin_angle: f32,
    /// Current orbital speed in radians per second. Starts at the
    /// descriptor's speed and is changed through the control surface.
    pub speed: f32,
}

impl BodyState {
    /// State for a body at orbit angle `orbit_angle`.
    pub fn new(descriptor: &BodyDescriptor, orbit_angle: f32) -> Self {
        Self {
            orbit_angle,
            spin_angle: 0.0,
            speed: descriptor.speed,
        }
    }
}

/// One [`BodyState`] per registry entry, in registry order.
#[derive(Debug, Clone, PartialEq)]
pub struct OrbitalState {
    bodies: Vec<BodyState>,
}

impl OrbitalState {
    /// Every body starts at orbit angle zero.
    pub fn aligned(registry: &Registry) -> Self {
        Self {
            bodies: registry
                .descriptors()
                .iter()
                .map(|d| BodyState::new(d, 0.0))
                .collect(),
        }
    }

    /// Every orbiting body starts at a random angle in `[0, 2π)`.
    pub fn scattered(registry: &Registry, rng: &mut impl Rng) -> Self {
        Self {
            bodies: registry
                .descriptors()
                .iter()
                .map(|d| {
                    let angle = if d.is_star() { 0.0 } else { rng.gen_range(0.0..TAU) };
                    BodyState::new(d, angle)
                })
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    pub fn get(&self, id: BodyId) -> Option<&BodyState> {
        self.bodies.get(id.index())
    }

    pub fn get_mut(&mut self, id: BodyId) -> Option<&mut BodyState> {
        self.bodies.get_mut(id.index())
    }

    pub fn iter(&self) -> impl Iterator<Item = &BodyState> {
        self.bodies.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut BodyState> {
        self.bodies.iter_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_one_state_per_descriptor() {
        let registry = Registry::solar_system();
        let state = OrbitalState::aligned(&registry);
        assert_eq!(state.len(), registry.len());

        for (id, descriptor) in registry.iter() {
            let body = state.get(id).unwrap();
            assert_eq!(body.speed, descriptor.speed);
            assert_eq!(body.orbit_angle, 0.0);
            assert_eq!(body.spin_angle, 0.0);
        }
    }

    #[test]
    fn test_scattered_angles_in_range() {
        let registry = Registry::solar_system();
        let mut rng = StdRng::seed_from_u64(7);
        let state = OrbitalState::scattered(&registry, &mut rng);

        let star = registry.star().unwrap();
        assert_eq!(state.get(star).unwrap().orbit_angle, 0.0);

        for (id, _) in registry.planets() {
            let angle = state.get(id).unwrap().orbit_angle;
            assert!((0.0..TAU).contains(&angle));
        }
    }

    #[test]
    fn test_scattered_is_deterministic_per_seed() {
        let registry = Registry::solar_system();
        let a = OrbitalState::scattered(&registry, &mut StdRng::seed_from_u64(42));
        let b = OrbitalState::scattered(&registry, &mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
    }
}
