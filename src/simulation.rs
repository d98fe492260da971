//! Simulation context and frame updater.
//!
//! [`SimulationContext`] owns everything that changes while the viewer runs:
//! the per-body state, the clock, the star's rotation and the current
//! selection. It is driven explicitly through [`SimulationContext::tick`],
//! so any loop can drive it (the window's redraw loop, or a fixed-step
//! test harness).
//!
//! # Example
//!
//! ```
//! use helios::prelude::*;
//!
//! let settings = SimulationSettings { randomize_angles: false, ..Default::default() };
//! let mut sim = SimulationContext::new(Registry::solar_system(), settings);
//! let earth = sim.registry().find("earth").unwrap();
//!
//! sim.tick(1.0);
//! assert_eq!(sim.body(earth).unwrap().orbit_angle, 0.01);
//! ```

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::debug;

use crate::bodies::{BodyDescriptor, BodyId, Registry};
use crate::config::{AppConfig, SimulationSettings, SpinCoupling};
use crate::error::{ConfigError, RegistryError};
use crate::state::{BodyState, OrbitalState};
use crate::time::SimulationClock;

/// All mutable simulation state, passed explicitly to update, picking and
/// control code.
#[derive(Debug)]
pub struct SimulationContext {
    pub(crate) registry: Registry,
    pub(crate) state: OrbitalState,
    pub(crate) clock: SimulationClock,
    pub(crate) settings: SimulationSettings,
    pub(crate) star_angle: f32,
    pub(crate) selected: Option<BodyId>,
}

impl SimulationContext {
    /// Create a context for `registry`.
    ///
    /// Planets start at random angles when `settings.randomize_angles` is
    /// set (reproducible with `settings.seed`), otherwise all at zero.
    pub fn new(registry: Registry, settings: SimulationSettings) -> Self {
        let settings = settings.sanitized();
        let state = if settings.randomize_angles {
            OrbitalState::scattered(&registry, &mut seeded_rng(settings.seed, 0))
        } else {
            OrbitalState::aligned(&registry)
        };
        Self::assemble(registry, state, settings)
    }

    /// Create a context from explicit initial state.
    ///
    /// Fails if `state` does not hold exactly one entry per body in `registry`.
    pub fn with_state(
        registry: Registry,
        state: OrbitalState,
        settings: SimulationSettings,
    ) -> Result<Self, RegistryError> {
        if registry.len() != state.len() {
            return Err(RegistryError::StateMismatch {
                expected: registry.len(),
                found: state.len(),
            });
        }
        Ok(Self::assemble(registry, state, settings))
    }

    fn assemble(registry: Registry, state: OrbitalState, settings: SimulationSettings) -> Self {
        Self {
            registry,
            state,
            clock: SimulationClock::new(),
            settings: settings.sanitized(),
            star_angle: 0.0,
            selected: None,
        }
    }

    /// Create a context from a loaded configuration.
    pub fn from_config(config: &AppConfig) -> Result<Self, ConfigError> {
        let registry = config.registry()?;
        Ok(Self::new(registry, config.simulation.clone()))
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn state(&self) -> &OrbitalState {
        &self.state
    }

    pub fn body(&self, id: BodyId) -> Option<&BodyState> {
        self.state.get(id)
    }

    pub fn descriptor(&self, id: BodyId) -> Option<&BodyDescriptor> {
        self.registry.get(id)
    }

    pub fn clock(&self) -> &SimulationClock {
        &self.clock
    }

    /// Mutable clock access, e.g. to fix the frame delta.
    ///
    /// Speed and pause changes go through the control surface.
    pub fn clock_mut(&mut self) -> &mut SimulationClock {
        &mut self.clock
    }

    pub fn settings(&self) -> &SimulationSettings {
        &self.settings
    }

    /// The star's self-rotation angle.
    pub fn star_angle(&self) -> f32 {
        self.star_angle
    }

    /// Angle used to render a body's self-rotation: the star rotation for the
    /// star, the body's spin angle otherwise.
    pub fn render_spin(&self, id: BodyId) -> f32 {
        match (self.registry.get(id), self.state.get(id)) {
            (Some(d), _) if d.is_star() => self.star_angle,
            (_, Some(s)) => s.spin_angle,
            _ => 0.0,
        }
    }

    /// The body shown in the detail panel, if any.
    pub fn selected(&self) -> Option<BodyId> {
        self.selected
    }

    /// Change the selection. Ids not in the registry clear it.
    pub fn select(&mut self, id: Option<BodyId>) {
        let id = id.filter(|id| self.registry.get(*id).is_some());
        if id != self.selected {
            debug!(body = ?id.map(|id| self.registry[id].name.as_str()), "selection changed");
        }
        self.selected = id;
    }

    pub fn clear_selection(&mut self) {
        self.select(None);
    }

    /// Advance the simulation by `elapsed_seconds`.
    ///
    /// The star always rotates. Unless paused, every body's orbit angle
    /// advances by `speed * elapsed * global_speed` and its spin angle by
    /// `spin_speed * global_speed` (times `elapsed` with
    /// [`SpinCoupling::PerSecond`]). Each call is a full advance; negative
    /// or non-finite deltas count as zero.
    pub fn tick(&mut self, elapsed_seconds: f32) {
        let elapsed = if elapsed_seconds.is_finite() {
            elapsed_seconds.max(0.0)
        } else {
            0.0
        };
        let global_speed = self.clock.global_speed();

        self.star_angle += self.settings.star_spin_rate * global_speed;

        if self.clock.is_paused() {
            return;
        }

        let spin_scale = match self.settings.spin_coupling {
            SpinCoupling::PerFrame => global_speed,
            SpinCoupling::PerSecond => global_speed * elapsed,
        };

        for (body, descriptor) in self.state.iter_mut().zip(self.registry.descriptors()) {
            body.orbit_angle += body.speed * elapsed * global_speed;
            body.spin_angle += descriptor.spin_speed * spin_scale;
        }
    }

    /// Measure the frame delta on the clock and tick with it.
    ///
    /// Returns the delta used.
    pub fn advance_frame(&mut self) -> f32 {
        let delta = self.clock.update();
        self.tick(delta);
        delta
    }
}

/// RNG for startup randomness. `stream` separates independent uses of the
/// same seed.
pub fn seeded_rng(seed: Option<u64>, stream: u64) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(stream)),
        None => StdRng::from_entropy(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn aligned() -> SimulationContext {
        let settings = SimulationSettings {
            randomize_angles: false,
            ..SimulationSettings::default()
        };
        SimulationContext::new(Registry::solar_system(), settings)
    }

    fn id(sim: &SimulationContext, name: &str) -> BodyId {
        sim.registry().find(name).unwrap()
    }

    #[test]
    fn test_single_tick_earth() {
        let mut sim = aligned();
        let earth = id(&sim, "earth");
        sim.tick(1.0);
        assert_eq!(sim.body(earth).unwrap().orbit_angle, 0.01);
        assert_eq!(sim.body(earth).unwrap().spin_angle, 0.01);
    }

    #[test]
    fn test_repeated_ticks_accumulate() {
        let mut sim = aligned();
        sim.clock.set_global_speed(1.5);
        let (n, d, g) = (240, 1.0 / 60.0, 1.5);

        for _ in 0..n {
            sim.tick(d);
        }

        for (id, descriptor) in sim.registry().iter() {
            let expected = n as f32 * descriptor.speed * d * g;
            let actual = sim.body(id).unwrap().orbit_angle;
            assert!(
                (actual - expected).abs() < 1e-4,
                "{}: expected {}, got {}",
                descriptor.name,
                expected,
                actual
            );
        }
    }

    #[test]
    fn test_same_delta_twice_advances_twice() {
        let mut sim = aligned();
        let mars = id(&sim, "mars");
        sim.tick(0.5);
        let once = sim.body(mars).unwrap().orbit_angle;
        sim.tick(0.5);
        let twice = sim.body(mars).unwrap().orbit_angle;
        assert!((twice - 2.0 * once).abs() < 1e-7);
    }

    #[test]
    fn test_pause_freezes_bodies_but_not_star() {
        let mut sim = aligned();
        sim.tick(1.0);
        let before = sim.state().clone();
        let star_before = sim.star_angle();

        sim.clock.set_paused(true);
        for _ in 0..10 {
            sim.tick(1.0);
        }

        assert_eq!(sim.state(), &before);
        assert!((sim.star_angle() - (star_before + 10.0 * 0.001)).abs() < 1e-6);
    }

    #[test]
    fn test_star_rotation_scales_with_global_speed() {
        let mut sim = aligned();
        sim.clock.set_global_speed(2.0);
        sim.tick(0.0);
        assert!((sim.star_angle() - 0.002).abs() < 1e-9);
    }

    #[test]
    fn test_spin_is_frame_coupled() {
        let mut sim = aligned();
        let jupiter = id(&sim, "jupiter");
        sim.tick(0.001);
        sim.tick(10.0);
        assert!((sim.body(jupiter).unwrap().spin_angle - 0.05).abs() < 1e-6);
    }

    #[test]
    fn test_spin_per_second_coupling() {
        let settings = SimulationSettings {
            randomize_angles: false,
            spin_coupling: SpinCoupling::PerSecond,
            ..SimulationSettings::default()
        };
        let mut sim = SimulationContext::new(Registry::solar_system(), settings);
        let jupiter = id(&sim, "jupiter");
        sim.tick(0.5);
        assert!((sim.body(jupiter).unwrap().spin_angle - 0.0125).abs() < 1e-6);
    }

    #[test]
    fn test_bad_deltas_are_ignored() {
        let mut sim = aligned();
        let before = sim.state().clone();
        sim.tick(-1.0);
        sim.tick(f32::NAN);
        sim.tick(f32::INFINITY);
        for (a, b) in sim.state().iter().zip(before.iter()) {
            assert_eq!(a.orbit_angle, b.orbit_angle);
        }
    }

    #[test]
    fn test_render_spin_uses_star_angle() {
        let mut sim = aligned();
        let sun = sim.registry().star().unwrap();
        let earth = id(&sim, "earth");
        sim.tick(1.0);
        assert_eq!(sim.render_spin(sun), sim.star_angle());
        assert_eq!(sim.render_spin(earth), sim.body(earth).unwrap().spin_angle);
    }

    #[test]
    fn test_select_and_clear() {
        let mut sim = aligned();
        let venus = id(&sim, "venus");
        sim.select(Some(venus));
        assert_eq!(sim.selected(), Some(venus));
        sim.clear_selection();
        assert_eq!(sim.selected(), None);
    }

    #[test]
    fn test_seeded_contexts_match() {
        let settings = SimulationSettings {
            seed: Some(9),
            ..SimulationSettings::default()
        };
        let a = SimulationContext::new(Registry::solar_system(), settings.clone());
        let b = SimulationContext::new(Registry::solar_system(), settings);
        assert_eq!(a.state(), b.state());
    }

    #[test]
    fn test_advance_frame_uses_fixed_delta() {
        let mut sim = aligned();
        let earth = id(&sim, "earth");
        sim.clock_mut().set_fixed_delta(Some(1.0));
        let delta = sim.advance_frame();
        assert_eq!(delta, 1.0);
        assert_eq!(sim.body(earth).unwrap().orbit_angle, 0.01);
    }

    #[test]
    fn test_with_state_rejects_mismatched_state() {
        let full = Registry::solar_system();
        let inner = Registry::new(full.descriptors()[..2].to_vec()).unwrap();

        let result = SimulationContext::with_state(
            full.clone(),
            OrbitalState::aligned(&inner),
            SimulationSettings::default(),
        );
        assert_eq!(
            result.err(),
            Some(RegistryError::StateMismatch { expected: 9, found: 2 })
        );

        let sim = SimulationContext::with_state(
            full.clone(),
            OrbitalState::aligned(&full),
            SimulationSettings::default(),
        )
        .unwrap();
        assert_eq!(sim.registry().len(), 9);
    }
}
