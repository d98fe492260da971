//! Control surface.
//!
//! The only way user input changes the simulation. Every operation clamps its
//! input instead of failing, so the frame updater never sees an invalid speed.
//! UI code emits [`Command`]s and the window loop applies them with
//! [`SimulationContext::apply`]; the direct methods exist for callers that
//! do not need the indirection.

use tracing::debug;

use crate::bodies::BodyId;
use crate::simulation::SimulationContext;
use crate::time::SimulationClock;

/// How long a notification stays on screen, in seconds.
pub const NOTIFICATION_SECONDS: f32 = 3.0;

/// Per-body slider units per rad/s.
pub const BODY_SLIDER_SCALE: f32 = 1000.0;
/// Global slider units per 1x.
pub const GLOBAL_SLIDER_SCALE: f32 = 10.0;

/// Body speed to its slider position (speed × 1000).
pub fn body_speed_to_slider(speed: f32) -> f32 {
    speed * BODY_SLIDER_SCALE
}

/// Slider position to body speed.
pub fn slider_to_body_speed(value: f32) -> f32 {
    value / BODY_SLIDER_SCALE
}

/// Global multiplier to its slider position (multiplier × 10).
pub fn global_speed_to_slider(multiplier: f32) -> f32 {
    multiplier * GLOBAL_SLIDER_SCALE
}

/// Slider position to global multiplier.
pub fn slider_to_global_speed(value: f32) -> f32 {
    value / GLOBAL_SLIDER_SCALE
}

/// Named global speed presets.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SpeedMode {
    Slow,
    Normal,
    Fast,
    Custom(f32),
}

impl SpeedMode {
    /// The three presets, in button order.
    pub const PRESETS: [SpeedMode; 3] = [SpeedMode::Slow, SpeedMode::Normal, SpeedMode::Fast];

    /// Classify a multiplier. Values within 1e-4 of a preset match it.
    pub fn from_multiplier(multiplier: f32) -> Self {
        Self::PRESETS
            .into_iter()
            .find(|mode| (mode.multiplier() - multiplier).abs() < 1e-4)
            .unwrap_or(SpeedMode::Custom(multiplier))
    }

    pub fn multiplier(self) -> f32 {
        match self {
            SpeedMode::Slow => 0.5,
            SpeedMode::Normal => 1.0,
            SpeedMode::Fast => 2.0,
            SpeedMode::Custom(m) => m,
        }
    }

    /// Button caption.
    pub fn label(self) -> String {
        match self {
            SpeedMode::Slow => "0.5x".into(),
            SpeedMode::Normal => "1x".into(),
            SpeedMode::Fast => "2x".into(),
            SpeedMode::Custom(m) => format!("{:.1}x", m),
        }
    }

    /// Status line text, e.g. `Time: 2x`.
    pub fn time_display(self) -> String {
        format!("Time: {}", self.label())
    }
}

/// A user action against the simulation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    SetBodySpeed { body: BodyId, speed: f32 },
    SetGlobalSpeed(f32),
    SetSpeedMode(SpeedMode),
    TogglePause,
    ResetAll,
    Select(BodyId),
    ClearSelection,
}

impl SimulationContext {
    /// Apply a command. Returns a notification message for the user when the
    /// command warrants one.
    pub fn apply(&mut self, command: Command) -> Option<String> {
        debug!(?command, "applying command");
        match command {
            Command::SetBodySpeed { body, speed } => {
                self.set_body_speed(body, speed);
                None
            }
            Command::SetGlobalSpeed(multiplier) => {
                self.set_global_speed(multiplier);
                None
            }
            Command::SetSpeedMode(mode) => {
                self.set_global_speed(mode.multiplier());
                None
            }
            Command::TogglePause => {
                let paused = self.toggle_pause();
                Some(if paused { "Animation paused" } else { "Animation resumed" }.into())
            }
            Command::ResetAll => {
                self.reset_all();
                Some("Speed reset to default values".into())
            }
            Command::Select(body) => {
                self.select(Some(body));
                None
            }
            Command::ClearSelection => {
                self.clear_selection();
                None
            }
        }
    }

    /// Set one body's orbital speed, clamped to `[0, max_body_speed]`.
    ///
    /// NaN becomes zero. Returns the speed actually stored, or `None` for an
    /// unknown body.
    pub fn set_body_speed(&mut self, id: BodyId, speed: f32) -> Option<f32> {
        let max = self.settings.max_body_speed;
        let speed = if speed.is_nan() { 0.0 } else { speed.clamp(0.0, max) };
        let body = self.state.get_mut(id)?;
        body.speed = speed;
        Some(speed)
    }

    /// Set the global speed multiplier, clamped to the configured range.
    ///
    /// Non-positive and NaN inputs become the minimum. Returns the resulting
    /// speed mode.
    pub fn set_global_speed(&mut self, multiplier: f32) -> SpeedMode {
        let min = self.settings.min_global_speed;
        let max = self.settings.max_global_speed;
        let multiplier = if multiplier.is_nan() || multiplier <= 0.0 {
            min
        } else {
            multiplier.clamp(min, max)
        };
        self.clock.set_global_speed(multiplier);
        SpeedMode::from_multiplier(multiplier)
    }

    /// Flip the paused flag. Returns the new value.
    pub fn toggle_pause(&mut self) -> bool {
        let paused = !self.clock.is_paused();
        self.clock.set_paused(paused);
        paused
    }

    /// Restore every body's speed from its descriptor and the global speed
    /// to 1x. Pause, angles and selection are left alone.
    pub fn reset_all(&mut self) {
        for (body, descriptor) in self.state.iter_mut().zip(self.registry.descriptors()) {
            body.speed = descriptor.speed;
        }
        self.clock.set_global_speed(SimulationClock::DEFAULT_SPEED);
    }

    pub fn speed_mode(&self) -> SpeedMode {
        SpeedMode::from_multiplier(self.clock.global_speed())
    }

    pub fn is_paused(&self) -> bool {
        self.clock.is_paused()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bodies::Registry;
    use crate::config::SimulationSettings;

    fn sim() -> SimulationContext {
        let settings = SimulationSettings {
            randomize_angles: false,
            ..SimulationSettings::default()
        };
        SimulationContext::new(Registry::solar_system(), settings)
    }

    #[test]
    fn test_body_speed_clamped() {
        let mut sim = sim();
        let earth = sim.registry().find("earth").unwrap();

        for (input, expected) in [
            (-1.0, 0.0),
            (0.05, 0.05),
            (0.2, 0.2),
            (5.0, 0.2),
            (f32::NAN, 0.0),
            (f32::INFINITY, 0.2),
            (f32::NEG_INFINITY, 0.0),
        ] {
            assert_eq!(sim.set_body_speed(earth, input), Some(expected));
            let stored = sim.body(earth).unwrap().speed;
            assert!((0.0..=0.2).contains(&stored));
            assert_eq!(stored, expected);
        }
    }

    #[test]
    fn test_body_speed_only_touches_one_body() {
        let mut sim = sim();
        let earth = sim.registry().find("earth").unwrap();
        let before = sim.state().clone();

        sim.set_body_speed(earth, 0.15);

        for (id, _) in sim.registry().iter() {
            let expected = if id == earth { 0.15 } else { before.get(id).unwrap().speed };
            assert_eq!(sim.body(id).unwrap().speed, expected);
        }
    }

    #[test]
    fn test_global_speed_clamped() {
        let mut sim = sim();
        assert_eq!(sim.set_global_speed(0.0), SpeedMode::Custom(0.1));
        assert_eq!(sim.clock().global_speed(), 0.1);
        sim.set_global_speed(-3.0);
        assert_eq!(sim.clock().global_speed(), 0.1);
        sim.set_global_speed(f32::NAN);
        assert_eq!(sim.clock().global_speed(), 0.1);
        sim.set_global_speed(50.0);
        assert_eq!(sim.clock().global_speed(), 2.0);
    }

    #[test]
    fn test_speed_modes() {
        let mut sim = sim();
        assert_eq!(sim.set_global_speed(0.5), SpeedMode::Slow);
        assert_eq!(sim.set_global_speed(1.0), SpeedMode::Normal);
        assert_eq!(sim.set_global_speed(2.0), SpeedMode::Fast);
        assert_eq!(sim.set_global_speed(1.3), SpeedMode::Custom(1.3));

        assert_eq!(
            sim.set_global_speed(slider_to_global_speed(5.0)),
            SpeedMode::Slow
        );
    }

    #[test]
    fn test_time_display() {
        assert_eq!(SpeedMode::Slow.time_display(), "Time: 0.5x");
        assert_eq!(SpeedMode::Normal.time_display(), "Time: 1x");
        assert_eq!(SpeedMode::Fast.time_display(), "Time: 2x");
        assert_eq!(SpeedMode::Custom(1.3).time_display(), "Time: 1.3x");
    }

    #[test]
    fn test_toggle_pause() {
        let mut sim = sim();
        assert!(sim.toggle_pause());
        assert!(sim.is_paused());
        assert!(!sim.toggle_pause());
        assert!(!sim.is_paused());
    }

    #[test]
    fn test_reset_all_restores_table_values() {
        let mut sim = sim();
        let ids: Vec<_> = sim.registry().iter().map(|(id, _)| id).collect();
        for id in &ids {
            sim.set_body_speed(*id, 0.123);
        }
        sim.set_global_speed(1.7);
        sim.toggle_pause();

        sim.reset_all();

        for (id, descriptor) in Registry::solar_system().iter() {
            assert_eq!(sim.body(id).unwrap().speed, descriptor.speed);
        }
        assert_eq!(sim.clock().global_speed(), 1.0);
        assert_eq!(sim.speed_mode(), SpeedMode::Normal);
        assert!(sim.is_paused());
    }

    #[test]
    fn test_apply_notifications() {
        let mut sim = sim();
        assert_eq!(sim.apply(Command::TogglePause).as_deref(), Some("Animation paused"));
        assert_eq!(sim.apply(Command::TogglePause).as_deref(), Some("Animation resumed"));
        assert_eq!(
            sim.apply(Command::ResetAll).as_deref(),
            Some("Speed reset to default values")
        );
        assert_eq!(sim.apply(Command::SetSpeedMode(SpeedMode::Fast)), None);
        assert_eq!(sim.clock().global_speed(), 2.0);
    }

    #[test]
    fn test_apply_selection() {
        let mut sim = sim();
        let saturn = sim.registry().find("saturn").unwrap();
        sim.apply(Command::Select(saturn));
        assert_eq!(sim.selected(), Some(saturn));
        sim.apply(Command::ClearSelection);
        assert_eq!(sim.selected(), None);
    }

    #[test]
    fn test_slider_mappings() {
        assert_eq!(body_speed_to_slider(0.01), 10.0);
        assert_eq!(slider_to_body_speed(200.0), 0.2);
        assert_eq!(global_speed_to_slider(1.0), 10.0);
        assert_eq!(slider_to_global_speed(20.0), 2.0);
    }
}
