//! Simulation clock.
//!
//! [`SimulationClock`] measures the time between frames and carries the two
//! pieces of global playback state: the speed multiplier and the paused flag.
//! It does not advance anything by itself; the frame updater reads it.
//!
//! # Example
//!
//! ```
//! use helios::time::SimulationClock;
//!
//! let mut clock = SimulationClock::new();
//! clock.set_fixed_delta(Some(1.0 / 60.0));
//!
//! let delta = clock.update();
//! assert!((delta - 1.0 / 60.0).abs() < 1e-6);
//! assert_eq!(clock.frame(), 1);
//! assert_eq!(clock.global_speed(), 1.0);
//! ```

use std::time::Instant;

/// Frame timing plus global speed and pause state.
#[derive(Debug)]
pub struct SimulationClock {
    /// When the last frame occurred.
    last_frame: Instant,
    /// Time since last frame in seconds.
    delta_secs: f32,
    /// Total frames since start.
    frame_count: u64,
    /// Fixed delta time for deterministic updates (optional).
    fixed_delta: Option<f32>,
    /// Multiplier applied to all body motion.
    global_speed: f32,
    /// Whether orbital and spin motion is frozen.
    paused: bool,
}

impl SimulationClock {
    /// Default global speed multiplier.
    pub const DEFAULT_SPEED: f32 = 1.0;

    /// Create a new clock starting from now, unpaused at 1x.
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            last_frame: now,
            delta_secs: 0.0,
            frame_count: 0,
            fixed_delta: None,
            global_speed: Self::DEFAULT_SPEED,
            paused: false,
        }
    }

    /// Measure the time since the previous call. Call once per frame.
    ///
    /// The delta keeps flowing while paused; pausing is applied by the
    /// frame updater, not here.
    pub fn update(&mut self) -> f32 {
        let now = Instant::now();

        let raw_delta = now.duration_since(self.last_frame).as_secs_f32();
        self.delta_secs = self.fixed_delta.unwrap_or(raw_delta);
        self.last_frame = now;

        self.frame_count += 1;

        self.delta_secs
    }

    /// Time since last frame in seconds.
    #[inline]
    pub fn delta(&self) -> f32 {
        self.delta_secs
    }

    /// Total frames since start.
    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame_count
    }

    #[inline]
    pub fn global_speed(&self) -> f32 {
        self.global_speed
    }

    /// Store a global speed multiplier as-is.
    ///
    /// Range checks live in the control surface.
    pub(crate) fn set_global_speed(&mut self, speed: f32) {
        self.global_speed = speed;
    }

    #[inline]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub(crate) fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    /// Use a fixed delta instead of measured frame time.
    ///
    /// Pass `None` to go back to real frame timing.
    pub fn set_fixed_delta(&mut self, delta: Option<f32>) {
        self.fixed_delta = delta;
    }
}

impl Default for SimulationClock {
    fn default() -> Self {
        Self::new()
    }
}
