//! # Helios
//!
//! An animated 3D solar system: a sun, eight planets on circular orbits, an
//! asteroid belt and a starfield, with a control panel for speeds, pausing
//! and planet facts.
//!
//! ## Quick Start
//!
//! ```ignore
//! use helios::prelude::*;
//!
//! fn main() -> Result<(), AppError> {
//!     helios::app::run(AppConfig::default())
//! }
//! ```
//!
//! ## Core Concepts
//!
//! ### Bodies
//!
//! A [`Registry`](bodies::Registry) holds one immutable
//! [`BodyDescriptor`](bodies::BodyDescriptor) per body: color, size, orbit
//! radius, speeds, facts and embellishments (rings and glows). The built-in
//! table is [`Registry::solar_system`](bodies::Registry::solar_system); a
//! config file can replace it.
//!
//! ### Simulation
//!
//! [`SimulationContext`](simulation::SimulationContext) owns the mutable
//! side: per-body orbit and spin angles, speed overrides, the clock with its
//! global speed multiplier and pause flag, and the selection. It has no
//! window or GPU dependency:
//!
//! ```
//! use helios::prelude::*;
//!
//! let mut sim = SimulationContext::new(Registry::solar_system(), SimulationSettings::default());
//! sim.apply(Command::SetSpeedMode(SpeedMode::Fast));
//! sim.tick(1.0 / 60.0);
//! assert_eq!(sim.speed_mode(), SpeedMode::Fast);
//! ```
//!
//! ### Controls
//!
//! Everything the user can change goes through a
//! [`Command`](controls::Command). Values are clamped, never rejected.
//!
//! ### Rendering
//!
//! [`scene`] turns the simulation into instance data, [`gpu`] draws it with
//! wgpu and [`ui`] draws the egui control panel on top. [`app`] ties them
//! to a winit window.

pub mod app;
pub mod bodies;
pub mod config;
pub mod controls;
pub mod error;
pub mod gpu;
pub mod input;
pub mod picking;
pub mod scene;
pub mod selection;
pub mod simulation;
pub mod state;
pub mod time;
pub mod ui;

pub use glam::{Mat4, Vec2, Vec3};

/// Convenient re-exports for common usage.
///
/// ```ignore
/// use helios::prelude::*;
/// ```
pub mod prelude {
    pub use crate::bodies::{BodyDescriptor, BodyId, BodyKind, Embellishment, Registry};
    pub use crate::config::{AppConfig, SceneConfig, SimulationSettings, SpinCoupling, Theme};
    pub use crate::controls::{Command, SpeedMode};
    pub use crate::error::{AppError, ConfigError, RegistryError};
    pub use crate::selection::BodyDetails;
    pub use crate::simulation::SimulationContext;
    pub use crate::state::BodyState;
    pub use crate::time::SimulationClock;
    pub use crate::{Mat4, Vec2, Vec3};
}
