//! Render bridge.
//!
//! Turns the simulation into the plain instance lists the renderer draws.
//! Nothing here touches the GPU, so placement and appearance are testable
//! headless.
//!
//! A body's world transform is built the same way for the body itself and
//! everything attached to it:
//!
//! ```text
//! rotate_y(orbit_angle) * translate(orbit_radius, 0, 0) * rotate_y(spin) * scale(pulse) * local
//! ```
//!
//! so at orbit angle θ a body sits at `(r·cos θ, 0, −r·sin θ)`.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};
use rand::Rng;
use std::f32::consts::{FRAC_PI_2, TAU};

use crate::bodies::{hex_to_rgb, BodyDescriptor, BodyId, Embellishment};
use crate::config::SceneConfig;
use crate::picking::PickProxy;
use crate::selection::Pulse;
use crate::simulation::{seeded_rng, SimulationContext};
use crate::state::BodyState;

pub const ORBIT_PATH_COLOR: u32 = 0x4488FF;
pub const ORBIT_PATH_OPACITY: f32 = 0.2;
/// Half the width of an orbit path.
pub const ORBIT_PATH_HALF_WIDTH: f32 = 0.5;
pub const ASTEROID_COLOR: u32 = 0x888888;
const ASTEROID_MIN_SIZE: f32 = 0.1;
const ASTEROID_MAX_SIZE: f32 = 0.6;
/// Phong shininess for lit surfaces.
pub const SHININESS: f32 = 30.0;

/// RNG stream for the decorative scatter, separate from the orbit angles.
const SCATTER_STREAM: u64 = 1;

/// Per-instance data for sphere and ring draws.
///
/// For spheres `params` is `[lit, shininess, 0, 0]`; for rings it is
/// `[inner_radius, outer_radius, 0, 0]`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Instance {
    pub model: [[f32; 4]; 4],
    pub color: [f32; 4],
    pub params: [f32; 4],
}

impl Instance {
    /// Lit, opaque sphere.
    pub fn lit(model: Mat4, color: u32) -> Self {
        Self::new(model, color, 1.0, [1.0, SHININESS, 0.0, 0.0])
    }

    /// Unlit sphere with the given opacity.
    pub fn unlit(model: Mat4, color: u32, opacity: f32) -> Self {
        Self::new(model, color, opacity, [0.0; 4])
    }

    /// Flat annulus in the model's XY plane.
    pub fn ring(model: Mat4, inner: f32, outer: f32, color: u32, opacity: f32) -> Self {
        Self::new(model, color, opacity, [inner, outer, 0.0, 0.0])
    }

    fn new(model: Mat4, color: u32, opacity: f32, params: [f32; 4]) -> Self {
        let [r, g, b] = hex_to_rgb(color);
        Self {
            model: model.to_cols_array_2d(),
            color: [r, g, b, opacity],
            params,
        }
    }

    pub fn translation(&self) -> Vec3 {
        Mat4::from_cols_array_2d(&self.model).w_axis.truncate()
    }

    pub fn opacity(&self) -> f32 {
        self.color[3]
    }
}

/// A background star billboard.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct StarInstance {
    pub position: [f32; 3],
    pub size: f32,
}

/// Scene content that never changes after startup.
#[derive(Debug, Clone)]
pub struct StaticScene {
    pub stars: Vec<StarInstance>,
    pub asteroids: Vec<Instance>,
    pub orbit_paths: Vec<Instance>,
}

impl StaticScene {
    /// Scatter the starfield and asteroid belt and lay out one orbit path
    /// per planet. Reproducible for a given `seed`.
    pub fn generate(sim: &SimulationContext, config: &SceneConfig) -> Self {
        let mut rng = seeded_rng(sim.settings().seed, SCATTER_STREAM);
        Self {
            stars: scatter_stars(config, &mut rng),
            asteroids: scatter_asteroids(config, &mut rng),
            orbit_paths: orbit_paths(sim.registry().planets().map(|(_, d)| d)),
        }
    }
}

/// Stars uniformly inside a cube centred on the origin.
pub fn scatter_stars(config: &SceneConfig, rng: &mut impl Rng) -> Vec<StarInstance> {
    let half = config.star_extent.abs() * 0.5;
    let mut coord = || if half > 0.0 && half.is_finite() { rng.gen_range(-half..half) } else { 0.0 };
    (0..config.star_count)
        .map(|_| StarInstance {
            position: [coord(), coord(), coord()],
            size: config.star_size,
        })
        .collect()
}

/// Small lit spheres in a flat band around the star.
pub fn scatter_asteroids(config: &SceneConfig, rng: &mut impl Rng) -> Vec<Instance> {
    let inner = config.asteroid_inner_radius.min(config.asteroid_outer_radius);
    let outer = config.asteroid_inner_radius.max(config.asteroid_outer_radius);
    let half_height = config.asteroid_height.abs() * 0.5;

    (0..config.asteroid_count)
        .map(|_| {
            let radius = inner + rng.gen::<f32>() * (outer - inner);
            let angle = rng.gen_range(0.0..TAU);
            let size = rng.gen_range(ASTEROID_MIN_SIZE..ASTEROID_MAX_SIZE);
            let height = (rng.gen::<f32>() - 0.5) * 2.0 * half_height;

            let position = Vec3::new(angle.cos() * radius, height, angle.sin() * radius);
            let model = Mat4::from_translation(position) * Mat4::from_scale(Vec3::splat(size));
            Instance::lit(model, ASTEROID_COLOR)
        })
        .collect()
}

/// Flat translucent band of width 1 along each orbit.
pub fn orbit_paths<'a>(planets: impl Iterator<Item = &'a BodyDescriptor>) -> Vec<Instance> {
    planets
        .map(|d| {
            let inner = (d.orbit_radius - ORBIT_PATH_HALF_WIDTH).max(0.0);
            let outer = d.orbit_radius + ORBIT_PATH_HALF_WIDTH;
            Instance::ring(
                Mat4::from_rotation_x(FRAC_PI_2),
                inner,
                outer,
                ORBIT_PATH_COLOR,
                ORBIT_PATH_OPACITY,
            )
        })
        .collect()
}

/// World position of a body's center.
pub fn body_position(descriptor: &BodyDescriptor, state: &BodyState) -> Vec3 {
    Mat4::from_rotation_y(state.orbit_angle).transform_point3(Vec3::new(descriptor.orbit_radius, 0.0, 0.0))
}

/// Transform of a body's local frame before its own spin: orbit rotation
/// then translation to the orbit radius.
fn orbit_frame(descriptor: &BodyDescriptor, state: &BodyState) -> Mat4 {
    Mat4::from_rotation_y(state.orbit_angle)
        * Mat4::from_translation(Vec3::new(descriptor.orbit_radius, 0.0, 0.0))
}

/// Instances for the moving bodies, rebuilt every frame.
#[derive(Debug, Clone, Default)]
pub struct BodyInstances {
    /// Body spheres (the star unlit, planets lit).
    pub solid: Vec<Instance>,
    /// Translucent halos, drawn after everything opaque.
    pub halos: Vec<Instance>,
    /// Rings attached to bodies.
    pub rings: Vec<Instance>,
}

impl BodyInstances {
    pub fn build(sim: &SimulationContext, pulse: Option<&Pulse>) -> Self {
        let mut out = Self::default();
        for (id, descriptor) in sim.registry().iter() {
            let Some(state) = sim.body(id) else { continue };
            let frame = orbit_frame(descriptor, state);
            let spin = sim.render_spin(id);
            let scale = pulse.map_or(1.0, |p| p.scale_for(id));
            let attached = frame * Mat4::from_scale(Vec3::splat(scale));

            let body_model =
                attached * Mat4::from_rotation_y(spin) * Mat4::from_scale(Vec3::splat(descriptor.size));
            out.solid.push(if descriptor.is_star() {
                Instance::unlit(body_model, descriptor.color, 1.0)
            } else {
                Instance::lit(body_model, descriptor.color)
            });

            for embellishment in &descriptor.embellishments {
                match *embellishment {
                    Embellishment::Halo {
                        scale: halo_scale,
                        color,
                        opacity,
                        spin_factor,
                    } => {
                        let model = attached
                            * Mat4::from_rotation_y(spin * spin_factor)
                            * Mat4::from_scale(Vec3::splat(descriptor.size * halo_scale));
                        out.halos.push(Instance::unlit(model, color, opacity));
                    }
                    Embellishment::Ring {
                        inner_offset,
                        outer_offset,
                        tilt,
                        color,
                        opacity,
                    } => {
                        let model = attached * Mat4::from_rotation_y(spin) * Mat4::from_rotation_x(tilt);
                        out.rings.push(Instance::ring(
                            model,
                            descriptor.size + inner_offset,
                            descriptor.size + outer_offset,
                            color,
                            opacity,
                        ));
                    }
                }
            }
        }
        out
    }
}

/// One picking sphere per body, at its current position and scale.
pub fn pick_proxies(sim: &SimulationContext, pulse: Option<&Pulse>) -> Vec<PickProxy> {
    sim.registry()
        .iter()
        .filter_map(|(id, descriptor)| {
            let state = sim.body(id)?;
            Some(PickProxy {
                id,
                center: body_position(descriptor, state),
                radius: descriptor.size * pulse.map_or(1.0, |p| p.scale_for(id)),
            })
        })
        .collect()
}

/// World position of `id`, if it exists.
pub fn position_of(sim: &SimulationContext, id: BodyId) -> Option<Vec3> {
    Some(body_position(sim.descriptor(id)?, sim.body(id)?))
}
