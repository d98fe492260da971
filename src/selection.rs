//! Selected-body presentation.
//!
//! [`BodyDetails`] is what the detail panel shows for the selected body;
//! [`Pulse`] is the short grow-and-shrink animation a body plays when it is
//! clicked.

use crate::bodies::{BodyDescriptor, BodyId};
use crate::simulation::SimulationContext;

/// Seconds for one pulse (grow then shrink).
pub const PULSE_DURATION: f32 = 0.4;
/// Peak scale of a pulse.
pub const PULSE_PEAK: f32 = 1.2;

/// Detail panel contents for one body.
#[derive(Debug, Clone, PartialEq)]
pub struct BodyDetails {
    pub name: String,
    pub info: String,
    pub scale: String,
    pub distance: String,
    pub orbital_period: String,
    /// `"{:.1} days"`, or `"N/A"` for bodies without spin.
    pub rotation_period: String,
    pub notes: Vec<String>,
}

impl BodyDetails {
    pub fn new(descriptor: &BodyDescriptor) -> Self {
        let facts = &descriptor.facts;
        Self {
            name: descriptor.name.clone(),
            info: facts.info.clone(),
            scale: facts.scale.clone(),
            distance: facts.distance.clone(),
            orbital_period: facts.orbital_period.clone(),
            rotation_period: format_rotation_period(descriptor),
            notes: facts.notes.clone(),
        }
    }

    /// Details of the currently selected body.
    pub fn for_selection(sim: &SimulationContext) -> Option<Self> {
        sim.selected()
            .and_then(|id| sim.descriptor(id))
            .map(Self::new)
    }
}

fn format_rotation_period(descriptor: &BodyDescriptor) -> String {
    match descriptor.rotation_period_days() {
        Some(days) => format!("{:.1} days", days),
        None => "N/A".into(),
    }
}

/// Scale animation played on a clicked body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pulse {
    body: BodyId,
    elapsed: f32,
}

impl Pulse {
    pub fn new(body: BodyId) -> Self {
        Self { body, elapsed: 0.0 }
    }

    pub fn body(&self) -> BodyId {
        self.body
    }

    /// Advance by `delta` seconds. Returns `false` once finished.
    pub fn advance(&mut self, delta: f32) -> bool {
        if delta.is_finite() && delta > 0.0 {
            self.elapsed += delta;
        }
        !self.is_finished()
    }

    pub fn is_finished(&self) -> bool {
        self.elapsed >= PULSE_DURATION
    }

    /// Current scale factor: 1 → peak over the first half, back to 1 over
    /// the second.
    pub fn scale(&self) -> f32 {
        let half = PULSE_DURATION * 0.5;
        let t = if self.elapsed < half {
            self.elapsed / half
        } else {
            ((PULSE_DURATION - self.elapsed) / half).max(0.0)
        };
        // ease-out on the way up, mirrored on the way down
        let eased = 1.0 - (1.0 - t) * (1.0 - t);
        1.0 + (PULSE_PEAK - 1.0) * eased
    }

    /// Scale factor for `id`: the pulse scale for the pulsing body, 1 for others.
    pub fn scale_for(&self, id: BodyId) -> f32 {
        if id == self.body {
            self.scale()
        } else {
            1.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bodies::Registry;

    #[test]
    fn test_planet_details() {
        let registry = Registry::solar_system();
        let mars = &registry[registry.find("mars").unwrap()];
        let details = BodyDetails::new(mars);

        assert_eq!(details.name, "Mars");
        assert_eq!(details.orbital_period, "687 days");
        assert_eq!(details.rotation_period, format!("{:.1} days", 1.0 / 0.009f32));
        assert_eq!(details.notes.len(), 3);
    }

    #[test]
    fn test_earth_rotation_period() {
        let registry = Registry::solar_system();
        let earth = &registry[registry.find("earth").unwrap()];
        assert_eq!(BodyDetails::new(earth).rotation_period, "100.0 days");
    }

    #[test]
    fn test_star_has_no_rotation_period() {
        let registry = Registry::solar_system();
        let sun = &registry[registry.star().unwrap()];
        let details = BodyDetails::new(sun);
        assert_eq!(details.rotation_period, "N/A");
        assert_eq!(details.distance, "Center");
    }

    #[test]
    fn test_pulse_shape() {
        let registry = Registry::solar_system();
        let earth = registry.find("earth").unwrap();
        let sun = registry.star().unwrap();
        let mut pulse = Pulse::new(earth);

        assert_eq!(pulse.scale(), 1.0);
        pulse.advance(PULSE_DURATION / 2.0);
        assert!((pulse.scale() - PULSE_PEAK).abs() < 1e-5);
        assert_eq!(pulse.scale_for(sun), 1.0);

        assert!(!pulse.advance(PULSE_DURATION));
        assert!(pulse.is_finished());
        assert_eq!(pulse.scale(), 1.0);
    }
}
