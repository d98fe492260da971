//! Celestial body registry.
//!
//! A [`Registry`] is the ordered, immutable table of [`BodyDescriptor`]s the
//! viewer is built from. It is created once at startup, either from the
//! built-in solar system or from a validated custom table, and never changes
//! afterwards. [`BodyId`] indexes into it.
//!
//! # Example
//!
//! ```
//! use helios::bodies::Registry;
//!
//! let registry = Registry::solar_system();
//! let earth = registry.find("earth").unwrap();
//! assert_eq!(registry[earth].name, "Earth");
//! assert_eq!(registry[earth].speed, 0.01);
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::f32::consts::FRAC_PI_3;

use crate::error::RegistryError;

/// Stable handle to a body in a [`Registry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyId(usize);

impl BodyId {
    /// Position of the body in registry order.
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

/// What kind of body a descriptor describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyKind {
    /// The central, self-luminous body. Rendered unlit, never orbits.
    Star,
    /// An orbiting, lit body.
    #[default]
    Planet,
}

/// Human-readable facts shown in the detail panel.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BodyFacts {
    /// One-line description.
    pub info: String,
    /// Physical diameter, free text.
    pub scale: String,
    /// Distance from the sun, free text.
    pub distance: String,
    /// Orbital period, free text.
    pub orbital_period: String,
    /// Bullet-point notes.
    pub notes: Vec<String>,
}

/// Extra geometry attached to a body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Embellishment {
    /// A flat ring around the body, from `size + inner_offset` to
    /// `size + outer_offset`, tilted about the X axis.
    Ring {
        inner_offset: f32,
        outer_offset: f32,
        tilt: f32,
        color: u32,
        opacity: f32,
    },
    /// A translucent shell of radius `size * scale`.
    ///
    /// `spin_factor` scales the body's spin angle for the shell.
    Halo {
        scale: f32,
        color: u32,
        opacity: f32,
        spin_factor: f32,
    },
}

/// Static description of one body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodyDescriptor {
    /// Lookup key, unique within a registry.
    pub id: String,
    /// Display name.
    pub name: String,
    #[serde(default)]
    pub kind: BodyKind,
    /// Base color as `0xRRGGBB`.
    pub color: u32,
    /// Visual radius in scene units.
    pub size: f32,
    /// Distance from the center of the scene.
    #[serde(default)]
    pub orbit_radius: f32,
    /// Default orbital angular speed in radians per second.
    #[serde(default)]
    pub speed: f32,
    /// Spin increment in radians per frame at 1x speed.
    #[serde(default)]
    pub spin_speed: f32,
    #[serde(default)]
    pub facts: BodyFacts,
    #[serde(default)]
    pub embellishments: Vec<Embellishment>,
}

impl BodyDescriptor {
    /// Rotation period in days, shown as `1 / spin_speed`.
    ///
    /// `None` when the body does not spin.
    pub fn rotation_period_days(&self) -> Option<f32> {
        if self.spin_speed != 0.0 {
            Some(1.0 / self.spin_speed)
        } else {
            None
        }
    }

    /// Base color as linear-ish RGB in `0.0..=1.0`.
    pub fn rgb(&self) -> [f32; 3] {
        hex_to_rgb(self.color)
    }

    pub fn is_star(&self) -> bool {
        self.kind == BodyKind::Star
    }

    fn validate(&self) -> Result<(), RegistryError> {
        let fields = [
            ("size", self.size),
            ("orbit radius", self.orbit_radius),
            ("speed", self.speed),
            ("spin speed", self.spin_speed),
        ];
        for (field, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(RegistryError::InvalidValue {
                    body: self.id.clone(),
                    field,
                });
            }
        }
        Ok(())
    }
}

/// Split `0xRRGGBB` into RGB components in `0.0..=1.0`.
pub fn hex_to_rgb(color: u32) -> [f32; 3] {
    [
        ((color >> 16) & 0xFF) as f32 / 255.0,
        ((color >> 8) & 0xFF) as f32 / 255.0,
        (color & 0xFF) as f32 / 255.0,
    ]
}

/// Ordered table of body descriptors.
#[derive(Debug, Clone, PartialEq)]
pub struct Registry {
    bodies: Vec<BodyDescriptor>,
}

impl Registry {
    /// Build a registry from a custom table.
    ///
    /// The table must be non-empty, have unique ids, exactly one star, and
    /// finite non-negative sizes, radii and speeds. Anything else is rejected
    /// as a whole.
    pub fn new(bodies: Vec<BodyDescriptor>) -> Result<Self, RegistryError> {
        if bodies.is_empty() {
            return Err(RegistryError::Empty);
        }

        let mut seen = HashSet::new();
        for body in &bodies {
            if !seen.insert(body.id.as_str()) {
                return Err(RegistryError::DuplicateId(body.id.clone()));
            }
            body.validate()?;
        }

        let stars = bodies.iter().filter(|b| b.is_star()).count();
        if stars != 1 {
            return Err(RegistryError::StarCount(stars));
        }

        Ok(Self { bodies })
    }

    /// The sun and the eight planets.
    pub fn solar_system() -> Self {
        Self {
            bodies: solar_system_table(),
        }
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// Look up a descriptor by handle.
    pub fn get(&self, id: BodyId) -> Option<&BodyDescriptor> {
        self.bodies.get(id.0)
    }

    /// Find a body by its string id.
    pub fn find(&self, id: &str) -> Option<BodyId> {
        self.bodies.iter().position(|b| b.id == id).map(BodyId)
    }

    /// Handle for the body at `index`, if in range.
    pub fn id_at(&self, index: usize) -> Option<BodyId> {
        (index < self.bodies.len()).then_some(BodyId(index))
    }

    /// The star. Every valid registry has exactly one.
    pub fn star(&self) -> Option<BodyId> {
        self.bodies.iter().position(BodyDescriptor::is_star).map(BodyId)
    }

    /// All bodies in registry order.
    pub fn iter(&self) -> impl Iterator<Item = (BodyId, &BodyDescriptor)> {
        self.bodies.iter().enumerate().map(|(i, b)| (BodyId(i), b))
    }

    /// All orbiting bodies in registry order.
    pub fn planets(&self) -> impl Iterator<Item = (BodyId, &BodyDescriptor)> {
        self.iter().filter(|(_, b)| !b.is_star())
    }

    pub fn descriptors(&self) -> &[BodyDescriptor] {
        &self.bodies
    }
}

impl std::ops::Index<BodyId> for Registry {
    type Output = BodyDescriptor;

    fn index(&self, id: BodyId) -> &Self::Output {
        &self.bodies[id.0]
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::solar_system()
    }
}

struct Row {
    id: &'static str,
    name: &'static str,
    color: u32,
    size: f32,
    orbit_radius: f32,
    speed: f32,
    spin_speed: f32,
    info: &'static str,
    scale: &'static str,
    distance: &'static str,
    period: &'static str,
    notes: [&'static str; 3],
}

impl Row {
    fn into_descriptor(self, kind: BodyKind, embellishments: Vec<Embellishment>) -> BodyDescriptor {
        BodyDescriptor {
            id: self.id.into(),
            name: self.name.into(),
            kind,
            color: self.color,
            size: self.size,
            orbit_radius: self.orbit_radius,
            speed: self.speed,
            spin_speed: self.spin_speed,
            facts: BodyFacts {
                info: self.info.into(),
                scale: self.scale.into(),
                distance: self.distance.into(),
                orbital_period: self.period.into(),
                notes: self.notes.iter().map(|s| s.to_string()).collect(),
            },
            embellishments,
        }
    }
}

fn solar_system_table() -> Vec<BodyDescriptor> {
    // The sun's visible rotation comes from the star rotation angle, so its
    // own spin speed stays zero and the detail panel reports "N/A".
    let sun = Row {
        id: "sun",
        name: "Sun",
        color: 0xFDB813,
        size: 10.0,
        orbit_radius: 0.0,
        speed: 0.0,
        spin_speed: 0.0,
        info: "The star at the center of our Solar System.",
        scale: "1,391,000 km",
        distance: "Center",
        period: "25-35 days (rotation)",
        notes: [
            "Comprises 99.86% of Solar System mass",
            "Surface temperature: 5,500°C",
            "Age: 4.6 billion years",
        ],
    }
    .into_descriptor(
        BodyKind::Star,
        vec![
            Embellishment::Halo {
                scale: 1.1,
                color: 0xFDB813,
                opacity: 0.3,
                spin_factor: 1.0,
            },
            Embellishment::Halo {
                scale: 1.5,
                color: 0xFF8C00,
                opacity: 0.1,
                spin_factor: 0.5,
            },
        ],
    );

    let rows = [
        Row {
            id: "mercury",
            name: "Mercury",
            color: 0xBCBABA,
            size: 1.5,
            orbit_radius: 20.0,
            speed: 0.04,
            spin_speed: 0.004,
            info: "Closest planet to the Sun, with extreme temperature variations.",
            scale: "4,879 km",
            distance: "57.9M km",
            period: "88 days",
            notes: [
                "Smallest planet in the Solar System",
                "No atmosphere to retain heat",
                "Surface resembles Earth's moon",
            ],
        },
        Row {
            id: "venus",
            name: "Venus",
            color: 0xE6C229,
            size: 3.8,
            orbit_radius: 30.0,
            speed: 0.015,
            spin_speed: 0.002,
            info: "Hottest planet with a thick, toxic atmosphere.",
            scale: "12,104 km",
            distance: "108.2M km",
            period: "225 days",
            notes: [
                "Rotates backwards compared to other planets",
                "Hottest planet at 462°C (864°F)",
                "Atmosphere causes extreme greenhouse effect",
            ],
        },
        Row {
            id: "earth",
            name: "Earth",
            color: 0x428ED4,
            size: 4.0,
            orbit_radius: 40.0,
            speed: 0.01,
            spin_speed: 0.01,
            info: "Our home planet, the only known place with life.",
            scale: "12,742 km",
            distance: "149.6M km",
            period: "365.25 days",
            notes: [
                "Only planet known to support life",
                "71% of surface covered by water",
                "Has one natural satellite, the Moon",
            ],
        },
        Row {
            id: "mars",
            name: "Mars",
            color: 0xE27B58,
            size: 2.1,
            orbit_radius: 50.0,
            speed: 0.008,
            spin_speed: 0.009,
            info: "The Red Planet, with the largest volcano in the solar system.",
            scale: "6,779 km",
            distance: "227.9M km",
            period: "687 days",
            notes: [
                "Home to Olympus Mons, the tallest volcano",
                "Has two moons: Phobos and Deimos",
                "Surface contains iron oxide (rust)",
            ],
        },
        Row {
            id: "jupiter",
            name: "Jupiter",
            color: 0xCEB8B8,
            size: 8.0,
            orbit_radius: 70.0,
            speed: 0.002,
            spin_speed: 0.025,
            info: "Largest planet, with a prominent Great Red Spot storm.",
            scale: "139,820 km",
            distance: "778.5M km",
            period: "11.9 years",
            notes: [
                "Largest planet in Solar System",
                "Has at least 79 moons",
                "Great Red Spot is a giant storm",
            ],
        },
        Row {
            id: "saturn",
            name: "Saturn",
            color: 0xE4E1C1,
            size: 7.0,
            orbit_radius: 90.0,
            speed: 0.0009,
            spin_speed: 0.022,
            info: "Famous for its spectacular ring system.",
            scale: "116,460 km",
            distance: "1.4B km",
            period: "29.5 years",
            notes: [
                "Most extensive ring system",
                "Has 82 confirmed moons",
                "Less dense than water (would float)",
            ],
        },
        Row {
            id: "uranus",
            name: "Uranus",
            color: 0xC7E3E2,
            size: 5.0,
            orbit_radius: 110.0,
            speed: 0.0004,
            spin_speed: 0.015,
            info: "Ice giant that rotates on its side.",
            scale: "50,724 km",
            distance: "2.9B km",
            period: "84 years",
            notes: [
                "Rotates on its side (98° tilt)",
                "Coldest atmosphere in Solar System",
                "Has 27 known moons",
            ],
        },
        Row {
            id: "neptune",
            name: "Neptune",
            color: 0x7B91D0,
            size: 5.0,
            orbit_radius: 130.0,
            speed: 0.0001,
            spin_speed: 0.016,
            info: "The windiest planet with the strongest winds in the solar system.",
            scale: "49,244 km",
            distance: "4.5B km",
            period: "165 years",
            notes: [
                "Strongest winds in Solar System (2,100 km/h)",
                "Discovered through mathematical predictions",
                "Has 14 known moons",
            ],
        },
    ];

    let mut bodies = vec![sun];
    bodies.extend(rows.into_iter().map(|row| {
        let embellishments = match row.id {
            "saturn" => vec![Embellishment::Ring {
                inner_offset: 1.5,
                outer_offset: 4.0,
                tilt: FRAC_PI_3,
                color: 0xF1E4C3,
                opacity: 0.8,
            }],
            "earth" => vec![Embellishment::Halo {
                scale: 1.1,
                color: 0x428ED4,
                opacity: 0.2,
                spin_factor: 1.0,
            }],
            _ => Vec::new(),
        };
        row.into_descriptor(BodyKind::Planet, embellishments)
    }));
    bodies
}

#[cfg(test)]
mod tests {
    use super::*;

    fn planet(id: &str) -> BodyDescriptor {
        BodyDescriptor {
            id: id.into(),
            name: id.into(),
            kind: BodyKind::Planet,
            color: 0xFFFFFF,
            size: 1.0,
            orbit_radius: 10.0,
            speed: 0.01,
            spin_speed: 0.01,
            facts: BodyFacts::default(),
            embellishments: Vec::new(),
        }
    }

    fn star() -> BodyDescriptor {
        BodyDescriptor {
            kind: BodyKind::Star,
            orbit_radius: 0.0,
            ..planet("star")
        }
    }

    #[test]
    fn test_solar_system_layout() {
        let registry = Registry::solar_system();
        assert_eq!(registry.len(), 9);
        assert_eq!(registry.star(), registry.id_at(0));
        assert_eq!(registry.planets().count(), 8);

        let names: Vec<_> = registry.planets().map(|(_, b)| b.name.as_str()).collect();
        assert_eq!(
            names,
            ["Mercury", "Venus", "Earth", "Mars", "Jupiter", "Saturn", "Uranus", "Neptune"]
        );
    }

    #[test]
    fn test_solar_system_passes_validation() {
        let table = Registry::solar_system().descriptors().to_vec();
        assert!(Registry::new(table).is_ok());
    }

    #[test]
    fn test_embellishments() {
        let registry = Registry::solar_system();
        let saturn = &registry[registry.find("saturn").unwrap()];
        assert!(matches!(saturn.embellishments.as_slice(), [Embellishment::Ring { .. }]));

        let earth = &registry[registry.find("earth").unwrap()];
        assert!(matches!(earth.embellishments.as_slice(), [Embellishment::Halo { .. }]));

        let sun = &registry[registry.star().unwrap()];
        assert_eq!(sun.embellishments.len(), 2);
    }

    #[test]
    fn test_rotation_period() {
        let registry = Registry::solar_system();
        let earth = &registry[registry.find("earth").unwrap()];
        assert_eq!(earth.rotation_period_days(), Some(100.0));

        let sun = &registry[registry.star().unwrap()];
        assert_eq!(sun.rotation_period_days(), None);
    }

    #[test]
    fn test_hex_to_rgb() {
        assert_eq!(hex_to_rgb(0xFF0000), [1.0, 0.0, 0.0]);
        assert_eq!(hex_to_rgb(0x00FF00), [0.0, 1.0, 0.0]);
        assert_eq!(hex_to_rgb(0x0000FF), [0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_find_unknown() {
        let registry = Registry::solar_system();
        assert_eq!(registry.find("pluto"), None);
        assert_eq!(registry.id_at(9), None);
    }

    #[test]
    fn test_rejects_empty() {
        assert_eq!(Registry::new(Vec::new()), Err(RegistryError::Empty));
    }

    #[test]
    fn test_rejects_duplicate_ids() {
        let result = Registry::new(vec![star(), planet("a"), planet("a")]);
        assert_eq!(result, Err(RegistryError::DuplicateId("a".into())));
    }

    #[test]
    fn test_rejects_bad_numbers() {
        let mut bad = planet("a");
        bad.speed = f32::NAN;
        assert!(matches!(
            Registry::new(vec![star(), bad]),
            Err(RegistryError::InvalidValue { field: "speed", .. })
        ));

        let mut negative = planet("b");
        negative.size = -1.0;
        assert!(matches!(
            Registry::new(vec![star(), negative]),
            Err(RegistryError::InvalidValue { field: "size", .. })
        ));
    }

    #[test]
    fn test_requires_single_star() {
        assert_eq!(Registry::new(vec![planet("a")]), Err(RegistryError::StarCount(0)));

        let mut second = star();
        second.id = "other".into();
        assert_eq!(
            Registry::new(vec![star(), second]),
            Err(RegistryError::StarCount(2))
        );
    }

    #[test]
    fn test_descriptor_from_json() {
        let json = r#"{
            "id": "vulcan",
            "name": "Vulcan",
            "color": 16711680,
            "size": 2.0,
            "orbit_radius": 12.0,
            "speed": 0.05,
            "embellishments": [
                { "type": "halo", "scale": 1.2, "color": 255, "opacity": 0.5, "spin_factor": 1.0 }
            ]
        }"#;
        let body: BodyDescriptor = serde_json::from_str(json).unwrap();
        assert_eq!(body.kind, BodyKind::Planet);
        assert_eq!(body.spin_speed, 0.0);
        assert_eq!(body.facts, BodyFacts::default());
        assert_eq!(body.embellishments.len(), 1);
    }
}
