//! Ray-cast body picking.
//!
//! A click in normalized device coordinates is unprojected through the
//! inverse view-projection matrix into a world-space ray, which is tested
//! against one bounding sphere per pickable body. The nearest hit wins.
//!
//! Only body spheres take part. Rings, halos, orbit paths, asteroids and
//! stars are decoration and never intercept a click.

use glam::{Mat4, Vec2, Vec3};

use crate::bodies::BodyId;

/// A half-line in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    /// Unit length.
    pub direction: Vec3,
}

impl Ray {
    /// Build a ray through `ndc` (x, y in `[-1, 1]`, y up) from the near
    /// plane toward the far plane.
    ///
    /// Returns `None` if the matrix is degenerate.
    pub fn from_ndc(ndc: Vec2, inverse_view_projection: Mat4) -> Option<Self> {
        let near = inverse_view_projection.project_point3(ndc.extend(0.0));
        let far = inverse_view_projection.project_point3(ndc.extend(1.0));
        let direction = (far - near).try_normalize()?;
        near.is_finite().then_some(Self {
            origin: near,
            direction,
        })
    }

    /// Distance along the ray to the first intersection with a sphere, or
    /// `None` if the sphere is missed or entirely behind the origin.
    ///
    /// A ray starting inside the sphere hits its far side.
    pub fn intersect_sphere(&self, center: Vec3, radius: f32) -> Option<f32> {
        let oc = self.origin - center;
        let b = oc.dot(self.direction);
        let c = oc.dot(oc) - radius * radius;
        let discriminant = b * b - c;
        if discriminant < 0.0 {
            return None;
        }

        let root = discriminant.sqrt();
        let t0 = -b - root;
        let t1 = -b + root;
        if t0 >= 0.0 {
            Some(t0)
        } else if t1 >= 0.0 {
            Some(t1)
        } else {
            None
        }
    }
}

/// The sphere a body occupies for picking purposes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickProxy {
    pub id: BodyId,
    pub center: Vec3,
    pub radius: f32,
}

/// The body under `ndc`, if any.
pub fn pick(ndc: Vec2, inverse_view_projection: Mat4, proxies: &[PickProxy]) -> Option<BodyId> {
    let ray = Ray::from_ndc(ndc, inverse_view_projection)?;
    pick_ray(&ray, proxies)
}

/// The body whose sphere `ray` hits first.
pub fn pick_ray(ray: &Ray, proxies: &[PickProxy]) -> Option<BodyId> {
    proxies
        .iter()
        .filter_map(|p| ray.intersect_sphere(p.center, p.radius).map(|t| (t, p.id)))
        .min_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, id)| id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bodies::Registry;
    use crate::gpu::camera::Camera;

    fn ids() -> (BodyId, BodyId, BodyId) {
        let registry = Registry::solar_system();
        (
            registry.star().unwrap(),
            registry.find("earth").unwrap(),
            registry.find("mars").unwrap(),
        )
    }

    #[test]
    fn test_intersect_sphere() {
        let ray = Ray {
            origin: Vec3::new(0.0, 0.0, 10.0),
            direction: Vec3::NEG_Z,
        };
        assert_eq!(ray.intersect_sphere(Vec3::ZERO, 2.0), Some(8.0));
        assert_eq!(ray.intersect_sphere(Vec3::new(5.0, 0.0, 0.0), 2.0), None);
        assert_eq!(ray.intersect_sphere(Vec3::new(0.0, 0.0, 20.0), 2.0), None);

        let inside = Ray {
            origin: Vec3::ZERO,
            direction: Vec3::X,
        };
        assert_eq!(inside.intersect_sphere(Vec3::ZERO, 3.0), Some(3.0));
    }

    #[test]
    fn test_center_click_hits_star() {
        let (sun, _, _) = ids();
        let camera = Camera::default();
        let inverse = camera.view_projection(1.5).inverse();
        let proxies = [PickProxy {
            id: sun,
            center: Vec3::ZERO,
            radius: 10.0,
        }];
        assert_eq!(pick(Vec2::ZERO, inverse, &proxies), Some(sun));
        assert_eq!(pick(Vec2::new(0.95, 0.95), inverse, &proxies), None);
    }

    #[test]
    fn test_projected_body_is_picked() {
        let (sun, earth, _) = ids();
        let camera = Camera::default();
        let view_projection = camera.view_projection(1.5);
        let earth_pos = Vec3::new(40.0, 0.0, 0.0);

        let ndc = view_projection.project_point3(earth_pos).truncate();
        let proxies = [
            PickProxy {
                id: sun,
                center: Vec3::ZERO,
                radius: 10.0,
            },
            PickProxy {
                id: earth,
                center: earth_pos,
                radius: 4.0,
            },
        ];
        assert_eq!(pick(ndc, view_projection.inverse(), &proxies), Some(earth));
    }

    #[test]
    fn test_nearest_hit_wins() {
        let (_, earth, mars) = ids();
        let ray = Ray {
            origin: Vec3::new(0.0, 0.0, 100.0),
            direction: Vec3::NEG_Z,
        };
        let proxies = [
            PickProxy {
                id: mars,
                center: Vec3::new(0.0, 0.0, 0.0),
                radius: 2.0,
            },
            PickProxy {
                id: earth,
                center: Vec3::new(0.0, 0.0, 50.0),
                radius: 4.0,
            },
        ];
        assert_eq!(pick_ray(&ray, &proxies), Some(earth));
    }

    #[test]
    fn test_empty_space_picks_nothing() {
        let camera = Camera::default();
        let inverse = camera.view_projection(1.0).inverse();
        assert_eq!(pick(Vec2::new(0.5, 0.5), inverse, &[]), None);
    }
}
