//! Procedural meshes.
//!
//! All bodies share one unit sphere and all rings share one annulus; size
//! and shape come from the per-instance transform and ring radii.

use bytemuck::{Pod, Zeroable};
use std::f32::consts::{PI, TAU};

/// Sphere vertex: position on the unit sphere, which is also its normal.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct SphereVertex {
    pub position: [f32; 3],
}

/// Annulus vertex: unit direction in the XY plane, and 0 for the inner edge
/// or 1 for the outer edge.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct RingVertex {
    pub direction: [f32; 2],
    pub edge: f32,
}

/// Upper bound on sphere segments. Larger requests are clamped.
pub const MAX_SPHERE_SEGMENTS: u32 = 512;

/// Upper bound on annulus segments. Larger requests are clamped.
pub const MAX_RING_SEGMENTS: u32 = 4096;

/// Indexed triangle list.
#[derive(Debug, Clone)]
pub struct Mesh<V> {
    pub vertices: Vec<V>,
    pub indices: Vec<u32>,
}

/// UV sphere of radius 1 with `segments` slices around and `segments / 2`
/// stacks from pole to pole, clamped to `3..=MAX_SPHERE_SEGMENTS`.
/// Triangles wind counter-clockwise seen from outside.
pub fn uv_sphere(segments: u32) -> Mesh<SphereVertex> {
    let slices = segments.clamp(3, MAX_SPHERE_SEGMENTS);
    let stacks = (slices / 2).max(2);

    let mut vertices = Vec::with_capacity((slices as usize + 1) * (stacks as usize + 1));
    for stack in 0..=stacks {
        let phi = PI * stack as f32 / stacks as f32;
        let (sin_phi, cos_phi) = phi.sin_cos();
        for slice in 0..=slices {
            let theta = TAU * slice as f32 / slices as f32;
            let (sin_theta, cos_theta) = theta.sin_cos();
            vertices.push(SphereVertex {
                position: [sin_phi * cos_theta, cos_phi, -sin_phi * sin_theta],
            });
        }
    }

    let row = slices + 1;
    let mut indices = Vec::with_capacity(slices as usize * stacks as usize * 6);
    for stack in 0..stacks {
        for slice in 0..slices {
            let a = stack * row + slice;
            let b = a + row;
            if stack != 0 {
                indices.extend_from_slice(&[a, b, a + 1]);
            }
            if stack != stacks - 1 {
                indices.extend_from_slice(&[a + 1, b, b + 1]);
            }
        }
    }

    Mesh { vertices, indices }
}

/// Flat annulus in the XY plane with `segments` quads around, clamped to
/// `3..=MAX_RING_SEGMENTS`.
pub fn annulus(segments: u32) -> Mesh<RingVertex> {
    let segments = segments.clamp(3, MAX_RING_SEGMENTS);
    let mut vertices = Vec::with_capacity((segments as usize + 1) * 2);
    for i in 0..=segments {
        let theta = TAU * i as f32 / segments as f32;
        let (sin, cos) = theta.sin_cos();
        vertices.push(RingVertex {
            direction: [cos, sin],
            edge: 0.0,
        });
        vertices.push(RingVertex {
            direction: [cos, sin],
            edge: 1.0,
        });
    }

    let mut indices = Vec::with_capacity(segments as usize * 6);
    for i in 0..segments {
        let inner = i * 2;
        let outer = inner + 1;
        let next_inner = inner + 2;
        let next_outer = inner + 3;
        indices.extend_from_slice(&[inner, outer, next_inner, next_inner, outer, next_outer]);
    }

    Mesh { vertices, indices }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn test_sphere_vertices_on_unit_sphere() {
        let mesh = uv_sphere(32);
        assert_eq!(mesh.vertices.len(), 33 * 17);
        for v in &mesh.vertices {
            let len = Vec3::from(v.position).length();
            assert!((len - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_sphere_indices_valid_and_outward() {
        let mesh = uv_sphere(16);
        assert_eq!(mesh.indices.len() % 3, 0);
        assert!(mesh.indices.iter().all(|&i| (i as usize) < mesh.vertices.len()));

        for tri in mesh.indices.chunks(3) {
            let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| Vec3::from(mesh.vertices[i as usize].position));
            let normal = (b - a).cross(c - a);
            let centroid = (a + b + c) / 3.0;
            assert!(normal.dot(centroid) > 0.0);
        }
    }

    #[test]
    fn test_annulus() {
        let mesh = annulus(64);
        assert_eq!(mesh.vertices.len(), 130);
        assert_eq!(mesh.indices.len(), 64 * 6);
        assert!(mesh.indices.iter().all(|&i| (i as usize) < mesh.vertices.len()));
        assert_eq!(mesh.vertices[0].edge, 0.0);
        assert_eq!(mesh.vertices[1].edge, 1.0);
    }

    #[test]
    fn test_oversized_segment_counts_are_clamped() {
        let sphere = uv_sphere(100_000);
        let slices = MAX_SPHERE_SEGMENTS as usize;
        assert_eq!(sphere.vertices.len(), (slices + 1) * (slices / 2 + 1));
        assert!(sphere.indices.iter().all(|&i| (i as usize) < sphere.vertices.len()));

        let ring = annulus(u32::MAX);
        assert_eq!(ring.indices.len(), MAX_RING_SEGMENTS as usize * 6);
    }
}
