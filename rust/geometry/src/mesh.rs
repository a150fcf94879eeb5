// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Mesh data structures

use nalgebra::{Isometry3, Point3, Vector3};

/// Triangle mesh in the layout renderers upload directly
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    /// Vertex positions (x, y, z)
    pub positions: Vec<f32>,
    /// Vertex normals (nx, ny, nz)
    pub normals: Vec<f32>,
    /// Triangle indices (i0, i1, i2)
    pub indices: Vec<u32>,
}

impl Mesh {
    /// Create a new empty mesh
    pub fn new() -> Self {
        Self {
            positions: Vec::new(),
            normals: Vec::new(),
            indices: Vec::new(),
        }
    }

    /// Create a mesh with capacity
    pub fn with_capacity(vertex_count: usize, index_count: usize) -> Self {
        Self {
            positions: Vec::with_capacity(vertex_count * 3),
            normals: Vec::with_capacity(vertex_count * 3),
            indices: Vec::with_capacity(index_count),
        }
    }

    /// Add a vertex with normal
    #[inline]
    pub fn add_vertex(&mut self, position: Point3<f64>, normal: Vector3<f64>) {
        self.positions.push(position.x as f32);
        self.positions.push(position.y as f32);
        self.positions.push(position.z as f32);

        self.normals.push(normal.x as f32);
        self.normals.push(normal.y as f32);
        self.normals.push(normal.z as f32);
    }

    /// Add a triangle
    #[inline]
    pub fn add_triangle(&mut self, i0: u32, i1: u32, i2: u32) {
        self.indices.push(i0);
        self.indices.push(i1);
        self.indices.push(i2);
    }

    /// Add a flat-shaded triangle whose winding faces `facing`.
    ///
    /// The vertex order is swapped when the geometric normal points away from
    /// `facing`, so callers only need to know which side is outside.
    pub fn add_facing_triangle(
        &mut self,
        a: Point3<f64>,
        b: Point3<f64>,
        c: Point3<f64>,
        facing: &Vector3<f64>,
    ) {
        let geometric = (b - a).cross(&(c - a));
        let (b, c) = if geometric.dot(facing) < 0.0 { (c, b) } else { (b, c) };
        let normal = facing.try_normalize(1e-12).unwrap_or_else(Vector3::y);

        let base = self.vertex_count() as u32;
        self.add_vertex(a, normal);
        self.add_vertex(b, normal);
        self.add_vertex(c, normal);
        self.add_triangle(base, base + 1, base + 2);
    }

    /// Add a planar quad (`a b c d` in perimeter order) facing `facing`
    pub fn add_facing_quad(
        &mut self,
        corners: [Point3<f64>; 4],
        facing: &Vector3<f64>,
    ) {
        let [a, b, c, d] = corners;
        self.add_facing_triangle(a, b, c, facing);
        self.add_facing_triangle(a, c, d, facing);
    }

    /// Position of vertex `i` in f64
    #[inline]
    pub fn vertex(&self, i: usize) -> Point3<f64> {
        Point3::new(
            self.positions[i * 3] as f64,
            self.positions[i * 3 + 1] as f64,
            self.positions[i * 3 + 2] as f64,
        )
    }

    /// Iterate triangles as vertex position triples
    pub fn triangles(&self) -> impl Iterator<Item = [Point3<f64>; 3]> + '_ {
        self.indices.chunks_exact(3).map(move |tri| {
            [
                self.vertex(tri[0] as usize),
                self.vertex(tri[1] as usize),
                self.vertex(tri[2] as usize),
            ]
        })
    }


    /// Apply a rigid transform in place (positions and normals)
    pub fn apply_isometry(&mut self, isometry: &Isometry3<f64>) {
        self.positions.chunks_exact_mut(3).for_each(|chunk| {
            let point = Point3::new(chunk[0] as f64, chunk[1] as f64, chunk[2] as f64);
            let moved = isometry.transform_point(&point);
            chunk[0] = moved.x as f32;
            chunk[1] = moved.y as f32;
            chunk[2] = moved.z as f32;
        });

        self.normals.chunks_exact_mut(3).for_each(|chunk| {
            let normal = Vector3::new(chunk[0] as f64, chunk[1] as f64, chunk[2] as f64);
            let rotated = isometry.transform_vector(&normal);
            chunk[0] = rotated.x as f32;
            chunk[1] = rotated.y as f32;
            chunk[2] = rotated.z as f32;
        });
    }

    /// Return a copy moved by `isometry`
    pub fn transformed(&self, isometry: &Isometry3<f64>) -> Mesh {
        let mut mesh = self.clone();
        mesh.apply_isometry(isometry);
        mesh
    }

    /// Get vertex count
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    /// Get triangle count
    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Check if mesh is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Calculate bounds (min, max)
    #[inline]
    pub fn bounds(&self) -> (Point3<f32>, Point3<f32>) {
        if self.is_empty() {
            return (Point3::origin(), Point3::origin());
        }

        let mut min = Point3::new(f32::MAX, f32::MAX, f32::MAX);
        let mut max = Point3::new(f32::MIN, f32::MIN, f32::MIN);

        self.positions.chunks_exact(3).for_each(|chunk| {
            let (x, y, z) = (chunk[0], chunk[1], chunk[2]);
            min.x = min.x.min(x);
            min.y = min.y.min(y);
            min.z = min.z.min(z);
            max.x = max.x.max(x);
            max.y = max.y.max(y);
            max.z = max.z.max(z);
        });

        (min, max)
    }

    /// True when every position and normal is finite
    pub fn is_finite(&self) -> bool {
        self.positions.iter().all(|v| v.is_finite()) && self.normals.iter().all(|v| v.is_finite())
    }

    /// Clear the mesh
    #[inline]
    pub fn clear(&mut self) {
        self.positions.clear();
        self.normals.clear();
        self.indices.clear();
    }
}

impl Default for Mesh {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::{Translation3, UnitQuaternion};

    #[test]
    fn test_mesh_creation() {
        let mesh = Mesh::new();
        assert!(mesh.is_empty());
        assert_eq!(mesh.vertex_count(), 0);
        assert_eq!(mesh.triangle_count(), 0);
    }

    #[test]
    fn test_add_vertex() {
        let mut mesh = Mesh::new();
        mesh.add_vertex(Point3::new(1.0, 2.0, 3.0), Vector3::new(0.0, 0.0, 1.0));
        assert_eq!(mesh.vertex_count(), 1);
        assert_eq!(mesh.positions, vec![1.0, 2.0, 3.0]);
        assert_eq!(mesh.normals, vec![0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_facing_triangle_flips_winding() {
        let mut mesh = Mesh::new();
        // Counter-clockwise in (x, z) produces a -Y geometric normal
        mesh.add_facing_triangle(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 0.0, 1.0),
            &Vector3::y(),
        );

        let [a, b, c] = mesh.triangles().next().unwrap();
        let normal = (b - a).cross(&(c - a));
        assert!(normal.y > 0.0);
    }

    #[test]
    fn test_apply_isometry() {
        let mut mesh = Mesh::new();
        mesh.add_vertex(Point3::new(1.0, 0.0, 0.0), Vector3::x());

        let iso = Isometry3::from_parts(
            Translation3::new(0.0, 5.0, 0.0),
            UnitQuaternion::from_axis_angle(&Vector3::y_axis(), std::f64::consts::FRAC_PI_2),
        );
        mesh.apply_isometry(&iso);

        let p = mesh.vertex(0);
        assert!((p.x - 0.0).abs() < 1e-6);
        assert!((p.y - 5.0).abs() < 1e-6);
        assert!((p.z + 1.0).abs() < 1e-6);
        assert!((mesh.normals[2] + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_bounds() {
        let mut mesh = Mesh::new();
        mesh.add_vertex(Point3::new(-1.0, 0.0, 2.0), Vector3::y());
        mesh.add_vertex(Point3::new(3.0, -2.0, 0.5), Vector3::y());

        let (min, max) = mesh.bounds();
        assert_eq!(min, Point3::new(-1.0, -2.0, 0.5));
        assert_eq!(max, Point3::new(3.0, 0.0, 2.0));
    }
}
