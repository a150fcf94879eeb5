// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Boolean solid subtraction
//!
//! The subtraction engine sits behind [`SolidSubtractor`] so callers never
//! touch csgrs directly. [`CsgSubtractor`] is the BSP implementation.

use crate::error::{Error, Result};
use crate::mesh::Mesh;
use crate::triangulation::{polygon_normal, project_to_2d, triangulate_polygon};
use nalgebra::{Point3, Vector3};
use smallvec::SmallVec;

/// Subtract solid `cutter` from solid `host`, yielding a renderable mesh
pub trait SolidSubtractor {
    fn subtract(&self, host: &Mesh, cutter: &Mesh) -> Result<Mesh>;
}

/// BSP subtraction backed by csgrs
#[derive(Debug, Clone, Copy, Default)]
pub struct CsgSubtractor;

impl CsgSubtractor {
    pub fn new() -> Self {
        Self
    }

    /// Convert our Mesh format to csgrs Mesh format
    fn mesh_to_csgrs(mesh: &Mesh) -> csgrs::mesh::Mesh<()> {
        use csgrs::mesh::{polygon::Polygon, vertex::Vertex, Mesh as CSGMesh};
        use std::sync::OnceLock;

        if mesh.is_empty() {
            return CSGMesh {
                polygons: Vec::new(),
                bounding_box: OnceLock::new(),
                metadata: None,
            };
        }

        let polygons: Vec<Polygon<()>> = mesh
            .triangles()
            .filter_map(|[v0, v1, v2]| {
                // Degenerate triangles would poison the BSP planes with NaN
                let face_normal = (v1 - v0).cross(&(v2 - v0)).try_normalize(1e-10)?;
                Some(Polygon::new(
                    vec![
                        Vertex::new(v0, face_normal),
                        Vertex::new(v1, face_normal),
                        Vertex::new(v2, face_normal),
                    ],
                    None,
                ))
            })
            .collect();

        CSGMesh::from_polygons(&polygons, None)
    }

    /// Convert csgrs Mesh format back to our Mesh format
    fn csgrs_to_mesh(csg_mesh: &csgrs::mesh::Mesh<()>) -> Mesh {
        let mut mesh = Mesh::new();

        for polygon in &csg_mesh.polygons {
            let vertices = &polygon.vertices;
            if vertices.len() < 3 {
                continue;
            }

            let points: SmallVec<[Point3<f64>; 8]> = vertices.iter().map(|v| v.pos).collect();

            let normal = match vertices[0].normal.try_normalize(1e-10) {
                Some(n) if n.iter().all(|c| c.is_finite()) => n,
                _ => match polygon_normal(&points) {
                    Some(n) => n,
                    None => continue,
                },
            };

            let indices = if points.len() == 3 {
                vec![0, 1, 2]
            } else {
                match triangulate_polygon(&project_to_2d(&points, &normal)) {
                    Ok(indices) => indices,
                    Err(_) => continue,
                }
            };

            let base = mesh.vertex_count() as u32;
            for p in &points {
                mesh.add_vertex(*p, normal);
            }
            for tri in indices.chunks_exact(3) {
                let (a, b, c) = (points[tri[0]], points[tri[1]], points[tri[2]]);
                // Keep the winding consistent with the polygon plane
                if (b - a).cross(&(c - a)).dot(&normal) >= 0.0 {
                    mesh.add_triangle(base + tri[0] as u32, base + tri[1] as u32, base + tri[2] as u32);
                } else {
                    mesh.add_triangle(base + tri[0] as u32, base + tri[2] as u32, base + tri[1] as u32);
                }
            }
        }

        mesh
    }
}

impl SolidSubtractor for CsgSubtractor {
    fn subtract(&self, host: &Mesh, cutter: &Mesh) -> Result<Mesh> {
        use csgrs::traits::CSG;

        if host.is_empty() {
            return Err(Error::EmptyMesh("host solid has no geometry".to_string()));
        }
        if cutter.is_empty() {
            return Ok(host.clone());
        }
        if !host.is_finite() || !cutter.is_finite() {
            return Err(Error::CsgError("non-finite vertex in operand".to_string()));
        }

        let host_csg = Self::mesh_to_csgrs(host);
        let cutter_csg = Self::mesh_to_csgrs(cutter);
        let result = Self::csgrs_to_mesh(&host_csg.difference(&cutter_csg));

        if result.is_empty() {
            return Err(Error::EmptyMesh(
                "subtraction consumed the whole host solid".to_string(),
            ));
        }
        Ok(result)
    }
}

/// Recompute smooth vertex normals from the triangle faces
pub fn calculate_normals(mesh: &mut Mesh) {
    let vertex_count = mesh.vertex_count();
    if vertex_count == 0 {
        return;
    }

    let mut normals = vec![Vector3::<f64>::zeros(); vertex_count];

    for tri in mesh.indices.chunks_exact(3) {
        let (i0, i1, i2) = (tri[0] as usize, tri[1] as usize, tri[2] as usize);
        let v0 = mesh.vertex(i0);
        let face = (mesh.vertex(i1) - v0).cross(&(mesh.vertex(i2) - v0));

        normals[i0] += face;
        normals[i1] += face;
        normals[i2] += face;
    }

    mesh.normals.clear();
    mesh.normals.reserve(vertex_count * 3);
    for normal in normals {
        // Unreferenced or degenerate vertices fall back to up
        let n = normal.try_normalize(1e-12).unwrap_or_else(Vector3::y);
        mesh.normals.push(n.x as f32);
        mesh.normals.push(n.y as f32);
        mesh.normals.push(n.z as f32);
    }
}
