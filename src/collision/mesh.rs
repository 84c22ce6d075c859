//! Collision meshes
//!
//! A block's polygons are fan-triangulated into `ColPoly3` triangles that
//! carry everything the hot intersection loops need: edge vectors, a unit
//! normal, a local AABB and the dominant normal axis used to pick the 2D
//! projection for containment tests.
//!
//! Vertices and edge vectors share one packed buffer (edges follow
//! vertices) and triangles live in a second one, so a mesh costs two
//! allocations no matter how many polygons the block has.
//!
//! Fan triangulation from vertex 0 is only correct for convex (or mildly
//! non-convex) polygons. Content relies on that convention, so it is kept.

use tracing::debug;

use crate::math::Vec3;
use crate::world::{BlockGeometry, BlockPolygon};

/// Which normal component dominates; the containment test drops this axis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MajorAxis {
    X,
    Y,
    Z,
}

impl MajorAxis {
    /// Pick the axis with the largest absolute normal component.
    /// Exact ties resolve X before Y before Z.
    pub fn of_normal(n: Vec3) -> Self {
        let ax = n.x.abs();
        let ay = n.y.abs();
        let az = n.z.abs();
        if ax >= ay && ax >= az {
            MajorAxis::X
        } else if ay >= az {
            MajorAxis::Y
        } else {
            MajorAxis::Z
        }
    }

    /// Project a vector onto the plane perpendicular to this axis
    #[inline]
    pub fn project(self, v: Vec3) -> (f32, f32) {
        match self {
            MajorAxis::X => (v.y, v.z),
            MajorAxis::Y => (v.z, v.x),
            MajorAxis::Z => (v.x, v.y),
        }
    }
}

/// Collision triangle
#[derive(Debug, Clone, Copy)]
pub struct ColPoly3 {
    /// Indices into the owning mesh's vertex array
    pub vertex_idx: [usize; 3],
    /// Indices into the owning mesh's edge array; edge j runs from vertex j to vertex j+1
    pub edge_idx: [usize; 3],
    pub normal: Vec3,
    /// Mesh-local bounds
    pub min: Vec3,
    pub max: Vec3,
    pub double_sided: bool,
    pub major_axis: MajorAxis,
}

/// Triangulated collision geometry for one block
#[derive(Debug, Clone)]
pub struct ColMesh {
    /// Vertices followed by edge vectors
    points: Box<[Vec3]>,
    num_vertices: usize,
    triangles: Box<[ColPoly3]>,
    pub min_box: Vec3,
    pub max_box: Vec3,
}

impl ColMesh {
    /// Build from a block's polygons. Only solid polygons contribute
    /// triangles; every block vertex is copied as-is.
    pub fn from_geometry(geometry: &BlockGeometry) -> Self {
        let num_vertices = geometry.vertices.len();
        let usable = |p: &&BlockPolygon| {
            p.solid && p.vertices.len() >= 3 && p.vertices.iter().all(|&i| i < num_vertices)
        };
        let skipped = geometry
            .polygons
            .iter()
            .filter(|p| p.solid && p.vertices.iter().any(|&i| i >= num_vertices))
            .count();
        if skipped > 0 {
            debug!(skipped, "solid polygons with out-of-range vertex indices left out of the collision mesh");
        }

        // Count first so both buffers are allocated once at their final size
        let num_triangles: usize = geometry
            .polygons
            .iter()
            .filter(usable)
            .map(|p| p.vertices.len() - 2)
            .sum();
        let num_edges = num_triangles * 3;

        let mut points = Vec::with_capacity(num_vertices + num_edges);
        points.extend_from_slice(&geometry.vertices);
        let mut triangles = Vec::with_capacity(num_triangles);

        let mut min_box = Vec3::ZERO;
        let mut max_box = Vec3::ZERO;

        for polygon in geometry.polygons.iter().filter(usable) {
            let double_sided = geometry
                .parts
                .get(polygon.part)
                .map(|part| part.double_sided)
                .unwrap_or(false);

            let fan = &polygon.vertices;
            let normal = {
                let n = polygon.normal.normalize();
                if n == Vec3::ZERO {
                    // No usable source normal: take it from the first fan triangle
                    let a = geometry.vertices[fan[0]];
                    let b = geometry.vertices[fan[1]];
                    let c = geometry.vertices[fan[2]];
                    (b - a).cross(c - a).normalize()
                } else {
                    n
                }
            };
            let major_axis = MajorAxis::of_normal(normal);

            for k in 1..fan.len() - 1 {
                let vertex_idx = [fan[0], fan[k], fan[k + 1]];
                let v = [
                    geometry.vertices[vertex_idx[0]],
                    geometry.vertices[vertex_idx[1]],
                    geometry.vertices[vertex_idx[2]],
                ];

                let edge_base = points.len() - num_vertices;
                for j in 0..3 {
                    points.push(v[(j + 1) % 3] - v[j]);
                }

                let min = v[0].min(v[1]).min(v[2]);
                let max = v[0].max(v[1]).max(v[2]);
                if triangles.is_empty() {
                    min_box = min;
                    max_box = max;
                } else {
                    min_box = min_box.min(min);
                    max_box = max_box.max(max);
                }

                triangles.push(ColPoly3 {
                    vertex_idx,
                    edge_idx: [edge_base, edge_base + 1, edge_base + 2],
                    normal,
                    min,
                    max,
                    double_sided,
                    major_axis,
                });
            }
        }

        Self {
            points: points.into_boxed_slice(),
            num_vertices,
            triangles: triangles.into_boxed_slice(),
            min_box,
            max_box,
        }
    }

    /// Build the 8-vertex, 12-triangle box used for sprite blocks.
    /// Face normals are the outward axis directions, not derived from vertices.
    pub fn from_box(min_x: f32, max_x: f32, min_y: f32, max_y: f32, min_z: f32, max_z: f32) -> Self {
        let vertices = [
            Vec3::new(min_x, min_y, min_z), // 0
            Vec3::new(max_x, min_y, min_z), // 1
            Vec3::new(max_x, max_y, min_z), // 2
            Vec3::new(min_x, max_y, min_z), // 3
            Vec3::new(min_x, min_y, max_z), // 4
            Vec3::new(max_x, min_y, max_z), // 5
            Vec3::new(max_x, max_y, max_z), // 6
            Vec3::new(min_x, max_y, max_z), // 7
        ];
        // Quads wound counter-clockwise when seen from outside
        let faces: [([usize; 4], Vec3); 6] = [
            ([0, 4, 7, 3], Vec3::new(-1.0, 0.0, 0.0)),
            ([1, 2, 6, 5], Vec3::new(1.0, 0.0, 0.0)),
            ([0, 1, 5, 4], Vec3::new(0.0, -1.0, 0.0)),
            ([3, 7, 6, 2], Vec3::new(0.0, 1.0, 0.0)),
            ([0, 3, 2, 1], Vec3::new(0.0, 0.0, -1.0)),
            ([4, 5, 6, 7], Vec3::new(0.0, 0.0, 1.0)),
        ];

        let mut points = Vec::with_capacity(8 + 36);
        points.extend_from_slice(&vertices);
        let mut triangles = Vec::with_capacity(12);

        for (quad, normal) in faces.iter() {
            for tri in [[quad[0], quad[1], quad[2]], [quad[0], quad[2], quad[3]]] {
                let v = [vertices[tri[0]], vertices[tri[1]], vertices[tri[2]]];
                let edge_base = points.len() - 8;
                for j in 0..3 {
                    points.push(v[(j + 1) % 3] - v[j]);
                }
                triangles.push(ColPoly3 {
                    vertex_idx: tri,
                    edge_idx: [edge_base, edge_base + 1, edge_base + 2],
                    normal: *normal,
                    min: v[0].min(v[1]).min(v[2]),
                    max: v[0].max(v[1]).max(v[2]),
                    double_sided: false,
                    major_axis: MajorAxis::of_normal(*normal),
                });
            }
        }

        Self {
            points: points.into_boxed_slice(),
            num_vertices: 8,
            triangles: triangles.into_boxed_slice(),
            min_box: Vec3::new(min_x, min_y, min_z),
            max_box: Vec3::new(max_x, max_y, max_z),
        }
    }

    #[inline]
    pub fn vertices(&self) -> &[Vec3] {
        &self.points[..self.num_vertices]
    }

    #[inline]
    pub fn edges(&self) -> &[Vec3] {
        &self.points[self.num_vertices..]
    }

    #[inline]
    pub fn triangles(&self) -> &[ColPoly3] {
        &self.triangles
    }

    #[inline]
    pub fn vertex(&self, tri: &ColPoly3, j: usize) -> Vec3 {
        self.points[tri.vertex_idx[j]]
    }

    #[inline]
    pub fn edge(&self, tri: &ColPoly3, j: usize) -> Vec3 {
        self.points[self.num_vertices + tri.edge_idx[j]]
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }
}
