//! Ray, box and triangle intersection tests
//!
//! All triangle tests take the owning mesh plus the world offset of the
//! mesh instance; mesh data is never modified.
//!
//! Rays are segments: `dir` spans origin to end, so a hit parameter must
//! land in `[0, 1]`.

use crate::math::Vec3;
use super::mesh::{ColMesh, ColPoly3};

/// Segment with a cached per-component reciprocal of its direction
#[derive(Debug, Clone, Copy)]
pub struct ColRay {
    pub origin: Vec3,
    pub end: Vec3,
    pub dir: Vec3,
    pub inv_dir: Vec3,
}

impl ColRay {
    pub fn new(origin: Vec3, end: Vec3) -> Self {
        let dir = end - origin;
        Self {
            origin,
            end,
            dir,
            inv_dir: dir.recip(),
        }
    }

    /// Point at parameter t (0 = origin, 1 = end)
    #[inline]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.dir * t
    }
}

/// Collision volume of a moving entity, relative to its logical position
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ColAABox {
    /// Half extents
    pub max_dim: Vec3,
    /// Offset from the logical position to the box centre
    pub offs_to_centre: Vec3,
}

impl ColAABox {
    pub fn new(max_dim: Vec3, offs_to_centre: Vec3) -> Self {
        Self { max_dim, offs_to_centre }
    }

    /// World-space (min, max) when the entity stands at `position`
    #[inline]
    pub fn bounds_at(&self, position: Vec3) -> (Vec3, Vec3) {
        let centre = position + self.offs_to_centre;
        (centre - self.max_dim, centre + self.max_dim)
    }

    /// Y of the bottom face when the entity stands at `position`
    #[inline]
    pub fn foot_at(&self, position: Vec3) -> f32 {
        position.y + self.offs_to_centre.y - self.max_dim.y
    }
}

/// Closed-interval overlap of two boxes on all three axes
#[inline]
pub fn aabb_overlap(min_a: Vec3, max_a: Vec3, min_b: Vec3, max_b: Vec3) -> bool {
    min_a.x <= max_b.x && max_a.x >= min_b.x
        && min_a.y <= max_b.y && max_a.y >= min_b.y
        && min_a.z <= max_b.z && max_a.z >= min_b.z
}

#[inline]
fn cross2(a: (f32, f32), b: (f32, f32)) -> f32 {
    a.0 * b.1 - a.1 * b.0
}

/// Is `p` (assumed to lie on the triangle's plane) inside the triangle?
///
/// Works in the 2D projection that drops the triangle's major axis. Each
/// edge's cross product against the point is taken relative to vertex 0:
/// edge 1 reuses `d - edge0` (vertex 1 relative to vertex 0) and edge 2
/// needs no offset at all since `cross(e2, d + e2) == cross(e2, d)`.
/// Signs of zero count as agreeing with either side, so edges are inside.
pub fn point_in_triangle(mesh: &ColMesh, tri: &ColPoly3, offset: Vec3, p: Vec3) -> bool {
    let axis = tri.major_axis;
    let d = axis.project(p - (mesh.vertex(tri, 0) + offset));
    let e0 = axis.project(mesh.edge(tri, 0));
    let e1 = axis.project(mesh.edge(tri, 1));
    let e2 = axis.project(mesh.edge(tri, 2));

    let s0 = cross2(e0, d);
    let s1 = cross2(e1, (d.0 - e0.0, d.1 - e0.1));
    let s2 = cross2(e2, d);

    let has_neg = s0 < 0.0 || s1 < 0.0 || s2 < 0.0;
    let has_pos = s0 > 0.0 || s1 > 0.0 || s2 > 0.0;
    !(has_neg && has_pos)
}

/// Single-sided segment test: only segments that start on (or in front
/// of) the triangle's plane and travel into it can hit.
pub fn ray_hits_triangle(ray: &ColRay, mesh: &ColMesh, tri: &ColPoly3, offset: Vec3) -> bool {
    let n = tri.normal;
    let dist = (mesh.vertex(tri, 0) + offset - ray.origin).dot(n);
    if dist > 0.0 {
        // Origin is behind the plane
        return false;
    }
    let dn = ray.dir.dot(n);
    if dn >= 0.0 {
        return false;
    }
    // Both negative here; |dist| > |dn| means the segment stops short
    if dist < dn {
        return false;
    }
    let p = ray.at(dist / dn);
    point_in_triangle(mesh, tri, offset, p)
}

/// Two-sided segment test producing the point of intersection
pub fn ray_triangle_poi(ray: &ColRay, mesh: &ColMesh, tri: &ColPoly3, offset: Vec3) -> Option<Vec3> {
    let dn = ray.dir.dot(tri.normal);
    ray_triangle_poi_with_dot(ray, mesh, tri, offset, dn)
}

/// As `ray_triangle_poi`, reusing a caller-computed `dot(ray.dir, normal)`
pub fn ray_triangle_poi_with_dot(
    ray: &ColRay,
    mesh: &ColMesh,
    tri: &ColPoly3,
    offset: Vec3,
    dir_dot_normal: f32,
) -> Option<Vec3> {
    if dir_dot_normal == 0.0 {
        return None;
    }
    let dist = (mesh.vertex(tri, 0) + offset - ray.origin).dot(tri.normal);
    let t = dist / dir_dot_normal;
    if !(0.0..=1.0).contains(&t) {
        return None;
    }
    let p = ray.at(t);
    if point_in_triangle(mesh, tri, offset, p) {
        Some(p)
    } else {
        None
    }
}

// Clip code bits, one per box face a point lies outside of
const XNEG: u8 = 0x01;
const XPOS: u8 = 0x02;
const YNEG: u8 = 0x04;
const YPOS: u8 = 0x08;
const ZNEG: u8 = 0x10;
const ZPOS: u8 = 0x20;

/// Box face descriptor: clip bit, axis, and whether it is the max face
struct BoxFace {
    bit: u8,
    axis: usize,
    is_max: bool,
}

const BOX_FACES: [BoxFace; 6] = [
    BoxFace { bit: XNEG, axis: 0, is_max: false },
    BoxFace { bit: XPOS, axis: 0, is_max: true },
    BoxFace { bit: YNEG, axis: 1, is_max: false },
    BoxFace { bit: YPOS, axis: 1, is_max: true },
    BoxFace { bit: ZNEG, axis: 2, is_max: false },
    BoxFace { bit: ZPOS, axis: 2, is_max: true },
];

#[inline]
fn clip_code(p: Vec3, min: Vec3, max: Vec3) -> u8 {
    let mut code = 0;
    if p.x < min.x { code |= XNEG; }
    if p.x > max.x { code |= XPOS; }
    if p.y < min.y { code |= YNEG; }
    if p.y > max.y { code |= YPOS; }
    if p.z < min.z { code |= ZNEG; }
    if p.z > max.z { code |= ZPOS; }
    code
}

/// Does `p` lie within the box on the two axes other than `skip`?
#[inline]
fn within_other_axes(p: Vec3, min: Vec3, max: Vec3, skip: usize) -> bool {
    (0..3).filter(|&a| a != skip).all(|a| {
        let v = p.axis(a);
        v >= min.axis(a) && v <= max.axis(a)
    })
}

/// Does the segment a->b pass through any box face it crosses the plane of?
/// Only faces where exactly one endpoint is outside are candidates.
fn edge_crosses_box(a: Vec3, code_a: u8, b: Vec3, code_b: u8, min: Vec3, max: Vec3) -> bool {
    let crossing = code_a ^ code_b;
    if crossing == 0 {
        return false;
    }
    let d = b - a;
    for face in BOX_FACES.iter().filter(|f| crossing & f.bit != 0) {
        let plane = if face.is_max { max.axis(face.axis) } else { min.axis(face.axis) };
        let t = (plane - a.axis(face.axis)) / d.axis(face.axis);
        let mut p = a + d * t;
        p.set_axis(face.axis, plane);
        if within_other_axes(p, min, max, face.axis) {
            return true;
        }
    }
    false
}

/// Does the world-space box `[min, max]` touch the triangle?
///
/// Cheapest tests first: bounds reject, any vertex inside, all vertices
/// outside one shared face, triangle edges through box faces, and finally
/// the box's 12 edges against the triangle (catches a triangle slicing
/// through the box with every vertex outside it).
pub fn box_hits_triangle(min: Vec3, max: Vec3, mesh: &ColMesh, tri: &ColPoly3, offset: Vec3) -> bool {
    if !aabb_overlap(min, max, tri.min + offset, tri.max + offset) {
        return false;
    }

    let v = [
        mesh.vertex(tri, 0) + offset,
        mesh.vertex(tri, 1) + offset,
        mesh.vertex(tri, 2) + offset,
    ];
    let codes = [
        clip_code(v[0], min, max),
        clip_code(v[1], min, max),
        clip_code(v[2], min, max),
    ];

    if codes.iter().any(|&c| c == 0) {
        return true;
    }
    if codes[0] & codes[1] & codes[2] != 0 {
        return false;
    }

    for j in 0..3 {
        let k = (j + 1) % 3;
        if edge_crosses_box(v[j], codes[j], v[k], codes[k], min, max) {
            return true;
        }
    }

    // The 12 box edges, as 3 axis edges leaving each of 4 alternating corners
    let corners = [
        Vec3::new(min.x, min.y, min.z),
        Vec3::new(max.x, max.y, min.z),
        Vec3::new(max.x, min.y, max.z),
        Vec3::new(min.x, max.y, max.z),
    ];
    for corner in corners {
        for axis in 0..3 {
            let mut end = corner;
            let flipped = if corner.axis(axis) == min.axis(axis) { max.axis(axis) } else { min.axis(axis) };
            end.set_axis(axis, flipped);
            let ray = ColRay::new(corner, end);
            if ray_triangle_poi(&ray, mesh, tri, offset).is_some() {
                return true;
            }
        }
    }

    false
}

/// Segment against an axis-aligned box, entering through a near face.
///
/// Only the faces facing the direction of travel are candidates (one per
/// axis with non-zero direction). A segment starting inside the box has no
/// near face ahead of it and reports no hit.
pub fn ray_against_aabox_poi(ray: &ColRay, min: Vec3, max: Vec3) -> Option<Vec3> {
    for axis in 0..3 {
        let d = ray.dir.axis(axis);
        let plane = if d > 0.0 {
            min.axis(axis)
        } else if d < 0.0 {
            max.axis(axis)
        } else {
            continue;
        };
        let t = (plane - ray.origin.axis(axis)) * ray.inv_dir.axis(axis);
        if !(0.0..=1.0).contains(&t) {
            continue;
        }
        let mut p = ray.at(t);
        p.set_axis(axis, plane);
        if within_other_axes(p, min, max, axis) {
            return Some(p);
        }
    }
    None
}
