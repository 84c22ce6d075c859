//! Block geometry
//!
//! A block is a small polygon model (walls, floor tiles, props) that the
//! world places many times. Polygons are convex, listed by vertex index,
//! and grouped into parts that carry the surface settings.

use serde::{Deserialize, Serialize};

use crate::collision::ColMesh;
use crate::math::{Vec2, Vec3};
use crate::rasterizer::{Color, TextureId};

fn default_true() -> bool { true }

/// Surface settings shared by a group of polygons
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockPart {
    pub name: String,
    /// Rendered and collided from both sides
    #[serde(default)]
    pub double_sided: bool,
    #[serde(default)]
    pub texture: Option<TextureId>,
    #[serde(default = "default_white")]
    pub color: Color,
}

fn default_white() -> Color { Color::WHITE }

impl BlockPart {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            double_sided: false,
            texture: None,
            color: Color::WHITE,
        }
    }

    pub fn with_double_sided(mut self, double_sided: bool) -> Self {
        self.double_sided = double_sided;
        self
    }

    pub fn with_texture(mut self, texture: TextureId) -> Self {
        self.texture = Some(texture);
        self
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }
}

/// Convex polygon of a block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockPolygon {
    /// Indices into `BlockGeometry::vertices`
    pub vertices: Vec<usize>,
    pub normal: Vec3,
    /// Index into `BlockGeometry::parts`
    pub part: usize,
    /// Contributes to the collision mesh
    #[serde(default = "default_true")]
    pub solid: bool,
    /// Normalized texture coordinates, one per vertex (empty = untextured)
    #[serde(default)]
    pub uvs: Vec<Vec2>,
}

impl BlockPolygon {
    pub fn new(vertices: Vec<usize>, normal: Vec3, part: usize) -> Self {
        Self {
            vertices,
            normal,
            part,
            solid: true,
            uvs: Vec::new(),
        }
    }

    pub fn with_solid(mut self, solid: bool) -> Self {
        self.solid = solid;
        self
    }

    pub fn with_uvs(mut self, uvs: Vec<Vec2>) -> Self {
        self.uvs = uvs;
        self
    }

    /// Texture coordinate of the i-th vertex
    pub fn uv(&self, i: usize) -> Vec2 {
        self.uvs.get(i).copied().unwrap_or_default()
    }
}

/// Vertices, polygons and parts of one block, in block-local units
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BlockGeometry {
    pub vertices: Vec<Vec3>,
    pub polygons: Vec<BlockPolygon>,
    pub parts: Vec<BlockPart>,
}

// Quad corner UVs: every quad below starts bottom-left and winds
// counter-clockwise seen from the side its normal points to
const QUAD_UVS: [Vec2; 4] = [
    Vec2::new(0.0, 1.0),
    Vec2::new(1.0, 1.0),
    Vec2::new(1.0, 0.0),
    Vec2::new(0.0, 0.0),
];

impl BlockGeometry {
    /// Axis-aligned box with all six faces in `part`
    pub fn cuboid(min: Vec3, max: Vec3, part: BlockPart) -> Self {
        let vertices = vec![
            Vec3::new(min.x, min.y, min.z), // 0
            Vec3::new(max.x, min.y, min.z), // 1
            Vec3::new(max.x, max.y, min.z), // 2
            Vec3::new(min.x, max.y, min.z), // 3
            Vec3::new(min.x, min.y, max.z), // 4
            Vec3::new(max.x, min.y, max.z), // 5
            Vec3::new(max.x, max.y, max.z), // 6
            Vec3::new(min.x, max.y, max.z), // 7
        ];
        let faces: [([usize; 4], Vec3); 6] = [
            ([0, 4, 7, 3], Vec3::new(-1.0, 0.0, 0.0)),
            ([5, 1, 2, 6], Vec3::new(1.0, 0.0, 0.0)),
            ([0, 1, 5, 4], Vec3::new(0.0, -1.0, 0.0)),
            ([3, 7, 6, 2], Vec3::new(0.0, 1.0, 0.0)),
            ([1, 0, 3, 2], Vec3::new(0.0, 0.0, -1.0)),
            ([4, 5, 6, 7], Vec3::new(0.0, 0.0, 1.0)),
        ];
        let polygons = faces
            .iter()
            .map(|(quad, normal)| BlockPolygon::new(quad.to_vec(), *normal, 0).with_uvs(QUAD_UVS.to_vec()))
            .collect();
        Self {
            vertices,
            polygons,
            parts: vec![part],
        }
    }

    /// Single upward-facing quad at height `y`
    pub fn floor_tile(min_x: f32, max_x: f32, y: f32, min_z: f32, max_z: f32, part: BlockPart) -> Self {
        let vertices = vec![
            Vec3::new(min_x, y, max_z),
            Vec3::new(max_x, y, max_z),
            Vec3::new(max_x, y, min_z),
            Vec3::new(min_x, y, min_z),
        ];
        let polygon = BlockPolygon::new(vec![0, 1, 2, 3], Vec3::UP, 0).with_uvs(QUAD_UVS.to_vec());
        Self {
            vertices,
            polygons: vec![polygon],
            parts: vec![part],
        }
    }

    /// Vertical quad in the plane `z = z`, facing -Z (usually double-sided)
    pub fn pane(min_x: f32, max_x: f32, min_y: f32, max_y: f32, z: f32, part: BlockPart) -> Self {
        let vertices = vec![
            Vec3::new(max_x, min_y, z),
            Vec3::new(min_x, min_y, z),
            Vec3::new(min_x, max_y, z),
            Vec3::new(max_x, max_y, z),
        ];
        let polygon = BlockPolygon::new(vec![0, 1, 2, 3], Vec3::new(0.0, 0.0, -1.0), 0)
            .with_uvs(QUAD_UVS.to_vec());
        Self {
            vertices,
            polygons: vec![polygon],
            parts: vec![part],
        }
    }

    /// Two crossed, non-solid, double-sided quads centred on `(cx, cz)`
    pub fn crossed_quads(cx: f32, cz: f32, half_width: f32, height: f32, part: BlockPart) -> Self {
        let part = part.with_double_sided(true);
        let vertices = vec![
            Vec3::new(cx + half_width, 0.0, cz),
            Vec3::new(cx - half_width, 0.0, cz),
            Vec3::new(cx - half_width, height, cz),
            Vec3::new(cx + half_width, height, cz),
            Vec3::new(cx, 0.0, cz + half_width),
            Vec3::new(cx, 0.0, cz - half_width),
            Vec3::new(cx, height, cz - half_width),
            Vec3::new(cx, height, cz + half_width),
        ];
        let polygons = vec![
            BlockPolygon::new(vec![0, 1, 2, 3], Vec3::new(0.0, 0.0, -1.0), 0)
                .with_solid(false)
                .with_uvs(QUAD_UVS.to_vec()),
            BlockPolygon::new(vec![4, 5, 6, 7], Vec3::new(1.0, 0.0, 0.0), 0)
                .with_solid(false)
                .with_uvs(QUAD_UVS.to_vec()),
        ];
        Self {
            vertices,
            polygons,
            parts: vec![part],
        }
    }

    /// Local bounding box of all vertices (zero box when empty)
    pub fn bounds(&self) -> (Vec3, Vec3) {
        let mut iter = self.vertices.iter();
        let Some(first) = iter.next() else {
            return (Vec3::ZERO, Vec3::ZERO);
        };
        iter.fold((*first, *first), |(lo, hi), v| (lo.min(*v), hi.max(*v)))
    }
}

/// How a block collides
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum BlockKind {
    /// Collides with its own solid polygons
    Structural,
    /// Collides as an axis-aligned box, whatever its polygons look like
    Sprite { min: Vec3, max: Vec3 },
}

/// A block definition with its collision mesh, built once at creation
#[derive(Debug, Clone)]
pub struct Block {
    pub name: String,
    pub kind: BlockKind,
    pub geometry: BlockGeometry,
    collision: ColMesh,
}

impl Block {
    pub fn new(name: impl Into<String>, kind: BlockKind, geometry: BlockGeometry) -> Self {
        let collision = match kind {
            BlockKind::Structural => ColMesh::from_geometry(&geometry),
            BlockKind::Sprite { min, max } => ColMesh::from_box(min.x, max.x, min.y, max.y, min.z, max.z),
        };
        Self {
            name: name.into(),
            kind,
            geometry,
            collision,
        }
    }

    pub fn structural(name: impl Into<String>, geometry: BlockGeometry) -> Self {
        Self::new(name, BlockKind::Structural, geometry)
    }

    /// Sprite block whose collision box is the bounds of its geometry
    pub fn sprite(name: impl Into<String>, geometry: BlockGeometry) -> Self {
        let (min, max) = geometry.bounds();
        Self::new(name, BlockKind::Sprite { min, max }, geometry)
    }

    pub fn collision(&self) -> &ColMesh {
        &self.collision
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cuboid_normals_face_out() {
        let g = BlockGeometry::cuboid(Vec3::ZERO, Vec3::new(2.0, 1.0, 3.0), BlockPart::new("box"));
        let centre = Vec3::new(1.0, 0.5, 1.5);
        for poly in &g.polygons {
            let v0 = g.vertices[poly.vertices[0]];
            assert!((v0 - centre).dot(poly.normal) > 0.0);
            // Winding agrees with the stated normal
            let v1 = g.vertices[poly.vertices[1]];
            let v2 = g.vertices[poly.vertices[2]];
            assert!((v1 - v0).cross(v2 - v0).dot(poly.normal) > 0.0);
        }
    }

    #[test]
    fn test_structural_block_collision_mesh() {
        let g = BlockGeometry::cuboid(Vec3::ZERO, Vec3::new(1.0, 1.0, 1.0), BlockPart::new("box"));
        let block = Block::structural("box", g);
        assert_eq!(block.collision().triangles().len(), 12);
        assert_eq!(block.collision().max_box, Vec3::new(1.0, 1.0, 1.0));
    }

    #[test]
    fn test_sprite_block_uses_box() {
        let g = BlockGeometry::crossed_quads(0.5, 0.5, 0.25, 0.75, BlockPart::new("bush"));
        let block = Block::sprite("bush", g);
        // Crossed quads are non-solid; the box stands in for them
        assert_eq!(block.collision().triangles().len(), 12);
        assert_eq!(block.collision().min_box, Vec3::new(0.25, 0.0, 0.25));
        assert_eq!(block.collision().max_box, Vec3::new(0.75, 0.75, 0.75));
        assert!(block.geometry.parts[0].double_sided);
    }

    #[test]
    fn test_bounds_of_empty_geometry() {
        assert_eq!(BlockGeometry::default().bounds(), (Vec3::ZERO, Vec3::ZERO));
    }
}
