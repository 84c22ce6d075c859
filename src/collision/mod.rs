//! Collision System
//!
//! Box-vs-polygon collision for characters moving through block geometry.
//! Every block owns a triangulated `ColMesh`; the caller hands the resolver
//! the meshes near the entity together with their world offsets, and gets
//! back a corrected position plus the ground ("shadow") height under it.
//!
//! # Module Organization
//!
//! - `mesh` - Collision mesh builder (polygon fans and sprite boxes)
//! - `intersect` - Ray/box/triangle tests
//! - `resolver` - Per-tick movement resolution (step up, slide, stop)

pub mod intersect;
pub mod mesh;
pub mod resolver;

pub use intersect::{
    aabb_overlap, box_hits_triangle, point_in_triangle, ray_against_aabox_poi,
    ray_hits_triangle, ray_triangle_poi, ray_triangle_poi_with_dot, ColAABox, ColRay,
};
pub use mesh::{ColMesh, ColPoly3, MajorAxis};
pub use resolver::{
    CollisionHit, CollisionScratch, MeshInstance, MoveOutcome, MoveRequest, MoveResult,
    Resolver, ResolverSettings, MAX_COLLISIONS, UNITS_PER_BLOCK,
};
