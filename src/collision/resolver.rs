//! Character movement resolution
//!
//! Runs once per tick for an entity that wants to move from `old` to
//! `desired`:
//! 1. Ground height: cast rays down the entity's column to find the highest
//!    walkable surface, and step up onto it when it is within reach
//! 2. Broad scan: record every triangle the (step-raised) box overlaps at
//!    the new position, ignoring faces the motion is leaving
//! 3. Reaction: slide along the hit normal(s) with Y reverted, or stop at
//!    the old position when no slide is clean
//!
//! An accepted slide is re-checked with phases 1 and 2; if that still
//! collides, the entity is put back where it started.

use tracing::{debug, trace};

use crate::math::Vec3;
use super::intersect::{aabb_overlap, box_hits_triangle, ray_triangle_poi_with_dot, ColAABox, ColRay};
use super::mesh::{ColMesh, ColPoly3};

/// Most triangles a single broad scan will record
pub const MAX_COLLISIONS: usize = 64;

/// World units per block edge
pub const UNITS_PER_BLOCK: f32 = 256.0;

/// Normals flatter than this in both X and Z have no usable slide direction
const DEGENERATE_NORMAL: f32 = 0.001;

/// Slides shorter than this on both axes count as standing still
const MIN_SLIDE: f32 = 1e-5;

/// A mesh placed in the world. Meshes are owned by their blocks; the
/// resolver only borrows them for the duration of one call.
#[derive(Debug, Clone, Copy)]
pub struct MeshInstance<'a> {
    pub mesh: &'a ColMesh,
    pub offset: Vec3,
}

impl<'a> MeshInstance<'a> {
    pub fn new(mesh: &'a ColMesh, offset: Vec3) -> Self {
        Self { mesh, offset }
    }

    /// World-space bounding box of the whole instance
    #[inline]
    pub fn bounds(&self) -> (Vec3, Vec3) {
        (self.mesh.min_box + self.offset, self.mesh.max_box + self.offset)
    }
}

/// One recorded collision: which instance, which triangle of its mesh
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollisionHit {
    pub mesh: usize,
    pub triangle: usize,
}

/// Fixed-capacity hit list reused across ticks.
///
/// Hits past `MAX_COLLISIONS` are not stored; they are only counted.
#[derive(Debug, Clone)]
pub struct CollisionScratch {
    hits: Vec<CollisionHit>,
    dropped: usize,
}

impl CollisionScratch {
    pub fn new() -> Self {
        Self {
            hits: Vec::with_capacity(MAX_COLLISIONS),
            dropped: 0,
        }
    }

    pub fn clear(&mut self) {
        self.hits.clear();
        self.dropped = 0;
    }

    /// Record a hit. Returns false (and counts the hit as dropped) when full.
    pub fn push(&mut self, hit: CollisionHit) -> bool {
        if self.hits.len() >= MAX_COLLISIONS {
            self.dropped += 1;
            return false;
        }
        self.hits.push(hit);
        true
    }

    pub fn hits(&self) -> &[CollisionHit] {
        &self.hits
    }

    pub fn len(&self) -> usize {
        self.hits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    /// Hits seen after the list filled up
    pub fn dropped(&self) -> usize {
        self.dropped
    }
}

impl Default for CollisionScratch {
    fn default() -> Self {
        Self::new()
    }
}

/// Tunables for the resolver
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ResolverSettings {
    /// Height of one block; also how far below the feet the ground rays reach
    pub units_per_block: f32,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            units_per_block: UNITS_PER_BLOCK,
        }
    }
}

/// Input for one movement check
#[derive(Debug, Clone, Copy)]
pub struct MoveRequest {
    /// Where the entity wants to be this tick
    pub desired: Vec3,
    /// Where it was last tick (known collision-free)
    pub old: Vec3,
    pub bounds: ColAABox,
    /// Tallest ledge the entity climbs without being blocked
    pub max_step_height: f32,
}

/// How the requested move was resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// Nothing in the way (possibly after stepping up)
    Free,
    /// Deflected along a surface
    Slid,
    /// No usable slide; stayed at the old position
    Blocked,
    /// A slide was found but still collided; reverted to the old position
    RolledBack,
}

#[derive(Debug, Clone, Copy)]
pub struct MoveResult {
    pub position: Vec3,
    /// Y of the highest walkable surface under the entity
    pub shadow_height: f32,
    pub outcome: MoveOutcome,
    /// Hits the broad scan saw but could not record
    pub dropped_hits: usize,
}

/// Per-entity collision resolver. Holds the scratch hit list so a tick
/// does not allocate.
#[derive(Debug, Clone, Default)]
pub struct Resolver {
    pub settings: ResolverSettings,
    scratch: CollisionScratch,
    recorded: Vec<CollisionHit>,
}

impl Resolver {
    pub fn new(settings: ResolverSettings) -> Self {
        Self {
            settings,
            scratch: CollisionScratch::new(),
            recorded: Vec::with_capacity(MAX_COLLISIONS),
        }
    }

    /// Hits recorded by the most recent broad scan
    pub fn last_hits(&self) -> &[CollisionHit] {
        self.scratch.hits()
    }

    /// Resolve one tick of movement against the given mesh instances.
    pub fn check_collisions(&mut self, meshes: &[MeshInstance], request: &MoveRequest) -> MoveResult {
        let bounds = request.bounds;
        let step = request.max_step_height;

        // Phase 1: ground height and step up
        let mut position = request.desired;
        let shadow = self.ground_height(meshes, position, &bounds, step);
        let foot = bounds.foot_at(position);
        if shadow > foot {
            trace!(shadow, foot, "stepping up");
            position.y += shadow - foot;
        }

        // Phase 2: broad scan
        let hit_count = self.broad_scan(meshes, position, request.old, &bounds, step);
        let dropped_hits = self.scratch.dropped();
        if dropped_hits > 0 {
            debug!(dropped_hits, "collision list full, extra hits ignored");
        }
        if hit_count == 0 {
            return MoveResult {
                position,
                shadow_height: shadow,
                outcome: MoveOutcome::Free,
                dropped_hits,
            };
        }

        // Phase 3: reaction
        let old = request.old;
        let movement = Vec3::new(position.x - old.x, 0.0, position.z - old.z);
        if movement.x == 0.0 && movement.z == 0.0 {
            debug!(hits = hit_count, "blocked with no horizontal motion");
            return self.stay(meshes, request, MoveOutcome::Blocked, dropped_hits);
        }

        self.recorded.clear();
        self.recorded.extend_from_slice(self.scratch.hits());

        let slide = if self.recorded.len() == 1 {
            let normal = triangle_of(meshes, self.recorded[0]).normal;
            slide_along(normal, movement)
        } else {
            self.multi_slide(meshes, old, &bounds, step, movement)
        };

        let Some(slide) = slide else {
            debug!(hits = hit_count, "no usable slide direction");
            return self.stay(meshes, request, MoveOutcome::Blocked, dropped_hits);
        };

        if slide.x.abs() < MIN_SLIDE && slide.z.abs() < MIN_SLIDE {
            debug!(hits = hit_count, "moving straight into a surface");
            return self.stay(meshes, request, MoveOutcome::Blocked, dropped_hits);
        }

        // Sanity pass: the slid position must itself be clean
        let mut slid = Vec3::new(old.x + slide.x, old.y, old.z + slide.z);
        let shadow = self.ground_height(meshes, slid, &bounds, step);
        let foot = bounds.foot_at(slid);
        if shadow > foot {
            slid.y += shadow - foot;
        }
        if self.broad_scan(meshes, slid, old, &bounds, step) > 0 {
            debug!(?slid, "slide still collides, rolling back");
            return self.stay(meshes, request, MoveOutcome::RolledBack, dropped_hits);
        }

        trace!(?slid, "slide accepted");
        MoveResult {
            position: slid,
            shadow_height: shadow,
            outcome: MoveOutcome::Slid,
            dropped_hits,
        }
    }

    /// Y of the highest walkable surface in the entity's column, or one
    /// block below the entity when nothing is found.
    ///
    /// Surfaces above the feet by more than `max_step_height` are ignored.
    pub fn ground_height(&self, meshes: &[MeshInstance], position: Vec3, bounds: &ColAABox, max_step_height: f32) -> f32 {
        let (min, max) = bounds.bounds_at(position);
        let foot = min.y;
        let top = max.y;
        let bottom = foot - self.settings.units_per_block;
        let reach = foot + max_step_height;

        let column_min = Vec3::new(min.x, bottom, min.z);
        let column_max = Vec3::new(max.x, top, max.z);

        let corners = [
            ColRay::new(Vec3::new(min.x, top, min.z), Vec3::new(min.x, bottom, min.z)),
            ColRay::new(Vec3::new(max.x, top, min.z), Vec3::new(max.x, bottom, min.z)),
            ColRay::new(Vec3::new(max.x, top, max.z), Vec3::new(max.x, bottom, max.z)),
            ColRay::new(Vec3::new(min.x, top, max.z), Vec3::new(min.x, bottom, max.z)),
        ];
        // Catch triangles smaller than the column that fall between the corners
        let centre_x = (min.x + max.x) * 0.5;
        let centre_z = (min.z + max.z) * 0.5;
        let fallback = [
            ColRay::new(Vec3::new(min.x, top, min.z), Vec3::new(max.x, bottom, max.z)),
            ColRay::new(Vec3::new(max.x, top, min.z), Vec3::new(min.x, bottom, max.z)),
            ColRay::new(Vec3::new(centre_x, top, centre_z), Vec3::new(centre_x, bottom, centre_z)),
        ];

        let mut best: Option<f32> = None;
        let mut consider = |y: f32| {
            if y <= reach && best.map_or(true, |b| y > b) {
                best = Some(y);
            }
        };

        for instance in meshes {
            let (inst_min, inst_max) = instance.bounds();
            if !aabb_overlap(column_min, column_max, inst_min, inst_max) {
                continue;
            }
            for tri in instance.mesh.triangles() {
                if !aabb_overlap(column_min, column_max, tri.min + instance.offset, tri.max + instance.offset) {
                    continue;
                }
                let mut any = false;
                for ray in &corners {
                    if let Some(p) = surface_hit(ray, instance, tri) {
                        consider(p.y);
                        any = true;
                    }
                }
                if !any {
                    for ray in &fallback {
                        if let Some(p) = surface_hit(ray, instance, tri) {
                            consider(p.y);
                        }
                    }
                }
            }
        }

        best.unwrap_or(position.y - self.settings.units_per_block)
    }

    /// Record every triangle the step-raised box overlaps at `position`.
    /// Returns the number of hits stored.
    fn broad_scan(&mut self, meshes: &[MeshInstance], position: Vec3, old: Vec3, bounds: &ColAABox, max_step_height: f32) -> usize {
        self.scratch.clear();
        let (min, max) = raised_box(bounds, position, max_step_height);
        let motion = position - old;

        for (mesh_index, instance) in meshes.iter().enumerate() {
            let (inst_min, inst_max) = instance.bounds();
            if !aabb_overlap(min, max, inst_min, inst_max) {
                continue;
            }
            for (tri_index, tri) in instance.mesh.triangles().iter().enumerate() {
                // Faces we are moving away from (or along) cannot block us
                if !tri.double_sided && tri.normal.dot(motion) >= 0.0 {
                    continue;
                }
                if box_hits_triangle(min, max, instance.mesh, tri, instance.offset) {
                    self.scratch.push(CollisionHit { mesh: mesh_index, triangle: tri_index });
                }
            }
        }

        trace!(hits = self.scratch.len(), dropped = self.scratch.dropped(), "broad scan");
        self.scratch.len()
    }

    /// Try each recorded normal in turn, then their average. The first
    /// candidate that overlaps none of the recorded triangles wins.
    fn multi_slide(&self, meshes: &[MeshInstance], old: Vec3, bounds: &ColAABox, step: f32, movement: Vec3) -> Option<Vec3> {
        for hit in &self.recorded {
            let normal = triangle_of(meshes, *hit).normal;
            if let Some(slide) = slide_along(normal, movement) {
                let candidate = Vec3::new(old.x + slide.x, old.y, old.z + slide.z);
                if !self.hits_recorded(meshes, candidate, bounds, step) {
                    return Some(slide);
                }
            }
        }

        let mut sum = Vec3::ZERO;
        for hit in &self.recorded {
            sum += triangle_of(meshes, *hit).normal;
        }
        let average = sum * (1.0 / self.recorded.len() as f32);
        let slide = slide_along(average, movement)?;
        let candidate = Vec3::new(old.x + slide.x, old.y, old.z + slide.z);
        if self.hits_recorded(meshes, candidate, bounds, step) {
            None
        } else {
            Some(slide)
        }
    }

    fn hits_recorded(&self, meshes: &[MeshInstance], position: Vec3, bounds: &ColAABox, step: f32) -> bool {
        let (min, max) = raised_box(bounds, position, step);
        self.recorded.iter().any(|hit| {
            let instance = &meshes[hit.mesh];
            let tri = &instance.mesh.triangles()[hit.triangle];
            box_hits_triangle(min, max, instance.mesh, tri, instance.offset)
        })
    }

    fn stay(&self, meshes: &[MeshInstance], request: &MoveRequest, outcome: MoveOutcome, dropped_hits: usize) -> MoveResult {
        MoveResult {
            position: request.old,
            shadow_height: self.ground_height(meshes, request.old, &request.bounds, request.max_step_height),
            outcome,
            dropped_hits,
        }
    }
}

/// Entity box with its bottom lifted by the step height, so floors and
/// climbable ledges under the feet do not register as walls.
fn raised_box(bounds: &ColAABox, position: Vec3, max_step_height: f32) -> (Vec3, Vec3) {
    let (mut min, max) = bounds.bounds_at(position);
    min.y = (min.y + max_step_height).min(max.y);
    (min, max)
}

fn triangle_of<'a>(meshes: &[MeshInstance<'a>], hit: CollisionHit) -> &'a ColPoly3 {
    let mesh: &'a ColMesh = meshes[hit.mesh].mesh;
    &mesh.triangles()[hit.triangle]
}

/// Downward ray against an upward-facing (or double-sided) triangle
fn surface_hit(ray: &ColRay, instance: &MeshInstance, tri: &ColPoly3) -> Option<Vec3> {
    let dn = ray.dir.dot(tri.normal);
    if dn >= 0.0 && !tri.double_sided {
        return None;
    }
    ray_triangle_poi_with_dot(ray, instance.mesh, tri, instance.offset, dn)
}

/// Remove the component of a horizontal move that points into a surface.
/// `None` when the surface is (nearly) horizontal.
fn slide_along(normal: Vec3, movement: Vec3) -> Option<Vec3> {
    if normal.x.abs() <= DEGENERATE_NORMAL && normal.z.abs() <= DEGENERATE_NORMAL {
        return None;
    }
    let mut n = Vec3::new(normal.x, 0.0, normal.z).normalize();
    let mut into = movement.dot(n);
    // Back face of a double-sided polygon
    if into > 0.0 {
        n = -n;
        into = -into;
    }
    Some(movement - n * into)
}
