//! Worlds: block definitions placed on a grid
//!
//! Test and demo worlds are written as ASCII maps, one character per
//! block cell, rows running along +Z and columns along +X:
//!
//! ```text
//! #  wall            .  floor
//! _  low step        g  glass pane (see-through, double-sided)
//! s  sprite prop     m  movable crate
//! @  floor + spawn      (space) nothing
//! ```

use tracing::debug;

use super::geometry::{Block, BlockGeometry, BlockPart};
use crate::collision::{MeshInstance, UNITS_PER_BLOCK};
use crate::math::Vec3;
use crate::rasterizer::{Color, Texture, TextureId};

/// Validation limits for map text
pub mod limits {
    /// Maximum cells along either axis
    pub const MAX_MAP_SIZE: usize = 256;
    /// Largest accepted block size in world units
    pub const MAX_UNITS_PER_BLOCK: f32 = 65_536.0;
}

/// Small walled room exercising every map symbol
pub const DEMO_MAP: &str = "\
##########
#........#
#..s..m..#
#........#
#__....g.#
#..@.....#
#.....####
#........#
##########";

#[derive(Debug, thiserror::Error)]
pub enum LevelError {
    #[error("map has no cells")]
    Empty,
    #[error("map too large ({width}x{depth}, limit {max})")]
    TooLarge { width: usize, depth: usize, max: usize },
    #[error("unknown map symbol {symbol:?} at row {row}, column {col}")]
    UnknownSymbol { symbol: char, row: usize, col: usize },
    #[error("invalid units per block: {0}")]
    InvalidScale(f32),
}

/// One instance of a block in the world
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    /// Index into `World::blocks`
    pub block: usize,
    pub offset: Vec3,
    /// Moves at runtime; drawn through the depth-sorted span path
    pub movable: bool,
}

#[derive(Debug, Clone)]
pub struct World {
    pub blocks: Vec<Block>,
    pub placements: Vec<Placement>,
    pub textures: Vec<Texture>,
    pub units_per_block: f32,
    /// Where a viewer starts (feet position)
    pub spawn: Vec3,
}

impl World {
    pub fn new(units_per_block: f32) -> Self {
        Self {
            blocks: Vec::new(),
            placements: Vec::new(),
            textures: Vec::new(),
            units_per_block,
            spawn: Vec3::ZERO,
        }
    }

    pub fn add_block(&mut self, block: Block) -> usize {
        self.blocks.push(block);
        self.blocks.len() - 1
    }

    pub fn add_texture(&mut self, texture: Texture) -> TextureId {
        self.textures.push(texture);
        self.textures.len() - 1
    }

    pub fn place(&mut self, block: usize, offset: Vec3, movable: bool) -> usize {
        self.placements.push(Placement { block, offset, movable });
        self.placements.len() - 1
    }

    /// Move a placement. Returns false for an unknown index.
    pub fn set_offset(&mut self, placement: usize, offset: Vec3) -> bool {
        match self.placements.get_mut(placement) {
            Some(p) => {
                p.offset = offset;
                true
            }
            None => false,
        }
    }

    /// World-space collision bounds of a placement, or `None` when it names
    /// a block the world does not have
    pub fn placement_bounds(&self, placement: &Placement) -> Option<(Vec3, Vec3)> {
        let mesh = self.blocks.get(placement.block)?.collision();
        Some((mesh.min_box + placement.offset, mesh.max_box + placement.offset))
    }

    /// Collect the collision meshes whose bounds come within `radius` of
    /// `centre`. `out` is cleared first so callers can reuse it per tick.
    /// Placements of unknown blocks are skipped.
    pub fn active_meshes<'a>(&'a self, centre: Vec3, radius: f32, out: &mut Vec<MeshInstance<'a>>) {
        out.clear();
        let r2 = radius * radius;
        for placement in &self.placements {
            let Some(block) = self.blocks.get(placement.block) else {
                continue;
            };
            let mesh = block.collision();
            if mesh.is_empty() {
                continue;
            }
            let min = mesh.min_box + placement.offset;
            let max = mesh.max_box + placement.offset;
            // Distance from the centre to the nearest point of the box
            let nearest = centre.max(min).min(max);
            let d = centre - nearest;
            if d.dot(d) <= r2 {
                out.push(MeshInstance::new(mesh, placement.offset));
            }
        }
    }

    /// Build a world from an ASCII map (see the module docs for symbols).
    pub fn from_ascii(map: &str, units_per_block: f32) -> Result<World, LevelError> {
        if !units_per_block.is_finite()
            || units_per_block <= 0.0
            || units_per_block > limits::MAX_UNITS_PER_BLOCK
        {
            return Err(LevelError::InvalidScale(units_per_block));
        }

        let rows: Vec<&str> = map.lines().collect();
        let depth = rows.len();
        let width = rows.iter().map(|r| r.chars().count()).max().unwrap_or(0);
        if depth == 0 || width == 0 {
            return Err(LevelError::Empty);
        }
        if depth > limits::MAX_MAP_SIZE || width > limits::MAX_MAP_SIZE {
            return Err(LevelError::TooLarge { width, depth, max: limits::MAX_MAP_SIZE });
        }

        let u = units_per_block;
        let mut world = World::new(u);
        let kit = BlockKit::install(&mut world);
        let mut spawn = None;

        for (row, line) in rows.iter().enumerate() {
            for (col, symbol) in line.chars().enumerate() {
                let offset = Vec3::new(col as f32 * u, 0.0, row as f32 * u);
                match symbol {
                    ' ' => {}
                    '.' => {
                        world.place(kit.floor, offset, false);
                    }
                    '#' => {
                        world.place(kit.wall, offset, false);
                    }
                    '_' => {
                        world.place(kit.step, offset, false);
                    }
                    'g' => {
                        world.place(kit.floor, offset, false);
                        world.place(kit.glass, offset, false);
                    }
                    's' => {
                        world.place(kit.floor, offset, false);
                        world.place(kit.sprite, offset, false);
                    }
                    'm' => {
                        world.place(kit.floor, offset, false);
                        world.place(kit.crate_block, offset, true);
                    }
                    '@' => {
                        world.place(kit.floor, offset, false);
                        spawn = Some(offset + Vec3::new(u * 0.5, 0.0, u * 0.5));
                    }
                    _ => return Err(LevelError::UnknownSymbol { symbol, row, col }),
                }
            }
        }

        world.spawn = spawn.unwrap_or_else(|| first_floor_centre(&world, kit.floor, u));
        debug!(
            width,
            depth,
            placements = world.placements.len(),
            "built world from map"
        );
        Ok(world)
    }

    /// The demo map at the default block size
    pub fn demo() -> Result<World, LevelError> {
        Self::from_ascii(DEMO_MAP, UNITS_PER_BLOCK)
    }
}

fn first_floor_centre(world: &World, floor: usize, u: f32) -> Vec3 {
    world
        .placements
        .iter()
        .find(|p| p.block == floor)
        .map(|p| p.offset + Vec3::new(u * 0.5, 0.0, u * 0.5))
        .unwrap_or(Vec3::ZERO)
}

/// Block indices for the map symbols
struct BlockKit {
    floor: usize,
    wall: usize,
    step: usize,
    glass: usize,
    sprite: usize,
    crate_block: usize,
}

impl BlockKit {
    fn install(world: &mut World) -> Self {
        let u = world.units_per_block;

        let floor_tex = world.add_texture(Texture::checkerboard(32, 32, Color::new(150, 140, 120), Color::new(110, 100, 90)));
        let brick_tex = world.add_texture(Texture::bricks(32, 32, Color::new(90, 90, 90), Color::new(160, 80, 60)));
        let glass_tex = world.add_texture(Texture::lattice(32, 32, Color::new(180, 200, 220), 8));
        let leaf_tex = world.add_texture(Texture::lattice(16, 16, Color::new(60, 140, 60), 3));
        let crate_tex = world.add_texture(Texture::checkerboard(16, 16, Color::new(170, 130, 70), Color::new(130, 95, 50)));

        let floor = world.add_block(Block::structural(
            "floor",
            BlockGeometry::floor_tile(0.0, u, 0.0, 0.0, u, BlockPart::new("floor").with_texture(floor_tex)),
        ));
        let wall = world.add_block(Block::structural(
            "wall",
            BlockGeometry::cuboid(Vec3::ZERO, Vec3::new(u, u, u), BlockPart::new("brick").with_texture(brick_tex)),
        ));
        let step = world.add_block(Block::structural(
            "step",
            BlockGeometry::cuboid(
                Vec3::ZERO,
                Vec3::new(u, u * 0.25, u),
                BlockPart::new("step").with_texture(floor_tex).with_color(Color::GREY),
            ),
        ));
        let glass = world.add_block(Block::structural(
            "glass",
            BlockGeometry::pane(
                0.0,
                u,
                0.0,
                u,
                u * 0.5,
                BlockPart::new("glass").with_texture(glass_tex).with_double_sided(true),
            ),
        ));
        let sprite = world.add_block(Block::sprite(
            "bush",
            BlockGeometry::crossed_quads(u * 0.5, u * 0.5, u * 0.25, u * 0.5, BlockPart::new("leaves").with_texture(leaf_tex)),
        ));
        let crate_block = world.add_block(Block::structural(
            "crate",
            BlockGeometry::cuboid(
                Vec3::new(u * 0.25, 0.0, u * 0.25),
                Vec3::new(u * 0.75, u * 0.5, u * 0.75),
                BlockPart::new("crate").with_texture(crate_tex),
            ),
        ));

        Self { floor, wall, step, glass, sprite, crate_block }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_map_builds() {
        let world = World::demo().unwrap();
        assert_eq!(world.units_per_block, UNITS_PER_BLOCK);
        assert_eq!(world.textures.len(), 5);
        assert!(world.placements.iter().any(|p| p.movable));
        // '@' is in row 5, column 3
        assert_eq!(world.spawn, Vec3::new(3.5 * UNITS_PER_BLOCK, 0.0, 5.5 * UNITS_PER_BLOCK));
    }

    #[test]
    fn test_unknown_symbol() {
        let err = World::from_ascii("..\n.x", 1.0).unwrap_err();
        match err {
            LevelError::UnknownSymbol { symbol, row, col } => {
                assert_eq!((symbol, row, col), ('x', 1, 1));
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_rejects_empty_and_bad_scale() {
        assert!(matches!(World::from_ascii("", 1.0), Err(LevelError::Empty)));
        assert!(matches!(World::from_ascii("..", 0.0), Err(LevelError::InvalidScale(_))));
        assert!(matches!(World::from_ascii("..", f32::NAN), Err(LevelError::InvalidScale(_))));
        let wide = ".".repeat(limits::MAX_MAP_SIZE + 1);
        assert!(matches!(World::from_ascii(&wide, 1.0), Err(LevelError::TooLarge { .. })));
    }

    #[test]
    fn test_spawn_defaults_to_first_floor() {
        let world = World::from_ascii("#.\n..", 2.0).unwrap();
        assert_eq!(world.spawn, Vec3::new(3.0, 0.0, 1.0));
    }

    #[test]
    fn test_active_meshes_by_distance() {
        let world = World::from_ascii("#...#", 1.0).unwrap();
        let mut active = Vec::new();
        // Centre of the middle cell, reaching half a cell: just the floor under it
        world.active_meshes(Vec3::new(2.5, 0.5, 0.5), 0.6, &mut active);
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].offset, Vec3::new(2.0, 0.0, 0.0));

        world.active_meshes(Vec3::new(2.5, 0.5, 0.5), 10.0, &mut active);
        assert_eq!(active.len(), 5);
    }

    #[test]
    fn test_set_offset() {
        let mut world = World::from_ascii("m", 1.0).unwrap();
        let crate_index = world.placements.iter().position(|p| p.movable).unwrap();
        assert!(world.set_offset(crate_index, Vec3::new(3.0, 0.0, 0.0)));
        assert!(!world.set_offset(99, Vec3::ZERO));
        let (min, _) = world.placement_bounds(&world.placements[crate_index]).unwrap();
        assert_eq!(min, Vec3::new(3.25, 0.0, 0.25));
    }

    #[test]
    fn test_placement_of_unknown_block_skipped() {
        let mut world = World::from_ascii("..", 1.0).unwrap();
        let stray = world.place(world.blocks.len() + 3, Vec3::ZERO, false);
        assert_eq!(world.placement_bounds(&world.placements[stray]), None);

        let mut active = Vec::new();
        world.active_meshes(Vec3::new(1.0, 0.5, 0.5), 10.0, &mut active);
        assert_eq!(active.len(), 2);
    }
}
