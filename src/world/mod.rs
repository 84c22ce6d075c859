//! World module - blocks placed on a grid
//!
//! - Block definitions: polygon geometry grouped into parts, plus the
//!   collision mesh built from it once
//! - Placements: world offsets of block instances, static or movable
//! - Active-mesh selection for the collision resolver
//! - ASCII map builder for test and demo worlds

mod geometry;
mod level;

pub use geometry::*;
pub use level::*;
