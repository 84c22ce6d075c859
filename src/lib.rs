//! blockscape: core of a block-world viewer
//!
//! - Box and polygon collision with step-up and wall sliding
//! - Span-buffer software rasterizer: static geometry front to back,
//!   movable geometry merged by depth, see-through textures back to front
//! - Worlds built from block definitions placed on a grid

/// Version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod collision;
pub mod config;
pub mod math;
pub mod rasterizer;
pub mod world;
