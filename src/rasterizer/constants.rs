//! Rasterizer constants
//!
//! Screen resolution and other fundamental constants.

/// Default framebuffer width
pub const WIDTH: usize = 320;

/// Default framebuffer height
pub const HEIGHT: usize = 240;

/// Sentinel "no span" link in the span pool
pub const NO_SPAN: u32 = u32::MAX;
