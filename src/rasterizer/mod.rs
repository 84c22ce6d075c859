//! Span-buffer software rasterizer
//!
//! Static geometry is drawn front to back into per-scanline span lists, so
//! every pixel is written once for opaque surfaces. Movable geometry is
//! merged into the same lists by depth comparison.
//!
//! # Module Organization
//!
//! - `types` - Color, Texture, Light, RasterSettings, RasterTimings
//! - `camera` - Camera position and orientation
//! - `scan` - Polygon scan conversion into spans
//! - `span` - Span pool and per-row span lists
//! - `render` - Framebuffer and the frame pipeline
//! - `constants` - Screen resolution constants

pub mod camera;
pub mod constants;
pub mod render;
pub mod scan;
pub mod span;
pub mod types;

pub use camera::Camera;
pub use constants::{HEIGHT, NO_SPAN, WIDTH};
pub use render::{FrameStats, Framebuffer, Renderer, SnapshotError};
pub use scan::{scan_polygon, ScreenVertex, SpanStyle};
pub use span::{span_in_front, Span, SpanBuffer, SpanIter, SpanPool, SpanRow};
pub use types::{Color, Light, RasterSettings, RasterTimings, Texture, TextureId};
