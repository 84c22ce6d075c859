//! Core rasterizer types: colors, palettized textures, lighting, settings

use serde::{Deserialize, Serialize};

use crate::math::Vec3;

/// Index into the world's texture list
pub type TextureId = usize;

/// 8-bit RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color { r: 0, g: 0, b: 0 };
    pub const WHITE: Color = Color { r: 255, g: 255, b: 255 };
    pub const GREY: Color = Color { r: 128, g: 128, b: 128 };

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Apply shading (multiply by intensity 0.0-1.0)
    pub fn shade(self, intensity: f32) -> Self {
        let i = intensity.clamp(0.0, 1.0);
        Self {
            r: (self.r as f32 * i) as u8,
            g: (self.g as f32 * i) as u8,
            b: (self.b as f32 * i) as u8,
        }
    }

    /// Tint by another color: `(self * tint) / 255` per channel
    pub fn modulate(self, tint: Color) -> Self {
        Self {
            r: ((self.r as u16 * tint.r as u16) / 255) as u8,
            g: ((self.g as u16 * tint.g as u16) / 255) as u8,
            b: ((self.b as u16 * tint.b as u16) / 255) as u8,
        }
    }

    /// RGBA bytes for the framebuffer (always opaque)
    pub fn to_bytes(self) -> [u8; 4] {
        [self.r, self.g, self.b, 255]
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

/// Palettized texture.
///
/// Texels are palette indices; one index may be reserved as "see-through",
/// which is what makes a polygon's spans go on the transparent list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Texture {
    pub width: usize,
    pub height: usize,
    pub indices: Vec<u8>,
    pub palette: Vec<Color>,
    /// Texels with this index are skipped when filling
    pub transparent_index: Option<u8>,
    pub name: String,
}

impl Texture {
    /// Create a texture filled with palette index 0
    pub fn new(width: usize, height: usize, palette: Vec<Color>, name: impl Into<String>) -> Self {
        Self {
            width,
            height,
            indices: vec![0; width * height],
            palette,
            transparent_index: None,
            name: name.into(),
        }
    }

    pub fn with_transparent_index(mut self, index: u8) -> Self {
        self.transparent_index = Some(index);
        self
    }

    /// Does any texel use the see-through index?
    pub fn has_transparency(&self) -> bool {
        match self.transparent_index {
            Some(t) => self.indices.iter().any(|&i| i == t),
            None => false,
        }
    }

    /// Palette index at normalized UV (wrapping, no filtering)
    #[inline]
    pub fn sample_index(&self, u: f32, v: f32) -> u8 {
        let u_wrapped = u.rem_euclid(1.0);
        let v_wrapped = v.rem_euclid(1.0);
        let tx = ((u_wrapped * self.width as f32) as usize).min(self.width.saturating_sub(1));
        let ty = ((v_wrapped * self.height as f32) as usize).min(self.height.saturating_sub(1));
        self.indices.get(ty * self.width + tx).copied().unwrap_or(0)
    }

    /// Color at normalized UV, or `None` for a see-through texel
    #[inline]
    pub fn sample(&self, u: f32, v: f32) -> Option<Color> {
        let index = self.sample_index(u, v);
        if self.transparent_index == Some(index) {
            return None;
        }
        Some(self.palette.get(index as usize).copied().unwrap_or(Color::BLACK))
    }

    pub fn set_index(&mut self, x: usize, y: usize, index: u8) {
        if x < self.width && y < self.height {
            self.indices[y * self.width + x] = index;
        }
    }

    /// Two-color checkerboard with 8-texel squares
    pub fn checkerboard(width: usize, height: usize, color1: Color, color2: Color) -> Self {
        let mut tex = Self::new(width, height, vec![color1, color2], "checkerboard");
        for y in 0..height {
            for x in 0..width {
                let index = if ((x / 8) + (y / 8)) % 2 == 0 { 0 } else { 1 };
                tex.set_index(x, y, index);
            }
        }
        tex
    }

    /// Running-bond brick pattern: index 0 is mortar, 1 and 2 alternate bricks
    pub fn bricks(width: usize, height: usize, mortar: Color, brick: Color) -> Self {
        let brick_dark = brick.shade(0.8);
        let mut tex = Self::new(width, height, vec![mortar, brick, brick_dark], "bricks");
        let course = (height / 4).max(2);
        let brick_len = (width / 2).max(2);
        for y in 0..height {
            let row = y / course;
            let shift = if row % 2 == 0 { 0 } else { brick_len / 2 };
            for x in 0..width {
                let bx = (x + shift) % brick_len;
                let index = if y % course == 0 || bx == 0 {
                    0
                } else if ((x + shift) / brick_len + row) % 2 == 0 {
                    1
                } else {
                    2
                };
                tex.set_index(x, y, index);
            }
        }
        tex
    }

    /// Grid of bars with see-through cells between them (windows, fences)
    pub fn lattice(width: usize, height: usize, bar: Color, spacing: usize) -> Self {
        let spacing = spacing.max(2);
        let mut tex = Self::new(width, height, vec![Color::BLACK, bar], "lattice").with_transparent_index(0);
        for y in 0..height {
            for x in 0..width {
                let index = if x % spacing == 0 || y % spacing == 0 { 1 } else { 0 };
                tex.set_index(x, y, index);
            }
        }
        tex
    }
}

/// Infinite directional light (like the sun)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Light {
    /// Direction the light travels (normalized)
    pub direction: Vec3,
    pub intensity: f32,
}

impl Light {
    pub fn directional(direction: Vec3, intensity: f32) -> Self {
        Self {
            direction: direction.normalize(),
            intensity,
        }
    }
}

impl Default for Light {
    fn default() -> Self {
        Self::directional(Vec3::new(-1.0, -1.0, -1.0), 0.7)
    }
}

/// Rasterizer settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RasterSettings {
    /// Skip polygons facing away from the camera (double-sided parts excepted)
    pub backface_cull: bool,
    pub light: Light,
    /// Ambient light intensity (0.0-1.0)
    pub ambient: f32,
    /// Number of discrete brightness steps a span can carry
    pub brightness_levels: u8,
    /// Camera-space Z below which geometry is clipped away
    pub near_plane: f32,
    /// Cleared to this before a frame is drawn
    pub sky: Color,
}

impl RasterSettings {
    /// Brightness bucket for a face with the given normal
    pub fn brightness_for(&self, normal: Vec3) -> u8 {
        let levels = self.brightness_levels.max(1);
        let diffuse = (-self.light.direction).dot(normal).max(0.0) * self.light.intensity;
        let intensity = (self.ambient + diffuse).clamp(0.0, 1.0);
        ((intensity * (levels - 1) as f32).round() as u8).min(levels - 1)
    }

    /// Intensity multiplier for a brightness bucket
    pub fn intensity_of(&self, brightness: u8) -> f32 {
        let levels = self.brightness_levels.max(2);
        brightness.min(levels - 1) as f32 / (levels - 1) as f32
    }
}

impl Default for RasterSettings {
    fn default() -> Self {
        Self {
            backface_cull: true,
            light: Light::default(),
            ambient: 0.35,
            brightness_levels: 16,
            near_plane: 1.0,
            sky: Color::new(96, 128, 176),
        }
    }
}

/// Timing breakdown for rasterization stages (in milliseconds)
#[derive(Debug, Clone, Default)]
pub struct RasterTimings {
    /// Camera transform, clipping and projection
    pub transform_ms: f32,
    /// Back-face culling
    pub cull_ms: f32,
    /// Front-to-back sort of static polygons
    pub sort_ms: f32,
    /// Scan conversion and span insertion
    pub span_ms: f32,
    /// Span fill into the framebuffer
    pub fill_ms: f32,
}

impl RasterTimings {
    pub fn total_ms(&self) -> f32 {
        self.transform_ms + self.cull_ms + self.sort_ms + self.span_ms + self.fill_ms
    }
}
