//! Framebuffer and world rendering
//!
//! A frame goes through five stages, each timed into `RasterTimings`:
//! 1. Cull: drop polygons facing away from the camera
//! 2. Transform: camera space, near-plane clip, projection
//! 3. Sort: static polygons ordered so each comes before anything it hides
//! 4. Spans: scan-convert into the span buffer
//! 5. Fill: opaque spans, then transparent spans back to front

use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::path::Path;
use std::time::Instant;

use tracing::trace;

use super::camera::Camera;
use super::scan::{scan_polygon, ScreenVertex, SpanStyle};
use super::span::{Span, SpanBuffer};
use super::types::{Color, RasterSettings, RasterTimings, Texture};
use crate::math::{MathTables, Vec2, Vec3};
use crate::world::World;

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("framebuffer is empty")]
    Empty,
    #[error("failed to write PNG: {0}")]
    Image(#[from] image::ImageError),
}

/// RGBA framebuffer
pub struct Framebuffer {
    pub pixels: Vec<u8>, // RGBA
    pub width: usize,
    pub height: usize,
}

impl Framebuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            pixels: vec![0; width * height * 4],
            width,
            height,
        }
    }

    /// Resize the framebuffer (only reallocates if size changed)
    pub fn resize(&mut self, width: usize, height: usize) {
        if self.width != width || self.height != height {
            self.width = width;
            self.height = height;
            self.pixels = vec![0; width * height * 4];
        }
    }

    pub fn clear(&mut self, color: Color) {
        let bytes = color.to_bytes();
        for chunk in self.pixels.chunks_exact_mut(4) {
            chunk.copy_from_slice(&bytes);
        }
    }

    #[inline]
    pub fn set_pixel(&mut self, x: usize, y: usize, color: Color) {
        if x < self.width && y < self.height {
            let idx = (y * self.width + x) * 4;
            self.pixels[idx..idx + 4].copy_from_slice(&color.to_bytes());
        }
    }

    pub fn get_pixel(&self, x: usize, y: usize) -> Option<Color> {
        if x < self.width && y < self.height {
            let idx = (y * self.width + x) * 4;
            Some(Color::new(self.pixels[idx], self.pixels[idx + 1], self.pixels[idx + 2]))
        } else {
            None
        }
    }

    /// Write the framebuffer out as a PNG
    pub fn save_png(&self, path: impl AsRef<Path>) -> Result<(), SnapshotError> {
        if self.width == 0 || self.height == 0 {
            return Err(SnapshotError::Empty);
        }
        image::save_buffer_with_format(
            path,
            &self.pixels,
            self.width as u32,
            self.height as u32,
            image::ColorType::Rgba8,
            image::ImageFormat::Png,
        )?;
        Ok(())
    }
}

/// Polygon counts from the last frame
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub polygons: usize,
    pub culled: usize,
    /// Entirely behind the near plane
    pub clipped: usize,
    pub drawn_static: usize,
    pub drawn_movable: usize,
    pub spans: usize,
}

/// Camera-space vertex with its texture coordinate, for clipping
#[derive(Debug, Clone, Copy)]
struct ClipVertex {
    pos: Vec3,
    uv: Vec2,
}

impl ClipVertex {
    fn lerp(a: ClipVertex, b: ClipVertex, t: f32) -> ClipVertex {
        ClipVertex {
            pos: a.pos + (b.pos - a.pos) * t,
            uv: Vec2::new(a.uv.x + (b.uv.x - a.uv.x) * t, a.uv.y + (b.uv.y - a.uv.y) * t),
        }
    }
}

/// Clip a convex polygon to `z >= near` (Sutherland-Hodgman, one plane)
fn clip_near(input: &[ClipVertex], near: f32, out: &mut Vec<ClipVertex>) {
    out.clear();
    let n = input.len();
    for i in 0..n {
        let a = input[i];
        let b = input[(i + 1) % n];
        let a_in = a.pos.z >= near;
        let b_in = b.pos.z >= near;
        if a_in {
            out.push(a);
        }
        if a_in != b_in {
            let t = (near - a.pos.z) / (b.pos.z - a.pos.z);
            out.push(ClipVertex::lerp(a, b, t));
        }
    }
}

/// Distance within which a vertex counts as lying on a plane
const PLANE_EPSILON: f32 = 0.01;

/// Projected polygon waiting for scan conversion.
///
/// `first..first + count` indexes both the screen vertices and the
/// camera-space points they were projected from.
struct ScreenPoly {
    first: usize,
    count: usize,
    style: SpanStyle,
    /// Nearest camera-space Z
    depth: f32,
    movable: bool,
    /// Camera-space plane: `normal . p == offset` for points on the polygon
    normal: Vec3,
    offset: f32,
    /// Screen bounding box
    min: (f32, f32),
    max: (f32, f32),
}

impl ScreenPoly {
    fn points<'a>(&self, points: &'a [Vec3]) -> &'a [Vec3] {
        &points[self.first..self.first + self.count]
    }

    fn overlaps_on_screen(&self, other: &ScreenPoly) -> bool {
        self.min.0 < other.max.0
            && other.min.0 < self.max.0
            && self.min.1 < other.max.1
            && other.min.1 < self.max.1
    }

    /// Every point lies on the camera's side of this polygon's plane
    /// (`toward`) or on the far side, points on the plane counting for
    /// both. An edge-on plane separates nothing.
    fn all_on_side(&self, points: &[Vec3], toward: bool) -> bool {
        // The camera sits at the camera-space origin
        let camera = -self.offset;
        if camera.abs() <= PLANE_EPSILON {
            return false;
        }
        let sign = if toward { camera.signum() } else { -camera.signum() };
        points
            .iter()
            .all(|p| (self.normal.dot(*p) - self.offset) * sign >= -PLANE_EPSILON)
    }
}

/// Does `a` hide `b` wherever the two overlap on screen?
fn occludes(a: &ScreenPoly, b: &ScreenPoly, points: &[Vec3]) -> bool {
    a.all_on_side(b.points(points), false) || b.all_on_side(a.points(points), true)
}

/// Reused buffers for `order_front_to_back`
#[derive(Default)]
struct OrderScratch {
    /// Polygons that must come after each polygon
    after: Vec<Vec<usize>>,
    /// Count of unplaced polygons that must come first
    pending: Vec<u32>,
    placed: Vec<bool>,
    ready: BinaryHeap<Reverse<(u32, usize)>>,
}

/// Order polygons so each one precedes every polygon it hides.
///
/// Screen-overlapping pairs are separated with plane-side tests. Among
/// polygons free to go next, the nearest goes first; pairs the tests cannot
/// separate (interpenetrating or cyclic) fall back to that same rule.
fn order_front_to_back(polys: &[ScreenPoly], points: &[Vec3], scratch: &mut OrderScratch, order: &mut Vec<usize>) {
    let n = polys.len();
    let OrderScratch { after, pending, placed, ready } = scratch;
    order.clear();
    ready.clear();
    if after.len() < n {
        after.resize_with(n, Vec::new);
    }
    for list in after.iter_mut().take(n) {
        list.clear();
    }
    pending.clear();
    pending.resize(n, 0);
    placed.clear();
    placed.resize(n, false);

    for a in 0..n {
        for b in a + 1..n {
            if !polys[a].overlaps_on_screen(&polys[b]) {
                continue;
            }
            match (occludes(&polys[a], &polys[b], points), occludes(&polys[b], &polys[a], points)) {
                (true, false) => {
                    after[a].push(b);
                    pending[b] += 1;
                }
                (false, true) => {
                    after[b].push(a);
                    pending[a] += 1;
                }
                _ => {}
            }
        }
    }

    // Depths are positive, so their bit patterns sort like the values
    let key = |i: usize| polys[i].depth.to_bits();
    for i in 0..n {
        if pending[i] == 0 {
            ready.push(Reverse((key(i), i)));
        }
    }

    while order.len() < n {
        let next = match ready.pop() {
            Some(Reverse((_, i))) => i,
            None => {
                // Cycle: break it at the nearest unplaced polygon
                let nearest = (0..n)
                    .filter(|&i| !placed[i])
                    .min_by(|&a, &b| polys[a].depth.total_cmp(&polys[b].depth));
                match nearest {
                    Some(i) => i,
                    None => break,
                }
            }
        };
        if placed[next] {
            continue;
        }
        placed[next] = true;
        order.push(next);
        for &j in &after[next] {
            pending[j] = pending[j].saturating_sub(1);
            if pending[j] == 0 && !placed[j] {
                ready.push(Reverse((key(j), j)));
            }
        }
    }
}

pub struct Renderer {
    pub settings: RasterSettings,
    tables: MathTables,
    spans: SpanBuffer,
    framebuffer: Framebuffer,
    timings: RasterTimings,
    stats: FrameStats,
    // Per-frame scratch, kept to avoid reallocating
    clip_in: Vec<ClipVertex>,
    clip_out: Vec<ClipVertex>,
    screen: Vec<ScreenVertex>,
    points: Vec<Vec3>,
    polys: Vec<ScreenPoly>,
    order: Vec<usize>,
    order_scratch: OrderScratch,
    see_through: Vec<bool>,
}

impl Renderer {
    pub fn new(width: usize, height: usize, settings: RasterSettings) -> Self {
        Self {
            settings,
            tables: MathTables::new(),
            spans: SpanBuffer::new(width, height),
            framebuffer: Framebuffer::new(width, height),
            timings: RasterTimings::default(),
            stats: FrameStats::default(),
            clip_in: Vec::new(),
            clip_out: Vec::new(),
            screen: Vec::new(),
            points: Vec::new(),
            polys: Vec::new(),
            order: Vec::new(),
            order_scratch: OrderScratch::default(),
            see_through: Vec::new(),
        }
    }

    pub fn tables(&self) -> &MathTables {
        &self.tables
    }

    pub fn framebuffer(&self) -> &Framebuffer {
        &self.framebuffer
    }

    pub fn spans(&self) -> &SpanBuffer {
        &self.spans
    }

    pub fn timings(&self) -> &RasterTimings {
        &self.timings
    }

    pub fn stats(&self) -> &FrameStats {
        &self.stats
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        self.spans.resize(width, height);
        self.framebuffer.resize(width, height);
    }

    /// Draw `world` as seen by `camera`. The camera's orientation must be
    /// current (see `Camera::update_orientation`).
    pub fn render(&mut self, world: &World, camera: &Camera) -> &Framebuffer {
        self.timings = RasterTimings::default();
        self.stats = FrameStats::default();
        self.spans.begin_frame();
        self.screen.clear();
        self.points.clear();
        self.polys.clear();

        self.see_through.clear();
        self.see_through.extend(world.textures.iter().map(Texture::has_transparency));

        let width = self.framebuffer.width;
        let height = self.framebuffer.height;
        let focal = camera.focal_length(&self.tables, width);
        let cx = width as f32 * 0.5;
        let cy = height as f32 * 0.5;
        let near = self.settings.near_plane.max(f32::EPSILON);

        // === CULL + TRANSFORM ===
        let mut cull_time = 0.0f32;
        let transform_start = Instant::now();
        for placement in &world.placements {
            let Some(block) = world.blocks.get(placement.block) else {
                continue;
            };
            let geometry = &block.geometry;
            for polygon in &geometry.polygons {
                self.stats.polygons += 1;
                if polygon.vertices.len() < 3 || polygon.vertices.iter().any(|&i| i >= geometry.vertices.len()) {
                    continue;
                }

                let cull_start = Instant::now();
                let part = geometry.parts.get(polygon.part);
                let double_sided = part.map_or(false, |p| p.double_sided);
                let v0 = geometry.vertices[polygon.vertices[0]] + placement.offset;
                let facing = polygon.normal.dot(v0 - camera.position);
                let culled = facing >= 0.0 && self.settings.backface_cull && !double_sided;
                cull_time += cull_start.elapsed().as_secs_f32() * 1000.0;
                if culled {
                    self.stats.culled += 1;
                    continue;
                }

                self.clip_in.clear();
                for (i, &vi) in polygon.vertices.iter().enumerate() {
                    let pos = camera.to_camera(geometry.vertices[vi] + placement.offset);
                    self.clip_in.push(ClipVertex { pos, uv: polygon.uv(i) });
                }
                clip_near(&self.clip_in, near, &mut self.clip_out);
                if self.clip_out.len() < 3 {
                    self.stats.clipped += 1;
                    continue;
                }

                let first = self.screen.len();
                let mut depth = f32::INFINITY;
                let mut min = (f32::INFINITY, f32::INFINITY);
                let mut max = (f32::NEG_INFINITY, f32::NEG_INFINITY);
                for cv in &self.clip_out {
                    let one_on_tz = 1.0 / cv.pos.z;
                    let sx = cx + cv.pos.x * focal * one_on_tz;
                    let sy = cy - cv.pos.y * focal * one_on_tz;
                    depth = depth.min(cv.pos.z);
                    min = (min.0.min(sx), min.1.min(sy));
                    max = (max.0.max(sx), max.1.max(sy));
                    self.screen.push(ScreenVertex::new(
                        sx,
                        sy,
                        one_on_tz,
                        cv.uv.x * one_on_tz,
                        cv.uv.y * one_on_tz,
                    ));
                    self.points.push(cv.pos);
                }
                let normal = camera.dir_to_camera(polygon.normal.normalize());
                let offset = normal.dot(self.clip_out[0].pos);

                // Light the side the camera sees
                let lit_normal = if facing > 0.0 { -polygon.normal } else { polygon.normal };
                let texture = part
                    .and_then(|p| p.texture)
                    .filter(|&t| t < world.textures.len());
                let style = SpanStyle {
                    texture,
                    color: part.map_or(Color::WHITE, |p| p.color),
                    brightness: self.settings.brightness_for(lit_normal),
                    transparent: texture.map_or(false, |t| self.see_through[t]),
                    popup: false,
                };

                self.polys.push(ScreenPoly {
                    first,
                    count: self.clip_out.len(),
                    style,
                    depth,
                    movable: placement.movable,
                    normal,
                    offset,
                    min,
                    max,
                });
            }
        }
        self.timings.cull_ms = cull_time;
        self.timings.transform_ms =
            (transform_start.elapsed().as_secs_f32() * 1000.0 - cull_time).max(0.0);

        // === SORT ===
        // Statics front to back, then movables in any order
        let sort_start = Instant::now();
        self.polys.sort_by_key(|p| p.movable);
        let statics = self.polys.partition_point(|p| !p.movable);
        order_front_to_back(&self.polys[..statics], &self.points, &mut self.order_scratch, &mut self.order);
        self.order.extend(statics..self.polys.len());
        self.timings.sort_ms = sort_start.elapsed().as_secs_f32() * 1000.0;

        // === SPANS ===
        let span_start = Instant::now();
        let Self { spans, screen, polys, order, stats, .. } = self;
        for poly in order.iter().map(|&i| &polys[i]) {
            let vertices = &screen[poly.first..poly.first + poly.count];
            let mut kept = 0usize;
            if poly.movable {
                scan_polygon(vertices, &poly.style, height, |y, span| {
                    kept += spans.add_movable_span(y, span) as usize;
                });
            } else {
                scan_polygon(vertices, &poly.style, height, |y, span| {
                    kept += spans.add_span(y, span) as usize;
                });
            }
            if kept > 0 {
                if poly.movable {
                    stats.drawn_movable += 1;
                } else {
                    stats.drawn_static += 1;
                }
            }
        }
        self.stats.spans = self.spans.span_count();
        self.timings.span_ms = span_start.elapsed().as_secs_f32() * 1000.0;

        // === FILL ===
        let fill_start = Instant::now();
        self.fill(&world.textures);
        self.timings.fill_ms = fill_start.elapsed().as_secs_f32() * 1000.0;

        trace!(
            polygons = self.stats.polygons,
            culled = self.stats.culled,
            clipped = self.stats.clipped,
            spans = self.stats.spans,
            total_ms = self.timings.total_ms(),
            "frame rendered"
        );
        &self.framebuffer
    }

    fn fill(&mut self, textures: &[Texture]) {
        self.framebuffer.clear(self.settings.sky);
        for y in 0..self.spans.height() {
            for span in self.spans.opaque(y) {
                fill_span(&mut self.framebuffer, &self.settings, textures, y, span);
            }
            // Head to tail is back to front
            for span in self.spans.transparent(y) {
                fill_span(&mut self.framebuffer, &self.settings, textures, y, span);
            }
        }
    }
}

/// Write one span's pixels; see-through texels leave what is underneath
fn fill_span(fb: &mut Framebuffer, settings: &RasterSettings, textures: &[Texture], y: usize, span: &Span) {
    let intensity = settings.intensity_of(span.brightness);
    let texture = span.texture.and_then(|t| textures.get(t));
    let flat = span.color.shade(intensity);

    let mut one_on_tz = span.one_on_tz;
    let mut u_on_tz = span.u_on_tz;
    let mut v_on_tz = span.v_on_tz;
    for x in span.start_sx.max(0)..span.end_sx {
        let color = match texture {
            Some(tex) if one_on_tz > 0.0 => {
                let z = 1.0 / one_on_tz;
                tex.sample(u_on_tz * z, v_on_tz * z)
                    .map(|c| c.modulate(span.color).shade(intensity))
            }
            Some(_) => None,
            None => Some(flat),
        };
        if let Some(c) = color {
            fb.set_pixel(x as usize, y, c);
        }
        one_on_tz += span.d_one_on_tz;
        u_on_tz += span.d_u_on_tz;
        v_on_tz += span.d_v_on_tz;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::{Block, BlockGeometry, BlockPart};

    const W: usize = 320;
    const H: usize = 240;

    fn renderer() -> Renderer {
        Renderer::new(W, H, RasterSettings::default())
    }

    fn camera_at(r: &Renderer, position: Vec3) -> Camera {
        let mut cam = Camera::new(position, std::f32::consts::FRAC_PI_2);
        cam.update_orientation(r.tables());
        cam
    }

    #[test]
    fn test_framebuffer_pixels() {
        let mut fb = Framebuffer::new(4, 3);
        fb.clear(Color::GREY);
        fb.set_pixel(1, 2, Color::WHITE);
        fb.set_pixel(10, 10, Color::BLACK);
        assert_eq!(fb.get_pixel(1, 2), Some(Color::WHITE));
        assert_eq!(fb.get_pixel(0, 0), Some(Color::GREY));
        assert_eq!(fb.get_pixel(4, 0), None);
        assert_eq!(fb.pixels[3], 255);
    }

    #[test]
    fn test_clip_near_splits_edge() {
        let tri = [
            ClipVertex { pos: Vec3::new(0.0, 0.0, -1.0), uv: Vec2::new(0.0, 0.0) },
            ClipVertex { pos: Vec3::new(1.0, 0.0, 3.0), uv: Vec2::new(1.0, 0.0) },
            ClipVertex { pos: Vec3::new(0.0, 1.0, 3.0), uv: Vec2::new(0.0, 1.0) },
        ];
        let mut out = Vec::new();
        clip_near(&tri, 1.0, &mut out);
        assert_eq!(out.len(), 4);
        assert!(out.iter().all(|v| v.pos.z >= 1.0 - 1e-5));
        // Halfway along the first edge in z, so halfway in u
        assert!((out[0].uv.x - 0.5).abs() < 1e-5);

        clip_near(&tri[..1], 1.0, &mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn test_wall_in_view_and_culled_faces() {
        let mut r = renderer();
        let world = World::from_ascii("#", 256.0).unwrap();
        let cam = camera_at(&r, Vec3::new(128.0, 128.0, -300.0));
        let sky = r.settings.sky;
        let fb = r.render(&world, &cam);
        assert_ne!(fb.get_pixel(W / 2, H / 2), Some(sky));
        assert_eq!(fb.get_pixel(0, 0), Some(sky));

        // Only the -Z face looks at the camera
        let stats = r.stats();
        assert_eq!(stats.polygons, 6);
        assert_eq!(stats.culled, 5);
        assert_eq!(stats.drawn_static, 1);
    }

    #[test]
    fn test_nothing_behind_camera() {
        let mut r = renderer();
        let world = World::from_ascii("#", 256.0).unwrap();
        let cam = camera_at(&r, Vec3::new(128.0, 128.0, 600.0));
        let sky = r.settings.sky;
        r.settings.backface_cull = false;
        let fb = r.render(&world, &cam);
        assert!(fb.pixels.chunks_exact(4).all(|p| p[..3] == [sky.r, sky.g, sky.b]));
        assert_eq!(r.stats().clipped, 6);
    }

    #[test]
    fn test_glass_shows_sky_through_holes() {
        let mut r = renderer();
        let world = World::from_ascii("g", 256.0).unwrap();
        let cam = camera_at(&r, Vec3::new(128.0, 128.0, -200.0));
        let sky = r.settings.sky;
        let fb = r.render(&world, &cam);

        let mut through = 0;
        let mut bars = 0;
        for y in 70..150 {
            for x in 110..210 {
                match fb.get_pixel(x, y) {
                    Some(c) if c == sky => through += 1,
                    Some(_) => bars += 1,
                    None => {}
                }
            }
        }
        assert!(through > 0);
        assert!(bars > 0);
        assert!(r.spans().transparent(H / 2).count() > 0);
    }

    #[test]
    fn test_movable_crate_in_front_of_wall() {
        let mut r = renderer();
        let u = 256.0;
        let mut world = World::from_ascii("#", u).unwrap();
        let crate_tex = world.add_texture(Texture::checkerboard(
            16,
            16,
            Color::new(200, 40, 40),
            Color::new(40, 200, 40),
        ));
        let crate_block = world.add_block(Block::structural(
            "crate",
            BlockGeometry::cuboid(
                Vec3::new(64.0, 0.0, 64.0),
                Vec3::new(192.0, 128.0, 192.0),
                BlockPart::new("crate").with_texture(crate_tex),
            ),
        ));
        world.place(crate_block, Vec3::new(0.0, 0.0, -200.0), true);

        let cam = camera_at(&r, Vec3::new(128.0, 64.0, -400.0));
        let intensity = r.settings.intensity_of(r.settings.brightness_for(Vec3::new(0.0, 0.0, -1.0)));
        let expected = [
            Color::new(200, 40, 40).shade(intensity),
            Color::new(40, 200, 40).shade(intensity),
        ];
        let fb = r.render(&world, &cam);
        let centre = fb.get_pixel(W / 2, H / 2).unwrap();
        assert!(expected.contains(&centre), "centre pixel {:?}", centre);
        assert_eq!(r.stats().drawn_movable, 1);
    }

    #[test]
    fn test_pane_standing_on_floor_drawn_over_it() {
        let mut r = renderer();
        let u = 256.0;
        let mut world = World::new(u);
        let floor = world.add_block(Block::structural(
            "floor",
            BlockGeometry::floor_tile(0.0, u, 0.0, 0.0, u, BlockPart::new("floor").with_color(Color::new(255, 0, 0))),
        ));
        let pane = world.add_block(Block::structural(
            "pane",
            BlockGeometry::pane(
                0.0,
                u,
                0.0,
                u,
                u * 0.5,
                BlockPart::new("pane").with_color(Color::new(0, 0, 255)).with_double_sided(true),
            ),
        ));
        world.place(floor, Vec3::ZERO, false);
        world.place(pane, Vec3::ZERO, false);

        // The floor's near edge is closer than any point of the pane, but
        // below the pane's foot the pane is in front
        let cam = camera_at(&r, Vec3::new(u * 0.5, u * 0.8, -u));
        let fb = r.render(&world, &cam);
        let c = fb.get_pixel(160, 194).unwrap();
        assert!(c.b > c.r, "pixel {:?}", c);
        // Floor still shows beyond the pane's reach at the bottom of the screen
        let c = fb.get_pixel(160, 230).unwrap();
        assert!(c.r > c.b, "pixel {:?}", c);
        assert_eq!(r.stats().drawn_static, 2);
    }

    #[test]
    fn test_save_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frame.png");
        let mut fb = Framebuffer::new(8, 4);
        fb.clear(Color::new(10, 20, 30));
        fb.save_png(&path).unwrap();

        let img = image::open(&path).unwrap().to_rgba8();
        assert_eq!(img.dimensions(), (8, 4));
        assert_eq!(img.get_pixel(3, 2).0, [10, 20, 30, 255]);

        let empty = Framebuffer::new(0, 0);
        assert!(matches!(empty.save_png(dir.path().join("e.png")), Err(SnapshotError::Empty)));
    }
}
