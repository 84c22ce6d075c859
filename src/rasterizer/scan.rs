//! Scan conversion of convex screen-space polygons into spans
//!
//! Pixel centres sit on integer coordinates. A row `y` is covered by an
//! edge when `top <= y < bottom` (top-inclusive, bottom-exclusive), and a
//! span covers pixels `ceil(left) .. ceil(right)`. Two polygons sharing an
//! edge therefore never both draw, nor both miss, a pixel along it.

use super::span::Span;
use super::types::{Color, TextureId};

/// Projected vertex: screen position plus perspective-divided attributes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenVertex {
    pub sx: f32,
    pub sy: f32,
    pub one_on_tz: f32,
    pub u_on_tz: f32,
    pub v_on_tz: f32,
}

impl ScreenVertex {
    pub fn new(sx: f32, sy: f32, one_on_tz: f32, u_on_tz: f32, v_on_tz: f32) -> Self {
        Self { sx, sy, one_on_tz, u_on_tz, v_on_tz }
    }
}

/// Everything a polygon's spans share
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpanStyle {
    pub texture: Option<TextureId>,
    pub color: Color,
    pub brightness: u8,
    pub transparent: bool,
    pub popup: bool,
}

impl Default for SpanStyle {
    fn default() -> Self {
        Self {
            texture: None,
            color: Color::WHITE,
            brightness: 0,
            transparent: false,
            popup: false,
        }
    }
}

/// Edge crossing on one row
#[derive(Clone, Copy)]
struct Crossing {
    x: f32,
    one_on_tz: f32,
    u_on_tz: f32,
    v_on_tz: f32,
}

fn crossing(a: &ScreenVertex, b: &ScreenVertex, y: f32) -> Crossing {
    let t = (y - a.sy) / (b.sy - a.sy);
    Crossing {
        x: a.sx + (b.sx - a.sx) * t,
        one_on_tz: a.one_on_tz + (b.one_on_tz - a.one_on_tz) * t,
        u_on_tz: a.u_on_tz + (b.u_on_tz - a.u_on_tz) * t,
        v_on_tz: a.v_on_tz + (b.v_on_tz - a.v_on_tz) * t,
    }
}

/// Emit one span per covered row of a convex polygon.
///
/// Rows outside `0..height` are skipped. Returns the number of spans
/// handed to `emit`.
pub fn scan_polygon<F>(vertices: &[ScreenVertex], style: &SpanStyle, height: usize, mut emit: F) -> usize
where
    F: FnMut(i32, Span),
{
    if vertices.len() < 3 {
        return 0;
    }

    let mut min_y = f32::INFINITY;
    let mut max_y = f32::NEG_INFINITY;
    for v in vertices {
        min_y = min_y.min(v.sy);
        max_y = max_y.max(v.sy);
    }
    if !min_y.is_finite() || !max_y.is_finite() {
        return 0;
    }

    let first_row = (min_y.ceil() as i32).max(0);
    let last_row = (max_y.ceil() as i32).min(height as i32);
    let mut emitted = 0;

    for y in first_row..last_row {
        let fy = y as f32;
        let mut left: Option<Crossing> = None;
        let mut right: Option<Crossing> = None;

        for i in 0..vertices.len() {
            let a = &vertices[i];
            let b = &vertices[(i + 1) % vertices.len()];
            if a.sy == b.sy {
                continue;
            }
            let (top, bottom) = if a.sy < b.sy { (a, b) } else { (b, a) };
            if fy < top.sy || fy >= bottom.sy {
                continue;
            }
            let c = crossing(top, bottom, fy);
            if left.map_or(true, |l| c.x < l.x) {
                left = Some(c);
            }
            if right.map_or(true, |r| c.x > r.x) {
                right = Some(c);
            }
        }

        let (Some(l), Some(r)) = (left, right) else {
            continue;
        };
        let start = l.x.ceil() as i32;
        let end = r.x.ceil() as i32;
        if end <= start {
            continue;
        }

        let dx = r.x - l.x;
        let (d_one, d_u, d_v) = if dx > 0.0 {
            (
                (r.one_on_tz - l.one_on_tz) / dx,
                (r.u_on_tz - l.u_on_tz) / dx,
                (r.v_on_tz - l.v_on_tz) / dx,
            )
        } else {
            (0.0, 0.0, 0.0)
        };
        // Step from the exact edge to the first pixel centre
        let lead = start as f32 - l.x;

        let mut span = Span::new(start, end);
        span.one_on_tz = l.one_on_tz + lead * d_one;
        span.u_on_tz = l.u_on_tz + lead * d_u;
        span.v_on_tz = l.v_on_tz + lead * d_v;
        span.d_one_on_tz = d_one;
        span.d_u_on_tz = d_u;
        span.d_v_on_tz = d_v;
        span.texture = style.texture;
        span.color = style.color;
        span.brightness = style.brightness;
        span.transparent = style.transparent;
        span.popup = style.popup;

        emit(y, span);
        emitted += 1;
    }

    emitted
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(sx: f32, sy: f32) -> ScreenVertex {
        ScreenVertex::new(sx, sy, 1.0, 0.0, 0.0)
    }

    fn collect(vertices: &[ScreenVertex], height: usize) -> Vec<(i32, i32, i32)> {
        let mut out = Vec::new();
        scan_polygon(vertices, &SpanStyle::default(), height, |y, s| {
            out.push((y, s.start_sx, s.end_sx))
        });
        out
    }

    #[test]
    fn test_square_rows() {
        let spans = collect(&[v(10.0, 10.0), v(20.0, 10.0), v(20.0, 20.0), v(10.0, 20.0)], 100);
        assert_eq!(spans.len(), 10);
        for (i, (y, s, e)) in spans.iter().enumerate() {
            assert_eq!(*y, 10 + i as i32);
            assert_eq!((*s, *e), (10, 20));
        }
    }

    #[test]
    fn test_shared_edge_has_no_gaps_or_overlap() {
        let a = [v(0.0, 0.0), v(30.5, 0.0), v(30.5, 17.3)];
        let b = [v(0.0, 0.0), v(30.5, 17.3), v(0.0, 17.3)];
        let mut covered = vec![0u8; 31 * 18];
        for tri in [&a[..], &b[..]] {
            for (y, s, e) in collect(tri, 100) {
                for x in s..e {
                    covered[(y as usize) * 31 + x as usize] += 1;
                }
            }
        }
        // Rows 0..=17, columns 0..=30
        for y in 0..18 {
            for x in 0..31 {
                assert_eq!(covered[y * 31 + x], 1, "pixel ({}, {})", x, y);
            }
        }
    }

    #[test]
    fn test_clipped_to_height() {
        let spans = collect(&[v(0.0, -5.0), v(10.0, -5.0), v(10.0, 5.0), v(0.0, 5.0)], 3);
        let rows: Vec<i32> = spans.iter().map(|s| s.0).collect();
        assert_eq!(rows, vec![0, 1, 2]);
    }

    #[test]
    fn test_interpolates_attributes() {
        let quad = [
            ScreenVertex::new(0.0, 0.0, 1.0, 0.0, 0.0),
            ScreenVertex::new(10.0, 0.0, 0.5, 10.0, 0.0),
            ScreenVertex::new(10.0, 4.0, 0.5, 10.0, 4.0),
            ScreenVertex::new(0.0, 4.0, 1.0, 0.0, 4.0),
        ];
        let mut spans = Vec::new();
        scan_polygon(&quad, &SpanStyle::default(), 10, |y, s| spans.push((y, s)));
        let (y, s) = spans[2];
        assert_eq!(y, 2);
        assert!((s.one_on_tz - 1.0).abs() < 1e-5);
        assert!((s.d_one_on_tz + 0.05).abs() < 1e-5);
        assert!((s.d_u_on_tz - 1.0).abs() < 1e-5);
        assert!((s.v_on_tz - 2.0).abs() < 1e-5);
        // Last pixel of the row
        assert!((s.one_on_tz_at(9.0) - 0.55).abs() < 1e-5);
    }

    #[test]
    fn test_degenerate_polygons() {
        assert!(collect(&[v(0.0, 0.0), v(10.0, 0.0)], 10).is_empty());
        // Zero height
        assert!(collect(&[v(0.0, 3.0), v(10.0, 3.0), v(5.0, 3.0)], 10).is_empty());
        // Sliver thinner than a pixel centre
        assert!(collect(&[v(2.2, 0.0), v(2.6, 0.0), v(2.6, 5.0), v(2.2, 5.0)], 10).is_empty());
    }

    #[test]
    fn test_style_carried() {
        let style = SpanStyle {
            texture: Some(3),
            brightness: 7,
            transparent: true,
            ..SpanStyle::default()
        };
        let mut seen = Vec::new();
        scan_polygon(&[v(0.0, 0.0), v(4.0, 0.0), v(0.0, 4.0)], &style, 10, |_, s| seen.push(s));
        assert!(!seen.is_empty());
        assert!(seen.iter().all(|s| s.texture == Some(3) && s.brightness == 7 && s.transparent));
    }
}
