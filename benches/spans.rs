//! Benchmarks for span insertion and full frames

use std::hint::black_box;

use blockscape::math::Vec3;
use blockscape::rasterizer::{Camera, RasterSettings, Renderer, Span, SpanBuffer, HEIGHT, WIDTH};
use blockscape::world::World;
use criterion::{criterion_group, criterion_main, Criterion};

/// Overlapping spans at varying depths, nearest first like sorted static geometry
fn layered_spans() -> Vec<Span> {
    (0..32)
        .map(|i| {
            let start = (i * 37) % WIDTH as i32;
            Span::flat(start - 40, start + 60, 1.0 / (10.0 + i as f32))
        })
        .collect()
}

fn bench_spans(c: &mut Criterion) {
    let spans = layered_spans();
    let mut buffer = SpanBuffer::new(WIDTH, HEIGHT);

    c.bench_function("add_span_static", |b| {
        b.iter(|| {
            buffer.begin_frame();
            for y in 0..HEIGHT as i32 {
                for span in &spans {
                    black_box(buffer.add_span(y, *span));
                }
            }
        })
    });

    c.bench_function("add_span_movable", |b| {
        b.iter(|| {
            buffer.begin_frame();
            for y in 0..HEIGHT as i32 {
                // Farthest first, the worst case for the movable path
                for span in spans.iter().rev() {
                    black_box(buffer.add_movable_span(y, *span));
                }
            }
        })
    });

    let world = World::demo().expect("demo world");
    let mut renderer = Renderer::new(WIDTH, HEIGHT, RasterSettings::default());
    let mut camera = Camera::new(world.spawn + Vec3::new(0.0, 150.0, 0.0), std::f32::consts::FRAC_PI_2);
    camera.update_orientation(renderer.tables());
    c.bench_function("render_demo_frame", |b| {
        b.iter(|| {
            black_box(renderer.render(&world, &camera));
        })
    });
}

criterion_group!(benches, bench_spans);
criterion_main!(benches);
