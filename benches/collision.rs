//! Benchmarks for movement resolution against the demo world

use std::hint::black_box;

use blockscape::collision::{ColAABox, MoveRequest, Resolver, UNITS_PER_BLOCK};
use blockscape::math::Vec3;
use blockscape::world::World;
use criterion::{criterion_group, criterion_main, Criterion};

fn entity() -> ColAABox {
    let u = UNITS_PER_BLOCK;
    ColAABox::new(Vec3::new(u * 0.2, u * 0.35, u * 0.2), Vec3::new(0.0, u * 0.35, 0.0))
}

fn bench_collision(c: &mut Criterion) {
    let world = World::demo().expect("demo world");
    let bounds = entity();
    let step = UNITS_PER_BLOCK * 0.3;
    let mut active = Vec::new();
    world.active_meshes(world.spawn, UNITS_PER_BLOCK * 2.0, &mut active);

    let mut resolver = Resolver::default();

    c.bench_function("free_walk", |b| {
        let request = MoveRequest {
            desired: world.spawn + Vec3::new(8.0, 0.0, 0.0),
            old: world.spawn,
            bounds,
            max_step_height: step,
        };
        b.iter(|| black_box(resolver.check_collisions(&active, black_box(&request))))
    });

    // Push diagonally into the west wall so the slide path runs
    let near_wall = Vec3::new(UNITS_PER_BLOCK * 1.25, 0.0, UNITS_PER_BLOCK * 5.5);
    let mut wall_active = Vec::new();
    world.active_meshes(near_wall, UNITS_PER_BLOCK * 2.0, &mut wall_active);
    c.bench_function("slide_along_wall", |b| {
        let request = MoveRequest {
            desired: near_wall + Vec3::new(-16.0, 0.0, 8.0),
            old: near_wall,
            bounds,
            max_step_height: step,
        };
        b.iter(|| black_box(resolver.check_collisions(&wall_active, black_box(&request))))
    });

    c.bench_function("ground_height", |b| {
        b.iter(|| black_box(resolver.ground_height(&active, black_box(world.spawn), &bounds, step)))
    });
}

criterion_group!(benches, bench_collision);
criterion_main!(benches);
