//! blockscape viewer
//!
//! Walks a block world with the collision resolver and draws it with the
//! software rasterizer, blitted through macroquad.
//!
//! Controls: WASD move, arrow keys look, Space jump, P snapshot, Esc quit.
//! The first argument is an optional RON config path (default
//! `blockscape.ron` when it exists).

use std::error::Error;
use std::path::{Path, PathBuf};

use macroquad::prelude::{
    clear_background, draw_text, draw_texture_ex, get_frame_time, get_time, is_key_down, is_key_pressed,
    next_frame, screen_height, screen_width, vec2, Conf, DrawTextureParams, FilterMode, KeyCode, Texture2D,
    BLACK, WHITE,
};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use blockscape::collision::{MoveRequest, Resolver};
use blockscape::config::ViewerConfig;
use blockscape::math::Vec3;
use blockscape::rasterizer::{Camera, Renderer};
use blockscape::world::World;
use blockscape::VERSION;

const DEFAULT_CONFIG: &str = "blockscape.ron";
const SNAPSHOT_PATH: &str = "snapshot.png";

fn window_conf() -> Conf {
    Conf {
        window_title: format!("blockscape v{}", VERSION),
        window_width: 960,
        window_height: 720,
        window_resizable: true,
        ..Default::default()
    }
}

fn load_config() -> ViewerConfig {
    let explicit = std::env::args().nth(1).map(PathBuf::from);
    let path = match explicit {
        Some(path) => path,
        None if Path::new(DEFAULT_CONFIG).exists() => PathBuf::from(DEFAULT_CONFIG),
        None => return ViewerConfig::default(),
    };
    match ViewerConfig::load(&path) {
        Ok(config) => {
            info!(path = %path.display(), "loaded config");
            config
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "falling back to default config");
            ViewerConfig::default()
        }
    }
}

fn load_world(config: &ViewerConfig) -> Result<World, Box<dyn Error>> {
    let upb = config.resolver.units_per_block;
    match &config.map {
        Some(path) => {
            let text = std::fs::read_to_string(path)?;
            Ok(World::from_ascii(&text, upb)?)
        }
        None => Ok(World::from_ascii(blockscape::world::DEMO_MAP, upb)?),
    }
}

#[macroquad::main(window_conf)]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = load_config();
    let mut world = match load_world(&config) {
        Ok(world) => world,
        Err(e) => {
            error!(error = %e, "could not build world");
            return;
        }
    };
    info!(placements = world.placements.len(), blocks = world.blocks.len(), "world ready");

    let mut renderer = Renderer::new(config.width, config.height, config.raster.clone());
    let mut resolver = Resolver::new(config.resolver);
    let mut camera = Camera::new(Vec3::ZERO, config.fov_radians());
    camera.update_orientation(renderer.tables());

    let upb = world.units_per_block;
    let mut feet = world.spawn;
    let mut vertical_speed = 0.0f32;

    // Movable placements sway around where the map put them
    let movables: Vec<(usize, Vec3)> = world
        .placements
        .iter()
        .enumerate()
        .filter(|(_, p)| p.movable)
        .map(|(i, p)| (i, p.offset))
        .collect();

    loop {
        if is_key_pressed(KeyCode::Escape) {
            break;
        }
        let dt = get_frame_time().min(0.1);

        let sway = renderer.tables().sin(get_time() as f32) * upb * 0.5;
        for &(index, home) in &movables {
            world.set_offset(index, home + Vec3::new(sway, 0.0, 0.0));
        }

        // Look
        let turn = config.turn_speed * dt;
        let mut pitch = 0.0;
        let mut yaw = 0.0;
        if is_key_down(KeyCode::Left) {
            yaw -= turn;
        }
        if is_key_down(KeyCode::Right) {
            yaw += turn;
        }
        if is_key_down(KeyCode::Up) {
            pitch -= turn;
        }
        if is_key_down(KeyCode::Down) {
            pitch += turn;
        }
        camera.rotate(renderer.tables(), pitch, yaw);

        // Walk on the XZ plane
        let (s, c) = renderer.tables().sin_cos(camera.rotation_y);
        let forward = Vec3::new(s, 0.0, c);
        let right = Vec3::new(c, 0.0, -s);
        let mut walk = Vec3::ZERO;
        if is_key_down(KeyCode::W) {
            walk += forward;
        }
        if is_key_down(KeyCode::S) {
            walk -= forward;
        }
        if is_key_down(KeyCode::D) {
            walk += right;
        }
        if is_key_down(KeyCode::A) {
            walk -= right;
        }
        let walk = walk.normalize() * (config.move_speed * dt);

        let grounded = vertical_speed == 0.0;
        if grounded && is_key_pressed(KeyCode::Space) {
            vertical_speed = config.gravity * 0.3;
        }
        vertical_speed -= config.gravity * dt;

        let mut active = Vec::new();
        world.active_meshes(feet, config.active_radius, &mut active);
        let request = MoveRequest {
            desired: feet + walk + Vec3::new(0.0, vertical_speed * dt, 0.0),
            old: feet,
            bounds: config.entity,
            max_step_height: config.max_step_height,
        };
        let result = resolver.check_collisions(&active, &request);
        feet = result.position;

        // Landed: the resolver lifted the feet onto the surface below
        let foot = config.entity.foot_at(feet);
        if vertical_speed < 0.0 && foot <= result.shadow_height + 0.5 {
            vertical_speed = 0.0;
        }
        if feet.y < -upb * 16.0 {
            warn!("fell out of the world, respawning");
            feet = world.spawn;
            vertical_speed = 0.0;
        }

        camera.position = feet + Vec3::new(0.0, config.eye_height, 0.0);
        let fb = renderer.render(&world, &camera);

        if is_key_pressed(KeyCode::P) {
            match fb.save_png(SNAPSHOT_PATH) {
                Ok(()) => info!(path = SNAPSHOT_PATH, "saved snapshot"),
                Err(e) => error!(error = %e, "snapshot failed"),
            }
        }

        clear_background(BLACK);
        let texture = Texture2D::from_rgba8(fb.width as u16, fb.height as u16, &fb.pixels);
        texture.set_filter(FilterMode::Nearest);

        // Letterbox to the framebuffer aspect
        let scale = (screen_width() / fb.width as f32).min(screen_height() / fb.height as f32);
        let draw_w = fb.width as f32 * scale;
        let draw_h = fb.height as f32 * scale;
        draw_texture_ex(
            &texture,
            (screen_width() - draw_w) * 0.5,
            (screen_height() - draw_h) * 0.5,
            WHITE,
            DrawTextureParams {
                dest_size: Some(vec2(draw_w, draw_h)),
                ..Default::default()
            },
        );

        let stats = renderer.stats();
        draw_text(
            &format!(
                "pos ({:.0}, {:.0}, {:.0}) | {:?} | spans {} | {:.2} ms",
                feet.x,
                feet.y,
                feet.z,
                result.outcome,
                stats.spans,
                renderer.timings().total_ms()
            ),
            8.0,
            20.0,
            20.0,
            WHITE,
        );

        next_frame().await;
    }
}
