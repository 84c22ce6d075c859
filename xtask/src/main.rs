//! Automation tasks for blockscape
//!
//! Usage:
//!   cargo xtask snapshot                 # Render the demo world to snapshot.png
//!   cargo xtask snapshot --map hall.txt  # Render an ASCII map
//!   cargo xtask bench [collision|spans]  # Run criterion benchmarks

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::info;
use tracing_subscriber::EnvFilter;

use blockscape::config::ViewerConfig;
use blockscape::math::Vec3;
use blockscape::rasterizer::{Camera, Renderer};
use blockscape::world::{World, DEMO_MAP};

#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "Automation for blockscape")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render one frame headlessly and write it as a PNG
    Snapshot {
        /// Viewer config (RON); defaults are used when omitted
        #[arg(long)]
        config: Option<PathBuf>,
        /// ASCII map to render instead of the demo world
        #[arg(long)]
        map: Option<PathBuf>,
        /// Output file
        #[arg(long, default_value = "snapshot.png")]
        out: PathBuf,
        /// Camera yaw in degrees
        #[arg(long, default_value_t = 0.0)]
        yaw: f32,
        /// Camera pitch in degrees (positive looks down)
        #[arg(long, default_value_t = 0.0)]
        pitch: f32,
    },
    /// Run the criterion benchmarks
    Bench {
        /// Only run this bench target
        name: Option<String>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Snapshot { config, map, out, yaw, pitch } => snapshot(config, map, &out, yaw, pitch),
        Commands::Bench { name } => bench(name),
    }
}

/// Get the project root directory
fn project_root() -> Result<PathBuf> {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .map(Path::to_path_buf)
        .context("xtask has no parent directory")
}

/// Run a command and check for success
fn run_cmd(cmd: &mut Command) -> Result<()> {
    let status = cmd.status().context("Failed to execute command")?;
    if !status.success() {
        anyhow::bail!("Command failed with status: {}", status);
    }
    Ok(())
}

/// Render the world from its spawn point
fn snapshot(config: Option<PathBuf>, map: Option<PathBuf>, out: &Path, yaw: f32, pitch: f32) -> Result<()> {
    let config = match config {
        Some(path) => ViewerConfig::load(&path).with_context(|| format!("loading {}", path.display()))?,
        None => ViewerConfig::default(),
    };
    let map_path = map.or_else(|| config.map.clone());
    let map_text = match &map_path {
        Some(path) => std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?,
        None => DEMO_MAP.to_string(),
    };
    let world = World::from_ascii(&map_text, config.resolver.units_per_block)?;

    let mut renderer = Renderer::new(config.width, config.height, config.raster.clone());
    let mut camera = Camera::new(world.spawn + Vec3::new(0.0, config.eye_height, 0.0), config.fov_radians());
    camera.rotation_y = yaw.to_radians();
    camera.rotation_x = pitch.to_radians();
    camera.update_orientation(renderer.tables());

    let fb = renderer.render(&world, &camera);
    fb.save_png(out).with_context(|| format!("writing {}", out.display()))?;

    let stats = renderer.stats();
    info!(
        out = %out.display(),
        polygons = stats.polygons,
        culled = stats.culled,
        spans = stats.spans,
        ms = renderer.timings().total_ms(),
        "snapshot written"
    );
    Ok(())
}

fn bench(name: Option<String>) -> Result<()> {
    let root = project_root()?;
    let mut cmd = Command::new("cargo");
    cmd.current_dir(&root).args(["bench", "-p", "blockscape"]);
    if let Some(name) = name {
        cmd.args(["--bench", &name]);
    }
    run_cmd(&mut cmd)
}
