#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that boots a Lunk level.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use lunk_core::{ScoreSnapshot, Steering};
use lunk_rendering::{Palette, Presentation, RenderingBackend};
use lunk_rendering_macroquad::MacroquadBackend;
use lunk_simulation::{Simulation, SimulationConfig};
use lunk_tilemap::TileMap;
use lunk_world::query;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Command-line arguments accepted by the `lunk` binary.
#[derive(Debug, Parser)]
#[command(name = "lunk", about = "Guide Lunk through a tile-grid level.")]
struct CliArgs {
    /// Level manifest (TOML) describing the layers to load.
    #[arg(long, value_name = "PATH")]
    level: PathBuf,
    /// Seed shared by relocation and wall-policy randomness.
    #[arg(long)]
    seed: Option<u64>,
    /// Runs the simulation without opening a window.
    #[arg(long)]
    headless: bool,
    /// Ticks to simulate in headless mode.
    #[arg(long, default_value_t = 3600)]
    ticks: u64,
    /// Times the level is played in headless mode, restarting it in between.
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    runs: u32,
    /// Logs the frame rate once per second while windowed.
    #[arg(long)]
    show_fps: bool,
    /// Disables vertical sync while windowed.
    #[arg(long)]
    no_vsync: bool,
}

/// Entry point for the Lunk command-line interface.
fn main() -> Result<()> {
    init_tracing();
    let args = CliArgs::parse();

    let simulation = build_simulation(&args)?;
    println!("{}", query::welcome_banner(simulation.world()));

    if args.headless {
        let _ = run_headless(simulation, &args)?;
        return Ok(());
    }
    run_windowed(simulation, &args)
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

fn build_simulation(args: &CliArgs) -> Result<Simulation> {
    let map = TileMap::load(&args.level)
        .with_context(|| format!("failed to load level {}", args.level.display()))?;

    let mut level = map.level_config();
    let mut config = SimulationConfig::default();
    if let Some(seed) = args.seed {
        level.seed = seed;
        config.collision.seed = seed;
    }

    let name = map.manifest().name.clone();
    let simulation =
        Simulation::from_tilemap(map, level, config).context("failed to build the level")?;
    let (columns, rows) = query::dimensions(simulation.world());
    info!(level = %name, columns, rows, "level ready");
    Ok(simulation)
}

/// Plays the level `args.runs` times and returns the final score of every run.
fn run_headless(mut simulation: Simulation, args: &CliArgs) -> Result<Vec<ScoreSnapshot>> {
    let mut scores = Vec::new();
    for run in 1..=args.runs {
        if run > 1 {
            simulation.restart()?;
        }
        let ran = simulation.run_headless(args.ticks, Steering::None);
        let score = query::score(simulation.world());
        info!(
            run,
            ticks = ran,
            score = score.score,
            boredom = score.boredom,
            ended = query::level_ended(simulation.world()),
            "headless run complete"
        );
        scores.push(score);
    }
    Ok(scores)
}

fn run_windowed(mut simulation: Simulation, args: &CliArgs) -> Result<()> {
    let mut scene = simulation.scene()?;
    simulation.populate_scene(&mut scene);

    let presentation = Presentation::new("Lunk", Palette::BACKDROP, scene);
    let backend = MacroquadBackend::new()
        .with_vsync(!args.no_vsync)
        .with_show_fps(args.show_fps);

    backend.run(presentation, move |dt, input, scene| {
        if input.restart {
            if let Err(error) = simulation.restart() {
                warn!("restart failed: {error:#}");
            }
        }
        let _ = simulation.advance(dt, input.steering);
        simulation.populate_scene(scene);
    })
}
