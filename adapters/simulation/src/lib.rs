#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Fixed-tick pipeline that drives the Lunk world and its systems.
//!
//! Every tick runs the stages in a fixed order: the clock tick, movement
//! (which consumes the player's steering), collision resolution, behaviour
//! selection, and finally the camera. Score changes are applied by the world
//! as interactions resolve. Events produced late in a tick are replayed to
//! the movement system at the start of the next one so it sees removals and
//! behaviour changes.

mod scene;
mod timestep;

use std::{collections::BTreeSet, mem, time::Duration};

use anyhow::{bail, Context, Result};
use glam::Vec2;
use lunk_core::{Command, Event, Position, Steering};
use lunk_rendering::{Scene, TileGridPresentation};
use lunk_system_behavior::{BehaviorSelector, RuleBook, SelectorConfig};
use lunk_system_camera::{Camera, CameraConfig};
use lunk_system_collision::{Collision, CollisionConfig};
use lunk_system_movement::{Movement, MovementTuning};
use lunk_tilemap::{TileMap, TilemapError, DEFAULT_TILE_SIZE};
use lunk_world::{self as world, query, LevelConfig, World};
use tracing::{debug, info, warn};

pub use timestep::{FixedTimestep, StepPlan};

/// Tuning for the whole pipeline.
#[derive(Clone, Debug, PartialEq)]
pub struct SimulationConfig {
    /// Simulation ticks per second.
    pub target_tps: u32,
    /// Longest frame accepted by the accumulator; longer frames are clamped.
    pub max_frame_delta: Duration,
    /// Upper bound on ticks run for a single frame.
    pub max_ticks_per_frame: u32,
    /// Movement tuning.
    pub movement: MovementTuning,
    /// Collision tuning.
    pub collision: CollisionConfig,
    /// Behaviour selector tuning.
    pub selector: SelectorConfig,
    /// Camera tuning; bounds are filled in from the level.
    pub camera: CameraConfig,
    /// Visible region in cells.
    pub viewport_size: Vec2,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            target_tps: 60,
            max_frame_delta: Duration::from_millis(250),
            max_ticks_per_frame: 5,
            movement: MovementTuning::default(),
            collision: CollisionConfig::default(),
            selector: SelectorConfig::default(),
            camera: CameraConfig::default(),
            viewport_size: Vec2::new(20.0, 15.0),
        }
    }
}

/// World plus the systems and adapters state needed to advance it.
#[derive(Debug)]
pub struct Simulation {
    world: World,
    config: SimulationConfig,
    tilemap: Option<TileMap>,
    movement: Movement,
    collision: Collision,
    selector: BehaviorSelector,
    camera: Camera,
    timestep: FixedTimestep,
    carried_events: Vec<Event>,
    placeholder_codes: BTreeSet<i32>,
}

impl Simulation {
    /// Wraps an already built world.
    #[must_use]
    pub fn new(world: World, config: SimulationConfig) -> Self {
        let (columns, rows) = query::dimensions(&world);
        let focus = player_position(&world).unwrap_or(Position::new(0.0, 0.0));
        let camera = Camera::new(
            CameraConfig {
                bounds: Some(Vec2::new(columns as f32, rows as f32)),
                ..config.camera
            },
            config.viewport_size,
            focus,
        );

        Self {
            world,
            tilemap: None,
            movement: Movement::new(config.movement),
            collision: Collision::new(config.collision),
            selector: BehaviorSelector::new(config.selector, RuleBook::default()),
            camera,
            timestep: FixedTimestep::new(
                config.target_tps,
                config.max_frame_delta,
                config.max_ticks_per_frame,
            ),
            carried_events: Vec::new(),
            placeholder_codes: BTreeSet::new(),
            config,
        }
    }

    /// Builds the world described by `map` and keeps the map for drawing.
    pub fn from_tilemap(
        map: TileMap,
        level: LevelConfig,
        config: SimulationConfig,
    ) -> Result<Self, TilemapError> {
        let world = map.build_world(level)?;
        let mut simulation = Self::new(world, config);
        simulation.tilemap = Some(map);
        Ok(simulation)
    }

    /// Rebuilds the level from its tile map, discarding all progress.
    ///
    /// The world is rebuilt with the tuning it was first built with, and every
    /// system starts over, so a restarted level replays like a freshly loaded one.
    pub fn restart(&mut self) -> Result<()> {
        let Some(map) = self.tilemap.as_ref() else {
            bail!("only levels loaded from a tile map can be restarted");
        };
        let level = query::config(&self.world).clone();
        let world = map
            .build_world(level)
            .with_context(|| format!("failed to rebuild level `{}`", map.manifest().name))?;

        let tilemap = self.tilemap.take();
        *self = Self::new(world, self.config.clone());
        self.tilemap = tilemap;
        info!(
            name = self.tilemap.as_ref().map_or("", |map| map.manifest().name.as_str()),
            "level restarted"
        );
        Ok(())
    }

    /// World being simulated.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Camera following the player.
    #[must_use]
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Tile map the level was loaded from, if any.
    #[must_use]
    pub fn tilemap(&self) -> Option<&TileMap> {
        self.tilemap.as_ref()
    }

    /// Simulated time covered by one tick.
    #[must_use]
    pub fn fixed_dt(&self) -> Duration {
        self.timestep.fixed_dt()
    }

    /// Tile codes that were drawn as placeholders, in ascending order.
    pub fn placeholder_codes(&self) -> impl Iterator<Item = i32> + '_ {
        self.placeholder_codes.iter().copied()
    }

    /// Feeds a rendered frame into the accumulator and runs the ticks it covers.
    ///
    /// Returns every event produced by those ticks.
    pub fn advance(&mut self, frame_dt: Duration, steering: Steering) -> Vec<Event> {
        let plan = self.timestep.advance(frame_dt);
        if plan.dropped_backlog > Duration::ZERO {
            warn!(
                dropped_ms = plan.dropped_backlog.as_millis() as u64,
                ticks = plan.ticks_to_run,
                "simulation fell behind; dropping backlog"
            );
        }

        let mut events = Vec::new();
        for _ in 0..plan.ticks_to_run {
            events.extend(self.tick(steering));
        }
        events
    }

    /// Runs exactly one tick and returns the events it produced, in stage order.
    pub fn tick(&mut self, steering: Steering) -> Vec<Event> {
        let dt = self.timestep.fixed_dt();
        let mut tick_events = Vec::new();
        world::apply(&mut self.world, Command::Tick { dt }, &mut tick_events);
        if tick_events.is_empty() {
            return tick_events;
        }

        let mut movement_input = mem::take(&mut self.carried_events);
        movement_input.extend(tick_events.iter().cloned());
        let mut commands = Vec::new();
        self.movement.handle(
            &movement_input,
            steering,
            &query::entity_view(&self.world),
            &mut commands,
        );
        let move_events = self.execute(commands);

        let mut commands = Vec::new();
        self.collision.handle(
            &move_events,
            &query::entity_view(&self.world),
            query::landscape_view(&self.world),
            query::occupancy_view(&self.world),
            &mut commands,
        );
        let collision_events = self.execute(commands);

        let mut commands = Vec::new();
        self.selector.handle(
            &tick_events,
            &query::entity_view(&self.world),
            query::landscape_view(&self.world),
            &mut commands,
        );
        let behavior_events = self.execute(commands);

        if let Some(position) = player_position(&self.world) {
            self.camera.update(position);
        }

        self.carried_events
            .extend(collision_events.iter().chain(&behavior_events).cloned());

        let mut events = tick_events;
        events.extend(move_events);
        events.extend(collision_events);
        events.extend(behavior_events);

        for event in &events {
            if let Event::LevelEnded { score } = event {
                info!(score, ticks = query::tick_index(&self.world), "level ended");
            }
        }
        events
    }

    /// Runs `ticks` ticks with constant steering, stopping early when the level ends.
    ///
    /// Returns the number of ticks that were run.
    pub fn run_headless(&mut self, ticks: u64, steering: Steering) -> u64 {
        let mut ran = 0;
        while ran < ticks && !query::level_ended(&self.world) {
            let _ = self.tick(steering);
            ran += 1;
        }
        debug!(ran, requested = ticks, "headless run finished");
        ran
    }

    /// Creates an empty scene sized for the current level.
    pub fn scene(&self) -> Result<Scene> {
        let (columns, rows) = query::dimensions(&self.world);
        let tile_size = self
            .tilemap
            .as_ref()
            .map_or(DEFAULT_TILE_SIZE, |map| map.manifest().tile_size);
        let grid = TileGridPresentation::new(columns, rows, tile_size as f32)
            .context("failed to describe the tile grid")?;
        Ok(Scene::new(grid))
    }

    /// Refreshes `scene` from the current world state.
    pub fn populate_scene(&mut self, scene: &mut Scene) {
        scene::populate(
            scene,
            &self.world,
            self.tilemap.as_ref(),
            &self.camera,
            &mut self.placeholder_codes,
        );
    }

    fn execute(&mut self, commands: Vec<Command>) -> Vec<Event> {
        let mut events = Vec::new();
        for command in commands {
            world::apply(&mut self.world, command, &mut events);
        }
        events
    }
}

fn player_position(world: &World) -> Option<Position> {
    query::entity_view(world).player().map(|player| player.position)
}
