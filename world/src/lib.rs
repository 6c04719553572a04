#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Lunk.
//!
//! The world owns the landscape grid, every entity, the entity location index,
//! the score tracker and the attack rotator. It changes only through [`apply`]
//! and exposes read-only snapshots through the [`query`] module.

mod entity;
mod grid;
mod score;

use std::{collections::BTreeMap, time::Duration};

use lunk_core::{
    AttackOption, Behavior, CellCoord, Command, EntityId, EntityKind, Event, Heading, Interaction,
    Landscape, Position, RemovalCause, WallPolicy, WELCOME_BANNER,
};
use rand::{seq::SliceRandom, SeedableRng};
use rand_chacha::ChaCha8Rng;
use thiserror::Error;
use tracing::{debug, info, warn};

use entity::Entity;
use grid::{EntityIndex, LandscapeGrid};

pub use score::{ScoreDelta, ScoreEvent, ScoreTable, ScoreTracker};

const DEFAULT_LEVEL_SEED: u64 = 0x4c75_6e6b_5e1e_c7ed;

/// Gap, in cells, left between hitboxes after a saved friendly repels an enemy.
const REPEL_MARGIN: f32 = 0.1;

/// Initial placement of an entity described by a level.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Spawn {
    /// Variant of the entity to create.
    pub kind: EntityKind,
    /// Cell whose centre the entity starts at.
    pub cell: CellCoord,
}

/// Static description of a level as decoded from its tile map.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LevelLayout {
    columns: u32,
    rows: u32,
    landscape: Vec<Landscape>,
    spawns: Vec<Spawn>,
}

impl LevelLayout {
    /// Creates a layout from row-major landscape cells and entity spawns.
    #[must_use]
    pub fn new(columns: u32, rows: u32, landscape: Vec<Landscape>, spawns: Vec<Spawn>) -> Self {
        Self {
            columns,
            rows,
            landscape,
            spawns,
        }
    }

    /// Creates a layout of open ground without any spawns.
    #[must_use]
    pub fn open(columns: u32, rows: u32) -> Self {
        let capacity = usize::try_from(u64::from(columns) * u64::from(rows)).unwrap_or(0);
        Self::new(columns, rows, vec![Landscape::Open; capacity], Vec::new())
    }

    /// Returns the layout with the provided cell turned into a wall.
    ///
    /// Cells outside the layout are ignored.
    #[must_use]
    pub fn with_wall(mut self, cell: CellCoord) -> Self {
        if cell.column() < self.columns && cell.row() < self.rows {
            let index = cell.row() as usize * self.columns as usize + cell.column() as usize;
            if let Some(slot) = self.landscape.get_mut(index) {
                *slot = Landscape::Wall;
            }
        }
        self
    }

    /// Returns the layout with an additional spawn.
    #[must_use]
    pub fn with_spawn(mut self, kind: EntityKind, cell: CellCoord) -> Self {
        self.spawns.push(Spawn { kind, cell });
        self
    }

    /// Number of columns in the layout.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of rows in the layout.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Row-major landscape cells.
    #[must_use]
    pub fn landscape(&self) -> &[Landscape] {
        &self.landscape
    }

    /// Entity spawns in the order they were declared.
    #[must_use]
    pub fn spawns(&self) -> &[Spawn] {
        &self.spawns
    }
}

/// Tuning knobs for a single level.
#[derive(Clone, Debug, PartialEq)]
pub struct LevelConfig {
    /// Boredom budget the level starts with.
    pub boredom_max: u32,
    /// Score and boredom deltas of every score event.
    pub score_table: ScoreTable,
    /// Boredom removed on every decay interval.
    pub passive_decay: u32,
    /// Simulated time between two passive decay steps. Zero disables decay.
    pub decay_interval: Duration,
    /// Ticks an entity stays halted after bouncing or being thrown.
    pub halt_ticks: u32,
    /// Distance, in cells, an enemy travels when thrown.
    pub throw_distance: f32,
    /// Rescue accruals needed before a friendly counts as saved.
    pub rescue_ticks: u32,
    /// Half-extent of the neighbourhood searched when relocating an entity.
    pub relocation_radius: u32,
    /// Ticks an item survives before expiring, or `None` for items that never expire.
    pub item_lifetime_ticks: Option<u32>,
    /// Seed of the stream used to pick relocation cells.
    pub seed: u64,
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self {
            boredom_max: 100,
            score_table: ScoreTable::default(),
            passive_decay: 1,
            decay_interval: Duration::from_secs(1),
            halt_ticks: 30,
            throw_distance: 3.0,
            rescue_ticks: 60,
            relocation_radius: 5,
            item_lifetime_ticks: None,
            seed: DEFAULT_LEVEL_SEED,
        }
    }
}

/// Reasons a level layout cannot be turned into a world.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LevelError {
    /// The grid has no rows or no columns.
    #[error("level grid must have at least one column and one row, got {columns}x{rows}")]
    EmptyGrid {
        /// Declared column count.
        columns: u32,
        /// Declared row count.
        rows: u32,
    },
    /// The landscape does not hold one cell per grid position.
    #[error("landscape holds {actual} cells but a {columns}x{rows} grid needs {expected}")]
    LandscapeSize {
        /// Declared column count.
        columns: u32,
        /// Declared row count.
        rows: u32,
        /// Number of cells the grid needs.
        expected: usize,
        /// Number of cells supplied.
        actual: usize,
    },
    /// No player spawn was declared.
    #[error("level does not place a player")]
    MissingPlayer,
    /// More than one player spawn was declared.
    #[error("level places {count} players, expected exactly one")]
    DuplicatePlayer {
        /// Number of player spawns found.
        count: usize,
    },
    /// A spawn lies outside the grid.
    #[error("spawn at {cell} lies outside the grid")]
    SpawnOutOfBounds {
        /// Offending spawn cell.
        cell: CellCoord,
    },
    /// A spawn sits on a wall.
    #[error("spawn at {cell} sits on a wall")]
    SpawnOnWall {
        /// Offending spawn cell.
        cell: CellCoord,
    },
}

/// Cyclic selector of the attack option applied to the next encounter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AttackRotator {
    current: AttackOption,
}

impl AttackRotator {
    /// Creates a rotator positioned at [`AttackOption::FIRST`].
    #[must_use]
    pub const fn new() -> Self {
        Self {
            current: AttackOption::FIRST,
        }
    }

    /// Option the next encounter will use.
    #[must_use]
    pub const fn current(&self) -> AttackOption {
        self.current
    }

    /// Consumes the current option and moves to the next one.
    pub fn advance(&mut self) -> AttackOption {
        let used = self.current;
        self.current = used.next();
        used
    }
}

impl Default for AttackRotator {
    fn default() -> Self {
        Self::new()
    }
}

/// Represents the authoritative state of a running Lunk level.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    config: LevelConfig,
    landscape: LandscapeGrid,
    entities: BTreeMap<EntityId, Entity>,
    index: EntityIndex,
    score: ScoreTracker,
    attack: AttackRotator,
    rng: ChaCha8Rng,
    next_entity_id: u32,
    tick_index: u64,
    elapsed: Duration,
    decay_accumulator: Duration,
    ended: bool,
}

enum Landing {
    Inside {
        from: CellCoord,
        to: CellCoord,
    },
    Relocated {
        from: CellCoord,
        exit: CellCoord,
        to: CellCoord,
    },
    Stranded,
}

impl World {
    /// Builds a world from a validated level layout.
    pub fn new(layout: LevelLayout, config: LevelConfig) -> Result<Self, LevelError> {
        let LevelLayout {
            columns,
            rows,
            landscape,
            spawns,
        } = layout;

        if columns == 0 || rows == 0 {
            return Err(LevelError::EmptyGrid { columns, rows });
        }

        let expected = usize::try_from(u64::from(columns) * u64::from(rows)).unwrap_or(usize::MAX);
        if landscape.len() != expected {
            return Err(LevelError::LandscapeSize {
                columns,
                rows,
                expected,
                actual: landscape.len(),
            });
        }

        let grid = LandscapeGrid::new(columns, rows, landscape);

        let players = spawns
            .iter()
            .filter(|spawn| spawn.kind == EntityKind::Player)
            .count();
        match players {
            0 => return Err(LevelError::MissingPlayer),
            1 => {}
            count => return Err(LevelError::DuplicatePlayer { count }),
        }

        for spawn in &spawns {
            if !grid.contains(spawn.cell) {
                return Err(LevelError::SpawnOutOfBounds { cell: spawn.cell });
            }
            if grid.is_wall(spawn.cell) {
                return Err(LevelError::SpawnOnWall { cell: spawn.cell });
            }
        }

        let mut world = Self {
            banner: WELCOME_BANNER,
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            score: ScoreTracker::new(config.boredom_max),
            config,
            landscape: grid,
            entities: BTreeMap::new(),
            index: EntityIndex::new(columns, rows),
            attack: AttackRotator::new(),
            next_entity_id: 0,
            tick_index: 0,
            elapsed: Duration::ZERO,
            decay_accumulator: Duration::ZERO,
            ended: false,
        };

        for spawn in spawns {
            let _ = world.insert_entity(spawn.kind, spawn.cell);
        }

        info!(
            columns,
            rows,
            entities = world.entities.len(),
            boredom_max = world.config.boredom_max,
            "level loaded"
        );

        Ok(world)
    }

    fn insert_entity(&mut self, kind: EntityKind, cell: CellCoord) -> EntityId {
        let id = EntityId::new(self.next_entity_id);
        self.next_entity_id = self.next_entity_id.saturating_add(1);
        let entity = Entity::spawn(id, kind, cell, self.config.item_lifetime_ticks);
        self.index.insert(id, cell);
        let _ = self.entities.insert(id, entity);
        id
    }

    fn kind_of(&self, entity: EntityId) -> Option<EntityKind> {
        self.entities.get(&entity).map(|entity| entity.kind)
    }

    fn has_player(&self) -> bool {
        self.entities
            .values()
            .any(|entity| entity.kind == EntityKind::Player)
    }

    /// Moves an entity to `position`, keeping its recorded cell and the index in step.
    ///
    /// Returns the cells left and entered, or `None` when the entity is unknown or
    /// the position lies outside the grid.
    fn place(&mut self, entity: EntityId, position: Position) -> Option<(CellCoord, CellCoord)> {
        let (columns, rows) = self.landscape.dimensions();
        if !position.is_within(columns, rows) {
            return None;
        }
        let to = position.cell()?;
        let current = self.entities.get_mut(&entity)?;
        let from = current.cell;
        current.position = position;
        current.cell = to;
        self.index.relocate(entity, from, to);
        Some((from, to))
    }

    /// Places an entity at `attempted`, relocating it when the position left the grid.
    fn land(&mut self, entity: EntityId, attempted: Position) -> Landing {
        let (columns, rows) = self.landscape.dimensions();
        if attempted.is_within(columns, rows) {
            return match self.place(entity, attempted) {
                Some((from, to)) => Landing::Inside { from, to },
                None => Landing::Stranded,
            };
        }

        let Some(exit) = attempted.clamped_cell(columns, rows) else {
            return Landing::Stranded;
        };
        let candidates = self
            .landscape
            .open_cells_around(exit, self.config.relocation_radius);
        let Some(target) = candidates.choose(&mut self.rng).copied() else {
            debug!(
                entity = entity.get(),
                %exit,
                "no open cell near the grid exit, entity stays put"
            );
            return Landing::Stranded;
        };

        match self.place(entity, target.center()) {
            Some((from, to)) => {
                debug!(entity = entity.get(), %exit, %to, "relocated entity back inside the grid");
                Landing::Relocated { from, exit, to }
            }
            None => Landing::Stranded,
        }
    }

    fn halt(&mut self, entity: EntityId, out_events: &mut Vec<Event>) {
        let ticks = self.config.halt_ticks;
        if let Some(current) = self.entities.get_mut(&entity) {
            current.halted_ticks = ticks;
            out_events.push(Event::EntityHalted { entity, ticks });
        }
    }

    fn remove_entity(&mut self, entity: EntityId, cause: RemovalCause, out_events: &mut Vec<Event>) {
        if let Some(removed) = self.entities.remove(&entity) {
            self.index.remove(entity, removed.cell);
            debug!(entity = entity.get(), kind = ?removed.kind, ?cause, "entity removed");
            out_events.push(Event::EntityRemoved { entity, cause });
        }
    }

    fn record_score(&mut self, event: ScoreEvent, out_events: &mut Vec<Event>) {
        let score = self.score.record(event, &self.config.score_table);
        debug!(?event, score = score.score, boredom = score.boredom, "score changed");
        out_events.push(Event::ScoreChanged { score });
        self.end_if_exhausted(out_events);
    }

    fn end_if_exhausted(&mut self, out_events: &mut Vec<Event>) {
        if self.ended || !self.score.is_exhausted() {
            return;
        }
        self.ended = true;
        let score = self.score.score();
        info!(score, tick = self.tick_index, "boredom exhausted, level over");
        out_events.push(Event::LevelEnded { score });
    }

    fn advance_time(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        self.tick_index = self.tick_index.saturating_add(1);
        self.elapsed = self.elapsed.saturating_add(dt);
        out_events.push(Event::TimeAdvanced {
            dt,
            tick: self.tick_index,
        });

        let mut expired = Vec::new();
        for entity in self.entities.values_mut() {
            entity.halted_ticks = entity.halted_ticks.saturating_sub(1);
            if let Some(remaining) = entity.lifetime_ticks.as_mut() {
                *remaining = remaining.saturating_sub(1);
                if *remaining == 0 {
                    expired.push(entity.id);
                }
            }
        }
        for entity in expired {
            self.remove_entity(entity, RemovalCause::Expired, out_events);
        }

        let interval = self.config.decay_interval;
        if interval.is_zero() || self.config.passive_decay == 0 {
            return;
        }
        self.decay_accumulator = self.decay_accumulator.saturating_add(dt);
        while self.decay_accumulator >= interval {
            self.decay_accumulator -= interval;
            let score = self.score.decay(self.config.passive_decay);
            out_events.push(Event::ScoreChanged { score });
        }
        self.end_if_exhausted(out_events);
    }

    fn spawn(&mut self, kind: EntityKind, cell: CellCoord, out_events: &mut Vec<Event>) {
        if !self.landscape.contains(cell) || self.landscape.is_wall(cell) {
            warn!(%cell, ?kind, "ignoring spawn outside open ground");
            return;
        }
        if kind == EntityKind::Player && self.has_player() {
            warn!(%cell, "ignoring spawn of a second player");
            return;
        }
        let entity = self.insert_entity(kind, cell);
        out_events.push(Event::EntitySpawned { entity, kind, cell });
    }

    fn set_behavior(
        &mut self,
        entity: EntityId,
        behavior: Behavior,
        target: Option<EntityId>,
        out_events: &mut Vec<Event>,
    ) {
        let Some(current) = self.entities.get_mut(&entity) else {
            return;
        };
        current.target = target;
        if current.behavior != behavior {
            current.behavior = behavior;
            out_events.push(Event::BehaviorChanged { entity, behavior });
        }
    }

    fn move_entity(
        &mut self,
        entity: EntityId,
        heading: Heading,
        distance: f32,
        out_events: &mut Vec<Event>,
    ) {
        let Some(current) = self.entities.get_mut(&entity) else {
            return;
        };
        if current.is_halted() {
            return;
        }
        current.heading = heading;
        current.previous_position = current.position;
        let attempted = current.position.advanced(heading, distance);

        match self.land(entity, attempted) {
            Landing::Inside { from, to } => {
                out_events.push(Event::EntityMoved { entity, from, to });
            }
            Landing::Relocated { from, exit, to } => {
                out_events.push(Event::EntityRelocated { entity, exit, to });
                out_events.push(Event::EntityMoved { entity, from, to });
            }
            Landing::Stranded => {}
        }
    }

    fn resolve_wall(
        &mut self,
        entity: EntityId,
        wall: CellCoord,
        policy: WallPolicy,
        out_events: &mut Vec<Event>,
    ) {
        if !self.landscape.is_wall(wall) {
            return;
        }
        let Some(current) = self.entities.get(&entity) else {
            return;
        };

        match policy {
            WallPolicy::TurnAround => {
                let restore = current.previous_position;
                let center = wall.center();
                let dx = center.x() - current.position.x();
                let dy = center.y() - current.position.y();
                let mut heading = if dx.abs() >= dy.abs() {
                    current.heading.mirrored_horizontally()
                } else {
                    current.heading.mirrored_vertically()
                };
                if heading.dot(dx, dy) > 0.0 {
                    heading = current.heading.reversed();
                }

                let _ = self.place(entity, restore);
                if let Some(current) = self.entities.get_mut(&entity) {
                    current.heading = heading;
                }
                debug!(entity = entity.get(), %wall, "entity turned around at a wall");
                self.halt(entity, out_events);
            }
            WallPolicy::ClearWall => {
                let by_player = current.kind == EntityKind::Player;
                let _ = self.landscape.set(wall, Landscape::Open);
                debug!(entity = entity.get(), %wall, "wall cleared");
                out_events.push(Event::WallCleared { cell: wall, by: entity });
                if by_player {
                    self.record_score(ScoreEvent::WallCleared, out_events);
                }
            }
        }
    }

    fn resolve_interaction(&mut self, interaction: Interaction, out_events: &mut Vec<Event>) {
        match interaction {
            Interaction::Attack { player, enemy } => self.resolve_attack(player, enemy, out_events),
            Interaction::Threat { enemy, friendly } => {
                self.resolve_threat(enemy, friendly, out_events);
            }
            Interaction::Pickup { player, item } => {
                if self.kind_of(player) != Some(EntityKind::Player)
                    || !matches!(self.kind_of(item), Some(EntityKind::Item(_)))
                {
                    return;
                }
                self.remove_entity(item, RemovalCause::PickedUp, out_events);
                self.record_score(ScoreEvent::ItemCollected, out_events);
            }
        }
    }

    fn resolve_attack(&mut self, player: EntityId, enemy: EntityId, out_events: &mut Vec<Event>) {
        if self.kind_of(player) != Some(EntityKind::Player) {
            return;
        }
        let Some(target) = self.entities.get(&enemy) else {
            return;
        };
        let EntityKind::Enemy(kind) = target.kind else {
            return;
        };
        let edibility = target.edibility.unwrap_or(kind.edibility());

        let option = self.attack.advance();
        debug!(
            player = player.get(),
            enemy = enemy.get(),
            ?option,
            "attack resolved"
        );
        out_events.push(Event::AttackResolved {
            player,
            enemy,
            option,
        });

        match option {
            AttackOption::Crush => {
                self.remove_entity(enemy, RemovalCause::Crushed, out_events);
                self.record_score(ScoreEvent::EnemyCrushed, out_events);
            }
            AttackOption::Throw => self.throw_enemy(player, enemy, out_events),
            AttackOption::Eat => {
                self.remove_entity(enemy, RemovalCause::Eaten, out_events);
                self.record_score(ScoreEvent::EnemyEaten(edibility), out_events);
            }
        }
    }

    fn throw_enemy(&mut self, player: EntityId, enemy: EntityId, out_events: &mut Vec<Event>) {
        let Some(heading) = self.entities.get(&player).map(|player| player.heading) else {
            return;
        };
        let Some(thrown) = self.entities.get_mut(&enemy) else {
            return;
        };
        thrown.heading = heading;
        let origin = thrown.cell;
        let attempted = thrown.position.advanced(heading, self.config.throw_distance);

        let (from, to) = match self.land(enemy, attempted) {
            Landing::Inside { from, to } => (from, to),
            Landing::Relocated { from, exit, to } => {
                out_events.push(Event::EntityRelocated {
                    entity: enemy,
                    exit,
                    to,
                });
                (from, to)
            }
            Landing::Stranded => (origin, origin),
        };
        if let Some(thrown) = self.entities.get_mut(&enemy) {
            thrown.previous_position = thrown.position;
        }
        out_events.push(Event::EntityThrown {
            entity: enemy,
            from,
            to,
        });

        if self.landscape.is_wall(to) {
            self.remove_entity(enemy, RemovalCause::Crushed, out_events);
            self.record_score(ScoreEvent::EnemyCrushed, out_events);
            return;
        }

        let victim = self.index.occupants(to).iter().copied().find(|candidate| {
            self.entities
                .get(candidate)
                .is_some_and(Entity::is_unsaved_friendly)
        });
        match victim {
            Some(friendly) => {
                self.remove_entity(friendly, RemovalCause::FriendlyFire, out_events);
                self.record_score(ScoreEvent::FriendlyLost, out_events);
            }
            None => self.halt(enemy, out_events),
        }
    }

    fn resolve_threat(&mut self, enemy: EntityId, friendly: EntityId, out_events: &mut Vec<Event>) {
        if !matches!(self.kind_of(enemy), Some(EntityKind::Enemy(_))) {
            return;
        }
        let Some(saved) = self
            .entities
            .get(&friendly)
            .filter(|candidate| matches!(candidate.kind, EntityKind::Friendly(_)))
            .map(|candidate| candidate.saved)
        else {
            return;
        };

        if !saved {
            self.remove_entity(friendly, RemovalCause::Threatened, out_events);
            self.record_score(ScoreEvent::FriendlyLost, out_events);
            return;
        }

        let Some((target, away)) = self.repel_target(enemy, friendly) else {
            return;
        };
        let blocked = target
            .cell()
            .is_some_and(|cell| self.landscape.is_wall(cell));
        if blocked || self.place(enemy, target).is_none() {
            debug!(
                enemy = enemy.get(),
                friendly = friendly.get(),
                x = target.x(),
                y = target.y(),
                "no open ground to repel the enemy onto, enemy holds its ground"
            );
        } else {
            if let Some(attacker) = self.entities.get_mut(&enemy) {
                attacker.heading = away;
                attacker.previous_position = target;
            }
            debug!(
                enemy = enemy.get(),
                friendly = friendly.get(),
                "saved friendly repelled an enemy"
            );
        }
        self.halt(enemy, out_events);
    }

    /// Spot just clear of the friendly's hitbox on the enemy's side, with the
    /// heading pointing away from the friendly.
    ///
    /// An enemy sitting exactly on the friendly is pushed back against its own heading.
    fn repel_target(&self, enemy: EntityId, friendly: EntityId) -> Option<(Position, Heading)> {
        let attacker = self.entities.get(&enemy)?;
        let defender = self.entities.get(&friendly)?;
        let away = if attacker.position == defender.position {
            attacker.heading.reversed()
        } else {
            defender.position.heading_to(attacker.position)
        };
        let clearance =
            attacker.kind.hitbox_radius() + defender.kind.hitbox_radius() + REPEL_MARGIN;
        Some((defender.position.advanced(away, clearance), away))
    }

    fn accrue_rescue(&mut self, friendly: EntityId, out_events: &mut Vec<Event>) {
        let rescue_ticks = self.config.rescue_ticks;
        let Some(current) = self.entities.get_mut(&friendly) else {
            return;
        };
        let rescuable = matches!(current.kind, EntityKind::Friendly(kind) if kind.is_rescuable());
        if !rescuable || current.saved {
            return;
        }
        current.rescue_progress = current.rescue_progress.saturating_add(1);
        if current.rescue_progress < rescue_ticks {
            return;
        }
        current.saved = true;
        info!(friendly = friendly.get(), "friendly rescued");
        out_events.push(Event::FriendlySaved { friendly });
        self.record_score(ScoreEvent::FriendlyRescued, out_events);
    }
}

/// Applies the provided command to the world, mutating state deterministically.
///
/// Once the level has ended every command is ignored.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    if world.ended {
        return;
    }

    match command {
        Command::Tick { dt } => world.advance_time(dt, out_events),
        Command::SpawnEntity { kind, cell } => world.spawn(kind, cell, out_events),
        Command::SetBehavior {
            entity,
            behavior,
            target,
        } => world.set_behavior(entity, behavior, target, out_events),
        Command::MoveEntity {
            entity,
            heading,
            distance,
        } => world.move_entity(entity, heading, distance, out_events),
        Command::ResolveWallCollision {
            entity,
            wall,
            policy,
        } => world.resolve_wall(entity, wall, policy, out_events),
        Command::ResolveInteraction { interaction } => {
            world.resolve_interaction(interaction, out_events);
        }
        Command::AccrueRescue { friendly } => world.accrue_rescue(friendly, out_events),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use lunk_core::{
        AttackOption, EntityId, EntitySnapshot, EntityView, LandscapeView, OccupancyView,
        ScoreSnapshot,
    };

    use super::{LevelConfig, World};

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Dimensions of the grid as `(columns, rows)`.
    #[must_use]
    pub fn dimensions(world: &World) -> (u32, u32) {
        world.landscape.dimensions()
    }

    /// Exposes a read-only view of the landscape grid.
    #[must_use]
    pub fn landscape_view(world: &World) -> LandscapeView<'_> {
        world.landscape.view()
    }

    /// Exposes a read-only view of the entity location index.
    #[must_use]
    pub fn occupancy_view(world: &World) -> OccupancyView<'_> {
        world.index.view()
    }

    /// Captures a read-only view of every entity in the level.
    #[must_use]
    pub fn entity_view(world: &World) -> EntityView {
        EntityView::from_snapshots(world.entities.values().map(|entity| entity.snapshot()).collect())
    }

    /// Captures the snapshot of a single entity.
    #[must_use]
    pub fn entity(world: &World, entity: EntityId) -> Option<EntitySnapshot> {
        world.entities.get(&entity).map(|entity| entity.snapshot())
    }

    /// Current score and boredom counters.
    #[must_use]
    pub fn score(world: &World) -> ScoreSnapshot {
        world.score.snapshot()
    }

    /// Attack option the next player and enemy encounter will use.
    #[must_use]
    pub fn next_attack(world: &World) -> AttackOption {
        world.attack.current()
    }

    /// Number of ticks processed so far.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }

    /// Simulated time elapsed since the level started.
    #[must_use]
    pub fn elapsed(world: &World) -> Duration {
        world.elapsed
    }

    /// Reports whether the boredom budget ran out.
    #[must_use]
    pub fn level_ended(world: &World) -> bool {
        world.ended
    }

    /// Tuning the level was built with.
    #[must_use]
    pub fn config(world: &World) -> &LevelConfig {
        &world.config
    }
}
