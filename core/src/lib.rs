#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Lunk simulation.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters and systems submit
//! [`Command`] values describing desired mutations, the world executes those
//! commands via its `apply` entry point, and then broadcasts [`Event`] values
//! for systems to react to deterministically. Systems consume event streams,
//! query immutable views, and respond exclusively with new command batches.

mod geometry;

use std::{fmt, time::Duration};

use serde::{Deserialize, Serialize};

pub use geometry::{line_cells, Heading, Position, Quadrant};

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Lunk, the reluctant hero.";

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances the simulation clock by one tick of the provided duration.
    Tick {
        /// Duration of simulated time covered by the tick.
        dt: Duration,
    },
    /// Requests that a new entity appear at the centre of a cell.
    SpawnEntity {
        /// Variant of the entity to create.
        kind: EntityKind,
        /// Cell the entity should occupy.
        cell: CellCoord,
    },
    /// Records the behaviour an NPC should follow from now on.
    SetBehavior {
        /// Entity whose behaviour changes.
        entity: EntityId,
        /// Behaviour selected for the entity.
        behavior: Behavior,
        /// Entity the behaviour is aimed at, if any.
        target: Option<EntityId>,
    },
    /// Requests that an entity adopt a heading and advance along it.
    MoveEntity {
        /// Entity that moves.
        entity: EntityId,
        /// Heading adopted before the step is taken.
        heading: Heading,
        /// Distance travelled along the heading, in cells.
        distance: f32,
    },
    /// Applies a rolled wall policy to an entity that walked into a wall.
    ResolveWallCollision {
        /// Entity that hit the wall.
        entity: EntityId,
        /// Wall cell that was hit.
        wall: CellCoord,
        /// Policy branch selected for the collision.
        policy: WallPolicy,
    },
    /// Applies the interaction policy for two overlapping entities.
    ResolveInteraction {
        /// Interaction selected from the pair's variant tags.
        interaction: Interaction,
    },
    /// Credits one tick of rescue progress to a friendly near the player.
    AccrueRescue {
        /// Friendly being rescued.
        friendly: EntityId,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
        /// Sequential index of the tick, starting at one.
        tick: u64,
    },
    /// Confirms that an entity was created.
    EntitySpawned {
        /// Identifier assigned to the entity.
        entity: EntityId,
        /// Variant of the entity.
        kind: EntityKind,
        /// Cell the entity occupies.
        cell: CellCoord,
    },
    /// Announces that an NPC switched behaviour.
    BehaviorChanged {
        /// Entity whose behaviour changed.
        entity: EntityId,
        /// Behaviour now active.
        behavior: Behavior,
    },
    /// Confirms that an entity completed a movement step.
    EntityMoved {
        /// Entity that moved.
        entity: EntityId,
        /// Cell occupied before the step.
        from: CellCoord,
        /// Cell occupied after the step.
        to: CellCoord,
    },
    /// Reports that an entity left the grid and was placed back inside it.
    EntityRelocated {
        /// Entity that was relocated.
        entity: EntityId,
        /// In-grid cell nearest to where the entity left the grid.
        exit: CellCoord,
        /// Cell the entity was relocated to.
        to: CellCoord,
    },
    /// Reports that an entity stopped moving for a number of ticks.
    EntityHalted {
        /// Entity that halted.
        entity: EntityId,
        /// Number of ticks the halt lasts.
        ticks: u32,
    },
    /// Confirms that a wall cell was cleared into open ground.
    WallCleared {
        /// Cell that no longer holds a wall.
        cell: CellCoord,
        /// Entity whose collision cleared the wall.
        by: EntityId,
    },
    /// Reports which attack option resolved a player and enemy encounter.
    AttackResolved {
        /// Player performing the attack.
        player: EntityId,
        /// Enemy on the receiving end.
        enemy: EntityId,
        /// Attack option consumed by the encounter.
        option: AttackOption,
    },
    /// Reports that an enemy was thrown to a new cell.
    EntityThrown {
        /// Entity that was thrown.
        entity: EntityId,
        /// Cell the entity left.
        from: CellCoord,
        /// Cell the entity landed in.
        to: CellCoord,
    },
    /// Confirms that an entity left the level.
    EntityRemoved {
        /// Entity that was removed.
        entity: EntityId,
        /// Reason the entity was removed.
        cause: RemovalCause,
    },
    /// Announces that a friendly has been saved for the rest of the level.
    FriendlySaved {
        /// Friendly that was saved.
        friendly: EntityId,
    },
    /// Reports the score and boredom counters after they changed.
    ScoreChanged {
        /// Snapshot of the counters after the change.
        score: ScoreSnapshot,
    },
    /// Announces that the boredom counter ran out and the level is over.
    LevelEnded {
        /// Final score of the level.
        score: u32,
    },
}

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Computes the Manhattan distance between two cell coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: CellCoord) -> u32 {
        self.column().abs_diff(other.column()) + self.row().abs_diff(other.row())
    }

    /// Computes the Chebyshev distance between two cell coordinates.
    ///
    /// This is the distance used by every proximity rule.
    #[must_use]
    pub fn chebyshev_distance(self, other: CellCoord) -> u32 {
        self.column()
            .abs_diff(other.column())
            .max(self.row().abs_diff(other.row()))
    }

    /// Continuous position at the centre of the cell.
    #[must_use]
    pub fn center(self) -> Position {
        Position::new(self.column as f32 + 0.5, self.row as f32 + 0.5)
    }
}

impl fmt::Display for CellCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.column, self.row)
    }
}

/// Unique identifier assigned to an entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(u32);

impl EntityId {
    /// Creates a new entity identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Discriminated variant of every entity that can inhabit a level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    /// The hero steered by the player.
    Player,
    /// Hostile NPC.
    Enemy(EnemyKind),
    /// Friendly NPC that can be rescued.
    Friendly(FriendlyKind),
    /// Collectible item.
    Item(ItemKind),
}

impl EntityKind {
    /// Variant tag used to dispatch pair interactions.
    #[must_use]
    pub const fn tag(self) -> VariantTag {
        match self {
            Self::Player => VariantTag::Player,
            Self::Enemy(_) => VariantTag::Enemy,
            Self::Friendly(_) => VariantTag::Friendly,
            Self::Item(_) => VariantTag::Item,
        }
    }

    /// Radius of the entity's hitbox in cells.
    #[must_use]
    pub const fn hitbox_radius(self) -> f32 {
        match self {
            Self::Player => 0.4,
            Self::Enemy(EnemyKind::Skeleton) => 0.4,
            Self::Enemy(EnemyKind::Minotaur) => 1.4,
            Self::Friendly(FriendlyKind::Damsel | FriendlyKind::Postman) => 0.4,
            Self::Item(ItemKind::Crystal) => 0.3,
        }
    }

    /// Reports whether the entity moves under its own power.
    #[must_use]
    pub const fn is_mobile(self) -> bool {
        !matches!(self, Self::Item(_))
    }
}

/// Hostile NPC species.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyKind {
    /// Basic skeleton.
    Skeleton,
    /// Large minotaur spanning several tiles.
    Minotaur,
}

impl EnemyKind {
    /// Edibility assigned to freshly spawned enemies of this kind.
    #[must_use]
    pub const fn edibility(self) -> Edibility {
        match self {
            Self::Skeleton => Edibility::Rotten,
            Self::Minotaur => Edibility::Tasty,
        }
    }
}

/// Friendly NPC species.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FriendlyKind {
    /// Damsel awaiting rescue.
    Damsel,
    /// Neutral courier that wanders the level and only runs from enemies.
    Postman,
}

impl FriendlyKind {
    /// Reports whether the player can rescue this kind by staying close.
    #[must_use]
    pub const fn is_rescuable(self) -> bool {
        matches!(self, Self::Damsel)
    }
}

/// Collectible item species.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemKind {
    /// Crystal that relieves boredom when collected.
    Crystal,
}

/// Coarse variant tag of an entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VariantTag {
    /// Tag of [`EntityKind::Player`].
    Player,
    /// Tag of [`EntityKind::Enemy`].
    Enemy,
    /// Tag of [`EntityKind::Friendly`].
    Friendly,
    /// Tag of [`EntityKind::Item`].
    Item,
}

/// Whether eating an enemy relieves or deepens boredom.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Edibility {
    /// Eating the enemy is a positive event.
    Tasty,
    /// Eating the enemy is a negative event.
    Rotten,
}

/// Steering signal supplied by the input backend for the player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum Steering {
    /// Keep the current heading.
    #[default]
    None,
    /// Rotate counter-clockwise.
    TurnLeft,
    /// Rotate clockwise.
    TurnRight,
}

/// Discrete movement mode chosen by the proximity behaviour selector.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Behavior {
    /// Stand still.
    #[default]
    Idle,
    /// Walk back and forth, flipping direction periodically.
    Patrol,
    /// Chase the target at double speed.
    PursueFast,
    /// Chase the target at normal speed.
    PursueSlow,
    /// Chase the player because the target is out of reach.
    PursuePlayer,
    /// Move away from the target.
    Flee,
    /// Walk behind the target.
    Follow,
    /// Rush along a heading locked toward the target until the charge runs out.
    Charge,
}

/// Cyclic attack option applied to the next player and enemy encounter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttackOption {
    /// Removes the enemy outright.
    Crush,
    /// Hurls the enemy along the player's heading.
    Throw,
    /// Consumes the enemy with an effect depending on its edibility.
    Eat,
}

impl AttackOption {
    const CYCLE: [AttackOption; 3] = [Self::Crush, Self::Throw, Self::Eat];

    /// Option active when a level starts.
    pub const FIRST: AttackOption = AttackOption::Crush;

    /// Position of the option within the rotation.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Crush => 0,
            Self::Throw => 1,
            Self::Eat => 2,
        }
    }

    /// Option that follows this one, wrapping after [`AttackOption::Eat`].
    #[must_use]
    pub const fn next(self) -> Self {
        Self::CYCLE[(self.index() + 1) % Self::CYCLE.len()]
    }
}

/// Landscape type of a single grid cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Landscape {
    /// Walkable ground.
    #[default]
    Open,
    /// Blocking wall.
    Wall,
}

/// Branch selected when an entity walks into a wall.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WallPolicy {
    /// Halt, back away from the wall, then resume.
    TurnAround,
    /// Remove the wall at the cost of boredom.
    ClearWall,
}

/// Interaction selected for two overlapping entities.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Interaction {
    /// The player meets an enemy and applies the current attack option.
    Attack {
        /// Player taking part.
        player: EntityId,
        /// Enemy taking part.
        enemy: EntityId,
    },
    /// An enemy reaches a friendly.
    Threat {
        /// Enemy taking part.
        enemy: EntityId,
        /// Friendly taking part.
        friendly: EntityId,
    },
    /// The player reaches an item.
    Pickup {
        /// Player taking part.
        player: EntityId,
        /// Item taking part.
        item: EntityId,
    },
}

/// Selects the interaction for an overlapping pair from their variant tags.
///
/// The result does not depend on the order of the pair. Pairs without a policy
/// yield `None`.
#[must_use]
pub fn interaction_for(
    first: (EntityId, EntityKind),
    second: (EntityId, EntityKind),
) -> Option<Interaction> {
    use VariantTag::{Enemy, Friendly, Item, Player};

    match (first.1.tag(), second.1.tag()) {
        (Player, Enemy) => Some(Interaction::Attack {
            player: first.0,
            enemy: second.0,
        }),
        (Enemy, Player) => Some(Interaction::Attack {
            player: second.0,
            enemy: first.0,
        }),
        (Enemy, Friendly) => Some(Interaction::Threat {
            enemy: first.0,
            friendly: second.0,
        }),
        (Friendly, Enemy) => Some(Interaction::Threat {
            enemy: second.0,
            friendly: first.0,
        }),
        (Player, Item) => Some(Interaction::Pickup {
            player: first.0,
            item: second.0,
        }),
        (Item, Player) => Some(Interaction::Pickup {
            player: second.0,
            item: first.0,
        }),
        _ => None,
    }
}

/// Reasons an entity may leave the level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RemovalCause {
    /// Crushed by the player, or thrown into a wall.
    Crushed,
    /// Eaten by the player.
    Eaten,
    /// Friendly hit by a thrown enemy.
    FriendlyFire,
    /// Friendly caught by an enemy.
    Threatened,
    /// Item collected by the player.
    PickedUp,
    /// Item lifetime ran out.
    Expired,
}

/// Score and boredom counters of the running level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScoreSnapshot {
    /// Accumulated score, never negative.
    pub score: u32,
    /// Remaining boredom budget; the level ends when it reaches zero.
    pub boredom: u32,
    /// Boredom budget the level started with.
    pub boredom_max: u32,
}

impl ScoreSnapshot {
    /// Remaining boredom as a fraction of the maximum in `[0, 1]`.
    #[must_use]
    pub fn boredom_fraction(&self) -> f32 {
        if self.boredom_max == 0 {
            return 0.0;
        }
        self.boredom as f32 / self.boredom_max as f32
    }
}

/// Immutable representation of a single entity's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EntitySnapshot {
    /// Unique identifier assigned to the entity.
    pub id: EntityId,
    /// Variant of the entity.
    pub kind: EntityKind,
    /// Continuous position in cell units.
    pub position: Position,
    /// Current heading.
    pub heading: Heading,
    /// Cell recorded in the entity location index.
    pub cell: CellCoord,
    /// Behaviour currently followed.
    pub behavior: Behavior,
    /// Entity targeted by the current behaviour, if any.
    pub target: Option<EntityId>,
    /// Remaining ticks during which the entity may not move.
    pub halted_ticks: u32,
    /// Whether a friendly has been saved.
    pub saved: bool,
    /// Rescue ticks accrued by a friendly that is not yet saved.
    pub rescue_progress: u32,
}

impl EntitySnapshot {
    /// Compass quadrant derived from the heading.
    #[must_use]
    pub fn quadrant(&self) -> Quadrant {
        self.heading.quadrant()
    }

    /// Reports whether the entity is currently halted.
    #[must_use]
    pub const fn is_halted(&self) -> bool {
        self.halted_ticks > 0
    }
}

/// Read-only snapshot describing all entities within the level.
#[derive(Clone, Debug, Default)]
pub struct EntityView {
    snapshots: Vec<EntitySnapshot>,
}

impl EntityView {
    /// Creates a new entity view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<EntitySnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured snapshots in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = &EntitySnapshot> {
        self.snapshots.iter()
    }

    /// Looks up the snapshot of a single entity.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&EntitySnapshot> {
        self.snapshots
            .binary_search_by_key(&id, |snapshot| snapshot.id)
            .ok()
            .and_then(|index| self.snapshots.get(index))
    }

    /// Snapshot of the player, if the level has one.
    #[must_use]
    pub fn player(&self) -> Option<&EntitySnapshot> {
        self.snapshots
            .iter()
            .find(|snapshot| snapshot.kind == EntityKind::Player)
    }

    /// Number of captured snapshots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<EntitySnapshot> {
        self.snapshots
    }
}

/// Read-only view into the landscape grid.
#[derive(Clone, Copy, Debug)]
pub struct LandscapeView<'a> {
    cells: &'a [Landscape],
    columns: u32,
    rows: u32,
}

impl<'a> LandscapeView<'a> {
    /// Captures a new landscape view backed by the provided row-major cells.
    #[must_use]
    pub fn new(cells: &'a [Landscape], columns: u32, rows: u32) -> Self {
        Self {
            cells,
            columns,
            rows,
        }
    }

    /// Landscape of the provided cell, or `None` outside the grid.
    #[must_use]
    pub fn landscape(&self, cell: CellCoord) -> Option<Landscape> {
        self.index(cell)
            .and_then(|index| self.cells.get(index).copied())
    }

    /// Reports whether the cell holds a wall. Cells outside the grid are not walls.
    #[must_use]
    pub fn is_wall(&self, cell: CellCoord) -> bool {
        self.landscape(cell) == Some(Landscape::Wall)
    }

    /// Reports whether the cell lies inside the grid.
    #[must_use]
    pub const fn contains(&self, cell: CellCoord) -> bool {
        cell.column() < self.columns && cell.row() < self.rows
    }

    /// Reports whether a straight line between two cells avoids every wall.
    ///
    /// The endpoints themselves are not inspected.
    #[must_use]
    pub fn line_is_clear(&self, from: CellCoord, to: CellCoord) -> bool {
        let cells = line_cells(from, to);
        let interior = cells.len().saturating_sub(1);
        cells
            .iter()
            .take(interior)
            .skip(1)
            .all(|cell| self.contains(*cell) && !self.is_wall(*cell))
    }

    /// Returns an iterator over all cells in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = Landscape> + 'a {
        self.cells.iter().copied()
    }

    /// Provides the dimensions of the underlying grid.
    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.columns, self.rows)
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if self.contains(cell) {
            let row = usize::try_from(cell.row()).ok()?;
            let column = usize::try_from(cell.column()).ok()?;
            let width = usize::try_from(self.columns).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }
}

/// Read-only view into the entity location index.
#[derive(Clone, Copy, Debug)]
pub struct OccupancyView<'a> {
    cells: &'a [Vec<EntityId>],
    columns: u32,
    rows: u32,
}

impl<'a> OccupancyView<'a> {
    /// Captures a new occupancy view backed by the provided row-major cells.
    #[must_use]
    pub fn new(cells: &'a [Vec<EntityId>], columns: u32, rows: u32) -> Self {
        Self {
            cells,
            columns,
            rows,
        }
    }

    /// Entities recorded in the provided cell, in ascending id order.
    #[must_use]
    pub fn occupants(&self, cell: CellCoord) -> &'a [EntityId] {
        self.index(cell)
            .and_then(|index| self.cells.get(index))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Reports whether no entity is recorded in the cell.
    #[must_use]
    pub fn is_free(&self, cell: CellCoord) -> bool {
        self.occupants(cell).is_empty()
    }

    /// Provides the dimensions of the underlying grid.
    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.columns, self.rows)
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if cell.column() < self.columns && cell.row() < self.rows {
            let row = usize::try_from(cell.row()).ok()?;
            let column = usize::try_from(cell.column()).ok()?;
            let width = usize::try_from(self.columns).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{de::DeserializeOwned, Serialize};

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn chebyshev_distance_uses_largest_axis() {
        let origin = CellCoord::new(1, 1);
        assert_eq!(origin.chebyshev_distance(CellCoord::new(5, 3)), 4);
        assert_eq!(CellCoord::new(5, 3).chebyshev_distance(origin), 4);
        assert_eq!(origin.manhattan_distance(CellCoord::new(5, 3)), 6);
    }

    #[test]
    fn attack_options_cycle_every_three_steps() {
        let mut option = AttackOption::FIRST;
        let mut seen = Vec::new();
        for _ in 0..7 {
            seen.push(option);
            option = option.next();
        }
        assert_eq!(
            seen,
            vec![
                AttackOption::Crush,
                AttackOption::Throw,
                AttackOption::Eat,
                AttackOption::Crush,
                AttackOption::Throw,
                AttackOption::Eat,
                AttackOption::Crush,
            ]
        );
    }

    #[test]
    fn interaction_dispatch_ignores_pair_order() {
        let player = (EntityId::new(1), EntityKind::Player);
        let enemy = (EntityId::new(2), EntityKind::Enemy(EnemyKind::Skeleton));
        let expected = Some(Interaction::Attack {
            player: player.0,
            enemy: enemy.0,
        });
        assert_eq!(interaction_for(player, enemy), expected);
        assert_eq!(interaction_for(enemy, player), expected);
    }

    #[test]
    fn interaction_dispatch_covers_threats_and_pickups() {
        let enemy = (EntityId::new(3), EntityKind::Enemy(EnemyKind::Minotaur));
        let friendly = (EntityId::new(4), EntityKind::Friendly(FriendlyKind::Damsel));
        let player = (EntityId::new(1), EntityKind::Player);
        let item = (EntityId::new(5), EntityKind::Item(ItemKind::Crystal));

        assert_eq!(
            interaction_for(friendly, enemy),
            Some(Interaction::Threat {
                enemy: enemy.0,
                friendly: friendly.0,
            })
        );
        assert_eq!(
            interaction_for(item, player),
            Some(Interaction::Pickup {
                player: player.0,
                item: item.0,
            })
        );
        assert_eq!(interaction_for(enemy, enemy), None);
        assert_eq!(interaction_for(player, friendly), None);
        assert_eq!(interaction_for(enemy, item), None);
    }

    #[test]
    fn only_damsels_can_be_rescued() {
        assert!(FriendlyKind::Damsel.is_rescuable());
        assert!(!FriendlyKind::Postman.is_rescuable());
        assert_eq!(
            EntityKind::Friendly(FriendlyKind::Postman).tag(),
            VariantTag::Friendly
        );
    }

    #[test]
    fn landscape_line_of_sight_detects_walls() {
        let mut cells = vec![Landscape::Open; 25];
        cells[2 * 5 + 2] = Landscape::Wall;
        let view = LandscapeView::new(&cells, 5, 5);

        assert!(!view.line_is_clear(CellCoord::new(0, 2), CellCoord::new(4, 2)));
        assert!(view.line_is_clear(CellCoord::new(0, 0), CellCoord::new(4, 0)));
        assert!(view.line_is_clear(CellCoord::new(1, 2), CellCoord::new(2, 2)));
    }

    #[test]
    fn occupancy_view_reports_empty_outside_grid() {
        let cells = vec![vec![EntityId::new(7)], Vec::new()];
        let view = OccupancyView::new(&cells, 2, 1);
        assert_eq!(view.occupants(CellCoord::new(0, 0)), &[EntityId::new(7)]);
        assert!(view.is_free(CellCoord::new(1, 0)));
        assert!(view.is_free(CellCoord::new(5, 5)));
    }

    #[test]
    fn entity_kind_round_trips_through_bincode() {
        assert_round_trip(&EntityKind::Enemy(EnemyKind::Minotaur));
        assert_round_trip(&AttackOption::Throw);
    }

    #[test]
    fn score_snapshot_round_trips_through_bincode() {
        assert_round_trip(&ScoreSnapshot {
            score: 12,
            boredom: 40,
            boredom_max: 100,
        });
    }
}
