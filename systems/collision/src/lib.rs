#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Collision resolver that inspects moved entities against walls and each other.
//!
//! Wall contacts roll a [`WallPolicy`] from a seeded stream owned by the
//! system. Overlapping hitboxes are dispatched through
//! [`lunk_core::interaction_for`] and reported once per unordered pair.

use std::collections::BTreeSet;

use lunk_core::{
    interaction_for, CellCoord, Command, EntityId, EntitySnapshot, EntityView, Event,
    LandscapeView, OccupancyView, Position, WallPolicy,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::debug;

const DEFAULT_COLLISION_SEED: u64 = 0x7a11_c0de_5eed_0001;

/// Tuning knobs of the collision resolver.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CollisionConfig {
    /// Seed of the stream used to roll wall policies.
    pub seed: u64,
    /// Probability that a wall contact resolves as [`WallPolicy::TurnAround`].
    pub turn_around_probability: f64,
}

impl Default for CollisionConfig {
    fn default() -> Self {
        Self {
            seed: DEFAULT_COLLISION_SEED,
            turn_around_probability: 0.5,
        }
    }
}

/// Rolls the policy applied to a wall contact.
///
/// `turn_around_probability` is clamped into `[0, 1]`.
pub fn roll_wall_policy<R>(rng: &mut R, turn_around_probability: f64) -> WallPolicy
where
    R: Rng + ?Sized,
{
    let probability = if turn_around_probability.is_nan() {
        0.5
    } else {
        turn_around_probability.clamp(0.0, 1.0)
    };
    if rng.gen_bool(probability) {
        WallPolicy::TurnAround
    } else {
        WallPolicy::ClearWall
    }
}

/// Grid cells overlapped by a circular hitbox, in row-major order.
#[must_use]
pub fn covered_cells(position: Position, radius: f32, columns: u32, rows: u32) -> Vec<CellCoord> {
    let Some(first) = Position::new(position.x() - radius, position.y() - radius)
        .clamped_cell(columns, rows)
    else {
        return Vec::new();
    };
    let Some(last) = Position::new(position.x() + radius, position.y() + radius)
        .clamped_cell(columns, rows)
    else {
        return Vec::new();
    };

    let mut cells = Vec::new();
    for row in first.row()..=last.row() {
        for column in first.column()..=last.column() {
            let cell = CellCoord::new(column, row);
            if distance_to_cell(position, cell) < radius {
                cells.push(cell);
            }
        }
    }
    cells
}

/// Distance from `position` to the nearest point of `cell`.
fn distance_to_cell(position: Position, cell: CellCoord) -> f32 {
    let left = cell.column() as f32;
    let top = cell.row() as f32;
    let nearest_x = position.x().clamp(left, left + 1.0);
    let nearest_y = position.y().clamp(top, top + 1.0);
    position.distance_to(Position::new(nearest_x, nearest_y))
}

/// Reports whether two entity hitboxes overlap.
#[must_use]
pub fn hitboxes_overlap(first: &EntitySnapshot, second: &EntitySnapshot) -> bool {
    let reach = first.kind.hitbox_radius() + second.kind.hitbox_radius();
    first.position.distance_to(second.position) < reach
}

/// Pure system that detects collisions and emits resolution commands.
#[derive(Debug)]
pub struct Collision {
    config: CollisionConfig,
    rng: ChaCha8Rng,
}

impl Default for Collision {
    fn default() -> Self {
        Self::new(CollisionConfig::default())
    }
}

impl Collision {
    /// Creates a resolver whose policy stream is seeded from `config`.
    #[must_use]
    pub fn new(config: CollisionConfig) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            config,
        }
    }

    /// Consumes world events and immutable views to emit resolution commands.
    ///
    /// Only entities reported by [`Event::EntityMoved`] are inspected.
    pub fn handle(
        &mut self,
        events: &[Event],
        entity_view: &EntityView,
        landscape: LandscapeView<'_>,
        occupancy: OccupancyView<'_>,
        out: &mut Vec<Command>,
    ) {
        let moved: BTreeSet<EntityId> = events
            .iter()
            .filter_map(|event| match event {
                Event::EntityMoved { entity, .. } => Some(*entity),
                _ => None,
            })
            .collect();
        if moved.is_empty() {
            return;
        }

        let (columns, rows) = landscape.dimensions();
        let widest = entity_view
            .iter()
            .map(|snapshot| snapshot.kind.hitbox_radius())
            .fold(0.0_f32, f32::max);
        let mut reported: BTreeSet<(EntityId, EntityId)> = BTreeSet::new();

        for entity in moved {
            let Some(snapshot) = entity_view.get(entity) else {
                continue;
            };
            let radius = snapshot.kind.hitbox_radius();

            if let Some(wall) = covered_cells(snapshot.position, radius, columns, rows)
                .into_iter()
                .filter(|cell| landscape.is_wall(*cell))
                .min_by(|first, second| {
                    let first_distance = snapshot.position.distance_to(first.center());
                    let second_distance = snapshot.position.distance_to(second.center());
                    first_distance
                        .total_cmp(&second_distance)
                        .then_with(|| (first.row(), first.column()).cmp(&(second.row(), second.column())))
                })
            {
                let policy = roll_wall_policy(&mut self.rng, self.config.turn_around_probability);
                debug!(entity = entity.get(), %wall, ?policy, "wall contact");
                out.push(Command::ResolveWallCollision {
                    entity,
                    wall,
                    policy,
                });
            }

            let candidates = covered_cells(snapshot.position, radius + widest, columns, rows);
            let mut neighbours: BTreeSet<EntityId> = BTreeSet::new();
            for cell in candidates {
                neighbours.extend(occupancy.occupants(cell).iter().copied());
            }

            for other in neighbours {
                if other == entity {
                    continue;
                }
                let pair = (entity.min(other), entity.max(other));
                if reported.contains(&pair) {
                    continue;
                }
                let Some(other_snapshot) = entity_view.get(other) else {
                    continue;
                };
                if !hitboxes_overlap(snapshot, other_snapshot) {
                    continue;
                }
                let _ = reported.insert(pair);
                if let Some(interaction) = interaction_for(
                    (snapshot.id, snapshot.kind),
                    (other_snapshot.id, other_snapshot.kind),
                ) {
                    debug!(?interaction, "entities overlap");
                    out.push(Command::ResolveInteraction { interaction });
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ten_thousand_rolls_split_evenly() {
        let mut rng = ChaCha8Rng::seed_from_u64(0x5eed);
        let turn_arounds = (0..10_000)
            .filter(|_| roll_wall_policy(&mut rng, 0.5) == WallPolicy::TurnAround)
            .count();
        assert!(
            (4_800..=5_200).contains(&turn_arounds),
            "turn-arounds: {turn_arounds}"
        );
    }

    #[test]
    fn rolls_are_reproducible_for_a_seed() {
        let mut first = ChaCha8Rng::seed_from_u64(9);
        let mut second = ChaCha8Rng::seed_from_u64(9);
        let first_rolls: Vec<_> = (0..64).map(|_| roll_wall_policy(&mut first, 0.5)).collect();
        let second_rolls: Vec<_> = (0..64).map(|_| roll_wall_policy(&mut second, 0.5)).collect();
        assert_eq!(first_rolls, second_rolls);
    }

    #[test]
    fn extreme_probabilities_are_deterministic() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert_eq!(roll_wall_policy(&mut rng, 1.0), WallPolicy::TurnAround);
        assert_eq!(roll_wall_policy(&mut rng, 0.0), WallPolicy::ClearWall);
        assert_eq!(roll_wall_policy(&mut rng, 7.0), WallPolicy::TurnAround);
    }

    #[test]
    fn small_hitbox_covers_only_its_cell() {
        let cells = covered_cells(Position::new(2.5, 2.5), 0.4, 10, 10);
        assert_eq!(cells, vec![CellCoord::new(2, 2)]);
    }

    #[test]
    fn hitbox_near_an_edge_reaches_the_neighbour() {
        let cells = covered_cells(Position::new(2.8, 2.5), 0.4, 10, 10);
        assert_eq!(cells, vec![CellCoord::new(2, 2), CellCoord::new(3, 2)]);
    }

    #[test]
    fn minotaur_hitbox_spans_three_tiles() {
        let cells = covered_cells(Position::new(5.5, 5.5), 1.4, 10, 10);
        assert!(cells.contains(&CellCoord::new(4, 5)));
        assert!(cells.contains(&CellCoord::new(6, 5)));
        assert!(cells.contains(&CellCoord::new(5, 4)));
        assert!(!cells.contains(&CellCoord::new(3, 5)));
    }

    #[test]
    fn covered_cells_clip_to_the_grid() {
        let cells = covered_cells(Position::new(0.2, 0.2), 0.4, 3, 3);
        assert_eq!(cells, vec![CellCoord::new(0, 0)]);
    }
}
