#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic movement system that eases headings and proposes steps.
//!
//! The player turns by a fixed angle per tick while a steering key is held and
//! always walks forward. NPCs derive a desired heading from their current
//! behaviour and rotate toward it by a bounded angle before stepping.
//!
//! Charging NPCs are the exception: the heading toward the target is locked
//! when the charge starts and held without easing. A charge ends when its
//! timer runs out or the NPC is halted by an obstacle, at which point the
//! system drops the NPC back to patrolling.

use std::collections::{btree_map::Entry, BTreeMap};

use lunk_core::{
    Behavior, Command, EntityId, EntityKind, EntitySnapshot, EntityView, Event, Heading, Steering,
};

/// Tuning knobs of the movement system.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MovementTuning {
    /// Distance, in cells, the player walks per tick.
    pub player_speed: f32,
    /// Angle, in radians, the player turns per tick while steering.
    pub player_turn: f32,
    /// Distance, in cells, an NPC walks per tick.
    pub npc_speed: f32,
    /// Largest angle, in radians, an NPC may turn per tick.
    pub npc_turn: f32,
    /// Speed multiplier applied while pursuing fast.
    pub fast_multiplier: f32,
    /// Ticks a patrolling NPC walks before reversing.
    pub patrol_flip_ticks: u32,
    /// Distance, in cells, at which a following NPC stops closing in.
    pub follow_stop_distance: f32,
    /// Speed multiplier applied while charging.
    pub charge_multiplier: f32,
    /// Ticks a single charge lasts.
    pub charge_ticks: u32,
}

impl Default for MovementTuning {
    fn default() -> Self {
        Self {
            player_speed: 0.1,
            player_turn: 5.0_f32.to_radians(),
            npc_speed: 0.05,
            npc_turn: 15.0_f32.to_radians(),
            fast_multiplier: 2.0,
            patrol_flip_ticks: 180,
            follow_stop_distance: 1.5,
            charge_multiplier: 3.0,
            charge_ticks: 90,
        }
    }
}

/// Pure system that reacts to world events and emits movement commands.
#[derive(Debug, Default)]
pub struct Movement {
    tuning: MovementTuning,
    patrols: BTreeMap<EntityId, PatrolClock>,
    charges: BTreeMap<EntityId, ChargeClock>,
}

#[derive(Clone, Copy, Debug)]
struct PatrolClock {
    elapsed_ticks: u32,
    heading: Heading,
}

#[derive(Clone, Copy, Debug)]
struct ChargeClock {
    remaining_ticks: u32,
    heading: Heading,
}

impl Movement {
    /// Creates a movement system using the provided tuning.
    #[must_use]
    pub fn new(tuning: MovementTuning) -> Self {
        Self {
            tuning,
            patrols: BTreeMap::new(),
            charges: BTreeMap::new(),
        }
    }

    /// Tuning the system was built with.
    #[must_use]
    pub const fn tuning(&self) -> &MovementTuning {
        &self.tuning
    }

    /// Consumes world events and the entity view to emit movement commands.
    ///
    /// Steps are only proposed for batches that advanced the clock.
    pub fn handle(
        &mut self,
        events: &[Event],
        steering: Steering,
        entity_view: &EntityView,
        out: &mut Vec<Command>,
    ) {
        let mut ticked = false;
        for event in events {
            match event {
                Event::TimeAdvanced { .. } => ticked = true,
                Event::EntityRemoved { entity, .. } => {
                    let _ = self.patrols.remove(entity);
                    let _ = self.charges.remove(entity);
                }
                Event::BehaviorChanged { entity, behavior } => {
                    if *behavior != Behavior::Patrol {
                        let _ = self.patrols.remove(entity);
                    }
                    if *behavior != Behavior::Charge {
                        let _ = self.charges.remove(entity);
                    }
                }
                Event::EntityHalted { entity, .. } => {
                    if self.charges.remove(entity).is_some() {
                        out.push(end_charge(*entity));
                    }
                }
                _ => {}
            }
        }

        if !ticked {
            return;
        }

        for snapshot in entity_view.iter() {
            if snapshot.is_halted() {
                continue;
            }

            let step = match snapshot.kind {
                EntityKind::Player => Some(self.player_step(snapshot, steering)),
                EntityKind::Enemy(_) | EntityKind::Friendly(_)
                    if snapshot.behavior == Behavior::Charge =>
                {
                    let step = self.charge_step(snapshot, entity_view);
                    if step.is_none() {
                        out.push(end_charge(snapshot.id));
                    }
                    step
                }
                EntityKind::Enemy(_) | EntityKind::Friendly(_) => {
                    self.npc_step(snapshot, entity_view)
                }
                EntityKind::Item(_) => None,
            };

            if let Some((heading, distance)) = step {
                out.push(Command::MoveEntity {
                    entity: snapshot.id,
                    heading,
                    distance,
                });
            }
        }
    }

    fn player_step(&self, player: &EntitySnapshot, steering: Steering) -> (Heading, f32) {
        let heading = match steering {
            Steering::None => player.heading,
            Steering::TurnLeft => player.heading.rotated(-self.tuning.player_turn),
            Steering::TurnRight => player.heading.rotated(self.tuning.player_turn),
        };
        (heading, self.tuning.player_speed)
    }

    fn npc_step(&mut self, npc: &EntitySnapshot, entity_view: &EntityView) -> Option<(Heading, f32)> {
        let speed = self.tuning.npc_speed;
        let target = npc.target.and_then(|target| entity_view.get(target));

        let (desired, distance) = match npc.behavior {
            Behavior::Idle | Behavior::Charge => return None,
            Behavior::Patrol => (self.patrol_heading(npc), speed),
            Behavior::PursueFast => {
                let target = target?;
                (
                    npc.position.heading_to(target.position),
                    speed * self.tuning.fast_multiplier,
                )
            }
            Behavior::PursueSlow => (npc.position.heading_to(target?.position), speed),
            Behavior::PursuePlayer => (npc.position.heading_to(entity_view.player()?.position), speed),
            Behavior::Flee => (target?.position.heading_to(npc.position), speed),
            Behavior::Follow => {
                let target = target?;
                if npc.position.distance_to(target.position) <= self.tuning.follow_stop_distance {
                    return None;
                }
                (npc.position.heading_to(target.position), speed)
            }
        };

        Some((
            npc.heading.rotate_towards(desired, self.tuning.npc_turn),
            distance,
        ))
    }

    /// Advances the charge of `npc`, locking its heading on the first tick.
    ///
    /// Returns `None` once the charge is over, or when it cannot start because
    /// the target is gone.
    fn charge_step(
        &mut self,
        npc: &EntitySnapshot,
        entity_view: &EntityView,
    ) -> Option<(Heading, f32)> {
        let distance = self.tuning.npc_speed * self.tuning.charge_multiplier;
        let duration = self.tuning.charge_ticks;
        let clock = match self.charges.entry(npc.id) {
            Entry::Occupied(clock) => clock.into_mut(),
            Entry::Vacant(slot) => {
                let target = npc.target.and_then(|target| entity_view.get(target))?;
                slot.insert(ChargeClock {
                    remaining_ticks: duration,
                    heading: npc.position.heading_to(target.position),
                })
            }
        };
        if clock.remaining_ticks == 0 {
            let _ = self.charges.remove(&npc.id);
            return None;
        }
        clock.remaining_ticks -= 1;
        Some((clock.heading, distance))
    }

    fn patrol_heading(&mut self, npc: &EntitySnapshot) -> Heading {
        let flip_ticks = self.tuning.patrol_flip_ticks;
        let clock = self.patrols.entry(npc.id).or_insert_with(|| PatrolClock {
            elapsed_ticks: 0,
            heading: if npc.heading.x() >= 0.0 {
                Heading::RIGHT
            } else {
                Heading::LEFT
            },
        });
        clock.elapsed_ticks = clock.elapsed_ticks.saturating_add(1);
        if flip_ticks > 0 && clock.elapsed_ticks >= flip_ticks {
            clock.elapsed_ticks = 0;
            clock.heading = clock.heading.reversed();
        }
        clock.heading
    }
}

fn end_charge(entity: EntityId) -> Command {
    Command::SetBehavior {
        entity,
        behavior: Behavior::Patrol,
        target: None,
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use lunk_core::{EnemyKind, FriendlyKind, ItemKind, Position, RemovalCause};

    use super::*;

    fn snapshot(id: u32, kind: EntityKind, x: f32, y: f32) -> EntitySnapshot {
        let position = Position::new(x, y);
        EntitySnapshot {
            id: EntityId::new(id),
            kind,
            position,
            heading: Heading::RIGHT,
            cell: position.cell().expect("non-negative position"),
            behavior: Behavior::Idle,
            target: None,
            halted_ticks: 0,
            saved: false,
            rescue_progress: 0,
        }
    }

    fn tick() -> Vec<Event> {
        vec![Event::TimeAdvanced {
            dt: Duration::from_millis(16),
            tick: 1,
        }]
    }

    fn moves(out: &[Command]) -> Vec<(EntityId, Heading, f32)> {
        out.iter()
            .filter_map(|command| match command {
                Command::MoveEntity {
                    entity,
                    heading,
                    distance,
                } => Some((*entity, *heading, *distance)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn nothing_moves_without_a_tick() {
        let view = EntityView::from_snapshots(vec![snapshot(0, EntityKind::Player, 1.5, 1.5)]);
        let mut movement = Movement::default();
        let mut out = Vec::new();
        movement.handle(&[], Steering::TurnLeft, &view, &mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn player_turns_five_degrees_per_tick() {
        let view = EntityView::from_snapshots(vec![snapshot(0, EntityKind::Player, 1.5, 1.5)]);
        let mut movement = Movement::default();
        let mut out = Vec::new();
        movement.handle(&tick(), Steering::TurnRight, &view, &mut out);

        let steps = moves(&out);
        assert_eq!(steps.len(), 1);
        let (_, heading, distance) = steps[0];
        let turned = Heading::RIGHT.angle_to(heading);
        assert!((turned - 5.0_f32.to_radians()).abs() < 1e-5);
        assert!((distance - MovementTuning::default().player_speed).abs() < f32::EPSILON);
    }

    #[test]
    fn halted_entities_and_items_stay_put() {
        let mut halted = snapshot(1, EntityKind::Enemy(EnemyKind::Skeleton), 3.5, 3.5);
        halted.behavior = Behavior::Patrol;
        halted.halted_ticks = 4;
        let item = snapshot(2, EntityKind::Item(ItemKind::Crystal), 5.5, 5.5);
        let view = EntityView::from_snapshots(vec![halted, item]);

        let mut movement = Movement::default();
        let mut out = Vec::new();
        movement.handle(&tick(), Steering::None, &view, &mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn fast_pursuit_doubles_speed_and_turns_toward_target() {
        let mut enemy = snapshot(1, EntityKind::Enemy(EnemyKind::Skeleton), 1.5, 1.5);
        enemy.behavior = Behavior::PursueFast;
        enemy.target = Some(EntityId::new(2));
        let damsel = snapshot(2, EntityKind::Friendly(FriendlyKind::Damsel), 1.5, 4.5);
        let view = EntityView::from_snapshots(vec![enemy, damsel]);

        let tuning = MovementTuning::default();
        let mut movement = Movement::new(tuning);
        let mut out = Vec::new();
        movement.handle(&tick(), Steering::None, &view, &mut out);

        let (_, heading, distance) = moves(&out)[0];
        assert!((distance - tuning.npc_speed * tuning.fast_multiplier).abs() < f32::EPSILON);
        assert!((Heading::RIGHT.angle_to(heading) - tuning.npc_turn).abs() < 1e-5);
    }

    #[test]
    fn fleeing_steers_away_from_the_threat() {
        let mut enemy = snapshot(1, EntityKind::Enemy(EnemyKind::Skeleton), 4.5, 4.5);
        enemy.behavior = Behavior::Flee;
        enemy.target = Some(EntityId::new(0));
        let player = snapshot(0, EntityKind::Player, 2.5, 4.5);
        let view = EntityView::from_snapshots(vec![player, enemy]);

        let mut movement = Movement::default();
        let mut out = Vec::new();
        movement.handle(&tick(), Steering::None, &view, &mut out);

        let flee = moves(&out)
            .into_iter()
            .find(|(entity, _, _)| *entity == EntityId::new(1))
            .expect("enemy step");
        assert_eq!(flee.1, Heading::RIGHT);
    }

    #[test]
    fn followers_stop_close_to_the_player() {
        let mut damsel = snapshot(1, EntityKind::Friendly(FriendlyKind::Damsel), 3.5, 2.5);
        damsel.behavior = Behavior::Follow;
        damsel.target = Some(EntityId::new(0));
        let player = snapshot(0, EntityKind::Player, 2.5, 2.5);
        let view = EntityView::from_snapshots(vec![player, damsel]);

        let mut movement = Movement::default();
        let mut out = Vec::new();
        movement.handle(&tick(), Steering::None, &view, &mut out);

        assert!(moves(&out)
            .iter()
            .all(|(entity, _, _)| *entity == EntityId::new(0)));
    }

    #[test]
    fn patrol_reverses_after_the_flip_interval() {
        let mut skeleton = snapshot(1, EntityKind::Enemy(EnemyKind::Skeleton), 4.5, 4.5);
        skeleton.behavior = Behavior::Patrol;
        let view = EntityView::from_snapshots(vec![skeleton]);

        let mut movement = Movement::new(MovementTuning {
            patrol_flip_ticks: 3,
            npc_turn: std::f32::consts::PI,
            ..MovementTuning::default()
        });
        let mut headings = Vec::new();
        for _ in 0..4 {
            let mut out = Vec::new();
            movement.handle(&tick(), Steering::None, &view, &mut out);
            headings.push(moves(&out)[0].1);
        }

        assert_eq!(headings[0], Heading::RIGHT);
        assert_eq!(headings[1], Heading::RIGHT);
        assert_eq!(headings[2], Heading::LEFT);
        assert_eq!(headings[3], Heading::LEFT);
    }

    #[test]
    fn removed_entities_forget_their_patrol() {
        let mut movement = Movement::default();
        let mut skeleton = snapshot(1, EntityKind::Enemy(EnemyKind::Skeleton), 4.5, 4.5);
        skeleton.behavior = Behavior::Patrol;
        let view = EntityView::from_snapshots(vec![skeleton]);
        let mut out = Vec::new();
        movement.handle(&tick(), Steering::None, &view, &mut out);
        assert_eq!(movement.patrols.len(), 1);

        movement.handle(
            &[Event::EntityRemoved {
                entity: EntityId::new(1),
                cause: RemovalCause::Crushed,
            }],
            Steering::None,
            &EntityView::default(),
            &mut out,
        );
        assert!(movement.patrols.is_empty());
    }

    fn charger(target_x: f32, target_y: f32) -> EntityView {
        let mut minotaur = snapshot(1, EntityKind::Enemy(EnemyKind::Minotaur), 2.5, 2.5);
        minotaur.behavior = Behavior::Charge;
        minotaur.target = Some(EntityId::new(2));
        let postman = snapshot(
            2,
            EntityKind::Friendly(FriendlyKind::Postman),
            target_x,
            target_y,
        );
        EntityView::from_snapshots(vec![minotaur, postman])
    }

    fn ended_charges(out: &[Command]) -> usize {
        out.iter()
            .filter(|command| {
                matches!(
                    command,
                    Command::SetBehavior {
                        behavior: Behavior::Patrol,
                        target: None,
                        ..
                    }
                )
            })
            .count()
    }

    #[test]
    fn charges_hold_their_heading_until_the_timer_runs_out() {
        let tuning = MovementTuning {
            charge_ticks: 3,
            ..MovementTuning::default()
        };
        let mut movement = Movement::new(tuning);

        let mut out = Vec::new();
        movement.handle(&tick(), Steering::None, &charger(2.5, 6.5), &mut out);
        let (entity, heading, distance) = moves(&out)[0];
        assert_eq!(entity, EntityId::new(1));
        assert_eq!(heading, Heading::DOWN);
        assert!((distance - tuning.npc_speed * tuning.charge_multiplier).abs() < f32::EPSILON);

        let dodged = charger(8.5, 2.5);
        for _ in 0..2 {
            let mut out = Vec::new();
            movement.handle(&tick(), Steering::None, &dodged, &mut out);
            assert_eq!(moves(&out)[0].1, Heading::DOWN);
            assert_eq!(ended_charges(&out), 0);
        }

        let mut out = Vec::new();
        movement.handle(&tick(), Steering::None, &dodged, &mut out);
        assert!(moves(&out).is_empty());
        assert_eq!(ended_charges(&out), 1);
        assert!(movement.charges.is_empty());
    }

    #[test]
    fn halting_a_charger_ends_the_charge() {
        let mut movement = Movement::default();
        let mut out = Vec::new();
        movement.handle(&tick(), Steering::None, &charger(6.5, 2.5), &mut out);
        assert_eq!(movement.charges.len(), 1);

        out.clear();
        movement.handle(
            &[Event::EntityHalted {
                entity: EntityId::new(1),
                ticks: 30,
            }],
            Steering::None,
            &charger(6.5, 2.5),
            &mut out,
        );
        assert_eq!(ended_charges(&out), 1);
        assert!(movement.charges.is_empty());
    }

    #[test]
    fn charges_without_a_target_never_start() {
        let mut minotaur = snapshot(1, EntityKind::Enemy(EnemyKind::Minotaur), 2.5, 2.5);
        minotaur.behavior = Behavior::Charge;
        let view = EntityView::from_snapshots(vec![minotaur]);

        let mut movement = Movement::default();
        let mut out = Vec::new();
        movement.handle(&tick(), Steering::None, &view, &mut out);
        assert!(moves(&out).is_empty());
        assert_eq!(ended_charges(&out), 1);
    }
}
