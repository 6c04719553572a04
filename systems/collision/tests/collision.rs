use lunk_core::{
    CellCoord, Command, EnemyKind, EntityId, EntityKind, Event, FriendlyKind, Heading, Interaction,
    ItemKind,
};
use lunk_system_collision::{Collision, CollisionConfig};
use lunk_world::{self as world, query, LevelConfig, LevelLayout, World};

fn step(world: &mut World, moves: &[(EntityId, Heading, f32)]) -> Vec<Event> {
    let mut events = Vec::new();
    for (entity, heading, distance) in moves {
        world::apply(
            world,
            Command::MoveEntity {
                entity: *entity,
                heading: *heading,
                distance: *distance,
            },
            &mut events,
        );
    }
    events
}

fn resolve(world: &World, collision: &mut Collision, events: &[Event]) -> Vec<Command> {
    let mut commands = Vec::new();
    collision.handle(
        events,
        &query::entity_view(world),
        query::landscape_view(world),
        query::occupancy_view(world),
        &mut commands,
    );
    commands
}

#[test]
fn walking_into_a_wall_rolls_a_policy_for_that_wall() {
    let layout = LevelLayout::open(6, 3)
        .with_wall(CellCoord::new(3, 1))
        .with_spawn(EntityKind::Player, CellCoord::new(2, 1));
    let mut world = World::new(layout, LevelConfig::default()).expect("valid level");
    let mut collision = Collision::default();

    let events = step(&mut world, &[(EntityId::new(0), Heading::RIGHT, 0.3)]);
    let commands = resolve(&world, &mut collision, &events);

    assert_eq!(commands.len(), 1);
    assert!(matches!(
        commands[0],
        Command::ResolveWallCollision {
            entity,
            wall,
            ..
        } if entity == EntityId::new(0) && wall == CellCoord::new(3, 1)
    ));
}

#[test]
fn both_wall_policies_occur_and_resolve_cleanly() {
    let mut seen_turn_around = false;
    let mut seen_clear = false;

    for seed in 0..16 {
        let layout = LevelLayout::open(6, 3)
            .with_wall(CellCoord::new(3, 1))
            .with_spawn(EntityKind::Player, CellCoord::new(2, 1));
        let mut world = World::new(layout, LevelConfig::default()).expect("valid level");
        let mut collision = Collision::new(CollisionConfig {
            seed,
            ..CollisionConfig::default()
        });

        let events = step(&mut world, &[(EntityId::new(0), Heading::RIGHT, 0.3)]);
        let mut resolved = Vec::new();
        for command in resolve(&world, &mut collision, &events) {
            world::apply(&mut world, command, &mut resolved);
        }

        let player = query::entity(&world, EntityId::new(0)).expect("player");
        if query::landscape_view(&world).is_wall(CellCoord::new(3, 1)) {
            seen_turn_around = true;
            assert!(player.is_halted());
            assert!(player.heading.x() < 0.0);
            assert_eq!(player.cell, CellCoord::new(2, 1));
        } else {
            seen_clear = true;
            assert_eq!(query::score(&world).boredom, 75);
        }
    }

    assert!(seen_turn_around && seen_clear);
}

#[test]
fn overlapping_pairs_are_reported_once() {
    let layout = LevelLayout::open(8, 8)
        .with_spawn(EntityKind::Player, CellCoord::new(2, 2))
        .with_spawn(EntityKind::Enemy(EnemyKind::Skeleton), CellCoord::new(3, 2));
    let mut world = World::new(layout, LevelConfig::default()).expect("valid level");
    let mut collision = Collision::default();

    let events = step(
        &mut world,
        &[
            (EntityId::new(0), Heading::RIGHT, 0.3),
            (EntityId::new(1), Heading::LEFT, 0.3),
        ],
    );
    let commands = resolve(&world, &mut collision, &events);

    assert_eq!(
        commands,
        vec![Command::ResolveInteraction {
            interaction: Interaction::Attack {
                player: EntityId::new(0),
                enemy: EntityId::new(1),
            },
        }]
    );
}

#[test]
fn pairs_without_a_policy_are_ignored() {
    let layout = LevelLayout::open(8, 8)
        .with_spawn(EntityKind::Player, CellCoord::new(6, 6))
        .with_spawn(EntityKind::Enemy(EnemyKind::Skeleton), CellCoord::new(2, 2))
        .with_spawn(EntityKind::Enemy(EnemyKind::Skeleton), CellCoord::new(3, 2))
        .with_spawn(EntityKind::Item(ItemKind::Crystal), CellCoord::new(2, 3));
    let mut world = World::new(layout, LevelConfig::default()).expect("valid level");
    let mut collision = Collision::default();

    let events = step(
        &mut world,
        &[
            (EntityId::new(1), Heading::RIGHT, 0.4),
            (EntityId::new(1), Heading::DOWN, 0.4),
        ],
    );
    let commands = resolve(&world, &mut collision, &events);

    assert!(commands.is_empty());
}

#[test]
fn minotaur_reaches_friendlies_a_tile_away() {
    let layout = LevelLayout::open(10, 10)
        .with_spawn(EntityKind::Player, CellCoord::new(9, 9))
        .with_spawn(EntityKind::Enemy(EnemyKind::Minotaur), CellCoord::new(3, 3))
        .with_spawn(EntityKind::Friendly(FriendlyKind::Damsel), CellCoord::new(5, 3));
    let mut world = World::new(layout, LevelConfig::default()).expect("valid level");
    let mut collision = Collision::default();

    let events = step(&mut world, &[(EntityId::new(1), Heading::RIGHT, 0.3)]);
    let commands = resolve(&world, &mut collision, &events);

    assert_eq!(
        commands,
        vec![Command::ResolveInteraction {
            interaction: Interaction::Threat {
                enemy: EntityId::new(1),
                friendly: EntityId::new(2),
            },
        }]
    );
}
