use std::{fs, time::Duration};

use lunk_core::{CellCoord, EntityId, EntityKind, Event, ItemKind, RemovalCause, Steering};
use lunk_rendering::{TileLayer, TileSprite};
use lunk_simulation::{Simulation, SimulationConfig};
use lunk_tilemap::TileMap;
use lunk_world::{query, LevelConfig, LevelLayout, World};
use tempfile::TempDir;

fn simulation(layout: LevelLayout, level: LevelConfig, config: SimulationConfig) -> Simulation {
    let world = World::new(layout, level).expect("valid level");
    Simulation::new(world, config)
}

fn fifty_tps() -> SimulationConfig {
    SimulationConfig {
        target_tps: 50,
        ..SimulationConfig::default()
    }
}

fn index_of(events: &[Event], predicate: impl Fn(&Event) -> bool) -> Option<usize> {
    events.iter().position(predicate)
}

#[test]
fn stages_run_in_pipeline_order() {
    let layout = LevelLayout::open(12, 5)
        .with_spawn(EntityKind::Player, CellCoord::new(2, 2))
        .with_spawn(EntityKind::Item(ItemKind::Crystal), CellCoord::new(3, 2));
    let mut simulation = simulation(layout, LevelConfig::default(), SimulationConfig::default());

    let mut picked_up = false;
    for _ in 0..10 {
        let events = simulation.tick(Steering::None);
        let Some(removed) = index_of(&events, |event| {
            matches!(
                event,
                Event::EntityRemoved {
                    cause: RemovalCause::PickedUp,
                    ..
                }
            )
        }) else {
            continue;
        };
        let advanced = index_of(&events, |event| matches!(event, Event::TimeAdvanced { .. }))
            .expect("clock advanced");
        let moved = index_of(&events, |event| {
            matches!(event, Event::EntityMoved { entity, .. } if *entity == EntityId::new(0))
        })
        .expect("player moved");

        assert!(advanced < moved && moved < removed);
        picked_up = true;
        break;
    }

    assert!(picked_up, "the player never reached the crystal");
    assert!(query::entity(simulation.world(), EntityId::new(1)).is_none());
    assert_eq!(query::score(simulation.world()).score, 3);
}

#[test]
fn frames_are_converted_into_whole_ticks() {
    let layout = LevelLayout::open(8, 8).with_spawn(EntityKind::Player, CellCoord::new(1, 1));
    let mut simulation = simulation(layout, LevelConfig::default(), fifty_tps());
    assert_eq!(simulation.fixed_dt(), Duration::from_millis(20));

    let _ = simulation.advance(Duration::from_millis(50), Steering::None);
    assert_eq!(query::tick_index(simulation.world()), 2);

    let _ = simulation.advance(Duration::from_millis(30), Steering::None);
    assert_eq!(query::tick_index(simulation.world()), 4);
}

#[test]
fn running_out_of_boredom_stops_the_pipeline() {
    let layout = LevelLayout::open(8, 8).with_spawn(EntityKind::Player, CellCoord::new(1, 1));
    let level = LevelConfig {
        boredom_max: 3,
        decay_interval: Duration::from_millis(20),
        ..LevelConfig::default()
    };
    let mut simulation = simulation(layout, level, fifty_tps());

    let ran = simulation.run_headless(100, Steering::None);

    assert_eq!(ran, 3);
    assert!(query::level_ended(simulation.world()));
    assert!(simulation.tick(Steering::None).is_empty());
    assert_eq!(query::tick_index(simulation.world()), 3);
}

#[test]
fn camera_follows_the_player_across_the_level() {
    let layout = LevelLayout::open(60, 10).with_spawn(EntityKind::Player, CellCoord::new(5, 5));
    let mut simulation = simulation(layout, LevelConfig::default(), SimulationConfig::default());
    let start = simulation.camera().viewport().origin();

    let _ = simulation.run_headless(200, Steering::None);

    let origin = simulation.camera().viewport().origin();
    assert!(origin.x > start.x + 5.0, "camera stayed at {origin}");
    assert_eq!(origin.y, 0.0);
}

const MANIFEST: &str = r#"
name = "crooked"
boredom_max = 90
tile_size = 24

[layers]
landscape = "landscape.csv"
entities = "entities.csv"
decorations = "decorations.csv"

[tileset]
columns = 5
tile_count = 10
wall_codes = [3, 99]

[entity_codes]
player = 0
skeleton = 1
"#;

fn crooked_level() -> TempDir {
    let temp = TempDir::new().expect("temp");
    let write = |name: &str, contents: &str| {
        fs::write(temp.path().join(name), contents).expect("write level file");
    };
    write("level.toml", MANIFEST);
    write("landscape.csv", "3,3,3,3\n3,7,7,99\n3,7,7,99\n3,3,3,3\n");
    write("entities.csv", "-1,-1,-1,-1\n-1,0,-1,-1\n-1,-1,1,-1\n-1,-1,-1,-1\n");
    write("decorations.csv", "-1,-1,-1,-1\n-1,-1,8,-1\n-1,-1,-1,-1\n-1,-1,-1,-1\n");
    temp
}

#[test]
fn scenes_mirror_the_loaded_level() {
    let temp = crooked_level();
    let map = TileMap::load(temp.path().join("level.toml")).expect("tile map");
    let level = map.level_config();
    let mut simulation =
        Simulation::from_tilemap(map, level, SimulationConfig::default()).expect("simulation");

    let mut scene = simulation.scene().expect("scene");
    assert_eq!(scene.tile_grid.tile_length, 24.0);
    simulation.populate_scene(&mut scene);

    assert_eq!(scene.tiles.len(), 17);
    assert_eq!(scene.placeholder_count(), 2);
    assert!(scene.tiles.iter().any(|tile| {
        tile.layer == TileLayer::Decoration
            && tile.cell == CellCoord::new(2, 1)
            && tile.sprite == TileSprite::Atlas { column: 3, row: 1 }
    }));
    assert_eq!(scene.sprites.len(), 2);
    assert_eq!(scene.sprites[0].kind, EntityKind::Player);
    assert_eq!(scene.hud.boredom, 90);
    assert_eq!(scene.hud.boredom_max, 90);
    assert_eq!(
        scene.viewport_origin,
        simulation.camera().viewport().origin()
    );
    assert_eq!(simulation.placeholder_codes().collect::<Vec<_>>(), vec![99]);

    simulation.populate_scene(&mut scene);
    assert_eq!(scene.tiles.len(), 17);
    assert_eq!(simulation.placeholder_codes().count(), 1);
}

#[test]
fn restarting_rebuilds_the_level_from_its_tile_map() {
    let temp = crooked_level();
    let map = TileMap::load(temp.path().join("level.toml")).expect("tile map");
    let level = map.level_config();
    let mut simulation =
        Simulation::from_tilemap(map, level, SimulationConfig::default()).expect("simulation");
    let fresh = query::entity_view(simulation.world()).into_vec();

    let _ = simulation.run_headless(40, Steering::TurnLeft);
    let first_run = query::entity_view(simulation.world()).into_vec();
    assert_ne!(first_run, fresh);

    simulation.restart().expect("restart");
    assert_eq!(query::tick_index(simulation.world()), 0);
    assert_eq!(query::score(simulation.world()).boredom, 90);
    assert_eq!(query::entity_view(simulation.world()).into_vec(), fresh);
    assert!(simulation.tilemap().is_some());

    let _ = simulation.run_headless(40, Steering::TurnLeft);
    assert_eq!(query::entity_view(simulation.world()).into_vec(), first_run);
}

#[test]
fn restart_needs_a_tile_map() {
    let layout = LevelLayout::open(4, 4).with_spawn(EntityKind::Player, CellCoord::new(1, 1));
    let mut simulation = simulation(layout, LevelConfig::default(), SimulationConfig::default());
    let _ = simulation.run_headless(3, Steering::None);

    let error = simulation.restart().expect_err("no tile map to rebuild from");
    assert!(error.to_string().contains("tile map"));
    assert_eq!(query::tick_index(simulation.world()), 3);
}
