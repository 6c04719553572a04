use std::{fs, path::Path};

use lunk_core::{CellCoord, EntityKind, FriendlyKind, ItemKind};
use lunk_tilemap::{TileMap, TilemapError};
use lunk_world::query;
use tempfile::TempDir;

const MANIFEST: &str = r#"
name = "courtyard"
boredom_max = 120
tile_size = 32

[layers]
landscape = "layers/landscape.csv"
entities = "layers/entities.csv"
decorations = "layers/decorations.csv"

[tileset]
columns = 8
tile_count = 64
wall_codes = [12, 13]

[entity_codes]
player = 0
damsel = 4
crystal = 7
"#;

fn write(dir: &Path, relative: &str, contents: &str) {
    let path = dir.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create layer dir");
    }
    fs::write(path, contents).expect("write file");
}

fn courtyard(decorations: &str) -> TempDir {
    let temp = TempDir::new().expect("temp");
    write(temp.path(), "level.toml", MANIFEST);
    write(
        temp.path(),
        "layers/landscape.csv",
        "12,12,12,12\n12,1,1,13\n12,1,1,13\n12,12,12,12\n",
    );
    write(
        temp.path(),
        "layers/entities.csv",
        "-1,-1,-1,-1\n-1,0,4,-1\n-1,7,-1,-1\n-1,-1,-1,-1\n",
    );
    write(temp.path(), "layers/decorations.csv", decorations);
    temp
}

#[test]
fn loads_a_level_from_disk_and_builds_its_world() {
    let temp = courtyard("-1,-1,-1,-1\n-1,-1,-1,-1\n-1,30,-1,-1\n-1,-1,-1,-1\n");

    let map = TileMap::load(temp.path().join("level.toml")).expect("tile map");
    assert_eq!(map.manifest().name, "courtyard");
    assert_eq!(map.manifest().tile_size, 32);
    assert_eq!(map.dimensions(), (4, 4));
    assert_eq!(
        map.decorations()
            .and_then(|layer| layer.code(CellCoord::new(1, 2))),
        Some(30)
    );
    assert_eq!(map.tileset().frame(30), Some((6, 3)));

    let world = map.build_world(map.level_config()).expect("world");
    assert_eq!(query::score(&world).boredom, 120);
    let landscape = query::landscape_view(&world);
    assert!(landscape.is_wall(CellCoord::new(3, 1)));
    assert!(!landscape.is_wall(CellCoord::new(1, 1)));

    let kinds: Vec<_> = query::entity_view(&world)
        .iter()
        .map(|snapshot| (snapshot.kind, snapshot.cell))
        .collect();
    assert_eq!(
        kinds,
        vec![
            (EntityKind::Player, CellCoord::new(1, 1)),
            (EntityKind::Friendly(FriendlyKind::Damsel), CellCoord::new(2, 1)),
            (EntityKind::Item(ItemKind::Crystal), CellCoord::new(1, 2)),
        ]
    );
}

#[test]
fn missing_layer_files_name_the_path() {
    let temp = courtyard("-1\n");
    fs::remove_file(temp.path().join("layers/entities.csv")).expect("remove");

    let error = TileMap::load(temp.path().join("level.toml")).expect_err("missing layer");
    match error {
        TilemapError::Read { path, .. } => assert!(path.ends_with("layers/entities.csv")),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn decorations_must_match_the_landscape() {
    let temp = courtyard("-1,-1\n-1,-1\n");

    let error = TileMap::load(temp.path().join("level.toml")).expect_err("mismatch");
    assert!(matches!(
        error,
        TilemapError::LayerMismatch {
            layer: "decorations",
            expected: (4, 4),
            actual: (2, 2),
        }
    ));
}

#[test]
fn ragged_landscape_rows_are_reported() {
    let temp = courtyard("-1\n");
    write(temp.path(), "layers/landscape.csv", "12,12,12,12\n12,1\n");

    let error = TileMap::load(temp.path().join("level.toml")).expect_err("ragged");
    assert!(matches!(
        error,
        TilemapError::RaggedLayer {
            layer: "landscape",
            row: 1,
            expected: 4,
            actual: 2,
        }
    ));
}
