#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Tile-map loader that turns a level manifest and its layer files into a
//! [`LevelLayout`].
//!
//! A level is described by a TOML manifest naming one comma-separated file
//! per layer. The landscape layer decides which cells are walls, the entities
//! layer places the initial population, and an optional decorations layer is
//! only ever drawn.

mod layer;

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use lunk_core::{CellCoord, EnemyKind, EntityKind, FriendlyKind, ItemKind, Landscape};
use lunk_world::{LevelConfig, LevelError, LevelLayout, Spawn, World};
use serde::Deserialize;
use thiserror::Error;
use tracing::info;

pub use layer::{Layer, EMPTY_CODE};

use layer::LayerDefect;

/// Tile edge length, in pixels, used when a manifest does not name one.
pub const DEFAULT_TILE_SIZE: u32 = 16;

/// Errors raised while loading a tile map.
#[derive(Debug, Error)]
pub enum TilemapError {
    /// A manifest or layer file could not be read.
    #[error("failed to read {}", path.display())]
    Read {
        /// File that failed to load.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// The manifest is not valid TOML or misses required keys.
    #[error("failed to parse level manifest")]
    Manifest(#[from] toml::de::Error),
    /// A layer file holds no rows.
    #[error("layer `{layer}` is empty")]
    EmptyLayer {
        /// Name of the offending layer.
        layer: &'static str,
    },
    /// A layer value is not an integer.
    #[error("layer `{layer}` holds `{value}` at row {row}, column {column}")]
    InvalidCode {
        /// Name of the offending layer.
        layer: &'static str,
        /// Row of the offending value.
        row: u32,
        /// Column of the offending value.
        column: u32,
        /// Raw text that failed to parse.
        value: String,
    },
    /// A layer row is shorter or longer than the first row.
    #[error("layer `{layer}` row {row} has {actual} columns, expected {expected}")]
    RaggedLayer {
        /// Name of the offending layer.
        layer: &'static str,
        /// Row with the wrong width.
        row: u32,
        /// Width of the first row.
        expected: u32,
        /// Width of the offending row.
        actual: u32,
    },
    /// A layer's dimensions differ from the landscape layer's.
    #[error("layer `{layer}` is {actual:?} but the landscape is {expected:?}")]
    LayerMismatch {
        /// Name of the offending layer.
        layer: &'static str,
        /// Landscape dimensions as `(columns, rows)`.
        expected: (u32, u32),
        /// Offending layer dimensions as `(columns, rows)`.
        actual: (u32, u32),
    },
    /// The entities layer holds a code that names no entity.
    #[error("entity code {code} at {cell} is not declared in the manifest")]
    UnknownEntityCode {
        /// Offending code.
        code: i32,
        /// Cell holding the code.
        cell: CellCoord,
    },
    /// The decoded layout is not a playable level.
    #[error(transparent)]
    Level(#[from] LevelError),
}

/// Layer file paths, relative to the manifest.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct LayerPaths {
    /// Layer deciding which cells are walls.
    pub landscape: PathBuf,
    /// Layer placing the initial population.
    pub entities: PathBuf,
    /// Purely visual layer.
    #[serde(default)]
    pub decorations: Option<PathBuf>,
}

/// Shape of the tileset image and the codes that block movement.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct TilesetConfig {
    /// Number of sub-images per tileset row.
    pub columns: u32,
    /// Number of sub-images in the tileset.
    pub tile_count: u32,
    /// Landscape codes that form walls.
    #[serde(default)]
    pub wall_codes: Vec<i32>,
}

/// Entities-layer codes for every spawnable entity kind.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct EntityCodes {
    /// Code of the player.
    pub player: i32,
    /// Code of skeleton enemies.
    #[serde(default)]
    pub skeleton: Option<i32>,
    /// Code of minotaur enemies.
    #[serde(default)]
    pub minotaur: Option<i32>,
    /// Code of damsel friendlies.
    #[serde(default)]
    pub damsel: Option<i32>,
    /// Code of crystal items.
    #[serde(default)]
    pub crystal: Option<i32>,
    /// Code of postmen.
    #[serde(default)]
    pub postman: Option<i32>,
}

impl EntityCodes {
    /// Entity kind placed by `code`, if any.
    #[must_use]
    pub fn kind(&self, code: i32) -> Option<EntityKind> {
        let table = [
            (Some(self.player), EntityKind::Player),
            (self.skeleton, EntityKind::Enemy(EnemyKind::Skeleton)),
            (self.minotaur, EntityKind::Enemy(EnemyKind::Minotaur)),
            (self.damsel, EntityKind::Friendly(FriendlyKind::Damsel)),
            (self.crystal, EntityKind::Item(ItemKind::Crystal)),
            (self.postman, EntityKind::Friendly(FriendlyKind::Postman)),
        ];
        table
            .into_iter()
            .find(|(candidate, _)| *candidate == Some(code))
            .map(|(_, kind)| kind)
    }
}

/// Parsed `level.toml`.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct LevelManifest {
    /// Human readable level name.
    pub name: String,
    /// Boredom budget the level starts with.
    pub boredom_max: u32,
    /// Tile edge length in pixels.
    #[serde(default = "default_tile_size")]
    pub tile_size: u32,
    /// Layer file paths.
    pub layers: LayerPaths,
    /// Tileset shape.
    pub tileset: TilesetConfig,
    /// Entity codes used by the entities layer.
    pub entity_codes: EntityCodes,
}

fn default_tile_size() -> u32 {
    DEFAULT_TILE_SIZE
}

impl LevelManifest {
    /// Parses a manifest from its TOML text.
    pub fn parse(contents: &str) -> Result<Self, TilemapError> {
        Ok(toml::from_str(contents)?)
    }
}

/// Lookup from tile codes to tileset sub-images.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Tileset {
    columns: u32,
    tile_count: u32,
}

impl Tileset {
    /// Creates a lookup for a tileset with `columns` sub-images per row.
    #[must_use]
    pub const fn new(columns: u32, tile_count: u32) -> Self {
        Self {
            columns,
            tile_count,
        }
    }

    /// Number of sub-images in the tileset.
    #[must_use]
    pub const fn tile_count(&self) -> u32 {
        self.tile_count
    }

    /// Sub-image `(column, row)` for `code`, or `None` for codes outside the tileset.
    #[must_use]
    pub fn frame(&self, code: i32) -> Option<(u32, u32)> {
        let code = u32::try_from(code).ok()?;
        if self.columns == 0 || code >= self.tile_count {
            return None;
        }
        Some((code % self.columns, code / self.columns))
    }
}

/// Fully loaded level: manifest plus decoded layers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TileMap {
    manifest: LevelManifest,
    landscape: Layer,
    entities: Layer,
    decorations: Option<Layer>,
}

impl TileMap {
    /// Loads the manifest at `path` and every layer it names.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TilemapError> {
        let manifest_path = path.as_ref();
        let contents = read(manifest_path)?;
        let manifest = LevelManifest::parse(&contents)?;
        let base = manifest_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        let landscape = read_layer("landscape", &base.join(&manifest.layers.landscape))?;
        let entities = read_layer("entities", &base.join(&manifest.layers.entities))?;
        let decorations = match &manifest.layers.decorations {
            Some(relative) => Some(read_layer("decorations", &base.join(relative))?),
            None => None,
        };

        let map = Self::from_layers(manifest, landscape, entities, decorations)?;
        info!(
            level = %map.manifest.name,
            columns = map.landscape.columns(),
            rows = map.landscape.rows(),
            "loaded tile map"
        );
        Ok(map)
    }

    /// Assembles a tile map from already decoded layers.
    pub fn from_layers(
        manifest: LevelManifest,
        landscape: Layer,
        entities: Layer,
        decorations: Option<Layer>,
    ) -> Result<Self, TilemapError> {
        let expected = (landscape.columns(), landscape.rows());
        ensure_matches("entities", expected, &entities)?;
        if let Some(decorations) = &decorations {
            ensure_matches("decorations", expected, decorations)?;
        }
        Ok(Self {
            manifest,
            landscape,
            entities,
            decorations,
        })
    }

    /// Manifest the map was loaded from.
    #[must_use]
    pub fn manifest(&self) -> &LevelManifest {
        &self.manifest
    }

    /// Grid dimensions as `(columns, rows)`.
    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.landscape.columns(), self.landscape.rows())
    }

    /// Landscape layer codes.
    #[must_use]
    pub fn landscape(&self) -> &Layer {
        &self.landscape
    }

    /// Entities layer codes.
    #[must_use]
    pub fn entities(&self) -> &Layer {
        &self.entities
    }

    /// Decorations layer codes, if the level has any.
    #[must_use]
    pub fn decorations(&self) -> Option<&Layer> {
        self.decorations.as_ref()
    }

    /// Tileset lookup described by the manifest.
    #[must_use]
    pub fn tileset(&self) -> Tileset {
        Tileset::new(
            self.manifest.tileset.columns,
            self.manifest.tileset.tile_count,
        )
    }

    /// Decodes the landscape and entity layers into a level layout.
    pub fn layout(&self) -> Result<LevelLayout, TilemapError> {
        let (columns, rows) = self.dimensions();
        let mut landscape = Vec::with_capacity(columns as usize * rows as usize);
        for row in 0..rows {
            for column in 0..columns {
                let is_wall = self
                    .landscape
                    .code(CellCoord::new(column, row))
                    .is_some_and(|code| self.manifest.tileset.wall_codes.contains(&code));
                landscape.push(if is_wall {
                    Landscape::Wall
                } else {
                    Landscape::Open
                });
            }
        }

        let mut spawns = Vec::new();
        for (cell, code) in self.entities.tiles() {
            let kind = self
                .manifest
                .entity_codes
                .kind(code)
                .ok_or(TilemapError::UnknownEntityCode { code, cell })?;
            spawns.push(Spawn { kind, cell });
        }

        Ok(LevelLayout::new(columns, rows, landscape, spawns))
    }

    /// Level tuning derived from the manifest.
    #[must_use]
    pub fn level_config(&self) -> LevelConfig {
        LevelConfig {
            boredom_max: self.manifest.boredom_max,
            ..LevelConfig::default()
        }
    }

    /// Builds a fresh world for this level.
    pub fn build_world(&self, config: LevelConfig) -> Result<World, TilemapError> {
        Ok(World::new(self.layout()?, config)?)
    }
}

fn read(path: &Path) -> Result<String, TilemapError> {
    fs::read_to_string(path).map_err(|source| TilemapError::Read {
        path: path.to_path_buf(),
        source,
    })
}

fn read_layer(name: &'static str, path: &Path) -> Result<Layer, TilemapError> {
    let contents = read(path)?;
    Layer::parse(&contents).map_err(|defect| match defect {
        LayerDefect::Empty => TilemapError::EmptyLayer { layer: name },
        LayerDefect::NotAnInteger { row, column, value } => TilemapError::InvalidCode {
            layer: name,
            row,
            column,
            value,
        },
        LayerDefect::Ragged {
            row,
            expected,
            actual,
        } => TilemapError::RaggedLayer {
            layer: name,
            row,
            expected,
            actual,
        },
    })
}

fn ensure_matches(
    name: &'static str,
    expected: (u32, u32),
    layer: &Layer,
) -> Result<(), TilemapError> {
    let actual = (layer.columns(), layer.rows());
    if actual != expected {
        return Err(TilemapError::LayerMismatch {
            layer: name,
            expected,
            actual,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const MANIFEST: &str = r#"
        name = "meadow"
        boredom_max = 80

        [layers]
        landscape = "landscape.csv"
        entities = "entities.csv"

        [tileset]
        columns = 4
        tile_count = 10
        wall_codes = [5]

        [entity_codes]
        player = 0
        skeleton = 1
    "#;

    #[test]
    fn manifest_defaults_tile_size_and_decorations() {
        let manifest = LevelManifest::parse(MANIFEST).expect("manifest");
        assert_eq!(manifest.tile_size, DEFAULT_TILE_SIZE);
        assert_eq!(manifest.layers.decorations, None);
        assert_eq!(manifest.entity_codes.damsel, None);
        assert_eq!(manifest.entity_codes.postman, None);
    }

    #[test]
    fn postman_code_places_a_postman() {
        let manifest = LevelManifest::parse(&format!("{MANIFEST}        postman = 9\n"))
            .expect("manifest");
        assert_eq!(
            manifest.entity_codes.kind(9),
            Some(EntityKind::Friendly(FriendlyKind::Postman))
        );
        assert_eq!(
            manifest.entity_codes.kind(1),
            Some(EntityKind::Enemy(EnemyKind::Skeleton))
        );
        assert_eq!(manifest.entity_codes.kind(3), None);
    }

    #[test]
    fn manifest_missing_layers_is_rejected() {
        let error = LevelManifest::parse("name = \"x\"\nboredom_max = 1\n").expect_err("invalid");
        assert!(matches!(error, TilemapError::Manifest(_)));
    }

    #[test]
    fn tileset_maps_codes_row_major() {
        let tileset = Tileset::new(4, 10);
        assert_eq!(tileset.frame(0), Some((0, 0)));
        assert_eq!(tileset.frame(6), Some((2, 1)));
        assert_eq!(tileset.frame(9), Some((1, 2)));
        assert_eq!(tileset.frame(10), None);
        assert_eq!(tileset.frame(-1), None);
        assert_eq!(Tileset::new(0, 10).frame(1), None);
    }

    #[test]
    fn entity_codes_resolve_kinds() {
        let manifest = LevelManifest::parse(MANIFEST).expect("manifest");
        let codes = &manifest.entity_codes;
        assert_eq!(codes.kind(0), Some(EntityKind::Player));
        assert_eq!(codes.kind(1), Some(EntityKind::Enemy(EnemyKind::Skeleton)));
        assert_eq!(codes.kind(2), None);
    }

    #[test]
    fn layout_decodes_walls_and_spawns() {
        let manifest = LevelManifest::parse(MANIFEST).expect("manifest");
        let landscape = Layer::parse("5,5,5\n5,2,-1\n").expect("landscape");
        let entities = Layer::parse("-1,-1,-1\n-1,0,1\n").expect("entities");
        let map = TileMap::from_layers(manifest, landscape, entities, None).expect("map");

        let layout = map.layout().expect("layout");
        assert_eq!((layout.columns(), layout.rows()), (3, 2));
        assert_eq!(
            layout.landscape(),
            &[
                Landscape::Wall,
                Landscape::Wall,
                Landscape::Wall,
                Landscape::Wall,
                Landscape::Open,
                Landscape::Open,
            ]
        );
        assert_eq!(
            layout.spawns(),
            &[
                Spawn {
                    kind: EntityKind::Player,
                    cell: CellCoord::new(1, 1),
                },
                Spawn {
                    kind: EntityKind::Enemy(EnemyKind::Skeleton),
                    cell: CellCoord::new(2, 1),
                },
            ]
        );
        assert_eq!(map.level_config().boredom_max, 80);
    }

    #[test]
    fn unknown_entity_codes_are_fatal() {
        let manifest = LevelManifest::parse(MANIFEST).expect("manifest");
        let landscape = Layer::parse("2,2\n").expect("landscape");
        let entities = Layer::parse("0,9\n").expect("entities");
        let map = TileMap::from_layers(manifest, landscape, entities, None).expect("map");

        assert!(matches!(
            map.layout(),
            Err(TilemapError::UnknownEntityCode { code: 9, cell }) if cell == CellCoord::new(1, 0)
        ));
    }

    #[test]
    fn levels_without_a_player_fail_to_build() {
        let manifest = LevelManifest::parse(MANIFEST).expect("manifest");
        let landscape = Layer::parse("2,2\n").expect("landscape");
        let entities = Layer::parse("1,-1\n").expect("entities");
        let map = TileMap::from_layers(manifest, landscape, entities, None).expect("map");

        assert!(matches!(
            map.build_world(map.level_config()),
            Err(TilemapError::Level(LevelError::MissingPlayer))
        ));
    }

    #[test]
    fn mismatched_layers_are_rejected() {
        let manifest = LevelManifest::parse(MANIFEST).expect("manifest");
        let landscape = Layer::parse("2,2\n2,2\n").expect("landscape");
        let entities = Layer::parse("0,-1\n").expect("entities");

        assert!(matches!(
            TileMap::from_layers(manifest, landscape, entities, None),
            Err(TilemapError::LayerMismatch {
                layer: "entities",
                expected: (2, 2),
                actual: (2, 1),
            })
        ));
    }
}
