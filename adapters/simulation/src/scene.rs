use std::collections::BTreeSet;

use glam::Vec2;
use lunk_core::{CellCoord, EntitySnapshot, Position};
use lunk_rendering::{
    AnimationFrame, HudPresentation, Scene, SpritePresentation, TileLayer, TilePresentation,
    TileSprite,
};
use lunk_system_camera::Camera;
use lunk_tilemap::{TileMap, Tileset};
use lunk_world::{query, World};
use tracing::warn;

/// Rewrites `scene` to mirror the world.
///
/// `reported` collects tile codes already reported as missing from the
/// tileset so each one is only logged once.
pub(crate) fn populate(
    scene: &mut Scene,
    world: &World,
    tilemap: Option<&TileMap>,
    camera: &Camera,
    reported: &mut BTreeSet<i32>,
) {
    scene.tiles.clear();
    scene.sprites.clear();

    populate_tiles(scene, world, tilemap, reported);

    let tick = query::tick_index(world);
    scene.sprites.extend(
        query::entity_view(world)
            .iter()
            .map(|snapshot| sprite(snapshot, tick)),
    );

    let score = query::score(world);
    scene.hud = HudPresentation {
        score: score.score,
        boredom: score.boredom,
        boredom_max: score.boredom_max,
        next_attack: query::next_attack(world),
        level_ended: query::level_ended(world),
    };

    let viewport = camera.viewport();
    scene.viewport_origin = viewport.origin();
    scene.viewport_size = viewport.size();
}

fn populate_tiles(
    scene: &mut Scene,
    world: &World,
    tilemap: Option<&TileMap>,
    reported: &mut BTreeSet<i32>,
) {
    let landscape = query::landscape_view(world);
    let (columns, rows) = landscape.dimensions();
    let tileset = tilemap.map(TileMap::tileset);

    for row in 0..rows {
        for column in 0..columns {
            let cell = CellCoord::new(column, row);
            let wall = landscape.is_wall(cell);
            let code = tilemap.and_then(|map| map.landscape().code(cell));

            let sprite = match (code, tileset) {
                (Some(code), Some(tileset)) => {
                    let drawn_as_wall = tilemap
                        .is_some_and(|map| map.manifest().tileset.wall_codes.contains(&code));
                    if drawn_as_wall && !wall {
                        // Cleared walls leave bare ground behind.
                        continue;
                    }
                    tile_sprite(tileset, code, reported)
                }
                _ if wall => TileSprite::Placeholder,
                _ => continue,
            };
            scene
                .tiles
                .push(TilePresentation::new(cell, TileLayer::Landscape, sprite, wall));
        }
    }

    let (Some(map), Some(tileset)) = (tilemap, tileset) else {
        return;
    };
    if let Some(decorations) = map.decorations() {
        for (cell, code) in decorations.tiles() {
            let sprite = tile_sprite(tileset, code, reported);
            scene.tiles.push(TilePresentation::new(
                cell,
                TileLayer::Decoration,
                sprite,
                false,
            ));
        }
    }
}

fn tile_sprite(tileset: Tileset, code: i32, reported: &mut BTreeSet<i32>) -> TileSprite {
    match tileset.frame(code) {
        Some((column, row)) => TileSprite::Atlas { column, row },
        None => {
            if reported.insert(code) {
                warn!(
                    code,
                    tile_count = tileset.tile_count(),
                    "tile code has no tileset entry; drawing a placeholder"
                );
            }
            TileSprite::Placeholder
        }
    }
}

fn sprite(snapshot: &EntitySnapshot, tick: u64) -> SpritePresentation {
    let quadrant = snapshot.quadrant();
    let walking = snapshot.kind.is_mobile() && !snapshot.is_halted();
    SpritePresentation {
        entity: snapshot.id,
        kind: snapshot.kind,
        position: to_vec(snapshot.position),
        quadrant,
        frame: AnimationFrame::select(quadrant, tick, walking),
        saved: snapshot.saved,
    }
}

fn to_vec(position: Position) -> Vec2 {
    Vec2::new(position.x(), position.y())
}
