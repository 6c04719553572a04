#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Lunk adapters.
//!
//! The simulation fills a [`Scene`] draw-list every frame; backends turn it
//! into pixels. Nothing in this crate touches a window.

use anyhow::Result as AnyResult;
use glam::Vec2;
use lunk_core::{
    AttackOption, CellCoord, EnemyKind, EntityId, EntityKind, FriendlyKind, ItemKind, Quadrant,
    Steering,
};
use std::{error::Error, fmt, time::Duration};

/// Walking frames stored per facing row of a character sheet.
pub const WALK_FRAMES: u32 = 3;

/// Simulation ticks each walking frame stays on screen.
pub const TICKS_PER_FRAME: u64 = 8;

/// Straight-alpha RGBA colour with channels in `0.0..=1.0`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel.
    pub red: f32,
    /// Green channel.
    pub green: f32,
    /// Blue channel.
    pub blue: f32,
    /// Opacity.
    pub alpha: f32,
}

impl Color {
    /// Opaque colour from 8-bit channels, as written in level art notes.
    #[must_use]
    pub const fn rgb(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }

    /// Same colour with its opacity replaced.
    #[must_use]
    pub const fn with_alpha(self, alpha: f32) -> Self {
        Self { alpha, ..self }
    }

    /// Linear blend toward `other`; a weight of zero keeps `self`.
    ///
    /// The weight is clamped to `0.0..=1.0` and opacity blends with the channels.
    #[must_use]
    pub fn mix(self, other: Color, weight: f32) -> Self {
        let weight = if weight.is_nan() {
            0.0
        } else {
            weight.clamp(0.0, 1.0)
        };
        let blend = |from: f32, to: f32| from + (to - from) * weight;
        Self {
            red: blend(self.red, other.red),
            green: blend(self.green, other.green),
            blue: blend(self.blue, other.blue),
            alpha: blend(self.alpha, other.alpha),
        }
    }
}

/// Fixed colours of the Lunk look.
///
/// Backends without sprite art draw every tile and entity from this palette.
#[derive(Clone, Copy, Debug)]
pub struct Palette;

impl Palette {
    /// Frame clear colour behind the grid.
    pub const BACKDROP: Color = Color::rgb(24, 20, 28);
    /// Open ground.
    pub const GROUND: Color = Color::rgb(92, 140, 74);
    /// Wall tiles.
    pub const WALL: Color = Color::rgb(70, 62, 54);
    /// Tiles whose code names no tileset image.
    pub const PLACEHOLDER: Color = Color::rgb(255, 0, 255);
    /// Colour that tile and frame shading blends toward.
    pub const HIGHLIGHT: Color = Color::rgb(255, 255, 255);
    /// HUD labels.
    pub const HUD_TEXT: Color = Color::rgb(240, 240, 240);
    /// Track behind the boredom bar.
    pub const HUD_TRACK: Color = Color::rgb(30, 30, 30).with_alpha(0.8);
    /// Boredom bar with a full budget.
    pub const BOREDOM_CALM: Color = Color::rgb(220, 180, 40);
    /// Boredom bar about to run dry.
    pub const BOREDOM_RESTLESS: Color = Color::rgb(200, 40, 30);

    /// Base colour of an entity; saved friendlies glow brighter.
    #[must_use]
    pub fn entity(kind: EntityKind, saved: bool) -> Color {
        let base = match kind {
            EntityKind::Player => Color::rgb(60, 110, 220),
            EntityKind::Enemy(EnemyKind::Skeleton) => Color::rgb(225, 225, 210),
            EntityKind::Enemy(EnemyKind::Minotaur) => Color::rgb(150, 70, 40),
            EntityKind::Friendly(FriendlyKind::Damsel) => Color::rgb(200, 90, 160),
            EntityKind::Friendly(FriendlyKind::Postman) => Color::rgb(70, 90, 170),
            EntityKind::Item(ItemKind::Crystal) => Color::rgb(90, 230, 230),
        };
        if saved {
            base.mix(Self::HIGHLIGHT, 0.25)
        } else {
            base
        }
    }

    /// Fill of the boredom bar for the remaining `fraction` of the budget.
    #[must_use]
    pub fn boredom_fill(fraction: f32) -> Color {
        Self::BOREDOM_RESTLESS.mix(Self::BOREDOM_CALM, fraction)
    }
}

/// Input snapshot gathered by adapters before updating the scene.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct FrameInput {
    /// Steering requested for the player this frame.
    pub steering: Steering,
    /// Whether the user asked to close the game.
    pub quit: bool,
    /// Whether the user asked to start the level over.
    pub restart: bool,
}

/// Dimensions of the tile grid shown by the scene.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TileGridPresentation {
    /// Number of columns in the level.
    pub columns: u32,
    /// Number of rows in the level.
    pub rows: u32,
    /// Edge length of a tile in pixels.
    pub tile_length: f32,
}

impl TileGridPresentation {
    /// Creates a new grid description, rejecting non-positive tile lengths.
    pub fn new(columns: u32, rows: u32, tile_length: f32) -> Result<Self, RenderingError> {
        if !(tile_length > 0.0) {
            return Err(RenderingError::InvalidTileLength { tile_length });
        }

        Ok(Self {
            columns,
            rows,
            tile_length,
        })
    }

    /// Total width of the grid in pixels.
    #[must_use]
    pub fn width(&self) -> f32 {
        self.columns as f32 * self.tile_length
    }

    /// Total height of the grid in pixels.
    #[must_use]
    pub fn height(&self) -> f32 {
        self.rows as f32 * self.tile_length
    }
}

/// Image drawn for a tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TileSprite {
    /// Sub-image of the tileset at the given column and row.
    Atlas {
        /// Tileset column.
        column: u32,
        /// Tileset row.
        row: u32,
    },
    /// The tile code names no sub-image; backends draw a stand-in.
    Placeholder,
}

/// Layer a tile belongs to; decorations draw above the landscape.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TileLayer {
    /// Ground and walls.
    Landscape,
    /// Purely visual overlay.
    Decoration,
}

/// Single tile placed on the grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TilePresentation {
    /// Cell the tile covers.
    pub cell: CellCoord,
    /// Layer the tile is drawn on.
    pub layer: TileLayer,
    /// Image drawn for the tile.
    pub sprite: TileSprite,
    /// Whether the tile currently blocks movement.
    pub wall: bool,
}

impl TilePresentation {
    /// Creates a new tile descriptor.
    #[must_use]
    pub const fn new(cell: CellCoord, layer: TileLayer, sprite: TileSprite, wall: bool) -> Self {
        Self {
            cell,
            layer,
            sprite,
            wall,
        }
    }
}

/// Character-sheet frame selected for a sprite.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AnimationFrame {
    /// Walking frame within the facing row, below [`WALK_FRAMES`].
    pub column: u32,
    /// Facing row of the sheet.
    pub row: u32,
}

impl AnimationFrame {
    /// Selects the frame for a character facing `quadrant` at simulation `tick`.
    ///
    /// Characters that stand still hold the first frame of their row.
    #[must_use]
    pub fn select(quadrant: Quadrant, tick: u64, walking: bool) -> Self {
        let column = if walking {
            ((tick / TICKS_PER_FRAME) % u64::from(WALK_FRAMES)) as u32
        } else {
            0
        };
        Self {
            column,
            row: facing_row(quadrant),
        }
    }
}

/// Sheet row used for each facing.
#[must_use]
pub const fn facing_row(quadrant: Quadrant) -> u32 {
    match quadrant {
        Quadrant::Down => 0,
        Quadrant::Left => 1,
        Quadrant::Right => 2,
        Quadrant::Up => 3,
    }
}

/// Entity drawn on top of the grid.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpritePresentation {
    /// Entity the sprite represents.
    pub entity: EntityId,
    /// Variant of the entity.
    pub kind: EntityKind,
    /// Centre of the sprite in cell units.
    pub position: Vec2,
    /// Facing used to pick the sheet row.
    pub quadrant: Quadrant,
    /// Frame of the character sheet.
    pub frame: AnimationFrame,
    /// Whether the entity is a saved friendly.
    pub saved: bool,
}

/// Numbers shown in the heads-up display.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HudPresentation {
    /// Current score.
    pub score: u32,
    /// Remaining boredom.
    pub boredom: u32,
    /// Boredom the level started with.
    pub boredom_max: u32,
    /// Attack applied to the next enemy encounter.
    pub next_attack: AttackOption,
    /// Whether boredom ran out and the level ended.
    pub level_ended: bool,
}

impl HudPresentation {
    /// Remaining boredom as a fraction of the starting budget.
    #[must_use]
    pub fn boredom_fraction(&self) -> f32 {
        if self.boredom_max == 0 {
            return 0.0;
        }
        self.boredom as f32 / self.boredom_max as f32
    }

    /// Label of the next attack option.
    #[must_use]
    pub const fn attack_label(&self) -> &'static str {
        match self.next_attack {
            AttackOption::Crush => "Crush",
            AttackOption::Throw => "Throw",
            AttackOption::Eat => "Eat",
        }
    }
}

impl Default for HudPresentation {
    fn default() -> Self {
        Self {
            score: 0,
            boredom: 0,
            boredom_max: 0,
            next_attack: AttackOption::FIRST,
            level_ended: false,
        }
    }
}

/// Scene description combining the tile grid, inhabitants and HUD.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    /// Dimensions of the grid.
    pub tile_grid: TileGridPresentation,
    /// Top-left corner of the visible region, in cell units.
    pub viewport_origin: Vec2,
    /// Size of the visible region, in cell units.
    pub viewport_size: Vec2,
    /// Tiles ordered by layer and then row-major.
    pub tiles: Vec<TilePresentation>,
    /// Sprites ordered by entity id.
    pub sprites: Vec<SpritePresentation>,
    /// Heads-up display values.
    pub hud: HudPresentation,
}

impl Scene {
    /// Creates an empty scene showing the whole grid.
    #[must_use]
    pub fn new(tile_grid: TileGridPresentation) -> Self {
        Self {
            viewport_origin: Vec2::ZERO,
            viewport_size: Vec2::new(tile_grid.columns as f32, tile_grid.rows as f32),
            tile_grid,
            tiles: Vec::new(),
            sprites: Vec::new(),
            hud: HudPresentation::default(),
        }
    }

    /// Converts a position in cell units into pixels relative to the viewport.
    #[must_use]
    pub fn to_screen(&self, position: Vec2) -> Vec2 {
        (position - self.viewport_origin) * self.tile_grid.tile_length
    }

    /// Number of tiles drawn as placeholders.
    #[must_use]
    pub fn placeholder_count(&self) -> usize {
        self.tiles
            .iter()
            .filter(|tile| tile.sprite == TileSprite::Placeholder)
            .count()
    }
}

/// Presentation descriptor consumed by rendering backends.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Title used by the created window.
    pub window_title: String,
    /// Solid color used to clear each frame.
    pub clear_color: Color,
    /// Scene content that should be displayed.
    pub scene: Scene,
}

impl Presentation {
    /// Constructs a new presentation descriptor.
    #[must_use]
    pub fn new<T>(window_title: T, clear_color: Color, scene: Scene) -> Self
    where
        T: Into<String>,
    {
        Self {
            window_title: window_title.into(),
            clear_color,
            scene,
        }
    }
}

/// Rendering backend capable of presenting Lunk scenes.
pub trait RenderingBackend {
    /// Runs the rendering backend until it is requested to exit.
    ///
    /// The provided `update_scene` closure receives the real frame delta and
    /// per-frame input captured by the adapter, and refreshes the scene before
    /// it is rendered.
    fn run<F>(self, presentation: Presentation, update_scene: F) -> AnyResult<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) + 'static;
}

/// Errors that can occur when constructing rendering descriptors.
#[derive(Debug, PartialEq)]
pub enum RenderingError {
    /// Tiles must have a positive edge length.
    InvalidTileLength {
        /// Provided length that failed validation.
        tile_length: f32,
    },
}

impl fmt::Display for RenderingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidTileLength { tile_length } => {
                write!(f, "tile_length must be positive (received {tile_length})")
            }
        }
    }
}

impl Error for RenderingError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tile_grid_rejects_non_positive_lengths() {
        let error = TileGridPresentation::new(4, 4, 0.0).expect_err("zero length");
        assert!(matches!(
            error,
            RenderingError::InvalidTileLength { tile_length } if tile_length == 0.0
        ));
        assert!(TileGridPresentation::new(4, 4, f32::NAN).is_err());
    }

    #[test]
    fn tile_grid_reports_pixel_extent() {
        let grid = TileGridPresentation::new(10, 5, 16.0).expect("valid grid");
        assert_eq!(grid.width(), 160.0);
        assert_eq!(grid.height(), 80.0);
    }

    #[test]
    fn walking_cycles_through_three_frames() {
        let frames: Vec<u32> = (0..4)
            .map(|step| AnimationFrame::select(Quadrant::Left, step * TICKS_PER_FRAME, true).column)
            .collect();
        assert_eq!(frames, vec![0, 1, 2, 0]);
        assert_eq!(
            AnimationFrame::select(Quadrant::Left, TICKS_PER_FRAME, false),
            AnimationFrame { column: 0, row: 1 }
        );
    }

    #[test]
    fn facing_rows_follow_the_sheet_layout() {
        assert_eq!(facing_row(Quadrant::Down), 0);
        assert_eq!(facing_row(Quadrant::Left), 1);
        assert_eq!(facing_row(Quadrant::Right), 2);
        assert_eq!(facing_row(Quadrant::Up), 3);
    }

    #[test]
    fn to_screen_is_relative_to_the_viewport() {
        let mut scene = Scene::new(TileGridPresentation::new(20, 20, 16.0).expect("grid"));
        scene.viewport_origin = Vec2::new(2.0, 3.0);
        assert_eq!(scene.to_screen(Vec2::new(4.5, 3.0)), Vec2::new(40.0, 0.0));
    }

    #[test]
    fn hud_reports_fraction_and_label() {
        let hud = HudPresentation {
            score: 3,
            boredom: 25,
            boredom_max: 100,
            next_attack: AttackOption::Throw,
            level_ended: false,
        };
        assert_eq!(hud.boredom_fraction(), 0.25);
        assert_eq!(hud.attack_label(), "Throw");
        assert_eq!(HudPresentation::default().boredom_fraction(), 0.0);
    }

    #[test]
    fn mixing_blends_channels_and_clamps_the_weight() {
        let black = Color::rgb(0, 0, 0);
        let halfway = black.mix(Palette::HIGHLIGHT, 0.5);
        assert!((halfway.red - 0.5).abs() < 1e-6);
        assert_eq!(halfway.alpha, 1.0);
        assert_eq!(black.mix(Palette::HIGHLIGHT, 4.0), Palette::HIGHLIGHT);
        assert_eq!(black.mix(Palette::HIGHLIGHT, f32::NAN), black);
        assert_eq!(Palette::HUD_TRACK.alpha, 0.8);
    }

    #[test]
    fn boredom_bar_turns_restless_as_the_budget_drains() {
        let full = Palette::boredom_fill(1.0);
        assert!((full.red - Palette::BOREDOM_CALM.red).abs() < 1e-6);
        assert!((full.green - Palette::BOREDOM_CALM.green).abs() < 1e-6);
        assert_eq!(Palette::boredom_fill(0.0), Palette::BOREDOM_RESTLESS);
        let low = Palette::boredom_fill(0.2);
        assert!(low.green < Palette::BOREDOM_CALM.green);
        assert!(low.green > Palette::BOREDOM_RESTLESS.green);
    }

    #[test]
    fn saved_friendlies_glow_and_kinds_stay_distinct() {
        let damsel = EntityKind::Friendly(FriendlyKind::Damsel);
        let postman = EntityKind::Friendly(FriendlyKind::Postman);
        assert_ne!(Palette::entity(damsel, true), Palette::entity(damsel, false));
        assert_ne!(Palette::entity(damsel, false), Palette::entity(postman, false));
        assert_eq!(Palette::entity(postman, false).alpha, 1.0);
    }
}
