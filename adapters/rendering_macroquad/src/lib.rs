#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Macroquad-backed rendering adapter for Lunk.
//!
//! Macroquad's optional audio stack depends on native ALSA development
//! libraries, which are unavailable in the containerised CI environment.
//! To keep `cargo test` usable everywhere we depend on macroquad without its
//! default `audio` feature.
//!
//! Tiles and sprites are drawn as coloured rectangles; the tileset image is
//! never decoded. Atlas coordinates still pick a stable shade per tile so
//! distinct tiles stay distinguishable.

use anyhow::Result;
use glam::Vec2;
use lunk_core::{Quadrant, Steering};
use lunk_rendering::{
    Color, FrameInput, HudPresentation, Palette, Presentation, RenderingBackend, Scene,
    SpritePresentation, TileLayer, TilePresentation, TileSprite, WALK_FRAMES,
};
use macroquad::input::{is_key_down, is_key_pressed, KeyCode};
use std::{
    collections::VecDeque,
    time::{Duration, Instant},
};
use tracing::info;

const HUD_FONT_SIZE: f32 = 24.0;

/// Snapshot of keyboard state observed during a single frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct KeyboardState {
    /// `Q` or `Escape` to quit the game loop.
    quit_requested: bool,
    /// Left arrow held.
    turn_left: bool,
    /// Right arrow held.
    turn_right: bool,
    /// `R` to start the level over.
    restart_requested: bool,
}

impl KeyboardState {
    fn poll() -> Self {
        Self {
            quit_requested: is_key_pressed(KeyCode::Escape) || is_key_pressed(KeyCode::Q),
            turn_left: is_key_down(KeyCode::Left),
            turn_right: is_key_down(KeyCode::Right),
            restart_requested: is_key_pressed(KeyCode::R),
        }
    }

    fn frame_input(self) -> FrameInput {
        FrameInput {
            steering: steering_from_keys(self.turn_left, self.turn_right),
            quit: self.quit_requested,
            restart: self.restart_requested,
        }
    }
}

/// Maps held arrow keys to a steering signal; opposing keys cancel out.
fn steering_from_keys(left: bool, right: bool) -> Steering {
    match (left, right) {
        (true, false) => Steering::TurnLeft,
        (false, true) => Steering::TurnRight,
        _ => Steering::None,
    }
}

/// Rendering backend implemented on top of macroquad.
#[derive(Debug)]
pub struct MacroquadBackend {
    swap_interval: Option<i32>,
    show_fps: bool,
    window_width: i32,
    window_height: i32,
}

impl Default for MacroquadBackend {
    fn default() -> Self {
        Self {
            swap_interval: None,
            show_fps: false,
            window_width: 960,
            window_height: 720,
        }
    }
}

impl MacroquadBackend {
    /// Returns a backend that requests the platform's default swap interval.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the backend to request a specific swap interval from the platform.
    #[must_use]
    pub fn with_swap_interval(mut self, swap_interval: Option<i32>) -> Self {
        self.swap_interval = swap_interval;
        self
    }

    /// Configures the backend to either synchronise presentation with the display refresh rate
    /// or render as fast as possible.
    #[must_use]
    pub fn with_vsync(self, enabled: bool) -> Self {
        let swap_interval = if enabled { Some(1) } else { Some(0) };
        self.with_swap_interval(swap_interval)
    }

    /// Configures whether the backend logs frame timing metrics once per second.
    #[must_use]
    pub fn with_show_fps(mut self, show: bool) -> Self {
        self.show_fps = show;
        self
    }

    /// Configures the initial window size in pixels.
    #[must_use]
    pub fn with_window_size(mut self, width: i32, height: i32) -> Self {
        self.window_width = width.max(1);
        self.window_height = height.max(1);
        self
    }
}

impl RenderingBackend for MacroquadBackend {
    fn run<F>(self, presentation: Presentation, mut update_scene: F) -> Result<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) + 'static,
    {
        let Self {
            swap_interval,
            show_fps,
            window_width,
            window_height,
        } = self;

        let Presentation {
            window_title,
            clear_color,
            scene,
        } = presentation;

        let mut config = macroquad::window::Conf {
            window_title,
            window_width,
            window_height,
            ..macroquad::window::Conf::default()
        };
        if let Some(swap_interval) = swap_interval {
            config.platform.swap_interval = Some(swap_interval);
        }

        macroquad::Window::from_config(config, async move {
            let mut scene = scene;
            let background = to_macroquad_color(clear_color);
            let mut fps_counter = FpsCounter::default();

            loop {
                let keyboard = KeyboardState::poll();
                let frame_input = keyboard.frame_input();
                if frame_input.quit {
                    break;
                }

                macroquad::window::clear_background(background);

                let dt_seconds = macroquad::time::get_frame_time();
                let frame_dt = Duration::from_secs_f32(dt_seconds.max(0.0));
                update_scene(frame_dt, frame_input, &mut scene);

                let render_start = Instant::now();
                let metrics = SceneMetrics::from_scene(
                    &scene,
                    macroquad::window::screen_width(),
                    macroquad::window::screen_height(),
                );
                draw_tiles(&scene, &metrics);
                draw_sprites(&scene, &metrics);
                draw_hud(&scene.hud, macroquad::window::screen_width());
                let render = render_start.elapsed();

                if let Some(fps) = fps_counter.record_frame(frame_dt, render) {
                    if show_fps {
                        info!(
                            fps = fps.per_second,
                            trailing = fps.trailing_ten_seconds,
                            render_ms = fps.avg_render.as_secs_f64() * 1_000.0,
                            "frame timing"
                        );
                    }
                }

                macroquad::window::next_frame().await;
            }
        });

        Ok(())
    }
}

#[derive(Debug, Default)]
struct FpsCounter {
    elapsed: Duration,
    frames: u32,
    frame_times: VecDeque<Duration>,
    window_duration: Duration,
    render_accum: Duration,
}

#[derive(Clone, Copy, Debug)]
struct FpsMetrics {
    per_second: f32,
    trailing_ten_seconds: f32,
    avg_render: Duration,
}

impl FpsCounter {
    /// Records a rendered frame and reports averages once a second has elapsed.
    fn record_frame(&mut self, frame: Duration, render: Duration) -> Option<FpsMetrics> {
        self.elapsed += frame;
        self.frames = self.frames.saturating_add(1);
        self.render_accum += render;

        self.frame_times.push_back(frame);
        self.window_duration += frame;

        let trailing_window = Duration::from_secs(10);
        while self.window_duration > trailing_window {
            let Some(removed) = self.frame_times.pop_front() else {
                break;
            };
            self.window_duration = self.window_duration.saturating_sub(removed);
        }

        if self.elapsed < Duration::from_secs(1) {
            return None;
        }

        let seconds = self.elapsed.as_secs_f32();
        let per_second = self.frames as f32 / seconds;
        let window_seconds = self.window_duration.as_secs_f32();
        let trailing_ten_seconds = if window_seconds <= f32::EPSILON {
            per_second
        } else {
            self.frame_times.len() as f32 / window_seconds
        };
        let avg_render = self.render_accum / self.frames.max(1);

        self.elapsed = Duration::ZERO;
        self.frames = 0;
        self.render_accum = Duration::ZERO;
        Some(FpsMetrics {
            per_second,
            trailing_ten_seconds,
            avg_render,
        })
    }
}

/// Screen placement of the visible region.
#[derive(Clone, Copy, Debug, PartialEq)]
struct SceneMetrics {
    scale: f32,
    offset: Vec2,
    tile_step: f32,
}

impl SceneMetrics {
    fn from_scene(scene: &Scene, screen_width: f32, screen_height: f32) -> Self {
        let visible = scene.viewport_size * scene.tile_grid.tile_length;
        let scale = if visible.x <= f32::EPSILON || visible.y <= f32::EPSILON {
            1.0
        } else {
            (screen_width / visible.x).min(screen_height / visible.y)
        };
        let scaled = visible * scale;
        let offset = Vec2::new(
            ((screen_width - scaled.x) * 0.5).max(0.0),
            ((screen_height - scaled.y) * 0.5).max(0.0),
        );

        Self {
            scale,
            offset,
            tile_step: scene.tile_grid.tile_length * scale,
        }
    }

    fn to_screen(&self, scene: &Scene, position: Vec2) -> Vec2 {
        self.offset + scene.to_screen(position) * self.scale
    }
}

fn draw_tiles(scene: &Scene, metrics: &SceneMetrics) {
    for tile in &scene.tiles {
        let corner = Vec2::new(tile.cell.column() as f32, tile.cell.row() as f32);
        let top_left = metrics.to_screen(scene, corner);
        let inset = match tile.layer {
            TileLayer::Landscape => 0.0,
            TileLayer::Decoration => metrics.tile_step * 0.2,
        };
        let size = metrics.tile_step - inset * 2.0;
        macroquad::shapes::draw_rectangle(
            top_left.x + inset,
            top_left.y + inset,
            size,
            size,
            to_macroquad_color(tile_color(tile)),
        );
    }
}

fn tile_color(tile: &TilePresentation) -> Color {
    let base = if tile.wall {
        Palette::WALL
    } else {
        Palette::GROUND
    };
    match tile.sprite {
        TileSprite::Placeholder => Palette::PLACEHOLDER,
        TileSprite::Atlas { column, row } => {
            let shade = ((column * 7 + row * 13) % 5) as f32 * 0.04;
            base.mix(Palette::HIGHLIGHT, shade)
        }
    }
}

fn draw_sprites(scene: &Scene, metrics: &SceneMetrics) {
    for sprite in &scene.sprites {
        let radius = sprite.kind.hitbox_radius();
        let center = metrics.to_screen(scene, sprite.position);
        let extent = radius * 2.0 * metrics.tile_step;
        let color = sprite_color(sprite);
        macroquad::shapes::draw_rectangle(
            center.x - extent * 0.5,
            center.y - extent * 0.5,
            extent,
            extent,
            to_macroquad_color(color),
        );

        let facing = facing_offset(sprite.quadrant) * (extent * 0.35);
        let marker = extent * 0.2;
        macroquad::shapes::draw_rectangle(
            center.x + facing.x - marker * 0.5,
            center.y + facing.y - marker * 0.5,
            marker,
            marker,
            macroquad::color::BLACK,
        );
    }
}

fn sprite_color(sprite: &SpritePresentation) -> Color {
    let step = sprite.frame.column as f32 / (WALK_FRAMES as f32 * 6.0);
    Palette::entity(sprite.kind, sprite.saved).mix(Palette::HIGHLIGHT, step)
}

fn facing_offset(quadrant: Quadrant) -> Vec2 {
    match quadrant {
        Quadrant::Up => Vec2::new(0.0, -1.0),
        Quadrant::Down => Vec2::new(0.0, 1.0),
        Quadrant::Left => Vec2::new(-1.0, 0.0),
        Quadrant::Right => Vec2::new(1.0, 0.0),
    }
}

fn draw_hud(hud: &HudPresentation, screen_width: f32) {
    let text_color = to_macroquad_color(Palette::HUD_TEXT);
    let _ = macroquad::text::draw_text(
        &format!("Score {}", hud.score),
        16.0,
        28.0,
        HUD_FONT_SIZE,
        text_color,
    );
    let _ = macroquad::text::draw_text(
        &format!("Next: {}", hud.attack_label()),
        16.0,
        56.0,
        HUD_FONT_SIZE,
        text_color,
    );

    let bar_width = (screen_width * 0.3).max(0.0);
    let bar_left = screen_width - bar_width - 16.0;
    macroquad::shapes::draw_rectangle(
        bar_left,
        14.0,
        bar_width,
        16.0,
        to_macroquad_color(Palette::HUD_TRACK),
    );
    macroquad::shapes::draw_rectangle(
        bar_left,
        14.0,
        bar_width * hud.boredom_fraction(),
        16.0,
        to_macroquad_color(Palette::boredom_fill(hud.boredom_fraction())),
    );

    if hud.level_ended {
        let _ = macroquad::text::draw_text(
            "Lunk got bored.",
            16.0,
            96.0,
            HUD_FONT_SIZE * 1.5,
            text_color,
        );
        let _ = macroquad::text::draw_text(
            "Press R to try again",
            16.0,
            128.0,
            HUD_FONT_SIZE,
            text_color,
        );
    }
}

fn to_macroquad_color(color: Color) -> macroquad::color::Color {
    macroquad::color::Color::new(color.red, color.green, color.blue, color.alpha)
}
