#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Dead-zone camera that keeps the player on screen.
//!
//! The viewport stays put while the focus wanders inside a margin around its
//! centre. Once the focus escapes, the viewport slides back toward it a
//! fraction of the remaining offset per update until the focus is centred
//! again.

use glam::Vec2;
use lunk_core::Position;

const SETTLED_EPSILON: f32 = 1e-4;

/// Tuning knobs of the camera.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraConfig {
    /// Half-extent of the dead zone as a fraction of the viewport size.
    pub margin_fraction: f32,
    /// Fraction of the remaining offset closed per update.
    pub correction_rate: f32,
    /// Smallest distance moved by an update while correcting, in cells.
    pub min_step: f32,
    /// Size of the world the viewport must stay inside, if any.
    pub bounds: Option<Vec2>,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            margin_fraction: 0.25,
            correction_rate: 0.1,
            min_step: 0.05,
            bounds: None,
        }
    }
}

/// Visible rectangle of the world, in cell units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    origin: Vec2,
    size: Vec2,
}

impl Viewport {
    /// Creates a viewport with the provided top-left corner and size.
    #[must_use]
    pub fn new(origin: Vec2, size: Vec2) -> Self {
        Self {
            origin,
            size: size.max(Vec2::ZERO),
        }
    }

    /// Top-left corner of the viewport.
    #[must_use]
    pub fn origin(&self) -> Vec2 {
        self.origin
    }

    /// Width and height of the viewport.
    #[must_use]
    pub fn size(&self) -> Vec2 {
        self.size
    }

    /// Centre of the viewport.
    #[must_use]
    pub fn center(&self) -> Vec2 {
        self.origin + self.size * 0.5
    }

    /// Reports whether `point` lies inside the viewport, edges included.
    #[must_use]
    pub fn contains(&self, point: Vec2) -> bool {
        let far = self.origin + self.size;
        point.cmpge(self.origin).all() && point.cmple(far).all()
    }
}

/// Viewport controller following a single focus point.
#[derive(Clone, Debug)]
pub struct Camera {
    config: CameraConfig,
    viewport: Viewport,
    correcting: bool,
}

impl Camera {
    /// Creates a camera of the given size centred on `focus`.
    #[must_use]
    pub fn new(config: CameraConfig, size: Vec2, focus: Position) -> Self {
        let mut camera = Self {
            config,
            viewport: Viewport::new(Vec2::ZERO, size),
            correcting: false,
        };
        camera.viewport.origin = camera.centred_origin(to_vec(focus));
        camera
    }

    /// Tuning the camera was created with.
    #[must_use]
    pub fn config(&self) -> &CameraConfig {
        &self.config
    }

    /// Current viewport.
    #[must_use]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Reports whether the camera is sliding back toward its focus.
    #[must_use]
    pub fn is_correcting(&self) -> bool {
        self.correcting
    }

    /// Rectangle the focus may roam without moving the viewport.
    #[must_use]
    pub fn dead_zone(&self) -> Viewport {
        let half = self.viewport.size * self.config.margin_fraction.clamp(0.0, 0.5);
        let center = self.viewport.center();
        Viewport::new(center - half, half * 2.0)
    }

    /// Advances the camera one step toward `focus`.
    pub fn update(&mut self, focus: Position) {
        let focus = to_vec(focus);
        if !self.correcting && self.dead_zone().contains(focus) {
            return;
        }

        let desired = self.centred_origin(focus);
        let offset = desired - self.viewport.origin;
        let remaining = offset.length();
        if remaining <= SETTLED_EPSILON {
            self.correcting = false;
            return;
        }

        let step = (remaining * self.config.correction_rate)
            .max(self.config.min_step)
            .min(remaining);
        let next = self.clamp_origin(self.viewport.origin + offset / remaining * step);
        if next.distance(self.viewport.origin) <= SETTLED_EPSILON {
            self.correcting = false;
            return;
        }

        self.viewport.origin = next;
        self.correcting = next.distance(desired) > SETTLED_EPSILON;
    }

    /// Offset of `position` from the viewport origin, scaled to pixels.
    #[must_use]
    pub fn to_screen(&self, position: Position, tile_size: f32) -> Vec2 {
        (to_vec(position) - self.viewport.origin) * tile_size
    }

    fn centred_origin(&self, focus: Vec2) -> Vec2 {
        self.clamp_origin(focus - self.viewport.size * 0.5)
    }

    fn clamp_origin(&self, origin: Vec2) -> Vec2 {
        match self.config.bounds {
            Some(bounds) => {
                let max = (bounds - self.viewport.size).max(Vec2::ZERO);
                origin.clamp(Vec2::ZERO, max)
            }
            None => origin,
        }
    }
}

fn to_vec(position: Position) -> Vec2 {
    Vec2::new(position.x(), position.y())
}
