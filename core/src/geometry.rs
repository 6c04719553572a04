//! Continuous positions, unit headings and grid line walking.

use std::f32::consts::PI;

use crate::CellCoord;

/// Continuous location measured in cell units.
///
/// The x axis follows grid columns and the y axis follows grid rows, so the
/// cell containing a position is `(floor(x), floor(y))`. The y axis grows
/// downward to match screen space.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Position {
    x: f32,
    y: f32,
}

impl Position {
    /// Creates a position from raw cell-unit coordinates.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Horizontal coordinate measured in cell units.
    #[must_use]
    pub const fn x(&self) -> f32 {
        self.x
    }

    /// Vertical coordinate measured in cell units.
    #[must_use]
    pub const fn y(&self) -> f32 {
        self.y
    }

    /// Cell containing the position, or `None` when either axis is negative or not finite.
    #[must_use]
    pub fn cell(&self) -> Option<CellCoord> {
        if !self.x.is_finite() || !self.y.is_finite() || self.x < 0.0 || self.y < 0.0 {
            return None;
        }

        let column = self.x.floor();
        let row = self.y.floor();
        if column > u32::MAX as f32 || row > u32::MAX as f32 {
            return None;
        }

        Some(CellCoord::new(column as u32, row as u32))
    }

    /// Cell containing the position after clamping it into a `columns` × `rows` grid.
    ///
    /// Returns `None` for an empty grid.
    #[must_use]
    pub fn clamped_cell(&self, columns: u32, rows: u32) -> Option<CellCoord> {
        if columns == 0 || rows == 0 {
            return None;
        }

        let clamp_axis = |value: f32, count: u32| -> u32 {
            if !value.is_finite() || value <= 0.0 {
                return 0;
            }
            let floored = value.floor();
            let last = count - 1;
            if floored >= last as f32 {
                last
            } else {
                floored as u32
            }
        };

        Some(CellCoord::new(
            clamp_axis(self.x, columns),
            clamp_axis(self.y, rows),
        ))
    }

    /// Returns the position advanced `distance` cells along `heading`.
    #[must_use]
    pub fn advanced(self, heading: Heading, distance: f32) -> Self {
        Self {
            x: self.x + heading.x() * distance,
            y: self.y + heading.y() * distance,
        }
    }

    /// Euclidean distance to another position.
    #[must_use]
    pub fn distance_to(&self, other: Position) -> f32 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    /// Heading pointing from this position toward `other`.
    ///
    /// Coincident positions yield the default heading.
    #[must_use]
    pub fn heading_to(&self, other: Position) -> Heading {
        Heading::new(other.x - self.x, other.y - self.y)
    }

    /// Reports whether the position lies inside a `columns` × `rows` grid.
    #[must_use]
    pub fn is_within(&self, columns: u32, rows: u32) -> bool {
        self.x.is_finite()
            && self.y.is_finite()
            && self.x >= 0.0
            && self.y >= 0.0
            && self.x < columns as f32
            && self.y < rows as f32
    }
}

/// Screen-facing compass quadrant derived from a heading.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Quadrant {
    /// Facing toward decreasing rows.
    Up,
    /// Facing toward increasing rows.
    Down,
    /// Facing toward decreasing columns.
    Left,
    /// Facing toward increasing columns.
    Right,
}

/// Unit-length direction of travel.
///
/// Fields stay private so every heading in the simulation is normalised.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Heading {
    x: f32,
    y: f32,
}

impl Heading {
    /// Heading facing increasing columns.
    pub const RIGHT: Heading = Heading { x: 1.0, y: 0.0 };
    /// Heading facing decreasing columns.
    pub const LEFT: Heading = Heading { x: -1.0, y: 0.0 };
    /// Heading facing decreasing rows.
    pub const UP: Heading = Heading { x: 0.0, y: -1.0 };
    /// Heading facing increasing rows.
    pub const DOWN: Heading = Heading { x: 0.0, y: 1.0 };

    /// Creates a heading by normalising the provided vector.
    ///
    /// Zero-length or non-finite vectors fall back to [`Heading::RIGHT`].
    #[must_use]
    pub fn new(x: f32, y: f32) -> Self {
        let length = x.hypot(y);
        if !length.is_finite() || length <= f32::EPSILON {
            return Self::RIGHT;
        }

        Self {
            x: x / length,
            y: y / length,
        }
    }

    /// Creates a heading from an angle measured clockwise from [`Heading::RIGHT`].
    #[must_use]
    pub fn from_radians(radians: f32) -> Self {
        let (sin, cos) = radians.sin_cos();
        Self::new(cos, sin)
    }

    /// Horizontal component in `[-1, 1]`.
    #[must_use]
    pub const fn x(&self) -> f32 {
        self.x
    }

    /// Vertical component in `[-1, 1]`.
    #[must_use]
    pub const fn y(&self) -> f32 {
        self.y
    }

    /// Angle of the heading measured clockwise from [`Heading::RIGHT`].
    #[must_use]
    pub fn radians(&self) -> f32 {
        self.y.atan2(self.x)
    }

    /// Returns the heading rotated clockwise by `radians`.
    #[must_use]
    pub fn rotated(self, radians: f32) -> Self {
        let (sin, cos) = radians.sin_cos();
        Self::new(self.x * cos - self.y * sin, self.x * sin + self.y * cos)
    }

    /// Signed angle in `[-PI, PI]` that rotates this heading onto `other`.
    #[must_use]
    pub fn angle_to(&self, other: Heading) -> f32 {
        let cross = self.x * other.y - self.y * other.x;
        let dot = self.x * other.x + self.y * other.y;
        cross.atan2(dot).clamp(-PI, PI)
    }

    /// Rotates toward `desired` by at most `max_radians`.
    ///
    /// When the remaining angle fits within the bound the desired heading is
    /// returned exactly, so repeated easing converges instead of oscillating.
    #[must_use]
    pub fn rotate_towards(self, desired: Heading, max_radians: f32) -> Self {
        let limit = max_radians.abs();
        let remaining = self.angle_to(desired);
        if remaining.abs() <= limit {
            return desired;
        }

        self.rotated(limit.copysign(remaining))
    }

    /// Heading pointing the opposite way.
    #[must_use]
    pub fn reversed(self) -> Self {
        Self::new(-self.x, -self.y)
    }

    /// Heading with the horizontal component mirrored.
    #[must_use]
    pub fn mirrored_horizontally(self) -> Self {
        Self::new(-self.x, self.y)
    }

    /// Heading with the vertical component mirrored.
    #[must_use]
    pub fn mirrored_vertically(self) -> Self {
        Self::new(self.x, -self.y)
    }

    /// Dot product with a raw vector.
    #[must_use]
    pub fn dot(&self, x: f32, y: f32) -> f32 {
        self.x * x + self.y * y
    }

    /// Compass quadrant the heading faces.
    ///
    /// The dominant axis decides; an exact diagonal resolves to the horizontal
    /// quadrant.
    #[must_use]
    pub fn quadrant(&self) -> Quadrant {
        if self.x.abs() >= self.y.abs() {
            if self.x >= 0.0 {
                Quadrant::Right
            } else {
                Quadrant::Left
            }
        } else if self.y > 0.0 {
            Quadrant::Down
        } else {
            Quadrant::Up
        }
    }
}

impl Default for Heading {
    fn default() -> Self {
        Self::RIGHT
    }
}

/// Cells visited by a Bresenham line from `from` to `to`, both endpoints included.
#[must_use]
pub fn line_cells(from: CellCoord, to: CellCoord) -> Vec<CellCoord> {
    let (ax, ay) = (i64::from(from.column()), i64::from(from.row()));
    let (bx, by) = (i64::from(to.column()), i64::from(to.row()));
    let x_diff = (ax - bx).abs();
    let y_diff = (ay - by).abs();
    let x_sign = if bx < ax { -1 } else { 1 };
    let y_sign = if by < ay { -1 } else { 1 };

    let size = usize::try_from(x_diff.max(y_diff) + 1).unwrap_or(1);
    let mut cells = Vec::with_capacity(size);
    cells.push(from);

    let (mut x, mut y) = (ax, ay);
    if x_diff >= y_diff {
        let mut test = x_diff / 2;
        for _ in 0..x_diff {
            x += x_sign;
            test -= y_diff;
            if test < 0 {
                y += y_sign;
                test += x_diff;
            }
            cells.push(CellCoord::new(x as u32, y as u32));
        }
    } else {
        let mut test = y_diff / 2;
        for _ in 0..y_diff {
            y += y_sign;
            test -= x_diff;
            if test < 0 {
                x += x_sign;
                test += y_diff;
            }
            cells.push(CellCoord::new(x as u32, y as u32));
        }
    }

    cells
}
