//! Cube coordinate arithmetic for the hexagonal lattice.

use std::fmt;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::{metrics, HexDirection};

/// Largest magnitude of a fractional cube axis accepted by
/// [`HexCoordinates::from_position`].
///
/// Three rounded axes of this size still sum within `i32`.
pub const POSITION_AXIS_LIMIT: f32 = (i32::MAX / 4) as f32;

/// Location of a hex cell expressed in cube coordinates.
///
/// Only `x` and `z` are stored; `y` is derived so that `x + y + z == 0`
/// always holds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HexCoordinates {
    x: i32,
    z: i32,
}

impl HexCoordinates {
    /// Creates cube coordinates from their two stored axes.
    #[must_use]
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Converts a rectangular column/row pair into cube coordinates.
    ///
    /// Rows are shifted by half a cell every other row, so the column is
    /// corrected by `row / 2` rounded toward negative infinity.
    #[must_use]
    pub const fn from_offset(column: i32, row: i32) -> Self {
        Self {
            x: column - row.div_euclid(2),
            z: row,
        }
    }

    /// Projects a point in the map plane onto the lattice and returns the
    /// cell containing it.
    ///
    /// The fractional cube position is rounded per axis; when the rounded
    /// axes no longer sum to zero the axis with the largest rounding error
    /// is rebuilt from the other two. Returns `None` for points that are not
    /// finite or lie beyond [`POSITION_AXIS_LIMIT`] cells from the origin.
    #[must_use]
    pub fn from_position(position: Vec3) -> Option<Self> {
        let mut x = position.x / (metrics::INNER_RADIUS * 2.0);
        let mut y = -x;

        let offset = position.z / (metrics::OUTER_RADIUS * 3.0);
        x -= offset;
        y -= offset;
        let z = -x - y;

        let in_range = |axis: f32| axis.is_finite() && axis.abs() <= POSITION_AXIS_LIMIT;
        if !(in_range(x) && in_range(y) && in_range(z)) {
            return None;
        }

        let mut rounded_x = x.round() as i32;
        let rounded_y = y.round() as i32;
        let mut rounded_z = z.round() as i32;

        if rounded_x + rounded_y + rounded_z != 0 {
            let error_x = (x - rounded_x as f32).abs();
            let error_y = (y - rounded_y as f32).abs();
            let error_z = (z - rounded_z as f32).abs();

            if error_x > error_y && error_x > error_z {
                rounded_x = -rounded_y - rounded_z;
            } else if error_z > error_y {
                rounded_z = -rounded_x - rounded_y;
            }
        }

        Some(Self::new(rounded_x, rounded_z))
    }

    /// Cube `x` axis.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Cube `y` axis, derived from the other two.
    ///
    /// Wraps when `x + z` falls outside the `i32` range.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.x.wrapping_neg().wrapping_sub(self.z)
    }

    /// Cube `z` axis, which doubles as the offset row.
    #[must_use]
    pub const fn z(&self) -> i32 {
        self.z
    }

    /// Offset column of the coordinates, inverse of [`Self::from_offset`].
    ///
    /// Saturates at the bounds of `i32`.
    #[must_use]
    pub const fn column(&self) -> i32 {
        self.x.saturating_add(self.z.div_euclid(2))
    }

    /// Offset row of the coordinates.
    #[must_use]
    pub const fn row(&self) -> i32 {
        self.z
    }

    /// Coordinates of the adjacent cell in the provided direction.
    #[must_use]
    pub const fn neighbor(self, direction: HexDirection) -> Self {
        let (dx, dz) = match direction {
            HexDirection::NE => (0, 1),
            HexDirection::E => (1, 0),
            HexDirection::SE => (1, -1),
            HexDirection::SW => (0, -1),
            HexDirection::W => (-1, 0),
            HexDirection::NW => (-1, 1),
        };
        Self::new(self.x.wrapping_add(dx), self.z.wrapping_add(dz))
    }

    /// Direction leading from `self` to an adjacent cell, if the two touch.
    #[must_use]
    pub fn direction_to(self, other: Self) -> Option<HexDirection> {
        HexDirection::ALL
            .into_iter()
            .find(|direction| self.neighbor(*direction) == other)
    }

    /// Hex distance between two cells: half the sum of the axis deltas.
    #[must_use]
    pub fn distance_to(self, other: Self) -> u32 {
        let dx = i64::from(self.x) - i64::from(other.x);
        let dz = i64::from(self.z) - i64::from(other.z);
        let dy = -dx - dz;
        let distance = (dx.abs() + dy.abs() + dz.abs()) / 2;
        u32::try_from(distance).unwrap_or(u32::MAX)
    }
}

impl fmt::Display for HexCoordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let y = -(i64::from(self.x) + i64::from(self.z));
        write!(f, "({}, {y}, {})", self.x, self.z)
    }
}
