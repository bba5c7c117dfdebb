//! Layout constants shared by the grid and its render collaborators.

use glam::Vec3;

/// Distance from a cell center to any of its corners.
pub const OUTER_RADIUS: f32 = 10.0;

/// Ratio between the inner and outer radius of a regular hexagon.
pub const OUTER_TO_INNER: f32 = 0.866_025_4;

/// Distance from a cell center to the middle of any of its edges.
pub const INNER_RADIUS: f32 = OUTER_RADIUS * OUTER_TO_INNER;

/// Vertical world distance covered by one elevation level.
pub const ELEVATION_STEP: f32 = 3.0;

/// Columns per render chunk used when no other granularity is configured.
pub const DEFAULT_CHUNK_SIZE_X: u32 = 5;

/// Rows per render chunk used when no other granularity is configured.
pub const DEFAULT_CHUNK_SIZE_Z: u32 = 5;

/// Center of the cell at the provided offset column and row, at elevation zero.
#[must_use]
pub fn cell_center(column: i32, row: i32) -> Vec3 {
    let shifted = column as f32 + row as f32 * 0.5 - row.div_euclid(2) as f32;
    Vec3::new(
        shifted * (INNER_RADIUS * 2.0),
        0.0,
        row as f32 * (OUTER_RADIUS * 1.5),
    )
}
