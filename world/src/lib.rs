#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative hex map state.
//!
//! The [`Grid`] owns every cell together with the scratch state reused by
//! path searches. Terrain edits go through the grid so rivers, roads and
//! special features stay consistent across neighboring cells, and every
//! visible change marks the affected render regions. Adapters drive the grid
//! with [`apply`] and read it back through [`query`].

mod cell;
mod codec;
mod grid;
mod queue;
mod search;
mod terrain;
mod units;

pub use cell::{Cell, CellSnapshot, MAX_LEVEL, UNSET_ELEVATION};
pub use codec::{
    load, load_with, save, FormatError, LEGACY_HEIGHT, LEGACY_WIDTH, MAP_FORMAT_VERSION,
};
pub use grid::{Grid, SizeError};
pub use queue::{BucketLinks, BucketQueue};
pub use search::{PathResult, PathStep};
pub use units::UnitSnapshot;

use hexmap_core::{Command, Event};

/// Applies the provided command to the grid, emitting any resulting events.
///
/// Edits naming cells outside the grid are ignored. Regions changed by the
/// command are reported last, in ascending order.
pub fn apply(grid: &mut Grid, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::ConfigureGrid { width, height } => match grid.rebuild(width, height) {
            Ok(()) => out_events.push(Event::GridConfigured { width, height }),
            Err(_) => out_events.push(Event::GridConfigurationRejected { width, height }),
        },
        Command::SetTerrainType { cell, index } => {
            if let Some(target) = grid.index_of(cell) {
                grid.set_terrain_type_index(target, index);
            }
        }
        Command::SetElevation { cell, elevation } => {
            if let Some(target) = grid.index_of(cell) {
                grid.set_elevation(target, elevation);
            }
        }
        Command::SetWaterLevel { cell, level } => {
            if let Some(target) = grid.index_of(cell) {
                grid.set_water_level(target, level);
            }
        }
        Command::SetUrbanLevel { cell, level } => {
            if let Some(target) = grid.index_of(cell) {
                grid.set_urban_level(target, level);
            }
        }
        Command::SetFarmLevel { cell, level } => {
            if let Some(target) = grid.index_of(cell) {
                grid.set_farm_level(target, level);
            }
        }
        Command::SetPlantLevel { cell, level } => {
            if let Some(target) = grid.index_of(cell) {
                grid.set_plant_level(target, level);
            }
        }
        Command::SetSpecialIndex { cell, index } => {
            if let Some(target) = grid.index_of(cell) {
                grid.set_special_index(target, index);
            }
        }
        Command::SetWalled { cell, walled } => {
            if let Some(target) = grid.index_of(cell) {
                grid.set_walled(target, walled);
            }
        }
        Command::SetOutgoingRiver { cell, direction } => {
            if let Some(target) = grid.index_of(cell) {
                grid.set_outgoing_river(target, direction);
            }
        }
        Command::RemoveRiver { cell } => {
            if let Some(target) = grid.index_of(cell) {
                grid.remove_river(target);
            }
        }
        Command::AddRoad { cell, direction } => {
            if let Some(target) = grid.index_of(cell) {
                grid.add_road(target, direction);
            }
        }
        Command::RemoveRoads { cell } => {
            if let Some(target) = grid.index_of(cell) {
                grid.remove_roads(target);
            }
        }
        Command::SpawnUnit { cell, orientation } => match grid.spawn_unit(cell, orientation) {
            Some(unit) => out_events.push(Event::UnitSpawned { unit, cell }),
            None => out_events.push(Event::UnitPlacementRejected { cell }),
        },
        Command::RelocateUnit { unit, cell } => {
            if let Some(from) = grid.unit(unit).map(|snapshot| snapshot.cell) {
                if !grid.relocate_unit(unit, cell) {
                    out_events.push(Event::UnitPlacementRejected { cell });
                } else if from != cell {
                    out_events.push(Event::UnitRelocated {
                        unit,
                        from,
                        to: cell,
                    });
                }
            }
        }
        Command::RemoveUnit { unit } => {
            if grid.remove_unit(unit) {
                out_events.push(Event::UnitRemoved { unit });
            }
        }
    }

    out_events.extend(
        grid.take_changed_regions()
            .into_iter()
            .map(|region| Event::RegionChanged { region }),
    );
}

/// Query functions that provide read-only access to the grid state.
pub mod query {
    use glam::Vec3;
    use hexmap_core::{ChunkId, HexCoordinates};

    use super::{CellSnapshot, Grid, UnitSnapshot};

    /// Number of cell columns and rows.
    #[must_use]
    pub fn dimensions(grid: &Grid) -> (u32, u32) {
        (grid.width(), grid.height())
    }

    /// Snapshot of the cell at the provided coordinates.
    #[must_use]
    pub fn cell(grid: &Grid, coordinates: HexCoordinates) -> Option<CellSnapshot> {
        grid.cell_at(coordinates).map(|cell| cell.snapshot())
    }

    /// Snapshot of the cell containing a point in the map plane.
    #[must_use]
    pub fn cell_at_position(grid: &Grid, position: Vec3) -> Option<CellSnapshot> {
        grid.cell_at_position(position).map(|cell| cell.snapshot())
    }

    /// Snapshots of every cell in a render region, in row-major order.
    ///
    /// Render collaborators call this after receiving a region change.
    #[must_use]
    pub fn region_snapshot(grid: &Grid, region: ChunkId) -> Vec<CellSnapshot> {
        grid.region_cells(region).map(|cell| cell.snapshot()).collect()
    }

    /// Every unit on the map in identifier order.
    #[must_use]
    pub fn units(grid: &Grid) -> Vec<UnitSnapshot> {
        grid.units()
    }
}
