#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the hex map engine.
//!
//! This crate defines the lattice arithmetic and the message surface that
//! connects adapters, the authoritative grid, and pure systems. Adapters and
//! systems submit [`Command`] values describing desired terrain edits, the
//! world executes those commands via its `apply` entry point, and then
//! broadcasts [`Event`] values, most notably the regions whose geometry must
//! be regenerated.

mod coordinates;
mod direction;
pub mod metrics;

pub use coordinates::{HexCoordinates, POSITION_AXIS_LIMIT};
pub use direction::{EdgeType, HexDirection};

use serde::{Deserialize, Serialize};

/// Commands that express all permissible grid mutations.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    /// Rebuilds the grid with new dimensions, discarding all cells.
    ConfigureGrid {
        /// Number of cell columns.
        width: u32,
        /// Number of cell rows.
        height: u32,
    },
    /// Changes the ground cover classification of a cell.
    SetTerrainType {
        /// Cell to edit.
        cell: HexCoordinates,
        /// New terrain type index.
        index: u8,
    },
    /// Changes the elevation of a cell.
    SetElevation {
        /// Cell to edit.
        cell: HexCoordinates,
        /// New elevation level.
        elevation: i32,
    },
    /// Changes the water level of a cell.
    SetWaterLevel {
        /// Cell to edit.
        cell: HexCoordinates,
        /// New water level.
        level: i32,
    },
    /// Changes the urban density of a cell.
    SetUrbanLevel {
        /// Cell to edit.
        cell: HexCoordinates,
        /// New urban level.
        level: u8,
    },
    /// Changes the farmland density of a cell.
    SetFarmLevel {
        /// Cell to edit.
        cell: HexCoordinates,
        /// New farm level.
        level: u8,
    },
    /// Changes the vegetation density of a cell.
    SetPlantLevel {
        /// Cell to edit.
        cell: HexCoordinates,
        /// New plant level.
        level: u8,
    },
    /// Marks a cell with a special feature, or clears it with zero.
    SetSpecialIndex {
        /// Cell to edit.
        cell: HexCoordinates,
        /// New special feature index.
        index: u8,
    },
    /// Raises or removes walls around a cell.
    SetWalled {
        /// Cell to edit.
        cell: HexCoordinates,
        /// Whether the cell should be walled.
        walled: bool,
    },
    /// Starts a river flowing out of a cell in the provided direction.
    SetOutgoingRiver {
        /// Cell the river flows out of.
        cell: HexCoordinates,
        /// Edge the river crosses.
        direction: HexDirection,
    },
    /// Removes both the incoming and outgoing river of a cell.
    RemoveRiver {
        /// Cell to edit.
        cell: HexCoordinates,
    },
    /// Lays a road across the provided edge of a cell.
    AddRoad {
        /// Cell the road starts in.
        cell: HexCoordinates,
        /// Edge the road crosses.
        direction: HexDirection,
    },
    /// Removes every road touching a cell.
    RemoveRoads {
        /// Cell to edit.
        cell: HexCoordinates,
    },
    /// Places a new unit on a cell.
    SpawnUnit {
        /// Cell the unit occupies.
        cell: HexCoordinates,
        /// Facing of the unit in degrees around the vertical axis.
        orientation: f32,
    },
    /// Moves an existing unit to another cell.
    RelocateUnit {
        /// Unit to move.
        unit: UnitId,
        /// Destination cell.
        cell: HexCoordinates,
    },
    /// Removes a unit from the map.
    RemoveUnit {
        /// Unit to remove.
        unit: UnitId,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// A render region contains cells whose visible attributes changed.
    RegionChanged {
        /// Region that must be regenerated.
        region: ChunkId,
    },
    /// The grid was rebuilt with new dimensions.
    GridConfigured {
        /// Number of cell columns.
        width: u32,
        /// Number of cell rows.
        height: u32,
    },
    /// A rebuild request used dimensions the grid cannot represent.
    GridConfigurationRejected {
        /// Requested number of cell columns.
        width: u32,
        /// Requested number of cell rows.
        height: u32,
    },
    /// A unit was placed on the map.
    UnitSpawned {
        /// Identifier allocated to the unit.
        unit: UnitId,
        /// Cell the unit occupies.
        cell: HexCoordinates,
    },
    /// A unit moved between two cells.
    UnitRelocated {
        /// Unit that moved.
        unit: UnitId,
        /// Cell the unit left.
        from: HexCoordinates,
        /// Cell the unit now occupies.
        to: HexCoordinates,
    },
    /// A unit was removed from the map.
    UnitRemoved {
        /// Unit that was removed.
        unit: UnitId,
    },
    /// A unit could not be placed because the cell is not a valid destination.
    UnitPlacementRejected {
        /// Cell named by the rejected request.
        cell: HexCoordinates,
    },
}

/// Identifier of a render region grouping a rectangular block of cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChunkId(u32);

impl ChunkId {
    /// Creates a region identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UnitId(u32);

impl UnitId {
    /// Creates a unit identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Number of cells along each axis of a render region.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "ChunkSizeRepr", into = "ChunkSizeRepr")]
pub struct ChunkSize {
    columns: u32,
    rows: u32,
}

impl ChunkSize {
    /// Creates a region granularity. Zero extents are raised to one.
    #[must_use]
    pub const fn new(columns: u32, rows: u32) -> Self {
        Self {
            columns: if columns == 0 { 1 } else { columns },
            rows: if rows == 0 { 1 } else { rows },
        }
    }

    /// Cell columns per region.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Cell rows per region.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Reports whether a grid of the provided size tiles into whole regions.
    #[must_use]
    pub const fn divides(&self, width: u32, height: u32) -> bool {
        width > 0 && height > 0 && width % self.columns == 0 && height % self.rows == 0
    }
}

impl Default for ChunkSize {
    fn default() -> Self {
        Self::new(metrics::DEFAULT_CHUNK_SIZE_X, metrics::DEFAULT_CHUNK_SIZE_Z)
    }
}

#[derive(Clone, Copy, Serialize, Deserialize)]
struct ChunkSizeRepr {
    columns: u32,
    rows: u32,
}

impl From<ChunkSizeRepr> for ChunkSize {
    fn from(repr: ChunkSizeRepr) -> Self {
        Self::new(repr.columns, repr.rows)
    }
}

impl From<ChunkSize> for ChunkSizeRepr {
    fn from(size: ChunkSize) -> Self {
        Self {
            columns: size.columns,
            rows: size.rows,
        }
    }
}

/// Tunables applied when a grid is created or rebuilt.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSettings {
    /// Granularity of the render regions the grid reports changes for.
    #[serde(default)]
    pub chunk_size: ChunkSize,
}

impl GridSettings {
    /// Settings using the provided region granularity.
    #[must_use]
    pub const fn with_chunk_size(chunk_size: ChunkSize) -> Self {
        Self { chunk_size }
    }
}

#[cfg(test)]
mod tests {
    use super::{ChunkSize, Command, HexCoordinates, HexDirection, UnitId};
    use serde::{de::DeserializeOwned, Serialize};

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn river_command_round_trips_through_bincode() {
        assert_round_trip(&Command::SetOutgoingRiver {
            cell: HexCoordinates::new(-2, 5),
            direction: HexDirection::SW,
        });
    }

    #[test]
    fn unit_command_round_trips_through_bincode() {
        assert_round_trip(&Command::RelocateUnit {
            unit: UnitId::new(9),
            cell: HexCoordinates::from_offset(4, 1),
        });
    }

    #[test]
    fn chunk_size_rejects_misaligned_grids() {
        let chunk = ChunkSize::default();
        assert!(chunk.divides(20, 15));
        assert!(!chunk.divides(21, 15));
        assert!(!chunk.divides(0, 15));
        assert!(!chunk.divides(20, 0));
    }

    #[test]
    fn chunk_size_never_has_zero_extent() {
        let chunk = ChunkSize::new(0, 3);
        assert_eq!(chunk.columns(), 1);
        assert_eq!(chunk.rows(), 3);
        assert!(chunk.divides(7, 6));
    }
}
