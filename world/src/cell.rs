//! Terrain state stored for every hex cell.

use glam::Vec3;
use hexmap_core::{metrics, ChunkId, HexCoordinates, HexDirection, UnitId};

/// Elevation reported by a cell that has never been written.
pub const UNSET_ELEVATION: i32 = i32::MIN;

/// Highest elevation or water level a cell can hold; levels are stored in
/// `0..=MAX_LEVEL`.
pub const MAX_LEVEL: i32 = u8::MAX as i32;

/// Terrain state of a single cell.
///
/// Cells are owned by the [`Grid`](crate::Grid) and only mutated through its
/// edit operations, which keep the cross-cell invariants intact. Neighbors
/// are stored as indices into the grid's cell array.
#[derive(Clone, Debug, PartialEq)]
pub struct Cell {
    pub(crate) coordinates: HexCoordinates,
    pub(crate) chunk: ChunkId,
    pub(crate) neighbors: [Option<usize>; 6],
    pub(crate) elevation: i32,
    pub(crate) water_level: i32,
    pub(crate) terrain_type_index: u8,
    pub(crate) urban_level: u8,
    pub(crate) farm_level: u8,
    pub(crate) plant_level: u8,
    pub(crate) special_index: u8,
    pub(crate) walled: bool,
    pub(crate) incoming_river: Option<HexDirection>,
    pub(crate) outgoing_river: Option<HexDirection>,
    pub(crate) roads: [bool; 6],
    pub(crate) unit: Option<UnitId>,
}

impl Cell {
    pub(crate) fn new(coordinates: HexCoordinates, chunk: ChunkId) -> Self {
        Self {
            coordinates,
            chunk,
            neighbors: [None; 6],
            elevation: UNSET_ELEVATION,
            water_level: 0,
            terrain_type_index: 0,
            urban_level: 0,
            farm_level: 0,
            plant_level: 0,
            special_index: 0,
            walled: false,
            incoming_river: None,
            outgoing_river: None,
            roads: [false; 6],
            unit: None,
        }
    }

    /// Lattice coordinates assigned when the grid was built.
    #[must_use]
    pub const fn coordinates(&self) -> HexCoordinates {
        self.coordinates
    }

    /// Render region the cell belongs to.
    #[must_use]
    pub const fn chunk(&self) -> ChunkId {
        self.chunk
    }

    /// Index of the adjacent cell in the provided direction, if any.
    #[must_use]
    pub const fn neighbor(&self, direction: HexDirection) -> Option<usize> {
        self.neighbors[direction.index()]
    }

    /// Elevation level of the cell.
    #[must_use]
    pub const fn elevation(&self) -> i32 {
        self.elevation
    }

    /// Water surface level of the cell.
    #[must_use]
    pub const fn water_level(&self) -> i32 {
        self.water_level
    }

    /// Reports whether the water surface lies above the ground.
    #[must_use]
    pub const fn is_underwater(&self) -> bool {
        self.water_level > self.elevation
    }

    /// Ground cover classification used when texturing.
    #[must_use]
    pub const fn terrain_type_index(&self) -> u8 {
        self.terrain_type_index
    }

    /// Urban density.
    #[must_use]
    pub const fn urban_level(&self) -> u8 {
        self.urban_level
    }

    /// Farmland density.
    #[must_use]
    pub const fn farm_level(&self) -> u8 {
        self.farm_level
    }

    /// Vegetation density.
    #[must_use]
    pub const fn plant_level(&self) -> u8 {
        self.plant_level
    }

    /// Combined cover penalty paid when walking into the cell.
    #[must_use]
    pub const fn cover_cost(&self) -> i32 {
        self.urban_level as i32 + self.farm_level as i32 + self.plant_level as i32
    }

    /// Special feature index; zero means no special feature.
    #[must_use]
    pub const fn special_index(&self) -> u8 {
        self.special_index
    }

    /// Reports whether the cell hosts a special feature.
    #[must_use]
    pub const fn is_special(&self) -> bool {
        self.special_index > 0
    }

    /// Reports whether the cell is surrounded by walls.
    #[must_use]
    pub const fn walled(&self) -> bool {
        self.walled
    }

    /// Edge a river flows in through, if any.
    #[must_use]
    pub const fn incoming_river(&self) -> Option<HexDirection> {
        self.incoming_river
    }

    /// Edge a river flows out through, if any.
    #[must_use]
    pub const fn outgoing_river(&self) -> Option<HexDirection> {
        self.outgoing_river
    }

    /// Reports whether a river flows into the cell.
    #[must_use]
    pub const fn has_incoming_river(&self) -> bool {
        self.incoming_river.is_some()
    }

    /// Reports whether a river flows out of the cell.
    #[must_use]
    pub const fn has_outgoing_river(&self) -> bool {
        self.outgoing_river.is_some()
    }

    /// Reports whether any river touches the cell.
    #[must_use]
    pub const fn has_river(&self) -> bool {
        self.has_incoming_river() || self.has_outgoing_river()
    }

    /// Reports whether a river starts or ends inside the cell.
    #[must_use]
    pub const fn has_river_begin_or_end(&self) -> bool {
        self.has_incoming_river() != self.has_outgoing_river()
    }

    /// Reports whether a river crosses the provided edge.
    #[must_use]
    pub fn has_river_through_edge(&self, direction: HexDirection) -> bool {
        self.incoming_river == Some(direction) || self.outgoing_river == Some(direction)
    }

    /// Reports whether a road crosses the provided edge.
    #[must_use]
    pub const fn has_road(&self, direction: HexDirection) -> bool {
        self.roads[direction.index()]
    }

    /// Reports whether any road touches the cell.
    #[must_use]
    pub fn has_roads(&self) -> bool {
        self.roads.iter().any(|road| *road)
    }

    /// Roads packed into a bit mask, bit `d` set for a road through direction `d`.
    #[must_use]
    pub fn road_mask(&self) -> u8 {
        self.roads
            .iter()
            .enumerate()
            .filter(|(_, road)| **road)
            .fold(0, |mask, (index, _)| mask | (1 << index))
    }

    /// Unit standing on the cell, if any.
    #[must_use]
    pub const fn unit(&self) -> Option<UnitId> {
        self.unit
    }

    /// Center of the cell in world space, raised to its elevation.
    #[must_use]
    pub fn position(&self) -> Vec3 {
        let mut position = metrics::cell_center(self.coordinates.column(), self.coordinates.row());
        position.y = self.elevation as f32 * metrics::ELEVATION_STEP;
        position
    }

    /// Captures a copy of every visible attribute.
    #[must_use]
    pub fn snapshot(&self) -> CellSnapshot {
        CellSnapshot {
            coordinates: self.coordinates,
            elevation: self.elevation,
            water_level: self.water_level,
            terrain_type_index: self.terrain_type_index,
            urban_level: self.urban_level,
            farm_level: self.farm_level,
            plant_level: self.plant_level,
            special_index: self.special_index,
            walled: self.walled,
            incoming_river: self.incoming_river,
            outgoing_river: self.outgoing_river,
            road_mask: self.road_mask(),
        }
    }
}

/// Immutable copy of a cell's attributes handed to render collaborators.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CellSnapshot {
    /// Lattice coordinates of the cell.
    pub coordinates: HexCoordinates,
    /// Elevation level.
    pub elevation: i32,
    /// Water surface level.
    pub water_level: i32,
    /// Ground cover classification.
    pub terrain_type_index: u8,
    /// Urban density.
    pub urban_level: u8,
    /// Farmland density.
    pub farm_level: u8,
    /// Vegetation density.
    pub plant_level: u8,
    /// Special feature index.
    pub special_index: u8,
    /// Whether walls surround the cell.
    pub walled: bool,
    /// Edge a river flows in through.
    pub incoming_river: Option<HexDirection>,
    /// Edge a river flows out through.
    pub outgoing_river: Option<HexDirection>,
    /// Roads packed by direction index.
    pub road_mask: u8,
}
