//! Versioned binary map format.
//!
//! A map is stored as a little-endian `i32` format version, the grid
//! dimensions, one fixed-size record per cell in row-major order, and the
//! units standing on the map. Every value goes through bincode's fixed-width
//! encoding, so the byte layout is stable across platforms.
//!
//! Version 0 maps predate variable grid sizes and hold exactly
//! [`LEGACY_WIDTH`] by [`LEGACY_HEIGHT`] cells. Maps older than version 2
//! carry no units.

use std::io::{Read, Write};

use hexmap_core::{GridSettings, HexCoordinates, HexDirection};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    grid::{offset_index, validate_size},
    Grid, SizeError,
};

/// Format version written by [`save`].
pub const MAP_FORMAT_VERSION: i32 = 2;

/// Columns of a version 0 map.
pub const LEGACY_WIDTH: u32 = 20;

/// Rows of a version 0 map.
pub const LEGACY_HEIGHT: u32 = 15;

const MAX_CELLS: u64 = 1 << 24;
const RIVER_FLAG: u8 = 0x80;

/// Reasons a map cannot be encoded or decoded.
#[derive(Debug, Error)]
pub enum FormatError {
    /// The stream was written by a newer format version.
    #[error("map format version {found} is newer than supported version {supported}")]
    UnsupportedVersion {
        /// Version read from the stream.
        found: i32,
        /// Newest version this build understands.
        supported: i32,
    },
    /// The stream ended early or could not be read or written.
    #[error("malformed map data: {0}")]
    Malformed(#[from] bincode::Error),
    /// The stored dimensions cannot be represented.
    #[error(transparent)]
    Size(#[from] SizeError),
    /// The stored grid or unit count exceeds what a map may hold.
    #[error("map declares {0} entries, which is more than supported")]
    TooLarge(u64),
    /// A river byte names no direction.
    #[error("invalid river encoding {0:#04x}")]
    InvalidRiver(u8),
    /// Rivers or roads on a cell are not mirrored by its neighbor.
    #[error("cell {0} has a river or road without a matching neighbor")]
    Unpaired(HexCoordinates),
    /// A river leaving the cell flows uphill.
    #[error("river leaving cell {0} flows uphill")]
    UphillRiver(HexCoordinates),
    /// A road on the cell crosses a river, a special feature, water or a cliff.
    #[error("cell {0} has a road where none may be built")]
    InvalidRoad(HexCoordinates),
    /// An elevation or water level does not fit the one-byte record.
    #[error("cell {cell} has level {level}, outside 0..=255")]
    LevelOutOfRange {
        /// Cell holding the level.
        cell: HexCoordinates,
        /// Level that cannot be stored.
        level: i32,
    },
    /// A unit is placed outside the grid, in water, or on an occupied cell.
    #[error("unit cannot stand on {0}")]
    InvalidUnitLocation(HexCoordinates),
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
struct CellRecord {
    terrain_type_index: u8,
    elevation: u8,
    water_level: u8,
    urban_level: u8,
    farm_level: u8,
    plant_level: u8,
    special_index: u8,
    walled: bool,
    incoming_river: u8,
    outgoing_river: u8,
    road_mask: u8,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
struct UnitRecord {
    x: i32,
    z: i32,
    orientation: f32,
}

/// Fully decoded and validated map, applied to a grid in one step.
#[derive(Debug)]
struct StagedMap {
    width: u32,
    height: u32,
    cells: Vec<StagedCell>,
    units: Vec<(usize, f32)>,
}

#[derive(Clone, Copy, Debug)]
struct StagedCell {
    record: CellRecord,
    incoming_river: Option<HexDirection>,
    outgoing_river: Option<HexDirection>,
}

impl Grid {
    /// Writes the grid in the current format version.
    pub fn save_to<W: Write>(&self, mut writer: W) -> Result<(), FormatError> {
        bincode::serialize_into(&mut writer, &MAP_FORMAT_VERSION)?;
        bincode::serialize_into(&mut writer, &dimension(self.width()))?;
        bincode::serialize_into(&mut writer, &dimension(self.height()))?;

        for cell in self.cells() {
            let record = CellRecord {
                terrain_type_index: cell.terrain_type_index,
                elevation: level_byte(cell.coordinates, cell.elevation)?,
                water_level: level_byte(cell.coordinates, cell.water_level)?,
                urban_level: cell.urban_level,
                farm_level: cell.farm_level,
                plant_level: cell.plant_level,
                special_index: cell.special_index,
                walled: cell.walled,
                incoming_river: encode_river(cell.incoming_river),
                outgoing_river: encode_river(cell.outgoing_river),
                road_mask: cell.road_mask(),
            };
            bincode::serialize_into(&mut writer, &record)?;
        }

        let unit_count = i32::try_from(self.units.len())
            .map_err(|_| FormatError::TooLarge(self.units.len() as u64))?;
        bincode::serialize_into(&mut writer, &unit_count)?;
        for unit in self.units.iter() {
            let coordinates = self.cells[unit.location].coordinates;
            let record = UnitRecord {
                x: coordinates.x(),
                z: coordinates.z(),
                orientation: unit.orientation,
            };
            bincode::serialize_into(&mut writer, &record)?;
        }
        Ok(())
    }

    /// Replaces the grid contents with a map read from `reader`.
    ///
    /// The whole map is decoded and validated before the grid is touched, so
    /// the grid is unchanged when an error is returned. The grid is only
    /// rebuilt when the stored dimensions differ from the current ones.
    pub fn load_from<R: Read>(&mut self, reader: R) -> Result<(), FormatError> {
        let staged = match decode(self.settings(), reader) {
            Ok(staged) => staged,
            Err(error) => {
                warn!("rejected map load: {error}");
                return Err(error);
            }
        };
        self.apply_staged(staged)
    }

    fn apply_staged(&mut self, staged: StagedMap) -> Result<(), FormatError> {
        if staged.width != self.width() || staged.height != self.height() {
            self.rebuild(staged.width, staged.height)?;
        } else {
            self.units.clear();
        }

        for (cell, staged_cell) in self.cells.iter_mut().zip(&staged.cells) {
            let record = staged_cell.record;
            cell.terrain_type_index = record.terrain_type_index;
            cell.elevation = i32::from(record.elevation);
            cell.water_level = i32::from(record.water_level);
            cell.urban_level = record.urban_level;
            cell.farm_level = record.farm_level;
            cell.plant_level = record.plant_level;
            cell.special_index = record.special_index;
            cell.walled = record.walled;
            cell.incoming_river = staged_cell.incoming_river;
            cell.outgoing_river = staged_cell.outgoing_river;
            for direction in HexDirection::ALL {
                cell.roads[direction.index()] = record.road_mask & (1 << direction.index()) != 0;
            }
            cell.unit = None;
        }

        for (location, orientation) in staged.units {
            let id = self.units.insert(location, orientation);
            self.cells[location].unit = Some(id);
        }

        self.mark_all_regions_changed();
        info!(
            "loaded {}x{} map with {} units",
            self.width(),
            self.height(),
            self.units.len()
        );
        Ok(())
    }
}

/// Encodes a grid in the current format version.
pub fn save(grid: &Grid) -> Result<Vec<u8>, FormatError> {
    let mut bytes = Vec::new();
    grid.save_to(&mut bytes)?;
    Ok(bytes)
}

/// Decodes a map into a new grid with default settings.
pub fn load(bytes: &[u8]) -> Result<Grid, FormatError> {
    load_with(GridSettings::default(), bytes)
}

/// Decodes a map into a new grid built with `settings`.
pub fn load_with(settings: GridSettings, bytes: &[u8]) -> Result<Grid, FormatError> {
    let staged = decode(&settings, bytes)?;
    let mut grid = Grid::build_with(settings, staged.width, staged.height)?;
    grid.apply_staged(staged)?;
    Ok(grid)
}

fn decode<R: Read>(settings: &GridSettings, mut reader: R) -> Result<StagedMap, FormatError> {
    let version: i32 = bincode::deserialize_from(&mut reader)?;
    if version > MAP_FORMAT_VERSION {
        return Err(FormatError::UnsupportedVersion {
            found: version,
            supported: MAP_FORMAT_VERSION,
        });
    }

    let (width, height) = if version >= 1 {
        let width: i32 = bincode::deserialize_from(&mut reader)?;
        let height: i32 = bincode::deserialize_from(&mut reader)?;
        (
            u32::try_from(width).unwrap_or(0),
            u32::try_from(height).unwrap_or(0),
        )
    } else {
        (LEGACY_WIDTH, LEGACY_HEIGHT)
    };
    validate_size(settings, width, height)?;
    let cell_count = u64::from(width) * u64::from(height);
    if cell_count > MAX_CELLS {
        return Err(FormatError::TooLarge(cell_count));
    }

    let mut cells = Vec::with_capacity(cell_count as usize);
    for _ in 0..cell_count {
        let record: CellRecord = bincode::deserialize_from(&mut reader)?;
        cells.push(StagedCell {
            record,
            incoming_river: decode_river(record.incoming_river)?,
            outgoing_river: decode_river(record.outgoing_river)?,
        });
    }
    check_cells(width, height, &cells)?;

    let mut units = Vec::new();
    if version >= 2 {
        let count: i32 = bincode::deserialize_from(&mut reader)?;
        let count = u64::try_from(count).unwrap_or(u64::MAX);
        if count > cell_count {
            return Err(FormatError::TooLarge(count));
        }
        let mut occupied = vec![false; cells.len()];
        for _ in 0..count {
            let record: UnitRecord = bincode::deserialize_from(&mut reader)?;
            let coordinates = HexCoordinates::new(record.x, record.z);
            let location = offset_index(width, height, coordinates)
                .filter(|index| !occupied[*index])
                .filter(|index| {
                    let record = cells[*index].record;
                    record.water_level <= record.elevation
                })
                .ok_or(FormatError::InvalidUnitLocation(coordinates))?;
            occupied[location] = true;
            units.push((location, record.orientation));
        }
    }

    Ok(StagedMap {
        width,
        height,
        cells,
        units,
    })
}

/// Verifies that every river and road is recorded on both cells it joins and
/// obeys the same placement rules the terrain edits enforce.
fn check_cells(width: u32, height: u32, cells: &[StagedCell]) -> Result<(), FormatError> {
    let width_usize = width as usize;
    for (index, cell) in cells.iter().enumerate() {
        let coordinates = HexCoordinates::from_offset(
            (index % width_usize) as i32,
            (index / width_usize) as i32,
        );
        let neighbor = |direction: HexDirection| {
            offset_index(width, height, coordinates.neighbor(direction)).map(|index| &cells[index])
        };
        let record = cell.record;

        if let Some(direction) = cell.outgoing_river {
            let other = neighbor(direction)
                .filter(|other| other.incoming_river == Some(direction.opposite()))
                .ok_or(FormatError::Unpaired(coordinates))?;
            let target = other.record.elevation;
            if target > record.elevation && target != record.water_level {
                return Err(FormatError::UphillRiver(coordinates));
            }
        }
        if let Some(direction) = cell.incoming_river {
            let paired = neighbor(direction)
                .map_or(false, |other| other.outgoing_river == Some(direction.opposite()));
            if !paired {
                return Err(FormatError::Unpaired(coordinates));
            }
        }

        for direction in HexDirection::ALL {
            if record.road_mask & (1 << direction.index()) == 0 {
                continue;
            }
            let opposite_bit = 1 << direction.opposite().index();
            let other = neighbor(direction)
                .filter(|other| other.record.road_mask & opposite_bit != 0)
                .ok_or(FormatError::Unpaired(coordinates))?;
            let on_river =
                cell.incoming_river == Some(direction) || cell.outgoing_river == Some(direction);
            let allowed = !on_river
                && record.special_index == 0
                && other.record.special_index == 0
                && record.water_level <= record.elevation
                && other.record.water_level <= other.record.elevation
                && record.elevation.abs_diff(other.record.elevation) <= 1;
            if !allowed {
                return Err(FormatError::InvalidRoad(coordinates));
            }
        }
    }
    Ok(())
}

fn dimension(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

fn level_byte(cell: HexCoordinates, level: i32) -> Result<u8, FormatError> {
    u8::try_from(level).map_err(|_| FormatError::LevelOutOfRange { cell, level })
}

fn encode_river(river: Option<HexDirection>) -> u8 {
    river.map_or(0, |direction| RIVER_FLAG | direction.index() as u8)
}

fn decode_river(byte: u8) -> Result<Option<HexDirection>, FormatError> {
    if byte == 0 {
        return Ok(None);
    }
    if byte & RIVER_FLAG == 0 {
        return Err(FormatError::InvalidRiver(byte));
    }
    HexDirection::from_index(usize::from(byte & !RIVER_FLAG))
        .map(Some)
        .ok_or(FormatError::InvalidRiver(byte))
}

#[cfg(test)]
mod tests {
    use hexmap_core::ChunkSize;

    use super::*;

    #[test]
    fn river_bytes_carry_flag_and_direction() {
        assert_eq!(encode_river(None), 0);
        assert_eq!(encode_river(Some(HexDirection::NE)), 0x80);
        assert_eq!(encode_river(Some(HexDirection::NW)), 0x85);
        assert_eq!(decode_river(0x83).ok(), Some(Some(HexDirection::SW)));
        assert!(matches!(decode_river(0x86), Err(FormatError::InvalidRiver(0x86))));
        assert!(matches!(decode_river(0x03), Err(FormatError::InvalidRiver(0x03))));
    }

    #[test]
    fn levels_outside_a_byte_are_refused() {
        let cell = HexCoordinates::new(1, 1);
        assert_eq!(level_byte(cell, 7).ok(), Some(7));
        assert_eq!(level_byte(cell, 255).ok(), Some(255));
        assert!(matches!(
            level_byte(cell, -4),
            Err(FormatError::LevelOutOfRange { level: -4, .. })
        ));
        assert!(matches!(
            level_byte(cell, 300),
            Err(FormatError::LevelOutOfRange { level: 300, .. })
        ));
    }

    #[test]
    fn cell_record_occupies_eleven_bytes() {
        let record = CellRecord {
            terrain_type_index: 1,
            elevation: 2,
            water_level: 3,
            urban_level: 0,
            farm_level: 0,
            plant_level: 0,
            special_index: 0,
            walled: true,
            incoming_river: 0,
            outgoing_river: 0x81,
            road_mask: 0b10_0001,
        };
        let bytes = bincode::serialize(&record).expect("record encodes");
        assert_eq!(bytes, vec![1, 2, 3, 0, 0, 0, 0, 1, 0, 0x81, 0b10_0001]);
    }

    #[test]
    fn header_is_little_endian_version_and_size() {
        let grid = Grid::build_with(GridSettings::with_chunk_size(ChunkSize::new(1, 1)), 2, 1)
            .expect("grid builds");
        let bytes = save(&grid).expect("grid saves");
        assert_eq!(&bytes[..12], &[2, 0, 0, 0, 2, 0, 0, 0, 1, 0, 0, 0]);
        assert_eq!(bytes.len(), 12 + 2 * 11 + 4);
    }

    /// Two-cell map, one row, with the provided records.
    fn two_cell_map(west: [u8; 11], east: [u8; 11]) -> Vec<u8> {
        let mut bytes = Vec::new();
        for value in [MAP_FORMAT_VERSION, 2, 1] {
            bytes.extend_from_slice(&value.to_le_bytes());
        }
        bytes.extend_from_slice(&west);
        bytes.extend_from_slice(&east);
        bytes.extend_from_slice(&0_i32.to_le_bytes());
        bytes
    }

    fn load_two_cells(west: [u8; 11], east: [u8; 11]) -> Result<Grid, FormatError> {
        let settings = GridSettings::with_chunk_size(ChunkSize::new(1, 1));
        load_with(settings, &two_cell_map(west, east))
    }

    const ROAD_EAST: u8 = 1 << 1;
    const ROAD_WEST: u8 = 1 << 4;

    #[test]
    fn road_across_cliff_is_rejected() {
        let mut west = [0_u8; 11];
        let mut east = [0_u8; 11];
        west[10] = ROAD_EAST;
        east[1] = 5;
        east[10] = ROAD_WEST;
        assert!(matches!(
            load_two_cells(west, east),
            Err(FormatError::InvalidRoad(_))
        ));

        east[1] = 1;
        let grid = load_two_cells(west, east).expect("slope road loads");
        assert!(grid.cell(0).map_or(false, |cell| cell.has_road(HexDirection::E)));
    }

    #[test]
    fn road_touching_special_or_water_is_rejected() {
        let mut west = [0_u8; 11];
        let mut east = [0_u8; 11];
        west[10] = ROAD_EAST;
        east[10] = ROAD_WEST;

        east[6] = 1;
        assert!(matches!(
            load_two_cells(west, east),
            Err(FormatError::InvalidRoad(_))
        ));

        east[6] = 0;
        west[2] = 1;
        assert!(matches!(
            load_two_cells(west, east),
            Err(FormatError::InvalidRoad(_))
        ));
    }

    #[test]
    fn road_sharing_a_river_edge_is_rejected() {
        let mut west = [0_u8; 11];
        let mut east = [0_u8; 11];
        west[9] = 0x80 | HexDirection::E.index() as u8;
        east[8] = 0x80 | HexDirection::W.index() as u8;
        west[10] = ROAD_EAST;
        east[10] = ROAD_WEST;
        assert!(matches!(
            load_two_cells(west, east),
            Err(FormatError::InvalidRoad(_))
        ));
    }

    #[test]
    fn uphill_river_is_rejected_unless_it_reaches_the_water_surface() {
        let mut west = [0_u8; 11];
        let mut east = [0_u8; 11];
        west[9] = 0x80 | HexDirection::E.index() as u8;
        east[8] = 0x80 | HexDirection::W.index() as u8;
        east[1] = 2;
        assert!(matches!(
            load_two_cells(west, east),
            Err(FormatError::UphillRiver(_))
        ));

        west[2] = 2;
        let grid = load_two_cells(west, east).expect("river into its own lake loads");
        assert_eq!(
            grid.cell(0).and_then(|cell| cell.outgoing_river()),
            Some(HexDirection::E)
        );
    }

    #[test]
    fn unpaired_river_is_rejected() {
        let mut bytes = Vec::new();
        for value in [MAP_FORMAT_VERSION, 2, 1] {
            bytes.extend_from_slice(&value.to_le_bytes());
        }
        let mut record = [0_u8; 11];
        record[9] = 0x81;
        bytes.extend_from_slice(&record);
        bytes.extend_from_slice(&[0; 11]);
        bytes.extend_from_slice(&0_i32.to_le_bytes());

        let settings = GridSettings::with_chunk_size(ChunkSize::new(1, 1));
        assert!(matches!(
            load_with(settings, &bytes),
            Err(FormatError::Unpaired(_))
        ));
    }
}
