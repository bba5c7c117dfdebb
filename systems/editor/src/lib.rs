#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure editor system that turns brush settings and pointer samples into
//! terrain edit commands.

use hexmap_core::{Command, Event, HexCoordinates, HexDirection};
use serde::{Deserialize, Serialize};

/// Three-way switch for brush features that can be painted, erased, or left
/// alone.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptionalToggle {
    /// Leave the feature untouched.
    #[default]
    Ignore,
    /// Paint the feature.
    Yes,
    /// Erase the feature.
    No,
}

/// Attributes written to every cell under the brush.
///
/// `None` leaves the corresponding attribute untouched.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrushSettings {
    /// Radius of the hexagonal brush; zero edits a single cell.
    pub brush_size: u8,
    /// Ground cover classification to paint.
    pub terrain_type_index: Option<u8>,
    /// Elevation to paint.
    pub elevation: Option<i32>,
    /// Water level to paint.
    pub water_level: Option<i32>,
    /// Urban density to paint.
    pub urban_level: Option<u8>,
    /// Farmland density to paint.
    pub farm_level: Option<u8>,
    /// Vegetation density to paint.
    pub plant_level: Option<u8>,
    /// Special feature index to paint.
    pub special_index: Option<u8>,
    /// Rivers are drawn along drags or erased under the brush.
    pub river: OptionalToggle,
    /// Roads are drawn along drags or erased under the brush.
    pub road: OptionalToggle,
    /// Walls are raised or removed under the brush.
    pub walled: OptionalToggle,
}

/// Editor system that converts pointer samples into edit commands.
#[derive(Clone, Debug, Default)]
pub struct Editor {
    settings: BrushSettings,
    previous: Option<HexCoordinates>,
    drag: Option<HexDirection>,
}

impl Editor {
    /// Creates an editor painting with the provided brush.
    #[must_use]
    pub const fn new(settings: BrushSettings) -> Self {
        Self {
            settings,
            previous: None,
            drag: None,
        }
    }

    /// Brush currently in use.
    #[must_use]
    pub const fn settings(&self) -> &BrushSettings {
        &self.settings
    }

    /// Replaces the brush. An ongoing drag continues with the new brush.
    pub fn set_settings(&mut self, settings: BrushSettings) {
        self.settings = settings;
    }

    /// Direction of the drag detected by the latest sample, if any.
    #[must_use]
    pub const fn drag_direction(&self) -> Option<HexDirection> {
        self.drag
    }

    /// Consumes world events and a pointer sample to emit edit commands.
    ///
    /// `sample` is the cell under the pointer while the edit button is held,
    /// or `None` once it is released or leaves the map. Moving between two
    /// adjacent cells on consecutive samples is a drag, which draws rivers
    /// and roads from the previous cell toward the current one. The `contains`
    /// closure should mirror the grid's cell lookup so the brush skips cells
    /// outside the map.
    pub fn handle<F>(
        &mut self,
        events: &[Event],
        sample: Option<HexCoordinates>,
        mut contains: F,
        out: &mut Vec<Command>,
    ) where
        F: FnMut(HexCoordinates) -> bool,
    {
        if events
            .iter()
            .any(|event| matches!(event, Event::GridConfigured { .. }))
        {
            self.previous = None;
        }

        let Some(current) = sample else {
            self.previous = None;
            self.drag = None;
            return;
        };

        self.drag = match self.previous {
            Some(previous) if previous != current => previous.direction_to(current),
            _ => None,
        };

        for cell in brush_cells(current, self.settings.brush_size) {
            if contains(cell) {
                self.edit_cell(cell, &mut contains, out);
            }
        }
        self.previous = Some(current);
    }

    fn edit_cell<F>(&self, cell: HexCoordinates, contains: &mut F, out: &mut Vec<Command>)
    where
        F: FnMut(HexCoordinates) -> bool,
    {
        let brush = &self.settings;
        if let Some(index) = brush.terrain_type_index {
            out.push(Command::SetTerrainType { cell, index });
        }
        if let Some(elevation) = brush.elevation {
            out.push(Command::SetElevation { cell, elevation });
        }
        if let Some(level) = brush.water_level {
            out.push(Command::SetWaterLevel { cell, level });
        }
        if let Some(index) = brush.special_index {
            out.push(Command::SetSpecialIndex { cell, index });
        }
        if let Some(level) = brush.urban_level {
            out.push(Command::SetUrbanLevel { cell, level });
        }
        if let Some(level) = brush.farm_level {
            out.push(Command::SetFarmLevel { cell, level });
        }
        if let Some(level) = brush.plant_level {
            out.push(Command::SetPlantLevel { cell, level });
        }

        if brush.river == OptionalToggle::No {
            out.push(Command::RemoveRiver { cell });
        }
        if brush.road == OptionalToggle::No {
            out.push(Command::RemoveRoads { cell });
        }
        if brush.walled != OptionalToggle::Ignore {
            out.push(Command::SetWalled {
                cell,
                walled: brush.walled == OptionalToggle::Yes,
            });
        }

        let Some(direction) = self.drag else {
            return;
        };
        let other = cell.neighbor(direction.opposite());
        if !contains(other) {
            return;
        }
        if brush.river == OptionalToggle::Yes {
            out.push(Command::SetOutgoingRiver {
                cell: other,
                direction,
            });
        }
        if brush.road == OptionalToggle::Yes {
            out.push(Command::AddRoad {
                cell: other,
                direction,
            });
        }
    }
}

/// Cells covered by a hexagonal brush of radius `size` centered on `center`,
/// ordered from the lowest row to the highest.
#[must_use]
pub fn brush_cells(center: HexCoordinates, size: u8) -> Vec<HexCoordinates> {
    let size = i32::from(size);
    let (center_x, center_z) = (center.x(), center.z());
    let mut cells = Vec::new();

    for (r, z) in (center_z - size..=center_z).enumerate() {
        let r = r as i32;
        for x in center_x - r..=center_x + size {
            cells.push(HexCoordinates::new(x, z));
        }
    }
    for (r, z) in (center_z + 1..=center_z + size).rev().enumerate() {
        let r = r as i32;
        for x in center_x - size..=center_x + r {
            cells.push(HexCoordinates::new(x, z));
        }
    }
    cells
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn brush_of_size_zero_covers_center_only() {
        let center = HexCoordinates::from_offset(3, 3);
        assert_eq!(brush_cells(center, 0), vec![center]);
    }

    #[test]
    fn brush_covers_hexagon_of_cells() {
        let center = HexCoordinates::from_offset(4, 4);
        for size in 0..4_u8 {
            let cells = brush_cells(center, size);
            let radius = u32::from(size);
            assert_eq!(cells.len() as u32, 3 * radius * (radius + 1) + 1);
            assert!(cells
                .iter()
                .all(|cell| cell.distance_to(center) <= radius));
        }
    }

    #[test]
    fn toggles_default_to_ignore() {
        let settings = BrushSettings::default();
        assert_eq!(settings.river, OptionalToggle::Ignore);
        assert_eq!(settings.road, OptionalToggle::Ignore);
        assert_eq!(settings.walled, OptionalToggle::Ignore);
        assert_eq!(settings.elevation, None);
    }
}
