//! Terrain edits that keep rivers, roads and special features consistent
//! across neighboring cells.
//!
//! Every edit addresses a cell by row-major index. Edits naming a missing
//! cell, or failing their guard, leave the grid untouched.

use hexmap_core::HexDirection;

use crate::{Grid, MAX_LEVEL};

impl Grid {
    /// Changes the elevation of a cell, clamped to `0..=MAX_LEVEL`.
    ///
    /// Rivers whose flow becomes uphill are removed, as are roads that would
    /// climb more than one level or that now lie underwater.
    pub fn set_elevation(&mut self, index: usize, elevation: i32) {
        let Some(cell) = self.cells.get_mut(index) else {
            return;
        };
        let elevation = elevation.clamp(0, MAX_LEVEL);
        if cell.elevation == elevation {
            return;
        }
        cell.elevation = elevation;

        self.validate_rivers(index);
        let underwater = self.cells[index].is_underwater();
        for direction in HexDirection::ALL {
            if !self.cells[index].has_road(direction) {
                continue;
            }
            let too_steep = self
                .elevation_difference(index, direction)
                .map_or(false, |difference| difference > 1);
            if too_steep || underwater {
                self.set_road(index, direction, false);
            }
        }
        self.refresh(index);
    }

    /// Changes the water level of a cell, clamped to `0..=MAX_LEVEL`.
    ///
    /// Rivers are revalidated and every road on the cell is removed.
    pub fn set_water_level(&mut self, index: usize, level: i32) {
        let Some(cell) = self.cells.get_mut(index) else {
            return;
        };
        let level = level.clamp(0, MAX_LEVEL);
        if cell.water_level == level {
            return;
        }
        cell.water_level = level;

        self.validate_rivers(index);
        self.remove_roads(index);
        self.refresh(index);
    }

    /// Changes the ground cover classification of a cell.
    pub fn set_terrain_type_index(&mut self, index: usize, terrain_type_index: u8) {
        let Some(cell) = self.cells.get_mut(index) else {
            return;
        };
        if cell.terrain_type_index == terrain_type_index {
            return;
        }
        cell.terrain_type_index = terrain_type_index;
        self.refresh(index);
    }

    /// Changes the urban density of a cell.
    pub fn set_urban_level(&mut self, index: usize, level: u8) {
        let Some(cell) = self.cells.get_mut(index) else {
            return;
        };
        if cell.urban_level != level {
            cell.urban_level = level;
            self.refresh_self_only(index);
        }
    }

    /// Changes the farmland density of a cell.
    pub fn set_farm_level(&mut self, index: usize, level: u8) {
        let Some(cell) = self.cells.get_mut(index) else {
            return;
        };
        if cell.farm_level != level {
            cell.farm_level = level;
            self.refresh_self_only(index);
        }
    }

    /// Changes the vegetation density of a cell.
    pub fn set_plant_level(&mut self, index: usize, level: u8) {
        let Some(cell) = self.cells.get_mut(index) else {
            return;
        };
        if cell.plant_level != level {
            cell.plant_level = level;
            self.refresh_self_only(index);
        }
    }

    /// Raises or removes the walls around a cell.
    pub fn set_walled(&mut self, index: usize, walled: bool) {
        let Some(cell) = self.cells.get_mut(index) else {
            return;
        };
        if cell.walled != walled {
            cell.walled = walled;
            self.refresh(index);
        }
    }

    /// Places a special feature on a cell, clearing its roads.
    ///
    /// Cells touched by a river cannot host special features.
    pub fn set_special_index(&mut self, index: usize, special_index: u8) {
        let Some(cell) = self.cells.get_mut(index) else {
            return;
        };
        if cell.special_index == special_index || cell.has_river() {
            return;
        }
        cell.special_index = special_index;
        self.remove_roads(index);
        self.refresh_self_only(index);
    }

    /// Reports whether a river may flow from the cell into its neighbor in
    /// the provided direction: downhill, level, or into the cell's own water.
    #[must_use]
    pub fn is_valid_river_destination(&self, index: usize, direction: HexDirection) -> bool {
        let Some(cell) = self.cells.get(index) else {
            return false;
        };
        let Some(neighbor) = cell.neighbor(direction).map(|neighbor| &self.cells[neighbor]) else {
            return false;
        };
        neighbor.elevation <= cell.elevation || neighbor.elevation == cell.water_level
    }

    /// Starts a river flowing out of a cell across the provided edge.
    ///
    /// Any previous outgoing river of the cell and any previous incoming
    /// river of the neighbor are removed first. Both cells lose their special
    /// feature and the road on the shared edge.
    pub fn set_outgoing_river(&mut self, index: usize, direction: HexDirection) {
        let Some(cell) = self.cells.get(index) else {
            return;
        };
        if cell.outgoing_river == Some(direction) {
            return;
        }
        let Some(neighbor) = cell.neighbor(direction) else {
            return;
        };
        if !self.is_valid_river_destination(index, direction) {
            return;
        }
        self.link_river(index, neighbor, direction);
    }

    fn link_river(&mut self, source: usize, target: usize, direction: HexDirection) {
        self.remove_outgoing_river(source);
        if self.cells[source].incoming_river == Some(direction) {
            self.remove_incoming_river(source);
        }
        self.remove_incoming_river(target);

        let source_cell = &mut self.cells[source];
        source_cell.outgoing_river = Some(direction);
        source_cell.special_index = 0;

        let target_cell = &mut self.cells[target];
        target_cell.incoming_river = Some(direction.opposite());
        target_cell.special_index = 0;

        self.set_road(source, direction, false);
        self.refresh_self_only(source);
        self.refresh_self_only(target);
    }

    /// Removes the river flowing out of a cell, together with its other end.
    pub fn remove_outgoing_river(&mut self, index: usize) {
        let Some(direction) = self.cells.get(index).and_then(|cell| cell.outgoing_river) else {
            return;
        };
        self.cells[index].outgoing_river = None;
        self.refresh_self_only(index);

        if let Some(neighbor) = self.cells[index].neighbor(direction) {
            self.cells[neighbor].incoming_river = None;
            self.refresh_self_only(neighbor);
        }
    }

    /// Removes the river flowing into a cell, together with its other end.
    pub fn remove_incoming_river(&mut self, index: usize) {
        let Some(direction) = self.cells.get(index).and_then(|cell| cell.incoming_river) else {
            return;
        };
        self.cells[index].incoming_river = None;
        self.refresh_self_only(index);

        if let Some(neighbor) = self.cells[index].neighbor(direction) {
            self.cells[neighbor].outgoing_river = None;
            self.refresh_self_only(neighbor);
        }
    }

    /// Removes both rivers of a cell.
    pub fn remove_river(&mut self, index: usize) {
        self.remove_outgoing_river(index);
        self.remove_incoming_river(index);
    }

    fn validate_rivers(&mut self, index: usize) {
        if let Some(direction) = self.cells[index].outgoing_river {
            if !self.is_valid_river_destination(index, direction) {
                self.remove_outgoing_river(index);
            }
        }
        if let Some(direction) = self.cells[index].incoming_river {
            let source_valid = self.cells[index]
                .neighbor(direction)
                .map_or(false, |source| {
                    self.is_valid_river_destination(source, direction.opposite())
                });
            if !source_valid {
                self.remove_incoming_river(index);
            }
        }
    }

    /// Reports whether a road may cross the provided edge of a cell.
    ///
    /// Roads cannot share an edge with a river, touch a special feature or
    /// water, or climb more than one elevation level.
    #[must_use]
    pub fn can_add_road(&self, index: usize, direction: HexDirection) -> bool {
        let Some(cell) = self.cells.get(index) else {
            return false;
        };
        let Some(neighbor) = cell.neighbor(direction).map(|neighbor| &self.cells[neighbor]) else {
            return false;
        };
        !cell.has_river_through_edge(direction)
            && !cell.is_special()
            && !neighbor.is_special()
            && !cell.is_underwater()
            && !neighbor.is_underwater()
            && cell.elevation.abs_diff(neighbor.elevation) <= 1
    }

    /// Lays a road across the provided edge of a cell and its neighbor.
    pub fn add_road(&mut self, index: usize, direction: HexDirection) {
        let already_present = self
            .cells
            .get(index)
            .map_or(true, |cell| cell.has_road(direction));
        if !already_present && self.can_add_road(index, direction) {
            self.set_road(index, direction, true);
        }
    }

    /// Removes every road touching a cell.
    pub fn remove_roads(&mut self, index: usize) {
        let Some(cell) = self.cells.get(index) else {
            return;
        };
        let roads = cell.roads;
        for direction in HexDirection::ALL {
            if roads[direction.index()] {
                self.set_road(index, direction, false);
            }
        }
    }

    fn set_road(&mut self, index: usize, direction: HexDirection, present: bool) {
        let Some(neighbor) = self.cells[index].neighbor(direction) else {
            return;
        };
        self.cells[index].roads[direction.index()] = present;
        self.cells[neighbor].roads[direction.opposite().index()] = present;
        self.refresh_self_only(index);
        self.refresh_self_only(neighbor);
    }
}
