//! Units standing on grid cells.

use std::collections::BTreeMap;

use hexmap_core::{HexCoordinates, UnitId};
use log::debug;

use crate::Grid;

/// Unit stored inside the grid.
#[derive(Clone, Copy, Debug)]
pub(crate) struct UnitState {
    pub(crate) id: UnitId,
    /// Row-major index of the occupied cell.
    pub(crate) location: usize,
    pub(crate) orientation: f32,
}

/// Registry that stores units and manages identifier allocation.
#[derive(Debug)]
pub(crate) struct UnitRegistry {
    entries: BTreeMap<UnitId, UnitState>,
    next_unit_id: UnitId,
}

impl UnitRegistry {
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_unit_id: UnitId::new(0),
        }
    }

    /// Forgets every unit and resets identifier allocation.
    pub(crate) fn clear(&mut self) {
        self.entries.clear();
        self.next_unit_id = UnitId::new(0);
    }

    pub(crate) fn insert(&mut self, location: usize, orientation: f32) -> UnitId {
        let id = self.next_unit_id;
        self.next_unit_id = UnitId::new(id.get().wrapping_add(1));
        let _ = self.entries.insert(
            id,
            UnitState {
                id,
                location,
                orientation,
            },
        );
        id
    }

    pub(crate) fn remove(&mut self, id: UnitId) -> Option<UnitState> {
        self.entries.remove(&id)
    }

    pub(crate) fn get(&self, id: UnitId) -> Option<&UnitState> {
        self.entries.get(&id)
    }

    fn get_mut(&mut self, id: UnitId) -> Option<&mut UnitState> {
        self.entries.get_mut(&id)
    }

    /// Units in identifier order.
    pub(crate) fn iter(&self) -> impl Iterator<Item = &UnitState> {
        self.entries.values()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Read-only view of a unit.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UnitSnapshot {
    /// Identifier allocated when the unit was spawned.
    pub id: UnitId,
    /// Cell the unit occupies.
    pub cell: HexCoordinates,
    /// Facing in degrees around the vertical axis.
    pub orientation: f32,
}

impl Grid {
    /// Reports whether a unit may stand on the cell: it must exist, be dry,
    /// and be unoccupied.
    #[must_use]
    pub fn is_valid_unit_destination(&self, index: usize) -> bool {
        self.cells
            .get(index)
            .map_or(false, |cell| !cell.is_underwater() && cell.unit.is_none())
    }

    /// Places a new unit on the cell at `coordinates`.
    ///
    /// Returns `None` when the cell cannot hold a unit.
    pub fn spawn_unit(&mut self, coordinates: HexCoordinates, orientation: f32) -> Option<UnitId> {
        let index = self.index_of(coordinates)?;
        if !self.is_valid_unit_destination(index) {
            debug!("rejected unit placement on {coordinates}");
            return None;
        }
        let id = self.units.insert(index, orientation);
        self.cells[index].unit = Some(id);
        self.refresh_self_only(index);
        Some(id)
    }

    /// Moves a unit onto the cell at `coordinates`.
    ///
    /// Returns `false`, leaving the unit in place, when the unit is unknown
    /// or the destination cannot hold it.
    pub fn relocate_unit(&mut self, id: UnitId, coordinates: HexCoordinates) -> bool {
        let Some(destination) = self.index_of(coordinates) else {
            return false;
        };
        let Some(origin) = self.units.get(id).map(|unit| unit.location) else {
            return false;
        };
        if origin == destination || !self.is_valid_unit_destination(destination) {
            return origin == destination;
        }

        self.cells[origin].unit = None;
        self.cells[destination].unit = Some(id);
        if let Some(unit) = self.units.get_mut(id) {
            unit.location = destination;
        }
        self.refresh_self_only(origin);
        self.refresh_self_only(destination);
        true
    }

    /// Removes a unit from the map. Returns `false` for unknown units.
    pub fn remove_unit(&mut self, id: UnitId) -> bool {
        let Some(unit) = self.units.remove(id) else {
            return false;
        };
        self.cells[unit.location].unit = None;
        self.refresh_self_only(unit.location);
        true
    }

    /// Current state of a unit.
    #[must_use]
    pub fn unit(&self, id: UnitId) -> Option<UnitSnapshot> {
        self.units.get(id).map(|unit| self.unit_snapshot(unit))
    }

    /// Every unit on the map in identifier order.
    #[must_use]
    pub fn units(&self) -> Vec<UnitSnapshot> {
        self.units
            .iter()
            .map(|unit| self.unit_snapshot(unit))
            .collect()
    }

    fn unit_snapshot(&self, unit: &UnitState) -> UnitSnapshot {
        UnitSnapshot {
            id: unit.id,
            cell: self.cells[unit.location].coordinates,
            orientation: unit.orientation,
        }
    }
}
