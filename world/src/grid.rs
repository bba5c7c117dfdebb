//! Cell storage, adjacency and region change tracking.

use std::collections::BTreeSet;

use glam::Vec3;
use hexmap_core::{ChunkId, EdgeType, GridSettings, HexCoordinates, HexDirection};
use log::{info, warn};
use thiserror::Error;

use crate::{
    cell::Cell,
    search::{PathResult, Pathfinder},
    units::UnitRegistry,
};

/// Reasons a grid cannot be built with the requested dimensions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum SizeError {
    /// At least one dimension is zero.
    #[error("grid size {width}x{height} must be positive")]
    NonPositive {
        /// Requested number of cell columns.
        width: u32,
        /// Requested number of cell rows.
        height: u32,
    },
    /// The dimensions do not tile into whole render regions.
    #[error("grid size {width}x{height} is not a multiple of the {columns}x{rows} chunk size")]
    Misaligned {
        /// Requested number of cell columns.
        width: u32,
        /// Requested number of cell rows.
        height: u32,
        /// Cell columns per render region.
        columns: u32,
        /// Cell rows per render region.
        rows: u32,
    },
}

/// Authoritative hex map: every cell, its adjacency, and the scratch state
/// reused by path searches.
#[derive(Debug)]
pub struct Grid {
    settings: GridSettings,
    width: u32,
    height: u32,
    chunk_count_x: u32,
    pub(crate) cells: Vec<Cell>,
    changed_regions: BTreeSet<ChunkId>,
    pub(crate) units: UnitRegistry,
    search: Pathfinder,
}

impl Grid {
    /// Builds a grid of `width` by `height` flat cells with default settings.
    pub fn build(width: u32, height: u32) -> Result<Self, SizeError> {
        Self::build_with(GridSettings::default(), width, height)
    }

    /// Builds a grid of `width` by `height` flat cells.
    pub fn build_with(settings: GridSettings, width: u32, height: u32) -> Result<Self, SizeError> {
        validate_size(&settings, width, height)?;
        let mut grid = Self {
            settings,
            width: 0,
            height: 0,
            chunk_count_x: 0,
            cells: Vec::new(),
            changed_regions: BTreeSet::new(),
            units: UnitRegistry::new(),
            search: Pathfinder::new(),
        };
        grid.create_cells(width, height);
        Ok(grid)
    }

    /// Discards every cell and unit and builds a fresh grid of the provided
    /// size.
    ///
    /// On failure the current grid is left untouched. Path results obtained
    /// before a successful rebuild no longer describe this grid.
    pub fn rebuild(&mut self, width: u32, height: u32) -> Result<(), SizeError> {
        if let Err(error) = validate_size(&self.settings, width, height) {
            warn!("rejected grid rebuild: {error}");
            return Err(error);
        }
        self.create_cells(width, height);
        Ok(())
    }

    fn create_cells(&mut self, width: u32, height: u32) {
        let chunk = self.settings.chunk_size;
        self.width = width;
        self.height = height;
        self.chunk_count_x = width / chunk.columns();
        self.units.clear();
        self.changed_regions.clear();

        let width_usize = width as usize;
        let mut cells = Vec::with_capacity(width_usize * height as usize);
        for row in 0..height {
            for column in 0..width {
                let coordinates = HexCoordinates::from_offset(column as i32, row as i32);
                cells.push(Cell::new(coordinates, self.chunk_for(column, row)));
            }
        }
        self.cells = cells;

        for row in 0..height as usize {
            for column in 0..width_usize {
                let index = row * width_usize + column;
                self.cells[index].elevation = 0;

                if column > 0 {
                    self.link(index, HexDirection::W, index - 1);
                }
                if row == 0 {
                    continue;
                }
                if row & 1 == 0 {
                    self.link(index, HexDirection::SE, index - width_usize);
                    if column > 0 {
                        self.link(index, HexDirection::SW, index - width_usize - 1);
                    }
                } else {
                    self.link(index, HexDirection::SW, index - width_usize);
                    if column + 1 < width_usize {
                        self.link(index, HexDirection::SE, index - width_usize + 1);
                    }
                }
            }
        }

        self.search.reset(self.cells.len());
        let regions: Vec<ChunkId> = self.cells.iter().map(Cell::chunk).collect();
        self.changed_regions.extend(regions);
        info!("built {width}x{height} hex grid");
    }

    fn link(&mut self, index: usize, direction: HexDirection, neighbor: usize) {
        self.cells[index].neighbors[direction.index()] = Some(neighbor);
        self.cells[neighbor].neighbors[direction.opposite().index()] = Some(index);
    }

    fn chunk_for(&self, column: u32, row: u32) -> ChunkId {
        let chunk = self.settings.chunk_size;
        let chunk_x = column / chunk.columns();
        let chunk_z = row / chunk.rows();
        ChunkId::new(chunk_x + chunk_z * self.chunk_count_x)
    }

    /// Settings the grid was built with.
    #[must_use]
    pub const fn settings(&self) -> &GridSettings {
        &self.settings
    }

    /// Number of cell columns.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Number of cell rows.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Number of render regions the grid is divided into.
    #[must_use]
    pub fn chunk_count(&self) -> u32 {
        let chunk = self.settings.chunk_size;
        (self.width / chunk.columns()) * (self.height / chunk.rows())
    }

    /// All cells in row-major order.
    #[must_use]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Cell stored at the provided row-major index.
    #[must_use]
    pub fn cell(&self, index: usize) -> Option<&Cell> {
        self.cells.get(index)
    }

    /// Row-major index of the cell at the provided coordinates.
    #[must_use]
    pub fn index_of(&self, coordinates: HexCoordinates) -> Option<usize> {
        offset_index(self.width, self.height, coordinates)
    }

    /// Cell at the provided coordinates, or `None` outside the grid.
    #[must_use]
    pub fn cell_at(&self, coordinates: HexCoordinates) -> Option<&Cell> {
        self.index_of(coordinates).map(|index| &self.cells[index])
    }

    /// Row-major index of the cell containing a point in the map plane.
    #[must_use]
    pub fn index_at_position(&self, position: Vec3) -> Option<usize> {
        HexCoordinates::from_position(position).and_then(|coordinates| self.index_of(coordinates))
    }

    /// Cell containing a point in the map plane, or `None` outside the grid.
    #[must_use]
    pub fn cell_at_position(&self, position: Vec3) -> Option<&Cell> {
        HexCoordinates::from_position(position).and_then(|coordinates| self.cell_at(coordinates))
    }

    /// Index of the neighbor of `index` in the provided direction.
    #[must_use]
    pub fn neighbor(&self, index: usize, direction: HexDirection) -> Option<usize> {
        self.cells.get(index)?.neighbor(direction)
    }

    /// Classification of the edge between a cell and its neighbor.
    #[must_use]
    pub fn edge_type(&self, index: usize, direction: HexDirection) -> Option<EdgeType> {
        let cell = self.cells.get(index)?;
        let neighbor = &self.cells[cell.neighbor(direction)?];
        Some(EdgeType::between(cell.elevation, neighbor.elevation))
    }

    /// Absolute elevation delta between a cell and its neighbor.
    #[must_use]
    pub fn elevation_difference(&self, index: usize, direction: HexDirection) -> Option<u32> {
        let cell = self.cells.get(index)?;
        let neighbor = &self.cells[cell.neighbor(direction)?];
        Some(cell.elevation.abs_diff(neighbor.elevation))
    }

    /// Cells belonging to the provided render region.
    pub fn region_cells(&self, region: ChunkId) -> impl Iterator<Item = &Cell> {
        self.cells.iter().filter(move |cell| cell.chunk == region)
    }

    /// Returns and forgets every region changed since the previous call.
    pub fn take_changed_regions(&mut self) -> Vec<ChunkId> {
        std::mem::take(&mut self.changed_regions).into_iter().collect()
    }

    /// Searches for the cheapest route between two cells for a mover with
    /// `speed` movement points per turn.
    ///
    /// Returns `None` when either cell lies outside the grid, the speed is
    /// zero, or no route exists.
    pub fn find_path(
        &mut self,
        from: HexCoordinates,
        to: HexCoordinates,
        speed: u32,
    ) -> Option<PathResult> {
        let from_index = self.index_of(from)?;
        let to_index = self.index_of(to)?;
        let Some(speed) = i32::try_from(speed).ok().filter(|speed| *speed > 0) else {
            warn!("path search from {from} to {to} requested with speed {speed}");
            return None;
        };
        self.search
            .find_path(&self.cells, from_index, to_index, speed)
    }

    /// Accumulated movement cost from `from` to every reachable cell,
    /// indexed like [`Self::cells`].
    pub fn movement_costs_from(&mut self, from: HexCoordinates) -> Vec<Option<u32>> {
        match self.index_of(from) {
            Some(index) => self.search.movement_costs(&self.cells, index),
            None => vec![None; self.cells.len()],
        }
    }

    /// Marks the cell's region and the regions of its neighbors as changed.
    pub(crate) fn refresh(&mut self, index: usize) {
        let cell = &self.cells[index];
        let _ = self.changed_regions.insert(cell.chunk);
        for neighbor in cell.neighbors.iter().flatten() {
            let _ = self.changed_regions.insert(self.cells[*neighbor].chunk);
        }
    }

    /// Marks only the cell's own region as changed.
    pub(crate) fn refresh_self_only(&mut self, index: usize) {
        let _ = self.changed_regions.insert(self.cells[index].chunk);
    }

    pub(crate) fn mark_all_regions_changed(&mut self) {
        let regions: Vec<ChunkId> = self.cells.iter().map(Cell::chunk).collect();
        self.changed_regions.extend(regions);
    }
}

/// Checks that a grid of the provided size can be built with `settings`.
pub(crate) fn validate_size(
    settings: &GridSettings,
    width: u32,
    height: u32,
) -> Result<(), SizeError> {
    if width == 0 || height == 0 {
        return Err(SizeError::NonPositive { width, height });
    }
    let chunk = settings.chunk_size;
    if !chunk.divides(width, height) {
        return Err(SizeError::Misaligned {
            width,
            height,
            columns: chunk.columns(),
            rows: chunk.rows(),
        });
    }
    Ok(())
}

/// Row-major index of `coordinates` inside a `width` by `height` grid.
pub(crate) fn offset_index(width: u32, height: u32, coordinates: HexCoordinates) -> Option<usize> {
    let row = usize::try_from(coordinates.row()).ok()?;
    if row >= height as usize {
        return None;
    }
    let column = i64::from(coordinates.x()) + i64::from(coordinates.z().div_euclid(2));
    let column = usize::try_from(column).ok()?;
    if column >= width as usize {
        return None;
    }
    Some(column + row * width as usize)
}
