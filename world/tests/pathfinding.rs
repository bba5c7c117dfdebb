use hexmap_core::{ChunkSize, GridSettings, HexCoordinates, HexDirection};
use hexmap_world::Grid;

fn offset(column: i32, row: i32) -> HexCoordinates {
    HexCoordinates::from_offset(column, row)
}

fn index(grid: &Grid, column: i32, row: i32) -> usize {
    grid.index_of(offset(column, row)).expect("cell exists")
}

fn column_indices(grid: &Grid, column: i32) -> Vec<usize> {
    (0..grid.height() as i32)
        .map(|row| index(grid, column, row))
        .collect()
}

#[test]
fn flat_path_is_quantized_to_turn_boundaries() {
    let mut grid = Grid::build(5, 5).expect("grid builds");
    let path = grid
        .find_path(offset(0, 0), offset(0, 3), 2)
        .expect("path exists");

    assert_eq!(path.len(), 4);
    assert_eq!(path.total_cost(), 29);
    let distances: Vec<u32> = path.steps().iter().map(|step| step.distance).collect();
    assert_eq!(distances, vec![0, 9, 19, 29]);
    let turns: Vec<u32> = path.steps().iter().map(|step| step.turn).collect();
    assert_eq!(turns, vec![0, 4, 9, 14]);
    assert_eq!(path.turns(), 14);
}

#[test]
fn small_grid_path_has_monotonic_turns() {
    let mut grid = Grid::build_with(GridSettings::with_chunk_size(ChunkSize::new(2, 2)), 4, 4)
        .expect("grid builds");
    let path = grid
        .find_path(offset(0, 0), offset(3, 0), 3)
        .expect("path exists");

    assert_eq!(path.len(), 4);
    let cells: Vec<HexCoordinates> = path.cells().collect();
    assert_eq!(cells.first(), Some(&offset(0, 0)));
    assert_eq!(cells.last(), Some(&offset(3, 0)));
    for pair in path.steps().windows(2) {
        assert!(pair[0].turn <= pair[1].turn, "turns decreased: {pair:?}");
        assert_eq!(pair[0].coordinates.distance_to(pair[1].coordinates), 1);
    }
    let turns: Vec<u32> = path.steps().iter().map(|step| step.turn).collect();
    assert_eq!(turns, vec![0, 2, 5, 8]);
}

#[test]
fn path_to_self_is_a_single_step() {
    let mut grid = Grid::build(5, 5).expect("grid builds");
    let path = grid
        .find_path(offset(2, 2), offset(2, 2), 4)
        .expect("path exists");
    assert_eq!(path.len(), 1);
    assert_eq!(path.total_cost(), 0);
    assert_eq!(path.turns(), 0);
}

#[test]
fn zero_speed_or_missing_cells_find_nothing() {
    let mut grid = Grid::build(5, 5).expect("grid builds");
    assert!(grid.find_path(offset(0, 0), offset(4, 4), 0).is_none());
    assert!(grid.find_path(offset(0, 0), offset(5, 0), 3).is_none());
    assert!(grid.find_path(offset(-1, 0), offset(4, 4), 3).is_none());
}

#[test]
fn roads_are_cheaper_than_open_ground() {
    let mut grid = Grid::build(5, 5).expect("grid builds");
    for column in 0..4 {
        let cell = index(&grid, column, 0);
        grid.add_road(cell, HexDirection::E);
    }
    let path = grid
        .find_path(offset(0, 0), offset(4, 0), 10)
        .expect("path exists");

    assert_eq!(path.total_cost(), 4);
    assert_eq!(path.turns(), 0);
    let cells: Vec<HexCoordinates> = path.cells().collect();
    assert_eq!(cells, (0..5).map(|column| offset(column, 0)).collect::<Vec<_>>());
}

#[test]
fn slopes_cost_more_and_cliffs_block() {
    let mut grid = Grid::build(5, 5).expect("grid builds");
    for cell in column_indices(&grid, 2) {
        grid.set_elevation(cell, 1);
    }
    let sloped = grid
        .find_path(offset(0, 0), offset(4, 0), 100)
        .expect("slopes are walkable");
    assert_eq!(sloped.total_cost(), 5 + 10 + 10 + 5);

    for cell in column_indices(&grid, 2) {
        grid.set_elevation(cell, 2);
    }
    assert!(grid.find_path(offset(0, 0), offset(4, 0), 100).is_none());
}

#[test]
fn cover_levels_add_to_entry_cost() {
    let mut grid = Grid::build(5, 5).expect("grid builds");
    let target = index(&grid, 1, 0);
    grid.set_urban_level(target, 1);
    grid.set_farm_level(target, 2);
    grid.set_plant_level(target, 3);

    let path = grid
        .find_path(offset(0, 0), offset(1, 0), 100)
        .expect("path exists");
    assert_eq!(path.total_cost(), 5 + 6);
}

#[test]
fn water_blocks_movement() {
    let mut grid = Grid::build(5, 5).expect("grid builds");
    for cell in column_indices(&grid, 2) {
        grid.set_water_level(cell, 1);
    }
    assert!(grid.find_path(offset(0, 0), offset(4, 0), 5).is_none());
    assert!(grid.find_path(offset(0, 0), offset(2, 0), 5).is_none());
}

#[test]
fn walls_block_unless_a_road_crosses() {
    let mut grid = Grid::build(5, 5).expect("grid builds");
    for cell in column_indices(&grid, 2) {
        grid.set_walled(cell, true);
    }
    assert!(grid.find_path(offset(0, 0), offset(4, 0), 5).is_none());

    let gate = index(&grid, 2, 0);
    grid.add_road(index(&grid, 1, 0), HexDirection::E);
    grid.add_road(gate, HexDirection::E);
    let path = grid
        .find_path(offset(0, 0), offset(4, 0), 5)
        .expect("road crosses the wall");
    assert!(path.cells().any(|cell| cell == offset(2, 0)));
}

#[test]
fn units_block_their_cells() {
    let mut grid = Grid::build(5, 5).expect("grid builds");
    let mut units = Vec::new();
    for row in 0..5 {
        units.push(grid.spawn_unit(offset(2, row), 0.0).expect("unit spawns"));
    }
    assert!(grid.find_path(offset(0, 0), offset(4, 0), 5).is_none());

    assert!(grid.remove_unit(units[4]));
    let path = grid
        .find_path(offset(0, 0), offset(4, 0), 5)
        .expect("gap opened");
    assert!(path.cells().any(|cell| cell == offset(2, 4)));
}

#[test]
fn repeated_searches_reuse_scratch_state() {
    let mut grid = Grid::build(5, 5).expect("grid builds");
    let first = grid
        .find_path(offset(0, 0), offset(4, 4), 3)
        .expect("path exists");
    for _ in 0..50 {
        let again = grid
            .find_path(offset(0, 0), offset(4, 4), 3)
            .expect("path exists");
        assert_eq!(again.total_cost(), first.total_cost());
    }

    let reverse = grid
        .find_path(offset(4, 4), offset(0, 0), 3)
        .expect("path exists");
    assert_eq!(reverse.len(), first.len());
}

#[test]
fn search_after_rebuild_uses_new_cells() {
    let mut grid = Grid::build(10, 10).expect("grid builds");
    assert!(grid.find_path(offset(0, 0), offset(9, 9), 4).is_some());

    grid.rebuild(5, 5).expect("rebuild succeeds");
    assert!(grid.find_path(offset(0, 0), offset(9, 9), 4).is_none());
    assert!(grid.find_path(offset(0, 0), offset(4, 4), 4).is_some());
}

#[test]
fn movement_costs_label_reachable_cells() {
    let mut grid = Grid::build(5, 5).expect("grid builds");
    let flooded = index(&grid, 4, 4);
    grid.set_water_level(flooded, 1);

    let costs = grid.movement_costs_from(offset(2, 2));
    assert_eq!(costs.len(), 25);
    assert_eq!(costs[index(&grid, 2, 2)], Some(0));
    assert_eq!(costs[index(&grid, 3, 2)], Some(5));
    assert_eq!(costs[index(&grid, 0, 2)], Some(10));
    assert_eq!(costs[flooded], None);

    let outside = grid.movement_costs_from(offset(9, 9));
    assert!(outside.iter().all(Option::is_none));
}
