//! Property tests checking that the cross-cell terrain invariants survive
//! arbitrary sequences of edits.

use hexmap_core::{ChunkSize, Command, GridSettings, HexCoordinates, HexDirection};
use hexmap_world::{self as world, Grid};
use proptest::prelude::*;

const SIDE: u32 = 6;

fn cell() -> impl Strategy<Value = HexCoordinates> {
    (0..SIDE as i32, 0..SIDE as i32)
        .prop_map(|(column, row)| HexCoordinates::from_offset(column, row))
}

fn direction() -> impl Strategy<Value = HexDirection> {
    (0..6_usize).prop_map(|index| HexDirection::ALL[index])
}

/// Mostly small levels so rivers and roads survive, with occasional values
/// outside what a cell can store.
fn level() -> impl Strategy<Value = i32> {
    prop_oneof![
        4 => 0..5_i32,
        1 => -20..300_i32,
        1 => prop_oneof![Just(i32::MIN), Just(i32::MAX)],
    ]
}

fn command() -> impl Strategy<Value = Command> {
    prop_oneof![
        3 => (cell(), level()).prop_map(|(cell, elevation)| Command::SetElevation { cell, elevation }),
        2 => (cell(), level()).prop_map(|(cell, level)| Command::SetWaterLevel { cell, level }),
        4 => (cell(), direction())
            .prop_map(|(cell, direction)| Command::SetOutgoingRiver { cell, direction }),
        1 => cell().prop_map(|cell| Command::RemoveRiver { cell }),
        4 => (cell(), direction()).prop_map(|(cell, direction)| Command::AddRoad { cell, direction }),
        1 => cell().prop_map(|cell| Command::RemoveRoads { cell }),
        1 => (cell(), 0..3_u8).prop_map(|(cell, index)| Command::SetSpecialIndex { cell, index }),
        1 => (cell(), any::<bool>()).prop_map(|(cell, walled)| Command::SetWalled { cell, walled }),
        1 => (cell(), 0..4_u8).prop_map(|(cell, level)| Command::SetUrbanLevel { cell, level }),
    ]
}

fn new_grid() -> Grid {
    Grid::build_with(GridSettings::with_chunk_size(ChunkSize::new(2, 2)), SIDE, SIDE)
        .expect("grid builds")
}

fn check_invariants(grid: &Grid) -> Result<(), TestCaseError> {
    for (index, cell) in grid.cells().iter().enumerate() {
        for direction in HexDirection::ALL {
            let neighbor = grid.neighbor(index, direction);
            if let Some(neighbor) = neighbor {
                prop_assert_eq!(
                    grid.neighbor(neighbor, direction.opposite()),
                    Some(index),
                    "adjacency of {} toward {:?} is not mirrored",
                    cell.coordinates(),
                    direction
                );
            }

            let other = neighbor.and_then(|neighbor| grid.cell(neighbor));
            if cell.outgoing_river() == Some(direction) {
                prop_assert_eq!(
                    other.and_then(|other| other.incoming_river()),
                    Some(direction.opposite()),
                    "outgoing river of {} is unpaired",
                    cell.coordinates()
                );
                prop_assert!(
                    grid.is_valid_river_destination(index, direction),
                    "river from {} flows uphill",
                    cell.coordinates()
                );
            }
            if cell.incoming_river() == Some(direction) {
                prop_assert_eq!(
                    other.and_then(|other| other.outgoing_river()),
                    Some(direction.opposite()),
                    "incoming river of {} is unpaired",
                    cell.coordinates()
                );
            }

            if cell.has_road(direction) {
                let other = other.expect("roads only cross existing edges");
                prop_assert!(other.has_road(direction.opposite()));
                prop_assert!(!cell.has_river_through_edge(direction));
                prop_assert!(!cell.is_special() && !other.is_special());
                prop_assert!(!cell.is_underwater() && !other.is_underwater());
                prop_assert!(cell.elevation().abs_diff(other.elevation()) <= 1);
            }
        }
    }
    Ok(())
}

proptest! {
    #[test]
    fn edits_preserve_terrain_invariants(commands in prop::collection::vec(command(), 1..120)) {
        let mut grid = new_grid();
        let mut events = Vec::new();
        for command in commands {
            world::apply(&mut grid, command, &mut events);
            check_invariants(&grid)?;
        }
    }

    #[test]
    fn save_and_load_reproduce_edited_grid(commands in prop::collection::vec(command(), 1..60)) {
        let mut grid = new_grid();
        let mut events = Vec::new();
        for command in commands {
            world::apply(&mut grid, command, &mut events);
        }

        let bytes = world::save(&grid).expect("grid saves");
        let restored = world::load_with(*grid.settings(), &bytes).expect("grid loads");
        let before: Vec<_> = grid.cells().iter().map(|cell| cell.snapshot()).collect();
        let after: Vec<_> = restored.cells().iter().map(|cell| cell.snapshot()).collect();
        prop_assert_eq!(before, after);
        check_invariants(&restored)?;
    }
}
