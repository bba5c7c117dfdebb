//! Batch edit scripts read from TOML.
//!
//! A script lists raw commands, applied first and in order, followed by brush
//! strokes replayed through the editor system:
//!
//! ```toml
//! [[commands]]
//! set_elevation = { cell = { x = 1, z = 2 }, elevation = 3 }
//!
//! [[strokes]]
//! brush = { elevation = 1, road = "yes" }
//! cells = [[0, 0], [1, 0], [2, 0]]
//! ```
//!
//! Stroke cells are `[column, row]` offset coordinates sampled as if the
//! pointer were dragged across them.

use hexmap_core::{Command, Event, HexCoordinates};
use hexmap_system_editor::{BrushSettings, Editor};
use hexmap_world::{self as world, Grid};
use serde::Deserialize;

/// Parsed edit script.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct EditScript {
    commands: Vec<Command>,
    strokes: Vec<Stroke>,
}

/// Pointer drag painted with a single brush.
#[derive(Clone, Debug, Deserialize)]
struct Stroke {
    #[serde(default)]
    brush: BrushSettings,
    cells: Vec<(i32, i32)>,
}

impl EditScript {
    /// Parses a script from TOML source.
    pub(crate) fn parse(source: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(source)
    }

    /// Applies the script to the grid and returns every emitted event.
    pub(crate) fn run(&self, grid: &mut Grid) -> Vec<Event> {
        let mut events = Vec::new();
        for command in &self.commands {
            world::apply(grid, command.clone(), &mut events);
        }

        for stroke in &self.strokes {
            let mut editor = Editor::new(stroke.brush);
            for (column, row) in &stroke.cells {
                let sample = HexCoordinates::from_offset(*column, *row);
                let mut commands = Vec::new();
                editor.handle(
                    &events,
                    Some(sample),
                    |cell| grid.index_of(cell).is_some(),
                    &mut commands,
                );
                for command in commands {
                    world::apply(grid, command, &mut events);
                }
            }
            let mut released = Vec::new();
            editor.handle(&events, None, |_| false, &mut released);
        }
        events
    }
}

#[cfg(test)]
mod tests {
    use hexmap_core::HexDirection;

    use super::*;

    const SCRIPT: &str = r#"
[[commands]]
set_elevation = { cell = { x = 1, z = 2 }, elevation = 3 }

[[commands]]
spawn_unit = { cell = { x = 2, z = 4 }, orientation = 90.0 }

[[strokes]]
brush = { road = "yes" }
cells = [[0, 0], [1, 0], [2, 0]]
"#;

    #[test]
    fn parses_commands_and_strokes() {
        let script = EditScript::parse(SCRIPT).expect("script parses");
        assert_eq!(script.commands.len(), 2);
        assert_eq!(
            script.commands[0],
            Command::SetElevation {
                cell: HexCoordinates::new(1, 2),
                elevation: 3
            }
        );
        assert_eq!(script.strokes.len(), 1);
        assert_eq!(script.strokes[0].cells, vec![(0, 0), (1, 0), (2, 0)]);
    }

    #[test]
    fn running_script_edits_grid() {
        let script = EditScript::parse(SCRIPT).expect("script parses");
        let mut grid = Grid::build(5, 5).expect("grid builds");
        let _ = grid.take_changed_regions();

        let events = script.run(&mut grid);

        let raised = grid
            .cell_at(HexCoordinates::new(1, 2))
            .expect("cell exists");
        assert_eq!(raised.elevation(), 3);
        assert!(events
            .iter()
            .any(|event| matches!(event, Event::UnitSpawned { .. })));

        let start = grid
            .cell_at(HexCoordinates::from_offset(0, 0))
            .expect("cell exists");
        assert!(start.has_road(HexDirection::E));
        let middle = grid
            .cell_at(HexCoordinates::from_offset(1, 0))
            .expect("cell exists");
        assert!(middle.has_road(HexDirection::W) && middle.has_road(HexDirection::E));
    }

    #[test]
    fn empty_script_is_valid() {
        let script = EditScript::parse("").expect("script parses");
        let mut grid = Grid::build(5, 5).expect("grid builds");
        let _ = grid.take_changed_regions();
        assert!(script.run(&mut grid).is_empty());
    }
}
