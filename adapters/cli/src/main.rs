#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter for creating, editing, inspecting and sharing hex
//! maps stored in the binary map format.

mod map_transfer;
mod script;

use std::{
    fs::{self, File},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use glam::Vec3;
use hexmap_core::{ChunkSize, Event, GridSettings, HexCoordinates, HexDirection};
use hexmap_world::{query, Cell, Grid};
use log::info;

use crate::script::EditScript;

#[derive(Parser, Debug)]
#[command(name = "hexmap", about = "Create, edit and inspect hex terrain maps")]
struct Cli {
    #[command(flatten)]
    layout: LayoutArgs,
    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Args, Debug)]
struct LayoutArgs {
    /// Cell columns per render region
    #[arg(long, global = true, default_value_t = hexmap_core::metrics::DEFAULT_CHUNK_SIZE_X)]
    chunk_columns: u32,
    /// Cell rows per render region
    #[arg(long, global = true, default_value_t = hexmap_core::metrics::DEFAULT_CHUNK_SIZE_Z)]
    chunk_rows: u32,
}

impl LayoutArgs {
    fn settings(&self) -> GridSettings {
        GridSettings::with_chunk_size(ChunkSize::new(self.chunk_columns, self.chunk_rows))
    }
}

#[derive(Subcommand, Debug)]
enum CliCommand {
    /// Create a flat map and write it to a file
    New {
        /// Number of cell columns
        #[arg(long)]
        width: u32,
        /// Number of cell rows
        #[arg(long)]
        height: u32,
        /// Output map file
        #[arg(long, short)]
        output: PathBuf,
    },
    /// Print a summary of a map, or the attributes of one cell
    Describe {
        /// Map file to read
        map: PathBuf,
        /// Cell as COLUMN,ROW offset coordinates
        #[arg(long, value_parser = parse_offset, conflicts_with = "position")]
        cell: Option<HexCoordinates>,
        /// Point in the map plane as X,Z world units
        #[arg(long, value_parser = parse_position, allow_hyphen_values = true)]
        position: Option<Vec3>,
    },
    /// Find the cheapest route between two cells
    Path {
        /// Map file to read
        map: PathBuf,
        /// Origin as COLUMN,ROW offset coordinates
        #[arg(long, value_parser = parse_offset)]
        from: HexCoordinates,
        /// Destination as COLUMN,ROW offset coordinates
        #[arg(long, value_parser = parse_offset)]
        to: HexCoordinates,
        /// Movement points available per turn
        #[arg(long, default_value_t = 24)]
        speed: u32,
    },
    /// Apply a TOML edit script to a map
    Apply {
        /// Map file to edit
        map: PathBuf,
        /// TOML script listing commands and brush strokes
        #[arg(long)]
        script: PathBuf,
        /// Output map file; defaults to overwriting the input
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Print a map as a single-line share string
    Export {
        /// Map file to read
        map: PathBuf,
    },
    /// Write a map decoded from a share string
    Import {
        /// Share string produced by `export`
        code: String,
        /// Output map file
        #[arg(long, short)]
        output: PathBuf,
    },
}

/// Entry point for the hex map command-line interface.
fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let settings = cli.layout.settings();

    match cli.command {
        CliCommand::New {
            width,
            height,
            output,
        } => {
            let grid = Grid::build_with(settings, width, height)
                .with_context(|| format!("cannot build a {width}x{height} map"))?;
            write_map(&grid, &output)?;
            println!("created {width}x{height} map at {}", output.display());
        }
        CliCommand::Describe {
            map,
            cell,
            position,
        } => {
            let grid = read_map(settings, &map)?;
            let target = match (cell, position) {
                (Some(coordinates), _) => Some(grid.cell_at(coordinates).with_context(|| {
                    format!("cell {coordinates} lies outside the map")
                })?),
                (None, Some(position)) => Some(
                    grid.cell_at_position(position)
                        .context("position lies outside the map")?,
                ),
                (None, None) => None,
            };
            match target {
                Some(cell) => describe_cell(cell),
                None => describe_map(&grid),
            }
        }
        CliCommand::Path {
            map,
            from,
            to,
            speed,
        } => {
            if speed == 0 {
                bail!("speed must be positive");
            }
            let mut grid = read_map(settings, &map)?;
            match grid.find_path(from, to, speed) {
                Some(path) => {
                    println!(
                        "{} cells, cost {}, arrives in turn {}",
                        path.len(),
                        path.total_cost(),
                        path.turns()
                    );
                    for step in path.steps() {
                        println!(
                            "  turn {:>3}  cost {:>4}  column {:>3} row {:>3}",
                            step.turn,
                            step.distance,
                            step.coordinates.column(),
                            step.coordinates.row()
                        );
                    }
                }
                None => println!("no path from {from} to {to}"),
            }
        }
        CliCommand::Apply {
            map,
            script,
            output,
        } => {
            let mut grid = read_map(settings, &map)?;
            let source = fs::read_to_string(&script)
                .with_context(|| format!("cannot read script {}", script.display()))?;
            let script = EditScript::parse(&source).context("invalid edit script")?;
            let events = script.run(&mut grid);
            report_events(&events);
            write_map(&grid, output.as_deref().unwrap_or(&map))?;
        }
        CliCommand::Export { map } => {
            let grid = read_map(settings, &map)?;
            println!("{}", map_transfer::encode(&grid)?);
        }
        CliCommand::Import { code, output } => {
            let grid = map_transfer::decode(&code, settings).context("invalid share string")?;
            write_map(&grid, &output)?;
            println!(
                "imported {}x{} map to {}",
                grid.width(),
                grid.height(),
                output.display()
            );
        }
    }
    Ok(())
}

fn read_map(settings: GridSettings, path: &Path) -> Result<Grid> {
    let bytes = fs::read(path).with_context(|| format!("cannot read {}", path.display()))?;
    let grid = hexmap_world::load_with(settings, &bytes)
        .with_context(|| format!("cannot load map {}", path.display()))?;
    info!("read {} cells from {}", grid.cells().len(), path.display());
    Ok(grid)
}

fn write_map(grid: &Grid, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("cannot create {}", parent.display()))?;
        }
    }
    let file = File::create(path).with_context(|| format!("cannot create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    grid.save_to(&mut writer)
        .with_context(|| format!("cannot write map {}", path.display()))?;
    writer.flush()?;
    Ok(())
}

fn describe_map(grid: &Grid) {
    let (width, height) = query::dimensions(grid);
    let cells = grid.cells();
    let count = |predicate: fn(&Cell) -> bool| cells.iter().filter(|cell| predicate(cell)).count();

    println!("{width}x{height} cells in {} regions", grid.chunk_count());
    println!("  underwater: {}", count(Cell::is_underwater));
    println!("  river cells: {}", count(Cell::has_river));
    println!("  road cells: {}", count(Cell::has_roads));
    println!("  walled cells: {}", count(Cell::walled));
    println!("  special cells: {}", count(Cell::is_special));
    let units = query::units(grid);
    println!("  units: {}", units.len());
    for unit in units {
        println!(
            "    #{} at column {} row {} facing {:.1}",
            unit.id.get(),
            unit.cell.column(),
            unit.cell.row(),
            unit.orientation
        );
    }
}

fn describe_cell(cell: &Cell) {
    let snapshot = cell.snapshot();
    let coordinates = snapshot.coordinates;
    println!(
        "cell {coordinates} (column {}, row {})",
        coordinates.column(),
        coordinates.row()
    );
    println!("  elevation {}, water {}", snapshot.elevation, snapshot.water_level);
    println!(
        "  terrain {}, urban {}, farm {}, plant {}, special {}",
        snapshot.terrain_type_index,
        snapshot.urban_level,
        snapshot.farm_level,
        snapshot.plant_level,
        snapshot.special_index
    );
    if snapshot.walled {
        println!("  walled");
    }
    if let Some(direction) = snapshot.incoming_river {
        println!("  river flows in from {direction:?}");
    }
    if let Some(direction) = snapshot.outgoing_river {
        println!("  river flows out to {direction:?}");
    }
    let roads: Vec<HexDirection> = HexDirection::ALL
        .into_iter()
        .filter(|direction| cell.has_road(*direction))
        .collect();
    if !roads.is_empty() {
        println!("  roads toward {roads:?}");
    }
    if let Some(unit) = cell.unit() {
        println!("  occupied by unit #{}", unit.get());
    }
}

fn report_events(events: &[Event]) {
    let regions = events
        .iter()
        .filter(|event| matches!(event, Event::RegionChanged { .. }))
        .count();
    for event in events {
        match event {
            Event::RegionChanged { .. } => {}
            other => println!("{other:?}"),
        }
    }
    println!("{regions} region refreshes");
}

fn parse_offset(value: &str) -> Result<HexCoordinates, String> {
    let (column, row) = parse_pair::<i32>(value)?;
    Ok(HexCoordinates::from_offset(column, row))
}

fn parse_position(value: &str) -> Result<Vec3, String> {
    let (x, z) = parse_pair::<f32>(value)?;
    Ok(Vec3::new(x, 0.0, z))
}

fn parse_pair<T: std::str::FromStr>(value: &str) -> Result<(T, T), String> {
    let (first, second) = value
        .split_once(',')
        .ok_or_else(|| format!("expected two comma-separated values, got '{value}'"))?;
    let parse = |part: &str| {
        part.trim()
            .parse::<T>()
            .map_err(|_| format!("could not parse '{part}' in '{value}'"))
    };
    Ok((parse(first)?, parse(second)?))
}
