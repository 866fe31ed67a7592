#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays Threes headlessly.
//!
//! The adapter stands in for the animation layer: every tile the world moves,
//! merges or flies in is settled immediately, and every score reveal is
//! acknowledged as soon as it is requested.

mod config;
mod layout_transfer;

use std::{fmt::Write as _, path::PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use threes_core::{CellCoord, Command, Direction, Event, TileSize};
use threes_system_spawning::{Config as SpawningConfig, Spawning};
use threes_world::{self as world, query, World};

use crate::{config::GameConfig, layout_transfer::BoardLayoutSnapshot};

/// Plays a scripted sequence of slides on a Threes board.
#[derive(Debug, Parser)]
#[command(name = "threes", version, about = "Headless Threes board driver")]
struct Args {
    /// TOML file providing board dimensions, tile size, seed and initial tile count.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Overrides the number of board rows.
    #[arg(long)]
    rows: Option<u32>,
    /// Overrides the number of board columns.
    #[arg(long)]
    columns: Option<u32>,
    /// Overrides the random seed used for spawning.
    #[arg(long)]
    seed: Option<u64>,
    /// Overrides the number of tiles placed before the first slide.
    #[arg(long)]
    initial_tiles: Option<usize>,
    /// Comma separated slides to play, e.g. `left,up,r,d`.
    #[arg(long, value_delimiter = ',')]
    moves: Vec<String>,
    /// Starts from an encoded board layout instead of a seeded board.
    #[arg(long)]
    layout: Option<String>,
    /// Prints the encoded layout of the final board.
    #[arg(long)]
    print_layout: bool,
    /// Prints every event emitted by the world.
    #[arg(long)]
    verbose: bool,
}

/// Entry point for the Threes command-line interface.
fn main() -> Result<()> {
    let args = Args::parse();
    let config = resolve_config(&args)?;

    let mut session = Session::new(&config, args.verbose);
    match args.layout.as_deref() {
        Some(encoded) => {
            let snapshot = BoardLayoutSnapshot::decode(encoded)
                .context("failed to decode the provided layout")?;
            session.restore(&snapshot);
        }
        None => session.seed(&config),
    }

    for name in &args.moves {
        let Some(direction) = Direction::from_name(name.trim()) else {
            eprintln!("ignoring unknown direction `{name}`");
            continue;
        };
        session.slide(direction);
        if !query::any_movable(&session.world) {
            println!("no moves left");
            break;
        }
    }

    print!("{}", render(&session.world));
    println!("score: {}", session.score());

    if args.print_layout {
        let encoded = BoardLayoutSnapshot::capture(&session.world)
            .encode()
            .context("failed to encode the final layout")?;
        println!("{encoded}");
    }

    Ok(())
}

fn resolve_config(args: &Args) -> Result<GameConfig> {
    let mut config = match &args.config {
        Some(path) => GameConfig::load(path)?,
        None => GameConfig::default(),
    };
    if let Some(rows) = args.rows {
        config.rows = rows;
    }
    if let Some(columns) = args.columns {
        config.columns = columns;
    }
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(initial_tiles) = args.initial_tiles {
        config.initial_tiles = initial_tiles;
    }
    config::validate_dimensions(config.rows, config.columns)?;
    Ok(config)
}

/// World plus the systems that react to its events.
struct Session {
    world: World,
    spawning: Spawning,
    tile_size: TileSize,
    verbose: bool,
}

impl Session {
    fn new(config: &GameConfig, verbose: bool) -> Self {
        let tile_size = TileSize::new(config.tile_width, config.tile_height);
        let mut session = Self {
            world: World::new(),
            spawning: Spawning::new(SpawningConfig::new(config.seed)),
            tile_size,
            verbose,
        };
        let _ = session.execute(vec![
            Command::ConfigureBoard {
                rows: config.rows,
                columns: config.columns,
            },
            Command::ConfigureTileSize { tile_size },
        ]);
        session
    }

    fn seed(&mut self, config: &GameConfig) {
        let mut commands = Vec::new();
        self.spawning.seed_board(
            &query::free_cells(&self.world),
            config.initial_tiles,
            &mut commands,
        );
        let _ = self.execute(commands);
    }

    fn restore(&mut self, snapshot: &BoardLayoutSnapshot) {
        let _ = self.execute(snapshot.commands());
    }

    fn slide(&mut self, direction: Direction) {
        let distance = if direction.is_vertical() {
            self.tile_size.height()
        } else {
            self.tile_size.width()
        };
        let _ = self.execute(vec![Command::Move {
            direction,
            distance,
        }]);
    }

    fn score(&mut self) -> u64 {
        let events = self.execute(vec![Command::ShowScore]);
        events
            .iter()
            .find_map(|event| match *event {
                Event::ScoreDone { total } => Some(total),
                _ => None,
            })
            .unwrap_or_default()
    }

    /// Applies the commands and every follow-up until the world goes quiet.
    fn execute(&mut self, commands: Vec<Command>) -> Vec<Event> {
        let mut history = Vec::new();
        let mut pending = commands;

        while !pending.is_empty() {
            let mut events = Vec::new();
            for command in pending.drain(..) {
                world::apply(&mut self.world, command, &mut events);
            }
            if self.verbose {
                for event in &events {
                    eprintln!("{event:?}");
                }
            }

            pending.extend(events.iter().filter_map(|event| match *event {
                Event::TileMoved { tile, .. }
                | Event::TileMerged { tile, .. }
                | Event::TileFlyingIn { tile, .. } => Some(Command::SettleTile { tile }),
                Event::ScoreRevealRequested { tile, .. } => {
                    Some(Command::AcknowledgeScore { tile })
                }
                _ => None,
            }));

            let matrix = query::matrix(&self.world);
            let (rows, columns) = (matrix.rows(), matrix.columns());
            self.spawning.handle(
                &events,
                &query::free_cells(&self.world),
                rows,
                columns,
                &mut pending,
            );

            history.extend(events);
        }

        history
    }
}

fn render(world: &World) -> String {
    let matrix = query::matrix(world);
    let rows = i32::try_from(matrix.rows()).unwrap_or(i32::MAX);
    let columns = i32::try_from(matrix.columns()).unwrap_or(i32::MAX);

    let mut output = String::new();
    for row in 0..rows {
        for column in 0..columns {
            let cell = CellCoord::new(column, row);
            let number = query::tile_at(world, cell)
                .and_then(|tile| query::tile(world, tile))
                .map(|snapshot| snapshot.number);
            let _ = match number {
                Some(number) => write!(output, "{number:>6}"),
                None => write!(output, "{:>6}", "."),
            };
        }
        output.push('\n');
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use threes_core::TileId;

    fn quiet_session() -> Session {
        Session::new(
            &GameConfig {
                rows: 3,
                columns: 3,
                ..GameConfig::default()
            },
            false,
        )
    }

    #[test]
    fn slide_settles_and_spawns_a_tile() {
        let mut session = quiet_session();
        let _ = session.execute(vec![Command::AddTile {
            number: 3,
            cell: CellCoord::new(2, 0),
        }]);

        session.slide(Direction::Left);

        assert_eq!(query::round_in_flight(&session.world), None);
        assert!(query::pending_fly_ins(&session.world).is_empty());
        assert_eq!(
            query::tile_at(&session.world, CellCoord::new(0, 0)),
            Some(TileId::new(0))
        );
        assert_eq!(query::tile_count(&session.world), 2);
    }

    #[test]
    fn score_sweep_is_acknowledged_automatically() {
        let mut session = quiet_session();
        let _ = session.execute(vec![
            Command::AddTile {
                number: 6,
                cell: CellCoord::new(0, 0),
            },
            Command::AddTile {
                number: 3,
                cell: CellCoord::new(1, 1),
            },
        ]);

        assert_eq!(session.score(), 12);
        assert!(!query::score_sweep_in_flight(&session.world));
    }

    #[test]
    fn oversized_board_overrides_are_rejected() {
        let args = Args::try_parse_from(["threes", "--rows", "100000", "--columns", "100000"])
            .expect("arguments parse");
        let error = resolve_config(&args).expect_err("oversized board is rejected");
        assert!(error.to_string().contains("at most 65535 cells"));

        let args = Args::try_parse_from(["threes", "--rows", "5", "--columns", "3"])
            .expect("arguments parse");
        let config = resolve_config(&args).expect("small board is accepted");
        assert_eq!((config.rows, config.columns), (5, 3));
    }

    #[test]
    fn renders_empty_cells_as_dots() {
        let mut session = quiet_session();
        let _ = session.execute(vec![Command::AddTile {
            number: 12,
            cell: CellCoord::new(1, 0),
        }]);

        let rendered = render(&session.world);
        let first_line = rendered.lines().next().expect("board has rows");
        assert_eq!(first_line, "     .    12     .");
    }
}
