#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic round coordinator responsible for emitting tile spawn commands.
//!
//! The system seeds a fresh board and, after every finished round, flies a new
//! tile in from the edge opposite the slide direction. Numbers are drawn from a
//! shuffled deck so that small values stay balanced over time.

use rand::{seq::SliceRandom, Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use threes_core::{CellCoord, Command, Direction, Event};

const DECK_NUMBERS: [u32; 3] = [1, 2, 3];
const DECK_COPIES: usize = 4;

/// Configuration parameters required to construct the spawning system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    rng_seed: u64,
}

impl Config {
    /// Creates a new configuration using the provided seed.
    #[must_use]
    pub const fn new(rng_seed: u64) -> Self {
        Self { rng_seed }
    }
}

/// Pure system that deterministically emits spawn commands between rounds.
#[derive(Debug)]
pub struct Spawning {
    rng: ChaCha8Rng,
    deck: Vec<u32>,
}

impl Spawning {
    /// Creates a new spawning system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
            deck: Vec::new(),
        }
    }

    /// Emits `count` resting tiles on distinct cells drawn from `free_cells`.
    pub fn seed_board(&mut self, free_cells: &[CellCoord], count: usize, out: &mut Vec<Command>) {
        let chosen: Vec<CellCoord> = free_cells
            .choose_multiple(&mut self.rng, count.min(free_cells.len()))
            .copied()
            .collect();
        for cell in chosen {
            let number = self.next_number();
            out.push(Command::AddTile { number, cell });
        }
    }

    /// Consumes events and the current free cells to emit fly-in commands.
    ///
    /// Each finished round spawns one tile on the trailing edge of the slide.
    /// Nothing is spawned when that edge is full.
    pub fn handle(
        &mut self,
        events: &[Event],
        free_cells: &[CellCoord],
        rows: u32,
        columns: u32,
        out: &mut Vec<Command>,
    ) {
        for event in events {
            let Event::RoundFinished { direction } = *event else {
                continue;
            };

            let edge: Vec<CellCoord> = free_cells
                .iter()
                .copied()
                .filter(|cell| on_trailing_edge(*cell, direction, rows, columns))
                .collect();
            let Some(&cell) = edge.choose(&mut self.rng) else {
                continue;
            };

            let number = self.next_number();
            out.push(Command::FlyInTile {
                number,
                cell,
                direction,
            });
        }
    }

    fn next_number(&mut self) -> u32 {
        if self.deck.is_empty() {
            self.refill_deck();
        }
        match self.deck.pop() {
            Some(number) => number,
            None => DECK_NUMBERS[self.rng.gen_range(0..DECK_NUMBERS.len())],
        }
    }

    fn refill_deck(&mut self) {
        self.deck = DECK_NUMBERS
            .iter()
            .flat_map(|&number| std::iter::repeat(number).take(DECK_COPIES))
            .collect();
        self.deck.shuffle(&mut self.rng);
    }
}

/// Cells a new tile may enter through after a slide in `direction`.
fn on_trailing_edge(cell: CellCoord, direction: Direction, rows: u32, columns: u32) -> bool {
    let last_row = i64::from(rows) - 1;
    let last_column = i64::from(columns) - 1;
    match direction {
        Direction::Up => i64::from(cell.row()) == last_row,
        Direction::Down => cell.row() == 0,
        Direction::Left => i64::from(cell.column()) == last_column,
        Direction::Right => cell.column() == 0,
    }
}
