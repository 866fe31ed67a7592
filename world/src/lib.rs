#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative board state for the Threes engine.
//!
//! The [`World`] owns every tile and the [`Matrix`] that places them. Slides
//! are resolved synchronously, but the world then waits for the animation
//! layer to acknowledge each affected tile before it declares the round
//! finished. Scoring follows the same pattern, one value tier at a time.

mod matrix;
mod scoring;
mod settlement;
mod tiles;

use threes_core::{
    CellCoord, Command, Direction, Directive, Event, MergeRule, MoveRejection, PlacementError,
    ThreesRules, TileId, TileSize,
};

pub use matrix::Matrix;

use scoring::{ScoreSweep, SweepProgress};
use settlement::{Acknowledgement, SettlementBarrier};
use tiles::{Tile, TileStore};

const DEFAULT_ROWS: u32 = 4;
const DEFAULT_COLUMNS: u32 = 4;
const DEFAULT_TILE_SIZE: TileSize = TileSize::new(100.0, 100.0);

/// Committed slide waiting for its tiles to settle.
#[derive(Debug)]
struct Round {
    direction: Direction,
    barrier: SettlementBarrier,
}

/// Tile travelling onto the board; it joins the collection once it settles.
#[derive(Debug)]
struct FlyIn {
    tile: Tile,
    target: CellCoord,
}

/// Represents the authoritative Threes board state.
#[derive(Debug)]
pub struct World {
    matrix: Matrix,
    tiles: TileStore,
    rules: Box<dyn MergeRule>,
    tile_size: TileSize,
    round: Option<Round>,
    fly_ins: Vec<FlyIn>,
    score_sweep: Option<ScoreSweep>,
}

impl World {
    /// Creates an empty 4×4 board governed by [`ThreesRules`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_rules(Box::new(ThreesRules))
    }

    /// Creates an empty 4×4 board governed by the provided rule set.
    #[must_use]
    pub fn with_rules(rules: Box<dyn MergeRule>) -> Self {
        Self {
            matrix: Matrix::new(DEFAULT_ROWS, DEFAULT_COLUMNS),
            tiles: TileStore::default(),
            rules,
            tile_size: DEFAULT_TILE_SIZE,
            round: None,
            fly_ins: Vec::new(),
            score_sweep: None,
        }
    }

    /// Replaces the board with an empty one of the given dimensions.
    pub fn configure_board(&mut self, rows: u32, columns: u32, out_events: &mut Vec<Event>) {
        self.matrix = Matrix::new(rows, columns);
        self.discard_tiles();
        out_events.push(Event::BoardConfigured { rows, columns });
    }

    /// Spawns a resting tile; returns `false` if the cell is unavailable.
    pub fn add_one(&mut self, number: u32, cell: CellCoord, out_events: &mut Vec<Event>) -> bool {
        if let Err(reason) = self.check_vacant(cell) {
            out_events.push(Event::TileRejected {
                number,
                cell,
                reason,
            });
            return false;
        }

        let tile = self.tiles.allocate(number, cell);
        let _ = self.matrix.set(tile.id, cell);
        out_events.push(Event::TileAdded {
            tile: tile.id,
            number,
            cell,
        });
        self.tiles.insert(tile);
        true
    }

    /// Spawns a tile one step behind `cell` and slides it in along `direction`.
    ///
    /// The tile reserves its target immediately but only joins the board when
    /// the animation layer settles it. Returns `false` if the target cell is
    /// unavailable.
    pub fn fly_in_one(
        &mut self,
        number: u32,
        cell: CellCoord,
        direction: Direction,
        out_events: &mut Vec<Event>,
    ) -> bool {
        if let Err(reason) = self.check_vacant(cell) {
            out_events.push(Event::TileRejected {
                number,
                cell,
                reason,
            });
            return false;
        }

        let start = cell.step(direction.opposite());
        let tile = self.tiles.allocate(number, start);
        out_events.push(Event::TileFlyingIn {
            tile: tile.id,
            number,
            from: start,
            to: cell,
        });
        self.fly_ins.push(FlyIn { tile, target: cell });
        true
    }

    /// Relays preview hints for a gesture without changing the board.
    ///
    /// When nothing can move, every tile receives a stretch cue instead.
    pub fn preview(&self, direction: Direction, distance: f32, out_events: &mut Vec<Event>) {
        if self.busy_reason().is_some() {
            return;
        }

        let movables = self.movables(direction);
        if movables.is_empty() {
            out_events.extend(self.tiles.iter().map(|tile| Event::TileStretched {
                tile: tile.id,
                direction,
                distance,
            }));
            return;
        }

        out_events.extend(movables.into_iter().map(|tile| Event::TilePreviewed {
            tile,
            direction,
            distance,
        }));
    }

    /// Relays half-step hints; returns whether any tile could move.
    pub fn preview_in_half(&self, direction: Direction, out_events: &mut Vec<Event>) -> bool {
        if self.busy_reason().is_some() {
            return false;
        }

        let movables = self.movables(direction);
        let any = !movables.is_empty();
        out_events.extend(
            movables
                .into_iter()
                .map(|tile| Event::TilePreviewedInHalf { tile, direction }),
        );
        any
    }

    /// Commits a slide unless nothing can move or the gesture was too short.
    ///
    /// A gesture shorter than a third of the tile extent along its axis is
    /// canceled: the previewed tiles are told to change back and the board is
    /// left untouched.
    pub fn move_tiles(&mut self, direction: Direction, distance: f32, out_events: &mut Vec<Event>) {
        if let Some(reason) = self.busy_reason() {
            out_events.push(Event::MoveRejected { direction, reason });
            return;
        }

        let movables = self.movables(direction);
        if movables.is_empty() {
            out_events.extend(
                self.tiles
                    .iter()
                    .map(|tile| Event::StretchReset { tile: tile.id }),
            );
            return;
        }

        let committed = distance.abs() >= self.tile_size.cancel_threshold(direction);
        if !committed {
            out_events.extend(
                movables
                    .into_iter()
                    .map(|tile| Event::TileChangedBack { tile }),
            );
            return;
        }

        out_events.push(Event::InputFrozen);
        let resolution = self
            .matrix
            .do_move(direction, conflict_test(&self.tiles, self.rules.as_ref()));

        for directive in resolution.iter() {
            match *directive {
                Directive::Move { tile, from, to } => {
                    if let Some(entity) = self.tiles.get_mut(tile) {
                        entity.cell = to;
                    }
                    out_events.push(Event::TileMoved { tile, from, to });
                }
                Directive::Merge {
                    tile,
                    into,
                    from,
                    to,
                } => {
                    let absorbed = self.tiles.remove(tile).map(|entity| entity.number);
                    if let (Some(absorbed), Some(target)) = (absorbed, self.tiles.get_mut(into)) {
                        target.number = self.rules.merged_number(target.number, absorbed);
                    }
                    out_events.push(Event::TileMerged {
                        tile,
                        into,
                        from,
                        to,
                        number: self.tiles.number(into).unwrap_or_default(),
                    });
                }
            }
        }

        if resolution.is_empty() {
            self.finish_round(direction, out_events);
            return;
        }

        self.round = Some(Round {
            direction,
            barrier: SettlementBarrier::new(resolution.tiles()),
        });
    }

    /// Records that a tile finished animating.
    ///
    /// Settles a pending fly-in, or counts toward the committed round. The
    /// round finishes on the last expected tile; duplicate or unknown signals
    /// are ignored.
    pub fn settle_tile(&mut self, tile: TileId, out_events: &mut Vec<Event>) {
        if let Some(position) = self.fly_ins.iter().position(|fly_in| fly_in.tile.id == tile) {
            let fly_in = self.fly_ins.remove(position);
            self.land(fly_in, out_events);
            return;
        }

        let Some(round) = self.round.as_mut() else {
            return;
        };
        if round.barrier.acknowledge(tile) == Acknowledgement::Complete {
            let direction = round.direction;
            self.round = None;
            self.finish_round(direction, out_events);
        }
    }

    /// Highlights every tile carrying the maximum number.
    ///
    /// Skipped when the board is empty or its maximum does not exceed the
    /// rule set's base number.
    pub fn highlight_max(&mut self, out_events: &mut Vec<Event>) {
        let Some(max) = self.tiles.max_number() else {
            return;
        };
        if max <= self.rules.base_number() {
            return;
        }

        for tile in self.tiles.iter_mut() {
            tile.highlighted = false;
            out_events.push(Event::TileUnhighlighted { tile: tile.id });
        }
        for id in self.tiles.filter_by_number(max) {
            if let Some(tile) = self.tiles.get_mut(id) {
                tile.highlighted = true;
            }
            out_events.push(Event::TileHighlighted { tile: id });
        }
    }

    /// Starts the scoring sweep.
    ///
    /// Every placed tile is first layered by `row + column`. Tiers then run
    /// from the base number upward, doubling each time, until the board
    /// maximum is exceeded.
    pub fn show_score(&mut self, out_events: &mut Vec<Event>) {
        if self.score_sweep.is_some() {
            return;
        }

        for (cell, id) in self.matrix.occupied() {
            let z = cell.stacking_order();
            if let Some(tile) = self.tiles.get_mut(id) {
                tile.z = z;
            }
            out_events.push(Event::TileStacked { tile: id, z });
        }

        let Some(max) = self.tiles.max_number() else {
            out_events.push(Event::ScoreDone { total: 0 });
            return;
        };

        let mut sweep = ScoreSweep::new(self.rules.base_number(), max);
        if sweep.advance(&self.tiles, self.rules.as_ref(), out_events) == SweepProgress::Waiting {
            self.score_sweep = Some(sweep);
        }
    }

    /// Records that a tile finished revealing its score.
    pub fn acknowledge_score(&mut self, tile: TileId, out_events: &mut Vec<Event>) {
        let Some(sweep) = self.score_sweep.as_mut() else {
            return;
        };
        if sweep.acknowledge(tile, &self.tiles, self.rules.as_ref(), out_events)
            == SweepProgress::Done
        {
            self.score_sweep = None;
        }
    }

    /// Destroys every tile and abandons anything in flight.
    pub fn reset(&mut self, out_events: &mut Vec<Event>) {
        self.matrix.clear();
        self.discard_tiles();
        out_events.push(Event::BoardCleared);
    }

    fn discard_tiles(&mut self) {
        self.tiles.clear();
        self.round = None;
        self.fly_ins.clear();
        self.score_sweep = None;
    }

    fn movables(&self, direction: Direction) -> Vec<TileId> {
        self.matrix
            .movables(direction, conflict_test(&self.tiles, self.rules.as_ref()))
    }

    fn busy_reason(&self) -> Option<MoveRejection> {
        if self.round.is_some() {
            Some(MoveRejection::RoundInFlight)
        } else if !self.fly_ins.is_empty() {
            Some(MoveRejection::FlyInPending)
        } else if self.score_sweep.is_some() {
            Some(MoveRejection::ScoreSweepInFlight)
        } else {
            None
        }
    }

    fn is_reserved(&self, cell: CellCoord) -> bool {
        self.fly_ins.iter().any(|fly_in| fly_in.target == cell)
    }

    fn check_vacant(&self, cell: CellCoord) -> Result<(), PlacementError> {
        if !self.matrix.contains(cell) {
            return Err(PlacementError::OutOfBounds);
        }
        if self.matrix.get_at(cell).is_some() || self.is_reserved(cell) {
            return Err(PlacementError::Occupied);
        }
        Ok(())
    }

    fn land(&mut self, fly_in: FlyIn, out_events: &mut Vec<Event>) {
        let FlyIn { mut tile, target } = fly_in;
        tile.cell = target;
        if self.matrix.set(tile.id, target) {
            out_events.push(Event::TileAdded {
                tile: tile.id,
                number: tile.number,
                cell: target,
            });
            self.tiles.insert(tile);
        } else {
            out_events.push(Event::TileRejected {
                number: tile.number,
                cell: target,
                reason: PlacementError::Occupied,
            });
        }
        out_events.push(Event::RoundReady);
    }

    fn finish_round(&mut self, direction: Direction, out_events: &mut Vec<Event>) {
        out_events.push(Event::RoundFinished { direction });
        self.highlight_max(out_events);
    }

    fn free_cells(&self) -> Vec<CellCoord> {
        let rows = i32::try_from(self.matrix.rows()).unwrap_or(0);
        let columns = i32::try_from(self.matrix.columns()).unwrap_or(0);
        (0..rows)
            .flat_map(|row| (0..columns).map(move |column| CellCoord::new(column, row)))
            .filter(|cell| self.matrix.get_at(*cell).is_none() && !self.is_reserved(*cell))
            .collect()
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

fn conflict_test<'a>(
    tiles: &'a TileStore,
    rules: &'a dyn MergeRule,
) -> impl Fn(Option<TileId>, Option<TileId>) -> bool + 'a {
    move |mover, target| {
        rules.conflicts(
            mover.and_then(|id| tiles.number(id)),
            target.and_then(|id| tiles.number(id)),
        )
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::ConfigureBoard { rows, columns } => {
            world.configure_board(rows, columns, out_events);
        }
        Command::ConfigureTileSize { tile_size } => {
            world.tile_size = tile_size;
        }
        Command::AddTile { number, cell } => {
            let _ = world.add_one(number, cell, out_events);
        }
        Command::FlyInTile {
            number,
            cell,
            direction,
        } => {
            let _ = world.fly_in_one(number, cell, direction, out_events);
        }
        Command::Preview {
            direction,
            distance,
        } => world.preview(direction, distance, out_events),
        Command::PreviewInHalf { direction } => {
            let _ = world.preview_in_half(direction, out_events);
        }
        Command::Move {
            direction,
            distance,
        } => world.move_tiles(direction, distance, out_events),
        Command::SettleTile { tile } => world.settle_tile(tile, out_events),
        Command::HighlightMax => world.highlight_max(out_events),
        Command::ShowScore => world.show_score(out_events),
        Command::AcknowledgeScore { tile } => world.acknowledge_score(tile, out_events),
        Command::Reset => world.reset(out_events),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use threes_core::{CellCoord, Direction, MergeRule, TileId, TileSize, TileSnapshot, TileView};

    use super::{Matrix, World};

    /// Provides read-only access to the tile matrix.
    #[must_use]
    pub fn matrix(world: &World) -> &Matrix {
        &world.matrix
    }

    /// Returns the tile resting on the cell, if any.
    #[must_use]
    pub fn tile_at(world: &World, cell: CellCoord) -> Option<TileId> {
        world.matrix.get_at(cell)
    }

    /// Captures the state of a single live tile.
    #[must_use]
    pub fn tile(world: &World, id: TileId) -> Option<TileSnapshot> {
        world.tiles.get(id).map(|tile| tile.snapshot())
    }

    /// Captures a read-only view of every live tile.
    #[must_use]
    pub fn tile_view(world: &World) -> TileView {
        TileView::from_snapshots(world.tiles.iter().map(|tile| tile.snapshot()).collect())
    }

    /// Number of live tiles.
    #[must_use]
    pub fn tile_count(world: &World) -> usize {
        world.tiles.len()
    }

    /// Tiles able to take at least one step in `direction`.
    #[must_use]
    pub fn movables(world: &World, direction: Direction) -> Vec<TileId> {
        world.movables(direction)
    }

    /// Reports whether any direction has a movable tile; `false` means game over.
    #[must_use]
    pub fn any_movable(world: &World) -> bool {
        Direction::ALL
            .into_iter()
            .any(|direction| !world.movables(direction).is_empty())
    }

    /// Highest number on the board; `None` when the board is empty.
    #[must_use]
    pub fn max_number(world: &World) -> Option<u32> {
        world.tiles.max_number()
    }

    /// Live tiles carrying exactly `number`, in identifier order.
    #[must_use]
    pub fn filter_by_number(world: &World, number: u32) -> Vec<TileId> {
        world.tiles.filter_by_number(number)
    }

    /// Empty cells not reserved by a tile flying in, in row-major order.
    #[must_use]
    pub fn free_cells(world: &World) -> Vec<CellCoord> {
        world.free_cells()
    }

    /// Direction of the committed slide still waiting to settle.
    #[must_use]
    pub fn round_in_flight(world: &World) -> Option<Direction> {
        world.round.as_ref().map(|round| round.direction)
    }

    /// Settlement signals the committed slide still waits for.
    #[must_use]
    pub fn pending_settlements(world: &World) -> usize {
        world
            .round
            .as_ref()
            .map_or(0, |round| round.barrier.remaining())
    }

    /// Tiles currently flying in, in spawn order.
    #[must_use]
    pub fn pending_fly_ins(world: &World) -> Vec<TileId> {
        world.fly_ins.iter().map(|fly_in| fly_in.tile.id).collect()
    }

    /// Reports whether the scoring sweep is waiting for acknowledgements.
    #[must_use]
    pub fn score_sweep_in_flight(world: &World) -> bool {
        world.score_sweep.is_some()
    }

    /// Score reveals the current tier still waits for.
    #[must_use]
    pub fn pending_score_reveals(world: &World) -> usize {
        world
            .score_sweep
            .as_ref()
            .map_or(0, |sweep| sweep.outstanding())
    }

    /// Tile extent used for the cancellation threshold.
    #[must_use]
    pub fn tile_size(world: &World) -> TileSize {
        world.tile_size
    }

    /// Rule set governing merges and scores.
    #[must_use]
    pub fn rules(world: &World) -> &dyn MergeRule {
        world.rules.as_ref()
    }
}
