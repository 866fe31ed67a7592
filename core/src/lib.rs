#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Threes engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations or acknowledging finished animations, the world
//! executes those commands via its `apply` entry point, and then broadcasts
//! [`Event`] values that animation layers and round coordinators react to.
//! Nothing in the world touches presentation state directly; every visual cue
//! is an event.

mod rules;

use serde::{Deserialize, Serialize};

pub use rules::{MergeRule, ThreesRules, THREES_BASE_NUMBER};

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Resizes the board, destroying every tile currently on it.
    ConfigureBoard {
        /// Number of rows laid out in the matrix.
        rows: u32,
        /// Number of columns laid out in the matrix.
        columns: u32,
    },
    /// Updates the tile extent used to decide whether a slide was canceled.
    ConfigureTileSize {
        /// Extent of a single tile per axis.
        tile_size: TileSize,
    },
    /// Places a resting tile on an empty cell.
    AddTile {
        /// Game value carried by the new tile.
        number: u32,
        /// Cell the tile occupies.
        cell: CellCoord,
    },
    /// Spawns a tile one step outside its target and slides it in.
    FlyInTile {
        /// Game value carried by the new tile.
        number: u32,
        /// Cell the tile comes to rest on.
        cell: CellCoord,
        /// Direction of travel while entering.
        direction: Direction,
    },
    /// Requests advisory hints for an in-progress gesture.
    Preview {
        /// Direction of the gesture.
        direction: Direction,
        /// Signed distance travelled by the gesture along its axis.
        distance: f32,
    },
    /// Requests half-step hints for a gesture.
    PreviewInHalf {
        /// Direction of the gesture.
        direction: Direction,
    },
    /// Commits a slide, unless the gesture was too short.
    Move {
        /// Direction of the slide.
        direction: Direction,
        /// Signed distance travelled by the gesture along its axis.
        distance: f32,
    },
    /// Reports that a tile finished its move, merge or fly-in animation.
    SettleTile {
        /// Tile whose animation completed.
        tile: TileId,
    },
    /// Highlights every tile carrying the maximum number.
    HighlightMax,
    /// Starts the end-of-game scoring sweep.
    ShowScore,
    /// Reports that a tile finished revealing its score.
    AcknowledgeScore {
        /// Tile whose score reveal completed.
        tile: TileId,
    },
    /// Destroys every tile and abandons any round in flight.
    Reset,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Announces the dimensions of a freshly configured, empty board.
    BoardConfigured {
        /// Number of rows in the matrix.
        rows: u32,
        /// Number of columns in the matrix.
        columns: u32,
    },
    /// Announces that every tile was destroyed.
    BoardCleared,
    /// Confirms that a tile joined the board and occupies a cell.
    TileAdded {
        /// Identifier assigned to the tile.
        tile: TileId,
        /// Game value carried by the tile.
        number: u32,
        /// Cell the tile occupies.
        cell: CellCoord,
    },
    /// Reports that a spawn request could not be honoured.
    TileRejected {
        /// Game value requested for the tile.
        number: u32,
        /// Cell requested for the tile.
        cell: CellCoord,
        /// Specific reason the spawn failed.
        reason: PlacementError,
    },
    /// Instructs the animation layer to slide a new tile onto the board.
    TileFlyingIn {
        /// Identifier assigned to the incoming tile.
        tile: TileId,
        /// Game value carried by the tile.
        number: u32,
        /// Off-grid position the tile starts from.
        from: CellCoord,
        /// Cell the tile comes to rest on.
        to: CellCoord,
    },
    /// Hints that a tile would move for the previewed gesture.
    TilePreviewed {
        /// Tile that would move.
        tile: TileId,
        /// Direction of the gesture.
        direction: Direction,
        /// Distance relayed from the gesture.
        distance: f32,
    },
    /// Hints that a tile would move, capped at half a step.
    TilePreviewedInHalf {
        /// Tile that would move.
        tile: TileId,
        /// Direction of the gesture.
        direction: Direction,
    },
    /// Visual no-op cue emitted for every tile when nothing can move.
    TileStretched {
        /// Tile that should stretch.
        tile: TileId,
        /// Direction of the gesture.
        direction: Direction,
        /// Distance relayed from the gesture.
        distance: f32,
    },
    /// Undoes a previous stretch cue.
    StretchReset {
        /// Tile that should relax.
        tile: TileId,
    },
    /// Instructs a previewed tile to return to its resting position.
    TileChangedBack {
        /// Tile that should revert.
        tile: TileId,
    },
    /// Reports that a slide was refused without touching the board.
    MoveRejected {
        /// Direction of the refused slide.
        direction: Direction,
        /// Specific reason the slide was refused.
        reason: MoveRejection,
    },
    /// Asks adapters to stop accepting gestures until the round finishes.
    InputFrozen,
    /// Directs a tile to slide to a new cell.
    TileMoved {
        /// Tile that moved.
        tile: TileId,
        /// Cell the tile occupied before the slide.
        from: CellCoord,
        /// Cell the tile occupies after the slide.
        to: CellCoord,
    },
    /// Directs a tile to slide into another tile and disappear.
    TileMerged {
        /// Tile that was absorbed and no longer exists.
        tile: TileId,
        /// Tile that absorbed it.
        into: TileId,
        /// Cell the absorbed tile started from.
        from: CellCoord,
        /// Cell of the absorbing tile.
        to: CellCoord,
        /// Number carried by the absorbing tile after the merge.
        number: u32,
    },
    /// Announces that the board accepts the next gesture.
    RoundReady,
    /// Announces that every tile of a committed slide settled.
    RoundFinished {
        /// Direction of the slide that finished.
        direction: Direction,
    },
    /// Clears the highlight of a tile.
    TileUnhighlighted {
        /// Tile losing its highlight.
        tile: TileId,
    },
    /// Highlights a tile carrying the maximum number.
    TileHighlighted {
        /// Tile gaining the highlight.
        tile: TileId,
    },
    /// Assigns a visual stacking order to a tile.
    TileStacked {
        /// Tile being layered.
        tile: TileId,
        /// Stacking order, `row + column` of the tile's cell.
        z: i32,
    },
    /// Asks the animation layer to reveal the score of a tile.
    ScoreRevealRequested {
        /// Tile whose score should be shown.
        tile: TileId,
        /// Number carried by the tile.
        number: u32,
        /// Score awarded for the tile.
        score: u64,
    },
    /// Reports the final score once every tier has been revealed.
    ScoreDone {
        /// Sum of the scores of every revealed tile.
        total: u64,
    },
}

/// Cardinal slide directions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Direction {
    /// Movement toward decreasing row indices.
    Up,
    /// Movement toward increasing column indices.
    Right,
    /// Movement toward increasing row indices.
    Down,
    /// Movement toward decreasing column indices.
    Left,
}

impl Direction {
    /// Every direction, in the order game-over detection scans them.
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Right,
        Direction::Down,
        Direction::Left,
    ];

    /// Direction pointing the other way along the same axis.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Right => Self::Left,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
        }
    }

    /// Reports whether the direction travels along rows (up or down).
    #[must_use]
    pub const fn is_vertical(self) -> bool {
        matches!(self, Self::Up | Self::Down)
    }

    /// Column and row delta of a single step.
    #[must_use]
    pub const fn offset(self) -> (i32, i32) {
        match self {
            Self::Up => (0, -1),
            Self::Right => (1, 0),
            Self::Down => (0, 1),
            Self::Left => (-1, 0),
        }
    }

    /// Lowercase name used by adapters and scripts.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Right => "right",
            Self::Down => "down",
            Self::Left => "left",
        }
    }

    /// Parses a direction name or its single-letter abbreviation.
    ///
    /// Unknown names yield `None`; callers treat that as a no-op.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "up" | "u" => Some(Self::Up),
            "right" | "r" => Some(Self::Right),
            "down" | "d" => Some(Self::Down),
            "left" | "l" => Some(Self::Left),
            _ => None,
        }
    }
}

/// Location of a cell expressed as column and row coordinates.
///
/// Coordinates are signed because a tile flying in starts one step outside
/// the board.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: i32,
    row: i32,
}

impl CellCoord {
    /// Creates a new cell coordinate.
    #[must_use]
    pub const fn new(column: i32, row: i32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> i32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> i32 {
        self.row
    }

    /// Neighbouring cell one step in `direction`.
    #[must_use]
    pub const fn step(self, direction: Direction) -> Self {
        let (dx, dy) = direction.offset();
        Self {
            column: self.column.saturating_add(dx),
            row: self.row.saturating_add(dy),
        }
    }

    /// Visual stacking order: cells further down and right draw on top.
    #[must_use]
    pub const fn stacking_order(self) -> i32 {
        self.row.saturating_add(self.column)
    }
}

/// Unique identifier assigned to a tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileId(u32);

impl TileId {
    /// Creates a new tile identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Extent of a single tile per axis, in presentation units.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TileSize {
    width: f32,
    height: f32,
}

impl TileSize {
    /// Creates a tile size from its width and height.
    #[must_use]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Horizontal extent of a tile.
    #[must_use]
    pub const fn width(&self) -> f32 {
        self.width
    }

    /// Vertical extent of a tile.
    #[must_use]
    pub const fn height(&self) -> f32 {
        self.height
    }

    /// Gesture distance below which a slide in `direction` is canceled.
    ///
    /// One third of the tile extent along the direction's axis.
    #[must_use]
    pub fn cancel_threshold(&self, direction: Direction) -> f32 {
        if direction.is_vertical() {
            self.height / 3.0
        } else {
            self.width / 3.0
        }
    }
}

/// Per-tile outcome of a committed slide.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Directive {
    /// The tile slides to a new cell.
    Move {
        /// Tile that moves.
        tile: TileId,
        /// Cell occupied before the slide.
        from: CellCoord,
        /// Cell occupied after the slide.
        to: CellCoord,
    },
    /// The tile slides into another tile and is absorbed by it.
    Merge {
        /// Tile that is absorbed.
        tile: TileId,
        /// Tile that absorbs it.
        into: TileId,
        /// Cell the absorbed tile started from.
        from: CellCoord,
        /// Cell of the absorbing tile.
        to: CellCoord,
    },
}

impl Directive {
    /// Tile the directive applies to.
    #[must_use]
    pub const fn tile(&self) -> TileId {
        match self {
            Self::Move { tile, .. } | Self::Merge { tile, .. } => *tile,
        }
    }
}

/// Ordered directives produced by resolving one slide.
///
/// Directives appear in resolution order: tiles nearest the destination edge
/// first.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Resolution {
    directives: Vec<Directive>,
}

impl Resolution {
    /// Wraps directives already sorted in resolution order.
    #[must_use]
    pub fn new(directives: Vec<Directive>) -> Self {
        Self { directives }
    }

    /// Number of tiles that moved or merged.
    #[must_use]
    pub fn len(&self) -> usize {
        self.directives.len()
    }

    /// Reports whether the slide left every tile in place.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.directives.is_empty()
    }

    /// Iterator over the directives in resolution order.
    pub fn iter(&self) -> impl Iterator<Item = &Directive> {
        self.directives.iter()
    }

    /// Number of merge directives.
    #[must_use]
    pub fn merge_count(&self) -> usize {
        self.directives
            .iter()
            .filter(|directive| matches!(directive, Directive::Merge { .. }))
            .count()
    }

    /// Tiles that received a directive, in resolution order.
    pub fn tiles(&self) -> impl Iterator<Item = TileId> + '_ {
        self.directives.iter().map(Directive::tile)
    }

    /// Consumes the resolution, yielding the underlying directives.
    #[must_use]
    pub fn into_vec(self) -> Vec<Directive> {
        self.directives
    }
}

/// Immutable representation of a single tile's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TileSnapshot {
    /// Unique identifier assigned to the tile.
    pub id: TileId,
    /// Game value carried by the tile.
    pub number: u32,
    /// Cell currently occupied by the tile.
    pub cell: CellCoord,
    /// Indicates whether the tile carries the max-number highlight.
    pub highlighted: bool,
    /// Last stacking order assigned to the tile.
    pub z: i32,
}

/// Read-only snapshot describing all tiles on the board.
#[derive(Clone, Debug, Default)]
pub struct TileView {
    snapshots: Vec<TileSnapshot>,
}

impl TileView {
    /// Creates a new tile view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<TileSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured tile snapshots in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = &TileSnapshot> {
        self.snapshots.iter()
    }

    /// Number of tiles captured by the view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the board held no tiles.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<TileSnapshot> {
        self.snapshots
    }
}

/// Reasons a spawn request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlacementError {
    /// The requested cell lies outside the board.
    OutOfBounds,
    /// The requested cell holds a tile or is reserved by a tile flying in.
    Occupied,
}

/// Reasons a slide may be refused before anything is computed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoveRejection {
    /// A committed slide is still waiting for its tiles to settle.
    RoundInFlight,
    /// A tile is still flying in.
    FlyInPending,
    /// The scoring sweep is running.
    ScoreSweepInFlight,
}
