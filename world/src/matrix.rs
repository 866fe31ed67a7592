//! Sparse tile matrix and the slide resolution algorithm.

use threes_core::{CellCoord, Direction, Directive, Resolution, TileId};

/// Authoritative placement of tiles by row and column.
///
/// The matrix stores identifiers only; it never owns tiles. Whether two tiles
/// may merge is decided by a conflict predicate supplied per call, which
/// receives the identifier of the travelling tile and of whatever occupies the
/// cell ahead (`None` for an empty cell).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Matrix {
    rows: u32,
    columns: u32,
    cells: Vec<Option<TileId>>,
}

impl Matrix {
    /// Creates an empty matrix with the provided dimensions.
    #[must_use]
    pub fn new(rows: u32, columns: u32) -> Self {
        let capacity_u64 = u64::from(rows) * u64::from(columns);
        let capacity = usize::try_from(capacity_u64).unwrap_or(0);
        Self {
            rows,
            columns,
            cells: vec![None; capacity],
        }
    }

    /// Number of rows in the matrix.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Number of columns in the matrix.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Reports whether the cell lies inside the matrix.
    #[must_use]
    pub fn contains(&self, cell: CellCoord) -> bool {
        self.index(cell).is_some()
    }

    /// Returns the tile occupying the cell, if any.
    #[must_use]
    pub fn get_at(&self, cell: CellCoord) -> Option<TileId> {
        self.index(cell)
            .and_then(|index| self.cells.get(index).copied().flatten())
    }

    /// Places a tile on an empty in-bounds cell.
    ///
    /// Returns `false` without touching the matrix when the cell is outside
    /// the board or already occupied.
    pub fn set(&mut self, tile: TileId, cell: CellCoord) -> bool {
        let Some(index) = self.index(cell) else {
            return false;
        };
        match self.cells.get_mut(index) {
            Some(slot @ None) => {
                *slot = Some(tile);
                true
            }
            _ => false,
        }
    }

    /// Iterates occupied cells in row-major order.
    pub fn occupied(&self) -> impl Iterator<Item = (CellCoord, TileId)> + '_ {
        self.cells_in_row_major()
            .filter_map(move |cell| self.get_at(cell).map(|tile| (cell, tile)))
    }

    /// Number of occupied cells.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.iter().filter(|slot| slot.is_some()).count()
    }

    /// Reports whether no cell is occupied.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(Option::is_none)
    }

    pub(crate) fn clear(&mut self) {
        self.cells.fill(None);
    }

    /// Tiles able to take at least one step in `direction`.
    ///
    /// A tile qualifies when the next cell is inside the board and the conflict
    /// predicate accepts whatever occupies it. Tiles are listed nearest the
    /// destination edge first. Nothing is mutated, so this doubles as the
    /// preview query.
    pub fn movables<F>(&self, direction: Direction, conflict: F) -> Vec<TileId>
    where
        F: Fn(Option<TileId>, Option<TileId>) -> bool,
    {
        self.traversal_order(direction)
            .into_iter()
            .filter_map(|cell| {
                let tile = self.get_at(cell)?;
                let next = cell.step(direction);
                if !self.contains(next) {
                    return None;
                }
                conflict(Some(tile), self.get_at(next)).then_some(tile)
            })
            .collect()
    }

    /// Commits a slide in `direction` and reports what happened to each tile.
    ///
    /// Tiles resolve from the destination edge backward, so every tile
    /// compacts against the final positions of the tiles ahead of it. A tile
    /// walks until the board edge or an occupied cell; it merges into that
    /// occupant when the predicate allows and the occupant has not absorbed
    /// another tile during this pass. The absorbed tile leaves the matrix and
    /// the absorbing tile keeps its cell. The new layout replaces the old one
    /// only after every tile resolved.
    pub fn do_move<F>(&mut self, direction: Direction, conflict: F) -> Resolution
    where
        F: Fn(Option<TileId>, Option<TileId>) -> bool,
    {
        let mut scratch = self.clone();
        let mut absorbers: Vec<TileId> = Vec::new();
        let mut directives = Vec::new();

        for cell in self.traversal_order(direction) {
            let Some(tile) = scratch.get_at(cell) else {
                continue;
            };

            let mut target = cell;
            let mut merge_into = None;
            loop {
                let next = target.step(direction);
                if !scratch.contains(next) {
                    break;
                }
                match scratch.get_at(next) {
                    None => target = next,
                    Some(occupant) => {
                        if !absorbers.contains(&occupant) && conflict(Some(tile), Some(occupant)) {
                            merge_into = Some((occupant, next));
                        }
                        break;
                    }
                }
            }

            if let Some((into, to)) = merge_into {
                scratch.vacate(cell);
                absorbers.push(into);
                directives.push(Directive::Merge {
                    tile,
                    into,
                    from: cell,
                    to,
                });
            } else if target != cell {
                scratch.vacate(cell);
                let _ = scratch.set(tile, target);
                directives.push(Directive::Move {
                    tile,
                    from: cell,
                    to: target,
                });
            }
        }

        *self = scratch;
        Resolution::new(directives)
    }

    fn vacate(&mut self, cell: CellCoord) {
        if let Some(index) = self.index(cell) {
            if let Some(slot) = self.cells.get_mut(index) {
                *slot = None;
            }
        }
    }

    /// Cells ordered from the destination edge of `direction` backward.
    fn traversal_order(&self, direction: Direction) -> Vec<CellCoord> {
        let rows = i32::try_from(self.rows).unwrap_or(0);
        let columns = i32::try_from(self.columns).unwrap_or(0);
        let mut order = Vec::with_capacity(self.cells.len());
        match direction {
            Direction::Up | Direction::Down => {
                let row_order: Vec<i32> = if direction == Direction::Up {
                    (0..rows).collect()
                } else {
                    (0..rows).rev().collect()
                };
                for row in row_order {
                    order.extend((0..columns).map(|column| CellCoord::new(column, row)));
                }
            }
            Direction::Left | Direction::Right => {
                let column_order: Vec<i32> = if direction == Direction::Left {
                    (0..columns).collect()
                } else {
                    (0..columns).rev().collect()
                };
                for column in column_order {
                    order.extend((0..rows).map(|row| CellCoord::new(column, row)));
                }
            }
        }
        order
    }

    fn cells_in_row_major(&self) -> impl Iterator<Item = CellCoord> {
        let rows = i32::try_from(self.rows).unwrap_or(0);
        let columns = i32::try_from(self.columns).unwrap_or(0);
        (0..rows).flat_map(move |row| (0..columns).map(move |column| CellCoord::new(column, row)))
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        let row = u32::try_from(cell.row()).ok()?;
        let column = u32::try_from(cell.column()).ok()?;
        if row >= self.rows || column >= self.columns {
            return None;
        }
        let row = usize::try_from(row).ok()?;
        let column = usize::try_from(column).ok()?;
        let width = usize::try_from(self.columns).ok()?;
        Some(row * width + column)
    }
}
