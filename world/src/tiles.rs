//! Tile entities and the collection that owns them.

use threes_core::{CellCoord, TileId, TileSnapshot};

/// A numbered piece owned by the board.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Tile {
    pub(crate) id: TileId,
    pub(crate) number: u32,
    pub(crate) cell: CellCoord,
    pub(crate) highlighted: bool,
    pub(crate) z: i32,
}

impl Tile {
    pub(crate) fn snapshot(&self) -> TileSnapshot {
        TileSnapshot {
            id: self.id,
            number: self.number,
            cell: self.cell,
            highlighted: self.highlighted,
            z: self.z,
        }
    }
}

/// Live tiles, kept sorted by identifier, plus the identity allocator.
#[derive(Debug, Default)]
pub(crate) struct TileStore {
    tiles: Vec<Tile>,
    next_id: u32,
}

impl TileStore {
    /// Creates a tile with a fresh identity without adding it to the store.
    pub(crate) fn allocate(&mut self, number: u32, cell: CellCoord) -> Tile {
        let id = TileId::new(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        Tile {
            id,
            number,
            cell,
            highlighted: false,
            z: 0,
        }
    }

    pub(crate) fn insert(&mut self, tile: Tile) {
        let position = self
            .tiles
            .binary_search_by_key(&tile.id, |existing| existing.id)
            .unwrap_or_else(|position| position);
        self.tiles.insert(position, tile);
    }

    pub(crate) fn remove(&mut self, id: TileId) -> Option<Tile> {
        let position = self.position(id)?;
        Some(self.tiles.remove(position))
    }

    pub(crate) fn get(&self, id: TileId) -> Option<&Tile> {
        self.position(id).map(|position| &self.tiles[position])
    }

    pub(crate) fn get_mut(&mut self, id: TileId) -> Option<&mut Tile> {
        let position = self.position(id)?;
        self.tiles.get_mut(position)
    }

    pub(crate) fn number(&self, id: TileId) -> Option<u32> {
        self.get(id).map(|tile| tile.number)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Tile> {
        self.tiles.iter_mut()
    }

    pub(crate) fn len(&self) -> usize {
        self.tiles.len()
    }

    /// Highest number carried by any tile; `None` for an empty board.
    pub(crate) fn max_number(&self) -> Option<u32> {
        self.tiles.iter().map(|tile| tile.number).max()
    }

    /// Tiles carrying exactly `number`, in identifier order.
    pub(crate) fn filter_by_number(&self, number: u32) -> Vec<TileId> {
        self.tiles
            .iter()
            .filter(|tile| tile.number == number)
            .map(|tile| tile.id)
            .collect()
    }

    /// Drops every tile. Identities are never handed out twice.
    pub(crate) fn clear(&mut self) {
        self.tiles.clear();
    }

    fn position(&self, id: TileId) -> Option<usize> {
        self.tiles
            .binary_search_by_key(&id, |tile| tile.id)
            .ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocation_is_monotonic_across_clears() {
        let mut store = TileStore::default();
        let first = store.allocate(1, CellCoord::new(0, 0));
        store.insert(first);
        store.clear();
        let second = store.allocate(2, CellCoord::new(0, 0));
        assert!(second.id > TileId::new(0));
    }

    #[test]
    fn max_and_filter_follow_numbers() {
        let mut store = TileStore::default();
        for (index, number) in [3, 12, 6, 12].into_iter().enumerate() {
            let column = i32::try_from(index).expect("small index");
            let tile = store.allocate(number, CellCoord::new(column, 0));
            store.insert(tile);
        }
        assert_eq!(store.max_number(), Some(12));
        assert_eq!(
            store.filter_by_number(12),
            vec![TileId::new(1), TileId::new(3)]
        );
        assert!(store.filter_by_number(24).is_empty());
    }

    #[test]
    fn empty_store_has_no_maximum() {
        assert_eq!(TileStore::default().max_number(), None);
    }

    #[test]
    fn remove_returns_the_tile_once() {
        let mut store = TileStore::default();
        let tile = store.allocate(3, CellCoord::new(1, 1));
        let id = tile.id;
        store.insert(tile);
        assert_eq!(store.remove(id).map(|tile| tile.number), Some(3));
        assert!(store.remove(id).is_none());
        assert_eq!(store.len(), 0);
    }
}
