//! Completion barrier for asynchronous per-tile acknowledgements.

use std::collections::BTreeSet;

use threes_core::TileId;

/// Outcome of feeding one acknowledgement into a [`SettlementBarrier`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Acknowledgement {
    /// The tile was expected and others are still outstanding.
    Pending,
    /// The tile was the last one outstanding.
    Complete,
    /// The tile was not expected or already acknowledged.
    Ignored,
}

/// Fires once every expected tile acknowledged exactly once.
///
/// Keyed by tile identity, so a duplicate signal from the same tile cannot
/// complete the barrier early.
#[derive(Clone, Debug, Default)]
pub(crate) struct SettlementBarrier {
    outstanding: BTreeSet<TileId>,
}

impl SettlementBarrier {
    pub(crate) fn new(expected: impl IntoIterator<Item = TileId>) -> Self {
        Self {
            outstanding: expected.into_iter().collect(),
        }
    }

    pub(crate) fn acknowledge(&mut self, tile: TileId) -> Acknowledgement {
        if !self.outstanding.remove(&tile) {
            return Acknowledgement::Ignored;
        }
        if self.outstanding.is_empty() {
            Acknowledgement::Complete
        } else {
            Acknowledgement::Pending
        }
    }

    pub(crate) fn remaining(&self) -> usize {
        self.outstanding.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completes_after_every_expected_tile() {
        let mut barrier = SettlementBarrier::new([TileId::new(1), TileId::new(2)]);
        assert_eq!(barrier.acknowledge(TileId::new(2)), Acknowledgement::Pending);
        assert_eq!(barrier.remaining(), 1);
        assert_eq!(barrier.acknowledge(TileId::new(1)), Acknowledgement::Complete);
    }

    #[test]
    fn duplicate_signals_do_not_count_twice() {
        let mut barrier = SettlementBarrier::new([TileId::new(1), TileId::new(2)]);
        assert_eq!(barrier.acknowledge(TileId::new(1)), Acknowledgement::Pending);
        assert_eq!(barrier.acknowledge(TileId::new(1)), Acknowledgement::Ignored);
        assert_eq!(barrier.remaining(), 1);
    }

    #[test]
    fn unknown_tiles_are_ignored() {
        let mut barrier = SettlementBarrier::new([TileId::new(1)]);
        assert_eq!(barrier.acknowledge(TileId::new(9)), Acknowledgement::Ignored);
        assert_eq!(barrier.remaining(), 1);
    }
}
