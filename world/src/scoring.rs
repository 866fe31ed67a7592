//! Tiered end-of-game score reveal.

use threes_core::{Event, MergeRule, TileId};

use crate::{
    settlement::{Acknowledgement, SettlementBarrier},
    tiles::TileStore,
};

/// Whether the sweep still waits for acknowledgements.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum SweepProgress {
    Waiting,
    Done,
}

/// Walks the doubling tiers from the base number up to the board maximum.
///
/// Each non-empty tier asks every tile of that value to reveal its score and
/// then waits until each of them acknowledged. Empty tiers are skipped without
/// waiting.
#[derive(Clone, Debug)]
pub(crate) struct ScoreSweep {
    current: u32,
    max: u32,
    total: u64,
    tier_len: u64,
    barrier: SettlementBarrier,
}

impl ScoreSweep {
    pub(crate) fn new(base_number: u32, max: u32) -> Self {
        Self {
            current: base_number.max(1),
            max,
            total: 0,
            tier_len: 0,
            barrier: SettlementBarrier::default(),
        }
    }

    /// Requests reveals for the next non-empty tier or reports the total.
    pub(crate) fn advance(
        &mut self,
        tiles: &TileStore,
        rules: &dyn MergeRule,
        out_events: &mut Vec<Event>,
    ) -> SweepProgress {
        loop {
            if self.current > self.max {
                return self.finish(out_events);
            }

            let tier = tiles.filter_by_number(self.current);
            if tier.is_empty() {
                if !self.next_tier() {
                    return self.finish(out_events);
                }
                continue;
            }

            let score = rules.score_for(self.current);
            for &tile in &tier {
                out_events.push(Event::ScoreRevealRequested {
                    tile,
                    number: self.current,
                    score,
                });
            }
            self.tier_len = u64::try_from(tier.len()).unwrap_or(u64::MAX);
            self.barrier = SettlementBarrier::new(tier);
            return SweepProgress::Waiting;
        }
    }

    /// Records that a tile finished revealing its score.
    pub(crate) fn acknowledge(
        &mut self,
        tile: TileId,
        tiles: &TileStore,
        rules: &dyn MergeRule,
        out_events: &mut Vec<Event>,
    ) -> SweepProgress {
        match self.barrier.acknowledge(tile) {
            Acknowledgement::Pending | Acknowledgement::Ignored => SweepProgress::Waiting,
            Acknowledgement::Complete => {
                let tier_score = self
                    .tier_len
                    .saturating_mul(rules.score_for(self.current));
                self.total = self.total.saturating_add(tier_score);
                if !self.next_tier() {
                    return self.finish(out_events);
                }
                self.advance(tiles, rules, out_events)
            }
        }
    }

    pub(crate) fn outstanding(&self) -> usize {
        self.barrier.remaining()
    }

    fn next_tier(&mut self) -> bool {
        match self.current.checked_mul(2) {
            Some(next) => {
                self.current = next;
                true
            }
            None => false,
        }
    }

    fn finish(&self, out_events: &mut Vec<Event>) -> SweepProgress {
        out_events.push(Event::ScoreDone { total: self.total });
        SweepProgress::Done
    }
}

#[cfg(test)]
mod tests {
    use threes_core::{CellCoord, ThreesRules};

    use super::*;

    #[test]
    fn tier_overflow_ends_the_sweep() {
        let tiles = TileStore::default();
        let mut sweep = ScoreSweep::new(3, u32::MAX);
        let mut events = Vec::new();

        assert_eq!(
            sweep.advance(&tiles, &ThreesRules, &mut events),
            SweepProgress::Done
        );
        assert_eq!(events, vec![Event::ScoreDone { total: 0 }]);
    }

    #[test]
    fn acknowledgement_moves_to_the_next_tier() {
        let mut tiles = TileStore::default();
        for (column, number) in [(0, 3), (1, 6)] {
            let tile = tiles.allocate(number, CellCoord::new(column, 0));
            tiles.insert(tile);
        }
        let mut sweep = ScoreSweep::new(3, 6);
        let mut events = Vec::new();

        assert_eq!(
            sweep.advance(&tiles, &ThreesRules, &mut events),
            SweepProgress::Waiting
        );
        assert_eq!(sweep.outstanding(), 1);

        events.clear();
        assert_eq!(
            sweep.acknowledge(TileId::new(0), &tiles, &ThreesRules, &mut events),
            SweepProgress::Waiting
        );
        assert_eq!(
            events,
            vec![Event::ScoreRevealRequested {
                tile: TileId::new(1),
                number: 6,
                score: 9,
            }]
        );

        events.clear();
        assert_eq!(
            sweep.acknowledge(TileId::new(1), &tiles, &ThreesRules, &mut events),
            SweepProgress::Done
        );
        assert_eq!(events, vec![Event::ScoreDone { total: 12 }]);
    }
}
