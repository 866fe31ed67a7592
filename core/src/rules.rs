//! Numeric rules that decide which tiles merge and what they are worth.

use std::fmt;

/// Rule set consulted by the world whenever two tiles meet.
///
/// The world never interprets tile numbers itself. Merge eligibility, the
/// value produced by a merge and the score of a tile are all delegated to the
/// active rule set so alternative variants can be plugged in.
pub trait MergeRule: fmt::Debug {
    /// Reports whether `mover` may merge into `target`.
    ///
    /// Either side may be `None` when the corresponding cell is empty. Rule
    /// sets must return a defined answer in that case; the world treats an
    /// empty cell that "conflicts" as a free resting slot.
    fn conflicts(&self, mover: Option<u32>, target: Option<u32>) -> bool;

    /// Number carried by `target` after it absorbs `mover`.
    fn merged_number(&self, target: u32, mover: u32) -> u32;

    /// Score awarded for a single tile carrying `number`.
    fn score_for(&self, number: u32) -> u64;

    /// Smallest number produced by a merge.
    ///
    /// Acts as the first scoring tier and as the highlight threshold: boards
    /// whose maximum does not exceed it never highlight anything.
    fn base_number(&self) -> u32;
}

/// Classic rules: 1 and 2 combine into 3, equal numbers from 3 upward double.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ThreesRules;

/// Smallest mergeable value under [`ThreesRules`].
pub const THREES_BASE_NUMBER: u32 = 3;

impl MergeRule for ThreesRules {
    fn conflicts(&self, mover: Option<u32>, target: Option<u32>) -> bool {
        let (Some(mover), Some(target)) = (mover, target) else {
            return true;
        };
        let sum = mover.saturating_add(target);
        if sum == THREES_BASE_NUMBER {
            return true;
        }
        sum >= 2 * THREES_BASE_NUMBER && mover == target
    }

    fn merged_number(&self, target: u32, mover: u32) -> u32 {
        target.saturating_add(mover)
    }

    fn score_for(&self, number: u32) -> u64 {
        if number < THREES_BASE_NUMBER || number % THREES_BASE_NUMBER != 0 {
            return 0;
        }
        let ratio = number / THREES_BASE_NUMBER;
        if !ratio.is_power_of_two() {
            return 0;
        }
        3_u64.saturating_pow(ratio.trailing_zeros() + 1)
    }

    fn base_number(&self) -> u32 {
        THREES_BASE_NUMBER
    }
}
