//! Bounded placement search.
//!
//! Candidate placements are examined tier by tier. Each examined candidate
//! costs one attempt; when the budget runs out the search gives up and the
//! caller records a shortfall instead of looping forever.
//!
//! # Algorithm
//!
//! Candidates are split into four tiers:
//!
//! 1. preferred starts (ending on `:30`) on days the component has not used
//! 2. remaining starts on unused days
//! 3. preferred starts on used days
//! 4. remaining starts on used days
//!
//! Under [`SearchStrategy::Randomized`] each tier is shuffled before it is
//! walked, so repeated runs spread meetings differently while still
//! honoring the tier order. [`SearchStrategy::Ordered`] walks each tier in
//! day-then-slot order and is fully deterministic.

use rand::Rng;
use rand::seq::SliceRandom;
use std::collections::BTreeSet;

use crate::config::SearchStrategy;
use crate::models::{DayIndex, Placement, SlotIndex};

/// Builds the four candidate tiers for a component of `len` slots.
pub fn candidate_tiers(
    day_count: usize,
    preferred: &[SlotIndex],
    remaining: &[SlotIndex],
    len: usize,
    used_days: &BTreeSet<DayIndex>,
) -> Vec<Vec<Placement>> {
    let (fresh, used): (Vec<DayIndex>, Vec<DayIndex>) =
        (0..day_count).partition(|d| !used_days.contains(d));
    let expand = |days: &[DayIndex], starts: &[SlotIndex]| -> Vec<Placement> {
        days.iter()
            .flat_map(|&day| starts.iter().map(move |&start| Placement::new(day, start, len)))
            .collect()
    };
    vec![
        expand(&fresh, preferred),
        expand(&fresh, remaining),
        expand(&used, preferred),
        expand(&used, remaining),
    ]
}

/// An attempt-limited walk over candidate tiers.
#[derive(Debug, Clone)]
pub struct BoundedSearch {
    strategy: SearchStrategy,
    max_attempts: usize,
    attempts: usize,
}

impl BoundedSearch {
    /// Creates a search with an attempt budget.
    pub fn new(strategy: SearchStrategy, max_attempts: usize) -> Self {
        Self {
            strategy,
            max_attempts,
            attempts: 0,
        }
    }

    /// Attempts spent so far.
    pub fn attempts(&self) -> usize {
        self.attempts
    }

    /// Whether the budget is spent.
    pub fn is_exhausted(&self) -> bool {
        self.attempts >= self.max_attempts
    }

    /// Returns the first candidate `accept` approves, or `None` once the
    /// tiers or the budget run out.
    pub fn find<R, F>(
        &mut self,
        mut tiers: Vec<Vec<Placement>>,
        rng: &mut R,
        mut accept: F,
    ) -> Option<Placement>
    where
        R: Rng + ?Sized,
        F: FnMut(&Placement) -> bool,
    {
        for tier in &mut tiers {
            if self.strategy == SearchStrategy::Randomized {
                tier.shuffle(rng);
            }
            for candidate in tier.iter() {
                if self.is_exhausted() {
                    return None;
                }
                self.attempts += 1;
                if accept(candidate) {
                    return Some(*candidate);
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    #[test]
    fn test_tiers_prefer_unused_days() {
        let used: BTreeSet<DayIndex> = [1].into_iter().collect();
        let tiers = candidate_tiers(3, &[2], &[5, 6], 3, &used);
        assert_eq!(tiers.len(), 4);
        assert_eq!(tiers[0], vec![Placement::new(0, 2, 3), Placement::new(2, 2, 3)]);
        assert_eq!(tiers[1].len(), 4);
        assert_eq!(tiers[2], vec![Placement::new(1, 2, 3)]);
        assert_eq!(tiers[3].len(), 2);
    }

    #[test]
    fn test_ordered_returns_first_acceptable() {
        let mut rng = SmallRng::seed_from_u64(42);
        let mut search = BoundedSearch::new(SearchStrategy::Ordered, 100);
        let tiers = candidate_tiers(5, &[2, 7], &[4], 3, &BTreeSet::new());
        let found = search.find(tiers, &mut rng, |p| p.day == 1);
        assert_eq!(found, Some(Placement::new(1, 2, 3)));
        // days 0 (two preferred starts) then day 1 first start
        assert_eq!(search.attempts(), 3);
    }

    #[test]
    fn test_budget_caps_attempts() {
        let mut rng = SmallRng::seed_from_u64(42);
        let mut search = BoundedSearch::new(SearchStrategy::Randomized, 5);
        let tiers = candidate_tiers(5, &[2, 7], &[4], 3, &BTreeSet::new());
        assert!(search.find(tiers, &mut rng, |_| false).is_none());
        assert_eq!(search.attempts(), 5);
        assert!(search.is_exhausted());

        let tiers = candidate_tiers(5, &[2, 7], &[4], 3, &BTreeSet::new());
        assert!(search.find(tiers, &mut rng, |_| true).is_none());
    }

    #[test]
    fn test_randomized_respects_tier_order() {
        let mut rng = SmallRng::seed_from_u64(42);
        let used: BTreeSet<DayIndex> = [0, 1, 2].into_iter().collect();
        for _ in 0..20 {
            let mut search = BoundedSearch::new(SearchStrategy::Randomized, 1000);
            let tiers = candidate_tiers(5, &[2, 7], &[4], 3, &used);
            let found = search.find(tiers, &mut rng, |_| true).unwrap();
            assert!(found.day >= 3);
            assert!(found.start == 2 || found.start == 7);
        }
    }
}
