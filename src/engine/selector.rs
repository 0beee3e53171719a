//! Candidate selection over the amount index
//!
//! The selector is the read-only half of the matcher: it proposes the best
//! available amount bucket for a side-1 record without mutating anything.
//! Claiming is deferred to the committing phase, so two concurrent
//! selectors may legitimately propose the same bucket.

use crate::engine::index::AmountIndex;
use crate::types::Amount;

/// Deterministic best-candidate selection for a configured variance.
///
/// Policy: among non-empty buckets in `[amount - variance, amount + variance]`,
/// pick the one minimizing the absolute difference to the side-1 amount; on
/// an exact tie, prefer the lower candidate amount. FIFO among records with
/// equal amounts is the bucket's own queue order.
#[derive(Debug, Clone, Copy)]
pub struct CandidateSelector {
    variance: Amount,
}

impl CandidateSelector {
    /// Create a selector for the given variance
    pub fn new(variance: Amount) -> Self {
        Self { variance }
    }

    /// Propose the best available bucket for this amount, or `None` when no
    /// in-range bucket has records left.
    ///
    /// Range bounds use checked arithmetic; inputs are validated up front so
    /// an overflowing bound cannot occur here, but an overflow still yields
    /// a clean "no candidate" rather than wrapping.
    pub fn propose(&self, index: &AmountIndex, amount: Amount) -> Option<Amount> {
        let lo = amount.checked_sub(self.variance)?;
        let hi = amount.checked_add(self.variance)?;

        let mut best: Option<(Amount, Amount)> = None; // (diff, bucket amount)
        for (candidate, _available) in index.query_range(lo, hi) {
            let diff = amount.abs_diff(candidate)?;
            match best {
                // Strict comparison keeps the first (lowest) bucket on ties,
                // since query_range ascends by amount.
                Some((best_diff, _)) if diff >= best_diff => {}
                _ => best = Some((diff, candidate)),
            }
        }
        best.map(|(_, candidate)| candidate)
    }
}
