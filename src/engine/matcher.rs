//! Two-phase reconciliation matcher
//!
//! Matching runs in two phases. *Proposing* scans side 1 in parallel and is
//! strictly read-only: every side-1 record gets a tentative bucket proposal
//! against the freshly built index. *Committing* then walks side 1
//! sequentially in input order, claims proposed buckets, and re-proposes at
//! most once when an earlier commit emptied a bucket first. Confining all
//! mutation to the sequential phase makes the result identical to a purely
//! sequential run, whatever the worker count: letting parallel workers both
//! peek and poll the same bucket can hand one record to two claimants or
//! skip a valid match, and the two-phase split removes both failure modes.

use rayon::prelude::*;
use tracing::debug;

use crate::engine::index::AmountIndex;
use crate::engine::selector::CandidateSelector;
use crate::report::ReconcileReport;
use crate::types::{Amount, MatchOutcome, ReconcileError, ReconcileResult, Record};
use crate::utils::validation;

/// Reconcile two sides of records with the default worker configuration.
///
/// Convenience wrapper over [`Reconciler::reconcile`].
pub fn reconcile(
    side1: &[Record],
    side2: &[Record],
    variance: Amount,
) -> ReconcileResult<Vec<MatchOutcome>> {
    Reconciler::new().reconcile(side1, side2, variance)
}

/// The reconciliation engine.
///
/// A `Reconciler` is a pure function of its inputs: no state survives a
/// call, and the amount index built for one call is fully consumed by it.
/// The output order is a contract callers may rely on: all side-1 outcomes
/// in side-1 input order, then all side-2 leftovers in side-2 input order.
#[derive(Debug, Clone, Default)]
pub struct Reconciler {
    workers: Option<usize>,
}

impl Reconciler {
    /// Create a reconciler using the global rayon pool for proposing
    pub fn new() -> Self {
        Self { workers: None }
    }

    /// Create a reconciler with a pinned worker count for the proposing
    /// phase. The worker count never affects the output, only how the
    /// read-only proposing work is spread; `1` forces a sequential scan.
    pub fn with_workers(workers: usize) -> Self {
        Self {
            workers: Some(workers.max(1)),
        }
    }

    /// Reconcile `side1` against `side2` within `variance`.
    ///
    /// Every input record is accounted for in exactly one outcome; a
    /// `Matched` outcome accounts for one record from each side, so the
    /// output holds `side1.len() + side2.len() - matched` entries.
    /// Structural errors (negative variance, amount window overflow) abort
    /// before any record is claimed.
    pub fn reconcile(
        &self,
        side1: &[Record],
        side2: &[Record],
        variance: Amount,
    ) -> ReconcileResult<Vec<MatchOutcome>> {
        validation::validate_variance(variance)?;
        validation::validate_amount_windows(side1, variance)?;

        let index = AmountIndex::build(side2);
        let selector = CandidateSelector::new(variance);

        let proposals = self.propose_all(side1, &index, &selector)?;
        debug!(
            side1_len = side1.len(),
            side2_len = side2.len(),
            proposed = proposals.iter().filter(|p| p.is_some()).count(),
            "proposing phase complete"
        );

        let mut outcomes = Vec::with_capacity(side1.len() + side2.len());
        for (record, proposal) in side1.iter().zip(proposals) {
            outcomes.push(commit_one(&index, &selector, record, proposal, variance));
        }

        let matched = outcomes.iter().filter(|o| o.is_matched()).count();
        let unmatched_side1 = outcomes.len() - matched;

        let leftovers = index.drain();
        debug!(
            matched,
            unmatched_side1,
            unmatched_side2 = leftovers.len(),
            "committing phase complete"
        );
        for record in leftovers {
            outcomes.push(MatchOutcome::UnmatchedSide2 {
                side2_id: record.id,
                amount: record.amount,
            });
        }

        Ok(outcomes)
    }

    /// Reconcile and wrap the outcomes in a [`ReconcileReport`] rendered at
    /// the given decimal scale.
    pub fn reconcile_report(
        &self,
        side1: &[Record],
        side2: &[Record],
        variance: Amount,
        scale: u8,
    ) -> ReconcileResult<ReconcileReport> {
        let outcomes = self.reconcile(side1, side2, variance)?;
        Ok(ReconcileReport::new(outcomes, scale))
    }

    /// Proposing phase: one read-only bucket proposal per side-1 record,
    /// input order preserved.
    fn propose_all(
        &self,
        side1: &[Record],
        index: &AmountIndex,
        selector: &CandidateSelector,
    ) -> ReconcileResult<Vec<Option<Amount>>> {
        let propose = |record: &Record| selector.propose(index, record.amount);

        match self.workers {
            Some(workers) => {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(workers)
                    .build()
                    .map_err(|e| ReconcileError::WorkerPool(e.to_string()))?;
                Ok(pool.install(|| side1.par_iter().map(propose).collect()))
            }
            None => Ok(side1.par_iter().map(propose).collect()),
        }
    }
}

/// Commit a single side-1 record: claim its proposed bucket, or re-propose
/// against the current index state and retry the claim exactly once.
///
/// The single retry is what makes the sequential commit equivalent to a
/// fully sequential run: nothing else mutates the index between the
/// re-proposal and its claim.
fn commit_one(
    index: &AmountIndex,
    selector: &CandidateSelector,
    record: &Record,
    proposal: Option<Amount>,
    variance: Amount,
) -> MatchOutcome {
    let claimed = proposal
        .and_then(|bucket| try_claim(index, record.amount, bucket, variance))
        .or_else(|| {
            selector
                .propose(index, record.amount)
                .and_then(|bucket| try_claim(index, record.amount, bucket, variance))
        });

    match claimed {
        Some((matched, diff)) => MatchOutcome::Matched {
            side1_id: record.id,
            side2_id: matched.id,
            amount1: record.amount,
            amount2: matched.amount,
            diff,
        },
        None => MatchOutcome::UnmatchedSide1 {
            side1_id: record.id,
            amount: record.amount,
        },
    }
}

/// Claim the oldest record in `bucket` if the bucket is still within
/// variance of `amount`. The in-range check runs before the claim, so a
/// failed check never consumes a record.
fn try_claim(
    index: &AmountIndex,
    amount: Amount,
    bucket: Amount,
    variance: Amount,
) -> Option<(Record, Amount)> {
    let diff = amount.abs_diff(bucket).filter(|d| *d <= variance)?;
    index.claim(bucket).map(|record| (record, diff))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: i64, units: i64) -> Record {
        Record::new(id, Amount::from_minor_units(units))
    }

    fn units(n: i64) -> Amount {
        Amount::from_minor_units(n)
    }

    #[test]
    fn test_zero_variance_exact_match() {
        let outcomes = reconcile(&[record(1, 500)], &[record(9, 500)], units(0)).unwrap();
        assert_eq!(
            outcomes,
            vec![MatchOutcome::Matched {
                side1_id: 1,
                side2_id: 9,
                amount1: units(500),
                amount2: units(500),
                diff: units(0),
            }]
        );
    }

    #[test]
    fn test_tie_break_prefers_lower_amount() {
        let outcomes = reconcile(
            &[record(1, 400)],
            &[record(8, 350), record(9, 450)],
            units(50),
        )
        .unwrap();
        assert_eq!(
            outcomes,
            vec![
                MatchOutcome::Matched {
                    side1_id: 1,
                    side2_id: 8,
                    amount1: units(400),
                    amount2: units(350),
                    diff: units(50),
                },
                MatchOutcome::UnmatchedSide2 {
                    side2_id: 9,
                    amount: units(450),
                },
            ]
        );
    }

    #[test]
    fn test_fifo_fairness_among_equal_amounts() {
        let outcomes = reconcile(
            &[record(1, 500), record(2, 500)],
            &[record(8, 500), record(9, 500)],
            units(0),
        )
        .unwrap();
        assert_eq!(
            outcomes,
            vec![
                MatchOutcome::Matched {
                    side1_id: 1,
                    side2_id: 8,
                    amount1: units(500),
                    amount2: units(500),
                    diff: units(0),
                },
                MatchOutcome::Matched {
                    side1_id: 2,
                    side2_id: 9,
                    amount1: units(500),
                    amount2: units(500),
                    diff: units(0),
                },
            ]
        );
    }

    #[test]
    fn test_commit_retry_after_bucket_exhausted() {
        // Both side-1 records propose the single record at 500 during the
        // read-only phase; the second commit must fall back to 520.
        let outcomes = reconcile(
            &[record(1, 500), record(2, 500)],
            &[record(8, 500), record(9, 520)],
            units(50),
        )
        .unwrap();
        assert_eq!(
            outcomes,
            vec![
                MatchOutcome::Matched {
                    side1_id: 1,
                    side2_id: 8,
                    amount1: units(500),
                    amount2: units(500),
                    diff: units(0),
                },
                MatchOutcome::Matched {
                    side1_id: 2,
                    side2_id: 9,
                    amount1: units(500),
                    amount2: units(520),
                    diff: units(20),
                },
            ]
        );
    }

    #[test]
    fn test_empty_side2_leaves_side1_unmatched_in_order() {
        let outcomes = reconcile(&[record(1, 400), record(2, 600)], &[], units(100)).unwrap();
        assert_eq!(
            outcomes,
            vec![
                MatchOutcome::UnmatchedSide1 {
                    side1_id: 1,
                    amount: units(400),
                },
                MatchOutcome::UnmatchedSide1 {
                    side1_id: 2,
                    amount: units(600),
                },
            ]
        );
    }

    #[test]
    fn test_empty_side1_drains_side2_in_order() {
        let outcomes = reconcile(&[], &[record(9, 300), record(8, 100)], units(100)).unwrap();
        assert_eq!(
            outcomes,
            vec![
                MatchOutcome::UnmatchedSide2 {
                    side2_id: 9,
                    amount: units(300),
                },
                MatchOutcome::UnmatchedSide2 {
                    side2_id: 8,
                    amount: units(100),
                },
            ]
        );
    }

    #[test]
    fn test_negative_variance_rejected() {
        let result = reconcile(&[record(1, 400)], &[record(9, 400)], units(-1));
        assert!(matches!(result, Err(ReconcileError::InvalidVariance(_))));
    }

    #[test]
    fn test_window_overflow_rejected_before_claiming() {
        let result = reconcile(
            &[record(1, i64::MAX)],
            &[record(9, 400)],
            units(1),
        );
        assert!(matches!(result, Err(ReconcileError::AmountOverflow(_))));
    }

    #[test]
    fn test_every_record_accounted_for_exactly_once() {
        let side1 = [record(1, 400), record(2, 600), record(3, 500)];
        let side2 = [record(9, 300), record(8, 500), record(10, 400)];
        let outcomes = reconcile(&side1, &side2, units(100)).unwrap();

        let matched = outcomes.iter().filter(|o| o.is_matched()).count();
        let unmatched1 = outcomes
            .iter()
            .filter(|o| matches!(o, MatchOutcome::UnmatchedSide1 { .. }))
            .count();
        let unmatched2 = outcomes
            .iter()
            .filter(|o| matches!(o, MatchOutcome::UnmatchedSide2 { .. }))
            .count();

        // A matched pair accounts for one record from each side.
        assert_eq!(matched * 2 + unmatched1 + unmatched2, side1.len() + side2.len());
        assert_eq!(outcomes.len(), side1.len() + side2.len() - matched);
    }

    #[test]
    fn test_fully_matched_sides_emit_one_outcome_per_pair() {
        let outcomes = reconcile(&[record(1, 500)], &[record(9, 500)], units(0)).unwrap();
        assert_eq!(outcomes.len(), 1);
        assert!(outcomes[0].is_matched());
    }

    #[test]
    fn test_mixed_matches_and_leftovers() {
        // side1 = [(1, 4), (2, 6), (3, 5)], side2 = [(9, 3), (8, 5), (10, 4)],
        // variance 1: record 1 takes its exact amount, record 2 takes 5
        // within variance, and record 3 is left with only 3, out of range.
        let outcomes = reconcile(
            &[record(1, 4), record(2, 6), record(3, 5)],
            &[record(9, 3), record(8, 5), record(10, 4)],
            units(1),
        )
        .unwrap();
        assert_eq!(
            outcomes,
            vec![
                MatchOutcome::Matched {
                    side1_id: 1,
                    side2_id: 10,
                    amount1: units(4),
                    amount2: units(4),
                    diff: units(0),
                },
                MatchOutcome::Matched {
                    side1_id: 2,
                    side2_id: 8,
                    amount1: units(6),
                    amount2: units(5),
                    diff: units(1),
                },
                MatchOutcome::UnmatchedSide1 {
                    side1_id: 3,
                    amount: units(5),
                },
                MatchOutcome::UnmatchedSide2 {
                    side2_id: 9,
                    amount: units(3),
                },
            ]
        );
    }
}
