//! Ordered amount index over side-2 records
//!
//! Side-2 records are bucketed by exact amount in an ordered map. Each
//! bucket is a FIFO queue in original side-2 input order, so records that
//! share an amount are claimed first-come-first-served. Range queries are
//! read-only and safe for concurrent callers; claiming is serialized per
//! bucket by the bucket's own lock.

use std::collections::{BTreeMap, VecDeque};
use std::sync::{Mutex, PoisonError};

use crate::types::{Amount, Record};

/// A side-2 record together with its original input position
#[derive(Debug, Clone, Copy)]
struct IndexEntry {
    seq: usize,
    record: Record,
}

/// Ordered index of not-yet-claimed side-2 records, bucketed by amount.
///
/// The index is built once per reconciliation call and fully consumed by the
/// end of that call: every record is either claimed into exactly one match
/// or drained as a leftover. A claim is one-time and irreversible; a claimed
/// record is never visible to a later query.
#[derive(Debug)]
pub struct AmountIndex {
    buckets: BTreeMap<Amount, Mutex<VecDeque<IndexEntry>>>,
}

impl AmountIndex {
    /// Build the index from side-2 records in input order
    pub fn build(side2: &[Record]) -> Self {
        let mut buckets: BTreeMap<Amount, VecDeque<IndexEntry>> = BTreeMap::new();
        for (seq, record) in side2.iter().enumerate() {
            buckets
                .entry(record.amount)
                .or_default()
                .push_back(IndexEntry {
                    seq,
                    record: *record,
                });
        }
        Self {
            buckets: buckets
                .into_iter()
                .map(|(amount, queue)| (amount, Mutex::new(queue)))
                .collect(),
        }
    }

    /// Amounts in `[lo, hi]` with their available record counts, ascending.
    ///
    /// Read-only; each bucket lock is held just long enough to read its
    /// length. An inverted range (`lo > hi`) yields nothing.
    pub fn query_range(&self, lo: Amount, hi: Amount) -> Vec<(Amount, usize)> {
        if lo > hi {
            return Vec::new();
        }
        self.buckets
            .range(lo..=hi)
            .map(|(amount, bucket)| {
                let queue = bucket.lock().unwrap_or_else(PoisonError::into_inner);
                (*amount, queue.len())
            })
            .filter(|(_, available)| *available > 0)
            .collect()
    }

    /// Atomically claim the oldest still-available record at this exact
    /// amount, or `None` if the bucket is empty or absent.
    pub fn claim(&self, amount: Amount) -> Option<Record> {
        let bucket = self.buckets.get(&amount)?;
        let mut queue = bucket.lock().unwrap_or_else(PoisonError::into_inner);
        queue.pop_front().map(|entry| entry.record)
    }

    /// Consume every remaining record, returned in original side-2 input
    /// order. Each record is yielded exactly once.
    pub fn drain(self) -> Vec<Record> {
        let mut leftovers: Vec<IndexEntry> = self
            .buckets
            .into_values()
            .flat_map(|bucket| bucket.into_inner().unwrap_or_else(PoisonError::into_inner))
            .collect();
        leftovers.sort_by_key(|entry| entry.seq);
        leftovers.into_iter().map(|entry| entry.record).collect()
    }

    /// Total records still available across all buckets
    pub fn available(&self) -> usize {
        self.buckets
            .values()
            .map(|bucket| bucket.lock().unwrap_or_else(PoisonError::into_inner).len())
            .sum()
    }
}
