//! Reconciliation engine: amount index, candidate selection, and the
//! two-phase matcher

pub mod index;
pub mod matcher;
pub mod selector;

pub use index::AmountIndex;
pub use matcher::{reconcile, Reconciler};
pub use selector::CandidateSelector;
