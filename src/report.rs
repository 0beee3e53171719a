//! Ordered reconciliation report with text rendering

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::{Amount, MatchOutcome};

/// The assembled result of one reconciliation call.
///
/// Outcomes are held in the engine's contractual order: all side-1 outcomes
/// in side-1 input order, then all side-2 leftovers in side-2 input order.
/// `Display` renders one line per outcome with amounts at the report's
/// decimal scale:
///
/// ```text
/// Side1: 1 (4.00) <-> Side2: 10 (4.00)
/// Side1: 3 (5.00) <-> No Match
/// Side2: 9 (3.00) <-> No Match
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileReport {
    outcomes: Vec<MatchOutcome>,
    scale: u8,
}

impl ReconcileReport {
    /// Wrap an ordered outcome sequence for rendering at the given scale
    pub fn new(outcomes: Vec<MatchOutcome>, scale: u8) -> Self {
        Self { outcomes, scale }
    }

    /// The outcomes in contractual order
    pub fn outcomes(&self) -> &[MatchOutcome] {
        &self.outcomes
    }

    /// Decimal scale used when rendering amounts
    pub fn scale(&self) -> u8 {
        self.scale
    }

    /// Total number of outcomes: one per matched pair plus one per
    /// unmatched record on either side
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    /// Whether the report holds no outcomes at all
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Number of matched pairs
    pub fn matched_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_matched()).count()
    }

    /// Number of side-1 records left without a match
    pub fn unmatched_side1_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, MatchOutcome::UnmatchedSide1 { .. }))
            .count()
    }

    /// Number of side-2 records left without a match
    pub fn unmatched_side2_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, MatchOutcome::UnmatchedSide2 { .. }))
            .count()
    }

    /// Sum of the absolute differences across all matched pairs, `None` on
    /// overflow
    pub fn total_diff(&self) -> Option<Amount> {
        self.outcomes
            .iter()
            .try_fold(Amount::from_minor_units(0), |total, outcome| {
                match outcome {
                    MatchOutcome::Matched { diff, .. } => total.checked_add(*diff),
                    _ => Some(total),
                }
            })
    }

    fn render_line(&self, outcome: &MatchOutcome, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match outcome {
            MatchOutcome::Matched {
                side1_id,
                side2_id,
                amount1,
                amount2,
                ..
            } => writeln!(
                f,
                "Side1: {} ({}) <-> Side2: {} ({})",
                side1_id,
                amount1.to_decimal(self.scale),
                side2_id,
                amount2.to_decimal(self.scale)
            ),
            MatchOutcome::UnmatchedSide1 { side1_id, amount } => writeln!(
                f,
                "Side1: {} ({}) <-> No Match",
                side1_id,
                amount.to_decimal(self.scale)
            ),
            MatchOutcome::UnmatchedSide2 { side2_id, amount } => writeln!(
                f,
                "Side2: {} ({}) <-> No Match",
                side2_id,
                amount.to_decimal(self.scale)
            ),
        }
    }
}

impl fmt::Display for ReconcileReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for outcome in &self.outcomes {
            self.render_line(outcome, f)?;
        }
        Ok(())
    }
}
