//! Validation utilities
//!
//! Structural checks run before the matcher touches the index, so a
//! rejected call never leaves partial results behind.

use crate::types::{Amount, ReconcileError, ReconcileResult, Record};

/// Validate that a variance is non-negative
pub fn validate_variance(variance: Amount) -> ReconcileResult<()> {
    if variance.is_negative() {
        Err(ReconcileError::InvalidVariance(format!(
            "Variance must be non-negative, got {} minor units",
            variance.minor_units()
        )))
    } else {
        Ok(())
    }
}

/// Validate that every side-1 candidate window `[amount - variance,
/// amount + variance]` stays within the representable amount range.
///
/// Side-2 amounts need no window: the index only ever compares them by
/// exact value, and the difference to a claimed candidate is bounded by a
/// window already proven representable here.
pub fn validate_amount_windows(side1: &[Record], variance: Amount) -> ReconcileResult<()> {
    for record in side1 {
        if record.amount.checked_sub(variance).is_none()
            || record.amount.checked_add(variance).is_none()
        {
            return Err(ReconcileError::AmountOverflow(format!(
                "Record {} amount {} minor units with variance {} exceeds the representable range",
                record.id,
                record.amount.minor_units(),
                variance.minor_units()
            )));
        }
    }
    Ok(())
}
