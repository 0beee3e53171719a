//! Core types and data structures for the reconciliation engine

use bigdecimal::num_bigint::BigInt;
use bigdecimal::{BigDecimal, ToPrimitive};
use serde::{Deserialize, Serialize};

/// An exact monetary amount stored as scaled-integer minor units.
///
/// Equality and ordering of money must be exact and reproducible, so amounts
/// are never represented as binary floating point. A value of `Amount(400)`
/// at scale 2 means `4.00`. Both sides of one reconciliation call must use
/// the same scale; [`Amount::from_decimal`] and [`Amount::to_decimal`] are
/// the conversion boundary for decimal text and display.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct Amount(i64);

impl Amount {
    /// Create an amount directly from minor units (e.g. cents)
    pub fn from_minor_units(units: i64) -> Self {
        Self(units)
    }

    /// The raw minor-unit value
    pub fn minor_units(&self) -> i64 {
        self.0
    }

    /// Convert a decimal value into minor units at the given scale.
    ///
    /// Fails with [`ReconcileError::AmountPrecision`] if the value has more
    /// fraction digits than the scale can hold, and with
    /// [`ReconcileError::AmountOverflow`] if the scaled value does not fit
    /// in 64 bits. Nothing is rounded or truncated.
    pub fn from_decimal(value: &BigDecimal, scale: u8) -> ReconcileResult<Self> {
        // 10^scale as an exact decimal
        let factor = BigDecimal::new(BigInt::from(1), -i64::from(scale));
        let shifted = value * factor;

        if !shifted.is_integer() {
            return Err(ReconcileError::AmountPrecision(format!(
                "Value {} cannot be represented exactly at scale {}",
                value, scale
            )));
        }

        shifted.to_i64().map(Amount).ok_or_else(|| {
            ReconcileError::AmountOverflow(format!(
                "Value {} at scale {} exceeds the representable amount range",
                value, scale
            ))
        })
    }

    /// Render the amount as an exact decimal at the given scale
    pub fn to_decimal(&self, scale: u8) -> BigDecimal {
        BigDecimal::new(BigInt::from(self.0), i64::from(scale))
    }

    /// Whether the amount is below zero
    pub fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Checked addition in minor units
    pub fn checked_add(self, other: Amount) -> Option<Amount> {
        self.0.checked_add(other.0).map(Amount)
    }

    /// Checked subtraction in minor units
    pub fn checked_sub(self, other: Amount) -> Option<Amount> {
        self.0.checked_sub(other.0).map(Amount)
    }

    /// Absolute difference between two amounts, `None` on overflow
    pub fn abs_diff(self, other: Amount) -> Option<Amount> {
        self.0
            .checked_sub(other.0)
            .and_then(i64::checked_abs)
            .map(Amount)
    }
}

/// A single financial record on either side of a reconciliation.
///
/// `id` is unique within its own side but not necessarily across sides.
/// Input order is significant: for side 1 it defines output order and
/// tie-break priority, for side 2 it defines FIFO priority among records
/// sharing the same amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Identifier of the record within its side
    pub id: i64,
    /// Exact monetary amount in minor units
    pub amount: Amount,
}

impl Record {
    /// Create a new record
    pub fn new(id: i64, amount: Amount) -> Self {
        Self { id, amount }
    }

    /// Create a record from a decimal amount at the given scale
    pub fn from_decimal(id: i64, amount: &BigDecimal, scale: u8) -> ReconcileResult<Self> {
        Ok(Self {
            id,
            amount: Amount::from_decimal(amount, scale)?,
        })
    }
}

/// The outcome of one record after a reconciliation call.
///
/// Absence of a match is data, not an error: every input record ends up in
/// exactly one outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchOutcome {
    /// A side-1 record paired with a side-2 record within the variance
    Matched {
        /// Id of the side-1 record
        side1_id: i64,
        /// Id of the claimed side-2 record
        side2_id: i64,
        /// Side-1 amount
        amount1: Amount,
        /// Side-2 amount
        amount2: Amount,
        /// Absolute difference between the two amounts
        diff: Amount,
    },
    /// A side-1 record with no eligible side-2 candidate
    UnmatchedSide1 {
        /// Id of the side-1 record
        side1_id: i64,
        /// Side-1 amount
        amount: Amount,
    },
    /// A side-2 record left unclaimed after all side-1 records committed
    UnmatchedSide2 {
        /// Id of the side-2 record
        side2_id: i64,
        /// Side-2 amount
        amount: Amount,
    },
}

impl MatchOutcome {
    /// Whether this outcome pairs two records
    pub fn is_matched(&self) -> bool {
        matches!(self, MatchOutcome::Matched { .. })
    }
}

/// Errors that can occur in the reconciliation engine.
///
/// Structural errors abort the whole call before any record is claimed;
/// partial results are never returned. A record that simply has no match is
/// not an error, it is an [`MatchOutcome::UnmatchedSide1`] or
/// [`MatchOutcome::UnmatchedSide2`] outcome.
#[derive(Debug, thiserror::Error)]
pub enum ReconcileError {
    #[error("Invalid variance: {0}")]
    InvalidVariance(String),
    #[error("Amount overflow: {0}")]
    AmountOverflow(String),
    #[error("Amount precision: {0}")]
    AmountPrecision(String),
    #[error("Worker pool error: {0}")]
    WorkerPool(String),
}

/// Result type for reconciliation operations
pub type ReconcileResult<T> = Result<T, ReconcileError>;
