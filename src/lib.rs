//! # Reconcile Core
//!
//! A pure, in-memory reconciliation engine that pairs two collections of
//! financial records one-to-one, tolerating a configured amount variance.
//!
//! ## Features
//!
//! - **Exact money**: amounts are scaled-integer minor units with an exact
//!   `BigDecimal` conversion boundary; no binary floating point anywhere
//! - **Deterministic matching**: greedy nearest-amount policy in side-1
//!   input order, ties toward the lower amount, FIFO among equal amounts
//! - **Race-free parallelism**: a read-only parallel proposing phase
//!   followed by a sequential committing phase; the worker count never
//!   changes the output
//! - **Total accounting**: every input record ends up in exactly one
//!   outcome; absence of a match is data, never an error
//! - **Report rendering**: ordered outcome reports with a stable text form
//!
//! ## Quick Start
//!
//! ```rust
//! use reconcile_core::{reconcile, Amount, MatchOutcome, Record};
//!
//! let side1 = vec![Record::new(1, Amount::from_minor_units(400))];
//! let side2 = vec![
//!     Record::new(8, Amount::from_minor_units(350)),
//!     Record::new(9, Amount::from_minor_units(450)),
//! ];
//!
//! let outcomes = reconcile(&side1, &side2, Amount::from_minor_units(50)).unwrap();
//! // One matched pair covers both its records; the leftover at 4.50 trails.
//! assert_eq!(outcomes.len(), 2);
//! assert!(matches!(
//!     outcomes[0],
//!     MatchOutcome::Matched { side1_id: 1, side2_id: 8, .. }
//! ));
//! assert!(matches!(outcomes[1], MatchOutcome::UnmatchedSide2 { side2_id: 9, .. }));
//! ```

pub mod engine;
pub mod report;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use engine::*;
pub use report::*;
pub use types::*;
