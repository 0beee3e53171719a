//! Basic reconciliation example

use std::str::FromStr;

use bigdecimal::BigDecimal;
use reconcile_core::{Amount, Reconciler, Record};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Reconcile Core - Basic Reconciliation Example\n");

    // Side 1: our ledger, amounts parsed to cents by the caller
    let side1 = vec![
        Record::from_decimal(1, &BigDecimal::from_str("4.00")?, 2)?,
        Record::from_decimal(2, &BigDecimal::from_str("6.00")?, 2)?,
        Record::from_decimal(3, &BigDecimal::from_str("5.00")?, 2)?,
    ];

    // Side 2: the counterparty statement
    let side2 = vec![
        Record::from_decimal(9, &BigDecimal::from_str("3.00")?, 2)?,
        Record::from_decimal(8, &BigDecimal::from_str("5.00")?, 2)?,
        Record::from_decimal(10, &BigDecimal::from_str("4.00")?, 2)?,
    ];

    // Tolerate up to 1.00 of difference per pair
    let variance = Amount::from_decimal(&BigDecimal::from_str("1.00")?, 2)?;

    let report = Reconciler::new().reconcile_report(&side1, &side2, variance, 2)?;

    println!("{}", report);
    println!(
        "Matched: {}  Unmatched side1: {}  Unmatched side2: {}",
        report.matched_count(),
        report.unmatched_side1_count(),
        report.unmatched_side2_count()
    );
    if let Some(total) = report.total_diff() {
        println!(
            "Total absolute difference: {}",
            total.to_decimal(report.scale())
        );
    }

    Ok(())
}
