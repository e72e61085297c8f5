//! `dq` command: run the data-quality evaluator (C2) over a book file
//! without computing the full risk pipeline.

use chrono::Utc;
use risk_engine::evaluate_dq;
use tracing::info;

use crate::{io, Result};

/// Load `book_path` and print every data-quality issue the evaluator finds.
pub fn run(book_path: &str) -> Result<()> {
    let book = io::load_book(book_path)?;
    info!(book = %book_path, positions = book.positions.len(), "evaluating data quality");

    let issues = evaluate_dq(
        &book.market_snapshot,
        &book.positions,
        &book.issuers,
        book.previous_market_snapshot.as_ref(),
        Utc::now(),
    );

    if issues.is_empty() {
        println!("no data-quality issues found");
        return Ok(());
    }

    println!("{:<8} {:<8} {:<10} {}", "code", "severity", "source", "reference");
    for issue in &issues {
        println!(
            "{:<8} {:<8?} {:<10?} {}",
            issue.code, issue.severity, issue.source, issue.reference
        );
    }
    println!("{} issue(s)", issues.len());

    Ok(())
}
