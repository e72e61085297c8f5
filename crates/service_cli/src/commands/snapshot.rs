//! `snapshot` command: run a full `compute_snapshot` pass over a book file
//! and print the resulting `RiskSnapshot`.

use risk_engine::{compute_snapshot, CancellationToken};
use tracing::info;

use crate::{io, Result};

/// Load `book_path`/`config_path`, run the full risk pipeline, and print the
/// resulting snapshot as JSON (or a one-line summary table).
pub fn run(book_path: &str, config_path: &str, format: &str) -> Result<()> {
    info!(book = %book_path, config = %config_path, "loading book");
    let book = io::load_book(book_path)?;
    let config = io::load_config(config_path)?;
    let inputs = book.into_compute_inputs(config);

    let token = CancellationToken::new();
    info!(portfolio = %inputs.portfolio.id, positions = inputs.positions.len(), "computing snapshot");
    let snapshot = compute_snapshot(&inputs, &token);

    match format {
        "json" => {
            let rendered = serde_json::to_string_pretty(&snapshot)
                .map_err(|source| crate::CliError::Parse { path: "<snapshot>".to_string(), source })?;
            println!("{rendered}");
        }
        "table" => print_summary(&snapshot),
        other => {
            return Err(crate::CliError::InvalidArgument(format!(
                "unknown output format '{other}', expected 'json' or 'table'"
            )))
        }
    }

    Ok(())
}

fn print_summary(snapshot: &risk_domain::RiskSnapshot) {
    println!("portfolio:        {}", snapshot.portfolio_id);
    println!("as_of:            {}", snapshot.as_of_date);
    println!("status:           {:?}", snapshot.status);
    println!("engine_version:   {}", snapshot.engine_version);
    if let Some(market) = &snapshot.market {
        println!("var_1d_95:        {:.2}", market.var_1d_95);
        println!("dv01_total:       {:.2}", market.dv01_total);
        println!("duration:         {:.4}", market.duration);
    }
    if let Some(capital) = &snapshot.capital {
        println!("capital_ratio:    {:.4}", capital.capital_ratio);
    }
    if let Some(liquidity) = &snapshot.liquidity {
        println!("lcr_ratio:        {:.4}", liquidity.lcr_ratio);
    }
    println!(
        "alerts:           green={} yellow={} red={}",
        snapshot.alerts_summary.green, snapshot.alerts_summary.yellow, snapshot.alerts_summary.red
    );
    if let Some(msg) = &snapshot.error_message {
        println!("error_message:    {msg}");
    }
}
