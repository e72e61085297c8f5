//! `demo` command: build a single zero-coupon bond book in memory and run
//! it through the full risk pipeline, printing each stage's output.
//!
//! Mirrors the S1 seed scenario — 1,000,000 notional, 5-year zero-coupon
//! bond against a flat 5% USD curve — without needing a book file on disk.

use std::collections::{BTreeMap, HashMap};

use risk_core::currency::Currency;
use risk_core::time::{Date, DayCountConvention};
use risk_domain::{
    BondTerms, CurvePoint, EngineConfig, InstrumentKind, InstrumentTerms, MarketDataSnapshot,
    Portfolio, PortfolioType, Position,
};
use risk_engine::{compute_snapshot, CancellationToken, ComputeInputs};

use crate::Result;

fn usd() -> Currency {
    "USD".parse().expect("USD is a valid currency code")
}

pub fn run() -> Result<()> {
    println!("========================================");
    println!("Risk Engine Demo: single zero-coupon bond");
    println!("========================================");
    println!();

    let as_of = Date::from_ymd(2024, 1, 1).expect("valid date");

    println!("[Demo] Building a flat 5% USD curve as of {as_of}...");
    let market_snapshot = MarketDataSnapshot::new(
        as_of,
        BTreeMap::new(),
        vec![
            CurvePoint { currency: usd(), tenor_years: 0.5, zero_rate: 0.05 },
            CurvePoint { currency: usd(), tenor_years: 30.0, zero_rate: 0.05 },
        ],
        vec![],
        vec![],
        vec![],
    );

    println!("[Demo] Booking POS-1: 1,000,000 notional 5Y zero-coupon bond...");
    let position = Position {
        id: "POS-1".into(),
        portfolio_id: "PORT-1".into(),
        kind: InstrumentKind::Bond,
        notional: 1_000_000.0,
        trade_date: Date::from_ymd(2019, 1, 1).expect("valid date"),
        maturity_date: Date::from_ymd(2029, 1, 1).expect("valid date"),
        terms: InstrumentTerms::Bond(BondTerms {
            isin: "US0000000001".into(),
            coupon_rate: 0.0,
            coupon_frequency: 1,
            day_count: DayCountConvention::Actual365,
        }),
    };

    let series_start = as_of.into_inner() - chrono::Duration::days(299);
    let to_date = |d: chrono::NaiveDate| {
        Date::from_ymd(chrono::Datelike::year(&d), chrono::Datelike::month(&d), chrono::Datelike::day(&d))
            .expect("valid date")
    };
    let config = EngineConfig::new(
        "1.0.0",
        to_date(series_start + chrono::Duration::days(30)),
        to_date(series_start + chrono::Duration::days(200)),
    )
    .expect("demo config satisfies EngineConfig::validate");

    let inputs = ComputeInputs {
        portfolio: Portfolio::new("PORT-1", PortfolioType::BondDealer, usd(), true),
        positions: vec![position],
        counterparties: vec![],
        issuers: vec![],
        isin_issuer: HashMap::new(),
        market_snapshot,
        previous_market_snapshot: None,
        pnl_history: vec![],
        limits: vec![],
        tier1_capital: 10_000_000.0,
        tier2_capital: 2_000_000.0,
        trailing_quarterly_aum: 0.0,
        avg_segregated_client_funds: 0.0,
        client_funds_guaranteed: false,
        annualized_order_volume: 0.0,
        coh_percentage: 0.0,
        hqla_holdings: vec![],
        outflow_items: vec![],
        inflows_30d: 0.0,
        config,
    };

    println!("[Demo] Running compute_snapshot...");
    let token = CancellationToken::new();
    let snapshot = compute_snapshot(&inputs, &token);
    println!();

    println!("[Demo] Snapshot result:");
    println!("----------------------------------------");
    println!("status:       {:?}", snapshot.status);
    if let Some(market) = &snapshot.market {
        println!("duration:     {:.4}", market.duration);
        println!("dv01_total:   {:.2}", market.dv01_total);
        println!("convexity:    {:.4}", market.convexity);
    }
    if let Some(capital) = &snapshot.capital {
        println!("capital_req:  {:.2}", capital.total_k_req);
        println!("capital_ratio:{:.4}", capital.capital_ratio);
    }
    println!("----------------------------------------");
    println!();
    println!("========================================");
    println!("Demo completed successfully!");
    println!("========================================");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_run() {
        let result = run();
        assert!(result.is_ok());
    }
}
