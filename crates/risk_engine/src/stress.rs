//! C10: Stress Engine.
//!
//! Declarative scenario bundles (parallel/steepening/flattening curve
//! shifts, credit-spread widening, FX shocks, vol multipliers) applied to
//! the raw [`MarketDataSnapshot`] to produce a shocked market view, then
//! re-run through whatever recompute closure the caller supplies — this
//! module knows how to *shock inputs and diff outputs*, not how to price a
//! book, mirroring the teacher's scenario engine generalized over a result
//! type rather than over an instrument set.

use risk_domain::{MarketDataSnapshot, PositionId, StressResult};

use crate::error::EngineError;

const TOP_CONTRIBUTOR_COUNT: usize = 10;

/// A single shock applied to the raw market data snapshot.
#[derive(Debug, Clone)]
pub enum Shock {
    /// Shift every zero rate for `currency` by `shift_bps` basis points.
    ParallelCurveShift {
        /// Currency code the shift applies to.
        currency: String,
        /// Shift, in basis points (positive widens rates).
        shift_bps: f64,
    },
    /// Widen every CDS spread by a flat number of basis points.
    CreditSpreadWidening {
        /// Widening, in basis points.
        shift_bps: f64,
    },
    /// Multiply every FX rate quoting or quoted in `currency` by `1 +
    /// pct_change`.
    FxShock {
        /// Currency code the shock applies to.
        currency: String,
        /// Fractional change, e.g. `-0.10` for a 10% depreciation.
        pct_change: f64,
    },
    /// Multiply every implied vol for `underlying` by `multiplier`.
    VolMultiplier {
        /// Underlying identifier the shock applies to.
        underlying: String,
        /// Multiplicative factor, e.g. `1.5` for a 50% vol spike.
        multiplier: f64,
    },
}

/// A named bundle of shocks applied together as one scenario.
#[derive(Debug, Clone)]
pub struct Scenario {
    /// Scenario name, carried through to [`StressResult::scenario_name`].
    pub name: String,
    /// Shocks applied to the baseline snapshot to produce this scenario's
    /// market view.
    pub shocks: Vec<Shock>,
}

/// The portfolio-level metrics a recompute pass must report back for each
/// scenario leg, so this module can diff them without knowing how they were
/// derived.
#[derive(Debug, Clone, Default)]
pub struct StressMetrics {
    /// Total portfolio mark-to-market.
    pub total_mv: f64,
    /// 1-day 95% historical VaR.
    pub var_1d_95: f64,
    /// Total required capital (`sum_K` floored at the permanent minimum).
    pub total_k_req: f64,
    /// Capital ratio (`own_funds / total_k_req`).
    pub capital_ratio: f64,
    /// LCR ratio.
    pub lcr_ratio: f64,
    /// Per-position mark-to-market, for top-contributor attribution.
    pub position_mv: Vec<(PositionId, f64)>,
}

/// Apply every shock in `shocks` to `snapshot`, returning a new snapshot.
/// Shocks compose in the order given; a shock that references a currency or
/// underlying absent from the snapshot is a no-op rather than an error,
/// since not every scenario in a standard bundle applies to every book.
pub fn apply_shocks(snapshot: &MarketDataSnapshot, shocks: &[Shock]) -> MarketDataSnapshot {
    let mut curve_points = snapshot.curve_points.clone();
    let mut vol_points = snapshot.vol_points.clone();
    let mut fx_rates = snapshot.fx_rates.clone();
    let mut cds_spreads = snapshot.cds_spreads.clone();

    for shock in shocks {
        match shock {
            Shock::ParallelCurveShift { currency, shift_bps } => {
                for p in curve_points.iter_mut().filter(|p| p.currency.code() == currency) {
                    p.zero_rate += shift_bps / 10_000.0;
                }
            }
            Shock::CreditSpreadWidening { shift_bps } => {
                for c in cds_spreads.iter_mut() {
                    c.spread_bps = (c.spread_bps + shift_bps).max(0.0);
                }
            }
            Shock::FxShock { currency, pct_change } => {
                for fx in fx_rates.iter_mut() {
                    if fx.pair.base.code() == currency || fx.pair.quote.code() == currency {
                        fx.rate *= 1.0 + pct_change;
                    }
                }
            }
            Shock::VolMultiplier { underlying, multiplier } => {
                for v in vol_points.iter_mut().filter(|v| &v.underlying == underlying) {
                    v.vol = (v.vol * multiplier).max(0.0);
                }
            }
        }
    }

    MarketDataSnapshot::new(
        snapshot.as_of_date,
        snapshot.prices.clone(),
        curve_points,
        vol_points,
        fx_rates,
        cds_spreads,
    )
}

/// Run one scenario: shock the baseline snapshot, recompute metrics under
/// both the baseline and the shocked view via `recompute`, and diff them
/// into a [`StressResult`].
pub fn run_scenario(
    scenario: &Scenario,
    baseline_snapshot: &MarketDataSnapshot,
    baseline_metrics: &StressMetrics,
    recompute: impl Fn(&MarketDataSnapshot) -> Result<StressMetrics, EngineError>,
) -> Result<StressResult, EngineError> {
    let shocked_snapshot = apply_shocks(baseline_snapshot, &scenario.shocks);
    let shocked_metrics = recompute(&shocked_snapshot)?;

    let mut deltas: Vec<(PositionId, f64)> = shocked_metrics
        .position_mv
        .iter()
        .filter_map(|(id, shocked_mv)| {
            baseline_metrics
                .position_mv
                .iter()
                .find(|(base_id, _)| base_id == id)
                .map(|(_, base_mv)| (id.clone(), shocked_mv - base_mv))
        })
        .collect();
    deltas.sort_by(|a, b| {
        b.1.abs()
            .partial_cmp(&a.1.abs())
            .expect("non-finite position delta")
    });
    deltas.truncate(TOP_CONTRIBUTOR_COUNT);

    Ok(StressResult {
        scenario_name: scenario.name.clone(),
        pnl: shocked_metrics.total_mv - baseline_metrics.total_mv,
        delta_var: shocked_metrics.var_1d_95 - baseline_metrics.var_1d_95,
        delta_k: shocked_metrics.total_k_req - baseline_metrics.total_k_req,
        delta_capital_ratio: shocked_metrics.capital_ratio - baseline_metrics.capital_ratio,
        delta_lcr: shocked_metrics.lcr_ratio - baseline_metrics.lcr_ratio,
        top_contributors: deltas,
    })
}

/// The standard scenario bundle: parallel curve shifts of +/-200bp per
/// currency the book trades, a flat 100bp credit-spread widening, a 10% FX
/// depreciation per currency, and a 50% vol spike per underlying quoted.
pub fn standard_scenarios(currencies: &[String], underlyings: &[String]) -> Vec<Scenario> {
    let mut scenarios = Vec::new();

    for currency in currencies {
        scenarios.push(Scenario {
            name: format!("parallel_curve_up_200bp_{currency}"),
            shocks: vec![Shock::ParallelCurveShift { currency: currency.clone(), shift_bps: 200.0 }],
        });
        scenarios.push(Scenario {
            name: format!("parallel_curve_down_200bp_{currency}"),
            shocks: vec![Shock::ParallelCurveShift { currency: currency.clone(), shift_bps: -200.0 }],
        });
        scenarios.push(Scenario {
            name: format!("fx_depreciation_10pct_{currency}"),
            shocks: vec![Shock::FxShock { currency: currency.clone(), pct_change: -0.10 }],
        });
    }

    scenarios.push(Scenario {
        name: "credit_spread_widening_100bp".to_string(),
        shocks: vec![Shock::CreditSpreadWidening { shift_bps: 100.0 }],
    });

    for underlying in underlyings {
        scenarios.push(Scenario {
            name: format!("vol_spike_50pct_{underlying}"),
            shocks: vec![Shock::VolMultiplier { underlying: underlying.clone(), multiplier: 1.5 }],
        });
    }

    scenarios
}

#[cfg(test)]
mod tests {
    use super::*;
    use risk_core::currency::{Currency, CurrencyPair};
    use risk_core::time::Date;
    use risk_domain::CurvePoint;
    use std::collections::BTreeMap;

    fn usd() -> Currency {
        "USD".parse().unwrap()
    }

    fn sample_snapshot() -> MarketDataSnapshot {
        MarketDataSnapshot::new(
            Date::from_ymd(2024, 6, 30).unwrap(),
            BTreeMap::new(),
            vec![
                CurvePoint { currency: usd(), tenor_years: 1.0, zero_rate: 0.04 },
                CurvePoint { currency: usd(), tenor_years: 5.0, zero_rate: 0.045 },
            ],
            vec![],
            vec![],
            vec![],
        )
    }

    #[test]
    fn test_parallel_curve_shift_applies_uniformly() {
        let shocked = apply_shocks(
            &sample_snapshot(),
            &[Shock::ParallelCurveShift { currency: "USD".to_string(), shift_bps: 200.0 }],
        );
        for p in &shocked.curve_points {
            assert!(p.zero_rate > 0.04);
        }
    }

    #[test]
    fn test_shock_for_absent_currency_is_a_no_op() {
        let shocked = apply_shocks(
            &sample_snapshot(),
            &[Shock::ParallelCurveShift { currency: "EUR".to_string(), shift_bps: 200.0 }],
        );
        assert_eq!(shocked, sample_snapshot());
    }

    #[test]
    fn test_run_scenario_diffs_metrics() {
        let baseline_snapshot = sample_snapshot();
        let baseline = StressMetrics {
            total_mv: 1_000_000.0,
            var_1d_95: 10_000.0,
            total_k_req: 75_000.0,
            capital_ratio: 2.0,
            lcr_ratio: 1.5,
            position_mv: vec![("POS-1".into(), 500_000.0), ("POS-2".into(), 500_000.0)],
        };
        let scenario = Scenario {
            name: "parallel_curve_up_200bp_USD".to_string(),
            shocks: vec![Shock::ParallelCurveShift { currency: "USD".to_string(), shift_bps: 200.0 }],
        };
        let result = run_scenario(&scenario, &baseline_snapshot, &baseline, |_shocked| {
            Ok(StressMetrics {
                total_mv: 980_000.0,
                var_1d_95: 11_000.0,
                total_k_req: 76_000.0,
                capital_ratio: 1.9,
                lcr_ratio: 1.45,
                position_mv: vec![("POS-1".into(), 480_000.0), ("POS-2".into(), 500_000.0)],
            })
        })
        .unwrap();

        assert_eq!(result.scenario_name, "parallel_curve_up_200bp_USD");
        assert!((result.pnl - (-20_000.0)).abs() < 1e-9);
        assert!((result.delta_var - 1_000.0).abs() < 1e-9);
        assert_eq!(result.top_contributors[0].0, PositionId::from("POS-1"));
    }

    #[test]
    fn test_standard_scenarios_cover_requested_currencies_and_underlyings() {
        let scenarios = standard_scenarios(&["USD".to_string()], &["EUR/USD".to_string()]);
        assert!(scenarios.iter().any(|s| s.name.contains("parallel_curve_up_200bp")));
        assert!(scenarios.iter().any(|s| s.name.contains("vol_spike_50pct")));
    }
}
