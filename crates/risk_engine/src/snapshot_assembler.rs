//! C13: Snapshot Assembler.
//!
//! The single orchestration point: build the market view (C1), run data
//! quality (C2), price every position (C3/C4), aggregate market/credit/CCR
//! risk (C5-C7), liquidity (C8) and capital (C9), run the standard stress
//! bundle (C10), evaluate limits and alerts (C11), and assemble the
//! immutable [`RiskSnapshot`] (C13). Everything else in this crate is an
//! implementation detail reached only from here.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use risk_core::currency::Currency;
use risk_core::error::RiskEngineError;
use risk_core::market_data::YieldCurve;
use risk_core::math::solvers::SolverConfig;
use risk_core::time::{time_to_maturity, Date, DayCountConvention};
use risk_domain::{
    Alert, AlertsSummary, CapitalBlock, CcrBlock, Counterparty, CounterpartyId, CreditBlock,
    Direction, EngineConfig, InstrumentKind, InstrumentTerms, Issuer, IssuerId, Isin, Limit,
    LiquidityBlock, MarketBlock, MarketDataSnapshot, OptionType, Portfolio, PortfolioId, Position,
    PositionId, RiskSnapshot, Seniority, SnapshotStatus, StressResult,
};
use risk_pricing::bond::{self, BondPricingResult};
use risk_pricing::derivatives::{cap_floor, fx_forward, fx_option, ir_swap, swaption};
use risk_analytics::{capital, ccr, credit, liquidity, var};

use crate::cancellation::{self, CancellationToken, DeadlineBudget};
use crate::error::EngineError;
use crate::market_view::MarketView;
use crate::stress::{self, Scenario, StressMetrics};

/// Major currencies classified as [`ccr::FxCcfClass::Major`] for PFE
/// add-on purposes; everything else is treated as emerging-market.
const MAJOR_CURRENCIES: [&str; 8] = ["USD", "EUR", "GBP", "JPY", "CHF", "AUD", "CAD", "NZD"];

/// Every input `compute_snapshot` needs for one portfolio's risk snapshot.
///
/// Bundled into one struct rather than a long parameter list, mirroring how
/// a single nightly batch record groups a portfolio with its positions and
/// reference data before handing it to the pricing/analytics layers.
#[derive(Clone, Debug)]
pub struct ComputeInputs {
    /// The portfolio being computed.
    pub portfolio: Portfolio,
    /// Every position owned by the portfolio.
    pub positions: Vec<Position>,
    /// Counterparty reference data for derivative positions.
    pub counterparties: Vec<Counterparty>,
    /// Issuer reference data for bond positions.
    pub issuers: Vec<Issuer>,
    /// ISIN -> issuer id, since `BondTerms` carries no direct issuer link.
    pub isin_issuer: HashMap<Isin, IssuerId>,
    /// Raw market data for the `as_of_date`.
    pub market_snapshot: MarketDataSnapshot,
    /// The prior day's raw market data, if available (feeds DQ-01 price-jump
    /// detection).
    pub previous_market_snapshot: Option<MarketDataSnapshot>,
    /// Trailing daily P&L history feeding historical/stressed VaR.
    pub pnl_history: Vec<var::PnlObservation>,
    /// Configured limits for this portfolio.
    pub limits: Vec<Limit>,
    /// Tier 1 own funds.
    pub tier1_capital: f64,
    /// Tier 2 own funds.
    pub tier2_capital: f64,
    /// Trailing quarterly assets under management, feeding K-AUM.
    pub trailing_quarterly_aum: f64,
    /// Average segregated client funds held, feeding K-CMH.
    pub avg_segregated_client_funds: f64,
    /// Whether segregated client funds carry a third-party guarantee.
    pub client_funds_guaranteed: bool,
    /// Annualized client order handling volume, feeding K-COH.
    pub annualized_order_volume: f64,
    /// The firm's configured K-COH percentage (IFR/IFD permission-specific).
    pub coh_percentage: f64,
    /// HQLA holdings feeding the LCR numerator.
    pub hqla_holdings: Vec<liquidity::HqlaHolding>,
    /// Outflow items feeding the LCR denominator.
    pub outflow_items: Vec<liquidity::OutflowItem>,
    /// Expected 30-day cash inflows (subject to the 75% recognition cap).
    pub inflows_30d: f64,
    /// Engine configuration for this run.
    pub config: EngineConfig,
}

/// One priced position: the mark-to-market and risk sensitivities the
/// downstream aggregation stages (C5-C9) need, stripped of how it was
/// derived.
#[derive(Clone, Debug)]
struct PricedPosition {
    id: PositionId,
    kind: InstrumentKind,
    counterparty_id: Option<CounterpartyId>,
    isin: Option<Isin>,
    mv: f64,
    dv01: f64,
    tenor_years: f64,
    direction: Direction,
    notional: f64,
    fx_exposure: Option<(Currency, f64)>,
    bond_result: Option<BondPricingResult>,
    pfe_add_on: f64,
}

fn signed_notional(direction: Direction, notional: f64) -> f64 {
    match direction {
        Direction::Long => notional,
        Direction::Short => -notional,
    }
}

/// Resolve the configured volatility regime into the CCR module's own
/// 3-variant regime. `Auto` has no market-stress proxy in this data model
/// (e.g. a VIX level), so it resolves to `Normal`.
fn resolve_vol_regime(config: &EngineConfig) -> ccr::VolRegime {
    match config.vol_regime_override {
        risk_domain::VolRegime::Normal | risk_domain::VolRegime::Auto => ccr::VolRegime::Normal,
        risk_domain::VolRegime::Elevated => ccr::VolRegime::Elevated,
        risk_domain::VolRegime::Crisis => ccr::VolRegime::Crisis,
    }
}

/// Map an issuer's external rating grade onto the K-CREDNR rating bucket.
fn credit_rating_weight(rating: &str) -> capital::CreditRatingWeight {
    match rating.to_uppercase().as_str() {
        "AAA" | "AA" => capital::CreditRatingWeight::HighGrade,
        "A" | "BBB" => capital::CreditRatingWeight::InvestmentGrade,
        "BB" | "B" => capital::CreditRatingWeight::SubInvestmentGrade,
        "" => capital::CreditRatingWeight::Unrated,
        _ => capital::CreditRatingWeight::HighYield,
    }
}

/// Classify a currency pair string (`"EUR/USD"`) as major or emerging
/// market for the FX PFE add-on's CCF.
fn fx_ccf_class(pair: &str) -> ccr::FxCcfClass {
    let is_major = pair
        .split('/')
        .all(|leg| MAJOR_CURRENCIES.contains(&leg.to_uppercase().as_str()));
    if is_major {
        ccr::FxCcfClass::Major
    } else {
        ccr::FxCcfClass::EmergingMarket
    }
}

/// Replicates `ccr::FxCcfClass::ccf()`, which is private to that module.
fn fx_ccf_value(class: ccr::FxCcfClass) -> f64 {
    match class {
        ccr::FxCcfClass::Major => 0.010,
        ccr::FxCcfClass::EmergingMarket => 0.025,
    }
}

/// Replicates `ccr::IrTenorBucket::ccf()`, which is private to that module.
fn ir_ccf_value(tenor_years: f64) -> f64 {
    if tenor_years <= 1.0 {
        0.0
    } else if tenor_years <= 5.0 {
        0.005
    } else if tenor_years <= 10.0 {
        0.010
    } else {
        0.015
    }
}

/// Which non-base-currency leg of a derivative's underlying pair carries the
/// FX exposure for K-FX bucketing. Returns `None` for non-FX underlyings.
fn fx_exposure_currency(underlying: &str, base_currency: &Currency) -> Option<(Currency, f64)> {
    let mut legs = underlying.split('/');
    let base: Currency = legs.next()?.parse().ok()?;
    let quote: Currency = legs.next()?.parse().ok()?;
    if &base != base_currency {
        Some((base, 1.0))
    } else if &quote != base_currency {
        Some((quote, 1.0))
    } else {
        None
    }
}

/// Peak exposure-at-default across the CVA bucket grid, used for
/// `CcrBlock::pfe_peak`: the same `ead_t` formula `counterparty_cva` sums
/// internally, maximized rather than probability-weighted.
fn peak_ead(ce: f64, pfe_total: f64, max_maturity_years: f64) -> f64 {
    if max_maturity_years <= 0.0 {
        return ce.max(0.0) + pfe_total;
    }
    ccr::CVA_BUCKETS_YEARS
        .iter()
        .map(|&bucket| {
            let t = bucket.min(max_maturity_years);
            ce.max(0.0) + pfe_total * (t / max_maturity_years).sqrt()
        })
        .fold(0.0_f64, f64::max)
}

/// Price a single position. Bonds discount/quote off the portfolio's base
/// currency; derivatives do as well, treating `underlying` purely as an
/// FX-pair or vol-surface/index label rather than something to currency-parse
/// (an IR underlying like `"USD-LIBOR-3M"` is not itself a valid ISO code).
fn price_position(
    position: &Position,
    portfolio: &Portfolio,
    market: &MarketView,
    config: &EngineConfig,
) -> Result<PricedPosition, RiskEngineError> {
    let as_of_date = market.as_of_date();
    let solver_config = SolverConfig::new(config.ytm_tolerance, config.ytm_max_iter);

    match &position.terms {
        InstrumentTerms::Bond(terms) => {
            let curve = market.curve(&portfolio.base_currency).ok_or_else(|| {
                RiskEngineError::MissingMarketData(format!(
                    "yield curve for {}",
                    portfolio.base_currency
                ))
            })?;
            let quote = market.price(&terms.isin);
            let result = bond::price_bond(
                terms,
                position.notional,
                position.trade_date,
                position.maturity_date,
                as_of_date,
                curve,
                quote,
                solver_config,
            )?;
            let tenor_years = time_to_maturity(as_of_date, position.maturity_date, terms.day_count);
            Ok(PricedPosition {
                id: position.id.clone(),
                kind: InstrumentKind::Bond,
                counterparty_id: None,
                isin: Some(terms.isin.clone()),
                mv: result.dirty_price,
                dv01: result.dv01,
                tenor_years,
                direction: Direction::Long,
                notional: position.notional,
                fx_exposure: None,
                bond_result: Some(result),
                pfe_add_on: 0.0,
            })
        }
        InstrumentTerms::Derivative(deriv) => {
            let tenor_years =
                time_to_maturity(as_of_date, position.maturity_date, DayCountConvention::Actual365);
            let regime = resolve_vol_regime(config);

            let (mv, dv01, abs_delta) = match position.kind {
                InstrumentKind::FxForward => {
                    let (base, quote) = split_fx_pair(&deriv.underlying)?;
                    let forward = market.fx_rate(&base, &quote).ok_or_else(|| {
                        RiskEngineError::MissingMarketData(format!("fx rate for {}", deriv.underlying))
                    })?;
                    let curve = base_currency_curve(market, portfolio)?;
                    let df = curve.discount_factor(tenor_years);
                    let result = fx_forward::price(
                        position.notional,
                        deriv.direction,
                        deriv.strike,
                        forward,
                        df,
                    )?;
                    (result.mtm, result.delta * position.notional * 1e-4, result.delta.abs())
                }
                InstrumentKind::FxOption => {
                    let (base, quote) = split_fx_pair(&deriv.underlying)?;
                    let forward = market.fx_rate(&base, &quote).ok_or_else(|| {
                        RiskEngineError::MissingMarketData(format!("fx rate for {}", deriv.underlying))
                    })?;
                    let curve = base_currency_curve(market, portfolio)?;
                    let surface = market.surface(&deriv.underlying).ok_or_else(|| {
                        RiskEngineError::MissingMarketData(format!(
                            "vol surface for {}",
                            deriv.underlying
                        ))
                    })?;
                    let option_type = deriv.option_type.ok_or_else(|| {
                        RiskEngineError::InputValidation(
                            "FX option position missing option_type".to_string(),
                        )
                    })?;
                    let vol = surface.vol(tenor_years, deriv.strike, forward);
                    let df = curve.discount_factor(tenor_years);
                    let result = fx_option::price(
                        position.notional,
                        deriv.direction,
                        option_type,
                        forward,
                        deriv.strike,
                        vol,
                        tenor_years,
                        df,
                    )?;
                    (result.mtm, result.delta * position.notional * 1e-4, result.delta.abs())
                }
                InstrumentKind::IrSwap => {
                    let curve = base_currency_curve(market, portfolio)?;
                    let result = ir_swap::price(
                        position.notional,
                        deriv.direction,
                        deriv.strike,
                        position.trade_date,
                        position.maturity_date,
                        as_of_date,
                        curve,
                    )?;
                    (result.mtm, result.dv01, 0.0)
                }
                InstrumentKind::CapFloor => {
                    let curve = base_currency_curve(market, portfolio)?;
                    let surface = market.surface(&deriv.underlying).ok_or_else(|| {
                        RiskEngineError::MissingMarketData(format!(
                            "vol surface for {}",
                            deriv.underlying
                        ))
                    })?;
                    let option_type = deriv.option_type.ok_or_else(|| {
                        RiskEngineError::InputValidation(
                            "cap/floor position missing option_type".to_string(),
                        )
                    })?;
                    let result = cap_floor::price(
                        position.notional,
                        deriv.direction,
                        option_type,
                        deriv.strike,
                        position.trade_date,
                        position.maturity_date,
                        as_of_date,
                        curve,
                        surface,
                        &deriv.underlying,
                    )?;
                    (result.mtm, result.delta, result.delta.abs())
                }
                InstrumentKind::Swaption => {
                    let curve = base_currency_curve(market, portfolio)?;
                    let surface = market.surface(&deriv.underlying).ok_or_else(|| {
                        RiskEngineError::MissingMarketData(format!(
                            "vol surface for {}",
                            deriv.underlying
                        ))
                    })?;
                    let option_type = deriv.option_type.ok_or_else(|| {
                        RiskEngineError::InputValidation(
                            "swaption position missing option_type".to_string(),
                        )
                    })?;
                    let result = swaption::price(
                        position.notional,
                        deriv.direction,
                        option_type,
                        deriv.strike,
                        as_of_date,
                        position.maturity_date,
                        curve,
                        surface,
                    )?;
                    (result.mtm, result.delta, result.delta.abs())
                }
                InstrumentKind::Bond => unreachable!("bond kind cannot carry derivative terms"),
            };

            let pfe_add_on = pfe_add_on_for(position.kind, deriv, position.notional, mv, tenor_years, abs_delta, regime);

            Ok(PricedPosition {
                id: position.id.clone(),
                kind: position.kind,
                counterparty_id: Some(deriv.counterparty_id.clone()),
                isin: None,
                mv,
                dv01,
                tenor_years,
                direction: deriv.direction,
                notional: position.notional,
                fx_exposure: fx_exposure_currency(&deriv.underlying, &portfolio.base_currency),
                bond_result: None,
                pfe_add_on,
            })
        }
    }
}

fn base_currency_curve<'a>(
    market: &'a MarketView,
    portfolio: &Portfolio,
) -> Result<&'a YieldCurve, RiskEngineError> {
    market.curve(&portfolio.base_currency).ok_or_else(|| {
        RiskEngineError::MissingMarketData(format!("yield curve for {}", portfolio.base_currency))
    })
}

fn split_fx_pair(underlying: &str) -> Result<(Currency, Currency), RiskEngineError> {
    let mut legs = underlying.split('/');
    let base = legs
        .next()
        .ok_or_else(|| RiskEngineError::InputValidation(format!("malformed FX pair '{underlying}'")))?
        .parse::<Currency>()
        .map_err(|_| RiskEngineError::InputValidation(format!("malformed FX pair '{underlying}'")))?;
    let quote = legs
        .next()
        .ok_or_else(|| RiskEngineError::InputValidation(format!("malformed FX pair '{underlying}'")))?
        .parse::<Currency>()
        .map_err(|_| RiskEngineError::InputValidation(format!("malformed FX pair '{underlying}'")))?;
    Ok((base, quote))
}

/// Per-trade PFE add-on, before counterparty-level netting (§4.7). Bonds
/// never reach this: only derivative positions carry counterparty-facing
/// PFE.
#[allow(clippy::too_many_arguments)]
fn pfe_add_on_for(
    kind: InstrumentKind,
    deriv: &risk_domain::DerivativeTerms,
    notional: f64,
    mv: f64,
    tenor_years: f64,
    abs_delta: f64,
    regime: ccr::VolRegime,
) -> f64 {
    let trade = match kind {
        InstrumentKind::FxForward => ccr::TradePfeAddOn::Fx {
            notional,
            tenor_years,
            ccf_class: fx_ccf_class(&deriv.underlying),
            regime,
        },
        InstrumentKind::IrSwap => ccr::TradePfeAddOn::Ir {
            notional,
            tenor_years,
            regime,
        },
        InstrumentKind::FxOption | InstrumentKind::CapFloor | InstrumentKind::Swaption => {
            match deriv.direction {
                Direction::Long => ccr::TradePfeAddOn::LongOption {
                    premium_paid: mv.abs(),
                    cap_policy: notional,
                },
                Direction::Short => {
                    let ccf = match kind {
                        InstrumentKind::FxOption => fx_ccf_value(fx_ccf_class(&deriv.underlying)),
                        _ => ir_ccf_value(tenor_years),
                    };
                    ccr::TradePfeAddOn::ShortOption {
                        abs_delta,
                        notional,
                        ccf,
                    }
                }
            }
        }
        InstrumentKind::Bond => return 0.0,
    };
    ccr::trade_pfe_add_on(trade)
}

/// C5: market risk aggregates.
fn build_market_block(
    priced: &[PricedPosition],
    pnl_history: &[var::PnlObservation],
    config: &EngineConfig,
) -> Result<MarketBlock, RiskEngineError> {
    let var_1d_95 = var::historical_var_95(pnl_history, config.var_window_days, config.var_confidence)?;
    let stressed_var = var::stressed_var(
        pnl_history,
        config.var_stress_window_start,
        config.var_stress_window_end,
        config.var_window_days,
        config.var_confidence,
    );

    let dv01_total: f64 = priced.iter().map(|p| p.dv01).sum();

    let bond_mvs: Vec<(f64, BondPricingResult)> = priced
        .iter()
        .filter_map(|p| p.bond_result.map(|r| (p.mv, r)))
        .collect();
    let (duration, _) = bond::aggregate_bond_durations(&bond_mvs)?;

    let bond_mv_total: f64 = bond_mvs.iter().map(|(mv, _)| mv).sum();
    let convexity = if bond_mv_total > 0.0 {
        bond_mvs.iter().map(|(mv, r)| mv * r.convexity).sum::<f64>() / bond_mv_total
    } else {
        0.0
    };

    Ok(MarketBlock {
        var_1d_95,
        stressed_var,
        dv01_total,
        duration,
        convexity,
    })
}

/// C6/C7: issuer credit risk and counterparty credit risk (PFE/EAD/CVA),
/// evaluated together since both feed off the same priced-position set.
fn build_credit_and_ccr(
    priced: &[PricedPosition],
    inputs: &ComputeInputs,
    market: &MarketView,
) -> Result<(CreditBlock, CcrBlock), RiskEngineError> {
    let mut mv_by_issuer: HashMap<IssuerId, Vec<f64>> = HashMap::new();
    for p in priced.iter().filter(|p| p.kind == InstrumentKind::Bond) {
        if let Some(isin) = &p.isin {
            if let Some(issuer_id) = inputs.isin_issuer.get(isin) {
                mv_by_issuer.entry(issuer_id.clone()).or_default().push(p.mv);
            }
        }
    }

    let mut issuer_results = Vec::with_capacity(mv_by_issuer.len());
    for (issuer_id, mvs) in &mv_by_issuer {
        let issuer = inputs
            .issuers
            .iter()
            .find(|i| &i.id == issuer_id)
            .ok_or_else(|| RiskEngineError::MissingMarketData(format!("issuer {issuer_id}")))?;
        issuer_results.push(credit::issuer_credit(mvs, &issuer.rating, issuer.seniority)?);
    }
    let portfolio_credit = credit::aggregate_portfolio_credit(&issuer_results);

    let mut by_counterparty: HashMap<CounterpartyId, Vec<&PricedPosition>> = HashMap::new();
    for p in priced.iter().filter(|p| p.counterparty_id.is_some()) {
        by_counterparty
            .entry(p.counterparty_id.clone().unwrap())
            .or_default()
            .push(p);
    }

    let base_rate = market
        .curve(&inputs.portfolio.base_currency)
        .map(|c| c.zero_rate(1.0))
        .unwrap_or(0.0);

    let mut pfe_current = 0.0;
    let mut pfe_peak = 0.0;
    let mut ead_total = 0.0;
    let mut cva_total = 0.0;

    for (cpty_id, positions) in &by_counterparty {
        let cpty = inputs
            .counterparties
            .iter()
            .find(|c| &c.id == cpty_id)
            .ok_or_else(|| RiskEngineError::MissingMarketData(format!("counterparty {cpty_id}")))?;

        let add_ons: Vec<f64> = positions.iter().map(|p| p.pfe_add_on).collect();
        let net_long: f64 = positions.iter().map(|p| p.mv).filter(|v| *v > 0.0).sum();
        let net_short: f64 = positions.iter().map(|p| p.mv).filter(|v| *v < 0.0).sum::<f64>().abs();
        let gross: f64 = positions.iter().map(|p| p.mv.abs()).sum();
        let directionality = if gross <= 0.0 || (net_long - net_short).abs() <= 0.05 * gross {
            ccr::PortfolioDirectionality::NearFlat
        } else if net_long == 0.0 || net_short == 0.0 {
            ccr::PortfolioDirectionality::SameDirection
        } else {
            ccr::PortfolioDirectionality::Mixed
        };

        let (collateral_held, threshold) = cpty
            .csa
            .as_ref()
            .map(|csa| (csa.collateral_held, csa.threshold))
            .unwrap_or((0.0, 0.0));

        let adj_pfe = ccr::net_pfe(
            &add_ons,
            cpty.isda_netting,
            positions.len(),
            directionality,
            collateral_held,
            threshold,
        )?;

        let ce: f64 = positions.iter().map(|p| p.mv).sum::<f64>().max(0.0);
        let ead = ccr::ead_ccr(ce, adj_pfe);
        let max_maturity = positions
            .iter()
            .map(|p| p.tenor_years)
            .fold(0.0_f64, f64::max);
        let lgd = Seniority::SeniorUnsecured.lgd();
        let pd_1y = credit::pd_for_rating(&cpty.external_rating).unwrap_or(0.01);
        let cds_spread = market.cds_spread(&IssuerId::new(cpty_id.as_str()));
        let cva = ccr::counterparty_cva(ce, adj_pfe, lgd, base_rate, cds_spread, pd_1y, max_maturity);

        pfe_current += ce;
        pfe_peak += peak_ead(ce, adj_pfe, max_maturity);
        ead_total += ead;
        cva_total += cva;
    }

    Ok((
        CreditBlock {
            total_exposure: portfolio_credit.total_exposure,
            expected_loss: portfolio_credit.expected_loss,
            cva_total,
        },
        CcrBlock {
            pfe_current,
            pfe_peak,
            ead_total,
        },
    ))
}

/// C8: liquidity aggregates.
fn build_liquidity_block(
    priced: &[PricedPosition],
    inputs: &ComputeInputs,
) -> Result<LiquidityBlock, RiskEngineError> {
    let hqla = liquidity::total_hqla(&inputs.hqla_holdings, inputs.config.lcr_l2a_cap, inputs.config.lcr_l2b_cap);
    let outflows_30d = liquidity::total_outflows(&inputs.outflow_items)?;
    let net_outflows = liquidity::net_outflows(outflows_30d, inputs.inflows_30d, inputs.config.lcr_inflow_cap);
    let lcr = liquidity::lcr_ratio(hqla, net_outflows);
    let funding_gap = liquidity::funding_gap(hqla, net_outflows);

    // Bond-only: liquidation cost needs a bid/ask/volume quote, which
    // derivatives never carry in this data model.
    let mut cost_1d = 0.0;
    let mut cost_5d = 0.0;
    for p in priced.iter() {
        if p.kind != InstrumentKind::Bond {
            continue;
        }
        if let Some(isin) = &p.isin {
            if let Some(quote) = inputs.market_snapshot.prices.get(isin) {
                cost_1d += liquidity::liquidation_cost(quote.bid, quote.ask, p.notional, quote.volume, 1.0);
                cost_5d += liquidity::liquidation_cost(quote.bid, quote.ask, p.notional, quote.volume, 5.0);
            }
        }
    }

    Ok(LiquidityBlock {
        lcr_ratio: lcr,
        funding_gap_short_term: funding_gap,
        liquidation_cost_1d: cost_1d,
        liquidation_cost_5d: cost_5d,
        liquidity_score: liquidity::liquidity_score(lcr),
    })
}

/// C9: capital adequacy aggregates.
fn build_capital_block(priced: &[PricedPosition], inputs: &ComputeInputs) -> Result<CapitalBlock, RiskEngineError> {
    let ir_positions: Vec<capital::IrBucketPosition> = priced
        .iter()
        .map(|p| capital::IrBucketPosition {
            net_position: signed_notional(p.direction, p.notional),
            tenor_years: p.tenor_years,
        })
        .collect();
    let k_ir = capital::k_ir(&ir_positions);

    let mut crednr_positions = Vec::new();
    for p in priced.iter().filter(|p| p.kind == InstrumentKind::Bond) {
        if let Some(isin) = &p.isin {
            if let Some(issuer_id) = inputs.isin_issuer.get(isin) {
                if let Some(issuer) = inputs.issuers.iter().find(|i| &i.id == issuer_id) {
                    crednr_positions.push(capital::CreditNonTradingPosition {
                        net_position: p.mv,
                        rating_weight: credit_rating_weight(&issuer.rating),
                    });
                }
            }
        }
    }
    let k_crednr = capital::k_crednr(&crednr_positions);

    let mut fx_by_currency: HashMap<Currency, f64> = HashMap::new();
    for p in priced.iter().filter_map(|p| p.fx_exposure.as_ref().map(|(ccy, _)| (ccy, p))) {
        let (ccy, pos) = p;
        *fx_by_currency.entry(ccy.clone()).or_insert(0.0) += signed_notional(pos.direction, pos.notional);
    }
    let k_fx = capital::k_fx(&fx_by_currency.into_values().collect::<Vec<_>>());

    let k_aum = capital::k_aum(inputs.trailing_quarterly_aum);
    let k_cmh = capital::k_cmh(inputs.avg_segregated_client_funds, inputs.client_funds_guaranteed);
    let k_coh = capital::k_coh(inputs.annualized_order_volume, inputs.coh_percentage)?;

    let k_factors = capital::KFactors {
        k_ir,
        k_crednr,
        k_fx,
        k_aum,
        k_cmh,
        k_coh,
    };
    let total_k_req = capital::required_capital(&k_factors, inputs.config.permanent_min_capital_eur);
    let own_funds = capital::own_funds(inputs.tier1_capital, inputs.tier2_capital);
    let ratio = capital::capital_ratio(own_funds, total_k_req)?;

    Ok(CapitalBlock {
        k_npr: k_ir + k_crednr + k_fx,
        k_aum,
        k_cmh,
        k_coh,
        total_k_req,
        own_funds,
        capital_ratio: ratio,
    })
}

/// Reprice every position under a shocked market view and recompute the
/// portfolio-level metrics the stress engine diffs against baseline.
///
/// VaR and LCR are not recomputed here: the historical P&L series and the
/// liquidity inputs are not coupled to the market-data shocks this engine
/// models (no shock variant touches either), so both are carried over from
/// the baseline snapshot.
fn recompute_stress_metrics(
    shocked_snapshot: &MarketDataSnapshot,
    inputs: &ComputeInputs,
    baseline_var_1d_95: f64,
    baseline_lcr_ratio: f64,
) -> Result<StressMetrics, EngineError> {
    let market = MarketView::build(shocked_snapshot)?;

    let priced: Vec<PricedPosition> = inputs
        .positions
        .iter()
        .filter_map(|p| price_position(p, &inputs.portfolio, &market, &inputs.config).ok())
        .collect();

    let total_mv: f64 = priced.iter().map(|p| p.mv).sum();
    let position_mv: Vec<(PositionId, f64)> = priced.iter().map(|p| (p.id.clone(), p.mv)).collect();

    let capital_block = build_capital_block(&priced, inputs).map_err(|e| EngineError::InputValidation(e.to_string()))?;

    Ok(StressMetrics {
        total_mv,
        var_1d_95: baseline_var_1d_95,
        total_k_req: capital_block.total_k_req,
        capital_ratio: capital_block.capital_ratio,
        lcr_ratio: baseline_lcr_ratio,
        position_mv,
    })
}

/// C11: tally the alerts raised by the limit evaluator into severity bands.
fn build_alerts_summary(
    portfolio_id: &PortfolioId,
    metrics: &[(String, f64)],
    limits: &[Limit],
    capital_ratio: Option<f64>,
    lcr_ratio: Option<f64>,
    created_at: DateTime<Utc>,
) -> (AlertsSummary, Vec<Alert>) {
    let alerts = crate::limits::evaluate(portfolio_id, metrics, limits, capital_ratio, lcr_ratio, created_at);

    let mut summary = AlertsSummary::default();
    let evaluated_count = metrics.iter().filter(|(code, _)| limits.iter().any(|l| &l.metric_code == code)).count()
        + capital_ratio.is_some() as usize
        + lcr_ratio.is_some() as usize;

    for alert in &alerts {
        match alert.severity {
            risk_domain::AlertSeverity::Green => summary.green += 1,
            risk_domain::AlertSeverity::Yellow => summary.yellow += 1,
            risk_domain::AlertSeverity::Red => summary.red += 1,
            risk_domain::AlertSeverity::Critical => summary.critical += 1,
        }
    }
    summary.green += (evaluated_count - alerts.len()) as u32;

    (summary, alerts)
}

fn failed_snapshot(
    portfolio_id: PortfolioId,
    as_of_date: Date,
    engine_version: String,
    market_data_snapshot_id: String,
    error: impl std::fmt::Display,
) -> RiskSnapshot {
    RiskSnapshot {
        portfolio_id,
        as_of_date,
        calculated_at: Utc::now(),
        engine_version,
        market_data_snapshot_id,
        status: SnapshotStatus::Failed,
        market: None,
        credit: None,
        ccr: None,
        liquidity: None,
        capital: None,
        stress: None,
        alerts_summary: AlertsSummary::default(),
        error_message: Some(error.to_string()),
    }
}

/// Run the full C1-C13 pipeline for one portfolio, producing its immutable
/// [`RiskSnapshot`].
///
/// Never returns an `Err`: every failure short of a fatal one (`Cancelled`,
/// `DeadlineExceeded`, or C1 itself failing) is captured as a `Partial`
/// snapshot with the affected sub-block set to `None`, per §7's propagation
/// policy. The caller distinguishes these cases by inspecting `status` and
/// `error_message`.
pub fn compute_snapshot(inputs: &ComputeInputs, token: &CancellationToken) -> RiskSnapshot {
    let as_of_date = inputs.market_snapshot.as_of_date;
    let market_data_snapshot_id = inputs.market_snapshot.content_hash();
    let budget = DeadlineBudget::start(inputs.config.deadline_ms);

    let market = match MarketView::build(&inputs.market_snapshot) {
        Ok(m) => m,
        Err(e) => {
            return failed_snapshot(
                inputs.portfolio.id.clone(),
                as_of_date,
                inputs.config.engine_version.clone(),
                market_data_snapshot_id,
                RiskEngineError::from(e),
            )
        }
    };

    if let Err(e) = cancellation::check(token, &budget, "C1") {
        return failed_snapshot(
            inputs.portfolio.id.clone(),
            as_of_date,
            inputs.config.engine_version.clone(),
            market_data_snapshot_id,
            RiskEngineError::from(e),
        );
    }

    let dq_report = crate::data_quality::evaluate(
        &inputs.market_snapshot,
        &inputs.positions,
        &inputs.issuers,
        inputs.previous_market_snapshot.as_ref(),
        Utc::now(),
    );

    if let Err(e) = cancellation::check(token, &budget, "C2") {
        return failed_snapshot(
            inputs.portfolio.id.clone(),
            as_of_date,
            inputs.config.engine_version.clone(),
            market_data_snapshot_id,
            RiskEngineError::from(e),
        );
    }

    let pricing_candidates: Vec<&Position> = inputs
        .positions
        .iter()
        .filter(|p| !dq_report.unpriced_positions.contains(&p.id))
        .collect();

    let price_all = || {
        pricing_candidates
            .par_iter()
            .filter_map(|p| price_position(p, &inputs.portfolio, &market, &inputs.config).ok())
            .collect::<Vec<PricedPosition>>()
    };
    let priced: Vec<PricedPosition> = match rayon::ThreadPoolBuilder::new().num_threads(inputs.config.parallelism).build() {
        Ok(pool) => pool.install(price_all),
        Err(_) => price_all(),
    };

    let mut status = SnapshotStatus::Success;
    if priced.len() < inputs.positions.len() {
        status = SnapshotStatus::Partial;
    }

    if let Err(e) = cancellation::check(token, &budget, "C3/C4") {
        return failed_snapshot(
            inputs.portfolio.id.clone(),
            as_of_date,
            inputs.config.engine_version.clone(),
            market_data_snapshot_id,
            RiskEngineError::from(e),
        );
    }

    let market_block = match build_market_block(&priced, &inputs.pnl_history, &inputs.config) {
        Ok(b) => Some(b),
        Err(_) => {
            status = SnapshotStatus::Partial;
            None
        }
    };

    if let Err(e) = cancellation::check(token, &budget, "C5") {
        return failed_snapshot(
            inputs.portfolio.id.clone(),
            as_of_date,
            inputs.config.engine_version.clone(),
            market_data_snapshot_id,
            RiskEngineError::from(e),
        );
    }

    let (credit_block, ccr_block) = match build_credit_and_ccr(&priced, inputs, &market) {
        Ok((c, r)) => (Some(c), Some(r)),
        Err(_) => {
            status = SnapshotStatus::Partial;
            (None, None)
        }
    };

    if let Err(e) = cancellation::check(token, &budget, "C6/C7") {
        return failed_snapshot(
            inputs.portfolio.id.clone(),
            as_of_date,
            inputs.config.engine_version.clone(),
            market_data_snapshot_id,
            RiskEngineError::from(e),
        );
    }

    let liquidity_block = match build_liquidity_block(&priced, inputs) {
        Ok(b) => Some(b),
        Err(_) => {
            status = SnapshotStatus::Partial;
            None
        }
    };

    if let Err(e) = cancellation::check(token, &budget, "C8") {
        return failed_snapshot(
            inputs.portfolio.id.clone(),
            as_of_date,
            inputs.config.engine_version.clone(),
            market_data_snapshot_id,
            RiskEngineError::from(e),
        );
    }

    let capital_block = match build_capital_block(&priced, inputs) {
        Ok(b) => Some(b),
        Err(_) => {
            status = SnapshotStatus::Partial;
            None
        }
    };

    if let Err(e) = cancellation::check(token, &budget, "C9") {
        return failed_snapshot(
            inputs.portfolio.id.clone(),
            as_of_date,
            inputs.config.engine_version.clone(),
            market_data_snapshot_id,
            RiskEngineError::from(e),
        );
    }

    let stress_results = if let (Some(mb), Some(lb), Some(cb)) =
        (&market_block, &liquidity_block, &capital_block)
    {
        let currencies: Vec<String> = inputs
            .market_snapshot
            .curve_points
            .iter()
            .map(|c| c.currency.code().to_string())
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        let underlyings: Vec<String> = inputs
            .market_snapshot
            .vol_points
            .iter()
            .map(|v| v.underlying.clone())
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        let scenarios: Vec<Scenario> = stress::standard_scenarios(&currencies, &underlyings);

        let baseline_metrics = StressMetrics {
            total_mv: priced.iter().map(|p| p.mv).sum(),
            var_1d_95: mb.var_1d_95,
            total_k_req: cb.total_k_req,
            capital_ratio: cb.capital_ratio,
            lcr_ratio: lb.lcr_ratio,
            position_mv: priced.iter().map(|p| (p.id.clone(), p.mv)).collect(),
        };

        let mut results = Vec::with_capacity(scenarios.len());
        for scenario in &scenarios {
            let result = stress::run_scenario(scenario, &inputs.market_snapshot, &baseline_metrics, |shocked| {
                recompute_stress_metrics(shocked, inputs, mb.var_1d_95, lb.lcr_ratio)
            });
            match result {
                Ok(r) => results.push(r),
                Err(_) => status = SnapshotStatus::Partial,
            }
        }
        Some(results)
    } else {
        None
    };

    if let Err(e) = cancellation::check(token, &budget, "C10") {
        return failed_snapshot(
            inputs.portfolio.id.clone(),
            as_of_date,
            inputs.config.engine_version.clone(),
            market_data_snapshot_id,
            RiskEngineError::from(e),
        );
    }

    let mut metrics = Vec::new();
    if let Some(mb) = &market_block {
        metrics.push(("var_1d_95".to_string(), mb.var_1d_95));
        metrics.push(("stressed_var".to_string(), mb.stressed_var));
        metrics.push(("dv01_total".to_string(), mb.dv01_total));
    }
    if let Some(rb) = &credit_block {
        metrics.push(("expected_loss".to_string(), rb.expected_loss));
    }
    if let Some(cb) = &ccr_block {
        metrics.push(("ead_total".to_string(), cb.ead_total));
    }

    let (alerts_summary, _alerts) = build_alerts_summary(
        &inputs.portfolio.id,
        &metrics,
        &inputs.limits,
        capital_block.as_ref().map(|c| c.capital_ratio),
        liquidity_block.as_ref().map(|l| l.lcr_ratio),
        Utc::now(),
    );

    if dq_report.has_errors() && market_block.is_none() && credit_block.is_none() {
        status = SnapshotStatus::Partial;
    }

    let error_message = if status == SnapshotStatus::Partial {
        Some(format!(
            "{} of {} positions priced; one or more sub-blocks could not be computed",
            priced.len(),
            inputs.positions.len()
        ))
    } else {
        None
    };

    RiskSnapshot {
        portfolio_id: inputs.portfolio.id.clone(),
        as_of_date,
        calculated_at: Utc::now(),
        engine_version: inputs.config.engine_version.clone(),
        market_data_snapshot_id,
        status,
        market: market_block,
        credit: credit_block,
        ccr: ccr_block,
        liquidity: liquidity_block,
        capital: capital_block,
        stress: stress_results,
        alerts_summary,
        error_message,
    }
}

/// C2 as a standalone entry point: run data quality over a market snapshot
/// and position book without computing a full risk snapshot.
pub fn evaluate_dq(
    market_snapshot: &MarketDataSnapshot,
    positions: &[Position],
    issuers: &[Issuer],
    previous_market_snapshot: Option<&MarketDataSnapshot>,
    detected_at: DateTime<Utc>,
) -> Vec<risk_domain::DataQualityIssue> {
    crate::data_quality::evaluate(market_snapshot, positions, issuers, previous_market_snapshot, detected_at).issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use risk_domain::{
        BondTerms, CurvePoint, InstrumentTerms, PortfolioType, PriceQuote,
    };
    use std::collections::BTreeMap;

    fn usd() -> Currency {
        "USD".parse().unwrap()
    }

    fn base_portfolio() -> Portfolio {
        Portfolio::new("PORT-1", PortfolioType::BondDealer, usd(), true)
    }

    fn base_config() -> EngineConfig {
        EngineConfig::new(
            "1.0.0",
            Date::from_ymd(2008, 9, 1).unwrap(),
            Date::from_ymd(2009, 3, 31).unwrap(),
        )
        .unwrap()
    }

    fn zero_coupon_bond() -> Position {
        Position {
            id: "POS-1".into(),
            portfolio_id: "PORT-1".into(),
            kind: InstrumentKind::Bond,
            notional: 1_000_000.0,
            trade_date: Date::from_ymd(2019, 1, 1).unwrap(),
            maturity_date: Date::from_ymd(2024, 1, 1).unwrap(),
            terms: InstrumentTerms::Bond(BondTerms {
                isin: "US0000000001".into(),
                coupon_rate: 0.0,
                coupon_frequency: 1,
                day_count: risk_core::time::DayCountConvention::Actual365,
            }),
        }
    }

    fn flat_snapshot(as_of: Date, rate: f64) -> MarketDataSnapshot {
        MarketDataSnapshot::new(
            as_of,
            BTreeMap::new(),
            vec![
                CurvePoint { currency: usd(), tenor_years: 0.5, zero_rate: rate },
                CurvePoint { currency: usd(), tenor_years: 30.0, zero_rate: rate },
            ],
            vec![],
            vec![],
            vec![],
        )
    }

    fn pnl_history(_as_of: Date) -> Vec<var::PnlObservation> {
        let start = Date::from_ymd(2024, 1, 1).unwrap().into_inner();
        (0..300)
            .map(|i| {
                let date = start + chrono::Duration::days(i);
                var::PnlObservation {
                    date: Date::from_ymd(
                        chrono::Datelike::year(&date),
                        chrono::Datelike::month(&date),
                        chrono::Datelike::day(&date),
                    )
                    .unwrap(),
                    pnl: (i as f64) - 150.0,
                }
            })
            .collect()
    }

    fn minimal_inputs() -> ComputeInputs {
        let as_of = Date::from_ymd(2024, 1, 1).unwrap();
        ComputeInputs {
            portfolio: base_portfolio(),
            positions: vec![zero_coupon_bond()],
            counterparties: vec![],
            issuers: vec![],
            isin_issuer: HashMap::new(),
            market_snapshot: flat_snapshot(as_of, 0.05),
            previous_market_snapshot: None,
            pnl_history: pnl_history(as_of),
            limits: vec![],
            tier1_capital: 200_000.0,
            tier2_capital: 20_000.0,
            trailing_quarterly_aum: 0.0,
            avg_segregated_client_funds: 0.0,
            client_funds_guaranteed: false,
            annualized_order_volume: 0.0,
            coh_percentage: 0.0,
            hqla_holdings: vec![],
            outflow_items: vec![],
            inflows_30d: 0.0,
            config: base_config(),
        }
    }

    #[test]
    fn test_compute_snapshot_succeeds_on_minimal_book() {
        let inputs = minimal_inputs();
        let snapshot = compute_snapshot(&inputs, &CancellationToken::new());
        assert!(matches!(snapshot.status, SnapshotStatus::Success | SnapshotStatus::Partial));
        assert!(snapshot.market.is_some());
        assert!(snapshot.capital.is_some());
    }

    #[test]
    fn test_compute_snapshot_fails_on_missing_curve() {
        let mut inputs = minimal_inputs();
        inputs.market_snapshot = flat_snapshot(inputs.market_snapshot.as_of_date, 0.05);
        inputs.portfolio = Portfolio::new("PORT-1", PortfolioType::BondDealer, "EUR".parse().unwrap(), true);
        let snapshot = compute_snapshot(&inputs, &CancellationToken::new());
        assert_eq!(snapshot.status, SnapshotStatus::Partial);
    }

    #[test]
    fn test_compute_snapshot_is_failed_when_cancelled_up_front() {
        let inputs = minimal_inputs();
        let token = CancellationToken::new();
        token.cancel();
        let snapshot = compute_snapshot(&inputs, &token);
        assert_eq!(snapshot.status, SnapshotStatus::Failed);
        assert!(snapshot.error_message.is_some());
    }

    #[test]
    fn test_evaluate_dq_reports_zero_price() {
        let as_of = Date::from_ymd(2024, 1, 1).unwrap();
        let mut prices = BTreeMap::new();
        prices.insert(
            Isin::from("US0000000001"),
            PriceQuote {
                clean_price: 0.0,
                quoted_yield: None,
                spread_bps: None,
                bid: 1.0,
                ask: 1.01,
                volume: 0.0,
                days_since_trade: 0,
            },
        );
        let snapshot = MarketDataSnapshot::new(as_of, prices, vec![], vec![], vec![], vec![]);
        let issues = evaluate_dq(&snapshot, &[zero_coupon_bond()], &[], None, Utc::now());
        assert!(issues.iter().any(|i| i.code == crate::data_quality::rule::ZERO_PRICE));
    }
}
