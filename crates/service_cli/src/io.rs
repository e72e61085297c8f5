//! On-disk book and config schema.
//!
//! [`risk_engine::ComputeInputs`] bundles several analytics-crate types
//! (`PnlObservation`, `HqlaHolding`, `OutflowItem`) that carry no serde
//! derive of their own, since `risk_analytics` has no reason to depend on
//! serde. This module defines the CLI-facing JSON shape and translates it
//! into `ComputeInputs`, the same role an adapter layer plays in front of
//! any engine that doesn't serialize its own internals.

use std::collections::HashMap;

use risk_analytics::{liquidity, var};
use risk_core::time::Date;
use risk_domain::{
    Counterparty, EngineConfig, Isin, IssuerId, Issuer, Limit, MarketDataSnapshot, Portfolio,
    Position,
};
use risk_engine::ComputeInputs;
use serde::{Deserialize, Serialize};

/// One `PnlObservation` as it appears on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PnlObservationFile {
    /// Trading date the P&L was realized.
    pub date: Date,
    /// Realized P&L for the day.
    pub pnl: f64,
}

/// One HQLA holding as it appears on disk. `class` is a tagged union
/// matching [`liquidity::HqlaClass`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "class", rename_all = "snake_case")]
pub enum HqlaClassFile {
    /// Level 1 HQLA: cash, reserves, AAA/AA sovereigns.
    Level1,
    /// Level 2A HQLA.
    Level2A,
    /// Level 2B HQLA.
    Level2B {
        /// Whether this holding qualifies for the preferential 0.75 haircut.
        eligible_preferential: bool,
    },
}

impl From<HqlaClassFile> for liquidity::HqlaClass {
    fn from(value: HqlaClassFile) -> Self {
        match value {
            HqlaClassFile::Level1 => liquidity::HqlaClass::Level1,
            HqlaClassFile::Level2A => liquidity::HqlaClass::Level2A,
            HqlaClassFile::Level2B { eligible_preferential } => {
                liquidity::HqlaClass::Level2B { eligible_preferential }
            }
        }
    }
}

/// One HQLA holding line, on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HqlaHoldingFile {
    /// Holding amount.
    pub amount: f64,
    /// HQLA class.
    #[serde(flatten)]
    pub class: HqlaClassFile,
}

/// The outflow class, on disk, matching [`liquidity::OutflowClass`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutflowClassFile {
    /// Retail deposits.
    Retail,
    /// Wholesale unsecured funding.
    WholesaleUnsecured,
    /// Secured funding.
    Secured,
    /// Projected derivative collateral calls.
    DerivativeCollateral,
    /// Committed credit/liquidity facilities.
    CommittedFacility,
    /// Maturing debt.
    DebtMaturity,
}

impl From<OutflowClassFile> for liquidity::OutflowClass {
    fn from(value: OutflowClassFile) -> Self {
        match value {
            OutflowClassFile::Retail => liquidity::OutflowClass::Retail,
            OutflowClassFile::WholesaleUnsecured => liquidity::OutflowClass::WholesaleUnsecured,
            OutflowClassFile::Secured => liquidity::OutflowClass::Secured,
            OutflowClassFile::DerivativeCollateral => liquidity::OutflowClass::DerivativeCollateral,
            OutflowClassFile::CommittedFacility => liquidity::OutflowClass::CommittedFacility,
            OutflowClassFile::DebtMaturity => liquidity::OutflowClass::DebtMaturity,
        }
    }
}

/// One outflow line, on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutflowItemFile {
    /// Notional amount subject to run-off.
    pub amount: f64,
    /// Regulatory class.
    pub class: OutflowClassFile,
    /// Applied run-off rate.
    pub rate: f64,
}

/// The capital/liquidity scalars a book file carries alongside its
/// position and market data, since these don't belong to any position.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FirmScalars {
    /// Tier 1 own funds.
    #[serde(default)]
    pub tier1_capital: f64,
    /// Tier 2 own funds.
    #[serde(default)]
    pub tier2_capital: f64,
    /// Trailing quarterly assets under management.
    #[serde(default)]
    pub trailing_quarterly_aum: f64,
    /// Average segregated client funds held.
    #[serde(default)]
    pub avg_segregated_client_funds: f64,
    /// Whether segregated client funds carry a third-party guarantee.
    #[serde(default)]
    pub client_funds_guaranteed: bool,
    /// Annualized client order handling volume.
    #[serde(default)]
    pub annualized_order_volume: f64,
    /// Configured K-COH percentage.
    #[serde(default)]
    pub coh_percentage: f64,
    /// Expected 30-day cash inflows.
    #[serde(default)]
    pub inflows_30d: f64,
}

/// The full on-disk book: a portfolio's positions and reference data, the
/// raw market data snapshot driving valuation, and the firm-level scalars
/// feeding liquidity and capital.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookFile {
    /// The portfolio being computed.
    pub portfolio: Portfolio,
    /// Positions owned by the portfolio.
    #[serde(default)]
    pub positions: Vec<Position>,
    /// Counterparty reference data.
    #[serde(default)]
    pub counterparties: Vec<Counterparty>,
    /// Issuer reference data.
    #[serde(default)]
    pub issuers: Vec<Issuer>,
    /// ISIN to issuer id links, as `(isin, issuer_id)` pairs.
    #[serde(default)]
    pub isin_issuer: Vec<(Isin, IssuerId)>,
    /// Raw market data for the as-of date.
    pub market_snapshot: MarketDataSnapshot,
    /// The prior day's raw market data, if available.
    #[serde(default)]
    pub previous_market_snapshot: Option<MarketDataSnapshot>,
    /// Trailing daily P&L history.
    #[serde(default)]
    pub pnl_history: Vec<PnlObservationFile>,
    /// Configured limits.
    #[serde(default)]
    pub limits: Vec<Limit>,
    /// HQLA holdings.
    #[serde(default)]
    pub hqla_holdings: Vec<HqlaHoldingFile>,
    /// Outflow items.
    #[serde(default)]
    pub outflow_items: Vec<OutflowItemFile>,
    /// Firm-level scalars.
    #[serde(default)]
    pub scalars: FirmScalars,
}

impl BookFile {
    /// Translate this on-disk book, plus an already-loaded engine config,
    /// into the compute inputs `risk_engine::compute_snapshot` expects.
    pub fn into_compute_inputs(self, config: EngineConfig) -> ComputeInputs {
        ComputeInputs {
            portfolio: self.portfolio,
            positions: self.positions,
            counterparties: self.counterparties,
            issuers: self.issuers,
            isin_issuer: self.isin_issuer.into_iter().collect::<HashMap<_, _>>(),
            market_snapshot: self.market_snapshot,
            previous_market_snapshot: self.previous_market_snapshot,
            pnl_history: self
                .pnl_history
                .into_iter()
                .map(|p| var::PnlObservation { date: p.date, pnl: p.pnl })
                .collect(),
            limits: self.limits,
            tier1_capital: self.scalars.tier1_capital,
            tier2_capital: self.scalars.tier2_capital,
            trailing_quarterly_aum: self.scalars.trailing_quarterly_aum,
            avg_segregated_client_funds: self.scalars.avg_segregated_client_funds,
            client_funds_guaranteed: self.scalars.client_funds_guaranteed,
            annualized_order_volume: self.scalars.annualized_order_volume,
            coh_percentage: self.scalars.coh_percentage,
            hqla_holdings: self
                .hqla_holdings
                .into_iter()
                .map(|h| liquidity::HqlaHolding { amount: h.amount, class: h.class.into() })
                .collect(),
            outflow_items: self
                .outflow_items
                .into_iter()
                .map(|o| liquidity::OutflowItem {
                    amount: o.amount,
                    class: o.class.into(),
                    rate: o.rate,
                })
                .collect(),
            inflows_30d: self.scalars.inflows_30d,
            config,
        }
    }
}

/// Load and parse a JSON book file from disk.
pub fn load_book(path: &str) -> crate::Result<BookFile> {
    if !std::path::Path::new(path).exists() {
        return Err(crate::CliError::FileNotFound(path.to_string()));
    }
    let raw = std::fs::read_to_string(path)?;
    serde_json::from_str(&raw).map_err(|source| crate::CliError::Parse { path: path.to_string(), source })
}

/// Load and parse a TOML engine config file from disk.
pub fn load_config(path: &str) -> crate::Result<EngineConfig> {
    if !std::path::Path::new(path).exists() {
        return Err(crate::CliError::FileNotFound(path.to_string()));
    }
    let raw = std::fs::read_to_string(path)?;
    let config: EngineConfig =
        toml::from_str(&raw).map_err(|source| crate::CliError::ParseToml { path: path.to_string(), source })?;
    config
        .validate()
        .map_err(|e| crate::CliError::InvalidConfig(e.to_string()))?;
    Ok(config)
}
