//! `RiskSnapshot`: the immutable output root assembled by C13.

use chrono::{DateTime, Utc};
use risk_core::time::Date;
use serde::{Deserialize, Serialize};

use crate::ids::{PortfolioId, PositionId};

/// Rounds a currency amount to 2 decimal places at serialization time;
/// internal computation stays full-precision. `NaN`/`±inf` pass through
/// unchanged since they carry no fractional cents to round.
fn round2<S>(value: &f64, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    if value.is_finite() {
        serializer.serialize_f64((value * 100.0).round() / 100.0)
    } else {
        serializer.serialize_f64(*value)
    }
}

/// Rounds the delta-MV half of each `(position_id, delta_mv)` pair.
fn round2_contributors<S>(value: &[(PositionId, f64)], serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    use serde::ser::SerializeSeq;
    let mut seq = serializer.serialize_seq(Some(value.len()))?;
    for (id, delta_mv) in value {
        let rounded = if delta_mv.is_finite() { (delta_mv * 100.0).round() / 100.0 } else { *delta_mv };
        seq.serialize_element(&(id, rounded))?;
    }
    seq.end()
}

/// Lifecycle status of a snapshot (§4.13's `Pending -> Running -> {Success |
/// Partial | Failed}` state machine; `Pending`/`Running` are transient and
/// never appear on a persisted snapshot).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SnapshotStatus {
    /// Every sub-block computed successfully.
    Success,
    /// At least one sub-block or position failed; surviving sub-blocks are
    /// populated, failed ones are `None`.
    Partial,
    /// The market data view (C1) could not be built, or the computation was
    /// cancelled/timed out before any sub-block completed.
    Failed,
}

/// Market risk metrics (C3-C5 aggregates).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MarketBlock {
    /// 1-day 95% historical VaR.
    #[serde(serialize_with = "round2")]
    pub var_1d_95: f64,
    /// VaR computed over the configured stress window.
    #[serde(serialize_with = "round2")]
    pub stressed_var: f64,
    /// Portfolio DV01, summed across positions.
    #[serde(serialize_with = "round2")]
    pub dv01_total: f64,
    /// MV-weighted modified duration.
    pub duration: f64,
    /// MV-weighted convexity.
    pub convexity: f64,
}

/// Credit risk metrics (C6 aggregates).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CreditBlock {
    /// Total issuer exposure (`Σ bond_MV`).
    #[serde(serialize_with = "round2")]
    pub total_exposure: f64,
    /// Total expected loss (`Σ PD·LGD·EAD`).
    #[serde(serialize_with = "round2")]
    pub expected_loss: f64,
    /// Total CVA across counterparties.
    #[serde(serialize_with = "round2")]
    pub cva_total: f64,
}

/// Counterparty credit risk metrics (C7 aggregates).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CcrBlock {
    /// Current exposure summed across counterparties.
    #[serde(serialize_with = "round2")]
    pub pfe_current: f64,
    /// Peak PFE across the CVA bucket grid.
    #[serde(serialize_with = "round2")]
    pub pfe_peak: f64,
    /// Total EAD_CCR across counterparties.
    #[serde(serialize_with = "round2")]
    pub ead_total: f64,
}

/// Liquidity metrics (C8 aggregates).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LiquidityBlock {
    /// HQLA / net 30-day outflows. `f64::INFINITY` when net outflows <= 0.
    pub lcr_ratio: f64,
    /// Short-term funding gap.
    #[serde(serialize_with = "round2")]
    pub funding_gap_short_term: f64,
    /// 1-day liquidation cost.
    #[serde(serialize_with = "round2")]
    pub liquidation_cost_1d: f64,
    /// 5-day liquidation cost.
    #[serde(serialize_with = "round2")]
    pub liquidation_cost_5d: f64,
    /// Composite liquidity score.
    pub liquidity_score: f64,
}

/// Capital adequacy metrics (C9 aggregates).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CapitalBlock {
    /// Net position risk capital component.
    #[serde(serialize_with = "round2")]
    pub k_npr: f64,
    /// Assets-under-management capital component.
    #[serde(serialize_with = "round2")]
    pub k_aum: f64,
    /// Client-money-held capital component.
    #[serde(serialize_with = "round2")]
    pub k_cmh: f64,
    /// Client-orders-handled capital component.
    #[serde(serialize_with = "round2")]
    pub k_coh: f64,
    /// `max(permanent_minimum_capital, sum_K)`.
    #[serde(serialize_with = "round2")]
    pub total_k_req: f64,
    /// `Tier1 + min(Tier2, 0.25 * Tier1)`.
    #[serde(serialize_with = "round2")]
    pub own_funds: f64,
    /// `own_funds / total_k_req`.
    pub capital_ratio: f64,
}

/// Result of applying one named stress scenario to one portfolio (C10).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StressResult {
    /// Scenario name.
    pub scenario_name: String,
    /// Portfolio P&L under the shocked market view.
    #[serde(serialize_with = "round2")]
    pub pnl: f64,
    /// Change in VaR relative to the unshocked snapshot.
    #[serde(serialize_with = "round2")]
    pub delta_var: f64,
    /// Change in total required capital.
    #[serde(serialize_with = "round2")]
    pub delta_k: f64,
    /// Change in capital ratio.
    pub delta_capital_ratio: f64,
    /// Change in LCR.
    pub delta_lcr: f64,
    /// Up to 10 positions with the largest absolute MV change, as
    /// `(position_id, delta_mv)` pairs, sorted by `|delta_mv|` descending.
    #[serde(serialize_with = "round2_contributors")]
    pub top_contributors: Vec<(PositionId, f64)>,
}

/// Count of alerts raised per severity band, always present (even on a
/// `Partial`/`Failed` snapshot, where it reflects whatever sub-blocks did
/// complete).
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AlertsSummary {
    /// Count of Green-severity evaluations.
    #[serde(rename = "GREEN")]
    pub green: u32,
    /// Count of Yellow-severity alerts.
    #[serde(rename = "YELLOW")]
    pub yellow: u32,
    /// Count of Red-severity alerts.
    #[serde(rename = "RED")]
    pub red: u32,
    /// Count of Critical-severity alerts.
    #[serde(rename = "CRITICAL")]
    pub critical: u32,
}

/// The immutable output of one `compute_snapshot` invocation.
///
/// Identified by `(portfolio_id, as_of_date, engine_version)` (§3);
/// recomputing with the same inputs must produce byte-equal sub-blocks up to
/// the tolerance in §8.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RiskSnapshot {
    /// Portfolio this snapshot belongs to.
    pub portfolio_id: PortfolioId,
    /// The date the snapshot represents.
    pub as_of_date: Date,
    /// Wall-clock time the computation completed.
    pub calculated_at: DateTime<Utc>,
    /// Compile-time engine version tag; bumped on any methodology change.
    pub engine_version: String,
    /// Content hash of the market data snapshot the computation used.
    pub market_data_snapshot_id: String,
    /// Lifecycle status.
    pub status: SnapshotStatus,
    /// Market risk sub-block; `None` if it failed or was never reached.
    pub market: Option<MarketBlock>,
    /// Credit risk sub-block.
    pub credit: Option<CreditBlock>,
    /// CCR sub-block.
    pub ccr: Option<CcrBlock>,
    /// Liquidity sub-block.
    pub liquidity: Option<LiquidityBlock>,
    /// Capital sub-block.
    pub capital: Option<CapitalBlock>,
    /// Stress scenario results, one per configured scenario.
    pub stress: Option<Vec<StressResult>>,
    /// Alert counts by severity.
    pub alerts_summary: AlertsSummary,
    /// Human-readable cause, populated whenever `status != Success`.
    pub error_message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_snapshot_has_no_sub_blocks() {
        let snapshot = RiskSnapshot {
            portfolio_id: "PORT-1".into(),
            as_of_date: Date::from_ymd(2024, 6, 30).unwrap(),
            calculated_at: Utc::now(),
            engine_version: "1.0.0".to_string(),
            market_data_snapshot_id: "deadbeef".to_string(),
            status: SnapshotStatus::Failed,
            market: None,
            credit: None,
            ccr: None,
            liquidity: None,
            capital: None,
            stress: None,
            alerts_summary: AlertsSummary::default(),
            error_message: Some("MISSING_MARKET_DATA: curve USD".to_string()),
        };
        assert_eq!(snapshot.status, SnapshotStatus::Failed);
        assert!(snapshot.market.is_none());
        assert!(snapshot.error_message.is_some());
    }

    #[test]
    fn test_alerts_summary_serializes_with_uppercase_keys() {
        let summary = AlertsSummary { green: 3, yellow: 1, red: 0, critical: 0 };
        let json = serde_json::to_string(&summary).unwrap();
        assert!(json.contains("\"GREEN\":3"));
        assert!(json.contains("\"CRITICAL\":0"));
    }
}
