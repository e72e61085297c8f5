//! Counterparty credit risk: current exposure, PFE add-ons, ISDA netting,
//! CSA collateral, and CVA (§4.7).

use crate::error::AnalyticsError;

/// Volatility regime multiplier applied to FX and IR PFE add-ons.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VolRegime {
    /// VIX <= 20.
    Normal,
    /// 20 < VIX <= 30.
    Elevated,
    /// VIX > 30.
    Crisis,
}

impl VolRegime {
    fn fx_multiplier(self) -> f64 {
        match self {
            VolRegime::Normal => 1.0,
            VolRegime::Elevated => 1.3,
            VolRegime::Crisis => 1.5,
        }
    }

    fn ir_multiplier(self) -> f64 {
        match self {
            VolRegime::Normal => 1.0,
            VolRegime::Elevated | VolRegime::Crisis => 1.2,
        }
    }
}

/// Counterparty credit factor for FX trades: 1.0% for major pairs, 2.5%
/// for emerging-market pairs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FxCcfClass {
    /// A major currency pair.
    Major,
    /// An emerging-market currency pair.
    EmergingMarket,
}

impl FxCcfClass {
    fn ccf(self) -> f64 {
        match self {
            FxCcfClass::Major => 0.010,
            FxCcfClass::EmergingMarket => 0.025,
        }
    }
}

/// Interest-rate CCF tenor bucket (§4.7).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IrTenorBucket {
    /// 0-1 years.
    UpToOneYear,
    /// 1-5 years.
    OneToFiveYears,
    /// 5-10 years.
    FiveToTenYears,
    /// Beyond 10 years.
    OverTenYears,
}

impl IrTenorBucket {
    /// Classify a tenor (in years) into its CCF bucket.
    pub fn for_tenor(tenor_years: f64) -> Self {
        if tenor_years <= 1.0 {
            IrTenorBucket::UpToOneYear
        } else if tenor_years <= 5.0 {
            IrTenorBucket::OneToFiveYears
        } else if tenor_years <= 10.0 {
            IrTenorBucket::FiveToTenYears
        } else {
            IrTenorBucket::OverTenYears
        }
    }

    fn ccf(self) -> f64 {
        match self {
            IrTenorBucket::UpToOneYear => 0.0,
            IrTenorBucket::OneToFiveYears => 0.005,
            IrTenorBucket::FiveToTenYears => 0.010,
            IrTenorBucket::OverTenYears => 0.015,
        }
    }
}

/// A single trade's contribution to a counterparty's PFE, ahead of netting.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TradePfeAddOn {
    /// FX forward/option notional add-on.
    Fx {
        /// Trade notional.
        notional: f64,
        /// Time to maturity, in years.
        tenor_years: f64,
        /// Major/EM classification.
        ccf_class: FxCcfClass,
        /// Prevailing volatility regime.
        regime: VolRegime,
    },
    /// Interest-rate swap/cap/floor/swaption notional add-on.
    Ir {
        /// Trade notional.
        notional: f64,
        /// Time to maturity, in years.
        tenor_years: f64,
        /// Prevailing volatility regime.
        regime: VolRegime,
    },
    /// A long option position: PFE capped at the premium paid.
    LongOption {
        /// Premium paid for the option.
        premium_paid: f64,
        /// Firm-wide cap on long-option PFE recognition.
        cap_policy: f64,
    },
    /// A short option position: PFE driven by current delta exposure.
    ShortOption {
        /// Absolute delta of the position.
        abs_delta: f64,
        /// Trade notional.
        notional: f64,
        /// Counterparty credit factor for the underlying asset class.
        ccf: f64,
    },
}

/// Per-trade PFE add-on before netting (§4.7).
pub fn trade_pfe_add_on(trade: TradePfeAddOn) -> f64 {
    match trade {
        TradePfeAddOn::Fx {
            notional,
            tenor_years,
            ccf_class,
            regime,
        } => notional * ccf_class.ccf() * (tenor_years / 250.0).sqrt() * regime.fx_multiplier(),
        TradePfeAddOn::Ir {
            notional,
            tenor_years,
            regime,
        } => {
            let bucket = IrTenorBucket::for_tenor(tenor_years);
            notional * bucket.ccf() * (tenor_years / 250.0).sqrt() * regime.ir_multiplier()
        }
        TradePfeAddOn::LongOption {
            premium_paid,
            cap_policy,
        } => premium_paid.min(cap_policy),
        TradePfeAddOn::ShortOption {
            abs_delta,
            notional,
            ccf,
        } => abs_delta * notional * ccf,
    }
}

/// How trades within a netting set relate to one another, driving the
/// §4.7 portfolio factor applied once `trades_per_cpty > 10`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PortfolioDirectionality {
    /// All trades point the same direction.
    SameDirection,
    /// Trades point in mixed directions.
    Mixed,
    /// Net delta is within 5% of gross delta (near flat).
    NearFlat,
}

impl PortfolioDirectionality {
    fn factor(self) -> f64 {
        match self {
            PortfolioDirectionality::SameDirection => 0.8,
            PortfolioDirectionality::Mixed => 1.0,
            PortfolioDirectionality::NearFlat => 0.5,
        }
    }
}

/// Net potential future exposure for a counterparty: ISDA netting,
/// optional CSA collateral adjustment, and the large-portfolio factor.
///
/// # Errors
/// `AnalyticsError::NumericInstability` if any add-on is negative.
pub fn net_pfe(
    trade_add_ons: &[f64],
    isda_netting: bool,
    trade_count: usize,
    directionality: PortfolioDirectionality,
    collateral_held: f64,
    threshold: f64,
) -> Result<f64, AnalyticsError> {
    if trade_add_ons.iter().any(|v| *v < 0.0 || !v.is_finite()) {
        return Err(AnalyticsError::NumericInstability(
            "PFE add-ons must be non-negative and finite".to_string(),
        ));
    }

    let gross: f64 = trade_add_ons.iter().sum();
    let netted = if isda_netting {
        trade_add_ons.iter().map(|v| v * v).sum::<f64>().sqrt() * 0.6
    } else {
        gross
    };

    let with_portfolio_factor = if trade_count > 10 {
        netted * directionality.factor()
    } else {
        netted
    };

    let adjusted = (with_portfolio_factor - collateral_held + threshold).max(0.0);
    Ok(adjusted)
}

/// `EAD_CCR = CE + AdjPFE`, `CE = max(MtM, 0)`.
pub fn ead_ccr(mtm: f64, adj_pfe: f64) -> f64 {
    mtm.max(0.0) + adj_pfe
}

/// PD at horizon `t` (years), from a CDS spread when available or a
/// cumulative-hazard approximation off the 1-year rating PD otherwise.
pub fn pd_at_horizon(t: f64, cds_spread_bps: Option<f64>, lgd: f64, pd_1y: f64) -> f64 {
    match cds_spread_bps {
        Some(spread_bps) => {
            let s = spread_bps / 10_000.0;
            1.0 - (-s * t / lgd).exp()
        }
        None => 1.0 - (1.0 - pd_1y).powf(t),
    }
}

/// CVA buckets, capped at the counterparty's maximum trade maturity.
pub const CVA_BUCKETS_YEARS: [f64; 6] = [0.25, 0.5, 1.0, 2.0, 3.0, 5.0];

/// CVA for one counterparty, summed across the standard tenor buckets
/// (§4.7), each capped at `max_maturity_years`.
///
/// `ce` is the counterparty's current exposure; `pfe_total` its netted PFE.
pub fn counterparty_cva(
    ce: f64,
    pfe_total: f64,
    lgd: f64,
    risk_free_rate: f64,
    cds_spread_bps: Option<f64>,
    pd_1y: f64,
    max_maturity_years: f64,
) -> f64 {
    let mut cva = 0.0;
    let mut pd_prev = 0.0;
    for &bucket in CVA_BUCKETS_YEARS.iter() {
        let t = bucket.min(max_maturity_years);
        if t <= 0.0 {
            break;
        }
        let ead_t = ce + pfe_total * (t / max_maturity_years).sqrt();
        let df_t = (-risk_free_rate * t).exp();
        let pd_t = pd_at_horizon(t, cds_spread_bps, lgd, pd_1y);
        cva += (pd_t - pd_prev) * df_t * ead_t;
        pd_prev = pd_t;
        if bucket >= max_maturity_years {
            break;
        }
    }
    lgd * cva
}
