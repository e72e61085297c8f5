//! `EngineConfig`: the recognized, validated configuration options of §6.

use risk_core::error::RiskEngineError;
use risk_core::time::Date;
use serde::{Deserialize, Serialize};

/// Volatility regime used by the CCR PFE add-on's `vol_mult` (§4.7).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum VolRegime {
    /// `vol_mult = 1.0`.
    Normal,
    /// `vol_mult = 1.3` (VIX > 20).
    Elevated,
    /// `vol_mult = 1.5` (VIX > 30).
    Crisis,
    /// Derive the regime from observed market data rather than a fixed
    /// override.
    Auto,
}

/// The flat, immutable, validated configuration record of §6.
///
/// Unknown TOML fields are rejected at deserialization (`deny_unknown_fields`)
/// per §9's design note, preventing silent semantic drift across engine
/// versions; range checks beyond what serde can express live in
/// [`EngineConfig::new`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    /// Identity tag of calculation semantics; must change on any methodology
    /// change (§4.13).
    pub engine_version: String,
    /// Rolling VaR window, in trading days.
    #[serde(default = "default_var_window_days")]
    pub var_window_days: usize,
    /// VaR confidence level.
    #[serde(default = "default_var_confidence")]
    pub var_confidence: f64,
    /// Stressed-VaR window start date.
    pub var_stress_window_start: Date,
    /// Stressed-VaR window end date.
    pub var_stress_window_end: Date,
    /// Fixed volatility regime, or `Auto` to derive it from market data.
    #[serde(default = "default_vol_regime")]
    pub vol_regime_override: VolRegime,
    /// Level 2A HQLA cap as a fraction of total HQLA.
    #[serde(default = "default_lcr_l2a_cap")]
    pub lcr_l2a_cap: f64,
    /// Level 2B HQLA cap as a fraction of total HQLA.
    #[serde(default = "default_lcr_l2b_cap")]
    pub lcr_l2b_cap: f64,
    /// Cap on inflows as a fraction of outflows.
    #[serde(default = "default_lcr_inflow_cap")]
    pub lcr_inflow_cap: f64,
    /// Permanent minimum capital requirement (PMC), in EUR.
    #[serde(default = "default_permanent_min_capital_eur")]
    pub permanent_min_capital_eur: f64,
    /// YTM solver convergence tolerance.
    #[serde(default = "default_ytm_tolerance")]
    pub ytm_tolerance: f64,
    /// YTM solver iteration cap.
    #[serde(default = "default_ytm_max_iter")]
    pub ytm_max_iter: usize,
    /// Worker pool size for position-level and cross-portfolio parallelism.
    #[serde(default = "default_parallelism")]
    pub parallelism: usize,
    /// Caller deadline in milliseconds; `0` means no deadline.
    #[serde(default)]
    pub deadline_ms: u64,
}

fn default_var_window_days() -> usize {
    250
}
fn default_var_confidence() -> f64 {
    0.95
}
fn default_vol_regime() -> VolRegime {
    VolRegime::Auto
}
fn default_lcr_l2a_cap() -> f64 {
    0.40
}
fn default_lcr_l2b_cap() -> f64 {
    0.15
}
fn default_lcr_inflow_cap() -> f64 {
    0.75
}
fn default_permanent_min_capital_eur() -> f64 {
    75_000.0
}
fn default_ytm_tolerance() -> f64 {
    1e-10
}
fn default_ytm_max_iter() -> usize {
    50
}
fn default_parallelism() -> usize {
    num_cpus::get().max(1)
}

impl EngineConfig {
    /// Construct an `EngineConfig` with the spec's documented defaults, only
    /// `engine_version` and the stress window need to be supplied.
    pub fn new(
        engine_version: impl Into<String>,
        var_stress_window_start: Date,
        var_stress_window_end: Date,
    ) -> Result<Self, RiskEngineError> {
        let config = Self {
            engine_version: engine_version.into(),
            var_window_days: default_var_window_days(),
            var_confidence: default_var_confidence(),
            var_stress_window_start,
            var_stress_window_end,
            vol_regime_override: default_vol_regime(),
            lcr_l2a_cap: default_lcr_l2a_cap(),
            lcr_l2b_cap: default_lcr_l2b_cap(),
            lcr_inflow_cap: default_lcr_inflow_cap(),
            permanent_min_capital_eur: default_permanent_min_capital_eur(),
            ytm_tolerance: default_ytm_tolerance(),
            ytm_max_iter: default_ytm_max_iter(),
            parallelism: default_parallelism(),
            deadline_ms: 0,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate range constraints not expressible through serde defaults
    /// alone (used both by [`Self::new`] and after deserializing a TOML
    /// config file).
    pub fn validate(&self) -> Result<(), RiskEngineError> {
        if self.engine_version.is_empty() {
            return Err(RiskEngineError::InputValidation(
                "engine_version must not be empty".to_string(),
            ));
        }
        if self.var_window_days == 0 {
            return Err(RiskEngineError::InputValidation(
                "var_window_days must be positive".to_string(),
            ));
        }
        if !(0.0..1.0).contains(&self.var_confidence) {
            return Err(RiskEngineError::InputValidation(
                "var_confidence must be in [0, 1)".to_string(),
            ));
        }
        if self.var_stress_window_start >= self.var_stress_window_end {
            return Err(RiskEngineError::InputValidation(
                "var_stress_window_start must precede var_stress_window_end".to_string(),
            ));
        }
        for (name, value) in [
            ("lcr_l2a_cap", self.lcr_l2a_cap),
            ("lcr_l2b_cap", self.lcr_l2b_cap),
            ("lcr_inflow_cap", self.lcr_inflow_cap),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(RiskEngineError::InputValidation(format!(
                    "{name} must be in [0, 1], got {value}"
                )));
            }
        }
        if self.permanent_min_capital_eur < 0.0 {
            return Err(RiskEngineError::InputValidation(
                "permanent_min_capital_eur must be non-negative".to_string(),
            ));
        }
        if self.ytm_tolerance <= 0.0 {
            return Err(RiskEngineError::InputValidation(
                "ytm_tolerance must be positive".to_string(),
            ));
        }
        if self.ytm_max_iter == 0 {
            return Err(RiskEngineError::InputValidation(
                "ytm_max_iter must be positive".to_string(),
            ));
        }
        if self.parallelism == 0 {
            return Err(RiskEngineError::InputValidation(
                "parallelism must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stress_window() -> (Date, Date) {
        (
            Date::from_ymd(2008, 9, 1).unwrap(),
            Date::from_ymd(2009, 3, 31).unwrap(),
        )
    }

    #[test]
    fn test_new_applies_spec_defaults() {
        let (start, end) = stress_window();
        let config = EngineConfig::new("1.0.0", start, end).unwrap();
        assert_eq!(config.var_window_days, 250);
        assert_eq!(config.var_confidence, 0.95);
        assert_eq!(config.ytm_max_iter, 50);
        assert_eq!(config.permanent_min_capital_eur, 75_000.0);
    }

    #[test]
    fn test_rejects_inverted_stress_window() {
        let (start, end) = stress_window();
        assert!(EngineConfig::new("1.0.0", end, start).is_err());
    }

    #[test]
    fn test_rejects_empty_engine_version() {
        let (start, end) = stress_window();
        assert!(EngineConfig::new("", start, end).is_err());
    }

    #[test]
    fn test_deny_unknown_fields_from_toml() {
        let (start, end) = stress_window();
        let config = EngineConfig::new("1.0.0", start, end).unwrap();
        let serialized = toml::to_string(&config).unwrap();
        let with_typo = format!("{serialized}\nunknown_field = 1\n");
        let result: Result<EngineConfig, _> = toml::from_str(&with_typo);
        assert!(result.is_err());
    }
}
