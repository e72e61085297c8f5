//! C1: Market Data View.
//!
//! Turns the flat, ingestion-shaped [`MarketDataSnapshot`] into indexed,
//! query-ready curves, surfaces, and lookup tables, validating the basic
//! no-arbitrage shape of the raw data on the way in.

use std::collections::HashMap;

use risk_core::currency::Currency;
use risk_core::market_data::{VolSurface, YieldCurve};
use risk_core::time::Date;
use risk_domain::{CurvePoint, Isin, IssuerId, MarketDataSnapshot, PriceQuote, VolPoint};

use crate::error::EngineError;

/// An indexed, query-ready view over one [`MarketDataSnapshot`] (C1).
///
/// Built once per `compute_snapshot` call and shared read-only across every
/// downstream component. Every lookup here is `O(1)`; the interpolation
/// performed inside the looked-up [`YieldCurve`]/[`VolSurface`] is not.
///
/// [`MarketDataSnapshot::new`] normalizes its raw vectors into a stable sort
/// order, so two views built from equal snapshots are built by the same
/// deterministic construction and query identically for every input; there
/// is no hidden source of nondeterminism (iteration order, random seeds) in
/// [`MarketView::build`].
#[derive(Debug, Clone)]
pub struct MarketView {
    as_of_date: Date,
    prices: HashMap<Isin, PriceQuote>,
    curves: HashMap<Currency, YieldCurve>,
    surfaces: HashMap<String, VolSurface>,
    fx_rates: HashMap<(Currency, Currency), f64>,
    cds_spreads: HashMap<IssuerId, f64>,
}

impl MarketView {
    /// Build a market view from a raw snapshot.
    ///
    /// Validates that every FX rate is strictly positive (§4.1); a
    /// non-positive rate makes every FX-referencing position unpriceable, so
    /// it fails the whole view rather than one position. A crossed book on a
    /// single ISIN (bid > ask) does not block the view — that is a
    /// per-position data-quality issue (DQ-03, [`crate::data_quality`]) that
    /// downgrades only the affected position. Curve tenor monotonicity is
    /// enforced by [`YieldCurve::new`] itself, so a curve with
    /// non-increasing tenors surfaces as an [`EngineError::InputValidation`]
    /// from that call.
    pub fn build(snapshot: &MarketDataSnapshot) -> Result<Self, EngineError> {
        for fx in &snapshot.fx_rates {
            if fx.rate <= 0.0 {
                return Err(EngineError::InputValidation(format!(
                    "fx rate for {} must be positive, got {}",
                    fx.pair, fx.rate
                )));
            }
        }

        let curves = build_curves(&snapshot.curve_points)?;
        let surfaces = build_surfaces(&snapshot.vol_points)?;

        let mut fx_rates = HashMap::with_capacity(snapshot.fx_rates.len());
        for fx in &snapshot.fx_rates {
            fx_rates.insert((fx.pair.base.clone(), fx.pair.quote.clone()), fx.rate);
        }

        let mut cds_spreads = HashMap::with_capacity(snapshot.cds_spreads.len());
        for cds in &snapshot.cds_spreads {
            cds_spreads.insert(cds.issuer_id.clone(), cds.spread_bps);
        }

        Ok(Self {
            as_of_date: snapshot.as_of_date.clone(),
            prices: snapshot
                .prices
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
            curves,
            surfaces,
            fx_rates,
            cds_spreads,
        })
    }

    /// The snapshot date this view was built from.
    pub fn as_of_date(&self) -> Date {
        self.as_of_date.clone()
    }

    /// The price/liquidity observation for an ISIN, if the snapshot carries one.
    pub fn price(&self, isin: &Isin) -> Option<&PriceQuote> {
        self.prices.get(isin)
    }

    /// The discount/zero-rate curve for a currency, if the snapshot carries
    /// one or more curve points for it.
    pub fn curve(&self, currency: &Currency) -> Option<&YieldCurve> {
        self.curves.get(currency)
    }

    /// The implied-vol surface for an underlying identifier, if the
    /// snapshot carries vol observations for it.
    pub fn surface(&self, underlying: &str) -> Option<&VolSurface> {
        self.surfaces.get(underlying)
    }

    /// The spot FX rate, quoted as units of `quote` per one `base`. Falls
    /// back to the inverse of the reverse-quoted pair if the direct
    /// quotation isn't present, since both conventions appear in practice.
    pub fn fx_rate(&self, base: &Currency, quote: &Currency) -> Option<f64> {
        if base == quote {
            return Some(1.0);
        }
        if let Some(&rate) = self.fx_rates.get(&(base.clone(), quote.clone())) {
            return Some(rate);
        }
        self.fx_rates
            .get(&(quote.clone(), base.clone()))
            .map(|&rate| 1.0 / rate)
    }

    /// The CDS spread (basis points) for an issuer, if the snapshot carries one.
    pub fn cds_spread(&self, issuer_id: &IssuerId) -> Option<f64> {
        self.cds_spreads.get(issuer_id).copied()
    }
}

/// Group flat curve points by currency and build one [`YieldCurve`] per
/// group.
fn build_curves(points: &[CurvePoint]) -> Result<HashMap<Currency, YieldCurve>, EngineError> {
    let mut by_currency: HashMap<Currency, (Vec<f64>, Vec<f64>)> = HashMap::new();
    for p in points {
        let entry = by_currency
            .entry(p.currency.clone())
            .or_insert_with(|| (Vec::new(), Vec::new()));
        entry.0.push(p.tenor_years);
        entry.1.push(p.zero_rate);
    }

    let mut curves = HashMap::with_capacity(by_currency.len());
    for (currency, (tenors, zero_rates)) in by_currency {
        let curve = YieldCurve::new(&tenors, &zero_rates).map_err(|e| {
            EngineError::InputValidation(format!("curve for {currency}: {e}"))
        })?;
        curves.insert(currency, curve);
    }
    Ok(curves)
}

/// Group flat vol points by underlying and build one [`VolSurface`] per
/// group.
///
/// `VolPoint` carries a raw strike rather than log-moneyness, and
/// `VolSurface::new` wants a single log-moneyness axis shared by every
/// tenor row. Quoted vol grids are conventionally sampled at the same
/// relative strikes for every tenor (e.g. 90%/95%/ATM/105%/110% of forward),
/// so this reconstructs that axis once, from the shortest tenor, using the
/// geometric mean of that tenor's strikes as the forward proxy, and then
/// requires every other tenor to supply the same number of strikes in the
/// same rank order.
fn build_surfaces(points: &[VolPoint]) -> Result<HashMap<String, VolSurface>, EngineError> {
    let mut by_underlying: HashMap<&str, HashMap<u64, Vec<(f64, f64)>>> = HashMap::new();
    for p in points {
        by_underlying
            .entry(p.underlying.as_str())
            .or_default()
            .entry(p.tenor_years.to_bits())
            .or_default()
            .push((p.strike, p.vol));
    }

    let mut surfaces = HashMap::with_capacity(by_underlying.len());
    for (underlying, by_tenor) in by_underlying {
        let mut tenors: Vec<f64> = by_tenor.keys().map(|&bits| f64::from_bits(bits)).collect();
        tenors.sort_by(|a, b| a.partial_cmp(b).expect("non-finite tenor"));

        let mut rows: Vec<Vec<(f64, f64)>> = Vec::with_capacity(tenors.len());
        for &tenor in &tenors {
            let mut row = by_tenor[&tenor.to_bits()].clone();
            row.sort_by(|a, b| a.0.partial_cmp(&b.0).expect("non-finite strike"));
            rows.push(row);
        }

        let strike_count = rows[0].len();
        if rows.iter().any(|row| row.len() != strike_count) {
            return Err(EngineError::InputValidation(format!(
                "vol surface for {underlying}: every tenor must quote the same number of strikes"
            )));
        }

        let forward_proxy = geometric_mean(rows[0].iter().map(|(strike, _)| *strike));
        let log_moneyness: Vec<f64> = rows[0]
            .iter()
            .map(|(strike, _)| (strike / forward_proxy).ln())
            .collect();

        let vols: Vec<Vec<f64>> = rows
            .iter()
            .map(|row| row.iter().map(|(_, vol)| *vol).collect())
            .collect();

        let surface = VolSurface::new(&tenors, &log_moneyness, &vols).map_err(|e| {
            EngineError::InputValidation(format!("vol surface for {underlying}: {e}"))
        })?;
        surfaces.insert(underlying.to_string(), surface);
    }
    Ok(surfaces)
}

fn geometric_mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum_ln, count) = values.fold((0.0, 0usize), |(sum, n), v| (sum + v.ln(), n + 1));
    (sum_ln / count as f64).exp()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use risk_core::currency::CurrencyPair;
    use risk_domain::{CdsSpreadPoint, FxRatePoint};
    use std::collections::BTreeMap;

    fn date(y: i32, m: u32, d: u32) -> Date {
        Date::from_ymd(y, m, d).unwrap()
    }

    fn usd() -> Currency {
        "USD".parse().unwrap()
    }

    fn eur() -> Currency {
        "EUR".parse().unwrap()
    }

    fn sample_snapshot() -> MarketDataSnapshot {
        MarketDataSnapshot::new(
            date(2024, 6, 30),
            BTreeMap::new(),
            vec![
                CurvePoint { currency: usd(), tenor_years: 1.0, zero_rate: 0.04 },
                CurvePoint { currency: usd(), tenor_years: 5.0, zero_rate: 0.045 },
            ],
            vec![
                VolPoint { underlying: "EUR/USD".to_string(), tenor_years: 1.0, strike: 1.0, vol: 0.08 },
                VolPoint { underlying: "EUR/USD".to_string(), tenor_years: 1.0, strike: 1.1, vol: 0.09 },
                VolPoint { underlying: "EUR/USD".to_string(), tenor_years: 2.0, strike: 1.0, vol: 0.085 },
                VolPoint { underlying: "EUR/USD".to_string(), tenor_years: 2.0, strike: 1.1, vol: 0.095 },
            ],
            vec![FxRatePoint { pair: CurrencyPair::new(eur(), usd()), rate: 1.08 }],
            vec![CdsSpreadPoint { issuer_id: "ISSUER-1".into(), spread_bps: 120.0 }],
        )
    }

    #[test]
    fn test_build_resolves_curve_and_surface() {
        let view = MarketView::build(&sample_snapshot()).unwrap();
        assert!(view.curve(&usd()).is_some());
        assert!(view.surface("EUR/USD").is_some());
        assert_eq!(view.cds_spread(&"ISSUER-1".into()), Some(120.0));
    }

    #[test]
    fn test_fx_rate_direct_and_inverse() {
        let view = MarketView::build(&sample_snapshot()).unwrap();
        assert_relative_eq!(view.fx_rate(&eur(), &usd()).unwrap(), 1.08);
        assert_relative_eq!(view.fx_rate(&usd(), &eur()).unwrap(), 1.0 / 1.08);
        assert_relative_eq!(view.fx_rate(&usd(), &usd()).unwrap(), 1.0);
    }

    #[test]
    fn test_crossed_book_does_not_block_the_view() {
        let mut prices = BTreeMap::new();
        prices.insert(
            Isin::from("US0000000001"),
            PriceQuote {
                clean_price: 1.0,
                quoted_yield: None,
                spread_bps: None,
                bid: 1.05,
                ask: 1.0,
                volume: 0.0,
                days_since_trade: 0,
            },
        );
        let snapshot = MarketDataSnapshot::new(date(2024, 6, 30), prices, vec![], vec![], vec![], vec![]);
        assert!(MarketView::build(&snapshot).is_ok());
    }

    #[test]
    fn test_rejects_non_positive_fx_rate() {
        let snapshot = MarketDataSnapshot::new(
            date(2024, 6, 30),
            BTreeMap::new(),
            vec![],
            vec![],
            vec![FxRatePoint { pair: CurrencyPair::new(eur(), usd()), rate: 0.0 }],
            vec![],
        );
        let result = MarketView::build(&snapshot);
        assert!(matches!(result, Err(EngineError::InputValidation(_))));
    }

    #[test]
    fn test_equal_snapshots_build_equal_views() {
        let a = MarketView::build(&sample_snapshot()).unwrap();
        let b = MarketView::build(&sample_snapshot()).unwrap();
        assert_eq!(a.curve(&usd()).unwrap().zero_rate(3.0), b.curve(&usd()).unwrap().zero_rate(3.0));
        assert_eq!(
            a.surface("EUR/USD").unwrap().vol(1.0, 1.05, 1.0),
            b.surface("EUR/USD").unwrap().vol(1.0, 1.05, 1.0)
        );
    }

    #[test]
    fn test_ragged_vol_grid_rejected() {
        let snapshot = MarketDataSnapshot::new(
            date(2024, 6, 30),
            BTreeMap::new(),
            vec![],
            vec![
                VolPoint { underlying: "EUR/USD".to_string(), tenor_years: 1.0, strike: 1.0, vol: 0.08 },
                VolPoint { underlying: "EUR/USD".to_string(), tenor_years: 1.0, strike: 1.1, vol: 0.09 },
                VolPoint { underlying: "EUR/USD".to_string(), tenor_years: 2.0, strike: 1.0, vol: 0.085 },
            ],
            vec![],
            vec![],
        );
        let result = MarketView::build(&snapshot);
        assert!(matches!(result, Err(EngineError::InputValidation(_))));
    }
}
