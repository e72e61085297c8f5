//! The raw market data snapshot: immutable inputs from which [`crate::Portfolio`]
//! valuation views are built.

use std::collections::BTreeMap;

use risk_core::currency::{Currency, CurrencyPair};
use risk_core::time::Date;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::ids::{Isin, IssuerId};

/// A single ISIN's observed price and liquidity data for the snapshot date.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PriceQuote {
    /// Clean price (excludes accrued interest).
    pub clean_price: f64,
    /// Quoted yield, if the source reports one directly.
    pub quoted_yield: Option<f64>,
    /// Credit spread over the risk-free curve, in basis points.
    pub spread_bps: Option<f64>,
    /// Best bid price.
    pub bid: f64,
    /// Best ask price.
    pub ask: f64,
    /// Traded volume on the reference date.
    pub volume: f64,
    /// Number of days since the last observed trade.
    pub days_since_trade: i64,
}

/// A single `(currency, tenor)` zero-rate observation, as sourced before
/// being grouped into a [`risk_core::market_data::YieldCurve`] per currency.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CurvePoint {
    /// Currency the curve applies to.
    pub currency: Currency,
    /// Tenor, in years.
    pub tenor_years: f64,
    /// Zero rate at this tenor.
    pub zero_rate: f64,
}

/// A single `(underlying, tenor, strike)` implied-vol observation, as sourced
/// before being grouped into a [`risk_core::market_data::VolSurface`] per
/// underlying.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VolPoint {
    /// Underlying identifier the surface applies to.
    pub underlying: String,
    /// Tenor, in years.
    pub tenor_years: f64,
    /// Strike.
    pub strike: f64,
    /// Implied volatility.
    pub vol: f64,
}

/// A spot FX rate for a currency pair, quoted as units of `quote` per one
/// `base`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FxRatePoint {
    /// Currency pair.
    pub pair: CurrencyPair,
    /// Spot rate; strictly positive (§4.1).
    pub rate: f64,
}

/// A credit-default-swap spread for an issuer, used by the CVA hazard-rate
/// approximation in §4.7.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CdsSpreadPoint {
    /// Issuer the spread applies to.
    pub issuer_id: IssuerId,
    /// CDS spread, in basis points.
    pub spread_bps: f64,
}

/// Immutable raw market data for one `as_of_date`.
///
/// This is the *source* data: flat observations as they arrive from the
/// ingestion layer. The market data view (C1) groups `curve_points` and
/// `vol_points` by currency/underlying into interpolated curves and
/// surfaces; this type only guarantees a stable, hashable ordering.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MarketDataSnapshot {
    /// The date this snapshot represents.
    pub as_of_date: Date,
    /// ISIN -> price/liquidity observation, sorted by ISIN.
    pub prices: BTreeMap<Isin, PriceQuote>,
    /// Zero-rate observations, sorted by `(currency, tenor)`.
    pub curve_points: Vec<CurvePoint>,
    /// Implied-vol observations, sorted by `(underlying, tenor, strike)`.
    pub vol_points: Vec<VolPoint>,
    /// FX rate observations, sorted by currency pair.
    pub fx_rates: Vec<FxRatePoint>,
    /// CDS spread observations, sorted by issuer id.
    pub cds_spreads: Vec<CdsSpreadPoint>,
}

impl MarketDataSnapshot {
    /// Construct a snapshot, normalizing vector fields into a stable sort
    /// order so two snapshots built from the same raw data compare equal and
    /// hash identically (§4.1: "two views built from the same raw data must
    /// compare equal").
    pub fn new(
        as_of_date: Date,
        prices: BTreeMap<Isin, PriceQuote>,
        mut curve_points: Vec<CurvePoint>,
        mut vol_points: Vec<VolPoint>,
        mut fx_rates: Vec<FxRatePoint>,
        mut cds_spreads: Vec<CdsSpreadPoint>,
    ) -> Self {
        curve_points.sort_by(|a, b| {
            a.currency
                .cmp(&b.currency)
                .then(a.tenor_years.partial_cmp(&b.tenor_years).expect("non-finite tenor"))
        });
        vol_points.sort_by(|a, b| {
            a.underlying
                .cmp(&b.underlying)
                .then(a.tenor_years.partial_cmp(&b.tenor_years).expect("non-finite tenor"))
                .then(a.strike.partial_cmp(&b.strike).expect("non-finite strike"))
        });
        fx_rates.sort_by(|a, b| {
            a.pair
                .base
                .cmp(&b.pair.base)
                .then(a.pair.quote.cmp(&b.pair.quote))
        });
        cds_spreads.sort_by(|a, b| a.issuer_id.cmp(&b.issuer_id));

        Self {
            as_of_date,
            prices,
            curve_points,
            vol_points,
            fx_rates,
            cds_spreads,
        }
    }

    /// SHA-256 content hash over the canonical form of this snapshot (§6:
    /// "keys sorted lexicographically, floats in `%.15g`"), used as the
    /// `market_data_snapshot_id` carried on every [`crate::RiskSnapshot`].
    pub fn content_hash(&self) -> String {
        let mut buf = String::new();
        buf.push_str("as_of_date=");
        buf.push_str(&self.as_of_date.to_string());
        buf.push('\n');

        for (isin, q) in &self.prices {
            buf.push_str(&format!(
                "price:{}={},{},{},{},{},{},{}\n",
                isin.as_str(),
                canonical_float(q.clean_price),
                q.quoted_yield.map(canonical_float).unwrap_or_default(),
                q.spread_bps.map(canonical_float).unwrap_or_default(),
                canonical_float(q.bid),
                canonical_float(q.ask),
                canonical_float(q.volume),
                q.days_since_trade,
            ));
        }
        for c in &self.curve_points {
            buf.push_str(&format!(
                "curve:{},{}={}\n",
                c.currency,
                canonical_float(c.tenor_years),
                canonical_float(c.zero_rate)
            ));
        }
        for v in &self.vol_points {
            buf.push_str(&format!(
                "vol:{},{},{}={}\n",
                v.underlying,
                canonical_float(v.tenor_years),
                canonical_float(v.strike),
                canonical_float(v.vol)
            ));
        }
        for fx in &self.fx_rates {
            buf.push_str(&format!("fx:{}={}\n", fx.pair, canonical_float(fx.rate)));
        }
        for cds in &self.cds_spreads {
            buf.push_str(&format!(
                "cds:{}={}\n",
                cds.issuer_id,
                canonical_float(cds.spread_bps)
            ));
        }

        let mut hasher = Sha256::new();
        hasher.update(buf.as_bytes());
        format!("{:x}", hasher.finalize())
    }
}

/// Render a float in a fixed, locale-independent form (15 significant
/// mantissa digits) so the canonical serialization is stable across
/// platforms, approximating the `%.15g` behaviour named in §6.
fn canonical_float(x: f64) -> String {
    format!("{x:.15e}")
}
