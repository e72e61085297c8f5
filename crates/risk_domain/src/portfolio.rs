//! Portfolios: the top-level container owning positions.

use risk_core::currency::Currency;
use serde::{Deserialize, Serialize};

use crate::ids::PortfolioId;

/// The business line a portfolio is run under, which drives which limits and
/// capital treatments apply.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PortfolioType {
    /// A dealer book of bond inventory.
    BondDealer,
    /// Client-facing derivatives book.
    DerivativesClient,
    /// The firm's own book.
    Proprietary,
}

/// A portfolio: a stable identity, a type, a base currency, and an active
/// flag. Owns its [`crate::Position`]s by composition — positions carry
/// their owning `portfolio_id` rather than the portfolio holding a `Vec`, so
/// that a position bundle can be assembled and priced independently of the
/// portfolio record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Portfolio {
    /// Stable identifier.
    pub id: PortfolioId,
    /// Business-line classification.
    pub portfolio_type: PortfolioType,
    /// Currency in which aggregated metrics (MV, DV01, VaR, ...) are reported.
    pub base_currency: Currency,
    /// Whether the portfolio is currently active; inactive portfolios are
    /// still computable but are typically excluded from nightly batches by
    /// the host.
    pub active: bool,
}

impl Portfolio {
    /// Construct a new portfolio record.
    pub fn new(
        id: impl Into<PortfolioId>,
        portfolio_type: PortfolioType,
        base_currency: Currency,
        active: bool,
    ) -> Self {
        Self {
            id: id.into(),
            portfolio_type,
            base_currency,
            active,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_construct_portfolio() {
        let p = Portfolio::new(
            "PORT-1",
            PortfolioType::BondDealer,
            "USD".parse().unwrap(),
            true,
        );
        assert_eq!(p.id.as_str(), "PORT-1");
        assert!(p.active);
    }
}
