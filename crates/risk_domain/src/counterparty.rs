//! Counterparties: CCR/CVA reference data for derivative positions.

use serde::{Deserialize, Serialize};

use crate::ids::CounterpartyId;

/// Credit support annex terms governing collateral exchange with a
/// counterparty.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CsaTerms {
    /// Collateral currently held against this counterparty's exposure.
    pub collateral_held: f64,
    /// Exposure threshold below which no collateral is called.
    pub threshold: f64,
    /// Minimum transfer amount for a collateral call.
    pub minimum_transfer_amount: f64,
}

/// Counterparty reference data, looked up by id from derivative positions
/// (weak reference — positions do not own counterparties).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Counterparty {
    /// Stable identifier.
    pub id: CounterpartyId,
    /// Domicile country (ISO 3166-1 alpha-2).
    pub country: String,
    /// External (agency) credit rating, e.g. `"A"`, `"BBB"`.
    pub external_rating: String,
    /// Internal credit rating, where different from the external one.
    pub internal_rating: String,
    /// Whether an ISDA master agreement with netting is in place.
    pub isda_netting: bool,
    /// CSA collateral terms, if a CSA is in place.
    pub csa: Option<CsaTerms>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_construct_counterparty_without_csa() {
        let cp = Counterparty {
            id: "CP-1".into(),
            country: "US".to_string(),
            external_rating: "A".to_string(),
            internal_rating: "A".to_string(),
            isda_netting: true,
            csa: None,
        };
        assert!(cp.csa.is_none());
        assert!(cp.isda_netting);
    }
}
