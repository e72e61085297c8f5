//! Issuers: bond reference data driving credit-risk treatment.

use serde::{Deserialize, Serialize};

use crate::ids::IssuerId;

/// Seniority of a bond claim, driving LGD per §4.6.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Seniority {
    /// Senior secured — LGD 0.25.
    SeniorSecured,
    /// Senior unsecured — LGD 0.40.
    SeniorUnsecured,
    /// Subordinated — LGD 0.60.
    Subordinated,
}

impl Seniority {
    /// Loss given default fraction, per §4.6's tabulated values.
    pub fn lgd(&self) -> f64 {
        match self {
            Seniority::SeniorSecured => 0.25,
            Seniority::SeniorUnsecured => 0.40,
            Seniority::Subordinated => 0.60,
        }
    }
}

/// Reference data for a bond issuer, looked up by id from bond positions
/// (weak reference — positions do not own issuers).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Issuer {
    /// Stable identifier.
    pub id: IssuerId,
    /// Domicile country (ISO 3166-1 alpha-2).
    pub country: String,
    /// Industry sector.
    pub sector: String,
    /// Credit rating, e.g. `"AAA"`, `"BB"`, `"D"`.
    pub rating: String,
    /// Seniority of the claim.
    pub seniority: Seniority,
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_lgd_by_seniority() {
        assert_relative_eq!(Seniority::SeniorSecured.lgd(), 0.25);
        assert_relative_eq!(Seniority::SeniorUnsecured.lgd(), 0.40);
        assert_relative_eq!(Seniority::Subordinated.lgd(), 0.60);
    }
}
