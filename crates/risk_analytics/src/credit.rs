//! Issuer credit risk: PD/LGD/EAD and expected loss (§4.6).

use risk_domain::Seniority;

use crate::error::AnalyticsError;

/// Probability of default for a rating grade, read from a monotonic
/// rating -> PD table (AAA lowest risk, D certain default).
///
/// # Errors
/// `AnalyticsError::UnmappedKey` if `rating` is not a recognized grade.
pub fn pd_for_rating(rating: &str) -> Result<f64, AnalyticsError> {
    let pd = match rating.to_uppercase().as_str() {
        "AAA" => 0.0002,
        "AA" => 0.0005,
        "A" => 0.0010,
        "BBB" => 0.0030,
        "BB" => 0.0120,
        "B" => 0.0500,
        "CCC" => 0.1500,
        "CC" => 0.3000,
        "C" => 0.5000,
        "D" => 1.0000,
        other => return Err(AnalyticsError::UnmappedKey(format!("rating '{other}'"))),
    };
    Ok(pd)
}

/// Loss given default by seniority (§4.6): Senior Secured 0.25, Senior
/// Unsecured 0.40, Subordinated 0.60.
pub fn lgd_for_seniority(seniority: Seniority) -> f64 {
    seniority.lgd()
}

/// A single issuer's credit exposure and expected loss.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IssuerCreditResult {
    /// Exposure at default: the summed market value of the issuer's bonds.
    pub ead: f64,
    /// Probability of default, from the rating table.
    pub pd: f64,
    /// Loss given default, from seniority.
    pub lgd: f64,
    /// Expected loss: `PD * LGD * EAD`.
    pub expected_loss: f64,
}

/// Compute one issuer's credit exposure: `EAD = sum(bond market values)`,
/// `EL = PD * LGD * EAD`.
///
/// # Errors
/// `AnalyticsError::UnmappedKey` if `rating` is not recognized.
pub fn issuer_credit(
    bond_market_values: &[f64],
    rating: &str,
    seniority: Seniority,
) -> Result<IssuerCreditResult, AnalyticsError> {
    let ead: f64 = bond_market_values.iter().sum();
    let pd = pd_for_rating(rating)?;
    let lgd = lgd_for_seniority(seniority);
    Ok(IssuerCreditResult {
        ead,
        pd,
        lgd,
        expected_loss: pd * lgd * ead,
    })
}

/// Portfolio-level credit aggregates: total exposure and total expected
/// loss, summed across issuers.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct PortfolioCreditResult {
    /// Sum of each issuer's EAD.
    pub total_exposure: f64,
    /// Sum of each issuer's expected loss.
    pub expected_loss: f64,
}

/// Aggregate issuer-level results into portfolio totals.
pub fn aggregate_portfolio_credit(results: &[IssuerCreditResult]) -> PortfolioCreditResult {
    PortfolioCreditResult {
        total_exposure: results.iter().map(|r| r.ead).sum(),
        expected_loss: results.iter().map(|r| r.expected_loss).sum(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_pd_table_is_monotonic() {
        let grades = ["AAA", "AA", "A", "BBB", "BB", "B", "CCC", "CC", "C", "D"];
        let pds: Vec<f64> = grades.iter().map(|g| pd_for_rating(g).unwrap()).collect();
        for w in pds.windows(2) {
            assert!(w[1] > w[0]);
        }
        assert_relative_eq!(*pds.last().unwrap(), 1.0);
    }

    #[test]
    fn test_unmapped_rating_rejected() {
        assert!(pd_for_rating("NR").is_err());
    }

    #[test]
    fn test_lgd_by_seniority() {
        assert_relative_eq!(lgd_for_seniority(Seniority::SeniorSecured), 0.25);
        assert_relative_eq!(lgd_for_seniority(Seniority::SeniorUnsecured), 0.40);
        assert_relative_eq!(lgd_for_seniority(Seniority::Subordinated), 0.60);
    }

    #[test]
    fn test_issuer_expected_loss() {
        let result = issuer_credit(&[1_000_000.0, 500_000.0], "BBB", Seniority::SeniorUnsecured).unwrap();
        assert_relative_eq!(result.ead, 1_500_000.0);
        assert_relative_eq!(result.expected_loss, 0.0030 * 0.40 * 1_500_000.0, epsilon = 1e-6);
    }

    #[test]
    fn test_aggregate_sums_across_issuers() {
        let a = issuer_credit(&[1_000_000.0], "AAA", Seniority::SeniorSecured).unwrap();
        let b = issuer_credit(&[2_000_000.0], "BB", Seniority::Subordinated).unwrap();
        let total = aggregate_portfolio_credit(&[a, b]);
        assert_relative_eq!(total.total_exposure, 3_000_000.0);
        assert_relative_eq!(total.expected_loss, a.expected_loss + b.expected_loss, epsilon = 1e-9);
    }
}
