//! Strongly-typed identifiers for domain entities.
//!
//! Newtypes around `String` so a `PortfolioId` can never be passed where an
//! `IssuerId` is expected, even though both are plain strings at rest.

use std::fmt;

macro_rules! string_id {
    ($name:ident, $doc:literal) => {
        #[doc = $doc]
        #[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
        pub struct $name(String);

        impl $name {
            /// Construct from any string-like value.
            #[inline]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// The identifier as a string slice.
            #[inline]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self::new(s)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }
    };
}

string_id!(PortfolioId, "Stable identifier for a [`crate::Portfolio`].");
string_id!(PositionId, "Stable identifier for a [`crate::Position`].");
string_id!(CounterpartyId, "Stable identifier for a [`crate::Counterparty`].");
string_id!(IssuerId, "Stable identifier for an [`crate::Issuer`].");
string_id!(Isin, "ISIN referencing a bond instrument.");

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_portfolio_id_roundtrip() {
        let id: PortfolioId = "PORT-001".into();
        assert_eq!(id.as_str(), "PORT-001");
        assert_eq!(id.to_string(), "PORT-001");
    }

    #[test]
    fn test_ids_are_hashable_and_distinct() {
        let mut set = HashSet::new();
        set.insert(IssuerId::new("ISS1"));
        set.insert(IssuerId::new("ISS2"));
        set.insert(IssuerId::new("ISS1"));
        assert_eq!(set.len(), 2);
    }
}
