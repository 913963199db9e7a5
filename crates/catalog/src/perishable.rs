use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Shelf-life facet attached ad hoc to a catalog entry.
///
/// Expiry is a display-only annotation: it is supplied by the caller when
/// checking a product and is never persisted. Consumers branch on the
/// variant rather than on a type hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Perishability {
    Standard,
    Perishable { expiry_date: NaiveDate },
}

impl Perishability {
    /// True iff this facet is perishable and the expiry date lies strictly
    /// before `today`. A product expiring today is still sellable.
    pub fn is_expired(&self, today: NaiveDate) -> bool {
        match self {
            Self::Standard => false,
            Self::Perishable { expiry_date } => *expiry_date < today,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Days;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 28).unwrap()
    }

    #[test]
    fn standard_products_never_expire() {
        assert!(!Perishability::Standard.is_expired(today()));
    }

    #[test]
    fn expiry_today_is_not_expired() {
        let facet = Perishability::Perishable {
            expiry_date: today(),
        };
        assert!(!facet.is_expired(today()));
    }

    #[test]
    fn expiry_yesterday_is_expired() {
        let facet = Perishability::Perishable {
            expiry_date: today() - Days::new(1),
        };
        assert!(facet.is_expired(today()));
    }

    #[test]
    fn expiry_tomorrow_is_not_expired() {
        let facet = Perishability::Perishable {
            expiry_date: today() + Days::new(1),
        };
        assert!(!facet.is_expired(today()));
    }
}
