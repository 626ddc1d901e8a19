use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// An amount of ScroogeCoin in its smallest unit.
/// Signed, so that an output claiming a negative amount can be represented and rejected.
#[derive(Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Coin(i64);

impl Coin {
    pub const fn new(amount: i64) -> Self {
        Coin(amount)
    }

    pub const fn zero() -> Self {
        Self::new(0)
    }

    pub fn value(&self) -> i64 {
        self.0
    }

    pub fn is_negative(&self) -> bool {
        self.0 < 0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Self)
    }

    /// Sums the amounts, or returns `None` if the total does not fit.
    pub fn checked_sum<I: IntoIterator<Item = Coin>>(amounts: I) -> Option<Self> {
        amounts
            .into_iter()
            .try_fold(Self::zero(), |total, amount| total.checked_add(amount))
    }
}

impl From<i64> for Coin {
    fn from(value: i64) -> Self {
        Self::new(value)
    }
}

impl Display for Coin {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} SCR", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checked_sum_of_amounts() {
        let total = Coin::checked_sum(vec![Coin::new(50), Coin::new(25), Coin::new(-5)]);
        assert_eq!(total, Some(Coin::new(70)));
    }

    #[test]
    fn checked_sum_of_nothing_is_zero() {
        assert_eq!(Coin::checked_sum(Vec::new()), Some(Coin::zero()));
    }

    #[test]
    fn checked_sum_reports_overflow() {
        assert_eq!(
            Coin::checked_sum(vec![Coin::new(i64::MAX), Coin::new(1)]),
            None
        );
    }

    #[test]
    fn sign_predicates() {
        assert!(Coin::new(-1).is_negative());
        assert!(!Coin::zero().is_negative());
        assert!(Coin::zero().is_zero());
        assert!(!Coin::new(1).is_zero());
    }

    #[test]
    fn display_with_unit() {
        assert_eq!(Coin::new(100).to_string(), "100 SCR");
    }

    #[test]
    fn serializes_as_plain_number() {
        assert_eq!(serde_json::to_string(&Coin::new(42)).unwrap(), "42");
        assert_eq!(serde_json::from_str::<Coin>("-1").unwrap(), Coin::new(-1));
    }
}
