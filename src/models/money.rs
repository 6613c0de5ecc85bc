use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::{
    fmt,
    iter::Sum,
    ops::{Add, AddAssign, Sub},
};
use utoipa::ToSchema;

/// Currency amount held as integer minor units (paise / cents).
///
/// Stored as `INTEGER` in SQLite and exposed on the bridge as a decimal string
/// with two places, e.g. `"1500.00"`. Arithmetic never touches floating point.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, sqlx::Type, ToSchema,
)]
#[sqlx(transparent)]
#[schema(value_type = String, example = "1500.00")]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    /// Largest amount accepted from input: one trillion in major units.
    pub const MAX: Money = Money(100_000_000_000_000);

    pub const fn from_minor(minor: i64) -> Self {
        Money(minor)
    }

    /// Whole currency units, e.g. `Money::from_major(500)` is 500.00.
    pub const fn from_major(major: i64) -> Self {
        Money(major.saturating_mul(100))
    }

    pub const fn minor(self) -> i64 {
        self.0
    }

    pub fn to_decimal(self) -> Decimal {
        Decimal::new(self.0, 2)
    }

    /// Rounds half away from zero to two places. `None` beyond `±MAX`.
    pub fn try_from_decimal(value: Decimal) -> Option<Self> {
        let minor = value
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
            .checked_mul(Decimal::ONE_HUNDRED)?
            .to_i64()?;
        (minor.checked_abs()? <= Self::MAX.0).then_some(Money(minor))
    }

    pub fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// `max(0, self)`
    pub fn clamp_zero(self) -> Self {
        Money(self.0.max(0))
    }

    /// `max(0, self - other)`
    pub fn saturating_due(self, paid: Money) -> Self {
        (self - paid).clamp_zero()
    }
}

// Saturating; stored amounts never wrap.
impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        *self = *self + rhs;
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Money) -> Money {
        Money(self.0.saturating_sub(rhs.0))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, Add::add)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.to_decimal())
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // Accepts "1500.50" as well as bare JSON numbers.
        let value = <Decimal as Deserialize>::deserialize(deserializer)?;
        Money::try_from_decimal(value)
            .ok_or_else(|| serde::de::Error::custom(format!("amount out of range: {value}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn decimal_conversion_rounds_to_minor_units() {
        assert_eq!(Money::try_from_decimal(dec!(19.005)), Some(Money::from_minor(1901)));
        assert_eq!(Money::try_from_decimal(dec!(1900)), Some(Money::from_major(1900)));
        assert_eq!(Money::from_minor(190050).to_string(), "1900.50");
    }

    #[test]
    fn saturating_due_never_goes_negative() {
        let total = Money::from_major(1900);
        assert_eq!(total.saturating_due(Money::from_major(1000)), Money::from_major(900));
        assert_eq!(total.saturating_due(Money::from_major(2500)), Money::ZERO);
    }

    #[test]
    fn deserializes_strings_and_numbers() {
        let from_str: Money = serde_json::from_str("\"1500.25\"").unwrap();
        let from_num: Money = serde_json::from_str("1500").unwrap();
        assert_eq!(from_str, Money::from_minor(150025));
        assert_eq!(from_num, Money::from_major(1500));
        assert_eq!(serde_json::to_string(&from_str).unwrap(), "\"1500.25\"");
    }

    #[test]
    fn oversized_amounts_are_rejected() {
        assert!(serde_json::from_str::<Money>("\"79228162514264337593543950335\"").is_err());
        assert!(serde_json::from_str::<Money>("\"-79228162514264337593543950335\"").is_err());
        assert!(serde_json::from_str::<Money>("\"1000000000000.01\"").is_err());
        assert_eq!(
            serde_json::from_str::<Money>("\"1000000000000\"").unwrap(),
            Money::MAX
        );
        assert_eq!(Money::try_from_decimal(Decimal::MAX), None);
    }

    #[test]
    fn arithmetic_saturates_instead_of_wrapping() {
        let huge = Money::from_minor(i64::MAX - 1);
        assert_eq!(huge + huge, Money::from_minor(i64::MAX));
        assert_eq!(Money::from_minor(i64::MIN) - huge, Money::from_minor(i64::MIN));
        let mut total = huge;
        total += Money::from_major(1);
        assert_eq!(total, Money::from_minor(i64::MAX));
    }
}
