use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use cardstock_core::{CurrencyCode, DomainError, DomainResult, ValueObject, ensure_amount};

/// Markup rule used to derive suggested sale prices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingPolicy {
    markup: Decimal,
    floor: Decimal,
    currency: CurrencyCode,
}

impl PricingPolicy {
    /// Scale that suggested prices are rounded to.
    pub const PRICE_SCALE: u32 = 2;

    /// Largest accepted markup multiplier.
    pub const MAX_MARKUP: Decimal = Decimal::from_parts(1000, 0, 0, false, 0);

    pub fn new(markup: Decimal, floor: Decimal, currency: CurrencyCode) -> DomainResult<Self> {
        if markup <= Decimal::ZERO {
            return Err(DomainError::validation("markup must be greater than 0"));
        }
        if markup > Self::MAX_MARKUP {
            return Err(DomainError::validation(format!(
                "markup cannot exceed {}",
                Self::MAX_MARKUP
            )));
        }
        let floor = ensure_amount(floor, "price floor")?;
        Ok(Self {
            markup,
            floor,
            currency,
        })
    }

    pub fn markup(&self) -> Decimal {
        self.markup
    }

    pub fn floor(&self) -> Decimal {
        self.floor
    }

    pub fn currency(&self) -> &CurrencyCode {
        &self.currency
    }

    /// `max(round(cost × markup, 2), floor)`.
    ///
    /// Rounding is midpoint-to-even at two decimal places.
    pub fn suggested_price(&self, acquisition_cost: Decimal) -> DomainResult<Decimal> {
        let marked_up = acquisition_cost.checked_mul(self.markup).ok_or_else(|| {
            DomainError::invariant(format!(
                "suggested price for cost {acquisition_cost} overflows"
            ))
        })?;
        Ok(marked_up.round_dp(Self::PRICE_SCALE).max(self.floor))
    }
}

impl Default for PricingPolicy {
    /// Markup 1.5, floor 1.00, CAD.
    fn default() -> Self {
        Self {
            markup: Decimal::new(15, 1),
            floor: Decimal::ONE,
            currency: CurrencyCode::cad(),
        }
    }
}

impl ValueObject for PricingPolicy {}

#[cfg(test)]
mod tests {
    use super::*;
    use cardstock_core::MAX_AMOUNT;
    use rust_decimal_macros::dec;

    #[test]
    fn ten_dollars_at_default_policy_is_fifteen() {
        let policy = PricingPolicy::default();
        assert_eq!(policy.suggested_price(dec!(10.00)).unwrap(), dec!(15.00));
        assert_eq!(policy.currency().as_str(), "CAD");
    }

    #[test]
    fn floor_applies_to_cheap_items() {
        let policy = PricingPolicy::default();
        assert_eq!(policy.suggested_price(dec!(0.25)).unwrap(), dec!(1.0));
        assert_eq!(policy.suggested_price(dec!(0)).unwrap(), dec!(1.0));
    }

    #[test]
    fn rounding_is_midpoint_to_even() {
        let policy = PricingPolicy::new(dec!(1), dec!(0), CurrencyCode::cad()).unwrap();
        assert_eq!(policy.suggested_price(dec!(2.345)).unwrap(), dec!(2.34));
        assert_eq!(policy.suggested_price(dec!(2.355)).unwrap(), dec!(2.36));
        assert_eq!(policy.suggested_price(dec!(2.3451)).unwrap(), dec!(2.35));
    }

    #[test]
    fn new_rejects_non_positive_markup_and_negative_floor() {
        assert!(PricingPolicy::new(dec!(0), dec!(1), CurrencyCode::cad()).is_err());
        assert!(PricingPolicy::new(dec!(-1.5), dec!(1), CurrencyCode::cad()).is_err());
        assert!(PricingPolicy::new(dec!(1.5), dec!(-0.01), CurrencyCode::cad()).is_err());
        assert!(PricingPolicy::new(dec!(1.5), dec!(0), CurrencyCode::cad()).is_ok());
    }

    #[test]
    fn new_rejects_markup_and_floor_beyond_bounds() {
        assert!(PricingPolicy::new(dec!(1000.01), dec!(1), CurrencyCode::cad()).is_err());
        assert!(PricingPolicy::new(dec!(1000), dec!(1), CurrencyCode::cad()).is_ok());
        assert!(PricingPolicy::new(dec!(1.5), dec!(1000000000000), CurrencyCode::cad()).is_err());
    }

    #[test]
    fn largest_cost_at_largest_markup_is_priced() {
        let policy =
            PricingPolicy::new(PricingPolicy::MAX_MARKUP, dec!(0), CurrencyCode::cad()).unwrap();
        assert_eq!(
            policy.suggested_price(MAX_AMOUNT).unwrap(),
            dec!(999999999999990.00)
        );
    }

    #[test]
    fn overflowing_price_is_an_error_not_a_panic() {
        let policy = PricingPolicy::default();
        let err = policy
            .suggested_price(dec!(70000000000000000000000000000))
            .unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(_)));
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 256,
                ..ProptestConfig::default()
            })]

            #[test]
            fn price_never_below_floor(
                cost_cents in 0i64..10_000_000,
                markup_bp in 1i64..100_000,
                floor_cents in 0i64..100_000,
            ) {
                let policy = PricingPolicy::new(
                    Decimal::new(markup_bp, 4),
                    Decimal::new(floor_cents, 2),
                    CurrencyCode::cad(),
                ).unwrap();
                let price = policy.suggested_price(Decimal::new(cost_cents, 2)).unwrap();
                prop_assert!(price >= policy.floor());
            }

            #[test]
            fn price_has_at_most_two_decimals_above_floor(
                cost_cents in 0i64..10_000_000,
                markup_bp in 1i64..100_000,
            ) {
                let policy = PricingPolicy::new(
                    Decimal::new(markup_bp, 4),
                    Decimal::ZERO,
                    CurrencyCode::cad(),
                ).unwrap();
                let price = policy.suggested_price(Decimal::new(cost_cents, 2)).unwrap();
                prop_assert!(price.scale() <= 2);
            }

            #[test]
            fn price_is_within_half_a_cent_of_exact_markup(
                cost_cents in 0i64..10_000_000,
                markup_bp in 1i64..100_000,
            ) {
                let policy = PricingPolicy::new(
                    Decimal::new(markup_bp, 4),
                    Decimal::ZERO,
                    CurrencyCode::cad(),
                ).unwrap();
                let cost = Decimal::new(cost_cents, 2);
                let exact = cost * policy.markup();
                let diff = (policy.suggested_price(cost).unwrap() - exact).abs();
                prop_assert!(diff <= Decimal::new(5, 3));
            }
        }
    }
}
