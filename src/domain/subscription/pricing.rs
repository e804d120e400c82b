//! Pure price and entitlement calculation.
//!
//! No I/O. Everything here is a function of plan type and discount type.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::{DiscountType, Feature, PlanType};

/// Result of a price calculation, all amounts in minor currency units.
///
/// # Invariants
///
/// - `final_price + discount_amount == base_price`
/// - `discount_amount == round_half_up(base_price * discount_percent / 100)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceBreakdown {
    pub base_price: i64,
    pub discount_percent: i64,
    pub discount_amount: i64,
    pub final_price: i64,
}

/// Computes the price for a plan with a discount applied.
pub fn calculate_price(plan_type: PlanType, discount_type: DiscountType) -> PriceBreakdown {
    let base_price = plan_type.base_price();
    let discount_percent = discount_type.percent();
    let discount_amount = round_half_up_percent(base_price, discount_percent);
    PriceBreakdown {
        base_price,
        discount_percent,
        discount_amount,
        final_price: base_price - discount_amount,
    }
}

/// Integer half-up rounding of `amount * percent / 100` for non-negative inputs.
fn round_half_up_percent(amount: i64, percent: i64) -> i64 {
    (amount * percent + 50) / 100
}

/// Features granted by a plan. EXPERT is a strict superset of STANDARD.
pub fn entitlements_for(plan_type: PlanType) -> BTreeSet<Feature> {
    let mut features = BTreeSet::from([
        Feature::MemberDirectory,
        Feature::EventRegistration,
        Feature::Newsletter,
    ]);
    if plan_type == PlanType::Expert {
        features.extend([
            Feature::ConsultingDesk,
            Feature::AdvancedReports,
            Feature::PrioritySupport,
        ]);
    }
    features
}

/// Returns true if the plan grants the feature.
pub fn has_entitlement(plan_type: PlanType, feature: Feature) -> bool {
    entitlements_for(plan_type).contains(&feature)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn standard_without_discount_is_full_price() {
        let price = calculate_price(PlanType::Standard, DiscountType::None);
        assert_eq!(price.base_price, 120_000);
        assert_eq!(price.discount_amount, 0);
        assert_eq!(price.final_price, 120_000);
    }

    #[test]
    fn expert_nonprofit_gets_twenty_percent_off() {
        let price = calculate_price(PlanType::Expert, DiscountType::Nonprofit);
        assert_eq!(price.discount_percent, 20);
        assert_eq!(price.discount_amount, 48_000);
        assert_eq!(price.final_price, 192_000);
    }

    #[test]
    fn rounding_is_half_up() {
        assert_eq!(round_half_up_percent(1_005, 10), 101); // 100.5 -> 101
        assert_eq!(round_half_up_percent(1_004, 10), 100); // 100.4 -> 100
        assert_eq!(round_half_up_percent(999, 15), 150); // 149.85 -> 150
    }

    #[test]
    fn expert_is_strict_superset_of_standard() {
        let standard = entitlements_for(PlanType::Standard);
        let expert = entitlements_for(PlanType::Expert);
        assert!(standard.is_subset(&expert));
        assert!(expert.len() > standard.len());
    }

    #[test]
    fn consulting_desk_is_expert_only() {
        assert!(!has_entitlement(PlanType::Standard, Feature::ConsultingDesk));
        assert!(has_entitlement(PlanType::Expert, Feature::ConsultingDesk));
    }

    fn plan_strategy() -> impl Strategy<Value = PlanType> {
        prop::sample::select(PlanType::ALL.to_vec())
    }

    fn discount_strategy() -> impl Strategy<Value = DiscountType> {
        prop::sample::select(DiscountType::ALL.to_vec())
    }

    proptest! {
        #[test]
        fn price_law_holds(plan in plan_strategy(), discount in discount_strategy()) {
            let price = calculate_price(plan, discount);
            prop_assert_eq!(price.final_price + price.discount_amount, price.base_price);
            let exact = price.base_price as f64 * price.discount_percent as f64 / 100.0;
            prop_assert_eq!(price.discount_amount, (exact + 0.5).floor() as i64);
            prop_assert!(price.final_price >= 0);
        }

        #[test]
        fn half_up_rounding_matches_float_reference(amount in 0i64..10_000_000, percent in 0i64..=100) {
            let exact = amount as f64 * percent as f64 / 100.0;
            let expected = (exact + 0.5).floor() as i64;
            prop_assert_eq!(round_half_up_percent(amount, percent), expected);
        }
    }
}
