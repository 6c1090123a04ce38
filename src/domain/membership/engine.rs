use chrono::{DateTime, Utc};

use super::value_objects::{CustomerSegment, MembershipTier};

// ============================================================================
// Membership Rules Engine - Pure Business Logic
// ============================================================================
//
// Deterministic rule functions, no I/O and no internal state. The derived
// values (tier, segment, points) always flow from the customer aggregates;
// they are never mutated independently.
//
// ============================================================================

/// Days of inactivity after which a customer counts as dormant.
const DORMANT_AFTER_DAYS: i64 = 90;

/// Days of inactivity assumed for a customer with no recorded last order.
const NEVER_ORDERED_DAYS: i64 = 999;

/// Lifetime spend that makes a customer VIP regardless of recency.
const VIP_LIFETIME_VALUE: f64 = 2000.0;

/// Map lifetime spend to a membership tier.
///
/// Threshold ladder evaluated highest first; boundaries belong to the
/// higher tier (`>=` comparisons).
pub fn calculate_tier(lifetime_value: f64) -> MembershipTier {
    if lifetime_value >= 5000.0 {
        MembershipTier::Platinum
    } else if lifetime_value >= 1500.0 {
        MembershipTier::Gold
    } else if lifetime_value >= 500.0 {
        MembershipTier::Silver
    } else {
        MembershipTier::Green
    }
}

/// Apply the member discount for a tier to a price.
pub fn apply_member_discount(price: f64, tier: MembershipTier) -> f64 {
    price * (1.0 - tier.discount_rate())
}

/// Loyalty points earned for an order: one point per whole currency unit.
///
/// Callers validate non-negativity via `OrderTotal` before getting here.
pub fn calculate_points(order_total: f64) -> i64 {
    order_total.floor() as i64
}

/// Classify a customer for marketing/analytics.
///
/// Strict priority order: VIP dominates everything, then New, then
/// Dormant, otherwise Regular. A missing last-order date counts as
/// 999 days of inactivity.
pub fn calculate_customer_segment(
    total_orders: u32,
    lifetime_value: f64,
    last_order_date: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> CustomerSegment {
    if lifetime_value >= VIP_LIFETIME_VALUE {
        return CustomerSegment::Vip;
    }
    if total_orders == 0 {
        return CustomerSegment::New;
    }

    let days_since_last_order = match last_order_date {
        Some(last) => (now - last).num_days(),
        None => NEVER_ORDERED_DAYS,
    };
    if days_since_last_order > DORMANT_AFTER_DAYS {
        return CustomerSegment::Dormant;
    }

    CustomerSegment::Regular
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_tier_ladder() {
        assert_eq!(calculate_tier(0.0), MembershipTier::Green);
        assert_eq!(calculate_tier(499.99), MembershipTier::Green);
        assert_eq!(calculate_tier(500.0), MembershipTier::Silver);
        assert_eq!(calculate_tier(1499.99), MembershipTier::Silver);
        assert_eq!(calculate_tier(1500.0), MembershipTier::Gold);
        assert_eq!(calculate_tier(4999.99), MembershipTier::Gold);
        assert_eq!(calculate_tier(5000.0), MembershipTier::Platinum);
        assert_eq!(calculate_tier(1_000_000.0), MembershipTier::Platinum);
    }

    #[test]
    fn test_tier_is_monotonic_in_lifetime_value() {
        let samples = [
            0.0, 1.0, 250.0, 499.99, 500.0, 750.0, 1499.99, 1500.0, 2000.0, 4999.99, 5000.0,
            10_000.0,
        ];
        for window in samples.windows(2) {
            assert!(
                calculate_tier(window[0]) <= calculate_tier(window[1]),
                "tier regressed between {} and {}",
                window[0],
                window[1]
            );
        }
    }

    #[test]
    fn test_gold_discount_on_hundred() {
        let discounted = apply_member_discount(100.0, MembershipTier::Gold);
        assert!((discounted - 85.0).abs() < 1e-9);
    }

    #[test]
    fn test_discounts_for_all_tiers() {
        assert!((apply_member_discount(100.0, MembershipTier::Green) - 95.0).abs() < 1e-9);
        assert!((apply_member_discount(100.0, MembershipTier::Silver) - 90.0).abs() < 1e-9);
        assert!((apply_member_discount(100.0, MembershipTier::Platinum) - 80.0).abs() < 1e-9);
    }

    #[test]
    fn test_points_floor_semantics() {
        assert_eq!(calculate_points(29.99), 29);
        assert_eq!(calculate_points(30.0), 30);
        assert_eq!(calculate_points(0.0), 0);
        assert_eq!(calculate_points(0.99), 0);
    }

    #[test]
    fn test_segment_new_customer() {
        assert_eq!(
            calculate_customer_segment(0, 0.0, None, Utc::now()),
            CustomerSegment::New
        );
    }

    #[test]
    fn test_segment_vip_dominates_recency_and_count() {
        let now = Utc::now();
        assert_eq!(
            calculate_customer_segment(5, 2500.0, Some(now), now),
            CustomerSegment::Vip
        );
        // VIP even with no orders on record and no recency
        assert_eq!(
            calculate_customer_segment(0, 2000.0, None, now),
            CustomerSegment::Vip
        );
    }

    #[test]
    fn test_segment_dormant_after_ninety_days() {
        let now = Utc::now();
        let hundred_days_ago = now - Duration::days(100);
        assert_eq!(
            calculate_customer_segment(3, 100.0, Some(hundred_days_ago), now),
            CustomerSegment::Dormant
        );
    }

    #[test]
    fn test_segment_missing_last_order_date_is_dormant() {
        // Orders on record but no date: treated as 999 days inactive.
        assert_eq!(
            calculate_customer_segment(3, 100.0, None, Utc::now()),
            CustomerSegment::Dormant
        );
    }

    #[test]
    fn test_segment_regular_within_window() {
        let now = Utc::now();
        let last_week = now - Duration::days(7);
        assert_eq!(
            calculate_customer_segment(3, 100.0, Some(last_week), now),
            CustomerSegment::Regular
        );
        // Exactly 90 days is still Regular; dormancy requires > 90.
        let ninety_days_ago = now - Duration::days(90);
        assert_eq!(
            calculate_customer_segment(3, 100.0, Some(ninety_days_ago), now),
            CustomerSegment::Regular
        );
    }
}
