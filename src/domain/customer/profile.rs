use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::membership::{
    calculate_customer_segment, calculate_points, calculate_tier, CustomerSegment, MembershipTier,
    OrderTotal,
};

// ============================================================================
// Customer Profile - Aggregates and Derived Views
// ============================================================================

/// A customer's lifetime aggregates plus the views derived from them.
///
/// `membership_tier` and `segment` are never set directly; every write path
/// recomputes them from the aggregates. `version` supports optimistic
/// concurrency at the repository: a profile write names the version it read,
/// and loses if another writer got there first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerProfile {
    pub customer_id: Uuid,
    pub lifetime_value: f64,
    pub total_orders: u32,
    pub average_order_value: f64,
    pub loyalty_points: i64,
    pub membership_tier: MembershipTier,
    pub segment: CustomerSegment,
    pub last_order_date: Option<DateTime<Utc>>,
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CustomerProfile {
    /// Fresh profile at registration: aggregates zeroed, tier Green.
    pub fn new(customer_id: Uuid, now: DateTime<Utc>) -> Self {
        Self {
            customer_id,
            lifetime_value: 0.0,
            total_orders: 0,
            average_order_value: 0.0,
            loyalty_points: 0,
            membership_tier: MembershipTier::Green,
            segment: CustomerSegment::New,
            last_order_date: None,
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Pure computation of the profile after one completed order.
    ///
    /// Returns the next profile state (aggregates advanced, tier and
    /// segment recomputed, version bumped) and the points the order earns.
    /// The returned profile does not include the point award; loyalty
    /// points are applied by the repository's atomic increment.
    pub fn with_completed_order(&self, order_total: OrderTotal, now: DateTime<Utc>) -> (Self, i64) {
        let amount = order_total.amount();
        let new_lifetime_value = self.lifetime_value + amount;
        let new_total_orders = self.total_orders + 1;
        let new_average_order_value = new_lifetime_value / f64::from(new_total_orders);

        let next = Self {
            customer_id: self.customer_id,
            lifetime_value: new_lifetime_value,
            total_orders: new_total_orders,
            average_order_value: new_average_order_value,
            loyalty_points: self.loyalty_points,
            membership_tier: calculate_tier(new_lifetime_value),
            segment: calculate_customer_segment(
                new_total_orders,
                new_lifetime_value,
                Some(now),
                now,
            ),
            last_order_date: Some(now),
            version: self.version + 1,
            created_at: self.created_at,
            updated_at: now,
        };

        (next, calculate_points(amount))
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
