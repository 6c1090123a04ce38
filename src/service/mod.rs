use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::domain::customer::{CustomerProfile, LoyaltyTransaction};
use crate::domain::membership::{apply_member_discount, MembershipError, MembershipTier, OrderTotal};
use crate::metrics::Metrics;
use crate::repository::{CustomerRepository, RepositoryError};
use crate::utils::{retry_on_transient, RetryConfig, RetryResult};

// ============================================================================
// Membership Service
// ============================================================================
//
// Orchestrates: completed order → profile aggregates → derived tier/segment
// → loyalty ledger, against the repository boundary.
//
// The profile write is a compare-and-swap retried on version conflict, so
// concurrent order completions for one customer serialize instead of losing
// an increment. The operation is NOT idempotent if the caller replays it:
// the same order applied twice doubles the aggregates. Callers that retry a
// whole order commit must decide that above this layer.
//
// ============================================================================

/// What one completed order did to a customer's profile.
#[derive(Debug, Clone)]
pub struct OrderOutcome {
    pub profile: CustomerProfile,
    pub points_earned: i64,
    pub previous_tier: MembershipTier,
}

impl OrderOutcome {
    pub fn tier_changed(&self) -> bool {
        self.previous_tier != self.profile.membership_tier
    }
}

pub struct MembershipService {
    repository: Arc<dyn CustomerRepository>,
    metrics: Arc<Metrics>,
    retry: RetryConfig,
}

impl MembershipService {
    pub fn new(repository: Arc<dyn CustomerRepository>, metrics: Arc<Metrics>) -> Self {
        Self {
            repository,
            metrics,
            retry: RetryConfig::default(),
        }
    }

    /// Create a zeroed profile for a newly registered customer.
    pub async fn register_customer(
        &self,
        customer_id: Uuid,
    ) -> Result<CustomerProfile, MembershipError> {
        let profile = CustomerProfile::new(customer_id, Utc::now());
        match self.repository.create_profile(&profile).await {
            Ok(()) => {
                self.metrics.profiles_registered_total.inc();
                tracing::info!(customer_id = %customer_id, "Customer profile registered");
                Ok(profile)
            }
            Err(RepositoryError::AlreadyExists(_)) => {
                Err(MembershipError::AlreadyRegistered(customer_id))
            }
            Err(e) => Err(MembershipError::Repository(e)),
        }
    }

    /// Apply one completed order to a customer's profile, as a single
    /// logical unit: advance the aggregates, recompute tier and segment,
    /// append an EARNED ledger entry, and award the points.
    ///
    /// Negative or non-finite totals are rejected; a missing customer is a
    /// typed error rather than a silent no-op.
    pub async fn complete_order(
        &self,
        customer_id: Uuid,
        order_total: f64,
    ) -> Result<OrderOutcome, MembershipError> {
        let total = match OrderTotal::new(order_total) {
            Ok(total) => total,
            Err(e) => {
                self.metrics
                    .orders_rejected
                    .with_label_values(&["invalid_total"])
                    .inc();
                return Err(e);
            }
        };

        let timer = self.metrics.order_processing_duration.start_timer();

        // Load/compute/CAS-write cycle; a losing writer reloads and retries.
        let attempt_result = retry_on_transient(self.retry.clone(), |_attempt| {
            let repository = self.repository.clone();
            let metrics = self.metrics.clone();
            async move {
                let current = repository.get_customer_with_profile(customer_id).await?;
                let now = Utc::now();
                let (next, points) = current.with_completed_order(total, now);

                match repository
                    .update_customer_profile(customer_id, current.version, &next)
                    .await
                {
                    Ok(()) => Ok((next, current.membership_tier, points, now)),
                    Err(e) => {
                        if matches!(e, RepositoryError::VersionConflict { .. }) {
                            metrics.version_conflicts_total.inc();
                        }
                        Err(e)
                    }
                }
            }
        })
        .await;

        let (mut profile, previous_tier, points_earned, now) = match attempt_result {
            RetryResult::Success(applied) => applied,
            RetryResult::Failed(_) => {
                timer.stop_and_discard();
                self.metrics
                    .orders_rejected
                    .with_label_values(&["contention"])
                    .inc();
                return Err(MembershipError::UpdateContention(customer_id));
            }
            RetryResult::PermanentFailure(e) => {
                timer.stop_and_discard();
                return Err(map_repository_error(customer_id, e));
            }
        };

        // Ledger entry plus atomic point award; the ledger is append-only
        // and gets exactly one EARNED record per completed order.
        let transaction = LoyaltyTransaction::earned(
            customer_id,
            points_earned,
            format!("Points earned for order total {:.2}", total.amount()),
            now,
        );
        self.repository
            .create_loyalty_transaction(&transaction)
            .await
            .map_err(|e| map_repository_error(customer_id, e))?;
        self.repository
            .increment_loyalty_points(customer_id, points_earned)
            .await
            .map_err(|e| map_repository_error(customer_id, e))?;
        profile.loyalty_points += points_earned;

        timer.observe_duration();
        self.metrics
            .orders_processed
            .with_label_values(&[profile.membership_tier.as_str()])
            .inc();
        self.metrics.points_awarded_total.inc_by(points_earned as u64);
        if previous_tier != profile.membership_tier {
            self.metrics
                .tier_upgrades
                .with_label_values(&[previous_tier.as_str(), profile.membership_tier.as_str()])
                .inc();
            tracing::info!(
                customer_id = %customer_id,
                from = %previous_tier,
                to = %profile.membership_tier,
                "Membership tier upgraded"
            );
        }

        tracing::info!(
            customer_id = %customer_id,
            order_total = order_total,
            lifetime_value = profile.lifetime_value,
            total_orders = profile.total_orders,
            tier = %profile.membership_tier,
            segment = %profile.segment,
            points_earned = points_earned,
            "Completed order applied to profile"
        );

        Ok(OrderOutcome {
            profile,
            points_earned,
            previous_tier,
        })
    }

    /// Price after the member discount for the customer's current tier.
    pub async fn quote_price(
        &self,
        customer_id: Uuid,
        price: f64,
    ) -> Result<f64, MembershipError> {
        if !price.is_finite() || price < 0.0 {
            return Err(MembershipError::InvalidPrice(price));
        }
        let profile = self.profile(customer_id).await?;
        Ok(apply_member_discount(price, profile.membership_tier))
    }

    pub async fn profile(&self, customer_id: Uuid) -> Result<CustomerProfile, MembershipError> {
        self.repository
            .get_customer_with_profile(customer_id)
            .await
            .map_err(|e| map_repository_error(customer_id, e))
    }

    pub async fn loyalty_history(
        &self,
        customer_id: Uuid,
    ) -> Result<Vec<LoyaltyTransaction>, MembershipError> {
        self.repository
            .list_loyalty_transactions(customer_id)
            .await
            .map_err(|e| map_repository_error(customer_id, e))
    }
}

fn map_repository_error(customer_id: Uuid, e: RepositoryError) -> MembershipError {
    match e {
        RepositoryError::NotFound(_) => MembershipError::CustomerNotFound(customer_id),
        other => MembershipError::Repository(other),
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::customer::LoyaltyTransactionType;
    use crate::domain::membership::CustomerSegment;
    use crate::repository::InMemoryRepository;

    fn test_service() -> MembershipService {
        MembershipService::new(
            Arc::new(InMemoryRepository::new()),
            Arc::new(Metrics::new().unwrap()),
        )
    }

    #[tokio::test]
    async fn test_first_order_end_to_end() {
        let service = test_service();
        let customer_id = Uuid::new_v4();
        service.register_customer(customer_id).await.unwrap();

        let outcome = service.complete_order(customer_id, 600.0).await.unwrap();

        assert_eq!(outcome.profile.lifetime_value, 600.0);
        assert_eq!(outcome.profile.total_orders, 1);
        assert_eq!(outcome.profile.membership_tier, MembershipTier::Silver);
        assert_eq!(outcome.profile.loyalty_points, 600);
        assert_eq!(outcome.points_earned, 600);
        assert_eq!(outcome.previous_tier, MembershipTier::Green);
        assert!(outcome.tier_changed());

        let ledger = service.loyalty_history(customer_id).await.unwrap();
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger[0].transaction_type, LoyaltyTransactionType::Earned);
        assert_eq!(ledger[0].points, 600);
    }

    #[tokio::test]
    async fn test_points_use_floor_semantics() {
        let service = test_service();
        let customer_id = Uuid::new_v4();
        service.register_customer(customer_id).await.unwrap();

        let outcome = service.complete_order(customer_id, 29.99).await.unwrap();
        assert_eq!(outcome.points_earned, 29);
        assert_eq!(outcome.profile.loyalty_points, 29);
    }

    #[tokio::test]
    async fn test_missing_customer_is_typed_error_not_noop() {
        let service = test_service();
        let result = service.complete_order(Uuid::new_v4(), 100.0).await;
        assert!(matches!(
            result,
            Err(MembershipError::CustomerNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_negative_order_total_rejected() {
        let service = test_service();
        let customer_id = Uuid::new_v4();
        service.register_customer(customer_id).await.unwrap();

        let result = service.complete_order(customer_id, -50.0).await;
        assert!(matches!(
            result,
            Err(MembershipError::InvalidOrderTotal(_))
        ));

        // Profile untouched by the rejected order.
        let profile = service.profile(customer_id).await.unwrap();
        assert_eq!(profile.total_orders, 0);
        assert_eq!(profile.lifetime_value, 0.0);
    }

    #[tokio::test]
    async fn test_duplicate_registration_rejected() {
        let service = test_service();
        let customer_id = Uuid::new_v4();
        service.register_customer(customer_id).await.unwrap();

        let result = service.register_customer(customer_id).await;
        assert!(matches!(
            result,
            Err(MembershipError::AlreadyRegistered(_))
        ));
    }

    #[tokio::test]
    async fn test_replaying_an_order_doubles_aggregates() {
        // complete_order is intentionally not idempotent: a caller replaying
        // the same order doubles everything. Asserted here as the expected
        // (but retry-hostile) behavior.
        let service = test_service();
        let customer_id = Uuid::new_v4();
        service.register_customer(customer_id).await.unwrap();

        service.complete_order(customer_id, 600.0).await.unwrap();
        let replayed = service.complete_order(customer_id, 600.0).await.unwrap();

        assert_eq!(replayed.profile.lifetime_value, 1200.0);
        assert_eq!(replayed.profile.total_orders, 2);
        assert_eq!(replayed.profile.loyalty_points, 1200);

        let ledger = service.loyalty_history(customer_id).await.unwrap();
        assert_eq!(ledger.len(), 2);
    }

    #[tokio::test]
    async fn test_tier_progression_over_order_history() {
        let service = test_service();
        let customer_id = Uuid::new_v4();
        service.register_customer(customer_id).await.unwrap();

        let first = service.complete_order(customer_id, 300.0).await.unwrap();
        assert_eq!(first.profile.membership_tier, MembershipTier::Green);
        assert!(!first.tier_changed());

        let second = service.complete_order(customer_id, 300.0).await.unwrap();
        assert_eq!(second.profile.membership_tier, MembershipTier::Silver);

        let third = service.complete_order(customer_id, 4400.0).await.unwrap();
        assert_eq!(third.profile.membership_tier, MembershipTier::Platinum);
        assert_eq!(third.profile.segment, CustomerSegment::Vip);
        assert_eq!(third.profile.average_order_value, 5000.0 / 3.0);
    }

    #[tokio::test]
    async fn test_quote_price_uses_current_tier() {
        let service = test_service();
        let customer_id = Uuid::new_v4();
        service.register_customer(customer_id).await.unwrap();

        // Green: 5% off
        let quoted = service.quote_price(customer_id, 100.0).await.unwrap();
        assert!((quoted - 95.0).abs() < 1e-9);

        // Push into Gold, 15% off
        service.complete_order(customer_id, 1600.0).await.unwrap();
        let quoted = service.quote_price(customer_id, 100.0).await.unwrap();
        assert!((quoted - 85.0).abs() < 1e-9);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_concurrent_orders_never_lose_an_update() {
        let service = Arc::new(test_service());
        let customer_id = Uuid::new_v4();
        service.register_customer(customer_id).await.unwrap();

        let mut handles = Vec::new();
        for _ in 0..4 {
            let service = service.clone();
            handles.push(tokio::spawn(async move {
                service.complete_order(customer_id, 100.0).await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let profile = service.profile(customer_id).await.unwrap();
        assert_eq!(profile.total_orders, 4);
        assert_eq!(profile.lifetime_value, 400.0);
        assert_eq!(profile.loyalty_points, 400);

        let ledger = service.loyalty_history(customer_id).await.unwrap();
        assert_eq!(ledger.len(), 4);
    }
}
