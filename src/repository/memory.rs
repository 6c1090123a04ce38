use std::collections::HashMap;
use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::customer::{CustomerProfile, LoyaltyTransaction};

use super::{CustomerRepository, RepositoryError};

// ============================================================================
// In-Memory Repository
// ============================================================================
//
// HashMap-backed store used by the test suite and as the default demo
// backend. The CAS write happens under the write lock, so version checks
// here have the same observable semantics as the ScyllaDB LWT path.
//
// ============================================================================

#[derive(Debug)]
struct CustomerRecord {
    profile: CustomerProfile,
    transactions: Vec<LoyaltyTransaction>,
}

#[derive(Default)]
pub struct InMemoryRepository {
    customers: RwLock<HashMap<Uuid, CustomerRecord>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CustomerRepository for InMemoryRepository {
    async fn create_profile(&self, profile: &CustomerProfile) -> Result<(), RepositoryError> {
        let mut customers = self.customers.write().await;
        if customers.contains_key(&profile.customer_id) {
            return Err(RepositoryError::AlreadyExists(profile.customer_id));
        }
        customers.insert(
            profile.customer_id,
            CustomerRecord {
                profile: profile.clone(),
                transactions: Vec::new(),
            },
        );
        Ok(())
    }

    async fn get_customer_with_profile(
        &self,
        customer_id: Uuid,
    ) -> Result<CustomerProfile, RepositoryError> {
        let customers = self.customers.read().await;
        customers
            .get(&customer_id)
            .map(|record| record.profile.clone())
            .ok_or(RepositoryError::NotFound(customer_id))
    }

    async fn update_customer_profile(
        &self,
        customer_id: Uuid,
        expected_version: i64,
        profile: &CustomerProfile,
    ) -> Result<(), RepositoryError> {
        let mut customers = self.customers.write().await;
        let record = customers
            .get_mut(&customer_id)
            .ok_or(RepositoryError::NotFound(customer_id))?;

        if record.profile.version != expected_version {
            return Err(RepositoryError::VersionConflict {
                customer_id,
                expected: expected_version,
            });
        }

        // Point balance is owned by increment_loyalty_points; the CAS write
        // must not clobber awards applied since the caller's read.
        let loyalty_points = record.profile.loyalty_points;
        record.profile = profile.clone();
        record.profile.loyalty_points = loyalty_points;
        Ok(())
    }

    async fn create_loyalty_transaction(
        &self,
        transaction: &LoyaltyTransaction,
    ) -> Result<(), RepositoryError> {
        let mut customers = self.customers.write().await;
        let record = customers
            .get_mut(&transaction.customer_id)
            .ok_or(RepositoryError::NotFound(transaction.customer_id))?;
        record.transactions.push(transaction.clone());
        Ok(())
    }

    async fn increment_loyalty_points(
        &self,
        customer_id: Uuid,
        delta: i64,
    ) -> Result<(), RepositoryError> {
        let mut customers = self.customers.write().await;
        let record = customers
            .get_mut(&customer_id)
            .ok_or(RepositoryError::NotFound(customer_id))?;
        record.profile.loyalty_points += delta;
        Ok(())
    }

    async fn list_loyalty_transactions(
        &self,
        customer_id: Uuid,
    ) -> Result<Vec<LoyaltyTransaction>, RepositoryError> {
        let customers = self.customers.read().await;
        customers
            .get(&customer_id)
            .map(|record| record.transactions.clone())
            .ok_or(RepositoryError::NotFound(customer_id))
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn stored_profile() -> CustomerProfile {
        CustomerProfile::new(Uuid::new_v4(), Utc::now())
    }

    #[tokio::test]
    async fn test_create_and_load_profile() {
        let repo = InMemoryRepository::new();
        let profile = stored_profile();

        repo.create_profile(&profile).await.unwrap();
        let loaded = repo
            .get_customer_with_profile(profile.customer_id)
            .await
            .unwrap();
        assert_eq!(loaded, profile);
    }

    #[tokio::test]
    async fn test_duplicate_registration_rejected() {
        let repo = InMemoryRepository::new();
        let profile = stored_profile();

        repo.create_profile(&profile).await.unwrap();
        let result = repo.create_profile(&profile).await;
        assert!(matches!(result, Err(RepositoryError::AlreadyExists(_))));
    }

    #[tokio::test]
    async fn test_missing_customer_is_typed_not_found() {
        let repo = InMemoryRepository::new();
        let result = repo.get_customer_with_profile(Uuid::new_v4()).await;
        assert!(matches!(result, Err(RepositoryError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_cas_write_with_stale_version_conflicts() {
        let repo = InMemoryRepository::new();
        let profile = stored_profile();
        repo.create_profile(&profile).await.unwrap();

        let mut updated = profile.clone();
        updated.version = 1;
        updated.lifetime_value = 100.0;
        repo.update_customer_profile(profile.customer_id, 0, &updated)
            .await
            .unwrap();

        // A second writer that also read version 0 must lose.
        let result = repo
            .update_customer_profile(profile.customer_id, 0, &updated)
            .await;
        assert!(matches!(
            result,
            Err(RepositoryError::VersionConflict { expected: 0, .. })
        ));
    }

    #[tokio::test]
    async fn test_point_increment_survives_profile_write() {
        let repo = InMemoryRepository::new();
        let profile = stored_profile();
        repo.create_profile(&profile).await.unwrap();

        repo.increment_loyalty_points(profile.customer_id, 250)
            .await
            .unwrap();

        let mut updated = profile.clone();
        updated.version = 1;
        repo.update_customer_profile(profile.customer_id, 0, &updated)
            .await
            .unwrap();

        let loaded = repo
            .get_customer_with_profile(profile.customer_id)
            .await
            .unwrap();
        assert_eq!(loaded.loyalty_points, 250);
    }

    #[tokio::test]
    async fn test_ledger_is_append_only_in_order() {
        let repo = InMemoryRepository::new();
        let profile = stored_profile();
        repo.create_profile(&profile).await.unwrap();

        let now = Utc::now();
        let first = LoyaltyTransaction::earned(profile.customer_id, 100, "Order 1", now);
        let second = LoyaltyTransaction::earned(profile.customer_id, 200, "Order 2", now);
        repo.create_loyalty_transaction(&first).await.unwrap();
        repo.create_loyalty_transaction(&second).await.unwrap();

        let ledger = repo
            .list_loyalty_transactions(profile.customer_id)
            .await
            .unwrap();
        assert_eq!(ledger, vec![first, second]);
    }
}
