use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::customer::{CustomerProfile, LoyaltyTransaction};
use crate::utils::IsTransient;

// Private module declarations
mod memory;
mod scylla;

// Re-export for public API
pub use self::memory::InMemoryRepository;
pub use self::scylla::ScyllaRepository;

// ============================================================================
// Customer Repository - Persistence Boundary
// ============================================================================
//
// The membership engine's only collaborator. Any store satisfying atomic
// read/update per customer works; two implementations are provided:
// - InMemoryRepository (tests, demo default)
// - ScyllaRepository (ScyllaDB: LWT profile writes, counter-backed points)
//
// The profile write is a compare-and-swap on the profile version, so two
// concurrent order completions for one customer can never silently lose
// an increment; the loser sees VersionConflict and retries.
//
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("Customer not found: {0}")]
    NotFound(Uuid),

    #[error("Profile already exists for customer: {0}")]
    AlreadyExists(Uuid),

    #[error("Version conflict for customer {customer_id}: expected version {expected}")]
    VersionConflict { customer_id: Uuid, expected: i64 },

    #[error("Storage backend error: {0}")]
    Backend(#[source] anyhow::Error),
}

impl IsTransient for RepositoryError {
    fn is_transient(&self) -> bool {
        matches!(self, RepositoryError::VersionConflict { .. })
    }
}

#[async_trait]
pub trait CustomerRepository: Send + Sync {
    /// Persist a fresh profile at registration.
    async fn create_profile(&self, profile: &CustomerProfile) -> Result<(), RepositoryError>;

    /// Load a customer's profile, `NotFound` if absent.
    async fn get_customer_with_profile(
        &self,
        customer_id: Uuid,
    ) -> Result<CustomerProfile, RepositoryError>;

    /// Compare-and-swap profile write: applies `profile` only if the stored
    /// version still equals `expected_version`.
    async fn update_customer_profile(
        &self,
        customer_id: Uuid,
        expected_version: i64,
        profile: &CustomerProfile,
    ) -> Result<(), RepositoryError>;

    /// Append one immutable loyalty ledger entry.
    async fn create_loyalty_transaction(
        &self,
        transaction: &LoyaltyTransaction,
    ) -> Result<(), RepositoryError>;

    /// Atomically add `delta` to a customer's loyalty point balance.
    async fn increment_loyalty_points(
        &self,
        customer_id: Uuid,
        delta: i64,
    ) -> Result<(), RepositoryError>;

    /// Read back the ledger, oldest first.
    async fn list_loyalty_transactions(
        &self,
        customer_id: Uuid,
    ) -> Result<Vec<LoyaltyTransaction>, RepositoryError>;
}
