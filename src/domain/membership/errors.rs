use uuid::Uuid;

use crate::repository::RepositoryError;

// ============================================================================
// Membership Business Rule Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum MembershipError {
    #[error("Customer not found: {0}")]
    CustomerNotFound(Uuid),

    #[error("Customer already registered: {0}")]
    AlreadyRegistered(Uuid),

    #[error("Invalid order total: {0}")]
    InvalidOrderTotal(f64),

    #[error("Invalid price: {0}")]
    InvalidPrice(f64),

    #[error("Unknown membership tier: {0}")]
    UnknownTier(String),

    #[error("Unknown customer segment: {0}")]
    UnknownSegment(String),

    #[error("Profile update failed after retries for customer {0}")]
    UpdateContention(Uuid),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
