use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Loyalty Ledger - Append-Only Transaction Records
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LoyaltyTransactionType {
    Earned,
    Redeemed,
}

impl LoyaltyTransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoyaltyTransactionType::Earned => "EARNED",
            LoyaltyTransactionType::Redeemed => "REDEEMED",
        }
    }
}

/// One immutable loyalty ledger entry. Created once per completed order,
/// never edited or deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoyaltyTransaction {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub transaction_type: LoyaltyTransactionType,
    pub points: i64,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

impl LoyaltyTransaction {
    /// Ledger entry for points earned by a completed order.
    pub fn earned(
        customer_id: Uuid,
        points: i64,
        description: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            customer_id,
            transaction_type: LoyaltyTransactionType::Earned,
            points,
            description: description.into(),
            created_at: now,
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_earned_transaction_fields() {
        let customer_id = Uuid::new_v4();
        let now = Utc::now();
        let tx = LoyaltyTransaction::earned(customer_id, 600, "Order completed", now);

        assert_eq!(tx.customer_id, customer_id);
        assert_eq!(tx.transaction_type, LoyaltyTransactionType::Earned);
        assert_eq!(tx.points, 600);
        assert_eq!(tx.created_at, now);
    }

    #[test]
    fn test_transaction_type_serializes_uppercase() {
        let json = serde_json::to_string(&LoyaltyTransactionType::Earned).unwrap();
        assert_eq!(json, "\"EARNED\"");
    }
}
