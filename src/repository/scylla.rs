use async_trait::async_trait;
use scylla::client::session::Session;
use scylla::client::session_builder::SessionBuilder;
use scylla::value::{Counter, CqlValue, Row};
use std::sync::Arc;
use uuid::Uuid;

use chrono::{DateTime, Utc};

use crate::domain::customer::{CustomerProfile, LoyaltyTransaction, LoyaltyTransactionType};
use crate::domain::membership::{CustomerSegment, MembershipTier};

use super::{CustomerRepository, RepositoryError};

// ============================================================================
// ScyllaDB Repository
// ============================================================================
//
// Storage layout:
// - customer_profiles: one row per customer; writes are LWT-guarded on the
//   version column (`IF version = ?`), which gives the compare-and-swap the
//   order-completion flow relies on.
// - loyalty_points: counter table; increments are atomic server-side.
// - loyalty_transactions: append-only ledger, clustered by creation time.
//
// ============================================================================

pub struct ScyllaRepository {
    session: Arc<Session>,
}

fn backend(e: impl std::error::Error + Send + Sync + 'static) -> RepositoryError {
    RepositoryError::Backend(anyhow::Error::new(e))
}

/// First column of an LWT result is the `[applied]` boolean.
fn lwt_applied(row: &Row) -> bool {
    matches!(row.columns.first(), Some(Some(CqlValue::Boolean(true))))
}

impl ScyllaRepository {
    pub fn new(session: Arc<Session>) -> Self {
        Self { session }
    }

    /// Connect to ScyllaDB and bootstrap the keyspace and tables.
    pub async fn connect(node: &str, keyspace: &str) -> anyhow::Result<Self> {
        tracing::info!(node = %node, keyspace = %keyspace, "Connecting to ScyllaDB");
        let session: Session = SessionBuilder::new().known_node(node).build().await?;

        session
            .query_unpaged(
                format!(
                    "CREATE KEYSPACE IF NOT EXISTS {} WITH REPLICATION = \
                     {{'class': 'SimpleStrategy', 'replication_factor': 1}}",
                    keyspace
                ),
                &[],
            )
            .await?;
        session.use_keyspace(keyspace, false).await?;

        let repo = Self::new(Arc::new(session));
        repo.init_schema().await?;
        Ok(repo)
    }

    async fn init_schema(&self) -> anyhow::Result<()> {
        self.session
            .query_unpaged(
                "CREATE TABLE IF NOT EXISTS customer_profiles (
                    customer_id uuid PRIMARY KEY,
                    lifetime_value double,
                    total_orders int,
                    average_order_value double,
                    membership_tier text,
                    segment text,
                    last_order_date timestamp,
                    version bigint,
                    created_at timestamp,
                    updated_at timestamp
                )",
                &[],
            )
            .await?;

        self.session
            .query_unpaged(
                "CREATE TABLE IF NOT EXISTS loyalty_points (
                    customer_id uuid PRIMARY KEY,
                    points counter
                )",
                &[],
            )
            .await?;

        self.session
            .query_unpaged(
                "CREATE TABLE IF NOT EXISTS loyalty_transactions (
                    customer_id uuid,
                    created_at timestamp,
                    id uuid,
                    transaction_type text,
                    points bigint,
                    description text,
                    PRIMARY KEY (customer_id, created_at, id)
                ) WITH CLUSTERING ORDER BY (created_at ASC, id ASC)",
                &[],
            )
            .await?;

        Ok(())
    }

    async fn load_points(&self, customer_id: Uuid) -> Result<i64, RepositoryError> {
        let result = self
            .session
            .query_unpaged(
                "SELECT points FROM loyalty_points WHERE customer_id = ?",
                (customer_id,),
            )
            .await
            .map_err(backend)?
            .into_rows_result()
            .map_err(backend)?;

        // No counter row until the first increment.
        let points = result
            .maybe_first_row::<(Counter,)>()
            .map_err(backend)?
            .map(|(counter,)| counter.0)
            .unwrap_or(0);
        Ok(points)
    }
}

#[async_trait]
impl CustomerRepository for ScyllaRepository {
    async fn create_profile(&self, profile: &CustomerProfile) -> Result<(), RepositoryError> {
        let result = self
            .session
            .query_unpaged(
                "INSERT INTO customer_profiles (
                    customer_id, lifetime_value, total_orders, average_order_value,
                    membership_tier, segment, last_order_date, version,
                    created_at, updated_at
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?) IF NOT EXISTS",
                (
                    profile.customer_id,
                    profile.lifetime_value,
                    profile.total_orders as i32,
                    profile.average_order_value,
                    profile.membership_tier.as_str(),
                    profile.segment.as_str(),
                    profile.last_order_date,
                    profile.version,
                    profile.created_at,
                    profile.updated_at,
                ),
            )
            .await
            .map_err(backend)?
            .into_rows_result()
            .map_err(backend)?;

        let row = result.first_row::<Row>().map_err(backend)?;
        if !lwt_applied(&row) {
            return Err(RepositoryError::AlreadyExists(profile.customer_id));
        }
        Ok(())
    }

    async fn get_customer_with_profile(
        &self,
        customer_id: Uuid,
    ) -> Result<CustomerProfile, RepositoryError> {
        let result = self
            .session
            .query_unpaged(
                "SELECT lifetime_value, total_orders, average_order_value,
                        membership_tier, segment, last_order_date, version,
                        created_at, updated_at
                 FROM customer_profiles WHERE customer_id = ?",
                (customer_id,),
            )
            .await
            .map_err(backend)?
            .into_rows_result()
            .map_err(backend)?;

        type ProfileRow = (
            f64,
            i32,
            f64,
            String,
            String,
            Option<DateTime<Utc>>,
            i64,
            DateTime<Utc>,
            DateTime<Utc>,
        );

        let Some(row) = result.maybe_first_row::<ProfileRow>().map_err(backend)? else {
            return Err(RepositoryError::NotFound(customer_id));
        };
        let (
            lifetime_value,
            total_orders,
            average_order_value,
            tier,
            segment,
            last_order_date,
            version,
            created_at,
            updated_at,
        ) = row;

        let membership_tier: MembershipTier =
            tier.parse().map_err(|e| RepositoryError::Backend(anyhow::Error::new(e)))?;
        let segment: CustomerSegment = segment
            .parse()
            .map_err(|e| RepositoryError::Backend(anyhow::Error::new(e)))?;
        let loyalty_points = self.load_points(customer_id).await?;

        Ok(CustomerProfile {
            customer_id,
            lifetime_value,
            total_orders: total_orders.max(0) as u32,
            average_order_value,
            loyalty_points,
            membership_tier,
            segment,
            last_order_date,
            version,
            created_at,
            updated_at,
        })
    }

    async fn update_customer_profile(
        &self,
        customer_id: Uuid,
        expected_version: i64,
        profile: &CustomerProfile,
    ) -> Result<(), RepositoryError> {
        let result = self
            .session
            .query_unpaged(
                "UPDATE customer_profiles SET
                    lifetime_value = ?, total_orders = ?, average_order_value = ?,
                    membership_tier = ?, segment = ?, last_order_date = ?,
                    version = ?, updated_at = ?
                 WHERE customer_id = ? IF version = ?",
                (
                    profile.lifetime_value,
                    profile.total_orders as i32,
                    profile.average_order_value,
                    profile.membership_tier.as_str(),
                    profile.segment.as_str(),
                    profile.last_order_date,
                    profile.version,
                    profile.updated_at,
                    customer_id,
                    expected_version,
                ),
            )
            .await
            .map_err(backend)?
            .into_rows_result()
            .map_err(backend)?;

        let row = result.first_row::<Row>().map_err(backend)?;
        if !lwt_applied(&row) {
            return Err(RepositoryError::VersionConflict {
                customer_id,
                expected: expected_version,
            });
        }
        Ok(())
    }

    async fn create_loyalty_transaction(
        &self,
        transaction: &LoyaltyTransaction,
    ) -> Result<(), RepositoryError> {
        self.session
            .query_unpaged(
                "INSERT INTO loyalty_transactions (
                    customer_id, created_at, id, transaction_type, points, description
                ) VALUES (?, ?, ?, ?, ?, ?)",
                (
                    transaction.customer_id,
                    transaction.created_at,
                    transaction.id,
                    transaction.transaction_type.as_str(),
                    transaction.points,
                    transaction.description.as_str(),
                ),
            )
            .await
            .map_err(backend)?;
        Ok(())
    }

    async fn increment_loyalty_points(
        &self,
        customer_id: Uuid,
        delta: i64,
    ) -> Result<(), RepositoryError> {
        self.session
            .query_unpaged(
                "UPDATE loyalty_points SET points = points + ? WHERE customer_id = ?",
                (delta, customer_id),
            )
            .await
            .map_err(backend)?;
        Ok(())
    }

    async fn list_loyalty_transactions(
        &self,
        customer_id: Uuid,
    ) -> Result<Vec<LoyaltyTransaction>, RepositoryError> {
        let result = self
            .session
            .query_unpaged(
                "SELECT id, transaction_type, points, description, created_at
                 FROM loyalty_transactions WHERE customer_id = ?",
                (customer_id,),
            )
            .await
            .map_err(backend)?
            .into_rows_result()
            .map_err(backend)?;

        let mut transactions = Vec::new();
        for row in result
            .rows::<(Uuid, String, i64, String, DateTime<Utc>)>()
            .map_err(backend)?
        {
            let (id, transaction_type, points, description, created_at) = row.map_err(backend)?;
            let transaction_type = match transaction_type.as_str() {
                "EARNED" => LoyaltyTransactionType::Earned,
                "REDEEMED" => LoyaltyTransactionType::Redeemed,
                other => {
                    return Err(RepositoryError::Backend(anyhow::anyhow!(
                        "Unknown loyalty transaction type: {}",
                        other
                    )))
                }
            };
            transactions.push(LoyaltyTransaction {
                id,
                customer_id,
                transaction_type,
                points,
                description,
                created_at,
            });
        }
        Ok(transactions)
    }
}
