use actix::prelude::*;
use std::sync::Arc;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod actors;
mod config;
mod domain;
mod metrics;
mod repository;
mod service;
mod utils;

use actors::{
    CompleteOrder, GetLoyaltyHistory, GetProfile, MembershipActor, QuoteDiscountedPrice,
    RegisterCustomer,
};
use config::{AppConfig, StoreBackend};
use repository::{CustomerRepository, InMemoryRepository, ScyllaRepository};
use service::MembershipService;

#[actix::main]
async fn main() -> anyhow::Result<()> {
    // Initialize structured logging with environment-based filtering
    // Default to INFO level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(true))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,loyalty_engine=debug")),
        )
        .init();

    tracing::info!("🚀 Starting membership & loyalty engine");

    let app_config = AppConfig::from_env()?;
    tracing::info!(?app_config, "Configuration loaded");

    // === 1. Pick the repository backend ===
    let repository: Arc<dyn CustomerRepository> = match app_config.backend {
        StoreBackend::Memory => {
            tracing::info!("Using in-memory repository");
            Arc::new(InMemoryRepository::new())
        }
        StoreBackend::Scylla => {
            let repo =
                ScyllaRepository::connect(&app_config.scylla_node, &app_config.keyspace).await?;
            tracing::info!("Using ScyllaDB repository");
            Arc::new(repo)
        }
    };

    // === 2. Initialize Prometheus metrics ===
    tracing::info!("Initializing metrics");
    let service_metrics = Arc::new(metrics::Metrics::new()?);

    // Start metrics HTTP server in background thread
    let metrics_registry = Arc::new(service_metrics.registry().clone());
    let metrics_port = app_config.metrics_port;
    std::thread::spawn(move || {
        let rt = match tokio::runtime::Runtime::new() {
            Ok(rt) => rt,
            Err(e) => {
                tracing::error!("Failed to build metrics runtime: {}", e);
                return;
            }
        };
        rt.block_on(async {
            if let Err(e) = metrics::start_metrics_server(metrics_registry, metrics_port).await {
                tracing::error!("Metrics server error: {}", e);
            }
        });
    });

    // === 3. Start the membership actor ===
    let membership_service = Arc::new(MembershipService::new(repository, service_metrics));
    let membership = MembershipActor::new(membership_service).start();

    // === 4. Demonstrate the membership lifecycle ===
    tracing::info!("📝 Demonstrating membership lifecycle");

    let customer_id = uuid::Uuid::new_v4();
    let profile = membership.send(RegisterCustomer { customer_id }).await??;
    tracing::info!(
        customer_id = %customer_id,
        tier = %profile.membership_tier,
        segment = %profile.segment,
        "✅ Customer registered"
    );

    // A sequence of completed orders walking the tier ladder:
    // 120.50 stays Green, +600 crosses Silver, +900 crosses Gold.
    for order_total in [120.50, 600.00, 900.00] {
        let outcome = membership
            .send(CompleteOrder {
                customer_id,
                order_total,
            })
            .await??;
        tracing::info!(
            order_total = order_total,
            lifetime_value = outcome.profile.lifetime_value,
            tier = %outcome.profile.membership_tier,
            points_earned = outcome.points_earned,
            tier_changed = outcome.tier_changed(),
            "✅ Order applied"
        );
    }

    // Member pricing for the current tier
    let quoted = membership
        .send(QuoteDiscountedPrice {
            customer_id,
            price: 100.0,
        })
        .await??;
    tracing::info!(list_price = 100.0, member_price = quoted, "✅ Member price quoted");

    // Dump the loyalty ledger
    let ledger = membership.send(GetLoyaltyHistory { customer_id }).await??;
    for entry in &ledger {
        tracing::info!(
            transaction_id = %entry.id,
            transaction_type = %entry.transaction_type.as_str(),
            points = entry.points,
            description = %entry.description,
            "Ledger entry"
        );
    }

    // Final profile state
    let profile = membership.send(GetProfile { customer_id }).await??;
    tracing::info!(
        lifetime_value = profile.lifetime_value,
        total_orders = profile.total_orders,
        average_order_value = profile.average_order_value,
        loyalty_points = profile.loyalty_points,
        tier = %profile.membership_tier,
        segment = %profile.segment,
        "Final profile"
    );

    tracing::info!("🎉 Demo complete!");

    Ok(())
}
