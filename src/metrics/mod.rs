// Private module declaration
mod server;

use prometheus::{Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts, Registry};

// Re-export for public API
pub use server::start_metrics_server;

// ============================================================================
// Metrics Module - Prometheus metrics for observability
// ============================================================================
//
// Provides metrics for:
// - Order completion throughput and latency
// - Loyalty points awarded
// - Tier transitions
// - CAS version conflicts (lost-update races caught and retried)
//
// All metrics are registered with Prometheus and can be scraped via /metrics
// ============================================================================

/// Central metrics registry for the service
pub struct Metrics {
    registry: Registry,

    // Order completion
    pub orders_processed: IntCounterVec,
    pub orders_rejected: IntCounterVec,
    pub order_processing_duration: Histogram,

    // Loyalty
    pub points_awarded_total: IntCounter,
    pub profiles_registered_total: IntCounter,

    // Tier transitions
    pub tier_upgrades: IntCounterVec,

    // Concurrency
    pub version_conflicts_total: IntCounter,
}

impl Metrics {
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let orders_processed = IntCounterVec::new(
            Opts::new("orders_processed_total", "Completed orders applied to profiles"),
            &["tier"],
        )?;
        registry.register(Box::new(orders_processed.clone()))?;

        let orders_rejected = IntCounterVec::new(
            Opts::new("orders_rejected_total", "Order completions rejected"),
            &["reason"],
        )?;
        registry.register(Box::new(orders_rejected.clone()))?;

        let order_processing_duration = Histogram::with_opts(
            HistogramOpts::new(
                "order_processing_duration_seconds",
                "Time to apply a completed order to a customer profile",
            )
            .buckets(vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0]),
        )?;
        registry.register(Box::new(order_processing_duration.clone()))?;

        let points_awarded_total = IntCounter::new(
            "loyalty_points_awarded_total",
            "Loyalty points awarded across all customers",
        )?;
        registry.register(Box::new(points_awarded_total.clone()))?;

        let profiles_registered_total = IntCounter::new(
            "profiles_registered_total",
            "Customer profiles created at registration",
        )?;
        registry.register(Box::new(profiles_registered_total.clone()))?;

        let tier_upgrades = IntCounterVec::new(
            Opts::new("tier_upgrades_total", "Membership tier transitions"),
            &["from", "to"],
        )?;
        registry.register(Box::new(tier_upgrades.clone()))?;

        let version_conflicts_total = IntCounter::new(
            "profile_version_conflicts_total",
            "Profile CAS writes that lost to a concurrent writer",
        )?;
        registry.register(Box::new(version_conflicts_total.clone()))?;

        Ok(Self {
            registry,
            orders_processed,
            orders_rejected,
            order_processing_duration,
            points_awarded_total,
            profiles_registered_total,
            tier_upgrades,
            version_conflicts_total,
        })
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}
