use std::env;

// ============================================================================
// Configuration - Environment-Driven
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Memory,
    Scylla,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub backend: StoreBackend,
    pub scylla_node: String,
    pub keyspace: String,
    pub metrics_port: u16,
}

impl AppConfig {
    /// Read configuration from the environment, falling back to demo-friendly
    /// defaults (in-memory store, metrics on 9090).
    pub fn from_env() -> anyhow::Result<Self> {
        let backend = match env::var("STORE_BACKEND").as_deref() {
            Ok("scylla") => StoreBackend::Scylla,
            Ok("memory") | Err(_) => StoreBackend::Memory,
            Ok(other) => anyhow::bail!("Unknown STORE_BACKEND: {}", other),
        };

        let metrics_port = match env::var("METRICS_PORT") {
            Ok(raw) => raw
                .parse()
                .map_err(|_| anyhow::anyhow!("Invalid METRICS_PORT: {}", raw))?,
            Err(_) => 9090,
        };

        Ok(Self {
            backend,
            scylla_node: env::var("SCYLLA_NODE").unwrap_or_else(|_| "127.0.0.1:9042".to_string()),
            keyspace: env::var("SCYLLA_KEYSPACE").unwrap_or_else(|_| "loyalty_ks".to_string()),
            metrics_port,
        })
    }
}
