// ============================================================================
// Customer Domain - Profile Aggregates and Loyalty Ledger
// ============================================================================
//
// This module contains the customer-side entities:
// - CustomerProfile (lifetime aggregates + derived tier/segment)
// - LoyaltyTransaction (immutable append-only ledger entry)
//
// ============================================================================

pub mod loyalty;
pub mod profile;

// Re-export for convenience
pub use loyalty::*;
pub use profile::*;
