// ============================================================================
// Domain Layer - Business Logic
// ============================================================================
//
// This module contains the domain entities and rules:
// - customer: profile aggregates and the loyalty ledger
// - membership: the pure rules engine (tiers, discounts, points, segments)
//
// This layer is completely separate from persistence and orchestration.
//
// ============================================================================

pub mod customer;
pub mod membership;
