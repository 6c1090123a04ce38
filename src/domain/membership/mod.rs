// ============================================================================
// Membership Domain - Tier, Segment, and Loyalty Rules
// ============================================================================
//
// This module contains ALL membership-specific rule code:
// - Value objects (MembershipTier, CustomerSegment, OrderTotal)
// - Errors (MembershipError enum)
// - Rules engine (tier ladder, discounts, points, segmentation)
//
// The rules are pure functions; orchestration against persistence lives
// in the service layer.
//
// ============================================================================

pub mod engine;
pub mod errors;
pub mod value_objects;

// Re-export for convenience
pub use engine::*;
pub use errors::*;
pub use value_objects::*;
