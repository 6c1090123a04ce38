use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::errors::MembershipError;

// ============================================================================
// Membership Value Objects
// ============================================================================

/// Membership tier, derived from lifetime spend.
///
/// Tier is a closed enum: persistence stores the uppercase name and an
/// unrecognized string is a typed error at the parse boundary, never a
/// silent zero-discount fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MembershipTier {
    Green,
    Silver,
    Gold,
    Platinum,
}

impl MembershipTier {
    /// Member discount rate for this tier.
    pub fn discount_rate(&self) -> f64 {
        match self {
            MembershipTier::Green => 0.05,
            MembershipTier::Silver => 0.10,
            MembershipTier::Gold => 0.15,
            MembershipTier::Platinum => 0.20,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MembershipTier::Green => "GREEN",
            MembershipTier::Silver => "SILVER",
            MembershipTier::Gold => "GOLD",
            MembershipTier::Platinum => "PLATINUM",
        }
    }
}

impl fmt::Display for MembershipTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MembershipTier {
    type Err = MembershipError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "GREEN" => Ok(MembershipTier::Green),
            "SILVER" => Ok(MembershipTier::Silver),
            "GOLD" => Ok(MembershipTier::Gold),
            "PLATINUM" => Ok(MembershipTier::Platinum),
            other => Err(MembershipError::UnknownTier(other.to_string())),
        }
    }
}

/// Customer segment for marketing/analytics, derived from order count,
/// spend, and recency of the last order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CustomerSegment {
    New,
    Regular,
    #[serde(rename = "VIP")]
    Vip,
    Dormant,
}

impl CustomerSegment {
    pub fn as_str(&self) -> &'static str {
        match self {
            CustomerSegment::New => "New",
            CustomerSegment::Regular => "Regular",
            CustomerSegment::Vip => "VIP",
            CustomerSegment::Dormant => "Dormant",
        }
    }
}

impl fmt::Display for CustomerSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CustomerSegment {
    type Err = MembershipError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "New" => Ok(CustomerSegment::New),
            "Regular" => Ok(CustomerSegment::Regular),
            "VIP" => Ok(CustomerSegment::Vip),
            "Dormant" => Ok(CustomerSegment::Dormant),
            other => Err(MembershipError::UnknownSegment(other.to_string())),
        }
    }
}

/// A validated order total: finite and non-negative.
///
/// Negative totals (refunds, adjustments) are rejected at this boundary
/// rather than clamped or propagated into the aggregates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrderTotal(f64);

impl OrderTotal {
    pub fn new(amount: f64) -> Result<Self, MembershipError> {
        if !amount.is_finite() || amount < 0.0 {
            return Err(MembershipError::InvalidOrderTotal(amount));
        }
        Ok(Self(amount))
    }

    pub fn amount(&self) -> f64 {
        self.0
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
