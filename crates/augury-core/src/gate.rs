//! Freemium access gate
//!
//! Decides, from caller-held counters, whether a request gets a full answer
//! or a teaser. The gate is a pure function: it never stores or mutates
//! anything, and bonus credits are only read here (the caller consumes them).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Delivery tier for one request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    /// Complete answer
    Full,
    /// Teaser plus hook
    Partial,
}

impl Tier {
    /// Lowercase name, used in logs
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Partial => "partial",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of the access gate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessDecision {
    /// Delivery tier
    pub tier: Tier,
    /// Free messages left before the paywall (never negative)
    pub free_messages_remaining: u32,
    /// Whether the caller should show the paywall
    pub show_paywall: bool,
}

impl AccessDecision {
    /// Whether the full answer is delivered
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.tier == Tier::Full
    }
}

/// Decide the delivery tier for a request.
///
/// `message_count` is the 1-based index of the current message in the
/// caller's session.
#[must_use]
pub fn decide(
    message_count: u32,
    is_premium_user: bool,
    bonus_credits: u32,
    free_message_limit: u32,
) -> AccessDecision {
    let within_free = message_count <= free_message_limit;
    let tier = if is_premium_user || bonus_credits > 0 || within_free {
        Tier::Full
    } else {
        Tier::Partial
    };

    AccessDecision {
        tier,
        free_messages_remaining: free_message_limit.saturating_sub(message_count),
        show_paywall: tier == Tier::Partial && !within_free,
    }
}
