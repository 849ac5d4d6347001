//! The authenticated caller passed into every service call.

use database::User;

/// Plan tier of the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tier {
    /// Metered: matching runs count against the free quota.
    #[default]
    Standard,
    /// Unlimited matching, never counted.
    Privileged,
}

/// An authenticated user and their tier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub user: User,
    pub tier: Tier,
}

impl Principal {
    pub fn new(user: User, tier: Tier) -> Self {
        Self { user, tier }
    }

    /// Internal user id.
    pub fn id(&self) -> &str {
        &self.user.id
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.user.name
    }

    pub fn is_privileged(&self) -> bool {
        self.tier == Tier::Privileged
    }
}
