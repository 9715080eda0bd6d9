use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Duration, Utc};

use crate::domain::services::entitlements;
use crate::error::AppError;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Free,
    Starter,
    Professional,
    Enterprise,
}

impl Tier {
    pub const ALL: [Tier; 4] = [Tier::Free, Tier::Starter, Tier::Professional, Tier::Enterprise];

    pub fn as_str(self) -> &'static str {
        match self {
            Tier::Free => "free",
            Tier::Starter => "starter",
            Tier::Professional => "professional",
            Tier::Enterprise => "enterprise",
        }
    }

    pub fn limits(self) -> Limits {
        entitlements::tier_limits(self)
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tier {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Tier::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| AppError::UnknownTier(s.to_string()))
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BillingCycle {
    Monthly,
    Yearly,
}

impl BillingCycle {
    pub fn period(self) -> Duration {
        match self {
            BillingCycle::Monthly => Duration::days(30),
            BillingCycle::Yearly => Duration::days(365),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    Active,
    PastDue,
    Canceled,
    Trialing,
}

/// Numeric usage ceilings of a tier.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    pub messages_limit: i64,
    pub team_members_limit: i64,
    pub files_limit: i64,
}

/// Row of the `subscriptions` table. `tier` stays raw so a value outside the
/// tier table is caught by [`Subscription::tier`] instead of at decode time.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Subscription {
    pub id: String,
    pub company_id: String,
    pub tier: String,
    pub billing_cycle: BillingCycle,
    pub status: SubscriptionStatus,
    pub current_period_start: DateTime<Utc>,
    pub current_period_end: Option<DateTime<Utc>>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl Subscription {
    /// Starting subscription of a freshly created company.
    pub fn free(company_id: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            company_id,
            tier: Tier::Free.as_str().to_string(),
            billing_cycle: BillingCycle::Monthly,
            status: SubscriptionStatus::Active,
            current_period_start: now,
            current_period_end: None,
            created_at: now,
        }
    }

    pub fn tier(&self) -> Result<Tier, AppError> {
        self.tier.parse()
    }

    pub fn limits(&self) -> Result<Limits, AppError> {
        entitlements::limits_for_tier(&self.tier)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum UsageField {
    Messages,
    Files,
    TeamMembers,
}

impl UsageField {
    pub fn as_str(self) -> &'static str {
        match self {
            UsageField::Messages => "messages",
            UsageField::Files => "files",
            UsageField::TeamMembers => "team_members",
        }
    }
}

/// Row of the `subscription_usage` table.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Usage {
    pub company_id: String,
    pub messages_used: i64,
    pub messages_limit: i64,
    pub files_used: i64,
    pub files_limit: i64,
    pub team_members_used: i64,
    pub team_members_limit: i64,
}

impl Usage {
    pub fn fresh(company_id: String, limits: Limits) -> Self {
        Self {
            company_id,
            messages_used: 0,
            messages_limit: limits.messages_limit,
            files_used: 0,
            files_limit: limits.files_limit,
            team_members_used: 0,
            team_members_limit: limits.team_members_limit,
        }
    }

    pub fn used(&self, field: UsageField) -> i64 {
        match field {
            UsageField::Messages => self.messages_used,
            UsageField::Files => self.files_used,
            UsageField::TeamMembers => self.team_members_used,
        }
    }

    pub fn apply_limits(&mut self, limits: Limits) {
        self.messages_limit = limits.messages_limit;
        self.files_limit = limits.files_limit;
        self.team_members_limit = limits.team_members_limit;
    }
}
