use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tokio::sync::OwnedMutexGuard;
use tracing::{info, instrument};

use crate::domain::models::subscription::{
    BillingCycle, Limits, Subscription, SubscriptionStatus, Tier, Usage, UsageField,
};
use crate::domain::ports::{SubscriptionRepository, UsageRepository};
use crate::domain::services::{entitlements, fetch_guard::Scoped, locks::TenantLocks};
use crate::error::AppError;

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct BillingSnapshot {
    pub subscription: Subscription,
    pub usage: Usage,
    pub limits: Limits,
}

/// Subscription and usage ledger of one company.
pub struct BillingService {
    company_id: String,
    subscriptions: Arc<dyn SubscriptionRepository>,
    usage: Arc<dyn UsageRepository>,
    locks: Arc<TenantLocks>,
    snapshot: Scoped<Option<BillingSnapshot>>,
}

impl BillingService {
    pub fn new(
        company_id: String,
        subscriptions: Arc<dyn SubscriptionRepository>,
        usage: Arc<dyn UsageRepository>,
        locks: Arc<TenantLocks>,
    ) -> Self {
        Self {
            snapshot: Scoped::new(company_id.clone(), None),
            company_id,
            subscriptions,
            usage,
            locks,
        }
    }

    pub fn snapshot(&self) -> Option<BillingSnapshot> {
        self.snapshot.snapshot()
    }

    pub async fn refresh(&self) -> Result<(), AppError> {
        let ticket = self.snapshot.begin();
        let fresh = self.load().await?;
        self.snapshot.commit(&ticket, Some(fresh));
        Ok(())
    }

    async fn load(&self) -> Result<BillingSnapshot, AppError> {
        let subscription = self
            .subscriptions
            .find_by_company(&self.company_id)
            .await?
            .ok_or_else(|| AppError::NotFound("No subscription found for this company".into()))?;
        let usage = self
            .usage
            .find_by_company(&self.company_id)
            .await?
            .ok_or_else(|| AppError::NotFound("No usage record found for this company".into()))?;
        let limits = subscription.limits()?;
        Ok(BillingSnapshot { subscription, usage, limits })
    }

    /// Claims the company's `field` slot, then checks the backend's current
    /// counters. Other sessions wait on the slot until the returned guard is
    /// dropped, so keep it until the matching `record_usage` has landed.
    pub async fn reserve(&self, field: UsageField) -> Result<OwnedMutexGuard<()>, AppError> {
        let slot = self.locks.usage(&self.company_id, field).await;
        let fresh = self.load().await?;
        let tier = fresh.subscription.tier()?;
        entitlements::ensure_capacity(field, &fresh.usage, tier)?;
        Ok(slot)
    }

    pub async fn record_usage(&self, field: UsageField, delta: i64) -> Result<Usage, AppError> {
        let usage = self.usage.increment(&self.company_id, field, delta).await?;
        self.snapshot.update(|s| {
            if let Some(s) = s {
                s.usage = usage.clone();
            }
        });
        Ok(usage)
    }

    /// Applies a completed payment: new tier and cycle, fresh period, limits
    /// rewritten from the tier table.
    #[instrument(skip(self), fields(company_id = %self.company_id))]
    pub async fn apply_payment(&self, tier: &str, cycle: BillingCycle) -> Result<BillingSnapshot, AppError> {
        let tier: Tier = tier.parse()?;
        let mut subscription = self
            .subscriptions
            .find_by_company(&self.company_id)
            .await?
            .ok_or_else(|| AppError::NotFound("No subscription found for this company".into()))?;

        let now = Utc::now();
        subscription.tier = tier.as_str().to_string();
        subscription.billing_cycle = cycle;
        subscription.status = SubscriptionStatus::Active;
        subscription.current_period_start = now;
        subscription.current_period_end = Some(now + cycle.period());

        self.subscriptions.update(&subscription).await?;
        self.usage.set_limits(&self.company_id, tier.limits()).await?;
        info!("Subscription moved to {} ({:?})", tier, cycle);

        self.refresh().await?;
        self.snapshot()
            .ok_or_else(|| AppError::InternalWithMsg("Billing snapshot missing after refresh".into()))
    }
}
