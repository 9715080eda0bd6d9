use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use crate::domain::models::integration::Channel;
use crate::domain::models::subscription::UsageField;

/// One async mutex per key, created on first use.
pub struct KeyedLocks<K> {
    locks: parking_lot::Mutex<HashMap<K, Arc<AsyncMutex<()>>>>,
}

impl<K> Default for KeyedLocks<K> {
    fn default() -> Self {
        Self { locks: parking_lot::Mutex::new(HashMap::new()) }
    }
}

impl<K: Hash + Eq> KeyedLocks<K> {
    pub async fn acquire(&self, key: K) -> OwnedMutexGuard<()> {
        let lock = self.locks.lock().entry(key).or_default().clone();
        lock.lock_owned().await
    }
}

/// Process-wide locks, shared by every session of every tenant.
#[derive(Default)]
pub struct TenantLocks {
    /// Serializes configure/disconnect per (company, channel).
    channels: KeyedLocks<(String, Channel)>,
    /// Held from a capacity check until the matching usage increment lands.
    usage_slots: KeyedLocks<(String, UsageField)>,
}

impl TenantLocks {
    pub async fn channel(&self, company_id: &str, channel: Channel) -> OwnedMutexGuard<()> {
        self.channels.acquire((company_id.to_string(), channel)).await
    }

    pub async fn usage(&self, company_id: &str, field: UsageField) -> OwnedMutexGuard<()> {
        self.usage_slots.acquire((company_id.to_string(), field)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_same_key_waits_other_keys_do_not() {
        let locks = TenantLocks::default();
        let held = locks.usage("c1", UsageField::Files).await;

        let same = tokio::time::timeout(Duration::from_millis(20), locks.usage("c1", UsageField::Files)).await;
        assert!(same.is_err());

        let other_field = tokio::time::timeout(Duration::from_millis(20), locks.usage("c1", UsageField::Messages)).await;
        assert!(other_field.is_ok());
        let other_company = tokio::time::timeout(Duration::from_millis(20), locks.usage("c2", UsageField::Files)).await;
        assert!(other_company.is_ok());

        drop(held);
        assert!(tokio::time::timeout(Duration::from_millis(20), locks.usage("c1", UsageField::Files)).await.is_ok());
    }
}
