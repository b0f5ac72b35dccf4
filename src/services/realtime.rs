//! Versioned change notifications and the analytics snapshot cache.
//!
//! Every write bumps the owner's version and broadcasts a [`ChangeEvent`].
//! Analytics snapshots carry the version they were computed at, so a slow
//! recomputation never overwrites a newer one.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, Mutex};
use uuid::Uuid;

use crate::services::analytics::AnalyticsReport;

const CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ChangeTable {
    JournalEntries,
    WellnessMetrics,
    WellnessGoals,
    Accounts,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChangeAction {
    Insert,
    Update,
    Delete,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChangeEvent {
    #[serde(rename = "type")]
    pub kind: String,
    pub user_id: Uuid,
    pub table: ChangeTable,
    pub action: ChangeAction,
    pub version: u64,
}

#[derive(Clone)]
pub struct ChangeFeed {
    tx: broadcast::Sender<ChangeEvent>,
    versions: Arc<Mutex<HashMap<Uuid, u64>>>,
}

impl Default for ChangeFeed {
    fn default() -> Self {
        Self::new()
    }
}

impl ChangeFeed {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            tx,
            versions: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub async fn current_version(&self, user_id: Uuid) -> u64 {
        self.versions.lock().await.get(&user_id).copied().unwrap_or(0)
    }

    /// Bump the user's version and notify subscribers. Returns the new
    /// version.
    pub async fn publish(&self, user_id: Uuid, table: ChangeTable, action: ChangeAction) -> u64 {
        let version = {
            let mut versions = self.versions.lock().await;
            let v = versions.entry(user_id).or_insert(0);
            *v += 1;
            *v
        };

        let event = ChangeEvent {
            kind: "data_changed".to_string(),
            user_id,
            table,
            action,
            version,
        };

        // No subscribers is not an error
        if let Err(e) = self.tx.send(event) {
            tracing::trace!(user_id = %user_id, error = %e, "No change feed subscribers");
        }

        version
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.tx.subscribe()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub user_id: Uuid,
    pub window_days: i64,
    pub tz_offset_minutes: i32,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalyticsSnapshot {
    pub version: u64,
    pub computed_at: DateTime<Utc>,
    pub report: AnalyticsReport,
}

/// Last good analytics snapshot per user. Only the most recent view is kept:
/// a request for a different window or offset replaces it.
#[derive(Clone, Default)]
pub struct AnalyticsCache {
    snapshots: Arc<Mutex<HashMap<Uuid, (CacheKey, AnalyticsSnapshot)>>>,
}

impl AnalyticsCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `snapshot` unless a newer one for the same view is already
    /// cached. Returns whether it was stored.
    pub async fn apply(&self, key: CacheKey, snapshot: AnalyticsSnapshot) -> bool {
        let mut snapshots = self.snapshots.lock().await;
        match snapshots.get(&key.user_id) {
            Some((cached, existing)) if *cached == key && existing.version > snapshot.version => false,
            _ => {
                snapshots.insert(key.user_id, (key, snapshot));
                true
            }
        }
    }

    pub async fn get(&self, key: &CacheKey) -> Option<AnalyticsSnapshot> {
        self.snapshots
            .lock()
            .await
            .get(&key.user_id)
            .filter(|(cached, _)| cached == key)
            .map(|(_, snapshot)| snapshot.clone())
    }

    pub async fn evict_user(&self, user_id: Uuid) {
        self.snapshots.lock().await.remove(&user_id);
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.snapshots.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::analytics::build_report;
    use crate::services::rules::AnalyticsRules;
    use chrono::{FixedOffset, NaiveDate};

    fn key(user_id: Uuid) -> CacheKey {
        CacheKey {
            user_id,
            window_days: 30,
            tz_offset_minutes: 0,
        }
    }

    fn snapshot(version: u64, window_days: i64) -> AnalyticsSnapshot {
        let today = NaiveDate::from_ymd_opt(2026, 6, 10).unwrap();
        let report = build_report(
            &[],
            &AnalyticsRules::default(),
            &FixedOffset::east_opt(0).unwrap(),
            today,
            window_days,
        );
        AnalyticsSnapshot {
            version,
            computed_at: Utc::now(),
            report,
        }
    }

    #[tokio::test]
    async fn test_publish_bumps_version_per_user() {
        let feed = ChangeFeed::new();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();

        assert_eq!(feed.current_version(alice).await, 0);
        assert_eq!(feed.publish(alice, ChangeTable::JournalEntries, ChangeAction::Insert).await, 1);
        assert_eq!(feed.publish(alice, ChangeTable::WellnessGoals, ChangeAction::Update).await, 2);
        assert_eq!(feed.current_version(alice).await, 2);
        assert_eq!(feed.current_version(bob).await, 0);
    }

    #[tokio::test]
    async fn test_subscribers_receive_typed_events() {
        let feed = ChangeFeed::new();
        let mut rx = feed.subscribe();
        let user = Uuid::new_v4();

        feed.publish(user, ChangeTable::WellnessMetrics, ChangeAction::Update).await;

        let event = rx.recv().await.unwrap();
        assert_eq!(event.user_id, user);
        assert_eq!(event.version, 1);

        let wire = serde_json::to_value(&event).unwrap();
        assert_eq!(wire["type"], "data_changed");
        assert_eq!(wire["table"], "wellness_metrics");
        assert_eq!(wire["action"], "update");
    }

    #[tokio::test]
    async fn test_publish_without_subscribers_still_counts() {
        let feed = ChangeFeed::new();
        let user = Uuid::new_v4();
        feed.publish(user, ChangeTable::Accounts, ChangeAction::Delete).await;
        assert_eq!(feed.current_version(user).await, 1);
    }

    #[tokio::test]
    async fn test_older_snapshot_never_replaces_newer() {
        let cache = AnalyticsCache::new();
        let user = Uuid::new_v4();

        assert!(cache.apply(key(user), snapshot(3, 30)).await);
        assert!(!cache.apply(key(user), snapshot(2, 30)).await);
        assert_eq!(cache.get(&key(user)).await.unwrap().version, 3);

        // Equal version recomputations are accepted
        assert!(cache.apply(key(user), snapshot(3, 30)).await);
        assert!(cache.apply(key(user), snapshot(4, 30)).await);
        assert_eq!(cache.get(&key(user)).await.unwrap().version, 4);
    }

    #[tokio::test]
    async fn test_one_snapshot_per_user() {
        let cache = AnalyticsCache::new();
        let user = Uuid::new_v4();

        for window_days in 1..=365 {
            for tz_offset_minutes in [-300, 0, 60, 330, 600] {
                let view = CacheKey {
                    user_id: user,
                    window_days,
                    tz_offset_minutes,
                };
                cache.apply(view, snapshot(1, 7)).await;
            }
        }
        assert_eq!(cache.len().await, 1);

        let last = CacheKey {
            user_id: user,
            window_days: 365,
            tz_offset_minutes: 600,
        };
        assert!(cache.get(&last).await.is_some());
        assert!(cache.get(&key(user)).await.is_none());
    }

    #[tokio::test]
    async fn test_other_view_replaces_snapshot() {
        let cache = AnalyticsCache::new();
        let user = Uuid::new_v4();
        let wide = CacheKey {
            window_days: 90,
            ..key(user)
        };

        assert!(cache.apply(key(user), snapshot(5, 30)).await);
        // A different view is stored even with an older version
        assert!(cache.apply(wide, snapshot(4, 90)).await);
        assert!(cache.get(&key(user)).await.is_none());
        assert_eq!(cache.get(&wide).await.unwrap().version, 4);
    }

    #[tokio::test]
    async fn test_evict_user_clears_snapshot() {
        let cache = AnalyticsCache::new();
        let user = Uuid::new_v4();
        let other = Uuid::new_v4();

        cache.apply(key(user), snapshot(1, 30)).await;
        cache.apply(key(other), snapshot(1, 30)).await;

        cache.evict_user(user).await;
        assert!(cache.get(&key(user)).await.is_none());
        assert!(cache.get(&key(other)).await.is_some());
        assert_eq!(cache.len().await, 1);
    }
}
