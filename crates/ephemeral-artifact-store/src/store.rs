//! Core artifact store implementation.

use crate::{
    error::{Result, StoreError},
    id::ArtifactId,
    policy::RetentionPolicy,
};

use bytes::Bytes;
use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;
use std::{collections::HashMap, sync::Arc, time::Duration};
use tokio::{sync::RwLock, task::JoinHandle, time::interval};
use tokio_util::sync::CancellationToken;

/// A stored artifact. Immutable from insertion until it is reaped.
#[derive(Debug, Clone, Serialize)]
pub struct Artifact {
    pub id: ArtifactId,
    #[serde(skip)]
    pub bytes: Bytes,
    pub content_type: String,
    pub created_at: DateTime<Utc>,
    pub source_text: String,
}

impl Artifact {
    pub fn size_bytes(&self) -> usize {
        self.bytes.len()
    }
}

/// Statistics about stored artifacts.
#[derive(Debug, Clone, Serialize)]
pub struct StoreStats {
    pub live_artifacts: usize,
    pub total_bytes: u64,
    pub tombstones: usize,
    pub ttl_seconds: u64,
}

/// Live artifacts plus the handles of recently reaped ones.
///
/// Both maps sit behind a single lock so a handle is never observable in
/// neither (or both) between a reap's removal and its tombstone insert.
#[derive(Debug, Default)]
struct Registry {
    live: HashMap<ArtifactId, Arc<Artifact>>,
    tombstones: HashMap<ArtifactId, DateTime<Utc>>,
}

/// Keyed, time-bounded artifact store.
///
/// Cloning is cheap; all clones share the same registry.
#[derive(Clone, Debug)]
pub struct ArtifactStore {
    registry: Arc<RwLock<Registry>>,
    retention_policy: RetentionPolicy,
    reap_interval: Duration,
    reap_on_insert: bool,
    tombstone_retention: Duration,
}

impl ArtifactStore {
    /// Create a new builder for configuring the store.
    #[must_use]
    pub fn builder() -> ArtifactStoreBuilder {
        ArtifactStoreBuilder::new()
    }

    pub fn retention_policy(&self) -> RetentionPolicy {
        self.retention_policy
    }

    pub fn reap_interval(&self) -> Duration {
        self.reap_interval
    }

    /// When `artifact` stops being served, if the policy expires anything.
    pub fn expires_at(&self, artifact: &Artifact) -> Option<DateTime<Utc>> {
        self.retention_policy.expires_at(artifact.created_at)
    }

    /// Store `bytes` under a freshly issued handle.
    pub async fn insert<B, C, S>(&self, bytes: B, content_type: C, source_text: S) -> ArtifactId
    where
        B: Into<Bytes>,
        C: Into<String>,
        S: Into<String>,
    {
        self.insert_at(bytes, content_type, source_text, Utc::now())
            .await
    }

    /// Store `bytes` as if created at `now`.
    pub async fn insert_at<B, C, S>(
        &self,
        bytes: B,
        content_type: C,
        source_text: S,
        now: DateTime<Utc>,
    ) -> ArtifactId
    where
        B: Into<Bytes>,
        C: Into<String>,
        S: Into<String>,
    {
        if self.reap_on_insert {
            self.reap(now).await;
        }

        let bytes = bytes.into();
        let size_bytes = bytes.len();

        let mut registry = self.registry.write().await;
        let id = loop {
            let candidate = ArtifactId::generate();
            if !registry.live.contains_key(&candidate)
                && !registry.tombstones.contains_key(&candidate)
            {
                break candidate;
            }
            tracing::warn!("Artifact id collision, drawing a new id");
        };

        let artifact = Artifact {
            id: id.clone(),
            bytes,
            content_type: content_type.into(),
            created_at: now,
            source_text: source_text.into(),
        };
        registry.live.insert(id.clone(), Arc::new(artifact));
        drop(registry);

        tracing::debug!(artifact_id = %id, size_bytes, "Stored artifact");
        id
    }

    /// Look up a live artifact.
    ///
    /// # Errors
    /// - [`StoreError::Expired`] if the artifact outlived its TTL (reaped or not)
    /// - [`StoreError::NotFound`] if the handle was never issued or has been forgotten
    pub async fn lookup(&self, id: &ArtifactId) -> Result<Arc<Artifact>> {
        self.lookup_at(id, Utc::now()).await
    }

    /// Look up a live artifact as of `now`.
    ///
    /// # Errors
    /// Same as [`ArtifactStore::lookup`].
    pub async fn lookup_at(&self, id: &ArtifactId, now: DateTime<Utc>) -> Result<Arc<Artifact>> {
        let registry = self.registry.read().await;

        if let Some(artifact) = registry.live.get(id) {
            if self.retention_policy.is_expired(artifact.created_at, now) {
                return Err(StoreError::Expired { id: id.to_string() });
            }
            return Ok(Arc::clone(artifact));
        }

        if registry.tombstones.contains_key(id) {
            Err(StoreError::Expired { id: id.to_string() })
        } else {
            Err(StoreError::NotFound { id: id.to_string() })
        }
    }

    /// Parse a raw handle and look it up. Malformed handles are [`StoreError::NotFound`].
    ///
    /// # Errors
    /// Same as [`ArtifactStore::lookup`].
    pub async fn lookup_str(&self, raw_id: &str) -> Result<Arc<Artifact>> {
        let id: ArtifactId = raw_id.parse()?;
        self.lookup(&id).await
    }

    /// Phase 1: decide what to remove while holding only the read lock.
    async fn collect_reap_candidates(&self, now: DateTime<Utc>) -> (Vec<ArtifactId>, bool) {
        let registry = self.registry.read().await;

        let expired: Vec<ArtifactId> = registry
            .live
            .values()
            .filter(|artifact| self.retention_policy.is_expired(artifact.created_at, now))
            .map(|artifact| artifact.id.clone())
            .collect();

        let retention = self.tombstone_delta();
        let stale_tombstones = registry
            .tombstones
            .values()
            .any(|evicted_at| now.signed_duration_since(*evicted_at) > retention);

        (expired, stale_tombstones)
    }

    fn tombstone_delta(&self) -> TimeDelta {
        TimeDelta::from_std(self.tombstone_retention).unwrap_or(TimeDelta::MAX)
    }

    /// Remove every artifact that has expired as of `now`.
    ///
    /// Two-phase: candidates are collected under the read lock and the write
    /// lock is taken only when there is something to remove. Reaped handles
    /// are tombstoned; tombstones older than the tombstone retention are pruned.
    /// Returns the number of artifacts removed.
    pub async fn reap(&self, now: DateTime<Utc>) -> usize {
        if !self.retention_policy.enabled {
            return 0;
        }

        let (expired, stale_tombstones) = self.collect_reap_candidates(now).await;
        if expired.is_empty() && !stale_tombstones {
            tracing::trace!("Reap found nothing to remove");
            return 0;
        }

        let retention = self.tombstone_delta();
        let mut registry = self.registry.write().await;

        let mut removed = 0;
        for id in expired {
            if registry.live.remove(&id).is_some() {
                registry.tombstones.insert(id, now);
                removed += 1;
            }
        }

        let tombstones_before = registry.tombstones.len();
        registry
            .tombstones
            .retain(|_, evicted_at| now.signed_duration_since(*evicted_at) <= retention);
        let pruned = tombstones_before - registry.tombstones.len();
        let live = registry.live.len();
        drop(registry);

        if removed > 0 {
            tracing::info!(removed, pruned_tombstones = pruned, live, "Reaped expired artifacts");
        } else {
            tracing::debug!(pruned_tombstones = pruned, "Pruned artifact tombstones");
        }
        removed
    }

    /// Reap against the wall clock.
    pub async fn reap_expired(&self) -> usize {
        self.reap(Utc::now()).await
    }

    /// Get statistics about stored artifacts.
    pub async fn stats(&self) -> StoreStats {
        let registry = self.registry.read().await;
        let live_artifacts = registry.live.len();
        let total_bytes = registry
            .live
            .values()
            .map(|artifact| artifact.size_bytes() as u64)
            .sum();
        let tombstones = registry.tombstones.len();
        drop(registry);

        StoreStats {
            live_artifacts,
            total_bytes,
            tombstones,
            ttl_seconds: self.retention_policy.ttl.as_secs(),
        }
    }

    /// Start the background reaper.
    ///
    /// Returns `None` when expiry is disabled or the interval is zero. The task
    /// exits once `shutdown` is cancelled.
    pub fn spawn_reaper(&self, shutdown: CancellationToken) -> Option<JoinHandle<()>> {
        if !self.retention_policy.enabled || self.reap_interval.is_zero() {
            return None;
        }

        let store = self.clone();

        Some(tokio::spawn(async move {
            let mut reap_interval = interval(store.reap_interval);

            loop {
                tokio::select! {
                    () = shutdown.cancelled() => {
                        tracing::debug!("Artifact reaper stopped");
                        break;
                    }
                    _ = reap_interval.tick() => {
                        store.reap_expired().await;
                    }
                }
            }
        }))
    }
}

/// Builder for configuring an `ArtifactStore`.
pub struct ArtifactStoreBuilder {
    retention_policy: RetentionPolicy,
    reap_interval: Option<Duration>,
    reap_on_insert: bool,
    tombstone_retention: Option<Duration>,
}

impl ArtifactStoreBuilder {
    fn new() -> Self {
        Self {
            retention_policy: RetentionPolicy::default(),
            reap_interval: None,
            reap_on_insert: false,
            tombstone_retention: None,
        }
    }

    /// Set the retention policy.
    #[must_use]
    pub fn retention_policy(mut self, policy: RetentionPolicy) -> Self {
        self.retention_policy = policy;
        self
    }

    /// Set the background reap interval. Defaults to the policy's recommendation.
    #[must_use]
    pub fn reap_interval(mut self, interval: Duration) -> Self {
        self.reap_interval = Some(interval);
        self
    }

    /// Reap opportunistically before every insert.
    #[must_use]
    pub fn reap_on_insert(mut self, enabled: bool) -> Self {
        self.reap_on_insert = enabled;
        self
    }

    /// How long reaped handles keep reporting "expired". Defaults to the TTL.
    #[must_use]
    pub fn tombstone_retention(mut self, retention: Duration) -> Self {
        self.tombstone_retention = Some(retention);
        self
    }

    /// Build the `ArtifactStore`.
    ///
    /// # Errors
    /// Returns an error if expiry is enabled with a zero TTL.
    pub fn build(self) -> Result<ArtifactStore> {
        if self.retention_policy.enabled && self.retention_policy.ttl.is_zero() {
            return Err(StoreError::Configuration {
                message: "TTL must be greater than zero when expiry is enabled".to_string(),
            });
        }

        let reap_interval = self
            .reap_interval
            .unwrap_or_else(|| self.retention_policy.recommended_reap_interval());
        let tombstone_retention = self
            .tombstone_retention
            .unwrap_or(self.retention_policy.ttl);

        let store = ArtifactStore {
            registry: Arc::new(RwLock::new(Registry::default())),
            retention_policy: self.retention_policy,
            reap_interval,
            reap_on_insert: self.reap_on_insert,
            tombstone_retention,
        };

        tracing::info!(
            "ArtifactStore initialized - ttl: {:?}, reap_interval: {:?}, reap_on_insert: {}, expiry_enabled: {}",
            store.retention_policy.ttl,
            store.reap_interval,
            store.reap_on_insert,
            store.retention_policy.enabled
        );

        Ok(store)
    }
}
