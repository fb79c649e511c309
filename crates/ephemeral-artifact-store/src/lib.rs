//! # Ephemeral Artifact Store
//!
//! An in-memory keyed store for short-lived generated artifacts (images, reports,
//! exports) with a fixed time-to-live and automatic reclamation.
//!
//! Every insert is issued a fresh, unpredictable 128-bit handle. Artifacts are
//! immutable once stored and are handed out as shared references, so a reader
//! holding an artifact is never affected by a concurrent reap.
//!
//! ## Features
//!
//! - **Opaque Handles**: 128 random bits per artifact, hex encoded, never reused
//! - **Fixed Retention**: Artifacts become unreachable once their TTL has passed
//! - **Lazy Expiry**: Lookups apply the TTL even before the reaper has run
//! - **Background Reaping**: Interval-driven reclamation on a tokio task
//! - **Expired vs Missing**: Reaped handles are remembered for a bounded time so
//!   callers can tell "expired" apart from "never existed"
//!
//! ## Basic Usage
//!
//! ```rust
//! use ephemeral_artifact_store::{ArtifactStore, RetentionPolicy};
//! use std::time::Duration;
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = ArtifactStore::builder()
//!     .retention_policy(RetentionPolicy::new().ttl(Duration::from_secs(60 * 60)))
//!     .reap_interval(Duration::from_secs(60))
//!     .build()?;
//!
//! let shutdown = CancellationToken::new();
//! let _reaper = store.spawn_reaper(shutdown.clone());
//!
//! let id = store.insert(vec![0x89, 0x50, 0x4e, 0x47], "image/png", "hello").await;
//! let artifact = store.lookup(&id).await?;
//! assert_eq!(artifact.source_text, "hello");
//!
//! shutdown.cancel();
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod id;
pub mod policy;
pub mod store;

pub use error::{Result, StoreError};
pub use id::ArtifactId;
pub use policy::RetentionPolicy;
pub use store::{Artifact, ArtifactStore, ArtifactStoreBuilder, StoreStats};

pub use std::time::Duration;
