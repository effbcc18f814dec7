use std::sync::Arc;

use async_trait::async_trait;
use carelock_core::{AppResult, AuditEntryId};
use carelock_domain::{AuditAction, MaskingLevel, UserIdentity};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Immutable audit record held by the session audit store.
///
/// Entries are created exactly once at the logging call and are never
/// mutated or reordered afterwards; the store only appends or bulk-evicts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    /// Stable identifier generated at insertion time.
    pub entry_id: AuditEntryId,
    /// Subject claim of the acting user.
    pub subject: String,
    /// Stable audit action.
    pub action: AuditAction,
    /// Logical resource name acted upon.
    pub resource: String,
    /// Optional identifier of the specific resource instance.
    pub resource_id: Option<String>,
    /// Capture time, set once at creation.
    pub recorded_at: DateTime<Utc>,
    /// Optional free-form detail map; sensitive keys are masked at write
    /// time when the store's mask-on-write policy is enabled.
    pub details: Option<Map<String, Value>>,
    /// Whether the detail map was masked when stored.
    pub masked: bool,
}

/// Input payload for one audit append.
///
/// Carries everything except the id, timestamp, and masked flag, which the
/// store assigns at insertion time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAuditEvent {
    /// Subject claim of the acting user.
    pub subject: String,
    /// Stable audit action.
    pub action: AuditAction,
    /// Logical resource name acted upon.
    pub resource: String,
    /// Optional identifier of the specific resource instance.
    pub resource_id: Option<String>,
    /// Optional free-form detail map.
    pub details: Option<Map<String, Value>>,
    /// Masking level derived from the acting user's role.
    pub masking_level: MaskingLevel,
}

/// Port for the session-scoped, append-only audit store.
///
/// All operations are synchronous and infallible under normal use; append
/// and capacity eviction form one atomic transition, so readers never
/// observe the store above its cap.
pub trait AuditStore: Send + Sync {
    /// Appends one event, applying write-time masking policy, and returns
    /// the stored entry.
    fn append_event(&self, event: NewAuditEvent) -> AuditEntry;

    /// Returns all entries for a subject, preserving insertion order.
    fn entries_for_user(&self, subject: &str) -> Vec<AuditEntry>;

    /// Returns all entries for a resource, preserving insertion order.
    fn entries_for_resource(&self, resource: &str) -> Vec<AuditEntry>;

    /// Exports entry copies.
    ///
    /// With `masked = true` the stored entries are returned unchanged. With
    /// `masked = false` only the `masked` flag is cleared on the copies;
    /// values redacted at write time are not reconstructed. Unmasking is
    /// metadata-only and one-way.
    fn export_entries(&self, masked: bool) -> Vec<AuditEntry>;

    /// Returns the number of retained entries.
    fn entry_count(&self) -> usize;

    /// Registers an observer notified after appends and evictions.
    fn subscribe(&self, observer: Arc<dyn AuditObserver>);
}

/// Observer notified of audit store transitions.
///
/// Replaces framework-reactive store subscriptions with an explicit
/// publish/subscribe seam; the store itself stays independent of any UI
/// reactivity mechanism.
pub trait AuditObserver: Send + Sync {
    /// Called after an entry has been appended and retained.
    fn entry_appended(&self, entry: &AuditEntry);

    /// Called after capacity eviction dropped the given number of oldest
    /// entries.
    fn entries_evicted(&self, _evicted: usize) {}
}

/// Port for best-effort remote mirroring of audit entries.
///
/// The local store is authoritative; mirror failure or latency must never
/// affect local state and is not retried from this subsystem.
#[async_trait]
pub trait AuditMirror: Send + Sync {
    /// Reports one stored entry to the remote audit API.
    async fn mirror_entry(&self, entry: AuditEntry) -> AppResult<()>;
}

/// Port exposing the authenticated user, if any, from external auth state.
pub trait IdentityProvider: Send + Sync {
    /// Returns the current session identity, or `None` when unauthenticated.
    fn current_identity(&self) -> Option<UserIdentity>;
}
