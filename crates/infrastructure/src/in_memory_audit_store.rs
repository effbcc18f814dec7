use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

use carelock_application::{AuditEntry, AuditObserver, AuditStore, NewAuditEvent};
use carelock_core::AuditEntryId;
use carelock_domain::mask_details;
use chrono::Utc;

/// Default maximum number of retained entries.
pub const DEFAULT_AUDIT_LOG_CAPACITY: usize = 10_000;

/// In-memory, size-bounded, append-only audit store.
///
/// The store is the sole mutator of its entry list: entries are appended in
/// strict call order and only ever removed by oldest-first capacity
/// eviction. Append and eviction happen under one lock acquisition, so no
/// reader observes the store above its cap. Entries live for the session
/// only; nothing is persisted across reloads.
pub struct InMemoryAuditStore {
    entries: Mutex<VecDeque<AuditEntry>>,
    observers: RwLock<Vec<Arc<dyn AuditObserver>>>,
    capacity: usize,
    mask_on_write: bool,
}

impl InMemoryAuditStore {
    /// Creates a store with the given capacity and mask-on-write policy.
    ///
    /// Capacity is clamped to at least one entry.
    #[must_use]
    pub fn new(capacity: usize, mask_on_write: bool) -> Self {
        Self {
            entries: Mutex::new(VecDeque::new()),
            observers: RwLock::new(Vec::new()),
            capacity: capacity.max(1),
            mask_on_write,
        }
    }

    /// Creates a store with the default capacity and masking enabled.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(DEFAULT_AUDIT_LOG_CAPACITY, true)
    }

    /// Returns the configured capacity.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn lock_entries(&self) -> MutexGuard<'_, VecDeque<AuditEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn observers_snapshot(&self) -> Vec<Arc<dyn AuditObserver>> {
        self.observers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Default for InMemoryAuditStore {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl AuditStore for InMemoryAuditStore {
    fn append_event(&self, event: NewAuditEvent) -> AuditEntry {
        let masked = self.mask_on_write && event.details.is_some();
        let details = event.details.map(|details| {
            if self.mask_on_write {
                mask_details(&details, event.masking_level)
            } else {
                details
            }
        });

        let entry = AuditEntry {
            entry_id: AuditEntryId::new(),
            subject: event.subject,
            action: event.action,
            resource: event.resource,
            resource_id: event.resource_id,
            recorded_at: Utc::now(),
            details,
            masked,
        };

        let evicted = {
            let mut entries = self.lock_entries();
            entries.push_back(entry.clone());

            let mut evicted = 0_usize;
            while entries.len() > self.capacity {
                entries.pop_front();
                evicted += 1;
            }
            evicted
        };

        // Observers are notified outside the lock.
        for observer in self.observers_snapshot() {
            observer.entry_appended(&entry);
            if evicted > 0 {
                observer.entries_evicted(evicted);
            }
        }

        entry
    }

    fn entries_for_user(&self, subject: &str) -> Vec<AuditEntry> {
        self.lock_entries()
            .iter()
            .filter(|entry| entry.subject == subject)
            .cloned()
            .collect()
    }

    fn entries_for_resource(&self, resource: &str) -> Vec<AuditEntry> {
        self.lock_entries()
            .iter()
            .filter(|entry| entry.resource == resource)
            .cloned()
            .collect()
    }

    fn export_entries(&self, masked: bool) -> Vec<AuditEntry> {
        let mut exported: Vec<AuditEntry> = self.lock_entries().iter().cloned().collect();

        if !masked {
            // Unmasked export only clears the metadata flag: values redacted
            // at write time cannot be reconstructed.
            for entry in &mut exported {
                entry.masked = false;
            }
        }

        exported
    }

    fn entry_count(&self) -> usize {
        self.lock_entries().len()
    }

    fn subscribe(&self, observer: Arc<dyn AuditObserver>) {
        self.observers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(observer);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use carelock_application::{AuditEntry, AuditObserver, AuditStore, NewAuditEvent};
    use carelock_domain::{AuditAction, MaskingLevel};
    use serde_json::json;

    use super::InMemoryAuditStore;

    fn event_for(subject: &str, resource: &str) -> NewAuditEvent {
        NewAuditEvent {
            subject: subject.to_owned(),
            action: AuditAction::PhiAccess,
            resource: resource.to_owned(),
            resource_id: None,
            details: None,
            masking_level: MaskingLevel::Partial,
        }
    }

    fn phi_event_with_details(subject: &str) -> NewAuditEvent {
        let mut details = serde_json::Map::new();
        details.insert("action".to_owned(), json!("view"));
        details.insert("email".to_owned(), json!("user@example.com"));

        NewAuditEvent {
            subject: subject.to_owned(),
            action: AuditAction::PhiAccess,
            resource: "users".to_owned(),
            resource_id: Some("user-456".to_owned()),
            details: Some(details),
            masking_level: MaskingLevel::Partial,
        }
    }

    #[test]
    fn phi_event_masks_sensitive_detail_keys_only() {
        let store = InMemoryAuditStore::with_defaults();
        let entry = store.append_event(phi_event_with_details("test-user-123"));

        assert!(entry.masked);
        assert_eq!(entry.action, AuditAction::PhiAccess);
        assert_eq!(entry.resource, "users");
        assert_eq!(entry.resource_id.as_deref(), Some("user-456"));

        let details = entry.details.unwrap_or_default();
        assert_eq!(details.get("email"), Some(&json!("**er@example.com")));
        assert_eq!(details.get("action"), Some(&json!("view")));
    }

    #[test]
    fn masking_disabled_stores_details_verbatim() {
        let store = InMemoryAuditStore::new(16, false);
        let entry = store.append_event(phi_event_with_details("test-user-123"));

        assert!(!entry.masked);
        let details = entry.details.unwrap_or_default();
        assert_eq!(details.get("email"), Some(&json!("user@example.com")));
    }

    #[test]
    fn entries_without_details_are_flagged_unmasked() {
        let store = InMemoryAuditStore::with_defaults();
        let entry = store.append_event(event_for("u-1", "patients"));
        assert!(!entry.masked);
    }

    #[test]
    fn capacity_eviction_drops_oldest_and_keeps_newest() {
        let store = InMemoryAuditStore::new(3, true);
        for index in 0..3 {
            store.append_event(event_for("u-1", &format!("resource-{index}")));
        }
        assert_eq!(store.entry_count(), 3);

        store.append_event(event_for("u-1", "resource-3"));
        assert_eq!(store.entry_count(), 3);

        let exported = store.export_entries(true);
        let resources: Vec<&str> = exported
            .iter()
            .map(|entry| entry.resource.as_str())
            .collect();
        assert_eq!(resources, vec!["resource-1", "resource-2", "resource-3"]);
    }

    #[test]
    fn filtered_reads_preserve_insertion_order() {
        let store = InMemoryAuditStore::with_defaults();
        store.append_event(event_for("alice", "patients"));
        store.append_event(event_for("bob", "patients"));
        store.append_event(event_for("alice", "records"));
        store.append_event(event_for("alice", "patients"));

        let alice = store.entries_for_user("alice");
        assert_eq!(alice.len(), 3);
        assert_eq!(alice[0].resource, "patients");
        assert_eq!(alice[1].resource, "records");
        assert_eq!(alice[2].resource, "patients");

        let patients = store.entries_for_resource("patients");
        assert_eq!(patients.len(), 3);
        assert_eq!(patients[0].subject, "alice");
        assert_eq!(patients[1].subject, "bob");
        assert_eq!(patients[2].subject, "alice");
    }

    #[test]
    fn unmasked_export_is_metadata_only() {
        let store = InMemoryAuditStore::with_defaults();
        store.append_event(phi_event_with_details("test-user-123"));

        let stored = store.export_entries(true);
        assert!(stored[0].masked);

        let unmasked = store.export_entries(false);
        assert!(!unmasked[0].masked);
        // Same redacted values either way; only the flag differs.
        assert_eq!(stored[0].details, unmasked[0].details);
        assert_eq!(
            unmasked[0]
                .details
                .as_ref()
                .and_then(|details| details.get("email")),
            Some(&json!("**er@example.com"))
        );
    }

    #[derive(Default)]
    struct CountingObserver {
        appended: AtomicUsize,
        evicted: AtomicUsize,
    }

    impl AuditObserver for CountingObserver {
        fn entry_appended(&self, _entry: &AuditEntry) {
            self.appended.fetch_add(1, Ordering::SeqCst);
        }

        fn entries_evicted(&self, evicted: usize) {
            self.evicted.fetch_add(evicted, Ordering::SeqCst);
        }
    }

    #[test]
    fn observers_see_appends_and_evictions() {
        let store = InMemoryAuditStore::new(2, true);
        let observer = Arc::new(CountingObserver::default());
        store.subscribe(observer.clone());

        for index in 0..3 {
            store.append_event(event_for("u-1", &format!("r-{index}")));
        }

        assert_eq!(observer.appended.load(Ordering::SeqCst), 3);
        assert_eq!(observer.evicted.load(Ordering::SeqCst), 1);
    }
}
