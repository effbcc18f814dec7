use std::fmt::{Display, Formatter};
use std::sync::{Mutex, PoisonError};

use carelock_domain::Permission;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::audit_log_service::AuditLogService;
use crate::authorization_service::AuthorizationService;

/// Unique identifier for an open tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TabId(Uuid);

impl TabId {
    /// Creates a random tab identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the underlying UUID value.
    #[must_use]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for TabId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for TabId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// One entry in the session tab strip.
///
/// A denied navigation produces a synthetic placeholder tab carrying
/// `access_denied = true` and the permission that caused denial, so the UI
/// renders a consistent "Access Denied" panel instead of throwing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tab {
    /// Stable tab identifier.
    pub tab_id: TabId,
    /// Route path the tab points at.
    pub path: String,
    /// Display title.
    pub title: String,
    /// Whether this tab is an access-denied placeholder.
    pub access_denied: bool,
    /// Permission whose absence caused denial, retained for display.
    pub required_permission: Option<Permission>,
}

/// A request to open a route in a new tab.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationRequest {
    /// Route path to open.
    pub path: String,
    /// Display title for the tab.
    pub title: String,
    /// Explicit permission override; when absent the route map decides.
    pub required_permission: Option<Permission>,
}

impl NavigationRequest {
    /// Creates a navigation request gated by the route map alone.
    #[must_use]
    pub fn new(path: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            title: title.into(),
            required_permission: None,
        }
    }

    /// Overrides the required permission for this request.
    #[must_use]
    pub fn with_required_permission(mut self, permission: Permission) -> Self {
        self.required_permission = Some(permission);
        self
    }
}

/// Outcome of one navigation attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationOutcome {
    /// A new tab was created at the requested path.
    Opened(Tab),
    /// An existing tab at the same path was reused.
    SwitchedTo(Tab),
    /// Navigation was denied; a placeholder tab was created instead.
    Denied(Tab),
}

/// Gate for tab navigation requests.
///
/// Denial is fail-soft and terminal for the attempt: the guard never returns
/// an error and never retries; it records an `ACCESS_DENIED` audit entry as
/// a side effect and hands the UI a displayable placeholder. Tab state is
/// ephemeral and lives for the session only.
pub struct NavigationGuard {
    authorization: AuthorizationService,
    audit: AuditLogService,
    tabs: Mutex<Vec<Tab>>,
}

impl NavigationGuard {
    /// Creates a navigation guard over the session services.
    #[must_use]
    pub fn new(authorization: AuthorizationService, audit: AuditLogService) -> Self {
        Self {
            authorization,
            audit,
            tabs: Mutex::new(Vec::new()),
        }
    }

    /// Attempts to open a route, producing a tab or a denial placeholder.
    ///
    /// The effective permission is the explicit override when present, else
    /// the route map entry; a route with neither is always allowed. Opening
    /// a path that already has a normal tab switches to it instead of
    /// duplicating; denial placeholders are always created fresh.
    pub fn open(&self, request: NavigationRequest) -> NavigationOutcome {
        let effective = request
            .required_permission
            .or_else(|| self.authorization.required_permission_for_route(&request.path));

        match effective {
            Some(permission) if !self.authorization.has_permission(permission) => {
                self.deny(&request, permission)
            }
            _ => self.allow(request),
        }
    }

    /// Returns a snapshot of the open tabs in creation order.
    #[must_use]
    pub fn tabs(&self) -> Vec<Tab> {
        self.lock_tabs().clone()
    }

    /// Closes a tab; returns whether it existed.
    pub fn close_tab(&self, tab_id: TabId) -> bool {
        let mut tabs = self.lock_tabs();
        let before = tabs.len();
        tabs.retain(|tab| tab.tab_id != tab_id);
        tabs.len() < before
    }

    fn allow(&self, request: NavigationRequest) -> NavigationOutcome {
        let mut tabs = self.lock_tabs();

        if let Some(existing) = tabs
            .iter()
            .find(|tab| !tab.access_denied && tab.path == request.path)
        {
            return NavigationOutcome::SwitchedTo(existing.clone());
        }

        let tab = Tab {
            tab_id: TabId::new(),
            path: request.path,
            title: request.title,
            access_denied: false,
            required_permission: None,
        };
        tabs.push(tab.clone());
        NavigationOutcome::Opened(tab)
    }

    fn deny(&self, request: &NavigationRequest, permission: Permission) -> NavigationOutcome {
        // Local audit record first; the store's observers handle mirroring.
        self.audit.log_access_denied(&request.path, permission);

        let tab = Tab {
            tab_id: TabId::new(),
            path: request.path.clone(),
            title: "Access Denied".to_owned(),
            access_denied: true,
            required_permission: Some(permission),
        };
        self.lock_tabs().push(tab.clone());
        NavigationOutcome::Denied(tab)
    }

    fn lock_tabs(&self) -> std::sync::MutexGuard<'_, Vec<Tab>> {
        self.tabs.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex, PoisonError};

    use carelock_core::AuditEntryId;
    use carelock_domain::{
        AuditAction, Permission, Role, RoutePermissionMap, UserIdentity,
    };
    use chrono::Utc;

    use crate::audit_log_service::AuditLogService;
    use crate::audit_ports::{
        AuditEntry, AuditObserver, AuditStore, IdentityProvider, NewAuditEvent,
    };
    use crate::authorization_service::AuthorizationService;

    use super::{NavigationGuard, NavigationOutcome, NavigationRequest};

    struct FakeIdentityProvider {
        identity: Option<UserIdentity>,
    }

    impl IdentityProvider for FakeIdentityProvider {
        fn current_identity(&self) -> Option<UserIdentity> {
            self.identity.clone()
        }
    }

    #[derive(Default)]
    struct FakeAuditStore {
        entries: Mutex<Vec<AuditEntry>>,
    }

    impl FakeAuditStore {
        fn stored(&self) -> Vec<AuditEntry> {
            self.entries
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone()
        }
    }

    impl AuditStore for FakeAuditStore {
        fn append_event(&self, event: NewAuditEvent) -> AuditEntry {
            let entry = AuditEntry {
                entry_id: AuditEntryId::new(),
                subject: event.subject,
                action: event.action,
                resource: event.resource,
                resource_id: event.resource_id,
                recorded_at: Utc::now(),
                details: event.details,
                masked: false,
            };
            self.entries
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(entry.clone());
            entry
        }

        fn entries_for_user(&self, subject: &str) -> Vec<AuditEntry> {
            self.stored()
                .into_iter()
                .filter(|entry| entry.subject == subject)
                .collect()
        }

        fn entries_for_resource(&self, resource: &str) -> Vec<AuditEntry> {
            self.stored()
                .into_iter()
                .filter(|entry| entry.resource == resource)
                .collect()
        }

        fn export_entries(&self, _masked: bool) -> Vec<AuditEntry> {
            self.stored()
        }

        fn entry_count(&self) -> usize {
            self.stored().len()
        }

        fn subscribe(&self, _observer: Arc<dyn AuditObserver>) {}
    }

    fn guard_for(role: Option<Role>) -> (NavigationGuard, Arc<FakeAuditStore>) {
        let identity_provider = Arc::new(FakeIdentityProvider {
            identity: role.map(|role| UserIdentity::new("user-1", "Test User", role)),
        });
        let store = Arc::new(FakeAuditStore::default());
        let authorization = AuthorizationService::new(
            identity_provider.clone(),
            Arc::new(RoutePermissionMap::client_defaults()),
        );
        let audit = AuditLogService::new(identity_provider, store.clone());

        (NavigationGuard::new(authorization, audit), store)
    }

    #[test]
    fn denied_navigation_creates_placeholder_and_audit_entry() {
        let (guard, store) = guard_for(Some(Role::Staff));

        let outcome = guard.open(NavigationRequest::new("/patients/pat-1/edit", "Edit Patient"));
        let NavigationOutcome::Denied(tab) = outcome else {
            panic!("expected denial for staff editing a patient");
        };

        assert!(tab.access_denied);
        assert_eq!(tab.required_permission, Some(Permission::PatientEdit));
        assert_eq!(tab.title, "Access Denied");

        let denied = store.entries_for_resource("/patients/pat-1/edit");
        assert_eq!(denied.len(), 1);
        assert_eq!(denied[0].action, AuditAction::AccessDenied);
    }

    #[test]
    fn permission_free_route_always_opens() {
        let (guard, store) = guard_for(Some(Role::Staff));

        let outcome = guard.open(NavigationRequest::new("/dashboard", "Dashboard"));
        assert!(matches!(outcome, NavigationOutcome::Opened(_)));
        assert_eq!(store.entry_count(), 0);
    }

    #[test]
    fn explicit_override_beats_route_map() {
        let (guard, _store) = guard_for(Some(Role::Staff));

        let outcome = guard.open(
            NavigationRequest::new("/dashboard", "Dashboard")
                .with_required_permission(Permission::AuditView),
        );
        assert!(matches!(outcome, NavigationOutcome::Denied(_)));
    }

    #[test]
    fn duplicate_path_switches_to_existing_tab() {
        let (guard, _store) = guard_for(Some(Role::Clinician));

        let first = guard.open(NavigationRequest::new("/patients", "Patients"));
        let NavigationOutcome::Opened(first_tab) = first else {
            panic!("clinician can view patients");
        };

        let second = guard.open(NavigationRequest::new("/patients", "Patients"));
        let NavigationOutcome::SwitchedTo(reused) = second else {
            panic!("second open of same path must switch");
        };
        assert_eq!(reused.tab_id, first_tab.tab_id);
        assert_eq!(guard.tabs().len(), 1);
    }

    #[test]
    fn denial_placeholders_are_not_deduplicated() {
        let (guard, store) = guard_for(Some(Role::Nurse));

        let first = guard.open(NavigationRequest::new("/admin/audit", "Audit"));
        let second = guard.open(NavigationRequest::new("/admin/audit", "Audit"));
        assert!(matches!(first, NavigationOutcome::Denied(_)));
        assert!(matches!(second, NavigationOutcome::Denied(_)));
        assert_eq!(guard.tabs().len(), 2);
        assert_eq!(store.entries_for_resource("/admin/audit").len(), 2);
    }

    #[test]
    fn unauthenticated_denial_does_not_append_audit_entries() {
        let (guard, store) = guard_for(None);

        let outcome = guard.open(NavigationRequest::new("/patients", "Patients"));
        assert!(matches!(outcome, NavigationOutcome::Denied(_)));
        assert_eq!(store.entry_count(), 0);
    }

    #[test]
    fn closing_a_tab_removes_it() {
        let (guard, _store) = guard_for(Some(Role::Admin));

        let outcome = guard.open(NavigationRequest::new("/admin/users", "Users"));
        let NavigationOutcome::Opened(tab) = outcome else {
            panic!("admin can manage users");
        };

        assert!(guard.close_tab(tab.tab_id));
        assert!(!guard.close_tab(tab.tab_id));
        assert!(guard.tabs().is_empty());
    }
}
