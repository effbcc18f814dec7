use std::sync::Arc;

use carelock_core::AppResult;
use carelock_domain::{AuditAction, MaskingLevel, Permission};
use serde_json::{Map, Value};

use crate::audit_ports::{AuditEntry, AuditStore, IdentityProvider, NewAuditEvent};

/// Application service recording security-relevant events for the session.
///
/// Every logging call resolves the acting user first; calls made without an
/// authenticated identity silently no-op and return `None`. This is a
/// deliberate design decision, not an error path: audit concerns must never
/// crash or block primary UI flows.
#[derive(Clone)]
pub struct AuditLogService {
    identity_provider: Arc<dyn IdentityProvider>,
    store: Arc<dyn AuditStore>,
}

impl AuditLogService {
    /// Creates an audit log service over an identity provider and store.
    #[must_use]
    pub fn new(identity_provider: Arc<dyn IdentityProvider>, store: Arc<dyn AuditStore>) -> Self {
        Self {
            identity_provider,
            store,
        }
    }

    /// Records that a PHI-bearing resource was rendered or read.
    pub fn log_phi_access(
        &self,
        resource: &str,
        resource_id: Option<&str>,
        details: Option<Map<String, Value>>,
    ) -> Option<AuditEntry> {
        self.append(AuditAction::PhiAccess, resource, resource_id, details)
    }

    /// Records a named application state transition.
    ///
    /// Returns `Err` only for an empty transition name, which is caller
    /// misuse rather than a runtime condition.
    pub fn log_state_change(
        &self,
        name: &str,
        resource: &str,
        resource_id: Option<&str>,
        details: Option<Map<String, Value>>,
    ) -> AppResult<Option<AuditEntry>> {
        let action = AuditAction::state_change(name)?;
        Ok(self.append(action, resource, resource_id, details))
    }

    /// Records the outcome of an explicit permission check.
    pub fn log_permission_check(
        &self,
        resource: &str,
        permission: Permission,
        granted: bool,
    ) -> Option<AuditEntry> {
        let identity = self.identity_provider.current_identity()?;

        let mut details = Map::new();
        details.insert(
            "permission".to_owned(),
            Value::String(permission.as_str().to_owned()),
        );
        details.insert("granted".to_owned(), Value::Bool(granted));
        details.insert(
            "role".to_owned(),
            Value::String(identity.role().as_str().to_owned()),
        );

        self.append(AuditAction::PermissionCheck, resource, None, Some(details))
    }

    /// Records a navigation attempt denied by the guard.
    pub fn log_access_denied(
        &self,
        resource: &str,
        required_permission: Permission,
    ) -> Option<AuditEntry> {
        let identity = self.identity_provider.current_identity()?;

        let mut details = Map::new();
        details.insert("route".to_owned(), Value::String(resource.to_owned()));
        details.insert(
            "requiredPermission".to_owned(),
            Value::String(required_permission.as_str().to_owned()),
        );
        details.insert(
            "role".to_owned(),
            Value::String(identity.role().as_str().to_owned()),
        );

        self.append(AuditAction::AccessDenied, resource, None, Some(details))
    }

    /// Returns all retained entries for a subject, in insertion order.
    #[must_use]
    pub fn user_entries(&self, subject: &str) -> Vec<AuditEntry> {
        self.store.entries_for_user(subject)
    }

    /// Returns all retained entries for a resource, in insertion order.
    #[must_use]
    pub fn resource_entries(&self, resource: &str) -> Vec<AuditEntry> {
        self.store.entries_for_resource(resource)
    }

    /// Exports the retained audit log.
    ///
    /// Passing `masked = false` only clears the `masked` flag on the copies;
    /// values redacted at write time stay redacted.
    #[must_use]
    pub fn export_audit_log(&self, masked: bool) -> Vec<AuditEntry> {
        self.store.export_entries(masked)
    }

    fn append(
        &self,
        action: AuditAction,
        resource: &str,
        resource_id: Option<&str>,
        details: Option<Map<String, Value>>,
    ) -> Option<AuditEntry> {
        let identity = self.identity_provider.current_identity()?;

        Some(self.store.append_event(NewAuditEvent {
            subject: identity.subject().to_owned(),
            action,
            resource: resource.to_owned(),
            resource_id: resource_id.map(str::to_owned),
            details,
            masking_level: MaskingLevel::for_role(identity.role()),
        }))
    }
}
