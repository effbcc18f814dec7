use std::sync::Arc;
use std::time::Duration;

use carelock_application::{
    AuditLogService, AuditStore, AuthorizationService, NavigationGuard,
};
use carelock_core::{AppError, AppResult};
use carelock_domain::RoutePermissionMap;

use crate::http_audit_mirror::{HttpAuditMirror, MirroringAuditObserver};
use crate::in_memory_audit_store::InMemoryAuditStore;
use crate::security_runtime_config::SecurityRuntimeConfig;
use crate::session_identity_provider::SessionIdentityProvider;

/// Fully wired security subsystem for one client session.
///
/// Built once at startup and handed to the shell; every consumer receives
/// its dependencies from here instead of reaching for process-wide state.
#[derive(Clone)]
pub struct SecuritySession {
    identity_provider: Arc<SessionIdentityProvider>,
    audit_store: Arc<InMemoryAuditStore>,
    audit_log_service: AuditLogService,
    authorization_service: AuthorizationService,
    navigation_guard: Arc<NavigationGuard>,
}

impl SecuritySession {
    /// Returns the session identity holder for sign-in and sign-out.
    #[must_use]
    pub fn identity_provider(&self) -> &Arc<SessionIdentityProvider> {
        &self.identity_provider
    }

    /// Returns the underlying audit store.
    #[must_use]
    pub fn audit_store(&self) -> &Arc<InMemoryAuditStore> {
        &self.audit_store
    }

    /// Returns the audit logging service.
    #[must_use]
    pub fn audit_log_service(&self) -> &AuditLogService {
        &self.audit_log_service
    }

    /// Returns the authorization service.
    #[must_use]
    pub fn authorization_service(&self) -> &AuthorizationService {
        &self.authorization_service
    }

    /// Returns the tab navigation guard.
    #[must_use]
    pub fn navigation_guard(&self) -> &Arc<NavigationGuard> {
        &self.navigation_guard
    }
}

/// Builds a [`SecuritySession`] from runtime configuration.
///
/// When a mirror URL is configured, appended entries are also posted to the
/// remote audit API through an observer on the store.
pub fn build_security_session(config: &SecurityRuntimeConfig) -> AppResult<SecuritySession> {
    let identity_provider = Arc::new(SessionIdentityProvider::new());
    let audit_store = Arc::new(InMemoryAuditStore::new(
        config.audit_log_capacity,
        config.mask_on_write,
    ));

    if let Some(base_url) = &config.mirror_base_url {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.mirror_timeout_ms))
            .build()
            .map_err(|error| {
                AppError::Internal(format!("failed to build audit mirror client: {error}"))
            })?;
        let mirror = Arc::new(HttpAuditMirror::new(http_client, base_url.clone()));
        audit_store.subscribe(Arc::new(MirroringAuditObserver::new(mirror)));
        tracing::info!(%base_url, "audit mirroring enabled");
    }

    let audit_log_service = AuditLogService::new(
        identity_provider.clone(),
        audit_store.clone(),
    );
    let authorization_service = AuthorizationService::new(
        identity_provider.clone(),
        Arc::new(RoutePermissionMap::client_defaults()),
    );
    let navigation_guard = Arc::new(NavigationGuard::new(
        authorization_service.clone(),
        audit_log_service.clone(),
    ));

    Ok(SecuritySession {
        identity_provider,
        audit_store,
        audit_log_service,
        authorization_service,
        navigation_guard,
    })
}
