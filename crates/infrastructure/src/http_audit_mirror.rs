use std::sync::Arc;

use async_trait::async_trait;
use carelock_application::{AuditEntry, AuditMirror, AuditObserver};
use carelock_core::{AppError, AppResult};
use carelock_domain::AuditAction;

/// HTTP implementation of the remote audit mirror.
///
/// Posts stored entries (already masked per write-time policy) to the
/// server-side audit API. The local store stays authoritative; a failed or
/// slow mirror call is never retried from this subsystem.
pub struct HttpAuditMirror {
    http_client: reqwest::Client,
    base_url: String,
}

impl HttpAuditMirror {
    /// Creates a mirror posting to the given API base URL.
    #[must_use]
    pub fn new(http_client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_owned();
        Self {
            http_client,
            base_url,
        }
    }

    fn endpoint_for(&self, action: &AuditAction) -> String {
        let segment = match action {
            AuditAction::PhiAccess => "phi-access",
            AuditAction::StateChange(_) => "state-change",
            AuditAction::PermissionCheck => "permission-check",
            AuditAction::AccessDenied => "access-denied",
        };

        format!("{}/api/audit/{segment}", self.base_url)
    }
}

#[async_trait]
impl AuditMirror for HttpAuditMirror {
    async fn mirror_entry(&self, entry: AuditEntry) -> AppResult<()> {
        let response = self
            .http_client
            .post(self.endpoint_for(&entry.action))
            .json(&entry)
            .send()
            .await
            .map_err(|error| {
                AppError::Internal(format!("audit mirror transport error: {error}"))
            })?;

        if !response.status().is_success() {
            return Err(AppError::Internal(format!(
                "audit mirror rejected entry '{}' with status {}",
                entry.entry_id,
                response.status()
            )));
        }

        Ok(())
    }
}

/// Bridges the store's observer channel to a remote mirror.
///
/// The local append has always completed before this observer runs. Mirror
/// calls are spawned on the current tokio runtime and their outcome is not
/// observed beyond a warning log; without a runtime the entry is simply not
/// mirrored.
pub struct MirroringAuditObserver {
    mirror: Arc<dyn AuditMirror>,
}

impl MirroringAuditObserver {
    /// Creates an observer forwarding appended entries to the mirror.
    #[must_use]
    pub fn new(mirror: Arc<dyn AuditMirror>) -> Self {
        Self { mirror }
    }
}

impl AuditObserver for MirroringAuditObserver {
    fn entry_appended(&self, entry: &AuditEntry) {
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            tracing::debug!(
                entry_id = %entry.entry_id,
                "no async runtime available, skipping audit mirror delivery"
            );
            return;
        };

        let mirror = self.mirror.clone();
        let entry = entry.clone();
        handle.spawn(async move {
            if let Err(error) = mirror.mirror_entry(entry).await {
                tracing::warn!(%error, "audit mirror delivery failed");
            }
        });
    }
}
