use carelock_core::{AppError, AppResult};
use tracing_subscriber::EnvFilter;

use crate::in_memory_audit_store::DEFAULT_AUDIT_LOG_CAPACITY;

/// Default remote mirror request timeout in milliseconds.
pub const DEFAULT_MIRROR_TIMEOUT_MS: u64 = 3_000;

/// Runtime configuration for the security subsystem.
///
/// Read once at startup from the process environment:
/// - `AUDIT_LOG_CAPACITY`: maximum retained audit entries (default 10000)
/// - `AUDIT_MASK_ON_WRITE`: mask PHI details at append time (default true)
/// - `AUDIT_MIRROR_URL`: base URL of the server-side audit API (optional)
/// - `AUDIT_MIRROR_TIMEOUT_MS`: mirror request timeout (default 3000)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityRuntimeConfig {
    /// Maximum number of audit entries retained in memory.
    pub audit_log_capacity: usize,
    /// Whether PHI detail values are masked when an entry is appended.
    pub mask_on_write: bool,
    /// Base URL of the remote audit mirror, if mirroring is enabled.
    pub mirror_base_url: Option<String>,
    /// Timeout applied to each mirror request, in milliseconds.
    pub mirror_timeout_ms: u64,
}

impl SecurityRuntimeConfig {
    /// Loads the configuration from the process environment.
    pub fn from_env() -> AppResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads the configuration through an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> AppResult<Self> {
        let audit_log_capacity = match lookup("AUDIT_LOG_CAPACITY") {
            Some(raw) => {
                let capacity: usize = raw.trim().parse().map_err(|_| {
                    AppError::Validation(format!("AUDIT_LOG_CAPACITY must be a number, got '{raw}'"))
                })?;
                if capacity == 0 {
                    return Err(AppError::Validation(
                        "AUDIT_LOG_CAPACITY must be at least 1".to_owned(),
                    ));
                }
                capacity
            }
            None => DEFAULT_AUDIT_LOG_CAPACITY,
        };

        let mask_on_write = match lookup("AUDIT_MASK_ON_WRITE") {
            Some(raw) => parse_bool("AUDIT_MASK_ON_WRITE", &raw)?,
            None => true,
        };

        let mirror_base_url = lookup("AUDIT_MIRROR_URL")
            .map(|url| url.trim().to_owned())
            .filter(|url| !url.is_empty());

        let mirror_timeout_ms = match lookup("AUDIT_MIRROR_TIMEOUT_MS") {
            Some(raw) => raw.trim().parse().map_err(|_| {
                AppError::Validation(format!(
                    "AUDIT_MIRROR_TIMEOUT_MS must be a number, got '{raw}'"
                ))
            })?,
            None => DEFAULT_MIRROR_TIMEOUT_MS,
        };

        Ok(Self {
            audit_log_capacity,
            mask_on_write,
            mirror_base_url,
            mirror_timeout_ms,
        })
    }
}

impl Default for SecurityRuntimeConfig {
    fn default() -> Self {
        Self {
            audit_log_capacity: DEFAULT_AUDIT_LOG_CAPACITY,
            mask_on_write: true,
            mirror_base_url: None,
            mirror_timeout_ms: DEFAULT_MIRROR_TIMEOUT_MS,
        }
    }
}

fn parse_bool(key: &str, raw: &str) -> AppResult<bool> {
    let value = raw.trim();
    if value.eq_ignore_ascii_case("true") {
        Ok(true)
    } else if value.eq_ignore_ascii_case("false") {
        Ok(false)
    } else {
        Err(AppError::Validation(format!(
            "{key} must be 'true' or 'false', got '{raw}'"
        )))
    }
}

/// Initializes the tracing subscriber for the host process.
///
/// Honors `RUST_LOG` and defaults to `info`.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();
}
