//! Adapters and wiring for the clinical session security layer.

#![forbid(unsafe_code)]

mod http_audit_mirror;
mod in_memory_audit_store;
mod security_runtime_config;
mod security_session;
mod session_identity_provider;

pub use http_audit_mirror::{HttpAuditMirror, MirroringAuditObserver};
pub use in_memory_audit_store::{DEFAULT_AUDIT_LOG_CAPACITY, InMemoryAuditStore};
pub use security_runtime_config::{
    DEFAULT_MIRROR_TIMEOUT_MS, SecurityRuntimeConfig, init_tracing,
};
pub use security_session::{SecuritySession, build_security_session};
pub use session_identity_provider::SessionIdentityProvider;
