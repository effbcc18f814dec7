//! Application services and ports for the clinical session security layer.

#![forbid(unsafe_code)]

mod audit_log_service;
mod audit_ports;
mod authorization_service;
mod navigation_guard;

pub use audit_log_service::AuditLogService;
pub use audit_ports::{
    AuditEntry, AuditMirror, AuditObserver, AuditStore, IdentityProvider, NewAuditEvent,
};
pub use authorization_service::AuthorizationService;
pub use navigation_guard::{
    NavigationGuard, NavigationOutcome, NavigationRequest, Tab, TabId,
};
