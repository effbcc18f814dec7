//! Domain entities and invariants for the clinical session security layer.

#![forbid(unsafe_code)]

mod masking;
mod routes;
mod sanitize;
mod security;
mod user;

pub use masking::{
    FieldKind, MaskingLevel, REDACTION_MARKER, mask_details, mask_email, mask_field, mask_object,
    mask_phone, mask_ssn, mask_value,
};
pub use routes::RoutePermissionMap;
pub use sanitize::sanitize_error_message;
pub use security::{AuditAction, Permission, Role};
pub use user::UserIdentity;
