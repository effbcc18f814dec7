use std::str::FromStr;

use carelock_core::{AppError, NonEmptyString};
use serde::{Deserialize, Serialize};

/// Permissions enforced by client-side policy checks.
///
/// Tokens use the `domain:action` form and are stable across builds; actual
/// authorization is enforced server-side, these gate UI behavior only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    /// Allows viewing patient demographic records.
    PatientView,
    /// Allows editing patient demographic records.
    PatientEdit,
    /// Allows viewing clinical records.
    RecordView,
    /// Allows editing clinical records.
    RecordEdit,
    /// Allows viewing platform user accounts.
    UserView,
    /// Allows managing platform user accounts.
    UserManage,
    /// Allows viewing the audit log.
    AuditView,
}

impl Permission {
    /// Returns the stable `domain:action` token for this permission.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PatientView => "patients:view",
            Self::PatientEdit => "patients:edit",
            Self::RecordView => "records:view",
            Self::RecordEdit => "records:edit",
            Self::UserView => "users:view",
            Self::UserManage => "users:manage",
            Self::AuditView => "audit:view",
        }
    }

    /// Returns all known permissions.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[Permission] = &[
            Permission::PatientView,
            Permission::PatientEdit,
            Permission::RecordView,
            Permission::RecordEdit,
            Permission::UserView,
            Permission::UserManage,
            Permission::AuditView,
        ];

        ALL
    }
}

impl FromStr for Permission {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "patients:view" => Ok(Self::PatientView),
            "patients:edit" => Ok(Self::PatientEdit),
            "records:view" => Ok(Self::RecordView),
            "records:edit" => Ok(Self::RecordEdit),
            "users:view" => Ok(Self::UserView),
            "users:manage" => Ok(Self::UserManage),
            "audit:view" => Ok(Self::AuditView),
            _ => Err(AppError::Validation(format!(
                "unknown permission token '{value}'"
            ))),
        }
    }
}

/// Roles assigned to authenticated users.
///
/// The role→permission table is read-only configuration shipped with the
/// application build; nothing at runtime mutates it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Platform administrator.
    Admin,
    /// Licensed clinician with full chart access.
    Clinician,
    /// Nursing staff with read access to charts.
    Nurse,
    /// Front-desk staff.
    Staff,
}

impl Role {
    /// Returns the stable storage value for this role.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Clinician => "clinician",
            Self::Nurse => "nurse",
            Self::Staff => "staff",
        }
    }

    /// Returns the static permission set granted to this role.
    #[must_use]
    pub fn permissions(&self) -> &'static [Permission] {
        match self {
            Self::Admin => Permission::all(),
            Self::Clinician => &[
                Permission::PatientView,
                Permission::PatientEdit,
                Permission::RecordView,
                Permission::RecordEdit,
            ],
            Self::Nurse => &[Permission::PatientView, Permission::RecordView],
            Self::Staff => &[Permission::PatientView],
        }
    }

    /// Returns whether the role holds the given permission.
    #[must_use]
    pub fn has_permission(&self, permission: Permission) -> bool {
        self.permissions().contains(&permission)
    }
}

impl FromStr for Role {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "admin" => Ok(Self::Admin),
            "clinician" => Ok(Self::Clinician),
            "nurse" => Ok(Self::Nurse),
            "staff" => Ok(Self::Staff),
            _ => Err(AppError::Validation(format!("unknown role '{value}'"))),
        }
    }
}

/// Stable audit actions recorded by the session security layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum AuditAction {
    /// A protected-health-information field was rendered or read.
    PhiAccess,
    /// A named application state transition occurred.
    StateChange(String),
    /// A permission check was evaluated.
    PermissionCheck,
    /// A navigation attempt was denied by the guard.
    AccessDenied,
}

impl AuditAction {
    /// Creates a state-change action with a validated non-empty name.
    pub fn state_change(name: impl Into<String>) -> Result<Self, AppError> {
        let name = NonEmptyString::new(name)?;
        Ok(Self::StateChange(name.into()))
    }

    /// Returns the stable storage value for this action.
    #[must_use]
    pub fn storage_value(&self) -> String {
        match self {
            Self::PhiAccess => "PHI_ACCESS".to_owned(),
            Self::StateChange(name) => format!("STATE_CHANGE:{name}"),
            Self::PermissionCheck => "PERMISSION_CHECK".to_owned(),
            Self::AccessDenied => "ACCESS_DENIED".to_owned(),
        }
    }
}

impl std::fmt::Display for AuditAction {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.storage_value())
    }
}

impl From<AuditAction> for String {
    fn from(value: AuditAction) -> Self {
        value.storage_value()
    }
}

impl TryFrom<String> for AuditAction {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "PHI_ACCESS" => Ok(Self::PhiAccess),
            "PERMISSION_CHECK" => Ok(Self::PermissionCheck),
            "ACCESS_DENIED" => Ok(Self::AccessDenied),
            other => match other.strip_prefix("STATE_CHANGE:") {
                Some(name) => Self::state_change(name),
                None => Err(AppError::Validation(format!(
                    "unknown audit action value '{other}'"
                ))),
            },
        }
    }
}
