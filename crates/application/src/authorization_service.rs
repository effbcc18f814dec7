use std::sync::Arc;

use carelock_domain::{Permission, Role, RoutePermissionMap};

use crate::audit_ports::IdentityProvider;

/// Read-only permission and role checks over the current session identity.
///
/// The role→permission table and the route map are static configuration
/// shipped with the build; this service never mutates auth state, it only
/// answers membership queries against it. An unauthenticated session fails
/// every check.
#[derive(Clone)]
pub struct AuthorizationService {
    identity_provider: Arc<dyn IdentityProvider>,
    route_permissions: Arc<RoutePermissionMap>,
}

impl AuthorizationService {
    /// Creates an authorization service over an identity provider and route
    /// map.
    #[must_use]
    pub fn new(
        identity_provider: Arc<dyn IdentityProvider>,
        route_permissions: Arc<RoutePermissionMap>,
    ) -> Self {
        Self {
            identity_provider,
            route_permissions,
        }
    }

    /// Returns the current user's role, if authenticated.
    #[must_use]
    pub fn current_role(&self) -> Option<Role> {
        self.identity_provider
            .current_identity()
            .map(|identity| identity.role())
    }

    /// Returns whether the current user holds the permission.
    #[must_use]
    pub fn has_permission(&self, permission: Permission) -> bool {
        self.current_role()
            .is_some_and(|role| role.has_permission(permission))
    }

    /// Returns whether the current user holds at least one of the
    /// permissions.
    #[must_use]
    pub fn has_any_permission(&self, permissions: &[Permission]) -> bool {
        permissions
            .iter()
            .any(|permission| self.has_permission(*permission))
    }

    /// Returns whether the current user holds every one of the permissions.
    #[must_use]
    pub fn has_all_permissions(&self, permissions: &[Permission]) -> bool {
        self.current_role().is_some_and(|role| {
            permissions
                .iter()
                .all(|permission| role.has_permission(*permission))
        })
    }

    /// Returns whether the current user has exactly the given role.
    #[must_use]
    pub fn has_role(&self, role: Role) -> bool {
        self.current_role() == Some(role)
    }

    /// Returns whether the current user's role is in the list.
    #[must_use]
    pub fn has_any_role(&self, roles: &[Role]) -> bool {
        self.current_role()
            .is_some_and(|current| roles.contains(&current))
    }

    /// Resolves the permission required to open a route path, if any.
    #[must_use]
    pub fn required_permission_for_route(&self, path: &str) -> Option<Permission> {
        self.route_permissions.required_permission(path)
    }
}
