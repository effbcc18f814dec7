//! Static route→permission resolution.

use std::collections::HashMap;

use crate::security::Permission;

/// One segment of a `:param`-templated route pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
enum RouteSegment {
    Literal(String),
    Parameter,
}

/// A templated route pattern where `:segment` matches any non-slash sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
struct RoutePattern {
    segments: Vec<RouteSegment>,
}

impl RoutePattern {
    fn parse(path: &str) -> Self {
        let segments = normalized_segments(path)
            .map(|segment| {
                if segment.starts_with(':') {
                    RouteSegment::Parameter
                } else {
                    RouteSegment::Literal(segment.to_owned())
                }
            })
            .collect();

        Self { segments }
    }

    fn matches(&self, path: &str) -> bool {
        let candidate: Vec<&str> = normalized_segments(path).collect();
        if candidate.len() != self.segments.len() {
            return false;
        }

        self.segments
            .iter()
            .zip(candidate)
            .all(|(segment, value)| match segment {
                RouteSegment::Literal(literal) => literal == value,
                RouteSegment::Parameter => !value.is_empty(),
            })
    }
}

fn normalized_segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|segment| !segment.is_empty())
}

fn normalized_path(path: &str) -> String {
    normalized_segments(path).collect::<Vec<_>>().join("/")
}

/// Static map from route path to the permission required to open it.
///
/// Exact paths are tried first; `:param`-templated patterns are only
/// consulted when no exact entry matches, in insertion order. Routes with no
/// entry are permission-free.
#[derive(Debug, Clone, Default)]
pub struct RoutePermissionMap {
    exact: HashMap<String, Permission>,
    patterns: Vec<(RoutePattern, Permission)>,
}

impl RoutePermissionMap {
    /// Creates an empty route permission map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the route table shipped with the clinical client build.
    #[must_use]
    pub fn client_defaults() -> Self {
        let mut map = Self::new();
        map.insert("/patients", Permission::PatientView);
        map.insert("/patients/:patientId", Permission::PatientView);
        map.insert("/patients/:patientId/edit", Permission::PatientEdit);
        map.insert("/records/:recordId", Permission::RecordView);
        map.insert("/admin/users", Permission::UserManage);
        map.insert("/admin/audit", Permission::AuditView);
        map
    }

    /// Maps a route path (exact or `:param`-templated) to a permission.
    pub fn insert(&mut self, path: &str, permission: Permission) {
        if path.contains(':') {
            self.patterns.push((RoutePattern::parse(path), permission));
        } else {
            self.exact.insert(normalized_path(path), permission);
        }
    }

    /// Resolves the permission required to open a path, if any.
    #[must_use]
    pub fn required_permission(&self, path: &str) -> Option<Permission> {
        if let Some(permission) = self.exact.get(&normalized_path(path)) {
            return Some(*permission);
        }

        self.patterns
            .iter()
            .find(|(pattern, _)| pattern.matches(path))
            .map(|(_, permission)| *permission)
    }
}
