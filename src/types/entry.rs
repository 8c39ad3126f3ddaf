//! Policy bindings: which policies an entity under an auth mount carries.

use std::any::Any;
use std::collections::HashSet;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::adapter::{lookup_policy_field, lookup_sub_collections};
use crate::error::MappingError;
use crate::traits::Item;

use super::backend_kind::BackendKind;

/// Join path components and clean the result into an absolute path.
///
/// Empty and `.` segments are dropped, `..` removes the previous segment,
/// so `["auth", "github/", "map//teams"]` becomes `/auth/github/map/teams`.
pub fn canonical_path<S: AsRef<str>>(parts: &[S]) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in parts.iter().flat_map(|p| p.as_ref().split('/')) {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }
    format!("/{}", segments.join("/"))
}

/// A canonical policy binding, built either from declared configuration or
/// from observed server state.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct Entry {
    pub entity_name: String,
    pub entity_group: String,
    pub auth_type: String,
    pub auth_mount: String,
    pub policies: String,
}

impl Entry {
    pub fn new(
        entity_name: impl Into<String>,
        entity_group: impl Into<String>,
        auth_type: impl Into<String>,
        auth_mount: impl Into<String>,
        policies: impl Into<String>,
    ) -> Self {
        Entry {
            entity_name: entity_name.into(),
            entity_group: entity_group.into(),
            auth_type: auth_type.into(),
            auth_mount: auth_mount.into(),
            policies: policies.into(),
        }
    }

    /// The server path of this binding, identical to its identity key.
    pub fn path(&self) -> String {
        canonical_path(&[
            "auth",
            self.auth_mount.as_str(),
            self.entity_group.as_str(),
            self.entity_name.as_str(),
        ])
    }

    /// The backend kind, if it is one we know how to handle.
    pub fn backend_kind(&self) -> Option<BackendKind> {
        BackendKind::from_str(&self.auth_type).ok()
    }

    /// The payload field the policies are written under.
    pub fn policy_field(&self) -> &'static str {
        lookup_policy_field(&self.auth_type)
    }

    /// An empty policy list is the same as the binding not existing.
    pub fn has_policies(&self) -> bool {
        !self.policies.is_empty()
    }

    /// Check that this entry can be turned into an unambiguous server path.
    ///
    /// Names may not contain `/`. Mounts may be nested (`corp/okta`) but every
    /// segment must be a plain name, and the same holds for the entity group,
    /// which must also be one of the sub-collections of its backend kind when
    /// the kind is known.
    pub fn validate(&self) -> Result<(), MappingError> {
        let invalid = |reason: String| MappingError::InvalidEntry {
            key: self.path(),
            reason,
        };

        for (field, value) in [
            ("entity-name", &self.entity_name),
            ("entity-group", &self.entity_group),
            ("auth-type", &self.auth_type),
            ("auth-mount", &self.auth_mount),
        ] {
            if value.trim().is_empty() {
                return Err(invalid(format!("{field} must not be empty")));
            }
        }

        if self.entity_name.contains('/') {
            return Err(invalid(format!(
                "entity-name '{}' must not contain '/'",
                self.entity_name
            )));
        }
        if !is_clean_relative(&self.entity_name) {
            return Err(invalid(format!(
                "entity-name '{}' is not a valid path segment",
                self.entity_name
            )));
        }

        for (field, value) in [
            ("auth-mount", &self.auth_mount),
            ("entity-group", &self.entity_group),
        ] {
            if !is_clean_relative(value) {
                return Err(invalid(format!(
                    "{field} '{value}' is not a clean relative path"
                )));
            }
        }

        if self.backend_kind().is_some() {
            let allowed = lookup_sub_collections(&self.auth_type);
            if !allowed.contains(&self.entity_group.as_str()) {
                return Err(invalid(format!(
                    "entity-group '{}' is not valid for auth-type '{}' (expected one of: {})",
                    self.entity_group,
                    self.auth_type,
                    allowed.join(", ")
                )));
            }
        }

        Ok(())
    }

    /// Reject declared lists where two entries describe the same binding.
    pub fn ensure_unique_keys(entries: &[Entry]) -> Result<(), MappingError> {
        let mut seen = HashSet::new();
        for entry in entries {
            let key = entry.key();
            if !seen.insert(key.clone()) {
                return Err(MappingError::InvalidEntry {
                    key,
                    reason: "binding is declared more than once".to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Every `/`-separated segment is a plain name: no empty, `.` or `..` parts.
fn is_clean_relative(value: &str) -> bool {
    value
        .split('/')
        .all(|s| !s.is_empty() && s != "." && s != "..")
}

impl Item for Entry {
    fn key(&self) -> String {
        self.path()
    }

    fn equals(&self, other: &dyn Any) -> bool {
        let Some(other) = other.downcast_ref::<Entry>() else {
            return false;
        };
        self.key() == other.key() && self.policies == other.policies
    }
}

impl Display for Entry {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(
            f,
            "{} ({}) policies=[{}]",
            self.path(),
            self.auth_type,
            self.policies
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use yare::parameterized;

    fn team(policies: &str) -> Entry {
        Entry::new("team-a", "map/teams", "github", "github", policies)
    }

    #[parameterized(
        plain = { &["auth", "github", "map/teams", "team-a"], "/auth/github/map/teams/team-a" },
        trailing_separators = { &["auth/", "github/", "map/teams/", "team-a/"], "/auth/github/map/teams/team-a" },
        duplicate_separators = { &["/auth", "github", "map//teams", "team-a"], "/auth/github/map/teams/team-a" },
        dot_segments = { &["auth", "./github", "map/teams", "team-a"], "/auth/github/map/teams/team-a" },
        parent_segments = { &["auth", "github", "map/x/../teams", "team-a"], "/auth/github/map/teams/team-a" },
        empty = { &[], "/" },
    )]
    fn test_canonical_path(parts: &[&str], expected: &str) {
        assert_eq!(canonical_path(parts), expected);
    }

    #[test]
    fn test_key_is_stable_and_ignores_separator_noise() {
        let a = team("default");
        let b = Entry::new("team-a", "map//teams/", "github", "github/", "default");
        assert_eq!(a.key(), "/auth/github/map/teams/team-a");
        assert_eq!(a.key(), a.key());
        assert_eq!(a.key(), b.key());
        assert!(a.equals(&b));
    }

    #[test]
    fn test_equals_requires_same_policies() {
        assert!(team("default,admin").equals(&team("default,admin")));
        assert!(!team("default,admin").equals(&team("admin,default")));
        assert!(!team("p1").equals(&team("p1,p2")));
    }

    #[test]
    fn test_equals_ignores_auth_type() {
        let a = team("default");
        let mut b = team("default");
        b.auth_type = "something-else".to_string();
        assert!(a.equals(&b));
    }

    #[test]
    fn test_equals_fails_closed_on_other_types() {
        let entry = team("default");
        assert!(!entry.equals(&"/auth/github/map/teams/team-a".to_string()));
        assert!(!entry.equals(&42u32));
    }

    #[parameterized(
        github = { "github", "value" },
        ldap = { "ldap", "policies" },
        unknown = { "userpass", "value" },
    )]
    fn test_policy_field(auth_type: &str, expected: &str) {
        let entry = Entry::new("x", "users", auth_type, "mount", "p");
        assert_eq!(entry.policy_field(), expected);
    }

    #[test]
    fn test_has_policies() {
        assert!(team("default,admin").has_policies());
        assert!(!team("").has_policies());
    }

    #[parameterized(
        github_team = { "team-a", "map/teams", "github", "github" },
        github_user = { "octocat", "map/users", "github", "gh-corp" },
        okta_group = { "g1", "groups", "okta", "okta" },
        ldap_user = { "alice", "users", "ldap", "ldap" },
        radius_user = { "bob", "users", "radius", "radius" },
        unknown_kind_any_group = { "svc", "roles", "userpass", "userpass" },
        email_name = { "alice@example.com", "users", "okta", "okta" },
        nested_mount = { "g1", "groups", "okta", "corp/okta" },
        deeply_nested_mount = { "octocat", "map/users", "github", "corp/eu/github" },
    )]
    fn test_validate_accepts(name: &str, group: &str, kind: &str, mount: &str) {
        let entry = Entry::new(name, group, kind, mount, "default");
        assert!(entry.validate().is_ok(), "{entry} should be valid");
    }

    #[parameterized(
        empty_name = { "", "users", "ldap", "ldap" },
        empty_mount = { "alice", "users", "ldap", " " },
        empty_type = { "alice", "users", "", "ldap" },
        slash_in_name = { "alice/admin", "users", "ldap", "ldap" },
        dotdot_name = { "..", "users", "ldap", "ldap" },
        dot_mount = { "alice", "users", "ldap", "." },
        mount_leading_slash = { "alice", "users", "ldap", "/ldap" },
        mount_trailing_slash = { "alice", "users", "ldap", "corp/ldap/" },
        mount_empty_segment = { "alice", "users", "ldap", "corp//ldap" },
        mount_parent_segment = { "alice", "users", "ldap", "corp/../ldap" },
        group_trailing_slash = { "alice", "users/", "ldap", "ldap" },
        group_not_for_kind = { "alice", "map/users", "ldap", "ldap" },
        radius_has_no_groups = { "ops", "groups", "radius", "radius" },
        github_plain_users = { "octocat", "users", "github", "github" },
    )]
    fn test_validate_rejects(name: &str, group: &str, kind: &str, mount: &str) {
        let entry = Entry::new(name, group, kind, mount, "default");
        assert!(matches!(
            entry.validate(),
            Err(MappingError::InvalidEntry { .. })
        ));
    }

    #[test]
    fn test_ensure_unique_keys() {
        let entries = vec![team("a"), Entry::new("team-b", "map/teams", "github", "github", "a")];
        assert!(Entry::ensure_unique_keys(&entries).is_ok());

        let duplicated = vec![team("a"), team("b")];
        let err = Entry::ensure_unique_keys(&duplicated).unwrap_err();
        assert!(err.to_string().contains("/auth/github/map/teams/team-a"));
    }

    #[test]
    fn test_display() {
        assert_eq!(
            team("default,admin").to_string(),
            "/auth/github/map/teams/team-a (github) policies=[default,admin]"
        );
    }

    #[test]
    fn test_yaml_field_names() {
        let yaml = r#"
entity-name: team-a
entity-group: map/teams
auth-type: github
auth-mount: github
policies: default,admin
"#;
        let entry: Entry = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(entry, team("default,admin"));
    }
}
