//! Per-kind rules for finding bindings under an auth mount and for the name
//! of the payload field that carries their policies.
//!
//! Support for a new backend kind is a new row in [`ADAPTERS`].

use std::collections::HashMap;
use std::str::FromStr;

use once_cell::sync::Lazy;

use crate::types::BackendKind;

/// Field name used when the backend kind is not in the table.
pub const FALLBACK_POLICY_FIELD: &str = "value";

/// How bindings are laid out under a mount of one backend kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackendAdapter {
    /// Sub-collections listed under `/auth/<mount>/`, in scan order.
    pub sub_collections: &'static [&'static str],
    /// Payload field holding the policies.
    pub policy_field: &'static str,
}

static ADAPTERS: Lazy<HashMap<BackendKind, BackendAdapter>> = Lazy::new(|| {
    HashMap::from([
        (
            BackendKind::Github,
            BackendAdapter {
                sub_collections: &["map/teams", "map/users"],
                policy_field: "value",
            },
        ),
        (
            BackendKind::Okta,
            BackendAdapter {
                sub_collections: &["groups", "users"],
                policy_field: "policies",
            },
        ),
        (
            BackendKind::Ldap,
            BackendAdapter {
                sub_collections: &["groups", "users"],
                policy_field: "policies",
            },
        ),
        (
            BackendKind::Radius,
            BackendAdapter {
                sub_collections: &["users"],
                policy_field: "policies",
            },
        ),
    ])
});

impl BackendAdapter {
    /// The adapter for a backend kind tag as reported by the server.
    pub fn for_kind(kind: &str) -> Option<&'static BackendAdapter> {
        BackendKind::from_str(kind)
            .ok()
            .and_then(|kind| ADAPTERS.get(&kind))
    }
}

/// Sub-collections to enumerate for `kind`; empty for unsupported kinds.
pub fn lookup_sub_collections(kind: &str) -> &'static [&'static str] {
    BackendAdapter::for_kind(kind)
        .map(|adapter| adapter.sub_collections)
        .unwrap_or(&[])
}

/// The policy field name for `kind`, falling back to `value`.
pub fn lookup_policy_field(kind: &str) -> &'static str {
    BackendAdapter::for_kind(kind)
        .map(|adapter| adapter.policy_field)
        .unwrap_or(FALLBACK_POLICY_FIELD)
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;
    use yare::parameterized;

    #[parameterized(
        github = { "github", &["map/teams", "map/users"], "value" },
        okta = { "okta", &["groups", "users"], "policies" },
        ldap = { "ldap", &["groups", "users"], "policies" },
        radius = { "radius", &["users"], "policies" },
        unknown = { "userpass", &[], "value" },
        case_sensitive = { "GitHub", &[], "value" },
    )]
    fn test_adapter_table(kind: &str, sub_collections: &[&str], policy_field: &str) {
        assert_eq!(lookup_sub_collections(kind), sub_collections);
        assert_eq!(lookup_policy_field(kind), policy_field);
    }

    #[test]
    fn test_every_kind_has_an_adapter() {
        for kind in BackendKind::iter() {
            let adapter = BackendAdapter::for_kind(&kind.to_string());
            assert!(adapter.is_some(), "missing adapter for {kind}");
            assert!(!adapter.unwrap().sub_collections.is_empty());
        }
    }
}
