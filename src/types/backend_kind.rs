//! Authentication backend kinds that carry policy bindings.

use strum_macros::{Display, EnumIter, EnumString};

/// A supported authentication backend kind, as reported by `sys/auth`.
///
/// Anything the server reports that does not parse into one of these is
/// not scanned for bindings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum BackendKind {
    Github,
    Ldap,
    Okta,
    Radius,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;
    use yare::parameterized;

    #[parameterized(
        github = { "github", BackendKind::Github },
        ldap = { "ldap", BackendKind::Ldap },
        okta = { "okta", BackendKind::Okta },
        radius = { "radius", BackendKind::Radius },
    )]
    fn test_backend_kind_from_str(input: &str, expected: BackendKind) {
        assert_eq!(BackendKind::from_str(input).unwrap(), expected);
        assert_eq!(expected.to_string(), input);
    }

    #[parameterized(
        userpass = { "userpass" },
        approle = { "approle" },
        token = { "token" },
        empty = { "" },
    )]
    fn test_backend_kind_rejects_unsupported(input: &str) {
        assert!(BackendKind::from_str(input).is_err());
    }

    #[test]
    fn test_backend_kind_iter_covers_all() {
        let kinds: Vec<String> = BackendKind::iter().map(|k| k.to_string()).collect();
        assert_eq!(kinds, vec!["github", "ldap", "okta", "radius"]);
    }
}
