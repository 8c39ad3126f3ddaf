//! The server-side operations the reconciliation needs.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ClientError;

/// An enabled authentication backend, as listed by `sys/auth`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthMount {
    /// Backend kind tag, e.g. `github` or `userpass`.
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub description: String,
}

impl AuthMount {
    pub fn new(kind: impl Into<String>) -> Self {
        AuthMount {
            kind: kind.into(),
            description: String::new(),
        }
    }
}

/// Blocking access to a secrets server.
///
/// Paths are server-relative, e.g. `/auth/github/map/teams`.
pub trait SecretsClient {
    /// All enabled auth backends keyed by mount name (without trailing `/`).
    fn list_auth_backends(&self) -> Result<BTreeMap<String, AuthMount>, ClientError>;

    /// Child keys under `path`, or `None` when nothing is there.
    fn list(&self, path: &str) -> Result<Option<Vec<String>>, ClientError>;

    /// The data payload at `path`, or `None` when nothing is there.
    fn read(&self, path: &str) -> Result<Option<Map<String, Value>>, ClientError>;

    fn write(&self, path: &str, data: &Map<String, Value>) -> Result<(), ClientError>;

    fn delete(&self, path: &str) -> Result<(), ClientError>;
}

impl<C: SecretsClient + ?Sized> SecretsClient for &C {
    fn list_auth_backends(&self) -> Result<BTreeMap<String, AuthMount>, ClientError> {
        (**self).list_auth_backends()
    }

    fn list(&self, path: &str) -> Result<Option<Vec<String>>, ClientError> {
        (**self).list(path)
    }

    fn read(&self, path: &str) -> Result<Option<Map<String, Value>>, ClientError> {
        (**self).read(path)
    }

    fn write(&self, path: &str, data: &Map<String, Value>) -> Result<(), ClientError> {
        (**self).write(path, data)
    }

    fn delete(&self, path: &str) -> Result<(), ClientError> {
        (**self).delete(path)
    }
}
