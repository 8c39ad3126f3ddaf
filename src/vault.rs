//! Blocking HTTP client for the Vault API.

use std::collections::BTreeMap;

use reqwest::Method;
use reqwest::StatusCode;
use reqwest::blocking::{Client, ClientBuilder};
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::client::{AuthMount, SecretsClient};
use crate::config::VaultSettings;
use crate::error::ClientError;

/// Vault HTTP client authenticated with a static token.
pub struct HttpVaultClient {
    http: Client,
    address: String,
    token: String,
    namespace: Option<String>,
}

/// Generic API response wrapper.
#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    data: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct ListData {
    #[serde(default)]
    keys: Vec<String>,
}

impl HttpVaultClient {
    pub fn new(settings: &VaultSettings) -> Result<Self, ClientError> {
        let http = ClientBuilder::new()
            .timeout(settings.timeout())
            .build()
            .map_err(|e| ClientError::Config(format!("failed to build HTTP client: {e}")))?;

        info!(address = %settings.address, namespace = ?settings.namespace, "configured Vault client");

        Ok(HttpVaultClient {
            http,
            address: settings.address.trim_end_matches('/').to_string(),
            token: settings.token.clone(),
            namespace: settings.namespace.clone(),
        })
    }

    /// Build a client from the `VAULT_*` environment variables.
    pub fn from_env() -> Result<Self, ClientError> {
        Self::new(&VaultSettings::from_env()?)
    }

    fn url(&self, path: &str) -> String {
        api_url(&self.address, path)
    }

    /// Execute a single request. `Ok(None)` means 404 or an empty body.
    fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&Map<String, Value>>,
    ) -> Result<Option<Value>, ClientError> {
        let url = self.url(path);
        debug!(method = %method, url = %url, "sending Vault request");

        let mut request = self
            .http
            .request(method, &url)
            .header("X-Vault-Token", &self.token)
            .header("X-Vault-Request", "true");
        if let Some(namespace) = &self.namespace {
            request = request.header("X-Vault-Namespace", namespace);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send()?;
        let status = response.status();
        match status {
            StatusCode::NO_CONTENT | StatusCode::NOT_FOUND => Ok(None),
            s if s.is_success() => {
                let text = response.text()?;
                if text.trim().is_empty() {
                    return Ok(None);
                }
                serde_json::from_str(&text)
                    .map(Some)
                    .map_err(|e| ClientError::Protocol {
                        path: path.to_string(),
                        reason: format!("invalid JSON body: {e}"),
                    })
            }
            s => {
                let body = response.text().unwrap_or_default();
                Err(ClientError::Status {
                    status: s.as_u16(),
                    path: path.to_string(),
                    body,
                })
            }
        }
    }

    fn request_data(&self, method: Method, path: &str) -> Result<Option<Value>, ClientError> {
        let Some(body) = self.request(method, path, None)? else {
            return Ok(None);
        };
        let response: ApiResponse =
            serde_json::from_value(body).map_err(|e| ClientError::Protocol {
                path: path.to_string(),
                reason: e.to_string(),
            })?;
        Ok(response.data)
    }
}

fn api_url(address: &str, path: &str) -> String {
    format!(
        "{}/v1/{}",
        address.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

fn list_method() -> Method {
    // LIST is a valid token; from_bytes only fails on invalid characters.
    Method::from_bytes(b"LIST").unwrap_or(Method::GET)
}

/// Extract mounts from a `sys/auth` response.
///
/// Newer servers wrap the mounts in `data`; older ones put them at the top
/// level next to response metadata, so only object values with a `type` are
/// taken.
fn parse_auth_mounts(body: &Value) -> Result<BTreeMap<String, AuthMount>, ClientError> {
    let protocol = |reason: String| ClientError::Protocol {
        path: "/sys/auth".to_string(),
        reason,
    };

    let mounts = body
        .get("data")
        .filter(|d| d.is_object())
        .unwrap_or(body)
        .as_object()
        .ok_or_else(|| protocol("expected a JSON object".to_string()))?;

    let mut result = BTreeMap::new();
    for (name, value) in mounts {
        if value.get("type").is_none() {
            continue;
        }
        let mount: AuthMount = serde_json::from_value(value.clone())
            .map_err(|e| protocol(format!("invalid mount '{name}': {e}")))?;
        result.insert(name.trim_end_matches('/').to_string(), mount);
    }
    Ok(result)
}

impl SecretsClient for HttpVaultClient {
    fn list_auth_backends(&self) -> Result<BTreeMap<String, AuthMount>, ClientError> {
        let body = self
            .request(Method::GET, "/sys/auth", None)?
            .ok_or_else(|| ClientError::Protocol {
                path: "/sys/auth".to_string(),
                reason: "empty response".to_string(),
            })?;
        parse_auth_mounts(&body)
    }

    fn list(&self, path: &str) -> Result<Option<Vec<String>>, ClientError> {
        let Some(data) = self.request_data(list_method(), path)? else {
            return Ok(None);
        };
        let list: ListData = serde_json::from_value(data).map_err(|e| ClientError::Protocol {
            path: path.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Some(list.keys))
    }

    fn read(&self, path: &str) -> Result<Option<Map<String, Value>>, ClientError> {
        match self.request_data(Method::GET, path)? {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Object(map)) => Ok(Some(map)),
            Some(other) => Err(ClientError::Protocol {
                path: path.to_string(),
                reason: format!("expected object data, found {other}"),
            }),
        }
    }

    fn write(&self, path: &str, data: &Map<String, Value>) -> Result<(), ClientError> {
        self.request(Method::POST, path, Some(data)).map(|_| ())
    }

    fn delete(&self, path: &str) -> Result<(), ClientError> {
        self.request(Method::DELETE, path, None).map(|_| ())
    }
}
