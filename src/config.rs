//! Connection settings for the secrets server.

use std::time::Duration;

use crate::error::ClientError;

pub const ENV_ADDR: &str = "VAULT_ADDR";
pub const ENV_TOKEN: &str = "VAULT_TOKEN";
pub const ENV_NAMESPACE: &str = "VAULT_NAMESPACE";
pub const ENV_TIMEOUT: &str = "VAULT_CLIENT_TIMEOUT";

/// Where and how to reach the server.
#[derive(Clone)]
pub struct VaultSettings {
    /// Server address, e.g. `https://vault.internal:8200`.
    pub address: String,

    /// Token sent as `X-Vault-Token`.
    pub token: String,

    /// Enterprise namespace sent as `X-Vault-Namespace`.
    pub namespace: Option<String>,

    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

const DEFAULT_TIMEOUT_SECS: u64 = 60;

impl std::fmt::Debug for VaultSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VaultSettings")
            .field("address", &self.address)
            .field("token", &"[redacted]")
            .field("namespace", &self.namespace)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl VaultSettings {
    /// Read settings from `VAULT_ADDR`, `VAULT_TOKEN`, `VAULT_NAMESPACE` and
    /// `VAULT_CLIENT_TIMEOUT`.
    pub fn from_env() -> Result<Self, ClientError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`VaultSettings::from_env`] with a custom variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ClientError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or_else(|| ClientError::Config(format!("{name} is not set")))
        };

        let address = required(ENV_ADDR)?.trim_end_matches('/').to_string();
        if !address.starts_with("http://") && !address.starts_with("https://") {
            return Err(ClientError::Config(format!(
                "{ENV_ADDR} must be an http(s) URL, got '{address}'"
            )));
        }
        let token = required(ENV_TOKEN)?;

        let namespace = lookup(ENV_NAMESPACE)
            .map(|v| v.trim().trim_matches('/').to_string())
            .filter(|v| !v.is_empty());

        let timeout_secs = match lookup(ENV_TIMEOUT) {
            Some(raw) => parse_timeout(&raw)?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        Ok(VaultSettings {
            address,
            token,
            namespace,
            timeout_secs,
        })
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Accepts plain seconds (`30`) or a seconds suffix (`30s`).
fn parse_timeout(raw: &str) -> Result<u64, ClientError> {
    let trimmed = raw.trim();
    let digits = trimmed.strip_suffix('s').unwrap_or(trimmed);
    match digits.parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(secs),
        _ => Err(ClientError::Config(format!(
            "{ENV_TIMEOUT} must be a positive number of seconds, got '{raw}'"
        ))),
    }
}
