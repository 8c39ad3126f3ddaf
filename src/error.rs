use thiserror::Error;

/// Failures talking to the secrets server.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("client configuration error: {0}")]
    Config(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("server returned {status} for {path}: {body}")]
    Status {
        status: u16,
        path: String,
        body: String,
    },

    #[error("unexpected response for {path}: {reason}")]
    Protocol { path: String, reason: String },
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        ClientError::Transport(err.to_string())
    }
}

/// Failures of a reconciliation pass. Every variant is fatal to the run.
#[derive(Debug, Error)]
pub enum MappingError {
    #[error("failed to decode policies mapping configuration: {0}")]
    Decode(String),

    #[error("invalid policies mapping entry '{key}': {reason}")]
    InvalidEntry { key: String, reason: String },

    #[error("failed to list authentication backends: {0}")]
    ListBackends(#[source] ClientError),

    #[error("failed to list entities at {path}: {source}")]
    ListEntities {
        path: String,
        #[source]
        source: ClientError,
    },

    #[error("failed to read policies at {path}: {source}")]
    ReadPolicies {
        path: String,
        #[source]
        source: ClientError,
    },

    #[error("no policy data found at {path}")]
    MissingPolicies { path: String },

    #[error("failed to write policies to {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: ClientError,
    },

    #[error("failed to delete {path}: {source}")]
    Delete {
        path: String,
        #[source]
        source: ClientError,
    },
}

impl From<serde_yaml::Error> for MappingError {
    fn from(err: serde_yaml::Error) -> Self {
        let location = err
            .location()
            .map(|loc| format!(" at line {}, column {}", loc.line(), loc.column()))
            .unwrap_or_default();
        MappingError::Decode(format!("invalid YAML{location}: {err}"))
    }
}

impl MappingError {
    /// The server path the failure relates to, if any.
    pub fn path(&self) -> Option<&str> {
        match self {
            MappingError::ListEntities { path, .. }
            | MappingError::ReadPolicies { path, .. }
            | MappingError::MissingPolicies { path }
            | MappingError::Write { path, .. }
            | MappingError::Delete { path, .. } => Some(path),
            _ => None,
        }
    }
}
