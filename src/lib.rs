// src/lib.rs
pub use adapter::{
    BackendAdapter, FALLBACK_POLICY_FIELD, lookup_policy_field, lookup_sub_collections,
};
pub use client::{AuthMount, SecretsClient};
pub use config::VaultSettings;
pub use diff::{Diff, diff_items};
pub use error::{ClientError, MappingError};
pub use loader::{SECTION, decode_entries};
pub use reconcile::{ReconcilePhases, ReconcileReport, Reconciler};
pub use traits::Item;
pub use types::{BackendKind, Entry, PolicyValue, canonical_path};
pub use vault::HttpVaultClient;

mod adapter;
mod client;
mod config;
mod diff;
mod error;
mod loader;
mod reconcile;
mod timers;
mod traits;
mod types;
mod vault;

#[cfg(test)]
mod tests;
