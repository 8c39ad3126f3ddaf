use std::collections::HashSet;
use std::time::Duration;

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::adapter::BackendAdapter;
use crate::client::SecretsClient;
use crate::diff::{Diff, diff_items};
use crate::error::{ClientError, MappingError};
use crate::loader;
use crate::timers::PhaseTimer;
use crate::traits::Item;
use crate::types::{Entry, PolicyValue, canonical_path};

/// Time spent in each phase of a pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReconcilePhases {
    pub discover: Duration,
    pub diff: Duration,
    pub apply: Duration,
}

/// Outcome of a reconciliation pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    pub dry_run: bool,
    /// Declared bindings that were (or would be) written.
    pub to_write: Vec<Entry>,
    /// Observed bindings that were (or would be) deleted.
    pub to_delete: Vec<Entry>,
    pub phases: ReconcilePhases,
}

impl ReconcileReport {
    /// True when live state already matched the declared state.
    pub fn is_noop(&self) -> bool {
        self.to_write.is_empty() && self.to_delete.is_empty()
    }

    /// Observed bindings that are removed outright. Stale versions of
    /// bindings rewritten in the same pass are left out, since the write
    /// replaces them in place and no delete is issued for them.
    pub fn removed(&self) -> impl Iterator<Item = &Entry> {
        let written: HashSet<String> = self.to_write.iter().map(|e| e.key()).collect();
        self.to_delete
            .iter()
            .filter(move |entry| !written.contains(&entry.key()))
    }
}

/// Drives one declared-vs-observed pass against a secrets server.
///
/// All server calls are issued sequentially and every failure aborts the
/// pass. Nothing is kept between passes.
pub struct Reconciler<C> {
    client: C,
}

impl<C: SecretsClient> Reconciler<C> {
    pub fn new(client: C) -> Self {
        Reconciler { client }
    }

    /// Decode a YAML policies mapping and reconcile it.
    pub fn apply(&self, config: &[u8], dry_run: bool) -> Result<ReconcileReport, MappingError> {
        let declared = loader::decode_entries(config)?;
        self.reconcile(declared, dry_run)
    }

    /// Make the server's bindings match `declared`, or only report what would
    /// change when `dry_run` is set.
    ///
    /// Writes are applied before deletes so a binding is never removed ahead
    /// of its replacement. A stale binding whose key is rewritten in the same
    /// pass is replaced in place by the write and not deleted afterwards.
    pub fn reconcile(
        &self,
        declared: Vec<Entry>,
        dry_run: bool,
    ) -> Result<ReconcileReport, MappingError> {
        let mut phases = ReconcilePhases::default();

        let declared = prepare_declared(declared)?;

        let observed = {
            let _timer = PhaseTimer::new(&mut phases.discover);
            self.discover()?
        };

        let Diff {
            to_write,
            to_delete,
        } = {
            let _timer = PhaseTimer::new(&mut phases.diff);
            diff_items(&declared, &observed)
        };

        info!(
            event = "Reconcile",
            phase = "Diff",
            declared = declared.len(),
            observed = observed.len(),
            to_write = to_write.len(),
            to_delete = to_delete.len(),
            dry_run
        );

        let written: HashSet<String> = to_write.iter().map(|e| e.key()).collect();

        if dry_run {
            for entry in &to_write {
                info!(
                    event = "Reconcile",
                    phase = "DryRun",
                    dry_run = true,
                    path = %entry.path(),
                    "entry to be written: {entry}"
                );
            }
            for entry in &to_delete {
                let action = if written.contains(&entry.key()) {
                    "overwritten"
                } else {
                    "deleted"
                };
                info!(
                    event = "Reconcile",
                    phase = "DryRun",
                    dry_run = true,
                    path = %entry.path(),
                    "entry to be {action}: {entry}"
                );
            }
        } else {
            let _timer = PhaseTimer::new(&mut phases.apply);
            for entry in &to_write {
                self.write_entry(entry)?;
            }
            for entry in &to_delete {
                if written.contains(&entry.key()) {
                    debug!(
                        event = "Reconcile",
                        phase = "Apply",
                        path = %entry.path(),
                        "stale binding already replaced by write, not deleting"
                    );
                    continue;
                }
                self.delete_entry(entry)?;
            }
        }

        Ok(ReconcileReport {
            dry_run,
            to_write,
            to_delete,
            phases,
        })
    }

    /// Read every binding under every mount of a supported backend kind.
    pub fn discover(&self) -> Result<Vec<Entry>, MappingError> {
        let mounts = self
            .client
            .list_auth_backends()
            .map_err(MappingError::ListBackends)?;

        let mut observed = Vec::new();
        for (mount, backend) in &mounts {
            let Some(adapter) = BackendAdapter::for_kind(&backend.kind) else {
                debug!(
                    event = "Reconcile",
                    phase = "Discover",
                    mount = %mount,
                    kind = %backend.kind,
                    "skipping unsupported auth backend"
                );
                continue;
            };

            for &segment in adapter.sub_collections {
                let list_path = canonical_path(&["auth", mount.as_str(), segment]);
                let names = self
                    .client
                    .list(&list_path)
                    .map_err(|source| MappingError::ListEntities {
                        path: list_path.clone(),
                        source,
                    })?
                    .unwrap_or_default();

                debug!(
                    event = "Reconcile",
                    phase = "Discover",
                    path = %list_path,
                    entities = names.len()
                );

                for name in names {
                    let path = canonical_path(&[list_path.as_str(), name.as_str()]);
                    let Some(policies) = self.read_policies(&path, adapter.policy_field)? else {
                        debug!(
                            event = "Reconcile",
                            phase = "Discover",
                            path = %path,
                            "binding carries no policies, treating as absent"
                        );
                        continue;
                    };
                    observed.push(Entry::new(
                        name,
                        segment,
                        backend.kind.as_str(),
                        mount.as_str(),
                        policies,
                    ));
                }
            }
        }

        Ok(observed)
    }

    /// Read the canonical policy string stored at `path`.
    ///
    /// `Ok(None)` when the field is absent or empty.
    fn read_policies(&self, path: &str, field: &str) -> Result<Option<String>, MappingError> {
        let payload = self
            .client
            .read(path)
            .map_err(|source| MappingError::ReadPolicies {
                path: path.to_string(),
                source,
            })?
            .ok_or_else(|| MappingError::MissingPolicies {
                path: path.to_string(),
            })?;

        let parsed = match payload.get(field) {
            Some(value) => PolicyValue::from_json(value),
            None => Ok(None),
        };
        let policies = parsed
            .map_err(|reason| MappingError::ReadPolicies {
                path: path.to_string(),
                source: ClientError::Protocol {
                    path: path.to_string(),
                    reason: format!("field '{field}': {reason}"),
                },
            })?
            .map(PolicyValue::into_canonical)
            .filter(|p| !p.is_empty());

        Ok(policies)
    }

    fn write_entry(&self, entry: &Entry) -> Result<(), MappingError> {
        let path = entry.path();
        let mut payload = Map::new();
        payload.insert(
            entry.policy_field().to_string(),
            Value::String(entry.policies.clone()),
        );

        self.client
            .write(&path, &payload)
            .map_err(|source| MappingError::Write {
                path: path.clone(),
                source,
            })?;
        info!(
            event = "Reconcile",
            phase = "Apply",
            path = %path,
            policies = %entry.policies,
            "successfully applied policies to entity"
        );
        Ok(())
    }

    fn delete_entry(&self, entry: &Entry) -> Result<(), MappingError> {
        let path = entry.path();
        self.client
            .delete(&path)
            .map_err(|source| MappingError::Delete {
                path: path.clone(),
                source,
            })?;
        info!(
            event = "Reconcile",
            phase = "Apply",
            path = %path,
            "successfully deleted entity"
        );
        Ok(())
    }
}

/// Validate the declared entries and drop the ones without policies.
fn prepare_declared(declared: Vec<Entry>) -> Result<Vec<Entry>, MappingError> {
    for entry in &declared {
        entry.validate()?;
        if entry.backend_kind().is_none() {
            warn!(
                event = "Reconcile",
                phase = "Validate",
                path = %entry.path(),
                kind = %entry.auth_type,
                "declared entry uses an unsupported auth type and will never be observed"
            );
        }
    }
    Entry::ensure_unique_keys(&declared)?;

    Ok(declared
        .into_iter()
        .filter(|entry| {
            if !entry.has_policies() {
                debug!(
                    event = "Reconcile",
                    phase = "Validate",
                    path = %entry.path(),
                    "declared entry has no policies, treating as absent"
                );
            }
            entry.has_policies()
        })
        .collect())
}
