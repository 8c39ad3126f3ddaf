//! Data model types for policy bindings.
//!
//! Canonical forms:
//! - Entry key: `/auth/<mount>/<entity-group>/<entity-name>`
//! - Policies: comma-joined, order preserving (`default,admin`)
//! - Backend kind: lowercase tag (`github`, `ldap`, `okta`, `radius`)

mod backend_kind;
mod entry;
mod policy_value;

pub use backend_kind::BackendKind;
pub use entry::{Entry, canonical_path};
pub use policy_value::PolicyValue;
