use serde_yaml::Value;
use tracing::debug;

use crate::error::MappingError;
use crate::types::Entry;

/// Section key under which the mapping list lives in a multi-section file.
pub const SECTION: &str = "policies-mapping";

/// Decode the declared policies mapping from YAML.
///
/// The document is either the list of entries itself or a mapping holding
/// that list under the `policies-mapping` key. An empty document decodes to
/// an empty list.
///
/// Example:
/// ```rust
/// use policies_mapping::decode_entries;
/// let yaml = br#"
/// - entity-name: team-a
///   entity-group: map/teams
///   auth-type: github
///   auth-mount: github
///   policies: default,admin
/// "#;
/// let entries = decode_entries(yaml).unwrap();
/// assert_eq!(entries.len(), 1);
/// assert_eq!(entries[0].policies, "default,admin");
/// ```
pub fn decode_entries(bytes: &[u8]) -> Result<Vec<Entry>, MappingError> {
    let document: Value = serde_yaml::from_slice(bytes)?;

    let entries: Vec<Entry> = match document {
        Value::Null => Vec::new(),
        // Decode from the bytes again so errors keep their line and column.
        Value::Sequence(_) => serde_yaml::from_slice(bytes)?,
        Value::Mapping(mut sections) => match sections.remove(SECTION) {
            Some(Value::Null) => Vec::new(),
            Some(section) => serde_yaml::from_value(section)
                .map_err(|e| MappingError::Decode(format!("section '{SECTION}': {e}")))?,
            None => {
                return Err(MappingError::Decode(format!(
                    "expected a list of entries or a '{SECTION}' section"
                )));
            }
        },
        _ => {
            return Err(MappingError::Decode(
                "expected a list of entries".to_string(),
            ));
        }
    };

    debug!(event = "Decode", entries = entries.len(), "decoded policies mapping");
    Ok(entries)
}
