//! The policy field of a server payload, which arrives as either a string or
//! a list of strings depending on the backend.

use itertools::Itertools;
use serde_json::Value;

/// Raw policy field value as read from the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PolicyValue {
    Text(String),
    List(Vec<String>),
}

impl PolicyValue {
    /// Read a policy field out of a JSON payload value.
    ///
    /// `null` is treated as an absent field. Any other shape than a string or
    /// a list of strings is rejected with a description of what was found.
    pub fn from_json(value: &Value) -> Result<Option<Self>, String> {
        match value {
            Value::Null => Ok(None),
            Value::String(s) => Ok(Some(PolicyValue::Text(s.clone()))),
            Value::Array(items) => items
                .iter()
                .map(|item| match item {
                    Value::String(s) => Ok(s.clone()),
                    other => Err(format!("expected string policy name, found {other}")),
                })
                .collect::<Result<Vec<_>, _>>()
                .map(|list| Some(PolicyValue::List(list))),
            other => Err(format!("expected string or list of strings, found {other}")),
        }
    }

    /// The canonical comma-joined form. Strings are kept verbatim, lists are
    /// joined in their given order.
    pub fn into_canonical(self) -> String {
        match self {
            PolicyValue::Text(s) => s,
            PolicyValue::List(list) => list.into_iter().join(","),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use yare::parameterized;

    #[test]
    fn test_list_and_string_forms_normalize_identically() {
        let list = PolicyValue::from_json(&json!(["a", "b", "c"])).unwrap().unwrap();
        let text = PolicyValue::from_json(&json!("a,b,c")).unwrap().unwrap();
        assert_eq!(list.into_canonical(), text.into_canonical());
    }

    #[parameterized(
        single = { json!("default"), "default" },
        string_kept_verbatim = { json!("b, a"), "b, a" },
        list_keeps_order = { json!(["z", "a"]), "z,a" },
        empty_list = { json!([]), "" },
        single_item_list = { json!(["admin"]), "admin" },
    )]
    fn test_canonical_form(value: Value, expected: &str) {
        let parsed = PolicyValue::from_json(&value).unwrap().unwrap();
        assert_eq!(parsed.into_canonical(), expected);
    }

    #[test]
    fn test_null_is_absent() {
        assert_eq!(PolicyValue::from_json(&Value::Null).unwrap(), None);
    }

    #[parameterized(
        number = { json!(42) },
        object = { json!({"policies": "a"}) },
        mixed_list = { json!(["a", 1]) },
        bool = { json!(true) },
    )]
    fn test_unsupported_shapes_are_rejected(value: Value) {
        assert!(PolicyValue::from_json(&value).is_err());
    }

    #[test]
    fn test_variants() {
        assert_eq!(
            PolicyValue::from_json(&json!("a,b")).unwrap(),
            Some(PolicyValue::Text("a,b".to_string()))
        );
        assert_eq!(
            PolicyValue::from_json(&json!(["a", "b"])).unwrap(),
            Some(PolicyValue::List(vec!["a".to_string(), "b".to_string()]))
        );
    }
}
