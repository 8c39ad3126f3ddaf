//! Set difference between declared and observed items.

use std::collections::HashMap;

use crate::traits::Item;

/// What has to change for the observed side to match the declared side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diff<T> {
    /// Declared items that are missing or differ on the observed side.
    pub to_write: Vec<T>,
    /// Observed items with no equal declared counterpart.
    pub to_delete: Vec<T>,
}

/// Partition `declared` and `observed` by identity key and compare with
/// [`Item::equals`].
///
/// An item whose key matches but whose payload differs shows up in both
/// `to_write` (declared version) and `to_delete` (observed version). Input
/// order is preserved within each collection.
pub fn diff_items<T: Item + Clone>(declared: &[T], observed: &[T]) -> Diff<T> {
    let observed_by_key = index_by_key(observed);
    let declared_by_key = index_by_key(declared);

    let to_write = declared
        .iter()
        .filter(|d| !has_equal(&observed_by_key, *d))
        .cloned()
        .collect();

    let to_delete = observed
        .iter()
        .filter(|o| !has_equal(&declared_by_key, *o))
        .cloned()
        .collect();

    Diff {
        to_write,
        to_delete,
    }
}

fn has_equal<T: Item>(index: &HashMap<String, Vec<&T>>, item: &T) -> bool {
    index
        .get(&item.key())
        .is_some_and(|candidates| candidates.iter().any(|c| c.equals(item)))
}

fn index_by_key<T: Item>(items: &[T]) -> HashMap<String, Vec<&T>> {
    let mut index: HashMap<String, Vec<&T>> = HashMap::new();
    for item in items {
        index.entry(item.key()).or_default().push(item);
    }
    index
}
