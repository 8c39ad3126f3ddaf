use std::any::Any;

/// Anything that can be compared between declared and observed state,
/// e.g. a policy binding at `/auth/github/map/teams/team-a`.
pub trait Item: Any {
    /// The identity key. Two items with the same key describe the same binding.
    fn key(&self) -> String;

    /// Full equality: same identity key and same payload.
    ///
    /// Returns `false` when `other` is not the same concrete type.
    fn equals(&self, other: &dyn Any) -> bool;
}
