//! Entity trait: identity across snapshots.

/// Entity marker + minimal interface.
///
/// Reference records (collection points, area offices, suppliers) are keyed
/// by this identifier when indexed.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}
