//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;

    /// Whether this entity answers to `id`.
    ///
    /// Broadcast subscribers use this to filter commands addressed to others.
    fn is_addressed_by(&self, id: &Self::Id) -> bool {
        self.id() == id
    }
}
