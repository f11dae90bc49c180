//! Entity trait: identity that survives state changes.

/// An object with a stable identity (a user, a sweet).
pub trait Entity {
    /// Strongly-typed identifier.
    type Id: Copy + Eq + core::hash::Hash + core::fmt::Debug;

    fn id(&self) -> &Self::Id;
}
