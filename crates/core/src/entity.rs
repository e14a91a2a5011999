//! Entity trait: identity + continuity across state changes.

use crate::id::OrgId;

/// Entity marker + minimal interface.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}

/// An entity owned by exactly one organization.
///
/// Stores use this to scope every read and write to the caller's organization.
pub trait OrgOwned: Entity {
    fn org_id(&self) -> OrgId;
}
