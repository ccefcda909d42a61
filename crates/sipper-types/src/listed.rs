//! The capability shared by every catalog entity.

use std::cmp::Ordering;

use crate::id::EntityId;

/// An entity shown in catalog lists: it has a display name and, once saved,
/// a store-assigned identifier.
pub trait Listed {
    /// Identifier, or `None` if the entity has never been saved.
    fn id(&self) -> Option<EntityId>;

    /// Display name.
    fn name(&self) -> &str;

    /// Returns `true` if the entity has never been persisted.
    fn is_new(&self) -> bool {
        self.id().is_none()
    }

    /// Natural catalog order, see [`natural_order`].
    fn natural_cmp(&self, other: &Self) -> Ordering
    where
        Self: Sized,
    {
        natural_order(self, other)
    }
}

/// Case-insensitive name comparison, identifier ascending on ties.
///
/// Unsaved entities (no identifier) sort before saved ones of the same name.
pub fn natural_order<A, B>(a: &A, b: &B) -> Ordering
where
    A: Listed + ?Sized,
    B: Listed + ?Sized,
{
    let left = a.name().chars().flat_map(char::to_lowercase);
    let right = b.name().chars().flat_map(char::to_lowercase);
    left.cmp(right).then_with(|| a.id().cmp(&b.id()))
}
