use std::fmt;

use serde::{Deserialize, Serialize};

/// Store-assigned identifier of a catalog row.
///
/// Identifiers are handed out by the store on first save and never change
/// afterwards. An entity without one has never been persisted.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(i64);

impl EntityId {
    /// Wrap a raw row identifier.
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    /// The raw row identifier.
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl From<i64> for EntityId {
    fn from(raw: i64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityId({})", self.0)
    }
}

/// The two catalog categories.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Ingredient,
    Recipe,
}

impl EntityKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ingredient => "ingredient",
            Self::Recipe => "recipe",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_and_debug() {
        let id = EntityId::new(42);
        assert_eq!(id.to_string(), "#42");
        assert_eq!(format!("{id:?}"), "EntityId(42)");
        assert_eq!(id.get(), 42);
    }

    #[test]
    fn serializes_as_bare_integer() {
        let json = serde_json::to_string(&EntityId::new(7)).unwrap();
        assert_eq!(json, "7");
        let back: EntityId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, EntityId::new(7));
    }

    #[test]
    fn kind_names() {
        assert_eq!(EntityKind::Ingredient.to_string(), "ingredient");
        assert_eq!(EntityKind::Recipe.as_str(), "recipe");
    }
}
