use sipper_types::{EntityId, EntityKind, TypeError};

/// Errors from catalog store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Connection, statement, or constraint failure reported by SQLite.
    #[error("store access failed: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// I/O error while preparing the store location or reading config.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An association row points at an ingredient that does not exist.
    #[error("recipe {recipe} references missing ingredient {ingredient}")]
    DanglingReference {
        recipe: EntityId,
        ingredient: EntityId,
    },

    /// A recipe was saved with an ingredient that has never been saved.
    #[error("recipe {recipe:?} uses unsaved ingredient {ingredient:?}")]
    UnsavedReference { recipe: String, ingredient: String },

    /// Delete of an entity that was never persisted.
    #[error("{kind} {name:?} has never been saved")]
    Unsaved { kind: EntityKind, name: String },

    /// A stored row cannot be turned back into an entity.
    #[error("corrupt row in {table}: {reason}")]
    Corrupt { table: &'static str, reason: String },

    /// A stored value failed type-level validation.
    #[error("invalid value: {0}")]
    Type(#[from] TypeError),

    /// The configuration could not be parsed.
    #[error("config error: {0}")]
    Config(String),

    /// Another thread panicked while holding a store lock.
    #[error("store lock poisoned")]
    LockPoisoned,
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
