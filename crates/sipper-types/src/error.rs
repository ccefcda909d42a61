use thiserror::Error;

use crate::id::EntityId;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("unknown unit: {0:?}")]
    UnknownUnit(String),

    #[error("identifier already assigned: {current}, refusing {requested}")]
    IdentifierReassigned {
        current: EntityId,
        requested: EntityId,
    },
}
