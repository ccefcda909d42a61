use sipper_store::StoreError;
use sipper_types::EntityKind;

/// Errors from cache and catalog operations.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// A gateway call failed; the cache kept its previous contents.
    #[error("{operation} {kind} failed")]
    Store {
        operation: &'static str,
        kind: EntityKind,
        #[source]
        source: StoreError,
    },

    /// The catalog store could not be opened.
    #[error("failed to open catalog store")]
    Open(#[source] StoreError),

    #[error("index {index} out of bounds for cache of {len}")]
    IndexOutOfBounds { index: usize, len: usize },
}

impl CacheError {
    pub(crate) fn store(
        operation: &'static str,
        kind: EntityKind,
    ) -> impl FnOnce(StoreError) -> CacheError {
        move |source| CacheError::Store {
            operation,
            kind,
            source,
        }
    }

    /// The underlying store error, if there is one.
    pub fn store_error(&self) -> Option<&StoreError> {
        match self {
            CacheError::Store { source, .. } | CacheError::Open(source) => Some(source),
            CacheError::IndexOutOfBounds { .. } => None,
        }
    }
}

/// Result alias for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn store_failure_names_operation_and_kind() {
        let err = CacheError::store("save", EntityKind::Recipe)(StoreError::LockPoisoned);
        assert_eq!(err.to_string(), "save recipe failed");
        assert!(err.source().is_some());
        assert!(matches!(err.store_error(), Some(StoreError::LockPoisoned)));
    }

    #[test]
    fn out_of_bounds_has_no_store_cause() {
        let err = CacheError::IndexOutOfBounds { index: 3, len: 2 };
        assert!(err.to_string().contains("index 3"));
        assert!(err.store_error().is_none());
    }
}
