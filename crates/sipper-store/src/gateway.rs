use std::fmt;
use std::sync::{Mutex, MutexGuard};

use sipper_types::{EntityId, Listed};
use tracing::debug;

use crate::backend::{AssociationRow, CatalogBackend};
use crate::config::CatalogConfig;
use crate::entity::StoredEntity;
use crate::error::{StoreError, StoreResult};
use crate::memory::InMemoryBackend;
use crate::signal::{ChangeSignal, StoreChanged, SubscriptionId};
use crate::sqlite::SqliteBackend;

/// The single point of access to the catalog store.
///
/// Every operation runs under one process-wide lock, so no two store
/// operations overlap. Successful mutations broadcast [`StoreChanged`]
/// after the lock is released; subscribers may therefore call back into
/// the gateway from their callback.
pub struct Gateway {
    backend: Box<dyn CatalogBackend>,
    serial: Mutex<()>,
    changes: ChangeSignal,
}

impl Gateway {
    pub fn new(backend: impl CatalogBackend + 'static) -> Self {
        Self::from_boxed(Box::new(backend))
    }

    pub fn from_boxed(backend: Box<dyn CatalogBackend>) -> Self {
        Self {
            backend,
            serial: Mutex::new(()),
            changes: ChangeSignal::new(),
        }
    }

    /// Open (and by default initialise) the SQLite store named by `config`.
    pub fn open_sqlite(config: CatalogConfig) -> StoreResult<Self> {
        Ok(Self::new(SqliteBackend::open(config)?))
    }

    pub fn in_memory() -> Self {
        Self::new(InMemoryBackend::new())
    }

    fn exclusive<R>(&self, op: impl FnOnce(&dyn CatalogBackend) -> StoreResult<R>) -> StoreResult<R> {
        let _guard: MutexGuard<'_, ()> = self.serial.lock().map_err(|_| StoreError::LockPoisoned)?;
        op(self.backend.as_ref())
    }

    // ---- Reads ----

    /// All stored entities of kind `T`, in no particular order.
    pub fn list_all<T: StoredEntity>(&self) -> StoreResult<Vec<T>> {
        let all = self.exclusive(|backend| T::load_all(backend))?;
        debug!(kind = %T::KIND, count = all.len(), "listed");
        Ok(all)
    }

    pub fn find_by_id<T: StoredEntity>(&self, id: EntityId) -> StoreResult<Option<T>> {
        self.exclusive(|backend| T::load_one(backend, id))
    }

    /// Raw association rows of one recipe, in storage order.
    pub fn association_rows(&self, recipe_id: EntityId) -> StoreResult<Vec<AssociationRow>> {
        self.exclusive(|backend| backend.association_rows(recipe_id))
    }

    // ---- Mutations ----

    /// Insert a new entity or update an existing one, returning its id.
    ///
    /// New entities receive a freshly generated identifier. Subscribers are
    /// notified only when the write succeeded.
    pub fn upsert<T: StoredEntity>(&self, entity: &T) -> StoreResult<EntityId> {
        let id = self.exclusive(|backend| entity.store_into(backend))?;
        debug!(kind = %T::KIND, %id, name = entity.name(), "upserted");
        self.broadcast();
        Ok(id)
    }

    /// Delete an entity and, for ingredients, every association row that
    /// references it. Returns `false` if there was no such row.
    pub fn delete<T: StoredEntity>(&self, entity: &T) -> StoreResult<bool> {
        let id = entity.id().ok_or_else(|| StoreError::Unsaved {
            kind: T::KIND,
            name: entity.name().to_string(),
        })?;
        let existed = self.exclusive(|backend| T::delete_from(backend, id))?;
        debug!(kind = %T::KIND, %id, existed, "deleted");
        self.broadcast();
        Ok(existed)
    }

    // ---- Change signal ----

    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&StoreChanged) + Send + Sync + 'static,
    {
        self.changes.subscribe(callback)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.changes.unsubscribe(id)
    }

    pub fn subscriber_count(&self) -> usize {
        self.changes.len()
    }

    pub fn describe(&self) -> String {
        self.backend.describe()
    }

    fn broadcast(&self) {
        let delivered = self.changes.emit(&StoreChanged);
        debug!(delivered, "store change broadcast");
    }
}

impl fmt::Debug for Gateway {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Gateway")
            .field("backend", &self.backend.describe())
            .field("changes", &self.changes)
            .finish()
    }
}
