use std::cmp::Ordering as CmpOrdering;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard, Weak};

use sipper_store::{Gateway, Listeners, StoreResult, StoredEntity, SubscriptionId};
use sipper_types::{EntityId, EntityKind, Listed};
use tracing::{debug, warn};

use crate::error::{CacheError, CacheResult};
use crate::events::ListEvent;

/// The sorted in-memory sequence of one entity kind.
///
/// The sequence is always in natural order and holds at most one entry per
/// identifier. It is rebuilt from the store on construction and on every
/// change broadcast from the [`Gateway`]; mutations go through the gateway
/// and become visible through that reload.
///
/// Dependents observe structural changes through [`ListEvent`]s. Events
/// are emitted after the sequence is sorted and the internal lock is
/// released, so a listener may read the cache from its callback.
pub struct EntityCache<T: StoredEntity> {
    gateway: Arc<Gateway>,
    entries: RwLock<Vec<T>>,
    stale: AtomicBool,
    events: Listeners<ListEvent>,
    subscription: SubscriptionId,
}

impl<T: StoredEntity> EntityCache<T> {
    /// Build the cache with an eager initial load and subscribe it to the
    /// gateway's change signal.
    pub fn load(gateway: Arc<Gateway>) -> CacheResult<Arc<Self>> {
        let initial = gateway
            .list_all::<T>()
            .map_err(CacheError::store("load", T::KIND))?;
        let entries = sorted(initial);
        debug!(kind = %T::KIND, count = entries.len(), "cache loaded");

        let cache = Arc::new_cyclic(|weak: &Weak<Self>| {
            let weak = weak.clone();
            let subscription = gateway.subscribe(move |_| {
                if let Some(cache) = weak.upgrade() {
                    cache.reload_from_signal();
                }
            });
            Self {
                gateway: Arc::clone(&gateway),
                entries: RwLock::new(entries),
                stale: AtomicBool::new(false),
                events: Listeners::new(),
                subscription,
            }
        });
        Ok(cache)
    }

    pub fn kind(&self) -> EntityKind {
        T::KIND
    }

    // ---- Positional access ----

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// The entity at `index` in natural order.
    pub fn get(&self, index: usize) -> Option<T> {
        self.read().get(index).cloned()
    }

    /// A copy of the whole sorted sequence.
    pub fn snapshot(&self) -> Vec<T> {
        self.read().clone()
    }

    pub fn find_by_id(&self, id: EntityId) -> Option<T> {
        self.read().iter().find(|e| e.id() == Some(id)).cloned()
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.position(id).is_some()
    }

    pub fn position(&self, id: EntityId) -> Option<usize> {
        self.read().iter().position(|e| e.id() == Some(id))
    }

    // ---- Mutations ----

    /// Put `entity` into the in-memory sequence without persisting it.
    ///
    /// An entity whose identifier is already cached replaces that entry
    /// and is reported as [`ListEvent::ContentsChanged`] over the span it
    /// moved across; anything else is reported as
    /// [`ListEvent::IntervalAdded`] at its sorted position.
    pub fn add(&self, entity: T) {
        let event = {
            let mut entries = self.write();
            let previous = entity
                .id()
                .and_then(|id| entries.iter().position(|e| e.id() == Some(id)));
            if let Some(old) = previous {
                entries.remove(old);
            }
            let index = insertion_point(&entries, &entity);
            entries.insert(index, entity);
            match previous {
                Some(old) => ListEvent::ContentsChanged(old.min(index)..old.max(index) + 1),
                None => ListEvent::IntervalAdded(index..index + 1),
            }
        };
        self.events.emit(&event);
    }

    /// Persist a default-valued entity and return its new identifier.
    ///
    /// The entity reaches the sequence through the reload that follows
    /// the gateway's broadcast.
    pub fn create_empty(&self) -> CacheResult<EntityId> {
        let id = self
            .gateway
            .upsert(&T::new_empty())
            .map_err(CacheError::store("create", T::KIND))?;
        debug!(kind = %T::KIND, %id, "created empty entity");
        Ok(id)
    }

    /// Insert or update `entity` in the store; returns its identifier.
    pub fn save(&self, entity: &T) -> CacheResult<EntityId> {
        self.gateway
            .upsert(entity)
            .map_err(CacheError::store("save", T::KIND))
    }

    /// Remove the entity at `index`, deleting it from the store if it was
    /// ever saved.
    pub fn remove_at(&self, index: usize) -> CacheResult<T> {
        let entity = {
            let entries = self.read();
            entries
                .get(index)
                .cloned()
                .ok_or(CacheError::IndexOutOfBounds {
                    index,
                    len: entries.len(),
                })?
        };
        self.remove(&entity)?;
        Ok(entity)
    }

    /// Remove `entity` from the sequence and the store.
    ///
    /// Returns the index it occupied before removal, or `None` if it was
    /// not cached. If the store delete fails the sequence is untouched. An
    /// entity that was never saved is only removed from memory.
    pub fn remove(&self, entity: &T) -> CacheResult<Option<usize>> {
        let index = match entity.id() {
            None => {
                let mut entries = self.write();
                let found = entries.iter().position(|e| e.is_new() && e == entity);
                if let Some(index) = found {
                    entries.remove(index);
                }
                found
            }
            Some(id) => {
                let index = self.position(id);
                self.gateway
                    .delete(entity)
                    .map_err(CacheError::store("remove", T::KIND))?;
                // Normally the broadcast reload has already dropped it.
                let mut entries = self.write();
                entries.retain(|e| e.id() != Some(id));
                index
            }
        };
        if let Some(index) = index {
            self.events.emit(&ListEvent::IntervalRemoved(index..index + 1));
        }
        Ok(index)
    }

    // ---- Reload ----

    /// Reload from the store, reporting failure to the caller.
    pub fn refresh(&self) -> CacheResult<()> {
        self.reload().map_err(CacheError::store("refresh", T::KIND))
    }

    /// `true` if the last broadcast-triggered reload failed and the
    /// sequence may lag behind the store.
    pub fn is_stale(&self) -> bool {
        self.stale.load(Ordering::SeqCst)
    }

    fn reload(&self) -> StoreResult<()> {
        let loaded = sorted(self.gateway.list_all::<T>()?);
        let len = loaded.len();
        *self.write() = loaded;
        self.stale.store(false, Ordering::SeqCst);
        debug!(kind = %T::KIND, count = len, "cache reloaded");
        self.events.emit(&ListEvent::ContentsChanged(0..len));
        Ok(())
    }

    fn reload_from_signal(&self) {
        if let Err(err) = self.reload() {
            self.stale.store(true, Ordering::SeqCst);
            warn!(kind = %T::KIND, error = %err, "reload failed, keeping previous contents");
        }
    }

    // ---- Listeners ----

    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&ListEvent) + Send + Sync + 'static,
    {
        self.events.subscribe(callback)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.events.unsubscribe(id)
    }

    fn read(&self) -> RwLockReadGuard<'_, Vec<T>> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<T>> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T: StoredEntity> Drop for EntityCache<T> {
    fn drop(&mut self) {
        self.gateway.unsubscribe(self.subscription);
    }
}

impl<T: StoredEntity> fmt::Debug for EntityCache<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityCache")
            .field("kind", &T::KIND)
            .field("len", &self.len())
            .field("stale", &self.is_stale())
            .finish()
    }
}

fn sorted<T: Listed>(mut entries: Vec<T>) -> Vec<T> {
    entries.sort_by(|a, b| a.natural_cmp(b));
    entries
}

// After any entries that compare equal.
fn insertion_point<T: Listed>(entries: &[T], entity: &T) -> usize {
    entries.partition_point(|e| e.natural_cmp(entity) != CmpOrdering::Greater)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sipper_types::{Amount, Ingredient, Unit};
    use std::sync::Mutex;

    fn cache_with(names: &[&str]) -> (Arc<Gateway>, Arc<EntityCache<Ingredient>>) {
        let gateway = Arc::new(Gateway::in_memory());
        for name in names {
            gateway.upsert(&Ingredient::new(*name)).unwrap();
        }
        let cache = EntityCache::load(Arc::clone(&gateway)).unwrap();
        (gateway, cache)
    }

    fn names(cache: &EntityCache<Ingredient>) -> Vec<String> {
        cache.snapshot().into_iter().map(|i| i.name).collect()
    }

    fn recorded(cache: &EntityCache<Ingredient>) -> Arc<Mutex<Vec<ListEvent>>> {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        cache.subscribe(move |event| sink.lock().unwrap().push(event.clone()));
        events
    }

    // -----------------------------------------------------------------------
    // Loading and access
    // -----------------------------------------------------------------------

    #[test]
    fn initial_load_is_sorted() {
        let (_, cache) = cache_with(&["tonic", "Gin", "angostura"]);
        assert_eq!(names(&cache), vec!["angostura", "Gin", "tonic"]);
        assert_eq!(cache.len(), 3);
        assert_eq!(cache.kind(), EntityKind::Ingredient);
        assert!(!cache.is_stale());
    }

    #[test]
    fn lookup_by_id_and_position() {
        let (gateway, cache) = cache_with(&["Tonic"]);
        let gin_id = gateway.upsert(&Ingredient::new("Gin")).unwrap();

        assert_eq!(cache.position(gin_id), Some(0));
        assert!(cache.contains(gin_id));
        assert_eq!(cache.find_by_id(gin_id).unwrap().name, "Gin");
        assert!(cache.find_by_id(EntityId::new(999)).is_none());
        assert!(cache.get(5).is_none());
    }

    // -----------------------------------------------------------------------
    // Local add
    // -----------------------------------------------------------------------

    #[test]
    fn add_inserts_at_sorted_index() {
        let (gateway, cache) = cache_with(&["Gin", "Tonic"]);
        let events = recorded(&cache);

        cache.add(Ingredient::new("Lime"));

        assert_eq!(names(&cache), vec!["Gin", "Lime", "Tonic"]);
        assert_eq!(*events.lock().unwrap(), vec![ListEvent::IntervalAdded(1..2)]);
        // Nothing was persisted.
        assert_eq!(gateway.list_all::<Ingredient>().unwrap().len(), 2);
    }

    #[test]
    fn add_with_cached_id_replaces_entry() {
        let (_, cache) = cache_with(&["Gin", "Tonic"]);
        let events = recorded(&cache);
        let mut gin = cache.get(0).unwrap();
        gin.name = "Vodka".to_string();

        cache.add(gin);

        assert_eq!(names(&cache), vec!["Tonic", "Vodka"]);
        assert_eq!(*events.lock().unwrap(), vec![ListEvent::ContentsChanged(0..2)]);
    }

    // -----------------------------------------------------------------------
    // Persisting mutations
    // -----------------------------------------------------------------------

    #[test]
    fn create_empty_appears_after_reload() {
        let (_, cache) = cache_with(&["Gin"]);
        let events = recorded(&cache);

        let id = cache.create_empty().unwrap();

        let created = cache.find_by_id(id).unwrap();
        assert_eq!(created.name, "New Ingredient");
        assert_eq!(cache.len(), 2);
        assert_eq!(*events.lock().unwrap(), vec![ListEvent::ContentsChanged(0..2)]);
    }

    #[test]
    fn save_reloads_with_new_fields() {
        let (_, cache) = cache_with(&["Gin"]);
        let gin = cache
            .get(0)
            .unwrap()
            .with_container(Amount::new(70.0, Unit::CL), 25.0);

        let id = cache.save(&gin).unwrap();

        assert_eq!(Some(id), gin.id());
        assert_eq!(cache.find_by_id(id).unwrap(), gin);
    }

    #[test]
    fn remove_at_deletes_and_reports_index() {
        let (gateway, cache) = cache_with(&["Gin", "Lime", "Tonic"]);
        let events = recorded(&cache);

        let removed = cache.remove_at(1).unwrap();

        assert_eq!(removed.name, "Lime");
        assert_eq!(names(&cache), vec!["Gin", "Tonic"]);
        assert_eq!(gateway.list_all::<Ingredient>().unwrap().len(), 2);
        assert_eq!(
            *events.lock().unwrap(),
            vec![ListEvent::ContentsChanged(0..2), ListEvent::IntervalRemoved(1..2)]
        );
    }

    #[test]
    fn remove_at_out_of_bounds() {
        let (_, cache) = cache_with(&["Gin"]);
        let err = cache.remove_at(4).unwrap_err();
        assert!(matches!(err, CacheError::IndexOutOfBounds { index: 4, len: 1 }));
    }

    #[test]
    fn remove_unsaved_touches_memory_only() {
        let (gateway, cache) = cache_with(&["Gin"]);
        let draft = Ingredient::new("Draft");
        cache.add(draft.clone());
        let hits = Arc::new(Mutex::new(0));
        let counter = Arc::clone(&hits);
        gateway.subscribe(move |_| *counter.lock().unwrap() += 1);

        assert_eq!(cache.remove(&draft).unwrap(), Some(0));
        assert_eq!(names(&cache), vec!["Gin"]);
        assert_eq!(*hits.lock().unwrap(), 0);
    }

    // -----------------------------------------------------------------------
    // Broadcast and lifetime
    // -----------------------------------------------------------------------

    #[test]
    fn sibling_cache_sees_other_writes() {
        let (gateway, first) = cache_with(&[]);
        let second = EntityCache::<Ingredient>::load(Arc::clone(&gateway)).unwrap();

        first.create_empty().unwrap();
        assert_eq!(second.len(), 1);
    }

    #[test]
    fn dropped_cache_unsubscribes() {
        let (gateway, cache) = cache_with(&[]);
        assert_eq!(gateway.subscriber_count(), 1);
        drop(cache);
        assert_eq!(gateway.subscriber_count(), 0);
        gateway.upsert(&Ingredient::new("Gin")).unwrap();
    }

    #[test]
    fn listener_reads_sorted_state() {
        let (_, cache) = cache_with(&["Tonic"]);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let weak = Arc::downgrade(&cache);
        cache.subscribe(move |_| {
            if let Some(cache) = weak.upgrade() {
                *sink.lock().unwrap() = names(&cache);
            }
        });

        cache.create_empty().unwrap();
        assert_eq!(*seen.lock().unwrap(), vec!["New Ingredient", "Tonic"]);
    }
}
