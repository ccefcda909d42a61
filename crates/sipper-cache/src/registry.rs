use std::sync::Arc;

use sipper_store::{CatalogBackend, CatalogConfig, Gateway, StoredEntity};
use sipper_types::{Ingredient, Recipe};
use tracing::info;

use crate::cache::EntityCache;
use crate::error::{CacheError, CacheResult};

/// The catalog context: one gateway and one cache per entity kind.
///
/// Construct it once at process start and hand references to every
/// consumer that needs catalog access.
#[derive(Debug)]
pub struct Catalog {
    gateway: Arc<Gateway>,
    ingredients: Arc<EntityCache<Ingredient>>,
    recipes: Arc<EntityCache<Recipe>>,
}

impl Catalog {
    /// Open the SQLite catalog described by `config` and load both caches.
    pub fn open(config: CatalogConfig) -> CacheResult<Self> {
        let gateway = Gateway::open_sqlite(config).map_err(CacheError::Open)?;
        Self::with_gateway(gateway)
    }

    pub fn with_backend(backend: impl CatalogBackend + 'static) -> CacheResult<Self> {
        Self::with_gateway(Gateway::new(backend))
    }

    pub fn in_memory() -> CacheResult<Self> {
        Self::with_gateway(Gateway::in_memory())
    }

    pub fn with_gateway(gateway: Gateway) -> CacheResult<Self> {
        let gateway = Arc::new(gateway);
        let ingredients = EntityCache::load(Arc::clone(&gateway))?;
        let recipes = EntityCache::load(Arc::clone(&gateway))?;
        info!(
            store = %gateway.describe(),
            ingredients = ingredients.len(),
            recipes = recipes.len(),
            "catalog ready"
        );
        Ok(Self {
            gateway,
            ingredients,
            recipes,
        })
    }

    pub fn gateway(&self) -> &Arc<Gateway> {
        &self.gateway
    }

    pub fn ingredients(&self) -> &EntityCache<Ingredient> {
        &self.ingredients
    }

    pub fn recipes(&self) -> &EntityCache<Recipe> {
        &self.recipes
    }

    /// The cache for entity kind `T`.
    pub fn cache<T: Cached>(&self) -> &EntityCache<T> {
        T::cache_in(self)
    }
}

/// An entity kind that has a cache in the [`Catalog`].
pub trait Cached: StoredEntity {
    fn cache_in(catalog: &Catalog) -> &EntityCache<Self>;
}

impl Cached for Ingredient {
    fn cache_in(catalog: &Catalog) -> &EntityCache<Self> {
        catalog.ingredients()
    }
}

impl Cached for Recipe {
    fn cache_in(catalog: &Catalog) -> &EntityCache<Self> {
        catalog.recipes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sipper_types::EntityKind;

    #[test]
    fn one_cache_per_kind() {
        let catalog = Catalog::in_memory().unwrap();
        assert_eq!(catalog.cache::<Ingredient>().kind(), EntityKind::Ingredient);
        assert_eq!(catalog.cache::<Recipe>().kind(), EntityKind::Recipe);
        assert_eq!(catalog.gateway().subscriber_count(), 2);
    }

    #[test]
    fn open_sqlite_catalog() {
        let dir = tempfile::tempdir().unwrap();
        let config = CatalogConfig::at(dir.path().join("catalog.db"));
        let catalog = Catalog::open(config.clone()).unwrap();
        catalog.ingredients().create_empty().unwrap();
        drop(catalog);

        let reopened = Catalog::open(config).unwrap();
        assert_eq!(reopened.ingredients().len(), 1);
    }

    #[test]
    fn open_missing_without_schema_fails_initial_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = CatalogConfig::at(dir.path().join("absent.db"));
        config.create_schema = false;
        let err = Catalog::open(config).unwrap_err();
        assert!(matches!(err, CacheError::Store { operation: "load", .. }), "{err}");
    }

    #[test]
    fn unwritable_location_is_open_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, b"not a directory").unwrap();
        let err = Catalog::open(CatalogConfig::at(blocker.join("catalog.db"))).unwrap_err();
        assert!(matches!(err, CacheError::Open(_)), "{err}");
    }
}
