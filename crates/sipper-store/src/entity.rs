use std::fmt::Debug;

use sipper_types::{EntityId, EntityKind, Ingredient, Listed, Recipe};

use crate::backend::CatalogBackend;
use crate::error::StoreResult;

/// Name given to an ingredient created from nothing.
pub const NEW_INGREDIENT_NAME: &str = "New Ingredient";
/// Name given to a recipe created from nothing.
pub const NEW_RECIPE_NAME: &str = "New Recipe";

/// An entity kind the gateway knows how to persist.
///
/// Dispatches the generic gateway and cache operations to the matching
/// table-level calls on a [`CatalogBackend`].
pub trait StoredEntity: Listed + Clone + PartialEq + Debug + Send + Sync + 'static {
    const KIND: EntityKind;

    /// A fresh, unsaved entity with default field values.
    fn new_empty() -> Self;

    fn load_all(backend: &dyn CatalogBackend) -> StoreResult<Vec<Self>>;

    fn load_one(backend: &dyn CatalogBackend, id: EntityId) -> StoreResult<Option<Self>>;

    /// Insert or update; returns the identifier the row is stored under.
    fn store_into(&self, backend: &dyn CatalogBackend) -> StoreResult<EntityId>;

    fn delete_from(backend: &dyn CatalogBackend, id: EntityId) -> StoreResult<bool>;
}

impl StoredEntity for Ingredient {
    const KIND: EntityKind = EntityKind::Ingredient;

    fn new_empty() -> Self {
        Ingredient::new(NEW_INGREDIENT_NAME)
    }

    fn load_all(backend: &dyn CatalogBackend) -> StoreResult<Vec<Self>> {
        backend.list_ingredients()
    }

    fn load_one(backend: &dyn CatalogBackend, id: EntityId) -> StoreResult<Option<Self>> {
        backend.find_ingredient(id)
    }

    fn store_into(&self, backend: &dyn CatalogBackend) -> StoreResult<EntityId> {
        backend.upsert_ingredient(self)
    }

    fn delete_from(backend: &dyn CatalogBackend, id: EntityId) -> StoreResult<bool> {
        backend.delete_ingredient(id)
    }
}

impl StoredEntity for Recipe {
    const KIND: EntityKind = EntityKind::Recipe;

    fn new_empty() -> Self {
        Recipe::new(NEW_RECIPE_NAME)
    }

    fn load_all(backend: &dyn CatalogBackend) -> StoreResult<Vec<Self>> {
        backend.list_recipes()
    }

    fn load_one(backend: &dyn CatalogBackend, id: EntityId) -> StoreResult<Option<Self>> {
        backend.find_recipe(id)
    }

    fn store_into(&self, backend: &dyn CatalogBackend) -> StoreResult<EntityId> {
        backend.upsert_recipe(self)
    }

    fn delete_from(backend: &dyn CatalogBackend, id: EntityId) -> StoreResult<bool> {
        backend.delete_recipe(id)
    }
}
