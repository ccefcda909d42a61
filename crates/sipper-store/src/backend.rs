use sipper_types::{Amount, EntityId, Ingredient, Listed, Recipe};

use crate::error::{StoreError, StoreResult};

/// One row of the recipe ↔ ingredient association table.
#[derive(Clone, Debug, PartialEq)]
pub struct AssociationRow {
    pub recipe_id: EntityId,
    pub ingredient_id: EntityId,
    pub amount: Amount,
}

/// Table-level access to a catalog store.
///
/// Backends translate entity reads and writes into their own storage and
/// know nothing about caches or change notification; the
/// [`Gateway`](crate::Gateway) serializes calls and announces changes.
///
/// All implementations must satisfy these invariants:
/// - `upsert_*` with no identifier inserts and returns a fresh identifier
///   never handed out before; with an identifier it replaces the full row.
/// - `upsert_recipe` replaces the recipe's association rows as one unit of
///   work: afterwards they match the recipe's map exactly, or nothing changed.
/// - `delete_*` also removes association rows referencing the identifier.
/// - Composite reads fail with [`StoreError::DanglingReference`] instead of
///   dropping an association row whose ingredient is missing.
pub trait CatalogBackend: Send + Sync {
    /// Every ingredient, in identifier order.
    fn list_ingredients(&self) -> StoreResult<Vec<Ingredient>>;

    /// Returns `Ok(None)` if no ingredient has `id`.
    fn find_ingredient(&self, id: EntityId) -> StoreResult<Option<Ingredient>>;

    fn upsert_ingredient(&self, ingredient: &Ingredient) -> StoreResult<EntityId>;

    /// Returns `true` if a row was deleted.
    fn delete_ingredient(&self, id: EntityId) -> StoreResult<bool>;

    /// Every recipe with its full ingredient map, in identifier order.
    fn list_recipes(&self) -> StoreResult<Vec<Recipe>>;

    fn find_recipe(&self, id: EntityId) -> StoreResult<Option<Recipe>>;

    fn upsert_recipe(&self, recipe: &Recipe) -> StoreResult<EntityId>;

    fn delete_recipe(&self, id: EntityId) -> StoreResult<bool>;

    /// Raw association rows for `recipe_id`.
    fn association_rows(&self, recipe_id: EntityId) -> StoreResult<Vec<AssociationRow>>;

    /// Short description for logs ("sqlite:data/sipper.db").
    fn describe(&self) -> String;
}

/// The `(ingredient id, amount)` pairs a recipe save writes.
///
/// Fails before anything is written if an ingredient was never saved.
pub(crate) fn recipe_lines(recipe: &Recipe) -> StoreResult<Vec<(EntityId, Amount)>> {
    recipe
        .ingredients
        .iter()
        .map(|line| {
            line.ingredient
                .id()
                .map(|id| (id, line.amount))
                .ok_or_else(|| StoreError::UnsavedReference {
                    recipe: recipe.name.clone(),
                    ingredient: line.ingredient.name.clone(),
                })
        })
        .collect()
}
