//! In-memory catalog backend for tests and embedding.
//!
//! [`InMemoryBackend`] keeps the three tables in maps behind a `RwLock`
//! and follows the same rules as the SQLite backend: identifiers are never
//! reused, recipe saves replace association rows atomically, and recipe
//! reads fail on dangling references.

use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use sipper_types::{EntityId, Ingredient, Listed, Recipe, RecipeIngredients};

use crate::backend::{recipe_lines, AssociationRow, CatalogBackend};
use crate::error::{StoreError, StoreResult};

#[derive(Debug, Clone)]
struct RecipeRow {
    name: String,
    instructions: String,
}

#[derive(Debug, Default)]
struct Tables {
    ingredients: BTreeMap<EntityId, Ingredient>,
    recipes: BTreeMap<EntityId, RecipeRow>,
    associations: Vec<AssociationRow>,
    last_ingredient_id: i64,
    last_recipe_id: i64,
}

impl Tables {
    fn resolve(&self, id: EntityId, row: &RecipeRow) -> StoreResult<Recipe> {
        let mut map = RecipeIngredients::new();
        for line in self.associations.iter().filter(|a| a.recipe_id == id) {
            let ingredient = self
                .ingredients
                .get(&line.ingredient_id)
                .ok_or(StoreError::DanglingReference {
                    recipe: id,
                    ingredient: line.ingredient_id,
                })?;
            map.insert(ingredient.clone(), line.amount);
        }
        let recipe = Recipe::new(row.name.clone())
            .with_instructions(row.instructions.clone())
            .with_ingredients(map)
            .assign_id(id)?;
        Ok(recipe)
    }
}

/// An in-memory implementation of [`CatalogBackend`].
///
/// Data is lost when the backend is dropped.
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    tables: RwLock<Tables>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, Tables>> {
        self.tables.read().map_err(|_| StoreError::LockPoisoned)
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, Tables>> {
        self.tables.write().map_err(|_| StoreError::LockPoisoned)
    }

    /// Insert a raw association row without any referential checks, the way
    /// a foreign tool writing the table directly could.
    pub fn insert_association_row(&self, row: AssociationRow) -> StoreResult<()> {
        self.write()?.associations.push(row);
        Ok(())
    }

    /// Total number of association rows across all recipes.
    pub fn association_count(&self) -> StoreResult<usize> {
        Ok(self.read()?.associations.len())
    }
}

impl CatalogBackend for InMemoryBackend {
    fn list_ingredients(&self) -> StoreResult<Vec<Ingredient>> {
        Ok(self.read()?.ingredients.values().cloned().collect())
    }

    fn find_ingredient(&self, id: EntityId) -> StoreResult<Option<Ingredient>> {
        Ok(self.read()?.ingredients.get(&id).cloned())
    }

    fn upsert_ingredient(&self, ingredient: &Ingredient) -> StoreResult<EntityId> {
        let mut tables = self.write()?;
        let id = match ingredient.id() {
            Some(id) => id,
            None => EntityId::new(tables.last_ingredient_id + 1),
        };
        tables.last_ingredient_id = tables.last_ingredient_id.max(id.get());
        let stored = ingredient.clone().assign_id(id)?;
        tables.ingredients.insert(id, stored);
        Ok(id)
    }

    fn delete_ingredient(&self, id: EntityId) -> StoreResult<bool> {
        let mut tables = self.write()?;
        tables.associations.retain(|a| a.ingredient_id != id);
        Ok(tables.ingredients.remove(&id).is_some())
    }

    fn list_recipes(&self) -> StoreResult<Vec<Recipe>> {
        let tables = self.read()?;
        let recipes = tables
            .recipes
            .iter()
            .map(|(id, row)| tables.resolve(*id, row))
            .collect();
        recipes
    }

    fn find_recipe(&self, id: EntityId) -> StoreResult<Option<Recipe>> {
        let tables = self.read()?;
        let recipe = tables
            .recipes
            .get(&id)
            .map(|row| tables.resolve(id, row))
            .transpose();
        recipe
    }

    fn upsert_recipe(&self, recipe: &Recipe) -> StoreResult<EntityId> {
        let lines = recipe_lines(recipe)?;
        let mut tables = self.write()?;
        let id = match recipe.id() {
            Some(id) => id,
            None => EntityId::new(tables.last_recipe_id + 1),
        };

        // Check every reference before touching anything.
        if let Some((missing, _)) = lines
            .iter()
            .find(|(ingredient_id, _)| !tables.ingredients.contains_key(ingredient_id))
        {
            return Err(StoreError::DanglingReference {
                recipe: id,
                ingredient: *missing,
            });
        }

        tables.last_recipe_id = tables.last_recipe_id.max(id.get());
        tables.recipes.insert(
            id,
            RecipeRow {
                name: recipe.name.clone(),
                instructions: recipe.instructions.clone(),
            },
        );
        tables.associations.retain(|a| a.recipe_id != id);
        tables
            .associations
            .extend(lines.into_iter().map(|(ingredient_id, amount)| AssociationRow {
                recipe_id: id,
                ingredient_id,
                amount,
            }));
        Ok(id)
    }

    fn delete_recipe(&self, id: EntityId) -> StoreResult<bool> {
        let mut tables = self.write()?;
        tables.associations.retain(|a| a.recipe_id != id);
        Ok(tables.recipes.remove(&id).is_some())
    }

    fn association_rows(&self, recipe_id: EntityId) -> StoreResult<Vec<AssociationRow>> {
        Ok(self
            .read()?
            .associations
            .iter()
            .filter(|a| a.recipe_id == recipe_id)
            .cloned()
            .collect())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}
