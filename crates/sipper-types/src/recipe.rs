use serde::{Deserialize, Serialize};

use crate::amount::Amount;
use crate::error::TypeError;
use crate::id::EntityId;
use crate::ingredient::Ingredient;
use crate::listed::{natural_order, Listed};
use crate::unit::Unit;

/// Unit in which recipe prices are computed.
const PRICE_REFERENCE_UNIT: Unit = Unit::CL;

/// One line of a recipe: an ingredient and how much of it goes in.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RecipeIngredient {
    pub ingredient: Ingredient,
    pub amount: Amount,
}

impl RecipeIngredient {
    /// Cost of this line at the ingredient's current container price.
    pub fn price(&self) -> f64 {
        self.ingredient.unit_price(PRICE_REFERENCE_UNIT) * self.amount.to_unit(PRICE_REFERENCE_UNIT)
    }
}

/// Ingredient → amount map of a recipe.
///
/// Keyed by ingredient identity (at most one line per ingredient) and
/// iterated in the ingredients' natural order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<RecipeIngredient>", into = "Vec<RecipeIngredient>")]
pub struct RecipeIngredients {
    entries: Vec<RecipeIngredient>,
}

/// Two ingredient values denote the same catalog ingredient.
fn same_identity(a: &Ingredient, b: &Ingredient) -> bool {
    match (a.id(), b.id()) {
        (Some(x), Some(y)) => x == y,
        (None, None) => a.name.to_lowercase() == b.name.to_lowercase(),
        _ => false,
    }
}

impl RecipeIngredients {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Set the amount of `ingredient`, replacing any previous line for the
    /// same ingredient. Returns the amount that line had before.
    pub fn insert(&mut self, ingredient: Ingredient, amount: Amount) -> Option<Amount> {
        let previous = self
            .entries
            .iter()
            .position(|entry| same_identity(&entry.ingredient, &ingredient))
            .map(|index| self.entries.remove(index).amount);

        let at = self
            .entries
            .partition_point(|entry| natural_order(&entry.ingredient, &ingredient).is_lt());
        self.entries.insert(at, RecipeIngredient { ingredient, amount });
        previous
    }

    /// Remove the line for the ingredient with `id`.
    pub fn remove(&mut self, id: EntityId) -> Option<RecipeIngredient> {
        let index = self
            .entries
            .iter()
            .position(|entry| entry.ingredient.id() == Some(id))?;
        Some(self.entries.remove(index))
    }

    /// Amount of the ingredient with `id`, if it is part of the recipe.
    pub fn get(&self, id: EntityId) -> Option<&Amount> {
        self.entries
            .iter()
            .find(|entry| entry.ingredient.id() == Some(id))
            .map(|entry| &entry.amount)
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.get(id).is_some()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RecipeIngredient> {
        self.entries.iter()
    }

    /// Sum of every line's price, computed from the current contents.
    pub fn total_price(&self) -> f64 {
        self.entries.iter().map(RecipeIngredient::price).sum()
    }

    /// Combined volume of every line.
    pub fn total_volume(&self) -> Amount {
        let millilitres = self.entries.iter().map(|e| e.amount.millilitres()).sum();
        Amount::new(millilitres, Unit::ML)
    }
}

impl FromIterator<(Ingredient, Amount)> for RecipeIngredients {
    fn from_iter<I: IntoIterator<Item = (Ingredient, Amount)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (ingredient, amount) in iter {
            map.insert(ingredient, amount);
        }
        map
    }
}

impl From<Vec<RecipeIngredient>> for RecipeIngredients {
    fn from(entries: Vec<RecipeIngredient>) -> Self {
        entries
            .into_iter()
            .map(|entry| (entry.ingredient, entry.amount))
            .collect()
    }
}

impl From<RecipeIngredients> for Vec<RecipeIngredient> {
    fn from(map: RecipeIngredients) -> Self {
        map.entries
    }
}

impl<'a> IntoIterator for &'a RecipeIngredients {
    type Item = &'a RecipeIngredient;
    type IntoIter = std::slice::Iter<'a, RecipeIngredient>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// A drink recipe.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    id: Option<EntityId>,
    pub name: String,
    pub instructions: String,
    pub ingredients: RecipeIngredients,
}

impl Recipe {
    /// A new, unsaved recipe with no ingredients.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            instructions: String::new(),
            ingredients: RecipeIngredients::new(),
        }
    }

    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = instructions.into();
        self
    }

    pub fn with_ingredient(mut self, ingredient: Ingredient, amount: Amount) -> Self {
        self.ingredients.insert(ingredient, amount);
        self
    }

    pub fn with_ingredients(mut self, ingredients: RecipeIngredients) -> Self {
        self.ingredients = ingredients;
        self
    }

    /// Attach the store-assigned identifier. Same rules as
    /// [`Ingredient::assign_id`].
    pub fn assign_id(mut self, id: EntityId) -> Result<Self, TypeError> {
        match self.id {
            Some(current) if current != id => Err(TypeError::IdentifierReassigned {
                current,
                requested: id,
            }),
            _ => {
                self.id = Some(id);
                Ok(self)
            }
        }
    }

    /// Price of one serving at current ingredient prices.
    pub fn price(&self) -> f64 {
        self.ingredients.total_price()
    }
}

impl Listed for Recipe {
    fn id(&self) -> Option<EntityId> {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn saved(name: &str, id: i64, ml: f64, price: f64) -> Ingredient {
        Ingredient::new(name)
            .with_container(Amount::new(ml, Unit::ML), price)
            .assign_id(EntityId::new(id))
            .unwrap()
    }

    fn gin() -> Ingredient {
        saved("Gin", 1, 700.0, 25.0)
    }

    fn tonic() -> Ingredient {
        saved("Tonic", 2, 1000.0, 2.0)
    }

    // -----------------------------------------------------------------------
    // Map semantics
    // -----------------------------------------------------------------------

    #[test]
    fn iterates_in_natural_order() {
        let map: RecipeIngredients = [
            (tonic(), Amount::new(15.0, Unit::CL)),
            (saved("lime juice", 3, 500.0, 4.0), Amount::new(1.0, Unit::CL)),
            (gin(), Amount::new(5.0, Unit::CL)),
        ]
        .into_iter()
        .collect();

        let names: Vec<&str> = map.iter().map(|e| e.ingredient.name.as_str()).collect();
        assert_eq!(names, vec!["Gin", "lime juice", "Tonic"]);
    }

    #[test]
    fn insert_replaces_same_ingredient() {
        let mut map = RecipeIngredients::new();
        assert!(map.insert(gin(), Amount::new(4.0, Unit::CL)).is_none());

        let renamed = saved("Dry Gin", 1, 700.0, 25.0);
        let previous = map.insert(renamed, Amount::new(6.0, Unit::CL));

        assert_eq!(previous, Some(Amount::new(4.0, Unit::CL)));
        assert_eq!(map.len(), 1);
        assert_eq!(map.iter().next().unwrap().ingredient.name, "Dry Gin");
        assert_eq!(map.get(EntityId::new(1)), Some(&Amount::new(60.0, Unit::ML)));
    }

    #[test]
    fn unsaved_ingredients_keyed_by_name() {
        let mut map = RecipeIngredients::new();
        map.insert(Ingredient::new("Soda"), Amount::new(1.0, Unit::DL));
        map.insert(Ingredient::new("soda"), Amount::new(2.0, Unit::DL));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn remove_by_id() {
        let mut map: RecipeIngredients = [
            (gin(), Amount::new(5.0, Unit::CL)),
            (tonic(), Amount::new(15.0, Unit::CL)),
        ]
        .into_iter()
        .collect();

        let removed = map.remove(EntityId::new(2)).unwrap();
        assert_eq!(removed.ingredient.name, "Tonic");
        assert!(!map.contains(EntityId::new(2)));
        assert!(map.remove(EntityId::new(2)).is_none());
        assert_eq!(map.len(), 1);
    }

    // -----------------------------------------------------------------------
    // Pricing
    // -----------------------------------------------------------------------

    #[test]
    fn gin_and_tonic_price() {
        let recipe = Recipe::new("Gin & Tonic")
            .with_ingredient(gin(), Amount::new(5.0, Unit::CL))
            .with_ingredient(tonic(), Amount::new(15.0, Unit::CL));

        let expected = gin().unit_price(Unit::CL) * 5.0 + tonic().unit_price(Unit::CL) * 15.0;
        assert!((recipe.price() - expected).abs() < 1e-12);
        assert!((recipe.price() - (25.0 / 70.0 * 5.0 + 0.02 * 15.0)).abs() < 1e-9);
    }

    #[test]
    fn price_tracks_current_contents() {
        let mut recipe = Recipe::new("Gin & Tonic")
            .with_ingredient(gin(), Amount::new(5.0, Unit::CL))
            .with_ingredient(tonic(), Amount::new(15.0, Unit::CL));
        let before = recipe.price();

        recipe.ingredients.remove(EntityId::new(2));
        let after = recipe.price();

        assert!(after < before);
        assert!((after - gin().unit_price(Unit::CL) * 5.0).abs() < 1e-12);
    }

    #[test]
    fn empty_recipe_costs_nothing() {
        let recipe = Recipe::new("Water");
        assert_eq!(recipe.price(), 0.0);
        assert!(recipe.ingredients.total_volume().is_zero());
    }

    #[test]
    fn total_volume_sums_canonically() {
        let recipe = Recipe::new("Gin & Tonic")
            .with_ingredient(gin(), Amount::new(5.0, Unit::CL))
            .with_ingredient(tonic(), Amount::new(15.0, Unit::CL));
        assert_eq!(recipe.ingredients.total_volume(), Amount::new(2.0, Unit::DL));
    }

    // -----------------------------------------------------------------------
    // Serialization
    // -----------------------------------------------------------------------

    #[test]
    fn json_roundtrip_restores_order() {
        let recipe = Recipe::new("Gin & Tonic")
            .with_instructions("Build over ice.")
            .with_ingredient(tonic(), Amount::new(15.0, Unit::CL))
            .with_ingredient(gin(), Amount::new(5.0, Unit::CL))
            .assign_id(EntityId::new(10))
            .unwrap();

        let json = serde_json::to_string(&recipe).unwrap();
        let back: Recipe = serde_json::from_str(&json).unwrap();
        assert_eq!(back, recipe);
        assert_eq!(back.id(), Some(EntityId::new(10)));
    }
}
