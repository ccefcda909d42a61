//! Row mapping: SQLite rows → typed entities.
//!
//! Columns are read by name. Legacy rows with NULL numbers read as zero and
//! NULL text as the empty string; a missing or unknown unit is corrupt.

use rusqlite::{params, Connection, Row};
use sipper_types::{Amount, EntityId, Ingredient, Recipe, RecipeIngredients, Unit};

use crate::backend::AssociationRow;
use crate::error::{StoreError, StoreResult};
use crate::schema::{ingredients, recipe_ingredients, recipes};

fn real_or_zero(row: &Row<'_>, column: &str) -> StoreResult<f64> {
    Ok(row.get::<_, Option<f64>>(column)?.unwrap_or(0.0))
}

fn text_or_empty(row: &Row<'_>, column: &str) -> StoreResult<String> {
    Ok(row.get::<_, Option<String>>(column)?.unwrap_or_default())
}

fn unit_column(row: &Row<'_>, table: &'static str, column: &str) -> StoreResult<Unit> {
    let text: Option<String> = row.get(column)?;
    let text = text.ok_or_else(|| StoreError::Corrupt {
        table,
        reason: format!("{column} is NULL"),
    })?;
    text.parse().map_err(|e| StoreError::Corrupt {
        table,
        reason: format!("{column}: {e}"),
    })
}

fn id_column(row: &Row<'_>, column: &str) -> StoreResult<EntityId> {
    Ok(EntityId::new(row.get(column)?))
}

pub(crate) fn ingredient_from_row(row: &Row<'_>) -> StoreResult<Ingredient> {
    let id = id_column(row, ingredients::ID)?;
    let size = Amount::new(
        real_or_zero(row, ingredients::CONTAINER_SIZE_VALUE)?,
        unit_column(row, ingredients::TABLE, ingredients::CONTAINER_SIZE_UNIT)?,
    );

    let ingredient = Ingredient::new(text_or_empty(row, ingredients::NAME)?)
        .with_container(size, real_or_zero(row, ingredients::CONTAINER_PRICE)?)
        .with_alcohol_content(real_or_zero(row, ingredients::ALCOHOL_CONTENT)?)
        .with_store(text_or_empty(row, ingredients::STORE)?)
        .with_comment(text_or_empty(row, ingredients::COMMENT)?)
        .assign_id(id)?;
    Ok(ingredient)
}

/// The columns of a `recipes` row, before its ingredient map is resolved.
pub(crate) struct RecipeHeader {
    pub id: EntityId,
    pub name: String,
    pub instructions: String,
}

pub(crate) fn recipe_header_from_row(row: &Row<'_>) -> StoreResult<RecipeHeader> {
    Ok(RecipeHeader {
        id: id_column(row, recipes::ID)?,
        name: text_or_empty(row, recipes::NAME)?,
        instructions: text_or_empty(row, recipes::INSTRUCTIONS)?,
    })
}

pub(crate) fn association_from_row(row: &Row<'_>) -> StoreResult<AssociationRow> {
    Ok(AssociationRow {
        recipe_id: id_column(row, recipe_ingredients::RECIPE_ID)?,
        ingredient_id: id_column(row, recipe_ingredients::INGREDIENT_ID)?,
        amount: Amount::new(
            real_or_zero(row, recipe_ingredients::AMOUNT_VALUE)?,
            unit_column(row, recipe_ingredients::TABLE, recipe_ingredients::AMOUNT_UNIT)?,
        ),
    })
}

pub(crate) fn select_ingredients_sql() -> String {
    format!(
        "SELECT {id}, {name}, {price}, {size}, {unit}, {abv}, {store}, {comment} FROM {table}",
        id = ingredients::ID,
        name = ingredients::NAME,
        price = ingredients::CONTAINER_PRICE,
        size = ingredients::CONTAINER_SIZE_VALUE,
        unit = ingredients::CONTAINER_SIZE_UNIT,
        abv = ingredients::ALCOHOL_CONTENT,
        store = ingredients::STORE,
        comment = ingredients::COMMENT,
        table = ingredients::TABLE,
    )
}

pub(crate) fn select_recipes_sql() -> String {
    format!(
        "SELECT {id}, {name}, {instructions} FROM {table}",
        id = recipes::ID,
        name = recipes::NAME,
        instructions = recipes::INSTRUCTIONS,
        table = recipes::TABLE,
    )
}

/// Single-ingredient lookup on an open connection.
pub(crate) fn find_ingredient(conn: &Connection, id: EntityId) -> StoreResult<Option<Ingredient>> {
    let sql = format!("{} WHERE {} = ?1", select_ingredients_sql(), ingredients::ID);
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query(params![id.get()])?;
    let found = match rows.next()? {
        Some(row) => Some(ingredient_from_row(row)?),
        None => None,
    };
    Ok(found)
}

pub(crate) fn association_rows(conn: &Connection, recipe_id: EntityId) -> StoreResult<Vec<AssociationRow>> {
    let sql = format!(
        "SELECT {recipe}, {ingredient}, {value}, {unit} FROM {table} WHERE {recipe} = ?1 ORDER BY rowid",
        recipe = recipe_ingredients::RECIPE_ID,
        ingredient = recipe_ingredients::INGREDIENT_ID,
        value = recipe_ingredients::AMOUNT_VALUE,
        unit = recipe_ingredients::AMOUNT_UNIT,
        table = recipe_ingredients::TABLE,
    );
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query(params![recipe_id.get()])?;
    let mut out = Vec::new();
    while let Some(row) = rows.next()? {
        out.push(association_from_row(row)?);
    }
    Ok(out)
}

/// Complete a recipe header with its ingredient map.
///
/// Every association row must resolve to an existing ingredient; one that
/// does not fails the whole recipe.
pub(crate) fn recipe_from_header(conn: &Connection, header: RecipeHeader) -> StoreResult<Recipe> {
    let mut map = RecipeIngredients::new();
    for line in association_rows(conn, header.id)? {
        let ingredient = find_ingredient(conn, line.ingredient_id)?.ok_or(StoreError::DanglingReference {
            recipe: header.id,
            ingredient: line.ingredient_id,
        })?;
        map.insert(ingredient, line.amount);
    }

    let recipe = Recipe::new(header.name)
        .with_instructions(header.instructions)
        .with_ingredients(map)
        .assign_id(header.id)?;
    Ok(recipe)
}

/// One recipe row by id, without its ingredient map.
pub(crate) fn find_recipe_header(conn: &Connection, id: EntityId) -> StoreResult<Option<RecipeHeader>> {
    let sql = format!("{} WHERE {} = ?1", select_recipes_sql(), recipes::ID);
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query(params![id.get()])?;
    let found = match rows.next()? {
        Some(row) => Some(recipe_header_from_row(row)?),
        None => None,
    };
    Ok(found)
}
