//! Table and column names of the catalog database.
//!
//! Every query in this crate is assembled from these constants and reads
//! columns by name, never by position.

/// The `ingredients` table.
pub mod ingredients {
    pub const TABLE: &str = "ingredients";
    pub const ID: &str = "id";
    pub const NAME: &str = "name";
    pub const CONTAINER_PRICE: &str = "containerPrice";
    pub const CONTAINER_SIZE_VALUE: &str = "containerSizeValue";
    pub const CONTAINER_SIZE_UNIT: &str = "containerSizeUnit";
    pub const ALCOHOL_CONTENT: &str = "alcoholContent";
    pub const STORE: &str = "store";
    pub const COMMENT: &str = "comment";
}

/// The `recipes` table.
pub mod recipes {
    pub const TABLE: &str = "recipes";
    pub const ID: &str = "id";
    pub const NAME: &str = "name";
    pub const INSTRUCTIONS: &str = "instructions";
}

/// The recipe ↔ ingredient association table.
pub mod recipe_ingredients {
    pub const TABLE: &str = "recipeIngredients";
    pub const RECIPE_ID: &str = "recipeId";
    pub const INGREDIENT_ID: &str = "ingredientId";
    pub const AMOUNT_VALUE: &str = "amountValue";
    pub const AMOUNT_UNIT: &str = "amountUnit";
}

/// DDL creating any missing catalog table.
///
/// `AUTOINCREMENT` keeps SQLite from reusing the identifier of a deleted
/// row.
pub const CREATE_TABLES: &str = r#"
CREATE TABLE IF NOT EXISTS ingredients (
    id                 INTEGER PRIMARY KEY AUTOINCREMENT,
    name               TEXT    NOT NULL,
    containerPrice     REAL    NOT NULL DEFAULT 0,
    containerSizeValue REAL    NOT NULL DEFAULT 0,
    containerSizeUnit  TEXT    NOT NULL DEFAULT 'ML',
    alcoholContent     REAL    NOT NULL DEFAULT 0,
    store              TEXT    NOT NULL DEFAULT '',
    comment            TEXT    NOT NULL DEFAULT ''
);

CREATE TABLE IF NOT EXISTS recipes (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    name         TEXT NOT NULL,
    instructions TEXT NOT NULL DEFAULT ''
);

CREATE TABLE IF NOT EXISTS recipeIngredients (
    recipeId     INTEGER NOT NULL REFERENCES recipes(id) ON DELETE CASCADE,
    ingredientId INTEGER NOT NULL REFERENCES ingredients(id) ON DELETE CASCADE,
    amountValue  REAL    NOT NULL,
    amountUnit   TEXT    NOT NULL,
    UNIQUE (recipeId, ingredientId)
);

CREATE INDEX IF NOT EXISTS recipeIngredients_ingredient
    ON recipeIngredients (ingredientId);
"#;
