//! SQLite catalog backend.
//!
//! Each call opens its own connection, runs its statements, and closes the
//! connection before returning. No handle is shared between calls.

use rusqlite::{params, Connection, OpenFlags};
use sipper_types::{EntityId, Ingredient, Listed, Recipe};
use tracing::{debug, info};

use crate::backend::{recipe_lines, AssociationRow, CatalogBackend};
use crate::config::CatalogConfig;
use crate::error::StoreResult;
use crate::rows;
use crate::schema::{self, ingredients, recipe_ingredients, recipes};

/// Catalog backend storing the three tables in one SQLite file.
#[derive(Debug)]
pub struct SqliteBackend {
    config: CatalogConfig,
}

impl SqliteBackend {
    /// Open the database described by `config`, creating the file and any
    /// missing tables when `create_schema` is set.
    pub fn open(config: CatalogConfig) -> StoreResult<Self> {
        let backend = Self { config };
        if backend.config.create_schema {
            if let Some(parent) = backend.config.database.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            backend.with_connection(|conn| {
                conn.execute_batch(schema::CREATE_TABLES)?;
                Ok(())
            })?;
            info!(database = %backend.config.database.display(), "catalog schema ready");
        }
        Ok(backend)
    }

    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    fn connect(&self) -> StoreResult<Connection> {
        let mut flags = OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        if self.config.create_schema {
            flags |= OpenFlags::SQLITE_OPEN_CREATE;
        }
        let conn = Connection::open_with_flags(&self.config.database, flags)?;
        conn.busy_timeout(self.config.busy_timeout())?;
        conn.pragma_update(None, "foreign_keys", self.config.foreign_keys)?;
        Ok(conn)
    }

    /// Acquire a connection, run `f`, release the connection.
    fn with_connection<T>(&self, f: impl FnOnce(&mut Connection) -> StoreResult<T>) -> StoreResult<T> {
        let mut conn = self.connect()?;
        let value = f(&mut conn)?;
        conn.close().map_err(|(_, e)| e)?;
        Ok(value)
    }

    fn delete_with_associations(
        &self,
        table: &str,
        id_column: &str,
        association_column: &str,
        id: EntityId,
    ) -> StoreResult<bool> {
        self.with_connection(|conn| {
            let tx = conn.transaction()?;
            let unlinked = tx.execute(
                &format!(
                    "DELETE FROM {} WHERE {association_column} = ?1",
                    recipe_ingredients::TABLE
                ),
                params![id.get()],
            )?;
            let deleted = tx.execute(
                &format!("DELETE FROM {table} WHERE {id_column} = ?1"),
                params![id.get()],
            )?;
            tx.commit()?;
            debug!(table, %id, deleted, unlinked, "row deleted");
            Ok(deleted > 0)
        })
    }
}

fn insert_ingredient_sql(with_id: bool) -> String {
    let columns = [
        ingredients::NAME,
        ingredients::CONTAINER_PRICE,
        ingredients::CONTAINER_SIZE_VALUE,
        ingredients::CONTAINER_SIZE_UNIT,
        ingredients::ALCOHOL_CONTENT,
        ingredients::STORE,
        ingredients::COMMENT,
    ];
    if !with_id {
        return format!(
            "INSERT INTO {} ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            ingredients::TABLE,
            columns.join(", ")
        );
    }
    let updates: Vec<String> = columns.iter().map(|c| format!("{c} = excluded.{c}")).collect();
    format!(
        "INSERT INTO {table} ({columns}, {id}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8) \
         ON CONFLICT({id}) DO UPDATE SET {updates}",
        table = ingredients::TABLE,
        columns = columns.join(", "),
        id = ingredients::ID,
        updates = updates.join(", "),
    )
}

fn insert_recipe_sql(with_id: bool) -> String {
    if !with_id {
        return format!(
            "INSERT INTO {} ({}, {}) VALUES (?1, ?2)",
            recipes::TABLE,
            recipes::NAME,
            recipes::INSTRUCTIONS
        );
    }
    format!(
        "INSERT INTO {table} ({name}, {instructions}, {id}) VALUES (?1, ?2, ?3) \
         ON CONFLICT({id}) DO UPDATE SET {name} = excluded.{name}, {instructions} = excluded.{instructions}",
        table = recipes::TABLE,
        name = recipes::NAME,
        instructions = recipes::INSTRUCTIONS,
        id = recipes::ID,
    )
}

impl CatalogBackend for SqliteBackend {
    fn list_ingredients(&self) -> StoreResult<Vec<Ingredient>> {
        self.with_connection(|conn| {
            let sql = format!("{} ORDER BY {}", rows::select_ingredients_sql(), ingredients::ID);
            let mut stmt = conn.prepare(&sql)?;
            let mut result = stmt.query([])?;
            let mut out = Vec::new();
            while let Some(row) = result.next()? {
                out.push(rows::ingredient_from_row(row)?);
            }
            Ok(out)
        })
    }

    fn find_ingredient(&self, id: EntityId) -> StoreResult<Option<Ingredient>> {
        self.with_connection(|conn| rows::find_ingredient(conn, id))
    }

    fn upsert_ingredient(&self, ingredient: &Ingredient) -> StoreResult<EntityId> {
        self.with_connection(|conn| {
            let size = &ingredient.container_size;
            let id = match ingredient.id() {
                None => {
                    conn.execute(
                        &insert_ingredient_sql(false),
                        params![
                            ingredient.name,
                            ingredient.container_price,
                            size.quantity(),
                            size.unit().as_str(),
                            ingredient.alcohol_content,
                            ingredient.store,
                            ingredient.comment,
                        ],
                    )?;
                    EntityId::new(conn.last_insert_rowid())
                }
                Some(id) => {
                    conn.execute(
                        &insert_ingredient_sql(true),
                        params![
                            ingredient.name,
                            ingredient.container_price,
                            size.quantity(),
                            size.unit().as_str(),
                            ingredient.alcohol_content,
                            ingredient.store,
                            ingredient.comment,
                            id.get(),
                        ],
                    )?;
                    id
                }
            };
            Ok(id)
        })
    }

    fn delete_ingredient(&self, id: EntityId) -> StoreResult<bool> {
        self.delete_with_associations(
            ingredients::TABLE,
            ingredients::ID,
            recipe_ingredients::INGREDIENT_ID,
            id,
        )
    }

    fn list_recipes(&self) -> StoreResult<Vec<Recipe>> {
        self.with_connection(|conn| {
            // One read transaction so the recipe rows, association rows, and
            // ingredient rows all come from the same snapshot.
            let tx = conn.transaction()?;
            let mut headers = Vec::new();
            {
                let sql = format!("{} ORDER BY {}", rows::select_recipes_sql(), recipes::ID);
                let mut stmt = tx.prepare(&sql)?;
                let mut result = stmt.query([])?;
                while let Some(row) = result.next()? {
                    headers.push(rows::recipe_header_from_row(row)?);
                }
            }
            let mut out = Vec::with_capacity(headers.len());
            for header in headers {
                out.push(rows::recipe_from_header(&tx, header)?);
            }
            tx.commit()?;
            Ok(out)
        })
    }

    fn find_recipe(&self, id: EntityId) -> StoreResult<Option<Recipe>> {
        self.with_connection(|conn| {
            let tx = conn.transaction()?;
            let recipe = match rows::find_recipe_header(&tx, id)? {
                Some(header) => Some(rows::recipe_from_header(&tx, header)?),
                None => None,
            };
            tx.commit()?;
            Ok(recipe)
        })
    }

    fn upsert_recipe(&self, recipe: &Recipe) -> StoreResult<EntityId> {
        let lines = recipe_lines(recipe)?;
        self.with_connection(|conn| {
            let tx = conn.transaction()?;
            let id = match recipe.id() {
                None => {
                    tx.execute(&insert_recipe_sql(false), params![recipe.name, recipe.instructions])?;
                    EntityId::new(tx.last_insert_rowid())
                }
                Some(id) => {
                    tx.execute(
                        &insert_recipe_sql(true),
                        params![recipe.name, recipe.instructions, id.get()],
                    )?;
                    id
                }
            };

            tx.execute(
                &format!(
                    "DELETE FROM {} WHERE {} = ?1",
                    recipe_ingredients::TABLE,
                    recipe_ingredients::RECIPE_ID
                ),
                params![id.get()],
            )?;
            {
                let mut insert = tx.prepare(&format!(
                    "INSERT INTO {} ({}, {}, {}, {}) VALUES (?1, ?2, ?3, ?4)",
                    recipe_ingredients::TABLE,
                    recipe_ingredients::RECIPE_ID,
                    recipe_ingredients::INGREDIENT_ID,
                    recipe_ingredients::AMOUNT_VALUE,
                    recipe_ingredients::AMOUNT_UNIT,
                ))?;
                for (ingredient_id, amount) in &lines {
                    insert.execute(params![
                        id.get(),
                        ingredient_id.get(),
                        amount.quantity(),
                        amount.unit().as_str(),
                    ])?;
                }
            }
            tx.commit()?;
            debug!(%id, lines = lines.len(), "recipe associations replaced");
            Ok(id)
        })
    }

    fn delete_recipe(&self, id: EntityId) -> StoreResult<bool> {
        self.delete_with_associations(
            recipes::TABLE,
            recipes::ID,
            recipe_ingredients::RECIPE_ID,
            id,
        )
    }

    fn association_rows(&self, recipe_id: EntityId) -> StoreResult<Vec<AssociationRow>> {
        self.with_connection(|conn| rows::association_rows(conn, recipe_id))
    }

    fn describe(&self) -> String {
        format!("sqlite:{}", self.config.database.display())
    }
}
