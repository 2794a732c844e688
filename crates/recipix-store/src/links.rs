//! Rows of `recipe_ingredients`, the many-to-many link between recipes and
//! the catalog.

use rusqlite::{params, Connection};

use crate::database::Database;
use crate::error::{is_unique_violation, Result, StoreError};
use crate::models::RecipeIngredient;

impl Database {
    /// Ingredient lines of a recipe in the order they were submitted.
    /// Empty for unknown recipe ids.
    pub fn recipe_ingredients(&self, recipe_id: i64) -> Result<Vec<RecipeIngredient>> {
        ingredients_for_recipe(self.conn(), recipe_id)
    }
}

pub(crate) fn insert_link(
    conn: &Connection,
    recipe_id: i64,
    ingredient_id: i64,
    quantity: f64,
    unit: &str,
) -> Result<i64> {
    let res = conn.execute(
        "INSERT INTO recipe_ingredients (recipe_id, ingredient_id, quantity, unit)
         VALUES (?1, ?2, ?3, ?4)",
        params![recipe_id, ingredient_id, quantity, unit],
    );
    match res {
        Ok(_) => Ok(conn.last_insert_rowid()),
        Err(e) if is_unique_violation(&e) => Err(StoreError::Conflict(format!(
            "recipe {recipe_id} already lists ingredient {ingredient_id}"
        ))),
        Err(e) => Err(e.into()),
    }
}

pub(crate) fn ingredients_for_recipe(
    conn: &Connection,
    recipe_id: i64,
) -> Result<Vec<RecipeIngredient>> {
    let mut stmt = conn.prepare(
        "SELECT i.name, ri.quantity, ri.unit
         FROM recipe_ingredients ri
         JOIN ingredients i ON ri.ingredient_id = i.id
         WHERE ri.recipe_id = ?1
         ORDER BY ri.id ASC",
    )?;

    let rows = stmt.query_map(params![recipe_id], |row| {
        Ok(RecipeIngredient {
            name: row.get(0)?,
            quantity: row.get(1)?,
            unit: row.get(2)?,
        })
    })?;

    let mut lines = Vec::new();
    for row in rows {
        lines.push(row?);
    }
    Ok(lines)
}

pub(crate) fn count_links_for_ingredient(conn: &Connection, ingredient_id: i64) -> Result<usize> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM recipe_ingredients WHERE ingredient_id = ?1",
        params![ingredient_id],
        |row| row.get(0),
    )?;
    Ok(count as usize)
}
