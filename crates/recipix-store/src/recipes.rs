//! CRUD operations for [`Recipe`] records.
//!
//! Creating a recipe writes to all three tables. The whole write happens in
//! one transaction: either the recipe row, every catalog entry it introduced
//! and every link row become visible together, or none of them do.

use chrono::{DateTime, Utc};
use recipix_shared::RecipeInput;
use rusqlite::{params, Connection};
use tracing::{debug, info};

use crate::database::Database;
use crate::error::{not_found, Result, StoreError};
use crate::ingredients::resolve_ingredient_id;
use crate::links::{ingredients_for_recipe, insert_link};
use crate::models::{Recipe, RecipeDetail};

const RECIPE_COLUMNS: &str =
    "id, title, preparation_time, servings, steps, image_path, rating, favorite, notes, created_at";

impl Database {
    // ------------------------------------------------------------------
    // Create
    // ------------------------------------------------------------------

    /// Persist a validated submission and return the new recipe id.
    ///
    /// The recipe row is written first so that every link row references an
    /// existing recipe. Ingredients are then resolved and linked one by one,
    /// in submission order. Any error rolls the transaction back.
    pub fn create_recipe(&mut self, input: &RecipeInput) -> Result<i64> {
        if input.ingredients.is_empty() {
            return Err(StoreError::Invalid(
                "a recipe needs at least one ingredient".to_string(),
            ));
        }
        if input.image_path.is_empty() {
            return Err(StoreError::Invalid("a recipe needs an image".to_string()));
        }

        let tx = self.conn_mut().transaction()?;

        let recipe_id = insert_recipe(&tx, input, Utc::now())?;
        for entry in &input.ingredients {
            let ingredient_id = resolve_ingredient_id(&tx, &entry.name)?;
            insert_link(&tx, recipe_id, ingredient_id, entry.quantity, &entry.unit)?;
            debug!(recipe_id, ingredient_id, ingredient = %entry.name, "linked ingredient");
        }

        tx.commit()?;

        info!(
            recipe_id,
            ingredients = input.ingredients.len(),
            "recipe created"
        );
        Ok(recipe_id)
    }

    // ------------------------------------------------------------------
    // Read
    // ------------------------------------------------------------------

    /// Fetch a single recipe row.
    pub fn get_recipe(&self, id: i64) -> Result<Recipe> {
        self.conn()
            .query_row(
                &format!("SELECT {RECIPE_COLUMNS} FROM recipes WHERE id = ?1"),
                params![id],
                row_to_recipe,
            )
            .map_err(not_found)
    }

    /// Fetch a recipe together with its ingredient lines.
    pub fn get_recipe_detail(&self, id: i64) -> Result<RecipeDetail> {
        let recipe = self.get_recipe(id)?;
        let ingredients = ingredients_for_recipe(self.conn(), id)?;
        Ok(RecipeDetail {
            recipe,
            ingredients,
        })
    }

    /// List all recipes (without ingredients), ordered by id.
    pub fn list_recipes(&self) -> Result<Vec<Recipe>> {
        let mut stmt = self
            .conn()
            .prepare(&format!("SELECT {RECIPE_COLUMNS} FROM recipes ORDER BY id ASC"))?;

        let rows = stmt.query_map([], row_to_recipe)?;

        let mut recipes = Vec::new();
        for row in rows {
            recipes.push(row?);
        }
        Ok(recipes)
    }

    // ------------------------------------------------------------------
    // Update
    // ------------------------------------------------------------------

    /// Overwrite rating and notes.  Returns `false` if the recipe does not
    /// exist.
    pub fn update_rating_and_notes(&self, id: i64, rating: u8, notes: Option<&str>) -> Result<bool> {
        let affected = self.conn().execute(
            "UPDATE recipes SET rating = ?1, notes = ?2 WHERE id = ?3",
            params![rating, notes, id],
        )?;
        Ok(affected > 0)
    }

    /// Set the favorite flag.  Returns `false` if the recipe does not exist.
    pub fn set_favorite(&self, id: i64, favorite: bool) -> Result<bool> {
        let affected = self.conn().execute(
            "UPDATE recipes SET favorite = ?1 WHERE id = ?2",
            params![favorite as i32, id],
        )?;
        Ok(affected > 0)
    }

    // ------------------------------------------------------------------
    // Delete
    // ------------------------------------------------------------------

    /// Delete a recipe and, by cascade, its link rows. Catalog entries are
    /// kept.  Returns `true` if a row was deleted.
    pub fn delete_recipe(&self, id: i64) -> Result<bool> {
        let affected = self
            .conn()
            .execute("DELETE FROM recipes WHERE id = ?1", params![id])?;
        Ok(affected > 0)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn insert_recipe(conn: &Connection, input: &RecipeInput, created_at: DateTime<Utc>) -> Result<i64> {
    conn.execute(
        "INSERT INTO recipes (title, preparation_time, servings, steps, image_path, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            input.title,
            input.preparation_time,
            input.servings,
            input.steps,
            input.image_path,
            created_at.to_rfc3339(),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Map a `rusqlite::Row` selected with [`RECIPE_COLUMNS`] to a [`Recipe`].
fn row_to_recipe(row: &rusqlite::Row<'_>) -> rusqlite::Result<Recipe> {
    let favorite_int: i32 = row.get(7)?;
    let created_str: String = row.get(9)?;

    let created_at: DateTime<Utc> = DateTime::parse_from_rfc3339(&created_str)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(9, rusqlite::types::Type::Text, Box::new(e)))?;

    Ok(Recipe {
        id: row.get(0)?,
        title: row.get(1)?,
        preparation_time: row.get(2)?,
        servings: row.get(3)?,
        steps: row.get(4)?,
        image_path: row.get(5)?,
        rating: row.get(6)?,
        favorite: favorite_int != 0,
        notes: row.get(8)?,
        created_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RecipeIngredient;
    use recipix_shared::IngredientEntry;

    fn test_db() -> (Database, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open_at(&dir.path().join("test.db")).unwrap();
        (db, dir)
    }

    fn input(title: &str, lines: &[(&str, f64, &str)]) -> RecipeInput {
        RecipeInput {
            title: title.to_string(),
            preparation_time: 30,
            servings: 4,
            steps: "Boil.".to_string(),
            image_path: format!("uploads/{title}.jpg"),
            ingredients: lines
                .iter()
                .map(|(name, quantity, unit)| IngredientEntry {
                    name: name.to_string(),
                    quantity: *quantity,
                    unit: unit.to_string(),
                })
                .collect(),
        }
    }

    fn assert_empty(db: &Database) {
        assert_eq!(db.count_rows("recipes"), 0);
        assert_eq!(db.count_rows("ingredients"), 0);
        assert_eq!(db.count_rows("recipe_ingredients"), 0);
    }

    #[test]
    fn create_then_get_detail() {
        let (mut db, _dir) = test_db();
        let id = db
            .create_recipe(&input("Soup", &[("Salt", 1.0, "tsp"), ("Water", 1.5, "l")]))
            .unwrap();

        let detail = db.get_recipe_detail(id).unwrap();
        assert_eq!(detail.recipe.title, "Soup");
        assert_eq!(detail.recipe.preparation_time, 30);
        assert_eq!(detail.recipe.servings, 4);
        assert_eq!(detail.recipe.image_path, "uploads/Soup.jpg");
        assert_eq!(detail.recipe.rating, None);
        assert!(!detail.recipe.favorite);
        assert_eq!(detail.recipe.notes, None);
        assert_eq!(
            detail.ingredients,
            vec![
                RecipeIngredient { name: "Salt".into(), quantity: 1.0, unit: "tsp".into() },
                RecipeIngredient { name: "Water".into(), quantity: 1.5, unit: "l".into() },
            ]
        );
    }

    #[test]
    fn links_keep_submission_order() {
        let (mut db, _dir) = test_db();
        db.create_ingredient("Zucchini").unwrap();
        let id = db
            .create_recipe(&input(
                "Stew",
                &[("Onion", 1.0, "pc"), ("Zucchini", 2.0, "pc"), ("Garlic", 3.0, "clove")],
            ))
            .unwrap();

        let names: Vec<_> = db
            .recipe_ingredients(id)
            .unwrap()
            .into_iter()
            .map(|line| line.name)
            .collect();
        assert_eq!(names, ["Onion", "Zucchini", "Garlic"]);
    }

    #[test]
    fn shared_ingredient_is_not_duplicated() {
        let (mut db, _dir) = test_db();
        let soup = db.create_recipe(&input("Soup", &[("Salt", 1.0, "tsp")])).unwrap();
        let bread = db
            .create_recipe(&input("Bread", &[("Flour", 500.0, "g"), ("Salt", 2.0, "g")]))
            .unwrap();

        assert_eq!(db.count_rows("ingredients"), 2);
        assert_eq!(db.count_rows("recipe_ingredients"), 3);
        assert_eq!(db.recipe_ingredients(soup).unwrap()[0].unit, "tsp");
        assert_eq!(db.recipe_ingredients(bread).unwrap()[1].unit, "g");
    }

    #[test]
    fn failed_link_rolls_back_everything() {
        let (mut db, _dir) = test_db();
        // The CHECK on quantity rejects the second link after the recipe row
        // and the first link are already written.
        let err = db
            .create_recipe(&input("Soup", &[("Salt", 1.0, "tsp"), ("Pepper", -1.0, "tsp")]))
            .unwrap_err();
        assert!(matches!(err, StoreError::Sqlite(_)), "got {err:?}");

        assert_empty(&db);
    }

    #[test]
    fn repeated_ingredient_rolls_back_everything() {
        let (mut db, _dir) = test_db();
        let err = db
            .create_recipe(&input("Soup", &[("Salt", 1.0, "tsp"), ("Salt", 2.0, "g")]))
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)), "got {err:?}");

        assert_empty(&db);
    }

    #[test]
    fn rollback_keeps_existing_catalog() {
        let (mut db, _dir) = test_db();
        db.create_ingredient("Salt").unwrap();

        assert!(db
            .create_recipe(&input("Soup", &[("Salt", 1.0, "tsp"), ("Leek", 0.0, "pc")]))
            .is_err());

        let names: Vec<_> = db.list_ingredients().unwrap().into_iter().map(|i| i.name).collect();
        assert_eq!(names, ["Salt"]);
        assert_eq!(db.count_rows("recipes"), 0);
    }

    #[test]
    fn recipe_without_ingredients_is_refused() {
        let (mut db, _dir) = test_db();
        let err = db.create_recipe(&input("Air", &[])).unwrap_err();
        assert!(matches!(err, StoreError::Invalid(_)));
        assert_empty(&db);
    }

    #[test]
    fn get_missing_recipe_is_not_found() {
        let (db, _dir) = test_db();
        assert!(matches!(db.get_recipe(7), Err(StoreError::NotFound)));
        assert!(matches!(db.get_recipe_detail(7), Err(StoreError::NotFound)));
    }

    #[test]
    fn list_is_summary_only() {
        let (mut db, _dir) = test_db();
        let first = db.create_recipe(&input("Soup", &[("Salt", 1.0, "tsp")])).unwrap();
        let second = db.create_recipe(&input("Tea", &[("Water", 0.3, "l")])).unwrap();

        let ids: Vec<_> = db.list_recipes().unwrap().into_iter().map(|r| r.id).collect();
        assert_eq!(ids, [first, second]);
    }

    #[test]
    fn rating_and_notes_update() {
        let (mut db, _dir) = test_db();
        let id = db.create_recipe(&input("Soup", &[("Salt", 1.0, "tsp")])).unwrap();

        assert!(db.update_rating_and_notes(id, 3, Some("tasty")).unwrap());
        let recipe = db.get_recipe(id).unwrap();
        assert_eq!(recipe.rating, Some(3));
        assert_eq!(recipe.notes.as_deref(), Some("tasty"));

        assert!(db.update_rating_and_notes(id, 5, None).unwrap());
        let recipe = db.get_recipe(id).unwrap();
        assert_eq!(recipe.rating, Some(5));
        assert_eq!(recipe.notes, None);

        assert!(!db.update_rating_and_notes(id + 1, 3, None).unwrap());
    }

    #[test]
    fn rating_out_of_range_is_rejected_by_schema() {
        let (mut db, _dir) = test_db();
        let id = db.create_recipe(&input("Soup", &[("Salt", 1.0, "tsp")])).unwrap();
        assert!(db.update_rating_and_notes(id, 6, None).is_err());
        assert_eq!(db.get_recipe(id).unwrap().rating, None);
    }

    #[test]
    fn favorite_toggle() {
        let (mut db, _dir) = test_db();
        let id = db.create_recipe(&input("Soup", &[("Salt", 1.0, "tsp")])).unwrap();

        assert!(db.set_favorite(id, true).unwrap());
        assert!(db.get_recipe(id).unwrap().favorite);
        assert!(db.set_favorite(id, false).unwrap());
        assert!(!db.get_recipe(id).unwrap().favorite);

        assert!(!db.set_favorite(id + 1, true).unwrap());
    }

    #[test]
    fn delete_cascades_links_but_keeps_catalog() {
        let (mut db, _dir) = test_db();
        let id = db
            .create_recipe(&input("Soup", &[("Salt", 1.0, "tsp"), ("Water", 1.0, "l")]))
            .unwrap();

        assert!(db.delete_recipe(id).unwrap());
        assert!(!db.delete_recipe(id).unwrap());
        assert_eq!(db.count_rows("recipes"), 0);
        assert_eq!(db.count_rows("recipe_ingredients"), 0);
        assert_eq!(db.count_rows("ingredients"), 2);
    }

    #[test]
    fn linked_ingredient_cannot_be_deleted() {
        let (mut db, _dir) = test_db();
        let recipe = db.create_recipe(&input("Soup", &[("Salt", 1.0, "tsp")])).unwrap();
        let salt = db.resolve_ingredient("Salt").unwrap();

        assert!(matches!(db.delete_ingredient(salt), Err(StoreError::InUse(1))));

        db.delete_recipe(recipe).unwrap();
        assert!(db.delete_ingredient(salt).unwrap());
    }
}
