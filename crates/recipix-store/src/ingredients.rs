//! The ingredient catalog: unique names with stable ids.
//!
//! The UNIQUE index on `ingredients.name` is the only authority on whether a
//! name exists. Lookups before an insert are an optimisation; an insert that
//! loses a race to another writer surfaces as [`StoreError::Conflict`] and
//! is resolved by reading the winner's row.

use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;

use crate::database::Database;
use crate::error::{is_foreign_key_violation, is_unique_violation, not_found, Result, StoreError};
use crate::links::count_links_for_ingredient;
use crate::models::Ingredient;

impl Database {
    // ------------------------------------------------------------------
    // Create
    // ------------------------------------------------------------------

    /// Add a new catalog entry. Fails with [`StoreError::Conflict`] if the
    /// name is already taken.
    pub fn create_ingredient(&self, name: &str) -> Result<i64> {
        let id = insert_ingredient(self.conn(), name)?;
        debug!(ingredient_id = id, ingredient = %name, "created ingredient");
        Ok(id)
    }

    /// Get-or-create: the id of the entry named `name`, inserting it first
    /// if needed.
    pub fn resolve_ingredient(&self, name: &str) -> Result<i64> {
        resolve_ingredient_id(self.conn(), name)
    }

    // ------------------------------------------------------------------
    // Read
    // ------------------------------------------------------------------

    pub fn get_ingredient(&self, id: i64) -> Result<Ingredient> {
        self.conn()
            .query_row(
                "SELECT id, name FROM ingredients WHERE id = ?1",
                params![id],
                row_to_ingredient,
            )
            .map_err(not_found)
    }

    /// List the whole catalog, ordered by id.
    pub fn list_ingredients(&self) -> Result<Vec<Ingredient>> {
        let mut stmt = self
            .conn()
            .prepare("SELECT id, name FROM ingredients ORDER BY id ASC")?;

        let rows = stmt.query_map([], row_to_ingredient)?;

        let mut ingredients = Vec::new();
        for row in rows {
            ingredients.push(row?);
        }
        Ok(ingredients)
    }

    // ------------------------------------------------------------------
    // Delete
    // ------------------------------------------------------------------

    /// Delete an unused catalog entry.  Returns `true` if a row was deleted.
    ///
    /// Entries still linked to a recipe are never removed; the call fails
    /// with [`StoreError::InUse`] instead.
    pub fn delete_ingredient(&self, id: i64) -> Result<bool> {
        let links = count_links_for_ingredient(self.conn(), id)?;
        if links > 0 {
            return Err(StoreError::InUse(links));
        }

        match self
            .conn()
            .execute("DELETE FROM ingredients WHERE id = ?1", params![id])
        {
            Ok(affected) => Ok(affected > 0),
            // A link was written between the count and the delete.
            Err(e) if is_foreign_key_violation(&e) => Err(StoreError::InUse(
                count_links_for_ingredient(self.conn(), id)?,
            )),
            Err(e) => Err(e.into()),
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers (usable inside a transaction)
// ---------------------------------------------------------------------------

pub(crate) fn find_ingredient_id(conn: &Connection, name: &str) -> Result<Option<i64>> {
    let id = conn
        .query_row(
            "SELECT id FROM ingredients WHERE name = ?1",
            params![name],
            |row| row.get(0),
        )
        .optional()?;
    Ok(id)
}

pub(crate) fn insert_ingredient(conn: &Connection, name: &str) -> Result<i64> {
    match conn.execute("INSERT INTO ingredients (name) VALUES (?1)", params![name]) {
        Ok(_) => Ok(conn.last_insert_rowid()),
        Err(e) if is_unique_violation(&e) => Err(StoreError::Conflict(format!(
            "ingredient '{name}' already exists"
        ))),
        Err(e) => Err(e.into()),
    }
}

pub(crate) fn resolve_ingredient_id(conn: &Connection, name: &str) -> Result<i64> {
    if let Some(id) = find_ingredient_id(conn, name)? {
        return Ok(id);
    }
    insert_or_reread(conn, name)
}

/// The slow path of [`resolve_ingredient_id`], taken after a lookup missed.
fn insert_or_reread(conn: &Connection, name: &str) -> Result<i64> {
    match insert_ingredient(conn, name) {
        Err(StoreError::Conflict(_)) => {
            debug!(ingredient = %name, "ingredient inserted concurrently, re-reading");
            find_ingredient_id(conn, name)?.ok_or(StoreError::NotFound)
        }
        other => other,
    }
}

fn row_to_ingredient(row: &rusqlite::Row<'_>) -> rusqlite::Result<Ingredient> {
    Ok(Ingredient {
        id: row.get(0)?,
        name: row.get(1)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_db() -> (Database, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open_at(&dir.path().join("test.db")).unwrap();
        (db, dir)
    }

    #[test]
    fn create_and_list() {
        let (db, _dir) = test_db();
        let salt = db.create_ingredient("Salt").unwrap();
        let pepper = db.create_ingredient("Pepper").unwrap();

        let all = db.list_ingredients().unwrap();
        assert_eq!(
            all,
            vec![
                Ingredient { id: salt, name: "Salt".into() },
                Ingredient { id: pepper, name: "Pepper".into() },
            ]
        );
        assert_eq!(db.get_ingredient(pepper).unwrap().name, "Pepper");
    }

    #[test]
    fn duplicate_create_is_conflict() {
        let (db, _dir) = test_db();
        db.create_ingredient("Pepper").unwrap();

        let err = db.create_ingredient("Pepper").unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)), "got {err:?}");
        assert_eq!(db.count_rows("ingredients"), 1);
    }

    #[test]
    fn names_match_exactly() {
        let (db, _dir) = test_db();
        let upper = db.resolve_ingredient("Salt").unwrap();
        let lower = db.resolve_ingredient("salt").unwrap();
        assert_ne!(upper, lower);
    }

    #[test]
    fn resolve_reuses_existing_entry() {
        let (db, _dir) = test_db();
        let created = db.create_ingredient("Flour").unwrap();

        assert_eq!(db.resolve_ingredient("Flour").unwrap(), created);
        assert_eq!(db.resolve_ingredient("Flour").unwrap(), created);
        assert_eq!(db.count_rows("ingredients"), 1);
    }

    #[test]
    fn lost_insert_race_rereads_row() {
        let (db, _dir) = test_db();
        // Another writer created the row after our lookup missed.
        let winner = db.create_ingredient("Basil").unwrap();

        let resolved = insert_or_reread(db.conn(), "Basil").unwrap();
        assert_eq!(resolved, winner);
        assert_eq!(db.count_rows("ingredients"), 1);
    }

    #[test]
    fn get_missing_is_not_found() {
        let (db, _dir) = test_db();
        assert!(matches!(db.get_ingredient(99), Err(StoreError::NotFound)));
    }

    #[test]
    fn delete_unused_entry() {
        let (db, _dir) = test_db();
        let id = db.create_ingredient("Thyme").unwrap();

        assert!(db.delete_ingredient(id).unwrap());
        assert!(!db.delete_ingredient(id).unwrap());
        assert!(db.list_ingredients().unwrap().is_empty());
    }
}
