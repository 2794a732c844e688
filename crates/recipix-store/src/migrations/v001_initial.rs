//! v001 -- Initial schema creation.
//!
//! Creates `recipes`, the `ingredients` catalog, and the
//! `recipe_ingredients` link table between them.

use rusqlite::Connection;

/// SQL executed when upgrading from version 0 to version 1.
const UP_SQL: &str = r#"
-- ----------------------------------------------------------------
-- Recipes
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS recipes (
    id               INTEGER PRIMARY KEY AUTOINCREMENT,
    title            TEXT NOT NULL,
    preparation_time INTEGER NOT NULL CHECK (preparation_time BETWEEN 1 AND 1000),
    servings         INTEGER NOT NULL CHECK (servings BETWEEN 1 AND 100),
    steps            TEXT NOT NULL,
    image_path       TEXT NOT NULL,
    rating           INTEGER CHECK (rating IS NULL OR rating BETWEEN 1 AND 5),
    favorite         INTEGER NOT NULL DEFAULT 0,   -- boolean 0/1
    notes            TEXT,
    created_at       TEXT NOT NULL                 -- RFC-3339
);

-- ----------------------------------------------------------------
-- Ingredient catalog
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS ingredients (
    id   INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE                      -- exact, case-sensitive
);

-- ----------------------------------------------------------------
-- Recipe <-> ingredient links
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS recipe_ingredients (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    recipe_id     INTEGER NOT NULL,
    ingredient_id INTEGER NOT NULL,
    quantity      REAL NOT NULL CHECK (quantity > 0),
    unit          TEXT NOT NULL,

    FOREIGN KEY (recipe_id) REFERENCES recipes(id) ON DELETE CASCADE,
    FOREIGN KEY (ingredient_id) REFERENCES ingredients(id) ON DELETE RESTRICT
);

CREATE UNIQUE INDEX IF NOT EXISTS idx_recipe_ingredients_pair
    ON recipe_ingredients(recipe_id, ingredient_id);

CREATE INDEX IF NOT EXISTS idx_recipe_ingredients_ingredient
    ON recipe_ingredients(ingredient_id);
"#;

/// Apply the initial migration.
pub fn up(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(UP_SQL)
}
