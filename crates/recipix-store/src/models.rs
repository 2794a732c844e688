//! Domain model structs persisted in the SQLite database.
//!
//! Every struct derives `Serialize` so it can be returned by the HTTP layer
//! as-is; field names follow the camelCase wire format.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Recipe
// ---------------------------------------------------------------------------

/// A recipe row, without its ingredients.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub id: i64,
    pub title: String,
    /// Minutes, 1..=1000.
    pub preparation_time: u32,
    pub servings: u32,
    /// Free-text instructions.
    pub steps: String,
    /// Reference handed out by the image store, e.g. `uploads/<uuid>.jpg`.
    pub image_path: String,
    /// `None` until the recipe is rated.
    pub rating: Option<u8>,
    pub favorite: bool,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A recipe together with its ingredient list, in submission order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecipeDetail {
    #[serde(flatten)]
    pub recipe: Recipe,
    pub ingredients: Vec<RecipeIngredient>,
}

// ---------------------------------------------------------------------------
// Ingredient catalog
// ---------------------------------------------------------------------------

/// A catalog entry. Names are unique across the catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Ingredient {
    pub id: i64,
    pub name: String,
}

// ---------------------------------------------------------------------------
// Recipe <-> ingredient link
// ---------------------------------------------------------------------------

/// One ingredient line of a recipe, joined with its catalog name.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecipeIngredient {
    pub name: String,
    pub quantity: f64,
    pub unit: String,
}
