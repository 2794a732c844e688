use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An unvalidated recipe submission.
///
/// Every field is kept as a raw JSON value so that the validation layer, not
/// the transport, decides what is acceptable. Multipart text fields arrive as
/// `Value::String`; JSON clients may send numbers and arrays directly.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawRecipe {
    pub title: Option<Value>,
    pub preparation_time: Option<Value>,
    pub servings: Option<Value>,
    pub steps: Option<Value>,
    pub ingredients: Option<Value>,
    /// Reference returned by the image store, set once the upload is stored.
    #[serde(skip)]
    pub image_path: Option<String>,
}

impl RawRecipe {
    /// Assign a form field by its wire name. Returns `false` for names that
    /// are not part of a recipe submission.
    pub fn set_field(&mut self, name: &str, value: Value) -> bool {
        let slot = match name {
            "title" => &mut self.title,
            "preparationTime" => &mut self.preparation_time,
            "servings" => &mut self.servings,
            "steps" => &mut self.steps,
            "ingredients" => &mut self.ingredients,
            _ => return false,
        };
        *slot = Some(value);
        true
    }
}

/// One ingredient line of a validated submission.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IngredientEntry {
    /// Trimmed catalog name.
    pub name: String,
    pub quantity: f64,
    /// Trimmed unit, e.g. `tsp`.
    pub unit: String,
}

/// A recipe submission that passed validation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RecipeInput {
    pub title: String,
    pub preparation_time: u32,
    pub servings: u32,
    pub steps: String,
    pub image_path: String,
    /// Non-empty, in submission order, names unique.
    pub ingredients: Vec<IngredientEntry>,
}

/// Validated payload of a rating update.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RatingUpdate {
    pub rating: u8,
    pub notes: Option<String>,
}
