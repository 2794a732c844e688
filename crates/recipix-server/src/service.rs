//! Recipe service: validation in front of the store.
//!
//! Every operation validates its input first and only then touches the
//! database, so a rejected request never writes anything. The store handle
//! is injected at construction and shared behind a mutex; SQLite calls run
//! on tokio's blocking pool.

use std::sync::{Arc, Mutex};

use recipix_shared::validation::{
    validate_favorite, validate_ingredient_name, validate_rating_update, validate_recipe,
};
use recipix_shared::RawRecipe;
use recipix_store::{Database, Ingredient, Recipe, RecipeDetail, StoreError};
use serde_json::Value;
use tracing::info;

use crate::error::ServerError;

const RECIPE_NOT_FOUND: &str = "Recipe not found";
const INGREDIENT_NOT_FOUND: &str = "Ingredient not found";
const INGREDIENT_NOT_UNIQUE: &str = "Ingredient name must be unique.";

#[derive(Clone)]
pub struct RecipeService {
    db: Arc<Mutex<Database>>,
}

impl RecipeService {
    pub fn new(db: Database) -> Self {
        Self {
            db: Arc::new(Mutex::new(db)),
        }
    }

    /// Validate and persist a submission. The image must already be stored
    /// and its reference set on `raw`.
    pub async fn create_recipe(&self, raw: RawRecipe) -> Result<i64, ServerError> {
        let input = validate_recipe(&raw)?;
        let title = input.title.clone();

        let recipe_id = self.with_db(move |db| db.create_recipe(&input)).await?;

        info!(recipe_id, title = %title, "Recipe added");
        Ok(recipe_id)
    }

    pub async fn get_recipe(&self, id: i64) -> Result<RecipeDetail, ServerError> {
        self.with_db(move |db| db.get_recipe_detail(id))
            .await
            .map_err(or_not_found(RECIPE_NOT_FOUND))
    }

    pub async fn list_recipes(&self) -> Result<Vec<Recipe>, ServerError> {
        self.with_db(|db| db.list_recipes()).await
    }

    pub async fn update_rating_and_notes(&self, id: i64, body: &Value) -> Result<(), ServerError> {
        let update = validate_rating_update(body)?;

        let updated = self
            .with_db(move |db| db.update_rating_and_notes(id, update.rating, update.notes.as_deref()))
            .await?;
        if !updated {
            return Err(ServerError::NotFound(RECIPE_NOT_FOUND.to_string()));
        }

        info!(recipe_id = id, "Recipe rated");
        Ok(())
    }

    pub async fn set_favorite(&self, id: i64, body: &Value) -> Result<(), ServerError> {
        let favorite = validate_favorite(body)?;

        let updated = self.with_db(move |db| db.set_favorite(id, favorite)).await?;
        if !updated {
            return Err(ServerError::NotFound(RECIPE_NOT_FOUND.to_string()));
        }

        info!(recipe_id = id, favorite, "Favorite status updated");
        Ok(())
    }

    /// Delete a recipe and return the row as it was, so the caller can clean
    /// up the image it references.
    pub async fn delete_recipe(&self, id: i64) -> Result<Recipe, ServerError> {
        let recipe = self
            .with_db(move |db| {
                let recipe = db.get_recipe(id)?;
                db.delete_recipe(id)?;
                Ok(recipe)
            })
            .await
            .map_err(or_not_found(RECIPE_NOT_FOUND))?;

        info!(recipe_id = id, "Recipe deleted");
        Ok(recipe)
    }

    pub async fn list_ingredients(&self) -> Result<Vec<Ingredient>, ServerError> {
        self.with_db(|db| db.list_ingredients()).await
    }

    pub async fn create_ingredient(&self, body: &Value) -> Result<i64, ServerError> {
        let name = validate_ingredient_name(body.get("name"))?;

        let ingredient_id = self
            .with_db({
                let name = name.clone();
                move |db| db.create_ingredient(&name)
            })
            .await
            .map_err(|err| match err {
                ServerError::Conflict(_) => ServerError::Conflict(INGREDIENT_NOT_UNIQUE.to_string()),
                other => other,
            })?;

        info!(ingredient_id, ingredient = %name, "Ingredient added");
        Ok(ingredient_id)
    }

    pub async fn delete_ingredient(&self, id: i64) -> Result<(), ServerError> {
        let deleted = self.with_db(move |db| db.delete_ingredient(id)).await?;
        if !deleted {
            return Err(ServerError::NotFound(INGREDIENT_NOT_FOUND.to_string()));
        }

        info!(ingredient_id = id, "Ingredient deleted");
        Ok(())
    }

    /// Run `op` against the database on the blocking pool.
    async fn with_db<T, F>(&self, op: F) -> Result<T, ServerError>
    where
        F: FnOnce(&mut Database) -> Result<T, StoreError> + Send + 'static,
        T: Send + 'static,
    {
        let db = Arc::clone(&self.db);
        tokio::task::spawn_blocking(move || {
            let mut guard = db
                .lock()
                .map_err(|e| ServerError::Internal(format!("Lock poisoned: {e}")))?;
            op(&mut *guard).map_err(ServerError::from)
        })
        .await
        .map_err(|e| ServerError::Internal(format!("Storage task failed: {e}")))?
    }
}

/// Replace the generic not-found message with an entity-specific one.
fn or_not_found(message: &'static str) -> impl Fn(ServerError) -> ServerError {
    move |err| match err {
        ServerError::NotFound(_) => ServerError::NotFound(message.to_string()),
        other => other,
    }
}
