use std::sync::Arc;

use axum::{
    async_trait,
    body::Bytes,
    extract::{
        multipart::MultipartError, DefaultBodyLimit, FromRequest, FromRequestParts, Multipart,
        Path, Request, State,
    },
    http::{request::Parts, Method, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use recipix_shared::RawRecipe;
use recipix_store::{Ingredient, Recipe, RecipeDetail};
use serde::Serialize;
use serde_json::Value;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

use crate::config::ServerConfig;
use crate::error::ServerError;
use crate::image_store::ImageStore;
use crate::service::RecipeService;

/// Headroom on top of the image itself for the scalar form fields.
const FORM_OVERHEAD: usize = 64 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub service: RecipeService,
    pub images: Arc<ImageStore>,
    pub config: Arc<ServerConfig>,
}

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers(Any);

    let mut router = Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/recipes", get(list_recipes).post(create_recipe))
        .route(
            "/recipes/:id",
            get(get_recipe).put(update_recipe).delete(delete_recipe),
        )
        .route("/recipes/:id/favorite", axum::routing::put(set_favorite))
        .route("/ingredients", get(list_ingredients).post(create_ingredient))
        .route("/ingredients/:id", axum::routing::delete(delete_ingredient))
        .nest_service("/uploads", ServeDir::new(state.images.base_path()));

    if let Some(timeout) = state.config.request_timeout {
        router = router.layer(TimeoutLayer::new(timeout));
    }

    router
        .layer(middleware::map_response(timeout_body))
        .layer(DefaultBodyLimit::max(state.images.max_size() + FORM_OVERHEAD))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

#[derive(Serialize)]
struct MessageResponse {
    message: &'static str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateRecipeResponse {
    message: &'static str,
    recipe_id: i64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateIngredientResponse {
    message: &'static str,
    ingredient_id: i64,
}

async fn root() -> &'static str {
    "Recipix backend is running!"
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

// ─── Extractors ───

/// Numeric `:id` path segment. Rejections come back as `{error}` JSON.
struct IdPath(i64);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for IdPath {
    type Rejection = ServerError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(id) = Path::<i64>::from_request_parts(parts, state).await?;
        Ok(Self(id))
    }
}

/// JSON request body, kept untyped for the validation layer.
struct JsonBody(Value);

#[async_trait]
impl<S: Send + Sync> FromRequest<S> for JsonBody {
    type Rejection = ServerError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(body) = Json::<Value>::from_request(req, state).await?;
        Ok(Self(body))
    }
}

// ─── Recipes ───

async fn list_recipes(State(state): State<AppState>) -> Result<Json<Vec<Recipe>>, ServerError> {
    Ok(Json(state.service.list_recipes().await?))
}

async fn get_recipe(
    State(state): State<AppState>,
    IdPath(id): IdPath,
) -> Result<Json<RecipeDetail>, ServerError> {
    Ok(Json(state.service.get_recipe(id).await?))
}

/// Multipart recipe submission: scalar text fields, `ingredients` as JSON
/// text, and the `image` file.
///
/// The image is stored before validation runs, because validation needs
/// its reference. If the recipe is then rejected the stored file is removed
/// again.
async fn create_recipe(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<CreateRecipeResponse>, ServerError> {
    let mut raw = RawRecipe::default();
    let mut image: Option<(String, Bytes)> = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or("").to_string();
        if name == "image" {
            let file_name = field.file_name().unwrap_or("").to_string();
            let data = field.bytes().await.map_err(multipart_error)?;
            // Browsers send an empty part when no file was picked.
            if !(file_name.is_empty() && data.is_empty()) {
                image = Some((file_name, data));
            }
        } else {
            let text = field.text().await.map_err(multipart_error)?;
            if !raw.set_field(&name, Value::String(text)) {
                debug!(field = %name, "Ignoring unknown form field");
            }
        }
    }

    if let Some((file_name, data)) = image {
        raw.image_path = Some(state.images.store_image(&file_name, &data).await?);
    }

    let image_path = raw.image_path.clone();
    match state.service.create_recipe(raw).await {
        Ok(recipe_id) => Ok(Json(CreateRecipeResponse {
            message: "Recipe added!",
            recipe_id,
        })),
        Err(err) => {
            if let Some(reference) = image_path {
                discard_image(&state.images, &reference).await;
            }
            Err(err)
        }
    }
}

async fn update_recipe(
    State(state): State<AppState>,
    IdPath(id): IdPath,
    JsonBody(body): JsonBody,
) -> Result<Json<MessageResponse>, ServerError> {
    state.service.update_rating_and_notes(id, &body).await?;
    Ok(Json(MessageResponse {
        message: "Recipe updated!",
    }))
}

async fn set_favorite(
    State(state): State<AppState>,
    IdPath(id): IdPath,
    JsonBody(body): JsonBody,
) -> Result<Json<MessageResponse>, ServerError> {
    state.service.set_favorite(id, &body).await?;
    Ok(Json(MessageResponse {
        message: "Favorite status updated!",
    }))
}

async fn delete_recipe(
    State(state): State<AppState>,
    IdPath(id): IdPath,
) -> Result<Json<MessageResponse>, ServerError> {
    let recipe = state.service.delete_recipe(id).await?;
    discard_image(&state.images, &recipe.image_path).await;
    Ok(Json(MessageResponse {
        message: "Recipe deleted",
    }))
}

// ─── Ingredients ───

async fn list_ingredients(
    State(state): State<AppState>,
) -> Result<Json<Vec<Ingredient>>, ServerError> {
    Ok(Json(state.service.list_ingredients().await?))
}

async fn create_ingredient(
    State(state): State<AppState>,
    JsonBody(body): JsonBody,
) -> Result<Json<CreateIngredientResponse>, ServerError> {
    let ingredient_id = state.service.create_ingredient(&body).await?;
    Ok(Json(CreateIngredientResponse {
        message: "Ingredient added!",
        ingredient_id,
    }))
}

async fn delete_ingredient(
    State(state): State<AppState>,
    IdPath(id): IdPath,
) -> Result<Json<MessageResponse>, ServerError> {
    state.service.delete_ingredient(id).await?;
    Ok(Json(MessageResponse {
        message: "Ingredient deleted",
    }))
}

// ─── Helpers ───

fn multipart_error(e: MultipartError) -> ServerError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ServerError::PayloadTooLarge(e.body_text())
    } else {
        ServerError::BadRequest(format!("Multipart error: {}", e.body_text()))
    }
}

/// The timeout layer answers with a bare 408; give it the usual error body.
async fn timeout_body(response: Response) -> Response {
    if response.status() == StatusCode::REQUEST_TIMEOUT {
        ServerError::Timeout.into_response()
    } else {
        response
    }
}

/// Best-effort removal of an image nobody references any more.
async fn discard_image(images: &ImageStore, reference: &str) {
    if let Err(e) = images.delete_image(reference).await {
        warn!(reference = %reference, error = %e, "Failed to remove image");
    }
}

pub async fn serve(state: AppState, addr: std::net::SocketAddr) -> anyhow::Result<()> {
    let app = build_router(state);

    info!(addr = %addr, "Starting HTTP API server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
