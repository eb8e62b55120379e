use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::{header, StatusCode},
    routing::get,
    Json, Router,
};
use tracing::{instrument, warn};

use crate::{
    auth::services::ActiveUser,
    error::AppError,
    recipes::{
        dto::{RecipeDetail, RecipePatch, RecipePayload, RecipeSummary},
        services,
    },
    state::AppState,
};

pub fn recipe_routes() -> Router<AppState> {
    Router::new()
        .route("/recipes", get(list_recipes).post(create_recipe))
        .route(
            "/recipes/:id",
            get(get_recipe).patch(partial_update_recipe).put(update_recipe),
        )
}

/// A malformed id cannot name an existing recipe, so it is reported the same
/// way as a missing one.
fn recipe_id(path: Result<Path<i64>, PathRejection>) -> Result<i64, AppError> {
    path.map(|Path(id)| id).map_err(|e| {
        warn!(error = %e, "malformed recipe id");
        AppError::NotFound("Recipe not found".into())
    })
}

#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn list_recipes(
    State(state): State<AppState>,
    ActiveUser(user): ActiveUser,
) -> Result<Json<Vec<RecipeSummary>>, AppError> {
    let items = services::list_recipes(state.recipes.as_ref(), user.id).await?;
    Ok(Json(items))
}

#[instrument(skip(state, user, path), fields(user_id = %user.id))]
pub async fn get_recipe(
    State(state): State<AppState>,
    ActiveUser(user): ActiveUser,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<RecipeDetail>, AppError> {
    let id = recipe_id(path)?;
    let detail = services::get_recipe(state.recipes.as_ref(), user.id, id).await?;
    Ok(Json(detail))
}

#[instrument(skip(state, user, payload), fields(user_id = %user.id))]
pub async fn create_recipe(
    State(state): State<AppState>,
    ActiveUser(user): ActiveUser,
    payload: Result<Json<RecipePayload>, JsonRejection>,
) -> Result<(StatusCode, [(header::HeaderName, String); 1], Json<RecipeDetail>), AppError> {
    let Json(payload) = payload?;
    let detail = services::create_recipe(state.recipes.as_ref(), user.id, payload).await?;
    let location = format!("/api/v1/recipes/{}", detail.summary.id);
    Ok((StatusCode::CREATED, [(header::LOCATION, location)], Json(detail)))
}

#[instrument(skip(state, user, path, payload), fields(user_id = %user.id))]
pub async fn partial_update_recipe(
    State(state): State<AppState>,
    ActiveUser(user): ActiveUser,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<RecipePatch>, JsonRejection>,
) -> Result<Json<RecipeDetail>, AppError> {
    let id = recipe_id(path)?;
    let Json(patch) = payload?;
    let detail =
        services::partial_update_recipe(state.recipes.as_ref(), user.id, id, patch).await?;
    Ok(Json(detail))
}

#[instrument(skip(state, user, path, payload), fields(user_id = %user.id))]
pub async fn update_recipe(
    State(state): State<AppState>,
    ActiveUser(user): ActiveUser,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<RecipePayload>, JsonRejection>,
) -> Result<Json<RecipeDetail>, AppError> {
    let id = recipe_id(path)?;
    let Json(payload) = payload?;
    let detail = services::replace_recipe(state.recipes.as_ref(), user.id, id, payload).await?;
    Ok(Json(detail))
}
