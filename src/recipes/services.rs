use rust_decimal::Decimal;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::AppError;
use crate::recipes::{
    dto::{RecipeDetail, RecipePatch, RecipePayload, RecipeSummary},
    repo::RecipeStore,
    repo_types::{RecipeChanges, RecipeFields},
};

const MAX_TEXT_LEN: usize = 255;
const PRICE_DECIMAL_PLACES: u32 = 2;
const PRICE_MAX_DIGITS: u32 = 5;

fn not_found() -> AppError {
    AppError::NotFound("Recipe not found".into())
}

fn invalid(field: &str, msg: &str) -> AppError {
    AppError::Validation(format!("{field}: {msg}"))
}

fn clean_title(title: &str) -> Result<String, AppError> {
    if title.trim().is_empty() {
        return Err(invalid("title", "This field may not be blank."));
    }
    clean_short_text("title", title)
}

fn clean_short_text(field: &str, value: &str) -> Result<String, AppError> {
    if value.chars().count() > MAX_TEXT_LEN {
        return Err(invalid(
            field,
            &format!("Ensure this field has no more than {MAX_TEXT_LEN} characters."),
        ));
    }
    Ok(value.to_string())
}

/// Accepts prices that fit NUMERIC(5, 2) as written, trailing zeros included,
/// and returns them at scale 2.
fn clean_price(mut price: Decimal) -> Result<Decimal, AppError> {
    if price.scale() > PRICE_DECIMAL_PLACES {
        return Err(invalid(
            "price",
            &format!("Ensure that there are no more than {PRICE_DECIMAL_PLACES} decimal places."),
        ));
    }
    let max_integer_digits = PRICE_MAX_DIGITS - PRICE_DECIMAL_PLACES;
    if price.trunc().abs() >= Decimal::from(10_i64.pow(max_integer_digits)) {
        return Err(invalid(
            "price",
            &format!("Ensure that there are no more than {PRICE_MAX_DIGITS} digits in total."),
        ));
    }
    price.rescale(PRICE_DECIMAL_PLACES);
    Ok(price)
}

pub fn validate_payload(p: RecipePayload) -> Result<RecipeFields, AppError> {
    Ok(RecipeFields {
        title: clean_title(&p.title)?,
        description: p.description,
        time_minutes: p.time_minutes,
        price: clean_price(p.price)?,
        link: clean_short_text("link", &p.link)?,
    })
}

pub fn validate_patch(p: RecipePatch) -> Result<RecipeChanges, AppError> {
    Ok(RecipeChanges {
        title: p.title.as_deref().map(clean_title).transpose()?,
        description: p.description,
        time_minutes: p.time_minutes,
        price: p.price.map(clean_price).transpose()?,
        link: p
            .link
            .as_deref()
            .map(|l| clean_short_text("link", l))
            .transpose()?,
    })
}

pub async fn list_recipes(
    store: &dyn RecipeStore,
    owner: Uuid,
) -> Result<Vec<RecipeSummary>, AppError> {
    let rows = store.list_for_owner(owner).await?;
    debug!(%owner, count = rows.len(), "recipes listed");
    Ok(rows.iter().map(RecipeSummary::from).collect())
}

/// Absent and foreign ids produce the same not-found error.
pub async fn get_recipe(
    store: &dyn RecipeStore,
    owner: Uuid,
    id: i64,
) -> Result<RecipeDetail, AppError> {
    store
        .get_for_owner(owner, id)
        .await?
        .map(RecipeDetail::from)
        .ok_or_else(|| {
            warn!(%owner, id, "recipe not found for owner");
            not_found()
        })
}

pub async fn create_recipe(
    store: &dyn RecipeStore,
    owner: Uuid,
    payload: RecipePayload,
) -> Result<RecipeDetail, AppError> {
    let fields = validate_payload(payload)?;
    let recipe = store.insert(owner, fields).await?;
    info!(%owner, id = recipe.id, "recipe created");
    Ok(recipe.into())
}

pub async fn update_recipe(
    store: &dyn RecipeStore,
    owner: Uuid,
    id: i64,
    changes: RecipeChanges,
) -> Result<RecipeDetail, AppError> {
    if changes.is_empty() {
        return get_recipe(store, owner, id).await;
    }
    let recipe = store
        .update_for_owner(owner, id, changes)
        .await?
        .ok_or_else(|| {
            warn!(%owner, id, "update on recipe not owned by caller");
            not_found()
        })?;
    info!(%owner, id, "recipe updated");
    Ok(recipe.into())
}

/// Only the supplied fields change.
pub async fn partial_update_recipe(
    store: &dyn RecipeStore,
    owner: Uuid,
    id: i64,
    patch: RecipePatch,
) -> Result<RecipeDetail, AppError> {
    let changes = validate_patch(patch)?;
    update_recipe(store, owner, id, changes).await
}

/// Every mutable field is overwritten; omitted optional text becomes empty.
pub async fn replace_recipe(
    store: &dyn RecipeStore,
    owner: Uuid,
    id: i64,
    payload: RecipePayload,
) -> Result<RecipeDetail, AppError> {
    let fields = validate_payload(payload)?;
    update_recipe(store, owner, id, fields.into()).await
}
