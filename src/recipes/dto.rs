use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::recipes::repo_types::Recipe;

/// Compact view used by the list endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecipeSummary {
    pub id: i64,
    pub title: String,
    pub time_minutes: i32,
    pub price: Decimal,
    pub link: String,
}

/// Single-recipe view: the summary fields plus the description.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecipeDetail {
    #[serde(flatten)]
    pub summary: RecipeSummary,
    pub description: String,
}

impl From<&Recipe> for RecipeSummary {
    fn from(r: &Recipe) -> Self {
        Self {
            id: r.id,
            title: r.title.clone(),
            time_minutes: r.time_minutes,
            price: r.price,
            link: r.link.clone(),
        }
    }
}

impl From<Recipe> for RecipeDetail {
    fn from(r: Recipe) -> Self {
        Self {
            summary: RecipeSummary::from(&r),
            description: r.description,
        }
    }
}

/// Body of `POST /recipes` and `PUT /recipes/:id`. Unknown keys, including
/// any owner field, are dropped by serde.
#[derive(Debug, Deserialize)]
pub struct RecipePayload {
    pub title: String,
    pub time_minutes: i32,
    pub price: Decimal,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub link: String,
}

/// Body of `PATCH /recipes/:id`; absent or null keys are left untouched.
#[derive(Debug, Default, Deserialize)]
pub struct RecipePatch {
    pub title: Option<String>,
    pub time_minutes: Option<i32>,
    pub price: Option<Decimal>,
    pub description: Option<String>,
    pub link: Option<String>,
}
