use rust_decimal::Decimal;
use sqlx::FromRow;
use uuid::Uuid;

/// Recipe record in the database.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Recipe {
    pub id: i64,
    pub user_id: Uuid, // owner, fixed at creation
    pub title: String,
    pub description: String,
    pub time_minutes: i32,
    pub price: Decimal, // NUMERIC(5, 2)
    pub link: String,
}

/// Every client-writable field of a recipe, already validated.
#[derive(Debug, Clone, PartialEq)]
pub struct RecipeFields {
    pub title: String,
    pub description: String,
    pub time_minutes: i32,
    pub price: Decimal,
    pub link: String,
}

/// Changes to apply to a stored recipe; `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecipeChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub time_minutes: Option<i32>,
    pub price: Option<Decimal>,
    pub link: Option<String>,
}

impl From<RecipeFields> for RecipeChanges {
    fn from(f: RecipeFields) -> Self {
        Self {
            title: Some(f.title),
            description: Some(f.description),
            time_minutes: Some(f.time_minutes),
            price: Some(f.price),
            link: Some(f.link),
        }
    }
}

impl RecipeChanges {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// In-place equivalent of the `COALESCE` update, used by the in-memory store.
    #[cfg(test)]
    pub fn apply_to(self, recipe: &mut Recipe) {
        if let Some(title) = self.title {
            recipe.title = title;
        }
        if let Some(description) = self.description {
            recipe.description = description;
        }
        if let Some(time_minutes) = self.time_minutes {
            recipe.time_minutes = time_minutes;
        }
        if let Some(price) = self.price {
            recipe.price = price;
        }
        if let Some(link) = self.link {
            recipe.link = link;
        }
    }
}
