use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::recipes::repo_types::{Recipe, RecipeChanges, RecipeFields};

/// Recipe persistence. Every read and write takes the caller's id and only
/// ever touches rows owned by that caller.
#[async_trait]
pub trait RecipeStore: Send + Sync {
    /// Newest first (descending id).
    async fn list_for_owner(&self, owner: Uuid) -> anyhow::Result<Vec<Recipe>>;
    async fn get_for_owner(&self, owner: Uuid, id: i64) -> anyhow::Result<Option<Recipe>>;
    async fn insert(&self, owner: Uuid, fields: RecipeFields) -> anyhow::Result<Recipe>;
    /// `None` when no recipe with `id` belongs to `owner`.
    async fn update_for_owner(
        &self,
        owner: Uuid,
        id: i64,
        changes: RecipeChanges,
    ) -> anyhow::Result<Option<Recipe>>;
}

#[derive(Clone)]
pub struct PgRecipeStore {
    db: PgPool,
}

impl PgRecipeStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl RecipeStore for PgRecipeStore {
    async fn list_for_owner(&self, owner: Uuid) -> anyhow::Result<Vec<Recipe>> {
        let rows = sqlx::query_as::<_, Recipe>(
            r#"
            SELECT id, user_id, title, description, time_minutes, price, link
              FROM recipes
             WHERE user_id = $1
             ORDER BY id DESC
            "#,
        )
        .bind(owner)
        .fetch_all(&self.db)
        .await
        .context("list recipes")?;
        Ok(rows)
    }

    async fn get_for_owner(&self, owner: Uuid, id: i64) -> anyhow::Result<Option<Recipe>> {
        let row = sqlx::query_as::<_, Recipe>(
            r#"
            SELECT id, user_id, title, description, time_minutes, price, link
              FROM recipes
             WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id)
        .bind(owner)
        .fetch_optional(&self.db)
        .await
        .context("get recipe")?;
        Ok(row)
    }

    async fn insert(&self, owner: Uuid, fields: RecipeFields) -> anyhow::Result<Recipe> {
        let row = sqlx::query_as::<_, Recipe>(
            r#"
            INSERT INTO recipes (user_id, title, description, time_minutes, price, link)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, user_id, title, description, time_minutes, price, link
            "#,
        )
        .bind(owner)
        .bind(&fields.title)
        .bind(&fields.description)
        .bind(fields.time_minutes)
        .bind(fields.price)
        .bind(&fields.link)
        .fetch_one(&self.db)
        .await
        .context("insert recipe")?;
        Ok(row)
    }

    async fn update_for_owner(
        &self,
        owner: Uuid,
        id: i64,
        changes: RecipeChanges,
    ) -> anyhow::Result<Option<Recipe>> {
        // Ownership never changes: user_id is only matched, never set.
        let row = sqlx::query_as::<_, Recipe>(
            r#"
            UPDATE recipes
               SET title        = COALESCE($3, title),
                   description  = COALESCE($4, description),
                   time_minutes = COALESCE($5, time_minutes),
                   price        = COALESCE($6, price),
                   link         = COALESCE($7, link)
             WHERE id = $1 AND user_id = $2
            RETURNING id, user_id, title, description, time_minutes, price, link
            "#,
        )
        .bind(id)
        .bind(owner)
        .bind(changes.title)
        .bind(changes.description)
        .bind(changes.time_minutes)
        .bind(changes.price)
        .bind(changes.link)
        .fetch_optional(&self.db)
        .await
        .context("update recipe")?;
        Ok(row)
    }
}
