use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::repo_types::{NewUser, User};

/// Returned by `UserStore::insert` when the email is already taken.
#[derive(Debug, thiserror::Error)]
#[error("email already registered")]
pub struct DuplicateEmail;

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>>;
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>>;
    async fn insert(&self, new: NewUser) -> anyhow::Result<User>;
    /// Sets the staff and superuser flags, returning the updated row.
    async fn set_privileges(
        &self,
        id: Uuid,
        is_staff: bool,
        is_superuser: bool,
    ) -> anyhow::Result<Option<User>>;
}

#[derive(Clone)]
pub struct PgUserStore {
    db: PgPool,
}

impl PgUserStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, name, is_active, is_staff, is_superuser, password_hash, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await
        .context("find user by email")?;
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, name, is_active, is_staff, is_superuser, password_hash, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .context("find user by id")?;
        Ok(user)
    }

    async fn insert(&self, new: NewUser) -> anyhow::Result<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, name, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, email, name, is_active, is_staff, is_superuser, password_hash, created_at
            "#,
        )
        .bind(&new.email)
        .bind(&new.name)
        .bind(&new.password_hash)
        .fetch_one(&self.db)
        .await
        .map_err(|e| match e.as_database_error() {
            Some(db) if db.is_unique_violation() => anyhow::Error::new(DuplicateEmail),
            _ => anyhow::Error::new(e).context("insert user"),
        })?;
        Ok(user)
    }

    async fn set_privileges(
        &self,
        id: Uuid,
        is_staff: bool,
        is_superuser: bool,
    ) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
               SET is_staff = $2, is_superuser = $3
             WHERE id = $1
            RETURNING id, email, name, is_active, is_staff, is_superuser, password_hash, created_at
            "#,
        )
        .bind(id)
        .bind(is_staff)
        .bind(is_superuser)
        .fetch_optional(&self.db)
        .await
        .context("update user privileges")?;
        Ok(user)
    }
}
