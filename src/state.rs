use crate::auth::repo::{PgUserStore, UserStore};
use crate::config::AppConfig;
use crate::recipes::repo::{PgRecipeStore, RecipeStore};
use sqlx::PgPool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub users: Arc<dyn UserStore>,
    pub recipes: Arc<dyn RecipeStore>,
}

impl AppState {
    /// Postgres-backed stores sharing one pool.
    pub fn new(db: PgPool, config: Arc<AppConfig>) -> Self {
        Self::from_parts(
            config,
            Arc::new(PgUserStore::new(db.clone())),
            Arc::new(PgRecipeStore::new(db)),
        )
    }

    pub fn from_parts(
        config: Arc<AppConfig>,
        users: Arc<dyn UserStore>,
        recipes: Arc<dyn RecipeStore>,
    ) -> Self {
        Self {
            config,
            users,
            recipes,
        }
    }
}
