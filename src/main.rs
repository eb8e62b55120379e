use std::sync::Arc;

use clap::{Parser, Subcommand};

mod app;
mod auth;
mod config;
mod db;
mod error;
mod recipes;
mod state;
#[cfg(test)]
mod test_utils;

use crate::{config::AppConfig, state::AppState};

#[derive(Parser)]
#[command(name = "recipe-api", about = "Recipe management REST API")]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Wait for the database, apply migrations and serve HTTP (default)
    Serve,
    /// Block until the database accepts connections, then exit
    WaitForDb,
    /// Create an account with staff and superuser flags set
    CreateSuperuser {
        #[arg(long, env = "SUPERUSER_EMAIL")]
        email: String,
        #[arg(long, env = "SUPERUSER_PASSWORD", hide_env_values = true)]
        password: String,
        #[arg(long, default_value = "")]
        name: String,
    },
}

fn init_tracing() {
    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "recipe_api=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let args = Args::parse();
    let config = Arc::new(AppConfig::from_env()?);
    let pool = db::connect_lazy(&config)?;

    db::wait_for_db(&pool).await;

    match args.command.unwrap_or(Command::Serve) {
        Command::WaitForDb => Ok(()),
        Command::Serve => {
            db::run_migrations(&pool).await?;
            let state = AppState::new(pool, config);
            app::serve(app::build_app(state)).await
        }
        Command::CreateSuperuser {
            email,
            password,
            name,
        } => {
            db::run_migrations(&pool).await?;
            let state = AppState::new(pool, config);
            let user =
                auth::services::create_superuser(state.users.as_ref(), &email, &password, &name)
                    .await?;
            tracing::info!(user_id = %user.id, email = %user.email, "superuser created");
            Ok(())
        }
    }
}
