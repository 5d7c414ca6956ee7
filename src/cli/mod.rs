//! `forum-admin`: operator tasks that have no HTTP endpoint.

pub mod output;

use std::sync::Arc;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use serde_json::json;
use sqlx::PgPool;

use crate::config::AppConfig;
use crate::database::models::Role;
use crate::database::{seed, DatabaseManager, ForumStore, PgStore};

use output::OutputFormat;

#[derive(Parser)]
#[command(name = "forum-admin")]
#[command(about = "Forum administration: schema, seed data and account roles")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Apply pending database migrations")]
    Migrate,

    #[command(about = "Insert the default topics that do not exist yet")]
    Seed,

    #[command(about = "Change an account's role (user, moderator, admin)")]
    SetRole { username: String, role: String },

    #[command(about = "Delete an account with its posts and comments")]
    DeleteUser { username: String },
}

pub async fn run(cli: Cli, config: &AppConfig) -> anyhow::Result<()> {
    let format = OutputFormat::from_flag(cli.json);
    let pool = DatabaseManager::connect(&config.database)
        .await
        .context("cannot reach the database")?;

    match cli.command {
        Commands::Migrate => {
            DatabaseManager::migrate(&pool).await?;
            output::success(&format, "Migrations applied", None)
        }
        Commands::Seed => {
            let store = store(pool);
            let added = seed::seed_default_topics(store.as_ref()).await?;
            output::success(
                &format,
                &format!("Seeded {} topic(s)", added),
                Some(json!({ "added": added })),
            )
        }
        Commands::SetRole { username, role } => {
            let role: Role = role.parse()?;
            let store = store(pool);
            let user = find_user(store.as_ref(), &username).await?;
            if !store.set_user_role(user.id, role).await? {
                bail!("user '{}' disappeared before the update", username);
            }
            output::success(
                &format,
                &format!("{} is now {}", username, role),
                Some(json!({ "id": user.id, "username": username, "role": role })),
            )
        }
        Commands::DeleteUser { username } => {
            let store = store(pool);
            let user = find_user(store.as_ref(), &username).await?;
            if !store.delete_user(user.id).await? {
                bail!("user '{}' disappeared before the delete", username);
            }
            output::success(
                &format,
                &format!("Deleted {}", username),
                Some(json!({ "id": user.id, "username": username })),
            )
        }
    }
}

fn store(pool: PgPool) -> Arc<dyn ForumStore> {
    Arc::new(PgStore::new(pool))
}

async fn find_user(store: &dyn ForumStore, username: &str) -> anyhow::Result<crate::database::models::User> {
    match store.find_user_by_username(username.trim()).await? {
        Some(user) => Ok(user),
        None => bail!("no user named '{}'", username),
    }
}
