use anyhow::Context;
use clap::Subcommand;
use serde_json::json;

use crate::auth::hash_password;
use crate::cli::utils::{output_success, read_secret_line};
use crate::cli::OutputFormat;
use crate::config::AppConfig;
use crate::database::users::UserRepository;
use crate::database::Database;
use crate::types::Role;

#[derive(Subcommand)]
pub enum UserCommands {
    #[command(about = "Create a user (use --role admin to bootstrap the first administrator)")]
    Create {
        #[arg(help = "Username")]
        username: String,

        #[arg(long, help = "Password (reads stdin when omitted)")]
        password: Option<String>,

        #[arg(long, default_value = "employee", help = "admin or employee")]
        role: String,
    },

    #[command(about = "Reset a user's password")]
    SetPassword {
        #[arg(help = "Username")]
        username: String,

        #[arg(long, help = "New password (reads stdin when omitted)")]
        password: Option<String>,
    },
}

fn password_or_stdin(password: Option<String>) -> anyhow::Result<String> {
    match password {
        Some(password) => Ok(password),
        None => read_secret_line().context("reading password from stdin"),
    }
}

pub async fn handle(cmd: UserCommands, config: &AppConfig, output_format: OutputFormat) -> anyhow::Result<()> {
    let db = Database::connect(&config.database).await?;
    let users = UserRepository::new(&db);

    let outcome = async {
        match cmd {
            UserCommands::Create { username, password, role } => {
                let role: Role = role.parse().map_err(anyhow::Error::msg)?;
                let hash = hash_password(&password_or_stdin(password)?)?;
                let user = users.insert(username.trim(), &hash, role).await?;
                output_success(
                    &output_format,
                    &format!("Created {} '{}'", role, user.username),
                    Some(json!({ "user_id": user.user_id, "role": role })),
                )
            }
            UserCommands::SetPassword { username, password } => {
                let user = users
                    .find_by_username(username.trim())
                    .await?
                    .with_context(|| format!("user '{}' not found", username))?;
                let hash = hash_password(&password_or_stdin(password)?)?;
                users.update_password(user.user_id, &hash).await?;
                output_success(
                    &output_format,
                    &format!("Password updated for '{}'", user.username),
                    Some(json!({ "user_id": user.user_id })),
                )
            }
        }
    }
    .await;

    db.close().await;
    outcome
}
