pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use crate::config::AppConfig;

#[derive(Parser)]
#[command(name = "shelfcheck")]
#[command(about = "Shelfcheck CLI - operator tasks for the field merchandising API")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Create users and reset passwords")]
    User {
        #[command(subcommand)]
        cmd: commands::user::UserCommands,
    },

    #[command(about = "Database checks")]
    Db {
        #[command(subcommand)]
        cmd: commands::db::DbCommands,
    },

    #[command(about = "Print an argon2 hash for a password (reads stdin when omitted)")]
    HashPassword {
        #[arg(help = "Password to hash")]
        password: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);
    let config = AppConfig::from_env();

    match cli.command {
        Commands::User { cmd } => commands::user::handle(cmd, &config, output_format).await,
        Commands::Db { cmd } => commands::db::handle(cmd, &config, output_format).await,
        Commands::HashPassword { password } => commands::hash::handle(password, output_format),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_user_create() {
        let cli = Cli::try_parse_from([
            "shelfcheck", "--json", "user", "create", "ana", "--password", "longenough", "--role", "admin",
        ])
        .unwrap();
        assert!(matches!(OutputFormat::from_cli(&cli), OutputFormat::Json));
        match cli.command {
            Commands::User { cmd: commands::user::UserCommands::Create { username, role, .. } } => {
                assert_eq!(username, "ana");
                assert_eq!(role, "admin");
            }
            _ => panic!("expected user create"),
        }
    }

    #[test]
    fn hash_password_argument_is_optional() {
        let cli = Cli::try_parse_from(["shelfcheck", "hash-password"]).unwrap();
        assert!(matches!(cli.command, Commands::HashPassword { password: None }));
    }
}
