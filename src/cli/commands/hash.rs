use serde_json::json;

use crate::auth::hash_password;
use crate::cli::utils::{output_success, read_secret_line};
use crate::cli::OutputFormat;

pub fn handle(password: Option<String>, output_format: OutputFormat) -> anyhow::Result<()> {
    let password = match password {
        Some(password) => password,
        None => read_secret_line()?,
    };

    let hash = hash_password(&password)?;
    match output_format {
        OutputFormat::Json => output_success(&output_format, "Password hashed", Some(json!({ "hash": hash }))),
        OutputFormat::Text => {
            println!("{}", hash);
            Ok(())
        }
    }
}
