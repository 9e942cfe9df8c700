use clap::Subcommand;
use serde_json::json;

use crate::cli::config::{open_session, require_session};
use crate::cli::utils::{output_success, output_value, prompt};
use crate::cli::OutputFormat;
use crate::client::SessionState;

#[derive(Subcommand)]
pub enum AuthCommands {
    #[command(about = "Login and store the token")]
    Login {
        #[arg(help = "Admin email")]
        email: String,
        #[arg(long, help = "Password (will prompt if not provided)")]
        password: Option<String>,
    },

    #[command(about = "Forget the stored token")]
    Logout,

    #[command(about = "Show current authentication status")]
    Status,

    #[command(about = "Show current user information")]
    Whoami,
}

pub async fn handle(cmd: AuthCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        AuthCommands::Login { email, password } => {
            let password = match password {
                Some(password) => password,
                None => prompt("Password")?,
            };

            let session = open_session()?;
            let principal = session.login(&email, &password).await?;
            output_success(
                &output_format,
                &format!("Logged in as {}", principal.email),
                Some(json!(principal)),
            )
        }
        AuthCommands::Logout => {
            open_session()?.logout();
            output_success(&output_format, "Logged out", None)
        }
        AuthCommands::Status => {
            let state = open_session()?.mount().await;
            let status = match &state {
                SessionState::Authenticated(principal) => json!({
                    "authenticated": true,
                    "email": principal.email,
                }),
                _ => json!({ "authenticated": false }),
            };
            output_value(&output_format, &status, |_| match &state {
                SessionState::Authenticated(principal) => println!("Logged in as {}", principal.email),
                _ => println!("Not logged in"),
            })
        }
        AuthCommands::Whoami => {
            let session = require_session().await?;
            let principal = session.principal();
            output_value(&output_format, &principal, |principal| {
                if let Some(principal) = principal {
                    println!("ID: {}", principal.id);
                    println!("Email: {}", principal.email);
                }
            })
        }
    }
}
