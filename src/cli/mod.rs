pub mod commands;
pub mod config;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use crate::client::{ClientError, NotificationBus, TOAST_EVENT};

#[derive(Parser)]
#[command(name = "folio")]
#[command(about = "Folio CLI - admin client for the portfolio API")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Authentication and token management")]
    Auth {
        #[command(subcommand)]
        cmd: commands::auth::AuthCommands,
    },

    #[command(about = "Portfolio projects")]
    Projects {
        #[command(subcommand)]
        cmd: commands::projects::ProjectCommands,
    },

    #[command(about = "Blog posts")]
    Blogs {
        #[command(subcommand)]
        cmd: commands::blogs::BlogCommands,
    },

    #[command(about = "Contact form inbox")]
    Messages {
        #[command(subcommand)]
        cmd: commands::messages::MessageCommands,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
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

    // Failed requests surface here, once, on stderr
    let _toasts = NotificationBus::global().subscribe(TOAST_EVENT, utils::print_toast);

    match cli.command {
        Commands::Auth { cmd } => commands::auth::handle(cmd, output_format).await,
        Commands::Projects { cmd } => commands::projects::handle(cmd, output_format).await,
        Commands::Blogs { cmd } => commands::blogs::handle(cmd, output_format).await,
        Commands::Messages { cmd } => commands::messages::handle(cmd, output_format).await,
    }
}

/// Whether `err` still needs printing; client errors that went through the
/// bus already have been.
pub fn needs_report(err: &anyhow::Error) -> bool {
    match err.downcast_ref::<ClientError>() {
        Some(client_error) => !client_error.notifies(),
        None => true,
    }
}
