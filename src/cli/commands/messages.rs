use clap::Subcommand;

use crate::cli::config::{open_session, require_session};
use crate::cli::utils::{output_empty_collection, output_success, output_value, truncate};
use crate::cli::OutputFormat;
use crate::client::api;
use crate::models::MessageInput;

#[derive(Subcommand)]
pub enum MessageCommands {
    #[command(about = "List inbox messages, newest first")]
    List,

    #[command(about = "Send a message through the public contact form")]
    Send {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        subject: String,
        #[arg(long)]
        message: String,
    },

    #[command(about = "Mark a message as read")]
    Read {
        id: String,
        #[arg(long, conflicts_with = "toggle", help = "Mark as unread instead")]
        unread: bool,
        #[arg(long, help = "Flip the current state")]
        toggle: bool,
    },

    #[command(about = "Delete a message")]
    Delete {
        id: String,
    },
}

pub async fn handle(cmd: MessageCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        MessageCommands::List => {
            let session = require_session().await?;
            let messages = api::list_messages(session.http()).await?;
            if messages.is_empty() {
                return output_empty_collection(&output_format, "Inbox is empty");
            }
            output_value(&output_format, &messages, |messages| {
                for m in messages {
                    let marker = if m.read { " " } else { "*" };
                    println!(
                        "{} {:<32} {:<28} {}",
                        marker,
                        m.id,
                        truncate(&m.email, 28),
                        truncate(&m.subject, 40)
                    );
                }
            })
        }
        MessageCommands::Send {
            name,
            email,
            subject,
            message,
        } => {
            let session = open_session()?;
            let input = MessageInput {
                name: Some(name),
                email: Some(email),
                subject: Some(subject),
                message: Some(message),
            };
            let sent = api::send_message(session.http(), &input).await?;
            output_success(&output_format, "Message sent", Some(serde_json::to_value(&sent)?))
        }
        MessageCommands::Read { id, unread, toggle } => {
            let session = require_session().await?;
            let read = if toggle { None } else { Some(!unread) };
            let updated = api::set_message_read(session.http(), &id, read).await?;
            let state = if updated.read { "read" } else { "unread" };
            output_success(
                &output_format,
                &format!("Message {} marked {}", updated.id, state),
                Some(serde_json::to_value(&updated)?),
            )
        }
        MessageCommands::Delete { id } => {
            let session = require_session().await?;
            api::delete_message(session.http(), &id).await?;
            output_success(&output_format, &format!("Message {} deleted", id), None)
        }
    }
}
