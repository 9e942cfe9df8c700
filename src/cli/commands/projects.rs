use clap::Subcommand;

use crate::cli::config::{open_session, require_session};
use crate::cli::utils::{output_empty_collection, output_success, output_value, truncate};
use crate::cli::OutputFormat;
use crate::client::api;

#[derive(Subcommand)]
pub enum ProjectCommands {
    #[command(about = "List projects, newest first")]
    List,

    #[command(about = "Show one project")]
    Show {
        #[arg(help = "Project slug or id")]
        slug: String,
    },

    #[command(about = "Delete a project")]
    Delete {
        #[arg(help = "Project id")]
        id: String,
    },
}

pub async fn handle(cmd: ProjectCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        ProjectCommands::List => {
            let session = open_session()?;
            let projects = api::list_projects(session.http()).await?;
            if projects.is_empty() {
                return output_empty_collection(&output_format, "No projects");
            }
            output_value(&output_format, &projects, |projects| {
                for project in projects {
                    println!(
                        "{:<32} {:<40} {}",
                        project.slug,
                        truncate(&project.title, 40),
                        project.created_at.format("%Y-%m-%d")
                    );
                }
            })
        }
        ProjectCommands::Show { slug } => {
            let session = open_session()?;
            let project = api::get_project(session.http(), &slug).await?;
            output_value(&output_format, &project, |project| {
                println!("{} ({})", project.title, project.slug);
                println!("ID: {}", project.id);
                if !project.summary.is_empty() {
                    println!("Summary: {}", project.summary);
                }
                if !project.tech_stack.is_empty() {
                    println!("Stack: {}", project.tech_stack.join(", "));
                }
                if let Some(live) = &project.links.live {
                    println!("Live: {}", live);
                }
            })
        }
        ProjectCommands::Delete { id } => {
            let session = require_session().await?;
            api::delete_project(session.http(), &id).await?;
            output_success(&output_format, &format!("Project '{}' deleted", id), None)
        }
    }
}
