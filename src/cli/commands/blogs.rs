use clap::Subcommand;

use crate::cli::config::{open_session, require_session};
use crate::cli::utils::{output_empty_collection, output_success, output_value, truncate};
use crate::cli::OutputFormat;
use crate::client::api;
use crate::models::BlogQuery;

#[derive(Subcommand)]
pub enum BlogCommands {
    #[command(about = "List blog posts (drafts only when logged in)")]
    List {
        #[arg(long, help = "Case-insensitive search in title, excerpt and content")]
        search: Option<String>,
        #[arg(long, help = "Filter by tag (repeatable)")]
        tag: Vec<String>,
        #[arg(long, help = "Filter by category (repeatable)")]
        category: Vec<String>,
        #[arg(long, help = "Filter by published flag")]
        published: Option<bool>,
        #[arg(long, help = "Only featured posts")]
        featured: bool,
        #[arg(long, default_value_t = 1)]
        page: usize,
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },

    #[command(about = "Show one blog post")]
    Show {
        slug: String,
    },

    #[command(about = "Toggle the published flag")]
    Publish {
        slug: String,
    },

    #[command(about = "Delete a blog post")]
    Delete {
        slug: String,
    },
}

pub async fn handle(cmd: BlogCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        BlogCommands::List {
            search,
            tag,
            category,
            published,
            featured,
            page,
            limit,
        } => {
            // Logged in callers can see drafts
            let session = open_session()?;
            session.mount().await;

            let query = BlogQuery {
                published,
                search,
                tags: tag,
                categories: category,
                featured: featured.then_some(true),
                page,
                limit,
            };
            let result = api::list_blogs(session.http(), &query).await?;
            if result.blogs.is_empty() {
                return output_empty_collection(&output_format, "No blog posts");
            }

            output_value(&output_format, &result, |result| {
                for blog in &result.blogs {
                    let state = if blog.published { "published" } else { "draft" };
                    println!("{:<40} {:<9} {}", blog.slug, state, truncate(&blog.title, 50));
                }
                let p = &result.pagination;
                println!("Page {}/{} ({} total)", p.page, p.pages.max(1), p.total);
            })
        }
        BlogCommands::Show { slug } => {
            let session = open_session()?;
            session.mount().await;
            let blog = api::get_blog(session.http(), &slug).await?;
            output_value(&output_format, &blog, |blog| {
                println!("{}", blog.title);
                println!("Slug: {}", blog.slug);
                println!("Published: {}", blog.published);
                if let Some(at) = blog.published_at {
                    println!("Published at: {}", at.format("%Y-%m-%d %H:%M"));
                }
                if !blog.tags.is_empty() {
                    println!("Tags: {}", blog.tags.join(", "));
                }
                println!("Reading time: {} min", blog.reading_time);
                println!();
                println!("{}", blog.content);
            })
        }
        BlogCommands::Publish { slug } => {
            let session = require_session().await?;
            let blog = api::toggle_publish(session.http(), &slug).await?;
            let verb = if blog.published { "published" } else { "unpublished" };
            output_success(
                &output_format,
                &format!("Blog '{}' {}", blog.slug, verb),
                Some(serde_json::to_value(&blog)?),
            )
        }
        BlogCommands::Delete { slug } => {
            let session = require_session().await?;
            api::delete_blog(session.http(), &slug).await?;
            output_success(&output_format, &format!("Blog '{}' deleted", slug), None)
        }
    }
}
