//! CLI administration tool for shortlink-engine.
//!
//! Creates, resolves and lists links directly against the configured store,
//! without going through the HTTP API.
//!
//! # Usage
//!
//! ```bash
//! # Create a link (prompts for the URL when omitted)
//! cargo run --bin admin -- link create https://example.com/page --alias promo
//!
//! # Resolve a code or alias (counts as a visit)
//! cargo run --bin admin -- link resolve promo
//!
//! # List links
//! cargo run --bin admin -- link list --page 1 --limit 20 --sort-by visit_count:desc
//!
//! # Check database connection
//! cargo run --bin admin -- db check
//! ```
//!
//! # Environment Variables
//!
//! Same as the server; see `shortlink_engine::config`.

use shortlink_engine::application::services::short_url;
use shortlink_engine::config::{self, Config};
use shortlink_engine::domain::entities::{LinkFilter, PageRequest, parse_sort_by};
use shortlink_engine::server::{build_link_service, build_repository, connect_pool};
use shortlink_engine::utils::url_validator::{validate_alias, validate_long_url};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Input;

/// CLI tool for managing shortlink-engine.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage links
    Link {
        #[command(subcommand)]
        action: LinkAction,
    },

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

#[derive(Subcommand)]
enum LinkAction {
    /// Create a short link
    Create {
        /// Long URL to shorten
        url: Option<String>,

        /// Custom alias
        #[arg(short, long)]
        alias: Option<String>,
    },

    /// Resolve a short code or alias and record a visit
    Resolve {
        code: String,
    },

    /// List links
    List {
        #[arg(long, default_value_t = 1)]
        page: i64,

        #[arg(long, default_value_t = 10)]
        limit: i64,

        /// Comma-separated `field:asc|desc` pairs
        #[arg(long)]
        sort_by: Option<String>,
    },
}

#[derive(Subcommand)]
enum DbAction {
    /// Check database connection
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = config::load_from_env()?;

    match cli.command {
        Commands::Link { action } => handle_link_action(action, &config).await?,
        Commands::Db { action } => handle_db_action(action, &config).await?,
    }

    Ok(())
}

async fn handle_link_action(action: LinkAction, config: &Config) -> Result<()> {
    let repository = build_repository(config).await?;
    let service = build_link_service(config, repository);

    match action {
        LinkAction::Create { url, alias } => {
            println!("{}", "Create short link".bright_blue().bold());
            println!();

            let long_url = match url {
                Some(u) => u,
                None => Input::<String>::new().with_prompt("Long URL").interact_text()?,
            };

            validate_long_url(&long_url).context("Invalid long URL")?;
            if let Some(alias) = &alias {
                validate_alias(alias).context("Invalid alias")?;
            }

            let link = service
                .create(long_url, alias)
                .await
                .map_err(|e| anyhow::anyhow!("Failed to create link: {}", e))?;

            println!("  Long URL:  {}", link.long_url.cyan());
            println!(
                "  Short URL: {}",
                short_url(&config.base_url, &link.short_code)
                    .bright_yellow()
                    .bold()
            );
            if let Some(alias) = &link.custom_alias {
                println!("  Alias:     {}", alias.cyan());
            }
            println!();
            println!("{}", "Done".green().bold());
        }
        LinkAction::Resolve { code } => {
            let resolution = service
                .resolve(&code)
                .await
                .map_err(|e| anyhow::anyhow!("Failed to resolve '{}': {}", code, e))?;

            println!("  Long URL: {}", resolution.long_url.cyan());
            println!(
                "  Visits:   {}",
                resolution.stats.visit_count.to_string().bright_green().bold()
            );
            if let Some(expires) = resolution.stats.expiration_date {
                println!("  Expires:  {}", expires.format("%Y-%m-%d %H:%M"));
            }
        }
        LinkAction::List {
            page,
            limit,
            sort_by,
        } => {
            let sort_by = match sort_by.as_deref() {
                Some(spec) => parse_sort_by(spec).map_err(anyhow::Error::msg)?,
                None => Vec::new(),
            };

            let result = service
                .list(
                    LinkFilter::default(),
                    PageRequest {
                        sort_by,
                        limit,
                        page,
                    },
                )
                .await
                .map_err(|e| anyhow::anyhow!("Failed to list links: {}", e))?;

            if result.results.is_empty() {
                println!("{}", "  No links found".yellow());
                return Ok(());
            }

            println!(
                "  {:<10} {:<16} {:>8}  {}",
                "Code".bright_white().bold(),
                "Alias".bright_white().bold(),
                "Visits".bright_white().bold(),
                "Long URL".bright_white().bold()
            );
            println!("  {}", "-".repeat(72).bright_black());

            for link in &result.results {
                println!(
                    "  {:<10} {:<16} {:>8}  {}",
                    link.short_code.cyan(),
                    link.custom_alias.as_deref().unwrap_or("-"),
                    link.visit_count,
                    link.long_url
                );
            }

            println!();
            println!(
                "  Page {} of {} ({} links)",
                result.page,
                result.total_pages.max(1),
                result.total_results.to_string().bright_white().bold()
            );
        }
    }

    Ok(())
}

async fn handle_db_action(action: DbAction, config: &Config) -> Result<()> {
    match action {
        DbAction::Check => {
            println!("{}", "Checking database connection...".bright_blue());

            let pool = connect_pool(config).await?;
            sqlx::query("SELECT 1")
                .execute(&pool)
                .await
                .context("Database query failed")?;

            let links: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM links")
                .fetch_one(&pool)
                .await
                .unwrap_or(0);

            println!("{}", "Database connection OK".green().bold());
            println!("  Links: {}", links.to_string().bright_green());
        }
    }

    Ok(())
}
