//! CLI administration tool for linkdrop.
//!
//! Creates and inspects short links, shows totals and checks the database
//! without going through the HTTP API.
//!
//! # Usage
//!
//! ```bash
//! # Create a short link (prompts for the URL when omitted)
//! cargo run --bin linkdrop-admin -- link create https://example.com --code promo
//!
//! # Show a link and its click count
//! cargo run --bin linkdrop-admin -- link show promo
//!
//! # View statistics
//! cargo run --bin linkdrop-admin -- stats
//!
//! # Check database connection
//! cargo run --bin linkdrop-admin -- db check
//! ```
//!
//! # Environment Variables
//!
//! Same as the server; a database (`DATABASE_URL` or `DB_*`) is required.

use linkdrop::application::services::LinkService;
use linkdrop::config;
use linkdrop::infrastructure::persistence::PgLinkRepository;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::{Confirm, Input};
use sqlx::PgPool;
use std::sync::Arc;

/// CLI tool for managing linkdrop.
#[derive(Parser)]
#[command(name = "linkdrop-admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level command groups.
#[derive(Subcommand)]
enum Commands {
    /// Manage short links
    Link {
        #[command(subcommand)]
        action: LinkAction,
    },

    /// Show statistics
    Stats,

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
        /// Target URL (prompted for when omitted)
        url: Option<String>,

        /// Custom short code (generated when omitted)
        #[arg(short, long)]
        code: Option<String>,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Show a link and its click count
    Show {
        /// Short code
        code: String,
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
    let database_url = config
        .database_url
        .clone()
        .context("A database must be configured (DATABASE_URL or DB_*)")?;

    let pool = PgPool::connect(&database_url)
        .await
        .context("Failed to connect to database")?;
    let repo = Arc::new(PgLinkRepository::new(Arc::new(pool.clone())));
    let service = LinkService::new(
        repo,
        config.base_url.clone(),
        config.code_length,
        config.store_timeout(),
    );

    match cli.command {
        Commands::Link { action } => handle_link_action(action, &service).await?,
        Commands::Stats => handle_stats(&service).await?,
        Commands::Db { action } => handle_db_action(action, &pool).await?,
    }

    Ok(())
}

async fn handle_link_action(
    action: LinkAction,
    service: &LinkService<PgLinkRepository>,
) -> Result<()> {
    match action {
        LinkAction::Create { url, code, yes } => create_link(service, url, code, yes).await?,
        LinkAction::Show { code } => show_link(service, &code).await?,
    }

    Ok(())
}

/// Creates a short link with interactive prompts.
///
/// The same allocator as `POST /api/shorten` is used, so validation and
/// conflict rules are identical.
async fn create_link(
    service: &LinkService<PgLinkRepository>,
    url: Option<String>,
    code: Option<String>,
    skip_confirm: bool,
) -> Result<()> {
    println!("{}", "🔗 Create Short Link".bright_blue().bold());
    println!();

    let url = match url {
        Some(u) => u,
        None => Input::new()
            .with_prompt("Target URL")
            .with_initial_text("https://")
            .interact_text()?,
    };

    println!("  URL:  {}", url.cyan());
    match &code {
        Some(c) => println!("  Code: {}", c.bright_yellow()),
        None => println!("  Code: {}", "(generated)".bright_black()),
    }
    println!();

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt("Create this link?")
            .default(true)
            .interact()?;

        if !confirmed {
            println!("{}", "❌ Cancelled".red());
            return Ok(());
        }
    }

    let allocation = service
        .create_short_link(&url, code)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create link: {}", e))?;

    println!("{}", "✅ Link created".green().bold());
    println!();
    println!("  Short URL: {}", allocation.short_url.bright_green().bold());
    println!("  Code:      {}", allocation.link.code.bright_yellow());
    println!();

    Ok(())
}

async fn show_link(service: &LinkService<PgLinkRepository>, code: &str) -> Result<()> {
    let link = service
        .get_link_by_code(code)
        .await
        .map_err(|e| anyhow::anyhow!("{}: {}", code, e))?;

    println!("{}", "🔎 Short Link".bright_blue().bold());
    println!();
    println!("  Code:      {}", link.code.bright_yellow());
    println!("  Short URL: {}", service.get_short_url(&link).bright_green());
    println!("  Target:    {}", link.original_url.cyan());
    println!(
        "  Clicks:    {}",
        link.clicks.to_string().bright_white().bold()
    );
    println!(
        "  Created:   {}",
        link.created_at
            .format("%Y-%m-%d %H:%M")
            .to_string()
            .bright_black()
    );
    println!();

    Ok(())
}

/// Displays link and click totals.
async fn handle_stats(service: &LinkService<PgLinkRepository>) -> Result<()> {
    println!("{}", "📊 Statistics".bright_blue().bold());
    println!();

    let stats = service
        .stats()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to read statistics: {}", e))?;

    println!(
        "  Links:  {}",
        stats.links.to_string().bright_green().bold()
    );
    println!(
        "  Clicks: {}",
        stats.clicks.to_string().bright_green().bold()
    );
    println!();

    Ok(())
}

async fn handle_db_action(action: DbAction, pool: &PgPool) -> Result<()> {
    match action {
        DbAction::Check => {
            println!("{}", "🔍 Checking database connection...".bright_blue());

            sqlx::query("SELECT 1").fetch_one(pool).await?;

            println!("{}", "✅ Database connection OK".green().bold());
        }
    }

    Ok(())
}
