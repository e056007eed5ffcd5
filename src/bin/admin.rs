//! CLI administration tool for shortlink.
//!
//! Talks to the configured store directly, without going through the HTTP API.
//!
//! # Usage
//!
//! ```bash
//! # Create a short link (prompts for the URL when omitted)
//! cargo run --bin admin -- link create https://example.com --code promo
//!
//! # Look up where a code points
//! cargo run --bin admin -- link resolve promo
//!
//! # Show a client's creation quota
//! cargo run --bin admin -- quota show 203.0.113.7
//!
//! # Check store connection
//! cargo run --bin admin -- store check
//! ```
//!
//! # Environment Variables
//!
//! Same as the server (`REDIS_URL` or `REDIS_HOST`/`REDIS_PORT`/...). Without
//! a Redis configuration the tool runs against a throwaway in-memory store.

use shortlink::AppError;
use shortlink::config::{self, Config, mask_connection_string};
use shortlink::server::{build_state, connect_store};

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Input;

/// CLI tool for managing shortlink.
#[derive(Parser)]
#[command(name = "admin")]
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

    /// Inspect per-client creation quotas
    Quota {
        #[command(subcommand)]
        action: QuotaAction,
    },

    /// Store operations
    Store {
        #[command(subcommand)]
        action: StoreAction,
    },
}

/// Link subcommands.
#[derive(Subcommand)]
enum LinkAction {
    /// Create a short link
    Create {
        /// Original URL
        url: Option<String>,

        /// Custom short code (random if omitted)
        #[arg(short, long)]
        code: Option<String>,

        /// Client the creation is accounted to
        #[arg(long, default_value = "admin")]
        client: String,
    },

    /// Show the URL a code points to
    Resolve {
        code: String,
    },
}

/// Quota subcommands.
#[derive(Subcommand)]
enum QuotaAction {
    /// Show remaining quota without consuming it
    Show {
        /// Client identifier, usually an IP address
        client: String,
    },
}

/// Store subcommands.
#[derive(Subcommand)]
enum StoreAction {
    /// Check store connection
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = config::load_from_env()?;

    if !config.is_redis_enabled() {
        println!(
            "{}",
            "⚠️  No Redis configured, using a throwaway in-memory store".yellow()
        );
        println!();
    }

    match cli.command {
        Commands::Link { action } => handle_link_action(action, &config).await?,
        Commands::Quota { action } => handle_quota_action(action, &config).await?,
        Commands::Store { action } => handle_store_action(action, &config).await?,
    }

    Ok(())
}

/// Dispatches link commands.
async fn handle_link_action(action: LinkAction, config: &Config) -> Result<()> {
    let store = connect_store(config).await?;
    let state = build_state(config, store);

    match action {
        LinkAction::Create { url, code, client } => {
            println!("{}", "🔗 Create Short Link".bright_blue().bold());
            println!();

            let url = match url {
                Some(u) => u,
                None => Input::new()
                    .with_prompt("URL to shorten")
                    .interact_text()?,
            };

            match state
                .link_service
                .create_short_link(&client, url, code)
                .await
            {
                Ok(created) => {
                    println!("{}", "✅ Short link created".green().bold());
                    println!();
                    println!("  Code:     {}", created.mapping.code.bright_yellow().bold());
                    println!("  Short:    {}", created.short_url.cyan());
                    println!("  Original: {}", created.mapping.url);
                    println!(
                        "  Expires:  {}",
                        created
                            .mapping
                            .expires_at
                            .format("%Y-%m-%d %H:%M UTC")
                            .to_string()
                            .bright_black()
                    );
                    println!(
                        "  Quota:    {} left, resets in {} min",
                        created.rate_limit.remaining.to_string().bright_white(),
                        created.rate_limit.reset_in_minutes()
                    );
                    println!();
                }
                Err(e) => print_failure(&e),
            }
        }
        LinkAction::Resolve { code } => match state.link_service.resolve(&code).await {
            Ok(url) => {
                println!("  {} → {}", code.bright_yellow(), url.cyan());
            }
            Err(e) => print_failure(&e),
        },
    }

    Ok(())
}

/// Dispatches quota commands.
async fn handle_quota_action(action: QuotaAction, config: &Config) -> Result<()> {
    let store = connect_store(config).await?;
    let state = build_state(config, store);

    match action {
        QuotaAction::Show { client } => {
            println!("{}", "📊 Creation Quota".bright_blue().bold());
            println!();

            let limiter = state.link_service.rate_limiter();
            let status = limiter.status(&client).await?;
            let policy = limiter.policy();

            let remaining = if status.allowed {
                status.remaining.to_string().green()
            } else {
                status.remaining.to_string().red()
            };

            println!("  Client:    {}", client.cyan());
            println!("  Remaining: {} / {}", remaining, policy.quota);
            println!(
                "  Resets in: {}s ({} min)",
                status.reset_in.as_secs(),
                status.reset_in_minutes()
            );
            println!();
        }
    }

    Ok(())
}

/// Dispatches store commands.
async fn handle_store_action(action: StoreAction, config: &Config) -> Result<()> {
    match action {
        StoreAction::Check => {
            println!("{}", "🔍 Checking store connection...".bright_blue());

            if let Some(redis_url) = &config.redis_url {
                println!("  Redis: {}", mask_connection_string(redis_url).bright_black());
            }

            match connect_store(config).await {
                Ok(store) if store.health_check().await => {
                    println!("{}", "✅ Store connection OK".green().bold());
                }
                Ok(_) => {
                    println!("{}", "❌ Store did not answer the health probe".red().bold());
                }
                Err(e) => {
                    println!("{}", "❌ Store connection failed".red().bold());
                    println!("  Error: {:#}", e);
                }
            }
        }
    }

    Ok(())
}

fn print_failure(err: &AppError) {
    println!(
        "{} {}",
        format!("❌ {}", err.status()).red().bold(),
        err.to_string().red()
    );
    if let AppError::Storage(cause) = err {
        println!("  Cause: {}", cause.to_string().bright_black());
    }
}
