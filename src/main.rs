//! Terminal front-end for the URL shortening API.
//!
//! # Usage
//!
//! ```bash
//! # Shorten one URL (prompts when the URL is omitted)
//! shortener shorten https://example.com/some/long/path --alias my-link --expires 2030-01-01
//!
//! # Shorten a list, one URL per line, from a file or stdin
//! shortener bulk --file urls.txt --csv results.csv
//!
//! # Browse history
//! shortener history --page 2 --limit 20
//! shortener history --all
//!
//! # Click analytics
//! shortener analytics my-link
//!
//! # Check configuration
//! shortener config check
//! ```
//!
//! # Environment Variables
//!
//! - `SHORTENER_BASE_URL` (required): API base URL
//! - `APP_ENV=development` or `--debug`: show error details
//!
//! See [`url_shortener_client::config`] for the full list.

use url_shortener_client::application::services::{
    AnalyticsPanel, BulkShortenForm, HistoryController, InfiniteHistory, RateLimitTracker,
    ShortenForm, ShortenRequest, TOP_REFERRERS_SHOWN, results_csv,
};
use url_shortener_client::config::{self, Config};
use url_shortener_client::domain::entities::{HistoryItem, PageSize};
use url_shortener_client::error::ClientError;
use url_shortener_client::infrastructure::cache::HistoryCache;
use url_shortener_client::infrastructure::http::HttpShortenerApi;
use url_shortener_client::telemetry;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Input;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tokio::io::AsyncReadExt;

/// Command-line client for the URL shortener.
#[derive(Parser)]
#[command(name = "shortener")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Show error details
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level commands.
#[derive(Subcommand)]
enum Commands {
    /// Shorten a single URL
    Shorten {
        /// Long URL (prompted for when omitted)
        url: Option<String>,

        /// Custom alias (3-20 letters, digits, '-' or '_')
        #[arg(short, long)]
        alias: Option<String>,

        /// Expiration date (YYYY-MM-DD)
        #[arg(short, long)]
        expires: Option<NaiveDate>,
    },

    /// Shorten many URLs, one per line
    Bulk {
        /// Read URLs from a file instead of stdin
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Expiration date (YYYY-MM-DD)
        #[arg(short, long)]
        expires: Option<NaiveDate>,

        /// Write results as CSV
        #[arg(long)]
        csv: Option<PathBuf>,
    },

    /// Show previously shortened URLs
    History {
        /// Page to show
        #[arg(short, long, default_value_t = 1)]
        page: u32,

        /// Items per page (5, 10, 20 or 50)
        #[arg(short, long)]
        limit: Option<u32>,

        /// Load every page
        #[arg(long, conflicts_with = "page")]
        all: bool,
    },

    /// Show click analytics for a short link
    Analytics {
        /// Short ID or alias
        short_id: String,
    },

    /// Configuration tools
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Configuration subcommands.
#[derive(Subcommand)]
enum ConfigAction {
    /// Check environment variables without contacting the API
    Check,
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = config::load_from_env();
    let show_details = cli.debug || config.as_ref().is_ok_and(Config::is_development);

    match run(cli, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report_failure(&e, show_details);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli, config: Result<Config>) -> Result<()> {
    if let Commands::Config {
        action: ConfigAction::Check,
    } = cli.command
    {
        return check_config();
    }

    let config = match config {
        Ok(config) => config,
        Err(e) => return Err(fail(Some(e.to_string()), ClientError::Config(e.to_string()))),
    };
    telemetry::init(&config.log_level, &config.log_format)?;
    if cli.debug {
        config.print_summary();
    }

    let api = Arc::new(
        HttpShortenerApi::new(&config.base_url)
            .map_err(|e| anyhow::anyhow!("Failed to create API client: {}", e))?,
    );

    match cli.command {
        Commands::Shorten {
            url,
            alias,
            expires,
        } => shorten(api, url, alias, expires).await,
        Commands::Bulk { file, expires, csv } => bulk(api, file, expires, csv).await,
        Commands::History { page, limit, all } => {
            let limit = match limit {
                Some(limit) => PageSize::try_from(limit).map_err(|e| fail(None, e))?,
                None => config.history_page_size,
            };
            if all {
                history_all(api, &config, limit).await
            } else {
                history_page(api, &config, page, limit).await
            }
        }
        Commands::Analytics { short_id } => analytics(api, &short_id).await,
        Commands::Config { .. } => Ok(()),
    }
}

/// Top-level error boundary.
///
/// Errors the user can act on were already printed by the command, so only
/// the generic notice is added here. Details are shown in development mode.
fn report_failure(error: &anyhow::Error, show_details: bool) {
    let already_shown = error.downcast_ref::<ClientError>().is_some();

    if !already_shown {
        eprintln!();
        eprintln!("{}", "❌ Something went wrong".red().bold());
        eprintln!("   Please try again. If the problem persists, run `shortener config check`.");
    }

    if show_details {
        eprintln!();
        eprintln!("{}", "Details:".bright_black());
        for cause in error.chain() {
            eprintln!("  {}", cause.to_string().bright_black());
        }
    }
}

/// Prints a user-facing error and hands it to the error boundary.
fn fail(message: Option<String>, error: ClientError) -> anyhow::Error {
    let message = message.unwrap_or_else(|| error.to_string());
    eprintln!("{} {}", "❌".red(), message.red());
    error.into()
}

fn check_config() -> Result<()> {
    println!("{}", "🔧 Configuration check".bright_blue().bold());
    println!();

    let report = config::check_environment();

    if let Some(config) = report.config.as_ref() {
        println!("  API base URL:      {}", config.base_url.as_str().cyan());
        println!("  Log level:         {}", config.log_level.cyan());
        println!("  Log format:        {}", config.log_format.cyan());
        println!(
            "  History cache TTL: {}",
            format!("{}s", config.history_cache_ttl_seconds).cyan()
        );
        println!(
            "  History page size: {}",
            config.history_page_size.to_string().cyan()
        );
        println!("  Environment:       {}", config.app_env.cyan());
        println!();
        println!("{}", "✅ Configuration is valid".green().bold());
        return Ok(());
    }

    for error in &report.errors {
        println!("  {} {}", "✗".red(), error);
    }
    println!();

    Err(ClientError::Config(format!("{} configuration problem(s) found", report.errors.len())).into())
}

async fn shorten(
    api: Arc<HttpShortenerApi>,
    url: Option<String>,
    alias: Option<String>,
    expires: Option<NaiveDate>,
) -> Result<()> {
    println!("{}", "🔗 Shorten URL".bright_blue().bold());
    println!();

    let (url, alias) = match url {
        Some(url) => (url, alias),
        None => {
            let url: String = Input::new().with_prompt("Long URL").interact_text()?;
            let alias = match alias {
                Some(alias) => Some(alias),
                None => {
                    let entered: String = Input::new()
                        .with_prompt("Custom alias (optional)")
                        .allow_empty(true)
                        .interact_text()?;
                    Some(entered).filter(|a| !a.trim().is_empty())
                }
            };
            (url, alias)
        }
    };

    let mut request = ShortenRequest::new(url);
    request.alias = alias;
    request.expiry = expires;

    let form = ShortenForm::new(api, Arc::new(RateLimitTracker::new()));
    let result = match form.submit(request).await {
        Ok(result) => result,
        Err(e) => return Err(fail(form.snapshot().error, e)),
    };

    println!("{}", "✅ URL shortened successfully!".green().bold());
    println!();
    println!("  Short URL: {}", result.short_url.bright_yellow().bold());
    println!("  Original:  {}", result.original_url.cyan());
    if !result.alias.is_empty() {
        println!("  Alias:     {}", result.alias.cyan());
    }
    if let Some(expires) = expires {
        println!("  Expires:   {}", expires.to_string().bright_black());
    }
    println!();

    Ok(())
}

async fn bulk(
    api: Arc<HttpShortenerApi>,
    file: Option<PathBuf>,
    expires: Option<NaiveDate>,
    csv: Option<PathBuf>,
) -> Result<()> {
    println!("{}", "📦 Bulk shorten".bright_blue().bold());
    println!();

    let input = match file {
        Some(path) => tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?,
        None => {
            let mut input = String::new();
            tokio::io::stdin()
                .read_to_string(&mut input)
                .await
                .context("Failed to read URLs from stdin")?;
            input
        }
    };

    let form = BulkShortenForm::new(api, Arc::new(RateLimitTracker::new()));
    let results = match form.submit(&input, expires).await {
        Ok(results) => results,
        Err(e) => return Err(fail(form.snapshot().error, e)),
    };

    println!(
        "{}",
        format!("✅ Successfully shortened {} URLs!", results.len())
            .green()
            .bold()
    );
    println!();
    for result in &results {
        println!(
            "  {} {} {}",
            result.short_url.bright_yellow(),
            "←".bright_black(),
            result.original_url.cyan()
        );
    }
    println!();

    if let Some(path) = csv {
        tokio::fs::write(&path, results_csv(&results))
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;
        println!("  Saved CSV to {}", path.display().to_string().bright_white());
        println!();
    }

    Ok(())
}

async fn history_page(
    api: Arc<HttpShortenerApi>,
    config: &Config,
    page: u32,
    limit: PageSize,
) -> Result<()> {
    println!("{}", "📋 History".bright_blue().bold());
    println!();

    let cache = Arc::new(HistoryCache::new(config.history_cache_ttl()));
    let controller = HistoryController::with_page_size(api, cache, limit);

    if let Err(e) = controller.load().await {
        return Err(fail(controller.snapshot().error, e));
    }

    if page != 1 {
        let total_pages = controller.snapshot().pagination.total_pages;
        if page > total_pages || page == 0 {
            println!(
                "{}",
                format!("⚠️  Page {page} does not exist, showing page 1 of {total_pages}")
                    .yellow()
            );
            println!();
        } else if let Err(e) = controller.go_to_page(page).await {
            return Err(fail(controller.snapshot().error, e));
        }
    }

    let view = controller.snapshot();
    print_history(&view.items);
    println!(
        "  Page {} of {} ({} total, {} per page)",
        view.pagination.current_page.to_string().bright_white().bold(),
        view.pagination.total_pages.to_string().bright_white().bold(),
        view.pagination.total_items.to_string().bright_white(),
        view.pagination.items_per_page
    );
    println!();

    Ok(())
}

async fn history_all(api: Arc<HttpShortenerApi>, config: &Config, limit: PageSize) -> Result<()> {
    println!("{}", "📋 History (all pages)".bright_blue().bold());
    println!();

    let cache = Arc::new(HistoryCache::new(config.history_cache_ttl()));
    let controller = InfiniteHistory::with_page_size(api, cache, limit);

    let loading = async {
        controller.load().await?;
        while controller.snapshot().has_more {
            controller.on_visibility_change(true).await?;
        }
        Ok::<(), ClientError>(())
    };

    let interrupted = tokio::select! {
        result = loading => {
            if let Err(e) = result {
                return Err(fail(controller.snapshot().error, e));
            }
            false
        }
        _ = tokio::signal::ctrl_c() => {
            controller.close();
            true
        }
    };

    let view = controller.snapshot();
    print_history(&view.items);
    println!(
        "  Loaded {} of {} items",
        view.items.len().to_string().bright_white().bold(),
        view.total_items.to_string().bright_white().bold()
    );
    if interrupted {
        println!("{}", "  Interrupted, remaining pages skipped".yellow());
    }
    println!();

    Ok(())
}

fn print_history(items: &[HistoryItem]) {
    if items.is_empty() {
        println!("{}", "  No shortened URLs yet".yellow());
        println!();
        return;
    }

    println!(
        "  {:<32} {:<17} {:>7}  {}",
        "Short URL".bright_white().bold(),
        "Created".bright_white().bold(),
        "Clicks".bright_white().bold(),
        "Original URL".bright_white().bold()
    );
    println!("  {}", "─".repeat(90).bright_black());

    for item in items {
        println!(
            "  {:<32} {:<17} {:>7}  {}",
            item.short_url.bright_yellow(),
            item.created_at
                .format("%Y-%m-%d %H:%M")
                .to_string()
                .bright_black(),
            item.clicks.to_string().green(),
            item.original_url.cyan()
        );
    }
    println!();
}

async fn analytics(api: Arc<HttpShortenerApi>, short_id: &str) -> Result<()> {
    println!("{}", "📊 Analytics".bright_blue().bold());
    println!();

    let panel = AnalyticsPanel::new(api);
    let summary = match panel.load(short_id).await {
        Ok(Some(summary)) => summary,
        Ok(None) => {
            println!("{}", "  Enter a short ID to see its analytics".yellow());
            return Ok(());
        }
        Err(e) => return Err(fail(panel.snapshot().error, e)),
    };

    println!("  Link:           {}", short_id.trim().cyan());
    println!(
        "  Total clicks:   {}",
        summary.total_clicks.to_string().bright_green().bold()
    );
    println!(
        "  Unique clicks:  {}",
        summary.unique_clicks.to_string().bright_green().bold()
    );
    println!(
        "  Today:          {}",
        summary.today_clicks.to_string().bright_green()
    );
    println!(
        "  Avg per day:    {}",
        format!("{:.1}", summary.avg_clicks_per_day).bright_green()
    );
    match summary.last_click_date {
        Some(date) => println!(
            "  Last click:     {}",
            date.format("%Y-%m-%d %H:%M").to_string().bright_black()
        ),
        None => println!("  Last click:     {}", "never".bright_black()),
    }

    let referrers = summary.top_referrers(TOP_REFERRERS_SHOWN);
    if !referrers.is_empty() {
        println!();
        println!("{}", "  Top referrers".bright_white().bold());
        for referrer in referrers {
            println!(
                "    {:<30} {}",
                referrer.label().cyan(),
                referrer.count.to_string().bright_white()
            );
        }
    }
    println!();

    Ok(())
}
