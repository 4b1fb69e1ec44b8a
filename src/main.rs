// src/main.rs
// =============================================================================
// Entry point of the solicitation-scraper CLI.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Set up logging (stderr, so JSON on stdout stays clean)
// 3. Build the shared HTTP client and link resolver from the global options
// 4. Fetch the page and dispatch to the subcommand handler
// 5. Exit with proper code (0 = success, 2 = error)
// =============================================================================

mod cli;
mod config;
mod dom;
mod error;
mod extract;
mod fetch;
mod report;
mod resolver;
mod structure;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use reqwest::Client;
use tracing::{debug, info};

use cli::{Cli, Commands, GlobalOptions};
use config::ScrapeConfig;
use extract::LinkScope;
use resolver::LinkResolver;

#[tokio::main]
async fn main() {
    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

async fn run() -> Result<i32> {
    let cli = Cli::parse();
    init_logging(cli.options.verbose);
    debug!(?cli, "CLI arguments parsed");

    let config = build_config(&cli.options)?;
    let client = config.build_client().context("cannot build HTTP client")?;

    match cli.command {
        Commands::Links {
            page_url,
            tables_only,
            output,
            json,
        } => {
            let scope = if tables_only {
                LinkScope::TablesOnly
            } else {
                LinkScope::WholePage
            };
            handle_links(&client, &config, &page_url, scope, output, json).await
        }
        Commands::Structure {
            page_url,
            output,
            stats_output,
            json,
        } => handle_structure(&client, &config, &page_url, output, stats_output, json).await,
        Commands::Text {
            page_url,
            keep_chrome,
            output,
        } => handle_text(&client, &page_url, keep_chrome, output).await,
    }
}

// Priority: RUST_LOG env var > verbose flag > default (info)
fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn build_config(options: &GlobalOptions) -> Result<ScrapeConfig> {
    let config = ScrapeConfig {
        timeout: Duration::from_secs(options.timeout),
        user_agent: options.user_agent.clone(),
        referer: options
            .referer
            .clone()
            .unwrap_or_else(|| options.fallback_host.clone()),
        concurrency: options.concurrency.max(1),
        ..ScrapeConfig::default()
    };
    config
        .with_fallback_host(&options.fallback_host)
        .context("invalid --fallback-host")
}

async fn handle_links(
    client: &Client,
    config: &ScrapeConfig,
    page_url: &str,
    scope: LinkScope,
    output: Option<PathBuf>,
    json: bool,
) -> Result<i32> {
    info!("🔍 Extracting links from {}", page_url);
    let html = fetch::fetch_page(client, page_url).await?;

    let resolver = LinkResolver::new(client.clone(), config);
    let links = extract::extract_links(&html, page_url, &resolver, scope, config.concurrency).await?;

    if let Some(path) = &output {
        report::write_json(path, &links)?;
        info!("Saved {} link(s) to {}", links.len(), path.display());
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&links)?);
    } else {
        report::print_link_summary(&links);
    }
    Ok(0)
}

async fn handle_structure(
    client: &Client,
    config: &ScrapeConfig,
    page_url: &str,
    output: Option<PathBuf>,
    stats_output: Option<PathBuf>,
    json: bool,
) -> Result<i32> {
    info!("🔍 Structuring {}", page_url);
    let html = fetch::fetch_page(client, page_url).await?;

    let resolver = LinkResolver::new(client.clone(), config);
    let page = structure::structure_page(&html, page_url, &resolver, config.concurrency).await?;

    if let Some(path) = &output {
        report::write_json(path, &page.sections)?;
        info!("Saved section tree to {}", path.display());
    }
    if let Some(path) = &stats_output {
        report::write_json(path, &page.stats)?;
        info!("Saved link statistics to {}", path.display());
    }

    if json {
        let combined = serde_json::json!({
            "sections": &page.sections,
            "link_stats": &page.stats,
        });
        println!("{}", serde_json::to_string_pretty(&combined)?);
    } else {
        report::print_outline(&page.sections);
        println!();
        report::print_link_stats(&page.stats);
    }
    Ok(0)
}

async fn handle_text(
    client: &Client,
    page_url: &str,
    keep_chrome: bool,
    output: Option<PathBuf>,
) -> Result<i32> {
    let html = fetch::fetch_page(client, page_url).await?;
    let text = extract::page_text(&html, keep_chrome);

    match &output {
        Some(path) => {
            report::write_text(path, &text)?;
            info!("Saved {} character(s) of text to {}", text.len(), path.display());
        }
        None => println!("{}", text),
    }
    Ok(0)
}
