// src/cli.rs
// =============================================================================
// Command-line interface, defined with clap's derive API.
//
// Every subcommand works on ONE page URL. Options that shape how links are
// resolved (timeout, fallback host, headers, concurrency) are global and can
// be given before or after the subcommand.
// =============================================================================

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::{DEFAULT_FALLBACK_HOST, DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT};

#[derive(Parser, Debug)]
#[command(
    name = "solicitation-scraper",
    version = "0.1.0",
    about = "Extract, classify and structure the document links of a solicitation page",
    long_about = "solicitation-scraper fetches one page, finds the documents it links to \
                  (following the portal's redirect pages to the real file) and can split the \
                  page into sections by its headings."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub options: GlobalOptions,
}

#[derive(Args, Debug)]
pub struct GlobalOptions {
    /// Per-request timeout in seconds
    #[arg(long, global = true, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout: u64,

    /// Host that redirect pages are fetched from on the second attempt
    #[arg(long, global = true, default_value = DEFAULT_FALLBACK_HOST)]
    pub fallback_host: String,

    /// User-Agent header sent with every request
    #[arg(long, global = true, default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,

    /// Referer header sent with every request (defaults to the fallback host)
    #[arg(long, global = true)]
    pub referer: Option<String>,

    /// How many links to resolve at the same time
    #[arg(long, global = true, default_value_t = 1)]
    pub concurrency: usize,

    /// More logging (-v debug, -vv trace); RUST_LOG takes precedence
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the documents a page links to
    ///
    /// Example: solicitation-scraper links https://example.gov/2018-Solicitation --output links.json
    Links {
        /// Page URL to scan
        page_url: String,

        /// Only consider links inside tables
        #[arg(long)]
        tables_only: bool,

        /// Write the links as a JSON array to this file
        #[arg(long)]
        output: Option<PathBuf>,

        /// Print the JSON array instead of a summary
        #[arg(long)]
        json: bool,
    },

    /// Split a page into nested sections by its headings
    ///
    /// Example: solicitation-scraper structure https://example.gov/2018-Solicitation --output structure.json
    Structure {
        /// Page URL to structure
        page_url: String,

        /// Write the section tree to this file
        #[arg(long)]
        output: Option<PathBuf>,

        /// Write the link statistics to this file
        #[arg(long)]
        stats_output: Option<PathBuf>,

        /// Print sections and statistics as JSON instead of a summary
        #[arg(long)]
        json: bool,
    },

    /// Save the readable text of a page
    Text {
        /// Page URL to read
        page_url: String,

        /// Keep header, footer and navigation text
        #[arg(long)]
        keep_chrome: bool,

        /// Write the text to this file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_links_with_global_options() {
        let cli = Cli::try_parse_from([
            "solicitation-scraper",
            "links",
            "https://example.gov/page",
            "--tables-only",
            "--concurrency",
            "4",
            "-vv",
        ])
        .unwrap();

        assert_eq!(cli.options.concurrency, 4);
        assert_eq!(cli.options.verbose, 2);
        assert_eq!(cli.options.timeout, 20);
        match cli.command {
            Commands::Links {
                page_url,
                tables_only,
                output,
                json,
            } => {
                assert_eq!(page_url, "https://example.gov/page");
                assert!(tables_only);
                assert!(output.is_none());
                assert!(!json);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_structure_outputs() {
        let cli = Cli::try_parse_from([
            "solicitation-scraper",
            "--timeout",
            "5",
            "structure",
            "https://example.gov/page",
            "--output",
            "out/structure.json",
            "--stats-output",
            "out/stats.json",
        ])
        .unwrap();

        assert_eq!(cli.options.timeout, 5);
        assert!(matches!(cli.command, Commands::Structure { output: Some(_), stats_output: Some(_), .. }));
    }

    #[test]
    fn test_page_url_is_required() {
        assert!(Cli::try_parse_from(["solicitation-scraper", "text"]).is_err());
    }
}
