//! Command-line interface definitions.
//!
//! Global options can be provided via flags or environment variables and
//! apply to both subcommands.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Command-line arguments for the Banner metadata extractor.
///
/// # Examples
///
/// ```sh
/// # Print a summary of one article
/// banner_meta extract https://www.thebaltimorebanner.com/community/some-story/
///
/// # Write the JSON record to a file, dumping the raw page for inspection
/// banner_meta --debug-dir ./dumps extract --json -o story.json <URL>
///
/// # Serve the HTML form with a subscriber session cookie
/// BANNER_COOKIE='session=...' banner_meta serve --bind 0.0.0.0:5000
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// YAML file overriding the built-in extraction rules
    #[arg(long, global = true, env = "BANNER_RULES")]
    pub rules: Option<PathBuf>,

    /// Directory where every fetched page is saved as HTML
    #[arg(long, global = true, env = "BANNER_DEBUG_DIR")]
    pub debug_dir: Option<String>,

    /// Raw Cookie header for a pre-established subscriber session
    #[arg(long, global = true, env = "BANNER_COOKIE", hide_env_values = true)]
    pub cookie: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true, default_value_t = 30)]
    pub timeout_secs: u64,

    /// Skip the home page request that seeds the cookie jar
    #[arg(long, global = true)]
    pub no_warm_up: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Extract metadata from a single article
    Extract {
        /// Article URL on the configured site
        url: String,

        /// Print the result as JSON instead of a text summary
        #[arg(long)]
        json: bool,

        /// Write the JSON result to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Serve the HTML form
    Serve {
        /// Address to listen on
        #[arg(long, default_value = "127.0.0.1:5000")]
        bind: String,
    },
}
