//! # Banner Meta
//!
//! Extracts structured metadata from Baltimore Banner news articles: the
//! headline and its word count, the publication date in a canonical form, the
//! body word count, and the article's images with alt text.
//!
//! ## Usage
//!
//! ```sh
//! banner_meta extract https://www.thebaltimorebanner.com/community/some-story/
//! banner_meta serve --bind 127.0.0.1:5000
//! ```
//!
//! ## Architecture
//!
//! 1. **Rules**: selector lists and thresholds load from YAML (or built-in
//!    defaults) and are compiled once at startup
//! 2. **Acquisition**: an [`acquire::Acquirer`] session fetches the page
//! 3. **Extraction**: independent heuristic extractors run over the parsed
//!    document and the results are assembled into one record
//! 4. **Output**: a text summary, JSON, or the HTML form

use clap::Parser;
use std::error::Error;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod acquire;
mod cli;
mod error;
mod extract;
mod models;
mod outputs;
mod rules;
mod utils;
mod web;

use acquire::{Acquirer, HttpAcquirer, HttpSettings};
use cli::{Cli, Command};
use outputs::{json, report};
use rules::{CompiledRules, ExtractionRules};
use utils::{check_site_url, ensure_writable_dir};

/// Exit status when the article could not be extracted.
const EXIT_EXTRACTION_FAILED: i32 = 2;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .with_writer(std::io::stderr)
        .init();

    let args = Cli::parse();
    debug!(?args.rules, ?args.debug_dir, timeout_secs = args.timeout_secs, "Parsed CLI arguments");

    // Rule problems surface before any URL is processed.
    let rules = load_rules(args.rules.as_deref())?;
    info!(version = %rules.config.version, "Extraction rules ready");

    if let Some(dir) = &args.debug_dir {
        if let Err(e) = ensure_writable_dir(dir).await {
            error!(path = %dir, error = %e, "Debug directory is not writable");
            return Err(e);
        }
    }

    let settings = HttpSettings {
        timeout: Duration::from_secs(args.timeout_secs),
        cookie: args.cookie.clone(),
        warm_up_url: (!args.no_warm_up).then(|| rules.config.site_prefix.clone()),
        ..HttpSettings::default()
    };
    let mut acquirer = HttpAcquirer::new(settings);
    let debug_dir = args.debug_dir.as_deref().map(Path::new);

    match args.command {
        Command::Extract {
            url,
            json: as_json,
            output,
        } => {
            let url = match check_site_url(&url, &rules.config.site_prefix) {
                Ok(url) => url.to_string(),
                Err(message) => {
                    eprintln!("{}", message);
                    std::process::exit(EXIT_EXTRACTION_FAILED);
                }
            };

            acquirer.acquire().await?;
            let outcome = extract::extract(&mut acquirer, &url, &rules, debug_dir).await;
            acquirer.release().await;

            if let Some(path) = &output {
                json::write_outcome(&outcome, path).await?;
            }
            if as_json {
                println!("{}", json::to_json(&outcome)?);
            } else if output.is_none() {
                print!("{}", report::render(&outcome));
            }

            if outcome.is_error() {
                std::process::exit(EXIT_EXTRACTION_FAILED);
            }
        }
        Command::Serve { bind } => {
            acquirer.acquire().await?;
            let state = Arc::new(web::AppState::new(
                acquirer,
                rules,
                debug_dir.map(Path::to_path_buf),
            ));
            web::serve(&bind, state).await?;
        }
    }

    Ok(())
}

/// Load and compile the rules file, or the built-in rules when none is given.
fn load_rules(path: Option<&Path>) -> Result<CompiledRules, Box<dyn Error>> {
    let config = match path {
        Some(path) => {
            info!(path = %path.display(), "Loading extraction rules");
            ExtractionRules::from_yaml_file(path)?
        }
        None => ExtractionRules::default(),
    };
    Ok(config.compile()?)
}
