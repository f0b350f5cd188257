//! The heuristic extraction engine.
//!
//! [`extract`] runs one article through the whole pipeline:
//!
//! 1. **Acquire**: ask the injected [`Acquirer`] for the page's HTML
//! 2. **Dump** (optional): persist the raw HTML for later inspection
//! 3. **Screen**: reject missing-page responses by their `<title>`
//! 4. **Extract**: headline, date, body word count, then images (searched
//!    within the body found in the previous step)
//! 5. **Assemble**: build an [`ArticleRecord`]
//!
//! Only acquisition failures and missing pages produce an
//! [`ErrorRecord`](crate::models::ErrorRecord). An extractor that finds
//! nothing yields a sentinel or zero and the record is still a success.

pub mod body;
pub mod date;
pub mod headline;
pub mod images;
pub mod text;

use crate::acquire::Acquirer;
use crate::error::AcquireError;
use crate::models::{ArticleRecord, ExtractionOutcome};
use crate::outputs::debug::persist_raw_document;
use crate::rules::CompiledRules;
use crate::utils::truncate_for_log;
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use std::path::Path;
use std::time::Instant;
use tracing::{error, info, instrument, warn};
use url::Url;

static TITLE_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("title").unwrap());

/// Acquire `url` and extract its metadata.
///
/// The caller is responsible for checking that `url` belongs to the site.
/// The acquirer must already be acquired; it is only asked to fetch.
#[instrument(level = "info", skip(acquirer, rules, debug_dir))]
pub async fn extract<A: Acquirer>(
    acquirer: &mut A,
    url: &str,
    rules: &CompiledRules,
    debug_dir: Option<&Path>,
) -> ExtractionOutcome {
    let t0 = Instant::now();

    let html = match acquirer.fetch(url).await {
        Ok(html) => html,
        Err(e) => {
            error!(error = %e, "Acquisition failed");
            return ExtractionOutcome::error(acquisition_message(url, &e));
        }
    };
    info!(
        bytes = html.len(),
        elapsed_ms = t0.elapsed().as_millis() as u64,
        "Acquired document"
    );

    if let Some(dir) = debug_dir {
        persist_raw_document(dir, url, &html).await;
    }

    let outcome = extract_document(url, &html, rules);
    info!(
        elapsed_ms_total = t0.elapsed().as_millis() as u64,
        error = outcome.is_error(),
        "Extraction finished"
    );
    outcome
}

/// Extract metadata from an already acquired document.
pub fn extract_document(url: &str, html: &str, rules: &CompiledRules) -> ExtractionOutcome {
    let document = Html::parse_document(html);

    if let Some(title) = page_title(&document) {
        if rules.is_not_found_title(&title) {
            warn!(%title, "Missing-page response detected");
            return ExtractionOutcome::error(not_found_message(url, &title));
        }
    }

    let headline = headline::extract_headline(&document, rules);
    let date_posted = date::extract_date(&document, rules);
    let body = body::extract_body(&document, rules);

    let base_url = Url::parse(url).ok();
    let images = images::extract_images(
        &document,
        body.container.as_ref(),
        base_url.as_ref(),
        rules,
    );

    info!(
        headline = %truncate_for_log(&headline.text, 80),
        headline_words = headline.word_count,
        %date_posted,
        article_words = body.word_count,
        images = images.len(),
        "Extracted article fields"
    );

    ExtractionOutcome::Article(ArticleRecord::new(
        url.to_string(),
        headline.text,
        headline.word_count,
        date_posted,
        body.word_count,
        images,
    ))
}

/// Text of the document's `<title>`, if present and non-empty.
pub fn page_title(document: &Html) -> Option<String> {
    document
        .select(&TITLE_SELECTOR)
        .next()
        .map(text::element_text)
        .filter(|t| !t.is_empty())
}

/// Convenience wrapper over [`page_title`] for raw HTML.
pub fn page_title_of(html: &str) -> Option<String> {
    page_title(&Html::parse_document(html))
}

fn not_found_message(url: &str, title: &str) -> String {
    format!("Page not found (404) for {}. Title: {}", url, title)
}

fn acquisition_message(url: &str, e: &AcquireError) -> String {
    match e {
        AcquireError::NotFound { title } => not_found_message(url, title),
        other => format!("Could not load the article at {}: {}", url, other),
    }
}
