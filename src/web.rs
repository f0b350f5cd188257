//! HTML form front end.
//!
//! `GET /` shows a form asking for an article URL; `POST /` validates the
//! submission, runs the extraction engine and renders either the extracted
//! fields or the error. The submitted URL is always echoed back into the form.
//!
//! All requests share one [`Acquirer`] behind an async mutex, so extractions
//! run one at a time against the same session.

use crate::acquire::Acquirer;
use crate::extract::extract;
use crate::models::{ArticleRecord, ExtractionOutcome};
use crate::rules::CompiledRules;
use crate::utils::check_site_url;
use axum::Router;
use axum::extract::{Form, State};
use axum::response::Html;
use axum::routing::get;
use escaper::{encode_attribute, encode_minimal};
use serde::Deserialize;
use std::error::Error;
use std::fmt::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, instrument, warn};

/// Shared state for the form handlers.
pub struct AppState<A> {
    pub acquirer: Mutex<A>,
    pub rules: CompiledRules,
    pub debug_dir: Option<PathBuf>,
}

impl<A> AppState<A> {
    pub fn new(acquirer: A, rules: CompiledRules, debug_dir: Option<PathBuf>) -> Self {
        Self {
            acquirer: Mutex::new(acquirer),
            rules,
            debug_dir,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SubmitForm {
    #[serde(default)]
    pub article_url: String,
}

pub fn router<A>(state: Arc<AppState<A>>) -> Router
where
    A: Acquirer + Send + 'static,
{
    Router::new()
        .route("/", get(show_form).post(submit_form::<A>))
        .with_state(state)
}

/// Bind `addr` and serve the form until Ctrl-C, then release the acquirer.
#[instrument(level = "info", skip(state))]
pub async fn serve<A>(addr: &str, state: Arc<AppState<A>>) -> Result<(), Box<dyn Error>>
where
    A: Acquirer + Send + 'static,
{
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, "Serving article form");
    axum::serve(listener, router(Arc::clone(&state)))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutting down; releasing acquirer");
    state.acquirer.lock().await.release().await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Could not listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}

async fn show_form() -> Html<String> {
    Html(render_page("", None))
}

async fn submit_form<A>(
    State(state): State<Arc<AppState<A>>>,
    Form(form): Form<SubmitForm>,
) -> Html<String>
where
    A: Acquirer + Send + 'static,
{
    let outcome = match check_site_url(&form.article_url, &state.rules.config.site_prefix) {
        Ok(url) => {
            let mut acquirer = state.acquirer.lock().await;
            extract(&mut *acquirer, url, &state.rules, state.debug_dir.as_deref()).await
        }
        Err(message) => ExtractionOutcome::error(message),
    };
    Html(render_page(form.article_url.trim(), Some(&outcome)))
}

/// Render the whole page: the form, then the outcome if there is one.
pub fn render_page(submitted_url: &str, outcome: Option<&ExtractionOutcome>) -> String {
    let mut body = String::new();
    let _ = match outcome {
        Some(ExtractionOutcome::Error(e)) => {
            writeln!(body, r#"<p class="error">{}</p>"#, encode_minimal(&e.error))
        }
        Some(ExtractionOutcome::Article(record)) => write_record(&mut body, record),
        None => Ok(()),
    };

    format!(
        r#"<!doctype html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Banner Article Metadata</title>
</head>
<body>
<h1>Baltimore Banner article metadata</h1>
<form method="post" action="/">
<label for="article_url">Article URL</label>
<input type="url" id="article_url" name="article_url" size="80" value="{}">
<button type="submit">Extract</button>
</form>
{}</body>
</html>
"#,
        encode_attribute(submitted_url),
        body
    )
}

fn write_record(out: &mut impl Write, record: &ArticleRecord) -> fmt::Result {
    writeln!(out, "<dl>")?;
    writeln!(
        out,
        "<dt>Headline</dt><dd>{} ({} words)</dd>",
        encode_minimal(&record.headline),
        record.headline_word_count
    )?;
    writeln!(
        out,
        "<dt>Date posted</dt><dd>{}</dd>",
        encode_minimal(&record.date_posted)
    )?;
    writeln!(
        out,
        "<dt>Article word count</dt><dd>{}</dd>",
        record.article_word_count
    )?;
    writeln!(out, "<dt>Images</dt><dd>{}</dd>", record.image_count)?;
    writeln!(out, "</dl>")?;

    if !record.images.is_empty() {
        writeln!(out, "<ol>")?;
        for image in &record.images {
            writeln!(
                out,
                r#"<li><a href="{}">{}</a></li>"#,
                encode_attribute(&image.src),
                encode_minimal(&image.alt)
            )?;
        }
        writeln!(out, "</ol>")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::acquire::testing::CannedAcquirer;

    fn state_with(acquirer: CannedAcquirer) -> Arc<AppState<CannedAcquirer>> {
        Arc::new(AppState::new(acquirer, CompiledRules::builtin(), None))
    }

    #[tokio::test]
    async fn test_empty_submission() {
        let state = state_with(CannedAcquirer::default());
        let Html(page) = submit_form(
            State(state.clone()),
            Form(SubmitForm {
                article_url: "  ".to_string(),
            }),
        )
        .await;

        assert!(page.contains("Please enter an article URL."));
        assert!(state.acquirer.lock().await.fetched.is_empty());
    }

    #[tokio::test]
    async fn test_foreign_domain_is_rejected_and_echoed() {
        let state = state_with(CannedAcquirer::default());
        let Html(page) = submit_form(
            State(state.clone()),
            Form(SubmitForm {
                article_url: "https://example.com/story".to_string(),
            }),
        )
        .await;

        assert!(page.contains("Please enter a valid URL from thebaltimorebanner.com."));
        assert!(page.contains(&format!(
            r#"value="{}""#,
            encode_attribute("https://example.com/story")
        )));
        assert!(state.acquirer.lock().await.fetched.is_empty());
    }

    #[tokio::test]
    async fn test_successful_submission_renders_fields() {
        let html = r#"<html><head><title>Story</title></head><body>
            <h1 data-qa="Heading">Fells Point <b>&amp;</b> the harbor</h1>
            <time datetime="2024-05-01T14:30:00Z"></time>
        </body></html>"#;
        let state = state_with(CannedAcquirer::with_html(html));
        let url = "https://www.thebaltimorebanner.com/community/fells-point/";
        let Html(page) = submit_form(
            State(state.clone()),
            Form(SubmitForm {
                article_url: url.to_string(),
            }),
        )
        .await;

        assert!(page.contains("Fells Point &amp; the harbor (4 words)"));
        assert!(page.contains("May 01, 2024, 02:30 PM UTC"));
        assert!(page.contains(&format!(r#"value="{}""#, encode_attribute(url))));
        assert_eq!(state.acquirer.lock().await.fetched, vec![url.to_string()]);
    }

    #[tokio::test]
    async fn test_acquisition_error_is_rendered() {
        let state = state_with(CannedAcquirer::with_html(
            "<html><head><title>404 Not Found</title></head></html>",
        ));
        let Html(page) = submit_form(
            State(state),
            Form(SubmitForm {
                article_url: "https://www.thebaltimorebanner.com/missing/".to_string(),
            }),
        )
        .await;

        assert!(page.contains(r#"<p class="error">"#));
        assert!(page.contains("Title: 404 Not Found"));
    }

    #[test]
    fn test_render_escapes_markup() {
        let page = render_page(
            r#"https://www.thebaltimorebanner.com/"><script>"#,
            Some(&ExtractionOutcome::error("<b>bad</b>")),
        );
        assert!(!page.contains("<script>"));
        assert!(!page.contains("<b>bad</b>"));
    }
}
