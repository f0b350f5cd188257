//! Data models for extracted article metadata.
//!
//! This module defines the records handed to consumers:
//! - [`ArticleRecord`]: Metadata extracted from a successfully acquired page
//! - [`ImageRef`]: One embedded image with its resolved URL and alt text
//! - [`ErrorRecord`]: A fatal acquisition outcome
//! - [`ExtractionOutcome`]: Either of the two, serialized untagged so a
//!   consumer can branch on the presence of `error`

use serde::Serialize;

/// Placeholder headline used when no heading element carries text.
pub const HEADLINE_NOT_FOUND: &str = "N/A - Headline not found";

/// Placeholder date used when no strategy resolves a publication date.
pub const DATE_NOT_FOUND: &str = "N/A - Date not found";

/// Alt text used when neither the image nor its caption describe it.
pub const DEFAULT_IMAGE_ALT: &str = "Article Image";

/// Metadata extracted from one article page.
///
/// Degraded results (sentinel headline or date, zero word count, no images)
/// are still successes; only [`ErrorRecord`] signals failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArticleRecord {
    /// The URL exactly as submitted.
    pub url: String,
    /// Headline text, or [`HEADLINE_NOT_FOUND`].
    pub headline: String,
    pub headline_word_count: usize,
    /// Canonical `Month DD, YYYY, HH:MM AM/PM [TZ]`, raw matched text when it
    /// could not be normalized, or [`DATE_NOT_FOUND`].
    pub date_posted: String,
    pub article_word_count: usize,
    /// Images in document order.
    pub images: Vec<ImageRef>,
    /// Always `images.len()`.
    pub image_count: usize,
}

impl ArticleRecord {
    /// Build a record, deriving `image_count` from `images`.
    pub fn new(
        url: String,
        headline: String,
        headline_word_count: usize,
        date_posted: String,
        article_word_count: usize,
        images: Vec<ImageRef>,
    ) -> Self {
        let image_count = images.len();
        Self {
            url,
            headline,
            headline_word_count,
            date_posted,
            article_word_count,
            images,
            image_count,
        }
    }
}

/// An image embedded in the article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageRef {
    /// Absolute `http(s)` URL.
    pub src: String,
    pub alt: String,
}

/// A fatal outcome: the page could not be acquired or is a missing-page response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorRecord {
    pub error: String,
}

/// Result of one extraction call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ExtractionOutcome {
    Article(ArticleRecord),
    Error(ErrorRecord),
}

impl ExtractionOutcome {
    pub fn error(message: impl Into<String>) -> Self {
        ExtractionOutcome::Error(ErrorRecord {
            error: message.into(),
        })
    }

    pub fn is_error(&self) -> bool {
        matches!(self, ExtractionOutcome::Error(_))
    }
}
