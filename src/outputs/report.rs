//! Plain-text summary for terminal output.

use crate::models::ExtractionOutcome;
use std::fmt::{self, Write};

/// Longest alt text shown per image before it is elided.
const ALT_PREVIEW_CHARS: usize = 60;

/// Render an outcome as a short human-readable report.
pub fn render(outcome: &ExtractionOutcome) -> String {
    let mut out = String::new();
    let _ = write_report(&mut out, outcome);
    out
}

fn write_report(out: &mut impl Write, outcome: &ExtractionOutcome) -> fmt::Result {
    match outcome {
        ExtractionOutcome::Error(e) => {
            writeln!(out, "Error: {}", e.error)?;
        }
        ExtractionOutcome::Article(record) => {
            writeln!(out, "URL: {}", record.url)?;
            writeln!(
                out,
                "Headline: \"{}\" ({} words)",
                record.headline, record.headline_word_count
            )?;
            writeln!(out, "Date Posted: {}", record.date_posted)?;
            writeln!(out, "Article Word Count: {}", record.article_word_count)?;
            writeln!(out, "Image Count: {}", record.image_count)?;

            if record.images.is_empty() {
                writeln!(out, "No images found in article body.")?;
            } else {
                writeln!(out, "Images Found:")?;
                for (i, image) in record.images.iter().enumerate() {
                    writeln!(
                        out,
                        "  {}. Src: {}, Alt: {}",
                        i + 1,
                        image.src,
                        preview(&image.alt)
                    )?;
                }
            }
        }
    }
    Ok(())
}

fn preview(text: &str) -> String {
    if text.chars().count() <= ALT_PREVIEW_CHARS {
        text.to_string()
    } else {
        let head: String = text.chars().take(ALT_PREVIEW_CHARS).collect();
        format!("{}...", head)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ArticleRecord, ImageRef};

    #[test]
    fn test_render_article() {
        let outcome = ExtractionOutcome::Article(ArticleRecord::new(
            "https://www.thebaltimorebanner.com/a/".to_string(),
            "Ravens win".to_string(),
            2,
            "January 07, 2024, 04:25 PM EST".to_string(),
            640,
            vec![ImageRef {
                src: "https://cdn.example.com/ravens.jpg".to_string(),
                alt: "x".repeat(80),
            }],
        ));
        let text = render(&outcome);

        assert!(text.contains("Headline: \"Ravens win\" (2 words)"));
        assert!(text.contains("Date Posted: January 07, 2024, 04:25 PM EST"));
        assert!(text.contains("Image Count: 1"));
        assert!(text.contains(&format!("Alt: {}...", "x".repeat(60))));
    }

    #[test]
    fn test_render_error() {
        let text = render(&ExtractionOutcome::error("Page not found"));
        assert_eq!(text, "Error: Page not found\n");
    }
}
