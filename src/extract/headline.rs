//! Headline extraction.

use super::text::{element_text, word_count};
use crate::models::HEADLINE_NOT_FOUND;
use crate::rules::CompiledRules;
use scraper::Html;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Headline {
    pub text: String,
    pub word_count: usize,
}

/// Try each headline selector in order; the first heading with text wins.
pub fn extract_headline(document: &Html, rules: &CompiledRules) -> Headline {
    let found = rules.headline.iter().find_map(|rule| {
        document
            .select(&rule.selector)
            .map(element_text)
            .find(|text| !text.is_empty())
            .map(|text| (rule.css.as_str(), text))
    });

    match found {
        Some((selector, text)) => {
            debug!(selector, headline = %text, "Matched headline");
            let word_count = word_count(&text);
            Headline { text, word_count }
        }
        None => {
            debug!("No headline element matched");
            Headline {
                text: HEADLINE_NOT_FOUND.to_string(),
                word_count: 0,
            }
        }
    }
}
