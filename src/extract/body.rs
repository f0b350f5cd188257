//! Article body detection and word counting.

use super::text::{element_text_excluding, word_count};
use crate::rules::CompiledRules;
use scraper::{ElementRef, Html};
use tracing::debug;

/// The element accepted as the article body.
///
/// `excluded` lists the non-content descendants skipped while measuring; the
/// image extractor skips them too when searching this container.
#[derive(Debug, Clone)]
pub struct BodyContainer<'a> {
    pub element: ElementRef<'a>,
    pub excluded: Vec<ElementRef<'a>>,
    pub selector: String,
}

#[derive(Debug, Clone)]
pub struct BodyExtraction<'a> {
    pub word_count: usize,
    pub container: Option<BodyContainer<'a>>,
}

/// Find the first body candidate with more than `min_body_words` words.
///
/// Candidates are visited selector by selector, and within a selector in
/// document order, so a short teaser sharing the body's class is skipped.
pub fn extract_body<'a>(document: &'a Html, rules: &CompiledRules) -> BodyExtraction<'a> {
    let min_words = rules.min_body_words();

    for body_rule in &rules.body {
        let selector = body_rule.rule.css.as_str();
        for block in document.select(&body_rule.rule.selector) {
            let mut excluded: Vec<ElementRef<'a>> = Vec::new();
            if body_rule.strip_non_content {
                for el in rules.non_content.iter().flat_map(|nc| block.select(&nc.selector)) {
                    if !excluded.iter().any(|x| x.id() == el.id()) {
                        excluded.push(el);
                    }
                }
            }

            let words = word_count(&element_text_excluding(block, &excluded));
            if words > min_words {
                debug!(selector, words, excluded = excluded.len(), "Matched article body");
                return BodyExtraction {
                    word_count: words,
                    container: Some(BodyContainer {
                        element: block,
                        excluded,
                        selector: selector.to_string(),
                    }),
                };
            }
            debug!(selector, words, min_words, "Body candidate below threshold");
        }
    }

    debug!("No body candidate cleared the word threshold");
    BodyExtraction {
        word_count: 0,
        container: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(n: usize) -> String {
        (0..n).map(|i| format!("word{i}")).collect::<Vec<_>>().join(" ")
    }

    #[test]
    fn test_specific_container_wins() {
        let html = format!(
            r#"<article><div class="rich-text__content"><p>{}</p></div><p>{}</p></article>"#,
            words(60),
            words(30)
        );
        let doc = Html::parse_document(&html);
        let body = extract_body(&doc, &CompiledRules::builtin());

        assert_eq!(body.word_count, 60);
        assert_eq!(body.container.unwrap().selector, "div.rich-text__content");
    }

    #[test]
    fn test_short_teaser_falls_through() {
        let html = format!(
            r#"<div class="rich-text__content">{}</div><div data-qa="ArticleBody">{}</div>"#,
            words(10),
            words(75)
        );
        let doc = Html::parse_document(&html);
        let body = extract_body(&doc, &CompiledRules::builtin());

        assert_eq!(body.word_count, 75);
        assert_eq!(body.container.unwrap().selector, r#"div[data-qa="ArticleBody"]"#);
    }

    #[test]
    fn test_second_match_of_same_selector() {
        let html = format!(
            r#"<div class="article-body teaser">{}</div><div class="article-body">{}</div>"#,
            words(12),
            words(55)
        );
        let doc = Html::parse_document(&html);
        let body = extract_body(&doc, &CompiledRules::builtin());
        assert_eq!(body.word_count, 55);
    }

    #[test]
    fn test_generic_article_strips_non_content() {
        let html = format!(
            r#"<article>
                <header>{}</header>
                <p>{}</p>
                <aside class="related-articles">{}</aside>
                <footer>{}</footer>
            </article>"#,
            words(40),
            words(52),
            words(40),
            words(40)
        );
        let doc = Html::parse_document(&html);
        let body = extract_body(&doc, &CompiledRules::builtin());

        assert_eq!(body.word_count, 52);
        let container = body.container.unwrap();
        assert_eq!(container.selector, "article");
        assert_eq!(container.excluded.len(), 3);
    }

    #[test]
    fn test_threshold_is_strict() {
        let html = format!(r#"<div class="rich-text__content">{}</div>"#, words(50));
        let doc = Html::parse_document(&html);
        let body = extract_body(&doc, &CompiledRules::builtin());

        assert_eq!(body.word_count, 0);
        assert!(body.container.is_none());
    }
}
