//! Text collection and word counting shared by all extractors.

use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::ElementRef;
use scraper::node::Node;

static WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\w+\b").unwrap());

/// Count `\b\w+\b` tokens in the lowercased text.
pub fn word_count(text: &str) -> usize {
    if text.is_empty() {
        return 0;
    }
    WORD_RE.find_iter(&text.to_lowercase()).count()
}

/// Visible text of an element: each text node trimmed, empty nodes dropped,
/// the rest joined by single spaces.
pub fn element_text(el: ElementRef<'_>) -> String {
    element_text_excluding(el, &[])
}

/// Like [`element_text`], but skipping the subtrees rooted at `excluded`.
pub fn element_text_excluding(el: ElementRef<'_>, excluded: &[ElementRef<'_>]) -> String {
    let mut parts = Vec::new();
    collect_text(el, excluded, &mut parts);
    parts.into_iter().join(" ")
}

fn collect_text<'a>(el: ElementRef<'a>, excluded: &[ElementRef<'_>], out: &mut Vec<&'a str>) {
    for child in el.children() {
        match child.value() {
            Node::Text(text) => {
                let trimmed = text.trim();
                if !trimmed.is_empty() {
                    out.push(trimmed);
                }
            }
            Node::Element(element) => {
                if matches!(element.name(), "script" | "style" | "noscript" | "template") {
                    continue;
                }
                if let Some(child_el) = ElementRef::wrap(child) {
                    if excluded.iter().any(|x| x.id() == child_el.id()) {
                        continue;
                    }
                    collect_text(child_el, excluded, out);
                }
            }
            _ => {}
        }
    }
}

/// True when `el` is one of `excluded` or sits inside one of them.
pub fn is_within(el: ElementRef<'_>, excluded: &[ElementRef<'_>]) -> bool {
    if excluded.is_empty() {
        return false;
    }
    std::iter::once(*el)
        .chain(el.ancestors())
        .any(|node| excluded.iter().any(|x| x.id() == node.id()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::{Html, Selector};

    #[test]
    fn test_word_count_empty() {
        assert_eq!(word_count(""), 0);
        assert_eq!(word_count("   \n\t "), 0);
    }

    #[test]
    fn test_word_count_basic() {
        assert_eq!(word_count("The quick brown fox"), 4);
        assert_eq!(word_count("Council's vote: 7-2."), 5);
        assert_eq!(word_count("Mayor   Scott,  again!"), 3);
    }

    #[test]
    fn test_word_count_is_case_insensitive() {
        for text in ["Baltimore BANNER Report", "ÉCOLE élève", "MiXeD 42 CaSe_words"] {
            assert_eq!(word_count(text), word_count(&text.to_lowercase()));
        }
    }

    #[test]
    fn test_element_text_joins_trimmed_nodes() {
        let doc = Html::parse_fragment("<div>  Hello <b>big</b>\n <i> world </i><script>var x = 1;</script></div>");
        let sel = Selector::parse("div").unwrap();
        let div = doc.select(&sel).next().unwrap();
        assert_eq!(element_text(div), "Hello big world");
    }

    #[test]
    fn test_element_text_excluding_subtrees() {
        let doc = Html::parse_fragment(
            "<article><header>Skip me</header><p>Keep this</p><footer>And me</footer></article>",
        );
        let article = doc.select(&Selector::parse("article").unwrap()).next().unwrap();
        let excluded: Vec<_> = article
            .select(&Selector::parse("header, footer").unwrap())
            .collect();

        assert_eq!(element_text_excluding(article, &excluded), "Keep this");

        let p = article.select(&Selector::parse("p").unwrap()).next().unwrap();
        assert!(!is_within(p, &excluded));
        assert!(is_within(excluded[0], &excluded));
    }
}
