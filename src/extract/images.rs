//! Embedded image discovery.
//!
//! Images are searched scope by scope, narrowest first: the article body (if
//! one was found), then the page's top-level `article`/`main` containers, then
//! the whole document. The first scope that yields an image ends the search.
//!
//! Within a scope, captioned `<figure>` images are preferred. Bare `<img>`
//! elements are only considered when a scope has no usable figure, and they
//! must additionally pass a size filter since they are often decorative.

use super::body::BodyContainer;
use super::text::{element_text, is_within};
use crate::models::{DEFAULT_IMAGE_ALT, ImageRef};
use crate::rules::CompiledRules;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use tracing::debug;
use url::Url;

static FIGURE_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("figure").unwrap());
static IMG_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("img").unwrap());
static FIGCAPTION_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("figcaption").unwrap());

/// A subtree to search, minus any excluded descendants.
#[derive(Debug, Clone)]
struct SearchScope<'a> {
    label: String,
    root: ElementRef<'a>,
    excluded: Vec<ElementRef<'a>>,
}

/// Collect the article's images in document order, deduplicated by URL.
///
/// `base_url` resolves relative sources; without it only absolute sources
/// are kept.
pub fn extract_images(
    document: &Html,
    body: Option<&BodyContainer<'_>>,
    base_url: Option<&Url>,
    rules: &CompiledRules,
) -> Vec<ImageRef> {
    let mut seen = HashSet::new();

    for scope in search_scopes(document, body, rules) {
        let mut images = figure_images(&scope, base_url, rules, &mut seen);
        if images.is_empty() {
            images = bare_images(&scope, base_url, rules, &mut seen);
        }
        if !images.is_empty() {
            debug!(scope = %scope.label, count = images.len(), "Collected images");
            return images;
        }
        debug!(scope = %scope.label, "No images in scope; widening");
    }

    Vec::new()
}

fn search_scopes<'a>(
    document: &'a Html,
    body: Option<&BodyContainer<'a>>,
    rules: &CompiledRules,
) -> Vec<SearchScope<'a>> {
    let mut scopes = Vec::new();

    if let Some(body) = body {
        scopes.push(SearchScope {
            label: format!("body ({})", body.selector),
            root: body.element,
            excluded: body.excluded.clone(),
        });
    }

    let mut roots: Vec<ElementRef<'a>> = Vec::new();
    for rule in &rules.image_scopes {
        for el in document.select(&rule.selector) {
            // Only top-level containers; nested ones are covered by their parent.
            if is_within(el, &roots) {
                continue;
            }
            if body.is_some_and(|b| b.element.id() == el.id()) {
                continue;
            }
            roots.push(el);
            scopes.push(SearchScope {
                label: rule.css.clone(),
                root: el,
                excluded: Vec::new(),
            });
        }
    }

    scopes.push(SearchScope {
        label: "document".to_string(),
        root: document.root_element(),
        excluded: Vec::new(),
    });

    scopes
}

fn figure_images(
    scope: &SearchScope<'_>,
    base_url: Option<&Url>,
    rules: &CompiledRules,
    seen: &mut HashSet<String>,
) -> Vec<ImageRef> {
    let mut images = Vec::new();

    for figure in scope.root.select(&FIGURE_SELECTOR) {
        if is_within(figure, &scope.excluded) {
            continue;
        }
        let Some(img) = figure.select(&IMG_SELECTOR).next() else {
            continue;
        };
        let Some(src) = resolve_image_url(img, base_url, rules) else {
            continue;
        };
        if rules.is_denylisted(&src) {
            debug!(%src, "Skipping denylisted figure image");
            continue;
        }
        if !seen.insert(src.clone()) {
            continue;
        }

        let caption = figure
            .select(&FIGCAPTION_SELECTOR)
            .next()
            .map(element_text)
            .unwrap_or_default();
        let alt = figure_alt(img.value().attr("alt").unwrap_or(""), &caption, rules);
        images.push(ImageRef { src, alt });
    }

    images
}

fn bare_images(
    scope: &SearchScope<'_>,
    base_url: Option<&Url>,
    rules: &CompiledRules,
    seen: &mut HashSet<String>,
) -> Vec<ImageRef> {
    let mut images = Vec::new();

    for img in scope.root.select(&IMG_SELECTOR) {
        if is_within(img, &scope.excluded) {
            continue;
        }
        let Some(src) = resolve_image_url(img, base_url, rules) else {
            continue;
        };
        if is_too_small(img, rules.min_image_dimension()) {
            debug!(%src, "Skipping undersized image");
            continue;
        }
        if rules.is_denylisted(&src) {
            debug!(%src, "Skipping denylisted image");
            continue;
        }
        if !seen.insert(src.clone()) {
            continue;
        }

        let alt = img
            .value()
            .attr("alt")
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .unwrap_or(DEFAULT_IMAGE_ALT)
            .to_string();
        images.push(ImageRef { src, alt });
    }

    images
}

/// Resolve an `<img>` to an absolute `http(s)` URL.
///
/// `data-src` is preferred over `src`; placeholders are skipped, and when no
/// real source remains the widest `srcset` candidate is used.
pub fn resolve_image_url(
    img: ElementRef<'_>,
    base_url: Option<&Url>,
    rules: &CompiledRules,
) -> Option<String> {
    let v = img.value();
    let direct = ["data-src", "src"]
        .iter()
        .filter_map(|attr| v.attr(attr))
        .map(str::trim)
        .find(|s| !s.is_empty() && !rules.is_placeholder_src(s))
        .map(str::to_string);

    let raw = direct.or_else(|| {
        ["srcset", "data-srcset"]
            .iter()
            .filter_map(|attr| v.attr(attr))
            .find_map(widest_srcset_candidate)
            .filter(|s| !rules.is_placeholder_src(s))
    })?;

    absolutize(&raw, base_url)
}

fn absolutize(raw: &str, base_url: Option<&Url>) -> Option<String> {
    let parsed = match base_url {
        Some(base) => base.join(raw).ok()?,
        None => Url::parse(raw).ok()?,
    };
    matches!(parsed.scheme(), "http" | "https").then(|| parsed.to_string())
}

/// Pick the candidate with the largest width (or density) descriptor.
pub fn widest_srcset_candidate(srcset: &str) -> Option<String> {
    srcset
        .split(',')
        .filter_map(|part| {
            let mut pieces = part.split_whitespace();
            let url = pieces.next()?;
            let score = pieces
                .next()
                .and_then(|d| d.strip_suffix('w').or_else(|| d.strip_suffix('x')))
                .and_then(|n| n.parse::<f64>().ok())
                .unwrap_or(0.0);
            Some((score, url))
        })
        .fold(None, |best: Option<(f64, &str)>, candidate| match best {
            Some(b) if b.0 >= candidate.0 => Some(b),
            _ => Some(candidate),
        })
        .map(|(_, url)| url.to_string())
}

/// Both declared dimensions known, non-zero, and below `min`.
fn is_too_small(img: ElementRef<'_>, min: u32) -> bool {
    let v = img.value();
    match (
        v.attr("width").and_then(declared_pixels),
        v.attr("height").and_then(declared_pixels),
    ) {
        (Some(w), Some(h)) => w > 0 && h > 0 && w < min && h < min,
        _ => false,
    }
}

fn declared_pixels(value: &str) -> Option<u32> {
    let digits: String = value
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

fn figure_alt(alt: &str, caption: &str, rules: &CompiledRules) -> String {
    let alt = alt.trim();
    let generic = rules.is_generic_alt(alt);

    let chosen = if generic && !caption.is_empty() {
        caption.to_string()
    } else if !generic && !caption.is_empty() && alt != caption {
        format!("{} - {}", alt, caption)
    } else {
        alt.to_string()
    };

    if chosen.is_empty() {
        DEFAULT_IMAGE_ALT.to_string()
    } else {
        chosen
    }
}
