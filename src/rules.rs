//! Extraction rules: the site-specific heuristics as versioned configuration.
//!
//! Selector lists, thresholds and keyword lists change whenever the site's
//! templates drift. They live in [`ExtractionRules`], which deserializes from
//! YAML (any omitted field falls back to the built-in defaults) and is then
//! compiled once into [`CompiledRules`] so that an invalid selector fails at
//! startup rather than in the middle of an extraction.
//!
//! # Example
//!
//! ```yaml
//! version: 3
//! min_body_words: 80
//! headline_selectors:
//!   - 'h1[data-qa="Heading"]'
//!   - h1
//! ```

use crate::error::RulesError;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::Selector;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, instrument};

static STATUS_404_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b404\b").unwrap());

/// Version of the built-in rule set. Bump when the defaults change.
pub const DEFAULT_RULES_VERSION: u32 = 1;

/// One body-container candidate.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct BodyRule {
    pub selector: String,
    /// Measure the container only after excluding `non_content_selectors`.
    /// Used for broad fallbacks such as a bare `article`.
    #[serde(default)]
    pub strip_non_content: bool,
}

impl BodyRule {
    fn new(selector: &str) -> Self {
        Self {
            selector: selector.to_string(),
            strip_non_content: false,
        }
    }

    fn stripped(selector: &str) -> Self {
        Self {
            selector: selector.to_string(),
            strip_non_content: true,
        }
    }
}

/// Raw, serializable extraction rules.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ExtractionRules {
    pub version: u32,
    /// URL prefix accepted by the presentation layer.
    pub site_prefix: String,
    /// Headline candidates, most specific first.
    pub headline_selectors: Vec<String>,
    /// Elements carrying a machine-readable timestamp attribute.
    pub timestamp_selector: String,
    pub timestamp_attribute: String,
    /// Byline and metadata containers scanned for a printed date.
    pub byline_selectors: Vec<String>,
    /// Last-resort elements whose text may hold a date.
    pub time_text_selector: String,
    /// Body candidates, most specific first.
    pub body_selectors: Vec<BodyRule>,
    pub non_content_selectors: Vec<String>,
    /// A body candidate must have strictly more words than this.
    pub min_body_words: usize,
    /// Page-level containers searched for images after the body.
    pub image_scope_selectors: Vec<String>,
    /// Bare images with both declared dimensions below this are decorative.
    pub min_image_dimension: u32,
    /// Image URLs containing any of these (case-insensitive) are dropped.
    pub image_url_denylist: Vec<String>,
    /// Alt texts that say nothing about the image.
    pub generic_alt_words: Vec<String>,
    /// Source values that stand in for a lazily loaded image.
    pub placeholder_src_markers: Vec<String>,
    /// Title phrases identifying a missing-page response. A bare `404` is
    /// not a marker: it only counts when it leads the title or appears
    /// alongside "not found".
    pub not_found_title_markers: Vec<String>,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for ExtractionRules {
    fn default() -> Self {
        Self {
            version: DEFAULT_RULES_VERSION,
            site_prefix: "https://www.thebaltimorebanner.com/".to_string(),
            headline_selectors: strings(&[
                "h1.font-bold",
                r#"h1[class*="headline"]"#,
                "header h1",
                r#"h1[data-qa="Heading"]"#,
                "h1",
            ]),
            timestamp_selector: "time[datetime]".to_string(),
            timestamp_attribute: "datetime".to_string(),
            byline_selectors: strings(&[
                r#"div[class*="Byline"]"#,
                r#"div[class*="timestamp"]"#,
                r#"p[class*="timestamp"]"#,
                r#"span[class*="timestamp"]"#,
                r#"div[class*="PageMetaData"]"#,
                "div.items-center.text-sm",
            ]),
            time_text_selector: "time".to_string(),
            body_selectors: vec![
                BodyRule::new("div.rich-text__content"),
                BodyRule::new("div.rich-text--article-body"),
                BodyRule::new(r#"div[data-qa="ArticleBody"]"#),
                BodyRule::new(r#"section[data-qa="ArticleBody"]"#),
                BodyRule::new(r#"div[class*="article-body"]"#),
                BodyRule::new(r#"div[class*="ArticlePage-articleBody"]"#),
                BodyRule::new(r#"article[class*="ArticlePage"] div[class*="body"]"#),
                BodyRule::new("article .entry-content"),
                BodyRule::stripped("article"),
            ],
            non_content_selectors: strings(&[
                "header",
                "footer",
                "nav",
                "aside",
                ".related-articles",
                ".comments",
                r#"[class*="ad-slot"]"#,
                r#"[class*="advertisement"]"#,
            ]),
            min_body_words: 50,
            image_scope_selectors: strings(&["article", "main"]),
            min_image_dimension: 100,
            image_url_denylist: strings(&[
                "logo",
                "avatar",
                "icon",
                "/ads/",
                "adserver",
                "doubleclick",
                "googlesyndication",
                "spinner",
                "gravatar",
                "pixel",
                "banner/button",
                "feed",
                "scorecardresearch",
                "beacon",
            ]),
            generic_alt_words: strings(&["image", "photo", "graphic", "illustration"]),
            placeholder_src_markers: strings(&[
                "data:",
                "placeholder",
                "blank.gif",
                "spacer.gif",
                "transparent.gif",
            ]),
            not_found_title_markers: strings(&["page not found", "page cannot be found"]),
        }
    }
}

impl ExtractionRules {
    /// Parse rules from a YAML document. Omitted fields keep their defaults.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, RulesError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Read and parse a YAML rules file.
    #[instrument(level = "info", skip_all, fields(path = %path.as_ref().display()))]
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, RulesError> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).map_err(|source| RulesError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let rules = Self::from_yaml_str(&yaml)?;
        info!(version = rules.version, "Loaded extraction rules");
        Ok(rules)
    }

    /// Compile every selector, failing on the first invalid one.
    pub fn compile(self) -> Result<CompiledRules, RulesError> {
        let headline = compile_all(&self.headline_selectors)?;
        let timestamp = SelectorRule::parse(&self.timestamp_selector)?;
        let byline = compile_all(&self.byline_selectors)?;
        let time_text = SelectorRule::parse(&self.time_text_selector)?;
        let body = self
            .body_selectors
            .iter()
            .map(|b| {
                Ok(BodySelectorRule {
                    rule: SelectorRule::parse(&b.selector)?,
                    strip_non_content: b.strip_non_content,
                })
            })
            .collect::<Result<Vec<_>, RulesError>>()?;
        let non_content = compile_all(&self.non_content_selectors)?;
        let image_scopes = compile_all(&self.image_scope_selectors)?;

        Ok(CompiledRules {
            headline,
            timestamp,
            byline,
            time_text,
            body,
            non_content,
            image_scopes,
            image_url_denylist: lowercase_all(&self.image_url_denylist),
            generic_alt_words: lowercase_all(&self.generic_alt_words),
            placeholder_src_markers: lowercase_all(&self.placeholder_src_markers),
            not_found_title_markers: lowercase_all(&self.not_found_title_markers),
            config: self,
        })
    }
}

fn compile_all(css: &[String]) -> Result<Vec<SelectorRule>, RulesError> {
    css.iter().map(|c| SelectorRule::parse(c)).collect()
}

fn lowercase_all(items: &[String]) -> Vec<String> {
    items.iter().map(|s| s.to_lowercase()).collect()
}

/// A parsed selector together with the source text it came from (for logging).
#[derive(Debug, Clone)]
pub struct SelectorRule {
    pub css: String,
    pub selector: Selector,
}

impl SelectorRule {
    pub fn parse(css: &str) -> Result<Self, RulesError> {
        let selector = Selector::parse(css).map_err(|e| RulesError::Selector {
            css: css.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            css: css.to_string(),
            selector,
        })
    }
}

#[derive(Debug, Clone)]
pub struct BodySelectorRule {
    pub rule: SelectorRule,
    pub strip_non_content: bool,
}

/// Rules ready for extraction. Keyword lists are pre-lowercased.
#[derive(Debug, Clone)]
pub struct CompiledRules {
    pub config: ExtractionRules,
    pub headline: Vec<SelectorRule>,
    pub timestamp: SelectorRule,
    pub byline: Vec<SelectorRule>,
    pub time_text: SelectorRule,
    pub body: Vec<BodySelectorRule>,
    pub non_content: Vec<SelectorRule>,
    pub image_scopes: Vec<SelectorRule>,
    pub image_url_denylist: Vec<String>,
    pub generic_alt_words: Vec<String>,
    pub placeholder_src_markers: Vec<String>,
    pub not_found_title_markers: Vec<String>,
}

impl CompiledRules {
    /// The built-in rule set. The defaults are known to compile.
    pub fn builtin() -> Self {
        ExtractionRules::default()
            .compile()
            .expect("built-in extraction rules must compile")
    }

    pub fn min_body_words(&self) -> usize {
        self.config.min_body_words
    }

    pub fn min_image_dimension(&self) -> u32 {
        self.config.min_image_dimension
    }

    pub fn is_denylisted(&self, url: &str) -> bool {
        let lower = url.to_lowercase();
        self.image_url_denylist.iter().any(|k| lower.contains(k.as_str()))
    }

    pub fn is_placeholder_src(&self, src: &str) -> bool {
        let lower = src.to_lowercase();
        self.placeholder_src_markers
            .iter()
            .any(|m| lower.contains(m.as_str()))
    }

    pub fn is_generic_alt(&self, alt: &str) -> bool {
        let lower = alt.trim().to_lowercase();
        lower.is_empty() || self.generic_alt_words.iter().any(|w| *w == lower)
    }

    pub fn is_not_found_title(&self, title: &str) -> bool {
        let lower = title.trim().to_lowercase();
        if self
            .not_found_title_markers
            .iter()
            .any(|m| lower.contains(m.as_str()))
        {
            return true;
        }
        let leads_with_status = lower
            .strip_prefix("404")
            .is_some_and(|rest| !rest.starts_with(|c: char| c.is_alphanumeric()));
        leads_with_status || (STATUS_404_RE.is_match(&lower) && lower.contains("not found"))
    }
}
