//! Publication date extraction and normalization.
//!
//! Dates are resolved by three strategies, first success wins:
//!
//! 1. A machine-readable `datetime` attribute (ISO 8601)
//! 2. A printed date inside a byline or metadata container
//! 3. A printed date inside any `<time>` element
//!
//! Whatever the source, the result converges on the canonical form
//! `Month DD, YYYY, HH:MM AM/PM [TZ]`, e.g. `October 27, 2023, 09:00 AM UTC`.

use super::text::element_text;
use crate::models::DATE_NOT_FOUND;
use crate::rules::CompiledRules;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Offset};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::Html;
use tracing::debug;

const CANONICAL_FORMAT: &str = "%B %d, %Y, %I:%M %p";

/// Patterns tried by [`normalize_date`], in order. `true` marks patterns that
/// carry a time of day.
const DATE_PATTERNS: &[(&str, bool)] = &[
    ("%B %d, %Y, %I:%M %p", true),
    ("%B %d, %Y, %I:%M%p", true),
    ("%b %d, %Y, %I:%M %p", true),
    ("%b %d, %Y, %I:%M%p", true),
    ("%B %d, %Y", false),
    ("%b %d, %Y", false),
    ("%m/%d/%Y %I:%M %p", true),
    ("%m/%d/%Y", false),
];

static MERIDIEM_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)([ap])\.m\.").unwrap());

static TIMEZONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(EDT|EST|CDT|CST|MDT|MST|PDT|PST)\b").unwrap());

static PRINTED_DATE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(\w+\s+\d{1,2},\s+\d{4}(?:,\s*\d{1,2}:\d{2}\s*(?:a\.m\.|p\.m\.|am\b|pm\b)(?:\s*(?:EDT|EST|CDT|CST|MDT|MST|PDT|PST)\b)?)?)",
    )
    .unwrap()
});

/// Resolve the article's publication date, or [`DATE_NOT_FOUND`].
pub fn extract_date(document: &Html, rules: &CompiledRules) -> String {
    if let Some(date) = from_timestamp_attribute(document, rules) {
        debug!(strategy = "timestamp-attribute", %date, "Resolved publication date");
        return date;
    }

    for rule in &rules.byline {
        for container in document.select(&rule.selector) {
            if let Some(date) = find_printed_date(&element_text(container)) {
                debug!(strategy = "byline", selector = %rule.css, %date, "Resolved publication date");
                return date;
            }
        }
    }

    for el in document.select(&rules.time_text.selector) {
        if let Some(date) = find_printed_date(&element_text(el)) {
            debug!(strategy = "time-text", %date, "Resolved publication date");
            return date;
        }
    }

    debug!("No publication date found");
    DATE_NOT_FOUND.to_string()
}

fn from_timestamp_attribute(document: &Html, rules: &CompiledRules) -> Option<String> {
    let attribute = rules.config.timestamp_attribute.as_str();
    document.select(&rules.timestamp.selector).find_map(|el| {
        let raw = el.value().attr(attribute)?;
        if let Some(formatted) = format_iso_timestamp(raw) {
            return Some(formatted);
        }
        // Unparseable attribute: the element's own text may still be a date.
        let text = element_text(el);
        if text.is_empty() {
            return None;
        }
        let normalized = normalize_date(&text);
        (normalized != text).then_some(normalized)
    })
}

/// Search free text for a printed date and normalize the first match.
///
/// A match the normalizer cannot parse is returned as printed.
pub fn find_printed_date(text: &str) -> Option<String> {
    PRINTED_DATE_RE
        .find(text)
        .map(|m| normalize_date(m.as_str()))
        .filter(|date| date != DATE_NOT_FOUND)
}

/// Parse an ISO 8601 timestamp and render it canonically.
///
/// A zero offset (including `Z`) renders as `UTC`, other offsets as
/// `UTC±HH:MM`, and timestamps without an offset carry no zone.
pub fn format_iso_timestamp(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    let with_offset = DateTime::parse_from_rfc3339(raw)
        .or_else(|_| DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f%z"))
        .or_else(|_| DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M%z"));
    if let Ok(dt) = with_offset {
        return Some(format!(
            "{} {}",
            dt.format(CANONICAL_FORMAT),
            zone_label(dt.offset().fix())
        ));
    }

    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(naive.format(CANONICAL_FORMAT).to_string());
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.format(CANONICAL_FORMAT).to_string())
}

fn zone_label(offset: FixedOffset) -> String {
    let secs = offset.local_minus_utc();
    if secs == 0 {
        return "UTC".to_string();
    }
    let sign = if secs < 0 { '-' } else { '+' };
    let secs = secs.abs();
    format!("UTC{}{:02}:{:02}", sign, secs / 3600, (secs % 3600) / 60)
}

/// Convert a free-text date into the canonical form.
///
/// Returns [`DATE_NOT_FOUND`] for empty or `n/a` input, and the input
/// unchanged when no known pattern parses it; callers detect failure by
/// comparing output with input.
pub fn normalize_date(text: &str) -> String {
    if text.trim().is_empty() || text.to_lowercase().contains("n/a") {
        return DATE_NOT_FOUND.to_string();
    }

    let upper_meridiem =
        MERIDIEM_RE.replace_all(text, |caps: &regex::Captures| format!("{}M", caps[1].to_uppercase()));

    let zone = TIMEZONE_RE
        .captures(&upper_meridiem)
        .map(|caps| caps[1].to_uppercase());
    let without_zone = match zone {
        Some(_) => TIMEZONE_RE.replace(&upper_meridiem, "").into_owned(),
        None => upper_meridiem.into_owned(),
    };
    let zone_suffix = zone.map(|z| format!(" {z}")).unwrap_or_default();
    let candidate = without_zone.split_whitespace().collect::<Vec<_>>().join(" ");
    let candidate = candidate.trim_end_matches(',').trim();

    for (pattern, has_time) in DATE_PATTERNS {
        let parsed = if *has_time {
            NaiveDateTime::parse_from_str(candidate, pattern).ok()
        } else {
            NaiveDate::parse_from_str(candidate, pattern)
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        };
        if let Some(dt) = parsed {
            return format!("{}{}", dt.format(CANONICAL_FORMAT), zone_suffix);
        }
    }

    text.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date_of(html: &str) -> String {
        extract_date(&Html::parse_document(html), &CompiledRules::builtin())
    }

    #[test]
    fn test_iso_utc_timestamp() {
        let d = date_of(r#"<time datetime="2023-10-27T09:00:00.000Z">Oct. 27</time>"#);
        assert_eq!(d, "October 27, 2023, 09:00 AM UTC");
    }

    #[test]
    fn test_iso_with_offset() {
        assert_eq!(
            format_iso_timestamp("2024-03-05T17:45:00-05:00").as_deref(),
            Some("March 05, 2024, 05:45 PM UTC-05:00")
        );
    }

    #[test]
    fn test_iso_without_offset_or_time() {
        assert_eq!(
            format_iso_timestamp("2024-03-05T17:45:00").as_deref(),
            Some("March 05, 2024, 05:45 PM")
        );
        assert_eq!(
            format_iso_timestamp("2024-03-05").as_deref(),
            Some("March 05, 2024, 12:00 AM")
        );
        assert_eq!(format_iso_timestamp("yesterday"), None);
    }

    #[test]
    fn test_bad_attribute_uses_element_text() {
        let d = date_of(r#"<time datetime="soon">June 2, 2024, 7:15 p.m. EDT</time>"#);
        assert_eq!(d, "June 02, 2024, 07:15 PM EDT");
    }

    #[test]
    fn test_byline_container() {
        let d = date_of(
            r#"<div class="ArticleByline-root">By Jane Doe <span>Published 3/4 on</span> Jan. update: January 9, 2024, 11:05 a.m.</div>"#,
        );
        assert_eq!(d, "January 09, 2024, 11:05 AM");
    }

    #[test]
    fn test_time_text_fallback() {
        let d = date_of("<p>Updated</p><time>Posted Feb 14, 2023</time>");
        assert_eq!(d, "February 14, 2023, 12:00 AM");
    }

    #[test]
    fn test_no_date() {
        assert_eq!(date_of("<p>No dates in here.</p>"), DATE_NOT_FOUND);
    }

    #[test]
    fn test_normalize_variants() {
        assert_eq!(
            normalize_date("October 27, 2023, 9:00 a.m. EDT"),
            "October 27, 2023, 09:00 AM EDT"
        );
        assert_eq!(normalize_date("Oct 27, 2023, 9:00PM"), "October 27, 2023, 09:00 PM");
        assert_eq!(normalize_date("10/27/2023 4:30 PM"), "October 27, 2023, 04:30 PM");
        assert_eq!(normalize_date("10/27/2023"), "October 27, 2023, 12:00 AM");
    }

    #[test]
    fn test_lowercase_zone_is_normalized() {
        assert_eq!(
            normalize_date("October 27, 2023, 9:00 a.m. edt"),
            "October 27, 2023, 09:00 AM EDT"
        );
        let d = date_of(r#"<div class="ArticleByline">Published Nov. update: March 3, 2024, 6:45 p.m. est</div>"#);
        assert_eq!(d, "March 03, 2024, 06:45 PM EST");
    }

    #[test]
    fn test_normalize_sentinel_and_failure() {
        assert_eq!(normalize_date("N/A - Date not found"), DATE_NOT_FOUND);
        assert_eq!(normalize_date("n/a"), DATE_NOT_FOUND);
        assert_eq!(normalize_date(""), DATE_NOT_FOUND);
        assert_eq!(normalize_date("sometime last week"), "sometime last week");
    }

    #[test]
    fn test_normalize_is_idempotent_on_canonical_output() {
        for input in [
            "October 27, 2023, 9:00 a.m. EDT",
            "Oct 27, 2023",
            "12/01/2022 8:05 AM",
            "2023-10-27T09:00:00Z",
        ] {
            let once = normalize_date(input);
            assert_eq!(normalize_date(&once), once, "input: {input}");
        }
        let iso = format_iso_timestamp("2023-10-27T09:00:00.000Z").unwrap();
        assert_eq!(normalize_date(&iso), iso);
    }
}
