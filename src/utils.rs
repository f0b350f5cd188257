//! Utility functions for logging, file naming, URL checks and file system
//! operations.

use std::error::Error;
use std::fs as stdfs;
use tokio::fs;
use tracing::{info, instrument};

/// Longest file stem produced by [`sanitize_url_for_filename`].
const MAX_FILENAME_STEM: usize = 150;

/// Truncate a string for logging purposes.
///
/// Long strings are cut to at most `max` bytes (on a character boundary) and
/// get `"…(+N bytes)"` appended.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log(&"a".repeat(500), 10), "aaaaaaaaaa…(+490 bytes)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut cut = max;
    while !s.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}…(+{} bytes)", &s[..cut], s.len() - cut)
}

/// Turn a URL into a safe file stem.
///
/// The scheme is dropped, percent-escapes are decoded, every run of characters
/// other than ASCII alphanumerics and `-` becomes a single `_`, and the result
/// is capped in length.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(
///     sanitize_url_for_filename("https://www.thebaltimorebanner.com/news/a-b/"),
///     "www_thebaltimorebanner_com_news_a-b"
/// );
/// ```
pub fn sanitize_url_for_filename(url: &str) -> String {
    let without_scheme = url.split_once("://").map_or(url, |(_, rest)| rest);
    let decoded = urlencoding::decode(without_scheme)
        .map(|d| d.into_owned())
        .unwrap_or_else(|_| without_scheme.to_string());

    let mut stem = String::with_capacity(decoded.len());
    for c in decoded.chars() {
        if c.is_ascii_alphanumeric() || c == '-' {
            stem.push(c);
        } else if !stem.ends_with('_') {
            stem.push('_');
        }
    }

    let stem = stem.trim_matches('_');
    let stem: String = stem.chars().take(MAX_FILENAME_STEM).collect();
    if stem.is_empty() {
        "document".to_string()
    } else {
        stem
    }
}

/// Check that `input` is an article URL on the configured site.
///
/// Returns the trimmed URL, or the message shown to the user.
pub fn check_site_url<'a>(input: &'a str, site_prefix: &str) -> Result<&'a str, String> {
    let url = input.trim();
    if url.is_empty() {
        return Err("Please enter an article URL.".to_string());
    }
    if !url.starts_with(site_prefix) {
        let site = site_prefix
            .split_once("://")
            .map_or(site_prefix, |(_, rest)| rest)
            .trim_start_matches("www.")
            .trim_end_matches('/');
        return Err(format!("Please enter a valid URL from {}.", site));
    }
    Ok(url)
}

/// Ensure a directory exists and is writable.
///
/// Creates the directory if needed, then writes and removes a probe file.
///
/// # Errors
///
/// Returns an error if the directory cannot be created or is not writable.
#[instrument(level = "info", skip_all, fields(path = %path))]
pub async fn ensure_writable_dir(path: &str) -> Result<(), Box<dyn Error>> {
    fs::create_dir_all(path).await?;
    let probe_path = format!("{}/..__probe_write__", path.trim_end_matches('/'));
    match stdfs::File::create(&probe_path) {
        Ok(_) => {
            let _ = stdfs::remove_file(&probe_path);
            info!("Directory is writable");
            Ok(())
        }
        Err(e) => Err(Box::new(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PREFIX: &str = "https://www.thebaltimorebanner.com/";

    #[test]
    fn test_truncate_for_log_short_string() {
        assert_eq!(truncate_for_log("Hello, world!", 100), "Hello, world!");
    }

    #[test]
    fn test_truncate_for_log_long_string() {
        let s = "a".repeat(500);
        let result = truncate_for_log(&s, 100);
        assert!(result.starts_with(&"a".repeat(100)));
        assert!(result.contains("…(+400 bytes)"));
    }

    #[test]
    fn test_truncate_for_log_respects_char_boundaries() {
        let result = truncate_for_log("ééé", 3);
        assert_eq!(result, "é…(+4 bytes)");
    }

    #[test]
    fn test_sanitize_url_for_filename() {
        assert_eq!(
            sanitize_url_for_filename("https://www.thebaltimorebanner.com/news/a-b/"),
            "www_thebaltimorebanner_com_news_a-b"
        );
        assert_eq!(
            sanitize_url_for_filename("https://example.com/caf%C3%A9?x=1&y=2"),
            "example_com_caf_x_1_y_2"
        );
        assert_eq!(sanitize_url_for_filename("://"), "document");
        assert!(sanitize_url_for_filename(&format!("https://x.com/{}", "a".repeat(400))).len() <= 150);
    }

    #[test]
    fn test_check_site_url() {
        assert_eq!(
            check_site_url("  https://www.thebaltimorebanner.com/news/story/ ", PREFIX),
            Ok("https://www.thebaltimorebanner.com/news/story/")
        );
        assert_eq!(
            check_site_url("   ", PREFIX),
            Err("Please enter an article URL.".to_string())
        );
        assert_eq!(
            check_site_url("https://www.example.com/news", PREFIX),
            Err("Please enter a valid URL from thebaltimorebanner.com.".to_string())
        );
    }

    #[tokio::test]
    async fn test_ensure_writable_dir_creates_missing() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a/b");
        ensure_writable_dir(nested.to_str().unwrap()).await.unwrap();
        assert!(nested.is_dir());
    }
}
