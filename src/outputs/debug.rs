//! Raw document dumps.
//!
//! When a debug directory is configured, every acquired page is written to
//! `<dir>/<sanitized url>.html` so selector misses can be diagnosed against
//! the exact markup the extractors saw. This is a side-channel: failures are
//! logged and never affect the extraction result.

use crate::utils::sanitize_url_for_filename;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};

/// Path of the dump file for `url` inside `dir`.
pub fn dump_path(dir: &Path, url: &str) -> PathBuf {
    dir.join(format!("{}.html", sanitize_url_for_filename(url)))
}

/// Write `html` to the dump file for `url`. Never fails.
pub async fn persist_raw_document(dir: &Path, url: &str, html: &str) {
    let path = dump_path(dir, url);
    if let Err(e) = fs::create_dir_all(dir).await {
        warn!(dir = %dir.display(), error = %e, "Could not create debug directory");
        return;
    }
    match fs::write(&path, html).await {
        Ok(()) => debug!(path = %path.display(), bytes = html.len(), "Saved raw document"),
        Err(e) => warn!(path = %path.display(), error = %e, "Could not save raw document"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dump_path() {
        let path = dump_path(
            Path::new("/tmp/dumps"),
            "https://www.thebaltimorebanner.com/news/story-ABC/",
        );
        assert_eq!(
            path,
            PathBuf::from("/tmp/dumps/www_thebaltimorebanner_com_news_story-ABC.html")
        );
    }

    #[tokio::test]
    async fn test_persist_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let url = "https://www.thebaltimorebanner.com/x/";
        persist_raw_document(dir.path(), url, "<html>hi</html>").await;

        let saved = std::fs::read_to_string(dump_path(dir.path(), url)).unwrap();
        assert_eq!(saved, "<html>hi</html>");
    }

    #[tokio::test]
    async fn test_persist_failure_is_swallowed() {
        let dir = tempfile::tempdir().unwrap();
        // A regular file where the directory should be.
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, "x").unwrap();

        persist_raw_document(&blocker, "https://www.thebaltimorebanner.com/x/", "<html></html>").await;
        assert!(blocker.is_file());
    }
}
