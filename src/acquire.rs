//! Document acquisition.
//!
//! The extraction engine never fetches pages itself. It is handed an
//! [`Acquirer`], a long-lived collaborator with an explicit lifecycle:
//!
//! - [`Acquirer::acquire`]: establish the session (client, cookies, warm-up)
//! - [`Acquirer::fetch`]: navigate to one URL and return the rendered HTML
//! - [`Acquirer::release`]: tear the session down
//!
//! The session is reused across calls and may be shared, so callers must
//! serialize access to a single instance (the web form keeps it behind a
//! mutex).
//!
//! [`HttpAcquirer`] is the production implementation, a cookie-carrying
//! `reqwest` client that can be seeded with a session cookie copied from a
//! logged-in browser.

use crate::error::AcquireError;
use crate::extract::page_title_of;
use reqwest::StatusCode;
use reqwest::header::{COOKIE, HeaderMap, HeaderValue};
use std::fmt;
use std::future::Future;
use std::time::{Duration, Instant};
use tracing::{info, instrument, warn};

/// Desktop browser user agent; the site serves reduced markup to unknown agents.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// A session-holding source of raw HTML documents.
pub trait Acquirer {
    /// Establish the session. Calling it on an acquired session is a no-op.
    fn acquire(&mut self) -> impl Future<Output = Result<(), AcquireError>> + Send;

    /// Return the full document for `url`.
    fn fetch(&mut self, url: &str) -> impl Future<Output = Result<String, AcquireError>> + Send;

    /// Drop the session. The acquirer may be acquired again afterwards.
    fn release(&mut self) -> impl Future<Output = ()> + Send;
}

/// Settings for [`HttpAcquirer`].
#[derive(Clone)]
pub struct HttpSettings {
    pub timeout: Duration,
    pub user_agent: String,
    /// Raw `Cookie` header sent with every request, e.g. a subscriber session.
    pub cookie: Option<String>,
    /// Page requested once during `acquire` to seed the cookie jar.
    pub warm_up_url: Option<String>,
}

impl fmt::Debug for HttpSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpSettings")
            .field("timeout", &self.timeout)
            .field("user_agent", &self.user_agent)
            .field("cookie", &self.cookie.as_ref().map(|_| "<redacted>"))
            .field("warm_up_url", &self.warm_up_url)
            .finish()
    }
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            cookie: None,
            warm_up_url: None,
        }
    }
}

/// [`Acquirer`] backed by a `reqwest` client with a cookie store.
#[derive(Debug)]
pub struct HttpAcquirer {
    settings: HttpSettings,
    client: Option<reqwest::Client>,
}

impl HttpAcquirer {
    pub fn new(settings: HttpSettings) -> Self {
        Self {
            settings,
            client: None,
        }
    }

    pub fn is_acquired(&self) -> bool {
        self.client.is_some()
    }

    fn build_client(&self) -> Result<reqwest::Client, AcquireError> {
        let mut headers = HeaderMap::new();
        if let Some(cookie) = &self.settings.cookie {
            let value = HeaderValue::from_str(cookie)
                .map_err(|e| AcquireError::Session(format!("invalid cookie header: {}", e)))?;
            headers.insert(COOKIE, value);
        }

        reqwest::Client::builder()
            .user_agent(self.settings.user_agent.as_str())
            .timeout(self.settings.timeout)
            .cookie_store(true)
            .default_headers(headers)
            .build()
            .map_err(|e| AcquireError::Session(format!("could not build HTTP client: {}", e)))
    }
}

impl Acquirer for HttpAcquirer {
    #[instrument(level = "info", skip_all)]
    async fn acquire(&mut self) -> Result<(), AcquireError> {
        if self.is_acquired() {
            return Ok(());
        }

        let client = self.build_client()?;
        if let Some(home) = &self.settings.warm_up_url {
            // A failed warm-up only means an empty cookie jar.
            match client.get(home).send().await {
                Ok(resp) => info!(url = %home, status = %resp.status(), "Session warm-up complete"),
                Err(e) => warn!(url = %home, error = %e, "Session warm-up failed; continuing"),
            }
        }

        info!(
            timeout_secs = self.settings.timeout.as_secs(),
            has_cookie = self.settings.cookie.is_some(),
            "HTTP session acquired"
        );
        self.client = Some(client);
        Ok(())
    }

    #[instrument(level = "info", skip(self))]
    async fn fetch(&mut self, url: &str) -> Result<String, AcquireError> {
        let timeout = self.settings.timeout;
        let client = self.client.as_ref().ok_or_else(|| {
            AcquireError::Session("session not acquired; call acquire() first".to_string())
        })?;

        let t0 = Instant::now();
        let resp = client
            .get(url)
            .send()
            .await
            .map_err(|e| classify(e, timeout))?;

        let status = resp.status();
        if status == StatusCode::NOT_FOUND {
            let body = resp.text().await.unwrap_or_default();
            let title = page_title_of(&body).unwrap_or_else(|| format!("HTTP {}", status));
            warn!(%status, %title, "Server reported a missing page");
            return Err(AcquireError::NotFound { title });
        }
        if !status.is_success() {
            return Err(AcquireError::Network(format!("HTTP status {}", status)));
        }

        let html = resp.text().await.map_err(|e| classify(e, timeout))?;
        info!(
            %status,
            bytes = html.len(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "Fetched document"
        );
        Ok(html)
    }

    #[instrument(level = "info", skip_all)]
    async fn release(&mut self) {
        if self.client.take().is_some() {
            info!("HTTP session released");
        }
    }
}

fn classify(e: reqwest::Error, timeout: Duration) -> AcquireError {
    if e.is_timeout() {
        AcquireError::Timeout(timeout)
    } else {
        AcquireError::Network(e.to_string())
    }
}
