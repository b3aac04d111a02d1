use std::time::Duration;

use crate::core::errors::{Result, ScrambleError};

/// Timeout applied to every request unless configured otherwise.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Redirect hops followed before giving up on a short link.
const MAX_REDIRECTS: usize = 10;

/// Resolves short links and fetches the text they point at.
///
/// Holds no state between calls besides its timeout.
#[derive(Debug, Clone)]
pub struct LinkResolver {
    timeout: Duration,
}

impl LinkResolver {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Build a reqwest client with this resolver's timeout.
    fn build_client(&self) -> reqwest::Result<reqwest::Client> {
        reqwest::Client::builder()
            .timeout(self.timeout)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .user_agent(concat!("jibberscramble/", env!("CARGO_PKG_VERSION")))
            .build()
    }

    fn runtime() -> std::io::Result<tokio::runtime::Runtime> {
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
    }

    /// Follow redirects from `url` with a HEAD request and return the
    /// final URL.
    ///
    /// The status of the last response is not checked: landing on an
    /// error page still counts as resolved.
    pub fn resolve_indirection(&self, url: &str) -> Result<String> {
        let fail = |reason: String| ScrambleError::ResolutionError {
            url: url.to_string(),
            reason,
        };

        let rt = Self::runtime().map_err(|e| fail(format!("Failed to create async runtime: {e}")))?;

        rt.block_on(async {
            let client = self
                .build_client()
                .map_err(|e| fail(format!("Failed to create HTTP client: {e}")))?;
            let resp = client
                .head(url)
                .send()
                .await
                .map_err(|e| fail(e.to_string()))?;

            tracing::debug!(url, status = %resp.status(), resolved = %resp.url(), "resolved link");
            Ok(resp.url().to_string())
        })
    }

    /// GET `url` and return the body as text.
    ///
    /// Client and server error statuses are failures.
    pub fn fetch_text(&self, url: &str) -> Result<String> {
        let fail = |reason: String| ScrambleError::FetchError {
            url: url.to_string(),
            reason,
        };

        let rt = Self::runtime().map_err(|e| fail(format!("Failed to create async runtime: {e}")))?;

        rt.block_on(async {
            let client = self
                .build_client()
                .map_err(|e| fail(format!("Failed to create HTTP client: {e}")))?;
            let resp = client
                .get(url)
                .send()
                .await
                .map_err(|e| fail(e.to_string()))?
                .error_for_status()
                .map_err(|e| fail(e.to_string()))?;

            resp.text().await.map_err(|e| fail(e.to_string()))
        })
    }
}

impl Default for LinkResolver {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT)
    }
}
