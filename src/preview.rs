use std::sync::Arc;

use crate::config::PreviewConfig;
use crate::error::FetchResult;
use crate::extract;
use crate::fetch::{Fetch, FetchOutcome, HttpFetcher};
use crate::models::PreviewResult;

/// Fetches a URL and extracts its preview.
///
/// Holds no per-call state, so one instance can serve any number of
/// concurrent calls.
#[derive(Clone)]
pub struct LinkPreview {
    config: PreviewConfig,
    fetcher: Arc<dyn Fetch>,
}

impl LinkPreview {
    /// Preview over HTTP using `config`'s timeout and user agent.
    pub fn new(config: PreviewConfig) -> FetchResult<Self> {
        let fetcher = HttpFetcher::new(&config)?;
        Ok(Self::with_fetcher(config, Arc::new(fetcher)))
    }

    pub fn with_fetcher(config: PreviewConfig, fetcher: Arc<dyn Fetch>) -> Self {
        Self { config, fetcher }
    }

    pub fn config(&self) -> &PreviewConfig {
        &self.config
    }

    /// Fetch `url` and build its preview.
    ///
    /// `url` may omit the scheme, in which case `https://` is assumed. Blank
    /// input returns an empty result without fetching. Fetch errors are
    /// returned as-is; non-markup content still yields a result.
    pub async fn load_preview(&self, url: &str) -> FetchResult<PreviewResult> {
        if url.trim().is_empty() {
            return Ok(PreviewResult::default());
        }

        let full_url = extract::normalize(url);
        let outcome = self.fetcher.fetch(&full_url).await?;

        let result = match outcome {
            FetchOutcome::Markup { url, html } => {
                extract::from_html(&url, &html, self.config.description_min_length)
            }
            FetchOutcome::Unsupported { url, mime_type } => {
                extract::from_unsupported(&url, &mime_type)
            }
        };

        tracing::debug!(
            url = %result.full_url,
            title = %result.title,
            has_image = !result.image_url.is_empty(),
            "Extracted link preview"
        );
        Ok(result)
    }
}
