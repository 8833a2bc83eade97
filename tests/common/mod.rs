// Each integration test file is a separate binary; helpers not used in every
// binary would otherwise trigger dead_code warnings from clippy.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use link_preview::{Fetch, FetchOutcome, FetchResult, LinkPreview, PreviewConfig};

pub const WEB_TEST_1: &str = include_str!("../fixtures/web_test_1.html");
pub const WEB_TEST_2: &str = include_str!("../fixtures/web_test_2.html");
pub const WEB_TEST_3: &str = include_str!("../fixtures/web_test_3.html");

type Respond = dyn Fn(&str) -> FetchResult<FetchOutcome> + Send + Sync;

/// Fetcher that answers from a closure and remembers every URL it was asked for.
pub struct StubFetcher {
    respond: Box<Respond>,
    requested: Mutex<Vec<String>>,
}

impl StubFetcher {
    pub fn new(respond: impl Fn(&str) -> FetchResult<FetchOutcome> + Send + Sync + 'static) -> Arc<Self> {
        Arc::new(Self {
            respond: Box::new(respond),
            requested: Mutex::new(Vec::new()),
        })
    }

    /// Serve `html` for exactly `expected_url`; any other URL is a test failure.
    pub fn serving(expected_url: &'static str, html: &'static str) -> Arc<Self> {
        Self::new(move |url| {
            assert_eq!(url, expected_url, "fetched unexpected URL");
            Ok(FetchOutcome::Markup {
                url: url.to_string(),
                html: html.to_string(),
            })
        })
    }

    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl Fetch for StubFetcher {
    async fn fetch(&self, url: &str) -> FetchResult<FetchOutcome> {
        self.requested.lock().unwrap().push(url.to_string());
        (self.respond)(url)
    }
}

pub fn preview_with(fetcher: Arc<StubFetcher>) -> LinkPreview {
    LinkPreview::with_fetcher(PreviewConfig::default(), fetcher)
}

/// What `raw_html` should hold for a fixture: the parsed page re-serialized.
pub fn reserialized(html: &str) -> String {
    scraper::Html::parse_document(html).html()
}

pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("link_preview=debug")
        .with_test_writer()
        .try_init();
}
