use async_trait::async_trait;
use encoding_rs::{Encoding, UTF_8};
use once_cell::sync::Lazy;
use regex::bytes::Regex as BytesRegex;
use regex::Regex;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client as ReqwestClient;
use url::Url;

use crate::config::PreviewConfig;
use crate::error::{FetchError, FetchResult};

// text/*, application/xml and application/*+xml (plus text/*+xml).
static MARKUP_TYPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(text/[\w.+-]+|application/([\w.-]+\+)?xml)$").unwrap());

static HEADER_CHARSET: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i);\s*charset\s*=\s*"?([\w.:-]+)"#).unwrap());
// Covers both `<meta charset=..>` and `<meta http-equiv=.. content="..; charset=..">`.
static META_CHARSET: Lazy<BytesRegex> = Lazy::new(|| {
    BytesRegex::new(r#"(?i-u)<meta[^>]*?charset\s*=\s*["']?\s*([\w.:-]+)"#).unwrap()
});

/// How far into the body to look for a `<meta>` charset declaration.
const CHARSET_SNIFF_LIMIT: usize = 1024;

/// What a fetch produced. Both variants carry the URL after redirects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The response was markup; `html` is the decoded body.
    Markup { url: String, html: String },
    /// The response was something else (an image, a video, a PDF, ...). The
    /// body was not read.
    Unsupported { url: String, mime_type: String },
}

impl FetchOutcome {
    pub fn url(&self) -> &str {
        match self {
            FetchOutcome::Markup { url, .. } | FetchOutcome::Unsupported { url, .. } => url,
        }
    }
}

/// Something that can retrieve a page for previewing.
///
/// Receives an absolute URL and makes at most one request per call.
#[async_trait]
pub trait Fetch: Send + Sync {
    async fn fetch(&self, url: &str) -> FetchResult<FetchOutcome>;
}

/// Media type of a `Content-Type` header value, without parameters.
pub fn media_type(content_type: &str) -> &str {
    content_type.split(';').next().unwrap_or_default().trim()
}

pub fn is_markup_type(mime_type: &str) -> bool {
    MARKUP_TYPE.is_match(mime_type)
}

fn charset_label<'a>(content_type: Option<&'a str>, body: &'a [u8]) -> Option<&'a [u8]> {
    if let Some(caps) = content_type.and_then(|ct| HEADER_CHARSET.captures(ct)) {
        return caps.get(1).map(|m| m.as_str().as_bytes());
    }
    let head = &body[..body.len().min(CHARSET_SNIFF_LIMIT)];
    META_CHARSET
        .captures(head)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_bytes())
}

/// Decode a markup body to text.
///
/// A byte order mark wins, then the `charset` parameter of `content_type`,
/// then a `<meta>` declaration near the start of the body. Anything else,
/// including an unknown label, decodes as UTF-8. Malformed sequences become
/// U+FFFD.
pub fn decode_body(content_type: Option<&str>, body: &[u8]) -> String {
    let encoding = charset_label(content_type, body)
        .and_then(Encoding::for_label)
        .unwrap_or(UTF_8);
    let (text, used, had_errors) = encoding.decode(body);
    if had_errors {
        tracing::debug!(encoding = used.name(), "Replaced malformed bytes while decoding body");
    }
    text.into_owned()
}

/// [`Fetch`] over HTTP(S) with `reqwest`.
///
/// Redirects are followed by the client's default policy. Non-2xx responses
/// are errors. Markup bodies are decoded with [`decode_body`].
#[derive(Clone, Debug)]
pub struct HttpFetcher {
    client: ReqwestClient,
}

impl HttpFetcher {
    pub fn new(config: &PreviewConfig) -> FetchResult<Self> {
        let client = ReqwestClient::builder()
            .timeout(config.connect_timeout)
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;
        Ok(Self { client })
    }

    pub fn with_client(client: ReqwestClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Fetch for HttpFetcher {
    async fn fetch(&self, url: &str) -> FetchResult<FetchOutcome> {
        let parsed = Url::parse(url).map_err(|e| FetchError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        tracing::debug!(url = %parsed, "Fetching page for preview");

        let response = self.client.get(parsed).send().await.map_err(|e| {
            tracing::warn!(error = ?e, url = %url, "Failed to fetch URL for link preview");
            FetchError::from_reqwest(url, e)
        })?;

        let final_url = response.url().to_string();
        let status = response.status();
        if !status.is_success() {
            tracing::warn!(url = %final_url, %status, "Link preview fetch returned error status");
            return Err(FetchError::Status {
                url: final_url,
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        // A missing Content-Type is parsed as markup.
        let mime_type = content_type.as_deref().map(|v| media_type(v).to_string());
        if let Some(mime_type) = mime_type.filter(|m| !is_markup_type(m)) {
            tracing::debug!(url = %final_url, %mime_type, "Unsupported content type");
            return Ok(FetchOutcome::Unsupported {
                url: final_url,
                mime_type,
            });
        }

        let body = response.bytes().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout {
                    url: final_url.clone(),
                }
            } else {
                FetchError::Body {
                    url: final_url.clone(),
                    reason: e.to_string(),
                }
            }
        })?;
        let html = decode_body(content_type.as_deref(), &body);

        tracing::debug!(url = %final_url, bytes = body.len(), "Fetched markup");
        Ok(FetchOutcome::Markup {
            url: final_url,
            html,
        })
    }
}
