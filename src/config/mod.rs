use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigError;

pub const DEFAULT_DESCRIPTION_MIN_LENGTH: usize = 20;
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_millis(30_000);
pub const DEFAULT_USER_AGENT: &str = "Mozilla";

/// Settings for fetching and extracting previews.
///
/// Built once and shared read-only by every preview call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PreviewConfig {
    /// Text from `<p>`, `<span>` or `<div>` must be longer than this (in
    /// characters) to be used as a fallback description.
    pub description_min_length: usize,
    /// Upper bound on a single fetch, connect through body.
    pub connect_timeout: Duration,
    pub user_agent: String,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            description_min_length: DEFAULT_DESCRIPTION_MIN_LENGTH,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl PreviewConfig {
    /// Read overrides from the environment (and `.env`, if present).
    ///
    /// Unset variables keep their defaults; set but unparsable ones are errors.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let defaults = Self::default();
        Ok(PreviewConfig {
            description_min_length: parse_var("LINK_PREVIEW_DESCRIPTION_MIN_LENGTH")?
                .unwrap_or(defaults.description_min_length),
            connect_timeout: parse_var::<u64>("LINK_PREVIEW_TIMEOUT_MS")?
                .map(Duration::from_millis)
                .unwrap_or(defaults.connect_timeout),
            user_agent: env::var("LINK_PREVIEW_USER_AGENT").unwrap_or(defaults.user_agent),
        })
    }

    pub fn with_description_min_length(mut self, description_min_length: usize) -> Self {
        self.description_min_length = description_min_length;
        self
    }

    pub fn with_connect_timeout(mut self, connect_timeout: Duration) -> Self {
        self.connect_timeout = connect_timeout;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

fn parse_var<T: FromStr>(key: &'static str) -> Result<Option<T>, ConfigError> {
    match env::var(key) {
        Ok(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid { key, value }),
        Err(_) => Ok(None),
    }
}
