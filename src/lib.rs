//! Link previews: fetch a URL and extract a title, description, thumbnail
//! and canonical host from its OpenGraph/meta tags, with fallbacks for pages
//! that have none.
//!
//! - [`LinkPreview`] is the single-shot async entry point.
//! - [`PreviewExecutor`] runs previews on a caller-owned runtime and reports
//!   through listener callbacks.

pub mod config;
pub mod error;
pub mod executor;
pub mod extract;
pub mod fetch;
pub mod models;
pub mod preview;

pub use config::PreviewConfig;
pub use error::{ConfigError, FetchError, FetchResult};
pub use executor::{PreviewExecutor, PreviewListener, PreviewTask};
pub use fetch::{Fetch, FetchOutcome, HttpFetcher};
pub use models::{MetaKey, MetaTags, PreviewResult};
pub use preview::LinkPreview;
