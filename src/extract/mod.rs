//! Turning fetched content into a [`PreviewResult`].
//!
//! Markup goes through meta tag harvesting and the title/description/image
//! fallbacks in [`document`]. Content the fetcher could not treat as markup
//! (a direct link to an image or video, a PDF, ...) gets a minimal result
//! built from the URL alone.

pub mod document;
pub mod urls;

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::Html;

use crate::models::PreviewResult;

pub use urls::{canonicalize, normalize, resolve_image_url};

static MIME_IMAGE_TYPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^image/(jpg|jpeg|png|gif|webp|svg|bmp|tiff)$").unwrap());
static MIME_VIDEO_TYPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^video/(x-flv|mp4|MP2T|3gpp|quicktime|ogg|webm|x-msvideo|x-ms-wmv|x-m4v|ms-asf)$",
    )
    .unwrap()
});

/// True when a URL serving `mime_type` can be shown directly as the preview image.
pub fn is_previewable_media(mime_type: &str) -> bool {
    MIME_IMAGE_TYPE.is_match(mime_type) || MIME_VIDEO_TYPE.is_match(mime_type)
}

/// Build a preview from a markup page fetched from `full_url`.
pub fn from_html(full_url: &str, html: &str, description_min_length: usize) -> PreviewResult {
    let doc = Html::parse_document(html);

    let mut result = PreviewResult {
        full_url: full_url.to_string(),
        ..Default::default()
    };
    result.canonical_url = canonicalize(&result.full_url);
    result.raw_html = doc.html();
    result.meta_tags = document::meta_tags(&doc);
    result.title = document::title(&doc, &result.meta_tags, &result.canonical_url);
    result.description =
        document::description(&doc, &result.meta_tags, description_min_length);
    result.image_url = resolve_image_url(
        &document::image_candidate(&doc, &result.meta_tags),
        &result.canonical_url,
    );
    result
}

/// Build a preview for a URL whose content is not markup.
pub fn from_unsupported(full_url: &str, mime_type: &str) -> PreviewResult {
    let canonical_url = canonicalize(full_url);
    let image_url = if is_previewable_media(mime_type) {
        full_url.to_string()
    } else {
        String::new()
    };

    PreviewResult {
        full_url: full_url.to_string(),
        title: canonical_url.clone(),
        canonical_url,
        image_url,
        ..Default::default()
    }
}
