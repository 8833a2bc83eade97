use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};

use crate::models::{MetaKey, MetaTags};

static META: Lazy<Selector> = Lazy::new(|| Selector::parse("meta").unwrap());
static TITLE: Lazy<Selector> = Lazy::new(|| Selector::parse("title").unwrap());
static PARAGRAPH: Lazy<Selector> = Lazy::new(|| Selector::parse("p").unwrap());
static SPAN: Lazy<Selector> = Lazy::new(|| Selector::parse("span").unwrap());
static DIV: Lazy<Selector> = Lazy::new(|| Selector::parse("div").unwrap());
static IMAGE: Lazy<Selector> = Lazy::new(|| Selector::parse("img").unwrap());

/// Text content of an element with whitespace runs collapsed and trimmed.
///
/// Text nodes are joined as-is first, so inline tags (`<a>`, `<b>`, ...)
/// never introduce whitespace of their own.
fn element_text(el: ElementRef<'_>) -> String {
    el.text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn meta_key(property: &str, name: &str) -> Option<MetaKey> {
    MetaKey::ALL
        .into_iter()
        .find(|key| property == key.og_property() || name == key.as_str())
}

/// Collect the recognised `<meta>` tags. The first tag seen for a key wins.
pub fn meta_tags(doc: &Html) -> MetaTags {
    let mut tags = MetaTags::new();
    for el in doc.select(&META) {
        let attrs = el.value();
        let Some(key) = meta_key(
            attrs.attr("property").unwrap_or_default(),
            attrs.attr("name").unwrap_or_default(),
        ) else {
            continue;
        };
        tags.entry(key)
            .or_insert_with(|| attrs.attr("content").unwrap_or_default().to_string());
    }
    tags
}

fn meta_value(meta_tags: &MetaTags, key: MetaKey) -> Option<&str> {
    meta_tags
        .get(&key)
        .map(String::as_str)
        .filter(|s| !s.is_empty())
}

pub fn title(doc: &Html, meta_tags: &MetaTags, canonical_url: &str) -> String {
    if let Some(title) = meta_value(meta_tags, MetaKey::Title) {
        return title.to_string();
    }
    doc.select(&TITLE)
        .next()
        .map(element_text)
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| canonical_url.to_string())
}

/// Longest text among elements matching `selector` that is longer than
/// `min_length` characters. Earlier elements win ties.
fn longest_text(doc: &Html, selector: &Selector, min_length: usize) -> (usize, String) {
    doc.select(selector)
        .map(element_text)
        .map(|text| (text.chars().count(), text))
        .filter(|(len, _)| *len > min_length)
        .fold((0, String::new()), |best, candidate| {
            if candidate.0 > best.0 {
                candidate
            } else {
                best
            }
        })
}

pub fn description(doc: &Html, meta_tags: &MetaTags, min_length: usize) -> String {
    if let Some(description) = meta_value(meta_tags, MetaKey::Description) {
        return description.to_string();
    }

    let (p_len, paragraph) = longest_text(doc, &PARAGRAPH, min_length);
    let (s_len, span) = longest_text(doc, &SPAN, min_length);
    let (d_len, div) = longest_text(doc, &DIV, min_length);

    // Div also wins when all three are the same length.
    if p_len > s_len && p_len > d_len {
        paragraph
    } else if s_len > p_len && s_len > d_len {
        span
    } else {
        div
    }
}

/// Unresolved image candidate: `og:image`, else the first non-empty `<img src>`.
pub fn image_candidate(doc: &Html, meta_tags: &MetaTags) -> String {
    if let Some(image) = meta_value(meta_tags, MetaKey::Image) {
        return image.to_string();
    }
    doc.select(&IMAGE)
        .filter_map(|el| el.value().attr("src"))
        .find(|src| !src.is_empty())
        .unwrap_or_default()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(body: &str) -> Html {
        Html::parse_document(&format!("<html><head></head><body>{body}</body></html>"))
    }

    #[test]
    fn harvests_og_and_name_tags() {
        let doc = Html::parse_document(
            r#"<html><head>
            <meta property="og:url" content="https://www.test.com">
            <meta name="title" content="Named title">
            <meta property="og:description" content="Desc">
            <meta name="image" content="/a.jpg">
            <meta property="og:site_name" content="Ignored">
            </head></html>"#,
        );
        let tags = meta_tags(&doc);
        assert_eq!(tags.len(), 4);
        assert_eq!(tags[&MetaKey::Url], "https://www.test.com");
        assert_eq!(tags[&MetaKey::Title], "Named title");
        assert_eq!(tags[&MetaKey::Description], "Desc");
        assert_eq!(tags[&MetaKey::Image], "/a.jpg");
    }

    #[test]
    fn first_meta_tag_wins() {
        let doc = Html::parse_document(
            r#"<html><head>
            <meta property="og:title" content="First">
            <meta name="title" content="Second">
            <meta property="og:title" content="Third">
            </head></html>"#,
        );
        assert_eq!(meta_tags(&doc)[&MetaKey::Title], "First");
    }

    #[test]
    fn missing_content_records_empty_value() {
        let doc = Html::parse_document(r#"<html><head><meta property="og:image"></head></html>"#);
        let tags = meta_tags(&doc);
        assert_eq!(tags.get(&MetaKey::Image).map(String::as_str), Some(""));
        assert_eq!(image_candidate(&doc, &tags), "");
    }

    #[test]
    fn absent_keys_are_not_present() {
        let doc = parse("<p>nothing here</p>");
        assert!(meta_tags(&doc).is_empty());
    }

    #[test]
    fn title_prefers_meta() {
        let doc = Html::parse_document(
            r#"<html><head><title>Tag</title><meta property="og:title" content="Web test"></head></html>"#,
        );
        let tags = meta_tags(&doc);
        assert_eq!(title(&doc, &tags, "test.com"), "Web test");
    }

    #[test]
    fn title_falls_back_to_title_tag_then_host() {
        let doc = Html::parse_document("<html><head><title>  Hi   web test </title></head></html>");
        assert_eq!(title(&doc, &MetaTags::new(), "test.com"), "Hi web test");

        let doc = parse("<p>no title</p>");
        assert_eq!(title(&doc, &MetaTags::new(), "test.com"), "test.com");
    }

    #[test]
    fn short_title_tag_is_still_used() {
        let doc = Html::parse_document("<html><head><title>Hi</title></head></html>");
        assert_eq!(title(&doc, &MetaTags::new(), "test.com"), "Hi");
    }

    #[test]
    fn empty_meta_title_falls_through() {
        let doc = Html::parse_document(
            r#"<html><head><meta property="og:title" content=""><title>Tag</title></head></html>"#,
        );
        let tags = meta_tags(&doc);
        assert_eq!(title(&doc, &tags, "test.com"), "Tag");
    }

    #[test]
    fn description_uses_meta_verbatim() {
        let doc = Html::parse_document(
            r#"<html><head><meta name="description" content="  spaced  "></head>
            <body><p>A paragraph that is certainly long enough</p></body></html>"#,
        );
        let tags = meta_tags(&doc);
        assert_eq!(description(&doc, &tags, 20), "  spaced  ");
    }

    #[test]
    fn description_picks_longest_paragraph() {
        let doc = parse(
            "<p>short</p>\
             <p>twenty-five characters ok</p>\
             <p>this paragraph is exactly forty chars!!!</p>",
        );
        assert_eq!(
            description(&doc, &MetaTags::new(), 20),
            "this paragraph is exactly forty chars!!!"
        );
    }

    #[test]
    fn description_threshold_is_exclusive() {
        let doc = parse("<p>exactly twenty chars</p>");
        assert_eq!("exactly twenty chars".len(), 20);
        assert_eq!(description(&doc, &MetaTags::new(), 20), "");
        assert_eq!(description(&doc, &MetaTags::new(), 19), "exactly twenty chars");
    }

    #[test]
    fn inline_markup_adds_no_whitespace() {
        let doc = parse("<p>Read the <a href='/x'>docs</a>, then build it yourself.</p>");
        assert_eq!(
            description(&doc, &MetaTags::new(), 20),
            "Read the docs, then build it yourself."
        );

        let doc = parse("<span>Hel<b>lo</b> world, from a span with <i>inline</i> tags</span>");
        assert_eq!(
            description(&doc, &MetaTags::new(), 20),
            "Hello world, from a span with inline tags"
        );
    }

    #[test]
    fn inline_markup_counts_toward_threshold_as_plain_text() {
        let doc = parse("<p>abcdefghij<b>klmnopqrst</b></p>");
        assert_eq!(description(&doc, &MetaTags::new(), 20), "");
        assert_eq!(description(&doc, &MetaTags::new(), 19), "abcdefghijklmnopqrst");
    }

    #[test]
    fn description_prefers_longer_span() {
        let doc = parse(
            "<p>a paragraph over twenty</p>\
             <span>a span that is quite a bit longer than the paragraph</span>",
        );
        assert_eq!(
            description(&doc, &MetaTags::new(), 20),
            "a span that is quite a bit longer than the paragraph"
        );
    }

    #[test]
    fn description_prefers_longer_div() {
        let doc = parse(
            "<div>a div with a great deal more text than the rest</div>\
             <p>a paragraph over twenty</p>",
        );
        assert_eq!(
            description(&doc, &MetaTags::new(), 20),
            "a div with a great deal more text than the rest"
        );
    }

    #[test]
    fn description_tie_goes_to_div() {
        // The div wraps the paragraph, so both texts are identical.
        let doc = parse("<div><p>paragraph inside a wrapping div</p></div>");
        assert_eq!(
            description(&doc, &MetaTags::new(), 20),
            "paragraph inside a wrapping div"
        );

        let doc = parse(
            "<p>same length text here!!</p>\
             <span>same length text there!</span>\
             <div>same length div text...</div>",
        );
        assert_eq!(description(&doc, &MetaTags::new(), 20), "same length div text...");
    }

    #[test]
    fn description_empty_when_nothing_clears_threshold() {
        let doc = parse("<p>tiny</p><span>small</span><div>short</div>");
        assert_eq!(description(&doc, &MetaTags::new(), 20), "");
    }

    #[test]
    fn image_prefers_meta_then_first_img() {
        let doc = parse(r#"<img><img src=""><img src="/first.jpg"><img src="/second.jpg">"#);
        assert_eq!(image_candidate(&doc, &MetaTags::new()), "/first.jpg");

        let mut tags = MetaTags::new();
        tags.insert(MetaKey::Image, "https://cdn.test.com/og.jpg".into());
        assert_eq!(image_candidate(&doc, &tags), "https://cdn.test.com/og.jpg");
    }

    #[test]
    fn no_image_is_empty() {
        let doc = parse("<p>text</p>");
        assert_eq!(image_candidate(&doc, &MetaTags::new()), "");
    }
}
