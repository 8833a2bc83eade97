//! URL helpers: scheme defaulting, host canonicalization and image URL
//! resolution. All pure string functions.

const HTTP: &str = "http://";
const HTTPS: &str = "https://";
const WWW: &str = "www.";
const SEPARATOR: &str = "/";
const DOUBLE_SEPARATOR: &str = "//";

fn starts_with_ignore_case(s: &str, prefix: &str) -> bool {
    s.get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}

/// Prepend `https://` unless the input already starts with `http://` or
/// `https://` (in any case). Nothing else about the input changes.
pub fn normalize(input: &str) -> String {
    if starts_with_ignore_case(input, HTTP) || starts_with_ignore_case(input, HTTPS) {
        input.to_string()
    } else {
        format!("{HTTPS}{input}")
    }
}

/// Host of `full_url` with one leading `www.` removed. Case is preserved.
/// Returns an empty string when the URL has no host.
pub fn canonicalize(full_url: &str) -> String {
    let host = host_of(full_url);
    if starts_with_ignore_case(host, WWW) {
        host[WWW.len()..].to_string()
    } else {
        host.to_string()
    }
}

fn host_of(url: &str) -> &str {
    let Some((_, rest)) = url.split_once("://") else {
        return "";
    };
    let authority = rest.split(['/', '?', '#']).next().unwrap_or_default();
    let host_port = authority
        .rsplit_once('@')
        .map_or(authority, |(_, host_port)| host_port);

    // IPv6 literal: keep the brackets, drop any port after them.
    if host_port.starts_with('[') {
        return host_port
            .find(']')
            .map_or(host_port, |end| &host_port[..=end]);
    }
    host_port.split(':').next().unwrap_or_default()
}

/// Turn a raw `og:image`/`<img src>` value into an absolute URL.
///
/// Relative candidates are joined onto `https://www.{canonical_url}`.
pub fn resolve_image_url(raw: &str, canonical_url: &str) -> String {
    if raw.is_empty() {
        String::new()
    } else if let Some(rest) = raw.strip_prefix(DOUBLE_SEPARATOR) {
        format!("{HTTPS}{rest}")
    } else if raw.starts_with(SEPARATOR) {
        format!("{HTTPS}{WWW}{canonical_url}{raw}")
    } else if !starts_with_ignore_case(raw, HTTP)
        && !starts_with_ignore_case(raw, HTTPS)
        && !starts_with_ignore_case(raw, WWW)
    {
        format!("{HTTPS}{WWW}{canonical_url}{SEPARATOR}{raw}")
    } else {
        raw.to_string()
    }
}
