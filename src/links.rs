use lazy_static::lazy_static;
use regex::Regex;
use url::Url;

lazy_static! {
    static ref HREF_RE: Regex = Regex::new(r#"(?i)href\s*=\s*["']([^"']+)["']"#).unwrap();
}

/// Extensions whose content is never scanned for keywords.
const BLOCKED_EXTENSIONS: [&str; 23] = [
    ".pdf", ".doc", ".docx", ".xls", ".xlsx", ".ppt", ".pptx", // binary documents
    ".jpg", ".jpeg", ".png", ".gif", ".bmp", ".ico", // images
    ".mp3", ".wav", ".mp4", ".avi", // audio/video
    ".zip", ".rar", ".exe", ".msi", // archive/installer files
    ".js", ".css", // script/style
];

/// Returns true for links that cannot hold scannable page content:
/// fragment-only refs, `javascript:`/`mailto:` links, and URLs whose path
/// ends in a blocked extension (query and fragment stripped first).
pub fn is_non_relevant(url: &str) -> bool {
    let url = url.trim().to_lowercase();

    if url.starts_with('#') || url.starts_with("javascript:") || url.starts_with("mailto:") {
        return true;
    }

    let clean = match url.find(['?', '#']) {
        Some(i) => &url[..i],
        None => url.as_str(),
    };
    BLOCKED_EXTENSIONS.iter().any(|ext| clean.ends_with(ext))
}

/// Lower-cased host of `url`, or an empty string when it cannot be parsed.
/// A missing scheme is tolerated by assuming `http://`.
pub fn base_domain(url: &str) -> String {
    let with_scheme = if starts_with_ignore_ascii_case(url, "http") {
        url.to_owned()
    } else {
        format!("http://{url}")
    };

    match Url::parse(&with_scheme) {
        Ok(parsed) => parsed.host_str().unwrap_or_default().to_lowercase(),
        Err(_) => String::new(),
    }
}

/// Truncates `url` at the first `#`, keeping any `?query` part.
pub fn without_fragment(url: &str) -> &str {
    match url.find('#') {
        Some(i) => &url[..i],
        None => url,
    }
}

/// Byte-wise ASCII case-insensitive prefix check. URLs are compared this way
/// wherever a base-URL scope applies.
pub fn starts_with_ignore_ascii_case(s: &str, prefix: &str) -> bool {
    s.len() >= prefix.len() && s.as_bytes()[..prefix.len()].eq_ignore_ascii_case(prefix.as_bytes())
}

/// Scans `page` for `href="…"`/`href='…'` attributes and resolves each one
/// against `base_url`. Malformed hrefs are skipped; nothing is yielded when
/// `base_url` itself does not parse.
pub fn extract_links<'a>(page: &'a str, base_url: &str) -> impl Iterator<Item = String> + 'a {
    let base = Url::parse(base_url).ok();
    HREF_RE.captures_iter(page).filter_map(move |caps| {
        let href = caps.get(1)?.as_str();
        base.as_ref()?.join(href).ok().map(|url| url.to_string())
    })
}
