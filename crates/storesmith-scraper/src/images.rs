//! Image URL normalization.

use std::collections::HashSet;

use regex::Regex;

/// Hard cap on images per record.
pub const MAX_IMAGES: usize = 15;

/// Resolve a raw image reference to an absolute HTTPS-friendly URL.
///
/// - protocol-relative `//host/…` becomes `https://host/…`
/// - absolute `http(s)` URLs pass through
/// - relative references resolve against the page URL
/// - data URIs and empty strings are rejected
#[must_use]
pub fn absolutize(raw: &str, page_url: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.starts_with("data:") {
        return None;
    }
    if let Some(rest) = trimmed.strip_prefix("//") {
        return Some(format!("https://{rest}"));
    }
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        return Some(trimmed.to_string());
    }
    let base = reqwest::Url::parse(page_url).ok()?;
    base.join(trimmed).ok().map(|u| u.to_string())
}

/// Rewrite known thumbnail URL variants to their full-resolution asset.
///
/// - AliExpress appends a size segment after the real extension:
///   `…/a.jpg_220x220.jpg` / `…/a.jpg_640x640q90.jpg` → `…/a.jpg`, and the
///   webp re-wrap `…/a.jpg_.webp` → `…/a.jpg`.
/// - Amazon encodes size modifiers between dots:
///   `…/I/abc._AC_US240_.jpg` → `…/I/abc.jpg`.
///
/// Unknown URL shapes are returned unchanged.
#[must_use]
pub fn strip_size_variant(url: &str) -> String {
    let ali_size = Regex::new(r"(\.(?:jpe?g|png|webp))_\d+x\d+[^/]*$").expect("valid regex");
    let ali_webp = Regex::new(r"(\.(?:jpe?g|png))_\.webp$").expect("valid regex");
    let amazon_mod = Regex::new(r"\._[A-Za-z0-9,_]+_\.").expect("valid regex");

    let out = ali_size.replace(url, "$1");
    let out = ali_webp.replace(&out, "$1");
    amazon_mod.replace(&out, ".").into_owned()
}

/// Full normalization pass over a candidate image list: absolutize against
/// the page URL, prefer full-resolution variants, drop rejects, deduplicate
/// preserving page order, cap at [`MAX_IMAGES`].
#[must_use]
pub fn finalize_images<I, S>(raw: I, page_url: &str) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for candidate in raw {
        let Some(absolute) = absolutize(candidate.as_ref(), page_url) else {
            continue;
        };
        let full = strip_size_variant(&absolute);
        if seen.insert(full.clone()) {
            out.push(full);
            if out.len() == MAX_IMAGES {
                break;
            }
        }
    }
    out
}

#[cfg(test)]
#[path = "images_test.rs"]
mod tests;
