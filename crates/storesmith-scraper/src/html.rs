//! Regex-based markup probing helpers.
//!
//! The extractors scan raw markup with regex rather than building a DOM:
//! the fields they need are shallow (first heading, title tag, meta/itemprop
//! attributes, list items inside a known region) and product pages are
//! routinely malformed enough that a strict parser loses data a scan keeps.

use regex::Regex;

/// Inner text of the first `<tag>` element, tag-stripped, entity-decoded,
/// whitespace-collapsed. Returns `None` for missing or empty elements.
#[must_use]
pub fn tag_text(html: &str, tag: &str) -> Option<String> {
    let pattern = format!(r"(?is)<{tag}\b[^>]*>(.*?)</{tag}>");
    first_capture(html, &pattern)
}

/// Text of the `<title>` element.
#[must_use]
pub fn title_tag(html: &str) -> Option<String> {
    tag_text(html, "title")
}

/// `content` attribute of the first `<meta>` whose `property` or `name`
/// equals `key` (e.g. `"og:title"`). Attribute order within the tag does
/// not matter.
#[must_use]
pub fn meta_content(html: &str, key: &str) -> Option<String> {
    let tag_re = Regex::new(r"(?is)<meta\b[^>]*>").expect("valid regex");
    let key_re = Regex::new(&format!(
        r#"(?i)(?:property|name)\s*=\s*["']{}["']"#,
        regex::escape(key)
    ))
    .expect("valid regex");
    let content_re = content_attr_re();

    for m in tag_re.find_iter(html) {
        let tag = m.as_str();
        if !key_re.is_match(tag) {
            continue;
        }
        if let Some(cap) = content_re.captures(tag) {
            let value = clean_fragment(quoted_value(&cap));
            if !value.is_empty() {
                return Some(value);
            }
        }
    }
    None
}

/// `content="…"` or `content='…'`, quote styles matched separately so a
/// double-quoted value containing an apostrophe is not truncated at it.
fn content_attr_re() -> Regex {
    Regex::new(r#"(?is)content\s*=\s*(?:"([^"]*)"|'([^']*)')"#).expect("valid regex")
}

/// The value of whichever quote-style group participated in the match.
fn quoted_value<'t>(cap: &regex::Captures<'t>) -> &'t str {
    cap.get(1)
        .or_else(|| cap.get(2))
        .map_or("", |m| m.as_str())
}

/// Value of the first microdata `itemprop="prop"` element: the `content`
/// attribute when present, otherwise the element's inner text.
#[must_use]
pub fn itemprop_content(html: &str, prop: &str) -> Option<String> {
    let open_re = Regex::new(&format!(
        r#"(?is)<([a-z][a-z0-9]*)\b[^>]*itemprop\s*=\s*["']{}["'][^>]*>"#,
        regex::escape(prop)
    ))
    .expect("valid regex");
    let content_re = content_attr_re();

    for cap in open_re.captures_iter(html) {
        let whole = cap.get(0).expect("capture 0 always present");
        if let Some(content) = content_re.captures(whole.as_str()) {
            let value = clean_fragment(quoted_value(&content));
            if !value.is_empty() {
                return Some(value);
            }
            continue;
        }
        // No content attribute: take the inner text up to the closing tag.
        let tag_name = &cap[1];
        let rest = &html[whole.end()..];
        let close_re =
            Regex::new(&format!(r"(?is)(.*?)</{}>", regex::escape(tag_name))).expect("valid regex");
        if let Some(inner) = close_re.captures(rest) {
            let value = clean_fragment(&inner[1]);
            if !value.is_empty() {
                return Some(value);
            }
        }
    }
    None
}

/// First participating capture group of `pattern` over `html`, cleaned.
/// `None` when the pattern does not match or the capture cleans to empty.
/// Alternation patterns with one group per branch work as expected.
#[must_use]
pub fn first_capture(html: &str, pattern: &str) -> Option<String> {
    let re = Regex::new(pattern).ok()?;
    for cap in re.captures_iter(html) {
        if let Some(m) = cap.iter().skip(1).flatten().next() {
            let value = clean_fragment(m.as_str());
            if !value.is_empty() {
                return Some(value);
            }
        }
    }
    None
}

/// First participating capture group of every match of `pattern`, raw (not
/// cleaned). Used for attribute harvesting such as `<img src="…">`.
#[must_use]
pub fn all_captures(html: &str, pattern: &str) -> Vec<String> {
    let Ok(re) = Regex::new(pattern) else {
        return Vec::new();
    };
    re.captures_iter(html)
        .filter_map(|cap| {
            cap.iter()
                .skip(1)
                .flatten()
                .next()
                .map(|m| m.as_str().to_string())
        })
        .collect()
}

/// Cleaned text of every `<li>` inside `fragment`.
#[must_use]
pub fn list_items(fragment: &str) -> Vec<String> {
    let re = Regex::new(r"(?is)<li\b[^>]*>(.*?)</li>").expect("valid regex");
    re.captures_iter(fragment)
        .filter_map(|cap| {
            let text = clean_fragment(&cap[1]);
            if text.is_empty() {
                None
            } else {
                Some(text)
            }
        })
        .collect()
}

/// Strip tags, decode common entities, collapse whitespace.
#[must_use]
pub fn clean_fragment(fragment: &str) -> String {
    collapse_ws(&decode_entities(&strip_tags(fragment)))
}

/// Remove markup tags, keeping inner text.
#[must_use]
pub fn strip_tags(fragment: &str) -> String {
    let re = Regex::new(r"(?s)<[^>]*>").expect("valid regex");
    re.replace_all(fragment, " ").into_owned()
}

/// Decode the handful of entities that actually occur in product titles and
/// prices. Unknown entities are left as-is.
#[must_use]
pub fn decode_entities(s: &str) -> String {
    let mut out = s
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&nbsp;", " ");
    // Numeric decimal entities (e.g. &#8211;) for dashes and quotes.
    let num_re = Regex::new(r"&#(\d+);").expect("valid regex");
    if num_re.is_match(&out) {
        out = num_re
            .replace_all(&out, |cap: &regex::Captures<'_>| {
                cap[1]
                    .parse::<u32>()
                    .ok()
                    .and_then(char::from_u32)
                    .map_or_else(|| cap[0].to_string(), String::from)
            })
            .into_owned();
    }
    // Last, so a double-escaped entity (&amp;lt;) decodes exactly one level.
    out.replace("&amp;", "&")
}

/// Collapse runs of whitespace to single spaces and trim.
#[must_use]
pub fn collapse_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
#[path = "html_test.rs"]
mod tests;
