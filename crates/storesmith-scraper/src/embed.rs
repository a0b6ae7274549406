//! Script-embedded structured data extraction.
//!
//! Product pages bury their real data in `<script>` tags under shifting
//! variable-assignment conventions. Each platform extractor supplies an
//! ordered pattern list; the first assignment whose payload parses as valid
//! JSON wins. A blob that matches a pattern but fails to parse is skipped,
//! not escalated — the extractor falls through to its next field source.

use regex::Regex;

/// Scan `html` for the given variable-assignment patterns, in order, and
/// return the first balanced `{…}` payload that parses as JSON.
///
/// Each pattern must match up to (but not including) the opening brace of
/// the assigned object, e.g. `r"window\.runParams\s*=\s*"`.
#[must_use]
pub fn extract_embedded_json(html: &str, patterns: &[&str]) -> Option<serde_json::Value> {
    for pattern in patterns {
        let Ok(re) = Regex::new(pattern) else {
            tracing::warn!(pattern, "invalid embed pattern; skipping");
            continue;
        };

        for m in re.find_iter(html) {
            let rest = html[m.end()..].trim_start();
            let Some(object_str) = extract_balanced_object(rest) else {
                continue;
            };
            match serde_json::from_str::<serde_json::Value>(object_str) {
                Ok(value) => {
                    tracing::debug!(pattern, "embedded JSON matched");
                    return Some(value);
                }
                Err(err) => {
                    // Not strict JSON (JS object literal, truncated blob).
                    // Recover locally by trying the next occurrence/pattern.
                    tracing::debug!(pattern, error = %err, "embedded blob failed to parse");
                }
            }
        }
    }
    None
}

/// Try to extract a balanced JSON object from the start of `s`.
///
/// Scans character-by-character tracking brace depth, respecting string
/// literals and escape sequences. Returns the shortest prefix of `s` that
/// forms a complete `{…}` object, or `None` if unterminated.
#[must_use]
pub fn extract_balanced_object(s: &str) -> Option<&str> {
    if !s.starts_with('{') {
        return None;
    }
    let mut depth: i32 = 0;
    let mut in_string = false;
    let mut escape = false;
    for (i, c) in s.char_indices() {
        if escape {
            escape = false;
            continue;
        }
        if in_string {
            match c {
                '\\' => escape = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' | '[' => depth += 1,
            ']' => depth -= 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&s[..=i]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Extract the first JSON-LD object of the given `@type` from
/// `<script type="application/ld+json">` blocks.
///
/// Accepts a top-level object, a top-level array, and `@graph` containers;
/// `@type` itself may be a string or an array of strings.
#[must_use]
pub fn extract_json_ld(html: &str, type_name: &str) -> Option<serde_json::Value> {
    let script_re = Regex::new(
        r#"(?is)<script[^>]+type\s*=\s*["']application/ld\+json["'][^>]*>(.*?)</script>"#,
    )
    .expect("valid regex");

    for cap in script_re.captures_iter(html) {
        let json_text = match cap.get(1) {
            Some(m) => m.as_str(),
            None => continue,
        };
        let value: serde_json::Value = match serde_json::from_str(json_text.trim()) {
            Ok(v) => v,
            Err(_) => continue,
        };

        let mut candidates: Vec<serde_json::Value> = if let Some(arr) = value.as_array() {
            arr.clone()
        } else {
            vec![value]
        };

        // Many sites wrap structured data in {"@graph": [...]} at the top.
        let mut expanded = Vec::new();
        for item in &candidates {
            if let Some(graph) = item.get("@graph").and_then(serde_json::Value::as_array) {
                expanded.extend(graph.iter().cloned());
            }
        }
        candidates.extend(expanded);

        for item in candidates {
            if type_matches(&item, type_name) {
                return Some(item);
            }
        }
    }
    None
}

fn type_matches(item: &serde_json::Value, type_name: &str) -> bool {
    match item.get("@type") {
        Some(serde_json::Value::String(s)) => s.eq_ignore_ascii_case(type_name),
        Some(serde_json::Value::Array(arr)) => arr
            .iter()
            .filter_map(|v| v.as_str())
            .any(|s| s.eq_ignore_ascii_case(type_name)),
        _ => false,
    }
}

#[cfg(test)]
#[path = "embed_test.rs"]
mod tests;
