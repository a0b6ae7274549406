//! Per-platform extraction.
//!
//! One module per platform plus a generic fallback, all sharing the same
//! signature: `extract(client, config, url) -> Result<ProductRecord,
//! ScrapeError>`. Dispatch is an exhaustive match over [`Platform`], so
//! adding a platform means adding a module and a match arm, not growing a
//! conditional chain.

mod alibaba;
mod aliexpress;
mod amazon;
mod cj;
mod generic;

use chrono::Utc;
use storesmith_core::{Platform, ProductRecord, ScrapeConfig};

use crate::detect::detect_platform;
use crate::error::ScrapeError;
use crate::gate;

/// The pipeline's single public operation: URL in, record out.
///
/// Never fails past this boundary — the worst outcome is the demo record
/// with `is_demo = true`.
pub async fn scrape(
    client: &reqwest::Client,
    config: &ScrapeConfig,
    url: &str,
) -> ProductRecord {
    let platform = detect_platform(url);
    tracing::debug!(url, platform = %platform, "dispatching extractor");
    let outcome = extract_with(platform, client, config, url).await;
    gate::accept(outcome, platform, url)
}

/// Run the extractor for an already-detected platform.
///
/// Exposed separately so the gate and tests can drive a specific extractor
/// against an arbitrary (e.g. mocked) host.
///
/// # Errors
///
/// Returns [`ScrapeError`] when the fetch or parse fails outright; partial
/// data is not an error here — the validity gate judges sufficiency.
pub async fn extract_with(
    platform: Platform,
    client: &reqwest::Client,
    config: &ScrapeConfig,
    url: &str,
) -> Result<ProductRecord, ScrapeError> {
    match platform {
        Platform::Aliexpress => aliexpress::extract(client, config, url).await,
        Platform::Amazon => amazon::extract(client, config, url).await,
        Platform::Alibaba => alibaba::extract(client, config, url).await,
        Platform::Cj => cj::extract(client, config, url).await,
        Platform::GenericHttp => generic::extract(client, config, url).await,
    }
}

/// Empty candidate with identity fields filled in. Extractors start here and
/// populate whatever their source yields; the gate decides sufficiency.
pub(crate) fn new_candidate(platform: Platform, url: &str, config: &ScrapeConfig) -> ProductRecord {
    ProductRecord {
        platform,
        source_url: url.to_string(),
        title: String::new(),
        price: 0.0,
        original_price: None,
        currency: config.default_currency.clone(),
        images: Vec::new(),
        description: String::new(),
        bullets: Vec::new(),
        variants: Vec::new(),
        specifications: Vec::new(),
        rating: None,
        review_count: None,
        scraped_at: Utc::now(),
        is_demo: false,
    }
}

// ---------------------------------------------------------------------------
// JSON probing helpers shared by the extractors
// ---------------------------------------------------------------------------

/// Walk a fixed path into a JSON value.
pub(crate) fn json_get<'a>(
    value: &'a serde_json::Value,
    path: &[&str],
) -> Option<&'a serde_json::Value> {
    let mut current = value;
    for key in path {
        current = current.get(key)?;
    }
    Some(current)
}

/// Non-empty trimmed string at `path`.
pub(crate) fn json_str(value: &serde_json::Value, path: &[&str]) -> Option<String> {
    let s = json_get(value, path)?.as_str()?.trim();
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

/// Number at `path`; numeric strings are accepted too, since platforms
/// flip-flop between the two encodings across page variants.
pub(crate) fn json_f64(value: &serde_json::Value, path: &[&str]) -> Option<f64> {
    let node = json_get(value, path)?;
    node.as_f64()
        .or_else(|| node.as_str().and_then(|s| s.trim().parse::<f64>().ok()))
}

/// Unsigned count at `path`, tolerating string encodings like `"2,347"`.
pub(crate) fn json_u64(value: &serde_json::Value, path: &[&str]) -> Option<u64> {
    let node = json_get(value, path)?;
    node.as_u64().or_else(|| {
        node.as_str()
            .and_then(|s| s.trim().replace(',', "").parse::<u64>().ok())
    })
}

/// String array at `path`; non-string entries are skipped.
pub(crate) fn json_str_array(value: &serde_json::Value, path: &[&str]) -> Vec<String> {
    json_get(value, path)
        .and_then(serde_json::Value::as_array)
        .map(|arr| {
            arr.iter()
                .filter_map(|v| v.as_str())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_str_rejects_empty() {
        let v = json!({"a": {"b": "  "}});
        assert!(json_str(&v, &["a", "b"]).is_none());
    }

    #[test]
    fn json_f64_accepts_numeric_string() {
        let v = json!({"price": "12.99"});
        assert_eq!(json_f64(&v, &["price"]), Some(12.99));
    }

    #[test]
    fn json_u64_strips_thousands_separator() {
        let v = json!({"count": "2,347"});
        assert_eq!(json_u64(&v, &["count"]), Some(2347));
    }

    #[test]
    fn json_str_array_skips_non_strings() {
        let v = json!({"images": ["a.jpg", 7, "b.jpg"]});
        assert_eq!(json_str_array(&v, &["images"]), vec!["a.jpg", "b.jpg"]);
    }

    #[test]
    fn json_get_missing_path_is_none() {
        let v = json!({"a": 1});
        assert!(json_get(&v, &["a", "b"]).is_none());
    }
}
