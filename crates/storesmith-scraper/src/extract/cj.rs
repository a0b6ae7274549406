//! CJdropshipping product extractor.
//!
//! CJ exposes a lightweight same-origin product API keyed by the id that is
//! part of every product URL (`…-p-<id>.html`). The API is tried first with
//! the shorter timeout; the page markup is the fallback when the API is
//! missing, blocked, or returns an unusable payload.

use regex::Regex;
use storesmith_core::{Platform, ProductRecord, ProductVariant, ScrapeConfig, Specification, VariantOption};

use super::{json_f64, json_get, json_str, json_str_array, json_u64, new_candidate};
use crate::embed::{extract_embedded_json, extract_json_ld};
use crate::error::ScrapeError;
use crate::fetch::{fetch_html, fetch_json};
use crate::html::{meta_content, tag_text, title_tag};
use crate::images::finalize_images;
use crate::price::parse_price_opt;

const EMBED_PATTERNS: [&str; 2] = [
    r"window\.productDetail\s*=\s*",
    r"window\.__INITIAL_STATE__\s*=\s*",
];

pub(super) async fn extract(
    client: &reqwest::Client,
    config: &ScrapeConfig,
    url: &str,
) -> Result<ProductRecord, ScrapeError> {
    if let Some(api_url) = product_api_url(url) {
        match fetch_json(client, &api_url, config.api_timeout_secs, &config.user_agent).await {
            Ok(payload) => {
                if let Some(record) = record_from_api(&payload, url, config) {
                    return Ok(record);
                }
                tracing::debug!(api_url, "CJ product API payload had no usable product");
            }
            Err(err) => {
                tracing::debug!(api_url, error = %err, "CJ product API unavailable; falling back to page markup");
            }
        }
    }

    extract_from_page(client, config, url).await
}

/// `…/product/anything-p-12345.html` → same-origin product query endpoint.
fn product_api_url(url: &str) -> Option<String> {
    let id = product_id_from_url(url)?;
    let parsed = reqwest::Url::parse(url).ok()?;
    let origin = parsed.origin().ascii_serialization();
    Some(format!("{origin}/product-api/product/query?id={id}"))
}

fn product_id_from_url(url: &str) -> Option<String> {
    let re = Regex::new(r"-p-([0-9A-Za-z]+)\.html").expect("valid regex");
    re.captures(url).map(|cap| cap[1].to_string())
}

/// Map the API payload to a candidate. Returns `None` when the payload
/// carries no title, so the caller can fall back to markup.
fn record_from_api(
    payload: &serde_json::Value,
    url: &str,
    config: &ScrapeConfig,
) -> Option<ProductRecord> {
    let data = payload.get("data").filter(|d| d.is_object()).unwrap_or(payload);

    let title = json_str(data, &["productNameEn"]).or_else(|| json_str(data, &["productName"]))?;

    let mut record = new_candidate(Platform::Cj, url, config);
    record.title = title;

    // sellPrice is a string, sometimes a "low--high" range.
    record.price = json_str(data, &["sellPrice"])
        .and_then(|s| parse_price_opt(&s))
        .or_else(|| json_f64(data, &["sellPrice"]))
        .unwrap_or(0.0);

    let mut raw_images = json_str_array(data, &["productImageSet"]);
    if raw_images.is_empty() {
        if let Some(single) = json_str(data, &["productImage"]) {
            raw_images.push(single);
        }
    }
    record.images = finalize_images(raw_images, url);

    record.description = json_str(data, &["description"]).unwrap_or_default();
    record.variants = api_variants(data);

    if let Some(weight) = json_str(data, &["productWeight"]) {
        record.specifications.push(Specification {
            key: "Weight (g)".to_string(),
            value: weight,
        });
    }
    if let Some(material) = json_str(data, &["materialNameEn"]) {
        record.specifications.push(Specification {
            key: "Material".to_string(),
            value: material,
        });
    }

    record.review_count = json_u64(data, &["listedNum"]);

    Some(record)
}

/// CJ variants are flat SKU rows keyed by `variantKey` ("Color-Size" style);
/// collapse them into one dimension per key position is not derivable, so a
/// single "Variant" dimension lists the distinct row names.
fn api_variants(data: &serde_json::Value) -> Vec<ProductVariant> {
    let rows = json_get(data, &["variants"]).and_then(serde_json::Value::as_array);
    let Some(rows) = rows else {
        return Vec::new();
    };

    let mut options = Vec::new();
    let mut seen = std::collections::HashSet::new();
    for row in rows {
        let Some(name) =
            json_str(row, &["variantNameEn"]).or_else(|| json_str(row, &["variantKey"]))
        else {
            continue;
        };
        if seen.insert(name.clone()) {
            options.push(VariantOption {
                name,
                image: json_str(row, &["variantImage"]),
            });
        }
    }

    if options.is_empty() {
        Vec::new()
    } else {
        vec![ProductVariant {
            name: "Variant".to_string(),
            options,
        }]
    }
}

async fn extract_from_page(
    client: &reqwest::Client,
    config: &ScrapeConfig,
    url: &str,
) -> Result<ProductRecord, ScrapeError> {
    let html = fetch_html(
        client,
        url,
        config.page_timeout_secs,
        &config.user_agent,
        config.fetch_attempts,
    )
    .await?;

    let mut record = new_candidate(Platform::Cj, url, config);
    let blob = extract_embedded_json(&html, &EMBED_PATTERNS);
    let ld = extract_json_ld(&html, "Product");

    record.title = blob
        .as_ref()
        .and_then(|b| {
            json_str(b, &["productNameEn"]).or_else(|| json_str(b, &["product", "productNameEn"]))
        })
        .or_else(|| ld.as_ref().and_then(|p| json_str(p, &["name"])))
        .or_else(|| tag_text(&html, "h1"))
        .or_else(|| meta_content(&html, "og:title"))
        .or_else(|| title_tag(&html))
        .unwrap_or_default();

    record.price = blob
        .as_ref()
        .and_then(|b| json_str(b, &["sellPrice"]).and_then(|s| parse_price_opt(&s)))
        .or_else(|| {
            ld.as_ref().and_then(|p| {
                json_f64(p, &["offers", "price"]).or_else(|| json_f64(p, &["offers", "lowPrice"]))
            })
        })
        .unwrap_or(0.0);

    if let Some(code) = ld
        .as_ref()
        .and_then(|p| json_str(p, &["offers", "priceCurrency"]))
    {
        record.currency = code;
    }

    let mut raw_images = blob
        .as_ref()
        .map(|b| json_str_array(b, &["productImageSet"]))
        .unwrap_or_default();
    if let Some(og) = meta_content(&html, "og:image") {
        raw_images.push(og);
    }
    record.images = finalize_images(raw_images, url);

    record.description = meta_content(&html, "og:description").unwrap_or_default();

    Ok(record)
}
