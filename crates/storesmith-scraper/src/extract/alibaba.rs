//! Alibaba product-page extractor.
//!
//! B2B listing pages: prices are usually ladder ranges (take the low bound),
//! and a minimum order quantity is part of the offer, surfaced here as a
//! specification row.

use storesmith_core::{Platform, ProductRecord, ScrapeConfig, Specification};

use super::{json_f64, json_get, json_str, json_u64, new_candidate};
use crate::embed::{extract_embedded_json, extract_json_ld};
use crate::error::ScrapeError;
use crate::fetch::fetch_html;
use crate::html::{first_capture, meta_content, tag_text, title_tag};
use crate::images::finalize_images;
use crate::price::parse_price_opt;

const EMBED_PATTERNS: [&str; 3] = [
    r"window\.detailData\s*=\s*",
    r"window\.__page__data\s*=\s*",
    r"window\.globalData\s*=\s*",
];

pub(super) async fn extract(
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

    let mut record = new_candidate(Platform::Alibaba, url, config);
    let blob = extract_embedded_json(&html, &EMBED_PATTERNS);
    let ld = extract_json_ld(&html, "Product");

    record.title = blob
        .as_ref()
        .and_then(|b| {
            json_str(b, &["globalData", "product", "subject"])
                .or_else(|| json_str(b, &["product", "subject"]))
                .or_else(|| json_str(b, &["subject"]))
        })
        .or_else(|| ld.as_ref().and_then(|p| json_str(p, &["name"])))
        .or_else(|| tag_text(&html, "h1"))
        .or_else(|| meta_content(&html, "og:title"))
        .or_else(|| title_tag(&html))
        .unwrap_or_default();

    record.price = ld
        .as_ref()
        .and_then(|p| {
            json_f64(p, &["offers", "price"]).or_else(|| json_f64(p, &["offers", "lowPrice"]))
        })
        .or_else(|| {
            blob.as_ref().and_then(|b| {
                json_get(b, &["globalData", "product", "price", "productLadderPrices"])
                    .and_then(serde_json::Value::as_array)
                    .and_then(|ladder| ladder.first())
                    .and_then(|rung| json_f64(rung, &["price"]))
                    .or_else(|| json_str(b, &["product", "price"]).and_then(|s| parse_price_opt(&s)))
            })
        })
        .or_else(|| {
            // Ladder ranges render as "US$1.20 - US$2.50"; take the low bound.
            first_capture(&html, r"(?i)US\s*\$\s*([\d][\d.,]*)").and_then(|s| parse_price_opt(&s))
        })
        .unwrap_or(0.0);

    if let Some(code) = ld
        .as_ref()
        .and_then(|p| json_str(p, &["offers", "priceCurrency"]))
    {
        record.currency = code;
    }

    record.images = collect_images(blob.as_ref(), ld.as_ref(), &html, url);
    record.specifications = basic_properties(blob.as_ref());

    if let Some(moq) = blob.as_ref().and_then(|b| {
        json_str(b, &["globalData", "product", "moq"]).or_else(|| json_str(b, &["product", "moq"]))
    }) {
        record.specifications.push(Specification {
            key: "Minimum order quantity".to_string(),
            value: moq,
        });
    }

    record.rating = ld
        .as_ref()
        .and_then(|p| json_f64(p, &["aggregateRating", "ratingValue"]));
    record.review_count = ld
        .as_ref()
        .and_then(|p| json_u64(p, &["aggregateRating", "reviewCount"]));

    record.description = ld
        .as_ref()
        .and_then(|p| json_str(p, &["description"]))
        .or_else(|| meta_content(&html, "og:description"))
        .unwrap_or_default();

    Ok(record)
}

fn collect_images(
    blob: Option<&serde_json::Value>,
    ld: Option<&serde_json::Value>,
    html: &str,
    url: &str,
) -> Vec<String> {
    let mut raw: Vec<String> = Vec::new();

    if let Some(items) = blob
        .and_then(|b| {
            json_get(b, &["globalData", "product", "mediaItems"])
                .or_else(|| json_get(b, &["product", "mediaItems"]))
        })
        .and_then(serde_json::Value::as_array)
    {
        for item in items {
            if let Some(src) = json_str(item, &["imageUrl", "big"])
                .or_else(|| json_str(item, &["imageUrl", "normal"]))
            {
                raw.push(src);
            }
        }
    }

    if let Some(ld) = ld {
        match ld.get("image") {
            Some(serde_json::Value::String(s)) => raw.push(s.clone()),
            Some(serde_json::Value::Array(arr)) => {
                raw.extend(arr.iter().filter_map(|v| v.as_str()).map(str::to_string));
            }
            _ => {}
        }
    }

    if let Some(og) = meta_content(html, "og:image") {
        raw.push(og);
    }

    finalize_images(raw, url)
}

fn basic_properties(blob: Option<&serde_json::Value>) -> Vec<Specification> {
    let props = blob
        .and_then(|b| {
            json_get(b, &["globalData", "product", "productBasicProperties"])
                .or_else(|| json_get(b, &["product", "productBasicProperties"]))
        })
        .and_then(serde_json::Value::as_array);

    let Some(props) = props else {
        return Vec::new();
    };

    props
        .iter()
        .filter_map(|prop| {
            Some(Specification {
                key: json_str(prop, &["attrName"])?,
                value: json_str(prop, &["attrValue"])?,
            })
        })
        .collect()
}
