//! AliExpress product-page extractor.
//!
//! AliExpress embeds the full detail payload in a script-tag assignment, but
//! the variable name has shifted across page generations, so the patterns
//! are tried in order of how commonly each generation is still served.

use storesmith_core::{Platform, ProductRecord, ProductVariant, ScrapeConfig, Specification, VariantOption};

use super::{json_f64, json_get, json_str, json_str_array, json_u64, new_candidate};
use crate::embed::extract_embedded_json;
use crate::error::ScrapeError;
use crate::fetch::fetch_html;
use crate::html::{first_capture, itemprop_content, meta_content, tag_text, title_tag};
use crate::images::{absolutize, finalize_images, strip_size_variant};
use crate::price::{parse_price, parse_price_opt};

const EMBED_PATTERNS: [&str; 3] = [
    r"window\.runParams\s*=\s*",
    r"window\.__INIT_DATA__\s*=\s*",
    r"__AER_DATA__\s*=\s*",
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

    let mut record = new_candidate(Platform::Aliexpress, url, config);
    let blob = extract_embedded_json(&html, &EMBED_PATTERNS).map(unwrap_run_params);

    if let Some(data) = &blob {
        populate_from_blob(&mut record, data, url);
    }

    // HTML fallbacks, per field, only where the blob yielded nothing.
    if record.title.is_empty() {
        record.title = tag_text(&html, "h1")
            .or_else(|| meta_content(&html, "og:title"))
            .or_else(|| title_tag(&html))
            .unwrap_or_default();
    }
    if record.price == 0.0 {
        record.price = first_capture(&html, r"(?i)US\s*\$\s*([\d][\d.,]*)")
            .and_then(|s| parse_price_opt(&s))
            .or_else(|| itemprop_content(&html, "price").and_then(|s| parse_price_opt(&s)))
            .unwrap_or(0.0);
    }
    if record.images.is_empty() {
        let mut raw = Vec::new();
        if let Some(og) = meta_content(&html, "og:image") {
            raw.push(og);
        }
        record.images = finalize_images(raw, url);
    }
    if record.description.is_empty() {
        record.description = meta_content(&html, "og:description").unwrap_or_default();
    }

    // Description lives behind a separate lightweight endpoint; best-effort.
    if record.description.is_empty() {
        if let Some(data) = &blob {
            fetch_description(client, config, data, &mut record).await;
        }
    }

    Ok(record)
}

/// `window.runParams` wraps the payload under a `data` key; the other
/// generations assign the payload directly.
fn unwrap_run_params(value: serde_json::Value) -> serde_json::Value {
    match value.get("data") {
        Some(data) if data.is_object() => data.clone(),
        _ => value,
    }
}

fn populate_from_blob(record: &mut ProductRecord, data: &serde_json::Value, url: &str) {
    record.title = json_str(data, &["titleModule", "subject"])
        .or_else(|| json_str(data, &["productInfoComponent", "subject"]))
        .or_else(|| json_str(data, &["subject"]))
        .unwrap_or_default();

    let activity_price = json_str(data, &["priceModule", "formatedActivityPrice"])
        .or_else(|| json_f64(data, &["priceModule", "minActivityAmount", "value"]).map(|v| v.to_string()));
    let list_price = json_str(data, &["priceModule", "formatedPrice"])
        .or_else(|| json_f64(data, &["priceModule", "minAmount", "value"]).map(|v| v.to_string()))
        .or_else(|| json_str(data, &["priceComponent", "discountPrice", "minActivityAmount", "formatedAmount"]));

    match (activity_price, list_price) {
        (Some(activity), Some(list)) => {
            // A discounted page shows both; the list price frames the deal.
            record.price = parse_price(&activity);
            let original = parse_price(&list);
            if original > record.price {
                record.original_price = Some(original);
            }
        }
        (Some(single), None) | (None, Some(single)) => {
            record.price = parse_price(&single);
        }
        (None, None) => {}
    }

    if let Some(code) = json_str(data, &["priceModule", "currencyCode"])
        .or_else(|| json_str(data, &["currencyCode"]))
    {
        record.currency = code;
    }

    let image_paths = {
        let mut paths = json_str_array(data, &["imageModule", "imagePathList"]);
        if paths.is_empty() {
            paths = json_str_array(data, &["imageComponent", "imagePathList"]);
        }
        paths
    };
    record.images = finalize_images(image_paths, url);

    record.variants = sku_properties(data, url);
    record.specifications = spec_props(data);

    record.rating = json_f64(data, &["titleModule", "feedbackRating", "averageStar"]);
    record.review_count = json_u64(data, &["titleModule", "feedbackRating", "totalValidNum"])
        .or_else(|| json_u64(data, &["titleModule", "tradeCount"]));
}

/// `skuModule.productSKUPropertyList` → variant dimensions with optional
/// swatch images.
fn sku_properties(data: &serde_json::Value, url: &str) -> Vec<ProductVariant> {
    let list = json_get(data, &["skuModule", "productSKUPropertyList"])
        .or_else(|| json_get(data, &["skuComponent", "productSKUPropertyList"]))
        .and_then(serde_json::Value::as_array);

    let Some(list) = list else {
        return Vec::new();
    };

    list.iter()
        .filter_map(|prop| {
            let name = json_str(prop, &["skuPropertyName"])?;
            let options = json_get(prop, &["skuPropertyValues"])
                .and_then(serde_json::Value::as_array)
                .map(|values| {
                    values
                        .iter()
                        .filter_map(|v| {
                            let name = json_str(v, &["propertyValueDisplayName"])
                                .or_else(|| json_str(v, &["propertyValueName"]))?;
                            let image = json_str(v, &["skuPropertyImagePath"])
                                .and_then(|raw| absolutize(&raw, url))
                                .map(|abs| strip_size_variant(&abs));
                            Some(VariantOption { name, image })
                        })
                        .collect::<Vec<_>>()
                })
                .unwrap_or_default();
            if options.is_empty() {
                None
            } else {
                Some(ProductVariant { name, options })
            }
        })
        .collect()
}

fn spec_props(data: &serde_json::Value) -> Vec<Specification> {
    let props = json_get(data, &["specsModule", "props"])
        .or_else(|| json_get(data, &["productPropComponent", "props"]))
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

/// The long-form description is served from a separate URL referenced in the
/// blob. Failure here is never fatal — the description simply stays empty.
async fn fetch_description(
    client: &reqwest::Client,
    config: &ScrapeConfig,
    data: &serde_json::Value,
    record: &mut ProductRecord,
) {
    let Some(desc_url) = json_str(data, &["descriptionModule", "descriptionUrl"])
        .or_else(|| json_str(data, &["productDescComponent", "descriptionUrl"]))
    else {
        return;
    };
    match fetch_html(client, &desc_url, config.api_timeout_secs, &config.user_agent, 1).await {
        Ok(body) => record.description = body,
        Err(err) => {
            tracing::debug!(desc_url, error = %err, "description sub-fetch failed");
        }
    }
}
