//! Generic fallback extractor for hosts without a specialized module.
//!
//! Universal heuristics only, in decreasing order of reliability: JSON-LD
//! `Product`, microdata itemprops, OpenGraph metas, price-looking class
//! conventions, then bare heading/title text.

use storesmith_core::{Platform, ProductRecord, ScrapeConfig, Specification};

use super::{json_f64, json_str, json_u64, new_candidate};
use crate::embed::extract_json_ld;
use crate::error::ScrapeError;
use crate::fetch::fetch_html;
use crate::html::{all_captures, first_capture, itemprop_content, meta_content, tag_text, title_tag};
use crate::images::finalize_images;
use crate::price::parse_price_opt;

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

    let mut record = new_candidate(Platform::GenericHttp, url, config);
    let ld = extract_json_ld(&html, "Product");

    record.title = ld
        .as_ref()
        .and_then(|p| json_str(p, &["name"]))
        .or_else(|| itemprop_content(&html, "name"))
        .or_else(|| meta_content(&html, "og:title"))
        .or_else(|| tag_text(&html, "h1"))
        .or_else(|| title_tag(&html))
        .unwrap_or_default();

    record.price = ld
        .as_ref()
        .and_then(offer_price)
        .or_else(|| itemprop_content(&html, "price").and_then(|s| parse_price_opt(&s)))
        .or_else(|| {
            meta_content(&html, "product:price:amount")
                .or_else(|| meta_content(&html, "og:price:amount"))
                .and_then(|s| parse_price_opt(&s))
        })
        .or_else(|| price_class_heuristic(&html))
        .unwrap_or(0.0);

    if let Some(code) = ld
        .as_ref()
        .and_then(|p| json_str(p, &["offers", "priceCurrency"]))
        .or_else(|| itemprop_content(&html, "priceCurrency"))
        .or_else(|| meta_content(&html, "product:price:currency"))
        .or_else(|| meta_content(&html, "og:price:currency"))
    {
        record.currency = code;
    }

    record.images = collect_images(ld.as_ref(), &html, url);

    record.description = ld
        .as_ref()
        .and_then(|p| json_str(p, &["description"]))
        .or_else(|| meta_content(&html, "og:description"))
        .or_else(|| meta_content(&html, "description"))
        .or_else(|| itemprop_content(&html, "description"))
        .unwrap_or_default();

    record.rating = ld
        .as_ref()
        .and_then(|p| json_f64(p, &["aggregateRating", "ratingValue"]));
    record.review_count = ld
        .as_ref()
        .and_then(|p| json_u64(p, &["aggregateRating", "reviewCount"]));

    record.specifications = additional_properties(ld.as_ref());

    if let Some(brand) = ld.as_ref().and_then(|p| {
        json_str(p, &["brand", "name"]).or_else(|| json_str(p, &["brand"]))
    }) {
        record.specifications.insert(
            0,
            Specification {
                key: "Brand".to_string(),
                value: brand,
            },
        );
    }

    Ok(record)
}

/// `offers` may be an object or an array of objects; `price`/`lowPrice` may
/// be numbers or numeric strings.
fn offer_price(product: &serde_json::Value) -> Option<f64> {
    let offers = product.get("offers")?;
    let offer = if let Some(arr) = offers.as_array() {
        arr.first()?
    } else {
        offers
    };
    json_f64(offer, &["price"]).or_else(|| json_f64(offer, &["lowPrice"]))
}

/// Last-resort price sniff: the first element whose class mentions "price"
/// and whose text parses as a positive number.
fn price_class_heuristic(html: &str) -> Option<f64> {
    first_capture(
        html,
        r#"(?is)class="[^"]*price[^"]*"[^>]*>([^<]{1,40})<"#,
    )
    .and_then(|s| parse_price_opt(&s))
    .filter(|p| *p > 0.0)
}

fn collect_images(ld: Option<&serde_json::Value>, html: &str, url: &str) -> Vec<String> {
    let mut raw: Vec<String> = Vec::new();

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
    if let Some(itemprop) = all_captures(
        html,
        r#"(?is)<img[^>]+itemprop\s*=\s*["']image["'][^>]+src\s*=\s*(?:"([^"]+)"|'([^']+)')"#,
    )
    .into_iter()
    .next()
    {
        raw.push(itemprop);
    }

    // Plain <img> harvest as the last source; finalize_images dedupes and caps.
    raw.extend(all_captures(
        html,
        r#"(?is)<img[^>]+src\s*=\s*(?:"([^"]+)"|'([^']+)')"#,
    ));

    finalize_images(raw, url)
}

/// schema.org `additionalProperty` → specification rows.
fn additional_properties(ld: Option<&serde_json::Value>) -> Vec<Specification> {
    let props = ld
        .and_then(|p| p.get("additionalProperty"))
        .and_then(serde_json::Value::as_array);
    let Some(props) = props else {
        return Vec::new();
    };
    props
        .iter()
        .filter_map(|prop| {
            Some(Specification {
                key: json_str(prop, &["name"])?,
                value: json_str(prop, &["value"])?,
            })
        })
        .collect()
}
