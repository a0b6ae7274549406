//! Amazon product-page extractor.
//!
//! Amazon pages carry no single authoritative JSON payload; fields come from
//! well-known element ids and class conventions (`#productTitle`,
//! `.a-offscreen`, `#feature-bullets`), plus the image-gallery JSON that the
//! detail page inlines for its carousel.

use regex::Regex;
use storesmith_core::{Platform, ProductRecord, ProductVariant, ScrapeConfig, Specification, VariantOption};

use super::new_candidate;
use crate::embed::extract_balanced_object;
use crate::error::ScrapeError;
use crate::fetch::fetch_html;
use crate::html::{all_captures, clean_fragment, first_capture, list_items, meta_content, tag_text, title_tag};
use crate::images::finalize_images;
use crate::price::{parse_price, parse_price_opt};

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

    let mut record = new_candidate(Platform::Amazon, url, config);

    record.title = first_capture(&html, r#"(?is)id="productTitle"[^>]*>(.*?)</"#)
        .or_else(|| tag_text(&html, "h1"))
        .or_else(|| title_tag(&html))
        .unwrap_or_default();

    record.price = first_capture(&html, r#"(?is)class="[^"]*a-offscreen[^"]*"[^>]*>\s*([^<]+?)\s*<"#)
        .or_else(|| first_capture(&html, r#"(?is)id="priceblock_ourprice"[^>]*>\s*([^<]+?)\s*<"#))
        .map(|s| parse_price(&s))
        .unwrap_or(0.0);

    record.original_price = first_capture(
        &html,
        r#"(?is)class="[^"]*a-text-price[^"]*"[^>]*>\s*<span[^>]*class="[^"]*a-offscreen[^"]*"[^>]*>\s*([^<]+?)\s*<"#,
    )
    .and_then(|s| parse_price_opt(&s))
    .filter(|original| *original > record.price && record.price > 0.0);

    record.images = collect_images(&html, url);
    record.bullets = feature_bullets(&html);
    record.specifications = detail_table(&html);
    record.variants = variation_dimensions(&html);

    record.rating = first_capture(&html, r#"(?is)class="[^"]*a-icon-alt[^"]*"[^>]*>\s*([\d.]+)\s+out of"#)
        .and_then(|s| s.parse::<f64>().ok());
    record.review_count =
        first_capture(&html, r#"(?is)id="acrCustomerReviewText"[^>]*>\s*([\d,]+)"#)
            .and_then(|s| s.replace(',', "").parse::<u64>().ok());

    record.description = first_capture(&html, r#"(?is)id="productDescription".*?<p[^>]*>(.*?)</p>"#)
        .or_else(|| meta_content(&html, "description"))
        .unwrap_or_default();

    Ok(record)
}

/// Gallery order: hiRes entries from the inlined carousel JSON, then the
/// `data-old-hires` landing image, then `og:image`.
fn collect_images(html: &str, url: &str) -> Vec<String> {
    let mut raw = all_captures(html, r#""hiRes"\s*:\s*"([^"]+)""#);
    raw.extend(all_captures(
        html,
        r#"(?is)data-old-hires\s*=\s*(?:"([^"]+)"|'([^']+)')"#,
    ));
    if let Some(og) = meta_content(html, "og:image") {
        raw.push(og);
    }
    finalize_images(raw, url)
}

fn feature_bullets(html: &str) -> Vec<String> {
    let Some(region) = first_bullet_region(html) else {
        return Vec::new();
    };
    list_items(region)
        .into_iter()
        // Boilerplate item Amazon prepends to most bullet lists.
        .filter(|item| !item.starts_with("Make sure this fits"))
        .collect()
}

fn first_bullet_region(html: &str) -> Option<&str> {
    let re = Regex::new(r#"(?is)id="feature-bullets".*?</ul>"#).expect("valid regex");
    re.find(html).map(|m| m.as_str())
}

/// `#productDetails` / `prodDetTable` rows: `<th>key</th><td>value</td>`.
fn detail_table(html: &str) -> Vec<Specification> {
    let row_re =
        Regex::new(r"(?is)<th[^>]*>(.*?)</th>\s*<td[^>]*>(.*?)</td>").expect("valid regex");
    row_re
        .captures_iter(html)
        .filter_map(|cap| {
            let key = clean_fragment(&cap[1]);
            let value = clean_fragment(&cap[2]);
            if key.is_empty() || value.is_empty() {
                None
            } else {
                Some(Specification { key, value })
            }
        })
        .collect()
}

/// The twister widget inlines `"variationValues": {"color_name": ["Black",
/// "White"], …}`; dimension keys are snake_case display names.
fn variation_dimensions(html: &str) -> Vec<ProductVariant> {
    let marker_re = Regex::new(r#""variationValues"\s*:\s*"#).expect("valid regex");
    let Some(m) = marker_re.find(html) else {
        return Vec::new();
    };
    let Some(object_str) = extract_balanced_object(html[m.end()..].trim_start()) else {
        return Vec::new();
    };
    let Ok(serde_json::Value::Object(map)) = serde_json::from_str(object_str) else {
        return Vec::new();
    };

    map.into_iter()
        .filter_map(|(key, values)| {
            let options: Vec<VariantOption> = values
                .as_array()?
                .iter()
                .filter_map(|v| v.as_str())
                .map(|name| VariantOption {
                    name: name.to_string(),
                    image: None,
                })
                .collect();
            if options.is_empty() {
                return None;
            }
            Some(ProductVariant {
                name: prettify_dimension(&key),
                options,
            })
        })
        .collect()
}

/// `color_name` → `Color Name`.
fn prettify_dimension(key: &str) -> String {
    key.split('_')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
