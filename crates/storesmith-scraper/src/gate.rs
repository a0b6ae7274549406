//! Validity gate: the pipeline's only state machine.
//!
//! `Pending → Accepted` or `Pending → Rejected → Substituted`, both terminal.
//! No retries here — retries belong to the fetch layer inside an extractor.
//! Rejection deliberately conflates "extraction failed" with "data looks
//! insufficient" (zero price, junk title): both produce the identical demo
//! record, so downstream copy generation and store assembly always receive a
//! well-formed, non-empty input.

use chrono::{TimeZone, Utc};
use storesmith_core::{Platform, ProductRecord, ProductVariant, Specification, VariantOption};

use crate::error::ScrapeError;

/// Minimum plausible title length in characters.
const MIN_TITLE_CHARS: usize = 5;

/// Gate an extraction outcome.
///
/// On acceptance the candidate is returned unchanged except for the
/// `scraped_at` stamp and `is_demo = false`. On any rejection — extractor
/// error or insufficient data — the fixed demo record is substituted. This
/// function never fails.
#[must_use]
pub fn accept(
    outcome: Result<ProductRecord, ScrapeError>,
    platform: Platform,
    source_url: &str,
) -> ProductRecord {
    match outcome {
        Err(err) => {
            tracing::warn!(source_url, platform = %platform, error = %err,
                "extraction failed; substituting demo record");
            demo_record(platform, source_url)
        }
        Ok(mut candidate) => {
            if let Some(reason) = rejection_reason(&candidate) {
                tracing::warn!(source_url, platform = %platform, reason,
                    "candidate rejected; substituting demo record");
                return demo_record(platform, source_url);
            }
            candidate.scraped_at = Utc::now();
            candidate.is_demo = false;
            candidate
        }
    }
}

/// Why a candidate fails the minimal acceptance criteria, if it does.
fn rejection_reason(candidate: &ProductRecord) -> Option<&'static str> {
    let title = candidate.title.trim();
    if title.chars().count() < MIN_TITLE_CHARS {
        return Some("title missing or shorter than 5 characters");
    }
    if title.contains("404") {
        return Some("title looks like an error page");
    }
    if candidate.price == 0.0 {
        return Some("no price signal located");
    }
    None
}

/// The fixed synthetic fallback product.
///
/// Deterministic by construction: every field except `platform` and
/// `source_url` (which identify the request) is a constant, including the
/// timestamp — two substitutions for the same URL are byte-identical when
/// serialized. Internally valid, so gating it again never rejects it.
#[must_use]
pub fn demo_record(platform: Platform, source_url: &str) -> ProductRecord {
    ProductRecord {
        platform,
        source_url: source_url.to_string(),
        title: "Premium Wireless Bluetooth Earbuds Pro".to_string(),
        price: 39.99,
        original_price: Some(79.99),
        currency: "USD".to_string(),
        images: vec![
            "https://images.unsplash.com/photo-1590658268037-6bf12165a8df?w=800".to_string(),
            "https://images.unsplash.com/photo-1572569511254-d8f925fe2cbb?w=800".to_string(),
            "https://images.unsplash.com/photo-1583394838336-acd977736f90?w=800".to_string(),
            "https://images.unsplash.com/photo-1606220945770-b5b6c2c55bf1?w=800".to_string(),
        ],
        description: "<p>Experience crystal-clear audio with the latest Bluetooth 5.3 \
                      technology. Active noise cancellation, 32-hour total battery life, \
                      and an ergonomic fit make these earbuds the perfect companion for \
                      work, workouts, and travel.</p>"
            .to_string(),
        bullets: vec![
            "Active noise cancellation blocks out distractions".to_string(),
            "32-hour battery life with the charging case".to_string(),
            "Bluetooth 5.3 for a rock-solid connection".to_string(),
            "IPX5 water resistance for workouts and rain".to_string(),
            "Touch controls with voice-assistant support".to_string(),
        ],
        variants: vec![ProductVariant {
            name: "Color".to_string(),
            options: vec![
                VariantOption {
                    name: "Midnight Black".to_string(),
                    image: None,
                },
                VariantOption {
                    name: "Arctic White".to_string(),
                    image: None,
                },
                VariantOption {
                    name: "Navy Blue".to_string(),
                    image: None,
                },
            ],
        }],
        specifications: vec![
            Specification {
                key: "Bluetooth version".to_string(),
                value: "5.3".to_string(),
            },
            Specification {
                key: "Battery life".to_string(),
                value: "8h (32h with case)".to_string(),
            },
            Specification {
                key: "Charging port".to_string(),
                value: "USB-C".to_string(),
            },
            Specification {
                key: "Water resistance".to_string(),
                value: "IPX5".to_string(),
            },
            Specification {
                key: "Driver size".to_string(),
                value: "10mm".to_string(),
            },
        ],
        rating: Some(4.8),
        review_count: Some(2347),
        // Fixed so repeated substitutions serialize byte-identically.
        scraped_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).single().unwrap_or_default(),
        is_demo: true,
    }
}

#[cfg(test)]
#[path = "gate_test.rs"]
mod tests;
