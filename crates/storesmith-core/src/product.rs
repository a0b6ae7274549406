//! The canonical product record produced by the extraction pipeline.
//!
//! Every extractor emits this shape; the validity gate either passes it
//! through or replaces it wholesale with the demo record. Serialization is
//! camelCase because the downstream consumers (copy generation, store
//! assembly) are JavaScript-side services.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The e-commerce platform a product URL belongs to.
///
/// Assigned exactly once by detection, before extraction starts, and never
/// re-derived afterward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Platform {
    #[serde(rename = "aliexpress")]
    Aliexpress,
    #[serde(rename = "amazon")]
    Amazon,
    #[serde(rename = "alibaba")]
    Alibaba,
    #[serde(rename = "cj")]
    Cj,
    /// Any host without a specialized extractor.
    #[serde(rename = "genericHttp")]
    GenericHttp,
}

impl Platform {
    /// Wire/display name, matching the serde representation.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Platform::Aliexpress => "aliexpress",
            Platform::Amazon => "amazon",
            Platform::Alibaba => "alibaba",
            Platform::Cj => "cj",
            Platform::GenericHttp => "genericHttp",
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A selectable product dimension (e.g. `"Color"`) and its options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductVariant {
    pub name: String,
    pub options: Vec<VariantOption>,
}

/// One option within a [`ProductVariant`], e.g. `"Midnight Black"` with an
/// optional swatch image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantOption {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// An ordered `key → value` specification row (e.g. `"Material" → "Silicone"`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Specification {
    pub key: String,
    pub value: String,
}

/// A normalized product scraped from a single product-page URL.
///
/// One record is created per scrape request, is immutable after the validity
/// gate accepts or replaces it, and is never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRecord {
    /// Platform the URL was classified as. Set once, never mutated.
    pub platform: Platform,
    /// The input URL, preserved verbatim.
    pub source_url: String,
    /// Display title. Non-empty on accepted records; the gate's primary
    /// identity signal.
    pub title: String,
    /// Currency-agnostic numeric price. `0.0` is the single authoritative
    /// "price not found" sentinel — no other sentinel is used.
    pub price: f64,
    /// Pre-discount comparison price, ≥ `price` when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_price: Option<f64>,
    /// ISO-like currency code; defaulted when extraction cannot determine it.
    pub currency: String,
    /// Absolute image URLs in page presentation order, deduplicated, at most
    /// 15 entries, never data URIs.
    pub images: Vec<String>,
    /// Raw HTML or plain-text description. May be empty.
    pub description: String,
    /// Short benefit/feature strings. May be empty.
    pub bullets: Vec<String>,
    /// Selectable product dimensions. May be empty.
    pub variants: Vec<ProductVariant>,
    /// Ordered key/value specification rows. May be empty.
    pub specifications: Vec<Specification>,
    /// Average review score, when the page exposes one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    /// Review/order count, when the page exposes one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review_count: Option<u64>,
    /// When extraction produced this record.
    pub scraped_at: DateTime<Utc>,
    /// `true` only for the synthetic fallback record substituted by the gate.
    pub is_demo: bool,
}

impl ProductRecord {
    /// Returns `true` when a real (non-sentinel) price was located.
    #[must_use]
    pub fn has_price(&self) -> bool {
        self.price > 0.0
    }

    /// Discount fraction in `[0, 1)` when an original price above the
    /// current price is known.
    #[must_use]
    pub fn discount_fraction(&self) -> Option<f64> {
        let original = self.original_price?;
        if original > self.price && original > 0.0 {
            Some(1.0 - self.price / original)
        } else {
            None
        }
    }

    /// First image URL, if any — the hero image for downstream listing
    /// assembly.
    #[must_use]
    pub fn hero_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }
}
