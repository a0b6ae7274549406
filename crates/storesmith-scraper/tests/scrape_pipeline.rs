//! End-to-end pipeline tests against mocked product pages.
//!
//! Uses `wiremock` to stand up a local HTTP server per test so no real
//! network traffic is made. Platform-specific extractors are driven through
//! `extract_with` + `accept` (the mock host would otherwise detect as
//! generic); full `scrape()` is exercised via the generic scenarios.

use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use storesmith_core::{Platform, ScrapeConfig};
use storesmith_scraper::{accept, detect_platform, extract_with, scrape};

/// Config suitable for tests: short timeouts, single fetch attempt.
fn test_config() -> ScrapeConfig {
    ScrapeConfig {
        connect_timeout_secs: 5,
        page_timeout_secs: 5,
        api_timeout_secs: 5,
        user_agent: "storesmith-test/0.1".to_string(),
        fetch_attempts: 1,
        default_currency: "USD".to_string(),
    }
}

fn html_page(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.to_string(), "text/html")
}

// ---------------------------------------------------------------------------
// Scenario 1 — AliExpress page with no recognizable embedded JSON: the
// extractor must fall back to the <h1> and the "US $…" price string.
// ---------------------------------------------------------------------------

#[tokio::test]
async fn aliexpress_falls_back_to_heading_and_price_string() {
    let server = MockServer::start().await;
    let body = r#"<html><head><title>Item page</title></head><body>
        <h1>Wireless Charger</h1>
        <div class="price">US $12.99</div>
    </body></html>"#;

    Mock::given(method("GET"))
        .and(path("/item/1005001234567890.html"))
        .respond_with(html_page(body))
        .mount(&server)
        .await;

    let client = reqwest::Client::new();
    let url = format!("{}/item/1005001234567890.html", server.uri());
    let outcome = extract_with(Platform::Aliexpress, &client, &test_config(), &url).await;
    let record = accept(outcome, Platform::Aliexpress, &url);

    assert!(!record.is_demo, "expected acceptance, got demo substitution");
    assert_eq!(record.platform, Platform::Aliexpress);
    assert_eq!(record.title, "Wireless Charger");
    assert!((record.price - 12.99).abs() < f64::EPSILON);
    assert_eq!(record.source_url, url);
}

// ---------------------------------------------------------------------------
// Scenario 2 — 404 page: extraction fails, the gate substitutes the fixed
// demo record.
// ---------------------------------------------------------------------------

#[tokio::test]
async fn not_found_page_substitutes_demo_record() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/item/1005001234567890.html"))
        .respond_with(
            ResponseTemplate::new(404)
                .set_body_raw("<html><title>Page Not Found</title></html>".to_string(), "text/html"),
        )
        .mount(&server)
        .await;

    let client = reqwest::Client::new();
    let url = format!("{}/item/1005001234567890.html", server.uri());
    let outcome = extract_with(Platform::Aliexpress, &client, &test_config(), &url).await;
    let record = accept(outcome, Platform::Aliexpress, &url);

    assert!(record.is_demo);
    assert_eq!(record.title, "Premium Wireless Bluetooth Earbuds Pro");
}

// ---------------------------------------------------------------------------
// Scenario 3 — generic blog page with a heading but no price signal at all:
// detection yields genericHttp, extraction succeeds with price 0, the gate
// rejects and substitutes.
// ---------------------------------------------------------------------------

#[tokio::test]
async fn generic_page_without_price_substitutes_demo_record() {
    let server = MockServer::start().await;
    let body = "<html><body><h1>Artisan Mug</h1><p>A lovely mug.</p></body></html>";

    Mock::given(method("GET"))
        .and(path("/posts/artisan-mug"))
        .respond_with(html_page(body))
        .mount(&server)
        .await;

    let client = reqwest::Client::new();
    let url = format!("{}/posts/artisan-mug", server.uri());
    assert_eq!(detect_platform(&url), Platform::GenericHttp);

    let record = scrape(&client, &test_config(), &url).await;

    assert!(record.is_demo);
    assert_eq!(record.platform, Platform::GenericHttp);
}

// ---------------------------------------------------------------------------
// Scenario 4 — protocol-relative image URL is rewritten to absolute HTTPS.
// ---------------------------------------------------------------------------

#[tokio::test]
async fn protocol_relative_image_is_normalized_to_https() {
    let server = MockServer::start().await;
    let body = r#"<html><head>
        <meta property="og:title" content="Ceramic Espresso Cup Set">
        <meta property="og:image" content="//cdn.example.com/a.jpg">
        <meta property="product:price:amount" content="24.00">
    </head><body></body></html>"#;

    Mock::given(method("GET"))
        .and(path("/products/espresso-cups"))
        .respond_with(html_page(body))
        .mount(&server)
        .await;

    let client = reqwest::Client::new();
    let url = format!("{}/products/espresso-cups", server.uri());
    let record = scrape(&client, &test_config(), &url).await;

    assert!(!record.is_demo, "expected acceptance, got demo substitution");
    assert_eq!(record.images, vec!["https://cdn.example.com/a.jpg"]);
}

// ---------------------------------------------------------------------------
// AliExpress embedded runParams blob — the structured-data happy path.
// ---------------------------------------------------------------------------

#[tokio::test]
async fn aliexpress_embedded_blob_populates_full_record() {
    let server = MockServer::start().await;
    let blob = json!({
        "data": {
            "titleModule": {
                "subject": "Magnetic Phone Mount",
                "feedbackRating": {"averageStar": "4.7", "totalValidNum": 1532}
            },
            "priceModule": {
                "formatedActivityPrice": "US $8.49",
                "formatedPrice": "US $16.98",
                "currencyCode": "USD"
            },
            "imageModule": {
                "imagePathList": [
                    "//ae01.alicdn.com/kf/a.jpg_220x220.jpg",
                    "//ae01.alicdn.com/kf/a.jpg",
                    "//ae01.alicdn.com/kf/b.jpg"
                ]
            },
            "skuModule": {
                "productSKUPropertyList": [{
                    "skuPropertyName": "Color",
                    "skuPropertyValues": [
                        {"propertyValueDisplayName": "Black",
                         "skuPropertyImagePath": "//ae01.alicdn.com/kf/black.jpg"},
                        {"propertyValueDisplayName": "Silver"}
                    ]
                }]
            },
            "specsModule": {
                "props": [
                    {"attrName": "Material", "attrValue": "Aluminum"},
                    {"attrName": "Compatibility", "attrValue": "Universal"}
                ]
            }
        }
    });
    let body = format!(
        "<html><body><script>window.runParams = {blob};</script></body></html>"
    );

    Mock::given(method("GET"))
        .and(path("/item/42.html"))
        .respond_with(html_page(&body))
        .mount(&server)
        .await;

    let client = reqwest::Client::new();
    let url = format!("{}/item/42.html", server.uri());
    let outcome = extract_with(Platform::Aliexpress, &client, &test_config(), &url).await;
    let record = accept(outcome, Platform::Aliexpress, &url);

    assert!(!record.is_demo, "expected acceptance, got demo substitution");
    assert_eq!(record.title, "Magnetic Phone Mount");
    assert!((record.price - 8.49).abs() < f64::EPSILON);
    assert_eq!(record.original_price, Some(16.98));
    assert_eq!(record.currency, "USD");
    // Thumbnail variant deduped against its full-resolution twin.
    assert_eq!(
        record.images,
        vec![
            "https://ae01.alicdn.com/kf/a.jpg",
            "https://ae01.alicdn.com/kf/b.jpg"
        ]
    );
    assert_eq!(record.variants.len(), 1);
    assert_eq!(record.variants[0].name, "Color");
    assert_eq!(record.variants[0].options[0].name, "Black");
    assert_eq!(
        record.variants[0].options[0].image.as_deref(),
        Some("https://ae01.alicdn.com/kf/black.jpg")
    );
    assert!(record.variants[0].options[1].image.is_none());
    assert_eq!(record.specifications.len(), 2);
    assert_eq!(record.specifications[0].key, "Material");
    assert_eq!(record.rating, Some(4.7));
    assert_eq!(record.review_count, Some(1532));
}

// ---------------------------------------------------------------------------
// Amazon markup conventions.
// ---------------------------------------------------------------------------

#[tokio::test]
async fn amazon_markup_conventions_are_extracted() {
    let server = MockServer::start().await;
    let body = r#"<html><body>
        <span id="productTitle"> Ergonomic Vertical Mouse </span>
        <span class="a-price"><span class="a-offscreen">$25.99</span></span>
        <span class="a-price a-text-price"><span class="a-offscreen">$39.99</span></span>
        <div id="feature-bullets"><ul>
            <li><span>Make sure this fits by entering your model number.</span></li>
            <li><span>Reduces wrist strain</span></li>
            <li><span>Six programmable buttons</span></li>
        </ul></div>
        <i class="a-icon-alt">4.5 out of 5 stars</i>
        <span id="acrCustomerReviewText">12,847 ratings</span>
        <img data-old-hires="https://m.media-amazon.com/images/I/abc._AC_SL1500_.jpg" src="x">
        <table><tr><th>Brand</th><td>Acme</td></tr></table>
    </body></html>"#;

    Mock::given(method("GET"))
        .and(path("/dp/B0ABCDEF"))
        .respond_with(html_page(body))
        .mount(&server)
        .await;

    let client = reqwest::Client::new();
    let url = format!("{}/dp/B0ABCDEF", server.uri());
    let outcome = extract_with(Platform::Amazon, &client, &test_config(), &url).await;
    let record = accept(outcome, Platform::Amazon, &url);

    assert!(!record.is_demo, "expected acceptance, got demo substitution");
    assert_eq!(record.title, "Ergonomic Vertical Mouse");
    assert!((record.price - 25.99).abs() < f64::EPSILON);
    assert_eq!(record.original_price, Some(39.99));
    assert_eq!(
        record.bullets,
        vec!["Reduces wrist strain", "Six programmable buttons"]
    );
    assert_eq!(record.rating, Some(4.5));
    assert_eq!(record.review_count, Some(12847));
    assert_eq!(
        record.images,
        vec!["https://m.media-amazon.com/images/I/abc.jpg"]
    );
    assert_eq!(record.specifications[0].key, "Brand");
}

// ---------------------------------------------------------------------------
// CJdropshipping — secondary API first, markup fallback second.
// ---------------------------------------------------------------------------

#[tokio::test]
async fn cj_prefers_the_lightweight_product_api() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/product-api/product/query"))
        .and(query_param("id", "99"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&json!({
            "data": {
                "productNameEn": "Collapsible Water Bottle",
                "sellPrice": "6.80--9.20",
                "productImageSet": ["https://cc-west-usa.oss.example.com/bottle1.jpg"],
                "productWeight": "180",
                "variants": [
                    {"variantNameEn": "500ml Green", "variantImage": "https://cc-west-usa.oss.example.com/green.jpg"},
                    {"variantNameEn": "500ml Blue"}
                ]
            }
        })))
        .mount(&server)
        .await;

    let client = reqwest::Client::new();
    let url = format!("{}/product/collapsible-bottle-p-99.html", server.uri());
    let outcome = extract_with(Platform::Cj, &client, &test_config(), &url).await;
    let record = accept(outcome, Platform::Cj, &url);

    assert!(!record.is_demo, "expected acceptance, got demo substitution");
    assert_eq!(record.title, "Collapsible Water Bottle");
    // Range price takes the low bound.
    assert!((record.price - 6.8).abs() < f64::EPSILON);
    assert_eq!(record.variants.len(), 1);
    assert_eq!(record.variants[0].options.len(), 2);
    assert_eq!(record.specifications[0].key, "Weight (g)");
}

#[tokio::test]
async fn cj_falls_back_to_page_markup_when_api_is_missing() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/product-api/product/query"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let body = r#"<html><head>
        <script type="application/ld+json">
        {"@type":"Product","name":"Collapsible Water Bottle",
         "offers":{"price":"7.50","priceCurrency":"USD"}}
        </script>
    </head><body><h1>Collapsible Water Bottle</h1></body></html>"#;

    Mock::given(method("GET"))
        .and(path("/product/collapsible-bottle-p-99.html"))
        .respond_with(html_page(body))
        .mount(&server)
        .await;

    let client = reqwest::Client::new();
    let url = format!("{}/product/collapsible-bottle-p-99.html", server.uri());
    let outcome = extract_with(Platform::Cj, &client, &test_config(), &url).await;
    let record = accept(outcome, Platform::Cj, &url);

    assert!(!record.is_demo, "expected acceptance, got demo substitution");
    assert_eq!(record.title, "Collapsible Water Bottle");
    assert!((record.price - 7.5).abs() < f64::EPSILON);
}

// ---------------------------------------------------------------------------
// Generic extractor — JSON-LD first, then microdata, then metas.
// ---------------------------------------------------------------------------

#[tokio::test]
async fn generic_json_ld_product_is_preferred() {
    let server = MockServer::start().await;
    let body = r#"<html><head>
        <script type="application/ld+json">
        {"@context":"https://schema.org","@type":"Product",
         "name":"Hand-Thrown Stoneware Mug",
         "image":["https://cdn.example.com/mug1.jpg","https://cdn.example.com/mug2.jpg"],
         "description":"A 350ml stoneware mug, glazed by hand.",
         "brand":{"@type":"Brand","name":"Clayworks"},
         "aggregateRating":{"ratingValue":4.9,"reviewCount":87},
         "offers":{"@type":"Offer","price":"28.00","priceCurrency":"EUR"}}
        </script>
        <meta property="og:title" content="Should not win">
    </head><body><h1>Also should not win</h1></body></html>"#;

    Mock::given(method("GET"))
        .and(path("/shop/stoneware-mug"))
        .respond_with(html_page(body))
        .mount(&server)
        .await;

    let client = reqwest::Client::new();
    let url = format!("{}/shop/stoneware-mug", server.uri());
    let record = scrape(&client, &test_config(), &url).await;

    assert!(!record.is_demo, "expected acceptance, got demo substitution");
    assert_eq!(record.title, "Hand-Thrown Stoneware Mug");
    assert!((record.price - 28.0).abs() < f64::EPSILON);
    assert_eq!(record.currency, "EUR");
    assert_eq!(record.rating, Some(4.9));
    assert_eq!(record.review_count, Some(87));
    assert_eq!(record.specifications[0].key, "Brand");
    assert_eq!(record.specifications[0].value, "Clayworks");
    assert_eq!(record.images[0], "https://cdn.example.com/mug1.jpg");
    assert_eq!(record.description, "A 350ml stoneware mug, glazed by hand.");
}

#[tokio::test]
async fn generic_image_list_is_deduped_and_capped() {
    let server = MockServer::start().await;
    let imgs: String = (0..30)
        .map(|i| format!(r#"<img src="/img/{}.jpg">"#, i % 20))
        .collect();
    let body = format!(
        r#"<html><head>
            <meta property="og:title" content="Wall Art Print Collection">
            <meta property="product:price:amount" content="18.00">
        </head><body>{imgs}</body></html>"#
    );

    Mock::given(method("GET"))
        .and(path("/shop/wall-art"))
        .respond_with(html_page(&body))
        .mount(&server)
        .await;

    let client = reqwest::Client::new();
    let url = format!("{}/shop/wall-art", server.uri());
    let record = scrape(&client, &test_config(), &url).await;

    assert!(!record.is_demo, "expected acceptance, got demo substitution");
    assert_eq!(record.images.len(), 15, "images must be capped at 15");
    let mut deduped = record.images.clone();
    deduped.dedup();
    assert_eq!(deduped.len(), record.images.len(), "images must be unique");
}

// ---------------------------------------------------------------------------
// Demo-record determinism through the full pipeline.
// ---------------------------------------------------------------------------

#[tokio::test]
async fn repeated_failures_yield_byte_identical_demo_records() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let client = reqwest::Client::new();
    let url = format!("{}/gone", server.uri());
    let config = test_config();

    let first = scrape(&client, &config, &url).await;
    let second = scrape(&client, &config, &url).await;

    assert!(first.is_demo);
    assert_eq!(
        serde_json::to_vec(&first).unwrap(),
        serde_json::to_vec(&second).unwrap()
    );
}
