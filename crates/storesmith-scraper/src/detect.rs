//! URL → platform classification.

use storesmith_core::Platform;

/// Ordered (hostname fragment → platform) table. First match wins, so more
/// specific fragments must precede broader ones if any are ever added.
const PLATFORM_TABLE: [(&str, Platform); 4] = [
    ("aliexpress.", Platform::Aliexpress),
    ("amazon.", Platform::Amazon),
    ("alibaba.", Platform::Alibaba),
    ("cjdropshipping", Platform::Cj),
];

/// Classifies a product URL into a [`Platform`].
///
/// Pure, case-insensitive substring match; never fails. Unrecognized hosts
/// fall back to [`Platform::GenericHttp`], which routes to the generic
/// heuristic extractor.
#[must_use]
pub fn detect_platform(url: &str) -> Platform {
    let lower = url.to_ascii_lowercase();
    for (fragment, platform) in PLATFORM_TABLE {
        if lower.contains(fragment) {
            return platform;
        }
    }
    Platform::GenericHttp
}

#[cfg(test)]
#[path = "detect_test.rs"]
mod tests;
