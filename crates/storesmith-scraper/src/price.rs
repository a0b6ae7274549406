//! Price-string parsing.
//!
//! Pages present prices as `"US $12.99"`, `"$1,299.00"`, `"€12,99"` is out of
//! scope (currency-agnostic numeric value only), and ranges like
//! `"US$1.20 - US$2.50"`. The rule: take the first numeric run, drop
//! thousands separators, parse as a float. `0.0` is the pipeline's single
//! "price missing" sentinel, so every failure path lands there.

/// Parses the first numeric run from a located price string.
///
/// Returns `0.0` (the missing-price sentinel) when no parseable number is
/// present. Ranges yield their first (low) bound.
#[must_use]
pub fn parse_price(raw: &str) -> f64 {
    parse_price_opt(raw).unwrap_or(0.0)
}

/// Like [`parse_price`], but distinguishes "no number found" from a genuine
/// zero in the source.
#[must_use]
pub fn parse_price_opt(raw: &str) -> Option<f64> {
    let start = raw.find(|c: char| c.is_ascii_digit())?;
    let run: String = raw[start..]
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == '.' || *c == ',')
        .collect();

    // Commas are thousands separators in every price format in scope.
    let cleaned = run.replace(',', "");
    let cleaned = cleaned.trim_end_matches('.');
    let value = cleaned.parse::<f64>().ok()?;
    if value.is_finite() && value >= 0.0 {
        Some(value)
    } else {
        None
    }
}

#[cfg(test)]
#[path = "price_test.rs"]
mod tests;
