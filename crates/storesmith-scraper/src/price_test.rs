use super::{parse_price, parse_price_opt};

#[test]
fn plain_dollar_price() {
    assert!((parse_price("$12.99") - 12.99).abs() < f64::EPSILON);
}

#[test]
fn us_prefixed_price() {
    assert!((parse_price("US $12.99") - 12.99).abs() < f64::EPSILON);
}

#[test]
fn thousands_separator_is_dropped() {
    assert!((parse_price("$1,299.00") - 1299.0).abs() < f64::EPSILON);
}

#[test]
fn range_takes_low_bound() {
    assert!((parse_price("US$1.20 - US$2.50") - 1.2).abs() < f64::EPSILON);
}

#[test]
fn integer_price() {
    assert!((parse_price("129") - 129.0).abs() < f64::EPSILON);
}

#[test]
fn trailing_dot_is_tolerated() {
    assert!((parse_price("12. ") - 12.0).abs() < f64::EPSILON);
}

#[test]
fn no_digits_is_sentinel_zero() {
    assert!((parse_price("Contact us for pricing") - 0.0).abs() < f64::EPSILON);
    assert!(parse_price_opt("free shipping on all orders").is_none());
}

#[test]
fn empty_string_is_sentinel_zero() {
    assert!((parse_price("") - 0.0).abs() < f64::EPSILON);
}

#[test]
fn explicit_zero_parses_as_zero() {
    assert_eq!(parse_price_opt("$0.00"), Some(0.0));
}
