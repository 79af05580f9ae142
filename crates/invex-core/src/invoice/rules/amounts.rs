//! Amount normalization for German-formatted supplier documents.

use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

use super::patterns::GERMAN_DECIMAL;

/// Decimal places of a derived unit price.
pub const UNIT_PRICE_PLACES: u32 = 3;

/// Parse a German-formatted number (`.` thousands, `,` decimal).
///
/// Accepts a leading or trailing minus (`-12,50`, `12,50-`). Anything else that is not a
/// number yields `None`.
pub fn parse_german_decimal(s: &str) -> Option<Decimal> {
    let s = s.trim();
    let (negative, digits) = if let Some(rest) = s.strip_prefix('-') {
        (true, rest.trim_start())
    } else if let Some(rest) = s.strip_suffix('-') {
        (true, rest.trim_end())
    } else {
        (false, s)
    };

    if !GERMAN_DECIMAL.is_match(digits) {
        return None;
    }

    let normalized = digits.replace('.', "").replace(',', ".");
    let value = Decimal::from_str(&normalized).ok()?;
    Some(if negative { -value } else { value })
}

/// True if the token is a German-formatted number.
pub fn is_german_number(token: &str) -> bool {
    parse_german_decimal(token).is_some()
}

/// Render a decimal with a comma separator and a fixed number of places.
pub fn format_german_decimal(amount: Decimal, places: u32) -> String {
    let rounded = amount.round_dp_with_strategy(places, RoundingStrategy::MidpointAwayFromZero);
    format!("{:.*}", places as usize, rounded).replace('.', ",")
}

/// Derive the net unit price from a position total and a quantity.
///
/// Absent or non-numeric inputs give `None`. A zero quantity gives `"0"`.
pub fn unit_price(total: Option<&str>, quantity: Option<&str>) -> Option<String> {
    let total = parse_german_decimal(total?)?;
    let quantity = parse_german_decimal(quantity?)?;

    if quantity.is_zero() {
        return Some("0".to_string());
    }

    Some(format_german_decimal(total / quantity, UNIT_PRICE_PLACES))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_parse_german_decimal() {
        assert_eq!(parse_german_decimal("1.234,56"), Some(dec("1234.56")));
        assert_eq!(parse_german_decimal("1234,56"), Some(dec("1234.56")));
        assert_eq!(parse_german_decimal("10"), Some(dec("10")));
        assert_eq!(parse_german_decimal(" 12.345.678,90 "), Some(dec("12345678.90")));
        assert_eq!(parse_german_decimal("12,50-"), Some(dec("-12.50")));
        assert_eq!(parse_german_decimal("-0,5"), Some(dec("-0.5")));
    }

    #[test]
    fn test_parse_german_decimal_rejects_text() {
        assert_eq!(parse_german_decimal("abc"), None);
        assert_eq!(parse_german_decimal(""), None);
        assert_eq!(parse_german_decimal("-"), None);
        assert_eq!(parse_german_decimal("12,3,4"), None);
        assert_eq!(parse_german_decimal("1234.56"), None);
    }

    #[test]
    fn test_unit_price() {
        assert_eq!(unit_price(Some("100,00"), Some("10")), Some("10,000".to_string()));
        assert_eq!(unit_price(Some("25,00"), Some("5")), Some("5,000".to_string()));
        assert_eq!(unit_price(Some("1.000,00"), Some("3")), Some("333,333".to_string()));
        assert_eq!(unit_price(Some("10,00"), Some("6")), Some("1,667".to_string()));
    }

    #[test]
    fn test_unit_price_zero_quantity() {
        assert_eq!(unit_price(Some("100,00"), Some("0")), Some("0".to_string()));
        assert_eq!(unit_price(Some("100,00"), Some("0,00")), Some("0".to_string()));
    }

    #[test]
    fn test_unit_price_absent_inputs() {
        assert_eq!(unit_price(None, Some("5")), None);
        assert_eq!(unit_price(Some("5"), None), None);
        assert_eq!(unit_price(Some("n/a"), Some("5")), None);
    }

    #[test]
    fn test_unit_price_times_quantity_matches_total() {
        let samples = [
            ("100,00", "10"),
            ("25,00", "5"),
            ("9,99", "1"),
            ("1.234,56", "2"),
            ("0,45", "0,5"),
            ("7,50", "2,5"),
        ];

        for (total, qty) in samples {
            let price = unit_price(Some(total), Some(qty)).unwrap();
            let product = parse_german_decimal(&price).unwrap() * parse_german_decimal(qty).unwrap();
            let diff = (product - parse_german_decimal(total).unwrap()).abs();
            assert!(diff <= dec("0.001"), "{total} / {qty} -> {price}");
        }
    }

    #[test]
    fn test_format_german_decimal() {
        assert_eq!(format_german_decimal(dec("10"), 3), "10,000");
        assert_eq!(format_german_decimal(dec("2.0005"), 3), "2,001");
        assert_eq!(format_german_decimal(dec("-1.5"), 2), "-1,50");
    }
}
