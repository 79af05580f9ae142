//! Date helpers: document dates, payment terms and delivery weeks.

use chrono::{Datelike, Days, Local, NaiveDate, Weekday};
use tracing::warn;

use super::patterns::{DATE_DMY, DELIVERY_WEEK};

/// Largest distance in years a resolved year may have from the reference year.
const YEAR_WINDOW: i32 = 50;

/// Find the first `DD.MM.YYYY` / `DD.MM.YY` date in a piece of text.
///
/// Two-digit years are resolved against the current year.
pub fn extract_date(text: &str) -> Option<NaiveDate> {
    extract_date_from(text, Local::now().year())
}

fn extract_date_from(text: &str, reference_year: i32) -> Option<NaiveDate> {
    DATE_DMY.captures_iter(text).find_map(|caps| {
        let day: u32 = caps[1].parse().ok()?;
        let month: u32 = caps[2].parse().ok()?;
        let year: i32 = caps[3].parse().ok()?;
        NaiveDate::from_ymd_opt(resolve_year(year, reference_year), month, day)
    })
}

/// Add a payment term in days to an invoice date.
pub fn add_payment_term(invoice_date: NaiveDate, term_days: u32) -> Option<NaiveDate> {
    invoice_date.checked_add_days(Days::new(u64::from(term_days)))
}

/// Compute a due date from a formatted invoice date.
///
/// `format` is a chrono format string used for both parsing and rendering.
pub fn due_date(invoice_date: &str, term_days: u32, format: &str) -> Option<String> {
    let date = NaiveDate::parse_from_str(invoice_date.trim(), format).ok()?;
    add_payment_term(date, term_days).map(|d| d.format(format).to_string())
}

/// Resolve a possibly two-digit year against a reference year.
///
/// Two-digit years are placed in the reference century and then moved by at most one
/// century towards the reference year. Four-digit years are taken as printed. A result
/// more than 50 years away from the reference is returned as is and logged.
pub fn resolve_year(year: i32, reference_year: i32) -> i32 {
    let mut resolved = year;
    if (0..100).contains(&year) {
        resolved = reference_year - reference_year.rem_euclid(100) + year;
        if resolved - reference_year > YEAR_WINDOW {
            resolved -= 100;
        } else if reference_year - resolved > YEAR_WINDOW {
            resolved += 100;
        }
    }

    if (resolved - reference_year).abs() > YEAR_WINDOW {
        warn!(
            "Year {} resolved to {}, still outside the window around {}",
            year, resolved, reference_year
        );
    }

    resolved
}

/// Last day (Sunday) of an ISO week, resolving the year against the current year.
pub fn iso_week_end_date(year: i32, week: u32) -> Option<NaiveDate> {
    iso_week_end_date_from(year, week, Local::now().year())
}

/// Last day (Sunday) of an ISO week, resolving the year against `reference_year`.
pub fn iso_week_end_date_from(year: i32, week: u32, reference_year: i32) -> Option<NaiveDate> {
    NaiveDate::from_isoywd_opt(resolve_year(year, reference_year), week, Weekday::Sun)
}

/// Parse a delivery week such as `KW 12/24`, `KW12.24` or `33/2024` into the week's end
/// date. Without the `KW` prefix only `/` separates week and year, so a plain
/// `15.03.2024` is not a week.
pub fn parse_delivery_week(text: &str, reference_year: i32) -> Option<NaiveDate> {
    let caps = DELIVERY_WEEK.captures(text)?;
    let (week, year) = match (caps.get(1), caps.get(2)) {
        (Some(week), Some(year)) => (week, year),
        _ => (caps.get(3)?, caps.get(4)?),
    };
    let week: u32 = week.as_str().parse().ok()?;
    let year: i32 = year.as_str().parse().ok()?;
    iso_week_end_date_from(year, week, reference_year)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_extract_date() {
        assert_eq!(extract_date("Rechnungsdatum: 15.03.2024"), Some(date(2024, 3, 15)));
        assert_eq!(extract_date("vom 1.2.24"), Some(date(2024, 2, 1)));
        assert_eq!(extract_date("32.13.2024 then 02.01.2024"), Some(date(2024, 1, 2)));
        assert_eq!(extract_date("no date here"), None);
    }

    #[test]
    fn test_extract_date_resolves_two_digit_years() {
        assert_eq!(extract_date_from("vom 01.02.24", 2026), Some(date(2024, 2, 1)));
        assert_eq!(extract_date_from("vom 31.12.99", 2026), Some(date(1999, 12, 31)));
        assert_eq!(extract_date_from("vom 01.02.03", 2090), Some(date(2103, 2, 1)));
    }

    #[test]
    fn test_due_date() {
        assert_eq!(due_date("01.01.2024", 30, "%d.%m.%Y"), Some("31.01.2024".to_string()));
        assert_eq!(due_date("15.02.2024", 14, "%d.%m.%Y"), Some("29.02.2024".to_string()));
        assert_eq!(due_date("2024-01-01", 60, "%Y-%m-%d"), Some("2024-03-01".to_string()));
        assert_eq!(due_date("not a date", 30, "%d.%m.%Y"), None);
    }

    #[test]
    fn test_resolve_year() {
        assert_eq!(resolve_year(24, 2026), 2024);
        assert_eq!(resolve_year(2024, 2026), 2024);
        assert_eq!(resolve_year(99, 2026), 1999);
        assert_eq!(resolve_year(1, 2099), 2101);
        assert_eq!(resolve_year(50, 2000), 2050);
    }

    #[test]
    fn test_resolve_year_keeps_four_digit_years() {
        assert_eq!(resolve_year(1926, 2026), 1926);
        assert_eq!(resolve_year(2300, 2026), 2300);
    }

    #[test]
    fn test_iso_week_end_date() {
        assert_eq!(iso_week_end_date_from(24, 12, 2026), Some(date(2024, 3, 24)));
        assert_eq!(iso_week_end_date_from(2024, 33, 2026), Some(date(2024, 8, 18)));
        assert_eq!(iso_week_end_date_from(2024, 54, 2026), None);
    }

    #[test]
    fn test_parse_delivery_week() {
        assert_eq!(parse_delivery_week("Liefertermin: KW 12/24", 2026), Some(date(2024, 3, 24)));
        assert_eq!(parse_delivery_week("33/2024", 2026), Some(date(2024, 8, 18)));
        assert_eq!(parse_delivery_week("KW12.24", 2026), Some(date(2024, 3, 24)));
        assert_eq!(parse_delivery_week("34/24", 2026), Some(date(2024, 8, 25)));
        assert_eq!(parse_delivery_week("15.03.2024", 2026), None);
        assert_eq!(parse_delivery_week("sofort", 2026), None);
    }
}
