//! Common regex patterns for supplier document extraction.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Dates (DD.MM.YYYY or DD.MM.YY)
    pub static ref DATE_DMY: Regex = Regex::new(
        r"\b(\d{1,2})\.(\d{1,2})\.(\d{4}|\d{2})\b"
    ).unwrap();

    // German decimal: 1.234,56 | 1234,56 | 10 (sign handled separately)
    pub static ref GERMAN_DECIMAL: Regex = Regex::new(
        r"^(?:\d{1,3}(?:\.\d{3})+|\d+)(?:,\d+)?$"
    ).unwrap();

    // Delivery week: "KW 12/24", "KW12.24", "12/2024" (a dot needs the KW prefix)
    pub static ref DELIVERY_WEEK: Regex = Regex::new(
        r"(?i)(?:\bKW\s*(\d{1,2})\s*[/.]\s*(\d{4}|\d{2})|\b(\d{1,2})\s*/\s*(\d{4}|\d{2}))\b"
    ).unwrap();

    // Page footer that interrupts an item table
    pub static ref PAGE_FOOTER: Regex = Regex::new(
        r"(?i)^(?:seite|page)\s+\d+\s*(?:von|of|/)\s*\d+"
    ).unwrap();

    // "<label> Nr. 4711 vom 12.02.2024"
    pub static ref NUMBER_WITH_DATE: Regex = Regex::new(
        r"(?i)\bNr\.?\s*:?\s*([A-Za-z0-9][A-Za-z0-9/\-_.]*)\s+vom\s+(\d{1,2}\.\d{1,2}\.\d{2,4})"
    ).unwrap();
}
