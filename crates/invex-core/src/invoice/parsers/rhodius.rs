//! Rhodius order confirmations.
//!
//! Row layout: `<pos> <article> <description...> <qty> <price> <total> <week/year>`. The
//! last column is the confirmed delivery week, turned into the Sunday of that week.

use chrono::{Datelike, Local};

use super::table::{
    delivery_note, join_between, nth_back, tokens, DocumentContext, PageResync, RowTable,
};
use super::{lines, VendorParser};
use crate::invoice::Result;
use crate::invoice::rules::{
    extract_date, first_token_after, is_german_number, parse_delivery_week, strip_label,
    NUMBER_WITH_DATE,
};
use crate::models::document::DocumentType;
use crate::models::invoice::{InvoiceHeader, ParsedDocument, DEFAULT_TAX_RATE};
use crate::models::vendor::Vendor;

const TITLE: &str = "Auftragsbestätigung";
const TABLE_HEADER: &str = "Pos";
const END_LABEL: &str = "Gesamt netto";

/// Rhodius order confirmation.
#[derive(Debug, Clone, Copy, Default)]
pub struct RhodiusOrderConfirmationParser;

impl VendorParser for RhodiusOrderConfirmationParser {
    fn vendor(&self) -> Vendor {
        Vendor::Rhodius
    }

    fn document_type(&self) -> DocumentType {
        DocumentType::OrderConfirmation
    }

    fn extract(&self, text: &str) -> Result<ParsedDocument> {
        let lines = lines(text);
        let reference_year = Local::now().year();

        let number_line = lines
            .iter()
            .filter(|line| strip_label(line, TITLE).is_some())
            .find_map(|line| NUMBER_WITH_DATE.captures(line));
        let confirmation = number_line.as_ref().map(|caps| caps[1].to_string());

        let header = InvoiceHeader {
            invoice_identifier: confirmation.clone(),
            invoice_date: number_line.as_ref().and_then(|caps| extract_date(&caps[2])),
            due_date: None,
            order_reference: first_token_after(&lines, "Ihre Bestellung").map(String::from),
            vendor_order_reference: confirmation,
        };
        let ctx = DocumentContext::new(Vendor::Rhodius, header, DEFAULT_TAX_RATE);

        let mut table = RowTable::new(&ctx);
        let mut resync = PageResync::new(TABLE_HEADER, &[]);

        for line in &lines {
            if line.is_empty() || resync.skip(line) {
                continue;
            }
            if strip_label(line, END_LABEL).is_some() {
                break;
            }

            let t = tokens(line);
            let week = nth_back(&t, 0).and_then(|w| parse_delivery_week(w, reference_year));
            let back = usize::from(week.is_some());
            let opens_row = t.len() >= 5 + back
                && table.is_next_position(t[0])
                && nth_back(&t, back).is_some_and(is_german_number)
                && nth_back(&t, back + 2).is_some_and(is_german_number);

            if opens_row {
                let row = table.open_row();
                row.vendor_article_number = Some(t[1].to_string());
                row.quantity = nth_back(&t, back + 2).map(String::from);
                row.total = nth_back(&t, back).map(String::from);
                row.push_description(&join_between(&t, 2, back + 3));
                if let Some(date) = week {
                    row.push_note(&delivery_note(date));
                }
                continue;
            }

            if let Some(row) = table.current() {
                row.push_description(line);
            }
        }

        table.into_document()
    }
}
