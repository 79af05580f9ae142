//! PFERD (August Rüggeberg) invoices.
//!
//! Row layout: `<pos> <qty> <article> <description...> <price per 100> <total>`. A row
//! needs both leading tokens to be numbers; description lines often start with a count
//! ("2 Lagen ...") that must not be taken for the next position.

use super::table::{
    charge_amount, join_between, nth_back, tokens, DocumentContext, PageResync, RowTable,
};
use super::{lines, VendorParser};
use crate::invoice::Result;
use crate::invoice::rules::{
    extract_date, first_token_after, is_german_number, strip_label, NUMBER_WITH_DATE,
};
use crate::models::document::DocumentType;
use crate::models::invoice::{InvoiceHeader, ParsedDocument, DEFAULT_TAX_RATE};
use crate::models::vendor::Vendor;

const TABLE_HEADER: &str = "Pos";
const EAN_LABEL: &str = "EAN";
const END_LABEL: &str = "Warenwert";
const FREIGHT_LABEL: &str = "Fracht";
const PAYMENT_TERM_DAYS: u32 = 14;

/// PFERD invoice.
#[derive(Debug, Clone, Copy, Default)]
pub struct PferdInvoiceParser;

impl VendorParser for PferdInvoiceParser {
    fn vendor(&self) -> Vendor {
        Vendor::Pferd
    }

    fn document_type(&self) -> DocumentType {
        DocumentType::Invoice
    }

    fn extract(&self, text: &str) -> Result<ParsedDocument> {
        let lines = lines(text);

        let number_line = lines
            .iter()
            .filter(|line| strip_label(line, "RECHNUNG").is_some())
            .find_map(|line| NUMBER_WITH_DATE.captures(line));

        let header = InvoiceHeader {
            invoice_identifier: number_line.as_ref().map(|caps| caps[1].to_string()),
            invoice_date: number_line.as_ref().and_then(|caps| extract_date(&caps[2])),
            due_date: None,
            order_reference: first_token_after(&lines, "Ihre Bestell-Nr.").map(String::from),
            vendor_order_reference: first_token_after(&lines, "Lieferschein").map(String::from),
        };
        let ctx = DocumentContext::new(Vendor::Pferd, header, DEFAULT_TAX_RATE)
            .with_payment_term(PAYMENT_TERM_DAYS);

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
            let opens_row = t.first().is_some_and(|pos| table.is_next_position(pos))
                && t.get(1).is_some_and(|qty| is_german_number(qty));

            if opens_row {
                if t.len() < 5 || !nth_back(&t, 0).is_some_and(is_german_number) {
                    return Err(ctx.malformed(format!("incomplete row: {line}")));
                }
                let row = table.open_row();
                row.quantity = Some(t[1].to_string());
                row.vendor_article_number = Some(t[2].to_string());
                row.total = nth_back(&t, 0).map(String::from);
                row.push_description(&join_between(&t, 3, 2));
                continue;
            }

            if let Some(row) = table.current() {
                match strip_label(line, EAN_LABEL) {
                    Some(ean) => row.push_note(&format!("EAN {ean}")),
                    None => row.push_description(line),
                }
            }
        }

        if let Some(total) = charge_amount(&lines, FREIGHT_LABEL) {
            table.push_charge(FREIGHT_LABEL, total);
        }

        table.into_document()
    }
}
