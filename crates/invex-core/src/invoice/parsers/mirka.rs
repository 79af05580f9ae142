//! Mirka invoices (English layout, intra-community supply).
//!
//! Row layout: `<pos> <article> <qty> <unit price> <amount>` with the description on the
//! lines below. Invoices are issued without German VAT.

use super::table::{tokens, DocumentContext, PageResync, RowTable};
use super::{lines, VendorParser};
use crate::invoice::Result;
use crate::invoice::rules::{extract_date, find_labeled, first_token_after, is_german_number, strip_label};
use crate::models::document::DocumentType;
use crate::models::invoice::{InvoiceHeader, ParsedDocument};
use crate::models::vendor::Vendor;

const TABLE_HEADER: &str = "Line Item";
const COMMODITY_LABEL: &str = "Commodity code";
const END_LABEL: &str = "Total net";
const PAYMENT_TERM_DAYS: u32 = 60;
const TAX_RATE: u8 = 0;

/// Mirka invoice.
#[derive(Debug, Clone, Copy, Default)]
pub struct MirkaInvoiceParser;

impl VendorParser for MirkaInvoiceParser {
    fn vendor(&self) -> Vendor {
        Vendor::Mirka
    }

    fn document_type(&self) -> DocumentType {
        DocumentType::Invoice
    }

    fn extract(&self, text: &str) -> Result<ParsedDocument> {
        let lines = lines(text);

        let header = InvoiceHeader {
            invoice_identifier: first_token_after(&lines, "Invoice number").map(String::from),
            invoice_date: find_labeled(&lines, "Invoice date").and_then(|v| extract_date(v.value)),
            due_date: None,
            order_reference: first_token_after(&lines, "Customer order no.").map(String::from),
            vendor_order_reference: first_token_after(&lines, "Sales order").map(String::from),
        };
        let ctx = DocumentContext::new(Vendor::Mirka, header, TAX_RATE)
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
            let opens_row = t.len() == 5
                && table.is_next_position(t[0])
                && t[2..].iter().all(|v| is_german_number(v));

            if opens_row {
                let row = table.open_row();
                row.vendor_article_number = Some(t[1].to_string());
                row.quantity = Some(t[2].to_string());
                row.total = Some(t[4].to_string());
                continue;
            }

            if let Some(row) = table.current() {
                match strip_label(line, COMMODITY_LABEL) {
                    Some(code) => row.push_note(&format!("{COMMODITY_LABEL} {code}")),
                    None => row.push_description(line),
                }
            }
        }

        table.into_document()
    }
}
