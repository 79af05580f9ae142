//! sia Abrasives invoices.
//!
//! Row layout: `<pos> <article> <description...> <qty> <total>`. Customer article
//! numbers follow the row on a `Kundenartikel:` line.

use super::table::{
    charge_amount, join_between, nth_back, tokens, DocumentContext, PageResync, RowTable,
};
use super::{lines, VendorParser};
use crate::invoice::Result;
use crate::invoice::rules::{extract_date, find_labeled, first_token_after, is_german_number, strip_label};
use crate::models::document::DocumentType;
use crate::models::invoice::{InvoiceHeader, ParsedDocument, DEFAULT_TAX_RATE};
use crate::models::vendor::Vendor;

const TABLE_HEADER: &str = "Pos";
const CUSTOMER_ARTICLE_LABEL: &str = "Kundenartikel";
const END_LABEL: &str = "Summe netto";
const SURCHARGE_LABEL: &str = "Auftragszuschlag";
const PAYMENT_TERM_DAYS: u32 = 14;

/// sia Abrasives invoice.
#[derive(Debug, Clone, Copy, Default)]
pub struct SiaInvoiceParser;

impl VendorParser for SiaInvoiceParser {
    fn vendor(&self) -> Vendor {
        Vendor::Sia
    }

    fn document_type(&self) -> DocumentType {
        DocumentType::Invoice
    }

    fn extract(&self, text: &str) -> Result<ParsedDocument> {
        let lines = lines(text);

        let header = InvoiceHeader {
            invoice_identifier: first_token_after(&lines, "Rechnungsnummer").map(String::from),
            invoice_date: find_labeled(&lines, "Rechnungsdatum").and_then(|v| extract_date(v.value)),
            due_date: None,
            order_reference: first_token_after(&lines, "Kundenbestellnummer").map(String::from),
            vendor_order_reference: first_token_after(&lines, "Auftragsnummer").map(String::from),
        };
        let ctx = DocumentContext::new(Vendor::Sia, header, DEFAULT_TAX_RATE)
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
            let opens_row = t.len() >= 5
                && table.is_next_position(t[0])
                && nth_back(&t, 0).is_some_and(is_german_number)
                && nth_back(&t, 1).is_some_and(is_german_number);

            if opens_row {
                let row = table.open_row();
                row.vendor_article_number = Some(t[1].to_string());
                row.quantity = nth_back(&t, 1).map(String::from);
                row.total = nth_back(&t, 0).map(String::from);
                row.push_description(&join_between(&t, 2, 2));
                continue;
            }

            if let Some(row) = table.current() {
                match strip_label(line, CUSTOMER_ARTICLE_LABEL) {
                    Some(article) => row.internal_article_number = Some(article.to_string()),
                    None => row.push_description(line),
                }
            }
        }

        if let Some(total) = charge_amount(&lines, SURCHARGE_LABEL) {
            table.push_charge(SURCHARGE_LABEL, total);
        }

        table.into_document()
    }
}
