//! Klingspor invoices and order confirmations.
//!
//! Row layout: `<pos> <article> <description...> <qty> <unit> <price> <total>`, followed
//! by free-text lines. Long tables break across pages with an `Übertrag` footer and a
//! repeated letterhead; scanning resumes at the repeated `Pos.` header.

use chrono::{Datelike, Local};

use super::table::{
    charge_amount, delivery_note, join_between, nth_back, tokens, DocumentContext, PageResync,
    RowTable,
};
use super::{lines, VendorParser};
use crate::invoice::Result;
use crate::invoice::rules::{
    extract_date, find_labeled, first_token_after, is_german_number, parse_delivery_week,
    strip_label,
};
use crate::models::document::DocumentType;
use crate::models::invoice::{InvoiceHeader, ParsedDocument, DEFAULT_TAX_RATE};
use crate::models::vendor::Vendor;

const TABLE_HEADER: &str = "Pos.";
const PAGE_FOOTERS: &[&str] = &["Übertrag"];
const CUSTOMER_ARTICLE_LABEL: &str = "Ihre Art.-Nr.";
const WEIGHT_LABEL: &str = "Gewicht";
const DELIVERY_LABEL: &str = "Liefertermin";
const SURCHARGE_LABEL: &str = "Mindermengenzuschlag";
const PAYMENT_TERM_DAYS: u32 = 30;

/// Klingspor invoice (`Rechnung`).
#[derive(Debug, Clone, Copy, Default)]
pub struct KlingsporInvoiceParser;

/// Klingspor order confirmation (`Auftragsbestätigung`).
#[derive(Debug, Clone, Copy, Default)]
pub struct KlingsporOrderConfirmationParser;

impl VendorParser for KlingsporInvoiceParser {
    fn vendor(&self) -> Vendor {
        Vendor::Klingspor
    }

    fn document_type(&self) -> DocumentType {
        DocumentType::Invoice
    }

    fn extract(&self, text: &str) -> Result<ParsedDocument> {
        let lines = lines(text);

        let header = InvoiceHeader {
            invoice_identifier: first_token_after(&lines, "Rechnungs-Nr.").map(String::from),
            invoice_date: find_labeled(&lines, "Rechnungsdatum").and_then(|v| extract_date(v.value)),
            due_date: None,
            order_reference: first_token_after(&lines, "Ihre Bestellung").map(String::from),
            vendor_order_reference: first_token_after(&lines, "Auftrags-Nr.").map(String::from),
        };
        let ctx = DocumentContext::new(Vendor::Klingspor, header, DEFAULT_TAX_RATE)
            .with_payment_term(PAYMENT_TERM_DAYS);

        let mut table = scan_items(&lines, &ctx, "Warenwert")?;

        if let Some(total) = charge_amount(&lines, SURCHARGE_LABEL) {
            table.push_charge(SURCHARGE_LABEL, total);
        }

        table.into_document()
    }
}

impl VendorParser for KlingsporOrderConfirmationParser {
    fn vendor(&self) -> Vendor {
        Vendor::Klingspor
    }

    fn document_type(&self) -> DocumentType {
        DocumentType::OrderConfirmation
    }

    fn extract(&self, text: &str) -> Result<ParsedDocument> {
        let lines = lines(text);

        let confirmation = first_token_after(&lines, "AB-Nr.").map(String::from);
        let header = InvoiceHeader {
            invoice_identifier: confirmation.clone(),
            invoice_date: find_labeled(&lines, "Datum").and_then(|v| extract_date(v.value)),
            due_date: None,
            order_reference: first_token_after(&lines, "Ihre Bestellung").map(String::from),
            vendor_order_reference: confirmation,
        };
        let ctx = DocumentContext::new(Vendor::Klingspor, header, DEFAULT_TAX_RATE);

        scan_items(&lines, &ctx, "Gesamtbetrag")?.into_document()
    }
}

/// Walk the item table of either document type.
fn scan_items<'c>(lines: &[&str], ctx: &'c DocumentContext, end_label: &str) -> Result<RowTable<'c>> {
    let mut table = RowTable::new(ctx);
    let mut resync = PageResync::new(TABLE_HEADER, PAGE_FOOTERS);
    let reference_year = Local::now().year();

    for line in lines {
        if line.is_empty() || resync.skip(line) {
            continue;
        }

        if strip_label(line, end_label).is_some() {
            break;
        }

        let t = tokens(line);
        let opens_row = t.first().is_some_and(|first| table.is_next_position(first))
            && nth_back(&t, 0).is_some_and(is_german_number);

        if opens_row {
            let quantity = nth_back(&t, 3)
                .filter(|q| is_german_number(q))
                .ok_or_else(|| ctx.malformed(format!("no quantity in row: {line}")))?;
            let article = t
                .get(1)
                .ok_or_else(|| ctx.malformed(format!("no article number in row: {line}")))?;

            let row = table.open_row();
            row.vendor_article_number = Some(article.to_string());
            row.quantity = Some(quantity.to_string());
            row.total = nth_back(&t, 0).map(String::from);
            row.push_description(&join_between(&t, 2, 4));
            continue;
        }

        let Some(row) = table.current() else {
            continue;
        };

        if let Some(value) = strip_label(line, CUSTOMER_ARTICLE_LABEL) {
            row.internal_article_number = Some(value.to_string());
        } else if let Some(value) = strip_label(line, DELIVERY_LABEL) {
            let delivery =
                extract_date(value).or_else(|| parse_delivery_week(value, reference_year));
            match delivery {
                Some(date) => row.push_note(&delivery_note(date)),
                None => row.push_note(line),
            }
        } else if strip_label(line, WEIGHT_LABEL).is_some() {
            row.close_description();
        } else {
            row.push_description(line);
        }
    }

    Ok(table)
}
