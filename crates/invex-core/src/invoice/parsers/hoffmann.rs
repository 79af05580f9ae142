//! Hoffmann Group invoices.
//!
//! Row layout: `<pos> <article> <description...> <qty> <price> <total>`. The document
//! number and date share one line (`Beleg-Nr. <n> Datum <date>`).

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
const NUMBER_LABEL: &str = "Beleg-Nr.";
const MATERIAL_LABEL: &str = "Ihre Materialnr.";
const END_LABEL: &str = "Zwischensumme";
const FREIGHT_LABEL: &str = "Versandkosten";
const PAYMENT_TERM_DAYS: u32 = 30;

/// Hoffmann invoice.
#[derive(Debug, Clone, Copy, Default)]
pub struct HoffmannInvoiceParser;

impl VendorParser for HoffmannInvoiceParser {
    fn vendor(&self) -> Vendor {
        Vendor::Hoffmann
    }

    fn document_type(&self) -> DocumentType {
        DocumentType::Invoice
    }

    fn extract(&self, text: &str) -> Result<ParsedDocument> {
        let lines = lines(text);

        let header = InvoiceHeader {
            invoice_identifier: first_token_after(&lines, NUMBER_LABEL).map(String::from),
            invoice_date: find_labeled(&lines, NUMBER_LABEL).and_then(|v| extract_date(v.value)),
            due_date: None,
            order_reference: first_token_after(&lines, "Ihre Bestellung").map(String::from),
            vendor_order_reference: first_token_after(&lines, "Auftrag").map(String::from),
        };
        let ctx = DocumentContext::new(Vendor::Hoffmann, header, DEFAULT_TAX_RATE)
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
            let opens_row = t.len() >= 6
                && table.is_next_position(t[0])
                && (0..3).all(|n| nth_back(&t, n).is_some_and(is_german_number));

            if opens_row {
                let row = table.open_row();
                row.vendor_article_number = Some(t[1].to_string());
                row.quantity = nth_back(&t, 2).map(String::from);
                row.total = nth_back(&t, 0).map(String::from);
                row.push_description(&join_between(&t, 2, 3));
                continue;
            }

            if let Some(row) = table.current() {
                match strip_label(line, MATERIAL_LABEL) {
                    Some(material) => row.internal_article_number = Some(material.to_string()),
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

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    const INVOICE: &str = "\
Hoffmann GmbH Qualitätswerkzeuge
Haberlandstraße 55, 81241 München
Rechnung
Beleg-Nr. 60123456 Datum 10.07.2024
Ihre Bestellung PO-77
Pos Artikel Bezeichnung Menge Einzelpreis Gesamt
1 123456 Bohrer HSS 6,0 mm 10 10,00 100,00
DIN 338 Typ N
Ihre Materialnr. M-55
2 234567 Bit-Satz 5 5,00 25,00
Zwischensumme 125,00
Versandkosten 6,90
Rechnungsbetrag netto 131,90
";

    #[test]
    fn test_invoice_rows() {
        let doc = HoffmannInvoiceParser.extract(INVOICE).unwrap();

        assert_eq!(doc.invoice_identifier, "60123456");
        assert_eq!(doc.items.len(), 3);

        let first = &doc.items[0];
        assert_eq!(first.vendor_article_number.as_deref(), Some("123456"));
        assert_eq!(first.description, "Bohrer HSS 6,0 mm DIN 338 Typ N");
        assert_eq!(first.internal_article_number.as_deref(), Some("M-55"));
        assert_eq!(first.quantity.as_deref(), Some("10"));
        assert_eq!(first.order_reference.as_deref(), Some("PO-77"));
        assert_eq!(first.vendor_order_reference, None);
        assert_eq!(first.invoice_date, NaiveDate::from_ymd_opt(2024, 7, 10));
        assert_eq!(first.due_date, NaiveDate::from_ymd_opt(2024, 8, 9));

        assert_eq!(doc.items[1].description, "Bit-Satz");
        assert_eq!(doc.items[1].unit_price_net.as_deref(), Some("5,000"));
    }

    #[test]
    fn test_freight_row() {
        let doc = HoffmannInvoiceParser.extract(INVOICE).unwrap();
        let freight = &doc.items[2];

        assert_eq!(freight.description, "Versandkosten");
        assert_eq!(freight.quantity.as_deref(), Some("1"));
        assert_eq!(freight.unit_price_net.as_deref(), Some("6,900"));
    }
}
