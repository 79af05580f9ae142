//! Würth invoices.
//!
//! Row layout: `<pos> <article part 1> <article part 2> <qty> <description...> <price>
//! <total>`. Article numbers are printed in two groups ("0681 012"). Each item carries
//! its own delivery note and ends with a weight line.

use super::table::{join_between, nth_back, tokens, DocumentContext, PageResync, RowTable};
use super::{lines, VendorParser};
use crate::invoice::Result;
use crate::invoice::rules::{extract_date, find_labeled, first_token_after, is_german_number, strip_label};
use crate::models::document::DocumentType;
use crate::models::invoice::{InvoiceHeader, ParsedDocument, DEFAULT_TAX_RATE};
use crate::models::vendor::Vendor;

const TABLE_HEADER: &str = "Pos";
const CUSTOMER_ARTICLE_LABEL: &str = "Ihre Artikel-Nr.";
const DELIVERY_NOTE_LABEL: &str = "Lieferschein";
const WEIGHT_LABEL: &str = "Gewicht";
const END_LABEL: &str = "Nettowarenwert";
const PAYMENT_TERM_DAYS: u32 = 30;

/// Würth invoice.
#[derive(Debug, Clone, Copy, Default)]
pub struct WuerthInvoiceParser;

impl VendorParser for WuerthInvoiceParser {
    fn vendor(&self) -> Vendor {
        Vendor::Wuerth
    }

    fn document_type(&self) -> DocumentType {
        DocumentType::Invoice
    }

    fn extract(&self, text: &str) -> Result<ParsedDocument> {
        let lines = lines(text);

        let header = InvoiceHeader {
            invoice_identifier: first_token_after(&lines, "Rechnung Nr.").map(String::from),
            invoice_date: find_labeled(&lines, "Datum").and_then(|v| extract_date(v.value)),
            due_date: None,
            order_reference: first_token_after(&lines, "Bestellnummer Kunde").map(String::from),
            vendor_order_reference: None,
        };
        let ctx = DocumentContext::new(Vendor::Wuerth, header, DEFAULT_TAX_RATE)
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
                && is_german_number(t[3])
                && nth_back(&t, 0).is_some_and(is_german_number);

            if opens_row {
                let row = table.open_row();
                row.vendor_article_number = Some(format!("{} {}", t[1], t[2]));
                row.quantity = Some(t[3].to_string());
                row.total = nth_back(&t, 0).map(String::from);
                row.push_description(&join_between(&t, 4, 2));
                continue;
            }

            let Some(row) = table.current() else {
                continue;
            };

            if let Some(value) = strip_label(line, CUSTOMER_ARTICLE_LABEL) {
                row.internal_article_number = Some(value.to_string());
            } else if let Some(value) = strip_label(line, DELIVERY_NOTE_LABEL) {
                row.vendor_order_reference = value.split_whitespace().next().map(String::from);
            } else if strip_label(line, WEIGHT_LABEL).is_some() {
                row.close_description();
            } else {
                row.push_description(line);
            }
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
Adolf Würth GmbH & Co. KG
Reinhold-Würth-Str. 12-17, 74653 Künzelsau
Rechnung Nr. 4012345678
Datum 20.05.2024
Bestellnummer Kunde: K-2024-17
Pos Art.-Nr. Menge Bezeichnung Preis/Einh. Wert
1 0681 012 10 Schleifscheibe Korund 10,00 100,00
für Stahl
Ihre Artikel-Nr. 55-100
Lieferschein 80012345
Gewicht: 2,5 kg
Sonderposten
2 0681 013 5 Fächerscheibe 5,00 25,00
Lieferschein 80012399
Gewicht: 0,8 kg
Nettowarenwert 125,00
";

    #[test]
    fn test_invoice_rows() {
        let doc = WuerthInvoiceParser.extract(INVOICE).unwrap();

        assert_eq!(doc.invoice_identifier, "4012345678");
        assert_eq!(doc.items.len(), 2);

        let first = &doc.items[0];
        assert_eq!(first.vendor_article_number.as_deref(), Some("0681 012"));
        assert_eq!(first.description, "Schleifscheibe Korund für Stahl");
        assert_eq!(first.internal_article_number.as_deref(), Some("55-100"));
        assert_eq!(first.vendor_order_reference.as_deref(), Some("80012345"));
        assert_eq!(first.order_reference.as_deref(), Some("K-2024-17"));
        assert_eq!(first.unit_price_net.as_deref(), Some("10,000"));
        assert_eq!(first.due_date, NaiveDate::from_ymd_opt(2024, 6, 19));

        let second = &doc.items[1];
        assert_eq!(second.vendor_article_number.as_deref(), Some("0681 013"));
        assert_eq!(second.description, "Fächerscheibe");
        assert_eq!(second.vendor_order_reference.as_deref(), Some("80012399"));
        assert_eq!(second.internal_article_number, None);
        assert_eq!(second.unit_price_net.as_deref(), Some("5,000"));
    }
}
