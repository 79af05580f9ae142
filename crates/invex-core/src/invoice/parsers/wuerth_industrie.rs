//! Würth Industrie Service invoices.
//!
//! Row layout: `<pos> <qty> <unit> <material> <customer material> <description...>
//! <total>`. A `-` in the customer material column means none was agreed. Each item is
//! followed by its `Auftrag` number.

use super::table::{join_between, nth_back, tokens, DocumentContext, PageResync, RowTable};
use super::{lines, VendorParser};
use crate::invoice::Result;
use crate::invoice::rules::{extract_date, find_labeled, first_token_after, is_german_number, strip_label};
use crate::models::document::DocumentType;
use crate::models::invoice::{InvoiceHeader, ParsedDocument, DEFAULT_TAX_RATE};
use crate::models::vendor::Vendor;

const TABLE_HEADER: &str = "Pos.";
const ORDER_LABEL: &str = "Auftrag";
const END_LABEL: &str = "Summe Positionen";
const NO_CUSTOMER_MATERIAL: &str = "-";
const PAYMENT_TERM_DAYS: u32 = 30;

/// Würth Industrie Service invoice.
#[derive(Debug, Clone, Copy, Default)]
pub struct WuerthIndustrieInvoiceParser;

impl VendorParser for WuerthIndustrieInvoiceParser {
    fn vendor(&self) -> Vendor {
        Vendor::WuerthIndustrie
    }

    fn document_type(&self) -> DocumentType {
        DocumentType::Invoice
    }

    fn extract(&self, text: &str) -> Result<ParsedDocument> {
        let lines = lines(text);

        let header = InvoiceHeader {
            invoice_identifier: first_token_after(&lines, "Rechnung").map(String::from),
            invoice_date: find_labeled(&lines, "Rechnungsdatum").and_then(|v| extract_date(v.value)),
            due_date: None,
            order_reference: first_token_after(&lines, "Bestellung").map(String::from),
            vendor_order_reference: None,
        };
        let ctx = DocumentContext::new(Vendor::WuerthIndustrie, header, DEFAULT_TAX_RATE)
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
            let opens_row = t.len() >= 7
                && table.is_next_position(t[0])
                && is_german_number(t[1])
                && nth_back(&t, 0).is_some_and(is_german_number);

            if opens_row {
                let row = table.open_row();
                row.quantity = Some(t[1].to_string());
                row.vendor_article_number = Some(t[3].to_string());
                row.internal_article_number =
                    Some(t[4]).filter(|m| *m != NO_CUSTOMER_MATERIAL).map(String::from);
                row.total = nth_back(&t, 0).map(String::from);
                row.push_description(&join_between(&t, 5, 1));
                continue;
            }

            if let Some(row) = table.current() {
                match strip_label(line, ORDER_LABEL) {
                    Some(order) => {
                        row.vendor_order_reference = order.split_whitespace().next().map(String::from)
                    }
                    None => row.push_description(line),
                }
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
Würth Industrie Service GmbH & Co. KG
Industriepark Würth, 97999 Bad Mergentheim
Rechnung
Rechnung 9100123456
Rechnungsdatum 02.06.2024
Bestellung 4500098765
Pos. Menge ME Material Kundenmaterial Bezeichnung Betrag
1 10 ST 12345678 KM-1 Schleifscheibe 125x6 100,00
Auftrag 30012345
2 5 ST 23456789 - Drahtbürste 25,00
Auftrag 30012399
Zopfbürste gezopft
Summe Positionen 125,00
";

    #[test]
    fn test_invoice_rows() {
        let doc = WuerthIndustrieInvoiceParser.extract(INVOICE).unwrap();

        assert_eq!(doc.invoice_identifier, "9100123456");
        assert_eq!(doc.items.len(), 2);

        let first = &doc.items[0];
        assert_eq!(first.vendor_article_number.as_deref(), Some("12345678"));
        assert_eq!(first.internal_article_number.as_deref(), Some("KM-1"));
        assert_eq!(first.description, "Schleifscheibe 125x6");
        assert_eq!(first.vendor_order_reference.as_deref(), Some("30012345"));
        assert_eq!(first.order_reference.as_deref(), Some("4500098765"));
        assert_eq!(first.vendor_name, "Würth Industrie Service");
        assert_eq!(first.due_date, NaiveDate::from_ymd_opt(2024, 7, 2));

        let second = &doc.items[1];
        assert_eq!(second.internal_article_number, None);
        assert_eq!(second.description, "Drahtbürste Zopfbürste gezopft");
        assert_eq!(second.vendor_order_reference.as_deref(), Some("30012399"));
        assert_eq!(second.unit_price_net.as_deref(), Some("5,000"));
    }
}
