//! Line-item table produced by the vendor parsers.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Default German VAT rate in percent.
pub const DEFAULT_TAX_RATE: u8 = 19;

/// One row of the normalized line-item table.
///
/// Every field is always set; absent values are `None` rather than a magic string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// Customer purchase order reference.
    pub order_reference: Option<String>,

    /// Invoice (or order confirmation) number, repeated on every row.
    pub invoice_identifier: String,

    /// Supplier order, AB or delivery note number.
    pub vendor_order_reference: Option<String>,

    /// Supplier name, constant per vendor.
    pub vendor_name: String,

    /// Payment due date.
    pub due_date: Option<NaiveDate>,

    /// Document date.
    pub invoice_date: Option<NaiveDate>,

    /// Customer-side article number.
    pub internal_article_number: Option<String>,

    /// Supplier article number. Only synthesized charge rows leave this empty.
    pub vendor_article_number: Option<String>,

    /// Free-text description, possibly joined from several lines.
    pub description: String,

    /// Annotation such as an EAN, commodity code or delivery date.
    pub note: Option<String>,

    /// Quantity as printed (comma decimal).
    pub quantity: Option<String>,

    /// Net unit price derived from the position total (comma decimal, 3 places).
    pub unit_price_net: Option<String>,

    /// VAT rate in percent.
    pub tax_rate_percent: u8,
}

/// Header fields shared by every row of one document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceHeader {
    /// Invoice or order confirmation number.
    pub invoice_identifier: Option<String>,
    /// Document date.
    pub invoice_date: Option<NaiveDate>,
    /// Payment due date.
    pub due_date: Option<NaiveDate>,
    /// Customer purchase order reference.
    pub order_reference: Option<String>,
    /// Supplier order reference valid for the whole document.
    pub vendor_order_reference: Option<String>,
}

/// Outcome of one parse call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedDocument {
    /// Document identifier, empty when parsing failed.
    pub invoice_identifier: String,
    /// Line items in document order.
    pub items: Vec<LineItem>,
}

impl ParsedDocument {
    /// The result handed back when a document could not be parsed.
    pub fn empty() -> Self {
        Self::default()
    }

    /// True when nothing usable was extracted.
    pub fn is_empty(&self) -> bool {
        self.invoice_identifier.is_empty() || self.items.is_empty()
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.items.len()
    }
}
