//! Scanning state shared by the vendor parsers.
//!
//! Every vendor layout is read the same way:
//!
//! 1. Header fields (identifier, dates, order references) are read from labelled lines
//!    into a [`DocumentContext`] before the table is touched.
//! 2. The text is walked once, line by line. A [`PageResync`] hides everything up to the
//!    table header, and everything between a page footer and the repeated header.
//! 3. A line whose marker token equals `last_position + 1` opens a row. Lines after it
//!    extend the open row's description until the next row or a vendor terminator.
//! 4. Trailing charges (order surcharge, freight) are appended as synthesized rows.
//!
//! A row becomes a [`LineItem`] the moment the next row opens or the scan ends, so the
//! table is always a sequence of complete records.

use chrono::NaiveDate;

use crate::error::ExtractionError;
use crate::invoice::Result;
use crate::invoice::rules::{
    add_payment_term, is_german_number, strip_label, unit_price, PAGE_FOOTER,
};
use crate::models::invoice::{InvoiceHeader, LineItem, ParsedDocument};
use crate::models::vendor::Vendor;

/// Header values copied onto every row of a document.
#[derive(Debug, Clone)]
pub struct DocumentContext {
    /// Vendor the document belongs to.
    pub vendor: Vendor,
    /// Header values read from labelled lines.
    pub header: InvoiceHeader,
    /// VAT rate applied to every row.
    pub tax_rate_percent: u8,
}

impl DocumentContext {
    pub fn new(vendor: Vendor, header: InvoiceHeader, tax_rate_percent: u8) -> Self {
        Self {
            vendor,
            header,
            tax_rate_percent,
        }
    }

    /// Derive the due date from the invoice date unless one was printed.
    pub fn with_payment_term(mut self, term_days: u32) -> Self {
        if self.header.due_date.is_none() {
            self.header.due_date = self
                .header
                .invoice_date
                .and_then(|date| add_payment_term(date, term_days));
        }
        self
    }

    /// Error describing a layout problem in this document.
    pub fn malformed(&self, reason: impl Into<String>) -> ExtractionError {
        ExtractionError::ParseFailure {
            vendor: self.vendor,
            reason: reason.into(),
        }
    }
}

/// A row whose description may still grow.
#[derive(Debug, Clone, Default)]
pub struct PendingRow {
    pub position: u32,
    pub vendor_article_number: Option<String>,
    pub internal_article_number: Option<String>,
    pub note: Option<String>,
    pub quantity: Option<String>,
    /// Printed position total, before division by quantity.
    pub total: Option<String>,
    pub order_reference: Option<String>,
    pub vendor_order_reference: Option<String>,
    description: Vec<String>,
    description_closed: bool,
}

impl PendingRow {
    fn new(position: u32) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    /// Append a description fragment. Ignored once the description is closed.
    pub fn push_description(&mut self, text: &str) {
        let text = text.trim();
        if !text.is_empty() && !self.description_closed {
            self.description.push(text.to_string());
        }
    }

    /// Stop collecting description lines for this row.
    pub fn close_description(&mut self) {
        self.description_closed = true;
    }

    pub fn is_description_closed(&self) -> bool {
        self.description_closed
    }

    /// Append to the note, separating fragments with a space.
    pub fn push_note(&mut self, text: &str) {
        let text = text.trim();
        if text.is_empty() {
            return;
        }
        match &mut self.note {
            Some(note) => {
                note.push(' ');
                note.push_str(text);
            }
            None => self.note = Some(text.to_string()),
        }
    }

    fn finish(self, ctx: &DocumentContext) -> LineItem {
        let unit_price_net = unit_price(self.total.as_deref(), self.quantity.as_deref());
        LineItem {
            order_reference: self.order_reference.or_else(|| ctx.header.order_reference.clone()),
            invoice_identifier: ctx.header.invoice_identifier.clone().unwrap_or_default(),
            vendor_order_reference: self
                .vendor_order_reference
                .or_else(|| ctx.header.vendor_order_reference.clone()),
            vendor_name: ctx.vendor.display_name().to_string(),
            due_date: ctx.header.due_date,
            invoice_date: ctx.header.invoice_date,
            internal_article_number: self.internal_article_number,
            vendor_article_number: self.vendor_article_number,
            description: self.description.join(" "),
            note: self.note,
            quantity: self.quantity,
            unit_price_net,
            tax_rate_percent: ctx.tax_rate_percent,
        }
    }
}

/// Rows of one document, built in order.
#[derive(Debug)]
pub struct RowTable<'c> {
    ctx: &'c DocumentContext,
    rows: Vec<LineItem>,
    open: Option<PendingRow>,
    last_position: u32,
}

impl<'c> RowTable<'c> {
    pub fn new(ctx: &'c DocumentContext) -> Self {
        Self {
            ctx,
            rows: Vec::new(),
            open: None,
            last_position: 0,
        }
    }

    /// Position of the most recently opened row, 0 before the first.
    pub fn last_position(&self) -> u32 {
        self.last_position
    }

    /// True if `token` is the next position number.
    pub fn is_next_position(&self, token: &str) -> bool {
        token.parse::<u32>().is_ok_and(|n| n == self.last_position + 1)
    }

    /// Complete the open row (if any) and open the next one.
    pub fn open_row(&mut self) -> &mut PendingRow {
        self.close_row();
        self.last_position += 1;
        self.open.insert(PendingRow::new(self.last_position))
    }

    /// The row currently collecting continuation lines.
    pub fn current(&mut self) -> Option<&mut PendingRow> {
        self.open.as_mut()
    }

    /// Complete the open row now.
    pub fn close_row(&mut self) {
        if let Some(row) = self.open.take() {
            self.rows.push(row.finish(self.ctx));
        }
    }

    /// Append a synthesized charge row (surcharge, freight) with quantity 1.
    pub fn push_charge(&mut self, description: &str, total: &str) {
        self.close_row();
        let mut row = PendingRow::new(0);
        row.push_description(description);
        row.quantity = Some("1".to_string());
        row.total = Some(total.to_string());
        self.rows.push(row.finish(self.ctx));
    }

    /// Number of rows so far, counting the open row.
    pub fn len(&self) -> usize {
        self.rows.len() + usize::from(self.open.is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Complete the table. A document without identifier or rows is a parse failure.
    pub fn into_document(mut self) -> Result<ParsedDocument> {
        self.close_row();

        let invoice_identifier = self
            .ctx
            .header
            .invoice_identifier
            .clone()
            .ok_or_else(|| self.ctx.malformed("document identifier not found"))?;

        if self.rows.is_empty() {
            return Err(self.ctx.malformed("no line items found"));
        }

        Ok(ParsedDocument {
            invoice_identifier,
            items: self.rows,
        })
    }
}

/// Hides page furniture around the item table.
///
/// Scanning starts suspended and resumes after the table header. A page footer suspends
/// it again until the header repeats on the next page; an open row stays open across
/// the gap. Footer lines printed directly under a repeated header (the carried-forward
/// `Übertrag` of the previous page) are skipped without suspending.
#[derive(Debug, Clone)]
pub struct PageResync<'a> {
    table_header: &'a str,
    footers: &'a [&'a str],
    suspended: bool,
    after_header: bool,
}

impl<'a> PageResync<'a> {
    pub fn new(table_header: &'a str, footers: &'a [&'a str]) -> Self {
        Self {
            table_header,
            footers,
            suspended: true,
            after_header: false,
        }
    }

    /// True if the line is outside the table and must not be scanned.
    pub fn skip(&mut self, line: &str) -> bool {
        if self.suspended {
            if strip_label(line, self.table_header).is_some() {
                self.suspended = false;
                self.after_header = true;
            }
            return true;
        }

        let is_footer = PAGE_FOOTER.is_match(line)
            || self.footers.iter().any(|f| strip_label(line, f).is_some());
        if !is_footer {
            self.after_header = false;
        } else if !self.after_header {
            self.suspended = true;
        }
        is_footer
    }

    /// True once the table header has been seen and no footer is pending.
    pub fn in_table(&self) -> bool {
        !self.suspended
    }
}

/// Amount of the first `<label> ... <amount>` line that ends in a number.
///
/// Lines such as `Fracht: frei` carry the label but no charge.
pub fn charge_amount<'a>(lines: &[&'a str], label: &str) -> Option<&'a str> {
    lines
        .iter()
        .filter_map(|&line| strip_label(line, label))
        .filter_map(|rest| rest.split_whitespace().last())
        .find(|amount| is_german_number(amount))
}

/// Note text for a confirmed delivery date.
pub fn delivery_note(date: NaiveDate) -> String {
    format!("Liefertermin {}", date.format("%d.%m.%Y"))
}

/// Whitespace-separated tokens of a line.
pub fn tokens(line: &str) -> Vec<&str> {
    line.split_whitespace().collect()
}

/// Token `n` positions from the end (0 = last).
pub fn nth_back<'a>(tokens: &[&'a str], n: usize) -> Option<&'a str> {
    tokens.len().checked_sub(n + 1).map(|i| tokens[i])
}

/// Tokens `start..len - back` joined with spaces, empty if the range is empty.
pub fn join_between(tokens: &[&str], start: usize, back: usize) -> String {
    let end = tokens.len().saturating_sub(back);
    if start >= end {
        return String::new();
    }
    tokens[start..end].join(" ")
}
