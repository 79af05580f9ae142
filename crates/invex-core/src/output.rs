//! CSV persistence of line-item tables.
//!
//! Absent values are written as the configured sentinel (`N/A` by default). Each
//! document gets its own file; successful documents are also appended to one aggregate
//! file shared by a whole batch run.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, NaiveDate};
use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::error::{InvexError, Result};
use crate::invoice::rules::parse_german_decimal;
use crate::models::config::InvexConfig;
use crate::models::invoice::{LineItem, ParsedDocument};

/// Column names, in output order.
pub const COLUMNS: [&str; 13] = [
    "orderReference",
    "invoiceIdentifier",
    "vendorOrderReference",
    "vendorName",
    "dueDate",
    "invoiceDate",
    "internalArticleNumber",
    "vendorArticleNumber",
    "description",
    "note",
    "quantity",
    "unitPriceNet",
    "taxRatePercent",
];

/// How rows are rendered into CSV.
#[derive(Debug, Clone)]
pub struct CsvLayout {
    delimiter: u8,
    missing_value: String,
    date_format: String,
    timestamp_format: String,
}

impl CsvLayout {
    /// Layout from the `output` and `extraction` config sections.
    ///
    /// The configuration is validated first, so rendering with the layout cannot fail on
    /// a bad delimiter or date format.
    pub fn from_config(config: &InvexConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            delimiter: config.output.delimiter as u8,
            missing_value: config.output.missing_value.clone(),
            date_format: config.extraction.date_format.clone(),
            timestamp_format: config.output.timestamp_format.clone(),
        })
    }

    /// Timestamp as embedded in output and archive file names.
    pub fn timestamp(&self, at: DateTime<Local>) -> String {
        at.format(&self.timestamp_format).to_string()
    }

    /// One row as CSV fields.
    pub fn record(&self, item: &LineItem) -> Vec<String> {
        let text = |value: &Option<String>| {
            value.clone().unwrap_or_else(|| self.missing_value.clone())
        };
        let date = |value: &Option<NaiveDate>| {
            value
                .map(|d| d.format(&self.date_format).to_string())
                .unwrap_or_else(|| self.missing_value.clone())
        };

        vec![
            text(&item.order_reference),
            item.invoice_identifier.clone(),
            text(&item.vendor_order_reference),
            item.vendor_name.clone(),
            date(&item.due_date),
            date(&item.invoice_date),
            text(&item.internal_article_number),
            text(&item.vendor_article_number),
            item.description.clone(),
            text(&item.note),
            text(&item.quantity),
            text(&item.unit_price_net),
            item.tax_rate_percent.to_string(),
        ]
    }

    /// Write rows, optionally preceded by the header line.
    pub fn write_rows<W: Write>(&self, writer: W, items: &[LineItem], with_header: bool) -> Result<()> {
        let mut wtr = csv::WriterBuilder::new()
            .delimiter(self.delimiter)
            .from_writer(writer);

        if with_header {
            wtr.write_record(COLUMNS)?;
        }
        for item in items {
            wtr.write_record(self.record(item))?;
        }
        wtr.flush()?;
        Ok(())
    }

    /// Render rows with header into a string.
    pub fn to_csv_string(&self, items: &[LineItem]) -> Result<String> {
        let mut buf = Vec::new();
        self.write_rows(&mut buf, items, true)?;
        String::from_utf8(buf).map_err(|e| InvexError::Config(format!("non UTF-8 CSV output: {}", e)))
    }
}

/// Replace characters that are unsafe in file names.
pub(crate) fn file_safe(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

fn persistence_error(path: &Path, reason: impl ToString) -> InvexError {
    InvexError::Persistence {
        path: path.display().to_string(),
        reason: reason.to_string(),
    }
}

/// Write one document to `<dir>/<identifier>_<timestamp>.csv`.
pub fn write_document_csv(
    dir: &Path,
    document: &ParsedDocument,
    layout: &CsvLayout,
    timestamp: &str,
) -> Result<PathBuf> {
    let path = dir.join(format!(
        "{}_{}.csv",
        file_safe(&document.invoice_identifier),
        timestamp
    ));

    fs::create_dir_all(dir).map_err(|e| persistence_error(dir, e))?;
    let file = fs::File::create(&path).map_err(|e| persistence_error(&path, e))?;
    layout
        .write_rows(file, &document.items, true)
        .map_err(|e| persistence_error(&path, e))?;

    debug!("Wrote {} rows to {}", document.len(), path.display());
    Ok(path)
}

/// Appends documents to one CSV file, writing the header when the file is new.
#[derive(Debug, Clone)]
pub struct AggregateWriter {
    path: PathBuf,
    layout: CsvLayout,
}

impl AggregateWriter {
    pub fn new(path: impl Into<PathBuf>, layout: CsvLayout) -> Self {
        Self {
            path: path.into(),
            layout,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append the rows of one document.
    pub fn append(&self, document: &ParsedDocument) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| persistence_error(parent, e))?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| persistence_error(&self.path, e))?;
        let is_new = file
            .metadata()
            .map_err(|e| persistence_error(&self.path, e))?
            .len()
            == 0;

        self.layout
            .write_rows(file, &document.items, is_new)
            .map_err(|e| persistence_error(&self.path, e))?;

        debug!(
            "Appended {} rows of {} to {}",
            document.len(),
            document.invoice_identifier,
            self.path.display()
        );
        Ok(())
    }
}

/// Net amount over a set of rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AmountSummary {
    /// Sum of quantity times unit price over the rows that could be read.
    pub total_net: Decimal,
    /// Rows included in the total.
    pub counted: usize,
    /// Rows without a usable quantity or unit price.
    pub skipped: usize,
}

/// Sum quantity times unit price. Rows that cannot be read are skipped with a warning.
pub fn summarize_amounts(items: &[LineItem]) -> AmountSummary {
    let mut summary = AmountSummary::default();

    for (index, item) in items.iter().enumerate() {
        let quantity = item.quantity.as_deref().and_then(parse_german_decimal);
        let price = item.unit_price_net.as_deref().and_then(parse_german_decimal);

        match quantity.zip(price) {
            Some((quantity, price)) => {
                summary.total_net += quantity * price;
                summary.counted += 1;
            }
            None => {
                warn!(
                    "Skipping row {} of {} in amount total: quantity {:?}, unit price {:?}",
                    index + 1,
                    item.invoice_identifier,
                    item.quantity,
                    item.unit_price_net
                );
                summary.skipped += 1;
            }
        }
    }

    summary
}
