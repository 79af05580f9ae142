//! Vendor-specific line-item parsers.
//!
//! Each supplier layout gets one [`VendorParser`] implementation. Parsers hold no state
//! and are shared between documents through the registry.

mod hoffmann;
mod klingspor;
mod mirka;
mod pferd;
mod rhodius;
mod sia;
pub mod table;
mod wuerth;
mod wuerth_industrie;

pub use hoffmann::HoffmannInvoiceParser;
pub use klingspor::{KlingsporInvoiceParser, KlingsporOrderConfirmationParser};
pub use mirka::MirkaInvoiceParser;
pub use pferd::PferdInvoiceParser;
pub use rhodius::RhodiusOrderConfirmationParser;
pub use sia::SiaInvoiceParser;
pub use wuerth::WuerthInvoiceParser;
pub use wuerth_industrie::WuerthIndustrieInvoiceParser;

use std::panic::{self, AssertUnwindSafe};

use tracing::{debug, error, warn};

use super::Result;
use crate::models::document::DocumentType;
use crate::models::invoice::ParsedDocument;
use crate::models::vendor::Vendor;

/// A parser for one vendor's document layout.
pub trait VendorParser: Send + Sync {
    /// Vendor whose layout this parser reads.
    fn vendor(&self) -> Vendor;

    /// Document type this parser reads.
    fn document_type(&self) -> DocumentType;

    /// Scan the full document text. Errors describe why the layout did not fit.
    fn extract(&self, text: &str) -> Result<ParsedDocument>;

    /// Scan the full document text, returning an empty document on any failure.
    ///
    /// Errors and panics raised while scanning stay inside this call so that one
    /// malformed document never stops a batch.
    fn parse(&self, text: &str) -> ParsedDocument {
        let vendor = self.vendor();
        let document_type = self.document_type();

        match panic::catch_unwind(AssertUnwindSafe(|| self.extract(text))) {
            Ok(Ok(document)) => {
                debug!(
                    "{} {} parser extracted {} rows for {}",
                    vendor,
                    document_type,
                    document.len(),
                    document.invoice_identifier
                );
                document
            }
            Ok(Err(e)) => {
                warn!("{} {} parser gave up: {}", vendor, document_type, e);
                ParsedDocument::empty()
            }
            Err(_) => {
                error!("{} {} parser panicked on unexpected layout", vendor, document_type);
                ParsedDocument::empty()
            }
        }
    }
}

/// Split text into trimmed lines.
pub(crate) fn lines(text: &str) -> Vec<&str> {
    text.lines().map(str::trim).collect()
}
