//! Error types for the invex-core library.

use thiserror::Error;

use crate::models::document::DocumentType;
use crate::models::vendor::Vendor;

/// Main error type for the invex library.
#[derive(Error, Debug)]
pub enum InvexError {
    /// PDF processing error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// Line-item extraction error.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// Output file could not be written.
    #[error("failed to write {path}: {reason}")]
    Persistence { path: String, reason: String },

    /// CSV serialization error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to PDF processing.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract text from PDF.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,

    /// Invalid page number requested.
    #[error("invalid page number: {0}")]
    InvalidPage(u32),
}

/// Errors related to line-item extraction.
///
/// None of these abort a batch; each one is scoped to a single document.
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// No vendor fingerprint matched the leading pages.
    #[error("vendor could not be identified")]
    VendorNotIdentified,

    /// The vendor is known but has no parser for the requested document type.
    #[error("no {document_type} parser registered for vendor {vendor}")]
    NoParserRegistered {
        vendor: Vendor,
        document_type: DocumentType,
    },

    /// Line scanning failed on an unexpected layout.
    #[error("{vendor} parser failed: {reason}")]
    ParseFailure { vendor: Vendor, reason: String },

    /// Text extraction produced nothing to scan.
    #[error("no text found in document")]
    NoText,
}

/// Document type string not recognised on the command line or in config.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown document type: {0} (expected `invoice` or `orderConfirmation`)")]
pub struct UnknownDocumentType(pub String);

/// Result type for the invex library.
pub type Result<T> = std::result::Result<T, InvexError>;
