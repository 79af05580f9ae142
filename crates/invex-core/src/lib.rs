//! Core library for supplier invoice line-item extraction.
//!
//! This crate provides:
//! - PDF text extraction
//! - Vendor classification from letterhead fingerprints
//! - One parser per vendor layout, producing a normalized line-item table
//! - CSV persistence and archival of processed documents

pub mod archive;
pub mod error;
pub mod fallback;
pub mod invoice;
pub mod models;
pub mod output;
pub mod pdf;
pub mod pipeline;

pub use error::{ExtractionError, InvexError, Result};
pub use invoice::classifier::VendorClassifier;
pub use invoice::registry::ParserRegistry;
pub use invoice::VendorParser;
pub use models::config::InvexConfig;
pub use models::document::DocumentType;
pub use models::invoice::{InvoiceHeader, LineItem, ParsedDocument};
pub use models::vendor::Vendor;
pub use pdf::{PdfExtractor, PdfProcessor};
pub use pipeline::{DocumentPipeline, ProcessedDocument};
