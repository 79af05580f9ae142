//! Supplier line-item extraction module.

pub mod classifier;
pub mod parsers;
pub mod registry;
pub mod rules;

pub use classifier::{VendorClassifier, VendorFingerprint};
pub use parsers::VendorParser;
pub use registry::ParserRegistry;

use crate::error::ExtractionError;

/// Result type for extraction operations.
pub type Result<T> = std::result::Result<T, ExtractionError>;
