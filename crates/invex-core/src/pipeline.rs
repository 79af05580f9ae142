//! Classification and dispatch of one document to its vendor parser.

use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::ExtractionError;
use crate::invoice::classifier::VendorClassifier;
use crate::invoice::registry::ParserRegistry;
use crate::models::config::ExtractionConfig;
use crate::models::document::DocumentType;
use crate::models::invoice::ParsedDocument;
use crate::models::vendor::Vendor;
use crate::pdf::{PdfExtractor, PdfProcessor};

/// A document that was classified and parsed into at least one row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessedDocument {
    /// Vendor identified from the leading pages.
    pub vendor: Vendor,
    /// Document type the parser was chosen for.
    pub document_type: DocumentType,
    /// Parsed rows and identifier.
    pub document: ParsedDocument,
    /// Time spent classifying and parsing, in milliseconds.
    pub processing_time_ms: u64,
}

/// Text-to-rows pipeline: classifier, registry and parser.
#[derive(Debug, Clone)]
pub struct DocumentPipeline {
    classifier: VendorClassifier,
    registry: ParserRegistry,
    classify_pages: usize,
}

impl DocumentPipeline {
    /// Pipeline with the built-in fingerprints and parsers.
    pub fn new(config: &ExtractionConfig) -> Self {
        Self {
            classifier: VendorClassifier::new(),
            registry: ParserRegistry::standard(),
            classify_pages: config.classify_pages.max(1) as usize,
        }
    }

    /// Replace the classifier.
    pub fn with_classifier(mut self, classifier: VendorClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    /// Replace the parser registry.
    pub fn with_registry(mut self, registry: ParserRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn registry(&self) -> &ParserRegistry {
        &self.registry
    }

    /// Process a PDF held in memory.
    pub fn process_pdf(&self, data: &[u8], document_type: DocumentType) -> crate::Result<ProcessedDocument> {
        let extractor = PdfExtractor::from_bytes(data)?;
        let pages = extractor.extract_pages()?;
        debug!("PDF has {} pages", extractor.page_count());
        Ok(self.process_pages(&pages, document_type)?)
    }

    /// Process the text of a whole document.
    pub fn process_text(
        &self,
        text: &str,
        document_type: DocumentType,
    ) -> Result<ProcessedDocument, ExtractionError> {
        self.process_pages(&[text], document_type)
    }

    /// Process page-segmented text. Only the leading pages are used for classification.
    pub fn process_pages<S: AsRef<str>>(
        &self,
        pages: &[S],
        document_type: DocumentType,
    ) -> Result<ProcessedDocument, ExtractionError> {
        let start = Instant::now();

        let full_text = join_pages(pages.iter());
        if full_text.trim().is_empty() {
            return Err(ExtractionError::NoText);
        }

        let leading_text = join_pages(pages.iter().take(self.classify_pages));
        let vendor = self
            .classifier
            .classify(&leading_text)
            .ok_or(ExtractionError::VendorNotIdentified)?;

        let parser = self
            .registry
            .resolve(vendor, document_type)
            .ok_or(ExtractionError::NoParserRegistered {
                vendor,
                document_type,
            })?;

        let document = parser.parse(&full_text);
        if document.is_empty() {
            warn!("{} {} produced no rows", vendor, document_type);
            return Err(ExtractionError::ParseFailure {
                vendor,
                reason: "no line items extracted".to_string(),
            });
        }

        let processing_time_ms = start.elapsed().as_millis() as u64;
        info!(
            "Parsed {} {} {}: {} rows in {}ms",
            vendor,
            document_type,
            document.invoice_identifier,
            document.len(),
            processing_time_ms
        );

        Ok(ProcessedDocument {
            vendor,
            document_type,
            document,
            processing_time_ms,
        })
    }
}

impl Default for DocumentPipeline {
    fn default() -> Self {
        Self::new(&ExtractionConfig::default())
    }
}

fn join_pages<'a, S: AsRef<str> + 'a>(pages: impl Iterator<Item = &'a S>) -> String {
    pages.map(AsRef::as_ref).collect::<Vec<_>>().join("\n")
}
