//! Seam for an external (LLM based) extractor.
//!
//! The heuristic parsers never call this. The surrounding application may use it when no
//! parser matches a document or a second opinion is wanted, configured through
//! [`FallbackConfig`].

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::models::config::FallbackConfig;
use crate::models::vendor::Vendor;

/// Hints that help the fallback tell similar documents apart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FallbackContext {
    /// Sender address of the mail the document arrived with.
    pub sender: Option<String>,
    /// Subject of that mail.
    pub subject: Option<String>,
    /// Beginning of the mail body.
    pub body_excerpt: Option<String>,
}

/// Document-level metadata returned by a fallback extractor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FallbackResult {
    pub vendor: Option<Vendor>,
    pub invoice_identifier: Option<String>,
    pub invoice_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub order_reference: Option<String>,
    pub vendor_order_reference: Option<String>,
    /// Extractor's own confidence in the result, 0.0 to 1.0.
    pub confidence: f32,
}

impl FallbackResult {
    /// True if the result meets the configured confidence threshold.
    pub fn is_accepted(&self, config: &FallbackConfig) -> bool {
        let accepted = self.confidence >= config.min_confidence;
        debug!(
            "Fallback confidence {:.2} (threshold {:.2}): {}",
            self.confidence,
            config.min_confidence,
            if accepted { "accepted" } else { "rejected" }
        );
        accepted
    }
}

/// An extractor that reads invoice metadata from a whole document.
pub trait FallbackExtractor: Send + Sync {
    /// Extract metadata from raw document bytes.
    fn extract(&self, document: &[u8], context: &FallbackContext) -> Result<FallbackResult>;
}
