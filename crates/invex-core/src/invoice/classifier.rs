//! Vendor identification from the leading pages of a document.

use tracing::{debug, trace};

use crate::models::vendor::Vendor;

/// Substrings that identify one vendor in lowercased document text.
#[derive(Debug, Clone, Copy)]
pub struct VendorFingerprint {
    pub vendor: Vendor,
    pub needles: &'static [&'static str],
}

/// Built-in fingerprints in priority order.
///
/// A fingerprint whose needle contains another vendor's needle must come first:
/// "würth industrie service" letterheads also contain "würth".
pub const DEFAULT_FINGERPRINTS: &[VendorFingerprint] = &[
    VendorFingerprint {
        vendor: Vendor::WuerthIndustrie,
        needles: &["würth industrie service", "wuerth industrie service"],
    },
    VendorFingerprint {
        vendor: Vendor::Wuerth,
        needles: &["adolf würth", "würth", "wuerth"],
    },
    VendorFingerprint {
        vendor: Vendor::Klingspor,
        needles: &["klingspor"],
    },
    VendorFingerprint {
        vendor: Vendor::Pferd,
        needles: &["august rüggeberg", "pferd"],
    },
    VendorFingerprint {
        vendor: Vendor::Mirka,
        needles: &["mirka"],
    },
    VendorFingerprint {
        vendor: Vendor::Hoffmann,
        needles: &["hoffmann gmbh", "hoffmann-group", "hoffmann group"],
    },
    VendorFingerprint {
        vendor: Vendor::Rhodius,
        needles: &["rhodius"],
    },
    VendorFingerprint {
        vendor: Vendor::Sia,
        needles: &["sia abrasives"],
    },
];

/// Maps document text to the vendor that issued it.
#[derive(Debug, Clone)]
pub struct VendorClassifier {
    fingerprints: Vec<VendorFingerprint>,
}

impl VendorClassifier {
    /// Classifier with the built-in fingerprints.
    pub fn new() -> Self {
        Self::with_fingerprints(DEFAULT_FINGERPRINTS.to_vec())
    }

    /// Classifier with a custom fingerprint list, checked in the given order.
    pub fn with_fingerprints(fingerprints: Vec<VendorFingerprint>) -> Self {
        Self { fingerprints }
    }

    /// Identify the vendor of a document from its leading text.
    ///
    /// Returns `None` when no fingerprint matches.
    pub fn classify(&self, text: &str) -> Option<Vendor> {
        let haystack = text.to_lowercase();

        let vendor = self.fingerprints.iter().find_map(|fp| {
            fp.needles
                .iter()
                .find(|needle| haystack.contains(*needle))
                .map(|needle| {
                    trace!("Fingerprint '{}' matched", needle);
                    fp.vendor
                })
        });

        match vendor {
            Some(vendor) => debug!("Classified document as {}", vendor),
            None => debug!("No vendor fingerprint in {} chars of text", text.len()),
        }

        vendor
    }
}

impl Default for VendorClassifier {
    fn default() -> Self {
        Self::new()
    }
}
