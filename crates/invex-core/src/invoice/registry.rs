//! Lookup from (vendor, document type) to a parser.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use super::parsers::{
    HoffmannInvoiceParser, KlingsporInvoiceParser, KlingsporOrderConfirmationParser,
    MirkaInvoiceParser, PferdInvoiceParser, RhodiusOrderConfirmationParser, SiaInvoiceParser,
    VendorParser, WuerthIndustrieInvoiceParser, WuerthInvoiceParser,
};
use crate::models::document::DocumentType;
use crate::models::vendor::Vendor;

/// Read-only table of parsers, built once and shared.
#[derive(Clone, Default)]
pub struct ParserRegistry {
    parsers: HashMap<(Vendor, DocumentType), Arc<dyn VendorParser>>,
}

impl ParserRegistry {
    /// Registry with no parsers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in parser.
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry.register(KlingsporInvoiceParser);
        registry.register(KlingsporOrderConfirmationParser);
        registry.register(PferdInvoiceParser);
        registry.register(MirkaInvoiceParser);
        registry.register(WuerthInvoiceParser);
        registry.register(WuerthIndustrieInvoiceParser);
        registry.register(HoffmannInvoiceParser);
        registry.register(RhodiusOrderConfirmationParser);
        registry.register(SiaInvoiceParser);
        registry
    }

    /// Add a parser under its own vendor and document type, replacing any previous one.
    pub fn register<P: VendorParser + 'static>(&mut self, parser: P) {
        let key = (parser.vendor(), parser.document_type());
        debug!("Registering {} {} parser", key.0, key.1);
        self.parsers.insert(key, Arc::new(parser));
    }

    /// Parser for a vendor and document type, if one exists.
    pub fn resolve(&self, vendor: Vendor, document_type: DocumentType) -> Option<Arc<dyn VendorParser>> {
        self.parsers.get(&(vendor, document_type)).cloned()
    }

    /// Registered (vendor, document type) pairs in a stable order.
    pub fn keys(&self) -> Vec<(Vendor, DocumentType)> {
        let mut keys: Vec<_> = self.parsers.keys().copied().collect();
        keys.sort();
        keys
    }

    pub fn len(&self) -> usize {
        self.parsers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parsers.is_empty()
    }
}

impl std::fmt::Debug for ParserRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParserRegistry").field("parsers", &self.keys()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_standard_registry_has_nine_parsers() {
        let registry = ParserRegistry::standard();
        assert_eq!(registry.len(), 9);

        for (vendor, document_type) in registry.keys() {
            let parser = registry.resolve(vendor, document_type).unwrap();
            assert_eq!(parser.vendor(), vendor);
            assert_eq!(parser.document_type(), document_type);
        }
    }

    #[test]
    fn test_resolve_absent_pair() {
        let registry = ParserRegistry::standard();

        assert!(registry.resolve(Vendor::Rhodius, DocumentType::Invoice).is_none());
        assert!(registry.resolve(Vendor::Sia, DocumentType::OrderConfirmation).is_none());
        assert!(registry.resolve(Vendor::Klingspor, DocumentType::OrderConfirmation).is_some());
    }

    #[test]
    fn test_resolved_parsers_are_shared() {
        let registry = ParserRegistry::standard();
        let a = registry.resolve(Vendor::Mirka, DocumentType::Invoice).unwrap();
        let b = registry.resolve(Vendor::Mirka, DocumentType::Invoice).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_empty_registry() {
        let registry = ParserRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.resolve(Vendor::Klingspor, DocumentType::Invoice).is_none());
    }
}
