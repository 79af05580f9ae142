//! Document kinds accepted by the parser registry.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::UnknownDocumentType;

/// Kind of supplier document being processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DocumentType {
    /// Order confirmation (Auftragsbestätigung, AB).
    OrderConfirmation,
    /// Invoice (Rechnung).
    Invoice,
}

impl DocumentType {
    /// Name used on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentType::OrderConfirmation => "orderConfirmation",
            DocumentType::Invoice => "invoice",
        }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentType {
    type Err = UnknownDocumentType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "orderconfirmation" | "order-confirmation" | "order_confirmation" | "ab" => {
                Ok(DocumentType::OrderConfirmation)
            }
            "invoice" | "rechnung" => Ok(DocumentType::Invoice),
            _ => Err(UnknownDocumentType(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_type_parsing() {
        assert_eq!("invoice".parse(), Ok(DocumentType::Invoice));
        assert_eq!("orderConfirmation".parse(), Ok(DocumentType::OrderConfirmation));
        assert_eq!("AB".parse(), Ok(DocumentType::OrderConfirmation));
        assert!("credit-note".parse::<DocumentType>().is_err());
    }

    #[test]
    fn test_document_type_display() {
        assert_eq!(DocumentType::OrderConfirmation.to_string(), "orderConfirmation");
        assert_eq!(DocumentType::Invoice.to_string(), "invoice");
    }
}
