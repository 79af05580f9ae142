//! PDF text extraction using lopdf and pdf-extract.

use std::panic::{self, AssertUnwindSafe};

use lopdf::Document;
use tracing::{debug, trace, warn};

use super::{PdfProcessor, Result};
use crate::error::PdfError;

/// PDF text extractor.
///
/// lopdf validates the file and removes empty-password encryption; pdf-extract
/// produces the page text in reading order.
pub struct PdfExtractor {
    page_count: u32,
    raw_data: Vec<u8>,
}

/// Extracted content from a PDF.
#[derive(Debug, Clone)]
pub struct PdfContent {
    /// Text of all pages joined with a newline.
    pub text: String,
    /// Pages with their content.
    pub pages: Vec<PdfPage>,
}

/// Content from a single PDF page.
#[derive(Debug, Clone)]
pub struct PdfPage {
    /// Page number (1-indexed).
    pub number: u32,
    /// Extracted text from this page.
    pub text: String,
}

impl PdfExtractor {
    /// Create an extractor with no document loaded.
    pub fn new() -> Self {
        Self {
            page_count: 0,
            raw_data: Vec::new(),
        }
    }

    /// Create an extractor and load `data` into it.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let mut extractor = Self::new();
        extractor.load(data)?;
        Ok(extractor)
    }

    /// Extract the text of every page.
    pub fn extract_all(&self) -> Result<PdfContent> {
        let pages: Vec<PdfPage> = self
            .extract_pages()?
            .into_iter()
            .zip(1..)
            .map(|(text, number)| PdfPage { number, text })
            .collect();

        let text = pages
            .iter()
            .map(|page| page.text.as_str())
            .collect::<Vec<_>>()
            .join("\n");

        debug!("Extracted {} chars from {} pages", text.len(), pages.len());

        Ok(PdfContent { text, pages })
    }

    fn ensure_loaded(&self) -> Result<()> {
        if self.raw_data.is_empty() {
            return Err(PdfError::Parse("No document loaded".to_string()));
        }
        Ok(())
    }
}

impl Default for PdfExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfProcessor for PdfExtractor {
    fn load(&mut self, data: &[u8]) -> Result<()> {
        let mut doc = Document::load_mem(data).map_err(|e| PdfError::Parse(e.to_string()))?;

        // Handle PDFs with empty password encryption
        if doc.is_encrypted() {
            if doc.decrypt("").is_err() {
                return Err(PdfError::Encrypted);
            }
            debug!("Decrypted PDF with empty password");

            // pdf-extract reads the decrypted copy
            let mut decrypted_data = Vec::new();
            doc.save_to(&mut decrypted_data)
                .map_err(|e| PdfError::Parse(format!("Failed to save decrypted PDF: {}", e)))?;
            self.raw_data = decrypted_data;
        } else {
            self.raw_data = data.to_vec();
        }

        let page_count = doc.get_pages().len() as u32;
        if page_count == 0 {
            self.raw_data.clear();
            return Err(PdfError::NoPages);
        }

        debug!("Loaded PDF with {} pages", page_count);
        self.page_count = page_count;
        Ok(())
    }

    fn page_count(&self) -> u32 {
        self.page_count
    }

    fn extract_pages(&self) -> Result<Vec<String>> {
        self.ensure_loaded()?;

        // pdf-extract panics on some malformed content streams
        let pages = match panic::catch_unwind(AssertUnwindSafe(|| {
            pdf_extract::extract_text_from_mem_by_pages(&self.raw_data)
        })) {
            Ok(Ok(pages)) => pages,
            Ok(Err(e)) => return Err(PdfError::TextExtraction(e.to_string())),
            Err(_) => {
                warn!("pdf-extract panicked on a {} byte document", self.raw_data.len());
                return Err(PdfError::TextExtraction(
                    "extraction panicked (malformed PDF)".to_string(),
                ));
            }
        };

        trace!(
            "Page text lengths: {:?}",
            pages.iter().map(String::len).collect::<Vec<_>>()
        );
        Ok(pages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Object, Stream};
    use pretty_assertions::assert_eq;

    /// Build a minimal text PDF with one page per entry.
    fn text_pdf(pages: &[&str]) -> Vec<u8> {
        build_pdf(
            pages
                .iter()
                .map(|text| {
                    vec![
                        Operation::new("BT", vec![]),
                        Operation::new("Tf", vec!["F1".into(), 12.into()]),
                        Operation::new("Td", vec![72.into(), 720.into()]),
                        Operation::new("Tj", vec![Object::string_literal(*text)]),
                        Operation::new("ET", vec![]),
                    ]
                })
                .collect(),
        )
    }

    fn build_pdf(pages: Vec<Vec<Operation>>) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let mut kids: Vec<Object> = Vec::new();
        for operations in pages {
            let content = Content { operations };
            let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
                "Resources" => resources_id,
                "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut data = Vec::new();
        doc.save_to(&mut data).unwrap();
        data
    }

    #[test]
    fn test_pdf_extractor_new() {
        let extractor = PdfExtractor::new();
        assert_eq!(extractor.page_count(), 0);
        assert!(extractor.extract_pages().is_err());
    }

    #[test]
    fn test_rejects_garbage() {
        let err = PdfExtractor::from_bytes(b"definitely not a pdf").err().unwrap();
        assert!(matches!(err, PdfError::Parse(_)));
    }

    #[test]
    fn test_extracts_pages_in_order() {
        let data = text_pdf(&["KLINGSPOR", "Seite2"]);
        let extractor = PdfExtractor::from_bytes(&data).unwrap();

        assert_eq!(extractor.page_count(), 2);

        let content = extractor.extract_all().unwrap();
        assert_eq!(content.pages.len(), 2);
        assert_eq!(content.pages[1].number, 2);
        assert!(content.pages[0].text.contains("KLINGSPOR"));
        assert!(content.pages[1].text.contains("Seite2"));
        assert!(content.text.find("KLINGSPOR") < content.text.find("Seite2"));

        let leading = extractor.leading_text(1).unwrap();
        assert!(leading.contains("KLINGSPOR"));
        assert!(!leading.contains("Seite2"));
    }

    #[test]
    fn test_broken_content_stream_is_an_extraction_error() {
        // Text shown with a font that the page resources do not define
        let data = build_pdf(vec![vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F9".into(), 12.into()]),
            Operation::new("Tj", vec![Object::string_literal("Rechnung")]),
            Operation::new("ET", vec![]),
        ]]);
        let extractor = PdfExtractor::from_bytes(&data).unwrap();

        if let Err(e) = extractor.extract_pages() {
            assert!(matches!(e, PdfError::TextExtraction(_)));
        }
    }

    #[test]
    fn test_invalid_page_number() {
        let data = text_pdf(&["Rechnung"]);
        let extractor = PdfExtractor::from_bytes(&data).unwrap();

        assert!(matches!(extractor.extract_page_text(0), Err(PdfError::InvalidPage(0))));
        assert!(matches!(extractor.extract_page_text(5), Err(PdfError::InvalidPage(5))));
    }
}
