use async_trait::async_trait;
use lopdf::Document;

use crate::domain::{ports::TextExtractor, DomainError};

const PDF_MAGIC: &[u8] = b"%PDF-";

/// Page-by-page PDF text extraction backed by `lopdf`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfTextExtractor;

impl PdfTextExtractor {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl TextExtractor for PdfTextExtractor {
    async fn extract(&self, bytes: &[u8]) -> Result<String, DomainError> {
        let data = bytes.to_vec();

        // lopdf can panic on hostile input; a panic surfaces as a JoinError here.
        tokio::task::spawn_blocking(move || extract_pages(&data))
            .await
            .map_err(|e| DomainError::extraction(format!("PDF parser crashed: {e}")))?
    }
}

/// Concatenates the text of every page that has any, each followed by a
/// newline. Any failure discards the pages already read.
pub fn extract_pages(bytes: &[u8]) -> Result<String, DomainError> {
    if !bytes.starts_with(PDF_MAGIC) {
        return Err(DomainError::extraction("file is not a PDF document"));
    }

    let doc = Document::load_mem(bytes).map_err(|e| DomainError::extraction(e.to_string()))?;

    if doc.is_encrypted() {
        return Err(DomainError::extraction(
            "file has not been decrypted (password-protected PDF)",
        ));
    }

    doc.catalog()
        .map_err(|e| DomainError::extraction(format!("missing document catalog: {e}")))?;

    let pages = doc.get_pages();
    let mut text = String::new();
    let mut skipped = 0usize;

    for page_number in pages.keys() {
        let page_text = doc
            .extract_text(&[*page_number])
            .map_err(|e| DomainError::extraction(format!("page {page_number}: {e}")))?;

        if page_text.trim().is_empty() {
            skipped += 1;
            continue;
        }

        text.push_str(&page_text);
        text.push('\n');
    }

    tracing::debug!(
        pages = pages.len(),
        skipped,
        chars = text.len(),
        "extracted PDF text"
    );

    Ok(text)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Object, Stream};

    /// Builds a PDF with one page per entry; an empty entry yields a page
    /// without any text operators.
    pub(crate) fn build_pdf(pages: &[&str]) -> Vec<u8> {
        save(build_document(pages))
    }

    /// Same layout as [`build_pdf`] but with a standard security handler
    /// entry in the trailer, so opening it needs a password.
    pub(crate) fn build_encrypted_pdf(pages: &[&str]) -> Vec<u8> {
        let mut doc = build_document(pages);
        let encrypt_id = doc.add_object(dictionary! {
            "Filter" => "Standard",
            "V" => 1,
            "R" => 2,
            "Length" => 40,
            "O" => Object::string_literal(vec![0x5au8; 32]),
            "U" => Object::string_literal(vec![0xa5u8; 32]),
            "P" => -4,
        });
        doc.trailer.set("Encrypt", encrypt_id);
        save(doc)
    }

    fn build_document(pages: &[&str]) -> Document {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! {
                "F1" => font_id,
            },
        });

        let mut kids: Vec<Object> = Vec::new();
        for page_text in pages {
            let operations = if page_text.is_empty() {
                Vec::new()
            } else {
                vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec!["F1".into(), 12.into()]),
                    Operation::new("Td", vec![72.into(), 712.into()]),
                    Operation::new("Tj", vec![Object::string_literal(*page_text)]),
                    Operation::new("ET", vec![]),
                ]
            };
            let content = Content { operations };
            let content_id = doc.add_object(Stream::new(
                dictionary! {},
                content.encode().expect("content encodes"),
            ));
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
        doc
    }

    fn save(mut doc: Document) -> Vec<u8> {
        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).expect("pdf saves");
        bytes
    }

    #[test]
    fn test_extracts_pages_in_order() {
        let bytes = build_pdf(&["Hello world", "Second page"]);
        let text = extract_pages(&bytes).unwrap();

        let words: Vec<&str> = text.split_whitespace().collect();
        assert_eq!(words, vec!["Hello", "world", "Second", "page"]);
        assert!(text.ends_with('\n'));
    }

    #[test]
    fn test_skips_pages_without_text() {
        let bytes = build_pdf(&["Only", "", "text"]);
        let text = extract_pages(&bytes).unwrap();

        assert_eq!(text.split_whitespace().collect::<Vec<_>>(), vec!["Only", "text"]);
        assert_eq!(text.matches('\n').count(), text.lines().count());
    }

    #[test]
    fn test_no_text_at_all_is_empty() {
        let bytes = build_pdf(&["", ""]);
        assert_eq!(extract_pages(&bytes).unwrap(), "");
    }

    #[test]
    fn test_rejects_password_protected_pdf() {
        let bytes = build_encrypted_pdf(&["top secret"]);
        let err = extract_pages(&bytes).unwrap_err();
        assert!(matches!(err, DomainError::Extraction(_)));
    }

    #[test]
    fn test_rejects_non_pdf() {
        let err = extract_pages(b"just some text").unwrap_err();
        assert!(matches!(err, DomainError::Extraction(_)));
    }

    #[tokio::test]
    async fn test_extractor_runs_off_thread() {
        let extractor = PdfTextExtractor::new();
        let text = extractor.extract(&build_pdf(&["async page"])).await.unwrap();
        assert!(text.contains("async"));
    }

    #[tokio::test]
    async fn test_extractor_reports_garbage() {
        let extractor = PdfTextExtractor::new();
        let result = extractor.extract(b"%PDF-1.4\n%%garbage\x00\x01").await;
        assert!(matches!(result, Err(DomainError::Extraction(_))));
    }
}
