mod pdf;

pub use pdf::{extract_pages, PdfTextExtractor};

#[cfg(test)]
pub(crate) use pdf::tests::{build_encrypted_pdf, build_pdf};
