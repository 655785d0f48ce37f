//! Text extraction: PDF bytes → one flat string, page by page.
//!
//! ## Why spawn_blocking?
//!
//! `pdfium-render` wraps the pdfium C++ library, which is synchronous and
//! keeps thread-local state. Extraction therefore runs on tokio's blocking
//! pool so the async workers never stall while a large document is parsed.
//!
//! ## Page policy
//!
//! A page that yields no text (scanned image, blank page, per-page extraction
//! error) contributes nothing and is not an error. Only a document pdfium
//! cannot open at all fails the call.

use crate::error::DigestError;
use crate::pipeline::input::Document;
use async_trait::async_trait;
use pdfium_render::prelude::*;
use std::path::PathBuf;
use tracing::{debug, info};

/// Turns a PDF document into its text.
#[async_trait]
pub trait TextExtractor: Send + Sync {
    /// Consume the document and return the extracted text.
    ///
    /// # Errors
    /// Fatal [`DigestError`]s only: the document is not a PDF, is corrupt or
    /// encrypted, or the PDF engine is unavailable.
    async fn extract(&self, document: Document) -> Result<String, DigestError>;
}

/// Default extractor backed by pdfium.
///
/// The pdfium shared library is loaded from `PDFIUM_LIB_PATH` when that
/// variable is set, and from the system library search path otherwise.
#[derive(Debug, Clone, Default)]
pub struct PdfiumExtractor {
    password: Option<String>,
}

impl PdfiumExtractor {
    pub fn new(password: Option<String>) -> Self {
        Self { password }
    }
}

#[async_trait]
impl TextExtractor for PdfiumExtractor {
    async fn extract(&self, document: Document) -> Result<String, DigestError> {
        let (name, bytes) = document.into_parts();
        check_magic(&name, &bytes)?;

        let password = self.password.clone();
        tokio::task::spawn_blocking(move || extract_blocking(&name, &bytes, password.as_deref()))
            .await
            .map_err(|e| DigestError::Internal(format!("Extraction task panicked: {}", e)))?
    }
}

/// Reject anything that does not start with `%PDF` before pdfium sees it.
pub fn check_magic(name: &str, bytes: &[u8]) -> Result<(), DigestError> {
    if bytes.starts_with(b"%PDF") {
        return Ok(());
    }
    let mut magic = [0u8; 4];
    let n = bytes.len().min(4);
    magic[..n].copy_from_slice(&bytes[..n]);
    Err(DigestError::NotAPdf {
        name: name.to_string(),
        magic,
    })
}

/// Join per-page text: pages without text are skipped, every other page is
/// followed by a newline.
pub fn join_pages<I>(pages: I) -> String
where
    I: IntoIterator<Item = Option<String>>,
{
    let mut text = String::new();
    for page in pages.into_iter().flatten() {
        if page.is_empty() {
            continue;
        }
        text.push_str(&page);
        text.push('\n');
    }
    text
}

fn bind_pdfium() -> Result<Pdfium, DigestError> {
    let bindings = match std::env::var("PDFIUM_LIB_PATH") {
        Ok(p) if !p.is_empty() => Pdfium::bind_to_library(PathBuf::from(p)),
        _ => Pdfium::bind_to_system_library(),
    }
    .map_err(|e| DigestError::PdfiumBindingFailed(format!("{:?}", e)))?;
    Ok(Pdfium::new(bindings))
}

fn extract_blocking(
    name: &str,
    bytes: &[u8],
    password: Option<&str>,
) -> Result<String, DigestError> {
    let pdfium = bind_pdfium()?;

    let document = pdfium.load_pdf_from_byte_slice(bytes, password).map_err(|e| {
        let err_str = format!("{:?}", e);
        if err_str.contains("Password") || err_str.contains("password") {
            if password.is_some() {
                DigestError::WrongPassword {
                    name: name.to_string(),
                }
            } else {
                DigestError::PasswordRequired {
                    name: name.to_string(),
                }
            }
        } else {
            DigestError::CorruptPdf {
                name: name.to_string(),
                detail: err_str,
            }
        }
    })?;

    let pages = document.pages();
    let total_pages = pages.len() as usize;
    info!("PDF loaded: {} pages", total_pages);

    let page_texts = pages.iter().enumerate().map(|(idx, page)| match page.text() {
        Ok(text) => Some(text.all()),
        Err(e) => {
            debug!("Page {}: no extractable text ({:?})", idx + 1, e);
            None
        }
    });
    let text = join_pages(page_texts);

    info!(
        "Extracted {} characters from {} pages",
        text.chars().count(),
        total_pages
    );
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_pages_skips_empty_and_appends_newlines() {
        let pages = vec![
            Some("Intro".to_string()),
            None,
            Some(String::new()),
            Some("Chapter 1".to_string()),
        ];
        assert_eq!(join_pages(pages), "Intro\nChapter 1\n");
    }

    #[test]
    fn join_pages_of_nothing_is_empty() {
        assert_eq!(join_pages(Vec::<Option<String>>::new()), "");
        assert_eq!(join_pages(vec![None, Some(String::new())]), "");
    }

    #[test]
    fn magic_accepts_pdf_header() {
        assert!(check_magic("a.pdf", b"%PDF-1.4\n...").is_ok());
    }

    #[test]
    fn magic_rejects_other_and_short_input() {
        match check_magic("a.zip", b"PK\x03\x04rest") {
            Err(DigestError::NotAPdf { magic, .. }) => assert_eq!(&magic, b"PK\x03\x04"),
            other => panic!("expected NotAPdf, got {other:?}"),
        }
        match check_magic("tiny", b"%P") {
            Err(DigestError::NotAPdf { magic, .. }) => assert_eq!(magic, [b'%', b'P', 0, 0]),
            other => panic!("expected NotAPdf, got {other:?}"),
        }
        assert!(check_magic("empty", b"").is_err());
    }

    #[tokio::test]
    async fn extractor_fails_fast_on_non_pdf() {
        let extractor = PdfiumExtractor::default();
        let err = extractor
            .extract(Document::new("notes.txt", b"plain text".to_vec()))
            .await
            .unwrap_err();
        assert!(matches!(err, DigestError::NotAPdf { .. }), "got: {err:?}");
    }
}
