//! Text extraction for uploaded documents (plain text, Markdown, PDF).
//!
//! Sources supply bytes + MIME type; this module returns plain UTF-8 text.
//! PDF parsing is delegated to `pdf-extract` and treated as opaque.

use thiserror::Error;

pub const MIME_PDF: &str = "application/pdf";
pub const MIME_TEXT: &str = "text/plain";
pub const MIME_MARKDOWN: &str = "text/markdown";

/// Extraction failure. Never fatal; the caller reports it and moves on to
/// the next file.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Unsupported file type: {0}")]
    UnsupportedContentType(String),
    #[error("PDF extraction failed: {0}")]
    Pdf(String),
}

/// Extracts plain text from a file's bytes.
///
/// `name` is only consulted when the MIME type is unknown: files ending in
/// `.md` are still read as text, since browsers and Drive often report an
/// empty or generic type for Markdown.
pub fn extract_text(bytes: &[u8], mime_type: &str, name: &str) -> Result<String, ExtractError> {
    match mime_type {
        MIME_PDF => extract_pdf(bytes),
        MIME_TEXT | MIME_MARKDOWN => Ok(decode_text(bytes)),
        _ if name.ends_with(".md") => Ok(decode_text(bytes)),
        "" => Err(ExtractError::UnsupportedContentType("unknown".to_string())),
        other => Err(ExtractError::UnsupportedContentType(other.to_string())),
    }
}

/// Guesses the MIME type of a local file from its extension.
///
/// Unknown extensions yield an empty string, which [`extract_text`] rejects
/// unless the name ends in `.md`.
pub fn mime_for_name(name: &str) -> &'static str {
    let ext = name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "pdf" => MIME_PDF,
        "txt" | "text" => MIME_TEXT,
        "md" | "markdown" => MIME_MARKDOWN,
        _ => "",
    }
}

fn decode_text(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

fn extract_pdf(bytes: &[u8]) -> Result<String, ExtractError> {
    pdf_extract::extract_text_from_mem(bytes).map_err(|e| ExtractError::Pdf(e.to_string()))
}
