//! Text extraction from uploaded documents.
//!
//! PDF and DOCX files are parsed for their text content. Anything else is
//! decoded as UTF-8; bytes that are not valid UTF-8 yield empty text.

use std::io::{Cursor, Read};
use std::path::Path;

use quick_xml::events::Event;
use quick_xml::Reader;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::ExtractError;

/// Archive member holding the main body of a DOCX file.
const DOCX_BODY: &str = "word/document.xml";

/// Text pulled from an uploaded file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedText {
    pub file_name: String,
    /// Character count of the returned (possibly truncated) text.
    pub characters: usize,
    pub truncated: bool,
    pub text: String,
}

/// How an upload is read, chosen from its file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Docx,
    Text,
}

impl DocumentKind {
    pub fn from_file_name(file_name: &str) -> Self {
        let extension = Path::new(file_name)
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase());

        match extension.as_deref() {
            Some("pdf") => DocumentKind::Pdf,
            Some("docx") => DocumentKind::Docx,
            _ => DocumentKind::Text,
        }
    }
}

/// Extract the text content of an uploaded file.
pub fn extract_text(file_name: &str, bytes: &[u8]) -> Result<String, ExtractError> {
    match DocumentKind::from_file_name(file_name) {
        DocumentKind::Pdf => pdf_text(bytes),
        DocumentKind::Docx => docx_text(bytes),
        DocumentKind::Text => Ok(plain_text(file_name, bytes)),
    }
}

fn pdf_text(bytes: &[u8]) -> Result<String, ExtractError> {
    pdf_extract::extract_text_from_mem(bytes).map_err(|e| ExtractError::Pdf {
        message: e.to_string(),
    })
}

/// Paragraph text from the document body, one line per paragraph.
fn docx_text(bytes: &[u8]) -> Result<String, ExtractError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).map_err(docx_error)?;
    let mut xml = String::new();
    archive
        .by_name(DOCX_BODY)
        .map_err(docx_error)?
        .read_to_string(&mut xml)
        .map_err(docx_error)?;

    let mut reader = Reader::from_str(&xml);
    let mut text = String::new();
    let mut paragraph = String::new();
    let mut in_run_text = false;

    loop {
        match reader.read_event().map_err(docx_error)? {
            Event::Start(e) if e.name().as_ref() == b"w:t" => in_run_text = true,
            Event::End(e) => match e.name().as_ref() {
                b"w:t" => in_run_text = false,
                b"w:p" => {
                    text.push_str(&paragraph);
                    text.push('\n');
                    paragraph.clear();
                }
                _ => {}
            },
            Event::Empty(e) => match e.name().as_ref() {
                b"w:tab" => paragraph.push('\t'),
                b"w:br" => paragraph.push('\n'),
                b"w:p" => text.push('\n'),
                _ => {}
            },
            Event::Text(t) if in_run_text => {
                paragraph.push_str(&t.unescape().map_err(docx_error)?);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(text)
}

fn docx_error(e: impl std::fmt::Display) -> ExtractError {
    ExtractError::Docx {
        message: e.to_string(),
    }
}

fn plain_text(file_name: &str, bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(e) => {
            warn!(file_name, error = %e, "Upload is not UTF-8 text, returning empty text");
            String::new()
        }
    }
}

/// Truncate `text` to at most `limit` characters.
///
/// Returns the kept text and whether anything was cut.
pub fn compress_context(text: &str, limit: usize) -> (&str, bool) {
    match text.char_indices().nth(limit) {
        Some((byte_idx, _)) => (&text[..byte_idx], true),
        None => (text, false),
    }
}

/// Extract and truncate in one step.
pub fn extract_document(
    file_name: &str,
    bytes: &[u8],
    limit: usize,
) -> Result<ExtractedText, ExtractError> {
    let full = extract_text(file_name, bytes)?;
    let (kept, truncated) = compress_context(&full, limit);
    let text = kept.to_string();

    debug!(
        file_name,
        bytes = bytes.len(),
        truncated,
        "Document text extracted"
    );

    Ok(ExtractedText {
        file_name: file_name.to_string(),
        characters: text.chars().count(),
        truncated,
        text,
    })
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_plain_text() {
        let text = extract_text("notes.txt", b"login flow\nreset flow").unwrap();
        assert_eq!(text, "login flow\nreset flow");
    }

    #[test]
    fn test_document_kind_from_extension() {
        assert_eq!(DocumentKind::from_file_name("brief.PDF"), DocumentKind::Pdf);
        assert_eq!(DocumentKind::from_file_name("plan.docx"), DocumentKind::Docx);
        assert_eq!(DocumentKind::from_file_name("page.html"), DocumentKind::Text);
        assert_eq!(DocumentKind::from_file_name("Makefile"), DocumentKind::Text);
    }

    #[test]
    fn test_any_other_extension_is_text() {
        assert_eq!(extract_text("index.html", b"<p>hi</p>").unwrap(), "<p>hi</p>");
        assert_eq!(extract_text("feed.xml", b"<rss/>").unwrap(), "<rss/>");
        assert_eq!(extract_text("app.ts", b"let x = 1;").unwrap(), "let x = 1;");
        assert_eq!(extract_text("Makefile", b"all:").unwrap(), "all:");
    }

    #[test]
    fn test_invalid_utf8_yields_empty_text() {
        assert_eq!(extract_text("data.csv", &[0xff, 0xfe, 0x00]).unwrap(), "");
    }

    #[test]
    fn test_compress_context_within_limit() {
        assert_eq!(compress_context("short", 10), ("short", false));
        assert_eq!(compress_context("exact", 5), ("exact", false));
    }

    #[test]
    fn test_compress_context_truncates_on_char_boundary() {
        let (kept, truncated) = compress_context("héllo wörld", 7);
        assert_eq!(kept, "héllo w");
        assert!(truncated);

        assert_eq!(compress_context("abc", 0), ("", true));
    }

    #[test]
    fn test_extract_document() {
        let doc = extract_document("story.md", "ümlaut text".as_bytes(), 6).unwrap();
        assert_eq!(doc.text, "ümlaut");
        assert_eq!(doc.characters, 6);
        assert!(doc.truncated);
        assert_eq!(doc.file_name, "story.md");
    }
}
