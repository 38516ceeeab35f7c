/*!
# Document Extraction

Turns an uploaded file into plain text for the content input.

- `.docx`: text runs of `word/document.xml`, one blank line between paragraphs
- anything else: the bytes as UTF-8 (invalid sequences replaced)
*/

use convhub_core::{ConvHubError, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::io::{Cursor, Read};

/// Shown when a file cannot be turned into text
pub const READ_FAILED_MESSAGE: &str =
    "Failed to read the file. It might be corrupted or in an unsupported format.";

/// Extensions offered by the file picker
pub const ACCEPTED_EXTENSIONS: &[&str] = &[".txt", ".docx"];

/// How a file is decoded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    /// Office Open XML word-processing document
    Docx,
    /// Anything else, decoded as text
    Text,
}

impl DocumentKind {
    /// Pick a decoder from the file name's extension
    pub fn from_file_name(name: &str) -> Self {
        if name.to_ascii_lowercase().ends_with(".docx") {
            DocumentKind::Docx
        } else {
            DocumentKind::Text
        }
    }
}

/// Turns uploaded bytes into text
pub trait DocumentExtractor: Send + Sync {
    /// Extract the text of `bytes`, using `file_name` to pick the format
    fn extract(&self, file_name: &str, bytes: &[u8]) -> Result<String>;
}

/// Default extractor: `.docx` raw text, everything else as UTF-8
#[derive(Debug, Clone, Copy, Default)]
pub struct RawTextExtractor;

impl DocumentExtractor for RawTextExtractor {
    fn extract(&self, file_name: &str, bytes: &[u8]) -> Result<String> {
        match DocumentKind::from_file_name(file_name) {
            DocumentKind::Docx => extract_docx_text(bytes),
            DocumentKind::Text => Ok(String::from_utf8_lossy(bytes).into_owned()),
        }
    }
}

static PARAGRAPH_PROPERTIES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<w:pPr\b.*?</w:pPr>").unwrap());

static BODY_TOKENS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"<w:t(?:\s[^>]*)?>([^<]*)</w:t>|<w:tab(?:\s[^>]*)?/>|<w:(?:br|cr)(?:\s[^>]*)?/>|</w:p>",
    )
    .unwrap()
});

static ENTITY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"&(#x[0-9a-fA-F]+|#[0-9]+|[a-z]+);").unwrap());

/// Raw text of a `.docx` archive
pub fn extract_docx_text(bytes: &[u8]) -> Result<String> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| ConvHubError::document(format!("not a .docx archive: {}", e)))?;

    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .map_err(|e| ConvHubError::document(format!("missing word/document.xml: {}", e)))?
        .read_to_string(&mut xml)?;

    Ok(document_xml_to_text(&xml))
}

fn document_xml_to_text(xml: &str) -> String {
    // Tab-stop definitions live in paragraph properties and are not content.
    let xml = PARAGRAPH_PROPERTIES.replace_all(xml, "");

    let mut paragraphs = Vec::new();
    let mut current = String::new();
    for caps in BODY_TOKENS.captures_iter(&xml) {
        let token = &caps[0];
        if let Some(text) = caps.get(1) {
            current.push_str(&decode_entities(text.as_str()));
        } else if token.starts_with("<w:tab") {
            current.push('\t');
        } else if token == "</w:p>" {
            paragraphs.push(std::mem::take(&mut current));
        } else {
            current.push('\n');
        }
    }
    if !current.is_empty() {
        paragraphs.push(current);
    }

    paragraphs.join("\n\n").trim_end().to_string()
}

fn decode_entities(text: &str) -> String {
    ENTITY
        .replace_all(text, |caps: &regex::Captures| {
            let name = &caps[1];
            let decoded = match name {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                _ => name
                    .strip_prefix("#x")
                    .map(|hex| u32::from_str_radix(hex, 16))
                    .or_else(|| name.strip_prefix('#').map(str::parse::<u32>))
                    .and_then(|n| n.ok())
                    .and_then(char::from_u32),
            };
            decoded.map_or_else(|| caps[0].to_string(), String::from)
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    fn docx(document_xml: &str) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options =
            SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
        writer.start_file("word/document.xml", options).unwrap();
        writer.write_all(document_xml.as_bytes()).unwrap();
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn test_kind_from_file_name() {
        assert_eq!(DocumentKind::from_file_name("Notes.DOCX"), DocumentKind::Docx);
        assert_eq!(DocumentKind::from_file_name("notes.txt"), DocumentKind::Text);
        assert_eq!(DocumentKind::from_file_name("README"), DocumentKind::Text);
    }

    #[test]
    fn test_text_files_pass_through() {
        let text = RawTextExtractor
            .extract("notes.txt", "héllo\r\nworld".as_bytes())
            .unwrap();
        assert_eq!(text, "héllo\r\nworld");

        let lossy = RawTextExtractor.extract("bin.dat", &[0x61, 0xff, 0x62]).unwrap();
        assert_eq!(lossy, "a\u{fffd}b");
    }

    #[test]
    fn test_docx_paragraphs_and_runs() {
        let xml = r#"<?xml version="1.0"?><w:document><w:body>
            <w:p><w:pPr><w:tabs><w:tab w:val="left" w:pos="720"/></w:tabs></w:pPr>
              <w:r><w:t>Hello </w:t></w:r><w:r><w:t xml:space="preserve">world</w:t></w:r></w:p>
            <w:p><w:r><w:t>a</w:t><w:tab/><w:t>b</w:t><w:br/><w:t>c &amp; d &lt;e&gt; &#233;</w:t></w:r></w:p>
            </w:body></w:document>"#;

        let text = RawTextExtractor.extract("doc.docx", &docx(xml)).unwrap();
        assert_eq!(text, "Hello world\n\na\tb\nc & d <e> é");
    }

    #[test]
    fn test_corrupt_docx_is_an_error() {
        let err = RawTextExtractor
            .extract("broken.docx", b"definitely not a zip")
            .unwrap_err();
        assert!(matches!(err, ConvHubError::Document(_)));

        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        writer
            .start_file("other.xml", SimpleFileOptions::default())
            .unwrap();
        let archive = writer.finish().unwrap().into_inner();
        assert!(extract_docx_text(&archive).is_err());
    }

    #[test]
    fn test_unknown_entities_kept() {
        assert_eq!(decode_entities("&nbsp; &#x41;"), "&nbsp; A");
    }
}
