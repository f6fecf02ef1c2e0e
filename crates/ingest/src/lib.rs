pub mod docx;
pub mod document;
pub mod error;
pub mod reader;

pub use docx::{DocxReader, TextOrder};
pub use document::{ContentType, DOCX_MIME, ExtractedText, RawDocument};
pub use error::DocumentParseError;
pub use reader::FileReader;

/// Text Extractor entry point: turn an uploaded document into ordered text
/// fragments according to its declared container format.
pub fn extract_text(
    document: &RawDocument,
    order: TextOrder,
) -> Result<ExtractedText, DocumentParseError> {
    match document.content_type {
        ContentType::Docx => DocxReader::new(order).extract_text(&document.bytes),
        ContentType::PlainText => {
            let text = std::str::from_utf8(&document.bytes)
                .map_err(|e| DocumentParseError::new(format!("invalid UTF-8 text: {}", e)))?;
            Ok(ExtractedText::from_fragments(text.lines()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_lines_become_fragments() {
        let doc = RawDocument::new(
            "letter.txt",
            ContentType::PlainText,
            b"Dear {buyer_name},\n\n  \nregards".to_vec(),
        );
        let text = extract_text(&doc, TextOrder::default()).unwrap();
        assert_eq!(text.text(), "Dear {buyer_name},\nregards");
    }

    #[test]
    fn test_invalid_utf8_is_parse_error() {
        let doc = RawDocument::new("bad.txt", ContentType::PlainText, vec![0xff, 0xfe, 0x00]);
        assert!(extract_text(&doc, TextOrder::default()).is_err());
    }

    #[test]
    fn test_text_payload_declared_as_docx_is_parse_error() {
        let doc = RawDocument::new("contract.docx", ContentType::Docx, b"not a zip".to_vec());
        let err = extract_text(&doc, TextOrder::default()).unwrap_err();
        assert!(err.to_string().starts_with("failed to process document"));
    }
}
