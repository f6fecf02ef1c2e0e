use serde::{Deserialize, Serialize};

pub const DOCX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    Docx,
    PlainText,
}

impl ContentType {
    /// Resolve the container format from the declared MIME type, falling back
    /// to the filename extension. Unknown declarations are treated as `.docx`,
    /// which is what uploads are expected to be.
    pub fn detect(declared: Option<&str>, filename: &str) -> Self {
        if let Some(mime) = declared {
            let mime = mime.trim().to_ascii_lowercase();
            if mime.starts_with("text/plain") || mime.starts_with("text/markdown") {
                return ContentType::PlainText;
            }
            if mime == DOCX_MIME {
                return ContentType::Docx;
            }
        }

        let extension = filename
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            "txt" | "md" => ContentType::PlainText,
            _ => ContentType::Docx,
        }
    }
}

/// Uploaded binary content plus what the caller declared it to be.
#[derive(Debug, Clone)]
pub struct RawDocument {
    pub filename: String,
    pub content_type: ContentType,
    pub bytes: Vec<u8>,
}

impl RawDocument {
    pub fn new(filename: impl Into<String>, content_type: ContentType, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            content_type,
            bytes,
        }
    }
}

/// Ordered, non-empty text fragments (one per paragraph or table cell).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExtractedText {
    fragments: Vec<String>,
}

impl ExtractedText {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_fragments<I, S>(fragments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut text = Self::new();
        for fragment in fragments {
            text.push(fragment);
        }
        text
    }

    /// Append a fragment; whitespace-only fragments are dropped.
    pub fn push(&mut self, fragment: impl Into<String>) {
        let fragment = fragment.into();
        if !fragment.trim().is_empty() {
            self.fragments.push(fragment);
        }
    }

    pub fn fragments(&self) -> &[String] {
        &self.fragments
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// All fragments joined with line breaks.
    pub fn text(&self) -> String {
        self.fragments.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_content_type() {
        assert_eq!(ContentType::detect(Some(DOCX_MIME), "upload"), ContentType::Docx);
        assert_eq!(ContentType::detect(Some("text/plain; charset=utf-8"), "a.docx"), ContentType::PlainText);
        assert_eq!(ContentType::detect(None, "notes.MD"), ContentType::PlainText);
        assert_eq!(ContentType::detect(None, "contract.docx"), ContentType::Docx);
        assert_eq!(ContentType::detect(Some("application/octet-stream"), "blob"), ContentType::Docx);
    }

    #[test]
    fn test_blank_fragments_dropped() {
        let text = ExtractedText::from_fragments(["First", "   ", "", "Second"]);
        assert_eq!(text.fragments(), &["First".to_string(), "Second".to_string()]);
        assert_eq!(text.text(), "First\nSecond");
    }
}
