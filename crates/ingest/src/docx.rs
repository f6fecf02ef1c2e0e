use docx_rs::{
    DocumentChild, Paragraph, ParagraphChild, RunChild, Table, TableCellContent, TableChild,
    TableRowChild, read_docx,
};
use serde::{Deserialize, Serialize};

use crate::document::ExtractedText;
use crate::error::DocumentParseError;

/// Order in which paragraph and table text is emitted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextOrder {
    /// Every body paragraph, then every table cell.
    #[default]
    ParagraphsFirst,
    /// Paragraphs and tables interleaved as they appear in the body.
    Document,
}

/// Pulls plain text out of a `.docx` package.
///
/// Document structure as exposed by docx-rs:
///   Document → DocumentChild::{Paragraph, Table}
///   Paragraph → Run → Text
///   Table → Row → Cell → Paragraph
#[derive(Debug, Clone, Copy, Default)]
pub struct DocxReader {
    order: TextOrder,
}

impl DocxReader {
    pub fn new(order: TextOrder) -> Self {
        Self { order }
    }

    pub fn extract_text(&self, bytes: &[u8]) -> Result<ExtractedText, DocumentParseError> {
        let docx = read_docx(bytes).map_err(|e| {
            tracing::error!(error = %e, bytes = bytes.len(), "Failed to parse docx package");
            DocumentParseError::new(e.to_string())
        })?;

        let children = &docx.document.children;
        let mut text = ExtractedText::new();

        match self.order {
            TextOrder::ParagraphsFirst => {
                for child in children {
                    if let DocumentChild::Paragraph(para) = child {
                        text.push(paragraph_text(para));
                    }
                }
                for child in children {
                    if let DocumentChild::Table(table) = child {
                        push_table_cells(&mut text, table);
                    }
                }
            }
            TextOrder::Document => {
                for child in children {
                    match child {
                        DocumentChild::Paragraph(para) => text.push(paragraph_text(para)),
                        DocumentChild::Table(table) => push_table_cells(&mut text, table),
                        _ => {}
                    }
                }
            }
        }

        tracing::debug!(
            fragments = text.fragments().len(),
            order = ?self.order,
            "Extracted text from docx"
        );
        Ok(text)
    }
}

/// Runs inside one paragraph are parts of the same sentence, so they are
/// concatenated with no separator.
fn paragraph_text(para: &Paragraph) -> String {
    let mut out = String::new();
    collect_children(&para.children, &mut out);
    out
}

fn collect_children(children: &[ParagraphChild], out: &mut String) {
    for child in children {
        match child {
            ParagraphChild::Run(run) => {
                for rc in &run.children {
                    match rc {
                        RunChild::Text(t) => out.push_str(&t.text),
                        RunChild::Tab(_) => out.push('\t'),
                        RunChild::Break(_) => out.push('\n'),
                        _ => {}
                    }
                }
            }
            ParagraphChild::Hyperlink(link) => collect_children(&link.children, out),
            _ => {}
        }
    }
}

/// One fragment per cell: the cell's paragraphs joined by newlines.
fn push_table_cells(text: &mut ExtractedText, table: &Table) {
    for row in &table.rows {
        let TableChild::TableRow(row) = row else { continue };
        for cell in &row.cells {
            let TableRowChild::TableCell(cell) = cell else { continue };
            let paragraphs: Vec<String> = cell
                .children
                .iter()
                .filter_map(|content| match content {
                    TableCellContent::Paragraph(para) => Some(paragraph_text(para)),
                    _ => None,
                })
                .collect();
            text.push(paragraphs.join("\n"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docx_rs::{Docx, Run, TableCell, TableRow};
    use std::io::Cursor;

    fn para(text: &str) -> Paragraph {
        Paragraph::new().add_run(Run::new().add_text(text))
    }

    fn pack(docx: Docx) -> Vec<u8> {
        let mut buf = Cursor::new(Vec::new());
        docx.build().pack(&mut buf).unwrap();
        buf.into_inner()
    }

    fn sample() -> Vec<u8> {
        let table = Table::new(vec![TableRow::new(vec![
            TableCell::new().add_paragraph(para("Supplier: Baltic Wood Agency Ltd")),
            TableCell::new().add_paragraph(para("   ")),
            TableCell::new().add_paragraph(para("Buyer: {buyer_name}")),
        ])]);

        pack(
            Docx::new()
                .add_paragraph(para("CONTRACT No. {contract_number}"))
                .add_table(table)
                .add_paragraph(para(""))
                .add_paragraph(para("Signed on {date}")),
        )
    }

    #[test]
    fn test_paragraphs_then_tables() {
        let text = DocxReader::default().extract_text(&sample()).unwrap();
        assert_eq!(
            text.fragments(),
            &[
                "CONTRACT No. {contract_number}".to_string(),
                "Signed on {date}".to_string(),
                "Supplier: Baltic Wood Agency Ltd".to_string(),
                "Buyer: {buyer_name}".to_string(),
            ]
        );
    }

    #[test]
    fn test_document_order() {
        let text = DocxReader::new(TextOrder::Document)
            .extract_text(&sample())
            .unwrap();
        assert_eq!(text.fragments()[1], "Supplier: Baltic Wood Agency Ltd");
        assert_eq!(text.fragments()[3], "Signed on {date}");
    }

    #[test]
    fn test_runs_are_concatenated() {
        let bytes = pack(Docx::new().add_paragraph(
            Paragraph::new()
                .add_run(Run::new().add_text("Baltic "))
                .add_run(Run::new().add_text("Wood")),
        ));
        let text = DocxReader::default().extract_text(&bytes).unwrap();
        assert_eq!(text.text(), "Baltic Wood");
    }

    #[test]
    fn test_rejects_non_docx_bytes() {
        let err = DocxReader::default()
            .extract_text(b"Dear {buyer_name}, this is plain text")
            .unwrap_err();
        assert!(!err.message.is_empty());
    }
}
