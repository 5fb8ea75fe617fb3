use std::path::Path;
use std::sync::Arc;

use super::{ensure_available, ensure_text_mode, read_bytes, FormatExtractor};
use crate::error::Result;
use crate::models::{DocumentFormat, ExtractOptions, ExtractedContent};
use crate::processing::CapabilityProbe;

/// Paragraphs in document order; each table row becomes one tab-separated unit.
pub struct DocxExtractor {
    probe: Arc<CapabilityProbe>,
}

impl DocxExtractor {
    pub fn new() -> Self {
        Self::with_probe(CapabilityProbe::shared())
    }

    pub fn with_probe(probe: Arc<CapabilityProbe>) -> Self {
        Self { probe }
    }
}

impl Default for DocxExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FormatExtractor for DocxExtractor {
    fn name(&self) -> &'static str {
        DocumentFormat::Docx.as_str()
    }

    fn collaborator(&self) -> &'static str {
        DocumentFormat::Docx.collaborator()
    }

    fn is_available(&self) -> bool {
        self.probe.probe(DocumentFormat::Docx)
    }

    fn extract_with(&self, path: &Path, options: &ExtractOptions) -> Result<ExtractedContent> {
        ensure_available(self)?;
        ensure_text_mode(self.name(), options)?;

        let bytes = read_bytes(path)?;
        let (units, title) = parse(&bytes)?;
        Ok(ExtractedContent::new(self.name(), units).with_title(title))
    }
}

#[cfg(not(feature = "docx"))]
fn parse(_bytes: &[u8]) -> Result<(Vec<String>, Option<String>)> {
    let format = DocumentFormat::Docx;
    Err(crate::error::ExtractError::unavailable(
        format.as_str(),
        format.collaborator(),
    ))
}

#[cfg(feature = "docx")]
fn parse(bytes: &[u8]) -> Result<(Vec<String>, Option<String>)> {
    use crate::error::ExtractError;

    let docx = docx_rs::read_docx(bytes)
        .map_err(|e| ExtractError::malformed("docx", format!("DOCX parse error: {e}")))?;

    let mut units = Vec::new();
    let mut title = None;

    for child in &docx.document.children {
        match child {
            docx_rs::DocumentChild::Paragraph(paragraph) => {
                let text = paragraph_text(paragraph);
                if text.trim().is_empty() {
                    continue;
                }
                if title.is_none() && is_title_style(paragraph) {
                    title = Some(text.trim().to_string());
                }
                units.push(text);
            }
            docx_rs::DocumentChild::Table(table) => {
                units.extend(table_rows(table));
            }
            _ => {}
        }
    }

    Ok((units, title))
}

#[cfg(feature = "docx")]
fn is_title_style(paragraph: &docx_rs::Paragraph) -> bool {
    paragraph
        .property
        .style
        .as_ref()
        .map(|style| style.val == "Title" || style.val == "Heading1")
        .unwrap_or(false)
}

#[cfg(feature = "docx")]
fn paragraph_text(paragraph: &docx_rs::Paragraph) -> String {
    let mut content = String::new();
    for para_child in &paragraph.children {
        if let docx_rs::ParagraphChild::Run(run) = para_child {
            for run_child in &run.children {
                match run_child {
                    docx_rs::RunChild::Text(text) => content.push_str(&text.text),
                    docx_rs::RunChild::Tab(_) => content.push('\t'),
                    _ => {}
                }
            }
        }
    }
    content
}

#[cfg(feature = "docx")]
fn table_rows(table: &docx_rs::Table) -> Vec<String> {
    let mut rows = Vec::new();

    for table_child in &table.rows {
        let docx_rs::TableChild::TableRow(row) = table_child;
        let mut cells: Vec<String> = Vec::new();
        for row_child in &row.cells {
            let docx_rs::TableRowChild::TableCell(cell) = row_child;
            let mut cell_text = String::new();
            for cell_child in &cell.children {
                if let docx_rs::TableCellContent::Paragraph(para) = cell_child {
                    let para_text = paragraph_text(para);
                    if !cell_text.is_empty() && !para_text.is_empty() {
                        cell_text.push(' ');
                    }
                    cell_text.push_str(&para_text);
                }
            }
            cells.push(cell_text.trim().to_string());
        }
        if cells.iter().any(|cell| !cell.is_empty()) {
            rows.push(cells.join("\t"));
        }
    }

    rows
}
