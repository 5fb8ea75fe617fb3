use std::path::Path;
use std::sync::Arc;

use super::{ensure_available, open_file, FormatExtractor};
use crate::error::Result;
use crate::models::{DocumentFormat, ExtractOptions, ExtractedContent, OutputMode, Workbook};
use crate::processing::CapabilityProbe;

pub const DEFAULT_MAX_ROWS: usize = 100_000;

/// Spreadsheet extractor.
///
/// Text mode yields one tab-separated unit per non-empty row, walking sheets
/// in declaration order. Structured mode additionally returns every sheet as
/// rows of cell text, empty cells included.
pub struct XlsxExtractor {
    probe: Arc<CapabilityProbe>,
    max_rows: usize,
}

impl XlsxExtractor {
    pub fn new() -> Self {
        Self::with_probe(CapabilityProbe::shared())
    }

    pub fn with_probe(probe: Arc<CapabilityProbe>) -> Self {
        Self {
            probe,
            max_rows: DEFAULT_MAX_ROWS,
        }
    }

    /// Guard against pathological files with excessive rows.
    pub fn with_max_rows(mut self, max_rows: usize) -> Self {
        self.max_rows = max_rows;
        self
    }

    #[cfg(feature = "xlsx")]
    fn read_workbook(&self, path: &Path) -> Result<Workbook> {
        use crate::error::ExtractError;
        use calamine::{Reader, Xlsx};
        use std::io::BufReader;

        let file = open_file(path)?;
        let mut workbook: Xlsx<_> = Xlsx::new(BufReader::new(file))
            .map_err(|e| ExtractError::malformed("xlsx", format!("XLSX parse error: {e}")))?;

        let mut sheets = Workbook::new();
        for name in workbook.sheet_names() {
            let range = workbook.worksheet_range(&name).map_err(|e| {
                ExtractError::malformed("xlsx", format!("Failed to read sheet '{name}': {e}"))
            })?;

            let total_rows = range.height();
            if total_rows > self.max_rows {
                tracing::warn!(
                    sheet = %name,
                    total_rows,
                    max_rows = self.max_rows,
                    "Sheet truncated"
                );
            }

            let rows = range
                .rows()
                .take(self.max_rows)
                .map(|row| row.iter().map(|cell| format_cell_value(Some(cell))).collect())
                .collect();
            sheets.push(name, rows);
        }

        Ok(sheets)
    }

    #[cfg(not(feature = "xlsx"))]
    fn read_workbook(&self, path: &Path) -> Result<Workbook> {
        // Still surface a bad path as an IO failure.
        let _file = open_file(path)?;
        Err(crate::error::ExtractError::unavailable(
            self.name(),
            self.collaborator(),
        ))
    }
}

impl Default for XlsxExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FormatExtractor for XlsxExtractor {
    fn name(&self) -> &'static str {
        DocumentFormat::Xlsx.as_str()
    }

    fn collaborator(&self) -> &'static str {
        DocumentFormat::Xlsx.collaborator()
    }

    fn is_available(&self) -> bool {
        self.probe.probe(DocumentFormat::Xlsx)
    }

    fn extract_with(&self, path: &Path, options: &ExtractOptions) -> Result<ExtractedContent> {
        ensure_available(self)?;

        let workbook = self.read_workbook(path)?;
        let units = text_units(&workbook);
        let content = ExtractedContent::new(self.name(), units);

        match options.mode {
            OutputMode::Text => Ok(content),
            OutputMode::Structured => Ok(content.with_sheets(workbook)),
        }
    }
}

fn text_units(workbook: &Workbook) -> Vec<String> {
    workbook
        .sheets()
        .iter()
        .flat_map(|sheet| sheet.rows.iter())
        .filter_map(|row| {
            let cells: Vec<&str> = row
                .iter()
                .map(String::as_str)
                .filter(|cell| !cell.is_empty())
                .collect();
            if cells.is_empty() {
                None
            } else {
                Some(cells.join("\t"))
            }
        })
        .collect()
}

#[cfg(feature = "xlsx")]
fn format_cell_value(cell: Option<&calamine::Data>) -> String {
    use calamine::Data;

    match cell {
        Some(Data::String(s)) => s.clone(),
        Some(Data::Int(i)) => i.to_string(),
        Some(Data::Float(f)) => {
            // Format float nicely - remove trailing zeros
            let s = format!("{f}");
            if s.contains('.') {
                s.trim_end_matches('0').trim_end_matches('.').to_string()
            } else {
                s
            }
        }
        Some(Data::Bool(b)) => b.to_string(),
        Some(Data::DateTime(dt)) => dt.to_string(),
        Some(Data::DateTimeIso(dt)) => dt.to_string(),
        Some(Data::DurationIso(d)) => d.to_string(),
        Some(Data::Empty) | None => String::new(),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_units_skip_empty_cells_and_rows() {
        let mut workbook = Workbook::new();
        workbook.push(
            "Sheet1",
            vec![
                vec!["a".into(), "".into(), "b".into()],
                vec!["".into(), "".into(), "".into()],
            ],
        );
        workbook.push("Sheet2", vec![vec!["c".into()]]);

        assert_eq!(text_units(&workbook), vec!["a\tb", "c"]);
    }

    #[cfg(feature = "xlsx")]
    #[test]
    fn test_format_cell_value() {
        use calamine::Data;

        assert_eq!(
            format_cell_value(Some(&Data::String("hello".to_string()))),
            "hello"
        );
        assert_eq!(format_cell_value(Some(&Data::Int(42))), "42");
        assert_eq!(format_cell_value(Some(&Data::Float(2.5))), "2.5");
        assert_eq!(format_cell_value(Some(&Data::Float(100.0))), "100");
        assert_eq!(format_cell_value(Some(&Data::Bool(true))), "true");
        assert_eq!(format_cell_value(Some(&Data::Empty)), "");
        assert_eq!(format_cell_value(None), "");
    }
}
