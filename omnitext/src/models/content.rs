use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

/// Separator used by [`ExtractedContent::text`] to join text units.
pub const UNIT_SEPARATOR: &str = "\n";

/// Normalized output of every extractor.
///
/// `units` is the canonical form: an ordered sequence of logical text units
/// (pages, paragraphs, slides, rows, ...). `sheets` is only populated when a
/// spreadsheet is extracted in [`OutputMode::Structured`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractedContent {
    pub format: String,
    pub units: Vec<String>,
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sheets: Option<Workbook>,
    pub word_count: usize,
}

impl ExtractedContent {
    pub fn new(format: impl Into<String>, units: Vec<String>) -> Self {
        let word_count = count_words(&units);
        Self {
            format: format.into(),
            units,
            title: None,
            sheets: None,
            word_count,
        }
    }

    pub fn with_title(mut self, title: Option<String>) -> Self {
        self.title = title;
        self
    }

    pub fn with_sheets(mut self, sheets: Workbook) -> Self {
        self.sheets = Some(sheets);
        self
    }

    pub fn units(&self) -> &[String] {
        &self.units
    }

    /// Joined single-string view of the units.
    pub fn text(&self) -> String {
        self.units.join(UNIT_SEPARATOR)
    }

    pub fn is_empty(&self) -> bool {
        self.units.iter().all(|unit| unit.trim().is_empty())
    }
}

fn count_words(units: &[String]) -> usize {
    units.iter().map(|u| u.split_whitespace().count()).sum()
}

/// One worksheet: its name and rows of cell text in column order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sheet {
    pub name: String,
    pub rows: Vec<Vec<String>>,
}

/// Sheet-name to rows mapping that keeps sheet declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Workbook {
    sheets: Vec<Sheet>,
}

impl Workbook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: impl Into<String>, rows: Vec<Vec<String>>) {
        self.sheets.push(Sheet {
            name: name.into(),
            rows,
        });
    }

    pub fn get(&self, name: &str) -> Option<&[Vec<String>]> {
        self.sheets
            .iter()
            .find(|sheet| sheet.name == name)
            .map(|sheet| sheet.rows.as_slice())
    }

    pub fn sheets(&self) -> &[Sheet] {
        &self.sheets
    }

    pub fn sheet_names(&self) -> impl Iterator<Item = &str> {
        self.sheets.iter().map(|sheet| sheet.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.sheets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }
}

impl Serialize for Workbook {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.sheets.len()))?;
        for sheet in &self.sheets {
            map.serialize_entry(&sheet.name, &sheet.rows)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputMode {
    /// Ordered text units with a joined-string view.
    #[default]
    Text,
    /// Text units plus the sheet mapping; spreadsheets only.
    Structured,
}

impl std::fmt::Display for OutputMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Structured => write!(f, "structured"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExtractOptions {
    pub mode: OutputMode,
}

impl ExtractOptions {
    pub fn structured() -> Self {
        Self {
            mode: OutputMode::Structured,
        }
    }
}
