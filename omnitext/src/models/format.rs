use serde::{Deserialize, Serialize};
use std::path::Path;

/// Built-in document formats, one per extractor variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentFormat {
    Pdf,
    Doc,
    Docx,
    Xlsx,
    Pptx,
    Txt,
    Msg,
}

impl DocumentFormat {
    pub const ALL: [DocumentFormat; 7] = [
        Self::Pdf,
        Self::Doc,
        Self::Docx,
        Self::Xlsx,
        Self::Pptx,
        Self::Txt,
        Self::Msg,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Doc => "doc",
            Self::Docx => "docx",
            Self::Xlsx => "xlsx",
            Self::Pptx => "pptx",
            Self::Txt => "txt",
            Self::Msg => "msg",
        }
    }

    /// Name of the backing parser this format needs at runtime.
    pub fn collaborator(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf-extract",
            Self::Doc => "antiword",
            Self::Docx => "docx-rs",
            Self::Xlsx => "calamine",
            Self::Pptx => "zip/quick-xml",
            Self::Txt => "std::fs",
            Self::Msg => "cfb",
        }
    }

    pub(crate) fn index(&self) -> usize {
        match self {
            Self::Pdf => 0,
            Self::Doc => 1,
            Self::Docx => 2,
            Self::Xlsx => 3,
            Self::Pptx => 4,
            Self::Txt => 5,
            Self::Msg => 6,
        }
    }
}

impl std::fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DocumentFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = ExtensionToken::new(s);
        Self::ALL
            .into_iter()
            .find(|format| format.as_str() == token.as_str())
            .ok_or_else(|| format!("Unknown document format: {s}"))
    }
}

/// Normalized, lower-cased file suffix used as the dispatch key.
///
/// The empty token stands for "no extension" and never resolves to an
/// extractor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct ExtensionToken(String);

impl ExtensionToken {
    pub fn new(raw: &str) -> Self {
        let trimmed = raw.trim();
        let stripped = trimmed.strip_prefix('.').unwrap_or(trimmed);
        Self(stripped.to_lowercase())
    }

    pub fn from_path(path: impl AsRef<Path>) -> Self {
        path.as_ref()
            .extension()
            .map(|ext| Self::new(&ext.to_string_lossy()))
            .unwrap_or_default()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for ExtensionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ExtensionToken {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<DocumentFormat> for ExtensionToken {
    fn from(format: DocumentFormat) -> Self {
        Self(format.as_str().to_string())
    }
}
