use std::path::Path;
use std::sync::Arc;

use super::{ensure_available, ensure_text_mode, read_bytes, FormatExtractor};
use crate::config::TxtMode;
use crate::error::{ExtractError, Result};
use crate::models::{DocumentFormat, ExtractOptions, ExtractedContent};
use crate::processing::CapabilityProbe;

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Plain UTF-8 text. The whole file is one unit unless [`TxtMode::Lines`] is
/// selected.
pub struct TxtExtractor {
    probe: Arc<CapabilityProbe>,
    mode: TxtMode,
}

impl TxtExtractor {
    pub fn new() -> Self {
        Self::with_probe(CapabilityProbe::shared())
    }

    pub fn with_probe(probe: Arc<CapabilityProbe>) -> Self {
        Self {
            probe,
            mode: TxtMode::Whole,
        }
    }

    pub fn with_mode(mut self, mode: TxtMode) -> Self {
        self.mode = mode;
        self
    }

    fn decode(bytes: &[u8]) -> Result<String> {
        let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
        String::from_utf8(bytes.to_vec())
            .map_err(|e| ExtractError::malformed("txt", format!("Invalid UTF-8: {e}")))
    }
}

impl Default for TxtExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FormatExtractor for TxtExtractor {
    fn name(&self) -> &'static str {
        DocumentFormat::Txt.as_str()
    }

    fn collaborator(&self) -> &'static str {
        DocumentFormat::Txt.collaborator()
    }

    fn is_available(&self) -> bool {
        self.probe.probe(DocumentFormat::Txt)
    }

    fn extract_with(&self, path: &Path, options: &ExtractOptions) -> Result<ExtractedContent> {
        ensure_available(self)?;
        ensure_text_mode(self.name(), options)?;

        let text = Self::decode(&read_bytes(path)?)?;
        let units = match self.mode {
            TxtMode::Whole => vec![text],
            TxtMode::Lines => text.lines().map(str::to_string).collect(),
        };

        Ok(ExtractedContent::new(self.name(), units))
    }
}
