//! PDF extractor using pdf-extract

use std::path::Path;
use std::sync::Arc;

use super::{ensure_available, ensure_text_mode, read_bytes, FormatExtractor};
use crate::error::Result;
use crate::models::{DocumentFormat, ExtractOptions, ExtractedContent};
use crate::processing::CapabilityProbe;

/// One text unit per page, in page order. Empty pages stay in place as empty
/// units so unit indexes line up with page numbers.
pub struct PdfExtractor {
    probe: Arc<CapabilityProbe>,
}

impl PdfExtractor {
    pub fn new() -> Self {
        Self::with_probe(CapabilityProbe::shared())
    }

    pub fn with_probe(probe: Arc<CapabilityProbe>) -> Self {
        Self { probe }
    }

    #[cfg(feature = "pdf")]
    fn read_pages(bytes: &[u8]) -> Result<Vec<String>> {
        use super::panic_message;
        use crate::error::ExtractError;

        // pdf-extract panics on some damaged files instead of returning an error
        match std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem_by_pages(bytes)) {
            Ok(Ok(pages)) => Ok(pages),
            Ok(Err(e)) => Err(ExtractError::malformed("pdf", format!("PDF parse error: {e}"))),
            Err(payload) => Err(ExtractError::malformed(
                "pdf",
                format!("PDF parse error: {}", panic_message(payload)),
            )),
        }
    }

    #[cfg(not(feature = "pdf"))]
    fn read_pages(_bytes: &[u8]) -> Result<Vec<String>> {
        let format = DocumentFormat::Pdf;
        Err(crate::error::ExtractError::unavailable(
            format.as_str(),
            format.collaborator(),
        ))
    }
}

impl Default for PdfExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FormatExtractor for PdfExtractor {
    fn name(&self) -> &'static str {
        DocumentFormat::Pdf.as_str()
    }

    fn collaborator(&self) -> &'static str {
        DocumentFormat::Pdf.collaborator()
    }

    fn is_available(&self) -> bool {
        self.probe.probe(DocumentFormat::Pdf)
    }

    fn extract_with(&self, path: &Path, options: &ExtractOptions) -> Result<ExtractedContent> {
        ensure_available(self)?;
        ensure_text_mode(self.name(), options)?;

        let bytes = read_bytes(path)?;
        let pages = Self::read_pages(&bytes)?
            .into_iter()
            .map(|page| page.trim().to_string())
            .collect();

        Ok(ExtractedContent::new(self.name(), pages))
    }
}
