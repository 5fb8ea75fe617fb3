use std::fs::File;
use std::path::Path;

use crate::error::{ExtractError, Result};
use crate::models::{ExtractOptions, ExtractedContent, OutputMode};

pub mod doc;
pub mod docx;
pub mod msg;
pub mod pdf;
pub mod pptx;
pub mod txt;
pub mod xlsx;

pub use doc::DocExtractor;
pub use docx::DocxExtractor;
pub use msg::MsgExtractor;
pub use pdf::PdfExtractor;
pub use pptx::PptxExtractor;
pub use txt::TxtExtractor;
pub use xlsx::XlsxExtractor;

/// A format-specific adapter around one backing parser.
///
/// Implementations are stateless across calls, so one instance may be shared
/// between threads. Every entry point must check [`is_available`] before it
/// touches the file.
///
/// [`is_available`]: FormatExtractor::is_available
pub trait FormatExtractor: Send + Sync {
    /// Short format name used in results and errors (e.g. `"pdf"`).
    fn name(&self) -> &'static str;

    /// Backing parser this extractor needs.
    fn collaborator(&self) -> &'static str;

    fn is_available(&self) -> bool;

    fn extract_with(&self, path: &Path, options: &ExtractOptions) -> Result<ExtractedContent>;

    fn extract(&self, path: &Path) -> Result<ExtractedContent> {
        self.extract_with(path, &ExtractOptions::default())
    }
}

/// Fails with `UnavailableDependency` when the extractor's parser is missing.
pub(crate) fn ensure_available<E: FormatExtractor + ?Sized>(extractor: &E) -> Result<()> {
    if extractor.is_available() {
        Ok(())
    } else {
        Err(ExtractError::unavailable(
            extractor.name(),
            extractor.collaborator(),
        ))
    }
}

/// Rejects structured output for formats that only produce text.
pub(crate) fn ensure_text_mode(format: &str, options: &ExtractOptions) -> Result<()> {
    match options.mode {
        OutputMode::Text => Ok(()),
        mode => Err(ExtractError::UnsupportedMode {
            format: format.to_string(),
            mode: mode.to_string(),
        }),
    }
}

pub(crate) fn open_file(path: &Path) -> Result<File> {
    File::open(path).map_err(|e| ExtractError::io(path, e))
}

pub(crate) fn read_bytes(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).map_err(|e| ExtractError::io(path, e))
}

/// Best-effort text of a caught panic payload.
#[cfg_attr(not(feature = "pdf"), allow(dead_code))]
pub(crate) fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "parser panicked".to_string()
    }
}
