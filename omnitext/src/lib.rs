//! Uniform text extraction for PDF, DOC, DOCX, XLSX, PPTX, TXT and MSG files.
//!
//! [`auto_extract`] picks an extractor from the file extension. Each
//! extractor can also be used directly and reports through
//! [`FormatExtractor::is_available`] whether its backing parser is usable.

pub mod config;
pub mod error;
pub mod models;
pub mod processing;

pub use config::Config;
pub use error::{ErrorKind, ExtractError, Result};
pub use models::{
    DocumentFormat, ExtensionToken, ExtractOptions, ExtractedContent, OutputMode, Workbook,
};
pub use processing::{
    auto_extract, CapabilityProbe, ExtractionFactory, ExtractorRegistry, FormatExtractor,
};
