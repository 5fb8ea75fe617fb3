mod factory;
mod probe;
mod registry;

pub mod extractors;

use std::path::Path;

pub use extractors::FormatExtractor;
pub use factory::{ExtractionFactory, FormatAvailability};
pub use probe::CapabilityProbe;
pub use registry::{ExtractorFactory, ExtractorRegistry};

use crate::error::Result;
use crate::models::ExtractedContent;

/// Extract `path` with the built-in registry and environment configuration.
pub fn auto_extract(path: impl AsRef<Path>) -> Result<ExtractedContent> {
    ExtractionFactory::default().auto_extract(path)
}
