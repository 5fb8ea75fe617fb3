use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};

use super::extractors::FormatExtractor;
use super::registry::ExtractorRegistry;
use super::CapabilityProbe;
use crate::config::Config;
use crate::error::{ExtractError, Result};
use crate::models::{ExtensionToken, ExtractOptions, ExtractedContent};

/// One row of [`ExtractionFactory::availability`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormatAvailability {
    pub token: String,
    pub name: String,
    pub collaborator: String,
    pub available: bool,
}

/// Single dispatch point from a file path to the matching extractor.
#[derive(Debug)]
pub struct ExtractionFactory {
    registry: ExtractorRegistry,
}

impl ExtractionFactory {
    pub fn new(registry: ExtractorRegistry) -> Self {
        Self { registry }
    }

    /// Built-in registry configured from `config`, with a probe of its own.
    pub fn from_config(config: &Config) -> Self {
        let probe = Arc::new(CapabilityProbe::new(&config.probe));
        Self::new(ExtractorRegistry::with_defaults(probe, &config.extractors))
    }

    pub fn registry(&self) -> &ExtractorRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut ExtractorRegistry {
        &mut self.registry
    }

    /// Extractor instance for `path`, chosen by extension.
    pub fn extractor_for(&self, path: &Path) -> Result<Box<dyn FormatExtractor>> {
        let token = ExtensionToken::from_path(path);
        let factory = self.registry.resolve(token)?;
        Ok(factory())
    }

    pub fn auto_extract(&self, path: impl AsRef<Path>) -> Result<ExtractedContent> {
        self.auto_extract_with(path, &ExtractOptions::default())
    }

    pub fn auto_extract_with(
        &self,
        path: impl AsRef<Path>,
        options: &ExtractOptions,
    ) -> Result<ExtractedContent> {
        let path = path.as_ref();
        let extractor = self.extractor_for(path)?;

        if !extractor.is_available() {
            warn!(
                path = %path.display(),
                format = extractor.name(),
                collaborator = extractor.collaborator(),
                "Extractor unavailable"
            );
            return Err(ExtractError::unavailable(
                extractor.name(),
                extractor.collaborator(),
            ));
        }

        debug!(
            path = %path.display(),
            format = extractor.name(),
            mode = %options.mode,
            "Extracting document"
        );

        extractor.extract_with(path, options)
    }

    /// Every registered token with its extractor and whether it can run here.
    pub fn availability(&self) -> Vec<FormatAvailability> {
        self.registry
            .tokens()
            .into_iter()
            .filter_map(|token| {
                let factory = self.registry.resolve(token.clone()).ok()?;
                let extractor = factory();
                Some(FormatAvailability {
                    token: token.to_string(),
                    name: extractor.name().to_string(),
                    collaborator: extractor.collaborator().to_string(),
                    available: extractor.is_available(),
                })
            })
            .collect()
    }
}

impl Default for ExtractionFactory {
    /// Built-in registry backed by the process-wide probe and environment
    /// config.
    fn default() -> Self {
        let config = Config::from_env();
        Self::new(ExtractorRegistry::with_defaults(
            CapabilityProbe::shared(),
            &config.extractors,
        ))
    }
}
