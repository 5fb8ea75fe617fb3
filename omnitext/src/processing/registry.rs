//! Extension token to extractor mapping.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::config::ExtractorConfig;
use crate::error::{ExtractError, Result};
use crate::models::{DocumentFormat, ExtensionToken};
use crate::processing::extractors::{
    DocExtractor, DocxExtractor, FormatExtractor, MsgExtractor, PdfExtractor, PptxExtractor,
    TxtExtractor, XlsxExtractor,
};
use crate::processing::CapabilityProbe;

/// Builds a fresh extractor for one dispatch.
pub type ExtractorFactory = Arc<dyn Fn() -> Box<dyn FormatExtractor> + Send + Sync>;

/// Registry of extractor factories keyed by [`ExtensionToken`].
///
/// Re-registering a token replaces the previous factory (last write wins).
/// The empty token never resolves, even if something was registered under it.
pub struct ExtractorRegistry {
    entries: HashMap<ExtensionToken, ExtractorFactory>,
}

impl ExtractorRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Registry with the seven built-in formats, all sharing `probe`.
    pub fn with_defaults(probe: Arc<CapabilityProbe>, config: &ExtractorConfig) -> Self {
        let mut registry = Self::new();

        for format in DocumentFormat::ALL {
            let probe = probe.clone();
            let config = config.clone();
            registry.register(format, move || build_extractor(format, &probe, &config));
        }

        registry
    }

    /// Register `factory` under `token`, returning the factory it replaced.
    pub fn register<F>(&mut self, token: impl Into<ExtensionToken>, factory: F) -> Option<ExtractorFactory>
    where
        F: Fn() -> Box<dyn FormatExtractor> + Send + Sync + 'static,
    {
        self.entries.insert(token.into(), Arc::new(factory))
    }

    /// Look up the factory for `token`. Case and a leading `.` are ignored.
    pub fn resolve(&self, token: impl Into<ExtensionToken>) -> Result<ExtractorFactory> {
        let token = token.into();
        if token.is_empty() {
            return Err(ExtractError::unsupported(token.as_str()));
        }
        self.entries
            .get(&token)
            .cloned()
            .ok_or_else(|| ExtractError::unsupported(token.as_str()))
    }

    pub fn contains(&self, token: impl Into<ExtensionToken>) -> bool {
        let token = token.into();
        !token.is_empty() && self.entries.contains_key(&token)
    }

    /// Registered tokens, sorted.
    pub fn tokens(&self) -> Vec<ExtensionToken> {
        let mut tokens: Vec<_> = self.entries.keys().cloned().collect();
        tokens.sort();
        tokens
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for ExtractorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ExtractorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtractorRegistry")
            .field("tokens", &self.tokens())
            .finish()
    }
}

fn build_extractor(
    format: DocumentFormat,
    probe: &Arc<CapabilityProbe>,
    config: &ExtractorConfig,
) -> Box<dyn FormatExtractor> {
    let probe = probe.clone();
    match format {
        DocumentFormat::Pdf => Box::new(PdfExtractor::with_probe(probe)),
        DocumentFormat::Doc => Box::new(DocExtractor::with_probe(probe)),
        DocumentFormat::Docx => Box::new(DocxExtractor::with_probe(probe)),
        DocumentFormat::Xlsx => {
            Box::new(XlsxExtractor::with_probe(probe).with_max_rows(config.xlsx_max_rows))
        }
        DocumentFormat::Pptx => {
            Box::new(PptxExtractor::with_probe(probe).with_notes(config.pptx_include_notes))
        }
        DocumentFormat::Txt => Box::new(TxtExtractor::with_probe(probe).with_mode(config.txt_mode)),
        DocumentFormat::Msg => {
            Box::new(MsgExtractor::with_probe(probe).with_headers(config.msg_include_headers))
        }
    }
}
