use std::collections::HashSet;
use std::sync::{Arc, OnceLock};

use tracing::debug;

use crate::config::{Config, ProbeConfig};
use crate::models::DocumentFormat;

/// Answers "is the backing parser for this format usable here?".
///
/// Crate-backed formats resolve to whether their cargo feature was compiled
/// in; `.doc` resolves by locating the helper executable on `PATH`. Each
/// format is resolved at most once per probe and the answer is memoized.
/// Resolution never fails: anything that goes wrong reads as unavailable.
#[derive(Debug)]
pub struct CapabilityProbe {
    disabled: HashSet<DocumentFormat>,
    antiword_path: String,
    resolved: [OnceLock<bool>; 7],
}

impl CapabilityProbe {
    pub fn new(config: &ProbeConfig) -> Self {
        Self {
            disabled: config.disabled_formats.iter().copied().collect(),
            antiword_path: config.antiword_path.clone(),
            resolved: Default::default(),
        }
    }

    /// Process-wide probe built from the environment.
    pub fn shared() -> Arc<Self> {
        static SHARED: OnceLock<Arc<CapabilityProbe>> = OnceLock::new();
        SHARED
            .get_or_init(|| Arc::new(Self::new(&Config::from_env().probe)))
            .clone()
    }

    pub fn probe(&self, format: DocumentFormat) -> bool {
        if self.disabled.contains(&format) {
            return false;
        }
        *self.resolved[format.index()].get_or_init(|| {
            let available = self.resolve(format);
            debug!(
                format = %format,
                collaborator = format.collaborator(),
                available,
                "Resolved extraction dependency"
            );
            available
        })
    }

    /// Path of the `.doc` helper, if it can be found.
    pub fn antiword_binary(&self) -> Option<std::path::PathBuf> {
        which::which(&self.antiword_path).ok()
    }

    fn resolve(&self, format: DocumentFormat) -> bool {
        match format {
            DocumentFormat::Pdf => cfg!(feature = "pdf"),
            DocumentFormat::Doc => self.antiword_binary().is_some(),
            DocumentFormat::Docx => cfg!(feature = "docx"),
            DocumentFormat::Xlsx => cfg!(feature = "xlsx"),
            DocumentFormat::Pptx => cfg!(feature = "pptx"),
            DocumentFormat::Txt => true,
            DocumentFormat::Msg => cfg!(feature = "msg"),
        }
    }
}

impl Default for CapabilityProbe {
    fn default() -> Self {
        Self::new(&ProbeConfig::default())
    }
}
