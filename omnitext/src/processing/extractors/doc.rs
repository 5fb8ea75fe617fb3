//! Legacy Word (.doc) extractor using the antiword command-line tool.

use std::path::Path;
use std::process::{Command, Output};
use std::sync::Arc;

use super::{ensure_available, ensure_text_mode, open_file, FormatExtractor};
use crate::error::{ExtractError, Result};
use crate::models::{DocumentFormat, ExtractOptions, ExtractedContent};
use crate::processing::CapabilityProbe;

pub struct DocExtractor {
    probe: Arc<CapabilityProbe>,
}

impl DocExtractor {
    pub fn new() -> Self {
        Self::with_probe(CapabilityProbe::shared())
    }

    pub fn with_probe(probe: Arc<CapabilityProbe>) -> Self {
        Self { probe }
    }

    fn run_antiword(&self, path: &Path) -> Result<String> {
        let binary = self
            .probe
            .antiword_binary()
            .ok_or_else(|| ExtractError::unavailable(self.name(), self.collaborator()))?;

        // -w 0 disables wrapping, so each paragraph lands on a single line
        let output = Command::new(binary).args(["-w", "0"]).arg(path).output();
        self.handle_output(output)
    }

    /// Stdout on success; a failing exit status means antiword rejected the file.
    fn handle_output(&self, result: std::io::Result<Output>) -> Result<String> {
        match result {
            Ok(output) if output.status.success() => {
                Ok(String::from_utf8_lossy(&output.stdout).into_owned())
            }
            Ok(output) => {
                let stderr = String::from_utf8_lossy(&output.stderr);
                Err(ExtractError::malformed(
                    self.name(),
                    format!("antiword failed: {}", stderr.trim()),
                ))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(ExtractError::unavailable(
                self.name(),
                self.collaborator(),
            )),
            Err(e) => Err(ExtractError::malformed(
                self.name(),
                format!("failed to run antiword: {e}"),
            )),
        }
    }
}

impl Default for DocExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FormatExtractor for DocExtractor {
    fn name(&self) -> &'static str {
        DocumentFormat::Doc.as_str()
    }

    fn collaborator(&self) -> &'static str {
        DocumentFormat::Doc.collaborator()
    }

    fn is_available(&self) -> bool {
        self.probe.probe(DocumentFormat::Doc)
    }

    fn extract_with(&self, path: &Path, options: &ExtractOptions) -> Result<ExtractedContent> {
        ensure_available(self)?;
        ensure_text_mode(self.name(), options)?;

        // Surface missing or unreadable paths as IO failures before spawning.
        drop(open_file(path)?);

        let text = self.run_antiword(path)?;
        Ok(ExtractedContent::new(self.name(), paragraphs(&text)))
    }
}

fn paragraphs(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
