use std::env;

use crate::models::DocumentFormat;

fn parse_env_or<T: std::str::FromStr>(var: &str, default: T) -> T
where
    T::Err: std::fmt::Display,
{
    match env::var(var) {
        Ok(val) => match val.parse() {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("Invalid value '{}' for {}: {}. Using default.", val, var, e);
                default
            }
        },
        Err(_) => default,
    }
}

/// Parse `OMNITEXT_DISABLED_FORMATS`.
/// Format: comma-separated format names, e.g. `docx,msg`
fn parse_disabled_formats() -> Vec<DocumentFormat> {
    match env::var("OMNITEXT_DISABLED_FORMATS") {
        Ok(val) if !val.trim().is_empty() => val
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .filter_map(|name| match name.parse() {
                Ok(format) => Some(format),
                Err(e) => {
                    tracing::warn!("{} in OMNITEXT_DISABLED_FORMATS, skipping", e);
                    None
                }
            })
            .collect(),
        _ => Vec::new(),
    }
}

fn default_jobs() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}

#[derive(Debug, Clone)]
pub struct Config {
    pub probe: ProbeConfig,
    pub extractors: ExtractorConfig,
    pub batch: BatchConfig,
}

/// Controls how backing parsers are resolved.
#[derive(Debug, Clone)]
pub struct ProbeConfig {
    /// Formats forced to report their collaborator as unavailable.
    pub disabled_formats: Vec<DocumentFormat>,
    /// Executable used for legacy `.doc` files.
    pub antiword_path: String,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            disabled_formats: Vec::new(),
            antiword_path: "antiword".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TxtMode {
    #[default]
    Whole,
    Lines,
}

impl std::str::FromStr for TxtMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "whole" | "file" => Ok(Self::Whole),
            "lines" | "line" => Ok(Self::Lines),
            _ => Err(format!("Unknown text mode: {s}")),
        }
    }
}

/// Per-format extraction knobs.
#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    pub txt_mode: TxtMode,
    pub msg_include_headers: bool,
    pub pptx_include_notes: bool,
    pub xlsx_max_rows: usize,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            txt_mode: TxtMode::Whole,
            msg_include_headers: true,
            pptx_include_notes: false,
            xlsx_max_rows: 100_000,
        }
    }
}

#[derive(Debug, Clone)]
pub struct BatchConfig {
    pub jobs: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            jobs: default_jobs(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let probe_defaults = ProbeConfig::default();
        let extractor_defaults = ExtractorConfig::default();

        Self {
            probe: ProbeConfig {
                disabled_formats: parse_disabled_formats(),
                antiword_path: env::var("OMNITEXT_ANTIWORD")
                    .unwrap_or(probe_defaults.antiword_path),
            },
            extractors: ExtractorConfig {
                txt_mode: parse_env_or("OMNITEXT_TXT_MODE", extractor_defaults.txt_mode),
                msg_include_headers: parse_env_or(
                    "OMNITEXT_MSG_HEADERS",
                    extractor_defaults.msg_include_headers,
                ),
                pptx_include_notes: parse_env_or(
                    "OMNITEXT_PPTX_NOTES",
                    extractor_defaults.pptx_include_notes,
                ),
                xlsx_max_rows: parse_env_or(
                    "OMNITEXT_XLSX_MAX_ROWS",
                    extractor_defaults.xlsx_max_rows,
                ),
            },
            batch: BatchConfig {
                jobs: parse_env_or("OMNITEXT_JOBS", default_jobs()).max(1),
            },
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::default()
    }
}
