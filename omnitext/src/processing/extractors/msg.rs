//! Outlook message (.msg) extractor using cfb
//!
//! An `.msg` file is an OLE compound file. String properties live in
//! `__substg1.0_<tag><type>` streams, where type `001F` is UTF-16LE and
//! `001E` is 8-bit text. Fixed-size properties such as the submit time sit
//! in the `__properties_version1.0` stream.

use std::path::Path;
use std::sync::Arc;

use super::{ensure_available, ensure_text_mode, open_file, FormatExtractor};
use crate::error::Result;
use crate::models::{DocumentFormat, ExtractOptions, ExtractedContent};
use crate::processing::CapabilityProbe;

/// Fields pulled from a message, before they are laid out as text units.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MessageFields {
    pub subject: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub cc: Option<String>,
    pub date: Option<String>,
    pub body: Option<String>,
}

impl MessageFields {
    /// `Key: value` lines for whichever header fields are present.
    pub fn header_block(&self) -> Option<String> {
        let lines: Vec<String> = [
            ("From", &self.from),
            ("To", &self.to),
            ("Cc", &self.cc),
            ("Date", &self.date),
            ("Subject", &self.subject),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.as_ref().map(|v| format!("{key}: {v}")))
        .collect();

        if lines.is_empty() {
            None
        } else {
            Some(lines.join("\n"))
        }
    }
}

/// Header unit first (when enabled and non-empty), then the body unit.
///
/// Only the plain-text body property (`PR_BODY`) is read. Messages that carry
/// their body solely as compressed RTF or HTML yield an empty body unit.
pub struct MsgExtractor {
    probe: Arc<CapabilityProbe>,
    include_headers: bool,
}

impl MsgExtractor {
    pub fn new() -> Self {
        Self::with_probe(CapabilityProbe::shared())
    }

    pub fn with_probe(probe: Arc<CapabilityProbe>) -> Self {
        Self {
            probe,
            include_headers: true,
        }
    }

    pub fn with_headers(mut self, include_headers: bool) -> Self {
        self.include_headers = include_headers;
        self
    }
}

impl Default for MsgExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FormatExtractor for MsgExtractor {
    fn name(&self) -> &'static str {
        DocumentFormat::Msg.as_str()
    }

    fn collaborator(&self) -> &'static str {
        DocumentFormat::Msg.collaborator()
    }

    fn is_available(&self) -> bool {
        self.probe.probe(DocumentFormat::Msg)
    }

    fn extract_with(&self, path: &Path, options: &ExtractOptions) -> Result<ExtractedContent> {
        ensure_available(self)?;
        ensure_text_mode(self.name(), options)?;

        let file = open_file(path)?;
        let fields = compound::read_fields(file)?;

        let mut units = Vec::new();
        if self.include_headers {
            if let Some(header) = fields.header_block() {
                units.push(header);
            }
        }
        units.push(
            fields
                .body
                .as_deref()
                .map(str::trim_end)
                .unwrap_or_default()
                .to_string(),
        );

        Ok(ExtractedContent::new(self.name(), units).with_title(fields.subject))
    }
}

#[cfg(not(feature = "msg"))]
mod compound {
    use super::MessageFields;
    use crate::error::{ExtractError, Result};
    use crate::models::DocumentFormat;

    pub(super) fn read_fields(_file: std::fs::File) -> Result<MessageFields> {
        let format = DocumentFormat::Msg;
        Err(ExtractError::unavailable(
            format.as_str(),
            format.collaborator(),
        ))
    }
}

#[cfg(feature = "msg")]
mod compound {
    use std::io::{Read, Seek};

    use cfb::CompoundFile;
    use chrono::DateTime;

    use super::MessageFields;
    use crate::error::{ExtractError, Result};

    const PR_SUBJECT: u16 = 0x0037;
    const PR_CLIENT_SUBMIT_TIME: u16 = 0x0039;
    const PR_SENDER_NAME: u16 = 0x0C1A;
    const PR_SENDER_EMAIL_ADDRESS: u16 = 0x0C1F;
    const PR_DISPLAY_CC: u16 = 0x0E03;
    const PR_DISPLAY_TO: u16 = 0x0E04;
    const PR_BODY: u16 = 0x1000;

    const PT_STRING8: u16 = 0x001E;
    const PT_UNICODE: u16 = 0x001F;
    const PT_SYSTIME: u16 = 0x0040;

    const PROPERTIES_STREAM: &str = "/__properties_version1.0";
    /// Top-level message property streams start with a 32-byte header.
    const PROPERTIES_HEADER_LEN: usize = 32;
    const PROPERTY_ENTRY_LEN: usize = 16;

    /// Seconds between 1601-01-01 (FILETIME epoch) and 1970-01-01.
    const FILETIME_UNIX_OFFSET_SECS: i64 = 11_644_473_600;

    pub(super) fn read_fields<F: Read + Seek>(file: F) -> Result<MessageFields> {
        let mut compound = CompoundFile::open(file)
            .map_err(|e| ExtractError::malformed("msg", format!("MSG parse error: {e}")))?;

        let from = match (
            read_string(&mut compound, PR_SENDER_NAME)?,
            read_string(&mut compound, PR_SENDER_EMAIL_ADDRESS)?,
        ) {
            (Some(name), Some(email)) if name != email => Some(format!("{name} <{email}>")),
            (Some(name), _) => Some(name),
            (None, email) => email,
        };

        Ok(MessageFields {
            subject: read_string(&mut compound, PR_SUBJECT)?,
            from,
            to: read_string(&mut compound, PR_DISPLAY_TO)?,
            cc: read_string(&mut compound, PR_DISPLAY_CC)?,
            date: read_submit_time(&mut compound)?,
            body: read_string(&mut compound, PR_BODY)?,
        })
    }

    fn read_stream<F: Read + Seek>(
        compound: &mut CompoundFile<F>,
        path: &str,
    ) -> Result<Option<Vec<u8>>> {
        if !compound.is_stream(path) {
            return Ok(None);
        }
        let mut stream = compound
            .open_stream(path)
            .map_err(|e| ExtractError::malformed("msg", format!("Failed to open {path}: {e}")))?;
        let mut data = Vec::new();
        stream
            .read_to_end(&mut data)
            .map_err(|e| ExtractError::malformed("msg", format!("Failed to read {path}: {e}")))?;
        Ok(Some(data))
    }

    /// Unicode stream if present, otherwise the 8-bit one. Empty values read
    /// as absent.
    fn read_string<F: Read + Seek>(
        compound: &mut CompoundFile<F>,
        property: u16,
    ) -> Result<Option<String>> {
        let unicode_path = format!("/__substg1.0_{property:04X}{PT_UNICODE:04X}");
        let value = match read_stream(compound, &unicode_path)? {
            Some(data) => Some(decode_utf16le(&data)),
            None => {
                let ansi_path = format!("/__substg1.0_{property:04X}{PT_STRING8:04X}");
                read_stream(compound, &ansi_path)?.map(|data| decode_string8(&data))
            }
        };
        Ok(value.filter(|v| !v.trim().is_empty()))
    }

    fn read_submit_time<F: Read + Seek>(compound: &mut CompoundFile<F>) -> Result<Option<String>> {
        let Some(data) = read_stream(compound, PROPERTIES_STREAM)? else {
            return Ok(None);
        };
        Ok(find_systime(&data, PR_CLIENT_SUBMIT_TIME).and_then(filetime_to_rfc2822))
    }

    /// Scan fixed-size property entries for a PT_SYSTIME value.
    pub(super) fn find_systime(data: &[u8], property: u16) -> Option<u64> {
        let entries = data.get(PROPERTIES_HEADER_LEN..)?;
        entries
            .chunks_exact(PROPERTY_ENTRY_LEN)
            .find_map(|entry| {
                let prop_type = u16::from_le_bytes([entry[0], entry[1]]);
                let prop_id = u16::from_le_bytes([entry[2], entry[3]]);
                if prop_id == property && prop_type == PT_SYSTIME {
                    let mut value = [0u8; 8];
                    value.copy_from_slice(&entry[8..16]);
                    Some(u64::from_le_bytes(value))
                } else {
                    None
                }
            })
    }

    pub(super) fn filetime_to_rfc2822(filetime: u64) -> Option<String> {
        let secs = (filetime / 10_000_000) as i64 - FILETIME_UNIX_OFFSET_SECS;
        let nanos = ((filetime % 10_000_000) * 100) as u32;
        DateTime::from_timestamp(secs, nanos).map(|dt| dt.to_rfc2822())
    }

    pub(super) fn decode_utf16le(data: &[u8]) -> String {
        let units: Vec<u16> = data
            .chunks_exact(2)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
            .collect();
        String::from_utf16_lossy(&units)
            .trim_end_matches('\0')
            .to_string()
    }

    fn decode_string8(data: &[u8]) -> String {
        String::from_utf8_lossy(data)
            .trim_end_matches('\0')
            .to_string()
    }

}
