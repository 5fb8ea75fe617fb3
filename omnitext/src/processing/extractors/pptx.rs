//! PPTX extractor using zip + quick-xml

use std::path::Path;
use std::sync::Arc;

use super::{ensure_available, ensure_text_mode, open_file, FormatExtractor};
use crate::error::Result;
use crate::models::{DocumentFormat, ExtractOptions, ExtractedContent};
use crate::processing::CapabilityProbe;

pub struct PptxExtractor {
    probe: Arc<CapabilityProbe>,
    include_notes: bool,
}

impl PptxExtractor {
    pub fn new() -> Self {
        Self::with_probe(CapabilityProbe::shared())
    }

    pub fn with_probe(probe: Arc<CapabilityProbe>) -> Self {
        Self {
            probe,
            include_notes: false,
        }
    }

    /// Append speaker notes to each slide's unit.
    pub fn with_notes(mut self, include_notes: bool) -> Self {
        self.include_notes = include_notes;
        self
    }
}

impl Default for PptxExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FormatExtractor for PptxExtractor {
    fn name(&self) -> &'static str {
        DocumentFormat::Pptx.as_str()
    }

    fn collaborator(&self) -> &'static str {
        DocumentFormat::Pptx.collaborator()
    }

    fn is_available(&self) -> bool {
        self.probe.probe(DocumentFormat::Pptx)
    }

    fn extract_with(&self, path: &Path, options: &ExtractOptions) -> Result<ExtractedContent> {
        ensure_available(self)?;
        ensure_text_mode(self.name(), options)?;

        let file = open_file(path)?;
        let slides = package::read_slides(file, self.include_notes)?;

        let title = slides
            .first()
            .and_then(|slide| slide.lines().next())
            .map(|line| line.trim().to_string())
            .filter(|line| !line.is_empty());

        Ok(ExtractedContent::new(self.name(), slides).with_title(title))
    }
}

#[cfg(not(feature = "pptx"))]
mod package {
    use crate::error::{ExtractError, Result};
    use crate::models::DocumentFormat;

    pub(super) fn read_slides(_file: std::fs::File, _include_notes: bool) -> Result<Vec<String>> {
        let format = DocumentFormat::Pptx;
        Err(ExtractError::unavailable(
            format.as_str(),
            format.collaborator(),
        ))
    }
}

#[cfg(feature = "pptx")]
mod package {
    use quick_xml::events::Event;
    use quick_xml::Reader;
    use std::collections::HashMap;
    use std::io::{Read, Seek};
    use zip::ZipArchive;

    use crate::error::{ExtractError, Result};

    const SLIDE_REL: &str = "/slide";
    const NOTES_SLIDE_REL: &str = "/notesSlide";

    fn malformed(message: String) -> ExtractError {
        ExtractError::malformed("pptx", message)
    }

    /// One relationship from a `.rels` part, with its target resolved to a
    /// package path.
    struct Relationship {
        id: String,
        rel_type: String,
        target: String,
    }

    /// One string per slide in presentation order. Slide paragraphs are
    /// newline-joined.
    pub(super) fn read_slides<R: Read + Seek>(reader: R, include_notes: bool) -> Result<Vec<String>> {
        let mut archive =
            ZipArchive::new(reader).map_err(|e| malformed(format!("PPTX parse error: {e}")))?;

        let slide_order = get_slide_order(&mut archive)?;
        if slide_order.is_empty() {
            return Ok(Vec::new());
        }

        let slide_mapping = get_slide_mapping(&mut archive)?;
        let mut slides = Vec::with_capacity(slide_order.len());

        for (slide_num, r_id) in slide_order.iter().enumerate() {
            let slide_path = match slide_mapping.get(r_id) {
                Some(path) => path.clone(),
                None => format!("ppt/slides/slide{}.xml", slide_num + 1),
            };

            let mut slide_text = extract_slide_content(&mut archive, &slide_path)?;

            if include_notes {
                if let Some(notes) = extract_notes(&mut archive, &slide_path)? {
                    if !slide_text.is_empty() {
                        slide_text.push('\n');
                    }
                    slide_text.push_str(&notes);
                }
            }

            slides.push(slide_text);
        }

        Ok(slides)
    }

    fn get_slide_order<R: Read + Seek>(archive: &mut ZipArchive<R>) -> Result<Vec<String>> {
        let xml = read_file_from_archive(archive, "ppt/presentation.xml")?;

        let mut reader = Reader::from_str(&xml);
        reader.config_mut().trim_text(true);

        let mut slide_ids = Vec::new();
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Empty(e)) | Ok(Event::Start(e)) => {
                    if e.name().as_ref() == b"p:sldId" {
                        for attr in e.attributes().flatten() {
                            if attr.key.as_ref() == b"r:id" {
                                if let Ok(val) = std::str::from_utf8(&attr.value) {
                                    slide_ids.push(val.to_string());
                                }
                            }
                        }
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(malformed(format!("Error parsing presentation.xml: {e}"))),
                _ => {}
            }
            buf.clear();
        }

        Ok(slide_ids)
    }

    fn get_slide_mapping<R: Read + Seek>(
        archive: &mut ZipArchive<R>,
    ) -> Result<HashMap<String, String>> {
        let relationships = read_relationships(archive, "ppt/presentation.xml")?;
        Ok(relationships
            .into_iter()
            .filter(|rel| rel.rel_type.ends_with(SLIDE_REL))
            .map(|rel| (rel.id, rel.target))
            .collect())
    }

    /// `ppt/slides/slide3.xml` -> `ppt/slides/_rels/slide3.xml.rels`
    fn rels_path_for(part_path: &str) -> String {
        match part_path.rsplit_once('/') {
            Some((dir, file)) => format!("{dir}/_rels/{file}.rels"),
            None => format!("_rels/{part_path}.rels"),
        }
    }

    /// Resolve a relationship target against the directory of its source part.
    fn resolve_target(source_part: &str, target: &str) -> String {
        if let Some(absolute) = target.strip_prefix('/') {
            return absolute.to_string();
        }

        let mut segments: Vec<&str> = match source_part.rsplit_once('/') {
            Some((dir, _)) => dir.split('/').filter(|s| !s.is_empty()).collect(),
            None => Vec::new(),
        };
        for segment in target.split('/') {
            match segment {
                "" | "." => {}
                ".." => {
                    segments.pop();
                }
                other => segments.push(other),
            }
        }
        segments.join("/")
    }

    fn read_relationships<R: Read + Seek>(
        archive: &mut ZipArchive<R>,
        source_part: &str,
    ) -> Result<Vec<Relationship>> {
        let rels_path = rels_path_for(source_part);
        let xml = read_file_from_archive(archive, &rels_path)?;

        let mut reader = Reader::from_str(&xml);
        reader.config_mut().trim_text(true);

        let mut relationships = Vec::new();
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Empty(e)) | Ok(Event::Start(e)) => {
                    if e.name().as_ref() == b"Relationship" {
                        let mut id = None;
                        let mut target = None;
                        let mut rel_type = None;

                        for attr in e.attributes().flatten() {
                            let value = std::str::from_utf8(&attr.value).ok().map(String::from);
                            match attr.key.as_ref() {
                                b"Id" => id = value,
                                b"Target" => target = value,
                                b"Type" => rel_type = value,
                                _ => {}
                            }
                        }

                        if let (Some(id), Some(target), Some(rel_type)) = (id, target, rel_type) {
                            relationships.push(Relationship {
                                id,
                                rel_type,
                                target: resolve_target(source_part, &target),
                            });
                        }
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(malformed(format!("Error parsing {rels_path}: {e}"))),
                _ => {}
            }
            buf.clear();
        }

        Ok(relationships)
    }

    /// Every slide listed in presentation.xml must be present and parse.
    fn extract_slide_content<R: Read + Seek>(
        archive: &mut ZipArchive<R>,
        slide_path: &str,
    ) -> Result<String> {
        let xml = read_file_from_archive(archive, slide_path)?;
        extract_text_from_xml(slide_path, &xml)
    }

    /// Notes linked from the slide's own relationships. A slide without a
    /// rels part or without a notes relationship has no notes.
    fn extract_notes<R: Read + Seek>(
        archive: &mut ZipArchive<R>,
        slide_path: &str,
    ) -> Result<Option<String>> {
        let rels_path = rels_path_for(slide_path);
        if !archive.file_names().any(|name| name == rels_path) {
            return Ok(None);
        }

        let notes_path = read_relationships(archive, slide_path)?
            .into_iter()
            .find(|rel| rel.rel_type.ends_with(NOTES_SLIDE_REL))
            .map(|rel| rel.target);
        let Some(notes_path) = notes_path else {
            return Ok(None);
        };

        let xml = read_file_from_archive(archive, &notes_path)?;
        let text = extract_text_from_xml(&notes_path, &xml)?;
        if text.trim().is_empty() {
            Ok(None)
        } else {
            Ok(Some(text))
        }
    }

    pub(super) fn extract_text_from_xml(part_path: &str, xml: &str) -> Result<String> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(false);

        let mut text_parts = Vec::new();
        let mut current_paragraph = String::new();
        let mut in_text_element = false;
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => {
                    if e.name().as_ref() == b"a:t" {
                        in_text_element = true;
                    }
                }
                Ok(Event::Text(e)) => {
                    if in_text_element {
                        if let Ok(text) = std::str::from_utf8(e.as_ref()) {
                            current_paragraph.push_str(&unescape_xml(text));
                        }
                    }
                }
                Ok(Event::GeneralRef(e)) => {
                    if in_text_element {
                        if let Some(ch) = resolve_entity(&e) {
                            current_paragraph.push(ch);
                        }
                    }
                }
                Ok(Event::End(e)) => {
                    if e.name().as_ref() == b"a:t" {
                        in_text_element = false;
                    } else if e.name().as_ref() == b"a:p" {
                        let trimmed = current_paragraph.trim().to_string();
                        if !trimmed.is_empty() {
                            text_parts.push(trimmed);
                        }
                        current_paragraph.clear();
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(malformed(format!("Error parsing {part_path}: {e}"))),
                _ => {}
            }
            buf.clear();
        }

        let trimmed = current_paragraph.trim().to_string();
        if !trimmed.is_empty() {
            text_parts.push(trimmed);
        }

        Ok(text_parts.join("\n"))
    }

    fn resolve_entity(name: &[u8]) -> Option<char> {
        match name {
            b"lt" => Some('<'),
            b"gt" => Some('>'),
            b"amp" => Some('&'),
            b"apos" => Some('\''),
            b"quot" => Some('"'),
            _ => {
                let name = std::str::from_utf8(name).ok()?;
                let code = if let Some(hex) = name.strip_prefix("#x") {
                    u32::from_str_radix(hex, 16).ok()?
                } else {
                    name.strip_prefix('#')?.parse().ok()?
                };
                char::from_u32(code)
            }
        }
    }

    fn unescape_xml(text: &str) -> String {
        text.replace("&lt;", "<")
            .replace("&gt;", ">")
            .replace("&apos;", "'")
            .replace("&quot;", "\"")
            .replace("&amp;", "&")
    }

    fn read_file_from_archive<R: Read + Seek>(
        archive: &mut ZipArchive<R>,
        path: &str,
    ) -> Result<String> {
        let mut file = archive
            .by_name(path)
            .map_err(|e| malformed(format!("Failed to read {path} from PPTX: {e}")))?;

        let mut content = String::new();
        file.read_to_string(&mut content)
            .map_err(|e| malformed(format!("Failed to read {path} content: {e}")))?;

        Ok(content)
    }

}
