#![allow(dead_code)]

use std::fs;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use omnitext::config::{ExtractorConfig, ProbeConfig};
use omnitext::{CapabilityProbe, DocumentFormat, ExtractionFactory, ExtractorRegistry};

/// Probe that ignores the environment, with `disabled` forced unavailable.
pub fn local_probe(disabled: Vec<DocumentFormat>) -> Arc<CapabilityProbe> {
    Arc::new(CapabilityProbe::new(&ProbeConfig {
        disabled_formats: disabled,
        ..ProbeConfig::default()
    }))
}

pub fn local_factory(disabled: Vec<DocumentFormat>) -> ExtractionFactory {
    ExtractionFactory::new(ExtractorRegistry::with_defaults(
        local_probe(disabled),
        &ExtractorConfig::default(),
    ))
}

fn xml_escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn write_zip(path: &Path, parts: &[(String, String)]) {
    use zip::write::SimpleFileOptions;

    let mut buffer = Cursor::new(Vec::new());
    {
        let mut zip = zip::ZipWriter::new(&mut buffer);
        let options = SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Deflated)
            .unix_permissions(0o644);

        for (name, content) in parts {
            zip.start_file(name.as_str(), options).unwrap();
            zip.write_all(content.as_bytes()).unwrap();
        }
        zip.finish().unwrap();
    }
    fs::write(path, buffer.into_inner()).expect("Failed to write OOXML fixture");
}

// ---------------------------------------------------------------------------
// PPTX
// ---------------------------------------------------------------------------

pub struct SlideContent {
    pub title: String,
    pub body: String,
    pub notes: Option<String>,
}

impl SlideContent {
    pub fn new(title: &str, body: &str) -> Self {
        Self {
            title: title.to_string(),
            body: body.to_string(),
            notes: None,
        }
    }

    pub fn with_notes(mut self, notes: &str) -> Self {
        self.notes = Some(notes.to_string());
        self
    }
}

/// Writes a presentation whose slide parts are stored in reverse order, so
/// only `presentation.xml` determines the reading order.
pub fn write_pptx(dir: &Path, name: &str, slides: &[SlideContent]) -> PathBuf {
    let order: Vec<usize> = (1..=slides.len()).collect();
    write_pptx_ordered(dir, name, slides, &order)
}

/// `slides[k - 1]` is stored as `slideK.xml`; `order` lists part numbers in
/// presentation order. Notes parts are numbered backwards and reached only
/// through each slide's relationships.
pub fn write_pptx_ordered(
    dir: &Path,
    name: &str,
    slides: &[SlideContent],
    order: &[usize],
) -> PathBuf {
    let path = dir.join(name);
    let count = slides.len();

    let mut parts = vec![
        ("[Content_Types].xml".to_string(), pptx_content_types(count)),
        ("_rels/.rels".to_string(), PPTX_RELS.to_string()),
        ("ppt/presentation.xml".to_string(), presentation_xml(order)),
        (
            "ppt/_rels/presentation.xml.rels".to_string(),
            presentation_rels(count),
        ),
    ];

    for (i, slide) in slides.iter().enumerate().rev() {
        let part = i + 1;
        parts.push((
            format!("ppt/slides/slide{part}.xml"),
            slide_xml(&[slide.title.as_str(), slide.body.as_str()]),
        ));
        if let Some(notes) = &slide.notes {
            let notes_part = count + 1 - part;
            parts.push((
                format!("ppt/slides/_rels/slide{part}.xml.rels"),
                slide_rels(notes_part),
            ));
            parts.push((
                format!("ppt/notesSlides/notesSlide{notes_part}.xml"),
                slide_xml(&[notes.as_str()]),
            ));
        }
    }

    write_zip(&path, &parts);
    path
}

fn slide_rels(notes_part: usize) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
    <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout" Target="../slideLayouts/slideLayout1.xml"/>
    <Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/notesSlide" Target="../notesSlides/notesSlide{notes_part}.xml"/>
</Relationships>"#
    )
}

fn pptx_content_types(count: usize) -> String {
    let overrides: String = (1..=count)
        .map(|i| {
            format!(
                r#"<Override PartName="/ppt/slides/slide{i}.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slide+xml"/>"#
            )
        })
        .collect();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
    <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
    <Default Extension="xml" ContentType="application/xml"/>
    <Override PartName="/ppt/presentation.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml"/>
    {overrides}
</Types>"#
    )
}

const PPTX_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
    <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="ppt/presentation.xml"/>
</Relationships>"#;

fn presentation_xml(order: &[usize]) -> String {
    let ids: String = order
        .iter()
        .map(|part| format!(r#"<p:sldId id="{}" r:id="rId{}"/>"#, 255 + part, part + 1))
        .collect();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:presentation xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main">
    <p:sldIdLst>{ids}</p:sldIdLst>
</p:presentation>"#
    )
}

fn presentation_rels(count: usize) -> String {
    // rId1 is taken by a non-slide relationship.
    let rels: String = (1..=count)
        .map(|i| {
            format!(
                r#"<Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide" Target="slides/slide{i}.xml"/>"#,
                i + 1
            )
        })
        .collect();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
    <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster" Target="slideMasters/slideMaster1.xml"/>
    {rels}
</Relationships>"#
    )
}

fn slide_xml(paragraphs: &[&str]) -> String {
    let body: String = paragraphs
        .iter()
        .filter(|p| !p.is_empty())
        .map(|p| format!("<a:p><a:r><a:t>{}</a:t></a:r></a:p>", xml_escape(p)))
        .collect();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sld xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main">
    <p:cSld><p:spTree><p:sp><p:txBody><a:bodyPr/>{body}</p:txBody></p:sp></p:spTree></p:cSld>
</p:sld>"#
    )
}

// ---------------------------------------------------------------------------
// XLSX
// ---------------------------------------------------------------------------

/// Writes a workbook using inline strings. Empty cells are omitted from the
/// sheet XML, as spreadsheet applications do.
pub fn write_xlsx(dir: &Path, name: &str, sheets: &[(&str, Vec<Vec<&str>>)]) -> PathBuf {
    let path = dir.join(name);

    let sheet_entries: String = sheets
        .iter()
        .enumerate()
        .map(|(i, (sheet_name, _))| {
            format!(
                r#"<sheet name="{}" sheetId="{}" r:id="rId{}"/>"#,
                xml_escape(sheet_name),
                i + 1,
                i + 1
            )
        })
        .collect();
    let sheet_rels: String = (1..=sheets.len())
        .map(|i| {
            format!(
                r#"<Relationship Id="rId{i}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet{i}.xml"/>"#
            )
        })
        .collect();
    let sheet_overrides: String = (1..=sheets.len())
        .map(|i| {
            format!(
                r#"<Override PartName="/xl/worksheets/sheet{i}.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>"#
            )
        })
        .collect();

    let mut parts = vec![
        (
            "[Content_Types].xml".to_string(),
            format!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
    <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
    <Default Extension="xml" ContentType="application/xml"/>
    <Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>
    {sheet_overrides}
</Types>"#
            ),
        ),
        (
            "_rels/.rels".to_string(),
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
    <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>
</Relationships>"#
                .to_string(),
        ),
        (
            "xl/workbook.xml".to_string(),
            format!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
    <sheets>{sheet_entries}</sheets>
</workbook>"#
            ),
        ),
        (
            "xl/_rels/workbook.xml.rels".to_string(),
            format!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
    {sheet_rels}
</Relationships>"#
            ),
        ),
    ];

    for (i, (_, rows)) in sheets.iter().enumerate() {
        parts.push((format!("xl/worksheets/sheet{}.xml", i + 1), sheet_xml(rows)));
    }

    write_zip(&path, &parts);
    path
}

fn sheet_xml(rows: &[Vec<&str>]) -> String {
    let rows_xml: String = rows
        .iter()
        .enumerate()
        .map(|(r, row)| {
            let cells: String = row
                .iter()
                .enumerate()
                .filter(|(_, value)| !value.is_empty())
                .map(|(c, value)| {
                    let column = (b'A' + c as u8) as char;
                    format!(
                        r#"<c r="{column}{}" t="inlineStr"><is><t>{}</t></is></c>"#,
                        r + 1,
                        xml_escape(value)
                    )
                })
                .collect();
            format!(r#"<row r="{}">{cells}</row>"#, r + 1)
        })
        .collect();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
    <sheetData>{rows_xml}</sheetData>
</worksheet>"#
    )
}

// ---------------------------------------------------------------------------
// DOCX
// ---------------------------------------------------------------------------

pub fn write_docx(dir: &Path, name: &str, docx: docx_rs::Docx) -> PathBuf {
    let path = dir.join(name);
    let mut buffer = Cursor::new(Vec::new());
    docx.build().pack(&mut buffer).expect("Failed to pack DOCX");
    fs::write(&path, buffer.into_inner()).expect("Failed to write DOCX fixture");
    path
}

pub fn plain_docx(paragraphs: &[&str]) -> docx_rs::Docx {
    use docx_rs::{Docx, Paragraph, Run};

    paragraphs.iter().fold(Docx::new(), |docx, text| {
        docx.add_paragraph(Paragraph::new().add_run(Run::new().add_text(*text)))
    })
}

// ---------------------------------------------------------------------------
// PDF
// ---------------------------------------------------------------------------

/// One page per entry, each drawing its text with a standard Type1 font.
pub fn write_pdf(dir: &Path, name: &str, pages: &[&str]) -> PathBuf {
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Document, Object, Stream};

    let path = dir.join(name);

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    });

    let mut kids = Vec::new();
    for text in pages {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 24.into()]),
                Operation::new("Td", vec![100.into(), 700.into()]),
                Operation::new("Tj", vec![Object::string_literal(*text)]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(Object::from(page_id));
    }

    let pages_dict = dictionary! {
        "Type" => "Pages",
        "Count" => kids.len() as i64,
        "Kids" => kids,
        "Resources" => resources_id,
        "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();
    doc.save(&path).expect("Failed to write PDF fixture");
    path
}

// ---------------------------------------------------------------------------
// MSG
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct MsgFixture<'a> {
    pub subject: Option<&'a str>,
    pub sender_name: Option<&'a str>,
    pub sender_email: Option<&'a str>,
    pub to: Option<&'a str>,
    pub cc: Option<&'a str>,
    pub body: Option<&'a str>,
    /// Seconds since the Unix epoch.
    pub submitted_at: Option<i64>,
    /// Store string properties as 8-bit `001E` streams instead of UTF-16.
    pub ansi: bool,
}

pub fn write_msg(dir: &Path, name: &str, fixture: &MsgFixture<'_>) -> PathBuf {
    let path = dir.join(name);
    let mut compound = cfb::create(&path).expect("Failed to create MSG fixture");

    let strings = [
        ("0037", fixture.subject),
        ("0C1A", fixture.sender_name),
        ("0C1F", fixture.sender_email),
        ("0E04", fixture.to),
        ("0E03", fixture.cc),
        ("1000", fixture.body),
    ];
    for (tag, value) in strings {
        let Some(value) = value else { continue };
        let (kind, data): (&str, Vec<u8>) = if fixture.ansi {
            ("001E", value.as_bytes().to_vec())
        } else {
            (
                "001F",
                value.encode_utf16().flat_map(u16::to_le_bytes).collect(),
            )
        };
        compound
            .create_stream(format!("/__substg1.0_{tag}{kind}"))
            .unwrap()
            .write_all(&data)
            .unwrap();
    }

    // 32-byte header followed by one PT_SYSTIME entry for the submit time.
    let mut properties = vec![0u8; 32];
    if let Some(secs) = fixture.submitted_at {
        let filetime = ((secs + 11_644_473_600) as u64) * 10_000_000;
        properties.extend_from_slice(&[0x40, 0x00, 0x39, 0x00, 0x06, 0x00, 0x00, 0x00]);
        properties.extend_from_slice(&filetime.to_le_bytes());
    }
    compound
        .create_stream("/__properties_version1.0")
        .unwrap()
        .write_all(&properties)
        .unwrap();

    compound.flush().unwrap();
    path
}
