//! Degraded single-page PDF summary.
//!
//! Only the PDF base-14 Helvetica fonts are used, so the page carries a
//! Latin-only summary and points the reader at the Markdown export for the
//! full Japanese content.

use std::path::{Path, PathBuf};

use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, ObjectId, Stream, dictionary};

use crate::app::export::markdown::export_filename;
use crate::app::export::sections::report_sections;
use crate::app::session::Report;
use crate::domain::AppError;

pub const ADVISORY_LINE: &str =
    "Please refer to the Markdown file for detailed content with Japanese text.";
pub const NON_LATIN_PLACEHOLDER: &str = "(see Markdown export)";

const PAGE_WIDTH_PT: f32 = 595.28;
const PAGE_HEIGHT_PT: f32 = 841.89;
const PT_PER_MM: f64 = 72.0 / 25.4;
const MAX_VALUE_CHARS: usize = 80;
/// Rough Helvetica advance width in em, used only for centering.
const AVERAGE_GLYPH_EM: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Font {
    Regular,
    Bold,
}

impl Font {
    fn resource(self) -> &'static str {
        match self {
            Font::Regular => "F1",
            Font::Bold => "F2",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Align {
    Left,
    Center,
}

#[derive(Debug, Clone, PartialEq)]
struct TextLine {
    text: String,
    font: Font,
    size: f64,
    x_mm: f64,
    y_mm: f64,
    align: Align,
}

impl TextLine {
    fn centered(text: impl Into<String>, font: Font, size: f64, y_mm: f64) -> Self {
        Self { text: text.into(), font, size, x_mm: 105.0, y_mm, align: Align::Center }
    }

    fn left(text: impl Into<String>, font: Font, size: f64, x_mm: f64, y_mm: f64) -> Self {
        Self { text: text.into(), font, size, x_mm, y_mm, align: Align::Left }
    }

    fn position(&self) -> (f64, f64) {
        let mut x = self.x_mm * PT_PER_MM;
        if self.align == Align::Center {
            let width = self.text.chars().count() as f64 * self.size * AVERAGE_GLYPH_EM;
            x = (x - width / 2.0).max(0.0);
        }
        (x, f64::from(PAGE_HEIGHT_PT) - self.y_mm * PT_PER_MM)
    }
}

/// Value safe for the base-14 fonts, or the placeholder.
fn latin(value: &str) -> String {
    let value = value.trim();
    if !value.chars().all(|c| c.is_ascii() && !c.is_ascii_control()) {
        return NON_LATIN_PLACEHOLDER.to_string();
    }
    if value.chars().count() > MAX_VALUE_CHARS {
        let mut truncated: String = value.chars().take(MAX_VALUE_CHARS - 3).collect();
        truncated.push_str("...");
        truncated
    } else {
        value.to_string()
    }
}

fn page_lines(report: &Report) -> Vec<TextLine> {
    let brief = &report.brief;
    let mut lines = vec![
        TextLine::centered("Marketing Strategy Report", Font::Bold, 20.0, 20.0),
        TextLine::centered(
            format!("Generated: {}", report.generated_at.format("%Y/%m/%d")),
            Font::Regular,
            10.0,
            30.0,
        ),
        TextLine::centered(ADVISORY_LINE, Font::Regular, 12.0, 50.0),
        TextLine::left("Basic Information", Font::Bold, 14.0, 20.0, 70.0),
    ];

    let goal = format!("{} ({})", latin(brief.goal.trim()), latin(&brief.goal_value));
    let facts = [
        ("Business Type", brief.business_type.as_str().to_string()),
        ("Business", latin(&brief.business)),
        ("Product", latin(&brief.product)),
        ("Goal", goal),
        ("Budget", latin(&brief.budget)),
        ("Period", latin(&brief.period)),
        ("Target", latin(&brief.persona)),
    ];
    let mut y = 80.0;
    for (label, value) in facts {
        lines.push(TextLine::left(format!("{}: {}", label, value), Font::Regular, 10.0, 20.0, y));
        y += 8.0;
    }

    y += 12.0;
    lines.push(TextLine::left("Report Sections", Font::Bold, 14.0, 20.0, y));
    y += 10.0;
    for section in report_sections(&report.document) {
        let entry = format!("{}. {}", section.number, section.key.latin_title());
        lines.push(TextLine::left(entry, Font::Regular, 10.0, 25.0, y));
        y += 8.0;
    }

    lines.push(TextLine::centered("Generated by strategy-maker", Font::Regular, 8.0, 285.0));
    lines
}

fn content_stream(lines: &[TextLine]) -> Content {
    let mut operations = Vec::with_capacity(lines.len() * 5);
    for line in lines {
        let (x, y) = line.position();
        operations.push(Operation::new("BT", vec![]));
        let font = Object::Name(line.font.resource().as_bytes().to_vec());
        operations.push(Operation::new("Tf", vec![font, Object::Real(line.size as f32)]));
        operations.push(Operation::new("Td", vec![Object::Real(x as f32), Object::Real(y as f32)]));
        operations.push(Operation::new("Tj", vec![Object::string_literal(line.text.as_str())]));
        operations.push(Operation::new("ET", vec![]));
    }
    Content { operations }
}

fn helvetica(doc: &mut Document, base_font: &str) -> ObjectId {
    doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => base_font,
        "Encoding" => "WinAnsiEncoding",
    })
}

fn build_document(content: Content) -> Result<Document, lopdf::Error> {
    let mut doc = Document::with_version("1.4");
    let pages_id = doc.new_object_id();

    let regular = helvetica(&mut doc, "Helvetica");
    let bold = helvetica(&mut doc, "Helvetica-Bold");
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            Font::Regular.resource() => regular,
            Font::Bold.resource() => bold,
        },
    });

    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
    });
    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => vec![page_id.into()],
        "Count" => 1,
        "Resources" => resources_id,
        "MediaBox" => vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Real(PAGE_WIDTH_PT),
            Object::Real(PAGE_HEIGHT_PT),
        ],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    Ok(doc)
}

/// Render the one-page summary as PDF bytes.
pub fn render_pdf(report: &Report) -> Result<Vec<u8>, AppError> {
    let lines = page_lines(report);
    let mut doc =
        build_document(content_stream(&lines)).map_err(|e| AppError::PdfExport(e.to_string()))?;
    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).map_err(|e| AppError::PdfExport(e.to_string()))?;
    Ok(bytes)
}

pub fn write_pdf(report: &Report, dir: &Path) -> Result<PathBuf, AppError> {
    let bytes = render_pdf(report)?;
    let path = dir.join(export_filename(report.generated_at.date_naive(), "pdf"));
    std::fs::write(&path, bytes).map_err(|e| {
        tracing::error!(path = %path.display(), error = %e, "pdf export failed");
        AppError::PdfExport(e.to_string())
    })?;
    tracing::info!(path = %path.display(), "pdf summary written");
    Ok(path)
}
