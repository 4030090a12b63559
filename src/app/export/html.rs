//! Standalone HTML report export.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::app::export::markdown::export_filename;
use crate::app::export::sections::report_sections;
use crate::app::session::Report;
use crate::domain::content;
use crate::domain::{AppError, templates};

const PAGE_TEMPLATE: &str = "report/page.html.j2";

#[derive(Serialize)]
struct SectionVars {
    key: &'static str,
    number: usize,
    title: &'static str,
    body: String,
}

#[derive(Serialize)]
struct PageVars<'a> {
    generated_on: String,
    fallback_notice: Option<String>,
    business_type: &'static str,
    goal_label: String,
    goal_value: &'a str,
    budget: &'a str,
    period: &'a str,
    sections: Vec<SectionVars>,
}

/// Render the report as one self-contained HTML page.
///
/// Section bodies are re-serialized from parsed content, so only the
/// whitelisted markup survives.
pub fn render_html(report: &Report) -> Result<String, AppError> {
    let brief = &report.brief;
    let sections = report_sections(&report.document)
        .into_iter()
        .map(|section| SectionVars {
            key: section.key.as_str(),
            number: section.number,
            title: section.title(),
            body: content::to_html(&section.blocks),
        })
        .collect();

    templates::render(
        PAGE_TEMPLATE,
        PageVars {
            generated_on: report.generated_at.format("%Y/%m/%d").to_string(),
            fallback_notice: report.notice(),
            business_type: brief.business_type.as_str(),
            goal_label: brief.goal_label(),
            goal_value: brief.goal_value.trim(),
            budget: brief.budget.trim(),
            period: brief.period.trim(),
            sections,
        },
    )
}

pub fn write_html(report: &Report, dir: &Path) -> Result<PathBuf, AppError> {
    let page = render_html(report)?;
    let path = dir.join(export_filename(report.generated_at.date_naive(), "html"));
    std::fs::write(&path, page)?;
    tracing::info!(path = %path.display(), "html report written");
    Ok(path)
}
