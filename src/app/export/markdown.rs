//! Markdown report export.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::Serialize;

use crate::app::export::sections::report_sections;
use crate::app::session::Report;
use crate::domain::content;
use crate::domain::{AppError, templates};

const REPORT_TEMPLATE: &str = "report/strategy.md.j2";

#[derive(Serialize)]
struct SectionVars {
    number: usize,
    title: &'static str,
    body: String,
}

#[derive(Serialize)]
struct ReportVars<'a> {
    generated_on: String,
    fallback_notice: Option<String>,
    business_type: &'static str,
    business: &'a str,
    product: &'a str,
    goal_label: String,
    goal_value: &'a str,
    budget: &'a str,
    period: &'a str,
    persona: &'a str,
    competitors: Option<&'a str>,
    current_channels: Option<&'a str>,
    challenges: Option<&'a str>,
    competitor_urls: Vec<&'a str>,
    sections: Vec<SectionVars>,
}

/// Render the report as a Markdown document.
pub fn render_markdown(report: &Report) -> Result<String, AppError> {
    let brief = &report.brief;
    let sections = report_sections(&report.document)
        .into_iter()
        .map(|section| SectionVars {
            number: section.number,
            title: section.title(),
            body: content::to_markdown(&section.blocks),
        })
        .collect();

    let vars = ReportVars {
        generated_on: report.generated_at.format("%Y/%m/%d").to_string(),
        fallback_notice: report.notice(),
        business_type: brief.business_type.as_str(),
        business: brief.business.trim(),
        product: brief.product.trim(),
        goal_label: brief.goal_label(),
        goal_value: brief.goal_value.trim(),
        budget: brief.budget.trim(),
        period: brief.period.trim(),
        persona: brief.persona.trim(),
        competitors: brief.competitors(),
        current_channels: brief.current_channels(),
        challenges: brief.challenges(),
        competitor_urls: brief.competitor_urls(),
        sections,
    };
    templates::render(REPORT_TEMPLATE, vars)
}

/// `marketing-strategy-YYYYMMDD.<extension>`.
pub fn export_filename(date: NaiveDate, extension: &str) -> String {
    format!("marketing-strategy-{}.{}", date.format("%Y%m%d"), extension)
}

/// Write the Markdown report into `dir`, returning the file path.
pub fn write_markdown(report: &Report, dir: &Path) -> Result<PathBuf, AppError> {
    let markdown = render_markdown(report)?;
    let path = dir.join(export_filename(report.generated_at.date_naive(), "md"));
    std::fs::write(&path, markdown)?;
    tracing::info!(path = %path.display(), "markdown report written");
    Ok(path)
}
