//! Report section layout shared by the Markdown and HTML exporters.

use serde_json::Value;

use crate::domain::content::{self, Block, Inline, TableRow};
use crate::domain::{ChartData, CompetitorAnalysis, SectionKey, StrategyDocument};

/// One numbered report section as structured content.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedSection {
    pub key: SectionKey,
    pub number: usize,
    pub blocks: Vec<Block>,
}

impl RenderedSection {
    pub fn title(&self) -> &'static str {
        self.key.title()
    }
}

/// Sections in report order: all fixed sections, then optional ones present.
pub fn report_sections(document: &StrategyDocument) -> Vec<RenderedSection> {
    let keys = SectionKey::FIXED.into_iter().chain(document.present_optional_sections());
    keys.enumerate()
        .map(|(index, key)| RenderedSection {
            key,
            number: index + 1,
            blocks: document.get(key).map(|value| section_blocks(key, value)).unwrap_or_default(),
        })
        .collect()
}

/// Structured content of one section value.
pub fn section_blocks(key: SectionKey, value: &Value) -> Vec<Block> {
    if let Value::String(html) = value {
        return content::parse_fragment(html);
    }
    match key {
        SectionKey::ChartData => serde_json::from_value::<ChartData>(value.clone())
            .map(|charts| chart_blocks(&charts))
            .unwrap_or_default(),
        SectionKey::CompetitorAnalysis => {
            serde_json::from_value::<CompetitorAnalysis>(value.clone())
                .map(|analysis| competitor_blocks(&analysis))
                .unwrap_or_default()
        }
        _ => Vec::new(),
    }
}

fn text(value: impl Into<String>) -> Vec<Inline> {
    vec![Inline::Text(value.into())]
}

fn row(header: bool, cells: Vec<String>) -> TableRow {
    TableRow { header, cells: cells.into_iter().map(text).collect() }
}

fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

fn chart_blocks(charts: &ChartData) -> Vec<Block> {
    let mut blocks = Vec::new();
    for (name, series) in charts {
        blocks.push(Block::Heading(text(name.as_str())));
        let mut rows = vec![row(true, vec!["項目".to_string(), "値".to_string()])];
        for (index, label) in series.labels.iter().enumerate() {
            let value = series.values.get(index).map(|v| format_number(*v)).unwrap_or_default();
            rows.push(row(false, vec![label.clone(), value]));
        }
        blocks.push(Block::Table(rows));
    }
    blocks
}

fn competitor_blocks(analysis: &CompetitorAnalysis) -> Vec<Block> {
    let mut blocks = Vec::new();
    if !analysis.competitors.is_empty() {
        let header = ["サイト", "推定トラフィック", "主要チャネル", "強み", "弱み", "推定予算"];
        let mut rows = vec![row(true, header.iter().map(|h| h.to_string()).collect())];
        for competitor in &analysis.competitors {
            let name =
                if competitor.name.is_empty() { competitor.url.clone() } else { competitor.name.clone() };
            rows.push(row(
                false,
                vec![
                    name,
                    competitor.estimated_traffic.clone(),
                    competitor.main_channels.join("、"),
                    competitor.strengths.join("、"),
                    competitor.weaknesses.join("、"),
                    competitor.estimated_budget.clone(),
                ],
            ));
        }
        blocks.push(Block::Table(rows));
    }
    if let Some(summary) = analysis.summary.as_deref().filter(|s| !s.trim().is_empty()) {
        blocks.push(Block::Paragraph(text(summary)));
    }
    blocks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::fallback;
    use crate::testing::sample_input;
    use serde_json::json;

    #[test]
    fn fixed_sections_always_listed_then_optional() {
        let document: StrategyDocument =
            serde_json::from_value(json!({"overview": "<p>x</p>", "summary": "<p>s</p>"})).unwrap();
        let sections = report_sections(&document);
        assert_eq!(sections.len(), 9);
        assert_eq!(sections[0].key, SectionKey::Overview);
        assert!(sections[1].blocks.is_empty());
        assert_eq!(sections[8].key, SectionKey::Summary);
        assert_eq!(sections[8].number, 9);
    }

    #[test]
    fn chart_data_becomes_tables() {
        let document = fallback::synthesize(&sample_input());
        let blocks = section_blocks(SectionKey::ChartData, document.get(SectionKey::ChartData).unwrap());
        let markdown = content::to_markdown(&blocks);
        assert!(markdown.contains("### budgetAllocation"));
        assert!(markdown.contains("| 検索広告 | 30 |"));
    }

    #[test]
    fn competitor_analysis_becomes_table() {
        let mut input = sample_input();
        input.competitor_urls = vec!["https://rival.example.com".into()];
        let document = fallback::synthesize(&input);
        let value = document.get(SectionKey::CompetitorAnalysis).unwrap();
        let markdown = content::to_markdown(&section_blocks(SectionKey::CompetitorAnalysis, value));
        assert!(markdown.starts_with("| サイト |"));
        assert!(markdown.contains("rival.example.com"));
    }

    #[test]
    fn numbers_drop_trailing_zero_fraction() {
        assert_eq!(format_number(30.0), "30");
        assert_eq!(format_number(2.5), "2.5");
    }
}
