//! Strategy document returned by the generator.
//!
//! The document is kept as the JSON object the generator produced so that
//! unknown keys survive untouched; typed views are derived on demand.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Key of the boolean flag telling whether competitor sections were requested.
pub const HAS_COMPETITOR_ANALYSIS: &str = "hasCompetitorAnalysis";

/// Named section of a strategy document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SectionKey {
    Overview,
    Kpi,
    Growth,
    Tactics,
    Tasks,
    Priority,
    Roadmap,
    Forecast,
    Summary,
    ChartData,
    BudgetDetail,
    AdsStrategy,
    CompetitorAnalysis,
    Differentiation,
    WinningTactics,
}

impl SectionKey {
    /// Sections every rendered report shows, in report order.
    pub const FIXED: [SectionKey; 8] = [
        SectionKey::Overview,
        SectionKey::Kpi,
        SectionKey::Growth,
        SectionKey::Tactics,
        SectionKey::Tasks,
        SectionKey::Priority,
        SectionKey::Roadmap,
        SectionKey::Forecast,
    ];

    /// Sections only the extended or competitor-aware reports carry.
    pub const OPTIONAL: [SectionKey; 7] = [
        SectionKey::Summary,
        SectionKey::ChartData,
        SectionKey::BudgetDetail,
        SectionKey::AdsStrategy,
        SectionKey::CompetitorAnalysis,
        SectionKey::Differentiation,
        SectionKey::WinningTactics,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SectionKey::Overview => "overview",
            SectionKey::Kpi => "kpi",
            SectionKey::Growth => "growth",
            SectionKey::Tactics => "tactics",
            SectionKey::Tasks => "tasks",
            SectionKey::Priority => "priority",
            SectionKey::Roadmap => "roadmap",
            SectionKey::Forecast => "forecast",
            SectionKey::Summary => "summary",
            SectionKey::ChartData => "chartData",
            SectionKey::BudgetDetail => "budgetDetail",
            SectionKey::AdsStrategy => "adsStrategy",
            SectionKey::CompetitorAnalysis => "competitorAnalysis",
            SectionKey::Differentiation => "differentiation",
            SectionKey::WinningTactics => "winningTactics",
        }
    }

    /// Report heading.
    pub fn title(&self) -> &'static str {
        match self {
            SectionKey::Overview => "マーケティング戦略の全体像",
            SectionKey::Kpi => "目的・KPI・KGI整理",
            SectionKey::Growth => "成長戦略（AARRR）",
            SectionKey::Tactics => "施策一覧",
            SectionKey::Tasks => "詳細タスク",
            SectionKey::Priority => "施策の優先順位",
            SectionKey::Roadmap => "月次ロードマップ",
            SectionKey::Forecast => "想定KPI推移予測",
            SectionKey::Summary => "エグゼクティブサマリー",
            SectionKey::ChartData => "チャートデータ",
            SectionKey::BudgetDetail => "予算配分の詳細",
            SectionKey::AdsStrategy => "広告戦略",
            SectionKey::CompetitorAnalysis => "競合分析",
            SectionKey::Differentiation => "差別化ポイント",
            SectionKey::WinningTactics => "勝ち筋となる施策",
        }
    }

    /// Latin-script heading for outputs without CJK font support.
    pub fn latin_title(&self) -> &'static str {
        match self {
            SectionKey::Overview => "Marketing Strategy Overview",
            SectionKey::Kpi => "Purpose / KPI / KGI",
            SectionKey::Growth => "Growth Strategy (AARRR)",
            SectionKey::Tactics => "Tactics List",
            SectionKey::Tasks => "Detailed Tasks",
            SectionKey::Priority => "Priority Matrix",
            SectionKey::Roadmap => "Monthly Roadmap",
            SectionKey::Forecast => "KPI Forecast",
            SectionKey::Summary => "Executive Summary",
            SectionKey::ChartData => "Chart Data",
            SectionKey::BudgetDetail => "Budget Detail",
            SectionKey::AdsStrategy => "Ads Strategy",
            SectionKey::CompetitorAnalysis => "Competitor Analysis",
            SectionKey::Differentiation => "Differentiation",
            SectionKey::WinningTactics => "Winning Tactics",
        }
    }
}

/// One numeric chart series.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ChartSeries {
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub values: Vec<f64>,
}

/// Chart series keyed by chart name.
pub type ChartData = BTreeMap<String, ChartSeries>;

/// Estimated profile of one competitor site.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompetitorProfile {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub estimated_traffic: String,
    #[serde(default)]
    pub main_channels: Vec<String>,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub weaknesses: Vec<String>,
    #[serde(default)]
    pub estimated_budget: String,
}

/// The `competitorAnalysis` section.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CompetitorAnalysis {
    #[serde(default)]
    pub competitors: Vec<CompetitorProfile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

/// Structured marketing strategy as a JSON object.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StrategyDocument(Map<String, Value>);

impl StrategyDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_map(map: Map<String, Value>) -> Self {
        Self(map)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }

    pub fn get(&self, key: SectionKey) -> Option<&Value> {
        self.0.get(key.as_str())
    }

    pub fn contains(&self, key: SectionKey) -> bool {
        self.0.contains_key(key.as_str())
    }

    /// HTML fragment of a string section; `None` when absent or not a string.
    pub fn html(&self, key: SectionKey) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    /// HTML fragment of a section, empty when absent.
    pub fn html_or_empty(&self, key: SectionKey) -> &str {
        self.html(key).unwrap_or("")
    }

    pub fn set(&mut self, key: SectionKey, value: Value) {
        self.0.insert(key.as_str().to_string(), value);
    }

    pub fn set_html(&mut self, key: SectionKey, html: impl Into<String>) {
        self.set(key, Value::String(html.into()));
    }

    pub fn chart_data(&self) -> Option<ChartData> {
        self.get(SectionKey::ChartData).and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    pub fn competitor_analysis(&self) -> Option<CompetitorAnalysis> {
        self.get(SectionKey::CompetitorAnalysis)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    pub fn has_competitor_analysis(&self) -> bool {
        self.0.get(HAS_COMPETITOR_ANALYSIS).and_then(Value::as_bool).unwrap_or(false)
    }

    pub fn set_competitor_analysis_flag(&mut self, enabled: bool) {
        self.0.insert(HAS_COMPETITOR_ANALYSIS.to_string(), Value::Bool(enabled));
    }

    /// Optional sections present in the document, in report order.
    pub fn present_optional_sections(&self) -> Vec<SectionKey> {
        SectionKey::OPTIONAL.into_iter().filter(|key| self.contains(*key)).collect()
    }

    pub fn to_json_pretty(&self) -> String {
        serde_json::to_string_pretty(&self.0).unwrap_or_else(|_| "{}".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> StrategyDocument {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn html_returns_only_string_sections() {
        let document = doc(json!({"overview": "<p>ok</p>", "kpi": 3}));
        assert_eq!(document.html(SectionKey::Overview), Some("<p>ok</p>"));
        assert_eq!(document.html(SectionKey::Kpi), None);
        assert_eq!(document.html_or_empty(SectionKey::Growth), "");
    }

    #[test]
    fn unknown_keys_survive_round_trip() {
        let value = json!({"overview": "<p>x</p>", "customNotes": {"a": 1}});
        let document = doc(value.clone());
        assert_eq!(document.into_value(), value);
    }

    #[test]
    fn typed_views_tolerate_partial_objects() {
        let document = doc(json!({
            "chartData": {"budgetAllocation": {"labels": ["検索"], "values": [30]}},
            "competitorAnalysis": {"competitors": [{"url": "https://a.example.com"}]}
        }));
        let charts = document.chart_data().unwrap();
        assert_eq!(charts["budgetAllocation"].values, vec![30.0]);
        let analysis = document.competitor_analysis().unwrap();
        assert_eq!(analysis.competitors.len(), 1);
        assert!(analysis.competitors[0].main_channels.is_empty());
    }

    #[test]
    fn competitor_flag_defaults_false() {
        let mut document = StrategyDocument::new();
        assert!(!document.has_competitor_analysis());
        document.set_competitor_analysis_flag(true);
        assert!(document.has_competitor_analysis());
    }

    #[test]
    fn optional_sections_listed_in_report_order() {
        let document = doc(json!({"winningTactics": "", "summary": "", "overview": ""}));
        assert_eq!(
            document.present_optional_sections(),
            vec![SectionKey::Summary, SectionKey::WinningTactics]
        );
    }
}
