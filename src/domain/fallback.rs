//! Deterministic strategy synthesis.
//!
//! Produces a complete document from the brief alone, using fixed template
//! text and fixed chart series. Used when the generator reply cannot be
//! parsed and when the generation round trip fails.

use serde::Serialize;
use serde_json::Value;
use url::Url;

use crate::domain::campaign::{BusinessType, CampaignInput};
use crate::domain::strategy::{
    ChartData, ChartSeries, CompetitorAnalysis, CompetitorProfile, SectionKey, StrategyDocument,
};
use crate::domain::{AppError, templates};

/// Fixed share of the monthly budget per channel, in percent.
const BUDGET_ALLOCATION: [(&str, u32, &str); 5] = [
    ("検索広告", 30, "顕在層の獲得"),
    ("SNS広告", 25, "潜在層の認知獲得"),
    ("コンテンツ / SEO", 20, "中長期の集客基盤"),
    ("リマーケティング", 15, "離脱ユーザーの再獲得"),
    ("計測・LP改善", 10, "CVRの底上げ"),
];

const KPI_FORECAST: [(&str, f64); 6] = [
    ("1ヶ月目", 3000.0),
    ("2ヶ月目", 4500.0),
    ("3ヶ月目", 7000.0),
    ("4ヶ月目", 8000.0),
    ("5ヶ月目", 9000.0),
    ("6ヶ月目", 10000.0),
];

const FUNNEL: [(&str, f64); 4] =
    [("認知", 10000.0), ("興味", 300.0), ("検討", 50.0), ("行動", 20.0)];

#[derive(Serialize)]
struct AllocationRow {
    label: &'static str,
    share: u32,
    purpose: &'static str,
}

#[derive(Serialize)]
struct CompetitorRef {
    name: String,
    url: String,
}

#[derive(Serialize)]
struct FallbackVars<'a> {
    business: &'a str,
    business_type_label: &'static str,
    goal_label: String,
    goal_value: &'a str,
    budget: &'a str,
    period: &'a str,
    persona: &'a str,
    is_b2b: bool,
    is_b2c: bool,
    budget_allocation: Vec<AllocationRow>,
    competitors: Vec<CompetitorRef>,
}

const TEMPLATED_SECTIONS: [(SectionKey, &str); 11] = [
    (SectionKey::Overview, "fallback/overview.html.j2"),
    (SectionKey::Kpi, "fallback/kpi.html.j2"),
    (SectionKey::Growth, "fallback/growth.html.j2"),
    (SectionKey::Tactics, "fallback/tactics.html.j2"),
    (SectionKey::Tasks, "fallback/tasks.html.j2"),
    (SectionKey::Priority, "fallback/priority.html.j2"),
    (SectionKey::Roadmap, "fallback/roadmap.html.j2"),
    (SectionKey::Forecast, "fallback/forecast.html.j2"),
    (SectionKey::Summary, "fallback/summary.html.j2"),
    (SectionKey::BudgetDetail, "fallback/budget_detail.html.j2"),
    (SectionKey::AdsStrategy, "fallback/ads_strategy.html.j2"),
];

const COMPETITOR_SECTIONS: [(SectionKey, &str); 2] = [
    (SectionKey::Differentiation, "fallback/differentiation.html.j2"),
    (SectionKey::WinningTactics, "fallback/winning_tactics.html.j2"),
];

/// Synthesize a full strategy document from the brief.
///
/// Pure: identical briefs yield identical documents.
pub fn synthesize(input: &CampaignInput) -> StrategyDocument {
    match try_synthesize(input) {
        Ok(document) => document,
        Err(err) => {
            tracing::error!(error = %err, "fallback template failed; using minimal document");
            minimal_document(input)
        }
    }
}

fn try_synthesize(input: &CampaignInput) -> Result<StrategyDocument, AppError> {
    let urls = input.competitor_urls();
    let profiles: Vec<CompetitorProfile> =
        urls.iter().enumerate().map(|(index, url)| competitor_profile(index, url)).collect();

    let vars = FallbackVars {
        business: input.business.trim(),
        business_type_label: input.business_type.short_label(),
        goal_label: input.goal_label(),
        goal_value: input.goal_value.trim(),
        budget: input.budget.trim(),
        period: input.period.trim(),
        persona: input.persona.trim(),
        is_b2b: input.business_type == BusinessType::B2B,
        is_b2c: input.business_type == BusinessType::B2C,
        budget_allocation: BUDGET_ALLOCATION
            .iter()
            .map(|&(label, share, purpose)| AllocationRow { label, share, purpose })
            .collect(),
        competitors: profiles
            .iter()
            .map(|p| CompetitorRef { name: p.name.clone(), url: p.url.clone() })
            .collect(),
    };

    let mut document = StrategyDocument::new();
    for (key, template) in TEMPLATED_SECTIONS {
        document.set_html(key, templates::render(template, &vars)?);
    }
    document.set(SectionKey::ChartData, chart_value());

    if profiles.is_empty() {
        document.set_competitor_analysis_flag(false);
        return Ok(document);
    }

    let analysis = CompetitorAnalysis {
        summary: Some(format!(
            "{}社の競合サイトはいずれも広告とコンテンツを併用しています。{}に特化した訴求で差別化を図ります。",
            profiles.len(),
            vars.persona
        )),
        competitors: profiles,
    };
    let analysis = serde_json::to_value(&analysis)
        .map_err(|err| AppError::parse_error("competitor analysis", err))?;
    document.set(SectionKey::CompetitorAnalysis, analysis);
    for (key, template) in COMPETITOR_SECTIONS {
        document.set_html(key, templates::render(template, &vars)?);
    }
    document.set_competitor_analysis_flag(true);
    Ok(document)
}

/// Fixed chart series shared by every synthesized document.
pub fn fixed_chart_data() -> ChartData {
    fn series(points: &[(&str, f64)]) -> ChartSeries {
        ChartSeries {
            labels: points.iter().map(|(label, _)| label.to_string()).collect(),
            values: points.iter().map(|(_, value)| *value).collect(),
        }
    }
    let allocation: Vec<(&str, f64)> =
        BUDGET_ALLOCATION.iter().map(|&(label, share, _)| (label, f64::from(share))).collect();

    let mut charts = ChartData::new();
    charts.insert("budgetAllocation".to_string(), series(&allocation));
    charts.insert("kpiForecast".to_string(), series(&KPI_FORECAST));
    charts.insert("funnel".to_string(), series(&FUNNEL));
    charts
}

fn chart_value() -> Value {
    serde_json::to_value(fixed_chart_data()).unwrap_or(Value::Null)
}

/// Placeholder profile for one competitor site, varied by position only.
fn competitor_profile(index: usize, url: &str) -> CompetitorProfile {
    const TRAFFIC: [&str; 3] = ["月間 5万〜10万 PV", "月間 1万〜5万 PV", "月間 10万〜30万 PV"];
    const BUDGET: [&str; 3] = ["月額 100万〜300万円", "月額 50万〜100万円", "月額 300万円以上"];
    const CHANNELS: [[&str; 3]; 3] = [
        ["検索広告", "SEO", "ホワイトペーパー"],
        ["SNS広告", "インフルエンサー", "メールマガジン"],
        ["テレビCM", "検索広告", "展示会"],
    ];
    const STRENGTHS: [&str; 3] = ["指名検索の強さ", "SNSでの発信力", "ブランド認知度"];
    const WEAKNESSES: [&str; 3] =
        ["導入事例の露出が少ない", "価格訴求に偏っている", "中小企業向けの訴求が弱い"];

    let slot = index % 3;
    CompetitorProfile {
        url: url.to_string(),
        name: site_name(url),
        estimated_traffic: TRAFFIC[slot].to_string(),
        main_channels: CHANNELS[slot].iter().map(|c| c.to_string()).collect(),
        strengths: vec![STRENGTHS[slot].to_string(), "コンテンツ量の多さ".to_string()],
        weaknesses: vec![WEAKNESSES[slot].to_string()],
        estimated_budget: BUDGET[slot].to_string(),
    }
}

fn site_name(url: &str) -> String {
    Url::parse(url)
        .ok()
        .and_then(|parsed| parsed.host_str().map(|host| host.trim_start_matches("www.").to_string()))
        .unwrap_or_else(|| url.to_string())
}

/// Last-resort document used only if an embedded template fails to render.
fn minimal_document(input: &CampaignInput) -> StrategyDocument {
    let mut document = StrategyDocument::new();
    for key in SectionKey::FIXED {
        document.set_html(key, "");
    }
    document.set_html(
        SectionKey::Kpi,
        format!("<p>{}: {}</p>", input.goal_label(), input.goal_value.trim()),
    );
    document.set(SectionKey::ChartData, chart_value());
    let profiles: Vec<CompetitorProfile> = input
        .competitor_urls()
        .iter()
        .enumerate()
        .map(|(index, url)| competitor_profile(index, url))
        .collect();
    let has_competitors = !profiles.is_empty();
    if has_competitors {
        let analysis = CompetitorAnalysis { competitors: profiles, summary: None };
        if let Ok(value) = serde_json::to_value(&analysis) {
            document.set(SectionKey::CompetitorAnalysis, value);
        }
    }
    document.set_competitor_analysis_flag(has_competitors);
    document
}
