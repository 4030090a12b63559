//! Generation prompt construction.
//!
//! The prompt is rendered from an embedded template; which JSON keys it asks
//! for depends on the report variant and on whether competitor URLs were
//! supplied. Nothing here touches the network.

use serde::{Deserialize, Serialize};

use crate::domain::campaign::CampaignInput;
use crate::domain::strategy::SectionKey;
use crate::domain::{AppError, templates};

const PROMPT_TEMPLATE: &str = "prompts/strategy.txt.j2";

/// Which optional sections the generator is asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportVariant {
    /// The eight fixed sections only.
    Basic,
    /// Fixed sections plus summary, chart data, budget detail and ads strategy.
    #[default]
    Extended,
}

impl ReportVariant {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportVariant::Basic => "basic",
            ReportVariant::Extended => "extended",
        }
    }
}

#[derive(Serialize)]
struct PromptVars<'a> {
    business_type_label: &'a str,
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
    extended: bool,
}

/// Build the prompt sent to the text generator for a validated brief.
pub fn build_prompt(input: &CampaignInput, variant: ReportVariant) -> Result<String, AppError> {
    input.validate()?;

    let vars = PromptVars {
        business_type_label: input.business_type.label(),
        business: input.business.trim(),
        product: input.product.trim(),
        goal_label: input.goal_label(),
        goal_value: input.goal_value.trim(),
        budget: input.budget.trim(),
        period: input.period.trim(),
        persona: input.persona.trim(),
        competitors: input.competitors(),
        current_channels: input.current_channels(),
        challenges: input.challenges(),
        competitor_urls: input.competitor_urls(),
        extended: variant == ReportVariant::Extended,
    };

    templates::render(PROMPT_TEMPLATE, vars)
}

/// Section keys the prompt asks the generator to return.
pub fn requested_sections(input: &CampaignInput, variant: ReportVariant) -> Vec<SectionKey> {
    let mut sections = SectionKey::FIXED.to_vec();
    if variant == ReportVariant::Extended {
        sections.extend([
            SectionKey::Summary,
            SectionKey::ChartData,
            SectionKey::BudgetDetail,
            SectionKey::AdsStrategy,
        ]);
    }
    if input.has_competitor_urls() {
        sections.extend([
            SectionKey::CompetitorAnalysis,
            SectionKey::Differentiation,
            SectionKey::WinningTactics,
        ]);
    }
    sections
}
