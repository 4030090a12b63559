//! Campaign brief model and validation.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;
use url::Url;

/// Maximum number of competitor URLs accepted in one brief.
pub const MAX_COMPETITOR_URLS: usize = 3;

/// Target market of the business.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BusinessType {
    #[default]
    #[serde(rename = "B2B")]
    B2B,
    #[serde(rename = "B2C")]
    B2C,
    #[serde(rename = "B2B2C")]
    B2B2C,
}

impl BusinessType {
    pub const ALL: [BusinessType; 3] = [BusinessType::B2B, BusinessType::B2C, BusinessType::B2B2C];

    pub fn as_str(&self) -> &'static str {
        match self {
            BusinessType::B2B => "B2B",
            BusinessType::B2C => "B2C",
            BusinessType::B2B2C => "B2B2C",
        }
    }

    /// Label used inside prompts.
    pub fn label(&self) -> &'static str {
        match self {
            BusinessType::B2B => "法人向け（B2B）",
            BusinessType::B2C => "個人向け（B2C）",
            BusinessType::B2B2C => "法人・個人向け（B2B2C）",
        }
    }

    /// Short label used in report prose.
    pub fn short_label(&self) -> &'static str {
        match self {
            BusinessType::B2B => "法人向け",
            BusinessType::B2C => "個人向け",
            BusinessType::B2B2C => "法人・個人向け",
        }
    }
}

impl fmt::Display for BusinessType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Campaign goal, keyed by the fixed goal table.
///
/// Keys outside the table are carried verbatim and label themselves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Goal {
    Lead,
    Awareness,
    Conversion,
    Retention,
    Revenue,
    Cpa,
    Traffic,
    Engagement,
    Other,
    Custom(String),
}

impl Goal {
    pub const KNOWN: [Goal; 9] = [
        Goal::Lead,
        Goal::Awareness,
        Goal::Conversion,
        Goal::Retention,
        Goal::Revenue,
        Goal::Cpa,
        Goal::Traffic,
        Goal::Engagement,
        Goal::Other,
    ];

    pub fn from_key(key: &str) -> Self {
        match key.trim() {
            "lead" => Goal::Lead,
            "awareness" => Goal::Awareness,
            "conversion" => Goal::Conversion,
            "retention" => Goal::Retention,
            "revenue" => Goal::Revenue,
            "cpa" => Goal::Cpa,
            "traffic" => Goal::Traffic,
            "engagement" => Goal::Engagement,
            "other" => Goal::Other,
            other => Goal::Custom(other.to_string()),
        }
    }

    pub fn key(&self) -> &str {
        match self {
            Goal::Lead => "lead",
            Goal::Awareness => "awareness",
            Goal::Conversion => "conversion",
            Goal::Retention => "retention",
            Goal::Revenue => "revenue",
            Goal::Cpa => "cpa",
            Goal::Traffic => "traffic",
            Goal::Engagement => "engagement",
            Goal::Other => "other",
            Goal::Custom(key) => key,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Goal::Lead => "リード獲得",
            Goal::Awareness => "認知度向上",
            Goal::Conversion => "コンバージョン率改善",
            Goal::Retention => "顧客維持率向上",
            Goal::Revenue => "売上増加",
            Goal::Cpa => "CPA改善",
            Goal::Traffic => "サイト流入増加",
            Goal::Engagement => "エンゲージメント向上",
            Goal::Other => "その他",
            Goal::Custom(key) => key,
        }
    }
}

/// Campaign brief as collected from the form and sent to the endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignInput {
    #[serde(default, deserialize_with = "null_as_default")]
    pub business_type: BusinessType,
    #[serde(default, deserialize_with = "null_as_default")]
    pub business: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub product: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub goal: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub goal_value: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub budget: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub period: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub persona: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub competitors: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_channels: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub challenges: Option<String>,
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "Vec::is_empty")]
    pub competitor_urls: Vec<String>,
}

/// Explicit `null` reads as the field's default so it is reported by `validate()`.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Why a brief was rejected before any request was sent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    #[error("At most 3 competitor URLs are allowed (got {0})")]
    TooManyCompetitorUrls(usize),

    #[error("Invalid competitor URL '{0}': must be an absolute http(s) URL")]
    InvalidCompetitorUrl(String),
}

impl ValidationError {
    /// Wire name of the first missing field, if any.
    pub fn first_missing(&self) -> Option<&'static str> {
        match self {
            ValidationError::MissingFields(fields) => fields.first().copied(),
            _ => None,
        }
    }
}

impl CampaignInput {
    /// Check that every required field is populated and competitor URLs are usable.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let missing: Vec<&'static str> = self
            .required_fields()
            .into_iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(name, _)| name)
            .collect();
        if !missing.is_empty() {
            return Err(ValidationError::MissingFields(missing));
        }

        let urls = self.competitor_urls();
        if urls.len() > MAX_COMPETITOR_URLS {
            return Err(ValidationError::TooManyCompetitorUrls(urls.len()));
        }
        for raw in urls {
            let valid = Url::parse(raw)
                .map(|url| matches!(url.scheme(), "http" | "https") && url.host_str().is_some())
                .unwrap_or(false);
            if !valid {
                return Err(ValidationError::InvalidCompetitorUrl(raw.to_string()));
            }
        }
        Ok(())
    }

    fn required_fields(&self) -> [(&'static str, &str); 7] {
        [
            ("business", self.business.as_str()),
            ("product", self.product.as_str()),
            ("goal", self.goal.as_str()),
            ("goalValue", self.goal_value.as_str()),
            ("budget", self.budget.as_str()),
            ("period", self.period.as_str()),
            ("persona", self.persona.as_str()),
        ]
    }

    pub fn goal(&self) -> Goal {
        Goal::from_key(&self.goal)
    }

    pub fn goal_label(&self) -> String {
        self.goal().label().to_string()
    }

    /// Non-blank competitor URLs, trimmed, in input order.
    pub fn competitor_urls(&self) -> Vec<&str> {
        self.competitor_urls.iter().map(|url| url.trim()).filter(|url| !url.is_empty()).collect()
    }

    pub fn has_competitor_urls(&self) -> bool {
        !self.competitor_urls().is_empty()
    }

    pub fn competitors(&self) -> Option<&str> {
        non_blank(self.competitors.as_deref())
    }

    pub fn current_channels(&self) -> Option<&str> {
        non_blank(self.current_channels.as_deref())
    }

    pub fn challenges(&self) -> Option<&str> {
        non_blank(self.challenges.as_deref())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::sample_input;

    #[test]
    fn complete_brief_is_valid() {
        assert_eq!(sample_input().validate(), Ok(()));
    }

    #[test]
    fn missing_persona_is_reported() {
        let mut input = sample_input();
        input.persona = String::new();
        let err = input.validate().unwrap_err();
        assert_eq!(err, ValidationError::MissingFields(vec!["persona"]));
        assert_eq!(err.first_missing(), Some("persona"));
    }

    #[test]
    fn whitespace_counts_as_missing() {
        let mut input = sample_input();
        input.business = "   ".to_string();
        input.budget = "\n".to_string();
        let err = input.validate().unwrap_err();
        assert_eq!(err, ValidationError::MissingFields(vec!["business", "budget"]));
    }

    #[test]
    fn more_than_three_competitor_urls_rejected() {
        let mut input = sample_input();
        input.competitor_urls = (1..=4).map(|i| format!("https://c{}.example.com", i)).collect();
        assert_eq!(input.validate(), Err(ValidationError::TooManyCompetitorUrls(4)));
    }

    #[test]
    fn blank_competitor_urls_ignored() {
        let mut input = sample_input();
        input.competitor_urls = vec!["".into(), " https://a.example.com ".into(), "  ".into()];
        assert_eq!(input.validate(), Ok(()));
        assert_eq!(input.competitor_urls(), vec!["https://a.example.com"]);
    }

    #[test]
    fn non_http_competitor_url_rejected() {
        let mut input = sample_input();
        input.competitor_urls = vec!["ftp://files.example.com".into()];
        assert!(matches!(input.validate(), Err(ValidationError::InvalidCompetitorUrl(_))));

        input.competitor_urls = vec!["not a url".into()];
        assert!(matches!(input.validate(), Err(ValidationError::InvalidCompetitorUrl(_))));
    }

    #[test]
    fn goal_labels_follow_table() {
        assert_eq!(Goal::from_key("lead").label(), "リード獲得");
        assert_eq!(Goal::from_key("cpa").label(), "CPA改善");
        assert_eq!(Goal::from_key("brand-lift").label(), "brand-lift");
        for goal in Goal::KNOWN {
            assert_eq!(Goal::from_key(goal.key()), goal);
        }
    }

    #[test]
    fn deserializes_camel_case_and_defaults_business_type() {
        let json = r#"{"business":"X","product":"Y","goal":"lead","goalValue":"100","budget":"b",
            "period":"p","persona":"q","competitorUrls":["https://a.example.com"]}"#;
        let input: CampaignInput = serde_json::from_str(json).unwrap();
        assert_eq!(input.business_type, BusinessType::B2B);
        assert_eq!(input.goal_value, "100");
        assert_eq!(input.competitor_urls.len(), 1);
    }

    #[test]
    fn null_fields_read_as_missing() {
        let json = r#"{"businessType":null,"business":"X","product":"Y","goal":"lead",
            "goalValue":"100","budget":"b","period":"p","persona":null,"competitorUrls":null}"#;
        let input: CampaignInput = serde_json::from_str(json).unwrap();
        assert_eq!(input.business_type, BusinessType::B2B);
        assert!(input.competitor_urls.is_empty());
        assert_eq!(input.validate(), Err(ValidationError::MissingFields(vec!["persona"])));
    }

    #[test]
    fn business_type_serializes_as_wire_name() {
        let input = CampaignInput { business_type: BusinessType::B2B2C, ..Default::default() };
        let value = serde_json::to_value(&input).unwrap();
        assert_eq!(value["businessType"], "B2B2C");
        assert!(value.get("competitorUrls").is_none());
    }
}
