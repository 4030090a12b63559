use crate::domain::{BusinessType, CampaignInput};

/// Minimal complete brief used across unit tests.
pub fn sample_input() -> CampaignInput {
    CampaignInput {
        business_type: BusinessType::B2B,
        business: "X".to_string(),
        product: "Y".to_string(),
        goal: "lead".to_string(),
        goal_value: "100 signups".to_string(),
        budget: "¥1,000,000".to_string(),
        period: "6 months".to_string(),
        persona: "SMB owners".to_string(),
        ..Default::default()
    }
}
