pub mod campaign;
pub mod configuration;
pub mod content;
pub mod error;
pub mod fallback;
pub mod prompt;
pub mod response;
pub mod samples;
pub mod strategy;
pub mod templates;

pub use campaign::{BusinessType, CampaignInput, Goal, MAX_COMPETITOR_URLS, ValidationError};
pub use configuration::{ClientConfig, Config, GeneratorConfig, ServerConfig};
pub use error::{AppError, GenerationError};
pub use prompt::{ReportVariant, build_prompt, requested_sections};
pub use response::{ParseError, ParseOutcome};
pub use strategy::{
    ChartData, ChartSeries, CompetitorAnalysis, CompetitorProfile, SectionKey, StrategyDocument,
};
