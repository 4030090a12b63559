//! strategy-maker: turn marketing campaign briefs into LLM-generated strategy reports.
//!
//! The crate ships both sides of the generation contract: the HTTP endpoint that
//! prompts the upstream chat-completion API, and the client that validates a
//! brief, parses the reply (falling back to a locally synthesized strategy) and
//! exports the report.

pub mod app;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
pub(crate) mod testing;

pub use app::export::{copy_markdown, render_html, render_markdown, render_pdf};
pub use app::server::{EndpointState, router};
pub use app::{GenerationClient, GenerationEvent, Provenance, Report, Session};
pub use domain::response::{parse as parse_strategy, try_parse as try_parse_strategy};
pub use domain::{
    AppError, BusinessType, CampaignInput, GenerationError, ReportVariant, SectionKey,
    StrategyDocument, build_prompt,
};
pub use ports::{ClipboardWriter, CompletionBackend, StrategyEndpoint, UpstreamError};
pub use services::{HttpStrategyEndpoint, OpenAiBackend};
