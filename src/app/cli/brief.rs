//! Campaign brief sources: file, built-in sample or interactive entry.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use clap::Args;
use dialoguer::{Error as DialoguerError, Input, Select};

use crate::domain::samples::{sample_brief, sample_count};
use crate::domain::{AppError, BusinessType, CampaignInput, Goal, MAX_COMPETITOR_URLS};

#[derive(Args, Debug, Clone, Default)]
pub struct BriefArgs {
    /// Brief file (.json, .toml, .yaml or .yml)
    #[arg(short, long, conflicts_with_all = ["sample", "interactive"])]
    pub input: Option<PathBuf>,
    /// Use a built-in sample brief by index
    #[arg(long, conflicts_with = "interactive")]
    pub sample: Option<usize>,
    /// Enter the brief field by field
    #[arg(long)]
    pub interactive: bool,
}

impl BriefArgs {
    /// Resolve the brief; `None` when interactive entry was aborted.
    pub fn resolve(&self) -> Result<Option<CampaignInput>, AppError> {
        if let Some(path) = &self.input {
            return load_brief(path).map(Some);
        }
        if let Some(index) = self.sample {
            if index >= sample_count() {
                return Err(AppError::config_error(format!(
                    "Sample index {} is out of range (0..{})",
                    index,
                    sample_count()
                )));
            }
            return Ok(Some(sample_brief(index)));
        }
        if self.interactive {
            return prompt_brief();
        }
        Err(AppError::config_error("Provide a brief with --input, --sample or --interactive"))
    }
}

/// Read a brief file, choosing the format by extension.
pub fn load_brief(path: &Path) -> Result<CampaignInput, AppError> {
    let content = std::fs::read_to_string(path)?;
    let what = format!("brief {}", path.display());
    let extension = path.extension().and_then(|ext| ext.to_str()).unwrap_or_default();
    let input = match extension.to_ascii_lowercase().as_str() {
        "json" => serde_json::from_str(&content).map_err(|e| AppError::parse_error(&what, e))?,
        "toml" => toml::from_str(&content).map_err(|e| AppError::parse_error(&what, e))?,
        "yaml" | "yml" => {
            serde_yaml::from_str(&content).map_err(|e| AppError::parse_error(&what, e))?
        }
        other => {
            return Err(AppError::config_error(format!(
                "Unsupported brief format '{}': use .json, .toml, .yaml or .yml",
                other
            )));
        }
    };
    tracing::debug!(path = %path.display(), "brief loaded");
    Ok(input)
}

fn prompt_brief() -> Result<Option<CampaignInput>, AppError> {
    let Some(business_type) = prompt_business_type()? else {
        return Ok(None);
    };
    let Some(goal) = prompt_goal()? else {
        return Ok(None);
    };

    let mut input = CampaignInput { business_type, goal, ..Default::default() };
    let required: [(&str, &mut String); 6] = [
        ("事業内容", &mut input.business),
        ("商品/サービス", &mut input.product),
        ("目標数値", &mut input.goal_value),
        ("月間予算", &mut input.budget),
        ("期間", &mut input.period),
        ("ターゲット", &mut input.persona),
    ];
    for (label, slot) in required {
        let Some(value) = prompt_text(label, false)? else {
            return Ok(None);
        };
        *slot = value;
    }

    let optional: [(&str, &mut Option<String>); 3] = [
        ("競合（任意）", &mut input.competitors),
        ("現在のチャネル（任意）", &mut input.current_channels),
        ("課題（任意）", &mut input.challenges),
    ];
    for (label, slot) in optional {
        let Some(value) = prompt_text(label, true)? else {
            return Ok(None);
        };
        *slot = Some(value).filter(|v| !v.trim().is_empty());
    }

    for index in 1..=MAX_COMPETITOR_URLS {
        let Some(url) = prompt_text(&format!("競合サイトURL {}（任意、空欄で終了）", index), true)?
        else {
            return Ok(None);
        };
        if url.trim().is_empty() {
            break;
        }
        input.competitor_urls.push(url.trim().to_string());
    }

    Ok(Some(input))
}

fn prompt_business_type() -> Result<Option<BusinessType>, AppError> {
    let items: Vec<&str> = BusinessType::ALL.iter().map(|t| t.label()).collect();
    let selection = Select::new()
        .with_prompt("ビジネスタイプ")
        .items(&items)
        .default(0)
        .interact_opt()
        .map_err(|err| AppError::config_error(format!("Failed to select business type: {}", err)))?;
    Ok(selection.map(|index| BusinessType::ALL[index]))
}

fn prompt_goal() -> Result<Option<String>, AppError> {
    let items: Vec<String> =
        Goal::KNOWN.iter().map(|goal| format!("{} ({})", goal.label(), goal.key())).collect();
    let selection = Select::new()
        .with_prompt("目標")
        .items(&items)
        .default(0)
        .interact_opt()
        .map_err(|err| AppError::config_error(format!("Failed to select goal: {}", err)))?;
    Ok(selection.map(|index| Goal::KNOWN[index].key().to_string()))
}

fn prompt_text(label: &str, allow_empty: bool) -> Result<Option<String>, AppError> {
    match Input::<String>::new().with_prompt(label).allow_empty(allow_empty).interact_text() {
        Ok(value) => Ok(Some(value)),
        Err(DialoguerError::IO(err)) if err.kind() == ErrorKind::Interrupted => Ok(None),
        Err(err) => Err(AppError::config_error(format!("Failed to read {}: {}", label, err))),
    }
}
