use crate::config::toml_config::TomlConfig;
use crate::core::maps_url::extract_place_id;
use crate::domain::model::ReviewTarget;
use crate::utils::error::{Result, ReviewError};
use clap::Parser;

#[derive(Debug, Clone, Default, Parser)]
#[command(name = "review-sentiment")]
#[command(about = "Fetch Google reviews and classify their sentiment with a hosted LLM")]
pub struct CliArgs {
    /// Optional TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub openai_api_key: Option<String>,

    /// Google Maps URL of the business
    #[arg(long)]
    pub maps_url: Option<String>,

    /// Google place ID (skips URL parsing)
    #[arg(long)]
    pub place_id: Option<String>,

    /// Google My Business account ID (use together with --location-id)
    #[arg(long)]
    pub account_id: Option<String>,

    /// Google My Business location ID (use together with --account-id)
    #[arg(long)]
    pub location_id: Option<String>,

    /// Analysis instruction sent ahead of the reviews
    #[arg(long, conflicts_with = "prompt_file")]
    pub prompt: Option<String>,

    /// Read the analysis instruction from a file
    #[arg(long)]
    pub prompt_file: Option<String>,

    /// Path to credentials.json
    #[arg(long)]
    pub credentials: Option<String>,

    #[arg(long)]
    pub output_path: Option<String>,

    /// CSV file name (defaults to negative_reviews_<business>.csv)
    #[arg(long)]
    pub output_file: Option<String>,

    #[arg(long)]
    pub model: Option<String>,

    /// Maximum reviews per LLM request (0 sends everything at once)
    #[arg(long)]
    pub chunk_size: Option<usize>,

    /// Print every fetched review before the analysis
    #[arg(long)]
    pub show_reviews: bool,

    /// Fetch reviews and print the prompt without calling the LLM
    #[arg(long)]
    pub dry_run: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    /// Emit logs as JSON
    #[arg(long)]
    pub log_json: bool,
}

impl CliArgs {
    /// 載入設定檔並套用命令列覆蓋
    pub fn load_config(&self) -> Result<TomlConfig> {
        let mut config = match &self.config {
            Some(path) => {
                tracing::info!("📁 Loading configuration from: {}", path);
                TomlConfig::from_file(path)?
            }
            None => TomlConfig::default(),
        };

        if let Some(prompt) = &self.prompt {
            config.analysis.instruction = prompt.clone();
        }
        if let Some(path) = &self.prompt_file {
            config.analysis.instruction = std::fs::read_to_string(path)?;
        }
        if let Some(path) = &self.credentials {
            config.reviews.credentials_path = path.clone();
        }
        if let Some(path) = &self.output_path {
            config.export.output_path = path.clone();
        }
        if let Some(file) = &self.output_file {
            config.export.filename = Some(file.clone());
        }
        if let Some(model) = &self.model {
            config.llm.model = model.clone();
        }
        if let Some(size) = self.chunk_size {
            config.analysis.chunk_size = Some(size);
        }
        if let Some(key) = &self.openai_api_key {
            config.llm.api_key = Some(key.clone());
        }

        Ok(config)
    }

    /// 帳號/地點 ID 優先，其次 place ID，最後才解析 Maps 網址
    pub fn resolve_target(&self) -> Result<ReviewTarget> {
        let non_empty = |value: &Option<String>| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };

        if let (Some(account_id), Some(location_id)) =
            (non_empty(&self.account_id), non_empty(&self.location_id))
        {
            return Ok(ReviewTarget::Location {
                account_id,
                location_id,
            });
        }

        if let Some(place_id) = non_empty(&self.place_id) {
            return Ok(ReviewTarget::Place { place_id });
        }

        match non_empty(&self.maps_url) {
            Some(url) => extract_place_id(&url)
                .map(|place_id| ReviewTarget::Place { place_id })
                .ok_or_else(|| ReviewError::InvalidConfigValueError {
                    field: "maps_url".to_string(),
                    value: url,
                    reason: "Could not extract a place ID from the Google Maps URL".to_string(),
                }),
            None => Err(ReviewError::ConfigError {
                message: "Provide --maps-url, --place-id, or both --account-id and --location-id"
                    .to_string(),
            }),
        }
    }
}
