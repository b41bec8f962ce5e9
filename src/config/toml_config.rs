use crate::core::prompt::{DEFAULT_INSTRUCTION, DEFAULT_SYSTEM_PROMPT};
use crate::utils::error::{Result, ReviewError};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub reviews: ReviewsConfig,
    pub llm: LlmConfig,
    pub analysis: AnalysisConfig,
    pub export: ExportConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReviewsConfig {
    pub places_endpoint: String,
    pub business_endpoint: String,
    pub credentials_path: String,
    pub page_size: usize,
    pub max_pages: usize,
    pub timeout_seconds: u64,
}

impl Default for ReviewsConfig {
    fn default() -> Self {
        Self {
            places_endpoint: "https://places.googleapis.com".to_string(),
            business_endpoint: "https://mybusiness.googleapis.com".to_string(),
            credentials_path: "credentials.json".to_string(),
            page_size: 50,
            max_pages: 1,
            timeout_seconds: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub api_base: String,
    pub api_key: Option<String>,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout_seconds: u64,
    pub system_prompt: String,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.openai.com/v1".to_string(),
            api_key: None,
            model: "gpt-3.5-turbo".to_string(),
            temperature: 0.3,
            max_tokens: 1500,
            timeout_seconds: 60,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub instruction: String,
    /// 每次請求最多送出的評論數，未設定表示整批一次送出
    pub chunk_size: Option<usize>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            instruction: DEFAULT_INSTRUCTION.to_string(),
            chunk_size: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub output_path: String,
    pub filename: Option<String>,
    pub audit_log: Option<String>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_path: "./output".to_string(),
            filename: None,
            audit_log: None,
        }
    }
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| ReviewError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${OPENAI_API_KEY})，未設定的變數保留原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| ReviewError::ConfigError {
            message: format!("invalid placeholder pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn chunk_size(&self) -> Option<usize> {
        self.analysis.chunk_size.filter(|size| *size > 0)
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_url("reviews.places_endpoint", &self.reviews.places_endpoint)?;
        validation::validate_url("reviews.business_endpoint", &self.reviews.business_endpoint)?;
        validation::validate_path("reviews.credentials_path", &self.reviews.credentials_path)?;
        // Business API 單頁上限為 50
        validation::validate_range("reviews.page_size", self.reviews.page_size, 1, 50)?;
        validation::validate_positive_number("reviews.max_pages", self.reviews.max_pages, 1)?;

        validation::validate_url("llm.api_base", &self.llm.api_base)?;
        validation::validate_non_empty_string("llm.model", &self.llm.model)?;
        validation::validate_range("llm.temperature", self.llm.temperature, 0.0, 2.0)?;
        validation::validate_positive_number("llm.max_tokens", self.llm.max_tokens as usize, 1)?;

        validation::validate_non_empty_string("analysis.instruction", &self.analysis.instruction)?;
        validation::validate_path("export.output_path", &self.export.output_path)?;

        if let Some(api_key) = &self.llm.api_key {
            if api_key.starts_with("${") {
                return Err(ReviewError::ConfigValidationError {
                    field: "llm.api_key".to_string(),
                    message: format!("environment variable placeholder {} was not set", api_key),
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = TomlConfig::from_toml_str("").unwrap();

        assert_eq!(config.llm.model, "gpt-3.5-turbo");
        assert_eq!(config.llm.max_tokens, 1500);
        assert_eq!(config.reviews.page_size, 50);
        assert_eq!(config.reviews.max_pages, 1);
        assert_eq!(config.analysis.instruction, DEFAULT_INSTRUCTION);
        assert_eq!(config.chunk_size(), None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_partial_config() {
        let toml_content = r#"
[reviews]
business_endpoint = "http://localhost:9000"
max_pages = 3

[llm]
model = "gpt-4o-mini"
temperature = 0.0

[analysis]
instruction = "List the complaints"
chunk_size = 25

[export]
output_path = "./reports"
audit_log = "audit.jsonl"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.reviews.business_endpoint, "http://localhost:9000");
        assert_eq!(config.reviews.places_endpoint, "https://places.googleapis.com");
        assert_eq!(config.reviews.max_pages, 3);
        assert_eq!(config.llm.model, "gpt-4o-mini");
        assert_eq!(config.llm.max_tokens, 1500);
        assert_eq!(config.analysis.instruction, "List the complaints");
        assert_eq!(config.chunk_size(), Some(25));
        assert_eq!(config.export.audit_log.as_deref(), Some("audit.jsonl"));
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("REVIEW_SENTIMENT_TEST_KEY", "sk-from-env");

        let toml_content = r#"
[llm]
api_key = "${REVIEW_SENTIMENT_TEST_KEY}"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.llm.api_key.as_deref(), Some("sk-from-env"));

        std::env::remove_var("REVIEW_SENTIMENT_TEST_KEY");
    }

    #[test]
    fn test_unset_placeholder_fails_validation() {
        let toml_content = r#"
[llm]
api_key = "${REVIEW_SENTIMENT_SURELY_UNSET_VAR}"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation() {
        let mut config = TomlConfig::default();
        config.llm.api_base = "invalid-url".to_string();
        assert!(config.validate().is_err());

        let mut config = TomlConfig::default();
        config.reviews.page_size = 100;
        assert!(config.validate().is_err());

        let mut config = TomlConfig::default();
        config.analysis.instruction = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = TomlConfig::from_toml_str("[llm\nmodel = ").unwrap_err();
        assert!(matches!(err, ReviewError::ConfigValidationError { .. }));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[export]\noutput_path = \"./from-file\"\n")
            .unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.export.output_path, "./from-file");
    }
}
