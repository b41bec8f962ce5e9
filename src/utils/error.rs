use std::fmt;
use thiserror::Error;

/// 外部服務識別，用於錯誤訊息
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Service {
    Reviews,
    Llm,
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Service::Reviews => write!(f, "Google reviews API"),
            Service::Llm => write!(f, "LLM API"),
        }
    }
}

#[derive(Error, Debug)]
pub enum ReviewError {
    #[error("{service} authentication failed: {message}")]
    AuthenticationError { service: Service, message: String },

    #[error("{service} resource not found: {resource}")]
    NotFoundError { service: Service, resource: String },

    #[error("{service} quota exceeded: {message}")]
    QuotaExceededError { service: Service, message: String },

    #[error("{service} request failed{}: {message}", status_suffix(.status))]
    TransportError {
        service: Service,
        status: Option<u16>,
        message: String,
    },

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Could not parse analysis output: {message}")]
    ParseError { message: String },

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Configuration validation failed for {field}: {message}")]
    ConfigValidationError { field: String, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Authentication,
    NotFound,
    Quota,
    Network,
    Data,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ReviewError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ReviewError::AuthenticationError { .. } => ErrorCategory::Authentication,
            ReviewError::NotFoundError { .. } => ErrorCategory::NotFound,
            ReviewError::QuotaExceededError { .. } => ErrorCategory::Quota,
            ReviewError::TransportError { .. } | ReviewError::HttpError(_) => {
                ErrorCategory::Network
            }
            ReviewError::ParseError { .. }
            | ReviewError::CsvError(_)
            | ReviewError::SerializationError(_) => ErrorCategory::Data,
            ReviewError::ConfigError { .. }
            | ReviewError::InvalidConfigValueError { .. }
            | ReviewError::ConfigValidationError { .. } => ErrorCategory::Configuration,
            ReviewError::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            // 解析失敗只影響匯出，分析結果仍可顯示
            ErrorCategory::Data => ErrorSeverity::Low,
            // 重新執行可能成功
            ErrorCategory::Network | ErrorCategory::Quota => ErrorSeverity::Medium,
            ErrorCategory::Authentication
            | ErrorCategory::NotFound
            | ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    /// 是否為使用者重新執行即可能成功的錯誤
    pub fn is_retryable(&self) -> bool {
        self.severity() == ErrorSeverity::Medium
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            ReviewError::AuthenticationError {
                service: Service::Llm,
                ..
            } => "Check your OpenAI API key (--openai-api-key or OPENAI_API_KEY)".to_string(),
            ReviewError::AuthenticationError {
                service: Service::Reviews,
                ..
            } => "Check credentials.json: Place lookups need `api_key`, account/location lookups need `access_token`".to_string(),
            ReviewError::NotFoundError { .. } => {
                "Verify the place ID or the account/location IDs".to_string()
            }
            ReviewError::QuotaExceededError { .. } => {
                "Wait for the usage quota to reset or check your billing plan, then re-run".to_string()
            }
            ReviewError::TransportError { .. } | ReviewError::HttpError(_) => {
                "Check your network connection and the configured endpoints, then re-run".to_string()
            }
            ReviewError::ParseError { .. } => {
                "Adjust the prompt so the model answers in the 'Negative Reviews:' format".to_string()
            }
            ReviewError::InvalidConfigValueError { field, .. }
            | ReviewError::ConfigValidationError { field, .. } => {
                format!("Fix the value of '{}' in the config file or command line", field)
            }
            ReviewError::ConfigError { .. } => {
                "Review the command-line arguments and the config file".to_string()
            }
            ReviewError::CsvError(_) | ReviewError::SerializationError(_) => {
                "Re-run the analysis; if the problem persists, report it with --verbose logs".to_string()
            }
            ReviewError::IoError(_) => {
                "Check that the output directory exists and is writable".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Authentication => format!("Authentication failed. {}", self),
            ErrorCategory::NotFound => format!("Location not found. {}", self),
            ErrorCategory::Quota => format!("Usage limit reached. {}", self),
            ErrorCategory::Network => format!("Could not reach an external service. {}", self),
            ErrorCategory::Data => format!("Could not process the analysis output. {}", self),
            ErrorCategory::Configuration => format!("Invalid configuration. {}", self),
            ErrorCategory::System => format!("System error. {}", self),
        }
    }
}

fn status_suffix(status: &Option<u16>) -> String {
    status
        .map(|code| format!(" with status {}", code))
        .unwrap_or_default()
}

pub type Result<T> = std::result::Result<T, ReviewError>;
