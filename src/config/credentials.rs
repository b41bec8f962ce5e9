use crate::domain::model::ReviewTarget;
use crate::utils::error::{Result, ReviewError, Service};
use serde::Deserialize;
use std::fmt;
use std::path::Path;

/// Google credentials read from `credentials.json`.
#[derive(Clone, Default, Deserialize)]
pub struct GoogleCredentials {
    /// Places API key
    pub api_key: Option<String>,
    /// OAuth access token for the Business Profile API
    pub access_token: Option<String>,
}

// 不輸出金鑰內容
impl fmt::Debug for GoogleCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GoogleCredentials")
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .field("access_token", &self.access_token.as_ref().map(|_| "***"))
            .finish()
    }
}

impl GoogleCredentials {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ReviewError::AuthenticationError {
                service: Service::Reviews,
                message: format!("credentials file not found: {}", path.display()),
            });
        }

        let content = std::fs::read_to_string(path)?;
        let credentials: GoogleCredentials =
            serde_json::from_str(&content).map_err(|e| ReviewError::AuthenticationError {
                service: Service::Reviews,
                message: format!("credentials file {} is not valid JSON: {}", path.display(), e),
            })?;

        tracing::debug!("Loaded Google credentials from {}", path.display());
        Ok(credentials)
    }

    /// 依目標種類檢查需要的欄位是否存在
    pub fn ensure_supports(&self, target: &ReviewTarget) -> Result<()> {
        let (field, value) = match target {
            ReviewTarget::Place { .. } => ("api_key", &self.api_key),
            ReviewTarget::Location { .. } => ("access_token", &self.access_token),
        };

        match value {
            Some(v) if !v.trim().is_empty() => Ok(()),
            _ => Err(ReviewError::AuthenticationError {
                service: Service::Reviews,
                message: format!("credentials file has no '{}' for {}", field, target),
            }),
        }
    }
}
