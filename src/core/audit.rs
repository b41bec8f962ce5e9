use crate::domain::ports::Storage;
use crate::utils::error::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// One LLM exchange, appended as a JSON line.
#[derive(Debug, Serialize)]
pub struct AuditEntry<'a> {
    pub timestamp: DateTime<Utc>,
    pub model: &'a str,
    pub prompt: &'a str,
    pub response: &'a str,
}

impl AuditEntry<'_> {
    pub fn to_json_line(&self) -> Result<String> {
        let mut line = serde_json::to_string(self)?;
        line.push('\n');
        Ok(line)
    }
}

/// 寫入失敗只記錄警告，不影響分析流程
pub async fn record_exchange<S: Storage>(
    storage: &S,
    path: &str,
    model: &str,
    prompt: &str,
    response: &str,
) {
    let entry = AuditEntry {
        timestamp: Utc::now(),
        model,
        prompt,
        response,
    };

    let result = match entry.to_json_line() {
        Ok(line) => storage.append_file(path, line.as_bytes()).await,
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        tracing::warn!("⚠️ Could not write audit log {}: {}", path, e);
    }
}
