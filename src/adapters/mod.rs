// Adapters layer: concrete implementations of the domain ports (HTTP services, file storage).

pub mod google;
pub mod openai;
pub mod storage;

pub use google::GoogleReviewsClient;
pub use openai::OpenAiClassifier;
pub use storage::LocalStorage;

use crate::utils::error::{Result, ReviewError, Service};
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;

const MAX_ERROR_BODY_CHARS: usize = 300;

/// 兩個服務的錯誤格式都是 {"error": {"message": ...}}，取不到就回傳截斷後的原文
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .and_then(|e| e.get("message"))
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.chars().take(MAX_ERROR_BODY_CHARS).collect())
}

pub(crate) fn error_for_status(
    service: Service,
    status: StatusCode,
    body: &str,
    resource: &str,
) -> ReviewError {
    let message = error_message(body);
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            ReviewError::AuthenticationError { service, message }
        }
        StatusCode::NOT_FOUND if service == Service::Reviews => ReviewError::NotFoundError {
            service,
            resource: resource.to_string(),
        },
        StatusCode::TOO_MANY_REQUESTS => ReviewError::QuotaExceededError { service, message },
        _ => ReviewError::TransportError {
            service,
            status: Some(status.as_u16()),
            message,
        },
    }
}

/// Reads the body, mapping non-success statuses to typed errors before decoding JSON.
pub(crate) async fn read_json<T: DeserializeOwned>(
    response: Response,
    service: Service,
    resource: &str,
) -> Result<T> {
    let status = response.status();
    let body = response.text().await?;

    tracing::debug!("{} response status: {} ({} bytes)", service, status, body.len());

    if !status.is_success() {
        return Err(error_for_status(service, status, &body, resource));
    }

    serde_json::from_str(&body).map_err(|e| ReviewError::TransportError {
        service,
        status: Some(status.as_u16()),
        message: format!("malformed response body: {}", e),
    })
}
