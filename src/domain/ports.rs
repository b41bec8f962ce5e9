use crate::domain::model::{AnalysisPrompt, AnalysisResult, ReviewBatch, ReviewTarget};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
    fn append_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
    /// 回傳給使用者看的完整位置
    fn location(&self, path: &str) -> String;
}

#[async_trait]
pub trait ReviewSource: Send + Sync {
    async fn fetch_reviews(&self, target: &ReviewTarget) -> Result<ReviewBatch>;
}

/// Hosted sentiment classification; implementations return the model's free-form text.
#[async_trait]
pub trait SentimentClassifier: Send + Sync {
    async fn classify(&self, prompt: &AnalysisPrompt) -> Result<String>;

    fn model_name(&self) -> &str;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<ReviewBatch>;
    async fn transform(&self, batch: &ReviewBatch) -> Result<AnalysisResult>;
    async fn load(&self, batch: &ReviewBatch, result: &AnalysisResult) -> Result<Option<String>>;
}
