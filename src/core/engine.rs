use crate::core::Pipeline;
use crate::domain::model::RunReport;
use crate::utils::error::Result;

/// Runs the pipeline stages in order and stops at the first failing stage.
pub struct AnalysisEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> AnalysisEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub async fn run(&self) -> Result<RunReport> {
        tracing::info!("🚀 Starting review analysis");

        let batch = self.pipeline.extract().await?;
        tracing::info!(
            "📥 Retrieved {} reviews for {}",
            batch.len(),
            batch.business_name.as_deref().unwrap_or("the location")
        );

        // 沒有評論就不呼叫 LLM
        if batch.is_empty() {
            tracing::warn!("No reviews found for the specified location, skipping analysis");
            return Ok(RunReport {
                business_name: batch.business_name,
                review_count: 0,
                reviews: Vec::new(),
                analysis: None,
                export_path: None,
            });
        }

        let analysis = self.pipeline.transform(&batch).await?;
        tracing::info!("✅ Analysis received ({} chars)", analysis.raw_text.len());

        let export_path = self.pipeline.load(&batch, &analysis).await?;
        match &export_path {
            Some(path) => tracing::info!("📁 CSV saved to: {}", path),
            None => tracing::info!("No tabular result to export"),
        }

        Ok(RunReport {
            review_count: batch.len(),
            business_name: batch.business_name,
            reviews: batch.reviews,
            analysis: Some(analysis),
            export_path,
        })
    }
}
