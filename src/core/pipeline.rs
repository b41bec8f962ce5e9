use crate::config::toml_config::TomlConfig;
use crate::core::audit;
use crate::core::presenter::{export_filename, parse_responses, render_csv};
use crate::core::prompt::build_prompts;
use crate::core::{Pipeline, ReviewSource, SentimentClassifier, Storage};
use crate::domain::model::{AnalysisPrompt, AnalysisResult, ReviewBatch, ReviewTarget};
use crate::utils::error::Result;

#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub instruction: String,
    pub chunk_size: Option<usize>,
    pub export_filename: Option<String>,
    pub audit_log: Option<String>,
}

impl From<&TomlConfig> for PipelineSettings {
    fn from(config: &TomlConfig) -> Self {
        Self {
            instruction: config.analysis.instruction.clone(),
            chunk_size: config.chunk_size(),
            export_filename: config.export.filename.clone(),
            audit_log: config.export.audit_log.clone(),
        }
    }
}

/// 乾跑結果：抓到的評論與將送出的 prompt
#[derive(Debug, Clone)]
pub struct PromptPreview {
    pub batch: ReviewBatch,
    pub prompts: Vec<AnalysisPrompt>,
}

/// 只抓取評論並組出 prompt，不呼叫 LLM 也不寫檔
pub async fn preview<R: ReviewSource>(
    source: &R,
    target: &ReviewTarget,
    settings: &PipelineSettings,
) -> Result<PromptPreview> {
    let batch = source.fetch_reviews(target).await?;
    tracing::info!("📥 Retrieved {} reviews for dry run", batch.len());

    let prompts = if batch.is_empty() {
        Vec::new()
    } else {
        build_prompts(&settings.instruction, &batch, settings.chunk_size)
    };

    Ok(PromptPreview { batch, prompts })
}

/// fetch → prompt/classify/parse → CSV
pub struct ReviewPipeline<S: Storage, R: ReviewSource, C: SentimentClassifier> {
    storage: S,
    source: R,
    classifier: C,
    target: ReviewTarget,
    settings: PipelineSettings,
}

impl<S: Storage, R: ReviewSource, C: SentimentClassifier> ReviewPipeline<S, R, C> {
    pub fn new(
        storage: S,
        source: R,
        classifier: C,
        target: ReviewTarget,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            storage,
            source,
            classifier,
            target,
            settings,
        }
    }
}

#[async_trait::async_trait]
impl<S: Storage, R: ReviewSource, C: SentimentClassifier> Pipeline for ReviewPipeline<S, R, C> {
    async fn extract(&self) -> Result<ReviewBatch> {
        self.source.fetch_reviews(&self.target).await
    }

    async fn transform(&self, batch: &ReviewBatch) -> Result<AnalysisResult> {
        let prompts = build_prompts(&self.settings.instruction, batch, self.settings.chunk_size);
        let total = prompts.len();
        let mut responses = Vec::with_capacity(total);

        for (index, prompt) in prompts.iter().enumerate() {
            tracing::info!(
                "🤖 Analyzing {} reviews with {} (request {}/{})",
                prompt.reviews.len(),
                self.classifier.model_name(),
                index + 1,
                total
            );
            let response = self.classifier.classify(prompt).await?;

            if let Some(path) = &self.settings.audit_log {
                audit::record_exchange(
                    &self.storage,
                    path,
                    self.classifier.model_name(),
                    &prompt.render(),
                    &response,
                )
                .await;
            }

            responses.push(response);
        }

        // 每段回覆各自解析，原文只用於顯示
        let derived_table = match parse_responses(&responses) {
            Ok(table) => {
                tracing::debug!("Parsed {} negative reviews", table.negative_count());
                Some(table)
            }
            Err(e) => {
                tracing::warn!("⚠️ {}; showing the analysis without CSV export", e);
                None
            }
        };

        Ok(AnalysisResult {
            raw_text: responses.join("\n\n"),
            derived_table,
        })
    }

    async fn load(&self, batch: &ReviewBatch, result: &AnalysisResult) -> Result<Option<String>> {
        let Some(table) = &result.derived_table else {
            return Ok(None);
        };

        let business_name = batch.business_name.as_deref();
        let csv = render_csv(table, business_name)?;
        let filename = self
            .settings
            .export_filename
            .clone()
            .unwrap_or_else(|| export_filename(business_name));

        tracing::debug!("Writing {} CSV rows to {}", table.negative_count(), filename);
        self.storage.write_file(&filename, csv.as_bytes()).await?;

        Ok(Some(self.storage.location(&filename)))
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use crate::domain::model::NegativeReviewRow;

    fn settings() -> PipelineSettings {
        PipelineSettings {
            instruction: "list negative reviews and their complaint".to_string(),
            chunk_size: None,
            export_filename: None,
            audit_log: None,
        }
    }

    #[tokio::test]
    async fn test_extract_returns_reviews_in_order() {
        let pipeline = ReviewPipeline::new(
            MockStorage::new(),
            MockSource::returning(scenario_batch()),
            MockClassifier::new(SCENARIO_RESPONSE),
            place(),
            settings(),
        );

        let batch = pipeline.extract().await.unwrap();
        let texts: Vec<&str> = batch.reviews.iter().map(|r| r.text.as_str()).collect();
        assert_eq!(texts, vec!["broken item", "great!", "slow service"]);
    }

    #[tokio::test]
    async fn test_transform_sends_one_prompt_with_all_reviews() {
        let classifier = MockClassifier::new(SCENARIO_RESPONSE);
        let pipeline = ReviewPipeline::new(
            MockStorage::new(),
            MockSource::returning(scenario_batch()),
            classifier.clone(),
            place(),
            settings(),
        );

        let result = pipeline.transform(&scenario_batch()).await.unwrap();

        assert_eq!(classifier.call_count(), 1);
        let prompts = classifier.prompts.lock().await;
        assert!(prompts[0].contains("broken item"));
        assert!(prompts[0].contains("great!"));
        assert!(prompts[0].contains("slow service"));
        assert!(prompts[0].contains("Business Name: Corner Cafe"));

        assert_eq!(result.raw_text, SCENARIO_RESPONSE);
        assert_eq!(result.derived_table.unwrap().negative_count(), 2);
    }

    #[tokio::test]
    async fn test_transform_chunks_reviews() {
        let classifier = MockClassifier::new("Negative Reviews:\nAnn: broken item\nIssue Summary: Broken\n");
        let pipeline = ReviewPipeline::new(
            MockStorage::new(),
            MockSource::returning(scenario_batch()),
            classifier.clone(),
            place(),
            PipelineSettings {
                chunk_size: Some(2),
                ..settings()
            },
        );

        let result = pipeline.transform(&scenario_batch()).await.unwrap();

        assert_eq!(classifier.call_count(), 2);
        // 兩段回覆各一筆負評
        assert_eq!(result.derived_table.unwrap().negative_count(), 2);
        let prompts = classifier.prompts.lock().await;
        assert!(prompts[1].contains("slow service"));
        assert!(!prompts[1].contains("broken item"));
    }

    #[tokio::test]
    async fn test_chunked_full_format_responses_export_exact_rows() {
        let storage = MockStorage::new();
        let classifier = MockClassifier::sequence(&[
            "Overall Sentiment: negative\n\nNegative Reviews:\nAnn: broken item\nIssue Summary: Product arrived broken\n",
            "Overall Sentiment: mixed\n\nNegative Reviews:\nCy: slow service\nIssue Summary: Slow service\n",
        ]);
        let pipeline = ReviewPipeline::new(
            storage.clone(),
            MockSource::returning(scenario_batch()),
            classifier.clone(),
            place(),
            PipelineSettings {
                chunk_size: Some(2),
                ..settings()
            },
        );

        let batch = scenario_batch();
        let result = pipeline.transform(&batch).await.unwrap();
        assert_eq!(classifier.call_count(), 2);

        let table = result.derived_table.clone().unwrap();
        assert_eq!(table.overall_sentiment.as_deref(), Some("negative"));
        assert_eq!(
            table.negative_reviews,
            vec![
                NegativeReviewRow {
                    username: "Ann".to_string(),
                    review_text: "broken item".to_string(),
                    issue_summary: "Product arrived broken".to_string(),
                },
                NegativeReviewRow {
                    username: "Cy".to_string(),
                    review_text: "slow service".to_string(),
                    issue_summary: "Slow service".to_string(),
                },
            ]
        );

        pipeline.load(&batch, &result).await.unwrap();
        let csv = String::from_utf8(
            storage
                .get_file("negative_reviews_Corner_Cafe.csv")
                .await
                .unwrap(),
        )
        .unwrap();
        assert_eq!(
            csv,
            "Username,Review,Issue Summary,Business Name,Overall Sentiment\n\
             Ann,broken item,Product arrived broken,Corner Cafe,negative\n\
             Cy,slow service,Slow service,Corner Cafe,negative\n"
        );
    }

    #[tokio::test]
    async fn test_repeated_full_format_response_per_chunk_has_no_stray_rows() {
        let classifier = MockClassifier::new(SCENARIO_RESPONSE);
        let pipeline = ReviewPipeline::new(
            MockStorage::new(),
            MockSource::returning(scenario_batch()),
            classifier,
            place(),
            PipelineSettings {
                chunk_size: Some(2),
                ..settings()
            },
        );

        let result = pipeline.transform(&scenario_batch()).await.unwrap();
        let rows: Vec<(String, String)> = result
            .derived_table
            .unwrap()
            .negative_reviews
            .into_iter()
            .map(|row| (row.username, row.review_text))
            .collect();

        let expected = [("Ann", "broken item"), ("Cy", "slow service")];
        let expected: Vec<(String, String)> = expected
            .iter()
            .chain(expected.iter())
            .map(|(u, r)| (u.to_string(), r.to_string()))
            .collect();
        assert_eq!(rows, expected);
    }

    #[tokio::test]
    async fn test_preview_builds_prompts_without_classifier() {
        let preview = preview(
            &MockSource::returning(scenario_batch()),
            &place(),
            &PipelineSettings {
                chunk_size: Some(2),
                ..settings()
            },
        )
        .await
        .unwrap();

        assert_eq!(preview.batch.len(), 3);
        assert_eq!(preview.prompts.len(), 2);
        assert_eq!(preview.prompts[0].reviews.len(), 2);
        assert!(preview.prompts[1].render().contains("slow service"));
    }

    #[tokio::test]
    async fn test_preview_of_empty_batch_has_no_prompts() {
        let preview = preview(
            &MockSource::returning(ReviewBatch::default()),
            &place(),
            &settings(),
        )
        .await
        .unwrap();

        assert!(preview.batch.is_empty());
        assert!(preview.prompts.is_empty());
    }

    #[tokio::test]
    async fn test_preview_propagates_fetch_error() {
        let err = preview(&MockSource::failing(), &place(), &settings())
            .await
            .unwrap_err();
        assert!(matches!(err, crate::utils::error::ReviewError::NotFoundError { .. }));
    }

    #[tokio::test]
    async fn test_unparseable_response_falls_back_to_display_only() {
        let storage = MockStorage::new();
        let pipeline = ReviewPipeline::new(
            storage.clone(),
            MockSource::returning(scenario_batch()),
            MockClassifier::new("Mostly happy customers."),
            place(),
            settings(),
        );

        let batch = scenario_batch();
        let result = pipeline.transform(&batch).await.unwrap();
        assert_eq!(result.raw_text, "Mostly happy customers.");
        assert!(result.derived_table.is_none());

        let export = pipeline.load(&batch, &result).await.unwrap();
        assert_eq!(export, None);
        assert_eq!(storage.file_count().await, 0);
    }

    #[tokio::test]
    async fn test_load_writes_csv_with_header() {
        let storage = MockStorage::new();
        let pipeline = ReviewPipeline::new(
            storage.clone(),
            MockSource::returning(scenario_batch()),
            MockClassifier::new(SCENARIO_RESPONSE),
            place(),
            settings(),
        );

        let batch = scenario_batch();
        let result = pipeline.transform(&batch).await.unwrap();
        let export = pipeline.load(&batch, &result).await.unwrap();

        assert_eq!(
            export.as_deref(),
            Some("mock://negative_reviews_Corner_Cafe.csv")
        );
        let csv = String::from_utf8(
            storage
                .get_file("negative_reviews_Corner_Cafe.csv")
                .await
                .unwrap(),
        )
        .unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[0],
            "Username,Review,Issue Summary,Business Name,Overall Sentiment"
        );
        assert_eq!(
            lines[2],
            "Cy,slow service,Slow service,Corner Cafe,negative"
        );
    }

    #[tokio::test]
    async fn test_audit_log_records_each_exchange() {
        let storage = MockStorage::new();
        let pipeline = ReviewPipeline::new(
            storage.clone(),
            MockSource::returning(scenario_batch()),
            MockClassifier::new(SCENARIO_RESPONSE),
            place(),
            PipelineSettings {
                chunk_size: Some(1),
                audit_log: Some("audit.jsonl".to_string()),
                ..settings()
            },
        );

        pipeline.transform(&scenario_batch()).await.unwrap();

        let log = String::from_utf8(storage.get_file("audit.jsonl").await.unwrap()).unwrap();
        let entries: Vec<serde_json::Value> = log
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0]["model"], "mock-model");
        assert!(entries[2]["prompt"].as_str().unwrap().contains("slow service"));
    }
}
