use crate::domain::model::{AnalysisPrompt, Review, ReviewBatch};

pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful review sentiment analyzer.";

pub const DEFAULT_INSTRUCTION: &str = "Analyze the sentiment of the following Google reviews.
Provide an overall sentiment score for all reviews combined (positive, neutral, or negative).
Then, identify any reviews with negative sentiment and list them with the following information:
1. Username of the reviewer
2. The full review text
3. A brief summary of the specific issues or complaints mentioned

Format your response as:
Overall Sentiment: [positive/neutral/negative]

Negative Reviews:
[Username]: [Review Text]
Issue Summary: [Brief summary of the problems mentioned]
";

const EMPTY_BATCH_LINE: &str = "No reviews were found.";

impl AnalysisPrompt {
    pub fn new(
        instruction: impl Into<String>,
        business_name: Option<String>,
        reviews: Vec<Review>,
    ) -> Self {
        Self {
            instruction: instruction.into(),
            business_name,
            reviews,
        }
    }

    /// 組成送給模型的完整文字
    pub fn render(&self) -> String {
        let location_info = match &self.business_name {
            Some(name) => format!("Business Name: {}\n\n", name),
            None => String::new(),
        };

        let reviews_text = if self.reviews.is_empty() {
            EMPTY_BATCH_LINE.to_string()
        } else {
            self.reviews
                .iter()
                .enumerate()
                .map(|(i, review)| format_review(i + 1, review))
                .collect::<Vec<_>>()
                .join("\n\n")
        };

        format!(
            "{}\n\n{}{}",
            self.instruction.trim_end(),
            location_info,
            reviews_text
        )
    }
}

fn format_review(number: usize, review: &Review) -> String {
    format!(
        "Review #{}\nReviewer: {}\nRating: {}/5\nComment: {}\n",
        number,
        review.author_or_anonymous(),
        review.rating_label(),
        review.text_or_placeholder()
    )
}

/// Splits a batch into prompts of at most `chunk_size` reviews, keeping order.
/// `None` or `Some(0)` yields a single prompt for the whole batch.
pub fn build_prompts(
    instruction: &str,
    batch: &ReviewBatch,
    chunk_size: Option<usize>,
) -> Vec<AnalysisPrompt> {
    match chunk_size {
        Some(size) if size > 0 && batch.len() > size => batch
            .reviews
            .chunks(size)
            .map(|chunk| {
                AnalysisPrompt::new(instruction, batch.business_name.clone(), chunk.to_vec())
            })
            .collect(),
        _ => vec![AnalysisPrompt::new(
            instruction,
            batch.business_name.clone(),
            batch.reviews.clone(),
        )],
    }
}
