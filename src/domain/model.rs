use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single customer review as returned by the reviews service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub text: String,
    pub rating: Option<f32>,
    pub author: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
}

impl Review {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            rating: None,
            author: None,
            timestamp: None,
        }
    }

    pub fn with_rating(mut self, rating: f32) -> Self {
        self.rating = Some(rating);
        self
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    pub fn author_or_anonymous(&self) -> &str {
        self.author.as_deref().unwrap_or("Anonymous")
    }

    pub fn rating_label(&self) -> String {
        self.rating
            .map(|r| r.to_string())
            .unwrap_or_else(|| "No rating".to_string())
    }

    pub fn text_or_placeholder(&self) -> &str {
        if self.text.trim().is_empty() {
            "No comment"
        } else {
            &self.text
        }
    }
}

/// Reviews fetched in one run, in the order the service returned them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReviewBatch {
    pub business_name: Option<String>,
    pub reviews: Vec<Review>,
}

impl ReviewBatch {
    pub fn new(business_name: Option<String>, reviews: Vec<Review>) -> Self {
        Self {
            business_name,
            reviews,
        }
    }

    pub fn len(&self) -> usize {
        self.reviews.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reviews.is_empty()
    }
}

/// 評論來源：Places API 的 place ID，或 Business API 的帳號/地點 ID
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReviewTarget {
    Place {
        place_id: String,
    },
    Location {
        account_id: String,
        location_id: String,
    },
}

impl fmt::Display for ReviewTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReviewTarget::Place { place_id } => write!(f, "places/{}", place_id),
            ReviewTarget::Location {
                account_id,
                location_id,
            } => write!(f, "accounts/{}/locations/{}", account_id, location_id),
        }
    }
}

/// Instruction plus the reviews it applies to; rendered into one LLM request.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisPrompt {
    pub instruction: String,
    pub business_name: Option<String>,
    pub reviews: Vec<Review>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NegativeReviewRow {
    pub username: String,
    pub review_text: String,
    pub issue_summary: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredAnalysis {
    pub overall_sentiment: Option<String>,
    pub negative_reviews: Vec<NegativeReviewRow>,
}

impl StructuredAnalysis {
    pub fn negative_count(&self) -> usize {
        self.negative_reviews.len()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub raw_text: String,
    pub derived_table: Option<StructuredAnalysis>,
}

/// Outcome of one engine run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub business_name: Option<String>,
    pub review_count: usize,
    pub reviews: Vec<Review>,
    pub analysis: Option<AnalysisResult>,
    pub export_path: Option<String>,
}
