pub mod audit;
pub mod engine;
pub mod maps_url;
pub mod pipeline;
pub mod presenter;
pub mod prompt;

pub use crate::domain::model::{AnalysisPrompt, AnalysisResult, Review, ReviewBatch, ReviewTarget};
pub use crate::domain::ports::{Pipeline, ReviewSource, SentimentClassifier, Storage};
pub use crate::utils::error::Result;
