pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliArgs;
pub use config::{GoogleCredentials, TomlConfig};

pub use adapters::{GoogleReviewsClient, LocalStorage, OpenAiClassifier};
pub use core::{
    engine::AnalysisEngine,
    pipeline::{PipelineSettings, ReviewPipeline},
};
pub use utils::error::{Result, ReviewError};
