use clap::Parser;
use review_sentiment::core::pipeline::preview;
use review_sentiment::domain::model::{Review, RunReport};
use review_sentiment::utils::error::ErrorSeverity;
use review_sentiment::utils::{logger, validation::Validate};
use review_sentiment::{
    AnalysisEngine, CliArgs, GoogleCredentials, GoogleReviewsClient, LocalStorage,
    OpenAiClassifier, PipelineSettings, ReviewError, ReviewPipeline,
};

#[tokio::main]
async fn main() {
    let args = CliArgs::parse();

    // 初始化日誌
    if args.log_json {
        logger::init_json_logger(args.verbose);
    } else {
        logger::init_cli_logger(args.verbose);
    }

    tracing::info!("Starting review-sentiment");

    if let Err(e) = run(args).await {
        tracing::error!(
            "❌ Review analysis failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );

        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

        let exit_code = match e.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        };

        if exit_code > 0 {
            std::process::exit(exit_code);
        }
    }
}

async fn run(args: CliArgs) -> Result<(), ReviewError> {
    let config = args.load_config()?;
    config.validate()?;
    if args.verbose {
        tracing::debug!("Resolved config: {:?}", redacted(&config));
    }

    let target = args.resolve_target()?;

    // 先確認 OpenAI 金鑰，避免白白抓取評論
    let classifier = if args.dry_run {
        None
    } else {
        Some(OpenAiClassifier::new(&config.llm)?)
    };

    let credentials = GoogleCredentials::from_file(&config.reviews.credentials_path)?;
    let source = GoogleReviewsClient::new(&config.reviews, credentials)?;
    let settings = PipelineSettings::from(&config);

    let Some(classifier) = classifier else {
        tracing::info!("🔍 DRY RUN MODE - the LLM will not be called");
        let preview = preview(&source, &target, &settings).await?;
        println!("Retrieved {} reviews", preview.batch.len());
        if args.show_reviews {
            print_reviews(&preview.batch.reviews);
        }
        for (index, prompt) in preview.prompts.iter().enumerate() {
            println!("--- Prompt {}/{} ---", index + 1, preview.prompts.len());
            println!("{}", prompt.render());
        }
        return Ok(());
    };

    let storage = LocalStorage::new(config.export.output_path.clone());
    let pipeline = ReviewPipeline::new(storage, source, classifier, target, settings);

    let report = AnalysisEngine::new(pipeline).run().await?;
    present(&report, args.show_reviews);

    Ok(())
}

fn present(report: &RunReport, show_reviews: bool) {
    let location = report.business_name.as_deref().unwrap_or("the location");

    let Some(analysis) = &report.analysis else {
        println!("⚠️ No reviews found for {}.", location);
        return;
    };

    println!(
        "✅ Successfully retrieved {} reviews for {}.",
        report.review_count, location
    );

    if show_reviews {
        print_reviews(&report.reviews);
    }

    println!();
    println!("Sentiment Analysis Results");
    println!("==========================");
    println!("{}", analysis.raw_text);
    println!();

    match (&report.export_path, &analysis.derived_table) {
        (Some(path), Some(table)) => println!(
            "📁 Exported {} negative reviews to: {}",
            table.negative_count(),
            path
        ),
        _ => println!("ℹ️ The analysis could not be parsed into a table; nothing was exported."),
    }
}

fn print_reviews(reviews: &[Review]) {
    for (i, review) in reviews.iter().enumerate() {
        println!("### Review {}", i + 1);
        println!("Reviewer: {}", review.author_or_anonymous());
        println!("Rating: {}/5", review.rating_label());
        if let Some(timestamp) = review.timestamp {
            println!("Date: {}", timestamp.format("%Y-%m-%d"));
        }
        println!("Comment: {}", review.text_or_placeholder());
        println!("---");
    }
}

fn redacted(config: &review_sentiment::TomlConfig) -> review_sentiment::TomlConfig {
    let mut config = config.clone();
    if config.llm.api_key.is_some() {
        config.llm.api_key = Some("***".to_string());
    }
    config
}
