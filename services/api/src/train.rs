use clap::Args;
use loan_screen::config::AppConfig;
use loan_screen::error::AppError;
use loan_screen::telemetry;
use loan_screen::workflows::credit::training::{ModelTrainer, TrainingSummary};
use loan_screen::workflows::credit::ArtifactStore;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct TrainArgs {
    /// Historical loan export (CSV with Loan_ID and Loan_Status columns)
    #[arg(long)]
    pub(crate) dataset: PathBuf,
    /// Directory receiving the model artifacts (defaults to APP_MODEL_DIR)
    #[arg(long)]
    pub(crate) output: Option<PathBuf>,
}

pub(crate) fn run_train(args: TrainArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let output = args.output.unwrap_or(config.models.artifact_dir);
    let store = ArtifactStore::new(output);
    let summary = ModelTrainer::default().train_from_path(&args.dataset, &store)?;

    render_training_summary(&summary);
    Ok(())
}

fn render_training_summary(summary: &TrainingSummary) {
    println!("Training complete ({} rows)", summary.rows);
    println!("Numeric columns: {}", summary.numeric_columns.join(", "));
    println!(
        "Categorical columns: {}",
        summary.categorical_columns.join(", ")
    );
    println!(
        "Feature order ({} columns) -> {}",
        summary.feature_order.len(),
        summary.feature_order_path.display()
    );
    println!("\nArtifacts");
    for artifact in &summary.artifacts {
        println!(
            "- {} SVM -> {} (training accuracy {:.1}%)",
            artifact.kernel.label(),
            artifact.path.display(),
            artifact.training_accuracy * 100.0
        );
    }
}
